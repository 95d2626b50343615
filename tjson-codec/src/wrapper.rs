//! Wrapper-type codec
//!
//! A single-field wrapper encodes as exactly the JSON of its field: the
//! field is read through the wrapper's descriptor and handed to the host's
//! adapter for the field's declared type. Decoding runs the same delegate and
//! then the wrapper's one-argument constructor.

use crate::adapter::{unexpected_value, AdapterFactory, AdapterLookup, JsonAdapter, SharedAdapter};
use serde_json::Value;
use std::any::Any;
use std::sync::Arc;
use tjson_format::{
    AnyValue, ConstructionError, JsonReader, Result, TargetType, WrapperDescriptor,
};

/// Factory claiming single-field wrappers that are not unsigned integers
#[derive(Debug, Clone, Copy, Default)]
pub struct WrapperAdapterFactory;

impl AdapterFactory for WrapperAdapterFactory {
    fn name(&self) -> &'static str {
        "wrapper"
    }

    fn applies(&self, ty: &TargetType) -> bool {
        ty.wrapper().is_some() && ty.unsigned().is_none()
    }

    fn create(
        &self,
        ty: &TargetType,
        lookup: &dyn AdapterLookup,
    ) -> Result<Option<SharedAdapter>> {
        if !self.applies(ty) {
            return Ok(None);
        }
        let Some(wrapper) = ty.wrapper() else {
            return Ok(None);
        };

        let field_type = wrapper.field_type();
        tracing::debug!(
            target_type = %ty,
            field = wrapper.field_name(),
            field_type = %field_type,
            "wrapper codec claimed type"
        );
        let delegate = lookup.adapter_for(&field_type)?;

        Ok(Some(Arc::new(WrapperAdapter {
            ty: ty.clone(),
            wrapper: wrapper.clone(),
            delegate,
        })))
    }
}

/// Adapter for one wrapper type
pub struct WrapperAdapter {
    ty: TargetType,
    wrapper: WrapperDescriptor,
    delegate: SharedAdapter,
}

impl JsonAdapter for WrapperAdapter {
    fn name(&self) -> &'static str {
        "wrapper"
    }

    fn encode(&self, value: &dyn Any) -> Result<Value> {
        let inner = self
            .wrapper
            .inner(value)
            .ok_or_else(|| unexpected_value(self.name(), &self.ty))?;
        self.delegate.encode(inner)
    }

    fn decode(&self, reader: &JsonReader<'_>) -> Result<AnyValue> {
        let inner = self.delegate.decode(reader)?;
        self.wrapper.construct(inner).map_err(|source| {
            ConstructionError {
                type_name: self.ty.simple_name(),
                value: reader.render(),
                path: reader.path().clone(),
                source,
            }
            .into()
        })
    }
}

//! Unsigned numeric codec
//!
//! Encodes `u8`/`u16`/`u32`/`u64` (and any type declaring an unsigned width)
//! as bare decimal number literals and decodes them back without passing
//! through the host's signed number model, so values with the top bit set
//! survive the round trip.

use crate::adapter::{unexpected_value, AdapterFactory, AdapterLookup, JsonAdapter, SharedAdapter};
use serde_json::{Number, Value};
use std::any::Any;
use std::str::FromStr;
use std::sync::Arc;
use tjson_format::{
    AnyValue, JsonError, JsonReader, LiteralError, RangeReason, Result, TargetType, Token,
    UnsignedDescriptor,
};

/// Factory claiming every type that carries an unsigned width
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsignedAdapterFactory;

impl AdapterFactory for UnsignedAdapterFactory {
    fn name(&self) -> &'static str {
        "unsigned"
    }

    fn applies(&self, ty: &TargetType) -> bool {
        ty.unsigned().is_some()
    }

    fn create(
        &self,
        ty: &TargetType,
        lookup: &dyn AdapterLookup,
    ) -> Result<Option<SharedAdapter>> {
        let Some(unsigned) = ty.unsigned() else {
            return Ok(None);
        };
        tracing::debug!(target_type = %ty, width = %unsigned.width(), "unsigned codec claimed type");
        Ok(Some(Arc::new(UnsignedAdapter {
            ty: ty.clone(),
            unsigned: unsigned.clone(),
            max_number_len: lookup.limits().max_number_len,
        })))
    }
}

/// Adapter for one unsigned type
pub struct UnsignedAdapter {
    ty: TargetType,
    unsigned: UnsignedDescriptor,
    max_number_len: usize,
}

impl UnsignedAdapter {
    fn expected(&self) -> String {
        format!("an unsigned number ({})", self.unsigned.width())
    }
}

impl JsonAdapter for UnsignedAdapter {
    fn name(&self) -> &'static str {
        "unsigned"
    }

    fn encode(&self, value: &dyn Any) -> Result<Value> {
        let bits = self
            .unsigned
            .to_bits(value)
            .ok_or_else(|| unexpected_value(self.name(), &self.ty))?;
        let width = self.unsigned.width();
        if bits > width.max() {
            return Err(JsonError::Encode {
                type_name: self.ty.simple_name(),
                reason: format!("{} does not fit in {}", bits, width),
            });
        }
        let number = Number::from_str(&width.widen(bits))?;
        Ok(Value::Number(number))
    }

    fn decode(&self, reader: &JsonReader<'_>) -> Result<AnyValue> {
        if reader.peek() != Token::Number {
            return Err(reader.type_error(self.expected()));
        }
        let text = reader
            .number_text()
            .ok_or_else(|| reader.type_error(self.expected()))?;

        let bits = match self
            .unsigned
            .width()
            .narrow_bounded(&text, self.max_number_len)
        {
            Ok(bits) => bits,
            Err(LiteralError::Range(reason)) => {
                return Err(reader.range_error(self.ty.simple_name(), reason))
            }
            Err(LiteralError::Malformed) => return Err(reader.type_error(self.expected())),
            Err(err @ LiteralError::TooLong { .. }) => {
                return Err(JsonError::LimitExceeded(format!("{} at {}", err, reader.path())))
            }
        };

        self.unsigned
            .from_bits(bits)
            .ok_or_else(|| reader.range_error(self.ty.simple_name(), RangeReason::Overflow))
    }
}

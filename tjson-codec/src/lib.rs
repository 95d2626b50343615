//! tjson Codec - Pluggable adapters for the tjson engine
//!
//! This crate contributes two adapter factories and the ordered chain the
//! host consults before falling back to its reflective defaults:
//!
//! - [`UnsignedAdapterFactory`]: `u8`/`u16`/`u32`/`u64` encoded as their
//!   unsigned decimal value, negative literals rejected
//! - [`WrapperAdapterFactory`]: single-field wrappers encoded as the bare
//!   JSON of their field
//! - [`ResolutionChain`]: first-match-wins ordering of factory entries
//!
//! Both factories are stateless; adapters they produce are immutable and can
//! be shared across threads.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod adapter;
pub mod chain;
pub mod unsigned;
pub mod wrapper;

pub use adapter::{unexpected_value, AdapterFactory, AdapterLookup, JsonAdapter, SharedAdapter};
pub use chain::{AdapterEntry, Predicate, Resolution, ResolutionChain};
pub use unsigned::{UnsignedAdapter, UnsignedAdapterFactory};
pub use wrapper::{WrapperAdapter, WrapperAdapterFactory};

/// Entries for both codecs, unsigned first so that a wrapper which is also
/// an unsigned integer is encoded numerically
pub fn extension_entries() -> Vec<AdapterEntry> {
    vec![
        AdapterEntry::new(UnsignedAdapterFactory),
        AdapterEntry::new(WrapperAdapterFactory),
    ]
}

#[cfg(test)]
pub(crate) mod testing {
    //! Minimal host lookup for exercising factories in isolation

    use super::*;
    use serde_json::Value;
    use std::any::Any;
    use std::sync::Arc;
    use tjson_format::{AnyValue, JsonError, JsonReader, Limits, Result, TargetType, Token};

    /// Resolves through both codecs, then a handful of hand-written adapters
    #[derive(Default)]
    pub struct StubLookup {
        limits: Limits,
    }

    impl StubLookup {
        pub fn with_limits(limits: Limits) -> Self {
            Self { limits }
        }
    }

    impl AdapterLookup for StubLookup {
        fn adapter_for(&self, ty: &TargetType) -> Result<SharedAdapter> {
            let chain = ResolutionChain::new(extension_entries());
            if let Resolution::Matched { adapter, .. } = chain.resolve(ty, self)? {
                return Ok(adapter);
            }
            if ty.is::<String>() {
                Ok(Arc::new(StringStub))
            } else if ty.is::<i32>() {
                Ok(Arc::new(IntStub))
            } else if ty.is::<Option<String>>() {
                Ok(Arc::new(OptionalStringStub))
            } else {
                Err(JsonError::NoAdapter {
                    type_name: ty.simple_name(),
                })
            }
        }

        fn limits(&self) -> &Limits {
            &self.limits
        }
    }

    struct StringStub;

    impl JsonAdapter for StringStub {
        fn name(&self) -> &'static str {
            "string-stub"
        }

        fn encode(&self, value: &dyn Any) -> Result<Value> {
            value
                .downcast_ref::<String>()
                .map(|s| Value::String(s.clone()))
                .ok_or_else(|| JsonError::Internal("not a String".into()))
        }

        fn decode(&self, reader: &JsonReader<'_>) -> Result<AnyValue> {
            match reader.value() {
                Value::String(s) => Ok(Box::new(s.clone())),
                _ => Err(reader.type_error("a string")),
            }
        }
    }

    struct IntStub;

    impl JsonAdapter for IntStub {
        fn name(&self) -> &'static str {
            "int-stub"
        }

        fn encode(&self, value: &dyn Any) -> Result<Value> {
            value
                .downcast_ref::<i32>()
                .map(|&n| Value::from(n))
                .ok_or_else(|| JsonError::Internal("not an i32".into()))
        }

        fn decode(&self, reader: &JsonReader<'_>) -> Result<AnyValue> {
            reader
                .value()
                .as_i64()
                .and_then(|n| i32::try_from(n).ok())
                .map(|n| Box::new(n) as AnyValue)
                .ok_or_else(|| reader.type_error("an int"))
        }
    }

    struct OptionalStringStub;

    impl JsonAdapter for OptionalStringStub {
        fn name(&self) -> &'static str {
            "optional-string-stub"
        }

        fn encode(&self, value: &dyn Any) -> Result<Value> {
            match value.downcast_ref::<Option<String>>() {
                Some(Some(s)) => Ok(Value::String(s.clone())),
                Some(None) => Ok(Value::Null),
                None => Err(JsonError::Internal("not an Option<String>".into())),
            }
        }

        fn decode(&self, reader: &JsonReader<'_>) -> Result<AnyValue> {
            match reader.peek() {
                Token::Null => Ok(Box::new(None::<String>)),
                Token::String => Ok(Box::new(reader.value().as_str().map(str::to_string))),
                _ => Err(reader.type_error("a string or null")),
            }
        }
    }
}

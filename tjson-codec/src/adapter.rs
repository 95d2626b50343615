//! Adapter, factory and lookup contracts shared with the host engine

use serde_json::Value;
use std::any::Any;
use std::sync::Arc;
use tjson_format::{AnyValue, JsonError, JsonReader, Limits, Result, TargetType};

/// Paired encode/decode strategy for one type.
///
/// Values are type-erased; an adapter only ever receives values of the type
/// it was created for.
pub trait JsonAdapter: Send + Sync {
    /// Short name of the strategy, for logs
    fn name(&self) -> &'static str;

    /// Encode `value` as a JSON value
    fn encode(&self, value: &dyn Any) -> Result<Value>;

    /// Decode the value under `reader`
    fn decode(&self, reader: &JsonReader<'_>) -> Result<AnyValue>;
}

/// Adapter shared between the engine cache and the adapters delegating to it
pub type SharedAdapter = Arc<dyn JsonAdapter>;

/// Host-side lookup used by adapters to obtain delegates for contained types
pub trait AdapterLookup {
    /// Adapter for `ty`, resolved through the host's full chain
    fn adapter_for(&self, ty: &TargetType) -> Result<SharedAdapter>;

    /// Limits configured on the host
    fn limits(&self) -> &Limits;
}

/// Produces adapters for the types it recognizes.
///
/// `create` returning `Ok(None)` declines the type so resolution moves on to
/// the next entry; `Err` aborts resolution.
pub trait AdapterFactory: Send + Sync {
    /// Short name of the factory, for logs
    fn name(&self) -> &'static str;

    /// Cheap structural test run before `create`
    fn applies(&self, ty: &TargetType) -> bool;

    /// Build an adapter for `ty`, or decline
    fn create(&self, ty: &TargetType, lookup: &dyn AdapterLookup)
        -> Result<Option<SharedAdapter>>;
}

/// Error for a value handed to an adapter created for another type
pub fn unexpected_value(adapter: &str, expected: &TargetType) -> JsonError {
    JsonError::Internal(format!(
        "{} adapter received a value that is not a {}",
        adapter,
        expected.simple_name()
    ))
}

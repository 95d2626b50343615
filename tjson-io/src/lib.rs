//! tjson I/O - Host engine and high-level APIs
//!
//! This crate provides the engine that drives the adapter codecs:
//!
//! - [`EngineBuilder`] assembling an ordered resolution chain
//! - Default adapters for scalars, options, sequences, maps and records
//! - Typed entry points over values, strings, readers and writers
//!
//! ```
//! use tjson_io::{reflect_transparent, BoxError, Engine, Transparent};
//!
//! struct UserId(u64);
//!
//! impl Transparent for UserId {
//!     type Inner = u64;
//!     fn inner(&self) -> &u64 {
//!         &self.0
//!     }
//!     fn from_inner(inner: u64) -> Result<Self, BoxError> {
//!         Ok(UserId(inner))
//!     }
//! }
//!
//! reflect_transparent!(UserId);
//!
//! let engine = Engine::with_extensions();
//! let text = engine.to_string(&UserId(9_223_372_039_002_259_454)).unwrap();
//! assert_eq!(text, "9223372039002259454");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod defaults;
pub mod engine;

// Re-export commonly used types
pub use engine::{Engine, EngineBuilder, EngineOptions, TypedAdapter};
pub use tjson_codec::{
    AdapterEntry, AdapterFactory, AdapterLookup, JsonAdapter, ResolutionChain, SharedAdapter,
    UnsignedAdapterFactory, WrapperAdapterFactory,
};
pub use tjson_format::{
    reflect_transparent, BoxError, FieldValues, JsonError, JsonPath, JsonReader, Limits,
    RangeReason, Reflect, Result, TargetType, Transparent, UnsignedWidth,
};

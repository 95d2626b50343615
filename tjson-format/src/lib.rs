//! tjson Format - Core primitives for transparent JSON adapters
//!
//! This crate provides the building blocks shared by the adapter codecs and
//! the host engine, with no I/O dependencies. It includes:
//!
//! - Error taxonomy (range, type, construction errors)
//! - Resolution and parsing limits
//! - JSON paths and a path-aware reader over `serde_json::Value`
//! - Exact number literal parsing
//! - Unsigned integer widths and their signed carriers
//! - Static type metadata (`Reflect`, `TargetType`) replacing runtime reflection

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
mod impls;
pub mod limits;
pub mod number;
pub mod path;
pub mod reader;
pub mod record;
pub mod reflect;
pub mod token;
pub mod unsigned;

// Re-export commonly used types
pub use error::{
    BoxError, ConstructionError, JsonError, RangeError, RangeReason, Result, TypeError,
};
pub use limits::Limits;
pub use number::{LiteralError, NumberLiteral};
pub use path::{JsonPath, PathSegment};
pub use reader::JsonReader;
pub use record::{FieldValues, RecordBuilder};
pub use reflect::{
    AnyValue, FieldDescriptor, Kind, MapDescriptor, OptionalDescriptor, RecordDescriptor,
    Reflect, Scalar, SequenceDescriptor, TargetType, Transparent, UnsignedDescriptor,
    WrapperDescriptor,
};
pub use token::Token;
pub use unsigned::UnsignedWidth;

//! Record (named-field struct) metadata builder

use crate::error::BoxError;
use crate::reflect::{
    AnyValue, FieldAccess, FieldDescriptor, Kind, RecordConstruct, RecordDescriptor, Reflect,
    TargetType,
};
use std::any::{type_name, Any};
use std::marker::PhantomData;
use std::sync::Arc;

/// Builds the [`TargetType`] of a struct from its field accessors.
///
/// ```
/// use tjson_format::{Reflect, TargetType};
///
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// impl Reflect for Point {
///     fn target_type() -> TargetType {
///         TargetType::record::<Self>()
///             .field("x", |p: &Self| &p.x)
///             .field("y", |p: &Self| &p.y)
///             .build(|fields| {
///                 Ok(Point {
///                     x: fields.take("x")?,
///                     y: fields.take("y")?,
///                 })
///             })
///     }
/// }
/// ```
pub struct RecordBuilder<T> {
    fields: Vec<FieldDescriptor>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Any + Send> RecordBuilder<T> {
    pub(crate) fn new() -> Self {
        Self {
            fields: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Declare the next field
    pub fn field<F: Reflect>(mut self, name: &'static str, get: fn(&T) -> &F) -> Self {
        self.fields.push(FieldDescriptor::new(
            name,
            F::target_type,
            Arc::new(Getter { get }),
        ));
        self
    }

    /// Finish with the constructor that assembles `T` from decoded fields
    pub fn build(self, construct: fn(&mut FieldValues) -> Result<T, BoxError>) -> TargetType {
        let record = RecordDescriptor::new(self.fields, Arc::new(Constructor { construct }));
        TargetType::from_parts::<T>(Vec::new(), Kind::Record(record), None)
    }
}

struct Getter<T, F> {
    get: fn(&T) -> &F,
}

impl<T: Any, F: Any> FieldAccess for Getter<T, F> {
    fn get<'a>(&self, value: &'a dyn Any) -> Option<&'a dyn Any> {
        value
            .downcast_ref::<T>()
            .map(|record| (self.get)(record) as &dyn Any)
    }
}

struct Constructor<T> {
    construct: fn(&mut FieldValues) -> Result<T, BoxError>,
}

impl<T: Any + Send> RecordConstruct for Constructor<T> {
    fn construct(&self, fields: &mut FieldValues) -> Result<AnyValue, BoxError> {
        Ok(Box::new((self.construct)(fields)?))
    }
}

/// Decoded field values handed to a record constructor
#[derive(Default)]
pub struct FieldValues {
    values: Vec<(&'static str, Option<AnyValue>)>,
}

impl FieldValues {
    /// Empty set of values
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the decoded value of field `name`
    pub fn insert(&mut self, name: &'static str, value: AnyValue) {
        self.values.push((name, Some(value)));
    }

    /// Number of values not yet taken
    pub fn remaining(&self) -> usize {
        self.values.iter().filter(|(_, value)| value.is_some()).count()
    }

    /// Move the value of field `name` out as a `F`
    pub fn take<F: Any>(&mut self, name: &str) -> Result<F, BoxError> {
        let slot = self
            .values
            .iter_mut()
            .find(|(field, value)| *field == name && value.is_some())
            .ok_or_else(|| format!("no value for field '{}'", name))?;
        let value = slot.1.take().ok_or_else(|| format!("no value for field '{}'", name))?;
        match value.downcast::<F>() {
            Ok(value) => Ok(*value),
            Err(value) => {
                slot.1 = Some(value);
                Err(format!("field '{}' is not a {}", name, type_name::<F>()).into())
            }
        }
    }
}

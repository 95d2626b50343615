//! Static type metadata standing in for runtime reflection
//!
//! Every type the engine can encode implements [`Reflect`], which produces a
//! [`TargetType`]: the type's identity, its generic arguments, its structural
//! [`Kind`] and, for unsigned integers, an [`UnsignedDescriptor`]. Values
//! cross adapter boundaries type-erased as `&dyn Any` / [`AnyValue`]; the
//! descriptors carry the monomorphized accessors needed to look inside them.

use crate::error::BoxError;
use crate::record::{FieldValues, RecordBuilder};
use crate::unsigned::UnsignedWidth;
use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

/// An owned, type-erased value produced by decoding
pub type AnyValue = Box<dyn Any + Send>;

/// Types that can describe themselves to the engine
pub trait Reflect: Any + Send + Sized {
    /// Metadata for `Self`
    fn target_type() -> TargetType;
}

/// A type with exactly one backing field whose JSON form is that field's.
///
/// Implementing this trait is how a type opts into transparent encoding;
/// pair it with [`reflect_transparent!`](crate::reflect_transparent) or a
/// manual [`Reflect`] impl returning [`TargetType::transparent`].
pub trait Transparent: Send + Sized + 'static {
    /// Declared type of the backing field
    type Inner: Reflect;

    /// Name of the backing field, used by the reflective default encoding
    const FIELD: &'static str = "value";

    /// Borrow the backing field
    fn inner(&self) -> &Self::Inner;

    /// One-argument constructor; may reject the value
    fn from_inner(inner: Self::Inner) -> Result<Self, BoxError>;
}

/// Scalar kinds understood natively by the host number/string model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scalar {
    /// `bool`
    Bool,
    /// `i8`
    I8,
    /// `i16`
    I16,
    /// `i32`
    I32,
    /// `i64`
    I64,
    /// `f32`
    F32,
    /// `f64`
    F64,
    /// `String`
    Str,
}

/// Structural shape of a type
#[derive(Clone)]
pub enum Kind {
    /// Native scalar
    Scalar(Scalar),
    /// No structure the host understands (bare unsigned primitives)
    Opaque,
    /// `Option<T>`; `null` stands for `None`
    Optional(OptionalDescriptor),
    /// Homogeneous sequence
    Sequence(SequenceDescriptor),
    /// String-keyed map
    Map(MapDescriptor),
    /// Struct with named fields
    Record(RecordDescriptor),
    /// Single-field wrapper
    Wrapper(WrapperDescriptor),
}

impl Kind {
    /// Short name of the shape, for logs
    pub fn label(&self) -> &'static str {
        match self {
            Kind::Scalar(_) => "scalar",
            Kind::Opaque => "opaque",
            Kind::Optional(_) => "optional",
            Kind::Sequence(_) => "sequence",
            Kind::Map(_) => "map",
            Kind::Record(_) => "record",
            Kind::Wrapper(_) => "wrapper",
        }
    }
}

impl fmt::Debug for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Scalar(scalar) => write!(f, "Scalar({:?})", scalar),
            Kind::Wrapper(wrapper) => write!(f, "Wrapper({})", wrapper.field_name()),
            other => f.write_str(other.label()),
        }
    }
}

struct TypeInfo {
    id: TypeId,
    name: &'static str,
    args: Vec<TargetType>,
    kind: Kind,
    unsigned: Option<UnsignedDescriptor>,
}

/// Runtime descriptor of a type being encoded or decoded.
///
/// Cheap to clone; equality and hashing use the type identity only.
#[derive(Clone)]
pub struct TargetType {
    info: Arc<TypeInfo>,
}

impl TargetType {
    /// Metadata for `T`
    pub fn of<T: Reflect>() -> Self {
        T::target_type()
    }

    pub(crate) fn from_parts<T: Any>(
        args: Vec<TargetType>,
        kind: Kind,
        unsigned: Option<UnsignedDescriptor>,
    ) -> Self {
        Self {
            info: Arc::new(TypeInfo {
                id: TypeId::of::<T>(),
                name: type_name::<T>(),
                args,
                kind,
                unsigned,
            }),
        }
    }

    /// Metadata for a [`Transparent`] wrapper type
    pub fn transparent<T: Transparent>() -> Self {
        let wrapper = WrapperDescriptor {
            field: T::FIELD,
            field_type: <T::Inner as Reflect>::target_type,
            access: Arc::new(TransparentAccess::<T>(PhantomData)),
        };
        Self::from_parts::<T>(Vec::new(), Kind::Wrapper(wrapper), None)
    }

    /// Start describing a record type field by field
    pub fn record<T: Any + Send>() -> RecordBuilder<T> {
        RecordBuilder::new()
    }

    /// Mark the type as an unsigned integer of `width` whose bit pattern is
    /// reachable through `to_bits` / `from_bits`
    pub fn with_unsigned<T: Any + Send>(
        self,
        width: UnsignedWidth,
        to_bits: fn(&T) -> u64,
        from_bits: fn(u64) -> T,
    ) -> Self {
        debug_assert_eq!(self.info.id, TypeId::of::<T>());
        let unsigned = UnsignedDescriptor {
            width,
            access: Arc::new(MappedBits { to_bits, from_bits }),
        };
        Self {
            info: Arc::new(TypeInfo {
                id: self.info.id,
                name: self.info.name,
                args: self.info.args.clone(),
                kind: self.info.kind.clone(),
                unsigned: Some(unsigned),
            }),
        }
    }

    /// Identity of the described type
    pub fn id(&self) -> TypeId {
        self.info.id
    }

    /// True when this describes `T`
    pub fn is<T: Any>(&self) -> bool {
        self.info.id == TypeId::of::<T>()
    }

    /// Fully qualified type name
    pub fn name(&self) -> &'static str {
        self.info.name
    }

    /// Type name with module paths stripped, e.g. `Vec<Email>`
    pub fn simple_name(&self) -> String {
        simple_type_name(self.info.name)
    }

    /// Generic type arguments (element, value or inner type)
    pub fn args(&self) -> &[TargetType] {
        &self.info.args
    }

    /// Structural shape
    pub fn kind(&self) -> &Kind {
        &self.info.kind
    }

    /// Unsigned integer facts, when the type is one
    pub fn unsigned(&self) -> Option<&UnsignedDescriptor> {
        self.info.unsigned.as_ref()
    }

    /// Width of the unsigned integer, when the type is one
    pub fn unsigned_width(&self) -> Option<UnsignedWidth> {
        self.unsigned().map(UnsignedDescriptor::width)
    }

    /// Wrapper facts, when the type is a single-field wrapper
    pub fn wrapper(&self) -> Option<&WrapperDescriptor> {
        match &self.info.kind {
            Kind::Wrapper(wrapper) => Some(wrapper),
            _ => None,
        }
    }

    /// True when `null` is a valid value of the type
    pub fn is_nullable(&self) -> bool {
        matches!(self.info.kind, Kind::Optional(_))
    }
}

impl PartialEq for TargetType {
    fn eq(&self, other: &Self) -> bool {
        self.info.id == other.info.id
    }
}

impl Eq for TargetType {}

impl Hash for TargetType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.info.id.hash(state);
    }
}

impl fmt::Debug for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetType")
            .field("name", &self.info.name)
            .field("kind", &self.info.kind)
            .field("unsigned", &self.unsigned_width())
            .finish()
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.simple_name())
    }
}

/// Strip module paths from every path segment of a type name
pub fn simple_type_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut segment = String::new();
    for ch in name.chars() {
        if ch.is_alphanumeric() || ch == '_' || ch == ':' {
            segment.push(ch);
        } else {
            out.push_str(segment.rsplit("::").next().unwrap_or(""));
            segment.clear();
            out.push(ch);
        }
    }
    out.push_str(segment.rsplit("::").next().unwrap_or(""));
    out
}

// ---------------------------------------------------------------------------
// Unsigned integers

pub(crate) trait UnsignedAccess: Send + Sync {
    fn to_bits(&self, value: &dyn Any) -> Option<u64>;
    fn from_bits(&self, bits: u64) -> Option<AnyValue>;
}

/// Unsigned integer facts of a type
#[derive(Clone)]
pub struct UnsignedDescriptor {
    width: UnsignedWidth,
    access: Arc<dyn UnsignedAccess>,
}

impl UnsignedDescriptor {
    pub(crate) fn new(width: UnsignedWidth, access: Arc<dyn UnsignedAccess>) -> Self {
        Self { width, access }
    }

    /// Width of the integer
    pub fn width(&self) -> UnsignedWidth {
        self.width
    }

    /// Bit pattern of `value`; `None` if `value` is not of the described type
    pub fn to_bits(&self, value: &dyn Any) -> Option<u64> {
        self.access.to_bits(value)
    }

    /// Value holding `bits`; `None` if `bits` exceeds the width
    pub fn from_bits(&self, bits: u64) -> Option<AnyValue> {
        if bits > self.width.max() {
            return None;
        }
        self.access.from_bits(bits)
    }
}

struct MappedBits<T> {
    to_bits: fn(&T) -> u64,
    from_bits: fn(u64) -> T,
}

impl<T: Any + Send> UnsignedAccess for MappedBits<T> {
    fn to_bits(&self, value: &dyn Any) -> Option<u64> {
        value.downcast_ref::<T>().map(self.to_bits)
    }

    fn from_bits(&self, bits: u64) -> Option<AnyValue> {
        Some(Box::new((self.from_bits)(bits)))
    }
}

// ---------------------------------------------------------------------------
// Wrappers

pub(crate) trait WrapperAccess: Send + Sync {
    fn inner<'a>(&self, value: &'a dyn Any) -> Option<&'a dyn Any>;
    fn construct(&self, inner: AnyValue) -> Result<AnyValue, BoxError>;
}

/// Single-field wrapper facts: the backing field and the constructor
#[derive(Clone)]
pub struct WrapperDescriptor {
    field: &'static str,
    field_type: fn() -> TargetType,
    access: Arc<dyn WrapperAccess>,
}

impl WrapperDescriptor {
    /// Name of the backing field
    pub fn field_name(&self) -> &'static str {
        self.field
    }

    /// Declared type of the backing field
    pub fn field_type(&self) -> TargetType {
        (self.field_type)()
    }

    /// Borrow the backing field of `value`
    pub fn inner<'a>(&self, value: &'a dyn Any) -> Option<&'a dyn Any> {
        self.access.inner(value)
    }

    /// Invoke the one-argument constructor
    pub fn construct(&self, inner: AnyValue) -> Result<AnyValue, BoxError> {
        self.access.construct(inner)
    }
}

struct TransparentAccess<T>(PhantomData<fn() -> T>);

impl<T: Transparent> WrapperAccess for TransparentAccess<T> {
    fn inner<'a>(&self, value: &'a dyn Any) -> Option<&'a dyn Any> {
        value
            .downcast_ref::<T>()
            .map(|wrapper| wrapper.inner() as &dyn Any)
    }

    fn construct(&self, inner: AnyValue) -> Result<AnyValue, BoxError> {
        let inner = inner.downcast::<T::Inner>().map_err(|_| {
            format!(
                "inner value is not a {}",
                simple_type_name(type_name::<T::Inner>())
            )
        })?;
        Ok(Box::new(T::from_inner(*inner)?))
    }
}

// ---------------------------------------------------------------------------
// Options, sequences and maps

pub(crate) trait OptionalAccess: Send + Sync {
    fn get<'a>(&self, value: &'a dyn Any) -> Option<Option<&'a dyn Any>>;
    fn some(&self, inner: AnyValue) -> Option<AnyValue>;
    fn none(&self) -> AnyValue;
}

/// Accessors of an `Option<T>`; the inner type is `args()[0]`
#[derive(Clone)]
pub struct OptionalDescriptor {
    access: Arc<dyn OptionalAccess>,
}

impl OptionalDescriptor {
    pub(crate) fn new(access: Arc<dyn OptionalAccess>) -> Self {
        Self { access }
    }

    /// `Some(Some(inner))`, `Some(None)`, or `None` on a type mismatch
    pub fn get<'a>(&self, value: &'a dyn Any) -> Option<Option<&'a dyn Any>> {
        self.access.get(value)
    }

    /// Wrap a decoded inner value in `Some`
    pub fn some(&self, inner: AnyValue) -> Option<AnyValue> {
        self.access.some(inner)
    }

    /// The `None` value
    pub fn none(&self) -> AnyValue {
        self.access.none()
    }
}

pub(crate) trait SequenceAccess: Send + Sync {
    fn items<'a>(&self, value: &'a dyn Any) -> Option<Vec<&'a dyn Any>>;
    fn collect(&self, items: Vec<AnyValue>) -> Option<AnyValue>;
}

/// Accessors of a sequence; the element type is `args()[0]`
#[derive(Clone)]
pub struct SequenceDescriptor {
    access: Arc<dyn SequenceAccess>,
}

impl SequenceDescriptor {
    pub(crate) fn new(access: Arc<dyn SequenceAccess>) -> Self {
        Self { access }
    }

    /// Borrow every element
    pub fn items<'a>(&self, value: &'a dyn Any) -> Option<Vec<&'a dyn Any>> {
        self.access.items(value)
    }

    /// Build the sequence from decoded elements
    pub fn collect(&self, items: Vec<AnyValue>) -> Option<AnyValue> {
        self.access.collect(items)
    }
}

pub(crate) trait MapAccess: Send + Sync {
    fn entries<'a>(&self, value: &'a dyn Any) -> Option<Vec<(&'a str, &'a dyn Any)>>;
    fn collect(&self, entries: Vec<(String, AnyValue)>) -> Option<AnyValue>;
}

/// Accessors of a string-keyed map; the value type is `args()[0]`
#[derive(Clone)]
pub struct MapDescriptor {
    access: Arc<dyn MapAccess>,
}

impl MapDescriptor {
    pub(crate) fn new(access: Arc<dyn MapAccess>) -> Self {
        Self { access }
    }

    /// Borrow every entry, ordered by key
    pub fn entries<'a>(&self, value: &'a dyn Any) -> Option<Vec<(&'a str, &'a dyn Any)>> {
        self.access.entries(value)
    }

    /// Build the map from decoded entries
    pub fn collect(&self, entries: Vec<(String, AnyValue)>) -> Option<AnyValue> {
        self.access.collect(entries)
    }
}

// ---------------------------------------------------------------------------
// Records

pub(crate) trait FieldAccess: Send + Sync {
    fn get<'a>(&self, value: &'a dyn Any) -> Option<&'a dyn Any>;
}

pub(crate) trait RecordConstruct: Send + Sync {
    fn construct(&self, fields: &mut FieldValues) -> Result<AnyValue, BoxError>;
}

/// One named field of a record
#[derive(Clone)]
pub struct FieldDescriptor {
    name: &'static str,
    field_type: fn() -> TargetType,
    access: Arc<dyn FieldAccess>,
}

impl FieldDescriptor {
    pub(crate) fn new(
        name: &'static str,
        field_type: fn() -> TargetType,
        access: Arc<dyn FieldAccess>,
    ) -> Self {
        Self {
            name,
            field_type,
            access,
        }
    }

    /// JSON member name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Declared type of the field
    pub fn field_type(&self) -> TargetType {
        (self.field_type)()
    }

    /// Borrow the field of `record`
    pub fn get<'a>(&self, record: &'a dyn Any) -> Option<&'a dyn Any> {
        self.access.get(record)
    }
}

/// Fields of a record in declaration order, plus its constructor
#[derive(Clone)]
pub struct RecordDescriptor {
    fields: Arc<[FieldDescriptor]>,
    construct: Arc<dyn RecordConstruct>,
}

impl RecordDescriptor {
    pub(crate) fn new(fields: Vec<FieldDescriptor>, construct: Arc<dyn RecordConstruct>) -> Self {
        Self {
            fields: fields.into(),
            construct,
        }
    }

    /// Fields in declaration order
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Build the record from decoded field values
    pub fn construct(&self, fields: &mut FieldValues) -> Result<AnyValue, BoxError> {
        self.construct.construct(fields)
    }
}

/// Implement [`Reflect`] for [`Transparent`] types
///
/// ```
/// use tjson_format::{reflect_transparent, BoxError, Transparent};
///
/// struct Email(String);
///
/// impl Transparent for Email {
///     type Inner = String;
///     fn inner(&self) -> &String {
///         &self.0
///     }
///     fn from_inner(inner: String) -> Result<Self, BoxError> {
///         Ok(Email(inner))
///     }
/// }
///
/// reflect_transparent!(Email);
/// ```
#[macro_export]
macro_rules! reflect_transparent {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Reflect for $ty {
                fn target_type() -> $crate::TargetType {
                    $crate::TargetType::transparent::<$ty>()
                }
            }
        )+
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Email(String);

    impl Transparent for Email {
        type Inner = String;
        const FIELD: &'static str = "address";

        fn inner(&self) -> &String {
            &self.0
        }

        fn from_inner(inner: String) -> Result<Self, BoxError> {
            if inner.contains('@') {
                Ok(Email(inner))
            } else {
                Err(format!("'{}' is not an email address", inner).into())
            }
        }
    }

    crate::reflect_transparent!(Email);

    #[test]
    fn test_simple_type_name() {
        assert_eq!(simple_type_name("alloc::string::String"), "String");
        assert_eq!(
            simple_type_name("alloc::vec::Vec<core::option::Option<my_crate::Email>>"),
            "Vec<Option<Email>>"
        );
        assert_eq!(
            simple_type_name("std::collections::BTreeMap<alloc::string::String, u8>"),
            "BTreeMap<String, u8>"
        );
    }

    #[test]
    fn test_transparent_metadata() {
        let ty = TargetType::of::<Email>();
        assert!(ty.is::<Email>());
        assert_eq!(ty.simple_name(), "Email");
        assert!(ty.unsigned().is_none());
        assert!(!ty.is_nullable());

        let wrapper = ty.wrapper().expect("wrapper descriptor");
        assert_eq!(wrapper.field_name(), "address");
        assert!(wrapper.field_type().is::<String>());
    }

    #[test]
    fn test_wrapper_access_and_construction() {
        let ty = TargetType::of::<Email>();
        let wrapper = ty.wrapper().unwrap();

        let email = Email("a@b.c".to_string());
        let inner = wrapper.inner(&email).unwrap();
        assert_eq!(inner.downcast_ref::<String>().map(String::as_str), Some("a@b.c"));

        let built = wrapper.construct(Box::new("x@y.z".to_string())).unwrap();
        assert_eq!(*built.downcast::<Email>().unwrap(), Email("x@y.z".to_string()));

        let rejected = wrapper.construct(Box::new("nope".to_string()));
        assert!(rejected.unwrap_err().to_string().contains("not an email"));

        let mistyped = wrapper.construct(Box::new(5i32));
        assert!(mistyped.unwrap_err().to_string().contains("String"));
    }

    #[test]
    fn test_equality_uses_identity() {
        assert_eq!(TargetType::of::<Email>(), TargetType::of::<Email>());
        assert_ne!(TargetType::of::<Email>(), TargetType::of::<String>());
    }

    #[test]
    fn test_with_unsigned_marks_type() {
        #[derive(Debug, PartialEq)]
        struct RawBits(i32);

        let ty = TargetType::from_parts::<RawBits>(Vec::new(), Kind::Opaque, None).with_unsigned(
            UnsignedWidth::U32,
            |raw: &RawBits| u64::from(raw.0 as u32),
            |bits| RawBits(bits as u32 as i32),
        );
        let unsigned = ty.unsigned().unwrap();
        assert_eq!(unsigned.width(), UnsignedWidth::U32);
        assert_eq!(unsigned.to_bits(&RawBits(-1)), Some(u64::from(u32::MAX)));
        let value = unsigned.from_bits(2_147_516_414).unwrap();
        assert_eq!(*value.downcast::<RawBits>().unwrap(), RawBits(-2_147_450_882));
        assert!(unsigned.from_bits(u64::from(u32::MAX) + 1).is_none());
    }
}

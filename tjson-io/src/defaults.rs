//! Default adapters
//!
//! Used when every chain entry declines a type. They cover the shapes the
//! engine understands natively: scalars, options, sequences, string-keyed
//! maps, records, and wrappers (encoded reflectively as a one-field object).
//! Bare unsigned integers have no default: the host number model is signed.

use serde_json::{Map, Number, Value};
use std::any::Any;
use std::str::FromStr;
use std::sync::Arc;
use tjson_codec::{unexpected_value, AdapterLookup, JsonAdapter, SharedAdapter};
use tjson_format::{
    AnyValue, BoxError, ConstructionError, FieldDescriptor, FieldValues, JsonError, JsonReader, Kind,
    LiteralError, MapDescriptor, NumberLiteral, OptionalDescriptor, RangeReason,
    RecordDescriptor, Result, Scalar, SequenceDescriptor, TargetType, Token, WrapperDescriptor,
};

/// Default adapter for `ty`, resolving delegates through `lookup`
pub(crate) fn default_adapter(
    ty: &TargetType,
    lookup: &dyn AdapterLookup,
    serialize_nulls: bool,
) -> Result<SharedAdapter> {
    let adapter: SharedAdapter = match ty.kind() {
        Kind::Scalar(scalar) => Arc::new(ScalarAdapter {
            ty: ty.clone(),
            scalar: *scalar,
            max_number_len: lookup.limits().max_number_len,
        }),
        Kind::Opaque => {
            if let Some(width) = ty.unsigned_width() {
                tracing::debug!(target_type = %ty, %width, "unsigned type without an unsigned codec");
            }
            return Err(JsonError::NoAdapter {
                type_name: ty.simple_name(),
            });
        }
        Kind::Optional(optional) => Arc::new(OptionalAdapter {
            ty: ty.clone(),
            optional: optional.clone(),
            inner: lookup.adapter_for(type_arg(ty)?)?,
        }),
        Kind::Sequence(sequence) => Arc::new(SequenceAdapter {
            ty: ty.clone(),
            sequence: sequence.clone(),
            element: lookup.adapter_for(type_arg(ty)?)?,
        }),
        Kind::Map(map) => Arc::new(MapAdapter {
            ty: ty.clone(),
            map: map.clone(),
            value: lookup.adapter_for(type_arg(ty)?)?,
            serialize_nulls,
        }),
        Kind::Record(record) => {
            let fields = record
                .fields()
                .iter()
                .map(|field| {
                    let codec = FieldCodec::new(field.name(), &field.field_type(), lookup)?;
                    Ok((field.clone(), codec))
                })
                .collect::<Result<Vec<_>>>()?;
            Arc::new(RecordAdapter {
                ty: ty.clone(),
                record: record.clone(),
                fields,
                serialize_nulls,
            })
        }
        Kind::Wrapper(wrapper) => Arc::new(ObjectWrapperAdapter {
            ty: ty.clone(),
            wrapper: wrapper.clone(),
            field: FieldCodec::new(wrapper.field_name(), &wrapper.field_type(), lookup)?,
            serialize_nulls,
        }),
    };
    Ok(adapter)
}

fn type_arg(ty: &TargetType) -> Result<&TargetType> {
    ty.args().first().ok_or_else(|| {
        JsonError::Internal(format!("{} declares no type argument", ty.simple_name()))
    })
}

fn construction_error(ty: &TargetType, reader: &JsonReader<'_>, source: BoxError) -> JsonError {
    ConstructionError {
        type_name: ty.simple_name(),
        value: reader.render(),
        path: reader.path().clone(),
        source,
    }
    .into()
}

// ---------------------------------------------------------------------------
// Scalars

struct ScalarAdapter {
    ty: TargetType,
    scalar: Scalar,
    max_number_len: usize,
}

impl ScalarAdapter {
    fn expected(&self) -> String {
        match self.scalar {
            Scalar::Bool => "a boolean".to_string(),
            Scalar::Str => "a string".to_string(),
            Scalar::F32 | Scalar::F64 => format!("a number ({})", self.ty),
            _ => format!("an integer ({})", self.ty),
        }
    }

    fn encode_float(&self, value: f64, text: String) -> Result<Value> {
        if !value.is_finite() {
            return Err(JsonError::Encode {
                type_name: self.ty.simple_name(),
                reason: format!("{} is not a finite number", value),
            });
        }
        Ok(Value::Number(Number::from_str(&text)?))
    }

    fn integer(&self, reader: &JsonReader<'_>) -> Result<i64> {
        let text = reader
            .number_text()
            .ok_or_else(|| reader.type_error(self.expected()))?;
        let literal = match NumberLiteral::parse_bounded(&text, self.max_number_len) {
            Ok(literal) => literal,
            Err(LiteralError::TooLong { len, max }) => {
                return Err(JsonError::LimitExceeded(format!(
                    "number literal of {} bytes exceeds {} bytes at {}",
                    len,
                    max,
                    reader.path()
                )))
            }
            Err(LiteralError::Range(reason)) => {
                return Err(reader.range_error(self.ty.simple_name(), reason))
            }
            Err(LiteralError::Malformed) => return Err(reader.type_error(self.expected())),
        };
        literal
            .to_i64()
            .map_err(|reason| reader.range_error(self.ty.simple_name(), reason))
    }

    fn narrow<T>(&self, reader: &JsonReader<'_>) -> Result<AnyValue>
    where
        T: TryFrom<i64> + Send + 'static,
    {
        let value = self.integer(reader)?;
        T::try_from(value)
            .map(|value| Box::new(value) as AnyValue)
            .map_err(|_| reader.range_error(self.ty.simple_name(), RangeReason::Overflow))
    }

    fn float(&self, reader: &JsonReader<'_>) -> Result<f64> {
        reader
            .value()
            .as_f64()
            .ok_or_else(|| reader.type_error(self.expected()))
    }
}

impl JsonAdapter for ScalarAdapter {
    fn name(&self) -> &'static str {
        "scalar"
    }

    fn encode(&self, value: &dyn Any) -> Result<Value> {
        let encoded = match self.scalar {
            Scalar::Bool => value.downcast_ref::<bool>().map(|&b| Value::Bool(b)),
            Scalar::I8 => value.downcast_ref::<i8>().map(|&n| Value::from(n)),
            Scalar::I16 => value.downcast_ref::<i16>().map(|&n| Value::from(n)),
            Scalar::I32 => value.downcast_ref::<i32>().map(|&n| Value::from(n)),
            Scalar::I64 => value.downcast_ref::<i64>().map(|&n| Value::from(n)),
            Scalar::F32 => {
                return match value.downcast_ref::<f32>() {
                    Some(&float) => self.encode_float(f64::from(float), format!("{:?}", float)),
                    None => Err(unexpected_value(self.name(), &self.ty)),
                };
            }
            Scalar::F64 => {
                return match value.downcast_ref::<f64>() {
                    Some(&float) => self.encode_float(float, format!("{:?}", float)),
                    None => Err(unexpected_value(self.name(), &self.ty)),
                };
            }
            Scalar::Str => value
                .downcast_ref::<String>()
                .map(|s| Value::String(s.clone())),
        };
        encoded.ok_or_else(|| unexpected_value(self.name(), &self.ty))
    }

    fn decode(&self, reader: &JsonReader<'_>) -> Result<AnyValue> {
        match self.scalar {
            Scalar::Bool => reader
                .value()
                .as_bool()
                .map(|b| Box::new(b) as AnyValue)
                .ok_or_else(|| reader.type_error(self.expected())),
            Scalar::I8 => self.narrow::<i8>(reader),
            Scalar::I16 => self.narrow::<i16>(reader),
            Scalar::I32 => self.narrow::<i32>(reader),
            Scalar::I64 => self.narrow::<i64>(reader),
            Scalar::F32 => {
                let value = self.float(reader)?;
                let narrowed = value as f32;
                if narrowed.is_infinite() {
                    return Err(reader.range_error(self.ty.simple_name(), RangeReason::Overflow));
                }
                Ok(Box::new(narrowed))
            }
            Scalar::F64 => Ok(Box::new(self.float(reader)?)),
            Scalar::Str => reader
                .value()
                .as_str()
                .map(|s| Box::new(s.to_string()) as AnyValue)
                .ok_or_else(|| reader.type_error(self.expected())),
        }
    }
}

// ---------------------------------------------------------------------------
// Containers

struct OptionalAdapter {
    ty: TargetType,
    optional: OptionalDescriptor,
    inner: SharedAdapter,
}

impl JsonAdapter for OptionalAdapter {
    fn name(&self) -> &'static str {
        "optional"
    }

    fn encode(&self, value: &dyn Any) -> Result<Value> {
        match self.optional.get(value) {
            Some(Some(inner)) => self.inner.encode(inner),
            Some(None) => Ok(Value::Null),
            None => Err(unexpected_value(self.name(), &self.ty)),
        }
    }

    fn decode(&self, reader: &JsonReader<'_>) -> Result<AnyValue> {
        if reader.is_null() {
            return Ok(self.optional.none());
        }
        let inner = self.inner.decode(reader)?;
        self.optional
            .some(inner)
            .ok_or_else(|| unexpected_value(self.name(), &self.ty))
    }
}

struct SequenceAdapter {
    ty: TargetType,
    sequence: SequenceDescriptor,
    element: SharedAdapter,
}

impl JsonAdapter for SequenceAdapter {
    fn name(&self) -> &'static str {
        "sequence"
    }

    fn encode(&self, value: &dyn Any) -> Result<Value> {
        let items = self
            .sequence
            .items(value)
            .ok_or_else(|| unexpected_value(self.name(), &self.ty))?;
        items
            .into_iter()
            .map(|item| self.element.encode(item))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array)
    }

    fn decode(&self, reader: &JsonReader<'_>) -> Result<AnyValue> {
        let elements = reader
            .elements()
            .ok_or_else(|| reader.type_error("an array"))?;
        let items = elements
            .map(|element| self.element.decode(&element))
            .collect::<Result<Vec<_>>>()?;
        self.sequence
            .collect(items)
            .ok_or_else(|| unexpected_value(self.name(), &self.ty))
    }
}

struct MapAdapter {
    ty: TargetType,
    map: MapDescriptor,
    value: SharedAdapter,
    serialize_nulls: bool,
}

impl JsonAdapter for MapAdapter {
    fn name(&self) -> &'static str {
        "map"
    }

    fn encode(&self, value: &dyn Any) -> Result<Value> {
        let entries = self
            .map
            .entries(value)
            .ok_or_else(|| unexpected_value(self.name(), &self.ty))?;
        let mut object = Map::with_capacity(entries.len());
        for (key, entry) in entries {
            let encoded = self.value.encode(entry)?;
            if encoded.is_null() && !self.serialize_nulls {
                continue;
            }
            object.insert(key.to_string(), encoded);
        }
        Ok(Value::Object(object))
    }

    fn decode(&self, reader: &JsonReader<'_>) -> Result<AnyValue> {
        let members = reader
            .entries()
            .ok_or_else(|| reader.type_error("an object"))?;
        let entries = members
            .map(|(key, member)| Ok((key.to_string(), self.value.decode(&member)?)))
            .collect::<Result<Vec<_>>>()?;
        self.map
            .collect(entries)
            .ok_or_else(|| unexpected_value(self.name(), &self.ty))
    }
}

// ---------------------------------------------------------------------------
// Records and reflective wrappers

/// Encoding of one named member of an object
struct FieldCodec {
    name: &'static str,
    adapter: SharedAdapter,
    /// Set when the field's type is an `Option`, which may be omitted
    absent: Option<OptionalDescriptor>,
}

impl FieldCodec {
    fn new(name: &'static str, field_type: &TargetType, lookup: &dyn AdapterLookup) -> Result<Self> {
        let absent = match field_type.kind() {
            Kind::Optional(optional) => Some(optional.clone()),
            _ => None,
        };
        Ok(Self {
            name,
            adapter: lookup.adapter_for(field_type)?,
            absent,
        })
    }

    fn encode_into(
        &self,
        object: &mut Map<String, Value>,
        value: &dyn Any,
        serialize_nulls: bool,
    ) -> Result<()> {
        let encoded = self.adapter.encode(value)?;
        if encoded.is_null() && self.absent.is_some() && !serialize_nulls {
            return Ok(());
        }
        object.insert(self.name.to_string(), encoded);
        Ok(())
    }

    fn decode_from(&self, object: &JsonReader<'_>) -> Result<AnyValue> {
        match object.field(self.name) {
            Some(member) => self.adapter.decode(&member),
            None => match &self.absent {
                Some(optional) => Ok(optional.none()),
                None => Err(JsonError::MissingField {
                    field: self.name.to_string(),
                    path: object.path().clone(),
                }),
            },
        }
    }
}

struct RecordAdapter {
    ty: TargetType,
    record: RecordDescriptor,
    fields: Vec<(FieldDescriptor, FieldCodec)>,
    serialize_nulls: bool,
}

impl JsonAdapter for RecordAdapter {
    fn name(&self) -> &'static str {
        "record"
    }

    fn encode(&self, value: &dyn Any) -> Result<Value> {
        let mut object = Map::with_capacity(self.fields.len());
        for (field, codec) in &self.fields {
            let member = field
                .get(value)
                .ok_or_else(|| unexpected_value(self.name(), &self.ty))?;
            codec.encode_into(&mut object, member, self.serialize_nulls)?;
        }
        Ok(Value::Object(object))
    }

    fn decode(&self, reader: &JsonReader<'_>) -> Result<AnyValue> {
        reader.expect(Token::Object, "an object")?;
        let mut values = FieldValues::new();
        for (field, codec) in &self.fields {
            values.insert(field.name(), codec.decode_from(reader)?);
        }
        self.record
            .construct(&mut values)
            .map_err(|source| construction_error(&self.ty, reader, source))
    }
}

/// A wrapper type seen without the wrapper codec: a record of one field
struct ObjectWrapperAdapter {
    ty: TargetType,
    wrapper: WrapperDescriptor,
    field: FieldCodec,
    serialize_nulls: bool,
}

impl JsonAdapter for ObjectWrapperAdapter {
    fn name(&self) -> &'static str {
        "object-wrapper"
    }

    fn encode(&self, value: &dyn Any) -> Result<Value> {
        let inner = self
            .wrapper
            .inner(value)
            .ok_or_else(|| unexpected_value(self.name(), &self.ty))?;
        let mut object = Map::with_capacity(1);
        self.field
            .encode_into(&mut object, inner, self.serialize_nulls)?;
        Ok(Value::Object(object))
    }

    fn decode(&self, reader: &JsonReader<'_>) -> Result<AnyValue> {
        reader.expect(Token::Object, "an object")?;
        let inner = self.field.decode_from(reader)?;
        self.wrapper
            .construct(inner)
            .map_err(|source| construction_error(&self.ty, reader, source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Engine;
    use serde_json::json;

    fn decode_with<T: tjson_format::Reflect>(engine: &Engine, value: Value) -> Result<T> {
        engine.from_value::<T>(&value)
    }

    #[test]
    fn test_signed_integers_use_exact_literals() {
        let engine = Engine::standard();
        assert_eq!(decode_with::<i32>(&engine, json!(10)).unwrap(), 10);
        assert_eq!(decode_with::<i64>(&engine, json!(5.0)).unwrap(), 5);
        assert_eq!(decode_with::<i8>(&engine, json!(-128)).unwrap(), -128);

        match decode_with::<i8>(&engine, json!(128)) {
            Err(JsonError::Range(err)) => {
                assert_eq!(err.reason, RangeReason::Overflow);
                assert_eq!(err.detail, "128");
            }
            other => panic!("unexpected result {:?}", other.map(|_| ())),
        }
        assert!(matches!(
            decode_with::<i32>(&engine, json!(0.5)),
            Err(JsonError::Range(err)) if err.reason == RangeReason::Fractional
        ));
    }

    #[test]
    fn test_floats_encode_with_decimal_point() {
        let engine = Engine::standard();
        assert_eq!(engine.to_string(&0.5f64).unwrap(), "0.5");
        assert_eq!(engine.to_string(&1.0f64).unwrap(), "1.0");
        assert_eq!(engine.to_string(&0.1f32).unwrap(), "0.1");
        assert_eq!(decode_with::<f64>(&engine, json!(0.5)).unwrap(), 0.5);
    }

    #[test]
    fn test_non_finite_floats_rejected() {
        let engine = Engine::standard();
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                engine.to_value(&value),
                Err(JsonError::Encode { .. })
            ));
        }
    }

    #[test]
    fn test_scalar_type_mismatch() {
        let engine = Engine::standard();
        let err = decode_with::<String>(&engine, json!(5)).err().unwrap();
        assert_eq!(
            err.to_string(),
            "Expected a string but was 5, a NUMBER, at path $"
        );
        assert!(matches!(
            decode_with::<bool>(&engine, json!("true")),
            Err(JsonError::Type(_))
        ));
    }

    #[test]
    fn test_bare_unsigned_has_no_default() {
        let engine = Engine::standard();
        assert!(matches!(
            engine.to_value(&5u32),
            Err(JsonError::NoAdapter { type_name }) if type_name == "u32"
        ));
    }

    #[test]
    fn test_sequence_element_errors_carry_index() {
        let engine = Engine::standard();
        let err = decode_with::<Vec<i32>>(&engine, json!([1, "two", 3]))
            .err()
            .unwrap();
        assert_eq!(err.path().map(ToString::to_string).as_deref(), Some("$[1]"));
    }

    #[test]
    fn test_map_null_entries_omitted_unless_configured() {
        let mut map = std::collections::BTreeMap::new();
        map.insert("first".to_string(), Some(1i32));
        map.insert("missing".to_string(), None);

        let engine = Engine::standard();
        assert_eq!(engine.to_string(&map).unwrap(), r#"{"first":1}"#);

        let keeps_nulls = Engine::builder()
            .options(crate::EngineOptions {
                serialize_nulls: true,
                ..Default::default()
            })
            .build()
            .unwrap();
        assert_eq!(
            keeps_nulls.to_string(&map).unwrap(),
            r#"{"first":1,"missing":null}"#
        );
    }
}

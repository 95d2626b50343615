//! Sample models and the values/literals the comparison runs over

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Debug;
use tjson_io::{reflect_transparent, BoxError, Engine, Reflect, TargetType, Transparent};

macro_rules! transparent {
    ($(#[$meta:meta])* $name:ident($inner:ty) as $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name(pub $inner);

        impl Transparent for $name {
            type Inner = $inner;
            const FIELD: &'static str = $field;

            fn inner(&self) -> &$inner {
                &self.0
            }

            fn from_inner(inner: $inner) -> Result<Self, BoxError> {
                Ok($name(inner))
            }
        }

        reflect_transparent!($name);
    };
}

transparent!(Label(String) as "value");
transparent!(Count(i32) as "value");
transparent!(Ratio(f64) as "value");
transparent!(Inline(Nested) as "value");
transparent!(IntList(Vec<i32>) as "list");
transparent!(SparseCounts(BTreeMap<String, Option<i32>>) as "map");
transparent!(InlineByKey(BTreeMap<String, Inline>) as "parameterizedValue");
transparent!(InlineCollections(Collections) as "value");
transparent!(MaybeLabel(Option<String>) as "value");
transparent!(
    /// Wrapper over an unsigned value: numeric only when both codecs run
    UnsignedId(u32) as "unsignedValue"
);

impl Label {
    /// Label built from two parts
    pub fn joined(base: &str, appended: &str) -> Self {
        Label(format!("{}{}", base, appended))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Nested {
    pub string_value: String,
    pub int_value: i32,
}

impl Reflect for Nested {
    fn target_type() -> TargetType {
        TargetType::record::<Self>()
            .field("stringValue", |n: &Self| &n.string_value)
            .field("intValue", |n: &Self| &n.int_value)
            .build(|fields| {
                Ok(Nested {
                    string_value: fields.take("stringValue")?,
                    int_value: fields.take("intValue")?,
                })
            })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Collections {
    pub strings: Vec<String>,
    pub ints: Vec<i32>,
}

impl Reflect for Collections {
    fn target_type() -> TargetType {
        TargetType::record::<Self>()
            .field("strings", |c: &Self| &c.strings)
            .field("ints", |c: &Self| &c.ints)
            .build(|fields| {
                Ok(Collections {
                    strings: fields.take("strings")?,
                    ints: fields.take("ints")?,
                })
            })
    }
}

macro_rules! single_field_record {
    ($name:ident { $field:ident: $ty:ty } as $json:literal) => {
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            pub $field: $ty,
        }

        impl Reflect for $name {
            fn target_type() -> TargetType {
                TargetType::record::<Self>()
                    .field($json, |r: &Self| &r.$field)
                    .build(|fields| {
                        Ok($name {
                            $field: fields.take($json)?,
                        })
                    })
            }
        }
    };
}

single_field_record!(WithULong { u_long: u64 } as "uLong");
single_field_record!(WithUInt { u_int: u32 } as "uInt");
single_field_record!(WithUShort { u_short: u16 } as "uShort");
single_field_record!(WithUByte { u_byte: u8 } as "uByte");

#[derive(Debug, Clone, PartialEq)]
pub struct WithUIntAndString {
    pub string_value: String,
    pub unsigned_value: u32,
}

impl Reflect for WithUIntAndString {
    fn target_type() -> TargetType {
        TargetType::record::<Self>()
            .field("stringValue", |r: &Self| &r.string_value)
            .field("unsignedValue", |r: &Self| &r.unsigned_value)
            .build(|fields| {
                Ok(WithUIntAndString {
                    string_value: fields.take("stringValue")?,
                    unsigned_value: fields.take("unsignedValue")?,
                })
            })
    }
}

/// Result of one decode or encode attempt
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "output", rename_all = "lowercase")]
pub enum Attempt {
    /// Rendered value or JSON text
    Ok(String),
    /// Error message, on one line
    Error(String),
}

impl Attempt {
    fn from_result<T, E: std::fmt::Display>(result: Result<T, E>, render: impl FnOnce(T) -> String) -> Self {
        match result {
            Ok(value) => Attempt::Ok(render(value)),
            Err(err) => Attempt::Error(err.to_string().replace('\n', " ")),
        }
    }

    /// True for [`Attempt::Ok`]
    pub fn is_ok(&self) -> bool {
        matches!(self, Attempt::Ok(_))
    }

    /// The output or error message
    pub fn text(&self) -> &str {
        match self {
            Attempt::Ok(text) | Attempt::Error(text) => text,
        }
    }
}

/// Decode and encode results of one engine
#[derive(Debug, Clone, Serialize)]
pub struct Outcome {
    pub decoded: Attempt,
    pub encoded: Attempt,
}

/// One sample run through both engines
#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub type_name: String,
    pub json: String,
    pub value: String,
    pub standard: Outcome,
    pub extended: Outcome,
}

/// A value paired with the JSON literal it should correspond to
pub struct Sample {
    type_name: String,
    json: String,
    value: String,
    run: Box<dyn Fn(&Engine, &str) -> Outcome>,
}

impl Sample {
    fn new<T: Reflect + Debug>(value: T, json: impl Into<String>) -> Self {
        let rendered = format!("{:?}", value);
        Self {
            type_name: TargetType::of::<T>().simple_name(),
            json: json.into(),
            value: rendered,
            run: Box::new(move |engine: &Engine, json: &str| Outcome {
                decoded: Attempt::from_result(engine.from_str::<T>(json), |decoded| {
                    format!("{:?}", decoded)
                }),
                encoded: Attempt::from_result(engine.to_string(&value), |text| text),
            }),
        }
    }

    /// Run the sample through both engines
    pub fn compare(&self, standard: &Engine, extended: &Engine) -> Comparison {
        tracing::debug!(sample = %self.type_name, "comparing engines");
        Comparison {
            type_name: self.type_name.clone(),
            json: self.json.clone(),
            value: self.value.clone(),
            standard: (self.run)(standard, &self.json),
            extended: (self.run)(extended, &self.json),
        }
    }
}

fn nested() -> Nested {
    Nested {
        string_value: "a string".to_string(),
        int_value: 10,
    }
}

/// Every sample, in presentation order
pub fn catalog() -> Vec<Sample> {
    let u_int: u32 = i32::MAX as u32 + i16::MAX as u32;
    let u_long: u64 = i64::MAX as u64 + i32::MAX as u64;
    let u_short: u16 = i16::MAX as u16 + i8::MAX as u16;
    let u_byte: u8 = i8::MAX as u8 + 10;

    let mut sparse = BTreeMap::new();
    sparse.insert("first".to_string(), Some(1));
    sparse.insert("missing".to_string(), None);

    let mut by_key = BTreeMap::new();
    by_key.insert("key".to_string(), Inline(nested()));

    vec![
        Sample::new(Label("exampleValue".to_string()), r#""exampleValue""#),
        Sample::new(Count(10), "10"),
        Sample::new(Ratio(0.5), "0.5"),
        Sample::new(Inline(nested()), r#"{"stringValue":"a string","intValue":10}"#),
        Sample::new(IntList(vec![0, 2, 99]), "[0,2,99]"),
        Sample::new(SparseCounts(sparse), r#"{"first":1,"missing":null}"#),
        Sample::new(
            InlineByKey(by_key),
            r#"{"key":{"stringValue":"a string","intValue":10}}"#,
        ),
        Sample::new(Label::joined("base", "Appended"), r#""baseAppended""#),
        Sample::new(MaybeLabel(Some("notNull".to_string())), r#""notNull""#),
        Sample::new(MaybeLabel(None), "null"),
        Sample::new(
            InlineCollections(Collections {
                strings: vec!["i".into(), "have".into(), "strings".into()],
                ints: vec![5, 10],
            }),
            r#"{"strings":["i","have","strings"],"ints":[5,10]}"#,
        ),
        Sample::new(UnsignedId(99), "99"),
        Sample::new(WithULong { u_long }, format!(r#"{{"uLong":{}}}"#, u_long)),
        Sample::new(WithUInt { u_int }, format!(r#"{{"uInt":{}}}"#, u_int)),
        Sample::new(WithUShort { u_short }, format!(r#"{{"uShort":{}}}"#, u_short)),
        Sample::new(WithUByte { u_byte }, format!(r#"{{"uByte":{}}}"#, u_byte)),
        Sample::new(
            WithUIntAndString {
                string_value: "foo".to_string(),
                unsigned_value: u_int,
            },
            format!(r#"{{"stringValue":"foo","unsignedValue":{}}}"#, u_int),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comparisons() -> Vec<Comparison> {
        let standard = Engine::standard();
        let extended = Engine::with_extensions();
        catalog()
            .iter()
            .map(|sample| sample.compare(&standard, &extended))
            .collect()
    }

    #[test]
    fn test_extended_engine_handles_every_sample() {
        for comparison in comparisons() {
            assert!(
                comparison.extended.decoded.is_ok(),
                "{}: {}",
                comparison.type_name,
                comparison.extended.decoded.text()
            );
            assert!(comparison.extended.encoded.is_ok(), "{}", comparison.type_name);
        }
    }

    #[test]
    fn test_extended_encoding_matches_literal() {
        for comparison in comparisons() {
            let expected = if comparison.type_name == "SparseCounts" {
                r#"{"first":1}"#.to_string()
            } else {
                comparison.json.clone()
            };
            assert_eq!(comparison.extended.encoded.text(), expected);
        }
    }

    #[test]
    fn test_standard_engine_fails_on_unsigned_and_bare_wrappers() {
        let comparisons = comparisons();
        let find = |name: &str| {
            comparisons
                .iter()
                .find(|c| c.type_name == name)
                .unwrap_or_else(|| panic!("no sample named {}", name))
        };

        let u_long = find("WithULong");
        assert!(!u_long.standard.decoded.is_ok());
        assert!(u_long.standard.decoded.text().contains("u64"));

        let label = find("Label");
        assert!(!label.standard.decoded.is_ok());
        assert_eq!(label.standard.encoded.text(), r#"{"value":"exampleValue"}"#);
    }

    #[test]
    fn test_sample_values() {
        assert_eq!(i32::MAX as u32 + i16::MAX as u32, 2_147_516_414);
        assert_eq!(i64::MAX as u64 + i32::MAX as u64, 9_223_372_039_002_259_454);
        assert_eq!(catalog().len(), 17);
    }
}

//! Sample models shared by the integration tests
#![allow(dead_code)]

use std::collections::BTreeMap;
use tjson_io::{reflect_transparent, BoxError, Reflect, TargetType, Transparent};

macro_rules! transparent {
    ($name:ident($inner:ty) as $field:literal) => {
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
transparent!(UnsignedId(u32) as "unsignedValue");

/// Wrapper whose constructor rejects blank input
#[derive(Debug, Clone, PartialEq)]
pub struct NonBlank(pub String);

impl Transparent for NonBlank {
    type Inner = String;

    fn inner(&self) -> &String {
        &self.0
    }

    fn from_inner(inner: String) -> Result<Self, BoxError> {
        if inner.trim().is_empty() {
            return Err("value must not be blank".into());
        }
        Ok(NonBlank(inner))
    }
}

reflect_transparent!(NonBlank);

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

macro_rules! unsigned_record {
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

unsigned_record!(WithUByte { u_byte: u8 } as "uByte");
unsigned_record!(WithUShort { u_short: u16 } as "uShort");
unsigned_record!(WithUInt { u_int: u32 } as "uInt");
unsigned_record!(WithULong { u_long: u64 } as "uLong");
unsigned_record!(WithOptionalULong { u_long: Option<u64> } as "uLong");

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

/// Holds wrapper fields, one nullable
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub name: NonBlank,
    pub nickname: Option<Label>,
}

impl Reflect for Profile {
    fn target_type() -> TargetType {
        TargetType::record::<Self>()
            .field("name", |p: &Self| &p.name)
            .field("nickname", |p: &Self| &p.nickname)
            .build(|fields| {
                Ok(Profile {
                    name: fields.take("name")?,
                    nickname: fields.take("nickname")?,
                })
            })
    }
}

/// Tree whose children are of its own type
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub children: Vec<Node>,
}

impl Node {
    pub fn leaf(name: &str) -> Self {
        Node {
            name: name.to_string(),
            children: Vec::new(),
        }
    }
}

impl Reflect for Node {
    fn target_type() -> TargetType {
        TargetType::record::<Self>()
            .field("name", |n: &Self| &n.name)
            .field("children", |n: &Self| &n.children)
            .build(|fields| {
                Ok(Node {
                    name: fields.take("name")?,
                    children: fields.take("children")?,
                })
            })
    }
}

transparent!(Forest(Vec<Tree>) as "trees");

/// Recursion that passes through a wrapper
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    pub label: Label,
    pub forest: Forest,
}

impl Reflect for Tree {
    fn target_type() -> TargetType {
        TargetType::record::<Self>()
            .field("label", |t: &Self| &t.label)
            .field("forest", |t: &Self| &t.forest)
            .build(|fields| {
                Ok(Tree {
                    label: fields.take("label")?,
                    forest: fields.take("forest")?,
                })
            })
    }
}

/// Signed carrier that is structurally a wrapper but holds a u32 bit pattern
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawU32(pub i32);

impl Transparent for RawU32 {
    type Inner = i32;

    fn inner(&self) -> &i32 {
        &self.0
    }

    fn from_inner(inner: i32) -> Result<Self, BoxError> {
        Ok(RawU32(inner))
    }
}

impl Reflect for RawU32 {
    fn target_type() -> TargetType {
        TargetType::transparent::<Self>().with_unsigned(
            tjson_io::UnsignedWidth::U32,
            |raw: &Self| u64::from(raw.0 as u32),
            |bits| RawU32(bits as u32 as i32),
        )
    }
}

pub const U_BYTE: u8 = 137;
pub const U_SHORT: u16 = 32_894;
pub const U_INT: u32 = 2_147_516_414;
pub const U_LONG: u64 = 9_223_372_039_002_259_454;

//! [`Reflect`] implementations for standard library types

use crate::reflect::{
    AnyValue, Kind, MapAccess, MapDescriptor, OptionalAccess, OptionalDescriptor, Reflect, Scalar,
    SequenceAccess, SequenceDescriptor, TargetType, UnsignedAccess, UnsignedDescriptor,
};
use crate::unsigned::UnsignedWidth;
use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::marker::PhantomData;
use std::sync::Arc;

macro_rules! reflect_scalar {
    ($($ty:ty => $scalar:ident),+ $(,)?) => {
        $(
            impl Reflect for $ty {
                fn target_type() -> TargetType {
                    TargetType::from_parts::<$ty>(Vec::new(), Kind::Scalar(Scalar::$scalar), None)
                }
            }
        )+
    };
}

reflect_scalar! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    f32 => F32,
    f64 => F64,
    String => Str,
}

struct PrimitiveBits<T>(PhantomData<fn() -> T>);

impl<T> UnsignedAccess for PrimitiveBits<T>
where
    T: Copy + Into<u64> + TryFrom<u64> + Send + 'static,
{
    fn to_bits(&self, value: &dyn Any) -> Option<u64> {
        value.downcast_ref::<T>().map(|&v| v.into())
    }

    fn from_bits(&self, bits: u64) -> Option<AnyValue> {
        T::try_from(bits).ok().map(|v| Box::new(v) as AnyValue)
    }
}

macro_rules! reflect_unsigned {
    ($($ty:ty => $width:ident),+ $(,)?) => {
        $(
            impl Reflect for $ty {
                fn target_type() -> TargetType {
                    let unsigned = UnsignedDescriptor::new(
                        UnsignedWidth::$width,
                        Arc::new(PrimitiveBits::<$ty>(PhantomData)),
                    );
                    TargetType::from_parts::<$ty>(Vec::new(), Kind::Opaque, Some(unsigned))
                }
            }
        )+
    };
}

reflect_unsigned! {
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
}

struct OptionOf<T>(PhantomData<fn() -> T>);

impl<T: Reflect> OptionalAccess for OptionOf<T> {
    fn get<'a>(&self, value: &'a dyn Any) -> Option<Option<&'a dyn Any>> {
        value
            .downcast_ref::<Option<T>>()
            .map(|option| option.as_ref().map(|inner| inner as &dyn Any))
    }

    fn some(&self, inner: AnyValue) -> Option<AnyValue> {
        let inner = inner.downcast::<T>().ok()?;
        Some(Box::new(Some(*inner)))
    }

    fn none(&self) -> AnyValue {
        Box::new(None::<T>)
    }
}

impl<T: Reflect> Reflect for Option<T> {
    fn target_type() -> TargetType {
        let optional = OptionalDescriptor::new(Arc::new(OptionOf::<T>(PhantomData)));
        TargetType::from_parts::<Option<T>>(
            vec![T::target_type()],
            Kind::Optional(optional),
            None,
        )
    }
}

struct VecOf<T>(PhantomData<fn() -> T>);

impl<T: Reflect> SequenceAccess for VecOf<T> {
    fn items<'a>(&self, value: &'a dyn Any) -> Option<Vec<&'a dyn Any>> {
        value
            .downcast_ref::<Vec<T>>()
            .map(|items| items.iter().map(|item| item as &dyn Any).collect())
    }

    fn collect(&self, items: Vec<AnyValue>) -> Option<AnyValue> {
        let items = items
            .into_iter()
            .map(|item| item.downcast::<T>().ok().map(|item| *item))
            .collect::<Option<Vec<T>>>()?;
        Some(Box::new(items))
    }
}

impl<T: Reflect> Reflect for Vec<T> {
    fn target_type() -> TargetType {
        let sequence = SequenceDescriptor::new(Arc::new(VecOf::<T>(PhantomData)));
        TargetType::from_parts::<Vec<T>>(vec![T::target_type()], Kind::Sequence(sequence), None)
    }
}

struct BTreeMapOf<V>(PhantomData<fn() -> V>);

impl<V: Reflect> MapAccess for BTreeMapOf<V> {
    fn entries<'a>(&self, value: &'a dyn Any) -> Option<Vec<(&'a str, &'a dyn Any)>> {
        value.downcast_ref::<BTreeMap<String, V>>().map(|map| {
            map.iter()
                .map(|(key, value)| (key.as_str(), value as &dyn Any))
                .collect()
        })
    }

    fn collect(&self, entries: Vec<(String, AnyValue)>) -> Option<AnyValue> {
        let map = entries
            .into_iter()
            .map(|(key, value)| value.downcast::<V>().ok().map(|value| (key, *value)))
            .collect::<Option<BTreeMap<String, V>>>()?;
        Some(Box::new(map))
    }
}

impl<V: Reflect> Reflect for BTreeMap<String, V> {
    fn target_type() -> TargetType {
        let map = MapDescriptor::new(Arc::new(BTreeMapOf::<V>(PhantomData)));
        TargetType::from_parts::<BTreeMap<String, V>>(vec![V::target_type()], Kind::Map(map), None)
    }
}

struct HashMapOf<V>(PhantomData<fn() -> V>);

impl<V: Reflect> MapAccess for HashMapOf<V> {
    fn entries<'a>(&self, value: &'a dyn Any) -> Option<Vec<(&'a str, &'a dyn Any)>> {
        value.downcast_ref::<HashMap<String, V>>().map(|map| {
            let mut entries: Vec<(&'a str, &'a dyn Any)> = map
                .iter()
                .map(|(key, value)| (key.as_str(), value as &dyn Any))
                .collect();
            // hash order is not stable across runs
            entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
            entries
        })
    }

    fn collect(&self, entries: Vec<(String, AnyValue)>) -> Option<AnyValue> {
        let map = entries
            .into_iter()
            .map(|(key, value)| value.downcast::<V>().ok().map(|value| (key, *value)))
            .collect::<Option<HashMap<String, V>>>()?;
        Some(Box::new(map))
    }
}

impl<V: Reflect> Reflect for HashMap<String, V> {
    fn target_type() -> TargetType {
        let map = MapDescriptor::new(Arc::new(HashMapOf::<V>(PhantomData)));
        TargetType::from_parts::<HashMap<String, V>>(vec![V::target_type()], Kind::Map(map), None)
    }
}

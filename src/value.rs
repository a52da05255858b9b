//! Owned values for the document model.
//!
//! Every integer width loads as [`Value::Int`], and [`Value::wire_type`] picks the narrowest
//! width again when writing. Conversions go both ways through `From` and `TryFrom`.
//!
//! ```
//! # use bflat::Value;
//! # use std::convert::TryFrom;
//! let value = Value::from(300u16);
//! assert_eq!(value.wire_type(), Some(bflat::Type::Int16));
//! assert_eq!(u8::try_from(value.clone()), Err(value));
//! ```

use std::borrow::Cow;
use std::convert::TryFrom;
use std::fmt;
use std::ops::Index;

use serde::de::{self, Deserialize, Deserializer, SeqAccess, Visitor};
use serde::Serialize;

use crate::marker::Type;

/// An owned value, as loaded into or dumped from a [`Document`](crate::Document).
///
/// All integer types load as [`Value::Int`]. Arrays are flat: an array may hold a mix of
/// element kinds but never another array.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Int(i64),
    Double(f64),
    String(String),
    Binary(Vec<u8>),
    Array(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_int(&self) -> bool {
        matches!(self, Value::Int(_))
    }

    pub fn is_double(&self) -> bool {
        matches!(self, Value::Double(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, Value::Binary(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    pub fn as_i64(&self) -> Option<i64> {
        if let Value::Int(v) = self {
            Some(*v)
        } else {
            None
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        if let Value::Double(v) = self {
            Some(*v)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        if let Value::String(v) = self {
            Some(v)
        } else {
            None
        }
    }

    pub fn as_slice(&self) -> Option<&[u8]> {
        if let Value::Binary(v) = self {
            Some(v)
        } else {
            None
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        if let Value::Array(v) = self {
            Some(v)
        } else {
            None
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Vec<Value>> {
        if let Value::Array(v) = self {
            Some(v)
        } else {
            None
        }
    }

    /// The wire type this value is written as on its own. Integers get the narrowest fixed width
    /// that holds them. Arrays have no single element type and return `None`.
    pub fn wire_type(&self) -> Option<Type> {
        Some(match *self {
            Value::Null => Type::Null,
            Value::Int(v) => int_type(v, v),
            Value::Double(_) => Type::Double,
            Value::String(_) => Type::String,
            Value::Binary(_) => Type::Binary,
            Value::Array(_) => return None,
        })
    }
}

/// Narrowest fixed-width integer type holding everything from `min` to `max`.
pub(crate) fn int_type(min: i64, max: i64) -> Type {
    let fits = |lo: i64, hi: i64| min >= lo && max <= hi;
    if fits(i8::MIN.into(), i8::MAX.into()) {
        Type::Int8
    } else if fits(i16::MIN.into(), i16::MAX.into()) {
        Type::Int16
    } else if fits(i32::MIN.into(), i32::MAX.into()) {
        Type::Int32
    } else {
        Type::Int64
    }
}

/// Indexing past the end, or into anything but an array, yields `Null`.
impl Index<usize> for Value {
    type Output = Value;

    fn index(&self, index: usize) -> &Value {
        const NULL: &Value = &Value::Null;
        self.as_array()
            .and_then(|items| items.get(index))
            .unwrap_or(NULL)
    }
}

macro_rules! int_conversions {
    ($($t:ty),*) => {$(
        impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Int(v.into())
            }
        }

        impl TryFrom<Value> for $t {
            type Error = Value;
            fn try_from(value: Value) -> Result<Self, Value> {
                value
                    .as_i64()
                    .and_then(|v| <$t>::try_from(v).ok())
                    .ok_or(value)
            }
        }
    )*};
}

int_conversions!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Int(v.into())
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Double(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<Cow<'_, str>> for Value {
    fn from(v: Cow<'_, str>) -> Self {
        Value::String(v.into_owned())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Binary(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Binary(v.to_vec())
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

impl<V: Into<Value>> From<Option<V>> for Value {
    fn from(v: Option<V>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl<V: Into<Value>> std::iter::FromIterator<V> for Value {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Value::Array(iter.into_iter().map(Into::into).collect())
    }
}

impl TryFrom<Value> for f64 {
    type Error = Value;
    fn try_from(value: Value) -> Result<Self, Value> {
        value.as_f64().ok_or(value)
    }
}

impl TryFrom<Value> for String {
    type Error = Value;
    fn try_from(value: Value) -> Result<Self, Value> {
        match value {
            Value::String(v) => Ok(v),
            other => Err(other),
        }
    }
}

impl TryFrom<Value> for Vec<u8> {
    type Error = Value;
    fn try_from(value: Value) -> Result<Self, Value> {
        match value {
            Value::Binary(v) => Ok(v),
            other => Err(other),
        }
    }
}

impl TryFrom<Value> for Vec<Value> {
    type Error = Value;
    fn try_from(value: Value) -> Result<Self, Value> {
        match value {
            Value::Array(v) => Ok(v),
            other => Err(other),
        }
    }
}

impl serde::Serialize for Value {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Int(v) => serializer.serialize_i64(*v),
            Value::Double(v) => serializer.serialize_f64(*v),
            Value::String(v) => serializer.serialize_str(v),
            Value::Binary(v) => serde_bytes::Bytes::new(v).serialize(serializer),
            Value::Array(items) => serializer.collect_seq(items),
        }
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a null, integer, double, string, byte string, or flat sequence")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
        Ok(v.into())
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
        Ok(Value::Int(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
        match i64::try_from(v) {
            Ok(v) => Ok(Value::Int(v)),
            Err(_) => Err(E::invalid_value(de::Unexpected::Unsigned(v), &self)),
        }
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
        Ok(Value::Double(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        Ok(v.into())
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
        Ok(v.into())
    }

    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Value, E> {
        Ok(v.into())
    }

    fn visit_byte_buf<E: de::Error>(self, v: Vec<u8>) -> Result<Value, E> {
        Ok(v.into())
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<Value, A::Error> {
        // Don't trust the hint past a few thousand elements
        let mut items = Vec::with_capacity(access.size_hint().unwrap_or(0).min(4096));
        while let Some(item) = access.next_element()? {
            items.push(item);
        }
        Ok(Value::Array(items))
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn conversions() {
        assert_eq!(Value::from(true), Value::Int(1));
        assert_eq!(Value::from(-3i8), Value::Int(-3));
        assert_eq!(Value::from(u32::MAX), Value::Int(4294967295));
        assert_eq!(Value::from("hi"), Value::String("hi".into()));
        assert_eq!(Value::from(&b"\x00\x01"[..]), Value::Binary(vec![0, 1]));
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(
            vec![1, 2].into_iter().collect::<Value>(),
            Value::Array(vec![Value::Int(1), Value::Int(2)])
        );
        assert_eq!(u8::try_from(Value::Int(255)), Ok(255));
        assert_eq!(u8::try_from(Value::Int(256)), Err(Value::Int(256)));
        assert_eq!(String::try_from(Value::Null), Err(Value::Null));
        assert_eq!(f64::try_from(Value::Double(0.5)), Ok(0.5));
    }

    #[test]
    fn accessors() {
        let value = Value::Array(vec![Value::Int(1), Value::from("a"), Value::Double(2.0)]);
        assert!(value.is_array());
        assert_eq!(value[0].as_i64(), Some(1));
        assert_eq!(value[1].as_str(), Some("a"));
        assert_eq!(value[2].as_f64(), Some(2.0));
        assert!(value[3].is_null(), "Out of range index should give Null");
        assert!(Value::Int(1)[0].is_null());
        assert_eq!(value.wire_type(), None);
    }

    #[test]
    fn narrowest_int() {
        let cases = [
            (0, Type::Int8),
            (-128, Type::Int8),
            (127, Type::Int8),
            (128, Type::Int16),
            (-129, Type::Int16),
            (32767, Type::Int16),
            (32768, Type::Int32),
            (i32::MIN as i64, Type::Int32),
            (i32::MAX as i64 + 1, Type::Int64),
            (i64::MIN, Type::Int64),
        ];
        for (index, (v, ty)) in cases.iter().enumerate() {
            println!("Test #{}: {}", index, v);
            assert_eq!(Value::Int(*v).wire_type(), Some(*ty));
        }
        assert_eq!(int_type(-1, 200), Type::Int16);
        assert_eq!(int_type(-100_000, 5), Type::Int32);
    }

    #[test]
    fn json_roundtrip() {
        let value = Value::Array(vec![
            Value::Null,
            Value::Int(-5),
            Value::Double(1.5),
            Value::from("text"),
        ]);
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"[null,-5,1.5,"text"]"#);
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);

        let bin = serde_json::to_string(&Value::Binary(vec![1, 2])).unwrap();
        assert_eq!(bin, "[1,2]");
        assert!(serde_json::from_str::<Value>("18446744073709551615").is_err());
        assert_eq!(serde_json::from_str::<Value>("true").unwrap(), Value::Int(1));
    }
}

//! Owned documents: load a whole buffer into memory, or build one up and dump it.
//!
//! A [`Document`] is an ordered list of `(tag, value)` fields. It trades the zero-copy decoder's
//! speed for convenience, and it picks encodings on its own:
//!
//! - Integers are written with the narrowest fixed width that holds them.
//! - An array holding several kinds of element is split into runs of one kind, each written as
//!   its own array entry under the same tag. Integer runs are narrowed together.
//! - An empty array is a Null array with no elements.
//!
//! Loading undoes the splitting: a tag that shows up more than once turns into one array holding
//! everything written under it, in order.
//!
//! ```
//! # use bflat::{Document, Value};
//! # fn main() -> bflat::Result<()> {
//! let mut doc = Document::new();
//! doc.insert("id", 7);
//! doc.insert("mixed", vec![Value::from(1), Value::from(1000), Value::from("x")]);
//! let bytes = doc.to_bytes()?;
//! assert_eq!(bytes.len(), doc.encoded_len()?);
//! assert_eq!(Document::from_bytes(&bytes)?, doc);
//! # Ok(())
//! # }
//! ```

use std::fmt;

use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::error::{Error, Result};
use crate::marker::Type;
use crate::value::{int_type, Value};

/// An ordered set of tagged values.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    fields: Vec<(String, Value)>,
}

/// A run of same-kind array elements, written as one array entry.
struct Run<'v> {
    ty: Type,
    items: &'v [Value],
}

/// Split an array into runs that can each be written with a single element type.
fn runs(items: &[Value]) -> Result<Vec<Run>> {
    let mut runs = Vec::new();
    let mut start = 0;
    while start < items.len() {
        let kind = element_kind(&items[start])?;
        let mut end = start + 1;
        while end < items.len() && element_kind(&items[end])? == kind {
            end += 1;
        }
        let items = &items[start..end];
        let ty = if kind == Type::Int64 {
            let ints = items.iter().filter_map(Value::as_i64);
            let min = ints.clone().min().unwrap_or(0);
            let max = ints.max().unwrap_or(0);
            int_type(min, max)
        } else {
            kind
        };
        runs.push(Run { ty, items });
        start = end;
    }
    Ok(runs)
}

/// Element type before integer narrowing. Every integer counts as Int64 here.
fn element_kind(value: &Value) -> Result<Type> {
    Ok(match *value {
        Value::Null => Type::Null,
        Value::Int(_) => Type::Int64,
        Value::Double(_) => Type::Double,
        Value::String(_) => Type::String,
        Value::Binary(_) => Type::Binary,
        Value::Array(_) => return Err(Error::Nested),
    })
}

fn element_len(ty: Type, value: &Value) -> usize {
    match *value {
        Value::String(ref v) => Encoder::string_size(v.len()),
        Value::Binary(ref v) => Encoder::string_size(v.len()),
        _ => ty.width().unwrap_or(0),
    }
}

fn write_element(enc: &mut Encoder, ty: Type, value: &Value) -> Result<()> {
    match *value {
        Value::Null => (),
        // Narrowing was decided from the run's own min and max, so these casts never truncate
        Value::Int(v) => match ty {
            Type::Int8 => {
                enc.append_int8(v as i8)?;
            }
            Type::Int16 => {
                enc.append_int16(v as i16)?;
            }
            Type::Int32 => {
                enc.append_int32(v as i32)?;
            }
            _ => {
                enc.append_int64(v)?;
            }
        },
        Value::Double(v) => {
            enc.append_double(v)?;
        }
        Value::String(ref v) => {
            enc.append_string(v.as_str())?;
        }
        Value::Binary(ref v) => {
            enc.append_binary(v)?;
        }
        Value::Array(_) => return Err(Error::Nested),
    }
    Ok(())
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, tag: &str) -> Option<&Value> {
        self.fields.iter().find(|(t, _)| t == tag).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, tag: &str) -> Option<&mut Value> {
        self.fields
            .iter_mut()
            .find(|(t, _)| t == tag)
            .map(|(_, v)| v)
    }

    /// Set a field, replacing any earlier value under the same tag. Returns the old value.
    pub fn insert(&mut self, tag: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let tag = tag.into();
        let value = value.into();
        match self.get_mut(&tag) {
            Some(slot) => Some(std::mem::replace(slot, value)),
            None => {
                self.fields.push((tag, value));
                None
            }
        }
    }

    /// Add a value under a tag, the way loading does. A repeated tag turns into an array, and an
    /// array value appends all of its elements.
    pub fn push(&mut self, tag: impl Into<String>, value: impl Into<Value>) {
        let tag = tag.into();
        let value = value.into();
        let slot = match self.get_mut(&tag) {
            Some(slot) => slot,
            None => {
                self.fields.push((tag, value));
                return;
            }
        };
        if !slot.is_array() {
            let first = std::mem::take(slot);
            *slot = Value::Array(vec![first]);
        }
        if let Some(items) = slot.as_array_mut() {
            match value {
                Value::Array(more) => items.extend(more),
                value => items.push(value),
            }
        }
    }

    pub fn remove(&mut self, tag: &str) -> Option<Value> {
        let index = self.fields.iter().position(|(t, _)| t == tag)?;
        Some(self.fields.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(t, v)| (t.as_str(), v))
    }

    /// Load every entry in `data`.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut doc = Document::new();
        let mut decoder = Decoder::new();
        decoder.parse(data);
        while let Some(view) = decoder.next() {
            let view = view?;
            doc.push(view.tag()?, view.to_value()?);
            decoder.recycle(view);
        }
        Ok(doc)
    }

    /// Exact number of bytes [`to_bytes`](Self::to_bytes) will produce.
    pub fn encoded_len(&self) -> Result<usize> {
        let mut len = 0;
        for (tag, value) in &self.fields {
            len += match value {
                Value::Array(items) if items.is_empty() => Encoder::array_size(tag.len(), 0),
                Value::Array(items) => {
                    let mut len = 0;
                    for run in runs(items)? {
                        len += Encoder::array_size(tag.len(), run.items.len());
                        len += run
                            .items
                            .iter()
                            .map(|item| element_len(run.ty, item))
                            .sum::<usize>();
                    }
                    len
                }
                value => {
                    let ty = value.wire_type().unwrap_or(Type::Null);
                    Encoder::tag_size(tag.len()) + element_len(ty, value)
                }
            };
        }
        Ok(len)
    }

    /// Write every field through an encoder.
    pub fn encode_into(&self, enc: &mut Encoder) -> Result<()> {
        for (tag, value) in &self.fields {
            match value {
                Value::Array(items) if items.is_empty() => {
                    enc.array(Type::Null, tag.as_str(), 0)?;
                }
                Value::Array(items) => {
                    for run in runs(items)? {
                        enc.array(run.ty, tag.as_str(), run.items.len())?;
                        for item in run.items {
                            write_element(enc, run.ty, item)?;
                        }
                    }
                }
                value => {
                    let ty = value.wire_type().unwrap_or(Type::Null);
                    enc.tag(ty, tag.as_str())?;
                    write_element(enc, ty, value)?;
                }
            }
        }
        Ok(())
    }

    /// Dump the document into a freshly allocated buffer.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; self.encoded_len()?];
        let mut enc = Encoder::new(&mut buf);
        self.encode_into(&mut enc)?;
        let len = enc.len();
        buf.truncate(len);
        Ok(buf)
    }
}

impl<K: Into<String>, V: Into<Value>> std::iter::FromIterator<(K, V)> for Document {
    /// Collect fields with [`Document::push`] semantics.
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut doc = Document::new();
        for (tag, value) in iter {
            doc.push(tag, value);
        }
        doc
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("{")?;
        for (index, (tag, value)) in self.fields.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{:?}: {:?}", tag, value)?;
        }
        f.write_str("}")
    }
}

impl serde::Serialize for Document {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (tag, value) in &self.fields {
            map.serialize_entry(tag, value)?;
        }
        map.end()
    }
}

impl<'de> serde::Deserialize<'de> for Document {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::*;

        struct DocumentVisitor;
        impl<'de> Visitor<'de> for DocumentVisitor {
            type Value = Document;

            fn expecting(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
                fmt.write_str("a map of tags to bflat values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut doc = Document::new();
                while let Some((tag, value)) = access.next_entry::<String, Value>()? {
                    doc.insert(tag, value);
                }
                Ok(doc)
            }
        }

        deserializer.deserialize_map(DocumentVisitor)
    }
}

use std::fmt;

use serde::{de, ser};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// Malformed input: a zero-length tag, an unknown type code, or a varint or fixed-width
    /// field that runs past the end of the data. `position` is the byte offset of the fault.
    Format {
        message: &'static str,
        position: usize,
    },
    /// The encoder ran past the end of its destination buffer while writing `step`.
    BufferTooSmall {
        step: &'static str,
        position: usize,
    },
    /// The generic integer accessor was used on a value that isn't an integer.
    Conversion(&'static str),
    /// A zero-length tag was handed to the encoder.
    EmptyTag,
    /// A tag or string value was requested as text, but the bytes at `position` aren't valid
    /// UTF-8.
    Utf8 { position: usize },
    /// A String, Binary, or Varint element was requested past the end of its array.
    IndexOutOfRange { index: usize, count: usize },
    /// A Null array claimed more elements than the owned model will build.
    ValueLimit,
    /// An owned array contained another array. The format only holds flat arrays.
    Nested,
    /// Occurs when serde serialization or deserialization fails
    SerdeFail(String),
}

impl Error {
    pub(crate) fn format(message: &'static str, position: usize) -> Self {
        Error::Format { message, position }
    }

    pub(crate) fn too_small(step: &'static str, position: usize) -> Self {
        Error::BufferTooSmall { step, position }
    }

    /// Byte position associated with this error, if it has one.
    pub fn position(&self) -> Option<usize> {
        match *self {
            Error::Format { position, .. } => Some(position),
            Error::BufferTooSmall { position, .. } => Some(position),
            Error::Utf8 { position } => Some(position),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Format { message, position } => {
                write!(f, "Format error at byte {}: {}", position, message)
            }
            Error::BufferTooSmall { step, position } => write!(
                f,
                "Buffer too small: ran out of space at byte {} while encoding {}",
                position, step
            ),
            Error::Conversion(msg) => f.write_str(msg),
            Error::EmptyTag => f.write_str("Zero length tags are not allowed"),
            Error::Utf8 { position } => write!(f, "Invalid UTF-8 at byte {}", position),
            Error::IndexOutOfRange { index, count } => write!(
                f,
                "Element index {} out of range for array of {}",
                index, count
            ),
            Error::ValueLimit => f.write_str("Null array exceeds the element limit"),
            Error::Nested => f.write_str("Arrays may not contain other arrays"),
            Error::SerdeFail(ref msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for Error {}

impl ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::SerdeFail(msg.to_string())
    }
}

impl de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::SerdeFail(msg.to_string())
    }
}

//! bflat is a compact, self-describing binary encoding for flat sets of tagged values.
//!
//! A document is a sequence of entries packed back to back. Each entry carries a UTF-8 tag, a
//! type, and either one value or an array of values of that type. There is no nesting, no
//! document header, and no terminator: the caller knows where the data ends.
//!
//! Supported types are:
//!
//! - Null
//! - String (UTF-8) and Binary, both length-prefixed
//! - Int8, Int16, Int32, Int64, and Datetime, as little-endian fixed-width integers
//! - Double, as a little-endian IEEE-754 double
//! - Varint, a signed LEB128 integer
//!
//! The crate has two layers:
//!
//! - [`Encoder`] and [`Decoder`] work directly on caller-owned byte slices. The encoder never
//!   allocates, and the decoder hands out [`ValueView`]s that point into the input instead of
//!   copying it. Views can be handed back to the decoder to reuse their scratch space.
//! - [`Document`] loads an entire buffer into owned [`Value`]s, or dumps them back out while
//!   choosing compact encodings on its own. It also implements serde's `Serialize` and
//!   `Deserialize`.
//!
//! # Wire format
//!
//! ```text
//! header   : 1 byte, bit 7 = array flag, bits 6-3 = type code, bits 2-0 = tag length (0 = varint)
//! [taglen] : unsigned LEB128, only when the header's tag length is 0
//! tag      : UTF-8 bytes
//! [count]  : unsigned LEB128, only for arrays
//! payload  : count elements
//!     String/Binary : unsigned LEB128 length, then the bytes
//!     Int8/16/32/64 : 1/2/4/8 bytes, little-endian
//!     Double        : 8 bytes, little-endian bit pattern
//!     Datetime      : 8 bytes, little-endian
//!     Varint        : signed LEB128
//!     Null          : nothing
//! ```
//!
//! # Example
//!
//! ```
//! # use bflat::{Decoder, Encoder, Type};
//! # fn main() -> bflat::Result<()> {
//! let mut buf = [0u8; 64];
//! let mut enc = Encoder::new(&mut buf);
//! enc.string("name", "bflat")?;
//! enc.array(Type::Varint, "deltas", 3)?
//!     .append_varint(-1)?
//!     .append_varint(0)?
//!     .append_varint(300)?;
//! let len = enc.len();
//!
//! let mut decoder = Decoder::new();
//! decoder.parse(&buf[..len]);
//! let rendered: Vec<String> = decoder
//!     .map(|view| view.map(|v| v.to_string()))
//!     .collect::<bflat::Result<_>>()?;
//! assert_eq!(rendered, ["name=\"bflat\"", "deltas=[-1, 0, 300]"]);
//! # Ok(())
//! # }
//! ```

pub mod cursor;
mod decoder;
mod document;
mod encoder;
pub mod error;
pub mod fixed;
mod marker;
mod text;
mod value;
pub mod varint;
mod view;

pub use decoder::Decoder;
pub use document::Document;
pub use encoder::Encoder;
pub use error::{Error, Result};
pub use marker::Type;
pub use text::{Text, Utf16};
pub use value::Value;
pub use view::{ValueView, MAX_NULL_ELEMENTS};

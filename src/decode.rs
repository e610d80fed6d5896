//! The recursive decoder.
//!
//! Decoding walks the destination's [`Target`] view, consuming bytes from a
//! [`Reader`]. Scalars are read after a bounds check, records field by field
//! in layout order, and sequences element by element. The first error aborts
//! the walk; fields written before it keep their values.

use alloc::{boxed::Box, string::String};
use core::str;

use thiserror::Error;
use zerocopy::FromBytes;

use crate::{
    descriptor::{FieldKind, Kind},
    order::{ByteOrder, Scalar},
    target::{Decode, FieldTarget, Record, Sequence, Target},
};

/// Errors occurring while decoding.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A field declared as decodable cannot be written.
    #[error("Field `{record}.{field}` cannot be written.")]
    InvalidArgument {
        record: &'static str,
        field: &'static str,
    },
    /// A text field has no usable length.
    #[error("Text field `{record}.{field}` must declare a positive length.")]
    MissingLengthTag {
        record: &'static str,
        field: &'static str,
    },
    /// A decode hook has a signature that cannot store its result.
    #[error("Method `{record}::{method}` cannot be used as a decode hook: {reason}.")]
    InvalidCodecSignature {
        record: &'static str,
        method: &'static str,
        reason: &'static str,
    },
    /// A record declares a decode hook it does not provide.
    #[error("Record `{record}` has no decode hook `{method}`.")]
    CodecNotFound {
        record: &'static str,
        method: &'static str,
    },
    /// A shape that cannot be decoded where it appears.
    #[error("Type `{0}` is not supported here.")]
    UnsupportedType(Kind),
    /// A decode hook failed.
    #[error("Decode hook failed: {0}")]
    Codec(#[source] Box<dyn core::error::Error + Send + Sync>),
    /// Unexpectedly reached the end of the buffer.
    #[error("Needed {needed} bytes at offset {offset}, but only {available} remain.")]
    BufferOverrun {
        offset: usize,
        needed: usize,
        available: usize,
    },
    /// Text bytes are not valid UTF-8.
    #[error("Text field `{record}.{field}` is not valid UTF-8.")]
    InvalidText {
        record: &'static str,
        field: &'static str,
    },
    /// A dynamic slot holds no value to decode into.
    #[error("Dynamic slot holds no value.")]
    EmptyDynamic,
    /// Bytes remain after the destination was populated.
    #[error("{0} bytes remain after decoding.")]
    TrailingBytes(usize),
}

impl Error {
    /// Wrap an error reported by a decode hook.
    pub fn codec(err: impl Into<Box<dyn core::error::Error + Send + Sync>>) -> Self {
        Self::Codec(err.into())
    }
}

/// A cursor over a byte buffer, read in a fixed byte order.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    r: &'a [u8],
    i: usize,
    order: ByteOrder,
}

impl<'a> Reader<'a> {
    pub fn new(r: &'a [u8], order: ByteOrder) -> Self {
        Self { r, i: 0, order }
    }

    /// Offset of the next unread byte.
    pub fn position(&self) -> usize {
        self.i
    }

    pub fn order(&self) -> ByteOrder {
        self.order
    }

    /// The unread bytes.
    pub fn remaining(&self) -> &'a [u8] {
        &self.r[self.i..]
    }

    /// Take an exact number of bytes, advancing the cursor.
    pub fn take_slice(&mut self, n: usize) -> Result<&'a [u8], Error> {
        let rest = self.remaining();
        let taken = rest.get(..n).ok_or(self.overrun(n))?;
        self.i += n;
        Ok(taken)
    }

    /// Take a fixed-size value, advancing the cursor.
    pub fn take<T: FromBytes>(&mut self) -> Result<T, Error> {
        let (value, _) = T::read_from_prefix(self.remaining())
            .map_err(|_| self.overrun(size_of::<T>()))?;
        self.i += size_of::<T>();
        Ok(value)
    }

    /// Advance the cursor without reading.
    pub fn skip(&mut self, n: usize) -> Result<(), Error> {
        self.take_slice(n).map(drop)
    }

    /// Decode a value at the cursor, returning the number of bytes consumed.
    pub fn decode(&mut self, o: &mut (impl Decode + ?Sized)) -> Result<usize, Error> {
        let start = self.i;
        decode_target(o.target(), self)?;
        Ok(self.i - start)
    }

    fn scalar<T: Scalar>(&mut self, o: &mut T) -> Result<(), Error> {
        *o = self.order.read(self.take::<T::Bytes>()?);
        Ok(())
    }

    fn overrun(&self, needed: usize) -> Error {
        Error::BufferOverrun {
            offset: self.i,
            needed,
            available: self.r.len() - self.i,
        }
    }
}

/// Decode a buffer into a destination, returning the number of bytes
/// consumed. Bytes following the destination's extent are left unread.
pub fn decode(o: &mut (impl Decode + ?Sized), r: &[u8], order: ByteOrder) -> Result<usize, Error> {
    Reader::new(r, order).decode(o)
}

/// Decode a buffer into a destination, requiring every byte to be consumed.
pub fn decode_exact(o: &mut (impl Decode + ?Sized), r: &[u8], order: ByteOrder) -> Result<(), Error> {
    let consumed = decode(o, r, order)?;

    if consumed != r.len() {
        Err(Error::TrailingBytes(r.len() - consumed))?;
    }

    Ok(())
}

fn decode_target(o: Target<'_>, r: &mut Reader<'_>) -> Result<(), Error> {
    match o {
        Target::I8(o) => r.scalar(o),
        Target::I16(o) => r.scalar(o),
        Target::I32(o) => r.scalar(o),
        Target::I64(o) => r.scalar(o),
        Target::U8(o) => r.scalar(o),
        Target::U16(o) => r.scalar(o),
        Target::U32(o) => r.scalar(o),
        Target::U64(o) => r.scalar(o),
        Target::F32(o) => r.scalar(o),
        Target::F64(o) => r.scalar(o),
        // Text has no extent of its own outside of a record field.
        Target::Text(_) => Err(Error::UnsupportedType(Kind::Text)),
        Target::Record(o) => decode_record(o, r),
        Target::Sequence(o) => decode_sequence(o, r),
        Target::Dynamic(Some(o)) => decode_target(o.target(), r),
        Target::Dynamic(None) => Err(Error::EmptyDynamic),
    }
}

fn decode_sequence(o: &mut dyn Sequence, r: &mut Reader<'_>) -> Result<(), Error> {
    for index in 0..o.len() {
        decode_target(o.element(index).target(), r)?;
    }

    Ok(())
}

fn decode_record(o: &mut dyn Record, r: &mut Reader<'_>) -> Result<(), Error> {
    let layout = o.layout();
    let record = layout.name;

    for (index, descriptor) in layout.fields.iter().enumerate() {
        let field = descriptor.name;

        #[cfg(feature = "tracing")]
        tracing::trace!(record, field, offset = r.position(), "decoding field");

        match descriptor.kind {
            FieldKind::Padding(ty) => {
                let size = ty.static_size().ok_or(Error::UnsupportedType(ty.kind()))?;
                r.skip(size)?;
            }
            FieldKind::Ignored => {}
            FieldKind::Hook { decode, .. } => {
                let FieldTarget::Hook(mut hook) = o.field(index)? else {
                    Err(Error::CodecNotFound {
                        record,
                        method: decode,
                    })?
                };

                // Hook errors are returned as reported.
                let consumed = hook.call(r.remaining())?;
                r.skip(consumed)?;
            }
            FieldKind::Text { length } => {
                let Some(length) = length.filter(|n| *n > 0) else {
                    Err(Error::MissingLengthTag { record, field })?
                };

                let FieldTarget::Text(text) = o.field(index)? else {
                    Err(Error::InvalidArgument { record, field })?
                };

                let bytes = trim_nul(r.take_slice(length)?);
                let value = str::from_utf8(bytes).map_err(|_| Error::InvalidText { record, field })?;

                text.clear();
                text.push_str(value);
            }
            FieldKind::Value(_) => {
                let FieldTarget::Value(value) = o.field(index)? else {
                    Err(Error::InvalidArgument { record, field })?
                };

                decode_target(value.target(), r)?;
            }
        }
    }

    Ok(())
}

/// Read text of exactly `length` bytes from the start of `r`, trimming
/// trailing NUL padding. For use within decode hooks.
pub fn decode_text(r: &[u8], length: usize) -> Result<(String, usize), Error> {
    let bytes = Reader::new(r, ByteOrder::NATIVE).take_slice(length)?;
    let text = str::from_utf8(trim_nul(bytes)).map_err(Error::codec)?;

    Ok((String::from(text), length))
}

fn trim_nul(r: &[u8]) -> &[u8] {
    let end = r.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
    &r[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int32_from_short_buffer_overruns() {
        let mut value = 0i32;
        let err = decode(&mut value, &[0x01, 0x02], ByteOrder::Big).unwrap_err();

        assert!(matches!(
            err,
            Error::BufferOverrun {
                offset: 0,
                needed: 4,
                available: 2
            }
        ));
        assert_eq!(value, 0);
    }

    #[test]
    fn reader_advances_by_width() {
        let mut r = Reader::new(&[0x00, 0x01, 0x02, 0x03, 0x04], ByteOrder::Little);
        let mut a = 0u16;
        let mut b = 0u16;

        assert_eq!(r.decode(&mut a).unwrap(), 2);
        assert_eq!(r.decode(&mut b).unwrap(), 2);
        assert_eq!((a, b), (0x0100, 0x0302));
        assert_eq!(r.position(), 4);
        assert_eq!(r.remaining(), &[0x04]);
    }

    #[test]
    fn skip_past_end_fails() {
        let mut r = Reader::new(&[0; 3], ByteOrder::Big);
        r.skip(2).unwrap();

        assert!(matches!(r.skip(2), Err(Error::BufferOverrun { offset: 2, .. })));
        assert_eq!(r.position(), 2);
    }

    #[test]
    fn arrays_decode_in_index_order() {
        let mut value = [0u16; 3];
        let consumed = decode(&mut value, &[0, 1, 0, 2, 0, 3], ByteOrder::Big).unwrap();

        assert_eq!(consumed, 6);
        assert_eq!(value, [1, 2, 3]);
    }

    #[test]
    fn vectors_decode_current_length() {
        let mut value = alloc::vec![0i8; 2];
        let consumed = decode(&mut value, &[0xFF, 0x02, 0x03], ByteOrder::Big).unwrap();

        assert_eq!(consumed, 2);
        assert_eq!(value, [-1, 2]);
    }

    #[test]
    fn exact_rejects_trailing_bytes() {
        let mut value = 0u8;

        assert!(matches!(
            decode_exact(&mut value, &[1, 2], ByteOrder::Big),
            Err(Error::TrailingBytes(1))
        ));
        assert_eq!(value, 1);
    }

    #[test]
    fn dynamic_slot_decodes_held_value() {
        let mut slot: Option<Box<dyn Decode>> = Some(Box::new(0u32));
        decode(&mut slot, &[0, 0, 1, 0], ByteOrder::Big).unwrap();

        assert_eq!(slot.unwrap().descriptor(), crate::TypeDescriptor::UInt(crate::Width::W32));

        let mut empty: Option<Box<dyn Decode>> = None;
        assert!(matches!(
            decode(&mut empty, &[0; 4], ByteOrder::Big),
            Err(Error::EmptyDynamic)
        ));
    }

    #[test]
    fn bare_text_is_unsupported() {
        let mut value = String::new();

        assert!(matches!(
            decode(&mut value, b"abc", ByteOrder::Big),
            Err(Error::UnsupportedType(Kind::Text))
        ));
    }

    #[test]
    fn text_helper_trims_padding() {
        let (text, consumed) = decode_text(b"AB\0\0rest", 4).unwrap();
        assert_eq!(text, "AB");
        assert_eq!(consumed, 4);
    }
}

//! Static descriptions of decodable shapes.
//!
//! A [`TypeDescriptor`] names one of a closed set of shapes. Descriptors for
//! records are produced at compile time by the [`Record`](macro@crate::Record)
//! derive macro as `'static` tables; those of primitives, arrays and vectors
//! come from the [`Shape`] implementations in this crate.

use core::fmt;

/// Width of a fixed-size scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Width {
    W8,
    W16,
    W32,
    W64,
}

impl Width {
    /// Number of bytes occupied on the wire.
    pub const fn bytes(self) -> usize {
        match self {
            Self::W8 => 1,
            Self::W16 => 2,
            Self::W32 => 4,
            Self::W64 => 8,
        }
    }
}

/// The tag of a [`TypeDescriptor`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Int,
    UInt,
    Float,
    Text,
    Record,
    Sequence,
    Vector,
    Dynamic,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Int => "int",
            Self::UInt => "uint",
            Self::Float => "float",
            Self::Text => "text",
            Self::Record => "record",
            Self::Sequence => "sequence",
            Self::Vector => "vector",
            Self::Dynamic => "dynamic",
        })
    }
}

/// Description of a decodable shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypeDescriptor {
    /// Signed integer.
    Int(Width),
    /// Unsigned integer.
    UInt(Width),
    /// IEEE-754 float, 32 or 64 bits.
    Float(Width),
    /// Text, only decodable as a record field with a declared length.
    Text,
    /// Ordered fields.
    Record(&'static RecordLayout),
    /// A fixed number of elements.
    Sequence {
        element: &'static TypeDescriptor,
        len: usize,
    },
    /// Elements counted by the destination's current length.
    Vector { element: &'static TypeDescriptor },
    /// A slot whose concrete shape is only known at runtime.
    Dynamic,
}

impl TypeDescriptor {
    pub const fn kind(&self) -> Kind {
        match self {
            Self::Int(_) => Kind::Int,
            Self::UInt(_) => Kind::UInt,
            Self::Float(_) => Kind::Float,
            Self::Text => Kind::Text,
            Self::Record(_) => Kind::Record,
            Self::Sequence { .. } => Kind::Sequence,
            Self::Vector { .. } => Kind::Vector,
            Self::Dynamic => Kind::Dynamic,
        }
    }

    /// Number of bytes this shape occupies regardless of the buffer contents,
    /// if known.
    ///
    /// Text, vectors, dynamic slots and records holding hooks or text without
    /// a length have no static size.
    pub fn static_size(&self) -> Option<usize> {
        match self {
            Self::Int(w) | Self::UInt(w) | Self::Float(w) => Some(w.bytes()),
            Self::Record(layout) => layout.static_size(),
            Self::Sequence { element, len } => element.static_size()?.checked_mul(*len),
            Self::Text | Self::Vector { .. } | Self::Dynamic => None,
        }
    }
}

/// Ordered field table of a record. Field order defines the wire layout.
#[derive(Debug, PartialEq)]
pub struct RecordLayout {
    pub name: &'static str,
    pub fields: &'static [FieldDescriptor],
}

impl RecordLayout {
    /// Sum of the static sizes of the fields, if all are known.
    pub fn static_size(&self) -> Option<usize> {
        self.fields
            .iter()
            .try_fold(0usize, |acc, f| acc.checked_add(f.kind.static_size()?))
    }
}

/// One field of a [`RecordLayout`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub kind: FieldKind,
}

/// How a record field is treated while decoding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    /// Decoded by recursing into the field's own shape.
    Value(TypeDescriptor),
    /// Not written; occupies the static size of its type on the wire.
    Padding(TypeDescriptor),
    /// Not written; occupies no bytes on the wire.
    Ignored,
    /// Exactly `length` bytes of text, trailing NULs trimmed.
    Text { length: Option<usize> },
    /// Delegated to a method of the owning record. The names are those of the
    /// encode and decode methods; only the latter is used here.
    Hook {
        encode: &'static str,
        decode: &'static str,
    },
}

impl FieldKind {
    /// Bytes this field contributes to a record, if known statically.
    pub fn static_size(&self) -> Option<usize> {
        match self {
            Self::Value(ty) | Self::Padding(ty) => ty.static_size(),
            Self::Ignored => Some(0),
            Self::Text { length } => *length,
            Self::Hook { .. } => None,
        }
    }
}

/// A type with a shape known at compile time.
pub trait Shape {
    const DESCRIPTOR: TypeDescriptor;
}

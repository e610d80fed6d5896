//! Writable views of destinations, switched over by the decoder.
//!
//! A destination exposes itself through [`Decode::target`] as one of the
//! tagged [`Target`] variants. Records additionally hand out one
//! [`FieldTarget`] per field of their layout.

use alloc::{boxed::Box, string::String, vec::Vec};

use crate::{
    decode::Error,
    descriptor::{RecordLayout, Shape, TypeDescriptor, Width},
    hook::Hook,
};

/// A value that can be populated by the decoder.
///
/// Implemented for the fixed-width numeric primitives, arrays and vectors of
/// decodable elements, dynamic slots (`Box<dyn Decode>` and
/// `Option<Box<dyn Decode>>`) and, through the derive macro, records.
pub trait Decode {
    /// The shape of this value as it currently stands.
    ///
    /// For dynamic slots, this is the shape of the held concrete value.
    fn descriptor(&self) -> TypeDescriptor;

    /// Expose this value for writing.
    fn target(&mut self) -> Target<'_>;
}

/// A writable view of a destination, tagged by shape.
pub enum Target<'a> {
    I8(&'a mut i8),
    I16(&'a mut i16),
    I32(&'a mut i32),
    I64(&'a mut i64),
    U8(&'a mut u8),
    U16(&'a mut u16),
    U32(&'a mut u32),
    U64(&'a mut u64),
    F32(&'a mut f32),
    F64(&'a mut f64),
    Text(&'a mut String),
    Record(&'a mut dyn Record),
    Sequence(&'a mut dyn Sequence),
    /// A dynamic slot, `None` when it holds no concrete value.
    Dynamic(Option<&'a mut dyn Decode>),
}

/// A composite of ordered, individually addressable fields.
///
/// See the [`Record`](macro@crate::Record) derive macro for an automatic
/// implementation of this trait.
pub trait Record {
    /// Field table, in wire order.
    fn layout(&self) -> &'static RecordLayout;

    /// Expose the field at `index` of the layout for writing.
    ///
    /// Only called for fields of kind `Value`, `Text` and `Hook`. Hooks are
    /// resolved here, so a hook with an unusable signature fails before it is
    /// ever invoked.
    fn field(&mut self, index: usize) -> Result<FieldTarget<'_>, Error>;
}

/// A writable view of one record field.
pub enum FieldTarget<'a> {
    Value(&'a mut dyn Decode),
    Text(&'a mut String),
    Hook(Hook<'a>),
    /// The record has nothing to hand out for this field.
    Absent,
}

/// Elements decoded one after another.
pub trait Sequence {
    fn len(&self) -> usize;

    /// Expose the element at `index`, which is less than [`Sequence::len`].
    fn element(&mut self, index: usize) -> &mut dyn Decode;
}

macro_rules! primitive {
    ($($t:ident => $variant:ident, $descriptor:expr;)*) => {$(
        impl Shape for $t {
            const DESCRIPTOR: TypeDescriptor = $descriptor;
        }

        impl Decode for $t {
            fn descriptor(&self) -> TypeDescriptor {
                Self::DESCRIPTOR
            }

            fn target(&mut self) -> Target<'_> {
                Target::$variant(self)
            }
        }
    )*};
}

primitive! {
    i8 => I8, TypeDescriptor::Int(Width::W8);
    i16 => I16, TypeDescriptor::Int(Width::W16);
    i32 => I32, TypeDescriptor::Int(Width::W32);
    i64 => I64, TypeDescriptor::Int(Width::W64);
    u8 => U8, TypeDescriptor::UInt(Width::W8);
    u16 => U16, TypeDescriptor::UInt(Width::W16);
    u32 => U32, TypeDescriptor::UInt(Width::W32);
    u64 => U64, TypeDescriptor::UInt(Width::W64);
    f32 => F32, TypeDescriptor::Float(Width::W32);
    f64 => F64, TypeDescriptor::Float(Width::W64);
    String => Text, TypeDescriptor::Text;
}

impl<T: Shape, const N: usize> Shape for [T; N] {
    const DESCRIPTOR: TypeDescriptor = TypeDescriptor::Sequence {
        element: &T::DESCRIPTOR,
        len: N,
    };
}

impl<T: Shape + Decode, const N: usize> Decode for [T; N] {
    fn descriptor(&self) -> TypeDescriptor {
        Self::DESCRIPTOR
    }

    fn target(&mut self) -> Target<'_> {
        Target::Sequence(self)
    }
}

impl<T: Decode, const N: usize> Sequence for [T; N] {
    fn len(&self) -> usize {
        N
    }

    fn element(&mut self, index: usize) -> &mut dyn Decode {
        &mut self[index]
    }
}

impl<T: Shape> Shape for Vec<T> {
    const DESCRIPTOR: TypeDescriptor = TypeDescriptor::Vector {
        element: &T::DESCRIPTOR,
    };
}

/// Vectors decode as many elements as they currently hold.
impl<T: Shape + Decode> Decode for Vec<T> {
    fn descriptor(&self) -> TypeDescriptor {
        Self::DESCRIPTOR
    }

    fn target(&mut self) -> Target<'_> {
        Target::Sequence(self)
    }
}

impl<T: Decode> Sequence for Vec<T> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn element(&mut self, index: usize) -> &mut dyn Decode {
        &mut self[index]
    }
}

impl Shape for Box<dyn Decode> {
    const DESCRIPTOR: TypeDescriptor = TypeDescriptor::Dynamic;
}

impl Decode for Box<dyn Decode> {
    fn descriptor(&self) -> TypeDescriptor {
        (**self).descriptor()
    }

    fn target(&mut self) -> Target<'_> {
        Target::Dynamic(Some(&mut **self))
    }
}

impl Shape for Option<Box<dyn Decode>> {
    const DESCRIPTOR: TypeDescriptor = TypeDescriptor::Dynamic;
}

impl Decode for Option<Box<dyn Decode>> {
    fn descriptor(&self) -> TypeDescriptor {
        match self {
            Some(value) => value.descriptor(),
            None => TypeDescriptor::Dynamic,
        }
    }

    fn target(&mut self) -> Target<'_> {
        Target::Dynamic(match self {
            Some(value) => Some(&mut **value),
            None => None,
        })
    }
}

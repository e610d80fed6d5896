//! Byte order selection and conversion of fixed-width scalars.

/// The order in which the bytes of a multi-byte scalar appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    /// Most significant byte first (network order).
    Big,
    /// Least significant byte first.
    Little,
}

impl ByteOrder {
    /// The byte order of the target platform.
    pub const NATIVE: Self = if cfg!(target_endian = "big") {
        Self::Big
    } else {
        Self::Little
    };

    /// Convert the raw bytes of a scalar to its native value.
    pub fn read<T: Scalar>(self, r: T::Bytes) -> T {
        match self {
            Self::Big => T::from_be(r),
            Self::Little => T::from_le(r),
        }
    }
}

/// A fixed-width numeric type decoded directly from its bytes.
///
/// Implemented for the signed and unsigned integers of 8 to 64 bits, and for
/// `f32` and `f64`. Conversion always covers the full declared width: signed
/// types are sign-extended and unsigned types zero-extended.
pub trait Scalar: Copy + sealed::Sealed {
    /// The raw representation of this scalar.
    type Bytes: zerocopy::FromBytes;

    /// Convert big-endian bytes to a native value.
    fn from_be(r: Self::Bytes) -> Self;
    /// Convert little-endian bytes to a native value.
    fn from_le(r: Self::Bytes) -> Self;
}

mod sealed {
    pub trait Sealed {}
}

macro_rules! scalar {
    ($($t:ident),*) => {$(
        impl sealed::Sealed for $t {}

        impl Scalar for $t {
            type Bytes = [u8; size_of::<$t>()];

            fn from_be(r: Self::Bytes) -> Self {
                $t::from_be_bytes(r)
            }

            fn from_le(r: Self::Bytes) -> Self {
                $t::from_le_bytes(r)
            }
        }
    )*};
}

scalar!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int16_follows_order() {
        assert_eq!(ByteOrder::Little.read::<i16>([0x01, 0x00]), 1);
        assert_eq!(ByteOrder::Big.read::<i16>([0x01, 0x00]), 256);
    }

    #[test]
    fn unsigned_keeps_full_width() {
        let r = [0xFF, 0xFF, 0xFF, 0xFE];
        assert_eq!(ByteOrder::Big.read::<u32>(r), 0xFFFF_FFFE);
        assert_eq!(ByteOrder::Little.read::<u16>([0xFF, 0x80]), 0x80FF);
    }

    #[test]
    fn signed_sign_extends() {
        assert_eq!(ByteOrder::Big.read::<i32>([0xFF, 0xFF, 0xFF, 0xFE]), -2);
        assert_eq!(ByteOrder::Little.read::<i8>([0x80]), i8::MIN);
    }

    #[test]
    fn floats_use_ieee_bits() {
        let r = 1.5f32.to_be_bytes();
        assert_eq!(ByteOrder::Big.read::<f32>(r), 1.5);
        let r = (-0.25f64).to_le_bytes();
        assert_eq!(ByteOrder::Little.read::<f64>(r), -0.25);
    }
}

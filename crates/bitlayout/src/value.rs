//! Primitive field values and the raw [Value] field.
//!
//! [Value] is the mechanism layer: it moves a primitive in and out of a bit
//! range with no notion of validity. [crate::integer::Integer] and
//! [crate::float::Float] add policy on top.

use std::{fmt, marker::PhantomData};

use crate::{
    bits::{self, mask, sign_extend},
    errors::{LayoutError, ReadError, WriteError},
};

mod sealed {
    pub trait Sealed {}
}

/// Tag naming the Rust primitive stored in a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
}

impl PrimitiveKind {
    /// Native width of the primitive in bits.
    pub const fn bits(self) -> usize {
        match self {
            PrimitiveKind::U8 | PrimitiveKind::I8 => 8,
            PrimitiveKind::U16 | PrimitiveKind::I16 => 16,
            PrimitiveKind::U32 | PrimitiveKind::I32 | PrimitiveKind::F32 => 32,
            PrimitiveKind::U64 | PrimitiveKind::I64 | PrimitiveKind::F64 => 64,
        }
    }

    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            PrimitiveKind::I8 | PrimitiveKind::I16 | PrimitiveKind::I32 | PrimitiveKind::I64
        )
    }

    pub const fn is_float(self) -> bool {
        matches!(self, PrimitiveKind::F32 | PrimitiveKind::F64)
    }

    pub const fn name(self) -> &'static str {
        match self {
            PrimitiveKind::U8 => "u8",
            PrimitiveKind::U16 => "u16",
            PrimitiveKind::U32 => "u32",
            PrimitiveKind::U64 => "u64",
            PrimitiveKind::I8 => "i8",
            PrimitiveKind::I16 => "i16",
            PrimitiveKind::I32 => "i32",
            PrimitiveKind::I64 => "i64",
            PrimitiveKind::F32 => "f32",
            PrimitiveKind::F64 => "f64",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A primitive value tagged with its type, as returned by untyped accessors.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub enum Scalar {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
}

impl Scalar {
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Scalar::U8(_) => PrimitiveKind::U8,
            Scalar::U16(_) => PrimitiveKind::U16,
            Scalar::U32(_) => PrimitiveKind::U32,
            Scalar::U64(_) => PrimitiveKind::U64,
            Scalar::I8(_) => PrimitiveKind::I8,
            Scalar::I16(_) => PrimitiveKind::I16,
            Scalar::I32(_) => PrimitiveKind::I32,
            Scalar::I64(_) => PrimitiveKind::I64,
            Scalar::F32(_) => PrimitiveKind::F32,
            Scalar::F64(_) => PrimitiveKind::F64,
        }
    }
}

/// A Rust primitive that can be stored in a bit field.
///
/// Implemented for the fixed-width integers up to 64 bits, `f32` and `f64`.
pub trait Primitive:
    sealed::Sealed + Copy + PartialOrd + fmt::Debug + Send + Sync + 'static
{
    const KIND: PrimitiveKind;

    /// Builds the value from the low `bits` bits of `raw`, sign extending signed types.
    fn from_raw(raw: u64, bits: usize) -> Self;
    /// Two's complement / IEEE-754 bit pattern, widened to 64 bits.
    fn to_raw(self) -> u64;
    fn from_scalar(value: Scalar) -> Option<Self>;
    fn into_scalar(self) -> Scalar;
}

/// Integer primitives usable in [crate::integer::Integer].
pub trait PrimInt: Primitive + Ord {
    const ZERO: Self;
    const MIN_VALUE: Self;
    const MAX_VALUE: Self;

    fn to_i128(self) -> i128;
    fn from_i128(value: i128) -> Option<Self>;
}

/// Floating point primitives usable in [crate::float::Float].
pub trait PrimFloat: Primitive {
    const ZERO: Self;
}

macro_rules! impl_unsigned {
    ($($t:ty => $kind:ident),*) => {
        $(
            impl sealed::Sealed for $t {}

            impl Primitive for $t {
                const KIND: PrimitiveKind = PrimitiveKind::$kind;

                fn from_raw(raw: u64, bits: usize) -> Self {
                    (raw & mask(bits)) as $t
                }

                fn to_raw(self) -> u64 {
                    self as u64
                }

                fn from_scalar(value: Scalar) -> Option<Self> {
                    match value {
                        Scalar::$kind(v) => Some(v),
                        _ => None,
                    }
                }

                fn into_scalar(self) -> Scalar {
                    Scalar::$kind(self)
                }
            }

            impl PrimInt for $t {
                const ZERO: Self = 0;
                const MIN_VALUE: Self = <$t>::MIN;
                const MAX_VALUE: Self = <$t>::MAX;

                fn to_i128(self) -> i128 {
                    self as i128
                }

                fn from_i128(value: i128) -> Option<Self> {
                    <$t>::try_from(value).ok()
                }
            }

            impl From<$t> for Scalar {
                fn from(value: $t) -> Self {
                    Scalar::$kind(value)
                }
            }
        )*
    };
}

macro_rules! impl_signed {
    ($($t:ty => $kind:ident),*) => {
        $(
            impl sealed::Sealed for $t {}

            impl Primitive for $t {
                const KIND: PrimitiveKind = PrimitiveKind::$kind;

                fn from_raw(raw: u64, bits: usize) -> Self {
                    sign_extend(raw & mask(bits), bits) as $t
                }

                fn to_raw(self) -> u64 {
                    self as i64 as u64
                }

                fn from_scalar(value: Scalar) -> Option<Self> {
                    match value {
                        Scalar::$kind(v) => Some(v),
                        _ => None,
                    }
                }

                fn into_scalar(self) -> Scalar {
                    Scalar::$kind(self)
                }
            }

            impl PrimInt for $t {
                const ZERO: Self = 0;
                const MIN_VALUE: Self = <$t>::MIN;
                const MAX_VALUE: Self = <$t>::MAX;

                fn to_i128(self) -> i128 {
                    self as i128
                }

                fn from_i128(value: i128) -> Option<Self> {
                    <$t>::try_from(value).ok()
                }
            }

            impl From<$t> for Scalar {
                fn from(value: $t) -> Self {
                    Scalar::$kind(value)
                }
            }
        )*
    };
}

macro_rules! impl_float {
    ($($t:ty => $kind:ident, $bits:ty),*) => {
        $(
            impl sealed::Sealed for $t {}

            impl Primitive for $t {
                const KIND: PrimitiveKind = PrimitiveKind::$kind;

                fn from_raw(raw: u64, _bits: usize) -> Self {
                    <$t>::from_bits(raw as $bits)
                }

                fn to_raw(self) -> u64 {
                    self.to_bits() as u64
                }

                fn from_scalar(value: Scalar) -> Option<Self> {
                    match value {
                        Scalar::$kind(v) => Some(v),
                        _ => None,
                    }
                }

                fn into_scalar(self) -> Scalar {
                    Scalar::$kind(self)
                }
            }

            impl PrimFloat for $t {
                const ZERO: Self = 0.0;
            }

            impl From<$t> for Scalar {
                fn from(value: $t) -> Self {
                    Scalar::$kind(value)
                }
            }
        )*
    };
}

impl_unsigned!(u8 => U8, u16 => U16, u32 => U32, u64 => U64);
impl_signed!(i8 => I8, i16 => I16, i32 => I32, i64 => I64);
impl_float!(f32 => F32, u32, f64 => F64, u64);

/// Raw field: a primitive `T` stored in `bits` consecutive bits.
///
/// Reads and writes perform no validation beyond keeping inside the buffer.
/// Writing keeps only the low `bits` bits of the value.
pub struct Value<T> {
    bits: usize,
    _marker: PhantomData<T>,
}

impl<T> Clone for Value<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Value<T> {}

impl<T: Primitive> fmt::Debug for Value<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value")
            .field("kind", &T::KIND)
            .field("bits", &self.bits)
            .finish()
    }
}

impl<T: Primitive> Value<T> {
    /// Creates a field of `bits` bits. Integers may be narrower than their native
    /// width; floats must use exactly their native width.
    pub fn new(bits: usize) -> Result<Self, LayoutError> {
        let max_bits = T::KIND.bits();
        let valid = if T::KIND.is_float() {
            bits == max_bits
        } else {
            (1..=max_bits).contains(&bits)
        };

        if !valid {
            return Err(LayoutError::InvalidWidth { bits, max_bits });
        }

        Ok(Value {
            bits,
            _marker: PhantomData,
        })
    }

    /// Field occupying the full native width of `T`.
    pub fn native() -> Self {
        Value {
            bits: T::KIND.bits(),
            _marker: PhantomData,
        }
    }

    pub fn bit_size(&self) -> usize {
        self.bits
    }

    pub fn read(&self, data: &[u8], bit_offset: usize) -> Result<T, ReadError> {
        let raw = bits::read_bits_at(data, bit_offset, self.bits)?;
        Ok(T::from_raw(raw, self.bits))
    }

    pub fn write(&self, data: &mut [u8], bit_offset: usize, value: T) -> Result<(), WriteError> {
        bits::write_bits_at(data, bit_offset, self.bits, value.to_raw() & mask(self.bits))
    }
}

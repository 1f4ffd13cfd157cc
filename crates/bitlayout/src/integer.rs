//! Range-validated integer fields.

use crate::{
    errors::{LayoutError, WriteError},
    value::{PrimInt, Value},
};

/// An integer field with a closed range `[min, max]` and a default.
///
/// A value is valid when it lies in the range or equals the default. The
/// default is always valid, even outside the range, so it can serve as an
/// "unset" marker distinct from every real reading.
#[derive(Debug, Clone, Copy)]
pub struct Integer<T: PrimInt> {
    value: Value<T>,
    default: T,
    min: T,
    max: T,
}

impl<T: PrimInt> Integer<T> {
    /// Creates a field of `bits` bits. Fails if `min > max` or if any of the three
    /// values cannot be stored in `bits` bits.
    pub fn new(bits: usize, default: T, min: T, max: T) -> Result<Self, LayoutError> {
        let value = Value::new(bits)?;

        if min > max {
            return Err(LayoutError::InvalidRange {
                min: min.to_i128(),
                max: max.to_i128(),
            });
        }

        for v in [default, min, max] {
            if !fits_in(v, bits) {
                return Err(LayoutError::ValueExceedsWidth {
                    value: v.to_i128(),
                    bits,
                });
            }
        }

        Ok(Integer {
            value,
            default,
            min,
            max,
        })
    }

    /// Native-width field with default 0 and the full range of `T`.
    pub fn full() -> Self {
        Integer {
            value: Value::native(),
            default: T::ZERO,
            min: T::MIN_VALUE,
            max: T::MAX_VALUE,
        }
    }

    pub fn bit_size(&self) -> usize {
        self.value.bit_size()
    }

    pub fn default_value(&self) -> T {
        self.default
    }

    pub fn min_value(&self) -> T {
        self.min
    }

    pub fn max_value(&self) -> T {
        self.max
    }

    pub fn is_valid(&self, value: T) -> bool {
        (self.min <= value && value <= self.max) || value == self.default
    }

    /// Reads the field. Returns `None` if the range is out of bounds or the stored
    /// value is not valid.
    pub fn read(&self, data: &[u8], bit_offset: usize) -> Option<T> {
        self.value
            .read(data, bit_offset)
            .ok()
            .filter(|v| self.is_valid(*v))
    }

    /// Writes `value` if it is valid. On error the buffer is unchanged.
    pub fn write(&self, data: &mut [u8], bit_offset: usize, value: T) -> Result<(), WriteError> {
        if !self.is_valid(value) {
            return Err(WriteError::OutOfRange);
        }

        self.value.write(data, bit_offset, value)
    }

    pub fn write_default(&self, data: &mut [u8], bit_offset: usize) -> Result<(), WriteError> {
        self.value.write(data, bit_offset, self.default)
    }
}

/// Whether `value` survives a round trip through `bits` bits.
fn fits_in<T: PrimInt>(value: T, bits: usize) -> bool {
    let value = value.to_i128();

    if T::KIND.is_signed() {
        let half = 1i128 << (bits - 1);
        (-half..half).contains(&value)
    } else {
        value < (1i128 << bits)
    }
}

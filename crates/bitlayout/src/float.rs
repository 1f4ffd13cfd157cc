//! Floating point fields.

use crate::{
    errors::{ReadError, WriteError},
    value::{PrimFloat, Value},
};

/// A floating point field. Its default is zero and every bit pattern is accepted.
#[derive(Debug, Clone, Copy)]
pub struct Float<T: PrimFloat> {
    value: Value<T>,
}

impl<T: PrimFloat> Float<T> {
    pub fn new() -> Self {
        Float {
            value: Value::native(),
        }
    }

    pub fn bit_size(&self) -> usize {
        self.value.bit_size()
    }

    pub fn default_value(&self) -> T {
        T::ZERO
    }

    pub fn read(&self, data: &[u8], bit_offset: usize) -> Result<T, ReadError> {
        self.value.read(data, bit_offset)
    }

    pub fn write(&self, data: &mut [u8], bit_offset: usize, value: T) -> Result<(), WriteError> {
        self.value.write(data, bit_offset, value)
    }

    pub fn write_default(&self, data: &mut [u8], bit_offset: usize) -> Result<(), WriteError> {
        self.value.write(data, bit_offset, T::ZERO)
    }
}

impl<T: PrimFloat> Default for Float<T> {
    fn default() -> Self {
        Self::new()
    }
}

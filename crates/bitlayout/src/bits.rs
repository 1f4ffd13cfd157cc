//! Low-level bit read and write utilities for byte slices.
//!
//! Bits are addressed in MSB-first order: bit 0 is the high bit of the first byte.
//! Multi-bit values are read and written as a big-endian bit stream.

use crate::errors::{ReadError, WriteError};

/// Reads a single bit at `bit_pos` (0 = MSB of first byte). Returns 0 or 1.
pub fn read_bit_at(data: &[u8], bit_pos: usize) -> Result<u8, ReadError> {
    if bit_pos >= data.len() * 8 {
        return Err(ReadError::OutOfBounds);
    }

    let byte_index = bit_pos / 8;
    let bit_index = bit_pos % 8;

    Ok((data[byte_index] >> (7 - bit_index)) & 1)
}

/// Reads `n` bits starting at `bit_pos` as an unsigned value (max 64 bits). MSB-first.
pub fn read_bits_at(data: &[u8], bit_pos: usize, n: usize) -> Result<u64, ReadError> {
    if n > 64 {
        return Err(ReadError::TooManyBitsRead);
    }

    if !range_fits(data.len(), bit_pos, n) {
        return Err(ReadError::OutOfBounds);
    }

    let mut value = 0u64;
    let mut pos = bit_pos;

    for _ in 0..n {
        let bit = read_bit_at(data, pos)? as u64;
        value = (value << 1) | bit;
        pos += 1;
    }

    Ok(value)
}

/// Writes the low `n` bits of `value` starting at `bit_pos`. MSB-first.
///
/// Nothing is written unless the whole range fits inside `data`.
pub fn write_bits_at(
    data: &mut [u8],
    bit_pos: usize,
    n: usize,
    value: u64,
) -> Result<(), WriteError> {
    if n > 64 || !range_fits(data.len(), bit_pos, n) {
        return Err(WriteError::OutOfBounds);
    }

    for i in 0..n {
        let bit = ((value >> (n - 1 - i)) & 1) as u8;
        let pos = bit_pos + i;
        let shift = 7 - (pos % 8);
        let byte = &mut data[pos / 8];

        *byte = (*byte & !(1 << shift)) | (bit << shift);
    }

    Ok(())
}

/// Returns true if the bit range `[bit_pos, bit_pos + n)` lies inside `len_bytes` bytes.
pub fn range_fits(len_bytes: usize, bit_pos: usize, n: usize) -> bool {
    len_bytes
        .checked_mul(8)
        .zip(bit_pos.checked_add(n))
        .is_some_and(|(total, end)| end <= total)
}

/// Sign-extends the low `bits` of `value` to a full `i64`.
pub fn sign_extend(value: u64, bits: usize) -> i64 {
    let shift = 64 - bits;
    ((value << shift) as i64) >> shift
}

/// Mask selecting the low `bits` bits.
pub fn mask(bits: usize) -> u64 {
    if bits >= 64 { u64::MAX } else { (1u64 << bits) - 1 }
}

/// Number of bytes needed to hold `bits` bits.
pub const fn bytes_for_bits(bits: usize) -> usize {
    bits.div_ceil(8)
}

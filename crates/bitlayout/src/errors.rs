//! Error types for layout definition, bit access and keyed field access.

use thiserror::Error;

/// Errors produced while defining fields or compiling a [crate::structure::Structure].
///
/// These are programming errors in the layout itself and are reported before any
/// buffer is touched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// Integer range has `min > max`.
    #[error("invalid range: min {min} is greater than max {max}")]
    InvalidRange { min: i128, max: i128 },
    /// Field width is zero or wider than its primitive type.
    #[error("invalid width of {bits} bits for a {max_bits}-bit primitive")]
    InvalidWidth { bits: usize, max_bits: usize },
    /// A default, min or max value cannot be stored in the declared width.
    #[error("value {value} does not fit in {bits} bits")]
    ValueExceedsWidth { value: i128, bits: usize },
    /// Two fields share the same key.
    #[error("duplicate key {0}")]
    DuplicateKey(String),
    /// The reserved end key was used for a real field.
    #[error("key {0} is reserved as the end marker")]
    ReservedKey(String),
    /// Field occupies no bits (empty blob or empty nested structure).
    #[error("field {0} has zero size")]
    EmptyField(String),
    /// Field size or total layout size overflows `usize` bits.
    #[error("layout too large at field {0}")]
    LayoutTooLarge(String),
    /// Primitive type not allowed for this field kind (e.g. `f32` for an integer).
    #[error("unsupported primitive for field {0}")]
    UnsupportedPrimitive(String),
}

/// Errors produced when reading bits from a byte slice.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReadError {
    /// Requested bit range is beyond the end of the data.
    #[error("bit range out of bounds")]
    OutOfBounds,
    /// More than 64 bits were requested in a single read.
    #[error("more than 64 bits requested")]
    TooManyBitsRead,
}

/// Errors produced when writing a field into a buffer. The buffer is left untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WriteError {
    /// Buffer is too short to hold the field.
    #[error("buffer too short for field")]
    OutOfBounds,
    /// Value is outside the field's range and is not its default.
    #[error("value outside the field's valid range")]
    OutOfRange,
    /// No field with this key exists in the structure.
    #[error("unknown key {0}")]
    UnknownKey(String),
    /// Value type or field kind does not match the field definition.
    #[error("type mismatch for key {0}")]
    TypeMismatch(String),
}

/// Errors produced by [crate::reader::Reader] when it is used against the wrong layout.
///
/// Buffer contents never cause these; bad data falls back to defaults instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// No field with this key exists in the structure.
    #[error("unknown key {0}")]
    UnknownKey(String),
    /// Field exists but is of another kind (scalar, blob or nested).
    #[error("key {0} is not a {1} field")]
    KindMismatch(String, &'static str),
    /// Requested Rust type does not match the field's primitive or nested key type.
    #[error("type mismatch for key {0}")]
    TypeMismatch(String),
}

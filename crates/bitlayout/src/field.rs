//! Field definitions used to build a [crate::structure::Structure].

use std::{any::Any, fmt, sync::Arc};

use crate::{
    errors::WriteError,
    float::Float,
    integer::Integer,
    key::Key,
    structure::Structure,
    value::{PrimFloat, PrimInt, Primitive, PrimitiveKind, Scalar},
};

/// Object-safe view over [Integer] and [Float] fields.
pub trait ScalarField: fmt::Debug + Send + Sync {
    fn kind(&self) -> PrimitiveKind;
    fn bit_size(&self) -> usize;
    fn default_scalar(&self) -> Scalar;
    /// `None` when the range is out of bounds or the stored value is invalid.
    fn read_scalar(&self, data: &[u8], bit_offset: usize) -> Option<Scalar>;
    fn write_scalar(&self, data: &mut [u8], bit_offset: usize, value: Scalar)
    -> Result<(), WriteError>;
    fn write_default(&self, data: &mut [u8], bit_offset: usize) -> Result<(), WriteError>;
}

fn expect_kind<T: Primitive>(value: Scalar) -> Result<T, WriteError> {
    T::from_scalar(value).ok_or_else(|| {
        WriteError::TypeMismatch(format!("expected {}, got {}", T::KIND, value.kind()))
    })
}

impl<T: PrimInt> ScalarField for Integer<T> {
    fn kind(&self) -> PrimitiveKind {
        T::KIND
    }

    fn bit_size(&self) -> usize {
        Integer::bit_size(self)
    }

    fn default_scalar(&self) -> Scalar {
        self.default_value().into_scalar()
    }

    fn read_scalar(&self, data: &[u8], bit_offset: usize) -> Option<Scalar> {
        self.read(data, bit_offset).map(Primitive::into_scalar)
    }

    fn write_scalar(
        &self,
        data: &mut [u8],
        bit_offset: usize,
        value: Scalar,
    ) -> Result<(), WriteError> {
        self.write(data, bit_offset, expect_kind(value)?)
    }

    fn write_default(&self, data: &mut [u8], bit_offset: usize) -> Result<(), WriteError> {
        Integer::write_default(self, data, bit_offset)
    }
}

impl<T: PrimFloat> ScalarField for Float<T> {
    fn kind(&self) -> PrimitiveKind {
        T::KIND
    }

    fn bit_size(&self) -> usize {
        Float::bit_size(self)
    }

    fn default_scalar(&self) -> Scalar {
        self.default_value().into_scalar()
    }

    fn read_scalar(&self, data: &[u8], bit_offset: usize) -> Option<Scalar> {
        self.read(data, bit_offset).ok().map(Primitive::into_scalar)
    }

    fn write_scalar(
        &self,
        data: &mut [u8],
        bit_offset: usize,
        value: Scalar,
    ) -> Result<(), WriteError> {
        self.write(data, bit_offset, expect_kind(value)?)
    }

    fn write_default(&self, data: &mut [u8], bit_offset: usize) -> Result<(), WriteError> {
        Float::write_default(self, data, bit_offset)
    }
}

/// A sub-structure embedded as a field. The structure is stored type-erased so
/// that it may use its own key type.
#[derive(Clone)]
pub struct NestedField {
    structure: Arc<dyn Any + Send + Sync>,
    bit_size: usize,
    key_type: &'static str,
}

impl NestedField {
    pub fn new<S: Key>(structure: impl Into<Arc<Structure<S>>>) -> Self {
        let structure: Arc<Structure<S>> = structure.into();

        NestedField {
            bit_size: structure.bit_size(),
            structure,
            key_type: std::any::type_name::<S>(),
        }
    }

    /// The embedded structure, if its key type is `S`.
    pub fn structure<S: Key>(&self) -> Option<&Structure<S>> {
        self.structure.downcast_ref::<Structure<S>>()
    }

    pub fn bit_size(&self) -> usize {
        self.bit_size
    }

    pub fn key_type(&self) -> &'static str {
        self.key_type
    }
}

impl fmt::Debug for NestedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NestedField")
            .field("key_type", &self.key_type)
            .field("bit_size", &self.bit_size)
            .finish()
    }
}

/// What a field holds.
#[derive(Debug)]
pub enum FieldKind {
    /// An [Integer] or [Float].
    Scalar(Box<dyn ScalarField>),
    /// Raw bytes, copied out as-is.
    Blob { len_bytes: usize },
    /// An embedded structure, read through a nested reader.
    Nested(NestedField),
}

impl FieldKind {
    /// Width in bits, or `None` if it does not fit in a `usize`.
    pub fn checked_bit_size(&self) -> Option<usize> {
        match self {
            FieldKind::Scalar(scalar) => Some(scalar.bit_size()),
            FieldKind::Blob { len_bytes } => len_bytes.checked_mul(8),
            FieldKind::Nested(nested) => Some(nested.bit_size()),
        }
    }

    /// Width in bits, saturating at `usize::MAX`. Compiled fields always fit.
    pub fn bit_size(&self) -> usize {
        self.checked_bit_size().unwrap_or(usize::MAX)
    }

    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Scalar(_) => "scalar",
            FieldKind::Blob { .. } => "blob",
            FieldKind::Nested(_) => "nested",
        }
    }
}

/// A single keyed field, in declaration order.
#[derive(Debug)]
pub struct FieldDef<K> {
    pub key: K,
    pub kind: FieldKind,
}

impl<K: Key> FieldDef<K> {
    pub fn integer<T: PrimInt>(key: K, field: Integer<T>) -> Self {
        FieldDef {
            key,
            kind: FieldKind::Scalar(Box::new(field)),
        }
    }

    pub fn float<T: PrimFloat>(key: K, field: Float<T>) -> Self {
        FieldDef {
            key,
            kind: FieldKind::Scalar(Box::new(field)),
        }
    }

    pub fn blob(key: K, len_bytes: usize) -> Self {
        FieldDef {
            key,
            kind: FieldKind::Blob { len_bytes },
        }
    }

    pub fn nested<S: Key>(key: K, structure: impl Into<Arc<Structure<S>>>) -> Self {
        FieldDef {
            key,
            kind: FieldKind::Nested(NestedField::new(structure)),
        }
    }

    pub fn bit_size(&self) -> usize {
        self.kind.bit_size()
    }
}

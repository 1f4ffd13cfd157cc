//! Bounds-checked, read-only access to a buffer through a [Structure].

use std::collections::BTreeMap;

use crate::{
    bits::{self, range_fits},
    errors::AccessError,
    field::{FieldKind, ScalarField},
    key::Key,
    structure::{CompiledField, Structure},
    value::{Primitive, Scalar},
};

/// A view of `data` laid out as `structure`.
///
/// Every accessor checks the field's bit range against the buffer. Fields that
/// do not fit, or whose stored value is invalid, read as their default; the
/// reader never looks past the end of `data`.
///
/// [AccessError] is only returned when the reader is used with a key or type
/// the structure does not declare.
#[derive(Debug)]
pub struct Reader<'a, K: Key> {
    structure: &'a Structure<K>,
    data: &'a [u8],
}

impl<K: Key> Clone for Reader<'_, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K: Key> Copy for Reader<'_, K> {}

impl<'a, K: Key> Reader<'a, K> {
    /// Binds `data` to `structure`. A buffer shorter than the structure is
    /// accepted; fields beyond its end read as defaults.
    pub fn new(structure: &'a Structure<K>, data: &'a [u8]) -> Self {
        if structure.byte_size() > data.len() {
            tracing::warn!(
                required = structure.byte_size(),
                available = data.len(),
                "reader bound to a truncated buffer"
            );
        }

        Reader { structure, data }
    }

    /// The whole underlying buffer.
    pub fn head(&self) -> &'a [u8] {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether the buffer holds every field of the structure.
    pub fn is_complete(&self) -> bool {
        self.structure.byte_size() <= self.data.len()
    }

    pub fn structure(&self) -> &'a Structure<K> {
        self.structure
    }

    /// Reads a scalar field as `T`, falling back to the field's default.
    ///
    /// ```
    /// use bitlayout::{field::FieldDef, integer::Integer, reader::Reader, structure::Structure};
    ///
    /// let structure = Structure::compile(vec![
    ///     FieldDef::integer(0u8, Integer::<u8>::new(8, 0xFF, 0, 100).unwrap()),
    /// ])
    /// .unwrap();
    ///
    /// assert_eq!(Reader::new(&structure, &[42]).get::<u8>(0), Ok(42));
    /// assert_eq!(Reader::new(&structure, &[200]).get::<u8>(0), Ok(0xFF));
    /// assert_eq!(Reader::new(&structure, &[]).get::<u8>(0), Ok(0xFF));
    /// ```
    pub fn get<T: Primitive>(&self, key: K) -> Result<T, AccessError> {
        let (field, scalar) = self.scalar_field(key)?;

        T::from_scalar(self.read_scalar(field, scalar))
            .ok_or_else(|| AccessError::TypeMismatch(key.describe()))
    }

    /// Reads a scalar field without naming its type.
    pub fn get_scalar(&self, key: K) -> Result<Scalar, AccessError> {
        let (field, scalar) = self.scalar_field(key)?;
        Ok(self.read_scalar(field, scalar))
    }

    /// Copies a blob field into `out`. Returns `Ok(false)` and leaves `out`
    /// untouched if the blob does not fit in the buffer or `out` is too small.
    pub fn read_bytes(&self, key: K, out: &mut [u8]) -> Result<bool, AccessError> {
        let field = self.lookup(key)?;

        let FieldKind::Blob { len_bytes } = field.kind else {
            return Err(AccessError::KindMismatch(key.describe(), "blob"));
        };

        let fits = range_fits(self.data.len(), field.bit_offset, field.bit_size());

        if out.len() < len_bytes || !fits {
            tracing::trace!(key = ?key, "blob not readable");
            return Ok(false);
        }

        if field.bit_offset % 8 == 0 {
            let start = field.bit_offset / 8;
            out[..len_bytes].copy_from_slice(&self.data[start..start + len_bytes]);
            return Ok(true);
        }

        for (i, byte) in out[..len_bytes].iter_mut().enumerate() {
            match bits::read_bits_at(self.data, field.bit_offset + i * 8, 8) {
                Ok(value) => *byte = value as u8,
                Err(_) => return Ok(false),
            }
        }

        Ok(true)
    }

    /// Opens a reader over an embedded structure keyed by `S`.
    ///
    /// Returns `Ok(None)` if the field does not start on a byte boundary or the
    /// sub-structure does not fit in the buffer.
    pub fn nested<S: Key>(&self, key: K) -> Result<Option<Reader<'a, S>>, AccessError> {
        let field = self.lookup(key)?;

        let FieldKind::Nested(nested) = &field.kind else {
            return Err(AccessError::KindMismatch(key.describe(), "nested"));
        };

        let structure = nested
            .structure::<S>()
            .ok_or_else(|| AccessError::TypeMismatch(key.describe()))?;

        if field.bit_offset % 8 != 0 {
            tracing::trace!(
                key = ?key,
                bit_offset = field.bit_offset,
                "nested structure not byte aligned"
            );
            return Ok(None);
        }

        let data: &'a [u8] = self.data;
        let start = field.bit_offset / 8;
        let end = start + structure.byte_size();

        if end > data.len() {
            tracing::trace!(key = ?key, "nested structure beyond buffer");
            return Ok(None);
        }

        Ok(Some(Reader::new(structure, &data[start..end])))
    }

    /// Every scalar field with its value, defaults substituted.
    pub fn scalars(&self) -> BTreeMap<K, Scalar> {
        let mut map = BTreeMap::new();

        for field in self.structure.fields() {
            if let FieldKind::Scalar(scalar) = &field.kind {
                map.insert(field.key, self.read_scalar(field, scalar.as_ref()));
            }
        }

        map
    }

    fn lookup(&self, key: K) -> Result<&'a CompiledField<K>, AccessError> {
        let structure: &'a Structure<K> = self.structure;

        structure
            .field(key)
            .ok_or_else(|| AccessError::UnknownKey(key.describe()))
    }

    fn scalar_field(
        &self,
        key: K,
    ) -> Result<(&'a CompiledField<K>, &'a dyn ScalarField), AccessError> {
        let field = self.lookup(key)?;

        match &field.kind {
            FieldKind::Scalar(scalar) => Ok((field, scalar.as_ref())),
            _ => Err(AccessError::KindMismatch(key.describe(), "scalar")),
        }
    }

    fn read_scalar(&self, field: &CompiledField<K>, scalar: &dyn ScalarField) -> Scalar {
        let value = if range_fits(self.data.len(), field.bit_offset, field.bit_size()) {
            scalar.read_scalar(self.data, field.bit_offset)
        } else {
            None
        };

        value.unwrap_or_else(|| {
            tracing::trace!(key = ?field.key, "falling back to default");
            scalar.default_scalar()
        })
    }
}

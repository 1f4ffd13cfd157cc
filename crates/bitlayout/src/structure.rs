//! Structure: compiled field layout with precomputed bit offsets.

use std::collections::BTreeMap;

use crate::{
    bits::{self, bytes_for_bits, range_fits},
    errors::{LayoutError, WriteError},
    field::{FieldDef, FieldKind},
    key::Key,
    value::Scalar,
};

/// A field after compilation: its definition plus its absolute bit offset.
#[derive(Debug)]
pub struct CompiledField<K> {
    pub key: K,
    pub bit_offset: usize,
    pub kind: FieldKind,
}

impl<K> CompiledField<K> {
    pub fn bit_size(&self) -> usize {
        self.kind.bit_size()
    }

    /// Bit offset one past the field's last bit.
    pub fn end(&self) -> usize {
        self.bit_offset + self.bit_size()
    }
}

/// A compiled layout. Fields are packed back to back in declaration order, so
/// each field's offset is the sum of the widths declared before it.
///
/// Use [Structure::compile] to build one, then bind it to a buffer with
/// [crate::reader::Reader::new].
#[derive(Debug)]
pub struct Structure<K: Key> {
    fields: Vec<CompiledField<K>>,
    index: BTreeMap<K, usize>,
    total_bits: usize,
}

impl<K: Key> Structure<K> {
    /// Compiles fields into a structure. Fails on duplicate keys, use of
    /// [Key::END], zero-sized fields or a total size that overflows `usize`.
    pub fn compile(fields: Vec<FieldDef<K>>) -> Result<Self, LayoutError> {
        let mut compiled_fields: Vec<CompiledField<K>> = Vec::with_capacity(fields.len());
        let mut index = BTreeMap::new();
        let mut total_bits: usize = 0;

        for field in fields {
            if field.key == K::END {
                return Err(LayoutError::ReservedKey(field.key.describe()));
            }

            let bit_size = field
                .kind
                .checked_bit_size()
                .ok_or_else(|| LayoutError::LayoutTooLarge(field.key.describe()))?;

            if bit_size == 0 {
                return Err(LayoutError::EmptyField(field.key.describe()));
            }

            if index.insert(field.key, compiled_fields.len()).is_some() {
                return Err(LayoutError::DuplicateKey(field.key.describe()));
            }

            let bit_offset = total_bits;
            total_bits = total_bits
                .checked_add(bit_size)
                .ok_or_else(|| LayoutError::LayoutTooLarge(field.key.describe()))?;

            compiled_fields.push(CompiledField {
                key: field.key,
                bit_offset,
                kind: field.kind,
            });
        }

        tracing::debug!(
            fields = compiled_fields.len(),
            bits = total_bits,
            "compiled structure"
        );

        Ok(Self {
            fields: compiled_fields,
            index,
            total_bits,
        })
    }

    pub fn field(&self, key: K) -> Option<&CompiledField<K>> {
        self.index.get(&key).map(|&i| &self.fields[i])
    }

    /// Compiled fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &CompiledField<K>> {
        self.fields.iter()
    }

    pub fn contains(&self, key: K) -> bool {
        self.index.contains_key(&key)
    }

    pub fn bit_offset(&self, key: K) -> Option<usize> {
        self.field(key).map(|field| field.bit_offset)
    }

    pub fn bit_size(&self) -> usize {
        self.total_bits
    }

    pub fn byte_size(&self) -> usize {
        bytes_for_bits(self.total_bits)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Writes one scalar field. Invalid values and short buffers leave `data` unchanged.
    pub fn write(
        &self,
        data: &mut [u8],
        key: K,
        value: impl Into<Scalar>,
    ) -> Result<(), WriteError> {
        let value = value.into();
        let field = self.writable(key)?;

        let FieldKind::Scalar(scalar) = &field.kind else {
            return Err(WriteError::TypeMismatch(key.describe()));
        };

        if scalar.kind() != value.kind() {
            return Err(WriteError::TypeMismatch(key.describe()));
        }

        scalar.write_scalar(data, field.bit_offset, value)
    }

    /// Writes the default of one scalar field.
    pub fn write_default(&self, data: &mut [u8], key: K) -> Result<(), WriteError> {
        let field = self.writable(key)?;

        match &field.kind {
            FieldKind::Scalar(scalar) => scalar.write_default(data, field.bit_offset),
            _ => Err(WriteError::TypeMismatch(key.describe())),
        }
    }

    /// Copies `bytes` into a blob field. `bytes` must match the blob length exactly.
    pub fn write_bytes(&self, data: &mut [u8], key: K, bytes: &[u8]) -> Result<(), WriteError> {
        let field = self.writable(key)?;

        match field.kind {
            FieldKind::Blob { len_bytes } if len_bytes == bytes.len() => {
                if !range_fits(data.len(), field.bit_offset, field.bit_size()) {
                    return Err(WriteError::OutOfBounds);
                }

                for (i, byte) in bytes.iter().enumerate() {
                    bits::write_bits_at(data, field.bit_offset + i * 8, 8, *byte as u64)?;
                }

                Ok(())
            }
            _ => Err(WriteError::TypeMismatch(key.describe())),
        }
    }

    fn writable(&self, key: K) -> Result<&CompiledField<K>, WriteError> {
        self.field(key)
            .ok_or_else(|| WriteError::UnknownKey(key.describe()))
    }
}

#[cfg(test)]
mod tests {
    use crate::{float::Float, integer::Integer};

    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    enum Frame {
        Id,
        Flags,
        Pressure,
        Serial,
        End,
    }

    impl Key for Frame {
        const END: Self = Frame::End;
    }

    fn frame() -> Structure<Frame> {
        Structure::compile(vec![
            FieldDef::integer(Frame::Id, Integer::<u16>::new(12, 0, 0, 4000).unwrap()),
            FieldDef::integer(Frame::Flags, Integer::<u8>::new(4, 0, 0, 15).unwrap()),
            FieldDef::float(Frame::Pressure, Float::<f32>::new()),
            FieldDef::blob(Frame::Serial, 3),
        ])
        .unwrap()
    }

    #[test]
    fn test_compile_empty() {
        let structure = Structure::<Frame>::compile(vec![]).unwrap();
        assert!(structure.is_empty());
        assert_eq!(structure.bit_size(), 0);
        assert_eq!(structure.byte_size(), 0);
    }

    #[test]
    fn test_offsets_are_cumulative() {
        let structure = frame();
        assert_eq!(structure.bit_offset(Frame::Id), Some(0));
        assert_eq!(structure.bit_offset(Frame::Flags), Some(12));
        assert_eq!(structure.bit_offset(Frame::Pressure), Some(16));
        assert_eq!(structure.bit_offset(Frame::Serial), Some(48));
        assert_eq!(structure.bit_offset(Frame::End), None);
        assert_eq!(structure.bit_size(), 72);
        assert_eq!(structure.byte_size(), 9);
        assert_eq!(structure.len(), 4);
    }

    #[test]
    fn test_byte_size_rounds_up() {
        let structure = Structure::compile(vec![FieldDef::integer(
            1u8,
            Integer::<u8>::new(3, 0, 0, 7).unwrap(),
        )])
        .unwrap();
        assert_eq!(structure.bit_size(), 3);
        assert_eq!(structure.byte_size(), 1);
    }

    #[test]
    fn test_fields_in_declaration_order() {
        let structure = frame();
        let keys: Vec<Frame> = structure.fields().map(|f| f.key).collect();
        assert_eq!(keys, vec![Frame::Id, Frame::Flags, Frame::Pressure, Frame::Serial]);
        assert_eq!(structure.field(Frame::Serial).unwrap().end(), 72);
    }

    #[test]
    fn test_duplicate_key() {
        let result = Structure::compile(vec![
            FieldDef::blob(Frame::Id, 1),
            FieldDef::blob(Frame::Id, 1),
        ]);
        assert_eq!(result.unwrap_err(), LayoutError::DuplicateKey("Id".to_string()));
    }

    #[test]
    fn test_reserved_key() {
        let result = Structure::compile(vec![FieldDef::blob(Frame::End, 1)]);
        assert_eq!(result.unwrap_err(), LayoutError::ReservedKey("End".to_string()));
    }

    #[test]
    fn test_empty_field() {
        let result = Structure::compile(vec![FieldDef::blob(Frame::Serial, 0)]);
        assert_eq!(result.unwrap_err(), LayoutError::EmptyField("Serial".to_string()));
    }

    #[test]
    fn test_blob_too_large() {
        let result = Structure::compile(vec![
            FieldDef::blob(Frame::Id, usize::MAX / 8 + 2),
            FieldDef::blob(Frame::Flags, 1),
        ]);
        assert_eq!(result.unwrap_err(), LayoutError::LayoutTooLarge("Id".to_string()));
    }

    #[test]
    fn test_total_size_overflow() {
        let result = Structure::compile(vec![
            FieldDef::blob(Frame::Id, usize::MAX / 8),
            FieldDef::blob(Frame::Flags, 1),
        ]);
        assert_eq!(result.unwrap_err(), LayoutError::LayoutTooLarge("Flags".to_string()));
    }

    #[test]
    fn test_write_fields() {
        let structure = frame();
        let mut data = [0u8; 9];

        structure.write(&mut data, Frame::Id, 0xABCu16).unwrap();
        structure.write(&mut data, Frame::Flags, 0x5u8).unwrap();
        structure.write(&mut data, Frame::Pressure, 1.0f32).unwrap();
        structure.write_bytes(&mut data, Frame::Serial, &[1, 2, 3]).unwrap();

        assert_eq!(data, [0xAB, 0xC5, 0x3F, 0x80, 0x00, 0x00, 1, 2, 3]);
    }

    #[test]
    fn test_write_errors() {
        let structure = frame();
        let mut data = [0u8; 9];

        assert_eq!(
            structure.write(&mut data, Frame::Id, 4001u16),
            Err(WriteError::OutOfRange)
        );
        assert_eq!(
            structure.write(&mut data, Frame::Id, 1u8),
            Err(WriteError::TypeMismatch("Id".to_string()))
        );
        assert_eq!(
            structure.write(&mut data, Frame::Serial, 1u8),
            Err(WriteError::TypeMismatch("Serial".to_string()))
        );
        assert_eq!(
            structure.write(&mut data, Frame::End, 1u8),
            Err(WriteError::UnknownKey("End".to_string()))
        );
        assert_eq!(
            structure.write_bytes(&mut data, Frame::Serial, &[1, 2]),
            Err(WriteError::TypeMismatch("Serial".to_string()))
        );
        assert_eq!(data, [0u8; 9]);
    }

    #[test]
    fn test_write_short_buffer() {
        let structure = frame();
        let mut data = [0u8; 8];

        assert_eq!(
            structure.write_bytes(&mut data, Frame::Serial, &[1, 2, 3]),
            Err(WriteError::OutOfBounds)
        );
        assert_eq!(data, [0u8; 8]);
        assert_eq!(structure.write(&mut data, Frame::Id, 7u16), Ok(()));
    }

    #[test]
    fn test_write_default() {
        let structure = Structure::compile(vec![FieldDef::integer(
            Frame::Id,
            Integer::<i8>::new(8, -128, -40, 125).unwrap(),
        )])
        .unwrap();
        let mut data = [0u8; 1];
        structure.write_default(&mut data, Frame::Id).unwrap();
        assert_eq!(data, [0x80]);
    }
}

//! JSON-deserializable structure descriptions.
//!
//! These types describe a layout as data, for example a frame definition shipped
//! next to an application, and compile into a [crate::structure::Structure]
//! through `Structure::try_from`. The key type is any [Key] that also
//! implements `Deserialize`, typically a fieldless enum.
//!
//! ```json
//! {
//!   "fields": [
//!     { "key": "Temperature",
//!       "kind": { "type": "Integer", "primitive": "I8", "default": -128, "min": -40, "max": 125 } },
//!     { "key": "Pressure", "kind": { "type": "Float", "primitive": "F32" } },
//!     { "key": "Serial", "kind": { "type": "Blob", "len_bytes": 6 } }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::{
    errors::LayoutError,
    field::FieldDef as Field,
    float::Float,
    integer::Integer,
    key::Key,
    structure::Structure,
    value::PrimInt,
};

/// Primitive type of a scalar field.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveDef {
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

/// Top-level structure definition: fields in layout order.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StructureDef<K> {
    pub fields: Vec<FieldDef<K>>,
}

/// Description of a single field.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FieldDef<K> {
    pub key: K,
    pub kind: FieldKindDef<K>,
}

/// Integer bound as written in the definition. Either form covers the full
/// range of the `u64` and `i64` primitives.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(untagged)]
pub enum IntegerValue {
    Signed(i64),
    Unsigned(u64),
}

impl From<IntegerValue> for i128 {
    fn from(value: IntegerValue) -> Self {
        match value {
            IntegerValue::Signed(v) => v as i128,
            IntegerValue::Unsigned(v) => v as i128,
        }
    }
}

/// Kind of field in the structure, tagged by `"type"`.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(tag = "type")]
pub enum FieldKindDef<K> {
    /// Range-checked integer. Omitted values default to the native width,
    /// a default of 0 and the full range of the primitive.
    Integer {
        primitive: PrimitiveDef,
        #[serde(default)]
        bits: Option<usize>,
        #[serde(default)]
        default: Option<IntegerValue>,
        #[serde(default)]
        min: Option<IntegerValue>,
        #[serde(default)]
        max: Option<IntegerValue>,
    },
    /// IEEE-754 float; `primitive` must be `F32` or `F64`.
    Float { primitive: PrimitiveDef },
    /// Raw bytes.
    Blob { len_bytes: usize },
    /// Embedded structure sharing the parent's key type.
    Nested { structure: StructureDef<K> },
}

impl<K: Key> TryFrom<StructureDef<K>> for Structure<K> {
    type Error = LayoutError;

    fn try_from(value: StructureDef<K>) -> Result<Self, Self::Error> {
        let fields = value
            .fields
            .into_iter()
            .map(Field::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Structure::compile(fields)
    }
}

impl<K: Key> TryFrom<FieldDef<K>> for Field<K> {
    type Error = LayoutError;

    fn try_from(value: FieldDef<K>) -> Result<Self, Self::Error> {
        let key = value.key;

        match value.kind {
            FieldKindDef::Integer {
                primitive,
                bits,
                default,
                min,
                max,
            } => {
                let bounds = Bounds {
                    bits,
                    default: default.map(i128::from),
                    min: min.map(i128::from),
                    max: max.map(i128::from),
                };

                match primitive {
                    PrimitiveDef::U8 => integer::<K, u8>(key, bounds),
                    PrimitiveDef::U16 => integer::<K, u16>(key, bounds),
                    PrimitiveDef::U32 => integer::<K, u32>(key, bounds),
                    PrimitiveDef::U64 => integer::<K, u64>(key, bounds),
                    PrimitiveDef::I8 => integer::<K, i8>(key, bounds),
                    PrimitiveDef::I16 => integer::<K, i16>(key, bounds),
                    PrimitiveDef::I32 => integer::<K, i32>(key, bounds),
                    PrimitiveDef::I64 => integer::<K, i64>(key, bounds),
                    PrimitiveDef::F32 | PrimitiveDef::F64 => {
                        Err(LayoutError::UnsupportedPrimitive(key.describe()))
                    }
                }
            }
            FieldKindDef::Float { primitive } => match primitive {
                PrimitiveDef::F32 => Ok(Field::float(key, Float::<f32>::new())),
                PrimitiveDef::F64 => Ok(Field::float(key, Float::<f64>::new())),
                _ => Err(LayoutError::UnsupportedPrimitive(key.describe())),
            },
            FieldKindDef::Blob { len_bytes } => Ok(Field::blob(key, len_bytes)),
            FieldKindDef::Nested { structure } => {
                Ok(Field::nested(key, Structure::try_from(structure)?))
            }
        }
    }
}

struct Bounds {
    bits: Option<usize>,
    default: Option<i128>,
    min: Option<i128>,
    max: Option<i128>,
}

fn integer<K: Key, T: PrimInt>(key: K, bounds: Bounds) -> Result<Field<K>, LayoutError> {
    let bits = bounds.bits.unwrap_or(T::KIND.bits());
    let convert = |value: Option<i128>, fallback: T| match value {
        Some(v) => T::from_i128(v).ok_or(LayoutError::ValueExceedsWidth { value: v, bits }),
        None => Ok(fallback),
    };

    let default = convert(bounds.default, T::ZERO)?;
    let min = convert(bounds.min, T::MIN_VALUE)?;
    let max = convert(bounds.max, T::MAX_VALUE)?;

    Ok(Field::integer(key, Integer::new(bits, default, min, max)?))
}

#[cfg(test)]
mod tests {
    use crate::{reader::Reader, value::Scalar};

    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize)]
    enum Sensor {
        Temperature,
        Pressure,
        Serial,
        Location,
        Latitude,
        End,
    }

    impl Key for Sensor {
        const END: Self = Sensor::End;
    }

    #[test]
    fn test_compile_from_json() {
        let json = r#"{
            "fields": [
                { "key": "Temperature",
                  "kind": { "type": "Integer", "primitive": "I8", "default": -128, "min": -40, "max": 125 } },
                { "key": "Pressure", "kind": { "type": "Float", "primitive": "F32" } },
                { "key": "Serial", "kind": { "type": "Blob", "len_bytes": 2 } }
            ]
        }"#;

        let def: StructureDef<Sensor> = serde_json::from_str(json).unwrap();
        let structure = Structure::try_from(def).unwrap();

        assert_eq!(structure.bit_offset(Sensor::Pressure), Some(8));
        assert_eq!(structure.bit_offset(Sensor::Serial), Some(40));
        assert_eq!(structure.byte_size(), 7);

        let data = [200u8, 0, 0, 0, 0, 0xAB, 0xCD];
        let reader = Reader::new(&structure, &data);
        assert_eq!(reader.get::<i8>(Sensor::Temperature), Ok(-128));

        let data = [25u8, 0, 0, 0, 0, 0xAB, 0xCD];
        let reader = Reader::new(&structure, &data);
        assert_eq!(reader.get::<i8>(Sensor::Temperature), Ok(25));
    }

    #[test]
    fn test_integer_defaults() {
        let json = r#"{ "fields": [
            { "key": "Temperature", "kind": { "type": "Integer", "primitive": "U16", "bits": 12 } }
        ] }"#;

        let def: StructureDef<Sensor> = serde_json::from_str(json).unwrap();
        assert_eq!(
            Structure::try_from(def).unwrap_err(),
            LayoutError::ValueExceedsWidth { value: 65535, bits: 12 }
        );

        let json = r#"{ "fields": [
            { "key": "Temperature", "kind": { "type": "Integer", "primitive": "U16", "bits": 12, "max": 4095 } }
        ] }"#;

        let def: StructureDef<Sensor> = serde_json::from_str(json).unwrap();
        let structure = Structure::try_from(def).unwrap();
        assert_eq!(structure.bit_size(), 12);
    }

    #[test]
    fn test_nested_definition() {
        let json = r#"{ "fields": [
            { "key": "Temperature", "kind": { "type": "Integer", "primitive": "U8" } },
            { "key": "Location", "kind": { "type": "Nested", "structure": { "fields": [
                { "key": "Latitude", "kind": { "type": "Float", "primitive": "F64" } }
            ] } } }
        ] }"#;

        let def: StructureDef<Sensor> = serde_json::from_str(json).unwrap();
        let structure = Structure::try_from(def).unwrap();
        assert_eq!(structure.byte_size(), 9);

        let mut data = vec![7u8];
        data.extend_from_slice(&51.5f64.to_be_bytes());
        let reader = Reader::new(&structure, &data);

        let location = reader.nested::<Sensor>(Sensor::Location).unwrap().unwrap();
        assert_eq!(location.get_scalar(Sensor::Latitude), Ok(Scalar::F64(51.5)));
    }

    #[test]
    fn test_type_tagged_document() {
        let json = r#"{"fields":[{"key":"Temperature","kind":{"type":"Integer","primitive":"I8","bits":8,"default":-128,"min":-40,"max":125}}]}"#;

        let def: StructureDef<Sensor> = serde_json::from_str(json).unwrap();
        let structure = Structure::try_from(def).unwrap();
        assert_eq!(structure.bit_size(), 8);

        let reader = Reader::new(&structure, &[0x80]);
        assert_eq!(reader.get::<i8>(Sensor::Temperature), Ok(-128));

        let json = r#"{"fields":[{"key":1,"kind":{"type":"Integer","primitive":"I8","bits":8,"default":-128,"min":-40,"max":125}}]}"#;
        let def: StructureDef<u8> = serde_json::from_str(json).unwrap();
        assert_eq!(Structure::try_from(def).unwrap().bit_offset(1), Some(0));
    }

    #[test]
    fn test_externally_tagged_kind_is_rejected() {
        let json = r#"{ "fields": [
            { "key": "Pressure", "kind": { "Float": { "primitive": "F32" } } }
        ] }"#;
        assert!(serde_json::from_str::<StructureDef<Sensor>>(json).is_err());
    }

    #[test]
    fn test_u64_bounds() {
        let json = r#"{ "fields": [
            { "key": "Serial", "kind": { "type": "Integer", "primitive": "U64",
              "default": 18446744073709551615, "min": 0, "max": 9223372036854775808 } }
        ] }"#;

        let def: StructureDef<Sensor> = serde_json::from_str(json).unwrap();
        let structure = Structure::try_from(def).unwrap();

        let data = u64::MAX.to_be_bytes();
        let reader = Reader::new(&structure, &data);
        assert_eq!(reader.get::<u64>(Sensor::Serial), Ok(u64::MAX));

        let data = (1u64 << 63).to_be_bytes();
        let reader = Reader::new(&structure, &data);
        assert_eq!(reader.get::<u64>(Sensor::Serial), Ok(1 << 63));
    }

    #[test]
    fn test_oversized_blob_definition() {
        let json = format!(
            r#"{{ "fields": [ {{ "key": "Serial", "kind": {{ "type": "Blob", "len_bytes": {} }} }} ] }}"#,
            usize::MAX / 8 + 2
        );

        let def: StructureDef<Sensor> = serde_json::from_str(&json).unwrap();
        assert_eq!(
            Structure::try_from(def).unwrap_err(),
            LayoutError::LayoutTooLarge("Serial".to_string())
        );
    }

    #[test]
    fn test_invalid_definitions() {
        let json = r#"{ "fields": [
            { "key": "Pressure", "kind": { "type": "Float", "primitive": "U32" } }
        ] }"#;
        let def: StructureDef<Sensor> = serde_json::from_str(json).unwrap();
        assert_eq!(
            Structure::try_from(def).unwrap_err(),
            LayoutError::UnsupportedPrimitive("Pressure".to_string())
        );

        let json = r#"{ "fields": [
            { "key": "Temperature", "kind": { "type": "Integer", "primitive": "I8", "min": 10, "max": -10 } }
        ] }"#;
        let def: StructureDef<Sensor> = serde_json::from_str(json).unwrap();
        assert_eq!(
            Structure::try_from(def).unwrap_err(),
            LayoutError::InvalidRange { min: 10, max: -10 }
        );

        let json = r#"{ "fields": [
            { "key": "End", "kind": { "type": "Blob", "len_bytes": 1 } }
        ] }"#;
        let def: StructureDef<Sensor> = serde_json::from_str(json).unwrap();
        assert_eq!(
            Structure::try_from(def).unwrap_err(),
            LayoutError::ReservedKey("End".to_string())
        );
    }
}

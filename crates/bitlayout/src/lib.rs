//! # bitlayout
//!
//! Typed, bounds-checked access to fields packed at arbitrary bit offsets in a
//! byte buffer.
//!
//! Describe a layout once as a [structure::Structure]: an ordered list of keyed
//! fields, each an [integer::Integer] with a valid range and default, a
//! [float::Float], a raw byte blob or another structure. Offsets follow from
//! declaration order. Then bind any buffer to it with a [reader::Reader]; reads
//! never go past the buffer and fall back to the field's default when the
//! buffer is short or the stored value is out of range.
//!
//! ## Wire format
//!
//! Bits are numbered MSB-first: bit 0 is the high bit of the first byte. A field
//! of `n` bits is stored as an `n`-bit big-endian number, signed integers in
//! two's complement, floats as their IEEE-754 bit pattern. The layout does not
//! depend on the host.
//!
//! ## Example
//!
//! ```
//! use bitlayout::errors::WriteError;
//! use bitlayout::field::FieldDef;
//! use bitlayout::integer::Integer;
//! use bitlayout::key::Key;
//! use bitlayout::reader::Reader;
//! use bitlayout::structure::Structure;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
//! enum Sensor {
//!     Temperature,
//!     Humidity,
//!     End,
//! }
//!
//! impl Key for Sensor {
//!     const END: Self = Sensor::End;
//! }
//!
//! let structure = Structure::compile(vec![
//!     FieldDef::integer(Sensor::Temperature, Integer::<i8>::new(8, -128, -40, 125).unwrap()),
//!     FieldDef::integer(Sensor::Humidity, Integer::<u8>::new(7, 127, 0, 100).unwrap()),
//! ])
//! .unwrap();
//!
//! let mut data = [0u8; 2];
//! assert_eq!(
//!     structure.write(&mut data, Sensor::Temperature, -100i8),
//!     Err(WriteError::OutOfRange)
//! );
//! structure.write(&mut data, Sensor::Temperature, 25i8).unwrap();
//! structure.write(&mut data, Sensor::Humidity, 40u8).unwrap();
//!
//! let reader = Reader::new(&structure, &data);
//! assert_eq!(reader.get::<i8>(Sensor::Temperature), Ok(25));
//! assert_eq!(reader.get::<u8>(Sensor::Humidity), Ok(40));
//!
//! // A truncated buffer reads as defaults.
//! let reader = Reader::new(&structure, &data[..1]);
//! assert_eq!(reader.get::<u8>(Sensor::Humidity), Ok(127));
//! ```

pub mod bits;
pub mod errors;
pub mod field;
pub mod float;
pub mod integer;
pub mod key;
pub mod reader;
#[cfg(feature = "serde")]
pub mod serde;
pub mod structure;
pub mod value;

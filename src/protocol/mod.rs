// Wire-level building blocks
//
// Cursor and primitive reads, the dict_t decoder, shared composite
// structures and the field descriptors every decoded item is tagged with.

pub mod cursor;
pub mod dict;
pub mod encode;
pub mod error;
pub mod fields;
pub mod structs;
pub mod value;

pub use error::{DecodeError, DecodeResult};

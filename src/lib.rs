#![warn(rust_2018_idioms)]

//! Decoding and encoding of CFF font sets.
//!
//! A [FontSet](cff::FontSet) is read from a byte slice with
//! [ReadScope](binary::read::ReadScope), inspected font by font, dumped as
//! XML and written back out with [WriteBinary](binary::write::WriteBinary).

/// Reading and writing of binary data.
pub mod binary;
pub mod cff;
pub mod error;
pub mod size;
/// Shared test code.
#[cfg(test)]
pub mod tests;

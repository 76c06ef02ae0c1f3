//! Byte helpers: varints for composite keys, hex for display.

pub mod coding;
pub mod varint;

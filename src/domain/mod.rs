//! Document-specific interpretation of merged OCR lines.

pub mod cccd;

pub use cccd::{CccdField, CccdRecord, FieldExtractor};

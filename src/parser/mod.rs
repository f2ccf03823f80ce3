//! Low-level parsing infrastructure.
//!
//! Byte-level reading with comment skipping and quote-aware labels, the
//! shared error type, and label quoting used when writing trees back out.

pub mod byte_parser;
pub mod byte_source;
pub mod parsing_error;
pub mod utils;

pub use parsing_error::{ParsingError, ParsingErrorType};

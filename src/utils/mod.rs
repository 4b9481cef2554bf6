//! Utility modules.

pub mod file;

pub use file::{read_records, read_source, verify_records, write_records};

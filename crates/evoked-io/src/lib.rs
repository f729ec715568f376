#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Comma separated matrix files.
pub mod csv;

pub use csv::{parse_matrix_csv, read_matrix_csv, CsvError};

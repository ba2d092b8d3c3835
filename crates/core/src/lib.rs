//! Core library: directory scanning, rip filename parsing, catalog queries.

pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod parser;
pub mod scanner;

pub use catalog::Catalog;
pub use error::{DirectoryProblem, ScanError};
pub use models::{MovieRip, ReleaseYear};
pub use scanner::{RipScanner, ScanReport};

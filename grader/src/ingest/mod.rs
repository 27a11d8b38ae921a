//!
//! Ingest Module
//!
//! The ingestion pipeline turns a file on disk into a validated exam model:
//! format sniffing ([`sniffer`]), encoding-resilient reading ([`encoding`]),
//! parsing, identifier conflict resolution, and structural validation, all
//! orchestrated by [`loader`]. Every failure mode is reported through the
//! loader's structured result; "no result" is not an outcome.

pub mod encoding;
pub mod loader;
pub mod sniffer;

pub use loader::{LoadResult, load};
pub use sniffer::ExamFileFormat;

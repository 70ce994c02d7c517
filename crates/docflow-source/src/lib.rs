//! # docflow source
//!
//! Readers that turn on-disk logs into `docflow-core` rows:
//! VBFA tables stored as Parquet, and OCEL 1.0 logs in their JSON and XML
//! serializations.

pub mod error;
pub mod ocel;
pub mod vbfa;

pub use error::{SourceError, SourceResult};
pub use ocel::read_ocel;
pub use vbfa::{read_parquet, VbfaTable};

//! Build a flat allele-frequency table for one population from a directory
//! of gzip-compressed VCFs.
pub mod error;
pub mod files;
pub mod frequency;
pub mod pipeline;
pub mod rows;
pub mod variant;
pub mod writer;

pub use error::{Error, Result};
pub use frequency::PopulationKey;
pub use pipeline::{Config, Extractor};
pub use rows::{Decision, MalformedPolicy, OutputRow, SkipCounts};

use std::path::PathBuf;

/// Result type used throughout vcfaf.
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal errors. Per-line skips (multiallelic sites, missing or unparsable
/// frequencies) are not errors and never show up here.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Opening, reading or writing a file, or listing the input directory, failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// htslib could not open a compressed stream or create a thread pool.
    #[error("htslib error: {0}")]
    Hts(#[from] rust_htslib::errors::Error),

    /// A data line had fewer than the eight fixed VCF columns.
    #[error("{}:{line}: malformed record with {fields} tab-delimited field(s), expected at least 8", .path.display())]
    MalformedRecord {
        path: PathBuf,
        line: usize,
        fields: usize,
    },

    #[error("invalid population code '{0}': must be non-empty and contain no whitespace, '=' or ';'")]
    InvalidPopulation(String),

    #[error("input path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
}

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// File-name suffix of the inputs we pick up from the input directory.
pub const VCF_GZ_SUFFIX: &str = ".vcf.gz";

/// List the compressed VCFs directly inside `dir`, ordered by the raw bytes of
/// their file names. Output row order follows this order, so it must not
/// depend on how the filesystem happens to enumerate entries.
///
/// Subdirectories are not descended into, and entries that are not regular
/// files (after following symlinks) are ignored even if their name matches.
pub fn vcf_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !std::fs::metadata(dir)?.is_dir() {
        return Err(Error::NotADirectory(dir.to_path_buf()));
    }

    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        if !name.as_encoded_bytes().ends_with(VCF_GZ_SUFFIX.as_bytes()) {
            continue;
        }
        let path = entry.path();
        if !path.is_file() {
            log::debug!("ignoring non-file entry {}", path.display());
            continue;
        }
        names.push(name);
    }
    names.sort_unstable_by(|a, b| a.as_encoded_bytes().cmp(b.as_encoded_bytes()));

    Ok(names.into_iter().map(|name| dir.join(name)).collect())
}

//! Output layout shared with downstream consumers:
//!
//! - trim: `{output_dir}/trimmed_<basename>`
//! - separation: `{output_dir}/<basename-without-ext>/<stem>.wav`

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    config::TrimNaming,
    error::{Result, WorkerError},
};

fn base_name(source: &Path) -> Result<&str> {
    source
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            WorkerError::InvalidRequest(format!("Source has no file name: {}", source.display()))
        })
}

fn stem_name(source: &Path) -> Result<&str> {
    source
        .file_stem()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            WorkerError::InvalidRequest(format!("Source has no file name: {}", source.display()))
        })
}

pub fn trimmed_path(output_dir: &Path, source: &Path, naming: TrimNaming) -> Result<PathBuf> {
    let file_name = match naming {
        // Keeps the source extension even though the payload is always WAV.
        TrimNaming::PreserveExtension => format!("trimmed_{}", base_name(source)?),
        TrimNaming::WavExtension => format!("trimmed_{}.wav", stem_name(source)?),
    };
    Ok(output_dir.join(file_name))
}

pub fn stem_dir(output_dir: &Path, source: &Path) -> Result<PathBuf> {
    Ok(output_dir.join(stem_name(source)?))
}

pub fn stem_path(stem_dir: &Path, stem: &str) -> PathBuf {
    stem_dir.join(format!("{stem}.wav"))
}

/// Exists-or-create. Losing a creation race to another job is not an error.
pub fn ensure_dir(path: &Path) -> Result<()> {
    match fs::create_dir_all(path) {
        Ok(()) => Ok(()),
        Err(_) if path.is_dir() => Ok(()),
        Err(e) => Err(e.into()),
    }
}

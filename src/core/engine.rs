use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use tempfile::{Builder, NamedTempFile};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::{
    config::{TrimNaming, WorkerConfig},
    core::{
        audio::{probe_audio, read_audio, write_audio},
        dsp::{seconds_to_millis, slice_millis},
    },
    error::{Result, WorkerError},
    io::paths::{ensure_dir, stem_dir, stem_path, trimmed_path},
    model::{
        backend::{backend_from_config, SeparationBackend},
        registry::{resolve_layout, StemLayout},
    },
};

/// Performs trims and stem separations, writing results under one base
/// directory. Immutable after construction; share it behind an `Arc`.
pub struct ProcessingEngine {
    output_dir: PathBuf,
    trim_naming: TrimNaming,
    backend: Arc<dyn SeparationBackend>,
}

pub fn validate_range(start_seconds: f64, end_seconds: f64) -> Result<()> {
    let ok = start_seconds.is_finite()
        && end_seconds.is_finite()
        && start_seconds >= 0.0
        && end_seconds > start_seconds;
    if ok {
        Ok(())
    } else {
        Err(WorkerError::InvalidRange {
            start: start_seconds,
            end: end_seconds,
        })
    }
}

fn require_source(source: &Path) -> Result<()> {
    if source.is_file() {
        Ok(())
    } else {
        Err(WorkerError::NotFound {
            path: source.display().to_string(),
        })
    }
}

impl ProcessingEngine {
    /// Creates the base output directory if it does not exist yet.
    pub fn new(output_dir: impl Into<PathBuf>, backend: Arc<dyn SeparationBackend>) -> Result<Self> {
        let output_dir = output_dir.into();
        ensure_dir(&output_dir)?;
        info!(
            output_dir = %output_dir.display(),
            backend = backend.name(),
            simulated = backend.is_simulated(),
            "Processing engine ready"
        );
        Ok(Self {
            output_dir,
            trim_naming: TrimNaming::default(),
            backend,
        })
    }

    pub fn from_config(cfg: &WorkerConfig) -> Result<Self> {
        let backend = backend_from_config(&cfg.separation);
        Ok(Self::new(cfg.output_dir.clone(), backend)?.with_trim_naming(cfg.trim_naming))
    }

    pub fn with_trim_naming(mut self, naming: TrimNaming) -> Self {
        self.trim_naming = naming;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn backend(&self) -> &dyn SeparationBackend {
        self.backend.as_ref()
    }

    /// Layout for `stem_count`, if it is registered and the active backend
    /// can produce it.
    pub fn stem_layout(&self, stem_count: u32) -> Result<&'static StemLayout> {
        let layout = resolve_layout(stem_count)?;
        if !self.backend.supports_stem_count(stem_count) {
            return Err(WorkerError::InvalidRequest(format!(
                "Separation backend {} does not support {stem_count} stems",
                self.backend.name()
            )));
        }
        Ok(layout)
    }

    /// Cuts `[start_seconds, end_seconds)` out of `source` and writes it as
    /// 16-bit PCM WAV. A range past the end of the audio is clamped.
    pub fn trim(&self, source: &Path, start_seconds: f64, end_seconds: f64) -> Result<PathBuf> {
        validate_range(start_seconds, end_seconds)?;
        require_source(source)?;

        let output = trimmed_path(&self.output_dir, source, self.trim_naming)?;
        ensure_dir(&self.output_dir)?;

        let audio = read_audio(source)?;
        let clip = slice_millis(
            &audio,
            seconds_to_millis(start_seconds),
            seconds_to_millis(end_seconds),
        );
        debug!(
            source = %source.display(),
            source_seconds = audio.duration_seconds(),
            clip_seconds = clip.duration_seconds(),
            "Trimmed audio"
        );

        // Encode next to the target, then move into place in one step.
        let tmp = NamedTempFile::new_in(&self.output_dir)?;
        write_audio(tmp.path(), &clip)?;
        tmp.persist(&output).map_err(|e| WorkerError::from(e.error))?;

        info!(output = %output.display(), "Trim complete");
        Ok(output)
    }

    /// Splits `source` into `stem_count` stems under
    /// `{output_dir}/<basename-without-ext>/`.
    ///
    /// Either every stem is present on disk when this returns, or it fails.
    pub fn separate_stems(&self, source: &Path, stem_count: u32) -> Result<BTreeMap<String, PathBuf>> {
        require_source(source)?;
        let layout = self.stem_layout(stem_count)?;
        probe_audio(source)?;

        let dir = stem_dir(&self.output_dir, source)?;
        ensure_dir(&dir)?;

        // Removed on drop, whether or not the backend succeeds.
        let staging = Builder::new().prefix(".staging-").tempdir_in(&dir)?;

        info!(
            source = %source.display(),
            backend = self.backend.name(),
            stems = layout.count,
            "Separating stems"
        );
        self.backend.separate(source, staging.path(), layout.stems)?;

        let mut found = Vec::with_capacity(layout.stems.len());
        let mut missing = Vec::new();
        for stem in layout.stems {
            match locate_stem(staging.path(), stem) {
                Some(p) => found.push((*stem, p)),
                None => missing.push(*stem),
            }
        }
        if !missing.is_empty() {
            return Err(WorkerError::Separation(format!(
                "{} produced no output for: {}",
                self.backend.name(),
                missing.join(", ")
            )));
        }

        let mut stems = BTreeMap::new();
        for (stem, produced) in found {
            let dest = stem_path(&dir, stem);
            fs::rename(&produced, &dest)?;
            if !dest.is_file() {
                return Err(WorkerError::Separation(format!(
                    "stem {stem} missing after commit: {}",
                    dest.display()
                )));
            }
            stems.insert(stem.to_string(), dest);
        }

        info!(dir = %dir.display(), stems = stems.len(), "Separation complete");
        Ok(stems)
    }
}

/// Finds `<stem>.wav` anywhere below `root`; tools often nest their output
/// under a model or track folder.
fn locate_stem(root: &Path, stem: &str) -> Option<PathBuf> {
    let wanted = format!("{stem}.wav");
    WalkDir::new(root)
        .max_depth(4)
        .into_iter()
        .filter_map(|e| e.ok())
        .find(|e| e.file_type().is_file() && e.file_name().to_str() == Some(wanted.as_str()))
        .map(|e| e.into_path())
}

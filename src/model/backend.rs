use std::{
    path::Path,
    process::{Command, Stdio},
    sync::Arc,
};

use tracing::{debug, info, warn};

use crate::{
    config::{SeparationBackendKind, SeparationConfig},
    core::{
        audio::{read_audio, write_audio},
        dsp::scale,
    },
    error::{Result, WorkerError},
    io::paths::stem_path,
};

/// A capability that splits a mixed track into stems.
///
/// Implementations write `<stem>.wav` files somewhere below `target_dir`,
/// one per name in `stems`. The engine verifies the files afterwards.
pub trait SeparationBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// True for backends that fabricate output instead of running a model.
    fn is_simulated(&self) -> bool {
        false
    }

    /// Whether the backend can produce a layout with `stem_count` stems.
    fn supports_stem_count(&self, _stem_count: u32) -> bool {
        true
    }

    fn separate(&self, input: &Path, target_dir: &Path, stems: &[&str]) -> Result<()>;
}

/// Runs an external separation tool such as spleeter or demucs.
pub struct CommandBackend {
    program: String,
    args: Vec<String>,
    /// Empty means every registered layout is accepted.
    stem_counts: Vec<u32>,
}

impl CommandBackend {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            stem_counts: Vec::new(),
        }
    }

    /// Restricts the layouts this tool is asked to produce.
    pub fn with_stem_counts(mut self, stem_counts: Vec<u32>) -> Self {
        self.stem_counts = stem_counts;
        self
    }

    fn expand_args(&self, input: &Path, target_dir: &Path, stem_count: usize) -> Vec<String> {
        let input = input.to_string_lossy();
        let output = target_dir.to_string_lossy();
        let stems = stem_count.to_string();
        self.args
            .iter()
            .map(|a| {
                a.replace("{input}", &input)
                    .replace("{output}", &output)
                    .replace("{stems}", &stems)
            })
            .collect()
    }
}

impl SeparationBackend for CommandBackend {
    fn name(&self) -> &'static str {
        "command"
    }

    fn supports_stem_count(&self, stem_count: u32) -> bool {
        self.stem_counts.is_empty() || self.stem_counts.contains(&stem_count)
    }

    fn separate(&self, input: &Path, target_dir: &Path, stems: &[&str]) -> Result<()> {
        let args = self.expand_args(input, target_dir, stems.len());
        info!(program = %self.program, args = ?args, "Running separation tool");

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
                    WorkerError::SeparationUnavailable(format!("{}: {e}", self.program))
                }
                _ => WorkerError::Internal(anyhow::Error::new(e).context(format!(
                    "Failed to run separation tool {}",
                    self.program
                ))),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let tail: Vec<&str> = stderr.lines().rev().take(5).collect();
            let tail: Vec<&str> = tail.into_iter().rev().collect();
            warn!(program = %self.program, status = %output.status, "Separation tool failed");
            return Err(WorkerError::Separation(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                tail.join(" | ")
            )));
        }

        debug!(program = %self.program, "Separation tool finished");
        Ok(())
    }
}

/// Simulation mode: every stem is the mix scaled by `1 / stems.len()`.
///
/// Output is deterministic and the stems sum back to the input, which makes
/// it suitable for tests and for running the worker without a model.
#[derive(Default)]
pub struct FixtureBackend;

impl SeparationBackend for FixtureBackend {
    fn name(&self) -> &'static str {
        "fixture"
    }

    fn is_simulated(&self) -> bool {
        true
    }

    fn separate(&self, input: &Path, target_dir: &Path, stems: &[&str]) -> Result<()> {
        if stems.is_empty() {
            return Ok(());
        }
        let mix = read_audio(input)?;
        let part = scale(&mix, 1.0 / stems.len() as f32);
        for stem in stems {
            write_audio(stem_path(target_dir, stem), &part)?;
        }
        Ok(())
    }
}

pub fn backend_from_config(cfg: &SeparationConfig) -> Arc<dyn SeparationBackend> {
    match cfg.backend {
        SeparationBackendKind::Command => {
            Arc::new(
                CommandBackend::new(cfg.program.clone(), cfg.args.clone())
                    .with_stem_counts(cfg.stem_counts.clone()),
            )
        }
        SeparationBackendKind::Fixture => {
            warn!("Using fixture separation backend: stems are simulated, not separated");
            Arc::new(FixtureBackend)
        }
    }
}

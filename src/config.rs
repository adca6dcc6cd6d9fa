//! Worker configuration.
//!
//! Resolution order, lowest to highest priority:
//! 1. Compiled defaults
//! 2. TOML file (`--config` or `AUDIO_WORKER_CONFIG`)
//! 3. Environment variables (`AUDIO_WORKER_*`)
//! 4. Command-line flags (applied by the binary)

use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, WorkerError};

pub const CONFIG_ENV: &str = "AUDIO_WORKER_CONFIG";
pub const BIND_ENV: &str = "AUDIO_WORKER_BIND";
pub const OUTPUT_DIR_ENV: &str = "AUDIO_WORKER_OUTPUT_DIR";
pub const BACKEND_ENV: &str = "AUDIO_WORKER_SEPARATION_BACKEND";
pub const PROGRAM_ENV: &str = "AUDIO_WORKER_SEPARATION_PROGRAM";

/// How trimmed outputs are named.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrimNaming {
    /// `trimmed_song.mp3`, even though the payload is WAV. Downstream
    /// consumers depend on this name.
    #[default]
    PreserveExtension,
    /// `trimmed_song.wav`
    WavExtension,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeparationBackendKind {
    #[default]
    Command,
    Fixture,
}

impl FromStr for SeparationBackendKind {
    type Err = WorkerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "command" => Ok(Self::Command),
            "fixture" => Ok(Self::Fixture),
            other => Err(WorkerError::Config(format!(
                "Unknown separation backend {other:?} (expected \"command\" or \"fixture\")"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeparationConfig {
    pub backend: SeparationBackendKind,
    /// Executable for the command backend.
    pub program: String,
    /// Arguments; `{input}`, `{output}` and `{stems}` are substituted per job.
    pub args: Vec<String>,
    /// Stem counts the tool has models for; empty accepts every layout.
    /// The spleeter defaults cover 2, 4 and 5 stems. A demucs-style `args`
    /// template can set `[2, 4, 6]`.
    pub stem_counts: Vec<u32>,
}

impl Default for SeparationConfig {
    fn default() -> Self {
        Self {
            backend: SeparationBackendKind::Command,
            program: "spleeter".into(),
            args: vec![
                "separate".into(),
                "-p".into(),
                "spleeter:{stems}stems".into(),
                "-o".into(),
                "{output}".into(),
                "{input}".into(),
            ],
            stem_counts: vec![2, 4, 5],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    pub bind_addr: String,
    pub output_dir: PathBuf,
    pub trim_naming: TrimNaming,
    pub separation: SeparationConfig,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8000".into(),
            output_dir: PathBuf::from("processed"),
            trim_naming: TrimNaming::default(),
            separation: SeparationConfig::default(),
        }
    }
}

impl WorkerConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| WorkerError::Config(format!("Invalid TOML: {e}")))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            WorkerError::Config(format!("Cannot read config {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }

    /// Defaults, then the TOML file (explicit path or `AUDIO_WORKER_CONFIG`),
    /// then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var(CONFIG_ENV).ok().map(PathBuf::from));

        let mut cfg = match file {
            Some(p) => {
                info!(path = %p.display(), "Loading worker config");
                Self::from_file(&p)?
            }
            None => Self::default(),
        };
        cfg.apply_env()?;
        Ok(cfg)
    }

    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(v) = std::env::var(BIND_ENV) {
            self.bind_addr = v;
        }
        if let Ok(v) = std::env::var(OUTPUT_DIR_ENV) {
            self.output_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var(BACKEND_ENV) {
            self.separation.backend = v.parse()?;
        }
        if let Ok(v) = std::env::var(PROGRAM_ENV) {
            self.separation.program = v;
        }
        Ok(())
    }
}

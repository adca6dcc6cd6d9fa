//! # audio-worker
//!
//! Single-node worker that accepts audio jobs (trim a clip, or split a track
//! into stems), writes the results under an output directory and reports
//! their paths in a uniform result envelope.

mod error;
mod types;

pub mod api;
pub mod config;
pub mod logging;

pub mod core {
    pub mod audio;
    pub mod dispatcher;
    pub mod dsp;
    pub mod engine;
}

pub mod model {
    pub mod backend;
    pub mod registry;
}

pub mod io {
    pub mod paths;
}

// Public API
pub use crate::api::{build_router, AppState};
pub use crate::config::{SeparationBackendKind, SeparationConfig, TrimNaming, WorkerConfig};
pub use crate::core::audio::{probe_audio, read_audio, write_audio, AudioInfo};
pub use crate::core::dispatcher::{JobDispatcher, ValidatedJob};
pub use crate::core::engine::ProcessingEngine;
pub use crate::error::{ErrorKind, Result, WorkerError};
pub use crate::model::backend::{CommandBackend, FixtureBackend, SeparationBackend};
pub use crate::types::{
    AudioData, JobDescription, JobFailure, JobStatus, ProcessingResult, ResultEnvelope,
    SeparationParams, SeparationResult, TaskKind, TrimParams, TrimResult,
};

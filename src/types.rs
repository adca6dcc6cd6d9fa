use std::{collections::BTreeMap, fmt, path::PathBuf, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ErrorKind, WorkerError};

#[derive(Clone, Debug)]
pub struct AudioData {
    /// Interleaved samples in `[-1.0, 1.0]`.
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioData {
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels as usize
    }

    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.sample_rate as f64
    }
}

/// One processing request as submitted by a caller.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDescription {
    #[serde(alias = "file_path")]
    pub source_path: String,
    #[serde(alias = "task_type")]
    pub task_kind: String,
    #[serde(default, alias = "params")]
    pub parameters: Option<Map<String, Value>>,
}

impl JobDescription {
    pub fn new(source_path: impl Into<String>, task_kind: impl Into<String>) -> Self {
        Self {
            source_path: source_path.into(),
            task_kind: task_kind.into(),
            parameters: None,
        }
    }

    pub fn with_param(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.parameters
            .get_or_insert_with(Map::new)
            .insert(key.to_string(), value.into());
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskKind {
    Trim,
    Separate,
}

impl FromStr for TaskKind {
    type Err = WorkerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trim" => Ok(TaskKind::Trim),
            "separate" => Ok(TaskKind::Separate),
            _ => Err(WorkerError::InvalidRequest(format!("Unknown task type: {s:?}"))),
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Trim => f.write_str("trim"),
            TaskKind::Separate => f.write_str("separate"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrimParams {
    pub start_seconds: f64,
    pub end_seconds: f64,
}

impl Default for TrimParams {
    fn default() -> Self {
        Self {
            start_seconds: 0.0,
            end_seconds: 10.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeparationParams {
    pub stem_count: u32,
}

impl Default for SeparationParams {
    fn default() -> Self {
        Self { stem_count: 4 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrimResult {
    pub output_path: PathBuf,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeparationResult {
    pub stems: BTreeMap<String, PathBuf>,
    /// Name of the separation backend that produced the stems.
    pub backend: String,
    pub simulated: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProcessingResult {
    Trim(TrimResult),
    Separation(SeparationResult),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Completed,
    /// Refused during validation; the engine was never invoked.
    Rejected,
    Failed,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JobFailure {
    pub kind: ErrorKind,
    pub message: String,
}

/// Normalised outcome of a single job.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ProcessingResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JobFailure>,
}

impl ResultEnvelope {
    pub fn completed(result: ProcessingResult) -> Self {
        Self {
            status: JobStatus::Completed,
            result: Some(result),
            error: None,
        }
    }

    pub fn from_error(err: &WorkerError) -> Self {
        let status = if err.is_rejection() {
            JobStatus::Rejected
        } else {
            JobStatus::Failed
        };
        Self {
            status,
            result: None,
            error: Some(JobFailure {
                kind: err.kind(),
                message: err.to_string(),
            }),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == JobStatus::Completed
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(|e| e.kind)
    }
}

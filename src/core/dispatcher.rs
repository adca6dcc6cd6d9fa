use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use serde_json::{Map, Value};
use tracing::{error, info, warn};

use crate::{
    core::engine::{validate_range, ProcessingEngine},
    error::{Result, WorkerError},
    model::registry::DEFAULT_STEM_COUNT,
    types::{
        JobDescription, ProcessingResult, ResultEnvelope, SeparationParams, SeparationResult,
        TaskKind, TrimParams, TrimResult,
    },
};

/// A job that passed validation and is ready for the engine.
#[derive(Clone, Debug, PartialEq)]
pub enum ValidatedJob {
    Trim { source: PathBuf, params: TrimParams },
    Separate { source: PathBuf, params: SeparationParams },
}

/// Single entry point for job submission. Every outcome, including panics in
/// the worker pool, comes back as a [`ResultEnvelope`].
#[derive(Clone)]
pub struct JobDispatcher {
    engine: Arc<ProcessingEngine>,
}

fn number_param(params: Option<&Map<String, Value>>, keys: &[&str]) -> Result<Option<f64>> {
    let Some(params) = params else {
        return Ok(None);
    };
    for key in keys {
        match params.get(*key) {
            None | Some(Value::Null) => continue,
            Some(v) => {
                return v.as_f64().map(Some).ok_or_else(|| {
                    WorkerError::InvalidRequest(format!("Parameter {key:?} must be a number, got {v}"))
                })
            }
        }
    }
    Ok(None)
}

/// String value of the first key present, for reporting on bodies that
/// failed to decode.
fn str_field<'a>(body: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| body.get(*key).and_then(Value::as_str))
}

fn count_param(params: Option<&Map<String, Value>>, keys: &[&str]) -> Result<Option<u32>> {
    let Some(params) = params else {
        return Ok(None);
    };
    for key in keys {
        match params.get(*key) {
            None | Some(Value::Null) => continue,
            Some(v) => {
                return v
                    .as_u64()
                    .and_then(|n| u32::try_from(n).ok())
                    .map(Some)
                    .ok_or_else(|| {
                        WorkerError::InvalidRequest(format!(
                            "Parameter {key:?} must be a positive integer, got {v}"
                        ))
                    })
            }
        }
    }
    Ok(None)
}

impl JobDispatcher {
    pub fn new(engine: Arc<ProcessingEngine>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Arc<ProcessingEngine> {
        &self.engine
    }

    /// Decodes a raw request body. A body of the wrong shape is an invalid
    /// request, unless it names a source that does not exist: source
    /// existence is checked before anything else, as in [`validate`](Self::validate).
    pub fn parse_request(body: Value) -> Result<JobDescription> {
        let missing_source = str_field(&body, &["sourcePath", "file_path"])
            .filter(|path| !Path::new(path).is_file())
            .map(str::to_string);

        serde_json::from_value(body).map_err(|e| match missing_source {
            Some(path) => WorkerError::NotFound { path },
            None => WorkerError::InvalidRequest(format!("Malformed job description: {e}")),
        })
    }

    /// Envelope for a request that never became a [`JobDescription`].
    pub fn reject_request(e: WorkerError) -> ResultEnvelope {
        warn!(kind = ?e.kind(), "Request rejected: {e}");
        ResultEnvelope::from_error(&e)
    }

    /// Cheap checks with no side effects: source existence first, then task
    /// kind, then parameters. Stem counts are checked against the active
    /// backend as well as the layout registry.
    pub fn validate(&self, job: &JobDescription) -> Result<ValidatedJob> {
        let source = PathBuf::from(&job.source_path);
        if !source.is_file() {
            return Err(WorkerError::NotFound {
                path: job.source_path.clone(),
            });
        }

        let kind: TaskKind = job.task_kind.parse()?;
        let params = job.parameters.as_ref();

        match kind {
            TaskKind::Trim => {
                let defaults = TrimParams::default();
                let start = number_param(params, &["start", "startSeconds"])?
                    .unwrap_or(defaults.start_seconds);
                let end = number_param(params, &["end", "endSeconds"])?
                    .unwrap_or(defaults.end_seconds);
                validate_range(start, end)?;
                Ok(ValidatedJob::Trim {
                    source,
                    params: TrimParams {
                        start_seconds: start,
                        end_seconds: end,
                    },
                })
            }
            TaskKind::Separate => {
                let stem_count =
                    count_param(params, &["stemCount", "stems"])?.unwrap_or(DEFAULT_STEM_COUNT);
                self.engine.stem_layout(stem_count)?;
                Ok(ValidatedJob::Separate {
                    source,
                    params: SeparationParams { stem_count },
                })
            }
        }
    }

    fn run(engine: &ProcessingEngine, job: ValidatedJob) -> Result<ProcessingResult> {
        match job {
            ValidatedJob::Trim { source, params } => {
                let output_path = engine.trim(&source, params.start_seconds, params.end_seconds)?;
                Ok(ProcessingResult::Trim(TrimResult { output_path }))
            }
            ValidatedJob::Separate { source, params } => {
                let stems = engine.separate_stems(&source, params.stem_count)?;
                let backend = engine.backend();
                Ok(ProcessingResult::Separation(SeparationResult {
                    stems,
                    backend: backend.name().to_string(),
                    simulated: backend.is_simulated(),
                }))
            }
        }
    }

    fn finish(job: &JobDescription, outcome: Result<ProcessingResult>) -> ResultEnvelope {
        match outcome {
            Ok(result) => {
                info!(source = %job.source_path, task = %job.task_kind, "Job completed");
                ResultEnvelope::completed(result)
            }
            Err(e) => {
                error!(source = %job.source_path, task = %job.task_kind, kind = ?e.kind(), "Job failed: {e}");
                ResultEnvelope::from_error(&e)
            }
        }
    }

    fn reject(job: &JobDescription, e: WorkerError) -> ResultEnvelope {
        warn!(source = %job.source_path, task = %job.task_kind, kind = ?e.kind(), "Job rejected: {e}");
        ResultEnvelope::from_error(&e)
    }

    /// Validates on the caller's task, then runs the engine on the blocking
    /// pool so request handling is never stalled by decode or separation.
    pub async fn submit(&self, job: JobDescription) -> ResultEnvelope {
        info!(source = %job.source_path, task = %job.task_kind, "Job received");
        let validated = match self.validate(&job) {
            Ok(v) => v,
            Err(e) => return Self::reject(&job, e),
        };

        let engine = Arc::clone(&self.engine);
        let outcome = tokio::task::spawn_blocking(move || Self::run(&engine, validated))
            .await
            .unwrap_or_else(|join_err| {
                Err(WorkerError::Internal(anyhow::anyhow!(
                    "Job worker terminated abnormally: {join_err}"
                )))
            });

        Self::finish(&job, outcome)
    }

    /// [`submit`](Self::submit) for an undecoded request body.
    pub async fn submit_value(&self, body: Value) -> ResultEnvelope {
        match Self::parse_request(body) {
            Ok(job) => self.submit(job).await,
            Err(e) => Self::reject_request(e),
        }
    }

    /// Same contract as [`submit`](Self::submit), on the current thread.
    pub fn submit_blocking(&self, job: JobDescription) -> ResultEnvelope {
        info!(source = %job.source_path, task = %job.task_kind, "Job received");
        let validated = match self.validate(&job) {
            Ok(v) => v,
            Err(e) => return Self::reject(&job, e),
        };
        let outcome = Self::run(&self.engine, validated);
        Self::finish(&job, outcome)
    }
}

// Job Runner
// Reads the tweet document, runs the pipeline and summary, writes the payload

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, Instrument};

use crate::models::{AnalysisPayload, InputRecord, RawItem};

use super::analysis::{summarize_group, BatchOrchestrator};
use super::inference::BackendError;

#[derive(Error, Debug)]
pub enum JobError {
    #[error("{} not found", .0.display())]
    InputNotFound(PathBuf),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid input document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Backend failure: {0}")]
    Backend(#[from] BackendError),
}

/// Parse the input document: an array of `{"tweetDetails": {"tweet_id", "text"}}`.
pub fn parse_input(content: &str) -> Result<Vec<RawItem>, JobError> {
    let records: Vec<InputRecord> = serde_json::from_str(content)?;
    Ok(records.into_iter().map(RawItem::from).collect())
}

pub async fn read_input(path: &Path) -> Result<Vec<RawItem>, JobError> {
    let content = tokio::fs::read_to_string(path).await.map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            JobError::InputNotFound(path.to_path_buf())
        } else {
            JobError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    parse_input(&content)
}

pub async fn write_output(path: &Path, payload: &AnalysisPayload) -> Result<(), JobError> {
    let json = serde_json::to_string_pretty(payload)?;
    tokio::fs::write(path, json).await.map_err(|source| JobError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub struct JobRunner {
    orchestrator: BatchOrchestrator,
    trend_threshold: f64,
}

impl JobRunner {
    pub fn new(orchestrator: BatchOrchestrator, trend_threshold: f64) -> Self {
        Self {
            orchestrator,
            trend_threshold,
        }
    }

    /// Analyze already-loaded items into the output payload.
    pub async fn execute(&self, items: &[RawItem]) -> Result<AnalysisPayload, JobError> {
        let results = self.orchestrator.run(items).await?;
        let summary = summarize_group(&results, self.trend_threshold);
        info!(
            n_tweets = summary.n_tweets,
            overall = %summary.overall.label,
            trend = %summary.trend.direction,
            delta = summary.trend.delta,
            "[JOB] summary ready"
        );
        Ok(AnalysisPayload { summary, results })
    }

    /// Full job: read `input`, analyze, write `output`. Nothing is written on failure.
    pub async fn run_files(&self, input: &Path, output: &Path) -> Result<AnalysisPayload, JobError> {
        let run_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("job", %run_id);

        async {
            info!(input = %input.display(), "[JOB] reading input");
            let items = read_input(input).await?;
            let payload = self.execute(&items).await?;
            write_output(output, &payload).await?;
            info!(
                output = %output.display(),
                results = payload.results.len(),
                "[JOB] payload written"
            );
            Ok(payload)
        }
        .instrument(span)
        .await
    }
}

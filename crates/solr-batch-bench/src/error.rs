use std::fmt::Display;
use std::time::Duration;

use thiserror::Error;

/// Where inside a trial an ingestion transport failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestPhase {
    Connect,
    Submit,
    Flush,
}

impl Display for IngestPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestPhase::Connect => write!(f, "connect"),
            IngestPhase::Submit => write!(f, "submit"),
            IngestPhase::Flush => write!(f, "flush"),
        }
    }
}

/// Failures of the external `bin/solr` collaborator.
#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("could not spawn `{command}`: {source}")]
    Spawn { command: String, source: std::io::Error },
    #[error("could not wait for `{command}`: {source}")]
    Wait { command: String, source: std::io::Error },
    #[error("`{command}` exited with {status}")]
    Failed { command: String, status: std::process::ExitStatus },
    #[error("`{command}` did not finish within {timeout:?}")]
    TimedOut { command: String, timeout: Duration },
}

/// Any of these aborts the whole sweep. Nothing is retried: a benchmark that
/// retries produces throughput numbers for a different experiment.
#[derive(Debug, Error)]
pub enum BenchError {
    #[error("cluster reset failed before the `{strategy}` trial at batch size {batch_size}: {source}")]
    ResetFailure {
        batch_size: u32,
        strategy: String,
        #[source]
        source: ClusterError,
    },
    #[error("cluster reset timed out before the `{strategy}` trial at batch size {batch_size}: {source}")]
    ResetTimeout {
        batch_size: u32,
        strategy: String,
        #[source]
        source: ClusterError,
    },
    #[error("{phase} failed for strategy `{strategy}` at batch size {batch_size}: {cause:#}")]
    IngestionFailure {
        batch_size: u32,
        strategy: String,
        phase: IngestPhase,
        cause: anyhow::Error,
    },
    #[error(
        "trial for strategy `{strategy}` at batch size {batch_size} finished in {elapsed:?}, \
         too fast to compute a rate for {total_docs} documents"
    )]
    DegenerateTiming { batch_size: u32, strategy: String, elapsed: Duration, total_docs: u64 },
    #[error("invalid sweep: {0}")]
    InvalidSweep(String),
    #[error("sweep interrupted")]
    Interrupted,
    #[error("could not write the report: {0}")]
    Report(#[from] std::io::Error),
}

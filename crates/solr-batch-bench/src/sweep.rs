use std::io::Write;
use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::cluster::ClusterLifecycle;
use crate::document::synthesize_batch;
use crate::error::{BenchError, ClusterError, IngestPhase};
use crate::ingest::{IngestionStrategy, StrategyFactory};
use crate::report::{Report, ReportRow};

/// The immutable input of one sweep. `batch_sizes` is ascending with an
/// exclusive upper bound: `--max-batch-size 1000` runs batch sizes 1
/// through 999, like the experiment this tool reproduces.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    pub total_docs: u64,
    pub batch_sizes: Range<u32>,
}

impl SweepConfig {
    fn validate(&self, strategies: &[Box<dyn StrategyFactory>]) -> Result<(), BenchError> {
        if self.batch_sizes.is_empty() {
            return Err(BenchError::InvalidSweep("the batch size range is empty".into()));
        }
        if self.batch_sizes.start == 0 {
            return Err(BenchError::InvalidSweep("batch sizes start at 1".into()));
        }
        if self.total_docs == 0 {
            return Err(BenchError::InvalidSweep("the total document count must be positive".into()));
        }
        if strategies.is_empty() {
            return Err(BenchError::InvalidSweep("no ingestion strategies are registered".into()));
        }
        Ok(())
    }
}

/// Drives the full sweep: batch sizes ascending, strategies in registration
/// order within each batch size, a cluster reset before every trial. The
/// header and one CSV line per completed batch-size row go to `out` as soon
/// as they are known. The first failure aborts everything; rows already
/// written stay valid.
pub async fn run_sweep(
    config: &SweepConfig,
    strategies: &[Box<dyn StrategyFactory>],
    cluster: &dyn ClusterLifecycle,
    stop: &AtomicBool,
    out: &mut dyn Write,
) -> Result<Report, BenchError> {
    config.validate(strategies)?;

    let mut report = Report::new(strategies.iter().map(|s| s.name().to_string()).collect());
    writeln!(out, "{}", report.header())?;
    out.flush()?;

    for batch_size in config.batch_sizes.clone() {
        let mut throughputs = Vec::with_capacity(strategies.len());
        for factory in strategies {
            if stop.load(Ordering::Relaxed) {
                return Err(BenchError::Interrupted);
            }
            reset_collection(cluster, batch_size, factory.name()).await?;
            let docs_per_sec =
                run_scoped_trial(factory.as_ref(), batch_size, config.total_docs).await?;
            tracing::info!(batch_size, strategy = factory.name(), docs_per_sec, "trial complete");
            throughputs.push(docs_per_sec);
        }
        let row = ReportRow { batch_size, throughputs };
        writeln!(out, "{row}")?;
        out.flush()?;
        report.push(row);
    }

    Ok(report)
}

/// Acquires a fresh transport for exactly one trial and closes it again
/// whether or not the trial succeeded.
async fn run_scoped_trial(
    factory: &dyn StrategyFactory,
    batch_size: u32,
    total_docs: u64,
) -> Result<f64, BenchError> {
    let name = factory.name();
    let mut strategy = factory.create().map_err(|cause| BenchError::IngestionFailure {
        batch_size,
        strategy: name.to_string(),
        phase: IngestPhase::Connect,
        cause,
    })?;

    let outcome = run_single_trial(strategy.as_mut(), name, batch_size, total_docs).await;

    if let Err(error) = strategy.close().await {
        tracing::warn!(strategy = name, error = %error, "transport did not close cleanly");
    }

    outcome
}

/// One measured run: submit `total_docs` documents in batches of
/// `batch_size` (the last batch may be short), then flush so everything is
/// visible before the clock stops. The clock covers document synthesis,
/// submission and the final commit.
pub async fn run_single_trial(
    strategy: &mut dyn IngestionStrategy,
    strategy_name: &str,
    batch_size: u32,
    total_docs: u64,
) -> Result<f64, BenchError> {
    let mut submitted = 0u64;
    let started = Instant::now();

    while submitted < total_docs {
        let batch = synthesize_batch(batch_size, total_docs, submitted);
        let accepted = batch.len() as u64;
        strategy.submit(batch).await.map_err(|cause| BenchError::IngestionFailure {
            batch_size,
            strategy: strategy_name.to_string(),
            phase: IngestPhase::Submit,
            cause,
        })?;
        submitted += accepted;
    }

    strategy.flush().await.map_err(|cause| BenchError::IngestionFailure {
        batch_size,
        strategy: strategy_name.to_string(),
        phase: IngestPhase::Flush,
        cause,
    })?;

    let elapsed = started.elapsed();
    throughput(total_docs, elapsed).ok_or(BenchError::DegenerateTiming {
        batch_size,
        strategy: strategy_name.to_string(),
        elapsed,
        total_docs,
    })
}

/// `None` when the elapsed time is too small to produce a finite rate; a
/// non-finite value must never reach the report.
fn throughput(total_docs: u64, elapsed: Duration) -> Option<f64> {
    let rate = total_docs as f64 / elapsed.as_secs_f64();
    rate.is_finite().then_some(rate)
}

async fn reset_collection(
    cluster: &dyn ClusterLifecycle,
    batch_size: u32,
    strategy: &str,
) -> Result<(), BenchError> {
    tracing::debug!(batch_size, strategy, "resetting the collection");
    if let Err(source) = cluster.delete_collection().await {
        return Err(reset_error(batch_size, strategy, source));
    }
    if let Err(source) = cluster.create_collection().await {
        return Err(reset_error(batch_size, strategy, source));
    }
    Ok(())
}

fn reset_error(batch_size: u32, strategy: &str, source: ClusterError) -> BenchError {
    let strategy = strategy.to_string();
    match source {
        ClusterError::TimedOut { .. } => BenchError::ResetTimeout { batch_size, strategy, source },
        _ => BenchError::ResetFailure { batch_size, strategy, source },
    }
}

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use solr_batch_bench::args::BenchArgs;
use solr_batch_bench::cluster::{ClusterLifecycle, SolrCli};
use solr_batch_bench::ingest::{registry, TransportConfig};
use solr_batch_bench::logs::setup_logs;
use solr_batch_bench::sweep::{run_sweep, SweepConfig};

fn main() -> anyhow::Result<()> {
    let args = BenchArgs::parse();
    setup_logs(&args.log_filter)?;

    let rt = tokio::runtime::Builder::new_current_thread().enable_io().enable_time().build()?;
    rt.block_on(run(args))
}

async fn run(args: BenchArgs) -> anyhow::Result<()> {
    let cluster = SolrCli::new(
        args.solr_dir.clone(),
        args.collection.clone(),
        args.shards,
        args.replicas,
        Duration::from_secs(args.reset_timeout_secs),
    );

    let node_urls = if args.node_urls.is_empty() {
        vec![args.base_url.clone()]
    } else {
        args.node_urls.clone()
    };
    let transport = TransportConfig {
        base_url: args.base_url.clone(),
        node_urls,
        collection: args.collection.clone(),
    };
    let strategies = registry(&args.strategies, &transport);

    let config = SweepConfig { total_docs: args.total_docs, batch_sizes: 1..args.max_batch_size };

    let stop = Arc::new(AtomicBool::new(false));
    tokio::spawn({
        let stop = Arc::clone(&stop);
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("interrupt received, stopping before the next trial");
                stop.store(true, Ordering::Relaxed);
            }
        }
    });

    cluster.start().await?;

    // Leftovers from an earlier run are deleted on a best-effort basis; the
    // collection usually does not exist yet at this point.
    if let Err(error) = cluster.delete_collection().await {
        tracing::debug!(error = %error, "could not delete the collection before the sweep");
    }
    cluster.create_collection().await?;

    let mut stdout = std::io::stdout().lock();
    let outcome = run_sweep(&config, &strategies, &cluster, &stop, &mut stdout).await;

    if let Err(error) = cluster.stop().await {
        tracing::warn!(error = %error, "could not stop the Solr cluster cleanly");
    }

    let report = outcome?;
    tracing::info!(
        batch_sizes = report.rows().len(),
        strategies = report.strategies().len(),
        "sweep complete"
    );
    Ok(())
}

use std::path::PathBuf;

use clap::Parser;

use crate::ingest::StrategyKind;

pub fn default_base_url() -> String {
    "http://localhost:8983/solr".into()
}

pub fn default_collection() -> String {
    "perf_test_collection".into()
}

pub fn default_log_filter() -> String {
    "info".into()
}

/// Measure bulk-indexing throughput of a Solr cluster across a sweep of
/// batch sizes, one trial per (batch size, transport) pair, CSV on stdout.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct BenchArgs {
    /// Upper bound of the swept batch sizes, exclusive: trials run batch
    /// sizes 1 up to and including max-batch-size - 1.
    #[arg(long, default_value_t = 1000)]
    pub max_batch_size: u32,

    /// Number of documents indexed by every trial.
    #[arg(long, default_value_t = 500_000)]
    pub total_docs: u64,

    /// Base URL of the Solr node receiving direct and buffered updates.
    #[arg(long, default_value_t = default_base_url())]
    pub base_url: String,

    /// A node URL for the routed transport; repeat the flag for more nodes.
    /// Defaults to the base URL.
    #[arg(long = "node-url")]
    pub node_urls: Vec<String>,

    /// Name of the collection created before and deleted between trials.
    #[arg(long, default_value_t = default_collection())]
    pub collection: String,

    /// Shard count of the test collection.
    #[arg(long, default_value_t = 2)]
    pub shards: u32,

    /// Replica count of the test collection.
    #[arg(long, default_value_t = 2)]
    pub replicas: u32,

    /// Solr installation directory, the one containing `bin/solr`.
    #[arg(long, env = "SOLR_DIR")]
    pub solr_dir: PathBuf,

    /// Seconds before a cluster start/stop/create/delete invocation is
    /// abandoned and reported as a reset timeout.
    #[arg(long, default_value_t = 120)]
    pub reset_timeout_secs: u64,

    /// Transports to benchmark; order decides the report columns.
    #[arg(
        long = "strategy",
        value_enum,
        default_values_t = vec![StrategyKind::Direct, StrategyKind::Buffered, StrategyKind::Routed]
    )]
    pub strategies: Vec<StrategyKind>,

    /// Log filter directives, e.g. `solr_batch_bench=debug`.
    #[arg(long, default_value_t = default_log_filter())]
    pub log_filter: String,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_match_the_reference_experiment() {
        let args = BenchArgs::parse_from(["solr-batch-bench", "--solr-dir", "/opt/solr"]);
        assert_eq!(args.max_batch_size, 1000);
        assert_eq!(args.total_docs, 500_000);
        assert_eq!(args.base_url, "http://localhost:8983/solr");
        assert_eq!(args.collection, "perf_test_collection");
        assert_eq!(args.shards, 2);
        assert_eq!(args.replicas, 2);
        assert_eq!(
            args.strategies,
            vec![StrategyKind::Direct, StrategyKind::Buffered, StrategyKind::Routed]
        );
    }

    #[test]
    fn strategy_selection_preserves_order() {
        let args = BenchArgs::parse_from([
            "solr-batch-bench",
            "--solr-dir",
            "/opt/solr",
            "--strategy",
            "routed",
            "--strategy",
            "direct",
        ]);
        assert_eq!(args.strategies, vec![StrategyKind::Routed, StrategyKind::Direct]);
    }
}

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time;

use crate::error::ClusterError;

/// The external collaborator owning the Solr processes and the test
/// collection. Behind a trait so the sweep can run against a fake that
/// never touches a real cluster.
#[async_trait]
pub trait ClusterLifecycle: Send + Sync {
    async fn start(&self) -> Result<(), ClusterError>;
    async fn stop(&self) -> Result<(), ClusterError>;
    async fn create_collection(&self) -> Result<(), ClusterError>;
    async fn delete_collection(&self) -> Result<(), ClusterError>;
}

/// Drives `bin/solr` from a local Solr installation. Every invocation is
/// bounded by `command_timeout`, and a nonzero exit status is a failure.
pub struct SolrCli {
    solr_dir: PathBuf,
    collection: String,
    shards: u32,
    replicas: u32,
    command_timeout: Duration,
}

impl SolrCli {
    pub fn new(
        solr_dir: PathBuf,
        collection: String,
        shards: u32,
        replicas: u32,
        command_timeout: Duration,
    ) -> Self {
        Self { solr_dir, collection, shards, replicas, command_timeout }
    }

    async fn run_solr(&self, args: &[&str]) -> Result<(), ClusterError> {
        let rendered = render_command(args);
        tracing::debug!(command = %rendered, "invoking the Solr control script");

        let mut command = Command::new("bin/solr");
        command.args(args).current_dir(&self.solr_dir).kill_on_drop(true);

        let mut child = command
            .spawn()
            .map_err(|source| ClusterError::Spawn { command: rendered.clone(), source })?;

        let status = match time::timeout(self.command_timeout, child.wait()).await {
            Ok(Ok(status)) => status,
            Ok(Err(source)) => return Err(ClusterError::Wait { command: rendered, source }),
            Err(_) => {
                return Err(ClusterError::TimedOut {
                    command: rendered,
                    timeout: self.command_timeout,
                })
            }
        };

        if !status.success() {
            return Err(ClusterError::Failed { command: rendered, status });
        }
        Ok(())
    }
}

fn render_command(args: &[&str]) -> String {
    format!("bin/solr {}", args.join(" "))
}

#[async_trait]
impl ClusterLifecycle for SolrCli {
    async fn start(&self) -> Result<(), ClusterError> {
        self.run_solr(&["start", "-e", "cloud", "-noprompt"]).await
    }

    async fn stop(&self) -> Result<(), ClusterError> {
        self.run_solr(&["stop", "-all"]).await
    }

    async fn create_collection(&self) -> Result<(), ClusterError> {
        self.run_solr(&[
            "create_collection",
            "-c",
            &self.collection,
            "-shards",
            &self.shards.to_string(),
            "-replicationFactor",
            &self.replicas.to_string(),
        ])
        .await
    }

    async fn delete_collection(&self) -> Result<(), ClusterError> {
        self.run_solr(&["delete", "-c", &self.collection]).await
    }
}

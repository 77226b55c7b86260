mod buffered;
mod direct;
mod routed;

use std::fmt;

use anyhow::Context as _;
use async_trait::async_trait;
pub use buffered::BufferedUpdateFactory;
pub use direct::DirectUpdateFactory;
pub use routed::RoutedUpdateFactory;

use crate::client::{expect_success, Client};
use crate::document::Document;

/// A pluggable transport for getting documents into the cluster. `submit`
/// hands over one batch; `flush` makes everything submitted so far visible
/// before it returns. Internal batching, buffering and connection handling
/// are the transport's own business.
#[async_trait]
pub trait IngestionStrategy: Send {
    async fn submit(&mut self, batch: Vec<Document>) -> anyhow::Result<()>;
    async fn flush(&mut self) -> anyhow::Result<()>;
    async fn close(&mut self) -> anyhow::Result<()>;
}

/// Builds a fresh transport instance per trial, so connections opened for
/// one trial never leak into the next measurement.
pub trait StrategyFactory: Send + Sync {
    fn name(&self) -> &str;
    fn create(&self) -> anyhow::Result<Box<dyn IngestionStrategy>>;
}

/// The transports selectable on the command line, in default registration
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum StrategyKind {
    Direct,
    Buffered,
    Routed,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Direct => write!(f, "direct"),
            StrategyKind::Buffered => write!(f, "buffered"),
            StrategyKind::Routed => write!(f, "routed"),
        }
    }
}

/// Connection parameters shared by every transport.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub base_url: String,
    pub node_urls: Vec<String>,
    pub collection: String,
}

/// The ordered strategy registry: report columns and trial order follow
/// this order exactly.
pub fn registry(kinds: &[StrategyKind], config: &TransportConfig) -> Vec<Box<dyn StrategyFactory>> {
    kinds
        .iter()
        .map(|kind| match kind {
            StrategyKind::Direct => {
                Box::new(DirectUpdateFactory::new(config.clone())) as Box<dyn StrategyFactory>
            }
            StrategyKind::Buffered => Box::new(BufferedUpdateFactory::new(config.clone())),
            StrategyKind::Routed => Box::new(RoutedUpdateFactory::new(config.clone())),
        })
        .collect()
}

pub(crate) async fn post_batch(
    client: &Client,
    collection: &str,
    batch: &[Document],
) -> anyhow::Result<()> {
    let response = client
        .post(&format!("{collection}/update"))
        .json(batch)
        .send()
        .await
        .context("sending an update batch")?;
    expect_success(response).await
}

pub(crate) async fn commit(client: &Client, collection: &str) -> anyhow::Result<()> {
    let response = client
        .post(&format!("{collection}/update?commit=true"))
        .json(&serde_json::json!([]))
        .send()
        .await
        .context("sending the commit")?;
    expect_success(response).await
}

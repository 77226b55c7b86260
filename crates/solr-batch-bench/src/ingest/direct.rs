use async_trait::async_trait;

use super::{commit, post_batch, IngestionStrategy, StrategyFactory, TransportConfig};
use crate::client::Client;
use crate::document::Document;

/// Single-node HTTP transport: every submitted batch is one synchronous
/// POST to the collection's update endpoint.
pub struct DirectUpdateFactory {
    config: TransportConfig,
}

impl DirectUpdateFactory {
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }
}

impl StrategyFactory for DirectUpdateFactory {
    fn name(&self) -> &str {
        "direct"
    }

    fn create(&self) -> anyhow::Result<Box<dyn IngestionStrategy>> {
        Ok(Box::new(DirectUpdate {
            client: Client::new(&self.config.base_url)?,
            collection: self.config.collection.clone(),
        }))
    }
}

struct DirectUpdate {
    client: Client,
    collection: String,
}

#[async_trait]
impl IngestionStrategy for DirectUpdate {
    async fn submit(&mut self, batch: Vec<Document>) -> anyhow::Result<()> {
        post_batch(&self.client, &self.collection, &batch).await
    }

    async fn flush(&mut self) -> anyhow::Result<()> {
        commit(&self.client, &self.collection).await
    }

    async fn close(&mut self) -> anyhow::Result<()> {
        // Pooled connections are released when the client drops.
        Ok(())
    }
}

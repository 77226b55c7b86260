use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use async_trait::async_trait;
use futures::future::try_join_all;

use super::{commit, post_batch, IngestionStrategy, StrategyFactory, TransportConfig};
use crate::client::Client;
use crate::document::Document;

/// Cluster-aware routing transport: each document goes to the node its id
/// hashes to, one POST per node and batch, sent concurrently.
pub struct RoutedUpdateFactory {
    config: TransportConfig,
}

impl RoutedUpdateFactory {
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }
}

impl StrategyFactory for RoutedUpdateFactory {
    fn name(&self) -> &str {
        "routed"
    }

    fn create(&self) -> anyhow::Result<Box<dyn IngestionStrategy>> {
        let nodes = self
            .config
            .node_urls
            .iter()
            .map(|url| Client::new(url))
            .collect::<anyhow::Result<Vec<_>>>()?;
        anyhow::ensure!(!nodes.is_empty(), "the routed transport needs at least one node URL");
        Ok(Box::new(RoutedUpdate { nodes, collection: self.config.collection.clone() }))
    }
}

struct RoutedUpdate {
    nodes: Vec<Client>,
    collection: String,
}

fn route(id: &str, buckets: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    (hasher.finish() % buckets as u64) as usize
}

#[async_trait]
impl IngestionStrategy for RoutedUpdate {
    async fn submit(&mut self, batch: Vec<Document>) -> anyhow::Result<()> {
        let mut per_node: Vec<Vec<Document>> = vec![Vec::new(); self.nodes.len()];
        for doc in batch {
            per_node[route(&doc.id, self.nodes.len())].push(doc);
        }

        let collection = &self.collection;
        let sends = self.nodes.iter().zip(per_node).filter(|(_, docs)| !docs.is_empty()).map(
            |(node, docs)| async move { post_batch(node, collection, &docs).await },
        );
        try_join_all(sends).await?;
        Ok(())
    }

    async fn flush(&mut self) -> anyhow::Result<()> {
        // One commit is enough; the cluster distributes it to every shard.
        commit(&self.nodes[0], &self.collection).await
    }

    async fn close(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn routing_is_deterministic_and_in_range() {
        for id in ["1", "42", "500000"] {
            let bucket = route(id, 3);
            assert!(bucket < 3);
            assert_eq!(bucket, route(id, 3));
        }
    }

    #[test]
    fn routing_spreads_across_nodes() {
        let buckets: std::collections::HashSet<usize> =
            (1..=1000u32).map(|id| route(&id.to_string(), 4)).collect();
        assert_eq!(buckets.len(), 4);
    }
}

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::{commit, post_batch, IngestionStrategy, StrategyFactory, TransportConfig};
use crate::client::Client;
use crate::document::Document;

/// How many batches may sit in the queue before `submit` blocks, matching
/// the reference client's default queue size.
const QUEUE_DEPTH: usize = 10;

/// Client-side buffering transport: submitted batches land on a bounded
/// queue drained by a background worker task. `submit` therefore returns
/// before the batch is on the wire; transport errors surface no later than
/// the drain barrier inside `flush`.
pub struct BufferedUpdateFactory {
    config: TransportConfig,
}

impl BufferedUpdateFactory {
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }
}

impl StrategyFactory for BufferedUpdateFactory {
    fn name(&self) -> &str {
        "buffered"
    }

    fn create(&self) -> anyhow::Result<Box<dyn IngestionStrategy>> {
        let client = Client::new(&self.config.base_url)?;
        let collection = self.config.collection.clone();
        let (jobs, inbox) = mpsc::channel(QUEUE_DEPTH);
        let worker = tokio::spawn(worker_loop(client.clone(), collection.clone(), inbox));
        Ok(Box::new(BufferedUpdate { jobs: Some(jobs), worker: Some(worker), client, collection }))
    }
}

enum Job {
    Batch(Vec<Document>),
    Drain(oneshot::Sender<anyhow::Result<()>>),
}

struct BufferedUpdate {
    jobs: Option<mpsc::Sender<Job>>,
    worker: Option<JoinHandle<()>>,
    client: Client,
    collection: String,
}

async fn worker_loop(client: Client, collection: String, mut inbox: mpsc::Receiver<Job>) {
    let mut failed: Option<anyhow::Error> = None;
    while let Some(job) = inbox.recv().await {
        match job {
            Job::Batch(batch) => {
                // Batches queued behind a transport error are dropped; the
                // error reaches the caller at the next drain barrier.
                if failed.is_some() {
                    continue;
                }
                if let Err(error) = post_batch(&client, &collection, &batch).await {
                    failed = Some(error);
                }
            }
            Job::Drain(done) => {
                let _ = done.send(failed.take().map_or(Ok(()), Err));
            }
        }
    }
}

impl BufferedUpdate {
    fn jobs(&self) -> anyhow::Result<&mpsc::Sender<Job>> {
        self.jobs.as_ref().ok_or_else(|| anyhow!("buffered transport already closed"))
    }
}

#[async_trait]
impl IngestionStrategy for BufferedUpdate {
    async fn submit(&mut self, batch: Vec<Document>) -> anyhow::Result<()> {
        self.jobs()?
            .send(Job::Batch(batch))
            .await
            .map_err(|_| anyhow!("buffered transport worker is gone"))
    }

    async fn flush(&mut self) -> anyhow::Result<()> {
        let (done, drained) = oneshot::channel();
        self.jobs()?
            .send(Job::Drain(done))
            .await
            .map_err(|_| anyhow!("buffered transport worker is gone"))?;
        drained.await.context("buffered transport worker dropped the drain barrier")??;
        commit(&self.client, &self.collection).await
    }

    async fn close(&mut self) -> anyhow::Result<()> {
        // Dropping the sender closes the queue; the worker exits once the
        // backlog is consumed.
        self.jobs.take();
        if let Some(worker) = self.worker.take() {
            worker.await.context("buffered transport worker panicked")?;
        }
        Ok(())
    }
}

//! Single consumer that applies store mutations in submission order.
//!
//! The service submits an operation's writes while it still holds the state
//! lock, so the store sees mutations in the same order the state did.
//! Submitting never blocks.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use super::{KvStore, StoreWrite};

#[derive(Debug)]
enum WriterCommand {
    Apply(StoreWrite),
    FlushPrefix(String),
    Sync(oneshot::Sender<()>),
}

#[derive(Debug, Clone)]
pub struct StoreWriter {
    tx: mpsc::UnboundedSender<WriterCommand>,
}

impl StoreWriter {
    /// Spawns the writer task. Must be called inside a Tokio runtime.
    ///
    /// The task stops once every handle is dropped and the backlog is drained.
    pub fn start(store: Arc<dyn KvStore>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(store, rx));
        Self { tx }
    }

    pub fn submit(&self, writes: impl IntoIterator<Item = StoreWrite>) {
        for write in writes {
            self.send(WriterCommand::Apply(write));
        }
    }

    /// Queues removal of every key under `prefix`, ordered after earlier writes.
    pub fn flush_prefix(&self, prefix: impl Into<String>) {
        self.send(WriterCommand::FlushPrefix(prefix.into()));
    }

    /// Resolves once everything submitted before this call has been applied.
    pub async fn sync(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        self.send(WriterCommand::Sync(done_tx));
        let _ = done_rx.await;
    }

    fn send(&self, command: WriterCommand) {
        if self.tx.send(command).is_err() {
            warn!("Store writer stopped, command dropped");
        }
    }
}

async fn run(store: Arc<dyn KvStore>, mut rx: mpsc::UnboundedReceiver<WriterCommand>) {
    while let Some(command) = rx.recv().await {
        match command {
            WriterCommand::Apply(write) => write.apply(store.as_ref()).await,
            WriterCommand::FlushPrefix(prefix) => {
                if let Err(e) = store.flush_prefix(&prefix).await {
                    warn!(prefix = %prefix, "Store flush failed: {}", e);
                }
            },
            WriterCommand::Sync(done) => {
                let _ = done.send(());
            },
        }
    }
    debug!("Store writer stopped");
}

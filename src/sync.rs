//! Debounced background sync.
//!
//! Mutations enqueue events on an unbounded channel; a worker task coalesces
//! them per item id and writes the batch once no new change has arrived for
//! the debounce window. Failures are logged and the batch is retried on the
//! next window. Nothing here ever reports back to the scheduling path.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::domain::Item;
use crate::error::StoreError;
use crate::store::Persistence;

/// Remote copy of the item set (cloud backup, another device)
pub trait RemoteSync: Send + Sync {
    /// Snapshot of the remote items, merged into the local store at startup
    fn pull(&self) -> Result<Vec<Item>, StoreError>;

    fn push(&self, changed: &[Item], removed: &[String]) -> Result<(), StoreError>;
}

/// Remote that stores nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRemote;

impl RemoteSync for NoopRemote {
    fn pull(&self) -> Result<Vec<Item>, StoreError> {
        Ok(Vec::new())
    }

    fn push(&self, _changed: &[Item], _removed: &[String]) -> Result<(), StoreError> {
        Ok(())
    }
}

#[derive(Debug)]
pub enum SyncEvent {
    /// Item changed; carries the full new state
    Dirty(Item),
    Removed(Vec<String>),
    /// Write everything pending now, then acknowledge
    Flush(oneshot::Sender<()>),
}

/// Sending half held by the engine
#[derive(Debug, Clone)]
pub struct SyncHandle {
    tx: mpsc::UnboundedSender<SyncEvent>,
}

impl SyncHandle {
    pub fn mark_dirty(&self, item: &Item) {
        self.send(SyncEvent::Dirty(item.clone()));
    }

    pub fn mark_removed(&self, ids: Vec<String>) {
        if !ids.is_empty() {
            self.send(SyncEvent::Removed(ids));
        }
    }

    /// Force a write and wait for the worker to finish it
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        self.send(SyncEvent::Flush(ack));
        let _ = done.await;
    }

    fn send(&self, event: SyncEvent) {
        if self.tx.send(event).is_err() {
            tracing::warn!("Sync worker stopped, change not queued");
        }
    }
}

/// Start the worker; it runs until every handle is dropped, flushing on exit
pub fn spawn_sync_worker(
    persistence: Arc<dyn Persistence>,
    remote: Arc<dyn RemoteSync>,
    debounce: Duration,
) -> (SyncHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let worker = SyncWorker {
        persistence,
        remote,
        debounce,
        pending: BTreeMap::new(),
    };
    let task = tokio::spawn(worker.run(rx));
    (SyncHandle { tx }, task)
}

enum Wake {
    Event(Option<SyncEvent>),
    Deadline,
}

struct SyncWorker {
    persistence: Arc<dyn Persistence>,
    remote: Arc<dyn RemoteSync>,
    debounce: Duration,
    /// id -> new state, or None when removed
    pending: BTreeMap<String, Option<Item>>,
}

impl SyncWorker {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<SyncEvent>) {
        let mut deadline: Option<Instant> = None;

        loop {
            let wake = match deadline {
                Some(at) => tokio::select! {
                    event = rx.recv() => Wake::Event(event),
                    _ = tokio::time::sleep_until(at) => Wake::Deadline,
                },
                None => Wake::Event(rx.recv().await),
            };

            match wake {
                Wake::Deadline => {
                    deadline = self.flush_or_reschedule();
                }
                Wake::Event(Some(SyncEvent::Dirty(item))) => {
                    self.pending.insert(item.id.clone(), Some(item));
                    deadline = Some(Instant::now() + self.debounce);
                }
                Wake::Event(Some(SyncEvent::Removed(ids))) => {
                    for id in ids {
                        self.pending.insert(id, None);
                    }
                    deadline = Some(Instant::now() + self.debounce);
                }
                Wake::Event(Some(SyncEvent::Flush(ack))) => {
                    deadline = self.flush_or_reschedule();
                    let _ = ack.send(());
                }
                Wake::Event(None) => {
                    if !self.pending.is_empty() && !self.flush() {
                        tracing::warn!("Sync worker exiting with {} unsaved changes", self.pending.len());
                    }
                    break;
                }
            }
        }
    }

    fn flush_or_reschedule(&mut self) -> Option<Instant> {
        if self.flush() {
            None
        } else {
            Some(Instant::now() + self.debounce)
        }
    }

    /// Write the pending batch; on failure it stays pending for the next window
    fn flush(&mut self) -> bool {
        if self.pending.is_empty() {
            return true;
        }

        let mut changed = Vec::new();
        let mut removed = Vec::new();
        for (id, state) in &self.pending {
            match state {
                Some(item) => changed.push(item.clone()),
                None => removed.push(id.clone()),
            }
        }

        let result = self
            .write_local(&changed, &removed)
            .and_then(|_| self.remote.push(&changed, &removed));

        match result {
            Ok(()) => {
                tracing::debug!("Synced {} changed and {} removed items", changed.len(), removed.len());
                self.pending.clear();
                true
            }
            Err(e) => {
                tracing::warn!("Sync failed, retrying in {:?}: {}", self.debounce, e);
                false
            }
        }
    }

    fn write_local(&self, changed: &[Item], removed: &[String]) -> Result<(), StoreError> {
        if !changed.is_empty() {
            self.persistence.save_items(changed)?;
        }
        if !removed.is_empty() {
            self.persistence.delete_items(removed)?;
        }
        Ok(())
    }
}

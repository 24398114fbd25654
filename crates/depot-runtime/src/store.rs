//! The canonical world-state store.
//!
//! Writers are serialized behind a mutex; every `apply` produces a new
//! immutable [`WorldSnapshot`] that readers share through an `Arc` without
//! blocking the writer. Snapshots are also published on a `watch` channel so
//! observers can follow the latest state.

use chrono::{DateTime, Utc};
use depot_core::WorldState;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// An immutable, versioned copy of the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldSnapshot {
    pub version: u64,
    pub state: WorldState,
    pub updated_at: DateTime<Utc>,
}

/// One accepted `apply` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldChange {
    pub version: u64,
    pub effects: WorldState,
    /// Who applied it, e.g. `picker-1/PickOrders` or `external`.
    pub source: String,
    pub at: DateTime<Utc>,
}

pub struct WorldStateStore {
    log: Mutex<VecDeque<WorldChange>>,
    history_limit: usize,
    tx: watch::Sender<Arc<WorldSnapshot>>,
}

impl WorldStateStore {
    pub fn new(initial: WorldState, history_limit: usize) -> Self {
        let snapshot = Arc::new(WorldSnapshot {
            version: 0,
            state: initial,
            updated_at: Utc::now(),
        });
        let (tx, _) = watch::channel(snapshot);
        Self {
            log: Mutex::new(VecDeque::new()),
            history_limit,
            tx,
        }
    }

    /// The current snapshot. Never blocks on a writer for longer than the
    /// pointer swap.
    pub fn snapshot(&self) -> Arc<WorldSnapshot> {
        Arc::clone(&self.tx.borrow())
    }

    pub fn version(&self) -> u64 {
        self.tx.borrow().version
    }

    /// Merge `effects` into the canonical state (last writer wins per key) and
    /// return the new snapshot.
    pub fn apply(&self, effects: &WorldState, source: &str) -> Arc<WorldSnapshot> {
        // Holding the log lock makes this the single writer.
        let mut log = self.log.lock();
        let current = self.snapshot();
        let next = Arc::new(WorldSnapshot {
            version: current.version + 1,
            state: current.state.merged(effects),
            updated_at: Utc::now(),
        });

        if self.history_limit > 0 {
            log.push_back(WorldChange {
                version: next.version,
                effects: effects.clone(),
                source: source.to_string(),
                at: next.updated_at,
            });
            while log.len() > self.history_limit {
                log.pop_front();
            }
        }

        self.tx.send_replace(Arc::clone(&next));
        debug!(version = next.version, source, keys = effects.len(), "world state updated");
        next
    }

    /// Applied changes, oldest first.
    pub fn history(&self) -> Vec<WorldChange> {
        self.log.lock().iter().cloned().collect()
    }

    /// Follow snapshots as they are published.
    pub fn subscribe(&self) -> watch::Receiver<Arc<WorldSnapshot>> {
        self.tx.subscribe()
    }
}

impl Default for WorldStateStore {
    fn default() -> Self {
        Self::new(WorldState::new(), 256)
    }
}

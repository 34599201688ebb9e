//! Snapshot, apply, call, commit-or-revert.

use std::future::Future;

use tokio::sync::RwLock;

/// A list whose changes are shown before the server confirms them.
///
/// `update` applies a mutation right away and puts the previous list back if
/// the accompanying call fails. Mutations may overlap: each one snapshots
/// whatever is current when it starts (possibly another mutation's
/// unconfirmed result), so a failure restores exactly that snapshot and
/// discards anything applied on top of it since.
#[derive(Debug)]
pub struct Optimistic<T> {
    items: RwLock<Vec<T>>,
}

impl<T: Clone + Send + Sync> Optimistic<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items: RwLock::new(items),
        }
    }

    pub async fn current(&self) -> Vec<T> {
        self.items.read().await.clone()
    }

    /// Replaces the list with confirmed data, e.g. after a fetch.
    pub async fn replace(&self, items: Vec<T>) {
        *self.items.write().await = items;
    }

    pub async fn update<R, E, F, Fut>(&self, mutate: F, call: Fut) -> Result<R, E>
    where
        F: FnOnce(&[T]) -> Vec<T>,
        Fut: Future<Output = Result<R, E>>,
    {
        let snapshot = {
            let mut items = self.items.write().await;
            let next = mutate(&items);
            std::mem::replace(&mut *items, next)
        };

        match call.await {
            Ok(result) => Ok(result),
            Err(e) => {
                *self.items.write().await = snapshot;
                Err(e)
            }
        }
    }
}

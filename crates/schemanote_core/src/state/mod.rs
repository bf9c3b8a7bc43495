//! Application state: the single in-memory copy of the dataset.
//!
//! # Responsibility
//! - Hold the persistence service and the loaded dataset together.
//! - Funnel every mutation through storage before observers see it.
//!
//! # Invariants
//! - A mutation is persisted before any `DataChange` is dispatched.
//! - A failed mutation or save leaves the in-memory dataset unchanged.

pub mod observer;

use crate::model::dataset::Dataset;
use crate::repo::dataset_repo::{DataStore, StoreError, StoreResult};
use crate::repo::kv_repo::KeyValueStore;
use log::{debug, info};
pub use observer::{ChangeKind, DataChange, DataObserver, SubscriptionId, Subscribers};

/// Explicit application state shared by the editors.
pub struct AppState<S: KeyValueStore> {
    store: DataStore<S>,
    dataset: Dataset,
    subscribers: Subscribers,
}

impl<S: KeyValueStore> AppState<S> {
    /// Loads the stored dataset into a new state object.
    pub fn open(store: DataStore<S>) -> StoreResult<Self> {
        let dataset = store.load()?;
        info!(
            "event=state_open module=state status=ok schemas={} notes={}",
            dataset.schemas.len(),
            dataset.notes.len()
        );
        Ok(Self {
            store,
            dataset,
            subscribers: Subscribers::new(),
        })
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn store(&self) -> &DataStore<S> {
        &self.store
    }

    /// Registers an observer for committed changes.
    pub fn subscribe(&mut self, observer: impl DataObserver + 'static) -> SubscriptionId {
        self.subscribers.subscribe(Box::new(observer))
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    /// Applies `mutate` to a working copy, persists it, then notifies.
    ///
    /// When `mutate` returns an error nothing is saved or dispatched.
    pub fn update<R, E>(
        &mut self,
        kind: ChangeKind,
        mutate: impl FnOnce(&mut Dataset) -> Result<R, E>,
    ) -> Result<R, E>
    where
        E: From<StoreError>,
    {
        let mut working = self.dataset.clone();
        let result = mutate(&mut working)?;
        self.store.save(&working)?;
        self.dataset = working;
        self.dispatch(kind);
        Ok(result)
    }

    /// Re-reads storage, discarding the in-memory copy.
    pub fn reload(&mut self) -> StoreResult<()> {
        self.dataset = self.store.load()?;
        self.dispatch(ChangeKind::Replaced);
        Ok(())
    }

    /// Pretty-printed JSON of the stored dataset.
    pub fn export_json(&self) -> StoreResult<String> {
        self.store.export_json()
    }

    /// Replaces storage with an imported document and adopts it.
    ///
    /// On invalid JSON neither storage nor the in-memory dataset changes.
    pub fn import_json(&mut self, json: &str) -> StoreResult<&Dataset> {
        self.dataset = self.store.import_json(json)?;
        self.dispatch(ChangeKind::Replaced);
        Ok(&self.dataset)
    }

    /// Removes all stored data.
    pub fn clear_all(&mut self) -> StoreResult<()> {
        self.store.clear()?;
        self.dataset = Dataset::default();
        self.dispatch(ChangeKind::Replaced);
        Ok(())
    }

    fn dispatch(&self, kind: ChangeKind) {
        debug!(
            "event=state_change module=state kind={} observers={}",
            kind.as_str(),
            self.subscribers.len()
        );
        self.subscribers.notify(&DataChange { kind });
    }
}

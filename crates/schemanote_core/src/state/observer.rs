//! Change subscriptions for application state.
//!
//! # Invariants
//! - Observers are notified in subscription order.
//! - Subscription ids are never reused within one registry.

use std::collections::BTreeMap;

/// Which part of the dataset a committed mutation touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Schemas were created, edited or deleted (notes may have cascaded).
    SchemasChanged,
    /// Notes were created, edited or deleted.
    NotesChanged,
    /// The whole dataset was replaced (import, clear, reload).
    Replaced,
}

impl ChangeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SchemasChanged => "schemas_changed",
            Self::NotesChanged => "notes_changed",
            Self::Replaced => "replaced",
        }
    }

    /// Whether listeners depending on the schema list must refresh.
    pub fn affects_schemas(self) -> bool {
        matches!(self, Self::SchemasChanged | Self::Replaced)
    }
}

/// Notification delivered after a mutation has been persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataChange {
    pub kind: ChangeKind,
}

/// Listener for committed dataset changes.
pub trait DataObserver {
    fn on_change(&self, change: &DataChange);
}

impl<F: Fn(&DataChange)> DataObserver for F {
    fn on_change(&self, change: &DataChange) {
        self(change)
    }
}

/// Handle returned by `Subscribers::subscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

/// Ordered observer registry.
#[derive(Default)]
pub struct Subscribers {
    observers: BTreeMap<SubscriptionId, Box<dyn DataObserver>>,
    next_id: u64,
}

impl Subscribers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: Box<dyn DataObserver>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.insert(id, observer);
        id
    }

    /// Removes an observer. Returns `false` when `id` was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn notify(&self, change: &DataChange) {
        for observer in self.observers.values() {
            observer.on_change(change);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ChangeKind, DataChange, Subscribers};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn notify_reaches_observers_in_subscription_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut subscribers = Subscribers::new();
        for tag in ["first", "second"] {
            let seen = Rc::clone(&seen);
            subscribers.subscribe(Box::new(move |change: &DataChange| {
                seen.borrow_mut().push((tag, change.kind));
            }));
        }

        subscribers.notify(&DataChange {
            kind: ChangeKind::NotesChanged,
        });
        assert_eq!(
            *seen.borrow(),
            vec![
                ("first", ChangeKind::NotesChanged),
                ("second", ChangeKind::NotesChanged)
            ]
        );
    }

    #[test]
    fn unsubscribe_is_not_repeatable() {
        let mut subscribers = Subscribers::new();
        let id = subscribers.subscribe(Box::new(|_: &DataChange| {}));
        assert!(subscribers.unsubscribe(id));
        assert!(!subscribers.unsubscribe(id));
        assert!(subscribers.is_empty());
    }
}

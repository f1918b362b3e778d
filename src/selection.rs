//! Ordered, duplicate-free set of selected object ids.
//!
//! Every mutation that changes membership publishes one [`SelectionChange`]
//! on a broadcast channel; no-op calls publish nothing.

use crate::models::ObjectId;
use indexmap::IndexSet;
use tokio::sync::broadcast;

const CHANGE_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionChange {
    pub added: Vec<ObjectId>,
    pub removed: Vec<ObjectId>,
    /// Membership count after the change
    pub count: usize,
}

#[derive(Debug)]
pub struct SelectionStore {
    ids: IndexSet<ObjectId>,
    changes: broadcast::Sender<SelectionChange>,
}

impl Default for SelectionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        SelectionStore {
            ids: IndexSet::new(),
            changes,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SelectionChange> {
        self.changes.subscribe()
    }

    pub fn add(&mut self, id: ObjectId) -> bool {
        if !self.ids.insert(id) {
            return false;
        }
        self.publish(vec![id], Vec::new());
        true
    }

    pub fn remove(&mut self, id: ObjectId) -> bool {
        // shift keeps insertion order stable for table iteration
        if !self.ids.shift_remove(&id) {
            return false;
        }
        self.publish(Vec::new(), vec![id]);
        true
    }

    /// Adds every id not yet present. Returns how many were new.
    pub fn add_many<I: IntoIterator<Item = ObjectId>>(&mut self, ids: I) -> usize {
        let added: Vec<ObjectId> = ids.into_iter().filter(|id| self.ids.insert(*id)).collect();
        let n = added.len();
        if n > 0 {
            self.publish(added, Vec::new());
        }
        n
    }

    pub fn remove_all(&mut self) -> usize {
        if self.ids.is_empty() {
            return 0;
        }
        let removed: Vec<ObjectId> = self.ids.drain(..).collect();
        let n = removed.len();
        self.publish(Vec::new(), removed);
        n
    }

    /// Removes `id` when present, adds it otherwise. Returns the new membership.
    pub fn toggle(&mut self, id: ObjectId) -> bool {
        if self.contains(id) {
            self.remove(id);
            false
        } else {
            self.add(id);
            true
        }
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.ids.contains(&id)
    }

    pub fn count(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn to_vec(&self) -> Vec<ObjectId> {
        self.ids.iter().copied().collect()
    }

    fn publish(&self, added: Vec<ObjectId>, removed: Vec<ObjectId>) {
        // Err only means nobody is listening
        let _ = self.changes.send(SelectionChange {
            added,
            removed,
            count: self.ids.len(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::HashSet;
    use tokio::sync::broadcast::error::TryRecvError;

    fn drain(rx: &mut broadcast::Receiver<SelectionChange>) -> Vec<SelectionChange> {
        let mut out = Vec::new();
        loop {
            match rx.try_recv() {
                Ok(change) => out.push(change),
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return out,
                Err(TryRecvError::Lagged(_)) => continue,
            }
        }
    }

    #[test]
    fn test_add_many_dedups_and_notifies_once() {
        let mut store = SelectionStore::new();
        let mut rx = store.subscribe();

        let added = store.add_many([1, 2, 1, 3]);

        assert_eq!(added, 3);
        assert_eq!(store.count(), 3);
        let changes = drain(&mut rx);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].added, vec![1, 2, 3]);
        assert_eq!(changes[0].count, 3);
    }

    #[test]
    fn test_noop_mutations_do_not_notify() {
        let mut store = SelectionStore::new();
        store.add(5);
        let mut rx = store.subscribe();

        assert!(!store.add(5));
        assert!(!store.remove(6));
        assert_eq!(store.add_many([5]), 0);
        assert_eq!(store.add_many(Vec::new()), 0);

        assert!(drain(&mut rx).is_empty());

        store.remove_all();
        assert_eq!(store.remove_all(), 0);
        let changes = drain(&mut rx);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].removed, vec![5]);
        assert_eq!(changes[0].count, 0);
    }

    #[test]
    fn test_insertion_order_survives_removal() {
        let mut store = SelectionStore::new();
        store.add_many([40, 10, 30, 20]);
        store.remove(10);
        store.add(10);
        assert_eq!(store.to_vec(), vec![40, 30, 20, 10]);
    }

    #[test]
    fn test_toggle_flips_membership() {
        let mut store = SelectionStore::new();
        assert!(store.toggle(8));
        assert!(store.contains(8));
        assert!(!store.toggle(8));
        assert!(!store.contains(8));
    }

    // Random add/remove sequences checked against a plain HashSet model.
    #[test]
    fn test_random_sequences_match_model() {
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..100 {
            let mut store = SelectionStore::new();
            let mut model = HashSet::new();

            for _ in 0..200 {
                let id = rng.random_range(0..30);
                match rng.random_range(0..3) {
                    0 => {
                        assert_eq!(store.add(id), model.insert(id));
                    }
                    1 => {
                        assert_eq!(store.remove(id), model.remove(&id));
                    }
                    _ => {
                        let batch: Vec<ObjectId> =
                            (0..rng.random_range(0..6)).map(|_| rng.random_range(0..30)).collect();
                        let before = model.len();
                        model.extend(batch.iter().copied());
                        assert_eq!(store.add_many(batch), model.len() - before);
                    }
                }
                assert_eq!(store.count(), model.len());
            }
            assert!(model.iter().all(|id| store.contains(*id)));
        }
    }
}

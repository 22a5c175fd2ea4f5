//! Insertion-ordered, capacity-bounded record store.

use std::collections::{HashMap, VecDeque};

use super::record::{DownloadId, DownloadRecord};

/// Upper bound on entries evicted in one trim.
const EVICTION_BATCH: usize = 10;

#[derive(Debug, Clone)]
pub struct DownloadStore {
    records: HashMap<DownloadId, DownloadRecord>,
    /// Ids, oldest insertion first.
    order: VecDeque<DownloadId>,
    capacity: usize,
}

impl DownloadStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: DownloadId) -> Option<&DownloadRecord> {
        self.records.get(&id)
    }

    pub fn get_mut(&mut self, id: DownloadId) -> Option<&mut DownloadRecord> {
        self.records.get_mut(&id)
    }

    pub fn contains(&self, id: DownloadId) -> bool {
        self.records.contains_key(&id)
    }

    /// Insert or replace `id`, then trim to capacity. A replaced id keeps its
    /// original position. Returns the evicted ids, oldest first.
    pub fn insert(&mut self, id: DownloadId, record: DownloadRecord) -> Vec<DownloadId> {
        if self.records.insert(id, record).is_none() {
            self.order.push_back(id);
        }
        self.enforce_capacity()
    }

    /// Inserts without trimming; used when restoring a persisted snapshot.
    pub(super) fn push_restored(&mut self, id: DownloadId, record: DownloadRecord) {
        if self.records.insert(id, record).is_none() {
            self.order.push_back(id);
        }
    }

    /// Remove `id`. Absent ids are a no-op.
    pub fn remove(&mut self, id: DownloadId) -> Option<DownloadRecord> {
        let removed = self.records.remove(&id)?;
        self.order.retain(|x| *x != id);
        Some(removed)
    }

    /// While over capacity, drop the oldest `min(10, overflow + 10)` entries.
    pub fn enforce_capacity(&mut self) -> Vec<DownloadId> {
        let mut evicted = Vec::new();
        while self.records.len() > self.capacity {
            let overflow = self.records.len() - self.capacity;
            let to_remove = EVICTION_BATCH.min(overflow + EVICTION_BATCH);
            for _ in 0..to_remove {
                let Some(id) = self.order.pop_front() else {
                    return evicted;
                };
                self.records.remove(&id);
                evicted.push(id);
            }
        }
        evicted
    }

    /// Remove every record matching `pred`; returns how many went.
    pub fn remove_where(&mut self, mut pred: impl FnMut(&DownloadRecord) -> bool) -> usize {
        let before = self.records.len();
        self.records.retain(|_, r| !pred(r));
        let records = &self.records;
        self.order.retain(|id| records.contains_key(id));
        before - self.records.len()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (DownloadId, &DownloadRecord)> + '_ {
        self.order
            .iter()
            .filter_map(move |id| self.records.get(id).map(|r| (*id, r)))
    }

    pub fn ids(&self) -> Vec<DownloadId> {
        self.order.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(name: &str) -> DownloadRecord {
        DownloadRecord::new(Some(name), 0)
    }

    #[test]
    fn eviction_is_oldest_first_in_batches() {
        let mut store = DownloadStore::new(100);
        for id in 1..=100 {
            assert!(store.insert(id, rec("f")).is_empty());
        }
        let evicted = store.insert(101, rec("f"));
        assert_eq!(evicted, (1..=10).collect::<Vec<_>>());
        assert_eq!(store.len(), 91);
        assert_eq!(store.ids().first(), Some(&11));
        assert_eq!(store.ids().last(), Some(&101));
    }

    #[test]
    fn size_never_exceeds_capacity() {
        let mut store = DownloadStore::new(100);
        for id in 0..1000 {
            store.insert(id, rec("f"));
            assert!(store.len() <= 100);
        }
    }

    #[test]
    fn replacing_keeps_position() {
        let mut store = DownloadStore::new(3);
        store.insert(1, rec("a"));
        store.insert(2, rec("b"));
        store.insert(1, rec("a2"));
        assert_eq!(store.ids(), vec![1, 2]);
        assert_eq!(store.get(1).unwrap().filename, "a2");
    }

    #[test]
    fn removing_absent_id_is_noop() {
        let mut store = DownloadStore::new(10);
        assert!(store.remove(42).is_none());
        store.insert(1, rec("a"));
        assert!(store.remove(1).is_some());
        assert!(store.remove(1).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn remove_where_keeps_order_of_survivors() {
        let mut store = DownloadStore::new(10);
        for id in 1..=5 {
            let mut r = rec("f");
            r.completed = id % 2 == 0;
            store.insert(id, r);
        }
        assert_eq!(store.remove_where(|r| r.completed), 2);
        assert_eq!(store.ids(), vec![1, 3, 5]);
    }
}

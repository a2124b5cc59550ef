use std::collections::{HashMap, VecDeque};
use uuid::Uuid;

/// Least-recently-used map from prepared-formula identity to its
/// interpreted expression. A capacity of zero stores nothing.
pub(crate) struct FormulaCache<V> {
    entries: HashMap<Uuid, V>,
    lru: VecDeque<Uuid>,
    capacity: usize,
}

impl<V: Clone> FormulaCache<V> {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            lru: VecDeque::new(),
            capacity,
        }
    }

    pub(crate) fn get(&mut self, key: &Uuid) -> Option<V> {
        let value = self.entries.get(key).cloned()?;
        self.touch(*key);
        Some(value)
    }

    /// Inserts and returns how many entries were evicted to make room.
    pub(crate) fn insert(&mut self, key: Uuid, value: V) -> usize {
        if self.capacity == 0 {
            return 0;
        }
        self.entries.insert(key, value);
        self.touch(key);
        let mut evicted = 0;
        while self.lru.len() > self.capacity {
            if let Some(old) = self.lru.pop_front() {
                self.entries.remove(&old);
                evicted += 1;
            }
        }
        evicted
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
    }

    fn touch(&mut self, key: Uuid) {
        if let Some(pos) = self.lru.iter().position(|k| *k == key) {
            self.lru.remove(pos);
        }
        self.lru.push_back(key);
    }
}

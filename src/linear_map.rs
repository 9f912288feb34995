use std::{
    borrow::Borrow,
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    iter, mem, slice,
};

use crate::{ProbeStats, TableError};

/// Number of slots allocated by [`LinearHashMap::new`]
pub const DEFAULT_CAPACITY: usize = 8;
/// Occupancy, in percent, above which an insert grows the table first
pub const DEFAULT_LOAD_FACTOR_THRESHOLD: usize = 80;
/// Lowest accepted load factor threshold, in percent
const MIN_LOAD_FACTOR_THRESHOLD: usize = 1;
/// Highest accepted load factor threshold, in percent. Keeps at least one slot empty.
const MAX_LOAD_FACTOR_THRESHOLD: usize = 95;

/// A single cell of the table
#[derive(Debug, Clone)]
enum Slot<K, V> {
    /// Never written, or cleared by a removal
    Empty,
    /// Holds a live key-value pair
    Occupied {
        /// The stored key
        key: K,
        /// The value associated with the key
        value: V,
    },
}

impl<K, V> Slot<K, V> {
    /// Returns true if the slot holds no entry
    fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Empties the slot, returning the entry it held
    fn take(&mut self) -> Option<(K, V)> {
        mem::replace(self, Self::Empty).into_entry()
    }

    /// Consumes the slot, returning the entry it held
    fn into_entry(self) -> Option<(K, V)> {
        match self {
            Self::Empty => None,
            Self::Occupied { key, value } => Some((key, value)),
        }
    }
}

/// Outcome of walking the probe sequence for a key
enum Probe {
    /// The key sits at this index
    Found(usize),
    /// The key is absent; this is the first empty slot on its probe sequence
    Vacant(usize),
    /// Every slot was visited without a match or an empty slot
    Exhausted,
}

/// An open-addressed hash table with linear probing.
///
/// Keys are hashed to a home slot and stored in the first free slot at or after it,
/// wrapping around the end of the slot array. The table doubles its capacity before an
/// insert would push occupancy above the load factor threshold (80% by default).
///
/// Removal does not leave tombstones. The entries in the occupied run following a
/// removed slot are re-placed from their home slots, so every stored key stays reachable
/// from its home slot without crossing an empty slot.
///
/// Note: This implementation is not thread-safe. Wrap it in a lock to share it.
#[derive(Debug, Clone)]
pub struct LinearHashMap<K, V> {
    /// The slot array; its length is always a power of two
    slots: Vec<Slot<K, V>>,
    /// Number of occupied slots
    len: usize,
    /// Threshold for load factor before growing - stored as percentage (1-95)
    load_factor_threshold: usize,
}

impl<K, V> Default for LinearHashMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> LinearHashMap<K, V> {
    /// Creates an empty table with [`DEFAULT_CAPACITY`] slots
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates an empty table with at least `capacity` slots.
    ///
    /// The capacity is rounded up to a power of two, with a minimum of one slot.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1).next_power_of_two();

        Self {
            slots: empty_slots(capacity),
            len: 0,
            load_factor_threshold: DEFAULT_LOAD_FACTOR_THRESHOLD,
        }
    }

    /// Returns the number of entries in the table
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the table holds no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of slots in the table
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the current ratio of occupied slots to capacity
    #[must_use]
    #[allow(clippy::arithmetic_side_effects, clippy::cast_precision_loss)]
    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.slots.len() as f64
    }

    /// Returns the load factor threshold, in percent
    #[must_use]
    pub fn load_factor_threshold(&self) -> usize {
        self.load_factor_threshold
    }

    /// Sets the load factor threshold, in percent.
    ///
    /// Values are clamped to `1..=95`. A lower threshold takes effect on the next insert.
    pub fn set_load_factor_threshold(&mut self, threshold: usize) {
        self.load_factor_threshold =
            threshold.clamp(MIN_LOAD_FACTOR_THRESHOLD, MAX_LOAD_FACTOR_THRESHOLD);
    }

    /// Returns an iterator over the entries, in slot order
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter { slots: self.slots.iter() }
    }

    /// Index mask for the current capacity
    fn mask(&self) -> usize {
        self.slots.len().saturating_sub(1)
    }

    /// Returns a mutable reference to the value stored at `index`
    fn value_at_mut(&mut self, index: usize) -> Option<&mut V> {
        match self.slots.get_mut(index) {
            Some(Slot::Occupied { value, .. }) => Some(value),
            Some(Slot::Empty) | None => None,
        }
    }
}

impl<K, V> LinearHashMap<K, V>
where
    K: Eq + Hash,
{
    /// Inserts a key-value pair, returning the previous value if the key was present.
    ///
    /// Grows the table first if one more entry would exceed the load factor threshold.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        while self.needs_growth() {
            self.grow();
        }

        match self.probe(&key) {
            Probe::Found(index) => {
                self.value_at_mut(index).map(|current| mem::replace(current, value))
            }
            Probe::Vacant(index) => {
                if let Some(slot) = self.slots.get_mut(index) {
                    *slot = Slot::Occupied { key, value };
                    self.len = self.len.saturating_add(1);
                }
                None
            }
            // Only reachable if the threshold failed to keep a slot free
            Probe::Exhausted => {
                self.grow();
                self.insert(key, value)
            }
        }
    }

    /// Looks up the value stored for `key`
    ///
    /// # Errors
    ///
    /// Returns [`TableError::NotFound`] if the key is not in the table.
    pub fn search<Q>(&self, key: &Q) -> Result<&V, TableError>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Probe::Found(index) = self.probe(key) else {
            return Err(TableError::NotFound);
        };

        match self.slots.get(index) {
            Some(Slot::Occupied { value, .. }) => Ok(value),
            Some(Slot::Empty) | None => Err(TableError::NotFound),
        }
    }

    /// Retrieve a value for a given key
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.search(key).ok()
    }

    /// Get a mutable reference to a value for a given key
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.probe(key) {
            Probe::Found(index) => self.value_at_mut(index),
            Probe::Vacant(_) | Probe::Exhausted => None,
        }
    }

    /// Removes `key` from the table and returns its value
    ///
    /// # Errors
    ///
    /// Returns [`TableError::NotFound`] if the key is not in the table. The table is
    /// left unchanged in that case.
    pub fn remove<Q>(&mut self, key: &Q) -> Result<V, TableError>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Probe::Found(index) = self.probe(key) else {
            return Err(TableError::NotFound);
        };

        let (_, value) =
            self.slots.get_mut(index).and_then(Slot::take).ok_or(TableError::NotFound)?;
        self.len = self.len.saturating_sub(1);
        self.repair_cluster(index);

        Ok(value)
    }

    /// Measures how far every entry sits from its home slot
    #[must_use]
    pub fn probe_stats(&self) -> ProbeStats {
        let mask = self.mask();
        let mut stats = ProbeStats::default();

        for (index, slot) in self.slots.iter().enumerate() {
            if let Slot::Occupied { key, .. } = slot {
                stats.record(index.wrapping_sub(self.home_index(key)) & mask);
            }
        }

        stats
    }

    /// Gets the home slot index for a key
    #[allow(clippy::cast_possible_truncation)]
    fn home_index<Q: ?Sized + Hash>(&self, key: &Q) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() as usize) & self.mask()
    }

    /// Walks the probe sequence of `key` until it finds the key or an empty slot
    fn probe<Q>(&self, key: &Q) -> Probe
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mask = self.mask();
        let mut index = self.home_index(key);

        for _ in 0..self.slots.len() {
            match self.slots.get(index) {
                Some(Slot::Empty) => return Probe::Vacant(index),
                Some(Slot::Occupied { key: stored, .. }) if stored.borrow() == key => {
                    return Probe::Found(index);
                }
                Some(Slot::Occupied { .. }) => {}
                None => break,
            }
            index = index.wrapping_add(1) & mask;
        }

        Probe::Exhausted
    }

    /// Returns true if inserting one more entry would exceed the load factor threshold
    fn needs_growth(&self) -> bool {
        self.len.saturating_add(1).saturating_mul(100) >
            self.slots.len().saturating_mul(self.load_factor_threshold)
    }

    /// Stores an entry known to be absent in the first empty slot of its probe sequence
    fn place(&mut self, key: K, value: V) {
        let mask = self.mask();
        let mut index = self.home_index(&key);

        // The load factor threshold keeps at least one slot empty
        for _ in 0..self.slots.len() {
            match self.slots.get_mut(index) {
                Some(slot) if slot.is_empty() => {
                    *slot = Slot::Occupied { key, value };
                    return;
                }
                Some(_) => index = index.wrapping_add(1) & mask,
                None => return,
            }
        }
    }

    /// Re-places every entry of the occupied run that follows a vacated slot.
    ///
    /// An entry in that run may have probed past the vacated slot; moving it back keeps
    /// it reachable from its home slot.
    fn repair_cluster(&mut self, vacated: usize) {
        let mask = self.mask();
        let mut index = vacated.wrapping_add(1) & mask;

        while index != vacated {
            let Some((key, value)) = self.slots.get_mut(index).and_then(Slot::take) else {
                break;
            };
            self.place(key, value);
            index = index.wrapping_add(1) & mask;
        }
    }

    /// Doubles the capacity and re-places every entry in the new slot array
    fn grow(&mut self) {
        let new_capacity = self.slots.len().saturating_mul(2);
        let old_slots = mem::replace(&mut self.slots, empty_slots(new_capacity));

        for (key, value) in old_slots.into_iter().filter_map(Slot::into_entry) {
            self.place(key, value);
        }
    }
}

/// Allocates `capacity` empty slots
fn empty_slots<K, V>(capacity: usize) -> Vec<Slot<K, V>> {
    iter::repeat_with(|| Slot::Empty).take(capacity).collect()
}

/// Iterator over the key-value pairs of the table, in slot order
#[derive(Debug, Clone)]
pub struct Iter<'a, K, V> {
    /// Remaining slots to visit
    slots: slice::Iter<'a, Slot<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.slots.find_map(|slot| match slot {
            Slot::Occupied { key, value } => Some((key, value)),
            Slot::Empty => None,
        })
    }
}

impl<'a, K, V> IntoIterator for &'a LinearHashMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Key whose hash ignores its identity, so every instance shares one home slot
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Collider(u32);

    impl Hash for Collider {
        fn hash<H: Hasher>(&self, state: &mut H) {
            0_u8.hash(state);
        }
    }

    /// Checks that every stored key is reachable from its home slot without crossing an
    /// empty slot, and that `len` matches the occupied slots.
    fn assert_probe_invariant<K: Eq + Hash, V>(map: &LinearHashMap<K, V>) {
        let mask = map.mask();
        let mut occupied = 0;

        for (index, slot) in map.slots.iter().enumerate() {
            if let Slot::Occupied { key, .. } = slot {
                occupied += 1;
                let mut cursor = map.home_index(key);
                while cursor != index {
                    assert!(!map.slots[cursor].is_empty(), "empty slot {cursor} before {index}");
                    cursor = (cursor + 1) & mask;
                }
            }
        }

        assert_eq!(occupied, map.len());
    }

    #[test]
    fn test_insert_and_search() {
        let mut map = LinearHashMap::new();
        assert_eq!(map.insert("key1".to_string(), 1), None);
        assert_eq!(map.insert("key2".to_string(), 2), None);
        assert_eq!(map.insert("key3".to_string(), 3), None);

        assert_eq!(map.search("key1"), Ok(&1));
        assert_eq!(map.search("key2"), Ok(&2));
        assert_eq!(map.search("key3"), Ok(&3));
        assert_eq!(map.search("key4"), Err(TableError::NotFound));
    }

    #[test]
    fn test_search_after_remove() {
        let mut map = LinearHashMap::new();
        map.insert("key1".to_string(), 1);
        map.insert("key2".to_string(), 2);
        map.insert("key3".to_string(), 3);

        assert_eq!(map.search("key2"), Ok(&2));
        assert_eq!(map.remove("key2"), Ok(2));
        assert_eq!(map.search("key2"), Err(TableError::NotFound));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_update() {
        let mut map = LinearHashMap::new();
        assert_eq!(map.insert("key1".to_string(), 1), None);
        assert_eq!(map.insert("key1".to_string(), 10), Some(1));
        assert_eq!(map.get("key1"), Some(&10));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_remove() {
        let mut map = LinearHashMap::new();
        map.insert("key1".to_string(), 1);
        map.insert("key2".to_string(), 2);

        assert_eq!(map.remove("key1"), Ok(1));
        assert_eq!(map.get("key1"), None);
        assert_eq!(map.get("key2"), Some(&2));
        assert_eq!(map.remove("key1"), Err(TableError::NotFound));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_empty_table_reports_not_found() {
        let mut map: LinearHashMap<String, i32> = LinearHashMap::new();

        assert_eq!(map.search("missing"), Err(TableError::NotFound));
        assert_eq!(map.remove("missing"), Err(TableError::NotFound));
        assert!(map.is_empty());
        assert_eq!(map.capacity(), DEFAULT_CAPACITY);
    }

    #[test]
    fn test_grows_on_seventh_insert() {
        let mut map = LinearHashMap::new();

        for i in 0..6 {
            map.insert(i, i * 10);
        }
        assert_eq!(map.capacity(), 8);
        assert_eq!(map.len(), 6);

        map.insert(6, 60);
        assert_eq!(map.capacity(), 16);
        assert_eq!(map.len(), 7);

        for i in 0..7 {
            assert_eq!(map.search(&i), Ok(&(i * 10)));
        }
    }

    #[test]
    fn test_overwrite_keeps_len() {
        let mut map = LinearHashMap::new();
        for i in 0..6 {
            map.insert(i, i);
        }

        // Overwrites still check the threshold, as the key might have been new
        map.insert(0, 100);
        assert_eq!(map.len(), 6);
        assert_eq!(map.get(&0), Some(&100));
    }

    #[test]
    fn test_growth_keeps_entries() {
        let mut map = LinearHashMap::with_capacity(2);

        for i in 0..1000 {
            map.insert(i, i.to_string());
        }

        assert_eq!(map.len(), 1000);
        assert_eq!(map.capacity(), 2048);
        for i in 0..1000 {
            assert_eq!(map.get(&i), Some(&i.to_string()));
        }
        assert_probe_invariant(&map);
    }

    #[test]
    fn test_load_factor_bound_after_each_insert() {
        let mut map = LinearHashMap::with_capacity(1);

        for i in 0..500_u32 {
            map.insert(i, ());
            assert!(map.len() * 100 <= map.capacity() * DEFAULT_LOAD_FACTOR_THRESHOLD);
        }
    }

    #[test]
    fn test_with_capacity_rounds_to_power_of_two() {
        assert_eq!(LinearHashMap::<u8, u8>::with_capacity(0).capacity(), 1);
        assert_eq!(LinearHashMap::<u8, u8>::with_capacity(5).capacity(), 8);
        assert_eq!(LinearHashMap::<u8, u8>::with_capacity(64).capacity(), 64);
    }

    #[test]
    fn test_remove_displacing_key_keeps_displaced_reachable() {
        let mut map = LinearHashMap::new();
        map.insert(Collider(1), "a");
        map.insert(Collider(2), "b");
        map.insert(Collider(3), "c");

        assert_eq!(map.remove(&Collider(1)), Ok("a"));
        assert_eq!(map.search(&Collider(2)), Ok(&"b"));
        assert_eq!(map.search(&Collider(3)), Ok(&"c"));
        assert_probe_invariant(&map);

        assert_eq!(map.remove(&Collider(3)), Ok("c"));
        assert_eq!(map.search(&Collider(2)), Ok(&"b"));
        assert_eq!(map.len(), 1);
        assert_probe_invariant(&map);
    }

    #[test]
    fn test_remove_from_middle_of_cluster() {
        let mut map = LinearHashMap::new();
        for i in 0..5 {
            map.insert(Collider(i), i);
        }

        assert_eq!(map.remove(&Collider(2)), Ok(2));
        assert_probe_invariant(&map);
        for i in [0, 1, 3, 4] {
            assert_eq!(map.search(&Collider(i)), Ok(&i));
        }

        // The freed slot is reused
        map.insert(Collider(9), 9);
        assert_eq!(map.len(), 5);
        assert_eq!(map.capacity(), 8);
        assert_probe_invariant(&map);
    }

    #[test]
    fn test_remove_repairs_wrapping_cluster() {
        let mut map: LinearHashMap<u64, u64> = LinearHashMap::new();
        let last = map.capacity() - 1;

        let tail_keys: Vec<u64> =
            (0_u64..).filter(|k| map.home_index(k) == last).take(3).collect();
        let head_key = (0_u64..).find(|k| map.home_index(k) == 0).unwrap_or_default();

        for &key in &tail_keys {
            map.insert(key, key);
        }
        map.insert(head_key, head_key);
        assert_probe_invariant(&map);

        // The cluster spans the last slot and the first three slots
        assert_eq!(map.remove(&tail_keys[0]), Ok(tail_keys[0]));
        assert_probe_invariant(&map);
        assert_eq!(map.get(&tail_keys[1]), Some(&tail_keys[1]));
        assert_eq!(map.get(&tail_keys[2]), Some(&tail_keys[2]));
        assert_eq!(map.get(&head_key), Some(&head_key));
    }

    #[test]
    fn test_remove_everything() {
        let mut map = LinearHashMap::new();
        for i in 0..100 {
            map.insert(i, i);
        }
        for i in (0..100).rev().step_by(3) {
            assert_eq!(map.remove(&i), Ok(i));
            assert_probe_invariant(&map);
        }
        for i in 0..100 {
            if map.get(&i).is_some() {
                assert_eq!(map.remove(&i), Ok(i));
            }
        }

        assert!(map.is_empty());
        assert!(map.iter().next().is_none());
        for i in 0..100 {
            assert_eq!(map.search(&i), Err(TableError::NotFound));
        }
    }

    #[test]
    fn test_resize_with_lower_threshold() {
        let mut map = LinearHashMap::with_capacity(4);
        map.set_load_factor_threshold(50);

        map.insert("key1".to_string(), 1);
        map.insert("key2".to_string(), 2);
        // Three entries would exceed half of four slots
        map.insert("key3".to_string(), 3);

        assert_eq!(map.get("key1"), Some(&1));
        assert_eq!(map.get("key2"), Some(&2));
        assert_eq!(map.get("key3"), Some(&3));
        assert_eq!(map.capacity(), 8);
    }

    #[test]
    fn test_threshold_is_clamped() {
        let mut map: LinearHashMap<u8, u8> = LinearHashMap::new();
        assert_eq!(map.load_factor_threshold(), DEFAULT_LOAD_FACTOR_THRESHOLD);

        map.set_load_factor_threshold(0);
        assert_eq!(map.load_factor_threshold(), 1);

        map.set_load_factor_threshold(100);
        assert_eq!(map.load_factor_threshold(), 95);
    }

    #[test]
    fn test_lowered_threshold_grows_until_satisfied() {
        let mut map = LinearHashMap::new();
        for i in 0..6 {
            map.insert(i, i);
        }

        map.set_load_factor_threshold(10);
        map.insert(6, 6);

        assert!(map.len() * 100 <= map.capacity() * 10);
        assert_eq!(map.capacity(), 128);
        assert_probe_invariant(&map);
    }

    #[test]
    fn test_get_mut() {
        let mut map = LinearHashMap::new();
        map.insert("key1".to_string(), 1);

        if let Some(value) = map.get_mut("key1") {
            *value += 10;
        }

        assert_eq!(map.get("key1"), Some(&11));
        assert_eq!(map.get_mut("key2"), None);
    }

    #[test]
    fn test_iter() {
        let mut map = LinearHashMap::new();
        map.insert("key1".to_string(), 1);
        map.insert("key2".to_string(), 2);
        map.insert("key3".to_string(), 3);

        let mut count = 0;
        let mut sum = 0;
        for (_, &value) in &map {
            count += 1;
            sum += value;
        }

        assert_eq!(count, 3);
        assert_eq!(sum, 6);
    }

    #[test]
    fn test_probe_stats_for_colliding_keys() {
        let mut map = LinearHashMap::new();
        for i in 0..4 {
            map.insert(Collider(i), ());
        }

        let stats = map.probe_stats();
        assert_eq!(stats.entries, 4);
        assert_eq!(stats.total_displacement, 1 + 2 + 3);
        assert_eq!(stats.max_displacement, 3);
    }

    #[test]
    fn test_values_without_default_or_clone() {
        struct Opaque(u32);

        let mut map = LinearHashMap::new();
        for i in 0..20 {
            map.insert(i, Opaque(i));
        }

        assert_eq!(map.remove(&7).map(|v| v.0), Ok(7));
        assert_eq!(map.get(&8).map(|v| v.0), Some(8));
    }
}

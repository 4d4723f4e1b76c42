use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::fmt;

use crate::ConsecutiveNumbers;

/// Identity of a mounted render slot.
///
/// Keys are minted sequentially and survive across data changes: an item
/// scrolled out hands its key to an item of the same type scrolling in, so
/// the host can reuse the mounted view instead of tearing it down. Keys
/// mint in ascending order, so the natural ordering of a key is also its
/// creation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderKey(u64);

impl fmt::Display for RenderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// What a render slot is currently showing.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyEntry {
    pub item_type: String,
    pub index: usize,
    pub stable_id: String,
}

/// Owns the assignment of render keys to item indices.
///
/// `sync` reconciles the set of mounted slots against the engaged range:
/// slots whose item left the range are parked in a per-type pool, engaged
/// items reclaim their previous key via stable id when possible, and only
/// when both fail is a fresh key minted. Pools hand keys back oldest-first,
/// so the slot that has been idle longest is reused first.
pub struct RenderStackManager {
    pub disable_recycling: bool,
    max_items_in_recycle_pool: usize,
    recycle_key_pools: HashMap<String, VecDeque<RenderKey>>,
    key_map: BTreeMap<RenderKey, KeyEntry>,
    stable_id_map: HashMap<String, RenderKey>,
    key_counter: u64,
    unprocessed_indices: BTreeSet<usize>,
}

impl Default for RenderStackManager {
    fn default() -> Self {
        Self::new(usize::MAX)
    }
}

impl RenderStackManager {
    /// `max_items_in_recycle_pool` caps how many non-engaged slots are kept
    /// mounted for recycling.
    pub fn new(max_items_in_recycle_pool: usize) -> Self {
        Self {
            disable_recycling: false,
            max_items_in_recycle_pool,
            recycle_key_pools: HashMap::new(),
            key_map: BTreeMap::new(),
            stable_id_map: HashMap::new(),
            key_counter: 0,
            unprocessed_indices: BTreeSet::new(),
        }
    }

    /// The current render stack: every mounted slot and what it shows,
    /// ordered by key creation.
    pub fn render_stack(&self) -> &BTreeMap<RenderKey, KeyEntry> {
        &self.key_map
    }

    /// Reconciles mounted slots against `engaged_indices`.
    ///
    /// Engaged items are processed in two passes so items that can reclaim
    /// their previous key by stable id do so before the pools are drained
    /// for the rest. Non-engaged slots showing still-valid items keep their
    /// assignment, then stale slots are dropped or opportunistically
    /// reassigned and the pool is trimmed to its size cap.
    pub fn sync(
        &mut self,
        get_stable_id: &dyn Fn(usize) -> String,
        get_item_type: &dyn Fn(usize) -> String,
        engaged_indices: ConsecutiveNumbers,
        data_length: usize,
    ) {
        self.clear_recycle_pools();
        self.unprocessed_indices.clear();

        // Park keys whose item left the dataset, left the engaged range, or
        // no longer matches what the slot was showing.
        let snapshot: Vec<(RenderKey, KeyEntry)> = self
            .key_map
            .iter()
            .map(|(key, entry)| (*key, entry.clone()))
            .collect();
        for (key, entry) in &snapshot {
            if entry.index >= data_length {
                self.recycle_key(*key);
                continue;
            }
            if !self.disable_recycling {
                self.unprocessed_indices.insert(entry.index);
            }
            if !engaged_indices.includes(entry.index) {
                self.recycle_key(*key);
                continue;
            }
            if entry.stable_id != get_stable_id(entry.index)
                || entry.item_type != get_item_type(entry.index)
            {
                self.recycle_key(*key);
            }
        }

        // Items with a stable-id match reclaim their key first.
        for index in engaged_indices {
            if self.has_optimized_key(&get_stable_id(index)) {
                self.sync_item(index, get_item_type(index), get_stable_id(index));
            }
        }
        for index in engaged_indices {
            if !self.has_optimized_key(&get_stable_id(index)) {
                self.sync_item(index, get_item_type(index), get_stable_id(index));
            }
        }

        // Non-engaged slots still showing a valid item keep their
        // assignment so the data they display stays current.
        let valid_indices_in_pool: Vec<usize> = self
            .key_map
            .values()
            .map(|entry| entry.index)
            .filter(|&index| index < data_length && !engaged_indices.includes(index))
            .collect();
        for &index in &valid_indices_in_pool {
            if self.has_optimized_key(&get_stable_id(index)) {
                self.sync_item(index, get_item_type(index), get_stable_id(index));
            }
        }
        for &index in &valid_indices_in_pool {
            if !self.has_optimized_key(&get_stable_id(index)) {
                self.sync_item(index, get_item_type(index), get_stable_id(index));
            }
        }

        self.cleanup(get_stable_id, get_item_type, engaged_indices, data_length);
        rtrace!(
            mounted = self.key_map.len(),
            engaged = engaged_indices.len(),
            "render stack synced"
        );
    }

    fn has_optimized_key(&self, stable_id: &str) -> bool {
        self.stable_id_map.contains_key(stable_id)
    }

    /// Drops slots whose item no longer exists, reassigning them to a
    /// pending same-type item when one is available, then trims the pool.
    fn cleanup(
        &mut self,
        get_stable_id: &dyn Fn(usize) -> String,
        get_item_type: &dyn Fn(usize) -> String,
        engaged_indices: ConsecutiveNumbers,
        data_length: usize,
    ) {
        let keys: Vec<RenderKey> = self.key_map.keys().copied().collect();
        let mut keys_to_delete = Vec::new();

        for key in keys {
            let Some(entry) = self.key_map.get(&key).cloned() else {
                continue;
            };
            let out_of_bounds = entry.index >= data_length;
            let stable_id_changed = !out_of_bounds && get_stable_id(entry.index) != entry.stable_id;
            if !out_of_bounds && !stable_id_changed {
                continue;
            }

            // A stale slot of the right type can adopt the smallest index
            // that has not been assigned a slot this sync.
            let mut should_delete = true;
            if let Some(&next_index) = self.unprocessed_indices.first() {
                let next_item_type = get_item_type(next_index);
                if entry.item_type == next_item_type {
                    self.sync_item(next_index, next_item_type, get_stable_id(next_index));
                    should_delete = false;
                }
            }
            if should_delete {
                self.delete_key_from_recycle_pool(&entry.item_type, key);
                self.remove_stable_id_mapping(&entry.stable_id, key);
                keys_to_delete.push(key);
            }
        }

        for key in keys_to_delete {
            self.key_map.remove(&key);
        }

        // Trim the newest non-engaged slots once the pool exceeds its cap.
        let rendered_for_recycling = self.key_map.len().saturating_sub(engaged_indices.len());
        if rendered_for_recycling > self.max_items_in_recycle_pool {
            let delete_count = rendered_for_recycling - self.max_items_in_recycle_pool;
            let mut deleted = 0;
            let newest_first: Vec<(RenderKey, KeyEntry)> = self
                .key_map
                .iter()
                .rev()
                .map(|(key, entry)| (*key, entry.clone()))
                .collect();
            for (key, entry) in newest_first {
                if deleted >= delete_count {
                    break;
                }
                if !engaged_indices.includes(entry.index) {
                    self.delete_key_from_recycle_pool(&entry.item_type, key);
                    self.remove_stable_id_mapping(&entry.stable_id, key);
                    self.key_map.remove(&key);
                    deleted += 1;
                }
            }
        }
    }

    /// Parks a key in its type's pool. The slot stays mounted and keeps its
    /// metadata until reassigned or cleaned up.
    fn recycle_key(&mut self, key: RenderKey) {
        if self.disable_recycling {
            return;
        }
        let Some(entry) = self.key_map.get(&key) else {
            return;
        };
        let pool = self
            .recycle_key_pools
            .entry(entry.item_type.clone())
            .or_default();
        if !pool.contains(&key) {
            pool.push_back(key);
        }
    }

    /// Assigns a key to one item: its previous key by stable id if it still
    /// holds one, else the oldest pooled key of the type, else a fresh key.
    fn sync_item(&mut self, index: usize, item_type: String, stable_id: String) -> RenderKey {
        let new_key = self
            .stable_id_map
            .get(&stable_id)
            .copied()
            .or_else(|| self.get_key_from_recycle_pool(&item_type))
            .unwrap_or_else(|| self.generate_key());

        self.unprocessed_indices.remove(&index);

        if let Some(previous) = self.key_map.get(&new_key).cloned() {
            self.delete_key_from_recycle_pool(&item_type, new_key);
            self.delete_key_from_recycle_pool(&previous.item_type, new_key);
            self.remove_stable_id_mapping(&previous.stable_id, new_key);
        }
        self.key_map.insert(
            new_key,
            KeyEntry {
                item_type,
                index,
                stable_id: stable_id.clone(),
            },
        );
        self.stable_id_map.insert(stable_id, new_key);
        new_key
    }

    fn clear_recycle_pools(&mut self) {
        for pool in self.recycle_key_pools.values_mut() {
            pool.clear();
        }
    }

    fn generate_key(&mut self) -> RenderKey {
        let key = RenderKey(self.key_counter);
        self.key_counter += 1;
        key
    }

    /// Removes the stable-id mapping only while it still points at `key`;
    /// the id may have been handed to another slot since.
    fn remove_stable_id_mapping(&mut self, stable_id: &str, key: RenderKey) {
        if self.stable_id_map.get(stable_id) == Some(&key) {
            self.stable_id_map.remove(stable_id);
        }
    }

    fn delete_key_from_recycle_pool(&mut self, item_type: &str, key: RenderKey) {
        if let Some(pool) = self.recycle_key_pools.get_mut(item_type) {
            pool.retain(|&pooled| pooled != key);
        }
    }

    /// Oldest parked key of `item_type`, if any.
    fn get_key_from_recycle_pool(&mut self, item_type: &str) -> Option<RenderKey> {
        self.recycle_key_pools
            .get_mut(item_type)
            .and_then(VecDeque::pop_front)
    }
}

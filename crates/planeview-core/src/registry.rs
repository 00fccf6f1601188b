//! Ordered registries: membership sets with an optional depth-sorted list.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::hash::Hash;

/// Depth of a registered object.
///
/// Higher `z` is on top; `sub_z` breaks ties (bumped while dragging so the
/// dragged object rises above its peers); `seq` is the registration sequence
/// number, so later registrations win remaining ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DepthKey {
    pub z: i32,
    pub sub_z: i32,
    pub seq: u64,
}

impl DepthKey {
    /// Create a depth key.
    pub fn new(z: i32, sub_z: i32, seq: u64) -> Self {
        Self { z, sub_z, seq }
    }
}

/// Event-priority order: topmost first.
pub fn priority_cmp(a: &DepthKey, b: &DepthKey) -> Ordering {
    b.z.cmp(&a.z)
        .then(b.sub_z.cmp(&a.sub_z))
        .then(b.seq.cmp(&a.seq))
}

/// Painter's order: bottommost first.
pub fn draw_cmp(a: &DepthKey, b: &DepthKey) -> Ordering {
    priority_cmp(b, a)
}

/// Insert `item` into a list sorted by `cmp`.
///
/// The insertion point is the first position whose element does not compare
/// `Less` than `item`, found by binary search.
pub fn insert_sorted<K, F>(list: &mut Vec<K>, item: K, cmp: F)
where
    F: Fn(&K, &K) -> Ordering,
{
    let index = list.partition_point(|existing| cmp(existing, &item) == Ordering::Less);
    list.insert(index, item);
}

/// Find the index of `item` in a list sorted by `cmp`.
///
/// Elements that compare equal to `item` are scanned until the exact item is
/// found, so ties in the comparator are tolerated.
pub fn find_sorted<K, F>(list: &[K], item: &K, cmp: F) -> Option<usize>
where
    K: PartialEq,
    F: Fn(&K, &K) -> Ordering,
{
    let start = list.partition_point(|existing| cmp(existing, item) == Ordering::Less);
    list[start..]
        .iter()
        .take_while(|&existing| cmp(existing, item) == Ordering::Equal)
        .position(|existing| existing == item)
        .map(|offset| start + offset)
}

/// Remove `item` from a list sorted by `cmp`. Returns whether it was present.
///
/// If the list is no longer sorted around `item` (its key changed without a
/// re-sort), this falls back to a linear scan so the list stays a permutation
/// of its set.
pub fn remove_sorted<K, F>(list: &mut Vec<K>, item: &K, cmp: F) -> bool
where
    K: PartialEq + std::fmt::Debug,
    F: Fn(&K, &K) -> Ordering,
{
    if let Some(index) = find_sorted(list, item, cmp) {
        list.remove(index);
        return true;
    }
    match list.iter().position(|existing| existing == item) {
        Some(index) => {
            log::warn!("Sorted registry out of order around {:?}, removed by linear scan", item);
            list.remove(index);
            true
        }
        None => false,
    }
}

/// A set of identifiers plus, optionally, a list of the same identifiers
/// kept sorted by a caller-supplied comparator.
///
/// The comparator is passed on every mutating call because the keys it
/// compares by (object depth) live outside the registry.
#[derive(Debug, Clone)]
pub struct Registry<K> {
    members: HashSet<K>,
    sorted: Option<Vec<K>>,
}

impl<K> Registry<K>
where
    K: Copy + Eq + Hash + std::fmt::Debug,
{
    /// A registry that maintains a sorted list.
    pub fn sorted() -> Self {
        Self {
            members: HashSet::new(),
            sorted: Some(Vec::new()),
        }
    }

    /// A registry that only tracks membership.
    pub fn unsorted() -> Self {
        Self {
            members: HashSet::new(),
            sorted: None,
        }
    }

    /// Whether this registry maintains a sorted list.
    pub fn is_sorted(&self) -> bool {
        self.sorted.is_some()
    }

    /// Add `key`. Adding a key twice is a programming error.
    pub fn add<F>(&mut self, key: K, cmp: F) -> bool
    where
        F: Fn(&K, &K) -> Ordering,
    {
        let inserted = self.members.insert(key);
        debug_assert!(inserted, "{key:?} registered twice");
        if inserted {
            if let Some(list) = &mut self.sorted {
                insert_sorted(list, key, cmp);
            }
        }
        inserted
    }

    /// Remove `key`. Returns whether it was a member.
    pub fn remove<F>(&mut self, key: &K, cmp: F) -> bool
    where
        F: Fn(&K, &K) -> Ordering,
    {
        if !self.members.remove(key) {
            return false;
        }
        if let Some(list) = &mut self.sorted {
            remove_sorted(list, key, cmp);
        }
        true
    }

    /// Position of `key` in the sorted list.
    pub fn find<F>(&self, key: &K, cmp: F) -> Option<usize>
    where
        F: Fn(&K, &K) -> Ordering,
    {
        self.sorted.as_deref().and_then(|list| find_sorted(list, key, cmp))
    }

    /// Check membership.
    pub fn contains(&self, key: &K) -> bool {
        self.members.contains(key)
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members in sorted order (empty for unsorted registries).
    pub fn ordered(&self) -> &[K] {
        self.sorted.as_deref().unwrap_or(&[])
    }

    /// Members in no particular order.
    pub fn members(&self) -> impl Iterator<Item = &K> {
        self.members.iter()
    }

    /// Copy of the members, sorted when the registry keeps an order.
    pub fn snapshot(&self) -> Vec<K> {
        match &self.sorted {
            Some(list) => list.clone(),
            None => self.members.iter().copied().collect(),
        }
    }

    /// Remove `key` under its old ordering, then insert it under the new one.
    ///
    /// `old_cmp` must still see the depth the key was sorted under, and
    /// `new_cmp` the depth it should move to.
    pub fn reinsert<F, G>(&mut self, key: K, old_cmp: F, new_cmp: G)
    where
        F: Fn(&K, &K) -> Ordering,
        G: Fn(&K, &K) -> Ordering,
    {
        if !self.members.contains(&key) {
            return;
        }
        if let Some(list) = &mut self.sorted {
            remove_sorted(list, &key, old_cmp);
            insert_sorted(list, key, new_cmp);
        }
    }

    /// Drop every member at once, without per-member work.
    pub fn clear(&mut self) {
        self.members.clear();
        if let Some(list) = &mut self.sorted {
            list.clear();
        }
    }
}

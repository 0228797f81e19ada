//! # SkipList — Ordered In-Memory Index
//!
//! A probabilistic multi-level linked structure mapping ordered keys to
//! values with O(log n) expected insert, lookup, and delete.
//!
//! ```text
//! Level 3:  HEAD ──────────────────────────────► 50 ──────────► NIL
//! Level 2:  HEAD ──────────► 20 ───────────────► 50 ──────────► NIL
//! Level 1:  HEAD ──► 10 ──► 20 ────► 35 ───────► 50 ──► 60 ───► NIL
//! Level 0:  HEAD ──► 10 ──► 20 ──► 25 ──► 35 ──► 50 ──► 60 ──► NIL
//! ```
//!
//! Node heights are drawn from a truncated geometric distribution: each
//! node is promoted one more level with probability `p` (default 0.5),
//! capped at `max_level`. Level 0 links every node, so a level-0 walk
//! visits all entries in ascending key order.
//!
//! Nodes live in an index-addressed arena owned by the list. Deleting a
//! key vacates its slot (dropping the key and value immediately) and the
//! slot is reused by a later insert. No node references escape the list.
//!
//! ## Example
//!
//! ```rust
//! use skiplist::SkipList;
//!
//! let mut index: SkipList<i64, String> = SkipList::new(16);
//! index.insert(1, "one".to_string());
//! assert_eq!(index.search(&1), Some(&"one".to_string()));
//! assert!(index.remove(&1));
//! assert_eq!(index.search(&1), None);
//! ```

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Default promotion probability for new node heights.
pub const DEFAULT_PROBABILITY: f64 = 0.5;

/// Default height cap when none is chosen at construction.
pub const DEFAULT_MAX_LEVEL: usize = 16;

/// A single tower in the list: key, value, and one forward link per level
/// of its height (`forward.len() == height`).
struct Node<K, V> {
    key: K,
    value: V,
    forward: Vec<Option<usize>>,
}

/// An ordered map backed by a skip list.
///
/// The sentinel head is represented implicitly: a predecessor of `None`
/// in any traversal means "the head", whose per-level links are stored in
/// `head`. This avoids requiring `K: Default` for a phantom node.
pub struct SkipList<K, V> {
    /// Arena of nodes; vacated slots are `None` and tracked in `free`.
    slots: Vec<Option<Node<K, V>>>,
    free: Vec<usize>,
    /// Sentinel forward links, one per level, length `max_level`.
    head: Vec<Option<usize>>,
    /// Highest level with a non-null head link; always >= 1.
    current_level: usize,
    max_level: usize,
    p: f64,
    rng: StdRng,
    len: usize,
}

impl<K, V> SkipList<K, V> {
    /// Number of entries in the list.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Highest level currently holding a non-null link from the head.
    pub fn current_level(&self) -> usize {
        self.current_level
    }

    pub fn max_level(&self) -> usize {
        self.max_level
    }

    /// Iterates all entries in ascending key order by walking level 0.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            list: self,
            next: self.head[0],
        }
    }

    fn node(&self, idx: usize) -> &Node<K, V> {
        self.slots[idx].as_ref().expect("arena slot is occupied")
    }

    fn node_mut(&mut self, idx: usize) -> &mut Node<K, V> {
        self.slots[idx].as_mut().expect("arena slot is occupied")
    }

    /// The successor of `pred` at `level`; `pred == None` means the head.
    fn link(&self, pred: Option<usize>, level: usize) -> Option<usize> {
        match pred {
            None => self.head[level],
            Some(idx) => self.node(idx).forward[level],
        }
    }

    fn set_link(&mut self, pred: Option<usize>, level: usize, next: Option<usize>) {
        match pred {
            None => self.head[level] = next,
            Some(idx) => self.node_mut(idx).forward[level] = next,
        }
    }

    fn alloc(&mut self, node: Node<K, V>) -> usize {
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(node);
                idx
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        }
    }
}

impl<K: Ord, V> SkipList<K, V> {
    /// Creates an empty list with the given height cap and the default
    /// promotion probability, seeded from the OS entropy source.
    ///
    /// # Panics
    ///
    /// Panics if `max_level` is zero.
    pub fn new(max_level: usize) -> Self {
        Self::with_probability(max_level, DEFAULT_PROBABILITY)
    }

    /// Like [`new`](Self::new) with an explicit promotion probability.
    ///
    /// `p` must lie in `[0.0, 1.0]`. Both extremes are valid: `p = 0.0`
    /// degenerates to a sorted linked list, `p = 1.0` raises every node
    /// to `max_level`.
    pub fn with_probability(max_level: usize, p: f64) -> Self {
        Self::with_rng(max_level, p, StdRng::from_entropy())
    }

    /// Deterministic variant for tests: level draws come from a PRNG
    /// seeded with `seed` instead of OS entropy.
    pub fn with_seed(max_level: usize, p: f64, seed: u64) -> Self {
        Self::with_rng(max_level, p, StdRng::seed_from_u64(seed))
    }

    fn with_rng(max_level: usize, p: f64, rng: StdRng) -> Self {
        assert!(max_level >= 1, "max_level must be at least 1");
        // The comparison also rejects NaN.
        assert!((0.0..=1.0).contains(&p), "p must lie in [0.0, 1.0]");
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: vec![None; max_level],
            current_level: 1,
            max_level,
            p,
            rng,
            len: 0,
        }
    }

    /// Inserts `key -> value`, overwriting the value in place if the key
    /// is already present (no structural change). Returns `true`.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        let update = self.predecessors(&key);

        // An equal key at level 0 means update-in-place.
        if let Some(idx) = self.link(update[0], 0) {
            if self.node(idx).key == key {
                self.node_mut(idx).value = value;
                return true;
            }
        }

        let height = self.random_level();
        if height > self.current_level {
            // Predecessors above the old current_level are the head,
            // which is exactly what the untouched `None` entries of
            // `update` already denote.
            self.current_level = height;
        }

        let forward: Vec<Option<usize>> =
            (0..height).map(|level| self.link(update[level], level)).collect();
        let idx = self.alloc(Node { key, value, forward });
        for (level, pred) in update.into_iter().enumerate().take(height) {
            self.set_link(pred, level, Some(idx));
        }
        self.len += 1;
        true
    }

    /// Looks up `key`, returning a reference to its value if present.
    pub fn search(&self, key: &K) -> Option<&V> {
        let mut cur: Option<usize> = None;
        for level in (0..self.current_level).rev() {
            while let Some(next) = self.link(cur, level) {
                if self.node(next).key < *key {
                    cur = Some(next);
                } else {
                    break;
                }
            }
        }
        let idx = self.link(cur, 0)?;
        let node = self.node(idx);
        (node.key == *key).then_some(&node.value)
    }

    /// Removes `key`, returning `false` (and mutating nothing) if it is
    /// absent. The node's slot is vacated immediately on success.
    pub fn remove(&mut self, key: &K) -> bool {
        let update = self.predecessors(key);

        let target = match self.link(update[0], 0) {
            Some(idx) if self.node(idx).key == *key => idx,
            _ => return false,
        };

        // Unlink level by level. The target's height may be lower than
        // current_level, in which case upper predecessors do not point at
        // it and are left alone.
        for (level, pred) in update.into_iter().enumerate().take(self.current_level) {
            if self.link(pred, level) == Some(target) {
                let next = self.node(target).forward[level];
                self.set_link(pred, level, next);
            }
        }

        while self.current_level > 1 && self.head[self.current_level - 1].is_none() {
            self.current_level -= 1;
        }

        self.slots[target] = None;
        self.free.push(target);
        self.len -= 1;
        true
    }

    /// Records the strict predecessor of `key` at every level, descending
    /// from `current_level` to 0. Entries above `current_level` stay
    /// `None` (the head).
    fn predecessors(&self, key: &K) -> Vec<Option<usize>> {
        let mut update: Vec<Option<usize>> = vec![None; self.max_level];
        let mut cur: Option<usize> = None;
        for level in (0..self.current_level).rev() {
            while let Some(next) = self.link(cur, level) {
                if self.node(next).key < *key {
                    cur = Some(next);
                } else {
                    break;
                }
            }
            update[level] = cur;
        }
        update
    }

    /// Draws a height in `[1, max_level]`: promote while a uniform sample
    /// in `[0, 1)` falls below `p`.
    fn random_level(&mut self) -> usize {
        let mut level = 1;
        while level < self.max_level && self.rng.gen::<f64>() < self.p {
            level += 1;
        }
        level
    }
}

impl<K: Ord, V> Default for SkipList<K, V> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LEVEL)
    }
}

/// Ascending-order iterator over `(key, value)` pairs.
///
/// Follows level-0 forward links; level 0 contains every entry.
pub struct Iter<'a, K, V> {
    list: &'a SkipList<K, V>,
    next: Option<usize>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.next?;
        let node = self.list.node(idx);
        self.next = node.forward[0];
        Some((&node.key, &node.value))
    }
}

#[cfg(test)]
mod tests;

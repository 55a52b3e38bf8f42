//! Stable slot storage: an append-or-reuse pool with integer handles.
//!
//! [`SlotStorage`] hands out `usize` indices that keep denoting the same value
//! until that value is popped. Popped indices go onto a free list and are
//! handed out again (most recently freed first) by later `emplace` calls, so
//! live values never move.
//!
//! Unlike [`slotmap::SlotMap`], indices carry no generation. A caller that
//! keeps an index across a `pop` must revalidate it; the checked accessors
//! ([`SlotStorage::get`], [`SlotStorage::contains`]) only tell whether the
//! slot is occupied, not by whom.

use std::fmt;
use std::ops::{Index, IndexMut};

/// Stable-handle object pool with free-list reuse.
pub struct SlotStorage<T> {
    slots: Vec<Option<T>>,
    free: Vec<usize>,
}

impl<T> SlotStorage<T> {
    /// Create an empty storage.
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Store `value` and return its index.
    ///
    /// Reuses the most recently freed slot if there is one, else appends.
    /// The new occupant replaces the slot wholesale; nothing of the previous
    /// occupant survives.
    pub fn emplace(&mut self, value: T) -> usize {
        match self.free.pop() {
            Some(index) => {
                debug_assert!(self.slots[index].is_none(), "free slot {index} is occupied");
                self.slots[index] = Some(value);
                index
            }
            None => {
                self.slots.push(Some(value));
                self.slots.len() - 1
            }
        }
    }

    /// Destroy the value at `index` in place and mark the slot for reuse.
    ///
    /// Returns the removed value.
    ///
    /// # Panics
    ///
    /// Panics if the slot is not occupied.
    pub fn pop(&mut self, index: usize) -> T {
        let value = self
            .slots
            .get_mut(index)
            .and_then(Option::take)
            .unwrap_or_else(|| panic!("pop of vacant slot {index}"));
        self.free.push(index);
        value
    }

    /// Whether `index` is currently occupied.
    pub fn contains(&self, index: usize) -> bool {
        matches!(self.slots.get(index), Some(Some(_)))
    }

    /// Checked access.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Checked mutable access.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots.get_mut(index).and_then(Option::as_mut)
    }

    /// Number of live values (total slots minus free slots).
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Whether no values are live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of slots ever allocated, occupied or not.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of slots waiting to be reused.
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Iterate over `(index, &value)` for every occupied slot.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|v| (i, v)))
    }

    /// Drop every value and forget the free list.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }
}

impl<T> Default for SlotStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<usize> for SlotStorage<T> {
    type Output = T;

    /// Unchecked in the sense of the pool contract: the caller guarantees
    /// the slot is occupied. A vacant slot panics rather than aliasing.
    fn index(&self, index: usize) -> &T {
        self.slots[index]
            .as_ref()
            .unwrap_or_else(|| panic!("access to vacant slot {index}"))
    }
}

impl<T> IndexMut<usize> for SlotStorage<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        self.slots[index]
            .as_mut()
            .unwrap_or_else(|| panic!("access to vacant slot {index}"))
    }
}

impl<T: fmt::Debug> fmt::Debug for SlotStorage<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emplace_appends_when_no_free_slots() {
        let mut s = SlotStorage::new();
        assert_eq!(s.emplace("a"), 0);
        assert_eq!(s.emplace("b"), 1);
        assert_eq!(s.emplace("c"), 2);
        assert_eq!(s.len(), 3);
        assert_eq!(s[1], "b");
    }

    #[test]
    fn pop_then_emplace_reuses_most_recent() {
        let mut s = SlotStorage::new();
        let a = s.emplace(String::from("a"));
        let b = s.emplace(String::from("b"));
        let c = s.emplace(String::from("c"));
        s.pop(a);
        s.pop(c);
        assert_eq!(s.len(), 1);
        assert_eq!(s.free_count(), 2);

        let d = s.emplace(String::from("d"));
        assert_eq!(d, c);
        assert_eq!(s[d], "d");
        let e = s.emplace(String::from("e"));
        assert_eq!(e, a);
        assert_eq!(s[b], "b");
        assert_eq!(s.slot_count(), 3);
    }

    #[test]
    fn reused_slot_holds_only_new_value() {
        let mut s: SlotStorage<Vec<u32>> = SlotStorage::new();
        let i = s.emplace(vec![1, 2, 3]);
        s.pop(i);
        let j = s.emplace(Vec::new());
        assert_eq!(i, j);
        assert!(s[j].is_empty());
    }

    #[test]
    fn live_indices_are_stable_under_churn() {
        let mut s = SlotStorage::new();
        let mut live: Vec<(usize, u32)> = Vec::new();
        for round in 0..50u32 {
            let idx = s.emplace(round);
            live.push((idx, round));
            if round % 3 == 0 {
                let (victim, _) = live.remove(live.len() / 2);
                s.pop(victim);
            }
            for &(idx, value) in &live {
                assert_eq!(s[idx], value);
            }
        }
        assert_eq!(s.len(), live.len());
    }

    #[test]
    fn contains_and_checked_access() {
        let mut s = SlotStorage::new();
        let i = s.emplace(7);
        assert!(s.contains(i));
        assert_eq!(s.get(i), Some(&7));
        *s.get_mut(i).unwrap() = 8;
        assert_eq!(s[i], 8);
        s.pop(i);
        assert!(!s.contains(i));
        assert!(s.get(i).is_none());
        assert!(!s.contains(99));
    }

    #[test]
    #[should_panic(expected = "vacant slot")]
    fn index_vacant_panics() {
        let mut s = SlotStorage::new();
        let i = s.emplace(1);
        s.pop(i);
        let _value: i32 = s[i];
    }

    #[test]
    #[should_panic(expected = "pop of vacant slot")]
    fn double_pop_panics() {
        let mut s = SlotStorage::new();
        let i = s.emplace(1);
        s.pop(i);
        s.pop(i);
    }

    #[test]
    fn iter_skips_free_slots() {
        let mut s = SlotStorage::new();
        let a = s.emplace('a');
        s.emplace('b');
        s.pop(a);
        let items: Vec<_> = s.iter().collect();
        assert_eq!(items, vec![(1, &'b')]);
    }
}

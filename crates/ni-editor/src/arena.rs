//! Line-storage arena: a fixed pool of equally sized byte slots.
//!
//! Every line in the document lives in one slot. The pool is allocated once
//! and never grows, so total memory is bounded and frequent small edits
//! don't fragment the heap.
//!
//! # Free list
//!
//! Unused slots are chained through a separate `next_free` index table: the
//! head of the list is the most recently released slot, so acquire and
//! release are both O(1) and reuse is LIFO. Slot memory itself is never
//! reinterpreted as a list node.
//!
//! # Ownership
//!
//! [`acquire`](Arena::acquire) hands out a [`SlotId`], which is neither
//! `Copy` nor `Clone`. Whoever holds it owns the slot; giving it back to
//! [`release`](Arena::release) consumes it. A slot therefore belongs to
//! exactly one line or to the free list, never both.

use crate::error::EditError;

// ---------------------------------------------------------------------------
// SlotId
// ---------------------------------------------------------------------------

/// Owning handle to one arena slot.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct SlotId(usize);

impl SlotId {
    /// Position of the slot in the pool.
    #[inline]
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Arena
// ---------------------------------------------------------------------------

/// Fixed-capacity pool of line-storage slots.
pub struct Arena {
    /// `capacity * slot_len` bytes, slot `i` at `[i * slot_len, (i + 1) * slot_len)`.
    data: Box<[u8]>,

    /// Bytes per slot.
    slot_len: usize,

    /// `next_free[i]` is the slot after `i` on the free list. Only
    /// meaningful while `i` is free.
    next_free: Box<[Option<usize>]>,

    /// Head of the free list.
    head: Option<usize>,

    /// Number of slots currently on the free list.
    free: usize,
}

impl Arena {
    /// Allocate a pool of `capacity` slots of `slot_len` bytes each, all free.
    #[must_use]
    pub fn new(capacity: usize, slot_len: usize) -> Self {
        let next_free = (0..capacity)
            .map(|i| (i + 1 < capacity).then_some(i + 1))
            .collect();

        Self {
            data: vec![0; capacity * slot_len].into_boxed_slice(),
            slot_len,
            next_free,
            head: (capacity > 0).then_some(0),
            free: capacity,
        }
    }

    // -- Accessors ----------------------------------------------------------

    /// Total number of slots.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.next_free.len()
    }

    /// Bytes per slot.
    #[inline]
    #[must_use]
    pub const fn slot_len(&self) -> usize {
        self.slot_len
    }

    /// Slots currently available.
    #[inline]
    #[must_use]
    pub const fn free_count(&self) -> usize {
        self.free
    }

    /// Slots currently owned by someone.
    #[inline]
    #[must_use]
    pub fn used_count(&self) -> usize {
        self.capacity() - self.free
    }

    // -- Allocation ---------------------------------------------------------

    /// Take the slot at the head of the free list.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::LinesExhausted`] when every slot is in use.
    pub fn acquire(&mut self) -> Result<SlotId, EditError> {
        let Some(index) = self.head else {
            tracing::warn!(capacity = self.capacity(), "line arena exhausted");
            return Err(EditError::LinesExhausted);
        };
        self.head = self.next_free[index].take();
        self.free -= 1;
        Ok(SlotId(index))
    }

    /// Push a slot back onto the head of the free list.
    pub fn release(&mut self, slot: SlotId) {
        let index = slot.0;
        debug_assert!(index < self.capacity(), "slot {index} is not from this arena");
        self.next_free[index] = self.head;
        self.head = Some(index);
        self.free += 1;
    }

    // -- Slot access --------------------------------------------------------

    /// The full slot, `slot_len` bytes.
    #[inline]
    #[must_use]
    pub fn bytes(&self, slot: &SlotId) -> &[u8] {
        let start = slot.0 * self.slot_len;
        &self.data[start..start + self.slot_len]
    }

    /// The full slot, mutably.
    #[inline]
    pub fn bytes_mut(&mut self, slot: &SlotId) -> &mut [u8] {
        let start = slot.0 * self.slot_len;
        &mut self.data[start..start + self.slot_len]
    }

    /// Two distinct slots at once, the first shared and the second mutable.
    ///
    /// Used for moving bytes from one line into another.
    #[must_use]
    pub fn pair_mut(&mut self, src: &SlotId, dst: &SlotId) -> (&[u8], &mut [u8]) {
        debug_assert_ne!(src.0, dst.0, "a slot cannot be paired with itself");
        let len = self.slot_len;
        if src.0 < dst.0 {
            let (lo, hi) = self.data.split_at_mut(dst.0 * len);
            (&lo[src.0 * len..(src.0 + 1) * len], &mut hi[..len])
        } else {
            let (lo, hi) = self.data.split_at_mut(src.0 * len);
            (&hi[..len], &mut lo[dst.0 * len..(dst.0 + 1) * len])
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn new_arena_is_all_free() {
        let arena = Arena::new(4, 16);
        assert_eq!(arena.capacity(), 4);
        assert_eq!(arena.slot_len(), 16);
        assert_eq!(arena.free_count(), 4);
        assert_eq!(arena.used_count(), 0);
    }

    #[test]
    fn acquire_hands_out_distinct_slots() {
        let mut arena = Arena::new(4, 16);
        let ids: Vec<_> = (0..4).map(|_| arena.acquire().unwrap()).collect();
        let unique: HashSet<_> = ids.iter().map(SlotId::index).collect();
        assert_eq!(unique.len(), 4);
        assert_eq!(arena.free_count(), 0);
    }

    #[test]
    fn exhaustion_is_an_error() {
        let mut arena = Arena::new(1, 16);
        let _a = arena.acquire().unwrap();
        assert_eq!(arena.acquire(), Err(EditError::LinesExhausted));
    }

    #[test]
    fn zero_capacity_arena() {
        let mut arena = Arena::new(0, 16);
        assert_eq!(arena.acquire(), Err(EditError::LinesExhausted));
    }

    #[test]
    fn release_is_lifo() {
        let mut arena = Arena::new(3, 16);
        let a = arena.acquire().unwrap();
        let b = arena.acquire().unwrap();
        let b_index = b.index();
        arena.release(a);
        arena.release(b);
        assert_eq!(arena.acquire().unwrap().index(), b_index);
    }

    #[test]
    fn release_makes_slot_available_again() {
        let mut arena = Arena::new(1, 16);
        let a = arena.acquire().unwrap();
        arena.release(a);
        assert_eq!(arena.free_count(), 1);
        assert!(arena.acquire().is_ok());
    }

    #[test]
    fn slots_do_not_overlap() {
        let mut arena = Arena::new(3, 4);
        let a = arena.acquire().unwrap();
        let b = arena.acquire().unwrap();
        arena.bytes_mut(&a).copy_from_slice(b"aaaa");
        arena.bytes_mut(&b).copy_from_slice(b"bbbb");
        assert_eq!(arena.bytes(&a), b"aaaa");
        assert_eq!(arena.bytes(&b), b"bbbb");
    }

    #[test]
    fn pair_mut_both_orders() {
        let mut arena = Arena::new(3, 4);
        let a = arena.acquire().unwrap();
        let b = arena.acquire().unwrap();
        arena.bytes_mut(&a).copy_from_slice(b"abcd");

        let (src, dst) = arena.pair_mut(&a, &b);
        dst.copy_from_slice(src);
        assert_eq!(arena.bytes(&b), b"abcd");

        arena.bytes_mut(&b).copy_from_slice(b"wxyz");
        let (src, dst) = arena.pair_mut(&b, &a);
        dst.copy_from_slice(src);
        assert_eq!(arena.bytes(&a), b"wxyz");
    }

    #[test]
    fn churn_keeps_counts_consistent() {
        let mut arena = Arena::new(8, 4);
        let mut held = Vec::new();
        for round in 0..50 {
            if round % 3 == 2 {
                if let Some(slot) = held.pop() {
                    arena.release(slot);
                }
            } else if let Ok(slot) = arena.acquire() {
                held.push(slot);
            }
            assert_eq!(arena.used_count(), held.len());
            let unique: HashSet<_> = held.iter().map(SlotId::index).collect();
            assert_eq!(unique.len(), held.len());
        }
    }
}

//! Fixed-capacity ring buffer of control-cycle samples.
//!
//! The store is an owned array plus a write cursor and a `full` flag. Storage
//! is obtained once per tuning session through [`SampleStore::allocate`] and
//! is never resized implicitly: a request for more samples than the current
//! capacity discards the history and allocates fresh storage, a request for
//! fewer is accepted without touching anything.
//!
//! Readers see samples by *logical* index, where index 0 is always the oldest
//! retained sample and `count() - 1` the most recently written one.

extern crate alloc;

use alloc::vec::Vec;
use log::{debug, info, warn};

use super::sample::Sample;
use super::{StoreError, StoreResult};

/// Copy of the ring's write position taken at the start of a scan.
///
/// Resolving every logical index of a pass against the same snapshot keeps
/// the oldest-to-newest ordering consistent for the whole pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    capacity: usize,
    cursor: usize,
    full: bool,
}

impl Snapshot {
    /// Number of valid samples at the time of the snapshot
    pub const fn count(&self) -> usize {
        if self.full { self.capacity } else { self.cursor }
    }

    /// Whether the ring had wrapped at the time of the snapshot
    pub const fn is_full(&self) -> bool {
        self.full
    }

    /// Map a logical index to its physical slot.
    ///
    /// Once the ring has wrapped, the slot under the cursor holds the oldest
    /// sample (it is the next one `put` will overwrite), so logical order
    /// starts there. Returns `None` for indices outside `[0, count())`.
    pub const fn physical(&self, logical: usize) -> Option<usize> {
        if logical >= self.count() {
            return None;
        }
        let origin = if self.full { self.cursor } else { 0 };
        Some((origin + logical) % self.capacity)
    }
}

/// Circular sample history owned by the tuning session
#[derive(Debug, Default)]
pub struct SampleStore {
    /// Backing slots; `slots.len()` is the capacity
    slots: Vec<Sample>,
    /// Next physical slot to write
    cursor: usize,
    /// Set once the cursor has wrapped for this allocation
    full: bool,
}

impl SampleStore {
    /// Create an empty store with zero capacity
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            cursor: 0,
            full: false,
        }
    }

    /// Number of sample slots currently allocated
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Ensure the store can hold at least `n` samples.
    ///
    /// - Zero capacity: allocate exactly `n` slots.
    /// - Capacity below `n`: drop the current history and allocate exactly `n`.
    ///   If that fails the old storage is already gone and capacity is 0.
    /// - Capacity at or above `n`: nothing changes.
    ///
    /// Any reallocation resets the cursor and the `full` flag.
    pub fn allocate(&mut self, n: usize) -> StoreResult<()> {
        let capacity = self.capacity();
        if capacity >= n {
            debug!("Sample store already holds {} slots (requested {})", capacity, n);
            return Ok(());
        }

        if capacity != 0 {
            debug!("Growing sample store from {} to {} slots", capacity, n);
            self.release();
        }

        let mut slots = Vec::new();
        if slots.try_reserve_exact(n).is_err() {
            warn!("Sample store allocation of {} slots failed", n);
            return Err(StoreError::AllocationFailed { requested: n });
        }
        slots.resize(n, Sample::default());

        self.slots = slots;
        self.cursor = 0;
        self.full = false;
        info!("Sample store allocated with {} slots", n);
        Ok(())
    }

    /// Record one control-cycle sample.
    ///
    /// Out-of-range values are clamped. Does nothing while the store has no
    /// capacity. The cursor is advanced after the write and wraps to 0, at
    /// which point the store is marked full for the rest of this allocation.
    pub fn put(&mut self, temp: i32, disp: u32) {
        let capacity = self.slots.len();
        if capacity == 0 {
            return;
        }

        self.slots[self.cursor] = Sample::clamped(temp, disp);
        self.cursor += 1;
        if self.cursor == capacity {
            self.cursor = 0;
            self.full = true;
        }
    }

    /// Number of valid samples
    pub fn count(&self) -> usize {
        self.snapshot().count()
    }

    /// Whether no samples have been recorded
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Whether the ring has wrapped at least once
    pub fn is_full(&self) -> bool {
        self.full
    }

    /// Capture the current write position for a consistent scan
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            capacity: self.slots.len(),
            cursor: self.cursor,
            full: self.full,
        }
    }

    /// Sample at a logical index, resolved against `snapshot`
    pub fn get_at(&self, snapshot: &Snapshot, index: usize) -> Option<Sample> {
        snapshot
            .physical(index)
            .and_then(|slot| self.slots.get(slot).copied())
    }

    /// Sample at a logical index (0 = oldest)
    pub fn get(&self, index: usize) -> Option<Sample> {
        self.get_at(&self.snapshot(), index)
    }

    /// Temperature error at a logical index, 0 if there is no such sample
    pub fn temp(&self, index: usize) -> i16 {
        self.get(index).map_or(0, |s| s.temp)
    }

    /// Dispersion at a logical index, 0 if there is no such sample
    pub fn disp(&self, index: usize) -> u16 {
        self.get(index).map_or(0, |s| s.disp)
    }

    /// Most recently written sample
    pub fn latest(&self) -> Option<Sample> {
        self.count().checked_sub(1).and_then(|i| self.get(i))
    }

    /// Iterate samples oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = Sample> + '_ {
        let snapshot = self.snapshot();
        (0..snapshot.count()).filter_map(move |i| self.get_at(&snapshot, i))
    }

    /// Free the backing storage. Safe to call repeatedly or before allocation.
    pub fn release(&mut self) {
        if !self.slots.is_empty() {
            debug!("Releasing sample store ({} slots)", self.slots.len());
        }
        self.slots = Vec::new();
        self.cursor = 0;
        self.full = false;
    }
}

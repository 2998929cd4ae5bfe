//! Free-range id allocation.
//!
//! Ids are positive, dense and reused: the allocator keeps the free id
//! space as coalesced inclusive ranges keyed by their low end, so the
//! lowest free id is always handed out next. Freshly grown ids and
//! returned ids live in the same structure, which is what makes reuse
//! ascending without a separate free list.

use std::collections::BTreeMap;

use tracing::trace;

use crate::error::GraphError;
use crate::graph::options::GrowthPolicy;
use crate::Result;

/// Allocator over the id space `1..=capacity` with ascending reuse.
#[derive(Debug)]
pub(crate) struct IdAllocator {
    /// Free ranges, low -> high inclusive, pairwise disjoint and
    /// non-adjacent.
    free: BTreeMap<u32, u32>,
    capacity: u32,
    max_capacity: u32,
    policy: GrowthPolicy,
}

impl IdAllocator {
    pub(crate) fn new(initial_capacity: u32, max_capacity: u32, policy: GrowthPolicy) -> Self {
        let capacity = initial_capacity.clamp(1, max_capacity);
        let mut free = BTreeMap::new();
        free.insert(1, capacity);
        Self {
            free,
            capacity,
            max_capacity,
            policy,
        }
    }

    /// Hands out the lowest free id, growing the id space if none is
    /// left.
    pub(crate) fn allocate(&mut self) -> Result<u32> {
        if self.free.is_empty() {
            self.grow()?;
        }
        let (&low, &high) = match self.free.iter().next() {
            Some(entry) => entry,
            None => return Err(GraphError::CapacityExceeded("id space exhausted")),
        };
        self.free.remove(&low);
        if low < high {
            self.free.insert(low + 1, high);
        }
        Ok(low)
    }

    /// Returns `id` to the free space, coalescing with adjacent ranges.
    pub(crate) fn free(&mut self, id: u32) {
        debug_assert!(id >= 1 && id <= self.capacity, "id {id} out of range");
        let mut low = id;
        let mut high = id;
        if let Some((&prev_low, &prev_high)) = self.free.range(..=id).next_back() {
            debug_assert!(prev_high < id, "double free of id {id}");
            if prev_high + 1 == id {
                self.free.remove(&prev_low);
                low = prev_low;
            }
        }
        if let Some((&next_low, &next_high)) = self.free.range(id + 1..).next() {
            if id + 1 == next_low {
                self.free.remove(&next_low);
                high = next_high;
            }
        }
        self.free.insert(low, high);
    }

    /// Current size of the id space.
    pub(crate) fn capacity(&self) -> u32 {
        self.capacity
    }

    fn grow(&mut self) -> Result<()> {
        if self.capacity >= self.max_capacity {
            return Err(GraphError::CapacityExceeded("maximum id capacity reached"));
        }
        let target = match self.policy {
            GrowthPolicy::Double => self.capacity.saturating_mul(2),
            GrowthPolicy::Increment(step) => self.capacity.saturating_add(step.max(1)),
        }
        .min(self.max_capacity);
        let old = self.capacity;
        self.capacity = target;
        self.free.insert(old + 1, target);
        trace!(old, new = target, "alloc.grow");
        Ok(())
    }
}

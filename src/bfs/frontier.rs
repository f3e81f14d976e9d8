//! Frontier and explored sets.
//!
//! Both are dense, word-packed [`GhostAtomicBitset`]s sized to the node count.
//! The two frontier buffers are swapped by index at each epoch boundary; the
//! explored set only ever grows.

use core::sync::atomic::Ordering;

use crate::concurrency::atomic::bitset::Ones;
use crate::concurrency::GhostAtomicBitset;

/// A dense, word-packed node set.
pub struct VisitedSet<'brand> {
    bits: GhostAtomicBitset<'brand>,
}

impl<'brand> VisitedSet<'brand> {
    /// Creates an empty set over `nodes` node ids.
    #[inline]
    pub fn new(nodes: usize) -> Self {
        Self {
            bits: GhostAtomicBitset::new(nodes),
        }
    }

    /// Capacity in nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.bits.len_bits()
    }

    /// Whether the set has zero capacity.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every node.
    #[inline]
    pub fn clear(&self) {
        self.bits.clear_all();
    }

    /// Inserts `node`; returns `true` iff this call observed it absent.
    #[inline(always)]
    pub fn try_visit(&self, node: usize, order: Ordering) -> bool {
        self.bits.test_and_set(node, order)
    }

    /// Whether `node` is present.
    #[inline(always)]
    pub fn is_visited(&self, node: usize) -> bool {
        self.bits.is_set(node)
    }

    /// Number of nodes present.
    pub fn count(&self) -> usize {
        self.bits.count_ones()
    }

    /// Present nodes in ascending order.
    pub fn iter(&self) -> Ones<'_, 'brand> {
        self.bits.iter_ones()
    }
}

impl core::fmt::Debug for VisitedSet<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VisitedSet")
            .field("len", &self.len())
            .field("count", &self.count())
            .finish()
    }
}

/// Current/next frontier pair, double-buffered by index.
pub struct FrontierBuffers<'brand> {
    sets: [VisitedSet<'brand>; 2],
    current: usize,
}

impl<'brand> FrontierBuffers<'brand> {
    /// Creates two empty frontiers over `nodes` node ids.
    pub fn new(nodes: usize) -> Self {
        Self {
            sets: [VisitedSet::new(nodes), VisitedSet::new(nodes)],
            current: 0,
        }
    }

    /// The frontier being scanned this epoch.
    #[inline(always)]
    pub fn current(&self) -> &VisitedSet<'brand> {
        &self.sets[self.current]
    }

    /// The frontier being built this epoch.
    #[inline(always)]
    pub fn next(&self) -> &VisitedSet<'brand> {
        &self.sets[self.current ^ 1]
    }

    /// Ends an epoch: the next frontier becomes current and the old current is
    /// cleared to receive the following epoch.
    pub fn advance(&mut self) {
        self.current ^= 1;
        self.sets[self.current ^ 1].clear();
    }

    /// Resets both buffers and makes `start` the only current node.
    pub fn seed(&mut self, start: usize) {
        self.sets[0].clear();
        self.sets[1].clear();
        self.current = 0;
        self.sets[0].try_visit(start, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn try_visit_reports_first_insertion_only() {
        let set = VisitedSet::new(70);
        assert!(set.try_visit(65, Ordering::Relaxed));
        assert!(!set.try_visit(65, Ordering::Relaxed));
        assert!(set.is_visited(65));
        assert!(!set.is_visited(64));
        assert_eq!(set.count(), 1);
        set.clear();
        assert_eq!(set.count(), 0);
    }

    #[test]
    fn advance_swaps_and_clears() {
        let mut f = FrontierBuffers::new(8);
        f.seed(3);
        assert_eq!(f.current().iter().collect::<Vec<_>>(), vec![3]);

        f.next().try_visit(5, Ordering::Relaxed);
        f.next().try_visit(6, Ordering::Relaxed);
        f.advance();
        assert_eq!(f.current().iter().collect::<Vec<_>>(), vec![5, 6]);
        assert_eq!(f.next().count(), 0);

        f.advance();
        assert_eq!(f.current().count(), 0);
        assert_eq!(f.next().count(), 0);
    }

    #[test]
    fn seed_discards_previous_state() {
        let mut f = FrontierBuffers::new(4);
        f.next().try_visit(1, Ordering::Relaxed);
        f.advance();
        f.seed(2);
        assert_eq!(f.current().iter().collect::<Vec<_>>(), vec![2]);
        assert_eq!(f.next().count(), 0);
    }
}

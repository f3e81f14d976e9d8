//! Direct-mapped neighbor cache over the reverse adjacency array.
//!
//! Pull epochs read the in-list of almost every unexplored node, and adjacent
//! nodes' in-lists share lines. The cache keeps `capacity` fixed-width lines of
//! `LINE` node ids each. Line `l` covers offsets `[l * LINE, (l + 1) * LINE)`,
//! is tagged with its base offset `l * LINE`, and can only live in entry
//! `l % capacity`; a tag mismatch replaces the resident line wholesale.
//!
//! The backing array is read-only, so eviction never writes back.

use core::ops::ControlFlow;

use serde::Serialize;

use crate::graph::{CompressedView, NodeId};

mod stage;

pub(crate) use stage::{serve, CacheClient, CacheRequest, REQUEST_DEPTH, RESPONSE_DEPTH};

/// Default line width in node ids.
pub const DEFAULT_LINE: usize = 16;

/// Cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Nodes whose in-list was requested.
    pub lookups: u64,
    /// Line reads served from a resident line.
    pub hits: u64,
    /// Line reads that fetched from the backing array.
    pub misses: u64,
    /// Scans stopped before their last line.
    pub aborted: u64,
}

impl CacheStats {
    /// Fraction of line reads that hit, or `0.0` before any read.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// The part of one cache line that falls inside a requested in-list.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct LineSegment<const LINE: usize> {
    values: [NodeId; LINE],
    len: usize,
}

impl<const LINE: usize> LineSegment<LINE> {
    pub(crate) fn from_slice(slice: &[NodeId]) -> Self {
        debug_assert!(slice.len() <= LINE);
        let mut values = [0; LINE];
        values[..slice.len()].copy_from_slice(slice);
        Self {
            values,
            len: slice.len(),
        }
    }

    /// The node ids carried by this segment.
    #[inline]
    pub fn as_slice(&self) -> &[NodeId] {
        &self.values[..self.len]
    }

    /// Number of node ids.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the segment is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<const LINE: usize> core::fmt::Debug for LineSegment<LINE> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

#[derive(Clone, Copy)]
struct CacheLine<const LINE: usize> {
    tag: Option<usize>,
    values: [NodeId; LINE],
}

impl<const LINE: usize> CacheLine<LINE> {
    const EMPTY: Self = Self {
        tag: None,
        values: [0; LINE],
    };
}

/// A direct-mapped cache of `LINE`-wide lines over a reverse adjacency view.
pub struct NeighborCache<'g, const LINE: usize = DEFAULT_LINE> {
    reverse: CompressedView<'g>,
    lines: Box<[CacheLine<LINE>]>,
    stats: Option<CacheStats>,
}

impl<'g, const LINE: usize> NeighborCache<'g, LINE> {
    const LINE_IS_NONZERO: () = assert!(LINE > 0, "cache line width must be > 0");

    /// Creates an empty cache with `capacity` lines (at least one).
    ///
    /// With `track_stats` set, lookups, hits, misses and aborted scans are
    /// counted and reported by [`NeighborCache::stats`].
    pub fn new(reverse: CompressedView<'g>, capacity: usize, track_stats: bool) -> Self {
        let () = Self::LINE_IS_NONZERO;
        Self {
            reverse,
            lines: vec![CacheLine::EMPTY; capacity.max(1)].into_boxed_slice(),
            stats: track_stats.then(CacheStats::default),
        }
    }

    /// Capacity in lines.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.lines.len()
    }

    /// Counters so far, when statistics are enabled.
    #[inline]
    pub fn stats(&self) -> Option<CacheStats> {
        self.stats
    }

    /// Whether the line containing adjacency offset `offset` is resident.
    pub fn is_resident(&self, offset: usize) -> bool {
        let line = offset / LINE;
        self.lines[line % self.lines.len()].tag == Some(line * LINE)
    }

    /// Visits `node`'s in-list as a sequence of trimmed line segments.
    ///
    /// Boundary lines are cut to the node's `[start, end)` window; interior
    /// lines are visited whole. When `visit` breaks, no further line is
    /// fetched and `Break` is returned. An empty in-list fetches nothing.
    ///
    /// ```rust
    /// use core::ops::ControlFlow;
    /// use dobfs::bfs::NeighborCache;
    /// use dobfs::graph::CompressedAdjacency;
    ///
    /// let mut lists = vec![Vec::new(); 6];
    /// lists[0] = vec![1, 2, 3, 4, 5];
    /// let reverse = CompressedAdjacency::from_adjacency(&lists).unwrap();
    /// let mut cache = NeighborCache::<2>::new(reverse.view(), 4, false);
    /// let mut segments = Vec::new();
    /// let flow = cache.scan(0, |seg| {
    ///     segments.push(seg.to_vec());
    ///     ControlFlow::Continue(())
    /// });
    /// assert!(flow.is_continue());
    /// assert_eq!(segments, vec![vec![1, 2], vec![3, 4], vec![5]]);
    /// ```
    pub fn scan<F>(&mut self, node: usize, mut visit: F) -> ControlFlow<()>
    where
        F: FnMut(&[NodeId]) -> ControlFlow<()>,
    {
        let range = self.reverse.range(node);
        if let Some(stats) = &mut self.stats {
            stats.lookups += 1;
        }
        if range.is_empty() {
            return ControlFlow::Continue(());
        }

        let first = range.start / LINE;
        let last = (range.end - 1) / LINE;
        for line in first..=last {
            let base = line * LINE;
            let lo = range.start.max(base) - base;
            let hi = range.end.min(base + LINE) - base;
            let values = self.fetch(line);
            if visit(&values[lo..hi]).is_break() {
                if line < last {
                    if let Some(stats) = &mut self.stats {
                        stats.aborted += 1;
                    }
                }
                tracing::trace!(node, line, "cache scan stopped early");
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    /// Returns the values of line `line`, fetching it on a tag mismatch.
    fn fetch(&mut self, line: usize) -> &[NodeId; LINE] {
        let tag = line * LINE;
        let entry = line % self.lines.len();
        let hit = self.lines[entry].tag == Some(tag);
        if let Some(stats) = &mut self.stats {
            if hit {
                stats.hits += 1;
            } else {
                stats.misses += 1;
            }
        }
        let slot = &mut self.lines[entry];
        if !hit {
            let backing = self.reverse.raw_neighbors();
            let end = backing.len().min(tag + LINE);
            let fill = &backing[tag..end];
            slot.values[..fill.len()].copy_from_slice(fill);
            slot.tag = Some(tag);
        }
        &slot.values
    }
}

impl<const LINE: usize> core::fmt::Debug for NeighborCache<'_, LINE> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NeighborCache")
            .field("line", &LINE)
            .field("capacity", &self.lines.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

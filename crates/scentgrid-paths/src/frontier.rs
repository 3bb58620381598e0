use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Parent sentinel for the start node.
pub(crate) const NO_PARENT: usize = usize::MAX;

/// Best-known cost of a node not reached in the current generation.
pub(crate) const UNREACHABLE: u32 = u32::MAX;

// ---------------------------------------------------------------------------
// Per-cell search bookkeeping
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub(crate) struct Node {
    pub(crate) g: u32,
    pub(crate) f: f64,
    pub(crate) parent: usize,
    pub(crate) generation: u32,
    /// Currently has an entry in the frontier.
    pub(crate) queued: bool,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            g: UNREACHABLE,
            f: f64::INFINITY,
            parent: NO_PARENT,
            generation: 0,
            queued: false,
        }
    }
}

impl Node {
    /// Bring a node from an older generation up to `generation` with
    /// infinite cost.
    #[inline]
    pub(crate) fn touch(&mut self, generation: u32) {
        if self.generation != generation {
            *self = Self {
                generation,
                ..Self::default()
            };
        }
    }
}

// ---------------------------------------------------------------------------
// Frontier
// ---------------------------------------------------------------------------

/// A frontier entry. `f` is the priority at enqueue time.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Entry {
    pub(crate) idx: usize,
    pub(crate) f: f64,
    pub(crate) seq: u64,
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse so BinaryHeap (max-heap) pops the smallest (f, seq) first.
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

/// Min-priority queue keyed on `(f, insertion sequence)`.
///
/// The sequence number makes equal-`f` entries pop in the order they were
/// pushed, independent of the heap's internal layout.
#[derive(Default)]
pub(crate) struct Frontier {
    heap: BinaryHeap<Entry>,
    next_seq: u64,
}

impl Frontier {
    /// Empty the queue and restart sequence numbering at 0.
    pub(crate) fn clear(&mut self) {
        self.heap.clear();
        self.next_seq = 0;
    }

    pub(crate) fn push(&mut self, idx: usize, f: f64) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry { idx, f, seq });
        seq
    }

    #[inline]
    pub(crate) fn pop(&mut self) -> Option<Entry> {
        self.heap.pop()
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }
}

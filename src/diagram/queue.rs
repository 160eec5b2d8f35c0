use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::topology::VertexId;

#[derive(Debug, Clone, Copy)]
struct QueueEntry {
    vertex: VertexId,
    det: f64,
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.det
            .abs()
            .total_cmp(&other.det.abs())
            .then_with(|| self.vertex.cmp(&other.vertex))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

/// Max-heap of candidate vertices keyed by `|det|`.
///
/// The vertex whose classification is most certain comes out first.
#[derive(Debug, Clone, Default)]
pub struct VertexQueue {
    heap: BinaryHeap<QueueEntry>,
}

impl VertexQueue {
    pub fn push(&mut self, vertex: VertexId, det: f64) {
        self.heap.push(QueueEntry { vertex, det });
    }

    /// Removes the entry with the largest `|det|`.
    pub fn pop(&mut self) -> Option<(VertexId, f64)> {
        self.heap.pop().map(|e| (e.vertex, e.det))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn pops_by_absolute_value() {
        let mut ids: SlotMap<VertexId, ()> = SlotMap::with_key();
        let a = ids.insert(());
        let b = ids.insert(());
        let c = ids.insert(());
        let mut q = VertexQueue::default();
        q.push(a, 0.5);
        q.push(b, -3.0);
        q.push(c, 1.0);
        assert_eq!(q.len(), 3);
        assert_eq!(q.pop().unwrap(), (b, -3.0));
        assert_eq!(q.pop().unwrap(), (c, 1.0));
        assert_eq!(q.pop().unwrap(), (a, 0.5));
        assert!(q.pop().is_none());
    }

    #[test]
    fn clear_empties_the_queue() {
        let mut ids: SlotMap<VertexId, ()> = SlotMap::with_key();
        let mut q = VertexQueue::default();
        q.push(ids.insert(()), 1.0);
        q.clear();
        assert!(q.is_empty());
    }
}

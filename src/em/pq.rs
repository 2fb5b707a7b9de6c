//! External min priority queue with a bounded RAM heap.

use std::{cmp::Reverse, collections::BinaryHeap};

use tempfile::TempDir;

use super::{
    fatal_io,
    record::{spill_sorted_run, Record, RunReader},
};

/// Default RAM budget of a priority queue, in items.
pub const DEFAULT_PQ_CAPACITY: usize = 1 << 23;

/// A min priority queue whose contents may spill to secondary storage.
///
/// Items are kept in a binary heap up to the RAM budget; on overflow the
/// heap is drained into a sorted run file. [`peek`] and [`pop`] operate on
/// the global minimum of the heap top and all run fronts, so interleaving
/// pushes and pops stays correct regardless of which spill a value ended
/// up in.
///
/// [`peek`]: ExternalPriorityQueue::peek
/// [`pop`]: ExternalPriorityQueue::pop
pub struct ExternalPriorityQueue<T: Record + Ord> {
    heap: BinaryHeap<Reverse<T>>,
    capacity: usize,
    runs: Vec<RunReader<T>>,
    dir: Option<TempDir>,
    spills: usize,
    len: u64,
}

impl<T: Record + Ord> Default for ExternalPriorityQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record + Ord> ExternalPriorityQueue<T> {
    /// Creates a queue with the default RAM budget.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_PQ_CAPACITY)
    }

    /// Creates a queue that spills after `capacity` heap items.
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "priority queue capacity must be positive");

        Self {
            heap: BinaryHeap::new(),
            capacity,
            runs: Vec::new(),
            dir: None,
            spills: 0,
            len: 0,
        }
    }

    /// Number of items currently in the queue.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Returns `true` if the queue holds no items.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Inserts an item.
    ///
    /// # Panics
    /// Panics if a spill cannot be written.
    pub fn push(&mut self, item: T) {
        self.heap.push(Reverse(item));
        self.len += 1;

        if self.heap.len() >= self.capacity {
            self.spill();
        }
    }

    /// A reference to the smallest item, or `None` if the queue is empty.
    pub fn peek(&self) -> Option<&T> {
        let mut best = self.heap.peek().map(|r| &r.0);

        for run in &self.runs {
            if let Some(front) = run.front() {
                if best.is_none_or(|b| front < b) {
                    best = Some(front);
                }
            }
        }

        best
    }

    /// Removes and returns the smallest item.
    pub fn pop(&mut self) -> Option<T> {
        let mut best_run: Option<usize> = None;
        for (i, run) in self.runs.iter().enumerate() {
            if let Some(front) = run.front() {
                let better = match best_run {
                    Some(j) => front < self.runs[j].front().unwrap(),
                    None => true,
                };
                if better {
                    best_run = Some(i);
                }
            }
        }

        let from_heap = match (self.heap.peek(), best_run) {
            (None, None) => return None,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (Some(h), Some(j)) => h.0 <= *self.runs[j].front().unwrap(),
        };

        let item = if from_heap {
            self.heap.pop().unwrap().0
        } else {
            let j = best_run.unwrap();
            fatal_io("run read", self.runs[j].pop()).unwrap()
        };

        self.len -= 1;

        // Exhausted runs are dropped to keep peek/pop scans short
        self.runs.retain(|run| run.front().is_some());

        Some(item)
    }

    fn spill(&mut self) {
        if self.dir.is_none() {
            self.dir = Some(fatal_io("spill directory", tempfile::tempdir()));
        }

        let mut items: Vec<T> = self.heap.drain().map(|r| r.0).collect();
        let path = self
            .dir
            .as_ref()
            .unwrap()
            .path()
            .join(format!("run{}.bin", self.spills));
        self.spills += 1;

        let reader = fatal_io("run spill", spill_sorted_run(&mut items, path));
        self.runs.push(reader);
    }
}

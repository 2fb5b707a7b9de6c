//! Shared min priority queue with a bulk push/pop window protocol.

use parking_lot::Mutex;

use super::{pq::DEFAULT_PQ_CAPACITY, ExternalPriorityQueue, Record};

/// An [`ExternalPriorityQueue`] that many threads may fill concurrently.
///
/// The queue alternates between two modes driven by a single coordinator:
///
/// 1. `bulk_pop` extracts a batch of smallest items (coordinator only).
/// 2. A *push window* is opened with [`bulk_push_begin`]; any number of
///    worker threads insert through [`bulk_push`], which the queue
///    serializes internally; [`bulk_push_end`] closes the window.
///
/// Pops while a window is open are a protocol violation and panic. This
/// mirrors the batch loop of the parallel generator, where extraction and
/// processing strictly alternate.
///
/// [`bulk_push_begin`]: ParallelPriorityQueue::bulk_push_begin
/// [`bulk_push`]: ParallelPriorityQueue::bulk_push
/// [`bulk_push_end`]: ParallelPriorityQueue::bulk_push_end
pub struct ParallelPriorityQueue<T: Record + Ord> {
    core: Mutex<ExternalPriorityQueue<T>>,
    window_open: bool,
}

impl<T: Record + Ord> Default for ParallelPriorityQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record + Ord> ParallelPriorityQueue<T> {
    /// Creates a queue with the default RAM budget.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_PQ_CAPACITY)
    }

    /// Creates a queue that spills after `capacity` heap items.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            core: Mutex::new(ExternalPriorityQueue::with_capacity(capacity)),
            window_open: false,
        }
    }

    /// Opens a push window.
    ///
    /// # Panics
    /// Panics if a window is already open.
    pub fn bulk_push_begin(&mut self) {
        assert!(!self.window_open, "push window already open");
        self.window_open = true;
    }

    /// Inserts an item from any thread while a window is open.
    pub fn bulk_push(&self, item: T) {
        debug_assert!(self.window_open, "bulk_push outside a push window");
        self.core.lock().push(item);
    }

    /// Closes the current push window.
    ///
    /// # Panics
    /// Panics if no window is open.
    pub fn bulk_push_end(&mut self) {
        assert!(self.window_open, "no push window open");
        self.window_open = false;
    }

    /// Extracts up to `n` smallest items into `buf`, in ascending order.
    ///
    /// `buf` is cleared first; it ends up shorter than `n` only when the
    /// queue drains.
    ///
    /// # Panics
    /// Panics if a push window is open.
    pub fn bulk_pop(&mut self, buf: &mut Vec<T>, n: usize) {
        assert!(!self.window_open, "bulk_pop during a push window");

        buf.clear();
        let core = self.core.get_mut();
        while buf.len() < n {
            match core.pop() {
                Some(item) => buf.push(item),
                None => break,
            }
        }
    }

    /// Number of items currently in the queue.
    pub fn len(&self) -> u64 {
        self.core.lock().len()
    }

    /// Returns `true` if the queue holds no items.
    pub fn is_empty(&self) -> bool {
        self.core.lock().is_empty()
    }
}

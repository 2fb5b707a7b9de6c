//! External ascending sorter with push / sort / iterate phases.

use tempfile::TempDir;

use super::{
    fatal_io,
    record::{spill_sorted_run, Record, RunReader},
};

/// Default RAM budget of a sorter, in items.
pub const DEFAULT_SORTER_CAPACITY: usize = 1 << 23;

/// Sorts a sequence of records that may not fit into main memory.
///
/// The sorter has two phases. During the *fill* phase, [`push`] buffers
/// items in RAM and spills a sorted run to disk whenever the buffer reaches
/// its capacity. [`sort`] seals the fill phase; afterwards the sorter is an
/// ascending [`Iterator`] merging all runs with the in-memory remainder.
///
/// Run files live in a temporary directory owned by the sorter and are
/// removed when it is dropped.
///
/// [`push`]: ExternalSorter::push
/// [`sort`]: ExternalSorter::sort
///
/// # Example
/// ```
/// use pagg::em::ExternalSorter;
///
/// let mut sorter = ExternalSorter::with_capacity(4);
/// for x in [5u64, 3, 9, 1, 7, 2] {
///     sorter.push(x);
/// }
/// sorter.sort();
/// assert_eq!(sorter.collect::<Vec<_>>(), vec![1, 2, 3, 5, 7, 9]);
/// ```
pub struct ExternalSorter<T: Record + Ord> {
    buffer: Vec<T>,
    capacity: usize,
    runs: Vec<RunReader<T>>,
    dir: Option<TempDir>,
    items: u64,
    cursor: usize,
    sorted: bool,
}

impl<T: Record + Ord> Default for ExternalSorter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record + Ord> ExternalSorter<T> {
    /// Creates a sorter with the default RAM budget.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_SORTER_CAPACITY)
    }

    /// Creates a sorter that spills after `capacity` buffered items.
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "sorter capacity must be positive");

        Self {
            buffer: Vec::new(),
            capacity,
            runs: Vec::new(),
            dir: None,
            items: 0,
            cursor: 0,
            sorted: false,
        }
    }

    /// Adds an item to the sorter.
    ///
    /// # Panics
    /// Panics if called after [`sort`](ExternalSorter::sort), or if a spill
    /// cannot be written.
    pub fn push(&mut self, item: T) {
        assert!(!self.sorted, "push after sort");

        self.buffer.push(item);
        self.items += 1;

        if self.buffer.len() >= self.capacity {
            self.spill();
        }
    }

    /// Seals the fill phase; the sorter now iterates in ascending order.
    pub fn sort(&mut self) {
        assert!(!self.sorted, "sort called twice");

        self.buffer.sort_unstable();
        self.sorted = true;
    }

    /// Total number of items pushed.
    pub fn len(&self) -> u64 {
        self.items
    }

    /// Returns `true` if no items were pushed.
    pub fn is_empty(&self) -> bool {
        self.items == 0
    }

    fn spill(&mut self) {
        if self.dir.is_none() {
            self.dir = Some(fatal_io("spill directory", tempfile::tempdir()));
        }

        let path = self
            .dir
            .as_ref()
            .unwrap()
            .path()
            .join(format!("run{}.bin", self.runs.len()));

        let reader = fatal_io("run spill", spill_sorted_run(&mut self.buffer, path));
        self.runs.push(reader);
    }
}

impl<T: Record + Ord> Iterator for ExternalSorter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        assert!(self.sorted, "iterated before sort");

        // Pick the smallest front among the in-memory remainder and all runs
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

        let from_buffer = match (self.buffer.get(self.cursor), best_run) {
            (None, None) => return None,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (Some(b), Some(j)) => b <= self.runs[j].front().unwrap(),
        };

        if from_buffer {
            let item = self.buffer[self.cursor];
            self.cursor += 1;
            Some(item)
        } else {
            let j = best_run.unwrap();
            fatal_io("run read", self.runs[j].pop())
        }
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg64Mcg;

    use crate::token::Token;

    use super::*;

    #[test]
    fn in_memory_only() {
        let mut sorter = ExternalSorter::new();
        for x in [3u64, 1, 2] {
            sorter.push(x);
        }
        sorter.sort();
        assert_eq!(sorter.collect_vec(), vec![1, 2, 3]);
    }

    #[test]
    fn empty() {
        let mut sorter = ExternalSorter::<u64>::new();
        assert!(sorter.is_empty());
        sorter.sort();
        assert_eq!(sorter.next(), None);
    }

    #[test]
    fn spilled_runs_merge_in_order() {
        let rng = &mut Pcg64Mcg::seed_from_u64(7);

        // A tiny capacity forces many runs
        for n in [10usize, 100, 1000] {
            let mut sorter = ExternalSorter::with_capacity(8);
            let mut expected = Vec::with_capacity(n);

            for _ in 0..n {
                let x: u64 = rng.random_range(0..1000);
                sorter.push(x);
                expected.push(x);
            }

            assert_eq!(sorter.len(), n as u64);
            sorter.sort();
            expected.sort_unstable();

            assert_eq!(sorter.collect_vec(), expected);
        }
    }

    #[test]
    fn sorts_tokens() {
        let rng = &mut Pcg64Mcg::seed_from_u64(8);

        let mut sorter = ExternalSorter::with_capacity(16);
        for _ in 0..200 {
            sorter.push(Token::new(
                rng.random_bool(0.5),
                rng.random_range(0..50),
                rng.random_range(0..50),
            ));
        }
        sorter.sort();

        for (a, b) in sorter.tuple_windows() {
            assert!(a <= b);
        }
    }

    #[test]
    #[should_panic(expected = "push after sort")]
    fn push_after_sort_panics() {
        let mut sorter = ExternalSorter::new();
        sorter.push(1u64);
        sorter.sort();
        sorter.push(2u64);
    }
}

/*!
# External-Memory Containers

The token pipeline does not depend on a specific external-memory library; it
only needs an ascending sorter and a min priority queue whose contents may
spill to secondary storage. This module provides both, built on the classic
run-spill design:

- [`ExternalSorter`]: buffer pushes in RAM, spill sorted runs to disk, merge
  the runs on iteration.
- [`ExternalPriorityQueue`]: a binary min-heap up to a RAM budget, draining
  into sorted runs on overflow; `pop` takes the global minimum of the heap
  top and all run fronts.
- [`ParallelPriorityQueue`]: the same core behind a mutex with a bulk
  push/pop window protocol for multi-threaded producers.

Run files are fixed-width little-endian record arrays (see [`Record`]) in a
temporary directory owned by the container; everything is released on drop.

Spill I/O failures are fatal: a generator run that loses its intermediate
state cannot be resumed, so the affected operations panic instead of
propagating errors through every pipeline stage.
*/

pub mod pq;
pub mod ppq;
pub mod record;
pub mod sorter;

pub use pq::ExternalPriorityQueue;
pub use ppq::ParallelPriorityQueue;
pub use record::Record;
pub use sorter::ExternalSorter;

/// Unwraps a spill I/O result, aborting the run on failure.
pub(crate) fn fatal_io<T>(what: &str, result: std::io::Result<T>) -> T {
    result.unwrap_or_else(|e| panic!("external memory {what} failed: {e}"))
}

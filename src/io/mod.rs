/*!
# IO

Binary edge file output and the writer pool of the parallel generator.

An edge file is a flat little-endian array of fixed-width unsigned vertex
ids with no header or footer; edge `k` occupies the ids at byte offsets
`2k * W` and `(2k + 1) * W`. The width `W` is chosen at compile time through
the cargo features `width_32`, `width_40`, `width_48` (default: 64 bit).

- [`EdgeWriter`]: appends ids, truncates the file to its true size on drop.
- [`IdFileReader`]: streams the ids of an edge file back.
- [`EdgeWriterPool`]: one writer per worker, distributed over the path
  prefixes of a configuration file.
*/

pub mod edge_writer;
pub mod pool;

pub use edge_writer::{EdgeWriter, IdFileReader, ID_BYTES};
pub use pool::EdgeWriterPool;

//! Fixed-width binary edge list output.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, ErrorKind, Read, Result, Write},
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

use crate::edge::{Edge, Node, NumEdges};

#[cfg(all(feature = "width_32", any(feature = "width_40", feature = "width_48")))]
compile_error!("at most one id width feature may be enabled");
#[cfg(all(feature = "width_40", feature = "width_48"))]
compile_error!("at most one id width feature may be enabled");

/// Bytes per vertex id in an edge file.
#[cfg(feature = "width_32")]
pub const ID_BYTES: usize = 4;
/// Bytes per vertex id in an edge file.
#[cfg(feature = "width_40")]
pub const ID_BYTES: usize = 5;
/// Bytes per vertex id in an edge file.
#[cfg(feature = "width_48")]
pub const ID_BYTES: usize = 6;
/// Bytes per vertex id in an edge file.
#[cfg(not(any(feature = "width_32", feature = "width_40", feature = "width_48")))]
pub const ID_BYTES: usize = 8;

/// Appends fixed-width little-endian vertex ids to an edge file.
///
/// The file may be pre-sized to an expected edge count; over-estimates are
/// harmless because the writer truncates the file to
/// `2 * edges_written * ID_BYTES` bytes when it is dropped (or explicitly
/// via [`finish`](EdgeWriter::finish)). Only after that is the file
/// complete; a crash mid-run leaves an over-sized file behind.
///
/// With `disable_output` the writer turns into a drain that merely consumes
/// its input, which is useful to benchmark the generator pipelines without
/// their output bandwidth.
pub struct EdgeWriter {
    writer: Option<BufWriter<File>>,
    path: PathBuf,
    edges_written: NumEdges,
    disable_output: bool,
}

impl EdgeWriter {
    /// Creates the output file, pre-sized for `expected_edges` edges.
    ///
    /// `expected_edges` may be zero or an over-estimate; it only affects
    /// allocation, never correctness.
    pub fn new<P: AsRef<Path>>(path: P, expected_edges: NumEdges) -> Result<Self> {
        let file = File::create(&path)?;
        if expected_edges > 0 {
            file.set_len(2 * expected_edges * ID_BYTES as u64)?;
        }

        debug!(
            path = %path.as_ref().display(),
            bytes_per_id = ID_BYTES,
            expected_edges,
            "edge writer initialized"
        );

        Ok(Self {
            writer: Some(BufWriter::new(file)),
            path: path.as_ref().to_path_buf(),
            edges_written: 0,
            disable_output: false,
        })
    }

    /// Turns all writes into drains (or back).
    pub fn set_disable_output(&mut self, disable: bool) {
        self.disable_output = disable;
    }

    /// Path of the output file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of edges written so far.
    pub fn edges_written(&self) -> NumEdges {
        self.edges_written
    }

    /// Bytes per vertex id in the output, zero while output is disabled.
    pub fn bytes_per_vertex(&self) -> usize {
        if self.disable_output {
            0
        } else {
            ID_BYTES
        }
    }

    /// Size the file will have once the writer is finished.
    pub fn file_size(&self) -> u64 {
        2 * self.edges_written * self.bytes_per_vertex() as u64
    }

    /// Writes a single edge.
    ///
    /// The edge is counted even while output is disabled, so the generators
    /// can size their batches from the edge count in drain mode.
    pub fn push_edge(&mut self, u: Node, v: Node) -> Result<()> {
        if !self.disable_output {
            self.write_id(u)?;
            self.write_id(v)?;
        }
        self.edges_written += 1;
        Ok(())
    }

    /// Materializes a flat vertex stream; every two ids form one edge.
    pub fn write_vertices<I>(&mut self, stream: I) -> Result<()>
    where
        I: Iterator<Item = Node>,
    {
        if self.disable_output {
            stream.for_each(drop);
            return Ok(());
        }

        let mut vertices = 0;
        for v in stream {
            self.write_id(v)?;
            vertices += 1;
        }
        self.edges_written += vertices / 2;

        Ok(())
    }

    /// Materializes a stream of edges.
    pub fn write_edges<I>(&mut self, stream: I) -> Result<()>
    where
        I: Iterator<Item = Edge>,
    {
        if self.disable_output {
            stream.for_each(drop);
            return Ok(());
        }

        for Edge(u, v) in stream {
            self.write_id(u)?;
            self.write_id(v)?;
            self.edges_written += 1;
        }

        Ok(())
    }

    /// Flushes and truncates the file to its true size.
    ///
    /// Dropping the writer does the same on a best-effort basis; call this
    /// to observe errors.
    pub fn finish(mut self) -> Result<NumEdges> {
        self.close()?;
        Ok(self.edges_written)
    }

    fn write_id(&mut self, id: Node) -> Result<()> {
        // ids wider than the configured file width would be silently cut
        debug_assert_eq!(id.checked_shr(8 * ID_BYTES as u32).unwrap_or(0), 0);

        self.writer
            .as_mut()
            .unwrap()
            .write_all(&id.to_le_bytes()[..ID_BYTES])
    }

    fn close(&mut self) -> Result<()> {
        let Some(mut writer) = self.writer.take() else {
            return Ok(());
        };

        if self.disable_output {
            return Ok(());
        }

        writer.flush()?;
        writer.get_ref().set_len(self.file_size())?;

        debug!(
            path = %self.path.display(),
            edges = self.edges_written,
            "edge writer finished"
        );

        Ok(())
    }
}

impl Drop for EdgeWriter {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(path = %self.path.display(), "closing edge writer failed: {e}");
        }
    }
}

/// Streams the vertex ids of an edge file.
///
/// Ids are read back in file order, so consecutive pairs are edges. A
/// trailing partial record is reported and ignored.
pub struct IdFileReader {
    reader: BufReader<File>,
    path: PathBuf,
}

impl IdFileReader {
    /// Opens an edge file written with the configured id width.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            reader: BufReader::new(File::open(&path)?),
            path: path.as_ref().to_path_buf(),
        })
    }
}

impl Iterator for IdFileReader {
    type Item = Node;

    fn next(&mut self) -> Option<Node> {
        let mut buf = [0u8; 8];

        match self.reader.read_exact(&mut buf[..ID_BYTES]) {
            Ok(()) => Some(u64::from_le_bytes(buf)),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                // either a clean end or a truncated trailing record
                if self.reader.fill_buf().map_or(true, |b| b.is_empty()) {
                    None
                } else {
                    warn!(path = %self.path.display(), "ignoring truncated trailing record");
                    None
                }
            }
            Err(e) => panic!("reading edge file {} failed: {e}", self.path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;

    #[test]
    fn vertices_written_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.bin");

        let mut writer = EdgeWriter::new(&path, 100).unwrap();
        writer
            .write_vertices([0u64, 1, 1, 2, 2, 3].into_iter())
            .unwrap();
        assert_eq!(writer.edges_written(), 3);
        assert_eq!(writer.finish().unwrap(), 3);

        // pre-sizing must have been undone
        assert_eq!(
            std::fs::metadata(&path).unwrap().len(),
            6 * ID_BYTES as u64
        );

        let ids = IdFileReader::open(&path).unwrap().collect_vec();
        assert_eq!(ids, vec![0, 1, 1, 2, 2, 3]);
    }

    #[test]
    fn edges_and_single_pushes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.bin");

        let mut writer = EdgeWriter::new(&path, 0).unwrap();
        writer.push_edge(7, 8).unwrap();
        writer
            .write_edges([Edge(1, 2), Edge(3, 4)].into_iter())
            .unwrap();
        assert_eq!(writer.finish().unwrap(), 3);

        let ids = IdFileReader::open(&path).unwrap().collect_vec();
        assert_eq!(ids, vec![7, 8, 1, 2, 3, 4]);
    }

    #[test]
    fn disabled_output_drains() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.bin");

        let mut writer = EdgeWriter::new(&path, 0).unwrap();
        writer.set_disable_output(true);

        writer.write_vertices([1u64, 2, 3, 4].into_iter()).unwrap();
        assert_eq!(writer.edges_written(), 0);
        assert_eq!(writer.bytes_per_vertex(), 0);

        // single pushes still count for batch sizing
        writer.push_edge(1, 2).unwrap();
        assert_eq!(writer.edges_written(), 1);
    }

    #[test]
    fn drop_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.bin");

        {
            let mut writer = EdgeWriter::new(&path, 1000).unwrap();
            writer.push_edge(1, 2).unwrap();
        }

        assert_eq!(
            std::fs::metadata(&path).unwrap().len(),
            2 * ID_BYTES as u64
        );
    }
}

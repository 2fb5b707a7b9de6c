//! Fixed-width binary encoding for spillable values and the run files
//! built on top of it.

use std::{
    fs::File,
    io::{BufReader, BufWriter, ErrorKind, Read, Write},
    marker::PhantomData,
    path::Path,
};

/// A value that can be written to and read back from a spill run.
///
/// Encodings are fixed-width and little-endian, so a run file is a flat
/// array of `BYTES`-sized records and record `k` lives at byte offset
/// `k * BYTES`.
pub trait Record: Copy {
    /// Encoded size in bytes.
    const BYTES: usize;

    /// Appends the encoding of `self` to `buf`.
    fn encode(&self, buf: &mut Vec<u8>);

    /// Decodes a value from the first `BYTES` bytes of `buf`.
    fn decode(buf: &[u8]) -> Self;
}

impl Record for u64 {
    const BYTES: usize = 8;

    fn encode(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.to_le_bytes());
    }

    fn decode(buf: &[u8]) -> Self {
        u64::from_le_bytes(buf[..8].try_into().unwrap())
    }
}

/// Sequentially writes records into a run file.
pub(crate) struct RunWriter<T: Record> {
    writer: BufWriter<File>,
    scratch: Vec<u8>,
    _marker: PhantomData<T>,
}

impl<T: Record> RunWriter<T> {
    pub(crate) fn create<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        Ok(Self {
            writer: BufWriter::new(File::create(path)?),
            scratch: Vec::with_capacity(T::BYTES),
            _marker: PhantomData,
        })
    }

    pub(crate) fn push(&mut self, item: &T) -> std::io::Result<()> {
        self.scratch.clear();
        item.encode(&mut self.scratch);
        debug_assert_eq!(self.scratch.len(), T::BYTES);
        self.writer.write_all(&self.scratch)
    }

    pub(crate) fn finish(mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

/// Reads a run file back with a one-record lookahead.
///
/// The front record is decoded eagerly so that merging code can compare the
/// fronts of several runs without consuming them.
pub(crate) struct RunReader<T: Record> {
    reader: BufReader<File>,
    front: Option<T>,
    scratch: Vec<u8>,
}

impl<T: Record> RunReader<T> {
    pub(crate) fn open<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let mut reader = Self {
            reader: BufReader::new(File::open(path)?),
            front: None,
            scratch: vec![0u8; T::BYTES],
        };
        reader.advance()?;
        Ok(reader)
    }

    /// The smallest not-yet-consumed record, or `None` once exhausted.
    pub(crate) fn front(&self) -> Option<&T> {
        self.front.as_ref()
    }

    /// Drops the current front and decodes the next record.
    pub(crate) fn advance(&mut self) -> std::io::Result<()> {
        match self.reader.read_exact(&mut self.scratch) {
            Ok(()) => {
                self.front = Some(T::decode(&self.scratch));
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                self.front = None;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Consumes and returns the front record.
    pub(crate) fn pop(&mut self) -> std::io::Result<Option<T>> {
        let front = self.front.take();
        if front.is_some() {
            self.advance()?;
        }
        Ok(front)
    }
}

/// Sorts `items` and writes them as a new run file, returning a reader
/// positioned at its first record.
pub(crate) fn spill_sorted_run<T: Record + Ord, P: AsRef<Path>>(
    items: &mut Vec<T>,
    path: P,
) -> std::io::Result<RunReader<T>> {
    items.sort_unstable();

    let mut writer = RunWriter::create(&path)?;
    for item in items.iter() {
        writer.push(item)?;
    }
    writer.finish()?;
    items.clear();

    RunReader::open(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_read_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.bin");

        let mut writer = RunWriter::<u64>::create(&path).unwrap();
        for x in [17u64, 3, 99, 0, u64::MAX] {
            writer.push(&x).unwrap();
        }
        writer.finish().unwrap();

        let mut reader = RunReader::<u64>::open(&path).unwrap();
        let mut read_back = Vec::new();
        while let Some(x) = reader.pop().unwrap() {
            read_back.push(x);
        }

        assert_eq!(read_back, vec![17, 3, 99, 0, u64::MAX]);
    }

    #[test]
    fn empty_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.bin");

        RunWriter::<u64>::create(&path).unwrap().finish().unwrap();

        let reader = RunReader::<u64>::open(&path).unwrap();
        assert!(reader.front().is_none());
    }

    #[test]
    fn spill_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.bin");

        let mut items = vec![5u64, 1, 4, 1, 3];
        let mut reader = spill_sorted_run(&mut items, &path).unwrap();
        assert!(items.is_empty());

        let mut read_back = Vec::new();
        while let Some(x) = reader.pop().unwrap() {
            read_back.push(x);
        }
        assert_eq!(read_back, vec![1, 1, 3, 4, 5]);
    }
}

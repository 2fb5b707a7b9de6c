//! Writer pool distributing workers over configured output paths.

use std::{io::Result, path::PathBuf};

use tracing::{debug, warn};

use crate::edge::NumEdges;

use super::EdgeWriter;

/// Name of the environment variable pointing at a pool configuration file.
pub const CONFIG_ENV: &str = "PAGGCFG";

/// Base name of the pool configuration file.
const CONFIG_BASENAME: &str = ".pagg_out";

/// A pool of [`EdgeWriter`]s, one per worker.
///
/// The output locations come from a configuration file listing one path
/// prefix per line; `#` starts an end-of-line comment, surrounding
/// whitespace and empty lines are ignored. The file is searched in this
/// order:
///
/// 1. the path in the environment variable `PAGGCFG`,
/// 2. `./.pagg_out.HOSTNAME`, then `./.pagg_out`,
/// 3. `$HOME/.pagg_out.HOSTNAME`, then `$HOME/.pagg_out`.
///
/// Without a configuration file everything goes to the current directory.
/// Worker `i` writes to `prefix[i % N]` + `graph{i}.bin`, so spreading
/// prefixes over distinct disks spreads the output bandwidth. Note that a
/// prefix pointing at a directory needs its trailing slash.
pub struct EdgeWriterPool {
    writers: Vec<EdgeWriter>,
}

impl EdgeWriterPool {
    /// Creates `workers` writers using the configured path prefixes, each
    /// pre-sized for `expected_edges` edges.
    pub fn new(workers: usize, expected_edges: NumEdges) -> Result<Self> {
        Self::with_prefixes(find_config(), workers, expected_edges)
    }

    /// Creates `workers` writers over explicit path prefixes.
    ///
    /// # Panics
    /// Panics if `prefixes` is empty.
    pub fn with_prefixes(
        prefixes: Vec<String>,
        workers: usize,
        expected_edges: NumEdges,
    ) -> Result<Self> {
        assert!(!prefixes.is_empty(), "at least one path prefix is required");

        let writers = (0..workers)
            .map(|i| {
                let path = format!("{}graph{}.bin", prefixes[i % prefixes.len()], i);
                EdgeWriter::new(path, expected_edges)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { writers })
    }

    /// Number of writers in the pool.
    pub fn len(&self) -> usize {
        self.writers.len()
    }

    /// Returns `true` if the pool holds no writers.
    pub fn is_empty(&self) -> bool {
        self.writers.is_empty()
    }

    /// The writer assigned to worker `idx`.
    pub fn writer(&mut self, idx: usize) -> &mut EdgeWriter {
        &mut self.writers[idx]
    }

    /// All writers, for handing one to each worker thread.
    pub fn writers_mut(&mut self) -> &mut [EdgeWriter] {
        &mut self.writers
    }

    /// The output paths of all writers, in worker order.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.writers.iter().map(|w| w.path().to_path_buf()).collect()
    }

    /// Disables or enables output on every writer.
    pub fn set_disable_output(&mut self, disable: bool) {
        for writer in &mut self.writers {
            writer.set_disable_output(disable);
        }
    }

    /// Sums the edges written by all writers.
    pub fn total_edges_written(&self) -> NumEdges {
        self.writers.iter().map(|w| w.edges_written()).sum()
    }

    /// Finishes every writer, truncating all files to their true size.
    pub fn finish(self) -> Result<NumEdges> {
        let mut edges = 0;
        for writer in self.writers {
            edges += writer.finish()?;
        }
        Ok(edges)
    }
}

/// Locates and parses the pool configuration, falling back to `./`.
fn find_config() -> Vec<String> {
    if let Some(path) = config_path() {
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let prefixes = parse_config(&content);
                if !prefixes.is_empty() {
                    debug!(path = %path.display(), ?prefixes, "using writer pool configuration");
                    return prefixes;
                }
                warn!(path = %path.display(), "pool configuration is empty; using ./");
            }
            Err(e) => {
                warn!(path = %path.display(), "cannot read pool configuration: {e}; using ./")
            }
        }
    } else {
        warn!("no writer pool configuration found; using ./");
    }

    vec!["./".to_string()]
}

/// The first readable candidate among the configuration search paths.
fn config_path() -> Option<PathBuf> {
    let readable = |p: PathBuf| p.is_file().then_some(p);

    if let Ok(path) = std::env::var(CONFIG_ENV) {
        if let Some(path) = readable(PathBuf::from(path)) {
            return Some(path);
        }
    }

    let hostname = std::env::var("HOSTNAME").ok();
    let mut dirs = vec![PathBuf::from(".")];
    if let Ok(home) = std::env::var("HOME") {
        dirs.push(PathBuf::from(home));
    }

    for dir in dirs {
        if let Some(host) = &hostname {
            let candidate = dir.join(format!("{CONFIG_BASENAME}.{host}"));
            if let Some(path) = readable(candidate) {
                return Some(path);
            }
        }

        if let Some(path) = readable(dir.join(CONFIG_BASENAME)) {
            return Some(path);
        }
    }

    None
}

/// Extracts the path prefixes from a configuration file.
fn parse_config(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| line.split('#').next().unwrap_or("").trim())
        .filter(|line| !line.is_empty())
        .map(|line| line.to_string())
        .collect()
}

//! Multi-threaded Barabási–Albert generator over a shared priority queue.

use std::time::Instant;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;
use tracing::{debug, info};

use crate::{
    edge::{Node, NumEdges, NumNodes},
    em::{pq::DEFAULT_PQ_CAPACITY, ParallelPriorityQueue},
    io::{EdgeWriter, EdgeWriterPool},
    token::CompressedToken,
};

use super::{EdgesPerVertexGen, NumNodesGen, ParameterError};

/// Master seed used when none is configured.
pub const DEFAULT_SEED: u64 = 1;

/// Ratio of seed edges to the per-vertex edge count.
const SEED_EDGE_FACTOR: u64 = 1000;

/// Deterministic seed path: position `i` of the edge list holds vertex
/// `i/2 + (i & 1)`, spelling out the edges `(0,1), (1,2), ...`.
///
/// Unlike the circle of the sequential pipeline, every position can be
/// evaluated independently, so randomly drawn positions that land in the
/// seed resolve without a query token.
#[derive(Debug, Copy, Clone)]
pub struct RagPath {
    number_of_edges: NumEdges,
}

impl RagPath {
    /// Creates a path with the given number of edges.
    pub fn new(number_of_edges: NumEdges) -> Self {
        Self { number_of_edges }
    }

    /// Vertex at position `idx` of the edge list.
    #[inline]
    pub fn node(&self, idx: u64) -> Node {
        idx / 2 + (idx & 1)
    }

    /// Highest vertex id used by this seed graph.
    pub fn max_vertex_id(&self) -> Node {
        self.number_of_edges
    }

    /// Number of edges the path contributes.
    pub fn number_of_edges(&self) -> NumEdges {
        self.number_of_edges
    }
}

/// Parallel generator for Barabási–Albert preferential attachment graphs.
///
/// Instead of sorting the token sequence, all tokens are pushed into a
/// shared [`ParallelPriorityQueue`] keyed by edge id. The driver then loops:
/// extract a batch of smallest tokens, process it on a thread pool, and
/// reinsert the answers, until the queue drains.
///
/// Within a batch, the tokens of one edge form a group `(link, query*)`.
/// Chunk boundaries are shifted so that no group is split across threads;
/// each thread completes the edges of its groups into its own writer of the
/// [`EdgeWriterPool`] and answers the queries by pushing fresh link tokens.
///
/// The emitted multiset of edges matches the sequential model, but the
/// assignment of edges to output files and their order depend on the thread
/// count.
#[derive(Debug, Copy, Clone)]
pub struct ParallelBa {
    nodes: NumNodes,
    edges_per_vertex: NumEdges,
    edge_dependencies: bool,
    threads: usize,
    seed: u64,
    min_batch: usize,
    extract_cap: usize,
    pq_capacity: usize,
}

impl Default for ParallelBa {
    fn default() -> Self {
        Self {
            nodes: 0,
            edges_per_vertex: 1,
            edge_dependencies: false,
            threads: 0,
            seed: DEFAULT_SEED,
            min_batch: 1 << 14,
            extract_cap: 1 << 22,
            pq_capacity: DEFAULT_PQ_CAPACITY,
        }
    }
}

impl NumNodesGen for ParallelBa {
    fn set_nodes(&mut self, n: NumNodes) {
        self.nodes = n;
    }
}

impl EdgesPerVertexGen for ParallelBa {
    fn set_edges_per_vertex(&mut self, m: NumEdges) {
        self.edges_per_vertex = m;
    }
}

impl ParallelBa {
    /// Creates a new generator with no vertices configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables weight updates between the edges of one vertex.
    pub fn edge_dependencies(mut self, dependencies: bool) -> Self {
        self.edge_dependencies = dependencies;
        self
    }

    /// Sets the number of worker threads; `0` uses all available cores.
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Sets the master seed. Worker `i` derives its generator from
    /// `seed + i`.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Overrides the batch sizing limits.
    ///
    /// Batches grow with the number of edges emitted, clamped to
    /// `[min_batch, extract_cap]`. Small limits force many batches, which
    /// is mainly useful for tests.
    ///
    /// # Panics
    /// Panics unless `0 < min_batch <= extract_cap`.
    pub fn batch_limits(mut self, min_batch: usize, extract_cap: usize) -> Self {
        assert!(0 < min_batch && min_batch <= extract_cap);
        self.min_batch = min_batch;
        self.extract_cap = extract_cap;
        self
    }

    /// Overrides the RAM budget of the shared priority queue.
    pub fn pq_capacity(mut self, capacity: usize) -> Self {
        self.pq_capacity = capacity;
        self
    }

    /// The deterministic seed graph preceding the random vertices.
    pub fn seed_graph(&self) -> RagPath {
        RagPath::new(SEED_EDGE_FACTOR * self.edges_per_vertex)
    }

    /// Total number of edges the generator will emit, seed included.
    pub fn total_edges(&self) -> NumEdges {
        self.seed_graph().number_of_edges() + self.nodes * self.edges_per_vertex
    }

    /// Checks the configured parameters.
    pub fn validate(&self) -> Result<(), ParameterError> {
        if self.edges_per_vertex == 0 {
            return Err(ParameterError::EmptyModel);
        }
        Ok(())
    }

    /// Generates the graph into the writers of `pool`.
    ///
    /// Returns the total number of edges written. The pool must hold one
    /// writer per thread; worker `i` only ever touches writer `i`.
    ///
    /// # Panics
    /// Panics if [`validate`](ParallelBa::validate) fails or the pool is
    /// smaller than the thread count.
    pub fn generate(&self, pool: &mut EdgeWriterPool) -> std::io::Result<NumEdges> {
        self.validate().unwrap();

        let threads = if self.threads == 0 {
            std::thread::available_parallelism().map_or(1, |p| p.get())
        } else {
            self.threads
        };
        assert!(
            pool.len() >= threads,
            "writer pool holds {} writers but {} threads were requested",
            pool.len(),
            threads
        );

        let thread_pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(std::io::Error::other)?;

        let seed_graph = self.seed_graph();

        // the seed path is predetermined; emit it without touching the queue
        {
            let writer = pool.writer(0);
            for i in (0..2 * seed_graph.number_of_edges()).step_by(2) {
                writer.push_edge(seed_graph.node(i), seed_graph.node(i + 1))?;
            }
        }

        let mut ppq = ParallelPriorityQueue::with_capacity(self.pq_capacity);
        thread_pool.install(|| {
            let fill_start = Instant::now();
            self.fill_queue(&mut ppq, threads, seed_graph);
            info!(
                tokens = ppq.len(),
                threads,
                elapsed_ms = fill_start.elapsed().as_millis() as u64,
                "token generation done"
            );

            self.process_queue(&mut ppq, pool, threads, seed_graph)
        })?;

        Ok(pool.total_edges_written())
    }

    /// Pushes one token per edge into the queue, in parallel over vertices.
    fn fill_queue(
        &self,
        ppq: &mut ParallelPriorityQueue<CompressedToken>,
        threads: usize,
        seed_graph: RagPath,
    ) {
        let model = *self;
        let seed_weight = 2 * seed_graph.number_of_edges();
        let vertices_per_thread = self.nodes.div_ceil(threads as u64).max(1);

        ppq.bulk_push_begin();
        {
            let ppq = &*ppq;
            rayon::scope(|s| {
                for tid in 0..threads as u64 {
                    let begin = (tid * vertices_per_thread).min(model.nodes);
                    let end = ((tid + 1) * vertices_per_thread).min(model.nodes);
                    if begin == end {
                        continue;
                    }

                    s.spawn(move |_| {
                        let rng = &mut Pcg64Mcg::seed_from_u64(model.seed + tid);

                        for vertex in begin..end {
                            let mut weight =
                                seed_weight + 2 * model.edges_per_vertex * vertex;
                            let mut idx = model.edges_per_vertex * vertex;

                            for _ in 0..model.edges_per_vertex {
                                let r = rng.random_range(0..weight);

                                if r < seed_weight {
                                    // landed in the seed path; resolves directly
                                    ppq.bulk_push(CompressedToken::link(
                                        idx,
                                        seed_graph.node(r),
                                    ));
                                } else if r & 1 == 1 {
                                    // odd slots hold the deterministic new-vertex
                                    // endpoint of edge (r - seed_weight) / 2
                                    ppq.bulk_push(CompressedToken::link(
                                        idx,
                                        (r - seed_weight) / 2 / model.edges_per_vertex
                                            + seed_graph.max_vertex_id()
                                            + 1,
                                    ));
                                } else {
                                    // even slots are random endpoints; ask for them
                                    ppq.bulk_push(CompressedToken::query(
                                        (r - seed_weight) / 2,
                                        idx,
                                    ));
                                }

                                weight += 2 * model.edge_dependencies as u64;
                                idx += 1;
                            }
                        }
                    });
                }
            });
        }
        ppq.bulk_push_end();
    }

    /// The batch loop: extract, process in chunks, reinsert, repeat.
    fn process_queue(
        &self,
        ppq: &mut ParallelPriorityQueue<CompressedToken>,
        pool: &mut EdgeWriterPool,
        threads: usize,
        seed_graph: RagPath,
    ) -> std::io::Result<()> {
        let mut buf: Vec<CompressedToken> = Vec::new();

        while !ppq.is_empty() {
            let requested = self.batch_size(pool.total_edges_written());

            let pop_start = Instant::now();
            ppq.bulk_pop(&mut buf, requested);
            let popped = buf.len();

            ppq.bulk_push_begin();
            let proc_start = Instant::now();

            let (completed, unanswered, used_threads) = if popped < 2 * self.min_batch {
                let (c, u) =
                    self.process_chunk(ppq, &buf, popped, pool.writer(0), seed_graph)?;
                (c, u, 1)
            } else {
                let nthreads = (popped / self.min_batch).clamp(1, threads);
                let bounds = Self::chunk_bounds(&buf, nthreads);

                let mut results: Vec<std::io::Result<(u64, u64)>> =
                    (0..nthreads).map(|_| Ok((0, 0))).collect();

                rayon::scope(|s| {
                    let ppq = &*ppq;
                    let buf = buf.as_slice();

                    for ((result, writer), window) in results
                        .iter_mut()
                        .zip(pool.writers_mut().iter_mut())
                        .zip(bounds.windows(2))
                    {
                        let (start, end) = (window[0], window[1]);
                        s.spawn(move |_| {
                            *result = self.process_chunk(
                                ppq,
                                &buf[start..end],
                                popped,
                                writer,
                                seed_graph,
                            );
                        });
                    }
                });

                let mut completed = 0;
                let mut unanswered = 0;
                for result in results {
                    let (c, u) = result?;
                    completed += c;
                    unanswered += u;
                }
                (completed, unanswered, nthreads)
            };

            let push_end = Instant::now();
            ppq.bulk_push_end();

            debug!(
                requested,
                got = popped,
                unanswered,
                completed,
                in_queue = ppq.len(),
                edges_written = pool.total_edges_written(),
                pop_us = (proc_start - pop_start).as_micros() as u64,
                proc_us = (push_end - proc_start).as_micros() as u64,
                threads = used_threads,
                "batch"
            );
        }

        Ok(())
    }

    /// Shifts the nominal chunk boundaries forward past query tokens so
    /// that every chunk starts with a link token. The skipped queries stay
    /// with the preceding chunk, which keeps each `(link, query*)` group on
    /// a single thread.
    fn chunk_bounds(buf: &[CompressedToken], nthreads: usize) -> Vec<usize> {
        let chunk_size = buf.len() / nthreads;

        let mut bounds = Vec::with_capacity(nthreads + 1);
        bounds.push(0);
        for t in 1..nthreads {
            let mut b = t * chunk_size;
            while b < buf.len() && buf[b].is_query() {
                b += 1;
            }
            bounds.push(b);
        }
        bounds.push(buf.len());

        bounds
    }

    /// Processes one chunk of `(link, query*)` groups.
    ///
    /// Returns the number of completed edges and of re-pushed queries.
    fn process_chunk(
        &self,
        ppq: &ParallelPriorityQueue<CompressedToken>,
        chunk: &[CompressedToken],
        buffer_len: usize,
        writer: &mut EdgeWriter,
        seed_graph: RagPath,
    ) -> std::io::Result<(u64, u64)> {
        let mut completed = 0;
        let mut unanswered = 0;

        let mut i = 0;
        while i < chunk.len() {
            // a group headed by queries lost its link to an earlier batch or
            // to a pending answer; reprocess the queries next round
            if chunk[i].is_query() {
                while i < chunk.len() && chunk[i].is_query() {
                    ppq.bulk_push(chunk[i]);
                    unanswered += 1;
                    i += 1;
                }
                continue;
            }

            let t = chunk[i];
            i += 1;

            // answer all queries referring to this edge
            while i < chunk.len() && chunk[i].index() == t.index() {
                let q = chunk[i];
                debug_assert!(q.is_query());
                debug_assert!(q.value() > t.index());

                ppq.bulk_push(CompressedToken::link(q.value(), t.value()));
                i += 1;
            }

            if i == chunk.len() && buffer_len > 1 {
                // the group ran into the chunk end; further queries for this
                // edge may live in the next batch, so reinsert the link
                ppq.bulk_push(t);
            } else {
                let second =
                    t.index() / self.edges_per_vertex + seed_graph.max_vertex_id() + 1;
                writer.push_edge(t.value(), second)?;
                completed += 1;
            }
        }

        Ok((completed, unanswered))
    }

    fn batch_size(&self, edges_written: u64) -> usize {
        ((edges_written as f64).powf(0.75) as usize).clamp(self.min_batch, self.extract_cap)
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use crate::io::IdFileReader;

    use super::*;

    fn run_and_read(model: ParallelBa, threads: usize) -> Vec<(u64, u64)> {
        let dir = tempfile::tempdir().unwrap();
        let prefix = format!("{}/", dir.path().display());

        let mut pool =
            EdgeWriterPool::with_prefixes(vec![prefix], threads, model.total_edges()).unwrap();
        let written = model.generate(&mut pool).unwrap();
        assert_eq!(written, model.total_edges());

        let paths = pool.paths();
        pool.finish().unwrap();

        let mut edges = Vec::new();
        for path in paths {
            let ids = IdFileReader::open(path).unwrap().collect_vec();
            assert_eq!(ids.len() % 2, 0);
            edges.extend(ids.into_iter().tuples::<(u64, u64)>());
        }
        edges
    }

    #[test]
    fn rag_path_positions() {
        let path = RagPath::new(4);
        let vertices = (0..8).map(|i| path.node(i)).collect_vec();
        assert_eq!(vertices, vec![0, 1, 1, 2, 2, 3, 3, 4]);
        assert_eq!(path.max_vertex_id(), 4);
    }

    #[test]
    fn edge_count_and_id_bounds() {
        for (n, m) in [(50u64, 1u64), (200, 2), (500, 3)] {
            let model = ParallelBa::new()
                .nodes(n)
                .edges_per_vertex(m)
                .threads(2)
                .batch_limits(64, 1 << 12);

            let edges = run_and_read(model, 2);
            assert_eq!(edges.len() as u64, model.total_edges());

            let max_id = model.seed_graph().max_vertex_id() + n;
            assert!(edges.iter().all(|&(u, v)| u <= max_id && v <= max_id));

            // the second endpoint of every random edge is the deterministic
            // new vertex of that edge
            let seed_edges = model.seed_graph().number_of_edges() as usize;
            let mut new_vertex_degrees =
                edges[seed_edges..].iter().map(|&(_, v)| v).counts();
            assert_eq!(new_vertex_degrees.len() as u64, n);
            for vertex in 0..n {
                let v = model.seed_graph().max_vertex_id() + 1 + vertex;
                assert_eq!(new_vertex_degrees.remove(&v), Some(m as usize));
            }
        }
    }

    #[test]
    fn deterministic_single_thread() {
        let model = ParallelBa::new()
            .nodes(300)
            .edges_per_vertex(2)
            .threads(1)
            .seed(99)
            .batch_limits(32, 1 << 10);

        let mut a = run_and_read(model, 1);
        let mut b = run_and_read(model, 1);

        a.sort_unstable();
        b.sort_unstable();
        assert_eq!(a, b);
    }

    #[test]
    fn thread_count_preserves_edge_count() {
        for threads in [1usize, 2, 4] {
            let model = ParallelBa::new()
                .nodes(400)
                .edges_per_vertex(2)
                .threads(threads)
                .batch_limits(64, 1 << 11);

            let edges = run_and_read(model, threads);
            assert_eq!(edges.len() as u64, model.total_edges());
        }
    }
}

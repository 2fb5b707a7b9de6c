//! Sequential Barabási–Albert generator.

use rand::Rng;

use crate::{
    edge::{Node, NumEdges, NumNodes},
    em::{ExternalPriorityQueue, ExternalSorter},
    stream::merge_ascending,
    token::Token,
};

use super::{
    circle::InitialCircle, process::ProcessTokens, regular::RegularVertexTokens,
    EdgesPerVertexGen, NumNodesGen, ParameterError,
};

/// Generator for undirected Barabási–Albert preferential attachment graphs.
///
/// The graph starts from a seed circle on `2 * edges_per_vertex` vertices.
/// Each of the `nodes` new vertices then attaches `edges_per_vertex` edges
/// whose second endpoints are sampled proportionally to the current degrees.
/// Degree-proportional sampling is realized positionally: drawing a uniform
/// edge list position and copying whatever vertex ends up there selects
/// every vertex with probability `deg(v) / (2 * edges)`.
///
/// With `edge_dependencies` the sampling weight already grows between the
/// edges of one vertex, so a new vertex may attach to itself; without it,
/// all edges of a vertex sample from the state before the vertex arrived.
///
/// ```
/// use pagg::gens::*;
/// use rand::SeedableRng;
/// use rand_pcg::Pcg64Mcg;
///
/// let rng = &mut Pcg64Mcg::seed_from_u64(1);
/// let ba = Ba::new().nodes(50).edges_per_vertex(3);
/// let vertices: Vec<u64> = ba.vertex_stream(rng).collect();
/// assert_eq!(vertices.len() as u64, 2 * ba.total_edges());
/// ```
#[derive(Debug, Copy, Clone)]
pub struct Ba {
    nodes: NumNodes,
    edges_per_vertex: NumEdges,
    edge_dependencies: bool,
}

impl Default for Ba {
    fn default() -> Self {
        Self {
            nodes: 0,
            edges_per_vertex: 1,
            edge_dependencies: false,
        }
    }
}

impl NumNodesGen for Ba {
    fn set_nodes(&mut self, n: NumNodes) {
        self.nodes = n;
    }
}

impl EdgesPerVertexGen for Ba {
    fn set_edges_per_vertex(&mut self, m: NumEdges) {
        self.edges_per_vertex = m;
    }
}

impl Ba {
    /// Creates a new generator with no vertices configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables weight updates between the edges of one vertex.
    pub fn edge_dependencies(mut self, dependencies: bool) -> Self {
        self.edge_dependencies = dependencies;
        self
    }

    /// Number of seed vertices of the initial circle.
    pub fn number_of_seed_vertices(&self) -> NumNodes {
        2 * self.edges_per_vertex
    }

    /// Total number of edges the generator will emit, seed included.
    pub fn total_edges(&self) -> NumEdges {
        self.number_of_seed_vertices() + self.nodes * self.edges_per_vertex
    }

    /// Checks the configured parameters.
    pub fn validate(&self) -> Result<(), ParameterError> {
        if self.edges_per_vertex == 0 {
            return Err(ParameterError::EmptyModel);
        }
        Ok(())
    }

    /// Produces the unrolled edge list as a flat vertex stream.
    ///
    /// The `(2k)`-th and `(2k+1)`-th vertices form edge `k`; the seed circle
    /// occupies the first positions. See [`crate::stream::EdgeSorter`] for
    /// turning the output into sorted edge pairs.
    ///
    /// # Panics
    /// Panics if [`validate`](Ba::validate) fails.
    pub fn vertex_stream<R>(&self, rng: &mut R) -> impl Iterator<Item = Node>
    where
        R: Rng,
    {
        self.validate().unwrap();

        // Seed tokens for the initial circle
        let seed_tokens = InitialCircle::new(self.number_of_seed_vertices());

        // Predetermined first endpoints of all new edges
        let regular_tokens = RegularVertexTokens::new(
            seed_tokens.max_vertex_id() + 1,
            2 * seed_tokens.number_of_edges(),
            self.nodes,
            self.edges_per_vertex,
        );

        // Random endpoints become query tokens. Sorting them makes each
        // query available at the moment the queried position materializes.
        let mut query_tokens = ExternalSorter::new();

        let mut weight = 2 * seed_tokens.number_of_edges();
        let mut idx = weight + 1;
        for _vertex in 0..self.nodes {
            let mut this_weight = weight;
            for _edge in 0..self.edges_per_vertex {
                query_tokens.push(Token::query(rng.random_range(0..this_weight), idx));
                this_weight += 2 * self.edge_dependencies as u64;
                idx += 2;
            }

            weight += 2 * self.edges_per_vertex;
        }
        query_tokens.sort();

        let merged = merge_ascending(
            regular_tokens,
            merge_ascending(query_tokens, seed_tokens),
        );

        ProcessTokens::new(merged, ExternalPriorityQueue::new())
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;
    use rand::SeedableRng;
    use rand_pcg::Pcg64Mcg;

    use crate::{edge::Edge, stream::{EdgeFilter, EdgeSorter}};

    use super::*;

    #[test]
    fn seed_only() {
        let rng = &mut Pcg64Mcg::seed_from_u64(1);

        // no new vertices: the output is exactly the 4-vertex seed cycle
        let ba = Ba::new().nodes(0).edges_per_vertex(2);
        assert_eq!(ba.total_edges(), 4);

        let edges = EdgeSorter::new(ba.vertex_stream(rng)).collect_vec();
        assert_eq!(
            edges,
            vec![Edge(0, 1), Edge(1, 2), Edge(2, 3), Edge(3, 0)]
        );
    }

    #[test]
    fn tiny_graph() {
        let ba = Ba::new().nodes(2).edges_per_vertex(1);
        assert_eq!(ba.number_of_seed_vertices(), 2);
        assert_eq!(ba.total_edges(), 4);

        let rng = &mut Pcg64Mcg::seed_from_u64(7);
        let vertices = ba.vertex_stream(rng).collect_vec();

        assert_eq!(vertices.len(), 8);
        assert!(vertices.iter().all(|&v| v <= 3));

        // two runs with the same seed agree
        let rng = &mut Pcg64Mcg::seed_from_u64(7);
        assert_eq!(ba.vertex_stream(rng).collect_vec(), vertices);
    }

    #[test]
    fn edge_count_and_id_bounds() {
        let rng = &mut Pcg64Mcg::seed_from_u64(3);

        for (n, m) in [(1u64, 1u64), (10, 1), (10, 3), (100, 2), (500, 4)] {
            for deps in [false, true] {
                let ba = Ba::new()
                    .nodes(n)
                    .edges_per_vertex(m)
                    .edge_dependencies(deps);

                let vertices = ba.vertex_stream(rng).collect_vec();
                assert_eq!(vertices.len() as u64, 2 * (2 * m + n * m));

                let max_id = ba.number_of_seed_vertices() + n - 1;
                assert!(vertices.iter().all(|&v| v <= max_id));

                // every new vertex occurs at least edges_per_vertex times
                let counts = vertices.iter().counts();
                for v in 2 * m..=max_id {
                    assert!(*counts.get(&v).unwrap() as u64 >= m);
                }
            }
        }
    }

    #[test]
    fn filters_apply() {
        let rng = &mut Pcg64Mcg::seed_from_u64(4);

        let ba = Ba::new()
            .nodes(200)
            .edges_per_vertex(2)
            .edge_dependencies(true);

        let edges = EdgeFilter::new(
            EdgeSorter::new(ba.vertex_stream(rng)),
            true,
            true,
        )
        .collect_vec();

        assert!(edges.iter().all(|e| !e.is_loop()));
        assert!(edges.iter().tuple_windows().all(|(a, b)| a < b));
    }

    #[test]
    fn rejects_zero_edges_per_vertex() {
        assert_eq!(
            Ba::new().nodes(5).edges_per_vertex(0).validate(),
            Err(ParameterError::EmptyModel)
        );
    }
}

//! Directed preferential attachment after Bollobás, Borgs, Chayes, Riordan.

use rand::Rng;

use crate::{
    edge::{Node, NumEdges, NumNodes},
    em::{ExternalPriorityQueue, ExternalSorter},
    stream::merge_ascending,
    token::Token,
};

use super::{circle::InitialCircle, process::ProcessTokens, NumEdgesGen, ParameterError};

/// Which degree distribution an endpoint is sampled from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Endpoint {
    /// Sample proportionally to in-degrees (odd edge list positions).
    In,
    /// Sample proportionally to out-degrees (even edge list positions).
    Out,
}

/// Generator for directed scale-free graphs.
///
/// Implements the model of *"Directed Scale-Free Graphs"* by Bollobás,
/// Borgs, Chayes and Riordan. Each new edge takes one of three forms, chosen
/// with the (normalized) probabilities `alpha`, `beta`, `gamma`:
///
/// - `alpha`: a new vertex with an outgoing edge to an existing vertex,
/// - `beta`: an edge between two existing vertices,
/// - `gamma`: a new vertex with an incoming edge from an existing vertex.
///
/// Existing endpoints are sampled by preferential attachment on the in-
/// respectively out-degrees, shifted by the offsets `delta_in` / `delta_out`
/// which mix in a uniform choice.
///
/// The graph starts from a seed circle, interpreted as directed edges along
/// the cycle.
///
/// ```
/// use pagg::gens::*;
/// use rand::SeedableRng;
/// use rand_pcg::Pcg64Mcg;
///
/// let rng = &mut Pcg64Mcg::seed_from_u64(5);
/// let bbcr = Bbcr::new().edges(100).seed_vertices(3);
/// let vertices: Vec<u64> = bbcr.vertex_stream(rng).collect();
/// assert_eq!(vertices.len(), 2 * (100 + 3));
/// ```
#[derive(Debug, Copy, Clone)]
pub struct Bbcr {
    number_of_edges: NumEdges,
    seed_vertices: NumNodes,
    alpha: f64,
    beta: f64,
    gamma: f64,
    offset_in: f64,
    offset_out: f64,
}

impl Default for Bbcr {
    fn default() -> Self {
        Self {
            number_of_edges: 0,
            seed_vertices: 2,
            alpha: 0.1,
            beta: 0.8,
            gamma: 0.1,
            offset_in: 0.0,
            offset_out: 0.0,
        }
    }
}

impl NumEdgesGen for Bbcr {
    fn set_edges(&mut self, m: NumEdges) {
        self.number_of_edges = m;
    }
}

impl Bbcr {
    /// Creates a generator with the default parameters
    /// `(alpha, beta, gamma) = (0.1, 0.8, 0.1)` and zero offsets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of seed vertices (at least two).
    pub fn seed_vertices(mut self, n: NumNodes) -> Self {
        self.seed_vertices = n;
        self
    }

    /// Sets the relative probabilities of the three edge forms.
    ///
    /// The values are normalized to sum one during generation.
    pub fn probabilities(mut self, alpha: f64, beta: f64, gamma: f64) -> Self {
        self.alpha = alpha;
        self.beta = beta;
        self.gamma = gamma;
        self
    }

    /// Sets the in- and out-degree offsets.
    pub fn degree_offsets(mut self, delta_in: f64, delta_out: f64) -> Self {
        self.offset_in = delta_in;
        self.offset_out = delta_out;
        self
    }

    /// Total number of edges the generator will emit, seed included.
    pub fn total_edges(&self) -> NumEdges {
        self.seed_vertices + self.number_of_edges
    }

    /// Checks the configured parameters.
    pub fn validate(&self) -> Result<(), ParameterError> {
        if self.number_of_edges == 0 {
            return Err(ParameterError::NoEdges);
        }
        if self.seed_vertices < 2 {
            return Err(ParameterError::TooFewSeedVertices);
        }
        if self.alpha < 0.0
            || self.beta < 0.0
            || self.gamma < 0.0
            || self.alpha + self.beta + self.gamma < 1e-9
        {
            return Err(ParameterError::InvalidProbabilities);
        }
        if self.offset_in < 0.0 || self.offset_out < 0.0 {
            return Err(ParameterError::NegativeOffset);
        }
        Ok(())
    }

    /// Produces the unrolled edge list as a flat vertex stream.
    ///
    /// Even positions carry the out-endpoint (source) and odd positions the
    /// in-endpoint (target) of each directed edge.
    ///
    /// # Panics
    /// Panics if [`validate`](Bbcr::validate) fails.
    pub fn vertex_stream<R>(&self, rng: &mut R) -> impl Iterator<Item = Node>
    where
        R: Rng,
    {
        self.validate().unwrap();

        let seed_tokens = InitialCircle::new(self.seed_vertices);

        let mut model_tokens = ExternalSorter::new();
        self.populate(
            rng,
            &mut model_tokens,
            seed_tokens.max_vertex_id() + 1,
            2 * seed_tokens.number_of_edges(),
        );
        model_tokens.sort();

        let merged = merge_ascending(model_tokens, seed_tokens);

        ProcessTokens::new(merged, ExternalPriorityQueue::new())
    }

    /// Fills `sorter` with two tokens per edge.
    fn populate<R>(
        &self,
        rng: &mut R,
        sorter: &mut ExternalSorter<Token>,
        first_vertex: Node,
        first_token_id: u64,
    ) where
        R: Rng,
    {
        let norm = self.alpha + self.beta + self.gamma;
        let alpha = self.alpha / norm;
        let beta = self.beta / norm;

        let mut vertex_id = first_vertex;
        let mut token_id = first_token_id;

        let max_token_id = token_id + 2 * self.number_of_edges;
        while token_id < max_token_id {
            // an edge always starts at an even position
            debug_assert_eq!(token_id & 1, 0);

            let mode: f64 = rng.random();

            if mode < alpha {
                // new vertex with an outgoing edge
                sorter.push(Token::link(token_id, vertex_id));
                token_id += 1;
                sorter.push(self.random_endpoint(rng, Endpoint::In, vertex_id, &mut token_id));
                vertex_id += 1;
            } else if mode < alpha + beta {
                // link two existing vertices
                sorter.push(self.random_endpoint(rng, Endpoint::Out, vertex_id, &mut token_id));
                sorter.push(self.random_endpoint(rng, Endpoint::In, vertex_id, &mut token_id));
            } else {
                // new vertex with an incoming edge
                sorter.push(self.random_endpoint(rng, Endpoint::Out, vertex_id, &mut token_id));
                sorter.push(Token::link(token_id, vertex_id));
                token_id += 1;
                vertex_id += 1;
            }
        }
    }

    /// Samples a token for one endpoint of an edge among existing vertices.
    ///
    /// With probability `V * delta / (V * delta + i / 2)` the vertex is
    /// chosen uniformly and written directly. Otherwise a uniform edge list
    /// position is queried; forcing the position odd (in) or even (out)
    /// selects a vertex proportionally to its in- or out-degree.
    fn random_endpoint<R>(
        &self,
        rng: &mut R,
        endpoint: Endpoint,
        vertex_id: Node,
        token_id: &mut u64,
    ) -> Token
    where
        R: Rng,
    {
        let offset = match endpoint {
            Endpoint::In => self.offset_in,
            Endpoint::Out => self.offset_out,
        };

        let uniform_prob =
            (vertex_id as f64 * offset) / (vertex_id as f64 * offset + (*token_id / 2) as f64);

        let token = if offset > 0.0 && rng.random::<f64>() < uniform_prob {
            Token::link(*token_id, rng.random_range(0..vertex_id + 1))
        } else {
            let mut position = rng.random_range(0..(*token_id & !1));
            match endpoint {
                Endpoint::In => position |= 1,
                Endpoint::Out => position &= !1,
            }

            Token::query(position, *token_id)
        };

        *token_id += 1;
        token
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;
    use rand::SeedableRng;
    use rand_pcg::Pcg64Mcg;

    use crate::{edge::Edge, stream::EdgeSorter};

    use super::*;

    #[test]
    fn edge_count_and_id_bounds() {
        let rng = &mut Pcg64Mcg::seed_from_u64(9);

        for edges in [1u64, 10, 100, 1000] {
            for seed_verts in [2u64, 5] {
                let bbcr = Bbcr::new().edges(edges).seed_vertices(seed_verts);

                let vertices = bbcr.vertex_stream(rng).collect_vec();
                assert_eq!(vertices.len() as u64, 2 * bbcr.total_edges());

                // at most one new vertex per random edge
                assert!(vertices.iter().all(|&v| v < seed_verts + edges));
            }
        }
    }

    #[test]
    fn deterministic_under_fixed_seed() {
        let bbcr = Bbcr::new()
            .edges(200)
            .seed_vertices(4)
            .probabilities(0.2, 0.6, 0.2)
            .degree_offsets(1.0, 0.5);

        let a = bbcr
            .vertex_stream(&mut Pcg64Mcg::seed_from_u64(13))
            .collect_vec();
        let b = bbcr
            .vertex_stream(&mut Pcg64Mcg::seed_from_u64(13))
            .collect_vec();

        assert_eq!(a, b);
    }

    #[test]
    fn pure_alpha_is_a_star_of_sources() {
        // alpha = 1: every edge adds a new vertex with an outgoing edge, so
        // every even position holds a fresh vertex id
        let rng = &mut Pcg64Mcg::seed_from_u64(17);

        let bbcr = Bbcr::new()
            .edges(50)
            .seed_vertices(2)
            .probabilities(1.0, 0.0, 0.0);

        let vertices = bbcr.vertex_stream(rng).collect_vec();
        let sources = vertices.iter().skip(4).step_by(2).copied().collect_vec();
        assert_eq!(sources, (2..52u64).collect_vec());
    }

    #[test]
    fn probabilities_are_normalized() {
        // scaling all three probabilities must not change the result
        let a = Bbcr::new()
            .edges(100)
            .probabilities(0.1, 0.8, 0.1)
            .vertex_stream(&mut Pcg64Mcg::seed_from_u64(21))
            .collect_vec();
        let b = Bbcr::new()
            .edges(100)
            .probabilities(1.0, 8.0, 1.0)
            .vertex_stream(&mut Pcg64Mcg::seed_from_u64(21))
            .collect_vec();

        assert_eq!(a, b);
    }

    #[test]
    fn sorted_output_is_usable_as_directed_edges() {
        let rng = &mut Pcg64Mcg::seed_from_u64(23);

        let bbcr = Bbcr::new().edges(300).seed_vertices(3);
        let edges: Vec<Edge> = EdgeSorter::new(bbcr.vertex_stream(rng)).collect_vec();

        assert_eq!(edges.len() as u64, bbcr.total_edges());
        assert!(edges.iter().tuple_windows().all(|(a, b)| a <= b));
    }

    #[test]
    fn validation() {
        assert_eq!(
            Bbcr::new().edges(0).validate(),
            Err(ParameterError::NoEdges)
        );
        assert_eq!(
            Bbcr::new().edges(5).seed_vertices(1).validate(),
            Err(ParameterError::TooFewSeedVertices)
        );
        assert_eq!(
            Bbcr::new().edges(5).probabilities(-0.1, 0.5, 0.5).validate(),
            Err(ParameterError::InvalidProbabilities)
        );
        assert_eq!(
            Bbcr::new().edges(5).probabilities(0.0, 0.0, 0.0).validate(),
            Err(ParameterError::InvalidProbabilities)
        );
        assert_eq!(
            Bbcr::new().edges(5).degree_offsets(-1.0, 0.0).validate(),
            Err(ParameterError::NegativeOffset)
        );
        assert!(Bbcr::new().edges(5).validate().is_ok());
    }
}

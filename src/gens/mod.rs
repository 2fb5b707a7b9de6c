/*!
# Graph Generators

This module provides the preferential attachment models and the token
machinery that drives them.

Generators are configurable structs following the *Builder* / *Setter*
pattern: configure the model with `.nodes(n) / .edges_per_vertex(m) / ...`,
then produce output with an explicit random number generator.

```
use pagg::gens::*;
use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

let rng = &mut Pcg64Mcg::seed_from_u64(42);
let vertices: Vec<u64> = Ba::new()
    .nodes(10)
    .edges_per_vertex(2)
    .vertex_stream(rng)
    .collect();
assert_eq!(vertices.len() as u64, 2 * (4 + 10 * 2));
```

Supported models:
- [`Ba`]: undirected Barabási–Albert, sequential external-memory pipeline.
- [`ParallelBa`]: undirected Barabási–Albert, multi-threaded batch driver.
- [`Bbcr`]: directed scale-free graphs after Bollobás, Borgs, Chayes and
  Riordan.
*/

use thiserror::Error;

use crate::edge::{NumEdges, NumNodes};

pub mod ba;
pub mod bbcr;
pub mod circle;
pub mod pba;
pub mod process;
pub mod regular;

pub use ba::Ba;
pub use bbcr::Bbcr;
pub use circle::InitialCircle;
pub use pba::{ParallelBa, RagPath};
pub use process::ProcessTokens;
pub use regular::RegularVertexTokens;

/// Rejected model configurations.
///
/// Generators validate their parameters before producing anything; the
/// binaries map these errors to a usage message and a failure exit code.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParameterError {
    /// Both the vertex count and the per-vertex edge count must be positive.
    #[error("number of vertices and edges per vertex must be positive")]
    EmptyModel,

    /// The model requires a positive number of edges.
    #[error("number of edges must be positive")]
    NoEdges,

    /// All probabilities must be non-negative with a positive sum.
    #[error("alpha, beta, gamma must be non-negative with a positive sum")]
    InvalidProbabilities,

    /// Degree offsets must be non-negative.
    #[error("degree offsets must be non-negative")]
    NegativeOffset,

    /// The directed model needs at least two seed vertices.
    #[error("at least two seed vertices are required")]
    TooFewSeedVertices,
}

/// Trait for generators that allow specifying the number of new vertices.
pub trait NumNodesGen: Sized {
    /// Sets the number of vertices in the generator (mutable setter).
    fn set_nodes(&mut self, n: NumNodes);

    /// Sets the number of vertices and returns the generator (builder style).
    fn nodes(mut self, n: NumNodes) -> Self {
        self.set_nodes(n);
        self
    }
}

/// Trait for generators that allow specifying the total number of edges.
pub trait NumEdgesGen: Sized {
    /// Sets the number of edges in the generator (mutable setter).
    fn set_edges(&mut self, m: NumEdges);

    /// Sets the number of edges and returns the generator (builder style).
    fn edges(mut self, m: NumEdges) -> Self {
        self.set_edges(m);
        self
    }
}

/// Trait for generators that attach a fixed number of edges per new vertex.
pub trait EdgesPerVertexGen: Sized {
    /// Sets the per-vertex edge count (mutable setter).
    fn set_edges_per_vertex(&mut self, m: NumEdges);

    /// Sets the per-vertex edge count and returns the generator (builder style).
    fn edges_per_vertex(mut self, m: NumEdges) -> Self {
        self.set_edges_per_vertex(m);
        self
    }
}

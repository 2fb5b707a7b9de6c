/*!
`pagg` generates massive preferential attachment graphs whose edge lists may
greatly exceed main memory.

Instead of keeping an adjacency structure around to answer "pick a random
neighbor weighted by degree", the generators emit a linear sequence of
[`Token`](crate::token::Token)s. Run through a pipeline of external sorter,
priority queue, and merger stages, the tokens materialize each vertex at the
correct position of an on-disk edge list. See *"Generating Massive Scale-Free
Networks under Resource Constraints"* by U. Meyer and M. Penschuck for the
underlying technique.

# Models

- [`Ba`](crate::gens::Ba): the undirected Barabási–Albert model, processed
  by a single thread through an external sorter and priority queue.
- [`ParallelBa`](crate::gens::ParallelBa): the same model driven by a batch
  loop over a shared priority queue, processing chunks on a thread pool.
- [`Bbcr`](crate::gens::Bbcr): the directed model of Bollobás, Borgs,
  Chayes and Riordan.

# Design

All pipeline stages are lazy [`Iterator`]s that are composed by value and
monomorphized per model, so the hot loops contain no virtual dispatch.
Randomness is never global; every generator takes `&mut R` where `R:`[`Rng`],
and tests seed a [`Pcg64Mcg`] for reproducibility.

```
use pagg::gens::*;
use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

let rng = &mut Pcg64Mcg::seed_from_u64(42);
let ba = Ba::new().nodes(100).edges_per_vertex(2);
assert_eq!(ba.vertex_stream(rng).count() as u64, 2 * ba.total_edges());
```

[`Rng`]: rand::Rng
[`Pcg64Mcg`]: rand_pcg::Pcg64Mcg
*/

pub mod edge;
pub mod em;
pub mod gens;
pub mod io;
pub mod stream;
pub mod token;
pub mod utils;

/// `pagg::prelude` exposes the vertex and edge types together with the token
/// algebra used by all generators.
pub mod prelude {
    pub use super::{edge::*, token::*};
}

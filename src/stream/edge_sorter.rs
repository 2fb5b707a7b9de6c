//! Pairs up a flat vertex stream and sorts the resulting edges.

use crate::{
    edge::{Edge, Node},
    em::ExternalSorter,
};

/// Combines consecutive vertices of a stream into edges and sorts them
/// lexicographically through an [`ExternalSorter`].
///
/// The `(2k)`-th and `(2k+1)`-th input values form edge `k`; the caller
/// guarantees an even number of input values.
///
/// # Example
/// ```
/// use pagg::{edge::Edge, stream::EdgeSorter};
///
/// let sorted = EdgeSorter::new([3u64, 1, 0, 2, 0, 1].into_iter());
/// assert_eq!(
///     sorted.collect::<Vec<_>>(),
///     vec![Edge(0, 1), Edge(0, 2), Edge(3, 1)]
/// );
/// ```
pub struct EdgeSorter {
    sorter: ExternalSorter<Edge>,
}

impl EdgeSorter {
    /// Consumes the vertex stream and sorts all edges.
    ///
    /// # Panics
    /// Panics if the stream yields an odd number of vertices.
    pub fn new<I>(vertices: I) -> Self
    where
        I: Iterator<Item = Node>,
    {
        Self::with_capacity(vertices, crate::em::sorter::DEFAULT_SORTER_CAPACITY)
    }

    /// As [`new`](EdgeSorter::new) with an explicit sorter RAM budget.
    pub fn with_capacity<I>(mut vertices: I, capacity: usize) -> Self
    where
        I: Iterator<Item = Node>,
    {
        let mut sorter = ExternalSorter::with_capacity(capacity);

        while let Some(u) = vertices.next() {
            let v = vertices
                .next()
                .expect("vertex stream must yield an even number of values");
            sorter.push(Edge(u, v));
        }

        sorter.sort();
        Self { sorter }
    }

    /// Number of edges formed from the input.
    pub fn number_of_edges(&self) -> u64 {
        self.sorter.len()
    }
}

impl Iterator for EdgeSorter {
    type Item = Edge;

    fn next(&mut self) -> Option<Edge> {
        self.sorter.next()
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg64Mcg;

    use super::*;

    #[test]
    fn empty() {
        let sorted = EdgeSorter::new(std::iter::empty());
        assert_eq!(sorted.count(), 0);
    }

    #[test]
    fn pairs_and_sorts() {
        let rng = &mut Pcg64Mcg::seed_from_u64(6);

        let vertices = (0..1000)
            .map(|_| rng.random_range(0..100u64))
            .collect_vec();

        let mut expected = vertices
            .iter()
            .tuples()
            .map(|(&u, &v)| Edge(u, v))
            .collect_vec();
        expected.sort_unstable();

        let sorter = EdgeSorter::with_capacity(vertices.into_iter(), 32);
        assert_eq!(sorter.number_of_edges(), 500);
        assert_eq!(sorter.collect_vec(), expected);
    }

    #[test]
    #[should_panic(expected = "even number of values")]
    fn odd_input_panics() {
        EdgeSorter::new([1u64, 2, 3].into_iter());
    }
}

//! Filter for self-loops and multi-edges in an edge stream.

use crate::edge::Edge;

/// Drops self-loops and collapses repeated edges.
///
/// Multi-edge suppression only compares *consecutive* edges, so it requires
/// a lexicographically sorted input; the first occurrence of a repeated pair
/// is kept. With both options off the filter is a pass-through.
///
/// # Example
/// ```
/// use pagg::{edge::Edge, stream::EdgeFilter};
///
/// let edges = [Edge(0, 0), Edge(0, 1), Edge(0, 1), Edge(1, 2), Edge(2, 2)];
/// let filtered = EdgeFilter::new(edges.into_iter(), true, true);
/// assert_eq!(filtered.collect::<Vec<_>>(), vec![Edge(0, 1), Edge(1, 2)]);
/// ```
pub struct EdgeFilter<I>
where
    I: Iterator<Item = Edge>,
{
    input: I,
    self_loops: bool,
    multi_edges: bool,
    last: Option<Edge>,
}

impl<I> EdgeFilter<I>
where
    I: Iterator<Item = Edge>,
{
    /// Creates a filter; `self_loops` and `multi_edges` select what to drop.
    pub fn new(input: I, self_loops: bool, multi_edges: bool) -> Self {
        Self {
            input,
            self_loops,
            multi_edges,
            last: None,
        }
    }
}

impl<I> Iterator for EdgeFilter<I>
where
    I: Iterator<Item = Edge>,
{
    type Item = Edge;

    fn next(&mut self) -> Option<Edge> {
        loop {
            let edge = self.input.next()?;

            if self.self_loops && edge.is_loop() {
                continue;
            }
            if self.multi_edges && self.last == Some(edge) {
                continue;
            }

            self.last = Some(edge);
            return Some(edge);
        }
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;

    fn edges() -> Vec<Edge> {
        vec![Edge(0, 0), Edge(0, 1), Edge(0, 1), Edge(1, 2), Edge(2, 2)]
    }

    #[test]
    fn pass_through() {
        let filtered = EdgeFilter::new(edges().into_iter(), false, false);
        assert_eq!(filtered.collect_vec(), edges());
    }

    #[test]
    fn self_loops_only() {
        let filtered = EdgeFilter::new(edges().into_iter(), true, false);
        assert_eq!(
            filtered.collect_vec(),
            vec![Edge(0, 1), Edge(0, 1), Edge(1, 2)]
        );
    }

    #[test]
    fn multi_edges_only() {
        let filtered = EdgeFilter::new(edges().into_iter(), false, true);
        assert_eq!(
            filtered.collect_vec(),
            vec![Edge(0, 0), Edge(0, 1), Edge(1, 2), Edge(2, 2)]
        );
    }

    #[test]
    fn both_flags() {
        let filtered = EdgeFilter::new(edges().into_iter(), true, true);
        assert_eq!(filtered.collect_vec(), vec![Edge(0, 1), Edge(1, 2)]);
    }

    #[test]
    fn repeated_run_collapses_to_one() {
        let input = vec![Edge(3, 4); 6];
        let filtered = EdgeFilter::new(input.into_iter(), false, true);
        assert_eq!(filtered.collect_vec(), vec![Edge(3, 4)]);
    }
}

//! Deterministic "create" tokens for the new vertices of a BA graph.

use crate::{edge::Node, token::Token};

/// Emits the predetermined first endpoint of every new edge.
///
/// In the Barabási–Albert model each new vertex starts all of its edges, so
/// the vertex ids at the even edge list positions are known upfront: vertex
/// `first_vertex` is written `edges_per_vertex` times starting at position
/// `first_edge_list_idx`, then the next vertex, and so on. Positions advance
/// by two because the odd positions are resolved by query tokens.
pub struct RegularVertexTokens {
    vertex_end: Node,
    edges_per_vertex: u64,
    current_vertex: Node,
    current_edge: u64,
    edge_list_idx: u64,
}

impl RegularVertexTokens {
    /// Creates the stream for `number_of_vertices` new vertices starting at
    /// `first_vertex`, whose first token targets `first_edge_list_idx`.
    pub fn new(
        first_vertex: Node,
        first_edge_list_idx: u64,
        number_of_vertices: u64,
        edges_per_vertex: u64,
    ) -> Self {
        Self {
            vertex_end: first_vertex + number_of_vertices,
            edges_per_vertex,
            current_vertex: first_vertex,
            current_edge: 0,
            edge_list_idx: first_edge_list_idx,
        }
    }
}

impl Iterator for RegularVertexTokens {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.current_vertex >= self.vertex_end {
            return None;
        }

        let token = Token::link(self.edge_list_idx, self.current_vertex);
        self.edge_list_idx += 2;

        self.current_edge += 1;
        if self.current_edge >= self.edges_per_vertex {
            self.current_vertex += 1;
            self.current_edge = 0;
        }

        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;

    #[test]
    fn empty() {
        assert_eq!(RegularVertexTokens::new(4, 8, 0, 2).count(), 0);
    }

    #[test]
    fn multiplicity_and_positions() {
        let tokens = RegularVertexTokens::new(4, 8, 3, 2).collect_vec();

        let expected = vec![
            Token::link(8, 4),
            Token::link(10, 4),
            Token::link(12, 5),
            Token::link(14, 5),
            Token::link(16, 6),
            Token::link(18, 6),
        ];
        assert_eq!(tokens, expected);
    }

    #[test]
    fn single_edge_per_vertex() {
        let tokens = RegularVertexTokens::new(0, 0, 4, 1).collect_vec();
        assert_eq!(
            tokens.iter().map(|t| t.value()).collect_vec(),
            vec![0, 1, 2, 3]
        );
        assert_eq!(
            tokens.iter().map(|t| t.index()).collect_vec(),
            vec![0, 2, 4, 6]
        );
    }
}

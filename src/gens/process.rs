//! Main loop of token processing: materialize vertices and answer queries.

use std::iter::Peekable;

use crate::{edge::Node, em::ExternalPriorityQueue, token::Token};

/// Walks a merged token sequence and emits the unrolled edge list.
///
/// Link tokens write their vertex into the edge list; query tokens look up
/// the vertex most recently written and schedule it for their target
/// position by pushing a fresh link token into the priority queue. Both the
/// input stream and the queue are ascending, so at every step the smaller
/// front of the two decides which token is processed next.
///
/// The output is the flat vertex stream of the edge list: the `(2k)`-th and
/// `(2k+1)`-th emitted vertices form edge `k`.
///
/// A query referring to position `j` is always processed directly after the
/// link that wrote position `j`; this is an invariant of the token sequences
/// the models produce and is checked in debug builds.
pub struct ProcessTokens<S>
where
    S: Iterator<Item = Token>,
{
    stream: Peekable<S>,
    prio_queue: ExternalPriorityQueue<Token>,
    current_idx: u64,
    last_vertex: Node,
}

impl<S> ProcessTokens<S>
where
    S: Iterator<Item = Token>,
{
    /// Creates a processor over `stream`, scheduling future links in `pq`.
    ///
    /// The queue is usually empty at this point; passing one in lets the
    /// caller choose its RAM budget.
    pub fn new(stream: S, prio_queue: ExternalPriorityQueue<Token>) -> Self {
        Self {
            stream: stream.peekable(),
            prio_queue,
            current_idx: 0,
            last_vertex: 0,
        }
    }

    /// Processes one token; returns the materialized vertex for links and
    /// `None` for queries.
    fn process_token(&mut self, token: Token) -> Option<Node> {
        if token.is_query() {
            // the referenced position must be the one just written
            debug_assert_eq!(self.current_idx - 1, token.index());

            self.prio_queue
                .push(Token::link(token.value(), self.last_vertex));
            None
        } else {
            self.last_vertex = token.value();
            self.current_idx += 1;
            Some(self.last_vertex)
        }
    }
}

impl<S> Iterator for ProcessTokens<S>
where
    S: Iterator<Item = Token>,
{
    type Item = Node;

    fn next(&mut self) -> Option<Node> {
        loop {
            let take_stream = match (self.stream.peek(), self.prio_queue.peek()) {
                (None, None) => return None,
                (Some(_), None) => true,
                (None, Some(_)) => false,
                (Some(s), Some(q)) => s < q,
            };

            let token = if take_stream {
                self.stream.next().unwrap()
            } else {
                self.prio_queue.pop().unwrap()
            };

            if let Some(vertex) = self.process_token(token) {
                return Some(vertex);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;

    fn process(tokens: Vec<Token>) -> Vec<Node> {
        ProcessTokens::new(
            tokens.into_iter(),
            ExternalPriorityQueue::with_capacity(16),
        )
        .collect_vec()
    }

    #[test]
    fn links_only() {
        let tokens = vec![
            Token::link(0, 5),
            Token::link(1, 6),
            Token::link(2, 7),
            Token::link(3, 5),
        ];
        assert_eq!(process(tokens), vec![5, 6, 7, 5]);
    }

    #[test]
    fn query_copies_last_vertex() {
        // position 0 writes vertex 9; the query schedules it for position 3
        let tokens = vec![
            Token::link(0, 9),
            Token::query(0, 3),
            Token::link(1, 4),
            Token::link(2, 8),
        ];
        assert_eq!(process(tokens), vec![9, 4, 8, 9]);
    }

    #[test]
    fn chained_queries() {
        // the link scheduled by the first query is itself queried again
        let tokens = vec![
            Token::link(0, 7),
            Token::query(0, 1),
            Token::query(1, 3),
            Token::link(2, 2),
        ];
        assert_eq!(process(tokens), vec![7, 7, 2, 7]);
    }

    #[test]
    fn multiple_queries_on_one_position() {
        let tokens = vec![
            Token::link(0, 3),
            Token::query(0, 2),
            Token::query(0, 5),
            Token::link(1, 1),
            Token::link(3, 0),
            Token::link(4, 6),
        ];
        assert_eq!(process(tokens), vec![3, 1, 3, 0, 6, 3]);
    }

    #[test]
    fn empty_input() {
        assert_eq!(process(Vec::new()), Vec::<Node>::new());
    }
}

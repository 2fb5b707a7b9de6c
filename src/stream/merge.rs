//! Merger for ascending streams under a caller-supplied comparator.

/// Merges two ascending streams into one ascending stream.
///
/// On every step the smaller of the two front values under `less` is
/// emitted; ties prefer the first stream. The output is ascending iff both
/// inputs are. Mergers over more than two streams are built by nesting,
/// which keeps every comparison monomorphized.
///
/// # Example
/// ```
/// use pagg::stream::merge_ascending;
///
/// let merged = merge_ascending(vec![1, 4, 9].into_iter(), vec![2, 3, 10].into_iter());
/// assert_eq!(merged.collect::<Vec<_>>(), vec![1, 2, 3, 4, 9, 10]);
/// ```
pub struct MergeBy<A, B, F>
where
    A: Iterator,
    B: Iterator<Item = A::Item>,
{
    a: A,
    b: B,
    front_a: Option<A::Item>,
    front_b: Option<A::Item>,
    less: F,
}

/// A [`MergeBy`] over the natural ascending order.
pub type MergeAscending<A, B> =
    MergeBy<A, B, fn(&<A as Iterator>::Item, &<A as Iterator>::Item) -> bool>;

impl<A, B, F> MergeBy<A, B, F>
where
    A: Iterator,
    B: Iterator<Item = A::Item>,
    F: FnMut(&A::Item, &A::Item) -> bool,
{
    /// Creates a merger with a strict-less comparator.
    pub fn new(mut a: A, mut b: B, less: F) -> Self {
        let front_a = a.next();
        let front_b = b.next();

        Self {
            a,
            b,
            front_a,
            front_b,
            less,
        }
    }
}

/// Shorthand for merging two streams of an [`Ord`] item type.
pub fn merge_ascending<A, B>(a: A, b: B) -> MergeAscending<A, B>
where
    A: Iterator,
    B: Iterator<Item = A::Item>,
    A::Item: Ord,
{
    fn less<T: Ord>(x: &T, y: &T) -> bool {
        x < y
    }

    MergeBy::new(a, b, less::<A::Item> as fn(&A::Item, &A::Item) -> bool)
}

impl<A, B, F> Iterator for MergeBy<A, B, F>
where
    A: Iterator,
    B: Iterator<Item = A::Item>,
    F: FnMut(&A::Item, &A::Item) -> bool,
{
    type Item = A::Item;

    fn next(&mut self) -> Option<Self::Item> {
        let take_b = match (&self.front_a, &self.front_b) {
            (None, None) => return None,
            (None, Some(_)) => true,
            (Some(_), None) => false,
            (Some(x), Some(y)) => (self.less)(y, x),
        };

        if take_b {
            std::mem::replace(&mut self.front_b, self.b.next())
        } else {
            std::mem::replace(&mut self.front_a, self.a.next())
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (lo_a, hi_a) = self.a.size_hint();
        let (lo_b, hi_b) = self.b.size_hint();
        let fronts = self.front_a.is_some() as usize + self.front_b.is_some() as usize;

        (
            lo_a + lo_b + fronts,
            hi_a.zip(hi_b).map(|(a, b)| a + b + fronts),
        )
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg64Mcg;

    use crate::token::Token;

    use super::*;

    #[test]
    fn empty_inputs() {
        let merged = merge_ascending(std::iter::empty::<u64>(), std::iter::empty());
        assert_eq!(merged.count(), 0);

        let merged = merge_ascending(vec![1u64, 2].into_iter(), std::iter::empty());
        assert_eq!(merged.collect_vec(), vec![1, 2]);

        let merged = merge_ascending(std::iter::empty(), vec![1u64, 2].into_iter());
        assert_eq!(merged.collect_vec(), vec![1, 2]);
    }

    #[test]
    fn ties_prefer_first_stream() {
        let a = vec![(0u64, 'a'), (1, 'a')].into_iter();
        let b = vec![(0u64, 'b'), (1, 'b')].into_iter();

        let merged = MergeBy::new(a, b, |x, y| x.0 < y.0);
        assert_eq!(
            merged.collect_vec(),
            vec![(0, 'a'), (0, 'b'), (1, 'a'), (1, 'b')]
        );
    }

    /// Distribute `[0..n)` randomly over three streams and check that the
    /// nested merger restores the full interval in order.
    #[test]
    fn coverage_three_streams() {
        let rng = &mut Pcg64Mcg::seed_from_u64(3);

        for _ in 0..10 {
            let n = 1024 + rng.random_range(0..1000u64);

            let mut streams: [Vec<u64>; 3] = Default::default();
            for x in 0..n {
                streams[rng.random_range(0..3usize)].push(x);
            }

            let [s0, s1, s2] = streams;
            let merged = merge_ascending(
                s0.into_iter(),
                merge_ascending(s1.into_iter(), s2.into_iter()),
            );

            assert_eq!(merged.collect_vec(), (0..n).collect_vec());
        }
    }

    #[test]
    fn merges_sorted_tokens() {
        let rng = &mut Pcg64Mcg::seed_from_u64(4);

        let mut a = (0..100)
            .map(|_| {
                Token::new(
                    rng.random_bool(0.5),
                    rng.random_range(0..30),
                    rng.random_range(0..30),
                )
            })
            .collect_vec();
        let mut b = a.split_off(40);
        a.sort_unstable();
        b.sort_unstable();

        let merged = merge_ascending(a.into_iter(), b.into_iter());
        for (x, y) in merged.tuple_windows() {
            assert!(x <= y);
        }
    }
}

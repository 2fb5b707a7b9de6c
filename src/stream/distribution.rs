//! Run-length encoding of equal values in a sorted stream.

use std::iter::Peekable;

/// One block of equal values reported by [`DistributionCount`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DistributionBlock<T> {
    /// The value shared by all items of this block.
    pub value: T,
    /// Number of items in this block.
    pub count: u64,
    /// Number of items consumed so far, including this block.
    pub index: u64,
}

/// Collapses runs of equal values into [`DistributionBlock`]s.
///
/// Assuming the input is sorted (ascending or descending), the output is a
/// distribution count: applied to a vertex stream it yields degrees, applied
/// to a sorted degree stream it yields the degree distribution.
///
/// Equality defaults to `==` but can be any predicate via
/// [`with_equality`](DistributionCount::with_equality).
///
/// # Example
/// ```
/// use pagg::stream::{DistributionBlock, DistributionCount};
///
/// let counted = DistributionCount::new([0u64, 1, 1, 2, 2, 2, 5].into_iter());
/// assert_eq!(
///     counted.collect::<Vec<_>>(),
///     vec![
///         DistributionBlock { value: 0, count: 1, index: 1 },
///         DistributionBlock { value: 1, count: 2, index: 3 },
///         DistributionBlock { value: 2, count: 3, index: 6 },
///         DistributionBlock { value: 5, count: 1, index: 7 },
///     ]
/// );
/// ```
pub struct DistributionCount<I, F>
where
    I: Iterator,
{
    input: Peekable<I>,
    equal: F,
    items_sampled: u64,
}

impl<I> DistributionCount<I, fn(&I::Item, &I::Item) -> bool>
where
    I: Iterator,
    I::Item: PartialEq,
{
    /// Creates a counter using `==` as the equality predicate.
    pub fn new(input: I) -> Self {
        Self::with_equality(input, |a, b| a == b)
    }
}

impl<I, F> DistributionCount<I, F>
where
    I: Iterator,
    F: FnMut(&I::Item, &I::Item) -> bool,
{
    /// Creates a counter with a custom equality predicate.
    pub fn with_equality(input: I, equal: F) -> Self {
        Self {
            input: input.peekable(),
            equal,
            items_sampled: 0,
        }
    }

    /// Resets the running `index` to zero.
    ///
    /// The inner stream is not rewound; counting resumes from its current
    /// position.
    pub fn restart(&mut self) {
        self.items_sampled = 0;
    }
}

impl<I, F> Iterator for DistributionCount<I, F>
where
    I: Iterator,
    F: FnMut(&I::Item, &I::Item) -> bool,
{
    type Item = DistributionBlock<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        let value = self.input.next()?;

        let mut count = 1;
        while self
            .input
            .peek()
            .is_some_and(|next| (self.equal)(next, &value))
        {
            self.input.next();
            count += 1;
        }

        self.items_sampled += count;

        Some(DistributionBlock {
            value,
            count,
            index: self.items_sampled,
        })
    }
}

//! Reservoir sampling (algorithm R) with erase support.

use rand::Rng;

/// Maintains a uniform sample of size `k` over a stream of unknown length.
///
/// After `n >= k` calls to [`push`], every pushed element is in the
/// reservoir with probability `k / n`. Elements can also be removed:
/// [`erase`] drops a position unconditionally, while [`erase_maybe`] drops
/// it with probability `1 - k/n`, which cancels the selection bias once an
/// element has been revealed through [`sample`].
///
/// [`push`]: Reservoir::push
/// [`sample`]: Reservoir::sample
/// [`erase`]: Reservoir::erase
/// [`erase_maybe`]: Reservoir::erase_maybe
///
/// # Example
/// ```
/// use pagg::utils::Reservoir;
/// use rand::SeedableRng;
/// use rand_pcg::Pcg64Mcg;
///
/// let rng = &mut Pcg64Mcg::seed_from_u64(3);
/// let mut reservoir = Reservoir::new(10);
/// for x in 0..1000u64 {
///     reservoir.push(rng, x);
/// }
/// assert_eq!(reservoir.len(), 10);
/// ```
pub struct Reservoir<T> {
    items: Vec<T>,
    target_size: usize,
    pushed: u64,
}

impl<T> Reservoir<T> {
    /// Allocates a reservoir of the requested size.
    ///
    /// # Panics
    /// Panics if `reservoir_size` is zero.
    pub fn new(reservoir_size: usize) -> Self {
        assert!(reservoir_size > 0, "reservoir size must be positive");

        Self {
            items: Vec::with_capacity(reservoir_size),
            target_size: reservoir_size,
            pushed: 0,
        }
    }

    /// Number of elements currently held.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if no element is held.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of elements pushed so far.
    pub fn elements_pushed(&self) -> u64 {
        self.pushed
    }

    /// Offers an element to the reservoir.
    ///
    /// While the reservoir is not yet full the element is kept; afterwards
    /// it replaces a uniform position with probability `k / n`.
    pub fn push<R>(&mut self, rng: &mut R, item: T)
    where
        R: Rng,
    {
        self.pushed += 1;

        if self.items.len() < self.target_size {
            self.items.push(item);
            return;
        }

        let r = rng.random_range(0..self.pushed);
        if (r as usize) < self.target_size {
            self.items[r as usize] = item;
        }
    }

    /// Position of a uniformly drawn element.
    ///
    /// # Panics
    /// Panics if the reservoir is empty.
    pub fn sample<R>(&self, rng: &mut R) -> usize
    where
        R: Rng,
    {
        assert!(!self.is_empty(), "sampled an empty reservoir");
        rng.random_range(0..self.items.len())
    }

    /// Removes the element at `pos` by swapping in the last one.
    pub fn erase(&mut self, pos: usize) -> T {
        self.items.swap_remove(pos)
    }

    /// Removes the element at `pos` with probability `1 - k/n`.
    ///
    /// An element revealed through [`sample`](Reservoir::sample) was drawn
    /// with the elevated probability of being in the reservoir at all;
    /// calling this afterwards restores a uniform choice over the whole
    /// stream.
    pub fn erase_maybe<R>(&mut self, rng: &mut R, pos: usize) -> Option<T>
    where
        R: Rng,
    {
        if rng.random_range(0..self.pushed) < self.target_size as u64 {
            None
        } else {
            Some(self.erase(pos))
        }
    }

    /// The sampled elements in arbitrary order.
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

/// Fixed parameters of a [`crate::Reservoir`]: capacity `K` and recency bias `alpha`.
///
/// Validated once, at construction, in the style of a builder that panics on
/// a caller bug rather than returning a `Result` nobody is meant to recover
/// from (see the crate's precondition-vs-I/O-error split in [`crate::StoreError`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReservoirConfig {
    capacity: u64,
    alpha: f64,
}

impl ReservoirConfig {
    /// Creates a new configuration.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0` or `alpha < 0.0`.
    pub fn new(capacity: u64, alpha: f64) -> Self {
        assert!(capacity > 0, "capacity must be > 0");
        assert!(alpha >= 0.0, "alpha must be >= 0.0");
        Self { capacity, alpha }
    }

    /// Reservoir capacity `K`.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Recency-bias exponent `alpha`. `alpha == 0.0` is classical uniform
    /// reservoir sampling; larger values favor recent arrivals more strongly.
    #[inline]
    #[must_use]
    pub const fn alpha(&self) -> f64 {
        self.alpha
    }
}

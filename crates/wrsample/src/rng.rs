use rand::rngs::{OsRng, StdRng};
use rand::{Rng, RngCore, SeedableRng};

/// A uniform real/integer source that every sampling draw in a reservoir
/// flows through.
///
/// The source's own design note (see `DESIGN.md`) is that it is passed
/// explicitly to a [`crate::Reservoir`] rather than reached for through a
/// process-wide singleton, so that tests can isolate RNG streams and two
/// reservoirs seeded identically reproduce identical output without
/// fighting over shared global state.
pub trait UniformSource {
    /// Reseeds the source deterministically.
    fn seed(&mut self, s: u32);

    /// Reseeds the source from a nondeterministic entropy source and
    /// returns the seed chosen, so the caller can log it for later replay.
    fn randomize(&mut self) -> u32;

    /// A uniform integer in `[a, b]` (inclusive of both endpoints).
    fn uniform_int(&mut self, a: i64, b: i64) -> i64;

    /// A uniform real in `[a, b)`.
    fn uniform_real(&mut self, a: f64, b: f64) -> f64;
}

/// The crate's default [`UniformSource`], backed by `rand`'s `StdRng`.
#[derive(Debug, Clone)]
pub struct DefaultRng {
    inner: StdRng,
}

impl DefaultRng {
    /// Builds a source seeded deterministically from `s`.
    #[must_use]
    pub fn new(s: u32) -> Self {
        Self {
            inner: StdRng::seed_from_u64(u64::from(s)),
        }
    }

    /// Builds a source seeded from the process's entropy source.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            inner: StdRng::from_entropy(),
        }
    }
}

impl Default for DefaultRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl UniformSource for DefaultRng {
    fn seed(&mut self, s: u32) {
        self.inner = StdRng::seed_from_u64(u64::from(s));
    }

    fn randomize(&mut self) -> u32 {
        // Propagates the entropy source's own failure by panicking, same as
        // `std::random_device` aborting the process it was embedded in.
        let s = OsRng.next_u32();
        self.seed(s);
        s
    }

    fn uniform_int(&mut self, a: i64, b: i64) -> i64 {
        self.inner.gen_range(a..=b)
    }

    fn uniform_real(&mut self, a: f64, b: f64) -> f64 {
        self.inner.gen_range(a..b)
    }
}

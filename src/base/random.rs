use crate::stats::ContinuousDensity;
use rand::{Rng, RngCore, SeedableRng};
use rand_distr::Open01;
use rand_xoshiro::Xoshiro256PlusPlus;

/// Number of redraws [`RandomSource::next_non_negative`] performs before giving up.
pub const MAX_NON_NEGATIVE_ATTEMPTS: usize = 100;

/// The random source consumed by all sampling-capable calculator symbols.
///
/// The trait is implemented for every [`RngCore`], the crate itself defaults to
/// [`Xoshiro256PlusPlus`] (see [`seeded_rng`] and [`entropy_rng`]).
pub trait RandomSource {
    /// Draw a uniform variate from the half-open interval [0, 1).
    fn next_uniform(&mut self) -> f64;

    /// Draw a uniform variate from the open interval (0, 1).
    fn next_open_uniform(&mut self) -> f64;

    /// Draw a non-negative variate from a continuous distribution handle.
    ///
    /// Uses inverse transform sampling. Negative (or NaN) variates are redrawn up to
    /// [`MAX_NON_NEGATIVE_ATTEMPTS`] times, after which 0.0 is returned.
    fn next_non_negative(&mut self, handle: &dyn ContinuousDensity) -> f64 {
        for _ in 0..MAX_NON_NEGATIVE_ATTEMPTS {
            let candidate = handle.inverse_cdf(self.next_uniform());

            if candidate >= 0.0 {
                return candidate;
            }
        }

        0.0
    }
}

impl<R> RandomSource for R
where
    R: RngCore,
{
    fn next_uniform(&mut self) -> f64 {
        self.random::<f64>()
    }

    fn next_open_uniform(&mut self) -> f64 {
        self.sample(Open01)
    }
}

/// Create the default generator with a fixed seed, for reproducible simulation runs.
pub fn seeded_rng(seed: u64) -> Xoshiro256PlusPlus {
    Xoshiro256PlusPlus::seed_from_u64(seed)
}

/// Create the default generator, seeded from the operating system entropy source.
pub fn entropy_rng() -> Xoshiro256PlusPlus {
    Xoshiro256PlusPlus::from_rng(&mut rand::rng())
}

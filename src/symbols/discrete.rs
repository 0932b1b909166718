use crate::{
    CalcError,
    base::{CalcSymbol, RandomSource},
};
use log::warn;
use num_traits::ToPrimitive;

/// Upper bound of the summation in discrete inverse transform sampling.
pub const MAX_K: u64 = 1_000_000;

/// A discrete distribution family on the non-negative integers, defined by its probability
/// mass function.
pub trait DiscreteFamily: Send {
    /// The names under which the family is exposed.
    fn names(&self) -> &'static [&'static str];

    /// The number of native parameters.
    fn param_count(&self) -> usize;

    /// Evaluates the probability mass function at `k`, `None` for invalid parameters.
    fn pmf(&self, params: &[f64], k: u64) -> Option<f64>;
}

/// A calculator symbol for a discrete distribution family.
///
/// With `n` native parameters the symbol accepts
/// - `n` parameters: draws a variate by summing the mass function until it exceeds a uniform
///   draw, the summation is truncated at [`MAX_K`],
/// - `n + 1` parameters `[x, ..native]`: evaluates the mass function at `round(x)`.
pub struct DiscreteDistributionSymbol<F> {
    family: F,
    names: Vec<String>,
}

impl<F> DiscreteDistributionSymbol<F>
where
    F: DiscreteFamily,
{
    /// Create a new [`DiscreteDistributionSymbol`].
    pub fn new(family: F) -> Self {
        let names = family.names().iter().map(|name| name.to_string()).collect();

        Self { family, names }
    }

    /// The family behind the symbol.
    pub fn family(&self) -> &F {
        &self.family
    }

    fn invalid(&self) -> CalcError {
        CalcError::params(self.name(), "probability mass function is undefined")
    }

    /// Evaluates the probability mass function at the integer nearest to `x`.
    pub fn pmf_at(&self, x: f64, params: &[f64]) -> Result<f64, CalcError> {
        if x < 0.0 {
            return Ok(0.0);
        }

        let k = x.round().to_u64().ok_or_else(|| self.invalid())?;

        self.family.pmf(params, k).ok_or_else(|| self.invalid())
    }

    /// Draw a single variate.
    ///
    /// Returns [`MAX_K`] if the summed probability mass never reaches the uniform draw.
    pub fn sample(&self, params: &[f64], rng: &mut dyn RandomSource) -> Result<f64, CalcError> {
        let d = rng.next_uniform();

        let mut sum = 0.0;

        for k in 0..MAX_K {
            sum += self.family.pmf(params, k).ok_or_else(|| self.invalid())?;

            if sum >= d {
                return Ok(k as f64);
            }
        }

        warn!(
            "{}::sample truncated at k = {} (cumulative mass {} < {})",
            self.name(),
            MAX_K,
            sum,
            d
        );

        Ok(MAX_K as f64)
    }
}

impl<F> CalcSymbol for DiscreteDistributionSymbol<F>
where
    F: DiscreteFamily,
{
    fn evaluate(&mut self, params: &[f64], rng: &mut dyn RandomSource) -> Result<f64, CalcError> {
        let count = self.family.param_count();

        if params.len() == count {
            self.sample(params, rng)
        } else if params.len() == count + 1 {
            self.pmf_at(params[0], &params[1..])
        } else {
            Err(CalcError::arity(self.name(), params.len()))
        }
    }

    fn is_deterministic(&self) -> bool {
        false
    }

    fn names(&self) -> &[String] {
        &self.names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::seeded_rng;

    /// A biased coin showing 1 with probability p.
    struct Coin;

    impl DiscreteFamily for Coin {
        fn names(&self) -> &'static [&'static str] {
            &["Coin"]
        }

        fn param_count(&self) -> usize {
            1
        }

        fn pmf(&self, params: &[f64], k: u64) -> Option<f64> {
            let p = params[0];

            if !(0.0..=1.0).contains(&p) {
                return None;
            }

            Some(match k {
                0 => 1.0 - p,
                1 => p,
                _ => 0.0,
            })
        }
    }

    #[test]
    fn test_dispatch() {
        let mut symbol = DiscreteDistributionSymbol::new(Coin);
        let mut rng = seeded_rng(5);

        for _ in 0..100 {
            let value = symbol.evaluate(&[0.5], &mut rng).unwrap();

            assert!((value == 0.0) | (value == 1.0));
        }

        assert!(symbol.evaluate(&[0.6, 0.25], &mut rng).unwrap() == 0.25);
        assert!(symbol.evaluate(&[1.4, 0.25], &mut rng).unwrap() == 0.25);
        assert!(symbol.evaluate(&[1.6, 0.25], &mut rng).unwrap() == 0.0);
        assert!(symbol.evaluate(&[-0.2, 0.25], &mut rng).unwrap() == 0.0);

        assert!(matches!(
            symbol.evaluate(&[2.0], &mut rng),
            Err(CalcError::InvalidParameters { .. })
        ));
        assert!(matches!(
            symbol.evaluate(&[0.0, 2.0], &mut rng),
            Err(CalcError::InvalidParameters { .. })
        ));
        assert!(matches!(
            symbol.evaluate(&[f64::NAN, 0.5], &mut rng),
            Err(CalcError::InvalidParameters { .. })
        ));
        assert!(matches!(
            symbol.evaluate(&[0.0, 0.5, 0.5], &mut rng),
            Err(CalcError::InvalidArity { count: 3, .. })
        ));

        assert!(symbol.evaluate_or_default(&[2.0], &mut rng, -1.0) == -1.0);
    }

    /// A mass function that never sums up to anything.
    struct Empty;

    impl DiscreteFamily for Empty {
        fn names(&self) -> &'static [&'static str] {
            &["Empty"]
        }

        fn param_count(&self) -> usize {
            0
        }

        fn pmf(&self, _params: &[f64], _k: u64) -> Option<f64> {
            Some(0.0)
        }
    }

    #[test]
    fn test_truncation() {
        let mut symbol = DiscreteDistributionSymbol::new(Empty);
        let mut rng = seeded_rng(5);

        // The draw is strictly positive with overwhelming probability.
        assert!(symbol.evaluate(&[], &mut rng).unwrap() == MAX_K as f64);
    }
}

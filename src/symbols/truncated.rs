use crate::{
    CalcError,
    base::{CalcSymbol, RandomSource, range_names},
    stats::DensityRange,
    symbols::{ContinuousDistributionSymbol, ContinuousFamily},
};
use log::warn;

/// Maximum number of rejection sampling attempts before falling back to the window midpoint.
pub const MAX_RND: usize = 100;

/// A calculator symbol that restricts the samples of a continuous distribution to a window.
///
/// Parameters are `[min, max, ..native]`. Variates are drawn from the wrapped distribution until
/// one falls into `[min, max]`; after [`MAX_RND`] failed attempts the midpoint of the window is
/// returned instead.
pub struct TruncatedDistributionSymbol<F> {
    inner: ContinuousDistributionSymbol<F>,
    names: Vec<String>,
}

impl<F> TruncatedDistributionSymbol<F>
where
    F: ContinuousFamily,
{
    /// Create a new [`TruncatedDistributionSymbol`].
    pub fn new(family: F) -> Self {
        let names = range_names(family.names().iter().copied());

        Self {
            inner: ContinuousDistributionSymbol::new(family),
            names,
        }
    }

    /// The wrapped continuous distribution symbol.
    pub fn inner(&self) -> &ContinuousDistributionSymbol<F> {
        &self.inner
    }

    fn window(&self, params: &[f64]) -> Result<DensityRange, CalcError> {
        if params.len() != self.inner.family().param_count() + 2 {
            return Err(CalcError::arity(self.name(), params.len()));
        }

        DensityRange::try_new((params[0], params[1]))
            .ok_or_else(|| CalcError::params(self.name(), "window minimum is not below maximum"))
    }

    fn warn_exhausted(&self, window: &DensityRange) {
        warn!(
            "{}::evaluate found no sample within [{}, {}] after {} attempts, using the midpoint",
            self.name(),
            window.min(),
            window.max(),
            MAX_RND
        );
    }
}

impl<F> CalcSymbol for TruncatedDistributionSymbol<F>
where
    F: ContinuousFamily,
{
    fn evaluate(&mut self, params: &[f64], rng: &mut dyn RandomSource) -> Result<f64, CalcError> {
        let window = self.window(params)?;

        for _ in 0..MAX_RND {
            let candidate = self.inner.sample(&params[2..], rng)?;

            if window.contains(candidate) {
                return Ok(candidate);
            }
        }

        self.warn_exhausted(&window);

        Ok(window.midpoint())
    }

    fn evaluate_or_default(
        &mut self,
        params: &[f64],
        rng: &mut dyn RandomSource,
        fallback: f64,
    ) -> f64 {
        let window = match self.window(params) {
            Ok(window) => window,
            Err(_) => return fallback,
        };

        for _ in 0..MAX_RND {
            let candidate = self
                .inner
                .sample(&params[2..], rng)
                .unwrap_or(fallback);

            if window.contains(candidate) {
                return candidate;
            }
        }

        self.warn_exhausted(&window);

        window.midpoint()
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
    use crate::{base::seeded_rng, stats::ContinuousDensity};
    use statrs::distribution::Exp;

    struct MeanExp;

    impl ContinuousFamily for MeanExp {
        fn names(&self) -> &'static [&'static str] {
            &["ExpTest"]
        }

        fn param_count(&self) -> usize {
            1
        }

        fn make_distribution(&self, params: &[f64]) -> Option<Box<dyn ContinuousDensity>> {
            Some(Box::new(Exp::new(1.0 / params[0]).ok()?))
        }
    }

    #[test]
    fn test_window() {
        let mut symbol = TruncatedDistributionSymbol::new(MeanExp);
        let mut rng = seeded_rng(9);

        assert!(symbol.names() == ["ExpTestRange", "ExpTestBereich"]);

        for _ in 0..10_000 {
            let value = symbol.evaluate(&[1.0, 2.0, 1.5], &mut rng).unwrap();

            assert!((1.0..=2.0).contains(&value));
        }

        assert!(symbol.inner().handle_builds() == 1);
    }

    #[test]
    fn test_invalid_calls() {
        let mut symbol = TruncatedDistributionSymbol::new(MeanExp);
        let mut rng = seeded_rng(9);

        assert!(matches!(
            symbol.evaluate(&[2.0, 1.0, 1.5], &mut rng),
            Err(CalcError::InvalidParameters { .. })
        ));
        assert!(matches!(
            symbol.evaluate(&[1.0, 1.0, 1.5], &mut rng),
            Err(CalcError::InvalidParameters { .. })
        ));
        assert!(matches!(
            symbol.evaluate(&[1.0], &mut rng),
            Err(CalcError::InvalidArity { count: 1, .. })
        ));
        assert!(matches!(
            symbol.evaluate(&[1.0, 2.0, -1.5], &mut rng),
            Err(CalcError::InvalidParameters { .. })
        ));
        assert!(matches!(
            symbol.evaluate(&[1.0, 2.0], &mut rng),
            Err(CalcError::InvalidArity { .. })
        ));

        assert!(symbol.evaluate_or_default(&[2.0, 1.0, 1.5], &mut rng, -3.0) == -3.0);
    }

    #[test]
    fn test_midpoint_fallback() {
        let mut symbol = TruncatedDistributionSymbol::new(MeanExp);
        let mut rng = seeded_rng(9);

        // Exponential variates are never negative.
        assert!(symbol.evaluate(&[-3.0, -1.0, 1.0], &mut rng).unwrap() == -2.0);

        // The fallback of the wrapped symbol lies outside the window as well.
        assert!(symbol.evaluate_or_default(&[-3.0, -1.0, -1.0], &mut rng, 5.0) == -2.0);
    }
}

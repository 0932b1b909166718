use crate::{
    CalcError,
    base::{CalcSymbol, ParamCache, RandomSource, primary_name},
    stats::ContinuousDensity,
};

/// Tolerance of the density/cumulative mode selector.
pub const MODE_SELECTOR_TOLERANCE: f64 = 1e-4;

/// A continuous distribution family, i.e. a fixed number of native parameters together with a
/// factory that turns them into a distribution handle.
pub trait ContinuousFamily: Send + Sync {
    /// The names under which the family is exposed.
    fn names(&self) -> &'static [&'static str];

    /// The number of native parameters.
    fn param_count(&self) -> usize;

    /// Validate `params` and build a distribution handle, `None` for invalid parameters.
    fn make_distribution(&self, params: &[f64]) -> Option<Box<dyn ContinuousDensity>>;
}

/// A calculator symbol for a continuous distribution family.
///
/// With `n` native parameters the symbol accepts
/// - `n` parameters: draws a single non-negative variate,
/// - `n + 2` parameters `[x, ..native, mode]`: evaluates the density (`mode = 0`) or the
///   cumulative distribution function (`mode = 1`) at `x`.
///
/// The distribution handle is kept in a [`ParamCache`] so that repeated calls with the same
/// native parameters do not rebuild it.
pub struct ContinuousDistributionSymbol<F> {
    cache: ParamCache<Box<dyn ContinuousDensity>>,
    family: F,
    names: Vec<String>,
}

impl<F> ContinuousDistributionSymbol<F>
where
    F: ContinuousFamily,
{
    /// Create a new [`ContinuousDistributionSymbol`].
    pub fn new(family: F) -> Self {
        let names = family.names().iter().map(|name| name.to_string()).collect();

        Self {
            cache: ParamCache::new(),
            family,
            names,
        }
    }

    /// Evaluate the density or cumulative distribution function at `x`.
    ///
    /// Non-finite results are returned as 0.0.
    pub fn evaluate_at(&mut self, x: f64, params: &[f64], selector: f64) -> Result<f64, CalcError> {
        let cumulative = if (selector - 0.0).abs() <= MODE_SELECTOR_TOLERANCE {
            false
        } else if (selector - 1.0).abs() <= MODE_SELECTOR_TOLERANCE {
            true
        } else {
            return Err(CalcError::InvalidModeSelector {
                symbol: self.name().to_string(),
                selector,
            });
        };

        let handle = self.handle(params)?;

        let value = if cumulative {
            handle.cdf(x)
        } else {
            handle.density(x)
        };

        Ok(if value.is_finite() { value } else { 0.0 })
    }

    /// The family behind the symbol.
    pub fn family(&self) -> &F {
        &self.family
    }

    fn handle(&mut self, params: &[f64]) -> Result<&dyn ContinuousDensity, CalcError> {
        let Self {
            cache,
            family,
            names,
        } = self;

        match cache.get_or_build(params, |params| family.make_distribution(params)) {
            Some(handle) => Ok(handle.as_ref()),
            None => Err(CalcError::params(
                primary_name(names),
                "no distribution for these parameters",
            )),
        }
    }

    /// Number of distribution handles built so far.
    pub fn handle_builds(&self) -> usize {
        self.cache.builds()
    }

    /// Draw a single non-negative variate.
    pub fn sample(&mut self, params: &[f64], rng: &mut dyn RandomSource) -> Result<f64, CalcError> {
        let handle = self.handle(params)?;

        Ok(rng.next_non_negative(handle))
    }
}

impl<F> CalcSymbol for ContinuousDistributionSymbol<F>
where
    F: ContinuousFamily,
{
    fn evaluate(&mut self, params: &[f64], rng: &mut dyn RandomSource) -> Result<f64, CalcError> {
        let count = self.family.param_count();

        if params.len() == count {
            self.sample(params, rng)
        } else if params.len() == count + 2 {
            self.evaluate_at(params[0], &params[1..=count], params[count + 1])
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

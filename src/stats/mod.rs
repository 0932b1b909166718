//! # Statistics sub-module for the **calcdist** crate.
//!
//! This module introduces the [`ContinuousDensity`] trait, which is the trait that is shared by
//! all distribution handles created by the continuous family table. A handle is an opaque,
//! already validated distribution object that can evaluate a density, a cumulative probability
//! and an inverse cumulative probability (the latter is used for inverse transform sampling).
//!
//! Handles are provided in two flavours:
//! - [`statrs`] distributions, for all families that statrs already implements.
//! - The hand written handles in this module (e.g. [`FrechetDensity`], [`IrwinHallDensity`]),
//!   with the bounded-support ones (e.g. [`TrapezoidDensity`]) kept apart.
//!
//! In addition, this module contains the two self-contained stochastic models of the crate:
//! - [`PhaseTypeChain`] A continuous-time Markov chain that samples phase-type absorption times.
//! - [`EmpiricalDistribution`] A piecewise constant density defined by raw bin weights.

mod bounded;
mod ctmc;
mod densities;
mod empirical;

pub use bounded::*;
pub use ctmc::*;
pub use densities::*;
pub use empirical::*;

use serde::{Deserialize, Serialize};
use statrs::{
    distribution::{
        Beta, Cauchy, Chi, ChiSquared, Continuous, ContinuousCDF, Erlang, Exp, FisherSnedecor,
        Gamma, Gumbel, InverseGamma, Laplace, LogNormal, Normal, Pareto, StudentsT, Triangular,
        Uniform, Weibull,
    },
    statistics::{Distribution, Max, Min},
};
use std::fmt::Debug;

/// A trait that is shared by all continuous distribution handles.
pub trait ContinuousDensity: Debug + Send + Sync {
    /// Evaluates the probability density function at `x`.
    fn density(&self, x: f64) -> f64;

    /// Evaluates the cumulative distribution function at `x`.
    fn cdf(&self, x: f64) -> f64;

    /// Evaluates the inverse cumulative distribution function at `p` in [0, 1].
    fn inverse_cdf(&self, p: f64) -> f64;

    /// The analytic mean of the distribution, if it exists.
    fn mean(&self) -> Option<f64> {
        None
    }

    /// The analytic variance of the distribution, if it exists.
    fn variance(&self) -> Option<f64> {
        None
    }
}

macro_rules! impl_statrs_density {
    (@common) => {
        fn density(&self, x: f64) -> f64 {
            Continuous::pdf(self, x)
        }

        fn cdf(&self, x: f64) -> f64 {
            ContinuousCDF::cdf(self, x)
        }

        fn mean(&self) -> Option<f64> {
            Distribution::mean(self)
        }

        fn variance(&self) -> Option<f64> {
            Distribution::variance(self)
        }
    };
    (closed: $($closed: ty),*; numeric: $($numeric: ty),* $(,)?) => {
        $(
            impl ContinuousDensity for $closed {
                impl_statrs_density!(@common);

                fn inverse_cdf(&self, p: f64) -> f64 {
                    ContinuousCDF::inverse_cdf(self, p)
                }
            }
        )*

        $(
            impl ContinuousDensity for $numeric {
                impl_statrs_density!(@common);

                fn inverse_cdf(&self, p: f64) -> f64 {
                    invert_cdf(
                        |x| ContinuousCDF::cdf(self, x),
                        (Min::min(self), Max::max(self)),
                        p,
                    )
                }
            }
        )*
    };
}

// statrs only ships closed form quantile functions for some families, the generic fallback it
// provides for the others stops after a handful of bisection steps.
impl_statrs_density!(
    closed: Cauchy, Exp, Gumbel, Laplace, LogNormal, Normal, Pareto, StudentsT, Triangular,
        Uniform, Weibull;
    numeric: Beta, Chi, ChiSquared, Erlang, FisherSnedecor, Gamma, InverseGamma,
);

/// Defines a valid value range, e.g. a support or truncation window.
#[derive(Copy, Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct DensityRange((f64, f64));

impl DensityRange {
    /// Returns true if `x` lies within the closed range.
    pub fn contains(&self, x: f64) -> bool {
        (self.min() <= x) & (x <= self.max())
    }

    /// The maximum value of the range.
    pub fn max(&self) -> f64 {
        self.0.1
    }

    /// The midpoint of the range.
    pub fn midpoint(&self) -> f64 {
        (self.min() + self.max()) / 2.0
    }

    /// The minimum value of the range.
    pub fn min(&self) -> f64 {
        self.0.0
    }

    /// Create a new [`DensityRange`], the minimum must be strictly smaller than the maximum.
    pub fn try_new(minamax: (f64, f64)) -> Option<Self> {
        if minamax.0 < minamax.1 {
            Some(Self(minamax))
        } else {
            None
        }
    }

    /// The width of the range.
    pub fn width(&self) -> f64 {
        self.max() - self.min()
    }
}

/// Numerically inverts a monotone cumulative distribution function with support `(min, max)`.
///
/// Infinite support bounds are replaced by a bracket that is grown until it encloses `p`. The
/// bracket is halved until its width drops below a relative 1e-13, the result can never be more
/// accurate than `cdf` itself.
pub(crate) fn invert_cdf(cdf: impl Fn(f64) -> f64, support: (f64, f64), p: f64) -> f64 {
    let (minv, maxv) = support;

    if p.is_nan() {
        return f64::NAN;
    }

    if p <= 0.0 {
        return minv;
    }

    if p >= 1.0 {
        return maxv;
    }

    let mut lower = if minv.is_finite() { minv } else { maxv.min(0.0) - 1.0 };
    let mut upper = if maxv.is_finite() { maxv } else { lower.max(0.0) + 1.0 };

    let mut attempts = 0;

    while !minv.is_finite() && cdf(lower) > p && attempts < 1024 {
        lower -= upper - lower;
        attempts += 1;
    }

    while !maxv.is_finite() && cdf(upper) < p && attempts < 2048 {
        upper += upper - lower;
        attempts += 1;
    }

    for _ in 0..200 {
        let middle = lower + (upper - lower) / 2.0;

        if cdf(middle) < p {
            lower = middle;
        } else {
            upper = middle;
        }

        if upper - lower <= 1e-13 * upper.abs().max(1.0) {
            break;
        }
    }

    lower + (upper - lower) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_density_range() {
        let range = DensityRange::try_new((1.0, 3.0)).unwrap();

        assert!(range.contains(1.0));
        assert!(range.contains(3.0));
        assert!(!range.contains(3.5));
        assert!(!range.contains(f64::NAN));
        assert!(range.midpoint() == 2.0);
        assert!(range.width() == 2.0);

        assert!(DensityRange::try_new((3.0, 3.0)).is_none());
        assert!(DensityRange::try_new((3.0, 1.0)).is_none());
        assert!(DensityRange::try_new((f64::NAN, 1.0)).is_none());
    }

    #[test]
    fn test_statrs_bridge() {
        let handle: Box<dyn ContinuousDensity> = Box::new(Exp::new(0.5).unwrap());

        assert_relative_eq!(handle.density(0.0), 0.5);
        assert_relative_eq!(handle.cdf(2.0), 1.0 - (-1.0f64).exp(), max_relative = 1e-12);
        assert_relative_eq!(handle.inverse_cdf(handle.cdf(3.0)), 3.0, max_relative = 1e-8);
        assert_relative_eq!(handle.mean().unwrap(), 2.0);
        assert_relative_eq!(handle.variance().unwrap(), 4.0);
    }

    #[test]
    fn test_closed_form_quantiles() {
        let student: Box<dyn ContinuousDensity> =
            Box::new(StudentsT::new(0.0, 1.0, 3.0).unwrap());

        assert!(student.inverse_cdf(0.5) == 0.0);
        assert_relative_eq!(student.cdf(student.inverse_cdf(0.01)), 0.01, max_relative = 1e-7);
        assert_relative_eq!(student.cdf(student.inverse_cdf(0.9)), 0.9, max_relative = 1e-7);

        let shifted: Box<dyn ContinuousDensity> =
            Box::new(StudentsT::new(100.0, 1.0, 5.0).unwrap());

        assert!(shifted.inverse_cdf(0.5) == 100.0);
        assert!(shifted.inverse_cdf(0.4) < 100.0);

        let gumbel: Box<dyn ContinuousDensity> = Box::new(Gumbel::new(1.0, 2.0).unwrap());

        assert_relative_eq!(gumbel.cdf(1.0), (-1.0f64).exp(), max_relative = 1e-12);
        assert_relative_eq!(gumbel.inverse_cdf((-1.0f64).exp()), 1.0, max_relative = 1e-12);
    }

    #[test]
    fn test_numeric_inversion() {
        let gamma: Box<dyn ContinuousDensity> = Box::new(Gamma::new(2.5, 0.5).unwrap());

        for p in [1e-6, 0.01, 0.3, 0.5, 0.9, 0.999] {
            let x = gamma.inverse_cdf(p);

            assert!(x > 0.0);
            assert_relative_eq!(gamma.cdf(x), p, max_relative = 1e-9);
        }

        let erlang: Box<dyn ContinuousDensity> = Box::new(Erlang::new(3, 0.5).unwrap());

        for p in [0.01, 0.5, 0.99] {
            assert_relative_eq!(erlang.cdf(erlang.inverse_cdf(p)), p, max_relative = 1e-9);
        }

        assert!(invert_cdf(|x| x, (0.0, 1.0), 0.0) == 0.0);
        assert!(invert_cdf(|x| x, (0.0, 1.0), 1.0) == 1.0);
        assert_relative_eq!(invert_cdf(|x| x * x, (0.0, 1.0), 0.25), 0.5, epsilon = 1e-10);
    }
}

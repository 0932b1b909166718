use serde::{Deserialize, Serialize};

/// Smallest admissible upper support bound of an [`EmpiricalDistribution`].
pub const MIN_UPPER_BOUND: f64 = 1e-6;

/// A piecewise constant distribution on `[0, upper_bound]` defined by raw (unnormalized) bin
/// weights.
///
/// The `i`-th weight covers the bin `[i, i + 1) * upper_bound / len`. Statistics (mean,
/// quantiles, ..) treat each bin as a point mass at its left edge.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct EmpiricalDistribution {
    upper_bound: f64,
    weights: Vec<f64>,
    cumulative: Vec<f64>,
    total: f64,
}

impl EmpiricalDistribution {
    /// Create a new [`EmpiricalDistribution`].
    ///
    /// Returns `None` if there are no weights, any weight is negative or not finite, or the upper
    /// bound is not a number. Upper bounds below [`MIN_UPPER_BOUND`] are raised to it.
    pub fn new(weights: &[f64], upper_bound: f64) -> Option<Self> {
        if weights.is_empty()
            || upper_bound.is_nan()
            || upper_bound.is_infinite()
            || weights.iter().any(|w| !(w.is_finite() && *w >= 0.0))
        {
            return None;
        }

        let mut total = 0.0;

        let mut cumulative = weights
            .iter()
            .map(|weight| {
                total += weight;
                total
            })
            .collect::<Vec<f64>>();

        if total > 0.0 {
            cumulative.iter_mut().for_each(|value| *value /= total);
        }

        Some(Self {
            upper_bound: upper_bound.max(MIN_UPPER_BOUND),
            weights: weights.to_vec(),
            cumulative,
            total,
        })
    }

    /// Evaluates the cumulative distribution function, linearly interpolated within each bin.
    pub fn cdf(&self, x: f64) -> f64 {
        if self.total == 0.0 {
            return 0.0;
        }

        let x = x * self.scale();

        if x.is_nan() || x < 0.0 {
            return 0.0;
        }

        if x >= self.weights.len() as f64 {
            return 1.0;
        }

        let index = x.floor() as usize;
        let fraction = x - x.floor();

        let lower = if index == 0 {
            0.0
        } else {
            self.cumulative[index - 1]
        };

        lower * (1.0 - fraction) + self.cumulative[index] * fraction
    }

    /// The coefficient of variation (standard deviation over mean), 0 if the mean vanishes.
    pub fn cv(&self) -> f64 {
        let mean = self.mean();

        if mean == 0.0 { 0.0 } else { self.sd() / mean }
    }

    /// The normalized weight of the bin containing `x`, 0 outside of `[0, upper_bound]`.
    ///
    /// The weights are normalized to sum to one, at `x = upper_bound` the last bin is used.
    pub fn density(&self, x: f64) -> f64 {
        if self.total == 0.0 {
            return 0.0;
        }

        if x.is_nan() || x < 0.0 || x > self.upper_bound {
            return 0.0;
        }

        let len = self.weights.len();
        let index = ((x * self.scale()).floor() as usize).min(len - 1);

        self.weights[index] / self.total
    }

    /// The mean of the distribution.
    pub fn mean(&self) -> f64 {
        self.moment(1)
    }

    /// The median of the distribution, see [`EmpiricalDistribution::quantile`].
    pub fn median(&self) -> f64 {
        self.quantile(0.5)
    }

    fn moment(&self, order: i32) -> f64 {
        if self.total == 0.0 {
            return 0.0;
        }

        let scale = self.scale();

        self.weights
            .iter()
            .enumerate()
            .map(|(i, weight)| weight * (i as f64 / scale).powi(order))
            .sum::<f64>()
            / self.total
    }

    /// The `p`-quantile, the left edge of the first bin whose cumulative weight reaches `p`.
    ///
    /// `p` is clamped to [0, 1].
    pub fn quantile(&self, p: f64) -> f64 {
        let target = self.total * p.clamp(0.0, 1.0);

        let mut partial = 0.0;

        for (index, weight) in self.weights.iter().enumerate() {
            partial += weight;

            if partial >= target {
                return index as f64 / self.scale();
            }
        }

        0.0
    }

    /// Draw a variate by inverting the cumulative table against the uniform variate `u`, with
    /// linear interpolation within the selected bin.
    ///
    /// Returns `None` if all weights are zero.
    pub fn sample(&self, u: f64) -> Option<f64> {
        if self.total == 0.0 {
            return None;
        }

        let index = self
            .cumulative
            .iter()
            .position(|value| u < *value)
            .unwrap_or(self.weights.len() - 1);

        let lower = if index == 0 {
            0.0
        } else {
            self.cumulative[index - 1]
        };

        let width = self.cumulative[index] - lower;
        let offset = if width == 0.0 { 0.0 } else { (u - lower) / width };

        Some((index as f64 + offset) / self.scale())
    }

    /// Bins per unit of the support.
    fn scale(&self) -> f64 {
        self.weights.len() as f64 / self.upper_bound
    }

    /// The standard deviation of the distribution.
    pub fn sd(&self) -> f64 {
        self.variance().sqrt()
    }

    /// The upper bound of the support.
    pub fn upper_bound(&self) -> f64 {
        self.upper_bound
    }

    /// The variance of the distribution.
    pub fn variance(&self) -> f64 {
        (self.moment(2) - self.mean().powi(2)).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const WEIGHTS: [f64; 5] = [7.0, 2.0, 1.0, 3.0, 10.0];

    #[test]
    fn test_density() {
        let dist = EmpiricalDistribution::new(&[2.0, 1.0, 3.0], 10.0).unwrap();

        assert!(dist.density(-0.1) == 0.0);
        assert_relative_eq!(dist.density(0.0), 2.0 / 6.0);
        assert_relative_eq!(dist.density(3.3), 2.0 / 6.0);
        assert_relative_eq!(dist.density(5.0), 1.0 / 6.0);
        assert_relative_eq!(dist.density(9.9), 3.0 / 6.0);
        assert_relative_eq!(dist.density(10.0), 3.0 / 6.0);
        assert!(dist.density(10.1) == 0.0);
    }

    #[test]
    fn test_density_beyond_upper_bound() {
        let dist = EmpiricalDistribution::new(&[2.0, 1.0, 3.0], 10.0).unwrap();

        // Anything past the upper bound, including the width of one more bin.
        for x in [10.000_001, 10.5, 13.0, 13.4, 1e9, f64::INFINITY] {
            assert!(dist.density(x) == 0.0, "{}", x);
        }

        assert!(dist.density(f64::NAN) == 0.0);
    }

    #[test]
    fn test_cdf() {
        let single = EmpiricalDistribution::new(&[1.0], 10.0).unwrap();

        assert!(single.cdf(-0.1) == 0.0);
        assert!(single.cdf(0.0) == 0.0);
        assert_relative_eq!(single.cdf(5.0), 0.5);
        assert!(single.cdf(10.0) == 1.0);
        assert!(single.cdf(15.0) == 1.0);

        let dist = EmpiricalDistribution::new(&[2.0, 1.0, 3.0], 10.0).unwrap();

        let values = (1..100)
            .map(|i| dist.cdf(i as f64 / 10.0))
            .collect::<Vec<f64>>();

        assert!(values.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(values.iter().all(|value| (*value > 0.0) & (*value < 1.0)));
    }

    #[test]
    fn test_statistics() {
        let dist = EmpiricalDistribution::new(&WEIGHTS, 5.0).unwrap();

        assert_relative_eq!(dist.mean(), 53.0 / 23.0, max_relative = 1e-12);
        assert_relative_eq!(dist.variance(), 3.081_285_444_234_403_8, max_relative = 1e-10);
        assert_relative_eq!(dist.cv(), dist.sd() / dist.mean());

        assert!(dist.median() == 3.0);
        assert!(dist.quantile(0.2) == 0.0);
        assert!(dist.quantile(0.4) == 2.0);
        assert!(dist.quantile(0.6) == 4.0);
        assert!(dist.quantile(0.8) == 4.0);
    }

    #[test]
    fn test_sample() {
        let dist = EmpiricalDistribution::new(&[2.0, 1.0, 3.0], 10.0).unwrap();

        for i in 0..1000 {
            let x = dist.sample(i as f64 / 1000.0).unwrap();

            assert!((0.0..10.0).contains(&x));
            assert_relative_eq!(dist.cdf(x), i as f64 / 1000.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_degenerate() {
        let zero = EmpiricalDistribution::new(&[0.0, 0.0], 1.0).unwrap();

        assert!(zero.density(0.5) == 0.0);
        assert!(zero.cdf(0.5) == 0.0);
        assert!(zero.sample(0.5).is_none());
        assert!(zero.mean() == 0.0);

        let tiny = EmpiricalDistribution::new(&[1.0], 0.0).unwrap();

        assert!(tiny.upper_bound() == MIN_UPPER_BOUND);

        assert!(EmpiricalDistribution::new(&[], 1.0).is_none());
        assert!(EmpiricalDistribution::new(&[1.0, -1.0], 1.0).is_none());
        assert!(EmpiricalDistribution::new(&[1.0, f64::NAN], 1.0).is_none());
        assert!(EmpiricalDistribution::new(&[1.0], f64::NAN).is_none());
    }
}

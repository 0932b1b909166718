use crate::{
    CalcError,
    base::{CalcSymbol, RandomSource},
    stats::EmpiricalDistribution,
};

/// The statistic an [`EmpiricalSymbol`] computes from its inline data vector.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EmpiricalStatistic {
    Density,
    Cdf,
    Random,
    Mean,
    Median,
    Quantile,
    StdDev,
    Variance,
    Cv,
}

impl EmpiricalStatistic {
    /// All statistics.
    pub const ALL: [Self; 9] = [
        Self::Density,
        Self::Cdf,
        Self::Random,
        Self::Mean,
        Self::Median,
        Self::Quantile,
        Self::StdDev,
        Self::Variance,
        Self::Cv,
    ];

    /// The names under which the statistic is exposed.
    pub fn names(&self) -> &'static [&'static str] {
        match self {
            Self::Density => &["EmpiricalDensity", "EmpirischeDichte"],
            Self::Cdf => &["EmpiricalDistribution", "EmpirischeVerteilung"],
            Self::Random => &["EmpiricalRandom", "EmpirischeZufallszahl"],
            Self::Mean => &[
                "EmpiricalDistributionMean",
                "EmpirischeVerteilungMittelwert",
            ],
            Self::Median => &["EmpiricalDistributionMedian", "EmpirischeVerteilungMedian"],
            Self::Quantile => &[
                "EmpiricalDistributionQuantil",
                "EmpiricalDistributionQuantile",
                "EmpirischeVerteilungQuantil",
            ],
            Self::StdDev => &[
                "EmpiricalDistributionSD",
                "EmpirischeVerteilungStandardabweichung",
            ],
            Self::Variance => &["EmpiricalDistributionVar", "EmpirischeVerteilungVarianz"],
            Self::Cv => &["EmpiricalDistributionCV", "EmpirischeVerteilungCV"],
        }
    }

    /// Number of parameters that are not part of the data vector (excluding the upper bound).
    fn extra_params(&self) -> usize {
        match self {
            Self::Density | Self::Cdf | Self::Quantile => 1,
            _ => 0,
        }
    }
}

/// A calculator symbol that builds an [`EmpiricalDistribution`] from its parameters.
///
/// The data vector is passed inline: `[w_0, .., w_m, upper]` for most statistics,
/// `[x, w_0, .., w_m, upper]` for the density and the cumulative distribution function and
/// `[w_0, .., w_m, upper, p]` for the quantile.
pub struct EmpiricalSymbol {
    names: Vec<String>,
    statistic: EmpiricalStatistic,
}

impl EmpiricalSymbol {
    /// Create a new [`EmpiricalSymbol`].
    pub fn new(statistic: EmpiricalStatistic) -> Self {
        Self {
            names: statistic
                .names()
                .iter()
                .map(|name| name.to_string())
                .collect(),
            statistic,
        }
    }

    /// The statistic computed by the symbol.
    pub fn statistic(&self) -> EmpiricalStatistic {
        self.statistic
    }
}

impl CalcSymbol for EmpiricalSymbol {
    fn evaluate(&mut self, params: &[f64], rng: &mut dyn RandomSource) -> Result<f64, CalcError> {
        // At least one weight plus the upper bound.
        if params.len() < self.statistic.extra_params() + 2 {
            return Err(CalcError::arity(self.name(), params.len()));
        }

        let (x, data) = match self.statistic {
            EmpiricalStatistic::Density | EmpiricalStatistic::Cdf => (params[0], &params[1..]),
            EmpiricalStatistic::Quantile => (params[params.len() - 1], &params[..params.len() - 1]),
            _ => (0.0, params),
        };

        let (weights, upper) = data.split_at(data.len() - 1);

        let dist = EmpiricalDistribution::new(weights, upper[0])
            .ok_or_else(|| CalcError::params(self.name(), "invalid empirical data"))?;

        Ok(match self.statistic {
            EmpiricalStatistic::Density => dist.density(x),
            EmpiricalStatistic::Cdf => dist.cdf(x),
            EmpiricalStatistic::Random => dist
                .sample(rng.next_uniform())
                .ok_or_else(|| CalcError::params(self.name(), "all weights are zero"))?,
            EmpiricalStatistic::Mean => dist.mean(),
            EmpiricalStatistic::Median => dist.median(),
            EmpiricalStatistic::Quantile => dist.quantile(x),
            EmpiricalStatistic::StdDev => dist.sd(),
            EmpiricalStatistic::Variance => dist.variance(),
            EmpiricalStatistic::Cv => dist.cv(),
        })
    }

    fn is_deterministic(&self) -> bool {
        self.statistic != EmpiricalStatistic::Random
    }

    fn names(&self) -> &[String] {
        &self.names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::seeded_rng;
    use approx::assert_relative_eq;

    fn calc(statistic: EmpiricalStatistic, params: &[f64]) -> Result<f64, CalcError> {
        EmpiricalSymbol::new(statistic).evaluate(params, &mut seeded_rng(1))
    }

    #[test]
    fn test_density_and_cdf() {
        for i in 0..=160 {
            let x = i as f64 / 10.0 - 1.0;

            let density = calc(EmpiricalStatistic::Density, &[x, 2.0, 1.0, 3.0, 10.0]).unwrap();
            let cdf = calc(EmpiricalStatistic::Cdf, &[x, 2.0, 1.0, 3.0, 10.0]).unwrap();

            if x < 0.0 {
                assert!(density == 0.0);
                assert!(cdf == 0.0);
            } else if x <= 3.3 {
                assert_relative_eq!(density, 2.0 / 6.0);
            } else if (3.4..=6.6).contains(&x) {
                assert_relative_eq!(density, 1.0 / 6.0);
            } else if (6.7..=10.0).contains(&x) {
                assert_relative_eq!(density, 3.0 / 6.0);
            } else if x > 10.0 {
                assert!(density == 0.0);
                assert!(cdf == 1.0);
            }
        }
    }

    #[test]
    fn test_statistics() {
        let data = [7.0, 2.0, 1.0, 3.0, 10.0, 5.0];

        assert_relative_eq!(
            calc(EmpiricalStatistic::Mean, &data).unwrap(),
            53.0 / 23.0,
            max_relative = 1e-12
        );
        assert!(calc(EmpiricalStatistic::Median, &data).unwrap() == 3.0);
        assert_relative_eq!(
            calc(EmpiricalStatistic::Variance, &data).unwrap(),
            3.081_285_444_234_403_8,
            max_relative = 1e-10
        );
        assert_relative_eq!(
            calc(EmpiricalStatistic::StdDev, &data).unwrap(),
            3.081_285_444_234_403_8f64.sqrt(),
            max_relative = 1e-10
        );
        assert_relative_eq!(
            calc(EmpiricalStatistic::Cv, &data).unwrap(),
            3.081_285_444_234_403_8f64.sqrt() / (53.0 / 23.0),
            max_relative = 1e-10
        );

        for (p, expected) in [(0.2, 0.0), (0.4, 2.0), (0.6, 4.0), (0.8, 4.0)] {
            let mut params = data.to_vec();
            params.push(p);

            assert!(calc(EmpiricalStatistic::Quantile, &params).unwrap() == expected);
        }
    }

    #[test]
    fn test_random() {
        let mut symbol = EmpiricalSymbol::new(EmpiricalStatistic::Random);
        let mut rng = seeded_rng(4);

        assert!(!symbol.is_deterministic());

        for _ in 0..1000 {
            let value = symbol.evaluate(&[2.0, 1.0, 3.0, 10.0], &mut rng).unwrap();

            assert!((0.0..10.0).contains(&value));
        }

        assert!(matches!(
            symbol.evaluate(&[0.0, 0.0, 10.0], &mut rng),
            Err(CalcError::InvalidParameters { .. })
        ));
    }

    #[test]
    fn test_invalid_calls() {
        assert!(matches!(
            calc(EmpiricalStatistic::Mean, &[5.0]),
            Err(CalcError::InvalidArity { count: 1, .. })
        ));
        assert!(matches!(
            calc(EmpiricalStatistic::Density, &[1.0, 5.0]),
            Err(CalcError::InvalidArity { count: 2, .. })
        ));
        assert!(matches!(
            calc(EmpiricalStatistic::Mean, &[1.0, -2.0, 5.0]),
            Err(CalcError::InvalidParameters { .. })
        ));

        assert!(EmpiricalStatistic::ALL
            .iter()
            .filter(|statistic| EmpiricalSymbol::new(**statistic).is_deterministic())
            .count()
            == 8);
    }
}

use crate::{
    math::{ZetaMemo, ln_binomial, ln_factorial},
    symbols::DiscreteFamily,
};
use std::sync::Arc;

/// Rounds `value` to the nearest integer, `None` for non-finite values.
fn rounded(value: f64) -> Option<f64> {
    value.is_finite().then(|| value.round())
}

fn binomial_pmf(n: f64, p: f64, k: u64) -> f64 {
    let k = k as f64;

    if k > n {
        return 0.0;
    }

    if p == 0.0 {
        return if k == 0.0 { 1.0 } else { 0.0 };
    } else if p == 1.0 {
        return if k == n { 1.0 } else { 0.0 };
    }

    (ln_binomial(n, k) + k * p.ln() + (n - k) * (1.0 - p).ln()).exp()
}

fn negative_binomial_pmf(r: f64, p: f64, k: u64) -> f64 {
    let k = k as f64;

    if p == 1.0 {
        return if k == 0.0 { 1.0 } else { 0.0 };
    }

    (ln_binomial(k + r - 1.0, k) + r * p.ln() + k * (1.0 - p).ln()).exp()
}

macro_rules! discrete_family {
    ($(#[$meta: meta])* $family: ident, [$($name: literal),+], $count: literal, |$params: ident, $k: ident| $body: expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default)]
        pub struct $family;

        impl DiscreteFamily for $family {
            fn names(&self) -> &'static [&'static str] {
                &[$($name),+]
            }

            fn param_count(&self) -> usize {
                $count
            }

            fn pmf(&self, $params: &[f64], $k: u64) -> Option<f64> {
                $body
            }
        }
    };
}

discrete_family!(
    /// The binomial distribution (number of trials, success probability).
    BinomialFamily,
    ["BinomialDist", "Binomialverteilung"],
    2,
    |params, k| {
        let (n, p) = (rounded(params[0])?, params[1]);

        if n < 1.0 || !(0.0..=1.0).contains(&p) {
            return None;
        }

        Some(binomial_pmf(n, p, k))
    }
);

discrete_family!(
    /// The binomial distribution, parameterized by mean and standard deviation.
    BinomialDirectFamily,
    ["BinomialDistDirect", "BinomialverteilungDirekt"],
    2,
    |params, k| {
        let (mean, sd) = (params[0], params[1]);

        let p = 1.0 - sd * sd / mean;

        if p.is_nan() || p <= 0.0 || p > 1.0 {
            return None;
        }

        let n = rounded(mean / p)?;

        if n < 1.0 {
            return None;
        }

        Some(binomial_pmf(n, p, k))
    }
);

discrete_family!(
    /// The geometric distribution, number of failures before the first success.
    GeometricFamily,
    ["GeometricDist", "GeometrischeVerteilung"],
    1,
    |params, k| {
        let p = params[0];

        if p.is_nan() || p <= 0.0 || p >= 1.0 {
            return None;
        }

        Some((p.ln() + k as f64 * (1.0 - p).ln()).exp())
    }
);

discrete_family!(
    /// The hypergeometric distribution (population size, successes in the population,
    /// number of draws).
    HyperGeomFamily,
    ["HypergeometricDist", "HypergeometrischeVerteilung"],
    3,
    |params, k| {
        let (total, successes, draws) = (
            rounded(params[0])?,
            rounded(params[1])?,
            rounded(params[2])?,
        );

        if total < 1.0
            || !(0.0..=total).contains(&successes)
            || !(0.0..=total).contains(&draws)
        {
            return None;
        }

        let k = k as f64;

        Some(
            (ln_binomial(successes, k) + ln_binomial(total - successes, draws - k)
                - ln_binomial(total, draws))
            .exp(),
        )
    }
);

discrete_family!(
    /// The negative binomial distribution, number of failures before the `r`-th success.
    NegativeBinomialFamily,
    ["NegativeBinomialDist", "NegativeBinomialverteilung"],
    2,
    |params, k| {
        let (r, p) = (rounded(params[0])?, params[1]);

        if r < 1.0 || !(0.0..=1.0).contains(&p) {
            return None;
        }

        Some(negative_binomial_pmf(r, p, k))
    }
);

discrete_family!(
    /// The negative binomial distribution, parameterized by mean and standard deviation.
    NegativeBinomialDirectFamily,
    ["NegativeBinomialDistDirect", "NegativeBinomialverteilungDirekt"],
    2,
    |params, k| {
        let (mean, sd) = (params[0], params[1]);

        let p = mean / (sd * sd);

        if p.is_nan() || p <= 0.0 || p >= 1.0 {
            return None;
        }

        let r = rounded(mean * p / (1.0 - p))?;

        if r < 1.0 {
            return None;
        }

        Some(negative_binomial_pmf(r, p, k))
    }
);

discrete_family!(
    /// The negative hypergeometric distribution, number of successes before the `r`-th
    /// failure when drawing without replacement (population size, successes in the
    /// population, failures to stop at).
    NegativeHyperGeomFamily,
    ["NegativeHypergeometricDist", "NegativeHypergeometrischeVerteilung"],
    3,
    |params, k| {
        let (total, successes, r) = (
            rounded(params[0])?,
            rounded(params[1])?,
            rounded(params[2])?,
        );

        if total < 1.0
            || !(0.0..=total).contains(&successes)
            || !(1.0..=total - successes).contains(&r)
        {
            return None;
        }

        let k = k as f64;

        Some(
            (ln_binomial(k + r - 1.0, k) + ln_binomial(total - r - k, successes - k)
                - ln_binomial(total, successes))
            .exp(),
        )
    }
);

discrete_family!(
    /// The Poisson distribution.
    PoissonFamily,
    ["PoissonDist", "PoissonVerteilung"],
    1,
    |params, k| {
        let lambda = params[0];

        if lambda.is_nan() || lambda <= 0.0 || lambda.is_infinite() {
            return None;
        }

        Some((k as f64 * lambda.ln() - lambda - ln_factorial(k)).exp())
    }
);

discrete_family!(
    /// The logarithmic (log-series) distribution on `k >= 1`.
    LogarithmicFamily,
    ["LogarithmicDist", "LogarithmischeVerteilung"],
    1,
    |params, k| {
        let p = params[0];

        if p.is_nan() || p <= 0.0 || p >= 1.0 {
            return None;
        }

        if k == 0 {
            return Some(0.0);
        }

        let k = k as f64;

        Some((k * p.ln() - k.ln()).exp() / -(-p).ln_1p())
    }
);

discrete_family!(
    /// The Borel distribution on `k >= 1`.
    BorelFamily,
    ["BorelDist", "BorelVerteilung"],
    1,
    |params, k| {
        let mu = params[0];

        if mu.is_nan() || mu <= 0.0 || mu >= 1.0 {
            return None;
        }

        if k == 0 {
            return Some(0.0);
        }

        let kf = k as f64;

        Some((-mu * kf + (kf - 1.0) * (mu * kf).ln() - ln_factorial(k)).exp())
    }
);

discrete_family!(
    /// The Planck (geometric with a rate parameter) distribution.
    PlanckFamily,
    ["PlanckDist", "PlanckVerteilung"],
    1,
    |params, k| {
        let lambda = params[0];

        if lambda.is_nan() || lambda <= 0.0 || lambda.is_infinite() {
            return None;
        }

        Some(-(-lambda).exp_m1() * (-lambda * k as f64).exp())
    }
);

discrete_family!(
    /// The Boltzmann distribution, the Planck distribution truncated to `k < N`.
    BoltzmannFamily,
    ["BoltzmannDist", "BoltzmannVerteilung"],
    2,
    |params, k| {
        let (lambda, n) = (params[0], rounded(params[1])?);

        if lambda.is_nan() || lambda <= 0.0 || lambda.is_infinite() || n < 1.0 {
            return None;
        }

        if k as f64 >= n {
            return Some(0.0);
        }

        Some((-lambda).exp_m1() * (-lambda * k as f64).exp() / (-lambda * n).exp_m1())
    }
);

discrete_family!(
    /// The discrete uniform distribution on `{a, .., b}`.
    DiscreteUniformFamily,
    ["DiscreteUniformDist", "DiskreteGleichverteilung"],
    2,
    |params, k| {
        let (a, b) = (rounded(params[0])?, rounded(params[1])?);

        if a < 0.0 || a > b {
            return None;
        }

        Some(if (a..=b).contains(&(k as f64)) {
            1.0 / (b - a + 1.0)
        } else {
            0.0
        })
    }
);

/// The zeta distribution on `k >= 1` with exponent `s > 1`.
///
/// The normalizing constant `ζ(s)` is taken from a [`ZetaMemo`] that may be shared between
/// symbol instances.
#[derive(Clone, Debug, Default)]
pub struct ZetaFamily {
    memo: Arc<ZetaMemo>,
}

impl ZetaFamily {
    /// Create a new [`ZetaFamily`] that normalizes with the given memo.
    pub fn new(memo: Arc<ZetaMemo>) -> Self {
        Self { memo }
    }

    /// The memo used for the normalizing constant.
    pub fn memo(&self) -> &Arc<ZetaMemo> {
        &self.memo
    }
}

impl DiscreteFamily for ZetaFamily {
    fn names(&self) -> &'static [&'static str] {
        &["ZetaDist", "ZetaVerteilung"]
    }

    fn param_count(&self) -> usize {
        1
    }

    fn pmf(&self, params: &[f64], k: u64) -> Option<f64> {
        let s = params[0];

        if s.is_nan() || s <= 1.0 || s.is_infinite() {
            return None;
        }

        if k == 0 {
            return Some(0.0);
        }

        Some((k as f64).powf(-s) / self.memo.zeta(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn total_mass(family: &dyn DiscreteFamily, params: &[f64], upto: u64) -> f64 {
        (0..=upto).map(|k| family.pmf(params, k).unwrap()).sum()
    }

    #[test]
    fn test_normalization() {
        assert_relative_eq!(total_mass(&PoissonFamily, &[4.0], 100), 1.0, epsilon = 1e-6);
        assert_relative_eq!(total_mass(&BinomialFamily, &[10.0, 0.3], 10), 1.0, epsilon = 1e-12);
        assert_relative_eq!(total_mass(&GeometricFamily, &[0.25], 200), 1.0, epsilon = 1e-12);
        assert_relative_eq!(
            total_mass(&HyperGeomFamily, &[20.0, 7.0, 5.0], 20),
            1.0,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            total_mass(&NegativeBinomialFamily, &[3.0, 0.4], 400),
            1.0,
            epsilon = 1e-10
        );
        assert_relative_eq!(
            total_mass(&NegativeHyperGeomFamily, &[20.0, 5.0, 3.0], 20),
            1.0,
            epsilon = 1e-12
        );
        assert_relative_eq!(total_mass(&LogarithmicFamily, &[0.5], 200), 1.0, epsilon = 1e-10);
        assert_relative_eq!(total_mass(&BorelFamily, &[0.5], 400), 1.0, epsilon = 1e-6);
        assert_relative_eq!(total_mass(&PlanckFamily, &[0.5], 200), 1.0, epsilon = 1e-10);
        assert_relative_eq!(
            total_mass(&BoltzmannFamily, &[0.5, 6.0], 20),
            1.0,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            total_mass(&DiscreteUniformFamily, &[2.0, 5.0], 20),
            1.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_reference_values() {
        assert_relative_eq!(
            BinomialFamily.pmf(&[10.0, 0.3], 3).unwrap(),
            120.0 * 0.3f64.powi(3) * 0.7f64.powi(7),
            max_relative = 1e-10
        );
        assert!(BinomialFamily.pmf(&[10.0, 0.3], 11).unwrap() == 0.0);
        assert!(BinomialFamily.pmf(&[10.0, 0.0], 0).unwrap() == 1.0);
        assert!(BinomialFamily.pmf(&[10.0, 1.0], 10).unwrap() == 1.0);

        assert_relative_eq!(
            PoissonFamily.pmf(&[4.0], 2).unwrap(),
            8.0 * (-4.0f64).exp(),
            max_relative = 1e-12
        );

        assert!(DiscreteUniformFamily.pmf(&[2.0, 5.0], 1).unwrap() == 0.0);
        assert!(DiscreteUniformFamily.pmf(&[2.0, 5.0], 3).unwrap() == 0.25);

        assert!(LogarithmicFamily.pmf(&[0.5], 0).unwrap() == 0.0);
        assert!(BorelFamily.pmf(&[0.5], 0).unwrap() == 0.0);
        assert!(BoltzmannFamily.pmf(&[0.5, 6.0], 6).unwrap() == 0.0);
    }

    #[test]
    fn test_direct_forms() {
        let sd = 2.1f64.sqrt();

        for k in 0..=10 {
            assert_relative_eq!(
                BinomialDirectFamily.pmf(&[3.0, sd], k).unwrap(),
                BinomialFamily.pmf(&[10.0, 0.3], k).unwrap(),
                max_relative = 1e-9
            );
        }

        // p = 0.5 and r = 4 give mean 4 and variance 8.
        let sd = 8.0f64.sqrt();

        for k in 0..=10 {
            assert_relative_eq!(
                NegativeBinomialDirectFamily.pmf(&[4.0, sd], k).unwrap(),
                NegativeBinomialFamily.pmf(&[4.0, 0.5], k).unwrap(),
                max_relative = 1e-9
            );
        }
    }

    #[test]
    fn test_zeta() {
        let family = ZetaFamily::new(Arc::new(ZetaMemo::new()));

        assert!(family.pmf(&[2.0], 0).unwrap() == 0.0);
        assert_relative_eq!(
            family.pmf(&[2.0], 1).unwrap(),
            6.0 / std::f64::consts::PI.powi(2),
            max_relative = 1e-12
        );

        for k in 1..100 {
            family.pmf(&[2.0], k).unwrap();
        }

        assert!(family.memo().recomputations() == 1);

        family.pmf(&[3.0], 1).unwrap();

        assert!(family.memo().recomputations() == 2);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(BinomialFamily.pmf(&[0.0, 0.5], 0).is_none());
        assert!(BinomialFamily.pmf(&[10.0, 1.5], 0).is_none());
        assert!(BinomialFamily.pmf(&[f64::NAN, 0.5], 0).is_none());
        assert!(BinomialDirectFamily.pmf(&[3.0, 2.0], 0).is_none());
        assert!(GeometricFamily.pmf(&[0.0], 0).is_none());
        assert!(GeometricFamily.pmf(&[1.0], 0).is_none());
        assert!(HyperGeomFamily.pmf(&[10.0, 11.0, 2.0], 0).is_none());
        assert!(HyperGeomFamily.pmf(&[10.0, 5.0, 12.0], 0).is_none());
        assert!(NegativeBinomialFamily.pmf(&[0.0, 0.5], 0).is_none());
        assert!(NegativeBinomialDirectFamily.pmf(&[4.0, 1.0], 0).is_none());
        assert!(NegativeHyperGeomFamily.pmf(&[10.0, 5.0, 6.0], 0).is_none());
        assert!(PoissonFamily.pmf(&[0.0], 0).is_none());
        assert!(LogarithmicFamily.pmf(&[1.0], 1).is_none());
        assert!(BorelFamily.pmf(&[1.0], 1).is_none());
        assert!(PlanckFamily.pmf(&[-1.0], 1).is_none());
        assert!(BoltzmannFamily.pmf(&[1.0, 0.0], 1).is_none());
        assert!(DiscreteUniformFamily.pmf(&[5.0, 2.0], 1).is_none());
        assert!(DiscreteUniformFamily.pmf(&[-1.0, 2.0], 1).is_none());
        assert!(ZetaFamily::default().pmf(&[1.0], 1).is_none());
    }
}

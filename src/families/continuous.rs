use crate::{
    stats::{
        ArcsineDensity, ContinuousDensity, FrechetDensity, HalfCauchyDensity, HalfNormalDensity,
        HyperbolicSecantDensity, IrwinHallDensity, LevyDensity, LogLaplaceDensity,
        LogLogisticDensity, LogisticDensity, MaxwellBoltzmannDensity, OnePointDensity,
        RayleighDensity, ReciprocalDensity, SawtoothDensity, SawtoothSide, ScaledBetaDensity,
        TrapezoidDensity, UQuadraticDensity,
    },
    symbols::ContinuousFamily,
};
use num_traits::ToPrimitive;
use statrs::{
    consts::EULER_MASCHERONI,
    distribution::{
        Cauchy, Chi, ChiSquared, Erlang, Exp, FisherSnedecor, Gamma, Gumbel, InverseGamma,
        Laplace, LogNormal, Normal, Pareto, StudentsT, Triangular, Uniform, Weibull,
    },
};
use std::f64::consts::PI;

fn boxed<D>(density: D) -> Box<dyn ContinuousDensity>
where
    D: ContinuousDensity + 'static,
{
    Box::new(density)
}

fn one_point(value: f64) -> Option<Box<dyn ContinuousDensity>> {
    Some(boxed(OnePointDensity::new(value)?))
}

/// Rounds `value` to the nearest integer, `None` if that is not a positive `u64`.
fn positive_integer(value: f64) -> Option<u64> {
    value.round().to_u64().filter(|n| *n >= 1)
}

macro_rules! continuous_family {
    ($(#[$meta: meta])* $family: ident, [$($name: literal),+], $count: literal, |$params: ident| $body: expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default)]
        pub struct $family;

        impl ContinuousFamily for $family {
            fn names(&self) -> &'static [&'static str] {
                &[$($name),+]
            }

            fn param_count(&self) -> usize {
                $count
            }

            fn make_distribution(&self, $params: &[f64]) -> Option<Box<dyn ContinuousDensity>> {
                $body
            }
        }
    };
}

continuous_family!(
    /// The exponential distribution, parameterized by its mean.
    ExpFamily,
    ["ExpDist", "Exponentialverteilung"],
    1,
    |params| {
        let mean = params[0];

        if mean.is_nan() || mean <= 0.0 {
            return None;
        }

        Some(boxed(Exp::new(1.0 / mean).ok()?))
    }
);

continuous_family!(
    /// The continuous uniform distribution on `[min, max]`, collapses to a single point for
    /// `min = max`.
    UniformFamily,
    ["UniformDist", "Gleichverteilung"],
    2,
    |params| {
        let (min, max) = (params[0], params[1]);

        if min == max {
            return one_point(min);
        }

        Some(boxed(Uniform::new(min, max).ok()?))
    }
);

continuous_family!(
    /// The normal distribution (mean, standard deviation), collapses to a single point for a
    /// vanishing standard deviation.
    NormalFamily,
    ["NormalDist", "Normalverteilung"],
    2,
    |params| {
        let (mean, sd) = (params[0], params[1]);

        if sd == 0.0 {
            return one_point(mean);
        }

        Some(boxed(Normal::new(mean, sd).ok()?))
    }
);

continuous_family!(
    /// The log-normal distribution, parameterized by the mean and standard deviation of the
    /// variate itself (not of its logarithm).
    LogNormalFamily,
    ["LogNormalDist", "LogNormalverteilung"],
    2,
    |params| {
        let (mean, sd) = (params[0], params[1]);

        if mean.is_nan() || mean <= 0.0 {
            return None;
        }

        if sd <= 0.0 {
            return one_point(mean);
        }

        let variance = (1.0 + (sd / mean).powi(2)).ln();

        Some(boxed(LogNormal::new(mean.ln() - variance / 2.0, variance.sqrt()).ok()?))
    }
);

continuous_family!(
    /// The gamma distribution (shape, scale).
    GammaFamily,
    ["GammaDist", "Gammaverteilung"],
    2,
    |params| {
        let (shape, scale) = (params[0], params[1]);

        if scale.is_nan() || scale <= 0.0 {
            return None;
        }

        Some(boxed(Gamma::new(shape, 1.0 / scale).ok()?))
    }
);

continuous_family!(
    /// The gamma distribution, parameterized by mean and standard deviation.
    GammaDirectFamily,
    ["GammaDistDirect", "GammaverteilungDirekt"],
    2,
    |params| {
        let (mean, sd) = (params[0], params[1]);

        if mean.is_nan() || mean <= 0.0 {
            return None;
        }

        if sd <= 0.0 {
            return one_point(mean);
        }

        let shape = (mean / sd).powi(2);
        let rate = mean / sd.powi(2);

        Some(boxed(Gamma::new(shape, rate).ok()?))
    }
);

continuous_family!(
    /// The beta distribution on `[min, max]` (min, max, α, β).
    BetaFamily,
    ["BetaDist", "Betaverteilung"],
    4,
    |params| Some(boxed(ScaledBetaDensity::new(
        (params[0], params[1]),
        params[2],
        params[3]
    )?))
);

continuous_family!(
    /// The beta distribution on `[min, max]`, parameterized by mean and standard deviation.
    BetaDirectFamily,
    ["BetaDistDirect", "BetaverteilungDirekt"],
    4,
    |params| {
        let (min, max, mean, sd) = (params[0], params[1], params[2], params[3]);

        if !((min < mean) && (mean < max)) {
            return None;
        }

        if sd <= 0.0 {
            return one_point(mean);
        }

        let m = (mean - min) / (max - min);
        let v = (sd / (max - min)).powi(2);

        let common = m * (1.0 - m) / v - 1.0;

        Some(boxed(ScaledBetaDensity::new(
            (min, max),
            m * common,
            (1.0 - m) * common,
        )?))
    }
);

continuous_family!(
    /// The Weibull distribution `F(x) = 1 - exp(-(λx)^k)` (inverse scale λ, form k).
    WeibullFamily,
    ["WeibullDist", "Weibullverteilung"],
    2,
    |params| {
        let (inverse_scale, form) = (params[0], params[1]);

        if inverse_scale.is_nan() || inverse_scale <= 0.0 {
            return None;
        }

        Some(boxed(Weibull::new(form, 1.0 / inverse_scale).ok()?))
    }
);

continuous_family!(
    /// The Cauchy distribution (location, scale).
    CauchyFamily,
    ["CauchyDist", "Cauchyverteilung"],
    2,
    |params| Some(boxed(Cauchy::new(params[0], params[1]).ok()?))
);

continuous_family!(
    /// The chi-squared distribution (degrees of freedom).
    ChiSquareFamily,
    ["ChiSquareDist", "ChiQuadratVerteilung"],
    1,
    |params| Some(boxed(ChiSquared::new(params[0]).ok()?))
);

continuous_family!(
    /// The chi distribution (integer degrees of freedom).
    ChiFamily,
    ["ChiDist", "ChiVerteilung"],
    1,
    |params| {
        let freedom = params[0];

        if freedom.fract() != 0.0 {
            return None;
        }

        Some(boxed(Chi::new(positive_integer(freedom)?).ok()?))
    }
);

continuous_family!(
    /// The F distribution (numerator and denominator degrees of freedom).
    FFamily,
    ["FDist", "FVerteilung"],
    2,
    |params| Some(boxed(FisherSnedecor::new(params[0], params[1]).ok()?))
);

continuous_family!(
    /// The Laplace distribution (location, scale).
    LaplaceFamily,
    ["LaplaceDist", "LaplaceVerteilung"],
    2,
    |params| Some(boxed(Laplace::new(params[0], params[1]).ok()?))
);

continuous_family!(
    /// The Pareto distribution (minimum `x_m`, shape α).
    ParetoFamily,
    ["ParetoDist", "ParetoVerteilung"],
    2,
    |params| Some(boxed(Pareto::new(params[0], params[1]).ok()?))
);

continuous_family!(
    /// The logistic distribution (location, scale).
    LogisticFamily,
    ["LogisticDist", "LogistischeVerteilung"],
    2,
    |params| Some(boxed(LogisticDensity::new(params[0], params[1])?))
);

continuous_family!(
    /// The triangular distribution (min, mode, max).
    TriangularFamily,
    ["TriangularDist", "Dreiecksverteilung"],
    3,
    |params| {
        let (min, mode, max) = (params[0], params[1], params[2]);

        if !((min <= mode) && (mode <= max) && (min < max)) {
            return None;
        }

        Some(boxed(Triangular::new(min, max, mode).ok()?))
    }
);

continuous_family!(
    /// Student's t-distribution with unit scale (location μ, degrees of freedom ν).
    StudentTFamily,
    ["StudentTDist", "StudentTVerteilung"],
    2,
    |params| Some(boxed(StudentsT::new(params[0], 1.0, params[1]).ok()?))
);

continuous_family!(
    /// The Gumbel distribution (location, scale).
    GumbelFamily,
    ["GumbelDist", "GumbelVerteilung"],
    2,
    |params| Some(boxed(Gumbel::new(params[0], params[1]).ok()?))
);

continuous_family!(
    /// The Gumbel distribution, parameterized by mean and standard deviation.
    GumbelDirectFamily,
    ["GumbelDistDirect", "GumbelVerteilungDirekt"],
    2,
    |params| {
        let (mean, sd) = (params[0], params[1]);

        if sd <= 0.0 {
            return one_point(mean);
        }

        let scale = sd * 6.0f64.sqrt() / PI;

        Some(boxed(Gumbel::new(mean - scale * EULER_MASCHERONI, scale).ok()?))
    }
);

continuous_family!(
    /// The half-Cauchy distribution (location, scale).
    HalfCauchyFamily,
    ["HalfCauchyDist", "HalbeCauchyVerteilung"],
    2,
    |params| Some(boxed(HalfCauchyDensity::new(params[0], params[1])?))
);

continuous_family!(
    /// The half-normal distribution starting at `s`, with mean `s + μ` (shift s, μ).
    HalfNormalFamily,
    ["HalfNormalDist", "HalbeNormalverteilung"],
    2,
    |params| {
        let (shift, mean) = (params[0], params[1]);

        if mean.is_nan() || mean <= 0.0 {
            return None;
        }

        Some(boxed(HalfNormalDensity::new(shift, mean * (PI / 2.0).sqrt())?))
    }
);

continuous_family!(
    /// The inverse gamma distribution (shape, scale).
    InverseGammaFamily,
    ["InverseGammaDist", "InverseGammaVerteilung"],
    2,
    |params| Some(boxed(InverseGamma::new(params[0], params[1]).ok()?))
);

continuous_family!(
    /// The log-Laplace distribution (location and scale of the logarithm).
    LogLaplaceFamily,
    ["LogLaplaceDist", "LogLaplaceVerteilung"],
    2,
    |params| Some(boxed(LogLaplaceDensity::new(params[0], params[1])?))
);

continuous_family!(
    /// The Irwin-Hall distribution (number of summands, rounded).
    IrwinHallFamily,
    ["IrwinHallDist", "IrwinHallVerteilung"],
    1,
    |params| Some(boxed(IrwinHallDensity::new(positive_integer(params[0])?)?))
);

continuous_family!(
    /// The Irwin-Hall distribution, parameterized by its mean (`n = round(2 mean)`).
    IrwinHallDirectFamily,
    ["IrwinHallDistDirect", "IrwinHallVerteilungDirekt"],
    1,
    |params| Some(boxed(IrwinHallDensity::new(positive_integer(2.0 * params[0])?)?))
);

continuous_family!(
    /// A density falling linearly from `a` to `b`.
    LeftSawtoothFamily,
    ["LeftSawtoothDist", "LinkeSaegezahnVerteilung"],
    2,
    |params| Some(boxed(SawtoothDensity::new(
        (params[0], params[1]),
        SawtoothSide::Left
    )?))
);

continuous_family!(
    /// A falling sawtooth density, parameterized by mean and standard deviation.
    LeftSawtoothDirectFamily,
    ["LeftSawtoothDistDirect", "LinkeSaegezahnVerteilungDirekt"],
    2,
    |params| {
        if params[1] <= 0.0 {
            return one_point(params[0]);
        }

        Some(boxed(SawtoothDensity::from_moments(
            params[0],
            params[1],
            SawtoothSide::Left,
        )?))
    }
);

continuous_family!(
    /// A density rising linearly from `a` to `b`.
    RightSawtoothFamily,
    ["RightSawtoothDist", "RechteSaegezahnVerteilung"],
    2,
    |params| Some(boxed(SawtoothDensity::new(
        (params[0], params[1]),
        SawtoothSide::Right
    )?))
);

continuous_family!(
    /// A rising sawtooth density, parameterized by mean and standard deviation.
    RightSawtoothDirectFamily,
    ["RightSawtoothDistDirect", "RechteSaegezahnVerteilungDirekt"],
    2,
    |params| {
        if params[1] <= 0.0 {
            return one_point(params[0]);
        }

        Some(boxed(SawtoothDensity::from_moments(
            params[0],
            params[1],
            SawtoothSide::Right,
        )?))
    }
);

continuous_family!(
    /// The Erlang distribution (integer shape n, scale λ).
    ErlangFamily,
    ["ErlangDist", "ErlangVerteilung"],
    2,
    |params| {
        let (shape, scale) = (params[0], params[1]);

        if shape.fract() != 0.0 || scale.is_nan() || scale <= 0.0 {
            return None;
        }

        Some(boxed(Erlang::new(positive_integer(shape)?, 1.0 / scale).ok()?))
    }
);

continuous_family!(
    /// The trapezoidal distribution with corners `a ≤ b ≤ c ≤ d`, collapses to a single point
    /// for `a = max(b, c, d)`.
    TrapezoidFamily,
    ["TrapezoidDist", "Trapezverteilung"],
    4,
    |params| {
        let (a, b, c, d) = (params[0], params[1], params[2], params[3]);

        if b.max(c).max(d) <= a {
            return one_point(a);
        }

        Some(boxed(TrapezoidDensity::new(a, b, c, d)?))
    }
);

continuous_family!(
    /// The PERT distribution (lower, most likely, upper), a beta distribution with mean
    /// `(lower + 4 mode + upper) / 6`.
    PertFamily,
    ["PertDist", "PertVerteilung"],
    3,
    |params| {
        let (min, mode, max) = (params[0], params[1], params[2]);

        if !((min <= mode) && (mode <= max) && (min < max)) {
            return None;
        }

        let width = max - min;

        Some(boxed(ScaledBetaDensity::new(
            (min, max),
            1.0 + 4.0 * (mode - min) / width,
            1.0 + 4.0 * (max - mode) / width,
        )?))
    }
);

continuous_family!(
    /// The Rayleigh distribution, parameterized by its mean.
    RayleighFamily,
    ["RayleighDist", "RayleighDistribution", "RayleighVerteilung"],
    1,
    |params| Some(boxed(RayleighDensity::from_mean(params[0])?))
);

continuous_family!(
    /// The log-logistic distribution (scale α, shape β).
    LogLogisticFamily,
    ["LogLogisticDist", "LogLogisticDistribution", "LogLogistischeVerteilung"],
    2,
    |params| Some(boxed(LogLogisticDensity::new(params[0], params[1])?))
);

continuous_family!(
    /// The Fréchet distribution (location δ, scale β, shape α).
    FrechetFamily,
    ["FrechetDist", "FrechetDistribution", "FrechetVerteilung"],
    3,
    |params| Some(boxed(FrechetDensity::new(params[0], params[1], params[2])?))
);

continuous_family!(
    /// The hyperbolic secant distribution (mean, standard deviation).
    HyperbolicSecantFamily,
    [
        "HyperbolicSecantDist",
        "HyperbolicSecantDistribution",
        "HyperbolischeSekantenVerteilung"
    ],
    2,
    |params| Some(boxed(HyperbolicSecantDensity::new(params[0], params[1])?))
);

continuous_family!(
    /// The Lévy distribution (location μ, scale c).
    LevyFamily,
    ["LevyDist", "LevyVerteilung"],
    2,
    |params| Some(boxed(LevyDensity::new(params[0], params[1])?))
);

continuous_family!(
    /// The Maxwell-Boltzmann distribution (scale a).
    MaxwellBoltzmannFamily,
    ["MaxwellBoltzmannDist", "MaxwellBoltzmannVerteilung"],
    1,
    |params| Some(boxed(MaxwellBoltzmannDensity::new(params[0])?))
);

continuous_family!(
    /// The U-quadratic distribution on `[a, b]`.
    UQuadraticFamily,
    ["UQuadraticDist", "UQuadratischeVerteilung"],
    2,
    |params| Some(boxed(UQuadraticDensity::new((params[0], params[1]))?))
);

continuous_family!(
    /// The reciprocal distribution on `[a, b]`, `0 < a < b`.
    ReciprocalFamily,
    ["ReciprocalDist", "ReziprokeVerteilung"],
    2,
    |params| Some(boxed(ReciprocalDensity::new((params[0], params[1]))?))
);

continuous_family!(
    /// The arcsine distribution on `[a, b]`.
    ArcsineFamily,
    ["ArcsineDist", "ArcusSinusVerteilung"],
    2,
    |params| Some(boxed(ArcsineDensity::new((params[0], params[1]))?))
);

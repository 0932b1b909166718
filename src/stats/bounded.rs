use crate::stats::{ContinuousDensity, DensityRange, invert_cdf};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_2_PI, FRAC_PI_2, PI};

/// A trapezoidal density rising on `[a, b]`, flat on `[b, c]` and falling on `[c, d]`.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct TrapezoidDensity {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    height: f64,
}

impl TrapezoidDensity {
    /// Create a new [`TrapezoidDensity`].
    ///
    /// Corners that undercut their predecessor are raised to it, so `(50, 40, 60, 40)` becomes
    /// `(50, 50, 60, 60)`. Returns `None` if the resulting support is empty or not finite.
    pub fn new(a: f64, b: f64, c: f64, d: f64) -> Option<Self> {
        let b = b.max(a);
        let c = c.max(b);
        let d = d.max(c);

        let range = DensityRange::try_new((a, d))?;

        if !range.width().is_finite() {
            return None;
        }

        Some(Self {
            a,
            b,
            c,
            d,
            height: 2.0 / (d + c - a - b),
        })
    }
}

impl ContinuousDensity for TrapezoidDensity {
    fn density(&self, x: f64) -> f64 {
        if !(self.a..=self.d).contains(&x) {
            0.0
        } else if x < self.b {
            self.height * (x - self.a) / (self.b - self.a)
        } else if x <= self.c {
            self.height
        } else {
            self.height * (self.d - x) / (self.d - self.c)
        }
    }

    fn cdf(&self, x: f64) -> f64 {
        if x <= self.a {
            0.0
        } else if x >= self.d {
            1.0
        } else if x < self.b {
            self.height * (x - self.a).powi(2) / (2.0 * (self.b - self.a))
        } else if x < self.c {
            self.height * ((self.b - self.a) / 2.0 + (x - self.b))
        } else {
            1.0 - self.height * (self.d - x).powi(2) / (2.0 * (self.d - self.c))
        }
    }

    fn inverse_cdf(&self, p: f64) -> f64 {
        invert_cdf(|x| self.cdf(x), (self.a, self.d), p)
    }

    fn mean(&self) -> Option<f64> {
        let (a, b, c, d) = (self.a, self.b, self.c, self.d);

        Some((d * d + d * c + c * c - b * b - b * a - a * a) / (3.0 * (d + c - b - a)))
    }

    fn variance(&self) -> Option<f64> {
        let (a, b, c, d) = (self.a, self.b, self.c, self.d);

        let second = (d.powi(3) + d * d * c + d * c * c + c.powi(3)
            - b.powi(3)
            - b * b * a
            - b * a * a
            - a.powi(3))
            / (6.0 * (d + c - b - a));

        Some(second - self.mean()?.powi(2))
    }
}

/// The U-quadratic distribution on `[a, b]`.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct UQuadraticDensity {
    range: DensityRange,
}

impl UQuadraticDensity {
    /// Create a new [`UQuadraticDensity`], requires `a < b`.
    pub fn new(minamax: (f64, f64)) -> Option<Self> {
        let range = DensityRange::try_new(minamax)?;

        range.width().is_finite().then_some(Self { range })
    }

    fn alpha(&self) -> f64 {
        12.0 / self.range.width().powi(3)
    }
}

impl ContinuousDensity for UQuadraticDensity {
    fn density(&self, x: f64) -> f64 {
        if !self.range.contains(x) {
            return 0.0;
        }

        self.alpha() * (x - self.range.midpoint()).powi(2)
    }

    fn cdf(&self, x: f64) -> f64 {
        if x <= self.range.min() {
            return 0.0;
        } else if x >= self.range.max() {
            return 1.0;
        }

        let beta = self.range.midpoint();

        self.alpha() / 3.0 * ((x - beta).powi(3) + (beta - self.range.min()).powi(3))
    }

    fn inverse_cdf(&self, p: f64) -> f64 {
        let beta = self.range.midpoint();

        beta + (3.0 * p / self.alpha() - (beta - self.range.min()).powi(3)).cbrt()
    }

    fn mean(&self) -> Option<f64> {
        Some(self.range.midpoint())
    }

    fn variance(&self) -> Option<f64> {
        Some(3.0 / 20.0 * self.range.width().powi(2))
    }
}

/// The reciprocal (log-uniform) distribution on `[a, b]` with `0 < a < b`.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ReciprocalDensity {
    range: DensityRange,
}

impl ReciprocalDensity {
    /// Create a new [`ReciprocalDensity`], requires `0 < a < b`.
    pub fn new(minamax: (f64, f64)) -> Option<Self> {
        let range = DensityRange::try_new(minamax)?;

        (range.min() > 0.0 && range.max().is_finite()).then_some(Self { range })
    }

    fn log_ratio(&self) -> f64 {
        (self.range.max() / self.range.min()).ln()
    }
}

impl ContinuousDensity for ReciprocalDensity {
    fn density(&self, x: f64) -> f64 {
        if !self.range.contains(x) {
            return 0.0;
        }

        1.0 / (x * self.log_ratio())
    }

    fn cdf(&self, x: f64) -> f64 {
        if x <= self.range.min() {
            return 0.0;
        } else if x >= self.range.max() {
            return 1.0;
        }

        (x / self.range.min()).ln() / self.log_ratio()
    }

    fn inverse_cdf(&self, p: f64) -> f64 {
        self.range.min() * (self.range.max() / self.range.min()).powf(p)
    }

    fn mean(&self) -> Option<f64> {
        Some(self.range.width() / self.log_ratio())
    }

    fn variance(&self) -> Option<f64> {
        let (a, b) = (self.range.min(), self.range.max());

        Some((b * b - a * a) / (2.0 * self.log_ratio()) - self.mean()?.powi(2))
    }
}

/// The arcsine distribution on `[a, b]`.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ArcsineDensity {
    range: DensityRange,
}

impl ArcsineDensity {
    /// Create a new [`ArcsineDensity`], requires `a < b`.
    pub fn new(minamax: (f64, f64)) -> Option<Self> {
        let range = DensityRange::try_new(minamax)?;

        range.width().is_finite().then_some(Self { range })
    }
}

impl ContinuousDensity for ArcsineDensity {
    fn density(&self, x: f64) -> f64 {
        if !self.range.contains(x) {
            return 0.0;
        }

        1.0 / (PI * ((x - self.range.min()) * (self.range.max() - x)).sqrt())
    }

    fn cdf(&self, x: f64) -> f64 {
        if x <= self.range.min() {
            return 0.0;
        } else if x >= self.range.max() {
            return 1.0;
        }

        FRAC_2_PI * ((x - self.range.min()) / self.range.width()).sqrt().asin()
    }

    fn inverse_cdf(&self, p: f64) -> f64 {
        self.range.min() + self.range.width() * (FRAC_PI_2 * p).sin().powi(2)
    }

    fn mean(&self) -> Option<f64> {
        Some(self.range.midpoint())
    }

    fn variance(&self) -> Option<f64> {
        Some(self.range.width().powi(2) / 8.0)
    }
}

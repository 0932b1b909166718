use statrs::function::gamma::ln_gamma;

/// Largest `n` for which `n!` is finite in double precision.
const FACTORIAL_MAX: usize = 170;

/// A look up table for factorials up to n = 170.
static FACTORIAL_LUT: [f64; FACTORIAL_MAX + 1] = {
    let mut lut = [1.0; FACTORIAL_MAX + 1];

    let mut n = 2;

    while n <= FACTORIAL_MAX {
        lut[n] = lut[n - 1] * n as f64;
        n += 1;
    }

    lut
};

/// Computes the factorial `n!`.
///
/// Returns infinity if n > 170.
pub fn factorial(n: u64) -> f64 {
    match usize::try_from(n) {
        Ok(n) if n <= FACTORIAL_MAX => FACTORIAL_LUT[n],
        _ => f64::INFINITY,
    }
}

/// Computes `ln(n!)`, exact table look-up for small `n`.
pub fn ln_factorial(n: u64) -> f64 {
    match usize::try_from(n) {
        Ok(n) if n <= FACTORIAL_MAX => FACTORIAL_LUT[n].ln(),
        _ => ln_gamma(n as f64 + 1.0),
    }
}

/// Computes the natural logarithm of the generalized binomial coefficient `C(n, k)` for real
/// `n >= k >= 0`.
///
/// Returns negative infinity where the coefficient is zero (`k < 0` or `k > n`).
pub fn ln_binomial(n: f64, k: f64) -> f64 {
    if k < 0.0 || k > n || n.is_nan() || k.is_nan() {
        return f64::NEG_INFINITY;
    }

    ln_gamma(n + 1.0) - ln_gamma(k + 1.0) - ln_gamma(n - k + 1.0)
}

/// Computes the generalized binomial coefficient `C(n, k)` for real `n >= k >= 0`.
///
/// Small integer arguments are evaluated exactly via the factorial table.
pub fn binomial(n: f64, k: f64) -> f64 {
    if k < 0.0 || k > n || n.is_nan() || k.is_nan() {
        return 0.0;
    }

    if n.fract() == 0.0 && k.fract() == 0.0 && n <= FACTORIAL_MAX as f64 {
        let (n, k) = (n as u64, k as u64);

        return (factorial(n) / factorial(k) / factorial(n - k)).round();
    }

    ln_binomial(n, k).exp()
}

use crate::base::RandomSource;
use itertools::Itertools;
use log::debug;
use nalgebra::{DMatrix, DVector};
use thiserror::Error;

/// Tolerance for the initial vector sum and the generator row sums.
pub const PHASE_TYPE_TOLERANCE: f64 = 1e-10;

/// Jump probabilities below this threshold are treated as exactly zero.
const NEGLIGIBLE_PROBABILITY: f64 = 1e-12;

/// Errors raised when validating the parameters of a [`PhaseTypeChain`].
#[allow(missing_docs)]
#[derive(Debug, Error, PartialEq)]
pub enum PhaseTypeError {
    #[error("{0} arguments do not describe an n x n matrix followed by an n vector")]
    InvalidLength(usize),
    #[error("initial probability {index} is negative or not finite")]
    NegativeInitial { index: usize },
    #[error("initial probabilities sum to {0} instead of 1")]
    InitialSum(f64),
    #[error("diagonal entry ({row}, {row}) is not strictly negative")]
    Diagonal { row: usize },
    #[error("off-diagonal entry ({row}, {col}) is negative or not finite")]
    OffDiagonal { row: usize, col: usize },
    #[error("row {row} sums to {sum} > 0")]
    RowSum { row: usize, sum: f64 },
    #[error("state {0} can be entered but never reaches absorption")]
    Unreachable(usize),
}

impl PhaseTypeError {
    /// A short static description, used as the reason of a calculation error.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::InvalidLength(_) => "argument count is not n² + n",
            Self::NegativeInitial { .. } => "negative initial probability",
            Self::InitialSum(_) => "initial probabilities do not sum to 1",
            Self::Diagonal { .. } => "diagonal entry is not negative",
            Self::OffDiagonal { .. } => "negative off-diagonal entry",
            Self::RowSum { .. } => "positive row sum",
            Self::Unreachable(_) => "absorption is unreachable",
        }
    }
}

/// Recovers `n` from an argument count `len = n² + n`, returns `None` for any other count.
pub fn phase_type_states(len: usize) -> Option<usize> {
    let root = ((4.0 * len as f64 + 1.0).sqrt() - 1.0) / 2.0;
    let n = root.round() as usize;

    (n >= 1 && n.checked_mul(n + 1) == Some(len)).then_some(n)
}

/// A continuous-time Markov chain with one absorbing state, used to sample phase-type
/// distributed absorption times.
///
/// The chain is defined by a sub-generator matrix `S` (n x n) and an initial probability vector
/// `α` (length n). The absorbing state carries the index `n`.
///
/// All buffers are kept across calls and only reallocated when `n` changes, the values
/// are refreshed by every call to [`PhaseTypeChain::update`].
#[derive(Clone, Debug)]
pub struct PhaseTypeChain {
    states: usize,
    generator: DMatrix<f64>,
    initial: DVector<f64>,
    sojourn: DVector<f64>,
    jumps: DMatrix<f64>,
    initial_cdf: DVector<f64>,
    reallocations: usize,
    valid: bool,
}

impl PhaseTypeChain {
    /// Create a new, empty [`PhaseTypeChain`].
    pub fn new() -> Self {
        Self {
            states: 0,
            generator: DMatrix::zeros(0, 0),
            initial: DVector::zeros(0),
            sojourn: DVector::zeros(0),
            jumps: DMatrix::zeros(0, 1),
            initial_cdf: DVector::zeros(0),
            reallocations: 0,
            valid: false,
        }
    }

    /// The cumulative jump table, row `i` holds the cumulative probabilities of jumping from
    /// state `i` into the states `0..n` followed by the absorbing state `n`.
    pub fn jump_table(&self) -> &DMatrix<f64> {
        &self.jumps
    }

    /// Number of buffer (re-)allocations, changes only if the number of states changes.
    pub fn reallocations(&self) -> usize {
        self.reallocations
    }

    /// Draw a single absorption time.
    ///
    /// Returns `None` if the chain has not been successfully updated yet.
    pub fn sample(&self, rng: &mut dyn RandomSource) -> Option<f64> {
        if !self.valid {
            return None;
        }

        let n = self.states;

        let mut time = 0.0;
        let mut state = first_exceeding(self.initial_cdf.iter(), rng.next_uniform()).unwrap_or(n);

        while state < n {
            time -= rng.next_open_uniform().ln() * self.sojourn[state];

            state = first_exceeding(self.jumps.row(state).iter(), rng.next_uniform()).unwrap_or(n);
        }

        Some(time)
    }

    /// The mean holding time of each transient state.
    pub fn sojourn_times(&self) -> &DVector<f64> {
        &self.sojourn
    }

    /// The number of transient states.
    pub fn states(&self) -> usize {
        self.states
    }

    /// Load a new sub-generator matrix and initial vector from the flat argument layout
    /// `[S(0, 0..n), .., S(n - 1, 0..n), α(0..n)]`, validate them and rebuild the derived tables.
    pub fn update(&mut self, params: &[f64]) -> Result<(), PhaseTypeError> {
        self.valid = false;

        let n = phase_type_states(params.len()).ok_or(PhaseTypeError::InvalidLength(params.len()))?;

        if n != self.states {
            debug!(
                "PhaseTypeChain::update reallocating buffers ({} -> {} states)",
                self.states, n
            );

            self.states = n;
            self.generator = DMatrix::zeros(n, n);
            self.initial = DVector::zeros(n);
            self.sojourn = DVector::zeros(n);
            self.jumps = DMatrix::zeros(n, n + 1);
            self.initial_cdf = DVector::zeros(n);
            self.reallocations += 1;
        }

        for i in 0..n {
            for j in 0..n {
                self.generator[(i, j)] = params[i * n + j];
            }

            self.initial[i] = params[n * n + i];
        }

        self.validate()?;
        self.build_tables();
        self.check_absorption()?;

        self.valid = true;

        Ok(())
    }

    fn build_tables(&mut self) {
        let n = self.states;

        for i in 0..n {
            self.sojourn[i] = -1.0 / self.generator[(i, i)];

            let mut total = 0.0;

            for j in 0..n {
                let probability = if i == j {
                    0.0
                } else {
                    self.generator[(i, j)] * self.sojourn[i]
                };

                total += probability;
                self.jumps[(i, j)] = probability;
            }

            let absorption = 1.0 - total;

            self.jumps[(i, n)] = if absorption < NEGLIGIBLE_PROBABILITY {
                0.0
            } else {
                absorption
            };

            let mut row = self.jumps.row_mut(i);

            cumulate(row.iter_mut());
        }

        self.initial_cdf.copy_from(&self.initial);

        cumulate(self.initial_cdf.iter_mut());
    }

    /// Every state that can be entered must have a path into the absorbing state, otherwise
    /// a trajectory never terminates.
    fn check_absorption(&self) -> Result<(), PhaseTypeError> {
        let n = self.states;

        let probability = |i: usize, j: usize| {
            let previous = if j == 0 { 0.0 } else { self.jumps[(i, j - 1)] };

            self.jumps[(i, j)] - previous
        };

        let mut absorbing = (0..n).map(|i| probability(i, n) > 0.0).collect::<Vec<bool>>();

        for _ in 0..n {
            for i in 0..n {
                if !absorbing[i] {
                    absorbing[i] = (0..n).any(|j| absorbing[j] && probability(i, j) > 0.0);
                }
            }
        }

        let mut visited = (0..n).map(|i| self.initial[i] > 0.0).collect::<Vec<bool>>();
        let mut stack = (0..n).filter(|i| visited[*i]).collect::<Vec<usize>>();

        while let Some(i) = stack.pop() {
            if !absorbing[i] {
                return Err(PhaseTypeError::Unreachable(i));
            }

            for j in 0..n {
                if !visited[j] && probability(i, j) > 0.0 {
                    visited[j] = true;
                    stack.push(j);
                }
            }
        }

        Ok(())
    }

    fn validate(&self) -> Result<(), PhaseTypeError> {
        let n = self.states;

        if let Some((index, _)) = self
            .initial
            .iter()
            .find_position(|value| !(value.is_finite() && **value >= 0.0))
        {
            return Err(PhaseTypeError::NegativeInitial { index });
        }

        let sum = self.initial.sum();

        if (sum - 1.0).abs() > PHASE_TYPE_TOLERANCE {
            return Err(PhaseTypeError::InitialSum(sum));
        }

        for row in 0..n {
            let diagonal = self.generator[(row, row)];

            if !(diagonal.is_finite() && diagonal < 0.0) {
                return Err(PhaseTypeError::Diagonal { row });
            }

            for col in (0..n).filter(|col| *col != row) {
                let value = self.generator[(row, col)];

                if !(value.is_finite() && value >= 0.0) {
                    return Err(PhaseTypeError::OffDiagonal { row, col });
                }
            }

            let sum = self.generator.row(row).sum();

            if sum > PHASE_TYPE_TOLERANCE {
                return Err(PhaseTypeError::RowSum { row, sum });
            }
        }

        Ok(())
    }
}

impl Default for PhaseTypeChain {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert probabilities into a normalized cumulative table in place.
///
/// Every entry from the last non-zero probability onwards is set to exactly 1, so that the
/// inversion never falls off the end of the table nor lands on a zero probability entry.
fn cumulate<'a>(values: impl Iterator<Item = &'a mut f64>) {
    let mut entries = values.collect::<Vec<&mut f64>>();

    let total = entries.iter().map(|value| **value).sum::<f64>();
    let last = entries.iter().rposition(|value| **value > 0.0);

    let mut partial = 0.0;

    for (index, entry) in entries.iter_mut().enumerate() {
        partial += **entry;

        **entry = match last {
            Some(last) if index >= last => 1.0,
            _ => partial / total,
        };
    }
}

/// Index of the first cumulative entry that strictly exceeds `u`.
fn first_exceeding<'a>(mut cumulative: impl Iterator<Item = &'a f64>, u: f64) -> Option<usize> {
    cumulative
        .find_position(|value| u < **value)
        .map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::seeded_rng;
    use approx::assert_relative_eq;

    const TWO_STATE: [f64; 6] = [-2.0, 2.0, 0.0, -3.0, 1.0, 0.0];

    #[test]
    fn test_state_recovery() {
        assert!(phase_type_states(2) == Some(1));
        assert!(phase_type_states(6) == Some(2));
        assert!(phase_type_states(12) == Some(3));
        assert!(phase_type_states(0).is_none());
        assert!(phase_type_states(5).is_none());
        assert!(phase_type_states(7).is_none());
    }

    #[test]
    fn test_tables() {
        let mut chain = PhaseTypeChain::new();

        chain.update(&TWO_STATE).unwrap();

        assert_relative_eq!(chain.sojourn_times()[0], 0.5);
        assert_relative_eq!(chain.sojourn_times()[1], 1.0 / 3.0);

        let table = chain.jump_table();

        // State 0 always jumps to state 1, state 1 is always absorbed.
        assert!(table[(0, 0)] == 0.0);
        assert!(table[(0, 1)] == 1.0);
        assert!(table[(0, 2)] == 1.0);
        assert!(table[(1, 1)] == 0.0);
        assert!(table[(1, 2)] == 1.0);
    }

    #[test]
    fn test_reproducible() {
        let mut chain = PhaseTypeChain::new();

        chain.update(&TWO_STATE).unwrap();

        let mut rng = seeded_rng(3);
        let first = (0..100)
            .map(|_| chain.sample(&mut rng).unwrap())
            .collect::<Vec<f64>>();

        let mut rng = seeded_rng(3);
        let second = (0..100)
            .map(|_| chain.sample(&mut rng).unwrap())
            .collect::<Vec<f64>>();

        assert!(first == second);
        assert!(first.iter().all(|time| *time > 0.0));
    }

    #[test]
    fn test_mean_absorption_time() {
        let mut chain = PhaseTypeChain::new();

        chain.update(&TWO_STATE).unwrap();

        let mut rng = seeded_rng(11);
        let mean = (0..100_000)
            .map(|_| chain.sample(&mut rng).unwrap())
            .sum::<f64>()
            / 100_000.0;

        // Hypoexponential with rates 2 and 3.
        assert_relative_eq!(mean, 0.5 + 1.0 / 3.0, max_relative = 0.02);
    }

    #[test]
    fn test_buffer_reuse() {
        let mut chain = PhaseTypeChain::new();

        chain.update(&TWO_STATE).unwrap();
        chain.update(&[-1.0, 0.5, 0.5, -4.0, 0.3, 0.7]).unwrap();

        assert!(chain.reallocations() == 1);

        chain.update(&[-1.0, 1.0]).unwrap();

        assert!(chain.reallocations() == 2);
        assert!(chain.states() == 1);
    }

    #[test]
    fn test_validation() {
        let mut chain = PhaseTypeChain::new();

        assert!(chain.sample(&mut seeded_rng(1)).is_none());

        assert!(matches!(
            chain.update(&[2.0, 2.0, 0.0, -3.0, 1.0, 0.0]),
            Err(PhaseTypeError::Diagonal { row: 0 })
        ));
        assert!(matches!(
            chain.update(&[-2.0, 3.0, 0.0, -3.0, 1.0, 0.0]),
            Err(PhaseTypeError::RowSum { row: 0, .. })
        ));
        assert!(matches!(
            chain.update(&[-2.0, -1.0, 0.0, -3.0, 1.0, 0.0]),
            Err(PhaseTypeError::OffDiagonal { row: 0, col: 1 })
        ));
        assert!(matches!(
            chain.update(&[-2.0, 2.0, 0.0, -3.0, 0.6, 0.6]),
            Err(PhaseTypeError::InitialSum(_))
        ));
        assert!(matches!(
            chain.update(&[-2.0, 2.0, 0.0, -3.0, -0.5, 1.5]),
            Err(PhaseTypeError::NegativeInitial { index: 0 })
        ));
        assert!(matches!(
            chain.update(&[-2.0, 2.0, 0.0, -3.0, 1.0]),
            Err(PhaseTypeError::InvalidLength(5))
        ));

        // A closed cycle between both states never reaches absorption.
        assert!(matches!(
            chain.update(&[-1.0, 1.0, 1.0, -1.0, 1.0, 0.0]),
            Err(PhaseTypeError::Unreachable(_))
        ));

        assert!(chain.sample(&mut seeded_rng(1)).is_none());
    }
}

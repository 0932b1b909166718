//! # Calculator symbols for distribution families.
//!
//! A symbol is the unit the expression evaluator talks to: it owns a set of names and
//! dispatches a flat parameter vector onto an operation purely based on its length.
//!
//! The following symbols are implemented:
//! - [`ContinuousDistributionSymbol`] Sampling, density and cumulative distribution function of
//!   any [`ContinuousFamily`], with a single-slot handle cache.
//! - [`DiscreteDistributionSymbol`] Sampling (truncated inverse transform) and probability mass
//!   function of any [`DiscreteFamily`].
//! - [`TruncatedDistributionSymbol`] Rejection sampling of a continuous family within a window.
//! - [`PhaseTypeSymbol`] Absorption times of a continuous-time Markov chain.
//! - [`EmpiricalSymbol`] Density, distribution function, sampling and statistics of an inline
//!   data vector.

mod continuous;
mod discrete;
mod empirical;
mod phase_type;
mod truncated;

pub use continuous::*;
pub use discrete::*;
pub use empirical::*;
pub use phase_type::*;
pub use truncated::*;

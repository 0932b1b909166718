//! # Distribution family tables.
//!
//! Every family is a zero-sized type (the zeta family being the exception, as it carries a
//! shared [`ZetaMemo`](crate::math::ZetaMemo)) that implements either
//! [`ContinuousFamily`](crate::symbols::ContinuousFamily) or
//! [`DiscreteFamily`](crate::symbols::DiscreteFamily). A family knows its names, its number of
//! native parameters and how to validate them.
//!
//! Families with a `Direct` suffix take the mean and standard deviation of the distribution
//! instead of its native parameters and convert them by moment matching. A non-positive
//! standard deviation collapses the distribution onto its mean.

mod continuous;
mod discrete;

pub use continuous::*;
pub use discrete::*;

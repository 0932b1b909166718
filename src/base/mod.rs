//! # Core building blocks of the **calcdist** crate.
//!
//! # Calculator symbols
//!
//! Every distribution function that an expression evaluator can call is a [`CalcSymbol`]. A
//! symbol receives a flat vector of `f64` parameters and selects its operation (sampling,
//! density, cumulative distribution function, ..) purely from the length of that vector.
//!
//! Symbols are created through a [`SymbolRegistry`], which maps every name (including the
//! localized aliases) to a factory. The [`DistributionEngine`] evaluates symbols by name and
//! applies the error policy from its [`EngineSettings`]:
//! - [`evaluate`](`CalcSymbol::evaluate`) The hard path, failures are returned as
//!   [`CalcError`](crate::CalcError).
//! - [`evaluate_or_default`](`CalcSymbol::evaluate_or_default`) The soft path, failures are
//!   replaced by a fallback value.
//!
//! # Randomness
//!
//! Sampling symbols draw from a [`RandomSource`], which is implemented for every
//! [`RngCore`](`rand::RngCore`). The default generator is
//! [`Xoshiro256PlusPlus`](`rand_xoshiro::Xoshiro256PlusPlus`), see [`seeded_rng`].
//!
//! # Caching
//!
//! Continuous distribution symbols remember the distribution handle built for the most recent
//! parameter vector in a [`ParamCache`].

mod cache;
mod random;
mod registry;
mod settings;
mod symbol;

pub use cache::*;
pub use random::*;
pub use registry::*;
pub use settings::*;
pub use symbol::*;

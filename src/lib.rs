#![doc = include_str!("../README.md")]
#![deny(missing_docs)]

pub mod base;
pub mod families;
pub mod math;
pub mod stats;
pub mod symbols;

use thiserror::Error;

/// Errors raised by the "hard" evaluation path of a calculator symbol.
///
/// The "soft" path ([`CalcSymbol::evaluate_or_default`](crate::base::CalcSymbol::evaluate_or_default))
/// maps every one of these onto a caller supplied fallback value instead.
#[allow(missing_docs)]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum CalcError {
    #[error("{symbol}: no evaluation mode accepts {count} parameters")]
    InvalidArity { symbol: String, count: usize },
    #[error("{symbol}: invalid parameters ({reason})")]
    InvalidParameters {
        symbol: String,
        reason: &'static str,
    },
    #[error("{symbol}: mode selector {selector} is neither 0 (density) nor 1 (cumulative)")]
    InvalidModeSelector { symbol: String, selector: f64 },
    #[error("unknown symbol \"{0}\"")]
    UnknownSymbol(String),
}

impl CalcError {
    pub(crate) fn arity(symbol: &str, count: usize) -> Self {
        Self::InvalidArity {
            symbol: symbol.to_string(),
            count,
        }
    }

    pub(crate) fn params(symbol: &str, reason: &'static str) -> Self {
        Self::InvalidParameters {
            symbol: symbol.to_string(),
            reason,
        }
    }
}

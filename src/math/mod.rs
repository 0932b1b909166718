//! Special-function primitives used by the distribution families.
//!
//! All functions here are pure functions of their scalar inputs, with the single exception of
//! [`ZetaMemo`], a one-entry memo for the Riemann zeta function that may be shared between
//! symbol instances (and threads).

mod factorial;
mod zeta;

pub use factorial::{binomial, factorial, ln_binomial, ln_factorial};
pub use zeta::{ZetaMemo, zeta};

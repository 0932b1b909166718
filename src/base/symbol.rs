use crate::{CalcError, base::RandomSource};

/// The call interface shared by every calculator function that evaluates a distribution.
///
/// Each symbol dispatches purely on the length of the flat parameter vector that is handed to it
/// by the expression evaluator. There are two entry points with identical dispatch logic:
/// - [`evaluate`](`CalcSymbol::evaluate`) fails with a [`CalcError`],
/// - [`evaluate_or_default`](`CalcSymbol::evaluate_or_default`) returns a fallback value instead.
///
/// Symbols are `Send` but hold per-instance caches, every worker thread owns its own instances.
pub trait CalcSymbol: Send {
    /// The case-sensitive names (including localized aliases) the symbol is reachable under.
    fn names(&self) -> &[String];

    /// Returns true if the symbol is a pure function of its parameters.
    fn is_deterministic(&self) -> bool;

    /// Evaluate the symbol, invalid calls result in a [`CalcError`].
    fn evaluate(&mut self, params: &[f64], rng: &mut dyn RandomSource) -> Result<f64, CalcError>;

    /// Evaluate the symbol, invalid calls result in `fallback`.
    fn evaluate_or_default(
        &mut self,
        params: &[f64],
        rng: &mut dyn RandomSource,
        fallback: f64,
    ) -> f64 {
        self.evaluate(params, rng).unwrap_or(fallback)
    }

    /// The primary name of the symbol, used in error messages.
    fn name(&self) -> &str {
        primary_name(self.names())
    }
}

/// The first of `names`, or an empty name for a symbol without any.
pub(crate) fn primary_name(names: &[String]) -> &str {
    names.first().map(String::as_str).unwrap_or_default()
}

/// Expand a list of base names into `{name}Range` and `{name}Bereich` variants.
pub fn range_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    names
        .into_iter()
        .flat_map(|name| [format!("{}Range", name), format!("{}Bereich", name)])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_names() {
        assert!(
            range_names(["ExpDist", "Exponentialverteilung"])
                == [
                    "ExpDistRange",
                    "ExpDistBereich",
                    "ExponentialverteilungRange",
                    "ExponentialverteilungBereich"
                ]
        );
    }
}

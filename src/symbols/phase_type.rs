use crate::{
    CalcError,
    base::{CalcSymbol, RandomSource},
    stats::{PhaseTypeChain, phase_type_states},
};

/// A calculator symbol that samples phase-type distributed absorption times.
///
/// The parameters are the rows of the sub-generator matrix followed by the initial probability
/// vector, `n` is recovered from the total count `n² + n`.
pub struct PhaseTypeSymbol {
    chain: PhaseTypeChain,
    names: Vec<String>,
}

impl PhaseTypeSymbol {
    /// Create a new [`PhaseTypeSymbol`].
    pub fn new() -> Self {
        Self {
            chain: PhaseTypeChain::new(),
            names: ["PhaseType", "PhaseTypeDist", "PhasenTypVerteilung"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }

    /// The underlying Markov chain.
    pub fn chain(&self) -> &PhaseTypeChain {
        &self.chain
    }
}

impl Default for PhaseTypeSymbol {
    fn default() -> Self {
        Self::new()
    }
}

impl CalcSymbol for PhaseTypeSymbol {
    fn evaluate(&mut self, params: &[f64], rng: &mut dyn RandomSource) -> Result<f64, CalcError> {
        if phase_type_states(params.len()).is_none() {
            return Err(CalcError::arity(self.name(), params.len()));
        }

        self.chain
            .update(params)
            .map_err(|err| CalcError::params(self.name(), err.reason()))?;

        self.chain
            .sample(rng)
            .ok_or_else(|| CalcError::params(self.name(), "chain is not initialized"))
    }

    fn is_deterministic(&self) -> bool {
        false
    }

    fn names(&self) -> &[String] {
        &self.names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::seeded_rng;

    #[test]
    fn test_phase_type_symbol() {
        let mut symbol = PhaseTypeSymbol::new();
        let mut rng = seeded_rng(2);

        // A single state with rate 4 is an exponential distribution with mean 1/4.
        let mean = (0..50_000)
            .map(|_| symbol.evaluate(&[-4.0, 1.0], &mut rng).unwrap())
            .sum::<f64>()
            / 50_000.0;

        assert!((mean - 0.25).abs() < 0.01);
        assert!(symbol.chain().reallocations() == 1);

        assert!(matches!(
            symbol.evaluate(&[-4.0, 1.0, 1.0], &mut rng),
            Err(CalcError::InvalidArity { count: 3, .. })
        ));
        assert!(matches!(
            symbol.evaluate(&[], &mut rng),
            Err(CalcError::InvalidArity { count: 0, .. })
        ));
        assert!(matches!(
            symbol.evaluate(&[4.0, 1.0], &mut rng),
            Err(CalcError::InvalidParameters { .. })
        ));

        assert!(
            symbol.evaluate_or_default(&[-2.0, 2.0, 0.0, -3.0, 0.5, 0.6], &mut rng, -1.0) == -1.0
        );
    }
}

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors associated with loading [`EngineSettings`].
#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json5::Error),
    #[error("chunk size must be at least 1")]
    ZeroChunkSize,
}

/// Settings of a [`DistributionEngine`](`crate::base::DistributionEngine`).
///
/// ```
/// # use calcdist::base::EngineSettingsBuilder;
/// let settings = EngineSettingsBuilder::default()
///     .seed(7)
///     .stop_on_calc_error(false)
///     .fallback_value(-1.0)
///     .build()
///     .unwrap();
///
/// assert_eq!(settings.chunk_size, 256);
/// ```
#[derive(Builder, Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Number of draws per parallel chunk in ensemble sampling.
    #[builder(default = 256)]
    pub chunk_size: usize,

    /// Value substituted for failed calculations if `stop_on_calc_error` is false.
    #[builder(default = 0.0)]
    pub fallback_value: f64,

    /// Random seed of the engine generator.
    #[builder(default = 42)]
    pub seed: u64,

    /// Stop on calculation errors (hard path) or substitute `fallback_value` (soft path).
    #[builder(default = true)]
    pub stop_on_calc_error: bool,
}

impl EngineSettings {
    /// Load settings from a JSON5 document, missing fields take their default values.
    pub fn from_json5(source: &str) -> Result<Self, SettingsError> {
        let settings = serde_json5::from_str::<Self>(source)?;

        if settings.chunk_size == 0 {
            return Err(SettingsError::ZeroChunkSize);
        }

        Ok(settings)
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            chunk_size: 256,
            fallback_value: 0.0,
            seed: 42,
            stop_on_calc_error: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let settings = EngineSettingsBuilder::default().build().unwrap();

        assert!(settings == EngineSettings::default());
    }

    #[test]
    fn test_from_json5() {
        let settings = EngineSettings::from_json5(
            "{
                // substitute instead of failing
                stop_on_calc_error: false,
                fallback_value: -1.5,
            }",
        )
        .unwrap();

        assert!(!settings.stop_on_calc_error);
        assert!(settings.fallback_value == -1.5);
        assert!(settings.seed == 42);

        assert!(matches!(
            EngineSettings::from_json5("{ chunk_size: 0 }"),
            Err(SettingsError::ZeroChunkSize)
        ));
        assert!(matches!(
            EngineSettings::from_json5("{ seed: "),
            Err(SettingsError::Parse(_))
        ));
    }
}

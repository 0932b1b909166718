use crate::{
    CalcError,
    base::{CalcSymbol, EngineSettings, seeded_rng},
    families::*,
    math::ZetaMemo,
    symbols::{
        ContinuousDistributionSymbol, DiscreteDistributionSymbol, EmpiricalStatistic,
        EmpiricalSymbol, PhaseTypeSymbol, TruncatedDistributionSymbol,
    },
};
use derive_more::{Deref, IntoIterator};
use log::{debug, info, warn};
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::{
    collections::{HashMap, hash_map::Entry},
    sync::Arc,
    time::Instant,
};

/// A factory that creates a fresh symbol instance with empty caches.
pub type SymbolFactory = Arc<dyn Fn() -> Box<dyn CalcSymbol> + Send + Sync>;

macro_rules! register_families {
    ($registry: expr, $symbol: ident, $($family: ident),+ $(,)?) => {
        $(
            $registry.register(|| Box::new($symbol::new($family)) as Box<dyn CalcSymbol>);
        )+
    };
}

/// The draws produced by [`DistributionEngine::sample_ensemble`], in chunk order.
#[derive(Clone, Debug, Default, Deref, Deserialize, IntoIterator, PartialEq, Serialize)]
pub struct SampleEnsemble(#[into_iterator(owned, ref)] Vec<f64>);

/// A name to symbol factory lookup table.
///
/// Symbols hold per-instance caches and are therefore never shared, the registry hands out
/// fresh instances instead. The only state shared between instances is the [`ZetaMemo`] of the
/// zeta family.
pub struct SymbolRegistry {
    factories: Vec<SymbolFactory>,
    index: HashMap<String, usize>,
    zeta_memo: Arc<ZetaMemo>,
}

impl SymbolRegistry {
    /// Create a registry without any symbols.
    pub fn empty() -> Self {
        Self {
            factories: Vec::new(),
            index: HashMap::new(),
            zeta_memo: Arc::new(ZetaMemo::new()),
        }
    }

    /// Create a registry with all built-in distribution symbols.
    pub fn new() -> Self {
        let mut registry = Self::empty();

        register_families!(
            registry,
            DiscreteDistributionSymbol,
            BinomialFamily,
            BinomialDirectFamily,
            GeometricFamily,
            HyperGeomFamily,
            NegativeBinomialFamily,
            NegativeBinomialDirectFamily,
            NegativeHyperGeomFamily,
            PoissonFamily,
            LogarithmicFamily,
            BorelFamily,
            PlanckFamily,
            BoltzmannFamily,
            DiscreteUniformFamily,
        );

        let memo = registry.zeta_memo.clone();

        registry.register(move || {
            Box::new(DiscreteDistributionSymbol::new(ZetaFamily::new(memo.clone())))
                as Box<dyn CalcSymbol>
        });

        register_families!(
            registry,
            ContinuousDistributionSymbol,
            ExpFamily,
            UniformFamily,
            NormalFamily,
            LogNormalFamily,
            GammaFamily,
            GammaDirectFamily,
            BetaFamily,
            BetaDirectFamily,
            WeibullFamily,
            CauchyFamily,
            ChiSquareFamily,
            ChiFamily,
            FFamily,
            LaplaceFamily,
            ParetoFamily,
            LogisticFamily,
            TriangularFamily,
            StudentTFamily,
            GumbelFamily,
            GumbelDirectFamily,
            HalfCauchyFamily,
            HalfNormalFamily,
            InverseGammaFamily,
            LogLaplaceFamily,
            IrwinHallFamily,
            IrwinHallDirectFamily,
            LeftSawtoothFamily,
            LeftSawtoothDirectFamily,
            RightSawtoothFamily,
            RightSawtoothDirectFamily,
            ErlangFamily,
            TrapezoidFamily,
            PertFamily,
            RayleighFamily,
            LogLogisticFamily,
            FrechetFamily,
            HyperbolicSecantFamily,
            LevyFamily,
            MaxwellBoltzmannFamily,
            UQuadraticFamily,
            ReciprocalFamily,
            ArcsineFamily,
        );

        register_families!(
            registry,
            TruncatedDistributionSymbol,
            ExpFamily,
            NormalFamily,
            LogNormalFamily,
            GammaFamily,
            GammaDirectFamily,
            WeibullFamily,
            CauchyFamily,
            ChiSquareFamily,
            ChiFamily,
            FFamily,
            LaplaceFamily,
            LogisticFamily,
            RayleighFamily,
            LogLogisticFamily,
            GumbelFamily,
            FrechetFamily,
            HyperbolicSecantFamily,
        );

        registry.register(|| Box::new(PhaseTypeSymbol::new()) as Box<dyn CalcSymbol>);

        for statistic in EmpiricalStatistic::ALL {
            registry.register(move || {
                Box::new(EmpiricalSymbol::new(statistic)) as Box<dyn CalcSymbol>
            });
        }

        debug!(
            "SymbolRegistry::new registered {} symbols under {} names",
            registry.factories.len(),
            registry.index.len()
        );

        registry
    }

    /// Create a new symbol instance for `name`.
    pub fn instantiate(&self, name: &str) -> Result<Box<dyn CalcSymbol>, CalcError> {
        Ok(self.build(self.index_of(name)?))
    }

    /// Returns true if a symbol is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// All registered names in alphabetical order.
    pub fn names(&self) -> Vec<&str> {
        let mut names = self.index.keys().map(String::as_str).collect::<Vec<&str>>();

        names.sort_unstable();

        names
    }

    /// Register a symbol factory under the names of the symbols it creates.
    ///
    /// Names that are already taken are skipped with a warning, a factory that contributes no
    /// new name at all is dropped.
    pub fn register<F>(&mut self, factory: F)
    where
        F: Fn() -> Box<dyn CalcSymbol> + Send + Sync + 'static,
    {
        let position = self.factories.len();
        let probe = factory();

        let mut accepted = false;

        for name in probe.names() {
            match self.index.entry(name.clone()) {
                Entry::Occupied(_) => {
                    warn!("SymbolRegistry::register ignores duplicate name \"{}\"", name)
                }
                Entry::Vacant(entry) => {
                    entry.insert(position);
                    accepted = true;
                }
            }
        }

        if accepted {
            self.factories.push(Arc::new(factory));
        }
    }

    /// The memo shared by all zeta symbols created by this registry.
    pub fn zeta_memo(&self) -> &Arc<ZetaMemo> {
        &self.zeta_memo
    }

    fn build(&self, position: usize) -> Box<dyn CalcSymbol> {
        (self.factories[position])()
    }

    fn index_of(&self, name: &str) -> Result<usize, CalcError> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| CalcError::UnknownSymbol(name.to_string()))
    }
}

impl Default for SymbolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Evaluates distribution symbols by name.
///
/// The engine owns one lazily created instance per symbol (so that the instance caches survive
/// between calls) and a single generator seeded from [`EngineSettings::seed`]. Calculation
/// failures either propagate or are replaced by [`EngineSettings::fallback_value`], depending on
/// [`EngineSettings::stop_on_calc_error`]. Unknown names are an error in both cases.
pub struct DistributionEngine {
    registry: Arc<SymbolRegistry>,
    rng: Xoshiro256PlusPlus,
    settings: EngineSettings,
    symbols: HashMap<usize, Box<dyn CalcSymbol>>,
}

impl DistributionEngine {
    /// Create a new [`DistributionEngine`] with all built-in symbols.
    pub fn new(settings: EngineSettings) -> Self {
        Self::with_registry(Arc::new(SymbolRegistry::new()), settings)
    }

    /// Create a new [`DistributionEngine`] on top of an existing registry.
    pub fn with_registry(registry: Arc<SymbolRegistry>, settings: EngineSettings) -> Self {
        Self {
            registry,
            rng: seeded_rng(settings.seed),
            settings,
            symbols: HashMap::new(),
        }
    }

    /// Evaluate the symbol `name` with the given parameters.
    pub fn calc(&mut self, name: &str, params: &[f64]) -> Result<f64, CalcError> {
        let symbol = Self::symbol(&mut self.symbols, &self.registry, name)?;

        if self.settings.stop_on_calc_error {
            symbol.evaluate(params, &mut self.rng)
        } else {
            Ok(symbol.evaluate_or_default(params, &mut self.rng, self.settings.fallback_value))
        }
    }

    /// Returns true if the symbol `name` is a pure function of its parameters.
    pub fn is_deterministic(&mut self, name: &str) -> Result<bool, CalcError> {
        Ok(Self::symbol(&mut self.symbols, &self.registry, name)?.is_deterministic())
    }

    /// The registry behind the engine.
    pub fn registry(&self) -> &Arc<SymbolRegistry> {
        &self.registry
    }

    /// Evaluate the symbol `name` `size` times in parallel.
    ///
    /// The draws are split into chunks of [`EngineSettings::chunk_size`], every chunk uses a
    /// fresh symbol instance and its own generator, seeded with `seed + 17 * chunk`. The result
    /// is therefore reproducible for a fixed seed, independently of the number of threads, and
    /// does not advance the engine generator.
    pub fn sample_ensemble(
        &self,
        name: &str,
        params: &[f64],
        size: usize,
    ) -> Result<SampleEnsemble, CalcError> {
        let start = Instant::now();

        let position = self.registry.index_of(name)?;
        let registry = &self.registry;
        let settings = &self.settings;

        let mut samples = vec![0.0; size];

        samples
            .par_chunks_mut(settings.chunk_size.max(1))
            .enumerate()
            .try_for_each(|(cdx, chunk)| {
                let mut rng = seeded_rng(settings.seed.wrapping_add((cdx * 17) as u64));
                let mut symbol = registry.build(position);

                chunk.iter_mut().try_for_each(|value| {
                    *value = if settings.stop_on_calc_error {
                        symbol.evaluate(params, &mut rng)?
                    } else {
                        symbol.evaluate_or_default(params, &mut rng, settings.fallback_value)
                    };

                    Ok::<(), CalcError>(())
                })
            })?;

        info!(
            "DistributionEngine::sample_ensemble {}: {:2.2}M draws in {:.2} sec",
            name,
            size as f64 / 1e6,
            start.elapsed().as_millis() as f64 / 1e3
        );

        Ok(SampleEnsemble(samples))
    }

    /// The settings of the engine.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    fn symbol<'a>(
        symbols: &'a mut HashMap<usize, Box<dyn CalcSymbol>>,
        registry: &SymbolRegistry,
        name: &str,
    ) -> Result<&'a mut Box<dyn CalcSymbol>, CalcError> {
        let position = registry.index_of(name)?;

        Ok(symbols
            .entry(position)
            .or_insert_with(|| registry.build(position)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::EngineSettingsBuilder;

    #[test]
    fn test_registry_names() {
        let registry = SymbolRegistry::new();

        for name in [
            "ExpDist",
            "Exponentialverteilung",
            "ExpDistRange",
            "NormalverteilungBereich",
            "GammaDistDirect",
            "ZetaDist",
            "PhaseType",
            "EmpiricalRandom",
            "EmpirischeVerteilungQuantil",
            "LeftSawtoothDistDirect",
        ] {
            assert!(registry.contains(name), "missing {}", name);
        }

        assert!(!registry.contains("expdist"));
        assert!(matches!(
            registry.instantiate("NoSuchDist"),
            Err(CalcError::UnknownSymbol(_))
        ));

        // Every name resolves to a symbol that carries it.
        for name in registry.names() {
            let symbol = registry.instantiate(name).unwrap();

            assert!(symbol.names().iter().any(|other| other == name));
        }
    }

    #[test]
    fn test_duplicate_registration() {
        let mut registry = SymbolRegistry::empty();

        registry.register(|| Box::new(PhaseTypeSymbol::new()) as Box<dyn CalcSymbol>);
        registry.register(|| Box::new(PhaseTypeSymbol::new()) as Box<dyn CalcSymbol>);

        assert!(registry.factories.len() == 1);
        assert!(registry.names() == ["PhaseType", "PhaseTypeDist", "PhasenTypVerteilung"]);
    }

    #[test]
    fn test_error_policy() {
        let mut hard = DistributionEngine::new(EngineSettings::default());

        assert!(matches!(
            hard.calc("ExpDist", &[-1.0]),
            Err(CalcError::InvalidParameters { .. })
        ));
        assert!(matches!(
            hard.calc("ExpDist", &[1.0, 2.0]),
            Err(CalcError::InvalidArity { .. })
        ));

        let mut soft = DistributionEngine::new(
            EngineSettingsBuilder::default()
                .stop_on_calc_error(false)
                .fallback_value(-7.0)
                .build()
                .unwrap(),
        );

        assert!(soft.calc("ExpDist", &[-1.0]).unwrap() == -7.0);
        assert!(soft.calc("ExpDist", &[1.0, 2.0]).unwrap() == -7.0);
        assert!(soft.calc("ExpDist", &[1.0]).unwrap() >= 0.0);

        assert!(matches!(
            soft.calc("NoSuchDist", &[1.0]),
            Err(CalcError::UnknownSymbol(_))
        ));
    }

    #[test]
    fn test_is_deterministic() {
        let mut engine = DistributionEngine::new(EngineSettings::default());

        assert!(!engine.is_deterministic("NormalDist").unwrap());
        assert!(!engine.is_deterministic("EmpiricalRandom").unwrap());
        assert!(engine.is_deterministic("EmpiricalDistributionMean").unwrap());
        assert!(engine.is_deterministic("NoSuchDist").is_err());
    }

    #[test]
    fn test_ensemble() {
        let engine = DistributionEngine::new(
            EngineSettingsBuilder::default()
                .chunk_size(64)
                .seed(11)
                .build()
                .unwrap(),
        );

        let first = engine.sample_ensemble("PoissonDist", &[4.0], 1000).unwrap();
        let second = engine.sample_ensemble("PoissonDist", &[4.0], 1000).unwrap();

        assert!(first == second);
        assert!(first.iter().all(|value| value.fract() == 0.0 && *value >= 0.0));

        let mean = first.iter().sum::<f64>() / 1000.0;

        assert!((mean - 4.0).abs() < 0.3);

        assert!(matches!(
            engine.sample_ensemble("PoissonDist", &[-4.0], 10),
            Err(CalcError::InvalidParameters { .. })
        ));
    }
}

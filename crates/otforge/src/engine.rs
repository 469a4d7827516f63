//! Config-driven entry points that hide bias and learner wiring.

use std::sync::Arc;

use otforge_config::OtConfig;
use otforge_core::{Competition, ConstraintUniverse, Result};
use otforge_solver::{BiasPolicy, FactorialTypology, Mrcd, MrcdOutcome, Typology};
use tracing::debug;

/// Configuration file read by [`learn`] and [`factorial_typology`].
pub const CONFIG_FILE: &str = "otforge.toml";

fn load_config() -> OtConfig {
    OtConfig::load(CONFIG_FILE).unwrap_or_else(|e| {
        debug!(file = CONFIG_FILE, error = %e, "using default configuration");
        OtConfig::default()
    })
}

/// Learns a hierarchy for `data` with the configured bias and learner settings.
///
/// Every competition must carry an observed winner.
///
/// The default configuration is unbiased and lenient: a winner tied with
/// its rivals counts as derived. Under the flat initial hierarchy that can
/// converge on the first pass with no ERCs. Set `mismatch = "strict"` or a
/// ranking bias in `otforge.toml` to force the ties apart.
pub fn learn(universe: &Arc<ConstraintUniverse>, data: Vec<Competition>) -> Result<MrcdOutcome> {
    learn_with_config(universe, data, &load_config())
}

/// Like [`learn`], with an explicit configuration.
pub fn learn_with_config(
    universe: &Arc<ConstraintUniverse>,
    data: Vec<Competition>,
    config: &OtConfig,
) -> Result<MrcdOutcome> {
    #[cfg(feature = "console")]
    otforge_console::init();

    let bias = BiasPolicy::from_config(&config.bias, universe)?;
    Mrcd::new(universe, data, bias, config.learner.clone())?.run()
}

/// Generates the factorial typology of `competitions` with the configured settings.
pub fn factorial_typology(
    universe: &Arc<ConstraintUniverse>,
    competitions: Vec<Competition>,
) -> Result<Typology> {
    factorial_typology_with_config(universe, competitions, &load_config())
}

/// Like [`factorial_typology`], with an explicit configuration.
pub fn factorial_typology_with_config(
    universe: &Arc<ConstraintUniverse>,
    competitions: Vec<Competition>,
    config: &OtConfig,
) -> Result<Typology> {
    #[cfg(feature = "console")]
    otforge_console::init();

    let bias = BiasPolicy::from_config(&config.bias, universe)?;
    FactorialTypology::new(universe, competitions, bias, config.typology.clone())?.generate()
}

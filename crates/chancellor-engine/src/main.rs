//! Headless engine binary for the Chancellor simulation.
//!
//! Plays a complete campaign from the configuration file without a player
//! and logs the outcome. Useful for balancing and for soak-testing the
//! turn pipeline.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `chancellor-config.yaml` (or the path given
//!    as the first argument)
//! 2. Initialize structured logging (tracing)
//! 3. Seed the vote RNG from the game seed
//! 4. Run the campaign
//! 5. Log the result

mod campaign;
mod error;

use std::path::{Path, PathBuf};

use chancellor_core::GameConfig;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

const DEFAULT_CONFIG_PATH: &str = "chancellor-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or the final
/// autosave cannot be restored.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration. Logging is not up yet, so the level it
    //    configures can be honoured.
    let config_path = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let (config, from_file) = load_config(&config_path)?;

    // 2. Initialize structured logging. RUST_LOG wins over the config.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("chancellor-engine starting");
    if !from_file {
        info!(path = %config_path.display(), "Config file not found, using defaults");
    }
    info!(
        seed = config.game.seed,
        total_turns = config.game.total_turns,
        mode = ?config.game.mode,
        fiscal_rule = ?config.game.fiscal_rule,
        seats = config.legislature.composition.seats(),
        "Configuration loaded"
    );

    // 3. Seed the vote RNG.
    let mut rng = StdRng::seed_from_u64(config.game.seed);

    // 4. Run the campaign.
    let (state, report) = campaign::run_campaign(&config, &mut rng)?;

    // 5. Log results.
    info!(
        turns = report.turns_played,
        enacted = report.enacted,
        deferred = report.deferred,
        defeated = report.defeated,
        rejected = report.rejected,
        events = report.events_resolved,
        lobbied = report.lobby_successes,
        failed_saves = report.failed_saves,
        "Campaign finished"
    );
    info!(
        deficit = %state.fiscal.deficit,
        debt_to_gdp = %state.fiscal.debt_to_gdp,
        credibility = state.political.credibility,
        approval = state.political.public_approval,
        violations = state.manifesto.violation_count(),
        "chancellor-engine shutdown complete"
    );

    Ok(())
}

/// Load the configuration from `path`, falling back to defaults when the
/// file does not exist. The flag reports whether the file was read.
fn load_config(path: &Path) -> Result<(GameConfig, bool), EngineError> {
    if path.exists() {
        Ok((GameConfig::from_file(path)?, true))
    } else {
        let mut config = GameConfig::default();
        config.apply_env_overrides();
        Ok((config, false))
    }
}

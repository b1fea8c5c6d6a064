use std::path::PathBuf;
use serde::{Deserialize, Serialize};
use directories::ProjectDirs;
use clap::Parser;
use std::fs;
use tracing::{info, warn};
use toml;

use crate::errors::EngineError;

/// Scheduler parameters for the memory model
///
/// These are the recognized tuning knobs for the memory-state update: they are
/// always supplied from the outside (config file, environment, CLI) and never
/// hard-coded inside the scheduler itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SrsConfig {
    /// Multiplier applied to stability after an incorrect answer (0 < x < 1)
    pub failure_decay: f64,
    /// Stability growth rate for a correct answer rated "hard"
    pub alpha_hard: f64,
    /// Stability growth rate for a correct answer rated "good"
    pub alpha_good: f64,
    /// Stability growth rate for a correct answer rated "easy"
    pub alpha_easy: f64,
    /// Gain multiplier applied once when the answer came in under half the
    /// expected response time
    pub time_bonus: f64,
    /// Expected response time in seconds; answers faster than half of this
    /// earn the time bonus
    pub expected_response_secs: f64,
    /// Upper bound on stability, in days
    pub stability_cap_days: f64,
    /// Stability assigned to freshly created items, in days
    pub initial_stability_days: f64,
}

impl Default for SrsConfig {
    fn default() -> Self {
        Self {
            failure_decay: 0.5,
            alpha_hard: 0.15,
            alpha_good: 0.3,
            alpha_easy: 0.5,
            time_bonus: 1.3,
            expected_response_secs: 12.0,
            stability_cap_days: 365.0,
            initial_stability_days: 1.0,
        }
    }
}

impl SrsConfig {
    /// Checks the configuration invariants
    ///
    /// A violation here is a configuration defect, not bad data, so it is the
    /// one place the engine raises a hard error.
    ///
    /// ### Errors
    ///
    /// Returns `EngineError::InvalidConfig` if the stability cap or initial
    /// stability is not strictly positive, the failure decay is outside
    /// (0, 1), or any growth rate is not strictly positive.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(self.stability_cap_days > 0.0) {
            return Err(EngineError::InvalidConfig(format!(
                "stability cap must be positive, got {}",
                self.stability_cap_days
            )));
        }
        if !(self.initial_stability_days > 0.0)
            || self.initial_stability_days > self.stability_cap_days
        {
            return Err(EngineError::InvalidConfig(format!(
                "initial stability must be in (0, cap], got {}",
                self.initial_stability_days
            )));
        }
        if !(self.failure_decay > 0.0 && self.failure_decay < 1.0) {
            return Err(EngineError::InvalidConfig(format!(
                "failure decay must be in (0, 1), got {}",
                self.failure_decay
            )));
        }
        for (name, alpha) in [
            ("alpha_hard", self.alpha_hard),
            ("alpha_good", self.alpha_good),
            ("alpha_easy", self.alpha_easy),
        ] {
            if !(alpha > 0.0) {
                return Err(EngineError::InvalidConfig(format!(
                    "{} must be positive, got {}",
                    name, alpha
                )));
            }
        }
        if !(self.time_bonus >= 1.0) {
            return Err(EngineError::InvalidConfig(format!(
                "time bonus must be >= 1, got {}",
                self.time_bonus
            )));
        }
        if !(self.expected_response_secs > 0.0) {
            return Err(EngineError::InvalidConfig(format!(
                "expected response time must be positive, got {}",
                self.expected_response_secs
            )));
        }
        Ok(())
    }
}

/// Configuration for the Engram application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Address the server binds to
    pub bind_address: String,
    /// Scheduler parameters
    pub srs: SrsConfig,
}

/// Update structure for Config with all fields optional
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigUpdate {
    /// Optional update for the bind address
    #[serde(default)]
    pub bind_address: Option<String>,
    /// Optional partial update for scheduler parameters
    #[serde(default)]
    pub srs: Option<SrsUpdate>,
}

/// Update structure for SrsConfig with all fields optional
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SrsUpdate {
    #[serde(default)]
    pub failure_decay: Option<f64>,
    #[serde(default)]
    pub alpha_hard: Option<f64>,
    #[serde(default)]
    pub alpha_good: Option<f64>,
    #[serde(default)]
    pub alpha_easy: Option<f64>,
    #[serde(default)]
    pub time_bonus: Option<f64>,
    #[serde(default)]
    pub expected_response_secs: Option<f64>,
    #[serde(default)]
    pub stability_cap_days: Option<f64>,
    #[serde(default)]
    pub initial_stability_days: Option<f64>,
}

/// Command line arguments for the application
#[derive(Parser, Debug)]
#[clap(name = "engram", about = "A spaced repetition study tracker")]
pub struct CliArgs {
    /// Address to bind the server to
    #[clap(long, env = "ENGRAM_BIND_ADDRESS")]
    pub bind_address: Option<String>,

    /// Stability cap in days
    #[clap(long, env = "ENGRAM_STABILITY_CAP_DAYS")]
    pub stability_cap_days: Option<f64>,

    /// Initial stability for new items in days
    #[clap(long, env = "ENGRAM_INITIAL_STABILITY_DAYS")]
    pub initial_stability_days: Option<f64>,

    /// Debug mode
    #[clap(long, env = "ENGRAM_DEBUG", default_value_t = false)]
    pub debug: bool,
}

impl Config {
    /// Applies a config update to the current configuration
    pub fn apply_update(self, update: ConfigUpdate) -> Self {
        let srs = match update.srs {
            Some(u) => SrsConfig {
                failure_decay: u.failure_decay.unwrap_or(self.srs.failure_decay),
                alpha_hard: u.alpha_hard.unwrap_or(self.srs.alpha_hard),
                alpha_good: u.alpha_good.unwrap_or(self.srs.alpha_good),
                alpha_easy: u.alpha_easy.unwrap_or(self.srs.alpha_easy),
                time_bonus: u.time_bonus.unwrap_or(self.srs.time_bonus),
                expected_response_secs: u
                    .expected_response_secs
                    .unwrap_or(self.srs.expected_response_secs),
                stability_cap_days: u.stability_cap_days.unwrap_or(self.srs.stability_cap_days),
                initial_stability_days: u
                    .initial_stability_days
                    .unwrap_or(self.srs.initial_stability_days),
            },
            None => self.srs,
        };
        Self {
            bind_address: update.bind_address.unwrap_or(self.bind_address),
            srs,
        }
    }
}

/// Returns the base (default) configuration
pub fn base_config() -> Config {
    Config {
        bind_address: "127.0.0.1:3000".to_string(),
        srs: SrsConfig::default(),
    }
}

/// Loads configuration from a TOML file
pub fn config_from_file(config_path: Option<PathBuf>) -> Result<ConfigUpdate, String> {
    // if the config path is None, return the default config
    let Some(config_path) = config_path else {
        return Ok(ConfigUpdate::default());
    };

    if !config_path.exists() {
        info!("Config file not found at {:?}, using defaults", config_path);
        return Ok(ConfigUpdate::default());
    }

    match fs::read_to_string(&config_path) {
        Ok(content) => match toml::from_str::<ConfigUpdate>(&content) {
            Ok(config) => {
                info!("Loaded configuration from {:?}", config_path);
                Ok(config)
            },
            Err(e) => {
                warn!("Failed to parse config file: {}", e);
                Err(format!("Failed to parse config file: {}", e))
            }
        },
        Err(e) => {
            warn!("Failed to read config file: {}", e);
            Err(format!("Failed to read config file: {}", e))
        }
    }
}

/// Loads configuration from command line arguments
pub fn config_from_args(args: CliArgs) -> ConfigUpdate {
    let srs = if args.stability_cap_days.is_some() || args.initial_stability_days.is_some() {
        Some(SrsUpdate {
            stability_cap_days: args.stability_cap_days,
            initial_stability_days: args.initial_stability_days,
            ..SrsUpdate::default()
        })
    } else {
        None
    };
    ConfigUpdate {
        bind_address: args.bind_address,
        srs,
    }
}

/// Gets the complete configuration by combining defaults with
/// values from config file, environment variables, and command line arguments
/// in order of increasing precedence
pub fn get_config(args: CliArgs) -> Config {
    let config_path = match ProjectDirs::from("com", "engram", "engram") {
        Some(proj_dirs) => {
            let path: PathBuf = proj_dirs.config_dir().join("config.toml");
            if path.exists() {
                Some(path)
            } else {
                info!("Config file not found at {:?}, using defaults", path);
                None
            }
        }
        None => {
            warn!("Could not determine XDG config directory, skipping config file");
            None
        }
    };

    let base = base_config();

    // Apply updates in order of increasing precedence
    let config = base
        .apply_update(config_from_file(config_path).unwrap_or_default())
        .apply_update(config_from_args(args));

    info!(
        "Final configuration: bind_address={}, stability_cap={}d, initial_stability={}d",
        config.bind_address, config.srs.stability_cap_days, config.srs.initial_stability_days
    );

    config
}

//! Configuration loading and typed config structures for the hazard alert
//! system.
//!
//! The canonical configuration lives in `hazard-config.yaml` at the project
//! root. Every field carries a serde default, so an empty file (or no file
//! at all) yields the reference deployment: thresholds 0.3 / 0.6, a 10 s
//! civilian delay, an 18 km/h track, the four coastal zones, and a 5 s
//! simulation tick.

use std::path::Path;

use hazard_geo::{DeactivationPolicy, GeoError, ZoneSet, default_coastal_zones};
use hazard_types::Zone;
use serde::Deserialize;
use tracing::warn;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is out of range.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// The zone list is malformed.
    #[error("invalid zone configuration: {source}")]
    Zone {
        /// The underlying zone validation error.
        #[from]
        source: GeoError,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
///
/// Mirrors the structure of `hazard-config.yaml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HazardConfig {
    /// Tiered dispatch thresholds and track parameters.
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Known hazard-exposure zones, in tie-break order.
    #[serde(default = "default_coastal_zones")]
    pub zones: Vec<Zone>,

    /// Tectonic simulation loop settings.
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// HTTP/WebSocket listener.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for HazardConfig {
    fn default() -> Self {
        Self {
            dispatch: DispatchConfig::default(),
            zones: default_coastal_zones(),
            simulation: SimulationConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl HazardConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `HAZARD_PORT` overrides `server.port`
    /// - `HAZARD_TICK_INTERVAL_MS` overrides `simulation.tick_interval_ms`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or a
    /// validation error if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, apply environment
    /// overrides, and validate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or a
    /// validation error if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes as unit, not as an empty map.
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (the process environment in
    /// production). Unparseable values are logged and ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("HAZARD_PORT") {
            match raw.parse::<u16>() {
                Ok(port) => self.server.port = port,
                Err(e) => warn!(value = %raw, error = %e, "ignoring invalid HAZARD_PORT"),
            }
        }
        if let Some(raw) = lookup("HAZARD_TICK_INTERVAL_MS") {
            match raw.parse::<u64>() {
                Ok(ms) => self.simulation.tick_interval_ms = ms,
                Err(e) => {
                    warn!(value = %raw, error = %e, "ignoring invalid HAZARD_TICK_INTERVAL_MS");
                }
            }
        }
    }

    /// Check cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for an out-of-range scalar and
    /// [`ConfigError::Zone`] for a malformed zone list.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = &self.dispatch;
        check_unit("dispatch.authority_threshold", d.authority_threshold)?;
        check_unit("dispatch.civilian_threshold", d.civilian_threshold)?;
        if d.authority_threshold > d.civilian_threshold {
            return Err(ConfigError::Invalid {
                field: "dispatch.authority_threshold",
                reason: format!(
                    "{} exceeds civilian threshold {}",
                    d.authority_threshold, d.civilian_threshold
                ),
            });
        }
        if !d.track_speed_kmh.is_finite() || d.track_speed_kmh < 0.0 {
            return Err(ConfigError::Invalid {
                field: "dispatch.track_speed_kmh",
                reason: format!("{} is not a non-negative speed", d.track_speed_kmh),
            });
        }
        if self.simulation.gap_limit == 0 {
            return Err(ConfigError::Invalid {
                field: "simulation.gap_limit",
                reason: "must be at least 1".to_owned(),
            });
        }
        self.zone_set()?;
        Ok(())
    }

    /// Build the validated zone set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Zone`] if a rectangle is malformed.
    pub fn zone_set(&self) -> Result<ZoneSet, ConfigError> {
        Ok(ZoneSet::new(self.zones.clone())?)
    }
}

fn check_unit(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("{value} is outside [0, 1]"),
        })
    }
}

/// Dispatcher configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DispatchConfig {
    /// Minimum density for authority alerts.
    #[serde(default = "default_authority_threshold")]
    pub authority_threshold: f64,

    /// Minimum density for civilian alerts.
    #[serde(default = "default_civilian_threshold")]
    pub civilian_threshold: f64,

    /// Seconds between scheduling and sending a civilian alert.
    #[serde(default = "default_civilian_delay_secs")]
    pub civilian_delay_secs: u64,

    /// Forward speed of the tracked hazard.
    #[serde(default = "default_track_speed_kmh")]
    pub track_speed_kmh: f64,

    /// When an active track may return to inactive.
    #[serde(default)]
    pub track_deactivation: DeactivationPolicy,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            authority_threshold: default_authority_threshold(),
            civilian_threshold: default_civilian_threshold(),
            civilian_delay_secs: default_civilian_delay_secs(),
            track_speed_kmh: default_track_speed_kmh(),
            track_deactivation: DeactivationPolicy::Never,
        }
    }
}

/// Tectonic simulation configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulationConfig {
    /// Real-time milliseconds between cycles.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// RNG seed. Absent means seeded from the OS.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Quiet cycles before a hazard category is force-emitted.
    #[serde(default = "default_gap_limit")]
    pub gap_limit: u32,

    /// Deadline for a single predictive-model call.
    #[serde(default = "default_classifier_timeout_ms")]
    pub classifier_timeout_ms: u64,

    /// Exposure attached to simulated events when they are fed to the
    /// dispatcher.
    #[serde(default = "default_simulated_exposure")]
    pub simulated_exposure: u64,

    /// Stop after this many cycles (0 = unlimited).
    #[serde(default)]
    pub max_cycles: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            seed: None,
            gap_limit: default_gap_limit(),
            classifier_timeout_ms: default_classifier_timeout_ms(),
            simulated_exposure: default_simulated_exposure(),
            max_cycles: 0,
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Fallback filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Pretty,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_authority_threshold() -> f64 {
    0.3
}

const fn default_civilian_threshold() -> f64 {
    0.6
}

const fn default_civilian_delay_secs() -> u64 {
    10
}

const fn default_track_speed_kmh() -> f64 {
    18.0
}

const fn default_tick_interval_ms() -> u64 {
    5_000
}

const fn default_gap_limit() -> u32 {
    5
}

const fn default_classifier_timeout_ms() -> u64 {
    500
}

const fn default_simulated_exposure() -> u64 {
    800
}

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_owned()
}

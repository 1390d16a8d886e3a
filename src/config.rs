use std::path::PathBuf;
use std::time::Duration;
use strum_macros::Display;

#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[strum(to_string = "{var} must be a positive number of milliseconds, got `{value}`")]
    InvalidMillis { var: &'static str, value: String },
}

impl std::error::Error for ConfigError {}

/// Runtime settings, read once at start-up from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the advisory service, offline when `None`.
    pub advisory_url: Option<String>,
    pub advisory_timeout: Duration,
    /// Period of the physics tick.
    pub frame_period: Duration,
    /// Scenario selected at start-up, first catalog entry when `None`.
    pub scenario_id: Option<String>,
    /// Scenario file imported (and selected) at start-up.
    pub scenario_file: Option<PathBuf>,
}

impl Config {
    const ADVISORY_URL: &'static str = "DSKY_ADVISORY_URL";
    const ADVISORY_TIMEOUT_MS: &'static str = "DSKY_ADVISORY_TIMEOUT_MS";
    const FRAME_MS: &'static str = "DSKY_FRAME_MS";
    const SCENARIO: &'static str = "DSKY_SCENARIO";
    const SCENARIO_FILE: &'static str = "DSKY_SCENARIO_FILE";

    pub fn from_env() -> Result<Self, ConfigError> { Self::from_lookup(|var| std::env::var(var).ok()) }

    /// Builds the config from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();
        Ok(Self {
            advisory_url: get(Self::ADVISORY_URL),
            advisory_timeout: millis(Self::ADVISORY_TIMEOUT_MS, get(Self::ADVISORY_TIMEOUT_MS))?
                .unwrap_or(defaults.advisory_timeout),
            frame_period: millis(Self::FRAME_MS, get(Self::FRAME_MS))?.unwrap_or(defaults.frame_period),
            scenario_id: get(Self::SCENARIO),
            scenario_file: get(Self::SCENARIO_FILE).map(PathBuf::from),
        })
    }
}

fn millis(var: &'static str, value: Option<String>) -> Result<Option<Duration>, ConfigError> {
    let Some(value) = value else { return Ok(None) };
    match value.parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(Some(Duration::from_millis(ms))),
        _ => Err(ConfigError::InvalidMillis { var, value }),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            advisory_url: None,
            advisory_timeout: Duration::from_millis(8000),
            frame_period: Duration::from_millis(20),
            scenario_id: None,
            scenario_file: None,
        }
    }
}

use chrono::Duration;
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::decoder::DecoderConfig;
use crate::predict::{
    GroundStation, TleSource, CELESTRAK_STATIONS_URL, DEFAULT_HORIZON_HOURS,
    DEFAULT_STEP_SECONDS,
};
use crate::radio::RadioConfig;
use crate::scheduler::DecodePolicy;

/// Longest accepted scan horizon. Element sets go stale well before this.
pub const MAX_HORIZON_DAYS: i64 = 14;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid station coordinates: {0}")]
    InvalidStation(String),
    #[error("unknown timezone: {0}")]
    InvalidTimezone(String),
    #[error("invalid duration for {field}: {message}")]
    InvalidDuration { field: &'static str, message: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub station: StationConfig,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default)]
    pub predict: PredictConfig,
    #[serde(default)]
    pub radio: RadioConfig,
    #[serde(default)]
    pub decoder: DecoderConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StationConfig {
    pub name: Option<String>,
    pub coordinates: String,
    #[serde(default)]
    pub altitude_m: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PredictConfig {
    pub satellite: String,
    pub tle: TleConfig,
    pub horizon: String,
    pub step: String,
}

impl Default for PredictConfig {
    fn default() -> Self {
        Self {
            satellite: "ISS (ZARYA)".to_string(),
            tle: TleConfig::default(),
            horizon: format!("{}h", DEFAULT_HORIZON_HOURS),
            step: format!("{}s", DEFAULT_STEP_SECONDS),
        }
    }
}

/// Where element sets come from. A local `file` wins over `url`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TleConfig {
    pub url: Option<String>,
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub audio_dir: PathBuf,
    pub image_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            audio_dir: PathBuf::from("./audio/"),
            image_dir: PathBuf::from("./foto/"),
            log_dir: PathBuf::from("./logs/"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default)]
    pub decode_policy: DecodePolicy,
}

/// Validated, typed view of [`Config`]; built once at startup and passed by reference.
#[derive(Debug, Clone)]
pub struct Settings {
    pub station_name: Option<String>,
    pub station: GroundStation,
    pub timezone: Tz,
    pub satellite: String,
    pub tle_source: TleSource,
    pub horizon: Duration,
    pub step: Duration,
    pub radio: RadioConfig,
    pub decoder: DecoderConfig,
    pub paths: PathsConfig,
    pub decode_policy: DecodePolicy,
}

fn default_timezone() -> String {
    "Europe/Vilnius".to_string()
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    pub fn from_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Resolves every field, rejecting misconfiguration that would make the daemon useless.
    pub fn resolve(&self) -> Result<Settings, ConfigError> {
        let station = GroundStation::from_coordinates(
            &self.station.coordinates,
            Some(self.station.altitude_m),
        )
        .ok_or_else(|| ConfigError::InvalidStation(self.station.coordinates.clone()))?;

        let timezone: Tz = self
            .timezone
            .parse()
            .map_err(|_| ConfigError::InvalidTimezone(self.timezone.clone()))?;

        let horizon = parse_duration("predict.horizon", &self.predict.horizon)?;
        let step = parse_duration("predict.step", &self.predict.step)?;
        if step <= Duration::zero() {
            return Err(ConfigError::InvalidDuration {
                field: "predict.step",
                message: "must be positive".into(),
            });
        }
        if horizon > Duration::days(MAX_HORIZON_DAYS) {
            return Err(ConfigError::InvalidDuration {
                field: "predict.horizon",
                message: format!("must not exceed {} days", MAX_HORIZON_DAYS),
            });
        }
        if horizon < step {
            return Err(ConfigError::InvalidDuration {
                field: "predict.horizon",
                message: "must be at least one step long".into(),
            });
        }

        let tle_source = match (&self.predict.tle.file, &self.predict.tle.url) {
            (Some(file), _) => TleSource::File(file.clone()),
            (None, Some(url)) => TleSource::Url(url.clone()),
            (None, None) => TleSource::Url(CELESTRAK_STATIONS_URL.to_string()),
        };

        Ok(Settings {
            station_name: self.station.name.clone(),
            station,
            timezone,
            satellite: self.predict.satellite.clone(),
            tle_source,
            horizon,
            step,
            radio: self.radio.clone(),
            decoder: self.decoder.clone(),
            paths: self.paths.clone(),
            decode_policy: self.scheduler.decode_policy,
        })
    }
}

fn parse_duration(field: &'static str, s: &str) -> Result<Duration, ConfigError> {
    let err = |message: String| ConfigError::InvalidDuration { field, message };
    humantime::parse_duration(s.trim())
        .map_err(|e| err(e.to_string()))
        .and_then(|d| Duration::from_std(d).map_err(|e| err(e.to_string())))
}

/// Accepts any YAML scalar (`30`, `"30"`, `145.8`) as a string.
pub(crate) fn scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_yaml::Value::deserialize(deserializer)?;
    match value {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a scalar, got {:?}",
            other
        ))),
    }
}

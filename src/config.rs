use crate::analysis::classifier::{
    ClassifierThresholds, HIGH_AVAILABILITY_BELOW, LIMITED_AVAILABILITY_BELOW,
};
use crate::analysis::statistics::RATE_PER_TRANSACTION;
use crate::error::ParkingError;
use crate::geo::Coordinate;
use crate::snapshot::TimeRange;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use time::UtcOffset;

pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";
pub const DEFAULT_SOURCE: &str = "mock";
pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_CURRENCY: &str = "SEK";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub app: AppSection,
    pub logging: LoggingSection,
    #[serde(default)]
    pub data: Option<DataSection>,
    #[serde(default)]
    pub analysis: Option<AnalysisSection>,
    #[serde(default)]
    pub reference: Option<ReferenceSection>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSection {
    pub name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSection {
    pub level: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DataSection {
    /// "mock" (default) or "json"
    pub source: Option<String>,
    /// Snapshot file for the json source
    pub path: Option<PathBuf>,
    /// Seed for the mock generator (default: 42)
    pub seed: Option<u64>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AnalysisSection {
    pub time_range: Option<TimeRange>,
    pub rate_per_transaction: Option<u32>,
    pub currency: Option<String>,
    pub high_availability_below: Option<f64>,
    pub limited_availability_below: Option<f64>,
    /// Offset used to read peak hours; timestamps' own offset when unset
    pub utc_offset_hours: Option<i8>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReferenceSection {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid analysis settings: {0}")]
    Analysis(#[from] ParkingError),
    #[error("invalid utc offset: {0} hours")]
    Offset(i8),
}

pub fn load_default() -> Result<Config, ConfigError> {
    load_from_path(DEFAULT_CONFIG_PATH)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)?;
    Ok(config)
}

impl Config {
    pub fn data(&self) -> DataSection {
        self.data.clone().unwrap_or_default()
    }

    fn analysis(&self) -> Option<&AnalysisSection> {
        self.analysis.as_ref()
    }

    pub fn time_range(&self) -> TimeRange {
        self.analysis()
            .and_then(|a| a.time_range)
            .unwrap_or_default()
    }

    pub fn rate_per_transaction(&self) -> u32 {
        self.analysis()
            .and_then(|a| a.rate_per_transaction)
            .unwrap_or(RATE_PER_TRANSACTION)
    }

    pub fn currency(&self) -> &str {
        self.analysis()
            .and_then(|a| a.currency.as_deref())
            .unwrap_or(DEFAULT_CURRENCY)
    }

    pub fn classifier_thresholds(&self) -> ClassifierThresholds {
        ClassifierThresholds {
            high_below: self
                .analysis()
                .and_then(|a| a.high_availability_below)
                .unwrap_or(HIGH_AVAILABILITY_BELOW),
            limited_below: self
                .analysis()
                .and_then(|a| a.limited_availability_below)
                .unwrap_or(LIMITED_AVAILABILITY_BELOW),
        }
    }

    pub fn hour_offset(&self) -> Result<Option<UtcOffset>, ConfigError> {
        match self.analysis().and_then(|a| a.utc_offset_hours) {
            Some(hours) => UtcOffset::from_hms(hours, 0, 0)
                .map(Some)
                .map_err(|_| ConfigError::Offset(hours)),
            None => Ok(None),
        }
    }

    /// The configured reference coordinate, if any.
    pub fn reference(&self) -> Result<Option<Coordinate>, ConfigError> {
        match &self.reference {
            Some(section) => Ok(Some(Coordinate::new(section.lat, section.lon)?)),
            None => Ok(None),
        }
    }
}

impl DataSection {
    pub fn source_kind(&self) -> &str {
        self.source.as_deref().unwrap_or(DEFAULT_SOURCE)
    }

    pub fn seed(&self) -> u64 {
        self.seed.unwrap_or(DEFAULT_SEED)
    }

    /// Snapshot file path; an empty path is treated as missing.
    pub fn path(&self) -> Option<&Path> {
        let path = self.path.as_deref()?;
        if path.as_os_str().is_empty() {
            None
        } else {
            Some(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn write_temp(name: &str, contents: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let unique = SystemTime::now().duration_since(UNIX_EPOCH)?.as_nanos();
        let path = std::env::temp_dir().join(format!("parking-config-{name}-{unique}.toml"));
        fs::write(&path, contents)?;
        Ok(path)
    }

    #[test]
    fn default_config_is_loadable() -> Result<(), Box<dyn std::error::Error>> {
        let config = load_default()?;
        assert_eq!(config.data().source_kind(), "mock");
        assert!(config.reference()?.is_some());
        Ok(())
    }

    #[test]
    fn minimal_config_uses_defaults() -> Result<(), Box<dyn std::error::Error>> {
        let path = write_temp(
            "minimal",
            r#"
[app]
name = "parking-insights"

[logging]
level = "info"
"#,
        )?;

        let config = load_from_path(&path)?;
        let _ = fs::remove_file(&path);

        assert_eq!(config.time_range(), TimeRange::Day);
        assert_eq!(config.rate_per_transaction(), RATE_PER_TRANSACTION);
        assert_eq!(config.currency(), "SEK");
        assert_eq!(config.classifier_thresholds(), ClassifierThresholds::default());
        assert_eq!(config.hour_offset()?, None);
        assert!(config.reference()?.is_none());
        assert_eq!(config.data().seed(), DEFAULT_SEED);
        assert!(config.data().path().is_none());
        Ok(())
    }

    #[test]
    fn analysis_section_overrides_defaults() -> Result<(), Box<dyn std::error::Error>> {
        let path = write_temp(
            "analysis",
            r#"
[app]
name = "parking-insights"

[logging]
level = "debug"

[data]
source = "json"
path = "data/snapshots.json"

[analysis]
time_range = "7d"
rate_per_transaction = 25
currency = "EUR"
high_availability_below = 0.6
limited_availability_below = 0.85
utc_offset_hours = 2
"#,
        )?;

        let config = load_from_path(&path)?;
        let _ = fs::remove_file(&path);

        assert_eq!(config.time_range(), TimeRange::Week);
        assert_eq!(config.rate_per_transaction(), 25);
        assert_eq!(config.currency(), "EUR");
        assert_eq!(config.classifier_thresholds().high_below, 0.6);
        assert_eq!(config.hour_offset()?, UtcOffset::from_hms(2, 0, 0).ok());
        assert_eq!(config.data().source_kind(), "json");
        assert_eq!(
            config.data().path(),
            Some(Path::new("data/snapshots.json"))
        );
        Ok(())
    }

    #[test]
    fn empty_data_path_is_treated_as_missing() {
        let data = DataSection {
            path: Some(PathBuf::new()),
            ..DataSection::default()
        };

        assert!(data.path().is_none());
    }

    #[test]
    fn out_of_range_reference_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
        let path = write_temp(
            "reference",
            r#"
[app]
name = "parking-insights"

[logging]
level = "info"

[reference]
lat = 95.0
lon = 13.0
"#,
        )?;

        let config = load_from_path(&path)?;
        let _ = fs::remove_file(&path);

        assert!(matches!(config.reference(), Err(ConfigError::Analysis(_))));
        Ok(())
    }

    #[test]
    fn out_of_range_offset_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
        let path = write_temp(
            "offset",
            r#"
[app]
name = "parking-insights"

[logging]
level = "info"

[analysis]
utc_offset_hours = 40
"#,
        )?;

        let config = load_from_path(&path)?;
        let _ = fs::remove_file(&path);

        assert!(matches!(config.hour_offset(), Err(ConfigError::Offset(40))));
        Ok(())
    }

    #[test]
    fn missing_config_file_returns_read_error() {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        let path = std::env::temp_dir().join(format!("parking-config-missing-{unique}.toml"));

        let result = load_from_path(&path);

        assert!(matches!(result, Err(ConfigError::Read(_))));
    }

    #[test]
    fn invalid_toml_returns_parse_error() -> Result<(), Box<dyn std::error::Error>> {
        let path = write_temp("invalid", "not = [valid")?;

        let result = load_from_path(&path);
        let _ = fs::remove_file(&path);

        assert!(matches!(result, Err(ConfigError::Parse(_))));
        Ok(())
    }
}

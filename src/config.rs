/// Run configuration.
///
/// Settings load from a TOML file with sensible defaults for every field,
/// then environment variables override the data paths (loaded through
/// `.env` by the binary before this module runs):
///
///   WXVERIF_FORECAST_DIR, WXVERIF_ASOS_DIR, WXVERIF_REPORT_DIR

use std::env;
use std::fs;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    /// A verification date that is not YYYYMMDD.
    BadDate(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "config i/o error: {}", err),
            ConfigError::Parse(err) => write!(f, "config parse error: {}", err),
            ConfigError::BadDate(value) => {
                write!(f, "'{}' is not a YYYYMMDD date", value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> ConfigError {
        ConfigError::Io(err)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> ConfigError {
        ConfigError::Parse(err)
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Paths {
    /// Directory of `YYYYMMDD<shift>.fcst` worksheets.
    pub forecast_dir: String,
    /// Directory of `<STATION>_asos.txt` observation archives.
    pub asos_dir: String,
    /// Directory score reports are written into.
    pub report_dir: String,
    /// Snapshot file for collected archives.
    pub snapshot: String,
}

impl Default for Paths {
    fn default() -> Paths {
        Paths {
            forecast_dir: "fcst".to_string(),
            asos_dir: "verif_data".to_string(),
            report_dir: "reports".to_string(),
            snapshot: "verif_snapshot.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Verification {
    /// First and last verification dates, YYYYMMDD, inclusive.
    pub start: String,
    pub end: String,
}

impl Default for Verification {
    fn default() -> Verification {
        Verification {
            start: "20090901".to_string(),
            end: "20110509".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Logging {
    pub level: String,
    /// Optional log file alongside console output.
    pub file: Option<String>,
}

impl Default for Logging {
    fn default() -> Logging {
        Logging {
            level: "info".to_string(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: Paths,
    pub verification: Verification,
    pub logging: Logging,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl Config {
    /// Loads configuration from a TOML file and applies environment
    /// overrides. A missing file is not an error; defaults apply.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let mut config = if path.exists() {
            toml::from_str(&fs::read_to_string(path)?)?
        } else {
            Config::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(dir) = env::var("WXVERIF_FORECAST_DIR") {
            self.paths.forecast_dir = dir;
        }
        if let Ok(dir) = env::var("WXVERIF_ASOS_DIR") {
            self.paths.asos_dir = dir;
        }
        if let Ok(dir) = env::var("WXVERIF_REPORT_DIR") {
            self.paths.report_dir = dir;
        }
    }
}

/// Parses a YYYYMMDD verification date.
pub fn parse_date(value: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(value, "%Y%m%d").map_err(|_| ConfigError::BadDate(value.to_string()))
}

/// A verification date as the UTC instant opening that day. The end bound
/// of a verification window is the end date's midnight, matching the
/// inclusive-date convention of the archive loaders.
pub fn date_to_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(0, 0, 0)
        .expect("midnight is always a valid time")
        .and_utc()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply_without_a_file() {
        let config = Config::default();
        assert_eq!(config.paths.forecast_dir, "fcst");
        assert_eq!(config.verification.start, "20090901");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_toml_keeps_defaults_for_the_rest() {
        let config: Config = toml::from_str(
            "[paths]\nforecast_dir = \"/data/fcst\"\n\n[verification]\nstart = \"20100101\"\n",
        )
        .unwrap();
        assert_eq!(config.paths.forecast_dir, "/data/fcst");
        assert_eq!(config.paths.asos_dir, "verif_data", "unset fields default");
        assert_eq!(config.verification.start, "20100101");
        assert_eq!(config.verification.end, "20110509");
    }

    #[test]
    fn test_date_parsing_round_trip() {
        let date = parse_date("20100510").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2010, 5, 10).unwrap());
        assert_eq!(date_to_utc(date).format("%Y%m%d %H:%M").to_string(), "20100510 00:00");
    }

    #[test]
    fn test_bad_dates_are_reported() {
        assert!(matches!(parse_date("2010-05-10"), Err(ConfigError::BadDate(_))));
        assert!(matches!(parse_date("next tuesday"), Err(ConfigError::BadDate(_))));
    }
}

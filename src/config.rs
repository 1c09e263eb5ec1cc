use crate::error::{AppError, Result};
use crate::month;
use chrono::Datelike;
use serde::{Deserialize, Deserializer};
use std::path::Path;

/// First and last year offered by the dashboard's year selector.
pub const YEAR_OPTIONS_START: i32 = 2015;
pub const YEAR_OPTIONS_END: i32 = 2030;

/// Bounds for any year accepted from config or user input.
pub const MIN_YEAR: i32 = 1900;
pub const MAX_YEAR: i32 = 2100;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub data: DataConfig,
    #[serde(default)]
    pub defaults: SelectionDefaults,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataConfig {
    pub stations: Vec<StationSource>,
    pub floods: String,
    #[serde(default)]
    pub columns: StationColumns,
}

/// A station file (or glob pattern) and the region its rows belong to.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct StationSource {
    pub path: String,
    pub region: String,
}

/// Header names of the station file columns the loader reads.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct StationColumns {
    #[serde(default = "default_month_column")]
    pub month: String,
    #[serde(default = "default_year_column")]
    pub year: String,
    #[serde(default = "default_rainfall_column")]
    pub rainfall: String,
}

fn default_month_column() -> String {
    "bulan".to_string()
}

fn default_year_column() -> String {
    "tahun".to_string()
}

fn default_rainfall_column() -> String {
    "jumlah_curah_hujan".to_string()
}

impl Default for StationColumns {
    fn default() -> Self {
        Self {
            month: default_month_column(),
            year: default_year_column(),
            rainfall: default_rainfall_column(),
        }
    }
}

/// Initial filter selection shown before the user changes anything.
///
/// Empty `regions` means every loaded region, empty `months` means all twelve.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SelectionDefaults {
    #[serde(default)]
    pub regions: Vec<String>,
    #[serde(default)]
    pub years: YearsConfig,
    #[serde(default)]
    pub months: Vec<String>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum YearsConfig {
    Specific(Vec<i32>),
    Range {
        #[serde(deserialize_with = "deserialize_year")]
        from: i32,
        #[serde(deserialize_with = "deserialize_year")]
        to: i32,
    },
    Keyword(String),
}

impl Default for YearsConfig {
    fn default() -> Self {
        YearsConfig::Range {
            from: YEAR_OPTIONS_START,
            to: YEAR_OPTIONS_END,
        }
    }
}

impl YearsConfig {
    pub fn get_years(&self) -> Vec<i32> {
        match self {
            YearsConfig::Keyword(keyword) => match keyword.as_str() {
                "current" => vec![chrono::Utc::now().year()],
                _ => (YEAR_OPTIONS_START..=YEAR_OPTIONS_END).collect(),
            },
            YearsConfig::Range { from, to } => (*from..=*to).collect(),
            YearsConfig::Specific(years) => years.clone(),
        }
    }
}

/// Custom deserializer that handles a year as both number and string
///
/// Accepts:
/// - `from: 2015` (number)
/// - `from: "2015"` (string that parses to number)
/// - `from: ${START_YEAR}` (env var substituted to either)
fn deserialize_year<'de, D>(deserializer: D) -> std::result::Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum YearValue {
        Number(i32),
        String(String),
    }

    match YearValue::deserialize(deserializer)? {
        YearValue::Number(n) => Ok(n),
        YearValue::String(s) => s
            .trim()
            .parse::<i32>()
            .map_err(|_| serde::de::Error::custom(format!("Invalid year: '{}'", s))),
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| AppError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        // Substitute environment variables
        let expanded = expand_env_vars(content)?;

        let config: Config = serde_yaml::from_str(&expanded)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {}", e)))?;

        // Validate required fields
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    ///
    /// Checks for:
    /// - At least one station source
    /// - Non-empty paths, region names and column names
    /// - A sane default year selection
    /// - Default month labels from the known vocabulary
    fn validate(&self) -> Result<()> {
        if self.data.stations.is_empty() {
            return Err(AppError::Config(
                "At least one station source must be configured under data.stations".to_string(),
            ));
        }

        for source in &self.data.stations {
            if source.path.trim().is_empty() {
                return Err(AppError::Config(
                    "Station source path cannot be empty".to_string(),
                ));
            }
            if source.region.trim().is_empty() {
                return Err(AppError::Config(format!(
                    "Station source '{}' needs a region name",
                    source.path
                )));
            }
        }

        if self.data.floods.trim().is_empty() {
            return Err(AppError::Config(
                "Flood incident file path cannot be empty".to_string(),
            ));
        }

        let columns = [
            ("month", &self.data.columns.month),
            ("year", &self.data.columns.year),
            ("rainfall", &self.data.columns.rainfall),
        ];
        for (name, value) in &columns {
            if value.trim().is_empty() {
                return Err(AppError::Config(format!(
                    "Station column name for {} cannot be empty",
                    name
                )));
            }
        }

        // Years
        match &self.defaults.years {
            YearsConfig::Keyword(keyword) => {
                if keyword != "current" && keyword != "all" {
                    return Err(AppError::Config(format!(
                        "Unknown years keyword '{}', expected 'current' or 'all'",
                        keyword
                    )));
                }
            }
            YearsConfig::Range { from, to } => {
                if from > to {
                    return Err(AppError::Config(format!(
                        "Default year range is reversed: {} > {}",
                        from, to
                    )));
                }
                check_year(*from)?;
                check_year(*to)?;
            }
            YearsConfig::Specific(years) => {
                for year in years {
                    check_year(*year)?;
                }
            }
        }

        // Months must come from the label vocabulary
        for label in &self.defaults.months {
            if month::ordinal(label).is_none() {
                return Err(AppError::Config(format!(
                    "Unknown month '{}' in defaults.months (expected one of: {})",
                    label,
                    month::MONTH_LABELS.join(", ")
                )));
            }
        }

        Ok(())
    }
}

fn check_year(year: i32) -> Result<()> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(AppError::Config(format!(
            "Year {} out of valid range ({}-{})",
            year, MIN_YEAR, MAX_YEAR
        )));
    }
    Ok(())
}

/// Replace every `${NAME}` with the value of `NAME` from the environment.
///
/// All unset names are collected so the error lists them in one go.
fn expand_env_vars(content: &str) -> Result<String> {
    let re = regex_lite::Regex::new(r"\$\{([^}]+)\}")
        .map_err(|e| AppError::Config(format!("Invalid env pattern: {}", e)))?;

    let mut unset: Vec<String> = Vec::new();
    let expanded = re
        .replace_all(content, |caps: &regex_lite::Captures<'_>| {
            std::env::var(&caps[1]).unwrap_or_else(|_| {
                if !unset.iter().any(|name| name == &caps[1]) {
                    unset.push(caps[1].to_string());
                }
                // left as-is; the error below reports it
                caps[0].to_string()
            })
        })
        .into_owned();

    if let Some(first) = unset.first() {
        return Err(AppError::Config(format!(
            "Environment variable(s) not set: {}\n\n\
             Export them (e.g. `export {}=...`) or add them to a .env file \
             next to the binary; .env.example lists the ones the sample config uses.",
            unset.join(", "),
            first
        )));
    }

    Ok(expanded)
}

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

/// Config file read from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "credit-dash.json";
/// Points at an alternative config file.
pub const CONFIG_ENV: &str = "CREDIT_DASH_CONFIG";
/// Overrides `data_path`.
pub const DATA_ENV: &str = "CREDIT_DASH_DATA";

/// Source encoding for "not currently employed" in `DAYS_EMPLOYED`.
pub const EMPLOYMENT_SENTINEL_DAYS: f64 = 365_243.0;

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Applicant table (.csv, .parquet/.pq or .json).
    pub data_path: PathBuf,
    /// Divisor turning day counts into years.
    pub days_per_year: f64,
    /// Raw `DAYS_EMPLOYED` value meaning "not employed".
    pub employment_sentinel_days: Option<f64>,
    /// Employment durations above this are treated as placeholders.
    pub max_employment_years: f64,
    /// Bin count of the employment histogram.
    pub histogram_bins: usize,
    /// Upper bound on points drawn over the age distribution.
    pub max_scatter_points: usize,
    /// Filters applied as soon as the dataset is loaded.
    pub preset_filters: Vec<PresetFilter>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/application_train.csv"),
            days_per_year: 365.0,
            employment_sentinel_days: Some(EMPLOYMENT_SENTINEL_DAYS),
            max_employment_years: 60.0,
            histogram_bins: 30,
            max_scatter_points: 2_000,
            preset_filters: Vec::new(),
        }
    }
}

/// A filter named by attribute text, resolved against the dataset at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PresetFilter {
    Range {
        attribute: String,
        min: f64,
        max: f64,
    },
    Categories {
        attribute: String,
        values: Vec<String>,
    },
}

impl DashboardConfig {
    /// Resolve the configuration: explicit `CREDIT_DASH_CONFIG` file, else
    /// `credit-dash.json` if it exists, else defaults. `CREDIT_DASH_DATA`
    /// wins over the file's `data_path`.
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => {
                log::debug!("No config file found, using defaults");
                Self::default()
            }
        };

        if let Some(path) = std::env::var_os(DATA_ENV) {
            config.data_path = PathBuf::from(path);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: DashboardConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.days_per_year.is_finite() && self.days_per_year > 0.0) {
            bail!("days_per_year must be positive, got {}", self.days_per_year);
        }
        if !(self.max_employment_years.is_finite() && self.max_employment_years > 0.0) {
            bail!(
                "max_employment_years must be positive, got {}",
                self.max_employment_years
            );
        }
        if self.histogram_bins == 0 {
            bail!("histogram_bins must be at least 1");
        }
        for preset in &self.preset_filters {
            if let PresetFilter::Range { attribute, min, max } = preset {
                if min > max {
                    bail!("preset range for {attribute} has min {min} > max {max}");
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let config: DashboardConfig =
            serde_json::from_str(r#"{ "data_path": "loans.parquet", "histogram_bins": 12 }"#)
                .unwrap();
        assert_eq!(config.data_path, PathBuf::from("loans.parquet"));
        assert_eq!(config.histogram_bins, 12);
        assert_eq!(config.days_per_year, 365.0);
        assert_eq!(config.employment_sentinel_days, Some(EMPLOYMENT_SENTINEL_DAYS));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn preset_filters_are_tagged() {
        let config: DashboardConfig = serde_json::from_str(
            r#"{
                "preset_filters": [
                    { "kind": "range", "attribute": "income_total", "min": 0, "max": 500000 },
                    { "kind": "categories", "attribute": "CODE_GENDER", "values": ["F"] }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(
            config.preset_filters,
            vec![
                PresetFilter::Range {
                    attribute: "income_total".into(),
                    min: 0.0,
                    max: 500_000.0
                },
                PresetFilter::Categories {
                    attribute: "CODE_GENDER".into(),
                    values: vec!["F".into()]
                },
            ]
        );
    }

    #[test]
    fn invalid_values_are_rejected() {
        let config = DashboardConfig {
            days_per_year: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = DashboardConfig {
            preset_filters: vec![PresetFilter::Range {
                attribute: "age_years".into(),
                min: 50.0,
                max: 20.0,
            }],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let err = DashboardConfig::from_file(Path::new("does/not/exist.json")).unwrap_err();
        assert!(format!("{err:#}").contains("reading config file"));
    }
}

//! A module for validating and loading the configuration of a rainflow counting job.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::timeseries::TimeSeries;

/// Represents an error that can occur during validation of configuration data.
#[derive(Debug)]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    /// Creates a new `ValidationError` with a given message.
    ///
    /// # Arguments
    ///
    /// * `message` - A description of the error.
    pub fn new(message: &str) -> ValidationError {
        ValidationError {
            message: message.to_owned(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Represents the configuration of a rainflow counting job.
#[derive(Debug, Deserialize)]
pub struct Config {
    pub solution: Solution,
    pub timeseries: TimeSeries,
}

impl Config {
    /// Validates the entire configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.solution.validate()?;
        self.timeseries.validate()?;
        Ok(())
    }
}

/// Which extraction the counter runs at every extraction point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mode {
    /// Replay every cycle closed so far, then the open half cycles.
    All,
    /// Only the cycles closed since the previous extraction, then the open half cycles.
    New,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Output {
    Json,
    Csv,
}

/// Represents how the counter is driven and how its results are reported.
#[derive(Debug, Deserialize)]
pub struct Solution {
    /// Extraction mode, `ALL` or `NEW`.
    pub mode: Mode,
    /// Leave the provisional last point out of every extraction.
    #[serde(default)]
    pub ignore_stopper: bool,
    /// Extract after every `extract_every` samples. `0` extracts once, after the last sample.
    #[serde(default)]
    pub extract_every: usize,
    /// Report format, `JSON` or `CSV`.
    pub output: Output,
    /// Where the report is written. Standard output when absent.
    pub output_path: Option<String>,
}

impl Solution {
    /// Validates the `Solution` configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use dropflow::config::{Mode, Output, Solution};
    ///
    /// let solution = Solution {
    ///     mode: Mode::New,
    ///     ignore_stopper: false,
    ///     extract_every: 100,
    ///     output: Output::Csv,
    ///     output_path: None,
    /// };
    /// assert!(solution.validate().is_ok());
    ///
    /// let blank_path = Solution { output_path: Some(String::from(" ")), ..solution };
    /// assert!(blank_path.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(path) = &self.output_path {
            if path.trim().is_empty() {
                return Err(ValidationError::new("output_path must not be empty"));
            }
        }
        Ok(())
    }
}

/// Loads the configuration from a YAML file, or from TOML when the extension is `.toml`.
///
/// # Errors
///
/// This function will return an error if reading or parsing the configuration file fails.
pub fn load_config<P: AsRef<Path>>(config_path: P) -> Result<Config> {
    let path = config_path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => toml::from_str(&content)
            .with_context(|| format!("failed to parse TOML config {}", path.display()))?,
        _ => serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse YAML config {}", path.display()))?,
    };
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config() {
        let config_path = "tests/config.yaml";
        let config = load_config(config_path).expect("Failed to load config");
        assert!(
            config.validate().is_ok(),
            "Expected Ok(()) but got Err with {:?}",
            config.validate()
        );
        assert_eq!(config.solution.mode, Mode::All);
        assert_eq!(config.solution.output, Output::Json);
        assert_eq!(config.timeseries.loadcases.len(), 2);
    }

    #[test]
    fn test_validate_rejects_invalid_parts() {
        let mut config = load_config("tests/config.yaml").expect("Failed to load config");
        config.solution.output_path = Some(String::from(""));
        assert!(config.validate().is_err());

        let mut config = load_config("tests/config.yaml").expect("Failed to load config");
        config.timeseries.loadcases.clear();
        let err = config.validate().unwrap_err();
        assert_eq!(err.to_string(), "loadcases must not be empty");
    }

    #[test]
    fn test_load_toml_config() {
        let config = load_config("tests/config.toml").expect("Failed to load config");
        assert!(config.validate().is_ok());
        assert_eq!(config.solution.mode, Mode::New);
        assert_eq!(config.solution.output, Output::Csv);
        assert_eq!(config.solution.extract_every, 4);
        assert!(config.solution.ignore_stopper);
    }

    #[test]
    fn test_missing_config() {
        let err = load_config("tests/missing.yaml").unwrap_err();
        assert!(err.to_string().contains("tests/missing.yaml"));
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        let yaml = "mode: SOME\noutput: JSON\n";
        assert!(serde_yaml::from_str::<Solution>(yaml).is_err());
    }
}

//! Contains the `TimeSeries` struct and related functionality for reading load series.
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::config::ValidationError;
use crate::reversal::Sample;

fn default_scale() -> f64 {
    1.0
}

/// Represents the load series of a rainflow counting job.
///
/// Every load case is a delimited text file under `path`, parsed the same way.
#[derive(Debug, Deserialize)]
pub struct TimeSeries {
    pub path: String,
    pub parse_config: ParseConfig,
    /// Factor applied to every value read.
    #[serde(default = "default_scale")]
    pub scale: f64,
    pub loadcases: Vec<LoadCase>,
}

#[derive(Debug, Deserialize)]
pub struct LoadCase {
    pub name: String,
    pub file: String,
}

impl LoadCase {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::new("name must not be empty"));
        }
        if self.file.trim().is_empty() {
            return Err(ValidationError::new("file must not be empty"));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct ParseConfig {
    /// Number of leading lines to skip.
    pub header: usize,
    pub delimiter: String,
    /// Column holding the sample index. Row numbers (from 0, after the header) when absent.
    pub index_column: Option<usize>,
    pub value_column: usize,
}

impl ParseConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.delimiter.len() != 1 {
            return Err(ValidationError::new(&format!(
                "delimiter must be a single byte, got {:?}",
                self.delimiter
            )));
        }
        if self.index_column == Some(self.value_column) {
            return Err(ValidationError::new(&format!(
                "index_column and value_column must differ, both are {}",
                self.value_column
            )));
        }
        Ok(())
    }

    fn delimiter(&self) -> u8 {
        self.delimiter.as_bytes().first().copied().unwrap_or(b',')
    }
}

impl TimeSeries {
    /// Validates the configuration of the `TimeSeries`.
    ///
    /// This method ensures that:
    /// - The parse configuration is usable.
    /// - The scale is a finite, non-zero number.
    /// - Load cases are specified, uniquely named, and their files exist.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.parse_config.validate()?;
        if !self.scale.is_finite() || self.scale == 0.0 {
            return Err(ValidationError::new(&format!(
                "scale must be a finite non-zero number, got {}",
                self.scale
            )));
        }
        if self.loadcases.is_empty() {
            return Err(ValidationError::new("loadcases must not be empty"));
        }
        for (i, lc) in self.loadcases.iter().enumerate() {
            lc.validate()?;
            if self.loadcases[..i].iter().any(|other| other.name == lc.name) {
                return Err(ValidationError::new(&format!(
                    "loadcase name is used twice: {}",
                    lc.name
                )));
            }
            let full_path = self.loadcase_path(lc);
            if !full_path.exists() {
                return Err(ValidationError::new(&format!(
                    "loadcase file does not exist: {}",
                    full_path.display()
                )));
            }
        }
        Ok(())
    }

    pub fn loadcase_path(&self, lc: &LoadCase) -> PathBuf {
        Path::new(self.path.trim()).join(lc.file.trim())
    }

    /// Reads the samples of a load case, scaled.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a row lacks a parsable
    /// index or value.
    pub fn read_loadcase(&self, lc: &LoadCase) -> Result<Vec<Sample>> {
        let path = self.loadcase_path(lc);
        let file = File::open(&path)
            .with_context(|| format!("failed to open loadcase file {}", path.display()))?;
        read_samples(file, &self.parse_config, self.scale)
            .with_context(|| format!("failed to read loadcase file {}", path.display()))
    }
}

/// Parses delimited rows into samples.
pub fn read_samples<R: std::io::Read>(
    reader: R,
    parse_config: &ParseConfig,
    scale: f64,
) -> Result<Vec<Sample>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .delimiter(parse_config.delimiter())
        .from_reader(reader);

    let mut samples = Vec::new();
    for (row, record) in rdr.records().skip(parse_config.header).enumerate() {
        let record = record?;
        let line = row + parse_config.header + 1;
        let field = |column: usize| {
            record
                .get(column)
                .ok_or_else(|| anyhow!("line {}: missing column {}", line, column))
        };
        let value = field(parse_config.value_column)?
            .parse::<f64>()
            .with_context(|| format!("line {}: invalid value", line))?;
        let index = match parse_config.index_column {
            Some(column) => field(column)?
                .parse::<usize>()
                .with_context(|| format!("line {}: invalid index", line))?,
            None => row,
        };
        samples.push(Sample::new(index, value * scale));
    }
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config;

    fn parse_config(header: usize, delimiter: &str, index_column: Option<usize>) -> ParseConfig {
        ParseConfig {
            header,
            delimiter: delimiter.to_string(),
            index_column,
            value_column: 1,
        }
    }

    #[test]
    fn test_read_samples_with_index_column() {
        let data = "index,stress\n0, -2.0\n1,1\n5,-3.5\n";
        let samples = read_samples(data.as_bytes(), &parse_config(1, ",", Some(0)), 2.0).unwrap();
        assert_eq!(
            samples,
            vec![Sample::new(0, -4.0), Sample::new(1, 2.0), Sample::new(5, -7.0)]
        );
    }

    #[test]
    fn test_read_samples_with_row_numbers() {
        let data = "# rig 4\n# t;stress\n0.00;3\n0.01;4\n";
        let samples = read_samples(data.as_bytes(), &parse_config(2, ";", None), 1.0).unwrap();
        assert_eq!(samples, vec![Sample::new(0, 3.0), Sample::new(1, 4.0)]);
    }

    #[test]
    fn test_read_samples_reports_line() {
        let data = "0,1\n1,x\n";
        let err = read_samples(data.as_bytes(), &parse_config(0, ",", Some(0)), 1.0).unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"), "{:#}", err);

        let data = "0\n";
        let err = read_samples(data.as_bytes(), &parse_config(0, ",", Some(0)), 1.0).unwrap_err();
        assert!(err.to_string().contains("missing column 1"));
    }

    #[test]
    fn test_validate_parse_config() {
        assert!(parse_config(0, ",", None).validate().is_ok());
        assert!(parse_config(0, "", None).validate().is_err());
        assert!(parse_config(0, "::", None).validate().is_err());
        assert!(parse_config(0, ",", Some(1)).validate().is_err());
    }

    #[test]
    fn test_read_loadcase_from_config() {
        let config = load_config("tests/config.yaml").expect("Failed to load config");
        let ts = &config.timeseries;
        let samples = ts.read_loadcase(&ts.loadcases[0]).unwrap();
        let values: Vec<f64> = samples.iter().map(|s| s.value).collect();
        assert_eq!(values, vec![-2.0, 1.0, -3.0, 5.0, -1.0, 3.0, -4.0, 4.0, -2.0]);
        assert_eq!(samples.last().map(|s| s.index), Some(8));
    }

    fn loadcase(name: &str, file: &str) -> LoadCase {
        LoadCase {
            name: name.to_string(),
            file: file.to_string(),
        }
    }

    fn timeseries(scale: f64, loadcases: Vec<LoadCase>) -> TimeSeries {
        TimeSeries {
            path: String::from("tests/data"),
            parse_config: parse_config(1, ",", Some(0)),
            scale,
            loadcases,
        }
    }

    #[test]
    fn test_validate_timeseries() {
        let valid = timeseries(1.0, vec![loadcase("a", "case1.csv"), loadcase("b", "case2.csv")]);
        assert!(valid.validate().is_ok());

        let broken_parse = TimeSeries {
            parse_config: parse_config(1, "", None),
            ..timeseries(1.0, vec![loadcase("a", "case1.csv")])
        };
        assert!(broken_parse.validate().is_err());

        assert!(timeseries(0.0, vec![loadcase("a", "case1.csv")]).validate().is_err());
        assert!(timeseries(f64::NAN, vec![loadcase("a", "case1.csv")]).validate().is_err());
        assert!(timeseries(f64::INFINITY, vec![loadcase("a", "case1.csv")]).validate().is_err());
        assert!(timeseries(-2.0, vec![loadcase("a", "case1.csv")]).validate().is_ok());

        let err = timeseries(1.0, vec![]).validate().unwrap_err();
        assert_eq!(err.to_string(), "loadcases must not be empty");
    }

    #[test]
    fn test_validate_loadcases() {
        let err = timeseries(1.0, vec![loadcase(" ", "case1.csv")]).validate().unwrap_err();
        assert_eq!(err.to_string(), "name must not be empty");

        let err = timeseries(1.0, vec![loadcase("a", "")]).validate().unwrap_err();
        assert_eq!(err.to_string(), "file must not be empty");

        let twice = vec![loadcase("a", "case1.csv"), loadcase("a", "case2.csv")];
        let err = timeseries(1.0, twice).validate().unwrap_err();
        assert_eq!(err.to_string(), "loadcase name is used twice: a");

        let err = timeseries(1.0, vec![loadcase("a", "missing.csv")]).validate().unwrap_err();
        assert!(err.to_string().starts_with("loadcase file does not exist"), "{}", err);
        assert!(err.to_string().contains("missing.csv"));
    }
}

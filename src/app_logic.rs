//! A module for the main application logic of the rainflow counting tool.
use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use tracing::{debug, info};

use crate::config::{load_config, Config, Mode, Output, Solution};
use crate::cycle::Cycle;
use crate::rainflow::Dropflow;
use crate::reversal::Sample;
use crate::timeseries::LoadCase;

/// The cycles yielded by one extraction call.
#[derive(Debug, Serialize)]
pub struct Extraction {
    /// Number of samples added to the counter before the call.
    pub after_sample: usize,
    pub cycles: Vec<Cycle>,
}

/// Results of counting one load case.
#[derive(Debug, Serialize)]
pub struct LoadCaseReport {
    pub name: String,
    pub file: String,
    pub samples: usize,
    pub mean: f64,
    pub extractions: Vec<Extraction>,
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    loadcase: &'a str,
    after_sample: usize,
    range: f64,
    mean: f64,
    count: f64,
    start: usize,
    end: usize,
}

pub fn run(config_path: &str) -> Result<()> {
    info!(config = config_path, "running");
    let conf = load_config(config_path)?;
    conf.validate().context("invalid configuration")?;
    let reports = count_loadcases(&conf)?;

    match &conf.solution.output_path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create output file {}", path))?;
            write_reports(&conf.solution, &reports, BufWriter::new(file))?;
            info!(output = %path, loadcases = reports.len(), "report written");
        }
        None => write_reports(&conf.solution, &reports, io::stdout().lock())?,
    }
    Ok(())
}

/// Counts every load case of the configuration, each on its own counter.
pub fn count_loadcases(conf: &Config) -> Result<Vec<LoadCaseReport>> {
    conf.timeseries
        .loadcases
        .par_iter()
        .map(|lc| -> Result<LoadCaseReport> {
            let samples = conf.timeseries.read_loadcase(lc)?;
            Ok(count_loadcase(&conf.solution, lc, &samples))
        })
        .collect()
}

/// Streams the samples of a load case through a fresh counter.
pub fn count_loadcase(solution: &Solution, lc: &LoadCase, samples: &[Sample]) -> LoadCaseReport {
    let mut dropflow = Dropflow::new();
    let mut extractions = Vec::new();
    for (n, sample) in samples.iter().enumerate() {
        dropflow.add_point(sample.value, sample.index);
        if solution.extract_every > 0 && (n + 1) % solution.extract_every == 0 {
            extractions.push(extract(&mut dropflow, solution, n + 1));
        }
    }
    let last_extracted = extractions.last().map(|e: &Extraction| e.after_sample);
    if last_extracted != Some(samples.len()) {
        extractions.push(extract(&mut dropflow, solution, samples.len()));
    }
    info!(
        loadcase = %lc.name,
        samples = samples.len(),
        extractions = extractions.len(),
        "loadcase counted"
    );
    LoadCaseReport {
        name: lc.name.clone(),
        file: lc.file.clone(),
        samples: samples.len(),
        mean: dropflow.mean(),
        extractions,
    }
}

fn extract(dropflow: &mut Dropflow, solution: &Solution, after_sample: usize) -> Extraction {
    let cycles: Vec<Cycle> = match solution.mode {
        Mode::All => dropflow.extract_all_cycles(solution.ignore_stopper).collect(),
        Mode::New => dropflow.extract_new_cycles(solution.ignore_stopper).collect(),
    };
    debug!(after_sample, cycles = cycles.len(), "extracted");
    Extraction { after_sample, cycles }
}

/// Writes the reports in the configured output format.
pub fn write_reports<W: Write>(
    solution: &Solution,
    reports: &[LoadCaseReport],
    mut writer: W,
) -> Result<()> {
    match solution.output {
        Output::Json => {
            serde_json::to_writer_pretty(&mut writer, reports)?;
            writeln!(writer)?;
        }
        Output::Csv => {
            let mut wtr = csv::Writer::from_writer(&mut writer);
            for report in reports {
                for extraction in &report.extractions {
                    for cycle in &extraction.cycles {
                        wtr.serialize(CsvRow {
                            loadcase: &report.name,
                            after_sample: extraction.after_sample,
                            range: cycle.range,
                            mean: cycle.mean,
                            count: cycle.count,
                            start: cycle.start,
                            end: cycle.end,
                        })?;
                    }
                }
            }
            wtr.flush()?;
        }
    }
    writer.flush()?;
    Ok(())
}

use crate::rebin::Rebinned;
use crate::stats::{Accumulator, AccumulatorReport};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs::File, io::BufWriter, path::Path};

/// Summary of one rebinned series.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct SeriesReport {
    pub file: String,
    pub n_bins: usize,
    pub step_size: f64,
    pub trimmed: bool,
    pub stats: AccumulatorReport,
}

pub struct Analyzer {
    reports: Vec<SeriesReport>,
}

impl Analyzer {
    pub fn new() -> Self {
        Self {
            reports: Vec::new(),
        }
    }

    pub fn add_file<P: AsRef<Path>>(&mut self, file: P) -> Result<()> {
        let file = file.as_ref();
        let rebinned =
            Rebinned::load(file).with_context(|| format!("failed to load {file:?}"))?;
        let name = file
            .file_name()
            .and_then(|name| name.to_str())
            .context("file name is not valid UTF-8")?;
        self.add(name, &rebinned);
        Ok(())
    }

    pub fn add(&mut self, name: &str, rebinned: &Rebinned) {
        let mut acc = Accumulator::new();
        acc.extend(rebinned.y.iter().copied());
        self.reports.push(SeriesReport {
            file: name.to_string(),
            n_bins: rebinned.y.len(),
            step_size: rebinned.step_size,
            trimmed: rebinned.trimmed,
            stats: acc.report(),
        });
    }

    pub fn reports(&self) -> &[SeriesReport] {
        &self.reports
    }

    pub fn save_results<P: AsRef<Path>>(&self, file: P) -> Result<()> {
        let file = file.as_ref();
        let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
        let writer = BufWriter::new(file);

        serde_json::to_writer_pretty(writer, &self.reports).context("failed to serialize reports")?;
        Ok(())
    }
}

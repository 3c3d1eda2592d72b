use crate::rebin::{DEFAULT_TRIM_TOL, Method};
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, fs, ops::RangeBounds, path::Path};

/// Rebinning parameters.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct RebinConfig {
    /// New resolution of the axis.
    pub dx_new: f64,
    /// Aggregation of the samples inside each new bin.
    #[serde(default)]
    pub method: Method,
    /// Relative tolerance of the even-span test.
    #[serde(default = "default_trim_tol")]
    pub trim_tol: f64,
}

/// Synthetic series parameters.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct SimulateConfig {
    /// Number of samples.
    pub n_samples: usize,
    /// Sample spacing.
    pub dt: f64,
    /// Mean counts per unit of the axis.
    pub rate: f64,
    /// Position of the first sample.
    #[serde(default)]
    pub t_start: f64,
    /// Random seed (OS entropy if absent).
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Tool configuration.
///
/// Loaded from a TOML file and validated before use.
/// See [`Config::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Config {
    pub rebin: RebinConfig,
    /// Only needed to create synthetic series.
    #[serde(default)]
    pub simulate: Option<SimulateConfig>,
}

fn default_trim_tol() -> f64 {
    DEFAULT_TRIM_TOL
}

impl Config {
    /// Load a [`Config`] from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;
        Self::parse(&contents)
    }

    /// Parse and validate a [`Config`] from TOML text.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let rebin = &self.rebin;
        check_num(rebin.dx_new, f64::MIN_POSITIVE..f64::INFINITY)
            .context("invalid new resolution")?;
        check_num(rebin.trim_tol, 0.0..1e-3).context("invalid trim tolerance")?;

        if let Some(simulate) = &self.simulate {
            check_num(simulate.n_samples, 2..=10_000_000)
                .context("invalid number of samples")?;
            check_num(simulate.dt, f64::MIN_POSITIVE..f64::INFINITY)
                .context("invalid sample spacing")?;
            check_num(simulate.rate, f64::MIN_POSITIVE..f64::INFINITY)
                .context("invalid rate")?;
            if !simulate.t_start.is_finite() {
                bail!("first sample position must be finite");
            }
        }

        Ok(())
    }
}

fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}

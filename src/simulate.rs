use crate::config::SimulateConfig;
use crate::series::Series;
use anyhow::{Context, Result};
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;
use rand_distr::Poisson;

/// Synthetic counting series generator.
///
/// Produces uniformly sampled Poisson counts, reproducible when seeded.
pub struct Simulator {
    cfg: SimulateConfig,
    rng: ChaCha12Rng,
}

impl Simulator {
    /// Create a new `Simulator`, seeded from the configuration or from OS entropy.
    pub fn new(cfg: SimulateConfig) -> Result<Self> {
        let rng = match cfg.seed {
            Some(seed) => ChaCha12Rng::seed_from_u64(seed),
            None => ChaCha12Rng::try_from_os_rng().context("failed to seed rng")?,
        };
        Ok(Self { cfg, rng })
    }

    /// Generate one series of `n_samples` counts spaced by `dt`.
    pub fn generate_series(&mut self) -> Result<Series> {
        let n_samples = self.cfg.n_samples;
        let dt = self.cfg.dt;

        let count_dist = Poisson::new(self.cfg.rate * dt)?;

        let x = (0..n_samples)
            .map(|i_sample| self.cfg.t_start + i_sample as f64 * dt)
            .collect();
        let y = (0..n_samples)
            .map(|_| count_dist.sample(&mut self.rng))
            .collect();

        Series::new(x, y)
    }
}

use crate::advisory::{Advisor, LogAdvisor, Severity};
use crate::analysis::Analyzer;
use crate::config::{Config, RebinConfig};
use crate::rebin::{Rebinned, rebin_with_tol};
use crate::series::Series;
use crate::simulate::Simulator;
use anyhow::{Context, Result};
use glob::glob;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Relative spacing deviation above which an axis is reported as non-uniform.
const UNIFORM_TOL: f64 = 1e-6;

const SERIES_PREFIX: &str = "series-";
const REBINNED_PREFIX: &str = "rebinned-";

pub struct Manager {
    work_dir: PathBuf,
    cfg: Config,
    advisor: Box<dyn Advisor>,
}

impl Manager {
    pub fn new<P: AsRef<Path>>(work_dir: P) -> Result<Self> {
        Self::with_advisor(work_dir, Box::new(LogAdvisor))
    }

    pub fn with_advisor<P: AsRef<Path>>(work_dir: P, advisor: Box<dyn Advisor>) -> Result<Self> {
        let work_dir = work_dir.as_ref().to_path_buf();

        let cfg =
            Config::from_file(work_dir.join("config.toml")).context("failed to construct cfg")?;
        log::info!("{cfg:#?}");

        Ok(Self {
            work_dir,
            cfg,
            advisor,
        })
    }

    pub fn create_series(&self) -> Result<()> {
        let simulate_cfg = self
            .cfg
            .simulate
            .clone()
            .context("config has no [simulate] section")?;

        let file_idx = self
            .next_series_idx()
            .context("failed to find next series index")?;

        let mut simulator =
            Simulator::new(simulate_cfg).context("failed to construct simulator")?;
        let series = simulator
            .generate_series()
            .context("failed to generate series")?;

        let file = self.series_file(file_idx);
        series.save(&file).with_context(|| format!("failed to save {file:?}"))?;
        log::info!("created {file:?}");

        Ok(())
    }

    pub fn rebin_all(&self) -> Result<()> {
        let series_files = self
            .glob_files(&format!("{SERIES_PREFIX}*.msgpack"))
            .context("failed to list series files")?;
        for series_file in series_files {
            let series = Series::load(&series_file)
                .with_context(|| format!("failed to load {series_file:?}"))?;

            let rebinned = rebin_series(&series, &self.cfg.rebin, self.advisor.as_ref())
                .with_context(|| format!("failed to rebin {series_file:?}"))?;

            let rebinned_file = self.rebinned_file(&series_file)?;
            rebinned
                .save(&rebinned_file)
                .with_context(|| format!("failed to save {rebinned_file:?}"))?;
            log::info!("created {rebinned_file:?}");
        }

        Ok(())
    }

    pub fn analyze_all(&self) -> Result<()> {
        let mut analyzer = Analyzer::new();

        let rebinned_files = self
            .glob_files(&format!("{REBINNED_PREFIX}*.msgpack"))
            .context("failed to list rebinned files")?;
        for rebinned_file in rebinned_files {
            analyzer
                .add_file(&rebinned_file)
                .context("failed to add file")?;
        }

        for report in analyzer.reports() {
            log::info!("{report:?}");
        }

        let results_file = self.results_file();
        analyzer
            .save_results(&results_file)
            .context("failed to save results")?;
        log::info!("created {results_file:?}");

        Ok(())
    }

    pub fn clean(&self) -> Result<()> {
        for pattern in ["series-*.msgpack", "rebinned-*.msgpack", "summary.json"] {
            for file in self.glob_files(pattern)? {
                fs::remove_file(&file).with_context(|| format!("failed to remove {file:?}"))?;
                log::info!("removed {file:?}");
            }
        }
        Ok(())
    }

    fn glob_files(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        let pattern = self.work_dir.join(pattern);
        let pattern = pattern.to_str().context("pattern is not valid UTF-8")?;
        let files = glob(pattern)
            .context("failed to glob files")?
            .filter_map(Result::ok)
            .filter(|p| p.is_file())
            .collect();
        Ok(files)
    }

    fn next_series_idx(&self) -> Result<usize> {
        let series_files = self.glob_files(&format!("{SERIES_PREFIX}*.msgpack"))?;
        let next_idx = series_files
            .iter()
            .filter_map(|file| file_idx(file, SERIES_PREFIX))
            .max()
            .map_or(0, |idx| idx + 1);
        Ok(next_idx)
    }

    fn series_file(&self, file_idx: usize) -> PathBuf {
        self.work_dir
            .join(format!("{SERIES_PREFIX}{file_idx:04}.msgpack"))
    }

    fn rebinned_file(&self, series_file: &Path) -> Result<PathBuf> {
        let name = series_file
            .file_name()
            .and_then(|name| name.to_str())
            .context("file name is not valid UTF-8")?;
        let suffix = name
            .strip_prefix(SERIES_PREFIX)
            .with_context(|| format!("{name:?} is not a series file"))?;
        Ok(self.work_dir.join(format!("{REBINNED_PREFIX}{suffix}")))
    }

    fn results_file(&self) -> PathBuf {
        self.work_dir.join("summary.json")
    }
}

fn file_idx(file: &Path, prefix: &str) -> Option<usize> {
    file.file_stem()?.to_str()?.strip_prefix(prefix)?.parse().ok()
}

/// Rebin one series with the configured parameters, advising about suspicious input.
pub fn rebin_series(series: &Series, cfg: &RebinConfig, advisor: &dyn Advisor) -> Result<Rebinned> {
    if let &[x_0, x_1, ..] = series.x.as_slice() {
        let dx_old = x_1 - x_0;
        let dev = series.max_spacing_dev();
        if dev > UNIFORM_TOL * dx_old.abs() {
            advisor.advise(
                &format!("axis spacing deviates from {dx_old} by up to {dev}"),
                Severity::Warning,
            );
        }
    }

    let rebinned = rebin_with_tol(&series.x, &series.y, cfg.dx_new, cfg.method, cfg.trim_tol)?;

    if rebinned.y.is_empty() {
        advisor.advise(
            &format!("no complete bin of width {} fits the series", cfg.dx_new),
            Severity::Warning,
        );
    } else if rebinned.trimmed {
        advisor.advise(
            &format!("dropped incomplete trailing bin of width {}", cfg.dx_new),
            Severity::Info,
        );
    }

    Ok(rebinned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisory::testing::RecordingAdvisor;
    use crate::rebin::{DEFAULT_TRIM_TOL, Method, RebinError};
    use std::env;

    fn work_dir(name: &str, config: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("rebinner-{name}-{}", std::process::id()));
        fs::remove_dir_all(&dir).ok();
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("config.toml"), config).unwrap();
        dir
    }

    fn cfg(dx_new: f64) -> RebinConfig {
        RebinConfig {
            dx_new,
            method: Method::Sum,
            trim_tol: DEFAULT_TRIM_TOL,
        }
    }

    fn series(n_vals: usize) -> Series {
        Series::new(
            (0..n_vals).map(|i| i as f64).collect(),
            vec![1.0; n_vals],
        )
        .unwrap()
    }

    #[test]
    fn clean_rebin_gives_no_advice() {
        let advisor = RecordingAdvisor::default();
        let rebinned = rebin_series(&series(6), &cfg(2.0), &advisor).unwrap();
        assert_eq!(rebinned.y, vec![2.0, 2.0, 2.0]);
        assert!(advisor.records.borrow().is_empty());
    }

    #[test]
    fn trimmed_bin_is_advised() {
        let advisor = RecordingAdvisor::default();
        let rebinned = rebin_series(&series(7), &cfg(2.0), &advisor).unwrap();
        assert_eq!(rebinned.y.len(), 3);
        let records = advisor.records.borrow();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].1, Severity::Info);
    }

    #[test]
    fn empty_result_is_advised() {
        let advisor = RecordingAdvisor::default();
        let rebinned = rebin_series(&series(3), &cfg(10.0), &advisor).unwrap();
        assert!(rebinned.y.is_empty());
        let records = advisor.records.borrow();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].1, Severity::Warning);
    }

    #[test]
    fn non_uniform_axis_is_advised() {
        let advisor = RecordingAdvisor::default();
        let series = Series::new(vec![0.0, 1.0, 2.0, 3.5], vec![1.0; 4]).unwrap();
        rebin_series(&series, &cfg(2.0), &advisor).unwrap();
        let records = advisor.records.borrow();
        assert!(records[0].0.contains("axis spacing"));
        assert_eq!(records[0].1, Severity::Warning);
    }

    #[test]
    fn core_errors_propagate() {
        let advisor = RecordingAdvisor::default();
        let err = rebin_series(&series(6), &cfg(0.5), &advisor).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RebinError>(),
            Some(RebinError::InvalidResolution { .. })
        ));
    }

    #[test]
    fn create_requires_simulate_section() {
        let dir = work_dir("no-simulate", "[rebin]\ndx_new = 2.0\n");
        let mgr = Manager::new(&dir).unwrap();

        let err = mgr.create_series().unwrap_err();
        assert!(format!("{err:#}").contains("[simulate]"), "{err:#}");
        assert!(!dir.join("series-0000.msgpack").exists());

        // Rebinning existing series needs no simulation settings.
        series(6).save(dir.join("series-0000.msgpack")).unwrap();
        mgr.rebin_all().unwrap();
        let rebinned = Rebinned::load(dir.join("rebinned-0000.msgpack")).unwrap();
        assert_eq!(rebinned.y, vec![2.0, 2.0, 2.0]);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn gaps_in_file_indices() {
        let config = "[rebin]\ndx_new = 2.0\n\n\
                      [simulate]\nn_samples = 8\ndt = 1.0\nrate = 5.0\nseed = 1\n";
        let dir = work_dir("gaps", config);
        let mgr = Manager::new(&dir).unwrap();

        series(6).save(dir.join("series-0001.msgpack")).unwrap();

        mgr.rebin_all().unwrap();
        assert!(dir.join("rebinned-0001.msgpack").exists());
        assert!(!dir.join("rebinned-0000.msgpack").exists());

        mgr.create_series().unwrap();
        assert!(dir.join("series-0002.msgpack").exists());
        assert!(!dir.join("series-0000.msgpack").exists());

        mgr.analyze_all().unwrap();
        assert!(dir.join("summary.json").exists());

        mgr.clean().unwrap();
        assert!(!dir.join("series-0001.msgpack").exists());
        assert!(!dir.join("rebinned-0001.msgpack").exists());
        assert!(!dir.join("summary.json").exists());
        assert!(dir.join("config.toml").exists());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn file_indices_from_names() {
        assert_eq!(file_idx(Path::new("/w/series-0012.msgpack"), SERIES_PREFIX), Some(12));
        assert_eq!(file_idx(Path::new("/w/series-x.msgpack"), SERIES_PREFIX), None);
        assert_eq!(file_idx(Path::new("/w/rebinned-0003.msgpack"), SERIES_PREFIX), None);
    }
}

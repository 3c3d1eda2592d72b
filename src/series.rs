//! Sampled series and their MessagePack files.

use crate::rebin::Rebinned;
use anyhow::{Context, Result, bail};
use rmp_serde::{decode, encode};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

/// Uniformly sampled series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    /// Sample positions.
    pub x: Vec<f64>,
    /// Sample values.
    pub y: Vec<f64>,
}

impl Series {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self> {
        if x.len() != y.len() {
            bail!("axis has {} points, but there are {} values", x.len(), y.len());
        }
        Ok(Self { x, y })
    }

    /// Largest absolute deviation of any spacing from the first one.
    ///
    /// Zero for series with fewer than 3 points.
    pub fn max_spacing_dev(&self) -> f64 {
        let Some(dx_old) = self.x.get(1).zip(self.x.first()).map(|(b, a)| b - a) else {
            return 0.0;
        };
        self.x
            .windows(2)
            .map(|pair| (pair[1] - pair[0] - dx_old).abs())
            .fold(0.0, f64::max)
    }

    pub fn load<P: AsRef<Path>>(file: P) -> Result<Self> {
        load_msgpack(file.as_ref())
    }

    pub fn save<P: AsRef<Path>>(&self, file: P) -> Result<()> {
        save_msgpack(file.as_ref(), self)
    }
}

impl Rebinned {
    pub fn load<P: AsRef<Path>>(file: P) -> Result<Self> {
        load_msgpack(file.as_ref())
    }

    pub fn save<P: AsRef<Path>>(&self, file: P) -> Result<()> {
        save_msgpack(file.as_ref(), self)
    }
}

fn load_msgpack<T: for<'de> Deserialize<'de>>(file: &Path) -> Result<T> {
    let file = File::open(file).with_context(|| format!("failed to open {file:?}"))?;
    let mut reader = BufReader::new(file);
    let val = decode::from_read(&mut reader).context("failed to deserialize value")?;
    Ok(val)
}

fn save_msgpack<T: Serialize>(file: &Path, val: &T) -> Result<()> {
    let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
    let mut writer = BufWriter::new(file);
    encode::write(&mut writer, val).context("failed to serialize value")?;
    writer.flush().context("failed to flush writer stream")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{env, fs};

    #[test]
    fn spacing_deviation() {
        let series = Series::new(vec![0.0, 1.0, 2.0, 3.5], vec![0.0; 4]).unwrap();
        assert_eq!(series.max_spacing_dev(), 0.5);

        let series = Series::new(vec![0.0, 0.5, 1.0], vec![0.0; 3]).unwrap();
        assert_eq!(series.max_spacing_dev(), 0.0);

        let series = Series::new(vec![], vec![]).unwrap();
        assert_eq!(series.max_spacing_dev(), 0.0);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        assert!(Series::new(vec![0.0, 1.0], vec![1.0]).is_err());
    }

    #[test]
    fn msgpack_files() {
        let dir = env::temp_dir().join(format!("rebin-series-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let series = Series::new(vec![0.0, 1.0, 2.0], vec![4.0, 5.0, 6.0]).unwrap();
        let file = dir.join("series.msgpack");
        series.save(&file).unwrap();
        assert_eq!(Series::load(&file).unwrap(), series);

        assert!(Series::load(dir.join("missing.msgpack")).is_err());

        fs::remove_dir_all(&dir).ok();
    }
}

//! Rebinning of uniformly sampled series onto coarser uniform grids.
//!
//! Old samples are treated as piecewise constant over their width, so every new bin
//! receives the exact overlap-weighted contribution of the old samples it covers.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Default relative tolerance used when deciding whether a span is evenly divided.
pub const DEFAULT_TRIM_TOL: f64 = 1e-9;

/// Rejected rebinning requests.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RebinError {
    #[error("axis must have at least 2 points, but has {len}")]
    TooFewSamples { len: usize },

    #[error("axis has {x_len} points, but there are {y_len} values")]
    LengthMismatch { x_len: usize, y_len: usize },

    #[error("axis spacing must be positive and finite, but is {dx_old}")]
    NonIncreasingAxis { dx_old: f64 },

    #[error("new resolution {dx_new} must not be finer than old resolution {dx_old}")]
    InvalidResolution { dx_old: f64, dx_new: f64 },

    #[error("method {0:?} not recognized, use \"sum\" or \"mean\"")]
    UnrecognizedMethod(String),

    #[error("trim tolerance must be non-negative and finite, but is {trim_tol}")]
    InvalidTolerance { trim_tol: f64 },
}

/// How the old samples inside a new bin are aggregated.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Method {
    /// Keep the overlap-weighted total.
    #[default]
    Sum,
    /// Divide the total by the number of old samples per new bin.
    Mean,
}

impl FromStr for Method {
    type Err = RebinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sum" => Ok(Self::Sum),
            "mean" | "avg" | "average" | "arithmetic mean" => Ok(Self::Mean),
            _ => Err(RebinError::UnrecognizedMethod(s.to_string())),
        }
    }
}

impl TryFrom<String> for Method {
    type Error = RebinError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Method> for String {
    fn from(method: Method) -> Self {
        method.to_string()
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sum => write!(f, "sum"),
            Self::Mean => write!(f, "mean"),
        }
    }
}

/// Result of a rebinning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rebinned {
    /// Midpoints of the new bins.
    pub x: Vec<f64>,
    /// Aggregated value of each new bin.
    pub y: Vec<f64>,
    /// Number of old samples (possibly fractional) per new bin.
    pub step_size: f64,
    /// Whether an incomplete trailing bin was dropped.
    pub trimmed: bool,
}

/// Rebin `y`, sampled on the uniform axis `x`, to the coarser resolution `dx_new`.
///
/// Uses [`DEFAULT_TRIM_TOL`]; see [`rebin_with_tol`].
pub fn rebin(x: &[f64], y: &[f64], dx_new: f64, method: Method) -> Result<Rebinned, RebinError> {
    rebin_with_tol(x, y, dx_new, method, DEFAULT_TRIM_TOL)
}

/// Rebin `y`, sampled on the uniform axis `x`, to the coarser resolution `dx_new`.
///
/// The old resolution is `x[1] - x[0]`; uniform spacing is assumed, not checked.
/// When the covered span `x[last] - x[0] + dx_old` is not a whole multiple of `dx_new`
/// the last, incomplete bin is dropped. Ratios within `trim_tol` (relative) of an
/// integer count as whole multiples.
///
/// # Errors
/// Returns an error if the axis has fewer than 2 points, if `x` and `y` differ in
/// length, if the axis spacing is not positive, if `dx_new` is finer than the
/// old resolution, or if `trim_tol` is negative or not finite. Nothing is computed
/// in those cases.
pub fn rebin_with_tol(
    x: &[f64],
    y: &[f64],
    dx_new: f64,
    method: Method,
    trim_tol: f64,
) -> Result<Rebinned, RebinError> {
    if x.len() < 2 {
        return Err(RebinError::TooFewSamples { len: x.len() });
    }
    if y.len() != x.len() {
        return Err(RebinError::LengthMismatch {
            x_len: x.len(),
            y_len: y.len(),
        });
    }
    let dx_old = x[1] - x[0];
    if !(dx_old.is_finite() && dx_old > 0.0) {
        return Err(RebinError::NonIncreasingAxis { dx_old });
    }
    if !(dx_new.is_finite() && dx_new >= dx_old) {
        return Err(RebinError::InvalidResolution { dx_old, dx_new });
    }
    if !(trim_tol.is_finite() && trim_tol >= 0.0) {
        return Err(RebinError::InvalidTolerance { trim_tol });
    }

    let step_size = dx_new / dx_old;
    let n_vals = y.len();

    // One bin per cursor position k * step_size below n_vals.
    let n_bins_exact = n_vals as f64 / step_size;
    let n_bins = if is_near_integer(n_bins_exact, trim_tol) {
        n_bins_exact.round() as usize
    } else {
        n_bins_exact.ceil() as usize
    };

    let mut ybin: Vec<f64> = (0..n_bins)
        .map(|i_bin| bin_total(y, i_bin as f64 * step_size, step_size))
        .collect();

    if method == Method::Mean {
        ybin.iter_mut().for_each(|val| *val /= step_size);
    }

    let tseg = x[x.len() - 1] - x[0] + dx_old;
    let trimmed = !is_near_integer(tseg / dx_new, trim_tol) && ybin.pop().is_some();

    let xbin = (0..ybin.len())
        .map(|i_bin| i_bin as f64 * dx_new + x[0] - dx_old + dx_new)
        .collect();

    Ok(Rebinned {
        x: xbin,
        y: ybin,
        step_size,
        trimmed,
    })
}

/// Overlap-weighted total of the bin spanning `[start, start + step_size)` in sample units.
fn bin_total(y: &[f64], start: f64, step_size: f64) -> f64 {
    let n_vals = y.len();
    let end = start + step_size;

    // Sample straddling the left edge.
    let prev_bin = (start.floor() as usize).min(n_vals - 1);
    let prev_frac = (prev_bin + 1) as f64 - start;
    let mut total = prev_frac * y[prev_bin];

    // Sample straddling the right edge.
    if end < n_vals as f64 {
        let next_bin = end.floor() as usize;
        let next_frac = end - next_bin as f64;
        total += next_frac * y[next_bin];
    }

    // Samples fully inside the bin.
    let lo = (prev_bin + 1).min(n_vals);
    let hi = (end.floor() as usize).clamp(lo, n_vals);
    total += y[lo..hi].iter().sum::<f64>();

    total
}

fn is_near_integer(val: f64, tol: f64) -> bool {
    (val - val.round()).abs() <= tol * val.abs().max(1.0)
}

//! Rebinning of uniformly sampled series onto coarser uniform grids,
//! plus the file-based workflow around it.

pub mod advisory;
pub mod analysis;
pub mod config;
pub mod manager;
pub mod rebin;
pub mod series;
pub mod simulate;
pub mod stats;

pub use rebin::{DEFAULT_TRIM_TOL, Method, RebinError, Rebinned, rebin, rebin_with_tol};

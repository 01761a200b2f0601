//! Core types and utilities for lane-line fitting.
//!
//! This crate is intentionally small and purely geometric. It does *not*
//! depend on any concrete image type: masks are plain row-major byte buffers
//! produced by whatever thresholding / warping stage runs upstream.

mod cluster;
mod logger;
mod mask;
mod polyfit;
mod scale;

pub use cluster::{LanePixelCluster, LaneSide};
pub use mask::{BinaryMask, BinaryMaskView, MaskError};
pub use polyfit::{fit_lane_polynomial, FitError, LaneFit, LineRadius};
pub use scale::MetricScale;

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, level_from_verbosity};

//! High-level facade crate for the `lane-finder-*` workspace.
//!
//! This crate provides:
//! - stable, convenient re-exports of the core types and the detector
//! - (feature-gated) end-to-end helpers that turn an `image::GrayImage`
//!   bird's-eye mask into lane fits, curvature and vehicle offset.
//!
//! ## Quickstart
//!
//! ```no_run
//! use lane_finder::detect;
//! use lane_finder::LaneDetectorParams;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mask = detect::load_mask("warped_binary.png", 128)?;
//! let lanes = detect::detect_lanes(&mask, LaneDetectorParams::default())?;
//! println!(
//!     "R = {:.0} m / {:.0} m, offset {:+.2} m",
//!     lanes.curvature.left_radius_m(),
//!     lanes.curvature.right_radius_m(),
//!     lanes.curvature.offset_m
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `lane_finder::core`: masks, clusters, quadratic lane models, metric scale.
//! - `lane_finder::detector`: sliding-window search, curvature, pipeline, JSON I/O.
//! - `lane_finder::detect` (feature `image`): end-to-end helpers from `image::GrayImage`.
//!
//! Offset convention: positive `offset_m` means the vehicle is right of the
//! lane center.

pub use lane_finder_core as core;
pub use lane_finder_detector as detector;

pub use lane_finder_core::{BinaryMask, BinaryMaskView, LaneFit, LaneSide, LineRadius, MetricScale};
pub use lane_finder_detector::{
    CurvatureResult, LaneDetectError, LaneDetection, LaneDetector, LaneDetectorParams,
    SlidingWindowParams,
};

#[cfg(feature = "image")]
pub mod detect;

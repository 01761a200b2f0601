//! Lane detection pipeline.
//!
//! This module wires together the sliding-window pixel search, the per-side
//! quadratic fits, and the metric curvature / offset estimate.

mod error;
mod params;
mod pipeline;
mod result;

pub use error::LaneDetectError;
pub use params::LaneDetectorParams;
pub use pipeline::LaneDetector;
pub use result::{LaneDetection, LaneLines};

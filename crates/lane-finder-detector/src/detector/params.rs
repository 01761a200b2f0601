use crate::search::SlidingWindowParams;
use lane_finder_core::MetricScale;
use serde::{Deserialize, Serialize};

/// Configuration for the lane detector.
///
/// Every tunable of the pipeline lives here; there is no global calibration
/// state. Missing JSON fields fall back to [`Default`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneDetectorParams {
    /// Sliding-window search settings.
    pub search: SlidingWindowParams,
    /// Pixel-to-meter conversion of the bird's-eye view.
    pub scale: MetricScale,
    /// Threshold on `|2a|` of the metric fit (1/m) below which a line is
    /// reported as straight. `1e-4` corresponds to a radius of ~10 km.
    pub curvature_epsilon: f64,
    /// Half-width in pixels of the band around prior fits used by
    /// [`LaneDetector::detect_with_prior`](super::LaneDetector::detect_with_prior).
    pub prior_margin: usize,
}

impl Default for LaneDetectorParams {
    fn default() -> Self {
        Self {
            search: SlidingWindowParams::default(),
            scale: MetricScale::default(),
            curvature_epsilon: 1e-4,
            prior_margin: 100,
        }
    }
}

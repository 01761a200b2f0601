use crate::curvature::CurvatureResult;
use crate::line::{LaneLine, SideOutcome};
use crate::search::SlidingWindowSearch;
use lane_finder_core::LaneFit;
use serde::{Deserialize, Serialize};

/// Per-side outcome of search + fit, before the curvature stage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LaneLines {
    pub left: SideOutcome,
    pub right: SideOutcome,
    /// Window trace of the sliding-window search; `None` when the pixels were
    /// collected around prior fits.
    pub search: Option<SlidingWindowSearch>,
}

impl LaneLines {
    /// Both sides fitted.
    pub fn is_complete(&self) -> bool {
        self.left.is_ok() && self.right.is_ok()
    }
}

/// Output of a full lane detection run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LaneDetection {
    pub width: usize,
    pub height: usize,
    pub left: LaneLine,
    pub right: LaneLine,
    pub curvature: CurvatureResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<SlidingWindowSearch>,
}

impl LaneDetection {
    /// Pixel-space fits, e.g. to seed [`detect_with_prior`](super::LaneDetector::detect_with_prior)
    /// on the next frame or to draw the lane region.
    pub fn fits(&self) -> (LaneFit, LaneFit) {
        (self.left.fit, self.right.fit)
    }

    /// Drop the per-pixel clusters and the window trace, keeping the fits.
    pub fn without_pixels(mut self) -> Self {
        self.left.cluster.pixels = Vec::new();
        self.right.cluster.pixels = Vec::new();
        self.search = None;
        self
    }
}

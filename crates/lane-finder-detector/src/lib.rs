//! Lane-line fitting on bird's-eye binary masks.
//!
//! ## Quickstart
//!
//! ```
//! use lane_finder_core::BinaryMask;
//! use lane_finder_detector::{LaneDetector, LaneDetectorParams};
//!
//! let mut mask = BinaryMask::new(1280, 720).unwrap();
//! mask.fill_rect(295, 0, 306, 720);
//! mask.fill_rect(975, 0, 986, 720);
//!
//! let detector = LaneDetector::new(LaneDetectorParams::default());
//! let lanes = detector.detect(&mask.view()).unwrap();
//! assert!(lanes.curvature.offset_m.abs() < 0.01);
//! ```
//!
//! Pipeline:
//! 1. Column histogram of the lower half of the mask seeds one window per side.
//! 2. Windows walk the mask in bands from the bottom up, re-centering on the
//!    mean x of dense bands only.
//! 3. Each side's pixels are fitted with `x = a*y^2 + b*y + c`.
//! 4. Pixels are rescaled to meters and re-fitted; radius of curvature and
//!    vehicle offset are evaluated at the bottom row.
//!
//! Per-side failures (`NoLaneEvidence`, `InsufficientPoints`) are reported
//! per side; the curvature stage refuses to run on an incomplete pair.

pub mod curvature;
mod detector;
pub mod io;
pub mod line;
pub mod search;

pub use curvature::{
    CurvatureError, CurvatureEstimator, CurvatureResult, FrameGeometry, MissingSides,
};
pub use detector::{LaneDetectError, LaneDetection, LaneDetector, LaneDetectorParams, LaneLines};
pub use io::{LaneDetectConfig, LaneDetectReport, LaneIoError};
pub use line::{fit_line, LaneLine, LineError, SideOutcome};
pub use search::{
    histogram_bases, row_bands, search_around_fits, sliding_window_search, LaneBases, RowBand,
    SearchError, SideSearchTrace, SlidingWindowParams, SlidingWindowSearch, WindowState,
};

use super::{LaneDetectError, LaneDetection, LaneDetectorParams, LaneLines};
use crate::curvature::{CurvatureError, CurvatureEstimator, FrameGeometry, MissingSides};
use crate::line::{fit_line, SideOutcome};
use crate::search::{search_around_fits, sliding_window_search};
use lane_finder_core::{BinaryMaskView, LaneFit, LanePixelCluster};
use log::{info, warn};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Single-frame lane detector: search -> per-side fit -> curvature.
///
/// The detector holds only its immutable configuration, so one instance can
/// be shared across threads processing independent frames.
#[derive(Clone, Debug)]
pub struct LaneDetector {
    params: LaneDetectorParams,
    curvature: CurvatureEstimator,
}

impl LaneDetector {
    pub fn new(params: LaneDetectorParams) -> Self {
        let curvature = CurvatureEstimator::new(params.scale, params.curvature_epsilon);
        Self { params, curvature }
    }

    /// Detector parameters.
    #[inline]
    pub fn params(&self) -> &LaneDetectorParams {
        &self.params
    }

    /// Sliding-window search and per-side fits, without the curvature stage.
    ///
    /// A side without evidence is reported in its `SideOutcome`; it does not
    /// abort the other side.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, mask), fields(width = mask.width(), height = mask.height()))
    )]
    pub fn detect_lines(&self, mask: &BinaryMaskView<'_>) -> Result<LaneLines, LaneDetectError> {
        let search = sliding_window_search(mask, &self.params.search)?;
        let left = fit_side(search.left.clone());
        let right = fit_side(search.right.clone());
        Ok(LaneLines {
            left,
            right,
            search: Some(search),
        })
    }

    /// Like [`detect_lines`](Self::detect_lines), but collects pixels within
    /// `prior_margin` of the given pixel-space fits instead of searching.
    pub fn detect_lines_with_prior(
        &self,
        mask: &BinaryMaskView<'_>,
        left: &LaneFit,
        right: &LaneFit,
    ) -> Result<LaneLines, LaneDetectError> {
        let (l, r) = search_around_fits(mask, left, right, self.params.prior_margin)?;
        Ok(LaneLines {
            left: fit_side(l),
            right: fit_side(r),
            search: None,
        })
    }

    /// Detect both lane lines and estimate curvature and vehicle offset.
    pub fn detect(&self, mask: &BinaryMaskView<'_>) -> Result<LaneDetection, LaneDetectError> {
        let lines = self.detect_lines(mask)?;
        self.finish(mask, lines)
    }

    /// Full detection seeded by prior fits (e.g. from the previous frame).
    ///
    /// Falling back to [`detect`](Self::detect) on failure is the caller's
    /// decision.
    pub fn detect_with_prior(
        &self,
        mask: &BinaryMaskView<'_>,
        left: &LaneFit,
        right: &LaneFit,
    ) -> Result<LaneDetection, LaneDetectError> {
        let lines = self.detect_lines_with_prior(mask, left, right)?;
        self.finish(mask, lines)
    }

    fn finish(
        &self,
        mask: &BinaryMaskView<'_>,
        lines: LaneLines,
    ) -> Result<LaneDetection, LaneDetectError> {
        let frame = FrameGeometry {
            width: mask.width(),
            height: mask.height(),
        };
        match (lines.left, lines.right) {
            (Ok(left), Ok(right)) => {
                let curvature = self.curvature.estimate_lines(&left, &right, frame)?;
                info!(
                    "lanes: left R={:.0} m, right R={:.0} m, offset {:+.3} m",
                    curvature.left_radius_m(),
                    curvature.right_radius_m(),
                    curvature.offset_m
                );
                Ok(LaneDetection {
                    width: frame.width,
                    height: frame.height,
                    left,
                    right,
                    curvature,
                    search: lines.search,
                })
            }
            (left, right) => Err(CurvatureError::IncompleteLaneFit(MissingSides {
                left: left.err(),
                right: right.err(),
            })
            .into()),
        }
    }
}

fn fit_side(cluster: LanePixelCluster) -> SideOutcome {
    let outcome = fit_line(cluster);
    if let Err(err) = &outcome {
        warn!("{err}");
    }
    outcome
}

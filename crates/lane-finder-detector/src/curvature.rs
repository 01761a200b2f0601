//! Real-world radius of curvature and lateral vehicle offset.
//!
//! Curvature does not survive a per-axis rescale of pixel coefficients, so
//! each cluster is rescaled to meters and re-fitted before evaluation. Both
//! sides are evaluated at the bottom row, the one nearest to the vehicle.
//!
//! Offset sign: positive means the vehicle (image center) is to the right of
//! the lane center, negative means it is to the left.

use crate::line::{LaneLine, LineError, SideOutcome};
use lane_finder_core::{fit_lane_polynomial, FitError, LaneFit, LaneSide, LineRadius, MetricScale};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Frame size of the warped mask the fits were computed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameGeometry {
    pub width: usize,
    pub height: usize,
}

/// Per-side failure reasons carried by [`CurvatureError::IncompleteLaneFit`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MissingSides {
    pub left: Option<LineError>,
    pub right: Option<LineError>,
}

impl fmt::Display for MissingSides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for err in [&self.left, &self.right].into_iter().flatten() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{err}")?;
            first = false;
        }
        Ok(())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CurvatureError {
    #[error("incomplete lane fit: {0}")]
    IncompleteLaneFit(MissingSides),
    #[error("invalid metric scale (xm_per_pix={xm_per_pix}, ym_per_pix={ym_per_pix})")]
    InvalidScale { xm_per_pix: f64, ym_per_pix: f64 },
    #[error("metric re-fit of the {side} lane failed: {source}")]
    MetricRefit { side: LaneSide, source: FitError },
}

/// Curvature and offset for one frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurvatureResult {
    pub left: LineRadius,
    pub right: LineRadius,
    /// Vehicle offset from lane center in meters, positive to the right.
    pub offset_m: f64,
    /// Distance between the two lines at the evaluation row.
    pub lane_width_m: f64,
    /// Lane center x at the evaluation row, in meters from the left image edge.
    pub lane_center_m: f64,
    /// Evaluation point: bottom row in meters.
    pub y_eval_m: f64,
    pub left_fit_m: LaneFit,
    pub right_fit_m: LaneFit,
}

impl CurvatureResult {
    #[inline]
    pub fn left_radius_m(&self) -> f64 {
        self.left.value()
    }

    #[inline]
    pub fn right_radius_m(&self) -> f64 {
        self.right.value()
    }

    /// Average of both radii (infinite if either line is straight).
    pub fn mean_radius_m(&self) -> f64 {
        0.5 * (self.left_radius_m() + self.right_radius_m())
    }
}

/// Converts a pair of fitted lane lines into metric curvature and offset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurvatureEstimator {
    scale: MetricScale,
    epsilon: f64,
}

impl CurvatureEstimator {
    /// `epsilon` is the threshold on `|2a|` (metric space, 1/m) below which
    /// a line is reported as straight.
    pub fn new(scale: MetricScale, epsilon: f64) -> Self {
        Self { scale, epsilon }
    }

    pub fn scale(&self) -> &MetricScale {
        &self.scale
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Curvature and offset for a pair of per-side outcomes.
    ///
    /// Any failed side yields `IncompleteLaneFit` carrying the reasons.
    pub fn estimate(
        &self,
        left: &SideOutcome,
        right: &SideOutcome,
        frame: FrameGeometry,
    ) -> Result<CurvatureResult, CurvatureError> {
        match (left, right) {
            (Ok(l), Ok(r)) => self.estimate_lines(l, r, frame),
            (l, r) => Err(CurvatureError::IncompleteLaneFit(MissingSides {
                left: l.as_ref().err().cloned(),
                right: r.as_ref().err().cloned(),
            })),
        }
    }

    /// Curvature and offset for two fitted lines.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "info",
            skip(self, left, right),
            fields(width = frame.width, height = frame.height)
        )
    )]
    pub fn estimate_lines(
        &self,
        left: &LaneLine,
        right: &LaneLine,
        frame: FrameGeometry,
    ) -> Result<CurvatureResult, CurvatureError> {
        if !self.scale.is_valid() {
            return Err(CurvatureError::InvalidScale {
                xm_per_pix: self.scale.xm_per_pix,
                ym_per_pix: self.scale.ym_per_pix,
            });
        }

        let refit = |side: LaneSide, line: &LaneLine| {
            fit_lane_polynomial(&line.cluster.to_metric(&self.scale))
                .map_err(|source| CurvatureError::MetricRefit { side, source })
        };
        let left_fit_m = refit(LaneSide::Left, left)?;
        let right_fit_m = refit(LaneSide::Right, right)?;

        let y_eval_m = frame.height.saturating_sub(1) as f64 * self.scale.ym_per_pix;
        let left_radius = left_fit_m.radius_of_curvature(y_eval_m, self.epsilon);
        let right_radius = right_fit_m.radius_of_curvature(y_eval_m, self.epsilon);
        for (side, r) in [(LaneSide::Left, left_radius), (LaneSide::Right, right_radius)] {
            if r.is_straight() {
                debug!("{side} lane is straight within epsilon {:.1e}", self.epsilon);
            }
        }

        let left_x_m = left_fit_m.eval(y_eval_m);
        let right_x_m = right_fit_m.eval(y_eval_m);
        let lane_center_m = 0.5 * (left_x_m + right_x_m);
        let vehicle_x_m = 0.5 * frame.width as f64 * self.scale.xm_per_pix;
        let offset_m = vehicle_x_m - lane_center_m;

        debug!(
            "curvature: left={:.1} m right={:.1} m offset={:+.3} m",
            left_radius.value(),
            right_radius.value(),
            offset_m
        );

        Ok(CurvatureResult {
            left: left_radius,
            right: right_radius,
            offset_m,
            lane_width_m: right_x_m - left_x_m,
            lane_center_m,
            y_eval_m,
            left_fit_m,
            right_fit_m,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::fit_line;
    use approx::assert_relative_eq;
    use lane_finder_core::LanePixelCluster;
    use nalgebra::Point2;

    const FRAME: FrameGeometry = FrameGeometry {
        width: 1280,
        height: 720,
    };

    fn line_from(side: LaneSide, x_of_y: impl Fn(f64) -> f64) -> LaneLine {
        let pixels = (0..720u32)
            .map(|y| Point2::new(x_of_y(y as f64).round() as u32, y))
            .collect();
        fit_line(LanePixelCluster { side, pixels }).expect("fit")
    }

    fn estimator() -> CurvatureEstimator {
        CurvatureEstimator::new(MetricScale::default(), 1e-4)
    }

    #[test]
    fn straight_lines_are_degenerate_and_centered() {
        let left = Ok(line_from(LaneSide::Left, |_| 300.0));
        let right = Ok(line_from(LaneSide::Right, |_| 980.0));
        let res = estimator().estimate(&left, &right, FRAME).expect("curvature");
        assert!(res.left.is_straight());
        assert!(res.right.is_straight());
        assert!(res.left_radius_m() > 10_000.0);
        assert!(res.right_radius_m() > 10_000.0);
        assert_relative_eq!(res.offset_m, 0.0, epsilon = 1e-9);
        assert_relative_eq!(res.lane_width_m, 680.0 * 3.7 / 700.0, epsilon = 1e-9);
    }

    #[test]
    fn shifting_lanes_right_moves_offset_negative() {
        let scale = MetricScale::default();
        let shift = 40.0;
        let left = Ok(line_from(LaneSide::Left, |_| 300.0 + shift));
        let right = Ok(line_from(LaneSide::Right, |_| 980.0 + shift));
        let res = estimator().estimate(&left, &right, FRAME).expect("curvature");
        assert_relative_eq!(res.offset_m, -shift * scale.xm_per_pix, epsilon = 1e-9);
    }

    #[test]
    fn metric_radius_uses_rescaled_points() {
        // A circle-like arc: x = k * (y - 719)^2 + 300 in pixels.
        let k = 4.0e-4;
        let left = Ok(line_from(LaneSide::Left, |y| k * (y - 719.0).powi(2) + 300.0));
        let right = Ok(line_from(LaneSide::Right, |y| {
            k * (y - 719.0).powi(2) + 980.0
        }));
        let res = estimator().estimate(&left, &right, FRAME).expect("curvature");

        // In meters: x_m = k * xm / ym^2 * (y_m - y0_m)^2 + ..., slope 0 at the bottom.
        let s = MetricScale::default();
        let a_m = k * s.xm_per_pix / (s.ym_per_pix * s.ym_per_pix);
        let expected = 1.0 / (2.0 * a_m);
        assert_relative_eq!(res.left_radius_m(), expected, max_relative = 0.02);
        assert_relative_eq!(res.right_radius_m(), expected, max_relative = 0.02);
        assert!(!res.left.is_straight());
        assert_relative_eq!(res.y_eval_m, 719.0 * s.ym_per_pix, epsilon = 1e-12);
    }

    #[test]
    fn missing_side_is_incomplete_fit() {
        let left = Ok(line_from(LaneSide::Left, |_| 300.0));
        let right = Err(LineError::NoLaneEvidence {
            side: LaneSide::Right,
        });
        let err = estimator().estimate(&left, &right, FRAME).unwrap_err();
        assert_eq!(
            err,
            CurvatureError::IncompleteLaneFit(MissingSides {
                left: None,
                right: Some(LineError::NoLaneEvidence {
                    side: LaneSide::Right
                }),
            })
        );
        assert_eq!(
            err.to_string(),
            "incomplete lane fit: no lane evidence on the right side"
        );
    }

    #[test]
    fn rejects_non_positive_scale() {
        let left = Ok(line_from(LaneSide::Left, |_| 300.0));
        let right = Ok(line_from(LaneSide::Right, |_| 980.0));
        let est = CurvatureEstimator::new(
            MetricScale {
                xm_per_pix: 0.0,
                ym_per_pix: 0.04,
            },
            1e-4,
        );
        assert!(matches!(
            est.estimate(&left, &right, FRAME),
            Err(CurvatureError::InvalidScale { .. })
        ));
    }
}

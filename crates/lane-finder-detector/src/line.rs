//! Per-side lane line: the collected cluster plus its pixel-space fit.

use lane_finder_core::{fit_lane_polynomial, FitError, LaneFit, LanePixelCluster, LaneSide};
use serde::{Deserialize, Serialize};

/// Why one side produced no usable lane model.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LineError {
    #[error("no lane evidence on the {side} side")]
    NoLaneEvidence { side: LaneSide },
    #[error("{side} lane has {distinct_rows} distinct rows, a quadratic needs 3")]
    InsufficientPoints {
        side: LaneSide,
        distinct_rows: usize,
    },
    #[error("{side} lane fit failed: {reason}")]
    SingularFit { side: LaneSide, reason: String },
}

impl LineError {
    pub fn side(&self) -> LaneSide {
        match self {
            LineError::NoLaneEvidence { side }
            | LineError::InsufficientPoints { side, .. }
            | LineError::SingularFit { side, .. } => *side,
        }
    }

    fn from_fit(side: LaneSide, err: FitError) -> Self {
        match err {
            FitError::InsufficientPoints { distinct_rows } => LineError::InsufficientPoints {
                side,
                distinct_rows,
            },
            FitError::Singular(reason) => LineError::SingularFit { side, reason },
        }
    }
}

/// A fitted lane boundary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LaneLine {
    pub cluster: LanePixelCluster,
    /// Fit in pixel coordinates (`x` column as a function of `y` row).
    pub fit: LaneFit,
}

impl LaneLine {
    #[inline]
    pub fn side(&self) -> LaneSide {
        self.cluster.side
    }
}

/// Result of fitting one side.
pub type SideOutcome = Result<LaneLine, LineError>;

/// Fit a pixel-space quadratic to a cluster.
///
/// An empty cluster is `NoLaneEvidence`; fewer than three distinct rows is
/// `InsufficientPoints`. No fallback model is ever substituted.
pub fn fit_line(cluster: LanePixelCluster) -> SideOutcome {
    let side = cluster.side;
    if cluster.is_empty() {
        return Err(LineError::NoLaneEvidence { side });
    }
    let fit =
        fit_lane_polynomial(&cluster.to_points()).map_err(|e| LineError::from_fit(side, e))?;
    Ok(LaneLine { cluster, fit })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point2;

    #[test]
    fn empty_cluster_is_no_evidence() {
        let err = fit_line(LanePixelCluster::new(LaneSide::Right)).unwrap_err();
        assert_eq!(
            err,
            LineError::NoLaneEvidence {
                side: LaneSide::Right
            }
        );
        assert_eq!(err.to_string(), "no lane evidence on the right side");
    }

    #[test]
    fn two_rows_are_insufficient() {
        let cluster = LanePixelCluster {
            side: LaneSide::Left,
            pixels: vec![Point2::new(4, 1), Point2::new(5, 1), Point2::new(4, 2)],
        };
        assert_eq!(
            fit_line(cluster).unwrap_err(),
            LineError::InsufficientPoints {
                side: LaneSide::Left,
                distinct_rows: 2
            }
        );
    }

    #[test]
    fn vertical_cluster_fits_constant_model() {
        let cluster = LanePixelCluster {
            side: LaneSide::Left,
            pixels: (0..30).map(|y| Point2::new(12, y)).collect(),
        };
        let line = fit_line(cluster).expect("fit");
        assert_eq!(line.side(), LaneSide::Left);
        assert!((line.fit.eval(15.0) - 12.0).abs() < 1e-9);
    }
}

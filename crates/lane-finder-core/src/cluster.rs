use crate::MetricScale;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Which lane boundary a cluster or fit belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaneSide {
    Left,
    Right,
}

impl fmt::Display for LaneSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaneSide::Left => f.write_str("left"),
            LaneSide::Right => f.write_str("right"),
        }
    }
}

/// Mask pixels attributed to one lane line. `x` is the column, `y` the row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LanePixelCluster {
    pub side: LaneSide,
    pub pixels: Vec<Point2<u32>>,
}

impl LanePixelCluster {
    pub fn new(side: LaneSide) -> Self {
        Self {
            side,
            pixels: Vec::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Number of different rows the cluster touches.
    pub fn distinct_rows(&self) -> usize {
        self.pixels.iter().map(|p| p.y).collect::<BTreeSet<_>>().len()
    }

    pub fn mean_x(&self) -> Option<f64> {
        if self.pixels.is_empty() {
            return None;
        }
        let sum: f64 = self.pixels.iter().map(|p| p.x as f64).sum();
        Some(sum / self.pixels.len() as f64)
    }

    /// Pixel coordinates as `f64` points, ready for fitting.
    pub fn to_points(&self) -> Vec<Point2<f64>> {
        self.pixels
            .iter()
            .map(|p| Point2::new(p.x as f64, p.y as f64))
            .collect()
    }

    /// Pixel coordinates rescaled to meters.
    pub fn to_metric(&self, scale: &MetricScale) -> Vec<Point2<f64>> {
        self.pixels
            .iter()
            .map(|p| scale.to_metric(p.x as f64, p.y as f64))
            .collect()
    }
}

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Pixel-to-meter conversion for the bird's-eye view.
///
/// Defaults assume a 720 px tall warped view covering ~30 m of road and a
/// 3.7 m wide lane spanning ~700 px.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricScale {
    /// Meters per pixel along x (across the road).
    pub xm_per_pix: f64,
    /// Meters per pixel along y (along the road).
    pub ym_per_pix: f64,
}

impl Default for MetricScale {
    fn default() -> Self {
        Self {
            xm_per_pix: 3.7 / 700.0,
            ym_per_pix: 30.0 / 720.0,
        }
    }
}

impl MetricScale {
    #[inline]
    pub fn to_metric(&self, x_px: f64, y_px: f64) -> Point2<f64> {
        Point2::new(x_px * self.xm_per_pix, y_px * self.ym_per_pix)
    }

    pub fn is_valid(&self) -> bool {
        self.xm_per_pix.is_finite()
            && self.ym_per_pix.is_finite()
            && self.xm_per_pix > 0.0
            && self.ym_per_pix > 0.0
    }
}

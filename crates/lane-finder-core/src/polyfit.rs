//! Quadratic lane models `x = a*y^2 + b*y + c` and their least-squares fit.
//!
//! Lanes are close to vertical in the bird's-eye view, so x is modelled as a
//! function of y. The same types are used in pixel space and in metric space;
//! the unit follows whatever points were fitted.

use log::debug;
use nalgebra::{DMatrix, DVector, Point2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Minimal number of distinct y samples for a determined quadratic.
pub const MIN_DISTINCT_ROWS: usize = 3;

/// Errors produced by [`fit_lane_polynomial`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FitError {
    #[error("insufficient points for a quadratic fit ({distinct_rows} distinct rows, need 3)")]
    InsufficientPoints { distinct_rows: usize },
    #[error("least-squares system is singular: {0}")]
    Singular(String),
}

/// Radius of curvature at one point of a lane model.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LineRadius {
    Curved { radius: f64 },
    /// Leading coefficient below epsilon: the line is (nearly) straight.
    Straight,
}

impl LineRadius {
    /// Radius in the model's unit; `f64::INFINITY` for straight lines.
    #[inline]
    pub fn value(&self) -> f64 {
        match self {
            LineRadius::Curved { radius } => *radius,
            LineRadius::Straight => f64::INFINITY,
        }
    }

    #[inline]
    pub fn is_straight(&self) -> bool {
        matches!(self, LineRadius::Straight)
    }
}

/// Second-degree lane model `x = a*y^2 + b*y + c`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LaneFit {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    /// Number of points used by the fit.
    pub num_points: usize,
    /// RMS of the x residuals over the fitted points.
    pub rms_residual: f64,
}

impl LaneFit {
    /// Model with known coefficients and no fit diagnostics.
    pub fn from_coefficients(a: f64, b: f64, c: f64) -> Self {
        Self {
            a,
            b,
            c,
            num_points: 0,
            rms_residual: 0.0,
        }
    }

    #[inline]
    pub fn coefficients(&self) -> [f64; 3] {
        [self.a, self.b, self.c]
    }

    #[inline]
    pub fn eval(&self, y: f64) -> f64 {
        (self.a * y + self.b) * y + self.c
    }

    /// First derivative dx/dy.
    #[inline]
    pub fn slope(&self, y: f64) -> f64 {
        2.0 * self.a * y + self.b
    }

    /// `R = (1 + x'(y)^2)^1.5 / |x''(y)|`, or `Straight` when `|2a| < epsilon`.
    pub fn radius_of_curvature(&self, y: f64, epsilon: f64) -> LineRadius {
        let second = (2.0 * self.a).abs();
        if second.is_nan() || second < epsilon {
            return LineRadius::Straight;
        }
        let d1 = self.slope(y);
        LineRadius::Curved {
            radius: (1.0 + d1 * d1).powf(1.5) / second,
        }
    }

    /// Points `(x(y), y)` along the model, e.g. for drawing the lane.
    pub fn sample(&self, ys: impl IntoIterator<Item = f64>) -> Vec<Point2<f64>> {
        ys.into_iter().map(|y| Point2::new(self.eval(y), y)).collect()
    }
}

/// Least-squares fit of `x = a*y^2 + b*y + c` over `points` (`x`, `y`).
///
/// Minimizes the squared x residuals. Needs at least three distinct y values.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(points), fields(points = points.len()))
)]
pub fn fit_lane_polynomial(points: &[Point2<f64>]) -> Result<LaneFit, FitError> {
    let distinct_rows = points
        .iter()
        .map(|p| p.y.to_bits())
        .collect::<BTreeSet<_>>()
        .len();
    if distinct_rows < MIN_DISTINCT_ROWS {
        return Err(FitError::InsufficientPoints { distinct_rows });
    }

    // Normalize y to zero mean / unit spread so y^2 stays well conditioned.
    let n = points.len() as f64;
    let cy = points.iter().map(|p| p.y).sum::<f64>() / n;
    let spread = points.iter().map(|p| (p.y - cy).abs()).sum::<f64>() / n;
    let s = if spread > 1e-12 { spread } else { 1.0 };

    let mut design = DMatrix::<f64>::zeros(points.len(), 3);
    let mut rhs = DVector::<f64>::zeros(points.len());
    for (k, p) in points.iter().enumerate() {
        let t = (p.y - cy) / s;
        design[(k, 0)] = t * t;
        design[(k, 1)] = t;
        design[(k, 2)] = 1.0;
        rhs[k] = p.x;
    }

    let svd = design.svd(true, true);
    let sol = svd
        .solve(&rhs, 1e-12)
        .map_err(|e| FitError::Singular(e.to_string()))?;
    let (an, bn, cn) = (sol[0], sol[1], sol[2]);

    // Undo the normalization: t = (y - cy) / s.
    let a = an / (s * s);
    let b = bn / s - 2.0 * an * cy / (s * s);
    let c = an * cy * cy / (s * s) - bn * cy / s + cn;
    if !(a.is_finite() && b.is_finite() && c.is_finite()) {
        return Err(FitError::Singular("non-finite coefficients".to_string()));
    }

    let mut fit = LaneFit {
        a,
        b,
        c,
        num_points: points.len(),
        rms_residual: 0.0,
    };
    let sq: f64 = points
        .iter()
        .map(|p| {
            let r = p.x - fit.eval(p.y);
            r * r
        })
        .sum();
    fit.rms_residual = (sq / n).sqrt();

    debug!(
        "quadratic fit over {} points: a={:.3e} b={:.3e} c={:.3} rms={:.3}",
        fit.num_points, fit.a, fit.b, fit.c, fit.rms_residual
    );
    Ok(fit)
}

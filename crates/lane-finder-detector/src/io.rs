//! JSON configuration and report helpers for lane detection.

use crate::search::SlidingWindowParams;
use crate::{LaneDetectError, LaneDetection, LaneDetector, LaneDetectorParams};
use lane_finder_core::MetricScale;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(thiserror::Error, Debug)]
pub enum LaneIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn default_threshold() -> u8 {
    1
}

/// Configuration for a single-mask detection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneDetectConfig {
    /// Bird's-eye binary mask image (8-bit grayscale).
    pub mask_path: String,
    #[serde(default)]
    pub output_path: Option<String>,
    /// Gray level at or above which a mask pixel counts as "on".
    #[serde(default = "default_threshold")]
    pub threshold: u8,
    #[serde(default)]
    pub search: Option<SlidingWindowParams>,
    #[serde(default)]
    pub scale: Option<MetricScale>,
    #[serde(default)]
    pub curvature_epsilon: Option<f64>,
    #[serde(default)]
    pub prior_margin: Option<usize>,
    /// Keep per-pixel clusters and the window trace in the report.
    #[serde(default)]
    pub include_pixels: bool,
}

impl Default for LaneDetectConfig {
    fn default() -> Self {
        Self {
            mask_path: String::new(),
            output_path: None,
            threshold: default_threshold(),
            search: None,
            scale: None,
            curvature_epsilon: None,
            prior_margin: None,
            include_pixels: false,
        }
    }
}

impl LaneDetectConfig {
    /// Read a config file; absent fields take their defaults.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, LaneIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), LaneIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Report path, `lane_detect_report.json` when unset.
    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("lane_detect_report.json"))
    }

    /// Default parameters with every `Some` override applied.
    pub fn build_params(&self) -> LaneDetectorParams {
        let mut params = LaneDetectorParams::default();
        if let Some(search) = self.search {
            params.search = search;
        }
        if let Some(scale) = self.scale {
            params.scale = scale;
        }
        if let Some(eps) = self.curvature_epsilon {
            params.curvature_epsilon = eps;
        }
        if let Some(margin) = self.prior_margin {
            params.prior_margin = margin;
        }
        params
    }

    pub fn build_detector(&self) -> LaneDetector {
        LaneDetector::new(self.build_params())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneDetectReport {
    pub mask_path: String,
    #[serde(default)]
    pub config_path: Option<String>,
    pub width: usize,
    pub height: usize,
    pub num_on_pixels: usize,
    pub params: LaneDetectorParams,
    #[serde(default)]
    pub detection: Option<LaneDetection>,
    #[serde(default)]
    pub error: Option<String>,
}

impl LaneDetectReport {
    /// Build a base report for a mask of the given size.
    pub fn new(
        cfg: &LaneDetectConfig,
        config_path: Option<&Path>,
        width: usize,
        height: usize,
        num_on_pixels: usize,
    ) -> Self {
        Self {
            mask_path: cfg.mask_path.clone(),
            config_path: config_path.map(|p| p.to_string_lossy().into_owned()),
            width,
            height,
            num_on_pixels,
            params: cfg.build_params(),
            detection: None,
            error: None,
        }
    }

    /// Store a successful detection, dropping pixel lists unless asked to keep them.
    pub fn set_detection(&mut self, res: LaneDetection, include_pixels: bool) {
        self.detection = Some(if include_pixels {
            res
        } else {
            res.without_pixels()
        });
        self.error = None;
    }

    /// Store the failure message in place of a detection.
    pub fn set_error(&mut self, err: &LaneDetectError) {
        self.detection = None;
        self.error = Some(err.to_string());
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, LaneIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Pretty-printed JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), LaneIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

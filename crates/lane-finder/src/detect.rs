//! End-to-end helpers from `image` buffers to lane detections.

use crate::core::{BinaryMask, MaskError};
use crate::detector::{LaneDetectError, LaneDetection, LaneDetector, LaneDetectorParams};
use image::{GrayImage, ImageReader};
use std::path::Path;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors produced by the high-level facade helpers.
#[derive(thiserror::Error, Debug)]
pub enum DetectError {
    #[error(transparent)]
    Mask(#[from] MaskError),

    #[error("failed to read mask image: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Detect(#[from] LaneDetectError),
}

/// Binarize an `image::GrayImage`: pixels `>= threshold` are lane candidates.
pub fn mask_from_gray(img: &GrayImage, threshold: u8) -> Result<BinaryMask, DetectError> {
    Ok(BinaryMask::from_gray_threshold(
        img.width() as usize,
        img.height() as usize,
        img.as_raw(),
        threshold,
    )?)
}

/// Render a mask as a 0/255 grayscale image.
pub fn mask_to_image(mask: &BinaryMask) -> GrayImage {
    let data = mask
        .as_raw()
        .iter()
        .map(|&v| if v != 0 { 255 } else { 0 })
        .collect();
    // Buffer length is width * height by construction.
    GrayImage::from_raw(mask.width() as u32, mask.height() as u32, data)
        .unwrap_or_else(|| GrayImage::new(mask.width() as u32, mask.height() as u32))
}

/// Load any image format supported by `image` and binarize its luma channel.
#[cfg_attr(feature = "tracing", instrument(level = "info", skip(path)))]
pub fn load_mask(path: impl AsRef<Path>, threshold: u8) -> Result<BinaryMask, DetectError> {
    let img = ImageReader::open(path)?.decode()?.to_luma8();
    mask_from_gray(&img, threshold)
}

/// Run the full pipeline on an already binarized mask.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "info",
        skip(mask, params),
        fields(width = mask.width(), height = mask.height())
    )
)]
pub fn detect_lanes(
    mask: &BinaryMask,
    params: LaneDetectorParams,
) -> Result<LaneDetection, DetectError> {
    let detector = LaneDetector::new(params);
    Ok(detector.detect(&mask.view())?)
}

/// Binarize a grayscale image and run the full pipeline.
pub fn detect_lanes_in_image(
    img: &GrayImage,
    threshold: u8,
    params: LaneDetectorParams,
) -> Result<LaneDetection, DetectError> {
    let mask = mask_from_gray(img, threshold)?;
    detect_lanes(&mask, params)
}

/// Run the full pipeline on a raw row-major grayscale buffer.
pub fn detect_lanes_from_gray_u8(
    width: u32,
    height: u32,
    pixels: &[u8],
    threshold: u8,
    params: LaneDetectorParams,
) -> Result<LaneDetection, DetectError> {
    let mask = BinaryMask::from_gray_threshold(width as usize, height as usize, pixels, threshold)?;
    detect_lanes(&mask, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn lane_image() -> GrayImage {
        GrayImage::from_fn(640, 360, |x, _| {
            if (145..=155).contains(&x) || (485..=495).contains(&x) {
                image::Luma([200u8])
            } else {
                image::Luma([40u8])
            }
        })
    }

    #[test]
    fn threshold_selects_bright_lane_paint() {
        let mask = mask_from_gray(&lane_image(), 128).expect("mask");
        assert_eq!(mask.view().count_on(), 22 * 360);
        let back = mask_to_image(&mask);
        assert_eq!(back.get_pixel(150, 10).0, [255]);
        assert_eq!(back.get_pixel(10, 10).0, [0]);
    }

    #[test]
    fn detects_lanes_in_gray_image() {
        let params = LaneDetectorParams {
            search: crate::SlidingWindowParams {
                margin: 50,
                ..Default::default()
            },
            ..Default::default()
        };
        let res = detect_lanes_in_image(&lane_image(), 128, params).expect("detect");
        assert_relative_eq!(res.left.fit.c, 150.0, epsilon = 1e-6);
        assert_relative_eq!(res.right.fit.c, 490.0, epsilon = 1e-6);
        // Lane center 320 == image center.
        assert_relative_eq!(res.curvature.offset_m, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn rejects_short_buffers() {
        let err = detect_lanes_from_gray_u8(10, 10, &[0u8; 99], 1, Default::default())
            .expect_err("short buffer");
        assert!(matches!(
            err,
            DetectError::Mask(MaskError::InvalidBufferLength {
                expected: 100,
                got: 99
            })
        ));
    }

    #[test]
    fn dark_image_has_no_lanes() {
        let img = GrayImage::new(64, 32);
        let err = detect_lanes_in_image(&img, 1, Default::default()).expect_err("no lanes");
        assert!(matches!(err, DetectError::Detect(LaneDetectError::Curvature(_))));
    }
}

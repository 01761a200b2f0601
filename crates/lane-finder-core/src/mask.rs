/// Errors raised when wrapping a raw buffer as a mask.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MaskError {
    #[error("invalid mask dimensions (width={width}, height={height})")]
    InvalidDimensions { width: usize, height: usize },
    #[error("invalid mask buffer length (expected {expected} bytes, got {got})")]
    InvalidBufferLength { expected: usize, got: usize },
}

fn check_layout(width: usize, height: usize, len: usize) -> Result<(), MaskError> {
    if width == 0 || height == 0 {
        return Err(MaskError::InvalidDimensions { width, height });
    }
    let expected = width
        .checked_mul(height)
        .ok_or(MaskError::InvalidDimensions { width, height })?;
    if len != expected {
        return Err(MaskError::InvalidBufferLength { expected, got: len });
    }
    Ok(())
}

/// Borrowed single-channel binary mask. Any non-zero byte is an "on" pixel.
#[derive(Clone, Copy, Debug)]
pub struct BinaryMaskView<'a> {
    width: usize,
    height: usize,
    data: &'a [u8], // row-major, len = w*h
}

impl<'a> BinaryMaskView<'a> {
    pub fn new(width: usize, height: usize, data: &'a [u8]) -> Result<Self, MaskError> {
        check_layout(width, height, data.len())?;
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn is_on(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.data[y * self.width + x] != 0
    }

    /// One mask row as raw bytes.
    #[inline]
    pub fn row(&self, y: usize) -> &'a [u8] {
        let start = y * self.width;
        &self.data[start..start + self.width]
    }

    /// Number of "on" pixels in the whole mask.
    pub fn count_on(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }
}

/// Owned binary mask.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinaryMask {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl BinaryMask {
    /// All-off mask of the given size.
    pub fn new(width: usize, height: usize) -> Result<Self, MaskError> {
        let len = width
            .checked_mul(height)
            .ok_or(MaskError::InvalidDimensions { width, height })?;
        check_layout(width, height, len)?;
        Ok(Self {
            width,
            height,
            data: vec![0; len],
        })
    }

    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Result<Self, MaskError> {
        check_layout(width, height, data.len())?;
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Binarize a grayscale buffer: pixels `>= threshold` become "on".
    pub fn from_gray_threshold(
        width: usize,
        height: usize,
        gray: &[u8],
        threshold: u8,
    ) -> Result<Self, MaskError> {
        check_layout(width, height, gray.len())?;
        let data = gray
            .iter()
            .map(|&v| u8::from(v >= threshold.max(1)))
            .collect();
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Switch a pixel on or off. Out-of-bounds coordinates are ignored.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, on: bool) {
        if x < self.width && y < self.height {
            self.data[y * self.width + x] = u8::from(on);
        }
    }

    /// Switch on every pixel of the rectangle `[x0, x1) x [y0, y1)`, clipped to the mask.
    pub fn fill_rect(&mut self, x0: usize, y0: usize, x1: usize, y1: usize) {
        let x1 = x1.min(self.width);
        let y1 = y1.min(self.height);
        for y in y0..y1 {
            let row = y * self.width;
            for v in &mut self.data[row + x0.min(x1)..row + x1] {
                *v = 1;
            }
        }
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn view(&self) -> BinaryMaskView<'_> {
        BinaryMaskView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }
}

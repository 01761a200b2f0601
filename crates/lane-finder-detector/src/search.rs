//! Lane pixel search on a bird's-eye binary mask.
//!
//! The sliding-window search seeds one window per side from a column
//! histogram of the lower half of the mask, then walks the mask in
//! horizontal bands from the bottom (closest to the vehicle) to the top.
//! The per-band window is a [`WindowState`] carried through a fold, so the
//! full sequence of windows is available for inspection afterwards.

use lane_finder_core::{BinaryMaskView, LaneFit, LanePixelCluster, LaneSide};
use log::{debug, trace};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Sliding-window search settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlidingWindowParams {
    /// Number of horizontal bands the mask height is split into.
    pub n_windows: usize,
    /// Half-width of each window in pixels.
    pub margin: usize,
    /// Minimal pixel count in a window before the next window re-centers.
    pub min_pixels: usize,
}

impl Default for SlidingWindowParams {
    fn default() -> Self {
        Self {
            n_windows: 9,
            margin: 100,
            min_pixels: 50,
        }
    }
}

/// Rejected search inputs.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("sliding-window search needs at least one window (got {n_windows})")]
    InvalidWindowCount { n_windows: usize },
    #[error("window margin must be positive")]
    InvalidMargin,
    #[error("mask too narrow to split into left/right halves (width={width})")]
    MaskTooNarrow { width: usize },
}

/// Rows `[top, bottom)` of one band; `index` 0 is the bottom band.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowBand {
    pub index: usize,
    pub top: usize,
    pub bottom: usize,
}

impl RowBand {
    #[inline]
    pub fn height(&self) -> usize {
        self.bottom - self.top
    }
}

/// Histogram peaks used as initial window centers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneBases {
    pub left: usize,
    pub right: usize,
}

/// One step of the sliding-window search for one side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowState {
    pub band: RowBand,
    /// Window center used for this band.
    pub center_x: usize,
    /// Clipped x-range `[x_start, x_end)` scanned in this band.
    pub x_start: usize,
    pub x_end: usize,
    /// "On" pixels found inside the window.
    pub pixels_found: usize,
    /// Center carried into the next band.
    pub next_center_x: usize,
}

impl WindowState {
    #[inline]
    pub fn recentered(&self) -> bool {
        self.next_center_x != self.center_x
    }
}

/// All windows visited for one side, bottom band first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideSearchTrace {
    pub side: LaneSide,
    pub base_x: usize,
    pub windows: Vec<WindowState>,
}

/// Output of [`sliding_window_search`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlidingWindowSearch {
    pub bases: LaneBases,
    pub left: LanePixelCluster,
    pub right: LanePixelCluster,
    pub left_trace: SideSearchTrace,
    pub right_trace: SideSearchTrace,
}

impl SlidingWindowSearch {
    pub fn cluster(&self, side: LaneSide) -> &LanePixelCluster {
        match side {
            LaneSide::Left => &self.left,
            LaneSide::Right => &self.right,
        }
    }

    pub fn trace(&self, side: LaneSide) -> &SideSearchTrace {
        match side {
            LaneSide::Left => &self.left_trace,
            LaneSide::Right => &self.right_trace,
        }
    }
}

/// Per-column "on" counts over rows `row_start..height`.
pub fn column_histogram(mask: &BinaryMaskView<'_>, row_start: usize) -> Vec<u32> {
    let mut hist = vec![0u32; mask.width()];
    for y in row_start.min(mask.height())..mask.height() {
        for (bin, &v) in hist.iter_mut().zip(mask.row(y)) {
            *bin += u32::from(v != 0);
        }
    }
    hist
}

/// Index of the first maximum.
fn first_argmax(values: &[u32]) -> usize {
    let mut best = 0usize;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}

/// Initial window centers from the bottom-half histogram.
///
/// The left base is the peak of `[0, W/2)`, the right base the peak of
/// `[W/2, W)`. Ties resolve to the lowest column.
pub fn histogram_bases(mask: &BinaryMaskView<'_>) -> LaneBases {
    let hist = column_histogram(mask, mask.height() / 2);
    let mid = mask.width() / 2;
    LaneBases {
        left: first_argmax(&hist[..mid]),
        right: mid + first_argmax(&hist[mid..]),
    }
}

/// Split `height` rows into `n` bands, bottom band first.
///
/// Band boundaries are `height * k / n`, so the bands tile every row and
/// their heights differ by at most one.
pub fn row_bands(height: usize, n: usize) -> Vec<RowBand> {
    (0..n)
        .map(|index| RowBand {
            index,
            top: height * (n - index - 1) / n,
            bottom: height * (n - index) / n,
        })
        .collect()
}

#[inline]
fn window_x_range(center: usize, margin: usize, width: usize) -> (usize, usize) {
    let start = center.saturating_sub(margin).min(width);
    let end = center.saturating_add(margin).min(width);
    (start, end)
}

/// Collect the window's pixels into `cluster` and decide the next center.
fn scan_window(
    mask: &BinaryMaskView<'_>,
    band: RowBand,
    center_x: usize,
    params: &SlidingWindowParams,
    cluster: &mut LanePixelCluster,
) -> WindowState {
    let (x_start, x_end) = window_x_range(center_x, params.margin, mask.width());
    let mut found = 0usize;
    let mut sum_x = 0u64;

    for y in band.top..band.bottom {
        let row = &mask.row(y)[x_start..x_end];
        for (dx, &v) in row.iter().enumerate() {
            if v != 0 {
                let x = x_start + dx;
                cluster.pixels.push(Point2::new(x as u32, y as u32));
                found += 1;
                sum_x += x as u64;
            }
        }
    }

    // Sparse bands keep the previous center; an empty band never moves it.
    let next_center_x = if found > 0 && found >= params.min_pixels {
        (sum_x as f64 / found as f64).round() as usize
    } else {
        center_x
    };

    trace!(
        "{} band {} rows [{}, {}) x [{}, {}): {} px, center {} -> {}",
        cluster.side,
        band.index,
        band.top,
        band.bottom,
        x_start,
        x_end,
        found,
        center_x,
        next_center_x
    );

    WindowState {
        band,
        center_x,
        x_start,
        x_end,
        pixels_found: found,
        next_center_x,
    }
}

/// Run the bottom-to-top window walk for one side starting at `base_x`.
pub fn search_side(
    mask: &BinaryMaskView<'_>,
    side: LaneSide,
    base_x: usize,
    bands: &[RowBand],
    params: &SlidingWindowParams,
) -> (LanePixelCluster, SideSearchTrace) {
    let init = (
        LanePixelCluster::new(side),
        SideSearchTrace {
            side,
            base_x,
            windows: Vec::with_capacity(bands.len()),
        },
    );

    bands
        .iter()
        .fold(init, |(mut cluster, mut trace), &band| {
            let center = trace
                .windows
                .last()
                .map_or(base_x, |w: &WindowState| w.next_center_x);
            let state = scan_window(mask, band, center, params, &mut cluster);
            trace.windows.push(state);
            (cluster, trace)
        })
}

/// Histogram-seeded sliding-window search for both lane lines.
///
/// Empty clusters are returned as-is; turning them into per-side failures is
/// left to the caller.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "info",
        skip(mask, params),
        fields(width = mask.width(), height = mask.height(), n_windows = params.n_windows)
    )
)]
pub fn sliding_window_search(
    mask: &BinaryMaskView<'_>,
    params: &SlidingWindowParams,
) -> Result<SlidingWindowSearch, SearchError> {
    if params.n_windows == 0 {
        return Err(SearchError::InvalidWindowCount {
            n_windows: params.n_windows,
        });
    }
    if params.margin == 0 {
        return Err(SearchError::InvalidMargin);
    }
    if mask.width() < 2 {
        return Err(SearchError::MaskTooNarrow {
            width: mask.width(),
        });
    }

    let bases = histogram_bases(mask);
    let bands = row_bands(mask.height(), params.n_windows);
    debug!(
        "histogram bases: left={} right={} ({} bands)",
        bases.left,
        bases.right,
        bands.len()
    );

    let (left, left_trace) = search_side(mask, LaneSide::Left, bases.left, &bands, params);
    let (right, right_trace) = search_side(mask, LaneSide::Right, bases.right, &bands, params);

    debug!(
        "sliding-window search collected {} left / {} right pixels",
        left.len(),
        right.len()
    );

    Ok(SlidingWindowSearch {
        bases,
        left,
        right,
        left_trace,
        right_trace,
    })
}

fn collect_around_fit(
    mask: &BinaryMaskView<'_>,
    side: LaneSide,
    fit: &LaneFit,
    margin: f64,
) -> LanePixelCluster {
    let mut cluster = LanePixelCluster::new(side);
    let width = mask.width() as f64;
    for y in 0..mask.height() {
        let fx = fit.eval(y as f64);
        let lo = fx - margin;
        let hi = fx + margin;
        if !(hi > 0.0 && lo < width) {
            continue;
        }
        let start = lo.floor().max(0.0) as usize;
        let end = (hi.ceil().max(0.0) as usize).saturating_add(1).min(mask.width());
        let row = mask.row(y);
        for x in start..end {
            let xf = x as f64;
            if row[x] != 0 && xf > lo && xf < hi {
                cluster.pixels.push(Point2::new(x as u32, y as u32));
            }
        }
    }
    cluster
}

/// Collect pixels within `margin` of known lane models instead of running
/// the histogram search. Returns `(left, right)` clusters.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "info",
        skip(mask, left, right),
        fields(width = mask.width(), height = mask.height())
    )
)]
pub fn search_around_fits(
    mask: &BinaryMaskView<'_>,
    left: &LaneFit,
    right: &LaneFit,
    margin: usize,
) -> Result<(LanePixelCluster, LanePixelCluster), SearchError> {
    if margin == 0 {
        return Err(SearchError::InvalidMargin);
    }
    let margin = margin as f64;
    let left = collect_around_fit(mask, LaneSide::Left, left, margin);
    let right = collect_around_fit(mask, LaneSide::Right, right, margin);
    debug!(
        "search around prior fits collected {} left / {} right pixels",
        left.len(),
        right.len()
    );
    Ok((left, right))
}

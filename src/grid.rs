//! Grid slicing mathematics.
//!
//! Converts a continuous, user-adjustable grid description (split counts and
//! fractional divider positions per axis) into pixel-exact crop rectangles
//! over a known-size image. Extracted from the interactive slicer so the
//! geometry is testable without a rendering surface.

use crate::constants::{MAX_SPLITS, MIN_SPLITS};

/// Minimum fractional gap between adjacent breakpoints (and the 0/1 edges)
/// for an axis split into `count` slices.
///
/// The gap guarantees every slice keeps a strictly positive extent no matter
/// how dividers are dragged.
pub fn min_gap(count: usize) -> f64 {
    (0.6 / count as f64).min(0.05)
}

/// Which axis of the grid an operation applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Horizontal dividers, slicing the image into rows
    Row,
    /// Vertical dividers, slicing the image into columns
    Col,
}

/// One axis of the split grid: a slice count and the divider positions.
///
/// Invariant: `breakpoints` has exactly `count - 1` entries, strictly
/// increasing, each inside `(0, 1)` and separated from its neighbours (and
/// from the 0/1 edges) by at least [`min_gap`]. All mutating operations
/// clamp rather than reject, so the invariant can never be broken from
/// outside.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitAxis {
    count: usize,
    breakpoints: Vec<f64>,
}

impl SplitAxis {
    /// Create an axis with `count` evenly sized slices.
    ///
    /// `count` is clamped into `[MIN_SPLITS, MAX_SPLITS]`.
    pub fn new(count: usize) -> Self {
        let mut axis = Self {
            count: 1,
            breakpoints: Vec::new(),
        };
        axis.set_count(count);
        axis
    }

    /// Number of slices along this axis.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Current divider positions, strictly increasing, inside `(0, 1)`.
    pub fn breakpoints(&self) -> &[f64] {
        &self.breakpoints
    }

    /// Change the slice count, resetting dividers to the even default
    /// `b_i = i / count`. Out-of-range counts are clamped, not rejected.
    pub fn set_count(&mut self, count: usize) {
        let count = count.clamp(MIN_SPLITS, MAX_SPLITS);
        self.count = count;
        self.breakpoints = (1..count).map(|i| i as f64 / count as f64).collect();
    }

    /// Move one divider to `raw`, clamped so it can never cross or touch its
    /// neighbours: the accepted range is `[prev + gap, next - gap]` where
    /// `prev`/`next` default to 0/1 at the array ends.
    ///
    /// An out-of-range `index` is ignored. Non-finite input is ignored too;
    /// a NaN from a degenerate pointer ratio must not poison the invariant.
    pub fn set_breakpoint(&mut self, index: usize, raw: f64) {
        if index >= self.breakpoints.len() || !raw.is_finite() {
            return;
        }
        let gap = min_gap(self.count);
        let prev = if index == 0 {
            0.0
        } else {
            self.breakpoints[index - 1]
        };
        let next = if index + 1 == self.breakpoints.len() {
            1.0
        } else {
            self.breakpoints[index + 1]
        };
        self.breakpoints[index] = raw.max(prev + gap).min(next - gap);
    }

    /// Interval edges: the breakpoints with 0 prepended and 1 appended.
    ///
    /// A single-slice axis has no breakpoints and returns `[0, 1]` directly.
    pub fn stops(&self) -> Vec<f64> {
        if self.count <= 1 {
            return vec![0.0, 1.0];
        }
        let mut stops = Vec::with_capacity(self.count + 1);
        stops.push(0.0);
        stops.extend_from_slice(&self.breakpoints);
        stops.push(1.0);
        stops
    }

    /// Per-slice widths as fractions of the axis, one per slice, summing to 1.
    pub fn fractions(&self) -> Vec<f64> {
        self.stops().windows(2).map(|w| w[1] - w[0]).collect()
    }
}

impl Default for SplitAxis {
    fn default() -> Self {
        Self::new(1)
    }
}

/// One crop rectangle produced by the slicer, in whole pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceRect {
    /// Grid row this rectangle belongs to (0-indexed, top to bottom)
    pub row: usize,
    /// Grid column this rectangle belongs to (0-indexed, left to right)
    pub col: usize,
    /// Left edge in pixels
    pub x: u32,
    /// Top edge in pixels
    pub y: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

/// Full grid description: a row axis and a column axis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridConfig {
    /// Horizontal splitting (image rows)
    pub rows: SplitAxis,
    /// Vertical splitting (image columns)
    pub cols: SplitAxis,
}

impl GridConfig {
    /// Create a grid with the given row and column counts, evenly split.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows: SplitAxis::new(rows),
            cols: SplitAxis::new(cols),
        }
    }

    fn axis_mut(&mut self, axis: Axis) -> &mut SplitAxis {
        match axis {
            Axis::Row => &mut self.rows,
            Axis::Col => &mut self.cols,
        }
    }

    /// Set the slice count along one axis. See [`SplitAxis::set_count`].
    pub fn set_count(&mut self, axis: Axis, count: usize) {
        self.axis_mut(axis).set_count(count);
    }

    /// Move one divider along one axis. See [`SplitAxis::set_breakpoint`].
    pub fn set_breakpoint(&mut self, axis: Axis, index: usize, raw: f64) {
        self.axis_mut(axis).set_breakpoint(index, raw);
    }

    /// Handle a divider drag from pointer coordinates.
    ///
    /// `pointer` is the pointer position along the axis in screen units,
    /// `origin`/`extent` the grid's on-screen span along that axis. The
    /// position is normalized into a `[0, 1]` ratio and forwarded to
    /// [`SplitAxis::set_breakpoint`], so every intermediate drag position is
    /// a valid, immediately renderable state. Cheap enough to call on every
    /// pointer-move event.
    pub fn drag_breakpoint(
        &mut self,
        axis: Axis,
        index: usize,
        pointer: f64,
        origin: f64,
        extent: f64,
    ) {
        if extent <= 0.0 {
            return;
        }
        let ratio = ((pointer - origin) / extent).clamp(0.0, 1.0);
        self.set_breakpoint(axis, index, ratio);
    }

    /// Total number of rectangles this grid produces.
    pub fn slice_count(&self) -> usize {
        self.rows.count() * self.cols.count()
    }

    /// Compute the crop rectangles for an image of the given size,
    /// row-major order. See [`compute_rectangles`].
    pub fn rectangles(&self, width: u32, height: u32) -> Vec<SliceRect> {
        compute_rectangles(width, height, &self.rows.fractions(), &self.cols.fractions())
    }
}

/// Derive pixel-exact crop rectangles from per-axis slice fractions.
///
/// Walks rows top to bottom accumulating an unrounded float position; each
/// boundary is rounded to the nearest pixel, but the accumulator advances by
/// the unrounded increment so rounding error never compounds across slices.
/// The far edge of the last row/column is forced to exactly the image
/// height/width, eliminating rounding drift. The returned rectangles tile
/// the image with no gaps and no overlaps.
pub fn compute_rectangles(
    width: u32,
    height: u32,
    row_fractions: &[f64],
    col_fractions: &[f64],
) -> Vec<SliceRect> {
    let mut rects = Vec::with_capacity(row_fractions.len() * col_fractions.len());
    let mut y = 0.0f64;
    for (row, row_fraction) in row_fractions.iter().enumerate() {
        let top = y.round() as u32;
        let next_y = y + row_fraction * height as f64;
        let bottom = if row + 1 == row_fractions.len() {
            height
        } else {
            next_y.round() as u32
        };

        let mut x = 0.0f64;
        for (col, col_fraction) in col_fractions.iter().enumerate() {
            let left = x.round() as u32;
            let next_x = x + col_fraction * width as f64;
            let right = if col + 1 == col_fractions.len() {
                width
            } else {
                next_x.round() as u32
            };

            rects.push(SliceRect {
                row,
                col,
                x: left,
                y: top,
                width: right - left,
                height: bottom - top,
            });
            x = next_x;
        }
        y = next_y;
    }
    rects
}

#[cfg(test)]
mod tests {
    use super::*;

    fn even_fractions(n: usize) -> Vec<f64> {
        SplitAxis::new(n).fractions()
    }

    #[test]
    fn test_single_slice_axis() {
        let axis = SplitAxis::new(1);
        assert_eq!(axis.count(), 1);
        assert!(axis.breakpoints().is_empty());
        assert_eq!(axis.stops(), vec![0.0, 1.0]);
        assert_eq!(axis.fractions(), vec![1.0]);
    }

    #[test]
    fn test_count_is_clamped() {
        assert_eq!(SplitAxis::new(0).count(), 1);
        assert_eq!(SplitAxis::new(99).count(), MAX_SPLITS);
    }

    #[test]
    fn test_even_default_breakpoints() {
        let axis = SplitAxis::new(4);
        assert_eq!(axis.breakpoints(), &[0.25, 0.5, 0.75]);
    }

    #[test]
    fn test_fractions_sum_to_one() {
        for n in 1..=MAX_SPLITS {
            let sum: f64 = even_fractions(n).iter().sum();
            assert!((sum - 1.0).abs() < 1e-12, "n={n} sum={sum}");
        }
    }

    #[test]
    fn test_set_breakpoint_clamps_to_neighbours() {
        let mut axis = SplitAxis::new(3);
        let gap = min_gap(3);

        // Try to drag the first divider past the second
        axis.set_breakpoint(0, 0.9);
        let bps = axis.breakpoints();
        assert!((bps[0] - (bps[1] - gap)).abs() < 1e-12);

        // Try to drag it to the left edge
        axis.set_breakpoint(0, -5.0);
        assert!((axis.breakpoints()[0] - gap).abs() < 1e-12);
    }

    #[test]
    fn test_breakpoints_stay_strictly_increasing() {
        // Hammer the axis with arbitrary raw inputs, including garbage;
        // the ordering invariant must survive all of them.
        let mut axis = SplitAxis::new(5);
        let raws = [2.0, -1.0, 0.5, 0.0, 1.0, 0.999, 0.001, f64::NAN, 0.42];
        for (i, raw) in raws.iter().cycle().take(100).enumerate() {
            axis.set_breakpoint(i % 4, *raw);
            let bps = axis.breakpoints();
            for w in bps.windows(2) {
                assert!(w[0] < w[1], "breakpoints not increasing: {bps:?}");
            }
            assert!(bps[0] > 0.0 && bps[bps.len() - 1] < 1.0);
        }
    }

    #[test]
    fn test_set_breakpoint_out_of_range_index_ignored() {
        let mut axis = SplitAxis::new(2);
        let before = axis.breakpoints().to_vec();
        axis.set_breakpoint(5, 0.3);
        assert_eq!(axis.breakpoints(), &before[..]);
    }

    #[test]
    fn test_three_by_three_even_split() {
        let rects = compute_rectangles(300, 300, &even_fractions(3), &even_fractions(3));
        assert_eq!(rects.len(), 9);
        for rect in &rects {
            assert_eq!(rect.width, 100);
            assert_eq!(rect.height, 100);
            assert_eq!(rect.x, rect.col as u32 * 100);
            assert_eq!(rect.y, rect.row as u32 * 100);
        }
    }

    #[test]
    fn test_uneven_width_never_drops_a_pixel() {
        // 301 px over 3 even columns: boundaries land at round(100.33) = 100
        // and round(200.67) = 201, and the final column's far edge is forced
        // onto the image width, so no pixel column is lost to rounding.
        let rects = compute_rectangles(301, 50, &even_fractions(1), &even_fractions(3));
        let widths: Vec<u32> = rects.iter().map(|r| r.width).collect();
        assert_eq!(widths, vec![100, 101, 100]);
        assert_eq!(widths.iter().sum::<u32>(), 301);
        assert_eq!(rects[2].x + rects[2].width, 301);
    }

    #[test]
    fn test_tiling_no_gaps_no_overlaps() {
        // Cover every grid size over an awkward image size and verify each
        // pixel column/row is covered exactly once.
        let (w, h) = (317, 211);
        for rows in 1..=MAX_SPLITS {
            for cols in 1..=MAX_SPLITS {
                let rects =
                    compute_rectangles(w, h, &even_fractions(rows), &even_fractions(cols));
                assert_eq!(rects.len(), rows * cols);

                let mut covered = vec![0u8; (w * h) as usize];
                for r in &rects {
                    assert!(r.width >= 1 && r.height >= 1);
                    for yy in r.y..r.y + r.height {
                        for xx in r.x..r.x + r.width {
                            covered[(yy * w + xx) as usize] += 1;
                        }
                    }
                }
                assert!(
                    covered.iter().all(|&c| c == 1),
                    "tiling broken for {rows}x{cols}"
                );
            }
        }
    }

    #[test]
    fn test_tiling_with_dragged_dividers() {
        let mut grid = GridConfig::new(4, 4);
        grid.set_breakpoint(Axis::Row, 0, 0.1);
        grid.set_breakpoint(Axis::Row, 2, 0.9);
        grid.set_breakpoint(Axis::Col, 1, 0.33);

        let (w, h) = (640u32, 480u32);
        let rects = grid.rectangles(w, h);
        let area: u64 = rects.iter().map(|r| r.width as u64 * r.height as u64).sum();
        assert_eq!(area, w as u64 * h as u64);
        // Right/bottom edges of the final row/column are exact.
        for r in rects.iter().filter(|r| r.col == 3) {
            assert_eq!(r.x + r.width, w);
        }
        for r in rects.iter().filter(|r| r.row == 3) {
            assert_eq!(r.y + r.height, h);
        }
    }

    #[test]
    fn test_zero_size_image_does_not_panic() {
        let rects = compute_rectangles(0, 0, &even_fractions(3), &even_fractions(3));
        assert_eq!(rects.len(), 9);
        assert!(rects.iter().all(|r| r.width == 0 && r.height == 0));
    }

    #[test]
    fn test_drag_breakpoint_normalizes_pointer() {
        let mut grid = GridConfig::new(1, 2);
        // Grid spans screen pixels 100..500; pointer at 300 is ratio 0.5.
        grid.drag_breakpoint(Axis::Col, 0, 300.0, 100.0, 400.0);
        assert!((grid.cols.breakpoints()[0] - 0.5).abs() < 1e-12);

        // Pointer far outside the span clamps to the edge gap.
        grid.drag_breakpoint(Axis::Col, 0, -1000.0, 100.0, 400.0);
        assert!((grid.cols.breakpoints()[0] - min_gap(2)).abs() < 1e-12);

        // Degenerate extent is a no-op, not a divide-by-zero.
        let before = grid.cols.breakpoints().to_vec();
        grid.drag_breakpoint(Axis::Col, 0, 300.0, 100.0, 0.0);
        assert_eq!(grid.cols.breakpoints(), &before[..]);
    }
}

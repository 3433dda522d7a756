//! Pixel-space geometry of the selection grid.
//!
//! All coordinates are image pixels with the origin at the top-left corner and
//! `y` growing downward. The grid is always square in cell count (`rows × rows`),
//! so cells are only square when the image is.

use serde::{Deserialize, Serialize};

use crate::config::SAFE_MAX_ROWS;
use crate::error::GridClaimError;

/// Row counts, coarsest first. Each zoom band doubles the density.
pub const ROW_LADDER: [u32; 4] = [26, 52, 104, 208];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Pixel dimensions of the loaded image. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageBounds {
    width: u32,
    height: u32,
}

impl ImageBounds {
    pub fn new(width: u32, height: u32) -> Result<Self, GridClaimError> {
        if width == 0 || height == 0 {
            return Err(GridClaimError::InvalidImageBounds { width, height });
        }
        Ok(Self { width, height })
    }

    pub const fn width(&self) -> u32 {
        self.width
    }

    pub const fn height(&self) -> u32 {
        self.height
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= 0.0
            && point.y >= 0.0
            && point.x < self.width as f64
            && point.y < self.height as f64
    }

    pub fn center(&self) -> Point {
        Point::new(self.width as f64 / 2.0, self.height as f64 / 2.0)
    }
}

/// Maps a zoom level to a grid density.
///
/// `thresholds[i]` is the inclusive upper zoom bound of `ROW_LADDER[i]`; any
/// zoom above the last threshold gets the densest row count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DensityLadder {
    thresholds: [f64; 3],
}

impl Default for DensityLadder {
    fn default() -> Self {
        Self::standard()
    }
}

impl DensityLadder {
    /// zoom ≤ 0 → 26, ≤ 1 → 52, ≤ 2 → 104, else 208.
    pub const fn standard() -> Self {
        Self {
            thresholds: [0.0, 1.0, 2.0],
        }
    }

    /// zoom ≤ 0 → 26, ≤ 0.5 → 52, ≤ 1.5 → 104, else 208.
    pub const fn fine() -> Self {
        Self {
            thresholds: [0.0, 0.5, 1.5],
        }
    }

    pub const fn thresholds(&self) -> [f64; 3] {
        self.thresholds
    }

    pub fn rows_for_zoom(&self, zoom: f64) -> u32 {
        if zoom.is_nan() {
            return ROW_LADDER[0];
        }
        let rows = self
            .thresholds
            .iter()
            .position(|&max_zoom| zoom <= max_zoom)
            .map_or(ROW_LADDER[ROW_LADDER.len() - 1], |band| ROW_LADDER[band]);
        rows.min(SAFE_MAX_ROWS)
    }
}

/// Half-open rectangle: `[top, bottom) × [left, right)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellBounds {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

impl CellBounds {
    pub fn contains(&self, point: Point) -> bool {
        point_in_rect(point, self)
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.left + (self.right - self.left) / 2.0,
            self.top + (self.bottom - self.top) / 2.0,
        )
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellIndex {
    pub row: u32,
    pub col: u32,
}

impl CellIndex {
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

pub fn point_in_rect(point: Point, bounds: &CellBounds) -> bool {
    point.y >= bounds.top
        && point.y < bounds.bottom
        && point.x >= bounds.left
        && point.x < bounds.right
}

/// Start and end of band `index` when `extent` is split into `count` bands.
/// A band ends exactly where the next one starts; the last ends at `extent`.
fn band_span(index: u32, count: u32, extent: f64) -> (f64, f64) {
    let size = extent / count as f64;
    let start = index as f64 * size;
    let end = if index + 1 >= count {
        extent
    } else {
        (index + 1) as f64 * size
    };
    (start, end)
}

/// Band containing `value`, or `None` outside `[0, extent)`.
fn locate_band(value: f64, count: u32, extent: f64) -> Option<u32> {
    if !(value >= 0.0 && value < extent) {
        return None;
    }
    let size = extent / count as f64;
    let mut index = ((value / size).floor() as u32).min(count - 1);
    // Division can land one band off near an edge; settle against the spans.
    let (start, end) = band_span(index, count, extent);
    if value < start && index > 0 {
        index -= 1;
    } else if value >= end && index + 1 < count {
        index += 1;
    }
    Some(index)
}

pub fn cell_bounds(row: u32, col: u32, rows: u32, image_w: f64, image_h: f64) -> CellBounds {
    let rows = rows.max(1);
    let (top, bottom) = band_span(row, rows, image_h);
    let (left, right) = band_span(col, rows, image_w);
    CellBounds {
        top,
        left,
        bottom,
        right,
    }
}

/// The derived grid for one render: density plus cell size over an image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub rows: u32,
    pub cell_width: f64,
    pub cell_height: f64,
    image: ImageBounds,
}

impl GridLayout {
    pub fn new(rows: u32, image: ImageBounds) -> Self {
        let rows = rows.clamp(1, SAFE_MAX_ROWS);
        Self {
            rows,
            cell_width: image.width() as f64 / rows as f64,
            cell_height: image.height() as f64 / rows as f64,
            image,
        }
    }

    pub fn for_zoom(ladder: &DensityLadder, zoom: f64, image: ImageBounds) -> Self {
        Self::new(ladder.rows_for_zoom(zoom), image)
    }

    pub fn image(&self) -> ImageBounds {
        self.image
    }

    pub fn cell_count(&self) -> usize {
        self.rows as usize * self.rows as usize
    }

    pub fn bounds(&self, cell: CellIndex) -> CellBounds {
        cell_bounds(
            cell.row,
            cell.col,
            self.rows,
            self.image.width() as f64,
            self.image.height() as f64,
        )
    }

    /// Cell containing `point` under `point_in_rect`, found by index arithmetic.
    pub fn cell_at(&self, point: Point) -> Option<CellIndex> {
        let row = locate_band(point.y, self.rows, self.image.height() as f64)?;
        let col = locate_band(point.x, self.rows, self.image.width() as f64)?;
        Some(CellIndex::new(row, col))
    }

    /// Row-major iteration over every cell.
    pub fn cells(&self) -> impl Iterator<Item = CellIndex> + use<> {
        let rows = self.rows;
        (0..rows).flat_map(move |row| (0..rows).map(move |col| CellIndex::new(row, col)))
    }
}

#[cfg(test)]
mod tests {
    use super::{
        CellIndex, DensityLadder, GridLayout, ImageBounds, Point, ROW_LADDER, cell_bounds,
        point_in_rect,
    };
    use crate::config::SAFE_MAX_ROWS;

    fn assert_close(actual: f64, expected: f64) {
        let diff = (actual - expected).abs();
        assert!(
            diff < 1e-2,
            "expected {expected}, got {actual} (diff: {diff})"
        );
    }

    fn image(w: u32, h: u32) -> ImageBounds {
        ImageBounds::new(w, h).expect("non-zero bounds")
    }

    #[test]
    fn zero_sized_image_is_rejected() {
        assert!(ImageBounds::new(0, 10).is_err());
        assert!(ImageBounds::new(10, 0).is_err());
    }

    #[test]
    fn standard_ladder_below_lowest_threshold_is_coarsest() {
        let ladder = DensityLadder::standard();
        for zoom in [-2.0, -1.25, -0.001] {
            assert_eq!(ladder.rows_for_zoom(zoom), 26);
        }
    }

    #[test]
    fn standard_ladder_thresholds_are_inclusive_upper_bounds() {
        let ladder = DensityLadder::standard();
        assert_eq!(ladder.rows_for_zoom(0.0), 26);
        assert_eq!(ladder.rows_for_zoom(0.25), 52);
        assert_eq!(ladder.rows_for_zoom(1.0), 52);
        assert_eq!(ladder.rows_for_zoom(1.75), 104);
        assert_eq!(ladder.rows_for_zoom(2.0), 104);
        assert_eq!(ladder.rows_for_zoom(2.01), 208);
    }

    #[test]
    fn fine_ladder_uses_fractional_thresholds() {
        let ladder = DensityLadder::fine();
        assert_eq!(ladder.rows_for_zoom(0.4), 52);
        assert_eq!(ladder.rows_for_zoom(0.5), 52);
        assert_eq!(ladder.rows_for_zoom(0.75), 104);
        assert_eq!(ladder.rows_for_zoom(1.5), 104);
        assert_eq!(ladder.rows_for_zoom(1.75), 208);
    }

    #[test]
    fn rows_never_exceed_cap() {
        let ladder = DensityLadder::default();
        for zoom in [3.0, 6.0, 1e9, f64::INFINITY] {
            assert_eq!(ladder.rows_for_zoom(zoom), SAFE_MAX_ROWS);
        }
        assert!(ROW_LADDER.iter().all(|&rows| rows <= SAFE_MAX_ROWS));
    }

    #[test]
    fn nan_zoom_is_coarsest() {
        assert_eq!(DensityLadder::standard().rows_for_zoom(f64::NAN), 26);
    }

    #[test]
    fn layout_for_6000_square_at_low_zoom() {
        let layout = GridLayout::for_zoom(&DensityLadder::standard(), -1.0, image(6000, 6000));
        assert_eq!(layout.rows, 26);
        assert_close(layout.cell_width, 230.77);
        assert_close(layout.cell_height, 230.77);
        assert_eq!(layout.cell_count(), 676);
    }

    #[test]
    fn cell_bounds_arithmetic() {
        let b = cell_bounds(2, 3, 10, 1000.0, 500.0);
        assert_eq!(b.top, 100.0);
        assert_eq!(b.bottom, 150.0);
        assert_eq!(b.left, 300.0);
        assert_eq!(b.right, 400.0);
        assert_eq!(b.center(), Point::new(350.0, 125.0));
    }

    #[test]
    fn last_cell_ends_at_image_edge() {
        let b = cell_bounds(25, 25, 26, 6000.0, 6000.0);
        assert_eq!(b.bottom, 6000.0);
        assert_eq!(b.right, 6000.0);
    }

    #[test]
    fn point_in_rect_is_half_open() {
        let b = cell_bounds(1, 1, 4, 400.0, 400.0);
        assert!(point_in_rect(Point::new(100.0, 100.0), &b));
        assert!(point_in_rect(Point::new(199.999, 199.999), &b));
        assert!(!point_in_rect(Point::new(200.0, 150.0), &b));
        assert!(!point_in_rect(Point::new(150.0, 200.0), &b));
        assert!(!point_in_rect(Point::new(99.999, 150.0), &b));
    }

    #[test]
    fn boundary_point_belongs_to_next_cell() {
        let layout = GridLayout::new(4, image(400, 400));
        assert_eq!(
            layout.cell_at(Point::new(100.0, 200.0)),
            Some(CellIndex::new(2, 1))
        );
        assert_eq!(
            layout.cell_at(Point::new(0.0, 0.0)),
            Some(CellIndex::new(0, 0))
        );
    }

    #[test]
    fn cell_at_rejects_points_outside_image() {
        let layout = GridLayout::new(26, image(6000, 6000));
        assert_eq!(layout.cell_at(Point::new(-0.5, 10.0)), None);
        assert_eq!(layout.cell_at(Point::new(10.0, 6000.0)), None);
        assert_eq!(layout.cell_at(Point::new(f64::NAN, 10.0)), None);
    }

    #[test]
    fn cell_at_agrees_with_bounds_on_awkward_sizes() {
        // 6000 / 26 and 997 / 104 are not exact in binary floating point.
        for layout in [
            GridLayout::new(26, image(6000, 6000)),
            GridLayout::new(104, image(997, 1331)),
        ] {
            for cell in layout.cells() {
                let bounds = layout.bounds(cell);
                let corner = Point::new(bounds.left, bounds.top);
                assert_eq!(layout.cell_at(corner), Some(cell));
                assert_eq!(layout.cell_at(bounds.center()), Some(cell));
                assert!(bounds.contains(corner));
            }
        }
    }

    #[test]
    fn cells_iterate_row_major() {
        let layout = GridLayout::new(2, image(10, 10));
        let cells: Vec<_> = layout.cells().collect();
        assert_eq!(
            cells,
            vec![
                CellIndex::new(0, 0),
                CellIndex::new(0, 1),
                CellIndex::new(1, 0),
                CellIndex::new(1, 1),
            ]
        );
    }
}

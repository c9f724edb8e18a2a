//! Snap functionality for placing path points on grid intersections and
//! existing path points.

use crate::error::{EditError, EditResult};
use crate::geometry::nearest;
use crate::path::SerializableColor;
use crate::store::PathStore;
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};

/// Default grid cell dimension.
pub const DEFAULT_GRID_DIMENSION: u32 = 70;
/// Default snap distance threshold.
pub const DEFAULT_SNAP_DISTANCE: f64 = 10.0;

/// Which candidate sets are used at the start and end of a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapOptions {
    pub grid_at_start: bool,
    pub grid_at_end: bool,
    pub path_at_start: bool,
    pub path_at_end: bool,
}

impl SnapOptions {
    pub const NONE: SnapOptions = SnapOptions {
        grid_at_start: false,
        grid_at_end: false,
        path_at_start: false,
        path_at_end: false,
    };
    pub const GRID: SnapOptions = SnapOptions {
        grid_at_start: true,
        grid_at_end: true,
        path_at_start: false,
        path_at_end: false,
    };
    pub const PATH: SnapOptions = SnapOptions {
        grid_at_start: false,
        grid_at_end: false,
        path_at_start: true,
        path_at_end: true,
    };
    pub const ALL: SnapOptions = SnapOptions {
        grid_at_start: true,
        grid_at_end: true,
        path_at_start: true,
        path_at_end: true,
    };

    /// Check if any snapping is enabled.
    pub fn is_enabled(self) -> bool {
        self != Self::NONE
    }

    pub fn snaps_to_grid(self, position: SnapPosition) -> bool {
        match position {
            SnapPosition::Start => self.grid_at_start,
            SnapPosition::End => self.grid_at_end,
        }
    }

    pub fn snaps_to_paths(self, position: SnapPosition) -> bool {
        match position {
            SnapPosition::Start => self.path_at_start,
            SnapPosition::End => self.path_at_end,
        }
    }
}

/// Whether a point starts or ends the path being placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapPosition {
    Start,
    End,
}

/// Type of snap target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapTargetKind {
    /// A committed path point, or the first buffered point.
    PathPoint,
    /// A grid line intersection.
    GridIntersection,
}

/// A point that can be snapped to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapTarget {
    pub point: Point,
    pub kind: SnapTargetKind,
}

/// Result of a snap operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapResult {
    /// The snapped point, or the cursor when nothing was in range.
    pub point: Point,
    /// Kind of target snapped to, if any.
    pub kind: Option<SnapTargetKind>,
}

impl SnapResult {
    /// Create a result with no snapping.
    pub fn none(point: Point) -> Self {
        Self { point, kind: None }
    }

    /// Check if any snapping occurred.
    pub fn is_snapped(&self) -> bool {
        self.kind.is_some()
    }
}

/// Nearest target to `cursor` when its distance is at most `threshold`.
/// The first target wins exact ties.
pub fn nearest_within(cursor: Point, targets: &[SnapTarget], threshold: f64) -> SnapResult {
    match nearest(cursor, targets.iter().map(|t| t.point)) {
        Some((index, point)) if point.distance(cursor) <= threshold => SnapResult {
            point,
            kind: Some(targets[index].kind),
        },
        _ => SnapResult::none(cursor),
    }
}

/// Visible grid over the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    cell_dimension: u32,
    pub color: SerializableColor,
    pub stroke_width: f64,
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            cell_dimension: DEFAULT_GRID_DIMENSION,
            color: SerializableColor::new(240, 240, 255, 50),
            stroke_width: 1.0,
        }
    }
}

impl Grid {
    pub fn new(cell_dimension: u32) -> Self {
        Self {
            cell_dimension,
            ..Default::default()
        }
    }

    pub fn cell_dimension(&self) -> u32 {
        self.cell_dimension
    }

    /// Returns true if the dimension changed.
    pub fn set_cell_dimension(&mut self, cell_dimension: u32) -> bool {
        if self.cell_dimension == cell_dimension {
            return false;
        }
        self.cell_dimension = cell_dimension;
        true
    }

    /// Grid coordinates in `from..=to`, for `from >= 0`.
    fn steps(&self, from: f64, to: f64) -> impl Iterator<Item = f64> + use<> {
        let step = self.cell_dimension;
        let (first, last) = if step == 0 || from > to {
            (1, 0)
        } else {
            let step = f64::from(step);
            ((from / step).ceil() as u64, (to / step).floor() as u64)
        };
        (first..=last).map(move |i| (i * u64::from(step)) as f64)
    }

    /// Intersections inside `area` (edges included) that also lie on the
    /// canvas, x in `0..=width` and y in `0..=height`.
    pub fn intersections_in(&self, size: Size, area: Rect) -> Vec<Point> {
        let ys: Vec<f64> = self
            .steps(area.y0.max(0.0), area.y1.min(size.height))
            .collect();
        self.steps(area.x0.max(0.0), area.x1.min(size.width))
            .flat_map(|x| ys.iter().map(move |&y| Point::new(x, y)))
            .collect()
    }

    /// Vertical lines followed by horizontal lines, as endpoint pairs.
    pub fn lines(&self, size: Size) -> Vec<(Point, Point)> {
        let vertical = self
            .steps(0.0, size.width)
            .map(|x| (Point::new(x, 0.0), Point::new(x, size.height)));
        let horizontal = self
            .steps(0.0, size.height)
            .map(|y| (Point::new(0.0, y), Point::new(size.width, y)));
        vertical.chain(horizontal).collect()
    }
}

/// Combines path and grid candidates into a single snap decision.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapResolver {
    pub options: SnapOptions,
    distance: f64,
}

impl Default for SnapResolver {
    fn default() -> Self {
        Self {
            options: SnapOptions::NONE,
            distance: DEFAULT_SNAP_DISTANCE,
        }
    }
}

impl SnapResolver {
    pub fn new(options: SnapOptions, distance: f64) -> EditResult<Self> {
        let mut resolver = Self {
            options,
            ..Default::default()
        };
        resolver.set_distance(distance)?;
        Ok(resolver)
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Set the snap threshold. Must be greater than 1.
    /// Returns true if the value changed.
    pub fn set_distance(&mut self, distance: f64) -> EditResult<bool> {
        if distance.is_nan() || distance <= 1.0 {
            return Err(EditError::InvalidSnapDistance(distance));
        }
        if self.distance == distance {
            return Ok(false);
        }
        self.distance = distance;
        Ok(true)
    }

    /// Collect candidates for `position`: path points first, then grid
    /// intersections near `cursor`. `grid` is `Some` only while the grid is
    /// visible.
    pub fn targets(
        &self,
        cursor: Point,
        position: SnapPosition,
        exclude: &[Point],
        store: &PathStore,
        grid: Option<(&Grid, Size)>,
    ) -> Vec<SnapTarget> {
        let mut targets = Vec::new();
        if self.options.snaps_to_paths(position) {
            targets.extend(store.get_snap_points(exclude).into_iter().map(|point| SnapTarget {
                point,
                kind: SnapTargetKind::PathPoint,
            }));
        }
        if let Some((grid, size)) = grid.filter(|_| self.options.snaps_to_grid(position)) {
            // Intersections outside this square are never within the threshold.
            let reach = 2.0 * self.distance;
            let area = Rect::from_center_size(cursor, Size::new(reach, reach));
            targets.extend(grid.intersections_in(size, area).into_iter().map(|point| {
                SnapTarget {
                    point,
                    kind: SnapTargetKind::GridIntersection,
                }
            }));
        }
        targets
    }

    /// Snap `cursor` to the nearest candidate within the threshold.
    pub fn resolve(
        &self,
        cursor: Point,
        position: SnapPosition,
        exclude: &[Point],
        store: &PathStore,
        grid: Option<(&Grid, Size)>,
    ) -> SnapResult {
        if !self.options.is_enabled() {
            return SnapResult::none(cursor);
        }
        let targets = self.targets(cursor, position, exclude, store, grid);
        nearest_within(cursor, &targets, self.distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::{Path, StrokeStyle};

    fn grid_target(x: f64, y: f64) -> SnapTarget {
        SnapTarget {
            point: Point::new(x, y),
            kind: SnapTargetKind::GridIntersection,
        }
    }

    #[test]
    fn test_nearest_within_threshold() {
        let targets = [grid_target(105.0, 100.0)];
        let cursor = Point::new(100.0, 100.0);

        let snapped = nearest_within(cursor, &targets, 10.0);
        assert_eq!(snapped.point, Point::new(105.0, 100.0));
        assert_eq!(snapped.kind, Some(SnapTargetKind::GridIntersection));

        let unsnapped = nearest_within(cursor, &targets, 3.0);
        assert_eq!(unsnapped.point, cursor);
        assert!(!unsnapped.is_snapped());
    }

    #[test]
    fn test_nearest_within_boundary_inclusive() {
        let targets = [grid_target(10.0, 0.0)];
        assert!(nearest_within(Point::ZERO, &targets, 10.0).is_snapped());
    }

    #[test]
    fn test_nearest_within_first_wins_ties() {
        let targets = [
            SnapTarget {
                point: Point::new(5.0, 0.0),
                kind: SnapTargetKind::PathPoint,
            },
            grid_target(-5.0, 0.0),
        ];
        let result = nearest_within(Point::ZERO, &targets, 10.0);
        assert_eq!(result.kind, Some(SnapTargetKind::PathPoint));
    }

    #[test]
    fn test_grid_intersections_clipped_to_canvas() {
        let grid = Grid::new(70);
        let everywhere = Rect::new(-500.0, -500.0, 500.0, 500.0);
        let points = grid.intersections_in(Size::new(140.0, 100.0), everywhere);
        // x in {0, 70, 140}, y in {0, 70}
        assert_eq!(points.len(), 6);
        assert!(points.contains(&Point::new(140.0, 70.0)));
        assert!(!points.iter().any(|p| p.y > 100.0));
    }

    #[test]
    fn test_grid_intersections_in_area() {
        let grid = Grid::new(10);
        let area = Rect::new(15.0, 20.0, 30.0, 25.0);
        let points = grid.intersections_in(Size::new(100.0, 100.0), area);
        assert_eq!(points, vec![Point::new(20.0, 20.0), Point::new(30.0, 20.0)]);
    }

    #[test]
    fn test_grid_targets_stay_local_on_huge_canvas() {
        let resolver = SnapResolver::new(SnapOptions::GRID, 10.0).unwrap();
        let grid = Grid::new(1);
        let size = Size::new(1.0e9, 1.0e9);
        let cursor = Point::new(500_000.5, 500_000.5);
        let store = PathStore::new();
        let targets = resolver.targets(cursor, SnapPosition::Start, &[], &store, Some((&grid, size)));
        assert_eq!(targets.len(), 400);

        let result = resolver.resolve(cursor, SnapPosition::Start, &[], &store, Some((&grid, size)));
        assert_eq!(result.point, Point::new(500_000.0, 500_000.0));
    }

    #[test]
    fn test_grid_lines() {
        let grid = Grid::new(50);
        let lines = grid.lines(Size::new(100.0, 50.0));
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], (Point::new(0.0, 0.0), Point::new(0.0, 50.0)));
        assert_eq!(lines[4], (Point::new(0.0, 50.0), Point::new(100.0, 50.0)));
    }

    #[test]
    fn test_grid_zero_dimension() {
        let grid = Grid::new(0);
        let size = Size::new(100.0, 100.0);
        assert!(grid.intersections_in(size, size.to_rect()).is_empty());
        assert!(grid.lines(size).is_empty());
    }

    #[test]
    fn test_set_distance_validation() {
        let mut resolver = SnapResolver::default();
        assert_eq!(resolver.set_distance(1.0), Err(EditError::InvalidSnapDistance(1.0)));
        assert_eq!(resolver.set_distance(10.0), Ok(false));
        assert_eq!(resolver.set_distance(15.0), Ok(true));
        assert!(SnapResolver::new(SnapOptions::ALL, 0.5).is_err());
    }

    #[test]
    fn test_resolve_disabled_returns_cursor() {
        let resolver = SnapResolver::default();
        let grid = Grid::new(10);
        let cursor = Point::new(11.0, 11.0);
        let result = resolver.resolve(
            cursor,
            SnapPosition::Start,
            &[],
            &PathStore::new(),
            Some((&grid, Size::new(100.0, 100.0))),
        );
        assert_eq!(result, SnapResult::none(cursor));
    }

    #[test]
    fn test_resolve_grid_only_when_visible() {
        let resolver = SnapResolver::new(SnapOptions::GRID, 10.0).unwrap();
        let grid = Grid::new(70);
        let size = Size::new(250.0, 250.0);
        let store = PathStore::new();
        let cursor = Point::new(72.0, 68.0);

        let visible = resolver.resolve(cursor, SnapPosition::End, &[], &store, Some((&grid, size)));
        assert_eq!(visible.point, Point::new(70.0, 70.0));

        let hidden = resolver.resolve(cursor, SnapPosition::End, &[], &store, None);
        assert_eq!(hidden.point, cursor);
    }

    #[test]
    fn test_resolve_respects_position_flags() {
        let mut store = PathStore::new();
        store.add_paths([Path::new(
            StrokeStyle::default(),
            vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)],
        )]);
        let options = SnapOptions {
            path_at_end: true,
            ..SnapOptions::NONE
        };
        let resolver = SnapResolver::new(options, 10.0).unwrap();
        let cursor = Point::new(98.0, 3.0);

        let start = resolver.resolve(cursor, SnapPosition::Start, &[], &store, None);
        assert_eq!(start.point, cursor);

        let end = resolver.resolve(cursor, SnapPosition::End, &[], &store, None);
        assert_eq!(end.point, Point::new(100.0, 0.0));
        assert_eq!(end.kind, Some(SnapTargetKind::PathPoint));
    }

    #[test]
    fn test_resolve_excludes_points() {
        let mut store = PathStore::new();
        store.add_paths([Path::new(
            StrokeStyle::default(),
            vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)],
        )]);
        let resolver = SnapResolver::new(SnapOptions::PATH, 10.0).unwrap();
        let cursor = Point::new(2.0, 2.0);
        let result = resolver.resolve(
            cursor,
            SnapPosition::Start,
            &[Point::new(0.0, 0.0)],
            &store,
            None,
        );
        assert_eq!(result.point, cursor);
    }
}

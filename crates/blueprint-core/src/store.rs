//! The committed path list and the in-progress point buffer.

use crate::error::{EditError, EditResult};
use crate::geometry::nearest;
use crate::path::{Path, SimilarityPolicy};
use kurbo::{Point, Vec2};
use std::fmt;

/// Locates one point in the committed path list.
///
/// Indices are positional. A `PointMap` is only valid until the next insert or
/// removal on the committed list and must be discarded after one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointMap {
    pub path: usize,
    pub point: usize,
}

impl PointMap {
    pub const fn new(path: usize, point: usize) -> Self {
        Self { path, point }
    }
}

impl fmt::Display for PointMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.path, self.point)
    }
}

/// Notifications raised by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    /// One or more paths were appended to the committed list.
    PathSubmitted { count: usize },
}

/// Owner of the committed paths and the point buffer of the path being drawn.
#[derive(Debug, Clone, Default)]
pub struct PathStore {
    paths: Vec<Path>,
    buffer: Vec<Point>,
    /// Last position a buffered point was recorded at.
    pub last_draw_position: Point,
    /// Whether color participates in merge eligibility.
    pub similarity: SimilarityPolicy,
    events: Vec<StoreEvent>,
}

impl PathStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    pub fn path(&self, index: usize) -> EditResult<&Path> {
        self.paths.get(index).ok_or(EditError::PathIndexOutOfRange {
            index,
            len: self.paths.len(),
        })
    }

    pub fn path_count(&self) -> usize {
        self.paths.len()
    }

    /// Deep copy of the committed list.
    pub fn snapshot(&self) -> Vec<Path> {
        self.paths.clone()
    }

    pub fn buffer(&self) -> &[Point] {
        &self.buffer
    }

    pub fn buffer_is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn push_buffer_point(&mut self, point: Point) {
        self.buffer.push(point);
    }

    pub fn clear_buffer(&mut self) {
        self.buffer.clear();
    }

    /// Take the buffered points, leaving the buffer empty.
    pub fn take_buffer(&mut self) -> Vec<Point> {
        std::mem::take(&mut self.buffer)
    }

    /// Every committed point followed by the buffered points.
    pub fn all_points(&self) -> impl Iterator<Item = Point> + '_ {
        self.paths
            .iter()
            .flat_map(|path| path.points.iter().copied())
            .chain(self.buffer.iter().copied())
    }

    /// Append paths to the committed list. Empty input is a no-op.
    pub fn add_paths<I>(&mut self, paths: I)
    where
        I: IntoIterator<Item = Path>,
    {
        let before = self.paths.len();
        self.paths.extend(paths);
        let count = self.paths.len() - before;
        if count > 0 {
            log::debug!("Submitted {count} path(s), {} committed", self.paths.len());
            self.events.push(StoreEvent::PathSubmitted { count });
        }
    }

    pub fn remove_path_at(&mut self, index: usize) -> EditResult<Path> {
        self.check_path(index)?;
        Ok(self.paths.remove(index))
    }

    pub fn get_point(&self, map: PointMap) -> EditResult<Point> {
        self.check_point(map)?;
        Ok(self.paths[map.path].points[map.point])
    }

    pub fn set_point(&mut self, map: PointMap, point: Point) -> EditResult<()> {
        self.check_point(map)?;
        self.paths[map.path].points[map.point] = point;
        Ok(())
    }

    /// Direct access for the eraser, which keeps the two-point invariant itself.
    pub(crate) fn paths_mut(&mut self) -> &mut Vec<Path> {
        &mut self.paths
    }

    pub fn offset_path(&mut self, index: usize, delta: Vec2) -> EditResult<()> {
        self.check_path(index)?;
        self.paths[index].offset(delta);
        Ok(())
    }

    /// Clear the buffer, the committed list and the last draw position.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.paths.clear();
        self.last_draw_position = Point::ZERO;
    }

    /// Clear the committed list only.
    pub fn clear_submitted(&mut self) {
        self.paths.clear();
    }

    /// Replace the committed list wholesale, without a submit notification.
    pub fn replace_submitted(&mut self, paths: Vec<Path>) {
        self.paths = paths;
    }

    /// Step back: drop the last point of the last path, or the whole path when
    /// it has two points or fewer. Returns whether anything changed.
    pub fn remove_last_point(&mut self) -> bool {
        let Some(last) = self.paths.last_mut() else {
            return false;
        };
        if last.points.len() <= 2 {
            self.paths.pop();
        } else {
            last.points.pop();
        }
        true
    }

    /// Merge adjacent paths whose styles are similar and whose boundary points
    /// coincide exactly. Returns the number of merges.
    pub fn unify(&mut self) -> usize {
        let mut merges = 0;
        let mut i = 0;
        while i + 1 < self.paths.len() {
            let (current, next) = (&self.paths[i], &self.paths[i + 1]);
            let touching = current.last().is_some() && current.last() == next.first();
            if !touching || !current.is_similar_to(next, self.similarity) {
                i += 1;
                continue;
            }
            match combine_paths(current, std::slice::from_ref(next), self.similarity) {
                Ok(merged) => {
                    self.paths.remove(i + 1);
                    self.paths[i] = merged;
                    merges += 1;
                    i = 0;
                }
                Err(e) => {
                    log::warn!("Skipping merge at {i}: {e}");
                    i += 1;
                }
            }
        }
        if merges > 0 {
            log::debug!("Unified {merges} path pair(s), {} committed", self.paths.len());
        }
        merges
    }

    /// Candidate points for snapping: committed points not in `exclude`, plus
    /// the first buffered point.
    pub fn get_snap_points(&self, exclude: &[Point]) -> Vec<Point> {
        let mut points: Vec<Point> = self
            .paths
            .iter()
            .flat_map(|path| path.points.iter().copied())
            .filter(|point| !exclude.contains(point))
            .collect();
        if let Some(first) = self.buffer.first() {
            points.push(*first);
        }
        points
    }

    /// Nearest committed or buffered point to `target`, or `target` itself
    /// when there are none.
    pub fn nearest_point(&self, target: Point) -> Point {
        nearest(target, self.all_points()).map_or(target, |(_, point)| point)
    }

    /// Nearest point of one path to `target`, or `target` for an empty path.
    pub fn nearest_point_in_path(&self, target: Point, index: usize) -> EditResult<Point> {
        let path = self.path(index)?;
        Ok(nearest(target, path.points.iter().copied()).map_or(target, |(_, point)| point))
    }

    /// True when committing the buffer would produce nothing visible or a
    /// duplicate of a committed path.
    pub fn buffer_is_redundant(&self) -> bool {
        let Some(first) = self.buffer.first() else {
            return true;
        };
        self.buffer.iter().all(|point| point == first)
            || self.paths.iter().any(|path| path.matches_points(&self.buffer))
    }

    /// Drain queued notifications.
    pub fn take_events(&mut self) -> Vec<StoreEvent> {
        std::mem::take(&mut self.events)
    }

    fn check_path(&self, index: usize) -> EditResult<()> {
        if index < self.paths.len() {
            Ok(())
        } else {
            Err(EditError::PathIndexOutOfRange {
                index,
                len: self.paths.len(),
            })
        }
    }

    fn check_point(&self, map: PointMap) -> EditResult<()> {
        let path = self.path(map.path)?;
        if map.point < path.points.len() {
            Ok(())
        } else {
            Err(EditError::PointIndexOutOfRange {
                path: map.path,
                index: map.point,
                len: path.points.len(),
            })
        }
    }
}

/// Concatenate paths sharing a style and collapse consecutive duplicate points.
/// The merged path takes the style of `first`.
fn combine_paths(first: &Path, rest: &[Path], policy: SimilarityPolicy) -> EditResult<Path> {
    let mut points = first.points.clone();
    for path in rest {
        if !path.is_similar_to(first, policy) {
            return Err(EditError::IncompatibleStyles);
        }
        points.extend_from_slice(&path.points);
    }
    points.dedup();
    Ok(Path::new(first.style.clone(), points))
}

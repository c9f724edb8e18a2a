//! Point and path erasing.

use crate::path::SerializableColor;
use crate::store::{PathStore, PointMap};
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};

/// Default eraser radius.
pub const DEFAULT_ERASER_RADIUS: f64 = 20.0;

/// Region shape of the eraser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EraserShape {
    /// Points within `radius` of the cursor.
    #[default]
    Circle,
    /// Points inside the square of side `2 * radius` centered on the cursor.
    Square,
}

/// What a secondary-button drag removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EraseMode {
    Disabled,
    /// Remove individual points, dropping a path once it would fall below two points.
    #[default]
    Point,
    /// Remove every path with a point inside the region.
    Path,
}

/// Notifications raised while erasing. Indices refer to the list as it was
/// when the removal happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EraseEvent {
    PointErased(PointMap),
    PathErased(usize),
}

#[derive(Debug, Clone)]
pub struct Eraser {
    pub shape: EraserShape,
    pub mode: EraseMode,
    radius: f64,
    /// Outline color drawn while erasing.
    pub tool_color: SerializableColor,
    pub tool_width: f64,
    events: Vec<EraseEvent>,
}

impl Default for Eraser {
    fn default() -> Self {
        Self {
            shape: EraserShape::Circle,
            mode: EraseMode::Point,
            radius: DEFAULT_ERASER_RADIUS,
            tool_color: SerializableColor::new(255, 255, 255, 100),
            tool_width: 2.0,
            events: Vec::new(),
        }
    }
}

impl Eraser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Returns true if the radius changed.
    pub fn set_radius(&mut self, radius: f64) -> bool {
        if self.radius == radius {
            return false;
        }
        self.radius = radius;
        true
    }

    /// Bounding square of the eraser region around `center`.
    pub fn bounds(&self, center: Point) -> Rect {
        Rect::from_center_size(center, Size::new(2.0 * self.radius, 2.0 * self.radius))
    }

    /// Whether `point` lies inside the eraser region around `center`.
    pub fn contains(&self, center: Point, point: Point) -> bool {
        match self.shape {
            EraserShape::Circle => center.distance(point) <= self.radius,
            EraserShape::Square => self.bounds(center).contains(point),
        }
    }

    /// Erase around `position` according to the current mode.
    /// Returns whether anything was removed.
    pub fn perform_erase(&mut self, store: &mut PathStore, position: Point) -> bool {
        match self.mode {
            EraseMode::Point => self.erase_points(store, position),
            EraseMode::Path => self.erase_paths(store, position),
            EraseMode::Disabled => false,
        }
    }

    fn erase_points(&mut self, store: &mut PathStore, position: Point) -> bool {
        let mut erased = false;
        let paths = store.paths_mut();
        let mut path_index = 0;
        'paths: while path_index < paths.len() {
            let mut point_index = 0;
            while point_index < paths[path_index].points.len() {
                if !self.contains(position, paths[path_index].points[point_index]) {
                    point_index += 1;
                    continue;
                }
                erased = true;
                self.events
                    .push(EraseEvent::PointErased(PointMap::new(path_index, point_index)));
                if paths[path_index].points.len() > 2 {
                    paths[path_index].points.remove(point_index);
                } else {
                    paths.remove(path_index);
                    self.events.push(EraseEvent::PathErased(path_index));
                    continue 'paths;
                }
            }
            path_index += 1;
        }
        if erased {
            log::debug!("Erased points near ({}, {})", position.x, position.y);
        }
        erased
    }

    fn erase_paths(&mut self, store: &mut PathStore, position: Point) -> bool {
        let paths = store.paths_mut();
        let before = paths.len();
        let mut index = 0;
        while index < paths.len() {
            if paths[index].points.iter().any(|p| self.contains(position, *p)) {
                paths.remove(index);
                self.events.push(EraseEvent::PathErased(index));
            } else {
                index += 1;
            }
        }
        let removed = before - paths.len();
        if removed > 0 {
            log::debug!("Erased {removed} path(s) near ({}, {})", position.x, position.y);
        }
        removed > 0
    }

    /// Drain queued notifications.
    pub fn take_events(&mut self) -> Vec<EraseEvent> {
        std::mem::take(&mut self.events)
    }
}

//! Anchor markers drawn on path points, and hit-testing against them.

use crate::path::SerializableColor;
use crate::store::{PathStore, PointMap};
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};

/// Marker shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AnchorShape {
    Ellipse,
    #[default]
    Rectangle,
}

/// Appearance of anchor markers.
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorStyle {
    pub diameter: f64,
    pub shape: AnchorShape,
    pub color: SerializableColor,
    pub hover_color: SerializableColor,
}

impl Default for AnchorStyle {
    fn default() -> Self {
        Self {
            diameter: 10.0,
            shape: AnchorShape::Rectangle,
            color: SerializableColor::rgb(105, 105, 105),
            hover_color: SerializableColor::black(),
        }
    }
}

/// Hit-testing over committed path points using fixed-size marker rectangles.
#[derive(Debug, Clone)]
pub struct AnchorPoints {
    pub style: AnchorStyle,
    /// Whether the marker under the cursor is highlighted.
    pub draw_hovered: bool,
}

impl Default for AnchorPoints {
    fn default() -> Self {
        Self {
            style: AnchorStyle::default(),
            draw_hovered: true,
        }
    }
}

impl AnchorPoints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marker rectangle centered on `point`.
    pub fn marker_rect(&self, point: Point) -> Rect {
        Rect::from_center_size(point, Size::new(self.style.diameter, self.style.diameter))
    }

    pub fn marker_contains(&self, point: Point, position: Point) -> bool {
        self.marker_rect(point).contains(position)
    }

    /// Index of the first committed path with a marker containing `position`.
    pub fn hit_test_path(&self, store: &PathStore, position: Point) -> Option<usize> {
        self.hit_test_point(store, position).map(|map| map.path)
    }

    /// Locator of the first committed point whose marker contains `position`.
    pub fn hit_test_point(&self, store: &PathStore, position: Point) -> Option<PointMap> {
        store.paths().iter().enumerate().find_map(|(path_index, path)| {
            path.points
                .iter()
                .position(|point| self.marker_contains(*point, position))
                .map(|point_index| PointMap::new(path_index, point_index))
        })
    }
}

//! Render description of a canvas: what to draw, in paint order.

use crate::anchors::AnchorShape;
use crate::eraser::EraserShape;
use crate::path::{SerializableColor, StrokeStyle};
use kurbo::{Point, Rect, Size};

/// Canvas background color.
pub const BACKGROUND_COLOR: SerializableColor = SerializableColor::rgb(86, 140, 202);

/// Approximate glyph metrics used to size the size-indicator label.
const LABEL_CHAR_WIDTH: f64 = 7.0;
const LABEL_HEIGHT: f64 = 13.0;
const LABEL_PADDING: f64 = 3.0;

/// Why a polyline is part of the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolylineRole {
    Committed,
    /// The point buffer of the path being drawn.
    Pending,
    /// A committed path redrawn highlighted under the cursor.
    Hovered,
    /// Straight-line preview from the first buffered point to the cursor.
    Preview,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SceneItem {
    GridLine {
        from: Point,
        to: Point,
        color: SerializableColor,
        width: f64,
    },
    Polyline {
        role: PolylineRole,
        points: Vec<Point>,
        style: StrokeStyle,
    },
    EraserOutline {
        center: Point,
        radius: f64,
        shape: EraserShape,
        color: SerializableColor,
        width: f64,
    },
    Anchor {
        rect: Rect,
        shape: AnchorShape,
        color: SerializableColor,
        hovered: bool,
    },
    SizeIndicator {
        rect: Rect,
        label: String,
        fill: SerializableColor,
        text_color: SerializableColor,
    },
}

/// Ordered list of items to draw over a background.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub size: Size,
    pub background: SerializableColor,
    pub items: Vec<SceneItem>,
}

impl Scene {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            background: BACKGROUND_COLOR,
            items: Vec::new(),
        }
    }

    pub fn push(&mut self, item: SceneItem) {
        self.items.push(item);
    }

    /// Polylines with the given role, in paint order.
    pub fn polylines(&self, role: PolylineRole) -> impl Iterator<Item = (&[Point], &StrokeStyle)> {
        self.items.iter().filter_map(move |item| match item {
            SceneItem::Polyline {
                role: item_role,
                points,
                style,
            } if *item_role == role => Some((points.as_slice(), style)),
            _ => None,
        })
    }

    pub fn anchor_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| matches!(item, SceneItem::Anchor { .. }))
            .count()
    }

    /// Append the "width, height" label anchored to the bottom-right corner.
    pub fn push_size_indicator(&mut self) {
        let label = format!("{}, {}", self.size.width, self.size.height);
        let text_width = label.chars().count() as f64 * LABEL_CHAR_WIDTH;
        let rect = Rect::new(
            self.size.width - text_width - LABEL_PADDING,
            self.size.height - LABEL_HEIGHT - LABEL_PADDING,
            self.size.width,
            self.size.height,
        );
        self.push(SceneItem::SizeIndicator {
            rect,
            label,
            fill: SerializableColor::rgb(128, 128, 128),
            text_color: SerializableColor::white(),
        });
    }
}

//! Styled polylines.

mod color;
mod style;

pub use color::{ColorParseError, SerializableColor};
pub use style::{
    DEFAULT_STROKE_COLOR, DEFAULT_STROKE_WIDTH, DashStyle, LineCap, LineJoin, SimilarityPolicy,
    StrokeStyle,
};

use crate::geometry::polyline_length;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// An ordered sequence of points drawn with one stroke style.
///
/// Committed paths always hold at least two points; the store enforces this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub style: StrokeStyle,
    #[serde(with = "point_pairs")]
    pub points: Vec<Point>,
}

impl Path {
    pub fn new(style: StrokeStyle, points: Vec<Point>) -> Self {
        Self { style, points }
    }

    /// Sum of consecutive point distances.
    pub fn length(&self) -> f64 {
        polyline_length(&self.points)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<Point> {
        self.points.first().copied()
    }

    pub fn last(&self) -> Option<Point> {
        self.points.last().copied()
    }

    pub fn is_similar_to(&self, other: &Path, policy: SimilarityPolicy) -> bool {
        self.style.is_similar_to(&other.style, policy)
    }

    /// Translate every point by `delta`.
    pub fn offset(&mut self, delta: Vec2) {
        for point in &mut self.points {
            *point += delta;
        }
    }

    /// True if the point sequences match exactly, forward or reversed.
    pub fn matches_points(&self, points: &[Point]) -> bool {
        self.points.len() == points.len()
            && (self.points.iter().eq(points.iter()) || self.points.iter().rev().eq(points.iter()))
    }
}

/// Points as `[[x, y], ...]`.
mod point_pairs {
    use kurbo::Point;
    use serde::{Deserialize, Deserializer, Serializer, ser::SerializeSeq};

    pub fn serialize<S: Serializer>(points: &[Point], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(points.len()))?;
        for point in points {
            seq.serialize_element(&[point.x, point.y])?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Point>, D::Error> {
        let pairs = Vec::<[f64; 2]>::deserialize(deserializer)?;
        Ok(pairs.into_iter().map(|[x, y]| Point::new(x, y)).collect())
    }
}

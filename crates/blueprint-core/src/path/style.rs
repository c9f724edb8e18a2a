//! Stroke style for committed paths.

use super::color::SerializableColor;
use serde::{Deserialize, Serialize};

/// Default drawing pen color.
pub const DEFAULT_STROKE_COLOR: SerializableColor = SerializableColor::rgb(185, 197, 217);
/// Default drawing pen width.
pub const DEFAULT_STROKE_WIDTH: f64 = 10.0;

/// How consecutive segments are joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LineJoin {
    Miter,
    Bevel,
    #[default]
    Round,
    MiterClipped,
}

/// Shape drawn at a path's open ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LineCap {
    Flat,
    Square,
    #[default]
    Round,
    Triangle,
}

/// Dash pattern of a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DashStyle {
    #[default]
    Solid,
    Dash,
    Dot,
    DashDot,
    DashDotDot,
}

impl DashStyle {
    pub const ALL: [DashStyle; 5] = [
        DashStyle::Solid,
        DashStyle::Dash,
        DashStyle::Dot,
        DashStyle::DashDot,
        DashStyle::DashDotDot,
    ];

    /// Alternating on/off lengths in multiples of the stroke width.
    /// Empty for a solid stroke.
    pub fn pattern(&self) -> &'static [f64] {
        match self {
            DashStyle::Solid => &[],
            DashStyle::Dash => &[3.0, 1.0],
            DashStyle::Dot => &[1.0, 1.0],
            DashStyle::DashDot => &[3.0, 1.0, 1.0, 1.0],
            DashStyle::DashDotDot => &[3.0, 1.0, 1.0, 1.0, 1.0, 1.0],
        }
    }

    /// Dash pattern scaled to an absolute stroke width.
    pub fn scaled_pattern(&self, width: f64) -> Vec<f64> {
        self.pattern().iter().map(|len| len * width).collect()
    }

    pub fn name(&self) -> &'static str {
        match self {
            DashStyle::Solid => "Solid",
            DashStyle::Dash => "Dash",
            DashStyle::Dot => "Dot",
            DashStyle::DashDot => "DashDot",
            DashStyle::DashDotDot => "DashDotDot",
        }
    }

    /// Case-insensitive lookup by name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|style| style.name().eq_ignore_ascii_case(name))
    }
}

/// Whether color participates in merge eligibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SimilarityPolicy {
    /// Width, dash pattern and color must match.
    #[default]
    MatchColor,
    /// Only width and dash pattern must match.
    IgnoreColor,
}

/// Stroke attributes of a path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    pub color: SerializableColor,
    pub width: f64,
    #[serde(default)]
    pub line_join: LineJoin,
    #[serde(default)]
    pub start_cap: LineCap,
    #[serde(default)]
    pub end_cap: LineCap,
    #[serde(default)]
    pub dash_style: DashStyle,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: DEFAULT_STROKE_COLOR,
            width: DEFAULT_STROKE_WIDTH,
            line_join: LineJoin::Round,
            start_cap: LineCap::Round,
            end_cap: LineCap::Round,
            dash_style: DashStyle::Solid,
        }
    }
}

impl StrokeStyle {
    pub fn new(color: SerializableColor, width: f64) -> Self {
        Self {
            color,
            width,
            ..Default::default()
        }
    }

    pub fn with_dash_style(mut self, dash_style: DashStyle) -> Self {
        self.dash_style = dash_style;
        self
    }

    pub fn with_caps(mut self, cap: LineCap) -> Self {
        self.start_cap = cap;
        self.end_cap = cap;
        self
    }

    pub fn with_line_join(mut self, line_join: LineJoin) -> Self {
        self.line_join = line_join;
        self
    }

    /// Merge eligibility: width and dash pattern always, color per `policy`.
    pub fn is_similar_to(&self, other: &StrokeStyle, policy: SimilarityPolicy) -> bool {
        let shape_matches = self.width == other.width && self.dash_style == other.dash_style;
        match policy {
            SimilarityPolicy::MatchColor => shape_matches && self.color == other.color,
            SimilarityPolicy::IgnoreColor => shape_matches,
        }
    }
}

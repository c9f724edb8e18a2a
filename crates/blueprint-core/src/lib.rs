//! BlueprintBoard Core Library
//!
//! Platform-agnostic path-editing engine for the BlueprintBoard drawing canvas:
//! the committed path list and point buffer, hit-testing, snapping, erasing,
//! path unification and undo/redo, plus blueprint persistence.

pub mod anchors;
pub mod blueprint;
pub mod canvas;
pub mod error;
pub mod eraser;
pub mod geometry;
pub mod history;
pub mod input;
pub mod path;
pub mod scene;
pub mod settings;
pub mod snap;
pub mod store;

pub use anchors::{AnchorPoints, AnchorShape, AnchorStyle};
pub use blueprint::{Blueprint, BlueprintError, BlueprintResult};
pub use canvas::{CanvasEvent, CreateMode, DrawingCanvas, EditMode, Interaction};
pub use error::{EditError, EditResult};
pub use eraser::{EraseEvent, EraseMode, Eraser, EraserShape};
pub use history::{HistoryEvent, UndoRedo};
pub use input::{InputEvent, InputState, Key, KeyEvent, Modifiers, MouseButton, PointerEvent};
pub use path::{
    ColorParseError, DashStyle, LineCap, LineJoin, Path, SerializableColor, SimilarityPolicy,
    StrokeStyle,
};
pub use scene::{PolylineRole, Scene, SceneItem};
pub use settings::{Settings, SettingsError, SettingsResult};
pub use snap::{
    Grid, SnapOptions, SnapPosition, SnapResolver, SnapResult, SnapTarget, SnapTargetKind,
};
pub use store::{PathStore, PointMap, StoreEvent};

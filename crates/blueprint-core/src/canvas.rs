//! Drawing canvas: the interaction controller that turns pointer and keyboard
//! input into path store, eraser and history operations.

use crate::anchors::AnchorPoints;
use crate::blueprint::Blueprint;
use crate::error::EditResult;
use crate::eraser::{EraseEvent, EraseMode, Eraser, EraserShape};
use crate::history::{HistoryEvent, UndoRedo};
use crate::input::{InputState, Key, KeyEvent, MouseButton, PointerEvent};
use crate::path::{DashStyle, Path, SerializableColor, SimilarityPolicy, StrokeStyle};
use crate::scene::{PolylineRole, Scene, SceneItem};
use crate::settings::Settings;
use crate::snap::{Grid, SnapOptions, SnapPosition, SnapResolver, SnapResult};
use crate::store::{PathStore, PointMap, StoreEvent};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};

/// Maximum number of undo states to keep.
const MAX_UNDO_HISTORY: usize = 50;

/// Default minimum pointer travel between free-form points.
pub const DEFAULT_LINE_DETAIL: f64 = 20.0;

/// Default canvas size.
pub const DEFAULT_CANVAS_SIZE: Size = Size::new(800.0, 600.0);

/// How new paths are created with the primary button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CreateMode {
    Disabled,
    /// Points are recorded while dragging.
    #[default]
    FreeForm,
    /// A single segment from press to release.
    StraightLine,
}

/// What a shift + primary-button drag edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EditMode {
    #[default]
    Disabled,
    Point,
    Path,
}

/// Current pointer gesture.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Interaction {
    #[default]
    Idle,
    /// The point buffer is being filled.
    Creating,
    DraggingPoint(PointMap),
    DraggingPath { index: usize, last: Point },
    /// Secondary-button gesture. `before` is the committed list at the start.
    Erasing { before: Vec<Path>, erased: bool },
}

/// Notifications raised by the canvas and forwarded from its components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasEvent {
    PathSubmitted { count: usize },
    PointErased(PointMap),
    PathErased(usize),
    CanUndoChanged(bool),
    CanRedoChanged(bool),
    /// The anchor under the cursor changed.
    AnchorHovered(Option<PointMap>),
    /// The visible state changed.
    RedrawRequested,
}

impl From<StoreEvent> for CanvasEvent {
    fn from(event: StoreEvent) -> Self {
        match event {
            StoreEvent::PathSubmitted { count } => CanvasEvent::PathSubmitted { count },
        }
    }
}

impl From<EraseEvent> for CanvasEvent {
    fn from(event: EraseEvent) -> Self {
        match event {
            EraseEvent::PointErased(map) => CanvasEvent::PointErased(map),
            EraseEvent::PathErased(index) => CanvasEvent::PathErased(index),
        }
    }
}

impl From<HistoryEvent> for CanvasEvent {
    fn from(event: HistoryEvent) -> Self {
        match event {
            HistoryEvent::CanUndoChanged(value) => CanvasEvent::CanUndoChanged(value),
            HistoryEvent::CanRedoChanged(value) => CanvasEvent::CanRedoChanged(value),
        }
    }
}

/// Store `value` in `slot`, returning whether it differed.
fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

/// The drawing board controller.
#[derive(Debug, Clone)]
pub struct DrawingCanvas {
    store: PathStore,
    anchors: AnchorPoints,
    eraser: Eraser,
    grid: Grid,
    snap: SnapResolver,
    history: UndoRedo<Vec<Path>>,
    input: InputState,
    interaction: Interaction,
    hover: Option<PointMap>,
    draw_style: StrokeStyle,
    size: Size,
    line_detail: f64,
    show_grid: bool,
    auto_unify: bool,
    show_points: bool,
    show_size_indicator: bool,
    create_mode: CreateMode,
    edit_mode: EditMode,
    events: Vec<CanvasEvent>,
}

impl Default for DrawingCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawingCanvas {
    pub fn new() -> Self {
        let mut history = UndoRedo::with_limit(MAX_UNDO_HISTORY);
        history.add_state(Vec::new());
        Self {
            store: PathStore::new(),
            anchors: AnchorPoints::new(),
            eraser: Eraser::new(),
            grid: Grid::default(),
            snap: SnapResolver::default(),
            history,
            input: InputState::new(),
            interaction: Interaction::Idle,
            hover: None,
            draw_style: StrokeStyle::default(),
            size: DEFAULT_CANVAS_SIZE,
            line_detail: DEFAULT_LINE_DETAIL,
            show_grid: false,
            auto_unify: false,
            show_points: false,
            show_size_indicator: false,
            create_mode: CreateMode::FreeForm,
            edit_mode: EditMode::Disabled,
            events: Vec::new(),
        }
    }

    /// Canvas configured from persisted settings.
    pub fn from_settings(settings: &Settings) -> EditResult<Self> {
        let mut canvas = Self::new();
        canvas.apply_settings(settings)?;
        canvas.events.clear();
        Ok(canvas)
    }

    /// Apply settings to a live canvas. The snap distance is validated first so
    /// an invalid value leaves the canvas untouched.
    pub fn apply_settings(&mut self, settings: &Settings) -> EditResult<()> {
        self.snap.set_distance(settings.snap_distance)?;
        self.snap.options = settings.snap_options;
        self.line_detail = settings.line_detail;
        self.grid.set_cell_dimension(settings.grid_dimension);
        self.eraser.set_radius(settings.eraser_radius);
        self.eraser.shape = settings.eraser_shape;
        self.eraser.mode = settings.erase_mode;
        self.draw_style.width = settings.stroke_width;
        self.draw_style.color = settings.stroke_color;
        self.draw_style.dash_style = settings.dash_style;
        self.size = settings.canvas_size;
        self.show_grid = settings.show_grid;
        self.auto_unify = settings.auto_unify;
        self.show_points = settings.show_points;
        self.show_size_indicator = settings.show_size_indicator;
        self.edit_mode = settings.edit_mode;
        self.create_mode = settings.create_mode;
        self.store.similarity = settings.similarity;
        self.request_redraw();
        Ok(())
    }

    /// Capture the live configuration for persisting.
    pub fn settings(&self) -> Settings {
        Settings {
            snap_distance: self.snap.distance(),
            line_detail: self.line_detail,
            grid_dimension: self.grid.cell_dimension(),
            eraser_radius: self.eraser.radius(),
            stroke_width: self.draw_style.width,
            stroke_color: self.draw_style.color,
            canvas_size: self.size,
            show_grid: self.show_grid,
            auto_unify: self.auto_unify,
            show_points: self.show_points,
            show_size_indicator: self.show_size_indicator,
            snap_options: self.snap.options,
            eraser_shape: self.eraser.shape,
            edit_mode: self.edit_mode,
            erase_mode: self.eraser.mode,
            dash_style: self.draw_style.dash_style,
            create_mode: self.create_mode,
            similarity: self.store.similarity,
        }
    }

    // --- accessors ---

    pub fn store(&self) -> &PathStore {
        &self.store
    }

    pub fn paths(&self) -> &[Path] {
        self.store.paths()
    }

    pub fn anchors(&self) -> &AnchorPoints {
        &self.anchors
    }

    pub fn eraser(&self) -> &Eraser {
        &self.eraser
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Anchor currently under the cursor.
    pub fn hover(&self) -> Option<PointMap> {
        self.hover
    }

    pub fn draw_style(&self) -> &StrokeStyle {
        &self.draw_style
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn snap_distance(&self) -> f64 {
        self.snap.distance()
    }

    pub fn snap_options(&self) -> SnapOptions {
        self.snap.options
    }

    pub fn line_detail(&self) -> f64 {
        self.line_detail
    }

    pub fn show_grid(&self) -> bool {
        self.show_grid
    }

    pub fn auto_unify(&self) -> bool {
        self.auto_unify
    }

    pub fn show_points(&self) -> bool {
        self.show_points
    }

    pub fn show_size_indicator(&self) -> bool {
        self.show_size_indicator
    }

    pub fn create_mode(&self) -> CreateMode {
        self.create_mode
    }

    pub fn edit_mode(&self) -> EditMode {
        self.edit_mode
    }

    // --- setters; each returns whether the value changed ---

    pub fn set_snap_distance(&mut self, distance: f64) -> EditResult<bool> {
        self.snap.set_distance(distance)
    }

    pub fn set_snap_options(&mut self, options: SnapOptions) -> bool {
        replace(&mut self.snap.options, options)
    }

    pub fn set_line_detail(&mut self, line_detail: f64) -> bool {
        replace(&mut self.line_detail, line_detail)
    }

    pub fn set_show_grid(&mut self, show: bool) -> bool {
        let changed = replace(&mut self.show_grid, show);
        self.redraw_if(changed)
    }

    pub fn set_auto_unify(&mut self, auto_unify: bool) -> bool {
        replace(&mut self.auto_unify, auto_unify)
    }

    pub fn set_show_points(&mut self, show: bool) -> bool {
        let changed = replace(&mut self.show_points, show);
        self.redraw_if(changed)
    }

    pub fn set_show_size_indicator(&mut self, show: bool) -> bool {
        let changed = replace(&mut self.show_size_indicator, show);
        self.redraw_if(changed)
    }

    pub fn set_create_mode(&mut self, mode: CreateMode) -> bool {
        replace(&mut self.create_mode, mode)
    }

    pub fn set_edit_mode(&mut self, mode: EditMode) -> bool {
        replace(&mut self.edit_mode, mode)
    }

    pub fn set_erase_mode(&mut self, mode: EraseMode) -> bool {
        replace(&mut self.eraser.mode, mode)
    }

    pub fn set_eraser_shape(&mut self, shape: EraserShape) -> bool {
        replace(&mut self.eraser.shape, shape)
    }

    pub fn set_eraser_radius(&mut self, radius: f64) -> bool {
        self.eraser.set_radius(radius)
    }

    pub fn set_stroke_width(&mut self, width: f64) -> bool {
        replace(&mut self.draw_style.width, width)
    }

    pub fn set_stroke_color(&mut self, color: SerializableColor) -> bool {
        replace(&mut self.draw_style.color, color)
    }

    pub fn set_dash_style(&mut self, dash_style: DashStyle) -> bool {
        replace(&mut self.draw_style.dash_style, dash_style)
    }

    pub fn set_similarity(&mut self, similarity: SimilarityPolicy) -> bool {
        replace(&mut self.store.similarity, similarity)
    }

    pub fn set_grid_dimension(&mut self, dimension: u32) -> bool {
        let changed = self.grid.set_cell_dimension(dimension);
        self.redraw_if(changed)
    }

    pub fn set_size(&mut self, size: Size) -> bool {
        let changed = replace(&mut self.size, size);
        self.redraw_if(changed)
    }

    // --- input ---

    /// Feed a pointer event through the interaction state machine.
    pub fn handle_pointer_event(&mut self, event: PointerEvent) {
        self.input.handle_pointer_event(event);
        match event {
            PointerEvent::Down { position, button } => self.on_pointer_down(position, button),
            PointerEvent::Move { position } => self.on_pointer_move(position),
            PointerEvent::Up { position, button } => self.on_pointer_up(position, button),
        }
    }

    /// Feed a key event. Handles step back, undo and redo shortcuts.
    pub fn handle_key_event(&mut self, event: &KeyEvent) {
        self.input.handle_key_event(event);
        let KeyEvent::Pressed(key) = event else {
            return;
        };
        let modifiers = self.input.modifiers;
        match key {
            Key::Backspace => {
                self.step_back();
            }
            key if modifiers.ctrl && key.is_char('z') => {
                let result = if modifiers.shift { self.redo() } else { self.undo() };
                if let Err(e) = result {
                    log::debug!("Ignoring shortcut: {e}");
                }
            }
            key if modifiers.ctrl && key.is_char('y') => {
                if let Err(e) = self.redo() {
                    log::debug!("Ignoring shortcut: {e}");
                }
            }
            _ => {}
        }
    }

    fn on_pointer_down(&mut self, position: Point, button: MouseButton) {
        match button {
            MouseButton::Left => {
                if self.interaction != Interaction::Idle {
                    return;
                }
                if self.input.modifiers.shift {
                    self.begin_edit(position);
                    return;
                }
                let start = self.snap_point(position, SnapPosition::Start, &[]).point;
                match self.create_mode {
                    CreateMode::Disabled => return,
                    CreateMode::FreeForm => {
                        self.anchors.draw_hovered = false;
                        self.store.last_draw_position = start;
                    }
                    CreateMode::StraightLine => {}
                }
                self.store.push_buffer_point(start);
                self.interaction = Interaction::Creating;
            }
            MouseButton::Right => {
                // Secondary press cancels the path being drawn.
                self.store.clear_buffer();
                self.interaction = Interaction::Erasing {
                    before: self.store.snapshot(),
                    erased: false,
                };
            }
            MouseButton::Middle => return,
        }
        self.request_redraw();
    }

    fn begin_edit(&mut self, position: Point) {
        self.interaction = match self.edit_mode {
            EditMode::Path => match self.anchors.hit_test_path(&self.store, position) {
                Some(index) => Interaction::DraggingPath {
                    index,
                    last: position,
                },
                None => Interaction::Idle,
            },
            EditMode::Point => match self.anchors.hit_test_point(&self.store, position) {
                Some(map) => Interaction::DraggingPoint(map),
                None => Interaction::Idle,
            },
            EditMode::Disabled => Interaction::Idle,
        };
    }

    fn on_pointer_move(&mut self, position: Point) {
        self.update_hover(position);

        match &mut self.interaction {
            Interaction::Idle => return,
            Interaction::Creating => {
                if self.create_mode != CreateMode::FreeForm
                    || position.distance(self.store.last_draw_position) <= self.line_detail
                {
                    return;
                }
                self.store.push_buffer_point(position);
                self.store.last_draw_position = position;
            }
            Interaction::DraggingPoint(map) => {
                if let Err(e) = self.store.set_point(*map, position) {
                    log::warn!("Dropping stale point drag: {e}");
                    self.interaction = Interaction::Idle;
                }
            }
            Interaction::DraggingPath { index, last } => {
                let delta = position - *last;
                *last = position;
                if let Err(e) = self.store.offset_path(*index, delta) {
                    log::warn!("Dropping stale path drag: {e}");
                    self.interaction = Interaction::Idle;
                }
            }
            Interaction::Erasing { erased, .. } => {
                *erased |= self.eraser.perform_erase(&mut self.store, position);
            }
        }
        self.request_redraw();
    }

    fn on_pointer_up(&mut self, position: Point, button: MouseButton) {
        match button {
            MouseButton::Right => {
                if !matches!(self.interaction, Interaction::Erasing { .. }) {
                    return;
                }
                if let Interaction::Erasing {
                    before,
                    erased: true,
                } = std::mem::take(&mut self.interaction)
                {
                    if self.history.current() != Some(&before) {
                        self.history.add_state(before);
                    }
                    self.record_state();
                    log::debug!("Erase gesture finished, {} paths remain", self.store.path_count());
                }
            }
            MouseButton::Left => match std::mem::take(&mut self.interaction) {
                erasing @ Interaction::Erasing { .. } => {
                    // The primary release of a canceled path does nothing.
                    self.interaction = erasing;
                    return;
                }
                Interaction::DraggingPoint(map) => self.finish_point_drag(map, position),
                Interaction::DraggingPath { index, .. } => self.finish_path_drag(index, position),
                Interaction::Creating => self.commit_current_path(position),
                Interaction::Idle => {}
            },
            MouseButton::Middle => return,
        }
        self.anchors.draw_hovered = true;
        self.request_redraw();
    }

    fn update_hover(&mut self, position: Point) {
        let hover = self.anchors.hit_test_point(&self.store, position);
        if hover != self.hover && self.anchors.draw_hovered {
            self.hover = hover;
            self.events.push(CanvasEvent::AnchorHovered(hover));
            self.request_redraw();
        }
    }

    fn finish_point_drag(&mut self, map: PointMap, position: Point) {
        let current = match self.store.get_point(map) {
            Ok(point) => point,
            Err(e) => {
                log::warn!("Dropping stale point drag: {e}");
                return;
            }
        };
        let snapped = self.snap_point(position, SnapPosition::End, &[current]).point;
        if self.store.set_point(map, snapped).is_ok() {
            self.record_state();
        }
    }

    fn finish_path_drag(&mut self, index: usize, position: Point) {
        let exclude = match self.store.path(index) {
            Ok(path) => path.points.clone(),
            Err(e) => {
                log::warn!("Dropping stale path drag: {e}");
                return;
            }
        };
        let snap = self.snap_point(position, SnapPosition::End, &exclude);
        if snap.is_snapped() {
            let result = self
                .store
                .nearest_point_in_path(position, index)
                .and_then(|near| self.store.offset_path(index, snap.point - near));
            if let Err(e) = result {
                log::warn!("Could not snap dragged path: {e}");
            }
        }
        if self.auto_unify {
            self.store.unify();
        }
        self.record_state();
    }

    /// Append the snapped end point and commit the buffer as a new path unless
    /// it is redundant.
    fn commit_current_path(&mut self, position: Point) {
        let end = self.snap_point(position, SnapPosition::End, &[]).point;
        self.store.push_buffer_point(end);
        if self.store.buffer_is_redundant() {
            log::debug!("Discarding redundant path of {} points", self.store.buffer().len());
            self.store.clear_buffer();
            return;
        }
        let points = self.store.take_buffer();
        self.store.add_paths([Path::new(self.draw_style.clone(), points)]);
        if self.auto_unify {
            self.store.unify();
        }
        self.record_state();
    }

    fn snap_point(&self, cursor: Point, position: SnapPosition, exclude: &[Point]) -> SnapResult {
        let grid = self.show_grid.then_some((&self.grid, self.size));
        self.snap.resolve(cursor, position, exclude, &self.store, grid)
    }

    // --- operations ---

    /// Remove the last placed point, or the last path when it has two points.
    pub fn step_back(&mut self) -> bool {
        if !self.store.remove_last_point() {
            return false;
        }
        self.hover = None;
        self.record_state();
        self.request_redraw();
        true
    }

    /// Restore the previous snapshot.
    pub fn undo(&mut self) -> EditResult<()> {
        let snapshot = self.history.undo()?.clone();
        log::debug!("Undo to {} paths", snapshot.len());
        self.restore(snapshot);
        Ok(())
    }

    /// Restore the next snapshot.
    pub fn redo(&mut self) -> EditResult<()> {
        let snapshot = self.history.redo()?.clone();
        log::debug!("Redo to {} paths", snapshot.len());
        self.restore(snapshot);
        Ok(())
    }

    fn restore(&mut self, snapshot: Vec<Path>) {
        self.store.clear_submitted();
        self.store.add_paths(snapshot);
        // A stroke in progress keeps its buffer; drags and erase gestures refer to replaced paths.
        if self.interaction != Interaction::Creating {
            self.interaction = Interaction::Idle;
        }
        self.hover = None;
        self.request_redraw();
    }

    /// Add a path programmatically with the current drawing style.
    /// Fewer than two points are rejected.
    pub fn add_polygon(&mut self, points: Vec<Point>) -> bool {
        if points.len() < 2 {
            log::warn!("Ignoring polygon with {} point(s)", points.len());
            return false;
        }
        self.store.add_paths([Path::new(self.draw_style.clone(), points)]);
        self.record_state();
        self.request_redraw();
        true
    }

    /// Merge touching paths. Returns the number of merges.
    pub fn unify_paths(&mut self) -> usize {
        let merges = self.store.unify();
        if merges > 0 {
            self.hover = None;
            self.record_state();
            self.request_redraw();
        }
        merges
    }

    /// Remove everything and start a fresh history.
    pub fn clear(&mut self) {
        self.store.reset();
        self.history.reset(Vec::new());
        self.interaction = Interaction::Idle;
        self.hover = None;
        self.request_redraw();
    }

    pub fn create_blueprint(&self) -> Blueprint {
        Blueprint::new(self.store.snapshot(), self.grid.cell_dimension(), self.size)
    }

    /// Replace the canvas content with a blueprint and start a fresh history.
    pub fn load_blueprint(&mut self, blueprint: &Blueprint) {
        self.store.clear_buffer();
        self.store.clear_submitted();
        let (paths, short): (Vec<_>, Vec<_>) =
            blueprint.paths.iter().cloned().partition(|path| path.len() >= 2);
        if !short.is_empty() {
            log::warn!("Skipping {} blueprint path(s) with fewer than 2 points", short.len());
        }
        self.store.add_paths(paths);
        self.grid.set_cell_dimension(blueprint.grid_dimension);
        self.size = blueprint.canvas_size;
        self.history.reset(self.store.snapshot());
        self.interaction = Interaction::Idle;
        self.hover = None;
        log::info!("Loaded blueprint with {} paths", self.store.path_count());
        self.request_redraw();
    }

    /// Describe what to draw for a cursor position, in paint order.
    pub fn scene(&self, cursor: Point, draw_grid: bool) -> Scene {
        let mut scene = Scene::new(self.size);

        if draw_grid {
            for (from, to) in self.grid.lines(self.size) {
                scene.push(SceneItem::GridLine {
                    from,
                    to,
                    color: self.grid.color,
                    width: self.grid.stroke_width,
                });
            }
        }

        for path in self.store.paths() {
            scene.push(SceneItem::Polyline {
                role: PolylineRole::Committed,
                points: path.points.clone(),
                style: path.style.clone(),
            });
        }

        let buffer = self.store.buffer();
        if buffer.len() > 1 {
            scene.push(SceneItem::Polyline {
                role: PolylineRole::Pending,
                points: buffer.to_vec(),
                style: self.draw_style.clone(),
            });
        }

        if let Some(path) = self.hover.and_then(|map| self.store.paths().get(map.path)) {
            let mut style = path.style.clone();
            style.color = SerializableColor::white();
            scene.push(SceneItem::Polyline {
                role: PolylineRole::Hovered,
                points: path.points.clone(),
                style,
            });
        }

        if buffer.len() == 1 && self.create_mode != CreateMode::FreeForm {
            scene.push(SceneItem::Polyline {
                role: PolylineRole::Preview,
                points: vec![buffer[0], cursor],
                style: self.draw_style.clone(),
            });
        } else if matches!(self.interaction, Interaction::Erasing { .. }) {
            scene.push(SceneItem::EraserOutline {
                center: cursor,
                radius: self.eraser.radius(),
                shape: self.eraser.shape,
                color: self.eraser.tool_color,
                width: self.eraser.tool_width,
            });
        }

        if self.show_points {
            let style = &self.anchors.style;
            for point in self.store.all_points() {
                let hovered = self.anchors.draw_hovered && self.anchors.marker_contains(point, cursor);
                scene.push(SceneItem::Anchor {
                    rect: self.anchors.marker_rect(point),
                    shape: style.shape,
                    color: if hovered { style.hover_color } else { style.color },
                    hovered,
                });
            }
        }

        if self.show_size_indicator {
            scene.push_size_indicator();
        }

        scene
    }

    // --- events ---

    /// Drain queued notifications, including those of the components.
    pub fn take_events(&mut self) -> Vec<CanvasEvent> {
        self.forward_events();
        std::mem::take(&mut self.events)
    }

    fn forward_events(&mut self) {
        self.events.extend(self.store.take_events().into_iter().map(CanvasEvent::from));
        self.events.extend(self.eraser.take_events().into_iter().map(CanvasEvent::from));
        self.events.extend(self.history.take_events().into_iter().map(CanvasEvent::from));
    }

    fn request_redraw(&mut self) {
        self.forward_events();
        if self.events.last() != Some(&CanvasEvent::RedrawRequested) {
            self.events.push(CanvasEvent::RedrawRequested);
        }
    }

    fn redraw_if(&mut self, changed: bool) -> bool {
        if changed {
            self.request_redraw();
        }
        changed
    }

    /// Record the store as a new undo step unless it matches the current one.
    fn record_state(&mut self) {
        let snapshot = self.store.snapshot();
        if self.history.current() != Some(&snapshot) {
            self.history.add_state(snapshot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn down(canvas: &mut DrawingCanvas, x: f64, y: f64, button: MouseButton) {
        canvas.handle_pointer_event(PointerEvent::Down {
            position: Point::new(x, y),
            button,
        });
    }

    fn drag(canvas: &mut DrawingCanvas, x: f64, y: f64) {
        canvas.handle_pointer_event(PointerEvent::Move {
            position: Point::new(x, y),
        });
    }

    fn up(canvas: &mut DrawingCanvas, x: f64, y: f64, button: MouseButton) {
        canvas.handle_pointer_event(PointerEvent::Up {
            position: Point::new(x, y),
            button,
        });
    }

    fn draw_line(canvas: &mut DrawingCanvas, from: (f64, f64), to: (f64, f64)) {
        down(canvas, from.0, from.1, MouseButton::Left);
        drag(canvas, to.0, to.1);
        up(canvas, to.0, to.1, MouseButton::Left);
    }

    fn straight_canvas() -> DrawingCanvas {
        let mut canvas = DrawingCanvas::new();
        canvas.set_create_mode(CreateMode::StraightLine);
        canvas
    }

    fn press(canvas: &mut DrawingCanvas, key: Key) {
        canvas.handle_key_event(&KeyEvent::Pressed(key));
    }

    fn release(canvas: &mut DrawingCanvas, key: Key) {
        canvas.handle_key_event(&KeyEvent::Released(key));
    }

    #[test]
    fn test_new_canvas_has_nothing_to_undo() {
        let canvas = DrawingCanvas::new();
        assert!(!canvas.can_undo());
        assert!(!canvas.can_redo());
        assert_eq!(canvas.interaction(), &Interaction::Idle);
    }

    #[test]
    fn test_straight_line_commit() {
        let mut canvas = straight_canvas();
        draw_line(&mut canvas, (0.0, 0.0), (100.0, 0.0));
        assert_eq!(canvas.paths().len(), 1);
        assert_eq!(
            canvas.paths()[0].points,
            vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)]
        );
        assert!(canvas.can_undo());
        assert!(canvas.store().buffer_is_empty());
    }

    #[test]
    fn test_free_form_respects_line_detail() {
        let mut canvas = DrawingCanvas::new();
        down(&mut canvas, 0.0, 0.0, MouseButton::Left);
        drag(&mut canvas, 10.0, 0.0); // within line detail
        drag(&mut canvas, 25.0, 0.0);
        drag(&mut canvas, 30.0, 0.0); // within line detail of (25, 0)
        drag(&mut canvas, 50.0, 0.0);
        up(&mut canvas, 55.0, 0.0, MouseButton::Left);

        let points = &canvas.paths()[0].points;
        assert_eq!(
            points,
            &vec![
                Point::new(0.0, 0.0),
                Point::new(25.0, 0.0),
                Point::new(50.0, 0.0),
                Point::new(55.0, 0.0)
            ]
        );
    }

    #[test]
    fn test_click_without_drag_is_redundant() {
        let mut canvas = straight_canvas();
        down(&mut canvas, 10.0, 10.0, MouseButton::Left);
        up(&mut canvas, 10.0, 10.0, MouseButton::Left);
        assert!(canvas.paths().is_empty());
        assert!(!canvas.can_undo());
    }

    #[test]
    fn test_duplicate_path_is_not_committed() {
        let mut canvas = straight_canvas();
        draw_line(&mut canvas, (0.0, 0.0), (100.0, 0.0));
        draw_line(&mut canvas, (100.0, 0.0), (0.0, 0.0));
        assert_eq!(canvas.paths().len(), 1);
    }

    #[test]
    fn test_create_disabled() {
        let mut canvas = DrawingCanvas::new();
        canvas.set_create_mode(CreateMode::Disabled);
        draw_line(&mut canvas, (0.0, 0.0), (100.0, 0.0));
        assert!(canvas.paths().is_empty());
    }

    #[test]
    fn test_auto_unify_on_commit() {
        let mut canvas = straight_canvas();
        canvas.set_auto_unify(true);
        draw_line(&mut canvas, (0.0, 0.0), (10.0, 0.0));
        draw_line(&mut canvas, (10.0, 0.0), (20.0, 0.0));
        assert_eq!(canvas.paths().len(), 1);
        assert_eq!(canvas.paths()[0].len(), 3);
    }

    #[test]
    fn test_snap_end_to_path_point() {
        let mut canvas = straight_canvas();
        canvas.set_snap_options(SnapOptions::PATH);
        draw_line(&mut canvas, (0.0, 0.0), (100.0, 0.0));
        draw_line(&mut canvas, (50.0, 50.0), (97.0, 4.0));
        assert_eq!(canvas.paths()[1].last(), Some(Point::new(100.0, 0.0)));
    }

    #[test]
    fn test_snap_start_to_grid_only_when_visible() {
        let mut canvas = straight_canvas();
        canvas.set_snap_options(SnapOptions::GRID);
        draw_line(&mut canvas, (72.0, 68.0), (200.0, 200.0));
        assert_eq!(canvas.paths()[0].first(), Some(Point::new(72.0, 68.0)));

        canvas.set_show_grid(true);
        draw_line(&mut canvas, (72.0, 68.0), (200.0, 300.0));
        assert_eq!(canvas.paths()[1].first(), Some(Point::new(70.0, 70.0)));
    }

    #[test]
    fn test_undo_redo_restores_snapshots() {
        let mut canvas = straight_canvas();
        draw_line(&mut canvas, (0.0, 0.0), (100.0, 0.0));
        draw_line(&mut canvas, (0.0, 50.0), (100.0, 50.0));

        canvas.undo().unwrap();
        assert_eq!(canvas.paths().len(), 1);
        assert!(canvas.can_redo());

        canvas.redo().unwrap();
        assert_eq!(canvas.paths().len(), 2);
        assert!(!canvas.can_redo());
    }

    #[test]
    fn test_new_action_clears_redo() {
        let mut canvas = straight_canvas();
        draw_line(&mut canvas, (0.0, 0.0), (100.0, 0.0));
        canvas.undo().unwrap();
        assert!(canvas.paths().is_empty());
        draw_line(&mut canvas, (0.0, 50.0), (100.0, 50.0));
        assert!(!canvas.can_redo());
        assert!(canvas.redo().is_err());
    }

    #[test]
    fn test_keyboard_shortcuts() {
        let mut canvas = straight_canvas();
        draw_line(&mut canvas, (0.0, 0.0), (100.0, 0.0));

        press(&mut canvas, Key::Control);
        press(&mut canvas, Key::Char('z'));
        assert!(canvas.paths().is_empty());
        release(&mut canvas, Key::Char('z'));

        press(&mut canvas, Key::Char('y'));
        assert_eq!(canvas.paths().len(), 1);

        // Undo with nothing left is ignored rather than an error.
        press(&mut canvas, Key::Char('z'));
        press(&mut canvas, Key::Char('z'));
        assert!(canvas.paths().is_empty());

        press(&mut canvas, Key::Shift);
        press(&mut canvas, Key::Char('z'));
        assert_eq!(canvas.paths().len(), 1);
    }

    #[test]
    fn test_backspace_steps_back() {
        let mut canvas = DrawingCanvas::new();
        canvas.add_polygon(vec![
            Point::new(0.0, 0.0),
            Point::new(50.0, 0.0),
            Point::new(50.0, 50.0),
        ]);
        press(&mut canvas, Key::Backspace);
        assert_eq!(canvas.paths()[0].len(), 2);
        press(&mut canvas, Key::Backspace);
        assert!(canvas.paths().is_empty());
        canvas.undo().unwrap();
        assert_eq!(canvas.paths()[0].len(), 2);
    }

    #[test]
    fn test_secondary_press_cancels_buffer() {
        let mut canvas = straight_canvas();
        down(&mut canvas, 0.0, 0.0, MouseButton::Left);
        down(&mut canvas, 0.0, 0.0, MouseButton::Right);
        assert!(canvas.store().buffer_is_empty());
        up(&mut canvas, 100.0, 0.0, MouseButton::Left);
        assert!(canvas.paths().is_empty());
        up(&mut canvas, 100.0, 0.0, MouseButton::Right);
        assert_eq!(canvas.interaction(), &Interaction::Idle);
    }

    #[test]
    fn test_erase_gesture_is_one_undo_step() {
        let mut canvas = DrawingCanvas::new();
        canvas.add_polygon(vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)]);
        canvas.add_polygon(vec![Point::new(0.0, 100.0), Point::new(100.0, 100.0)]);
        canvas.set_erase_mode(EraseMode::Path);

        down(&mut canvas, 0.0, 0.0, MouseButton::Right);
        drag(&mut canvas, 0.0, 0.0);
        drag(&mut canvas, 0.0, 100.0);
        up(&mut canvas, 0.0, 100.0, MouseButton::Right);
        assert!(canvas.paths().is_empty());

        canvas.undo().unwrap();
        assert_eq!(canvas.paths().len(), 2);
    }

    #[test]
    fn test_erase_events_forwarded() {
        let mut canvas = DrawingCanvas::new();
        canvas.add_polygon(vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)]);
        canvas.take_events();

        down(&mut canvas, 0.0, 0.0, MouseButton::Right);
        drag(&mut canvas, 1.0, 0.0);
        up(&mut canvas, 1.0, 0.0, MouseButton::Right);

        let events = canvas.take_events();
        assert!(events.contains(&CanvasEvent::PointErased(PointMap::new(0, 0))));
        assert!(events.contains(&CanvasEvent::PathErased(0)));
        assert!(events.contains(&CanvasEvent::RedrawRequested));
    }

    #[test]
    fn test_point_drag_with_shift() {
        let mut canvas = DrawingCanvas::new();
        canvas.set_edit_mode(EditMode::Point);
        canvas.add_polygon(vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)]);

        press(&mut canvas, Key::Shift);
        down(&mut canvas, 101.0, 1.0, MouseButton::Left);
        assert_eq!(canvas.interaction(), &Interaction::DraggingPoint(PointMap::new(0, 1)));
        drag(&mut canvas, 150.0, 40.0);
        assert_eq!(canvas.paths()[0].points[1], Point::new(150.0, 40.0));
        up(&mut canvas, 150.0, 50.0, MouseButton::Left);
        release(&mut canvas, Key::Shift);

        assert_eq!(canvas.paths()[0].points[1], Point::new(150.0, 50.0));
        canvas.undo().unwrap();
        assert_eq!(canvas.paths()[0].points[1], Point::new(100.0, 0.0));
    }

    #[test]
    fn test_path_drag_snaps_to_other_path() {
        let mut canvas = DrawingCanvas::new();
        canvas.set_edit_mode(EditMode::Path);
        canvas.set_snap_options(SnapOptions::PATH);
        canvas.add_polygon(vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)]);
        canvas.add_polygon(vec![Point::new(200.0, 200.0), Point::new(300.0, 200.0)]);

        press(&mut canvas, Key::Shift);
        down(&mut canvas, 200.0, 200.0, MouseButton::Left);
        assert!(matches!(canvas.interaction(), Interaction::DraggingPath { index: 1, .. }));
        drag(&mut canvas, 104.0, 3.0);
        up(&mut canvas, 104.0, 3.0, MouseButton::Left);

        assert_eq!(
            canvas.paths()[1].points,
            vec![Point::new(100.0, 0.0), Point::new(200.0, 0.0)]
        );
    }

    #[test]
    fn test_drag_without_movement_adds_no_undo_step() {
        let mut canvas = DrawingCanvas::new();
        canvas.add_polygon(vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)]);
        press(&mut canvas, Key::Shift);

        canvas.set_edit_mode(EditMode::Point);
        down(&mut canvas, 100.0, 0.0, MouseButton::Left);
        up(&mut canvas, 100.0, 0.0, MouseButton::Left);

        canvas.set_edit_mode(EditMode::Path);
        down(&mut canvas, 0.0, 0.0, MouseButton::Left);
        up(&mut canvas, 0.0, 0.0, MouseButton::Left);
        release(&mut canvas, Key::Shift);

        canvas.undo().unwrap();
        assert!(canvas.paths().is_empty());
        assert!(!canvas.can_undo());
    }

    #[test]
    fn test_undo_during_stroke_keeps_stroke() {
        let mut canvas = straight_canvas();
        draw_line(&mut canvas, (0.0, 100.0), (100.0, 100.0));

        down(&mut canvas, 0.0, 0.0, MouseButton::Left);
        canvas.undo().unwrap();
        assert!(canvas.paths().is_empty());
        assert_eq!(canvas.interaction(), &Interaction::Creating);
        up(&mut canvas, 0.0, 0.0, MouseButton::Left);
        assert!(canvas.store().buffer_is_empty());

        draw_line(&mut canvas, (200.0, 200.0), (300.0, 200.0));
        assert_eq!(canvas.paths().len(), 1);
        assert_eq!(canvas.paths()[0].len(), 2);
    }

    #[test]
    fn test_undo_during_drag_ends_drag() {
        let mut canvas = DrawingCanvas::new();
        canvas.set_edit_mode(EditMode::Point);
        canvas.add_polygon(vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)]);
        canvas.add_polygon(vec![Point::new(0.0, 50.0), Point::new(100.0, 50.0)]);

        press(&mut canvas, Key::Shift);
        down(&mut canvas, 100.0, 50.0, MouseButton::Left);
        canvas.undo().unwrap();
        assert_eq!(canvas.interaction(), &Interaction::Idle);
        drag(&mut canvas, 150.0, 80.0);
        up(&mut canvas, 150.0, 80.0, MouseButton::Left);
        assert_eq!(canvas.paths().len(), 1);
        assert_eq!(canvas.paths()[0].points[1], Point::new(100.0, 0.0));
    }

    #[test]
    fn test_load_blueprint_skips_short_paths() {
        let style = StrokeStyle::default();
        let blueprint = Blueprint::new(
            vec![
                Path::new(style.clone(), vec![Point::new(1.0, 1.0)]),
                Path::new(style, vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)]),
            ],
            70,
            Size::new(100.0, 100.0),
        );
        let mut canvas = DrawingCanvas::new();
        canvas.load_blueprint(&blueprint);
        assert_eq!(canvas.paths().len(), 1);
        assert_eq!(canvas.paths()[0].len(), 2);
    }

    #[test]
    fn test_shift_without_edit_mode_does_nothing() {
        let mut canvas = DrawingCanvas::new();
        canvas.add_polygon(vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)]);
        press(&mut canvas, Key::Shift);
        draw_line(&mut canvas, (0.0, 0.0), (50.0, 50.0));
        assert_eq!(canvas.paths().len(), 1);
        assert_eq!(canvas.paths()[0].points[0], Point::new(0.0, 0.0));
    }

    #[test]
    fn test_hover_raises_event() {
        let mut canvas = DrawingCanvas::new();
        canvas.add_polygon(vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)]);
        canvas.take_events();

        drag(&mut canvas, 99.0, 1.0);
        assert_eq!(canvas.hover(), Some(PointMap::new(0, 1)));
        assert!(
            canvas
                .take_events()
                .contains(&CanvasEvent::AnchorHovered(Some(PointMap::new(0, 1))))
        );

        drag(&mut canvas, 99.0, 2.0);
        assert!(canvas.take_events().is_empty());
    }

    #[test]
    fn test_add_polygon_rejects_single_point() {
        let mut canvas = DrawingCanvas::new();
        assert!(!canvas.add_polygon(vec![Point::new(1.0, 1.0)]));
        assert!(canvas.paths().is_empty());
    }

    #[test]
    fn test_unify_paths_records_history() {
        let mut canvas = DrawingCanvas::new();
        canvas.add_polygon(vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)]);
        canvas.add_polygon(vec![Point::new(10.0, 0.0), Point::new(20.0, 0.0)]);
        assert_eq!(canvas.unify_paths(), 1);
        assert_eq!(canvas.paths().len(), 1);
        canvas.undo().unwrap();
        assert_eq!(canvas.paths().len(), 2);
    }

    #[test]
    fn test_clear_starts_fresh_history() {
        let mut canvas = straight_canvas();
        draw_line(&mut canvas, (0.0, 0.0), (100.0, 0.0));
        canvas.clear();
        assert!(canvas.paths().is_empty());
        assert!(!canvas.can_undo());
    }

    #[test]
    fn test_blueprint_round_trip_through_canvas() {
        let mut canvas = straight_canvas();
        canvas.set_size(Size::new(300.0, 200.0));
        canvas.set_grid_dimension(35);
        draw_line(&mut canvas, (0.0, 0.0), (100.0, 0.0));
        let blueprint = canvas.create_blueprint();

        let mut other = DrawingCanvas::new();
        other.load_blueprint(&blueprint);
        assert_eq!(other.paths(), canvas.paths());
        assert_eq!(other.size(), Size::new(300.0, 200.0));
        assert_eq!(other.grid().cell_dimension(), 35);
        assert!(!other.can_undo());
    }

    #[test]
    fn test_setters_report_change() {
        let mut canvas = DrawingCanvas::new();
        assert!(canvas.set_show_grid(true));
        assert!(!canvas.set_show_grid(true));
        assert!(canvas.set_show_points(true));
        assert!(!canvas.set_show_points(true));
        assert!(canvas.set_show_size_indicator(true));
        assert!(!canvas.set_show_size_indicator(true));
        assert!(canvas.set_size(Size::new(320.0, 240.0)));
        assert!(!canvas.set_size(Size::new(320.0, 240.0)));
        assert!(canvas.set_line_detail(5.0));
        assert!(canvas.set_snap_distance(1.0).is_err());
        assert_eq!(canvas.set_snap_distance(12.0), Ok(true));
        assert!(!canvas.set_dash_style(DashStyle::Solid));
    }

    #[test]
    fn test_settings_round_trip() {
        let mut settings = Settings::default();
        settings.snap_distance = 25.0;
        settings.show_grid = true;
        settings.create_mode = CreateMode::StraightLine;
        settings.edit_mode = EditMode::Path;
        settings.dash_style = DashStyle::Dot;
        let canvas = DrawingCanvas::from_settings(&settings).unwrap();
        assert_eq!(canvas.settings(), settings);
    }

    #[test]
    fn test_from_settings_rejects_bad_snap_distance() {
        let settings = Settings {
            snap_distance: 0.5,
            ..Settings::default()
        };
        assert!(DrawingCanvas::from_settings(&settings).is_err());
    }

    #[test]
    fn test_scene_paint_order() {
        let mut canvas = straight_canvas();
        canvas.set_show_points(true);
        canvas.set_show_size_indicator(true);
        draw_line(&mut canvas, (0.0, 0.0), (100.0, 0.0));
        down(&mut canvas, 0.0, 50.0, MouseButton::Left);

        let scene = canvas.scene(Point::new(60.0, 50.0), true);
        assert!(matches!(scene.items.first(), Some(SceneItem::GridLine { .. })));
        assert_eq!(scene.polylines(PolylineRole::Committed).count(), 1);
        let (preview, _) = scene.polylines(PolylineRole::Preview).next().unwrap();
        assert_eq!(preview, &[Point::new(0.0, 50.0), Point::new(60.0, 50.0)]);
        // Two committed points and one buffered point.
        assert_eq!(scene.anchor_count(), 3);
        assert!(matches!(scene.items.last(), Some(SceneItem::SizeIndicator { .. })));
    }

    #[test]
    fn test_scene_hovered_path_is_white() {
        let mut canvas = DrawingCanvas::new();
        canvas.add_polygon(vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)]);
        drag(&mut canvas, 0.0, 0.0);
        let scene = canvas.scene(Point::ZERO, false);
        let (_, style) = scene.polylines(PolylineRole::Hovered).next().unwrap();
        assert_eq!(style.color, SerializableColor::white());
    }

    #[test]
    fn test_scene_eraser_outline_while_erasing() {
        let mut canvas = DrawingCanvas::new();
        down(&mut canvas, 10.0, 10.0, MouseButton::Right);
        let scene = canvas.scene(Point::new(10.0, 10.0), false);
        assert!(
            scene
                .items
                .iter()
                .any(|item| matches!(item, SceneItem::EraserOutline { .. }))
        );
    }
}

//! Interaction modes: the state machine that turns pointer gestures into
//! edit commands.
//!
//! Exactly one mode is active at a time. Modes receive pointer events in
//! screen coordinates, convert through the camera (optionally routing through
//! the snap service) and issue completed gestures exclusively as commands via
//! the command manager. An in-progress gesture lives entirely inside the
//! mode; cancelling it never touches the model or the history.

use crate::camera::Camera;
use crate::command::{AddEntity, CommandManager, RemoveEntities, TranslateEntities};
use crate::entity::{Entity, EntityId, Line, Polyline};
use crate::event::{Observers, SubscriberId};
use crate::input::{Key, PointerInput};
use crate::model::GeometryModel;
use crate::snap::SnapService;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Screen-space pick radius for hit tests and snapping, in device units.
pub const PICK_RADIUS: f64 = 5.0;

/// The available interaction modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ModeKind {
    #[default]
    Select,
    DrawLine,
    DrawPolyline,
    Pan,
}

/// Notification raised by [`ModeManager::set_mode`].
#[derive(Debug, Clone, PartialEq)]
pub struct ModeChanged {
    pub kind: ModeKind,
    pub prompt: String,
}

/// Everything a mode may touch while handling an event.
///
/// Modes read the model freely but mutate it only through `commands`.
pub struct EditContext<'a> {
    pub model: &'a mut GeometryModel,
    pub commands: &'a mut CommandManager,
    pub camera: &'a mut Camera,
    pub snap: &'a SnapService,
    /// When false, `resolve` skips the snap service entirely.
    pub snap_enabled: bool,
    /// Screen-space pick radius for hit tests and snap tolerance.
    pub pick_radius: f64,
}

impl<'a> EditContext<'a> {
    pub fn new(
        model: &'a mut GeometryModel,
        commands: &'a mut CommandManager,
        camera: &'a mut Camera,
        snap: &'a SnapService,
    ) -> Self {
        Self {
            model,
            commands,
            camera,
            snap,
            snap_enabled: true,
            pick_radius: PICK_RADIUS,
        }
    }

    /// Screen position to world, snapped when snapping is on.
    pub fn resolve(&self, screen: Point) -> Point {
        let world = self.camera.screen_to_world(screen);
        if self.snap_enabled {
            let tolerance = self.camera.world_tolerance(self.pick_radius);
            self.snap.try_snap(world, self.model, tolerance).point
        } else {
            world
        }
    }

    /// The pick radius as a world distance at the current zoom.
    pub fn world_pick_radius(&self) -> f64 {
        self.camera.world_tolerance(self.pick_radius)
    }
}

/// One interaction mode.
///
/// Handlers default to no-ops so each mode implements only the events it
/// cares about. `cancel` must be idempotent and must not touch the model or
/// the history.
pub trait InteractionMode {
    fn kind(&self) -> ModeKind;

    /// One-line hint for the status bar.
    fn status_prompt(&self) -> &'static str;

    fn on_pointer_down(&mut self, _input: &PointerInput, _ctx: &mut EditContext<'_>) {}

    fn on_pointer_move(&mut self, _input: &PointerInput, _ctx: &mut EditContext<'_>) {}

    fn on_pointer_up(&mut self, _input: &PointerInput, _ctx: &mut EditContext<'_>) {}

    fn on_key(&mut self, _key: Key, _ctx: &mut EditContext<'_>) {}

    /// Abandon any in-progress gesture.
    fn cancel(&mut self);
}

/// Click to select, drag to move, Delete to remove.
#[derive(Debug, Default)]
pub struct SelectMode {
    selection: Vec<EntityId>,
    /// World point where the current drag started, if a drag is in progress.
    drag_start: Option<Point>,
    drag_current: Option<Point>,
}

impl SelectMode {
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently selected entities.
    pub fn selection(&self) -> &[EntityId] {
        &self.selection
    }
}

impl InteractionMode for SelectMode {
    fn kind(&self) -> ModeKind {
        ModeKind::Select
    }

    fn status_prompt(&self) -> &'static str {
        "Click to select, drag to move, Delete to remove"
    }

    fn on_pointer_down(&mut self, input: &PointerInput, ctx: &mut EditContext<'_>) {
        let world = ctx.camera.screen_to_world(input.position);
        let hits = ctx.model.entities_at_point(world, ctx.world_pick_radius());

        match hits.first() {
            Some(&hit) => {
                if input.modifiers.shift {
                    match self.selection.iter().position(|&id| id == hit) {
                        Some(index) => {
                            self.selection.remove(index);
                        }
                        None => self.selection.push(hit),
                    }
                } else if !self.selection.contains(&hit) {
                    self.selection = vec![hit];
                }
                if !self.selection.is_empty() {
                    self.drag_start = Some(world);
                    self.drag_current = Some(world);
                }
            }
            None => {
                if !input.modifiers.shift {
                    self.selection.clear();
                }
            }
        }
    }

    fn on_pointer_move(&mut self, input: &PointerInput, ctx: &mut EditContext<'_>) {
        // Nothing mutates mid-drag; the move commits as one command on
        // release.
        if self.drag_start.is_some() {
            self.drag_current = Some(ctx.camera.screen_to_world(input.position));
        }
    }

    fn on_pointer_up(&mut self, input: &PointerInput, ctx: &mut EditContext<'_>) {
        let Some(start) = self.drag_start.take() else {
            return;
        };
        self.drag_current = None;

        let end = ctx.camera.screen_to_world(input.position);
        let delta = end - start;
        if delta.hypot() == 0.0 || self.selection.is_empty() {
            return;
        }

        let command = TranslateEntities::new(self.selection.clone(), delta);
        if let Err(err) = ctx.commands.execute(command, ctx.model) {
            log::warn!("move rejected: {err}");
        }
    }

    fn on_key(&mut self, key: Key, ctx: &mut EditContext<'_>) {
        match key {
            Key::Delete | Key::Backspace => {
                if self.selection.is_empty() {
                    return;
                }
                let ids = std::mem::take(&mut self.selection);
                if let Err(err) = ctx.commands.execute(RemoveEntities::new(ids), ctx.model) {
                    log::warn!("delete rejected: {err}");
                }
            }
            Key::Escape => self.selection.clear(),
            Key::Enter => {}
        }
    }

    fn cancel(&mut self) {
        if self.drag_start.take().is_some() {
            log::debug!("select: drag cancelled");
        }
        self.drag_current = None;
    }
}

/// Press-drag-release to draw a line.
#[derive(Debug, Default)]
pub struct DrawLineMode {
    start: Option<Point>,
}

impl DrawLineMode {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InteractionMode for DrawLineMode {
    fn kind(&self) -> ModeKind {
        ModeKind::DrawLine
    }

    fn status_prompt(&self) -> &'static str {
        "Drag to draw a line"
    }

    fn on_pointer_down(&mut self, input: &PointerInput, ctx: &mut EditContext<'_>) {
        self.start = Some(ctx.resolve(input.position));
    }

    fn on_pointer_up(&mut self, input: &PointerInput, ctx: &mut EditContext<'_>) {
        let Some(start) = self.start.take() else {
            return;
        };
        let end = ctx.resolve(input.position);
        if (end - start).hypot() == 0.0 {
            log::debug!("draw line: degenerate gesture dropped");
            return;
        }

        let command = AddEntity::new(Entity::Line(Line::new(start, end)));
        if let Err(err) = ctx.commands.execute(command, ctx.model) {
            log::warn!("add line rejected: {err}");
        }
    }

    fn cancel(&mut self) {
        if self.start.take().is_some() {
            log::debug!("draw line: gesture cancelled");
        }
    }
}

/// Click to add vertices, Enter to finish, Escape to abandon.
#[derive(Debug, Default)]
pub struct DrawPolylineMode {
    vertices: Vec<Point>,
}

impl DrawPolylineMode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Vertices placed so far, for rubber-band preview.
    pub fn pending_vertices(&self) -> &[Point] {
        &self.vertices
    }
}

impl InteractionMode for DrawPolylineMode {
    fn kind(&self) -> ModeKind {
        ModeKind::DrawPolyline
    }

    fn status_prompt(&self) -> &'static str {
        "Click to add vertices, Enter to finish, Escape to cancel"
    }

    fn on_pointer_down(&mut self, input: &PointerInput, ctx: &mut EditContext<'_>) {
        self.vertices.push(ctx.resolve(input.position));
    }

    fn on_key(&mut self, key: Key, ctx: &mut EditContext<'_>) {
        match key {
            Key::Enter => {
                if self.vertices.len() < 2 {
                    return;
                }
                let points = std::mem::take(&mut self.vertices);
                let command = AddEntity::new(Entity::Polyline(Polyline::new(points)));
                if let Err(err) = ctx.commands.execute(command, ctx.model) {
                    log::warn!("add polyline rejected: {err}");
                }
            }
            Key::Escape => self.cancel(),
            _ => {}
        }
    }

    fn cancel(&mut self) {
        if !self.vertices.is_empty() {
            log::debug!(
                "draw polyline: {} pending vertices dropped",
                self.vertices.len()
            );
            self.vertices.clear();
        }
    }
}

/// Drag to pan the camera. Produces no commands.
#[derive(Debug, Default)]
pub struct PanMode {
    /// Last pointer position in screen coordinates.
    last: Option<Point>,
}

impl PanMode {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InteractionMode for PanMode {
    fn kind(&self) -> ModeKind {
        ModeKind::Pan
    }

    fn status_prompt(&self) -> &'static str {
        "Drag to pan"
    }

    fn on_pointer_down(&mut self, input: &PointerInput, _ctx: &mut EditContext<'_>) {
        self.last = Some(input.position);
    }

    fn on_pointer_move(&mut self, input: &PointerInput, ctx: &mut EditContext<'_>) {
        if let Some(last) = self.last {
            ctx.camera.pan(input.position - last);
            self.last = Some(input.position);
        }
    }

    fn on_pointer_up(&mut self, _input: &PointerInput, _ctx: &mut EditContext<'_>) {
        self.last = None;
    }

    fn cancel(&mut self) {
        self.last = None;
    }
}

fn make_mode(kind: ModeKind) -> Box<dyn InteractionMode> {
    match kind {
        ModeKind::Select => Box::new(SelectMode::new()),
        ModeKind::DrawLine => Box::new(DrawLineMode::new()),
        ModeKind::DrawPolyline => Box::new(DrawPolylineMode::new()),
        ModeKind::Pan => Box::new(PanMode::new()),
    }
}

/// Owns the active mode and routes input events to it.
pub struct ModeManager {
    current: Box<dyn InteractionMode>,
    observers: Observers<ModeChanged>,
}

impl Default for ModeManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ModeManager {
    /// Start in Select mode.
    pub fn new() -> Self {
        Self {
            current: make_mode(ModeKind::Select),
            observers: Observers::new(),
        }
    }

    /// Switch modes. Legal from any mode at any time; an in-progress gesture
    /// in the outgoing mode is cancelled, never committed.
    pub fn set_mode(&mut self, kind: ModeKind) {
        self.current.cancel();
        self.current = make_mode(kind);
        log::debug!("mode changed: {kind:?}");

        let event = ModeChanged {
            kind,
            prompt: self.status_prompt(),
        };
        self.observers.notify(&event);
    }

    pub fn current_mode(&self) -> ModeKind {
        self.current.kind()
    }

    pub fn status_prompt(&self) -> String {
        self.current.status_prompt().to_string()
    }

    /// The active mode, for mode-specific queries (selection, pending
    /// vertices).
    pub fn active(&self) -> &dyn InteractionMode {
        self.current.as_ref()
    }

    pub fn on_pointer_down(&mut self, input: &PointerInput, ctx: &mut EditContext<'_>) {
        self.current.on_pointer_down(input, ctx);
    }

    pub fn on_pointer_move(&mut self, input: &PointerInput, ctx: &mut EditContext<'_>) {
        self.current.on_pointer_move(input, ctx);
    }

    pub fn on_pointer_up(&mut self, input: &PointerInput, ctx: &mut EditContext<'_>) {
        self.current.on_pointer_up(input, ctx);
    }

    pub fn on_key(&mut self, key: Key, ctx: &mut EditContext<'_>) {
        self.current.on_key(key, ctx);
    }

    /// Cancel the active mode's in-progress gesture, if any.
    pub fn cancel(&mut self) {
        self.current.cancel();
    }

    /// Subscribe to `ModeChanged` notifications.
    pub fn subscribe_mode_changed(
        &mut self,
        handler: impl FnMut(&ModeChanged) + 'static,
    ) -> SubscriberId {
        self.observers.subscribe(handler)
    }

    /// Remove a `ModeChanged` subscription.
    pub fn unsubscribe_mode_changed(&mut self, id: SubscriberId) -> bool {
        self.observers.unsubscribe(id)
    }
}

impl fmt::Debug for ModeManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModeManager")
            .field("current", &self.current.kind())
            .finish()
    }
}

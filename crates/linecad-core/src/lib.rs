//! LineCAD Core Library
//!
//! Platform-agnostic interactive editing core for a 2D CAD canvas: camera
//! transform, geometry model, undo/redo command history, interaction modes
//! and object snapping. Rendering and UI toolkit bindings live elsewhere;
//! a canvas coordinator wires this crate to them.

pub mod camera;
pub mod command;
pub mod entity;
pub mod event;
pub mod input;
pub mod mode;
pub mod model;
pub mod snap;

pub use camera::{Camera, CameraError, ZOOM_IN_FACTOR, ZOOM_OUT_FACTOR};
pub use command::{
    AddEntity, CommandError, CommandManager, EditCommand, HistoryState, RemoveEntities,
    TranslateEntities, MAX_UNDO_HISTORY,
};
pub use entity::{Entity, EntityId, EntityTrait, Line, Polyline};
pub use event::{Observers, SubscriberId};
pub use input::{Key, Modifiers, MouseButton, PointerInput};
pub use mode::{
    DrawLineMode, DrawPolylineMode, EditContext, InteractionMode, ModeChanged, ModeKind,
    ModeManager, PanMode, SelectMode, PICK_RADIUS,
};
pub use model::GeometryModel;
pub use snap::{SnapKind, SnapResult, SnapService, GRID_SIZE};

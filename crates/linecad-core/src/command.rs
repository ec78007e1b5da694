//! Reversible edit commands and the undo/redo history.

use crate::entity::{Entity, EntityId, EntityTrait};
use crate::event::{Observers, SubscriberId};
use crate::model::GeometryModel;
use kurbo::{Affine, Vec2};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Maximum number of commands kept in the undo history.
pub const MAX_UNDO_HISTORY: usize = 50;

/// Command errors.
#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("no command to undo")]
    NoCommandToUndo,
    #[error("no command to redo")]
    NoCommandToRedo,
    #[error("entity not found: {0}")]
    EntityNotFound(EntityId),
}

/// One reversible mutation of the geometry model.
///
/// A command owns exactly the data it needs to apply and revert itself.
/// `apply` must either mutate the model fully or leave it untouched and
/// return an error; `revert` must restore the observable state `apply`
/// changed, exactly.
pub trait EditCommand {
    /// Apply the mutation. Atomic: on error the model is unchanged.
    fn apply(&mut self, model: &mut GeometryModel) -> Result<(), CommandError>;

    /// Undo the mutation applied by the last `apply`.
    fn revert(&mut self, model: &mut GeometryModel);

    /// Human-readable label for undo/redo UI.
    fn description(&self) -> &str;
}

/// Insert one entity into the model.
pub struct AddEntity {
    id: EntityId,
    /// Holds the entity while it is out of the model (before apply, after
    /// revert).
    entity: Option<Entity>,
    description: String,
}

impl AddEntity {
    pub fn new(entity: Entity) -> Self {
        Self {
            id: entity.id(),
            description: format!("Add {}", entity.kind_name()),
            entity: Some(entity),
        }
    }
}

impl EditCommand for AddEntity {
    fn apply(&mut self, model: &mut GeometryModel) -> Result<(), CommandError> {
        let entity = self
            .entity
            .take()
            .ok_or(CommandError::EntityNotFound(self.id))?;
        model.insert(entity);
        Ok(())
    }

    fn revert(&mut self, model: &mut GeometryModel) {
        if let Some((_, entity)) = model.remove(self.id) {
            self.entity = Some(entity);
        }
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Delete a batch of entities from the model.
pub struct RemoveEntities {
    ids: Vec<EntityId>,
    /// Removed entities with their draw-order positions, kept for revert.
    /// Stored in descending position order.
    removed: Vec<(usize, Entity)>,
    description: String,
}

impl RemoveEntities {
    pub fn new(ids: Vec<EntityId>) -> Self {
        let description = if ids.len() == 1 {
            "Delete entity".to_string()
        } else {
            format!("Delete {} entities", ids.len())
        };
        Self {
            ids,
            removed: Vec::new(),
            description,
        }
    }
}

impl EditCommand for RemoveEntities {
    fn apply(&mut self, model: &mut GeometryModel) -> Result<(), CommandError> {
        // Resolve every position before touching the model, so a missing
        // entity rejects the whole command.
        let mut positions = Vec::with_capacity(self.ids.len());
        for &id in &self.ids {
            let index = model
                .z_index(id)
                .ok_or(CommandError::EntityNotFound(id))?;
            positions.push((index, id));
        }

        // Remove from the top of the draw order down; lower positions stay
        // valid for reinsertion.
        positions.sort_by(|a, b| b.0.cmp(&a.0));
        self.removed.clear();
        for (_, id) in positions {
            if let Some(entry) = model.remove(id) {
                self.removed.push(entry);
            }
        }
        Ok(())
    }

    fn revert(&mut self, model: &mut GeometryModel) {
        // Reinsert bottom-up to land each entity back in its original slot.
        for (index, entity) in self.removed.drain(..).rev() {
            model.insert_at(index, entity);
        }
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Move a batch of entities by a world-space delta.
pub struct TranslateEntities {
    ids: Vec<EntityId>,
    delta: Vec2,
    /// Pre-move clones, restored verbatim on revert so undo is exact even
    /// where floating-point translation would not round-trip.
    originals: Vec<(EntityId, Entity)>,
    description: String,
}

impl TranslateEntities {
    pub fn new(mut ids: Vec<EntityId>, delta: Vec2) -> Self {
        // A duplicated id must not translate its entity twice (or capture an
        // already-moved clone as the original).
        let mut seen = HashSet::new();
        ids.retain(|id| seen.insert(*id));

        let description = if ids.len() == 1 {
            "Move entity".to_string()
        } else {
            format!("Move {} entities", ids.len())
        };
        Self {
            ids,
            delta,
            originals: Vec::new(),
            description,
        }
    }
}

impl EditCommand for TranslateEntities {
    fn apply(&mut self, model: &mut GeometryModel) -> Result<(), CommandError> {
        for &id in &self.ids {
            if !model.contains(id) {
                return Err(CommandError::EntityNotFound(id));
            }
        }

        self.originals.clear();
        let affine = Affine::translate(self.delta);
        for &id in &self.ids {
            if let Some(entity) = model.get_mut(id) {
                self.originals.push((id, entity.clone()));
                entity.transform(affine);
            }
        }
        Ok(())
    }

    fn revert(&mut self, model: &mut GeometryModel) {
        for (id, original) in self.originals.drain(..) {
            if let Some(entity) = model.get_mut(id) {
                *entity = original;
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Snapshot of the history state, carried by `StateChanged` notifications.
#[derive(Debug, Clone, Default)]
pub struct HistoryState {
    pub can_undo: bool,
    pub can_redo: bool,
    pub undo_description: Option<String>,
    pub redo_description: Option<String>,
}

/// Owns the undo/redo history of edit commands.
///
/// All model mutation funnels through [`CommandManager::execute`]; the
/// manager guarantees LIFO ordering and stack consistency, while each
/// command guarantees its own apply/revert correctness.
#[derive(Default)]
pub struct CommandManager {
    undo_stack: Vec<Box<dyn EditCommand>>,
    redo_stack: Vec<Box<dyn EditCommand>>,
    observers: Observers<HistoryState>,
}

impl CommandManager {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a command against the model and record it.
    ///
    /// On success the command lands on the done stack and the redo stack is
    /// cleared (no branching history). On failure the model is unchanged
    /// and the command is discarded.
    pub fn execute<C: EditCommand + 'static>(
        &mut self,
        mut command: C,
        model: &mut GeometryModel,
    ) -> Result<(), CommandError> {
        command.apply(model)?;
        log::debug!("executed: {}", command.description());

        self.undo_stack.push(Box::new(command));
        self.redo_stack.clear();
        if self.undo_stack.len() > MAX_UNDO_HISTORY {
            self.undo_stack.remove(0);
        }
        self.notify();
        Ok(())
    }

    /// Undo the most recent command.
    pub fn undo(&mut self, model: &mut GeometryModel) -> Result<(), CommandError> {
        let mut command = self.undo_stack.pop().ok_or(CommandError::NoCommandToUndo)?;
        command.revert(model);
        log::debug!("undone: {}", command.description());

        self.redo_stack.push(command);
        self.notify();
        Ok(())
    }

    /// Re-apply the most recently undone command.
    pub fn redo(&mut self, model: &mut GeometryModel) -> Result<(), CommandError> {
        let mut command = self.redo_stack.pop().ok_or(CommandError::NoCommandToRedo)?;
        match command.apply(model) {
            Ok(()) => {
                log::debug!("redone: {}", command.description());
                self.undo_stack.push(command);
                self.notify();
                Ok(())
            }
            Err(err) => {
                // Model untouched; keep the command available for retry.
                self.redo_stack.push(command);
                Err(err)
            }
        }
    }

    /// Check if undo is available.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Label of the command undo would revert.
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.last().map(|c| c.description())
    }

    /// Label of the command redo would re-apply.
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.last().map(|c| c.description())
    }

    /// Current history state, as carried by `StateChanged` notifications.
    pub fn state(&self) -> HistoryState {
        HistoryState {
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            undo_description: self.undo_description().map(str::to_string),
            redo_description: self.redo_description().map(str::to_string),
        }
    }

    /// Subscribe to `StateChanged` notifications.
    pub fn subscribe_state_changed(
        &mut self,
        handler: impl FnMut(&HistoryState) + 'static,
    ) -> SubscriberId {
        self.observers.subscribe(handler)
    }

    /// Remove a `StateChanged` subscription.
    pub fn unsubscribe_state_changed(&mut self, id: SubscriberId) -> bool {
        self.observers.unsubscribe(id)
    }

    fn notify(&mut self) {
        let state = self.state();
        self.observers.notify(&state);
    }
}

impl fmt::Debug for CommandManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandManager")
            .field("undo_stack", &self.undo_stack.len())
            .field("redo_stack", &self.redo_stack.len())
            .finish()
    }
}

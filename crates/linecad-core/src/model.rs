//! Geometry model: the arena of drawing entities.

use crate::entity::{Entity, EntityId, EntityTrait};
use kurbo::{Point, Rect};
use std::collections::HashMap;

/// Owns the mutable set of drawing entities.
///
/// Entities are addressed by stable [`EntityId`] handles so that commands
/// can refer to "the entity mutated" across undo/redo cycles. All mutation
/// goes through commands executed by the command manager; nothing else
/// writes to the model.
#[derive(Debug, Clone, Default)]
pub struct GeometryModel {
    /// All entities, keyed by ID.
    entities: HashMap<EntityId, Entity>,
    /// Draw order of entities (back to front).
    z_order: Vec<EntityId>,
}

impl GeometryModel {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity on top of the draw order.
    pub fn insert(&mut self, entity: Entity) {
        let id = entity.id();
        self.z_order.push(id);
        self.entities.insert(id, entity);
    }

    /// Add an entity at a specific draw-order position. Positions past the
    /// end append. Used when undo restores a deleted entity to its old slot.
    pub fn insert_at(&mut self, index: usize, entity: Entity) {
        let id = entity.id();
        self.z_order.insert(index.min(self.z_order.len()), id);
        self.entities.insert(id, entity);
    }

    /// Remove an entity, returning it together with its draw-order position.
    pub fn remove(&mut self, id: EntityId) -> Option<(usize, Entity)> {
        let index = self.z_order.iter().position(|&eid| eid == id)?;
        self.z_order.remove(index);
        self.entities.remove(&id).map(|entity| (index, entity))
    }

    /// Get an entity by ID.
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Get a mutable reference to an entity by ID.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Check whether an entity exists.
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Entities in draw order (back to front).
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.z_order.iter().filter_map(|id| self.entities.get(id))
    }

    /// Draw-order position of an entity.
    pub fn z_index(&self, id: EntityId) -> Option<usize> {
        self.z_order.iter().position(|&eid| eid == id)
    }

    /// Union bounding box of all entities, or `None` when the model is empty.
    pub fn bounds(&self) -> Option<Rect> {
        let mut result: Option<Rect> = None;
        for entity in self.entities.values() {
            let bounds = entity.bounds();
            result = Some(match result {
                Some(r) => r.union(bounds),
                None => bounds,
            });
        }
        result
    }

    /// Entities hit by a world point, front to back.
    pub fn entities_at_point(&self, point: Point, tolerance: f64) -> Vec<EntityId> {
        self.z_order
            .iter()
            .rev()
            .filter_map(|&id| {
                self.entities
                    .get(&id)
                    .filter(|e| e.hit_test(point, tolerance))
                    .map(|_| id)
            })
            .collect()
    }

    /// Check if the model is empty.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Get the number of entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }
}

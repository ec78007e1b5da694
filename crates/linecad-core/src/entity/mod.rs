//! Drawing entity definitions.

mod line;
mod polyline;

pub use line::Line;
pub use polyline::Polyline;

use kurbo::{Affine, Line as Segment, Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable handle for an entity, usable across undo/redo cycles.
pub type EntityId = Uuid;

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let to_point = point - a;

    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        // Segment is a point
        return to_point.hypot();
    }

    let t = (to_point.dot(seg) / len_sq).clamp(0.0, 1.0);
    let projection = a + seg * t;
    (point - projection).hypot()
}

/// Common behavior for all drawing entities.
pub trait EntityTrait {
    /// Get the unique identifier.
    fn id(&self) -> EntityId;

    /// Get the axis-aligned bounding box in world coordinates.
    fn bounds(&self) -> Rect;

    /// Check whether a world point hits the entity within a tolerance.
    fn hit_test(&self, point: Point, tolerance: f64) -> bool;

    /// Apply an affine transform to the entity's geometry.
    fn transform(&mut self, affine: Affine);
}

/// A drawing entity. Tagged variant over the concrete entity kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Entity {
    Line(Line),
    Polyline(Polyline),
}

impl Entity {
    /// Short lowercase name of the entity kind, for command descriptions.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Entity::Line(_) => "line",
            Entity::Polyline(_) => "polyline",
        }
    }

    /// Significant end vertices, scanned by endpoint snapping.
    pub fn endpoints(&self) -> Vec<Point> {
        match self {
            Entity::Line(line) => vec![line.start, line.end],
            Entity::Polyline(polyline) => polyline.points.clone(),
        }
    }

    /// Midpoints of each straight segment, scanned by midpoint snapping.
    pub fn midpoints(&self) -> Vec<Point> {
        self.segments()
            .iter()
            .map(|seg| Point::new((seg.p0.x + seg.p1.x) / 2.0, (seg.p0.y + seg.p1.y) / 2.0))
            .collect()
    }

    /// The entity's straight segments, used for intersection snapping and
    /// hit testing.
    pub fn segments(&self) -> Vec<Segment> {
        match self {
            Entity::Line(line) => vec![line.as_segment()],
            Entity::Polyline(polyline) => polyline.segments(),
        }
    }
}

impl EntityTrait for Entity {
    fn id(&self) -> EntityId {
        match self {
            Entity::Line(line) => line.id(),
            Entity::Polyline(polyline) => polyline.id(),
        }
    }

    fn bounds(&self) -> Rect {
        match self {
            Entity::Line(line) => line.bounds(),
            Entity::Polyline(polyline) => polyline.bounds(),
        }
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        match self {
            Entity::Line(line) => line.hit_test(point, tolerance),
            Entity::Polyline(polyline) => polyline.hit_test(point, tolerance),
        }
    }

    fn transform(&mut self, affine: Affine) {
        match self {
            Entity::Line(line) => line.transform(affine),
            Entity::Polyline(polyline) => polyline.transform(affine),
        }
    }
}

//! Object snapping: adjusting raw pointer coordinates to geometrically
//! significant points before a command commits them.

use crate::entity::{Entity, EntityId, EntityTrait};
use crate::model::GeometryModel;
use kurbo::{Line as Segment, Point};
use serde::{Deserialize, Serialize};

/// Default grid spacing for grid-point snapping, in world units.
pub const GRID_SIZE: f64 = 20.0;

/// Kind of point a snap resolved to.
///
/// When several candidates fall within tolerance the earlier kind wins;
/// within a kind, the nearest candidate wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SnapKind {
    /// Nothing qualified; the raw point is returned unchanged.
    #[default]
    None,
    /// Vertex of an entity.
    Endpoint,
    /// Midpoint of a straight segment.
    Midpoint,
    /// Crossing of two segments, from different entities or within one
    /// self-intersecting chain.
    Intersection,
    /// Grid intersection.
    GridPoint,
}

impl SnapKind {
    /// Tie-break rank; lower wins.
    fn rank(self) -> u8 {
        match self {
            SnapKind::Endpoint => 0,
            SnapKind::Midpoint => 1,
            SnapKind::Intersection => 2,
            SnapKind::GridPoint => 3,
            SnapKind::None => u8::MAX,
        }
    }
}

/// Result of a snap query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapResult {
    /// The snapped point, or the raw point when nothing qualified.
    pub point: Point,
    /// What the point snapped to.
    pub kind: SnapKind,
    /// Entity that produced the snap, when a single entity did.
    pub entity: Option<EntityId>,
}

impl SnapResult {
    /// A result that leaves the raw point unchanged.
    pub fn miss(point: Point) -> Self {
        Self {
            point,
            kind: SnapKind::None,
            entity: None,
        }
    }

    /// Check whether the point was adjusted.
    pub fn is_snapped(&self) -> bool {
        self.kind != SnapKind::None
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    point: Point,
    kind: SnapKind,
    entity: Option<EntityId>,
    dist: f64,
}

/// Scans entity geometry for snap targets near a raw pointer position.
///
/// The service itself is always willing to snap; whether it gets called at
/// all is the mode's (or coordinator's) decision.
#[derive(Debug, Clone)]
pub struct SnapService {
    /// Grid spacing in world units.
    pub grid_size: f64,
    /// Whether grid intersections participate as candidates.
    pub grid_enabled: bool,
}

impl Default for SnapService {
    fn default() -> Self {
        Self {
            grid_size: GRID_SIZE,
            grid_enabled: false,
        }
    }
}

impl SnapService {
    /// Create a snap service with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Find the best snap target within `tolerance` of `raw`.
    ///
    /// `tolerance` is a world distance; callers derive it from a screen
    /// distance via `Camera::world_tolerance` so snapping feels the same at
    /// every zoom level. Returns a [`SnapKind::None`] result with the raw
    /// point unchanged when nothing qualifies.
    pub fn try_snap(&self, raw: Point, model: &GeometryModel, tolerance: f64) -> SnapResult {
        let mut candidates: Vec<Candidate> = Vec::new();

        for entity in model.iter() {
            let id = Some(entity.id());
            for point in entity.endpoints() {
                push_within(&mut candidates, raw, point, SnapKind::Endpoint, id, tolerance);
            }
            for point in entity.midpoints() {
                push_within(&mut candidates, raw, point, SnapKind::Midpoint, id, tolerance);
            }
        }

        self.collect_intersections(&mut candidates, raw, model, tolerance);

        if self.grid_enabled {
            let grid = Point::new(
                (raw.x / self.grid_size).round() * self.grid_size,
                (raw.y / self.grid_size).round() * self.grid_size,
            );
            push_within(&mut candidates, raw, grid, SnapKind::GridPoint, None, tolerance);
        }

        match candidates.iter().min_by(|a, b| {
            (a.kind.rank(), a.dist)
                .partial_cmp(&(b.kind.rank(), b.dist))
                .unwrap_or(std::cmp::Ordering::Equal)
        }) {
            Some(best) => SnapResult {
                point: best.point,
                kind: best.kind,
                entity: best.entity,
            },
            None => SnapResult::miss(raw),
        }
    }

    /// Pairwise segment crossings, between distinct entities and within a
    /// single self-intersecting chain.
    fn collect_intersections(
        &self,
        candidates: &mut Vec<Candidate>,
        raw: Point,
        model: &GeometryModel,
        tolerance: f64,
    ) {
        let entities: Vec<&Entity> = model.iter().collect();
        let segments: Vec<Vec<Segment>> = entities.iter().map(|e| e.segments()).collect();

        for (i, segs) in segments.iter().enumerate() {
            // Own crossings; adjacent segments only share a vertex, which
            // endpoint snapping already covers.
            for a in 0..segs.len() {
                for b in (a + 2)..segs.len() {
                    if let Some(point) = segment_intersection(segs[a], segs[b]) {
                        push_within(
                            candidates,
                            raw,
                            point,
                            SnapKind::Intersection,
                            Some(entities[i].id()),
                            tolerance,
                        );
                    }
                }
            }

            for other in &segments[i + 1..] {
                for &seg_a in segs {
                    for &seg_b in other {
                        if let Some(point) = segment_intersection(seg_a, seg_b) {
                            push_within(
                                candidates,
                                raw,
                                point,
                                SnapKind::Intersection,
                                None,
                                tolerance,
                            );
                        }
                    }
                }
            }
        }
    }
}

fn push_within(
    candidates: &mut Vec<Candidate>,
    raw: Point,
    point: Point,
    kind: SnapKind,
    entity: Option<EntityId>,
    tolerance: f64,
) {
    let dist = (point - raw).hypot();
    if dist <= tolerance {
        candidates.push(Candidate {
            point,
            kind,
            entity,
            dist,
        });
    }
}

/// Intersection point of two segments, if they cross within their extents.
fn segment_intersection(a: Segment, b: Segment) -> Option<Point> {
    let da = a.p1 - a.p0;
    let db = b.p1 - b.p0;

    let cross = da.x * db.y - da.y * db.x;
    if cross.abs() < f64::EPSILON {
        // Parallel or degenerate
        return None;
    }

    let d = b.p0 - a.p0;
    let ta = (d.x * db.y - d.y * db.x) / cross;
    let tb = (d.x * da.y - d.y * da.x) / cross;

    if (0.0..=1.0).contains(&ta) && (0.0..=1.0).contains(&tb) {
        Some(a.p0 + da * ta)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Line, Polyline};

    fn model_with(entities: Vec<Entity>) -> GeometryModel {
        let mut model = GeometryModel::new();
        for entity in entities {
            model.insert(entity);
        }
        model
    }

    fn line(x0: f64, y0: f64, x1: f64, y1: f64) -> Entity {
        Entity::Line(Line::new(Point::new(x0, y0), Point::new(x1, y1)))
    }

    #[test]
    fn test_miss_beyond_tolerance() {
        let model = model_with(vec![line(0.0, 0.0, 100.0, 0.0)]);
        let service = SnapService::new();

        let raw = Point::new(50.0, 30.0);
        let result = service.try_snap(raw, &model, 5.0);

        assert_eq!(result.kind, SnapKind::None);
        assert_eq!(result.point, raw);
        assert!(result.entity.is_none());
    }

    #[test]
    fn test_endpoint_snap() {
        let entity = line(0.0, 0.0, 100.0, 0.0);
        let id = entity.id();
        let model = model_with(vec![entity]);
        let service = SnapService::new();

        let result = service.try_snap(Point::new(98.0, 1.0), &model, 5.0);

        assert_eq!(result.kind, SnapKind::Endpoint);
        assert_eq!(result.point, Point::new(100.0, 0.0));
        assert_eq!(result.entity, Some(id));
    }

    #[test]
    fn test_midpoint_snap() {
        let model = model_with(vec![line(0.0, 0.0, 100.0, 0.0)]);
        let service = SnapService::new();

        let result = service.try_snap(Point::new(51.0, 2.0), &model, 5.0);

        assert_eq!(result.kind, SnapKind::Midpoint);
        assert_eq!(result.point, Point::new(50.0, 0.0));
    }

    #[test]
    fn test_intersection_snap() {
        // Crossing at (5, 5); neither line has an endpoint or midpoint there.
        let model = model_with(vec![
            line(0.0, 0.0, 20.0, 20.0),
            line(2.0, 8.0, 14.0, -4.0),
        ]);
        let service = SnapService::new();

        let result = service.try_snap(Point::new(5.4, 4.7), &model, 2.0);

        assert_eq!(result.kind, SnapKind::Intersection);
        assert!((result.point.x - 5.0).abs() < 1e-9);
        assert!((result.point.y - 5.0).abs() < 1e-9);
        assert!(result.entity.is_none());
    }

    #[test]
    fn test_self_intersection_snap() {
        let polyline = Entity::Polyline(Polyline::new(vec![
            Point::new(0.0, 0.0),
            Point::new(12.0, 6.0),
            Point::new(12.0, 0.0),
            Point::new(0.0, 4.0),
        ]));
        let id = polyline.id();
        let model = model_with(vec![polyline]);
        let service = SnapService::new();

        // First and last segments cross at (4.8, 2.4)
        let result = service.try_snap(Point::new(4.9, 2.4), &model, 1.0);

        assert_eq!(result.kind, SnapKind::Intersection);
        assert!((result.point.x - 4.8).abs() < 1e-9);
        assert!((result.point.y - 2.4).abs() < 1e-9);
        assert_eq!(result.entity, Some(id));
    }

    #[test]
    fn test_endpoint_beats_nearer_midpoint() {
        // Midpoint at x=50 is closer to the query than the endpoint at x=47,
        // but endpoints rank higher.
        let model = model_with(vec![
            line(0.0, 0.0, 100.0, 0.0),
            line(47.0, 0.5, 47.0, 40.0),
        ]);
        let service = SnapService::new();

        let result = service.try_snap(Point::new(49.5, 0.0), &model, 5.0);

        assert_eq!(result.kind, SnapKind::Endpoint);
        assert_eq!(result.point, Point::new(47.0, 0.5));
    }

    #[test]
    fn test_nearest_wins_within_same_kind() {
        let model = model_with(vec![line(0.0, 0.0, 10.0, 0.0)]);
        let service = SnapService::new();

        let result = service.try_snap(Point::new(8.0, 0.0), &model, 20.0);

        assert_eq!(result.kind, SnapKind::Endpoint);
        assert_eq!(result.point, Point::new(10.0, 0.0));
    }

    #[test]
    fn test_grid_snap_when_enabled() {
        let model = GeometryModel::new();
        let mut service = SnapService::new();

        let raw = Point::new(38.0, 41.5);
        assert!(!service.try_snap(raw, &model, 5.0).is_snapped());

        service.grid_enabled = true;
        let result = service.try_snap(raw, &model, 5.0);
        assert_eq!(result.kind, SnapKind::GridPoint);
        assert_eq!(result.point, Point::new(40.0, 40.0));
    }

    #[test]
    fn test_grid_ranks_below_entity_snaps() {
        let model = model_with(vec![line(41.0, 40.0, 140.0, 40.0)]);
        let mut service = SnapService::new();
        service.grid_enabled = true;

        // Grid point (40, 40) is closer than the endpoint (41, 40).
        let result = service.try_snap(Point::new(39.8, 40.0), &model, 5.0);

        assert_eq!(result.kind, SnapKind::Endpoint);
        assert_eq!(result.point, Point::new(41.0, 40.0));
    }

    #[test]
    fn test_polyline_vertices_are_endpoints() {
        let polyline = Entity::Polyline(Polyline::new(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
        ]));
        let model = model_with(vec![polyline]);
        let service = SnapService::new();

        // Interior vertex snaps as an endpoint
        let result = service.try_snap(Point::new(9.0, 1.0), &model, 3.0);
        assert_eq!(result.kind, SnapKind::Endpoint);
        assert_eq!(result.point, Point::new(10.0, 0.0));
    }

    #[test]
    fn test_parallel_segments_do_not_intersect() {
        assert!(segment_intersection(
            Segment::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0)),
            Segment::new(Point::new(0.0, 5.0), Point::new(10.0, 5.0)),
        )
        .is_none());
    }

    #[test]
    fn test_crossing_outside_extents_does_not_intersect() {
        assert!(segment_intersection(
            Segment::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0)),
            Segment::new(Point::new(20.0, -5.0), Point::new(20.0, 5.0)),
        )
        .is_none());
    }
}

//! Polyline entity.

use super::{point_to_segment_dist, EntityId, EntityTrait};
use kurbo::{Affine, Line as Segment, Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An open chain of straight segments through a list of vertices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Polyline {
    pub(crate) id: EntityId,
    /// Vertices in drawing order. A meaningful polyline has at least two.
    pub points: Vec<Point>,
}

impl Polyline {
    /// Create a polyline from vertices.
    pub fn new(points: Vec<Point>) -> Self {
        Self {
            id: Uuid::new_v4(),
            points,
        }
    }

    /// Number of straight segments in the chain.
    pub fn segment_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    /// The chain's segments, in drawing order.
    pub fn segments(&self) -> Vec<Segment> {
        self.points
            .windows(2)
            .map(|pair| Segment::new(pair[0], pair[1]))
            .collect()
    }

    /// Total length along the chain.
    pub fn length(&self) -> f64 {
        self.points
            .windows(2)
            .map(|pair| (pair[1] - pair[0]).hypot())
            .sum()
    }
}

impl EntityTrait for Polyline {
    fn id(&self) -> EntityId {
        self.id
    }

    fn bounds(&self) -> Rect {
        if self.points.is_empty() {
            return Rect::ZERO;
        }
        let (min_x, max_x) = self.points.iter().fold((f64::MAX, f64::MIN), |(mn, mx), p| {
            (mn.min(p.x), mx.max(p.x))
        });
        let (min_y, max_y) = self.points.iter().fold((f64::MAX, f64::MIN), |(mn, mx), p| {
            (mn.min(p.y), mx.max(p.y))
        });
        Rect::new(min_x, min_y, max_x, max_y)
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        if self.points.len() == 1 {
            return (point - self.points[0]).hypot() <= tolerance;
        }
        self.points
            .windows(2)
            .any(|pair| point_to_segment_dist(point, pair[0], pair[1]) <= tolerance)
    }

    fn transform(&mut self, affine: Affine) {
        for point in &mut self.points {
            *point = affine * *point;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l_shape() -> Polyline {
        Polyline::new(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 20.0),
        ])
    }

    #[test]
    fn test_segment_count() {
        assert_eq!(l_shape().segment_count(), 2);
        assert_eq!(Polyline::new(Vec::new()).segment_count(), 0);
    }

    #[test]
    fn test_length() {
        assert!((l_shape().length() - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bounds() {
        let bounds = l_shape().bounds();
        assert_eq!(bounds, Rect::new(0.0, 0.0, 10.0, 20.0));
    }

    #[test]
    fn test_hit_test() {
        let polyline = l_shape();
        assert!(polyline.hit_test(Point::new(5.0, 0.5), 1.0));
        assert!(polyline.hit_test(Point::new(10.0, 15.0), 1.0));
        assert!(!polyline.hit_test(Point::new(5.0, 10.0), 1.0));
    }

    #[test]
    fn test_transform_translation() {
        let mut polyline = l_shape();
        polyline.transform(Affine::translate(kurbo::Vec2::new(1.0, 2.0)));
        assert_eq!(polyline.points[0], Point::new(1.0, 2.0));
        assert_eq!(polyline.points[2], Point::new(11.0, 22.0));
    }
}

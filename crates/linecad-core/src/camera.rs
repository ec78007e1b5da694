//! Camera module for the world/screen viewport transform.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fixed factor applied to the scale on zoom-in.
pub const ZOOM_IN_FACTOR: f64 = 0.8;

/// Fixed factor applied to the scale on zoom-out.
///
/// Deliberately not the exact reciprocal of [`ZOOM_IN_FACTOR`]; repeated
/// in/out pairs drift slightly.
pub const ZOOM_OUT_FACTOR: f64 = 1.25;

/// Margin added around content bounds by [`Camera::zoom_to_fit`] (10% per
/// dimension).
const FIT_MARGIN: f64 = 0.10;

/// Minimum extent, per axis, a fit target is floored to. Keeps single-point
/// and zero-width bounds from dividing by zero.
const MIN_FIT_EXTENT: f64 = 1.0;

/// Camera errors.
#[derive(Debug, Error, PartialEq)]
pub enum CameraError {
    #[error("invalid zoom factor {0}: resulting scale must be positive and finite")]
    InvalidZoomFactor(f64),
    #[error("invalid scale {0}: must be positive and finite")]
    InvalidScale(f64),
}

/// Camera manages the view transform for the canvas.
///
/// It maps between world (drawing) coordinates and screen (device)
/// coordinates. The world `center` always lands at the midpoint of the
/// viewport; `scale` is screen units per world unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    /// World point shown at the center of the viewport.
    pub center: Point,
    /// Screen units per world unit. Always positive and finite.
    scale: f64,
    /// Viewport size in device units.
    viewport: Size,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            center: Point::ZERO,
            scale: 1.0,
            viewport: Size::new(800.0, 600.0),
        }
    }
}

impl Camera {
    /// Create a camera with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current scale (screen units per world unit).
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Set the scale directly, e.g. when restoring a saved view.
    ///
    /// Rejected (prior state retained) if the scale is non-positive or
    /// non-finite.
    pub fn set_scale(&mut self, scale: f64) -> Result<(), CameraError> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(CameraError::InvalidScale(scale));
        }
        self.scale = scale;
        Ok(())
    }

    /// Current viewport size in device units.
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Update the viewport size. Scale and center are untouched; callers
    /// re-fit explicitly if they want the content to follow.
    pub fn set_viewport_size(&mut self, size: Size) {
        self.viewport = size;
    }

    /// Get the affine transform from world to screen coordinates.
    pub fn transform(&self) -> Affine {
        Affine::translate(Vec2::new(
            self.viewport.width / 2.0,
            self.viewport.height / 2.0,
        )) * Affine::scale(self.scale)
            * Affine::translate(-self.center.to_vec2())
    }

    /// Get the inverse transform, from screen to world coordinates.
    pub fn inverse_transform(&self) -> Affine {
        Affine::translate(self.center.to_vec2())
            * Affine::scale(1.0 / self.scale)
            * Affine::translate(Vec2::new(
                -self.viewport.width / 2.0,
                -self.viewport.height / 2.0,
            ))
    }

    /// Convert a world point to screen coordinates.
    pub fn world_to_screen(&self, world_point: Point) -> Point {
        self.transform() * world_point
    }

    /// Convert a screen point to world coordinates.
    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    /// Convert a screen distance to a world distance at the current zoom.
    ///
    /// Snap and pick tolerances are specified in screen pixels so they feel
    /// constant regardless of zoom; this is the conversion they go through.
    pub fn world_tolerance(&self, screen_distance: f64) -> f64 {
        screen_distance / self.scale
    }

    /// Pan the view by a delta in screen coordinates.
    pub fn pan(&mut self, delta: Vec2) {
        self.center -= delta / self.scale;
    }

    /// Zoom in by the fixed step factor.
    pub fn zoom_in(&mut self) {
        self.scale *= ZOOM_IN_FACTOR;
    }

    /// Zoom out by the fixed step factor.
    pub fn zoom_out(&mut self) {
        self.scale *= ZOOM_OUT_FACTOR;
    }

    /// Multiply the scale by an arbitrary factor.
    ///
    /// Rejected (prior state retained) if the resulting scale would be
    /// non-positive or non-finite.
    pub fn zoom_by(&mut self, factor: f64) -> Result<(), CameraError> {
        let next = self.scale * factor;
        if !next.is_finite() || next <= 0.0 {
            return Err(CameraError::InvalidZoomFactor(factor));
        }
        self.scale = next;
        Ok(())
    }

    /// Fit the view to the given content bounds.
    ///
    /// `None` means there is no content; the camera is left unchanged.
    /// Degenerate bounds (a single point, a horizontal or vertical line) are
    /// floored to a minimum extent before the fit is computed.
    pub fn zoom_to_fit(&mut self, bounds: Option<Rect>) {
        let Some(bounds) = bounds else {
            return;
        };

        let width = bounds.width().max(MIN_FIT_EXTENT);
        let height = bounds.height().max(MIN_FIT_EXTENT);
        let fitted_width = width * (1.0 + FIT_MARGIN);
        let fitted_height = height * (1.0 + FIT_MARGIN);

        self.scale = (self.viewport.width / fitted_width)
            .min(self.viewport.height / fitted_height);
        self.center = bounds.center();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_camera() {
        let camera = Camera::new();
        assert_eq!(camera.center, Point::ZERO);
        assert!((camera.scale() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_center_maps_to_viewport_midpoint() {
        let mut camera = Camera::new();
        camera.center = Point::new(37.0, -12.0);
        let screen = camera.world_to_screen(camera.center);
        assert!((screen.x - 400.0).abs() < 1e-10);
        assert!((screen.y - 300.0).abs() < 1e-10);
    }

    #[test]
    fn test_roundtrip_conversion() {
        let mut camera = Camera::new();
        camera.center = Point::new(30.0, -20.0);
        camera.zoom_by(1.5).unwrap();

        let original = Point::new(123.0, 456.0);
        let back = camera.screen_to_world(camera.world_to_screen(original));

        assert!((back.x - original.x).abs() < 1e-9);
        assert!((back.y - original.y).abs() < 1e-9);
    }

    #[test]
    fn test_roundtrip_after_pan_and_zoom_steps() {
        let mut camera = Camera::new();
        camera.pan(Vec2::new(-55.0, 260.0));
        camera.zoom_in();
        camera.zoom_in();
        camera.zoom_out();

        let original = Point::new(-3.25, 9999.5);
        let back = camera.screen_to_world(camera.world_to_screen(original));

        assert!((back.x - original.x).abs() < 1e-6);
        assert!((back.y - original.y).abs() < 1e-6);
    }

    #[test]
    fn test_zoom_steps_are_not_reciprocal() {
        let mut camera = Camera::new();
        camera.zoom_in();
        camera.zoom_out();
        // 0.8 * 1.25 happens to be exactly 1.0 in binary; the factors are
        // still applied independently rather than paired.
        assert!((camera.scale() - 1.0).abs() < 1e-12);

        camera.zoom_in();
        assert!((camera.scale() - 0.8).abs() < 1e-12);
        camera.zoom_out();
        camera.zoom_out();
        assert!((camera.scale() - 1.25).abs() < 1e-12);
    }

    #[test]
    fn test_zoom_by_rejects_invalid_factor() {
        let mut camera = Camera::new();
        let before = camera.scale();

        assert_eq!(
            camera.zoom_by(0.0),
            Err(CameraError::InvalidZoomFactor(0.0))
        );
        assert_eq!(
            camera.zoom_by(-2.0),
            Err(CameraError::InvalidZoomFactor(-2.0))
        );
        assert!(camera.zoom_by(f64::NAN).is_err());
        assert!(camera.zoom_by(f64::INFINITY).is_err());

        assert!((camera.scale() - before).abs() < f64::EPSILON);
    }

    #[test]
    fn test_set_scale_validates() {
        let mut camera = Camera::new();

        camera.set_scale(2.5).unwrap();
        assert!((camera.scale() - 2.5).abs() < f64::EPSILON);

        assert_eq!(camera.set_scale(0.0), Err(CameraError::InvalidScale(0.0)));
        assert_eq!(camera.set_scale(-1.0), Err(CameraError::InvalidScale(-1.0)));
        assert!(camera.set_scale(f64::NAN).is_err());
        assert!((camera.scale() - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_pan_moves_world_under_cursor() {
        let mut camera = Camera::new();
        let before = camera.screen_to_world(Point::new(400.0, 300.0));
        camera.pan(Vec2::new(100.0, 0.0));
        let after = camera.screen_to_world(Point::new(400.0, 300.0));
        // Dragging the view right by 100px shows world 100 units further left.
        assert!((after.x - (before.x - 100.0)).abs() < 1e-10);
        assert!((after.y - before.y).abs() < 1e-10);
    }

    #[test]
    fn test_zoom_to_fit_scenario() {
        let mut camera = Camera::new();
        camera.set_viewport_size(Size::new(800.0, 600.0));
        camera.zoom_to_fit(Some(Rect::new(0.0, 0.0, 100.0, 50.0)));

        let expected = (800.0_f64 / (100.0 * 1.1)).min(600.0 / (50.0 * 1.1));
        assert!((camera.scale() - expected).abs() < 1e-12);
        assert!((camera.center.x - 50.0).abs() < f64::EPSILON);
        assert!((camera.center.y - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zoom_to_fit_no_content_is_noop() {
        let mut camera = Camera::new();
        camera.center = Point::new(5.0, 6.0);
        camera.zoom_by(3.0).unwrap();
        let (center, scale) = (camera.center, camera.scale());

        camera.zoom_to_fit(None);

        assert_eq!(camera.center, center);
        assert!((camera.scale() - scale).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zoom_to_fit_single_point_bounds() {
        let mut camera = Camera::new();
        let point = Point::new(42.0, 17.0);
        camera.zoom_to_fit(Some(Rect::from_points(point, point)));

        assert!(camera.scale().is_finite());
        assert!(camera.scale() > 0.0);
        assert_eq!(camera.center, point);
    }

    #[test]
    fn test_viewport_resize_does_not_refit() {
        let mut camera = Camera::new();
        camera.zoom_to_fit(Some(Rect::new(0.0, 0.0, 100.0, 50.0)));
        let (center, scale) = (camera.center, camera.scale());

        camera.set_viewport_size(Size::new(1920.0, 1080.0));

        assert_eq!(camera.center, center);
        assert!((camera.scale() - scale).abs() < f64::EPSILON);
        assert_eq!(camera.viewport(), Size::new(1920.0, 1080.0));
    }

    #[test]
    fn test_world_tolerance_scales_with_zoom() {
        let mut camera = Camera::new();
        assert!((camera.world_tolerance(8.0) - 8.0).abs() < f64::EPSILON);
        camera.zoom_by(2.0).unwrap();
        assert!((camera.world_tolerance(8.0) - 4.0).abs() < f64::EPSILON);
    }
}

use crate::{Ray, Vec3};

/// Narrowest field of view reachable by [`Camera::zoom`], in degrees.
pub const MIN_FOV: f32 = 10.0;
/// Widest field of view reachable by [`Camera::zoom`], in degrees.
pub const MAX_FOV: f32 = 120.0;
/// Degrees of field of view per scroll unit.
const ZOOM_STEP: f32 = 2.0;
/// Pitch limit keeping the view direction away from the world up axis.
const MAX_PITCH: f32 = 89.0;

/// Pinhole camera in a Z-up world.
///
/// The image plane sits one unit in front of `position`; pixel coordinates
/// passed to [`Camera::ray`] may be fractional for anti-aliasing, with (0, 0)
/// at the top-left corner of the image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    /// Unit view direction
    pub direction: Vec3,
    /// Vertical field of view in degrees
    pub fov: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            direction: Vec3::Y,
            fov: 60.0,
        }
    }
}

impl Camera {
    /// Create a camera. `direction` is normalized; callers validate that it
    /// is not zero.
    pub fn new(position: Vec3, direction: Vec3, fov: f32) -> Self {
        Self {
            position,
            direction: direction.normalize(),
            fov,
        }
    }

    /// Right and up vectors of the image plane.
    pub fn basis(&self) -> (Vec3, Vec3) {
        let right = self
            .direction
            .cross(Vec3::Z)
            .try_normalize()
            .unwrap_or(Vec3::X);
        let up = right.cross(self.direction).normalize();
        (right, up)
    }

    /// Generate the primary ray through image position (`px`, `py`).
    pub fn ray(&self, px: f32, py: f32, width: u32, height: u32) -> Ray {
        let w = width as f32;
        let h = height as f32;

        let u = px / w;
        let v = py / h;

        let half_height = (self.fov.to_radians() * 0.5).tan();
        let half_width = (w / h) * half_height;

        let (right, up) = self.basis();

        let x = (2.0 * u - 1.0) * half_width;
        let y = (1.0 - 2.0 * v) * half_height;

        let direction = (self.direction + right * x + up * y).normalize();
        Ray::new(self.position, direction)
    }

    /// Move the camera in its own frame: x along right, y along the view
    /// direction, z along world up.
    pub fn translate_local(&mut self, delta: Vec3) {
        let (right, _) = self.basis();
        self.position += right * delta.x + self.direction * delta.y + Vec3::Z * delta.z;
    }

    /// Yaw about world Z by `-dx * sensitivity` and pitch by `-dy * sensitivity`
    /// (radians per input unit). Pitch is clamped short of straight up/down.
    pub fn rotate_euler(&mut self, dx: f32, dy: f32, sensitivity: f32) {
        let d = self.direction;
        let yaw = d.y.atan2(d.x) - dx * sensitivity;
        let limit = MAX_PITCH.to_radians();
        let pitch = (d.z.clamp(-1.0, 1.0).asin() - dy * sensitivity).clamp(-limit, limit);

        self.direction = Vec3::new(
            pitch.cos() * yaw.cos(),
            pitch.cos() * yaw.sin(),
            pitch.sin(),
        );
    }

    /// Positive scroll narrows the field of view (zoom in).
    pub fn zoom(&mut self, scroll: f32) {
        self.fov = (self.fov - scroll * ZOOM_STEP).clamp(MIN_FOV, MAX_FOV);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_camera_center_ray() {
        let camera = Camera::new(Vec3::ZERO, Vec3::Y, 90.0);
        let ray = camera.ray(50.0, 50.0, 100, 100);
        assert_eq!(ray.origin, Vec3::ZERO);
        assert!(approx(ray.direction, Vec3::Y));
    }

    #[test]
    fn test_camera_corner_rays() {
        let camera = Camera::new(Vec3::ZERO, Vec3::Y, 90.0);

        // Top-left pixel corner points up and to the left
        let ray = camera.ray(0.0, 0.0, 100, 100);
        assert!(ray.direction.x < 0.0);
        assert!(ray.direction.z > 0.0);

        // Bottom-right points down and to the right
        let ray = camera.ray(100.0, 100.0, 100, 100);
        assert!(ray.direction.x > 0.0);
        assert!(ray.direction.z < 0.0);
    }

    #[test]
    fn test_camera_basis_looking_straight_up() {
        let camera = Camera::new(Vec3::ZERO, Vec3::Z, 60.0);
        let (right, up) = camera.basis();
        assert!(right.is_finite() && up.is_finite());
        assert!((right.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_camera_translate_local() {
        let mut camera = Camera::new(Vec3::ZERO, Vec3::Y, 60.0);
        camera.translate_local(Vec3::new(0.0, 2.0, 1.0));
        assert!(approx(camera.position, Vec3::new(0.0, 2.0, 1.0)));

        camera.translate_local(Vec3::new(1.0, 0.0, 0.0));
        // Right of +Y in a Z-up world is +X
        assert!(approx(camera.position, Vec3::new(1.0, 2.0, 1.0)));
    }

    #[test]
    fn test_camera_rotate_clamps_pitch() {
        let mut camera = Camera::new(Vec3::ZERO, Vec3::Y, 60.0);
        camera.rotate_euler(0.0, -1000.0, 0.01);
        assert!(camera.direction.z < 1.0);
        assert!((camera.direction.length() - 1.0).abs() < 1e-5);
        let pitch = camera.direction.z.asin().to_degrees();
        assert!((pitch - MAX_PITCH).abs() < 1e-2);
    }

    #[test]
    fn test_camera_yaw() {
        let mut camera = Camera::new(Vec3::ZERO, Vec3::X, 60.0);
        camera.rotate_euler(-std::f32::consts::FRAC_PI_2, 0.0, 1.0);
        assert!(approx(camera.direction, Vec3::Y));
    }

    #[test]
    fn test_camera_zoom_clamps() {
        let mut camera = Camera::new(Vec3::ZERO, Vec3::Y, 60.0);
        camera.zoom(5.0);
        assert_eq!(camera.fov, 50.0);
        camera.zoom(1000.0);
        assert_eq!(camera.fov, MIN_FOV);
        camera.zoom(-1000.0);
        assert_eq!(camera.fov, MAX_FOV);
    }
}

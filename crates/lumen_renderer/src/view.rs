//! View window derivation and primary ray generation.

use lumen_core::Camera;
use lumen_math::{Ray, Vec3};

/// The camera's window into the scene, fixed for one render call.
///
/// The window is a rectangle `aspect` units wide and one unit tall,
/// placed `perspective = aspect / (2 * tan(fov / 2))` units in front of
/// the eye, which makes `fov` the horizontal field of view. Primary
/// rays originate on the window and travel away from the eye.
#[derive(Debug, Clone, Copy)]
pub struct ViewWindow {
    eye: Vec3,
    /// Top-left corner of the window
    origin: Vec3,
    /// Per-pixel step along a row
    dx: Vec3,
    /// Per-pixel step down a column
    dy: Vec3,
}

impl ViewWindow {
    /// Derive the window for `camera` at the given output size and
    /// horizontal field of view (degrees).
    pub fn new(camera: &Camera, width: u32, height: u32, fov: f32) -> Self {
        let eye = camera.origin();
        let aspect = width as f32 / height as f32;
        let perspective = aspect / (2.0 * (fov.to_radians() / 2.0).tan());

        // Orthonormal basis: forward, then right and up from the world
        // up axis (+Z), falling back to +Y for views along Z
        let forward = (camera.target() - eye).normalize();
        let mut up = Vec3::Z;
        if forward.cross(up).length_squared() < f32::EPSILON {
            up = Vec3::Y;
        }
        let right = forward.cross(up).normalize();
        let up = right.cross(forward).normalize();

        // Roll rotates the window basis about the view axis
        let roll = camera.roll().to_radians();
        let (sin_r, cos_r) = roll.sin_cos();
        let right_r = cos_r * right + sin_r * up;
        let up_r = -sin_r * right + cos_r * up;

        let center = eye + perspective * forward;
        let origin = center - 0.5 * aspect * right_r + 0.5 * up_r;

        Self {
            eye,
            origin,
            dx: aspect * right_r / width as f32,
            dy: -up_r / height as f32,
        }
    }

    /// Primary ray through window coordinates (x, y), measured in
    /// pixels from the top-left corner. Fractional coordinates land
    /// inside a pixel, which is how jittered sampling addresses it.
    pub fn ray_through(&self, x: f32, y: f32) -> Ray {
        let point = self.origin + x * self.dx + y * self.dy;
        Ray::new(point, (point - self.eye).normalize())
    }
}

//! Camera scene entity.

use lumen_math::Vec3;

use crate::primitive::GeometryError;

/// The eye of the scene: a position, a look-at target, and a roll angle.
///
/// The camera itself is pure scene data. The renderer derives the view
/// window (basis vectors, pixel spans) from it at render time, so the
/// world stays immutable while a render is in flight.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    origin: Vec3,
    target: Vec3,
    /// Rotation of the up vector about the view axis, in degrees
    roll: f32,
}

impl Camera {
    /// Create a new camera.
    ///
    /// Fails if `origin` and `target` coincide, since no view direction
    /// can be derived from them.
    pub fn new(origin: Vec3, target: Vec3, roll: f32) -> Result<Self, GeometryError> {
        if (target - origin).length_squared() < f32::EPSILON {
            return Err(GeometryError::DegenerateCamera);
        }
        Ok(Self {
            origin,
            target,
            roll,
        })
    }

    /// Eye position.
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Look-at point.
    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Roll angle in degrees.
    pub fn roll(&self) -> f32 {
        self.roll
    }
}

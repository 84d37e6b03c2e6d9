//! Primitive trait and hit record for ray-surface intersection.

use std::sync::Arc;

use lumen_math::{Interval, Ray, Vec3};
use thiserror::Error;

use crate::texture::{Color, Texture};

/// Parametric distances at or below this value are treated as
/// self-intersection and rejected.
pub const RAY_EPSILON: f32 = 1e-4;

/// Errors raised when constructing a malformed scene entity.
#[derive(Error, Debug, PartialEq)]
pub enum GeometryError {
    #[error("zero-length {0} vector")]
    ZeroVector(&'static str),

    #[error("radius must be positive, got {0}")]
    NonPositiveRadius(f32),

    #[error("camera origin and target coincide")]
    DegenerateCamera,
}

/// Record of the nearest ray-surface intersection.
pub struct Hit<'a> {
    /// Parametric distance along the ray
    pub t: f32,
    /// Point of intersection
    pub point: Vec3,
    /// Surface normal at the intersection point
    pub normal: Vec3,
    /// The intersected primitive
    pub primitive: &'a dyn Primitive,
}

/// A renderable surface: a plane, sphere, or cylinder with a texture
/// and a reflection coefficient.
///
/// All methods assume the ray direction is unit length.
pub trait Primitive: Send + Sync {
    /// Smallest parametric distance within `range` at which the ray
    /// meets the surface, or None.
    fn intersect(&self, ray: &Ray, range: Interval) -> Option<f32>;

    /// Surface normal at a point on the surface.
    fn normal_at(&self, point: Vec3) -> Vec3;

    /// Texture coordinates for a point on the surface.
    fn texture_coords(&self, point: Vec3, normal: Vec3) -> (f32, f32);

    /// The texture bound to this primitive.
    fn texture(&self) -> &Arc<Texture>;

    /// Fraction of the shaded color contributed by a mirror bounce.
    fn reflect(&self) -> f32;

    /// Whether this primitive occludes light. Planes do not; everything
    /// else does.
    fn casts_shadow(&self) -> bool {
        true
    }

    /// Sample the bound texture at a surface point.
    fn color_at(&self, point: Vec3, normal: Vec3) -> Color {
        let (u, v) = self.texture_coords(point, normal);
        self.texture().sample(u, v)
    }
}

/// Normalize a vector supplied by a caller, rejecting zero-length input.
pub(crate) fn unit_or_err(v: Vec3, what: &'static str) -> Result<Vec3, GeometryError> {
    if v.length_squared() < f32::EPSILON {
        return Err(GeometryError::ZeroVector(what));
    }
    Ok(v.normalize())
}

/// Unit axis vector associated with the smallest component of `v`.
///
/// The cross product of `v` with the returned axis is always non-zero,
/// which makes it a safe seed for building tangent frames.
pub(crate) fn associated_axis(v: Vec3) -> Vec3 {
    let a = v.abs();
    if a.x < a.y {
        if a.x < a.z {
            Vec3::X
        } else {
            Vec3::Z
        }
    } else if a.y < a.z {
        Vec3::Y
    } else {
        Vec3::Z
    }
}

/// Real roots of a*t^2 + b*t + c = 0, smaller first.
///
/// Returns None when the discriminant is negative or the equation
/// degenerates to linear (a ray running parallel to a cylinder axis).
pub(crate) fn quadratic_roots(a: f32, b: f32, c: f32) -> Option<(f32, f32)> {
    if a.abs() < f32::EPSILON {
        return None;
    }

    let delta = b * b - 4.0 * a * c;
    if delta < 0.0 {
        return None;
    }

    let sqdelta = delta.sqrt();
    let half = 0.5 / a;
    let ta = (-b - sqdelta) * half;
    let tb = (-b + sqdelta) * half;

    Some(if ta <= tb { (ta, tb) } else { (tb, ta) })
}

//! Infinite plane primitive.

use std::sync::Arc;

use lumen_math::{Interval, Ray, Vec3};

use crate::primitive::{associated_axis, unit_or_err, GeometryError, Primitive};
use crate::texture::Texture;

/// Construction parameters for a plane.
///
/// `scale` is the texture tiling factor (default 0.15, a reasonable
/// density for a 256x256 texture) and `reflect` defaults to 0.
#[derive(Debug, Clone)]
pub struct PlaneConfig {
    pub center: Vec3,
    pub normal: Vec3,
    pub scale: f32,
    pub reflect: f32,
    pub texture: String,
}

impl PlaneConfig {
    pub fn new(center: Vec3, normal: Vec3, texture: impl Into<String>) -> Self {
        Self {
            center,
            normal,
            scale: 0.15,
            reflect: 0.0,
            texture: texture.into(),
        }
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_reflect(mut self, reflect: f32) -> Self {
        self.reflect = reflect;
        self
    }
}

/// An infinite plane through `center` with the given surface normal.
///
/// Texture coordinates come from projecting the hit point onto two
/// in-plane basis vectors, so the texture tiles across the surface.
pub struct Plane {
    center: Vec3,
    normal: Vec3,
    tx: Vec3,
    ty: Vec3,
    scale: f32,
    reflect: f32,
    texture: Arc<Texture>,
}

impl Plane {
    /// Create a new plane. The normal is normalized on ingestion;
    /// zero-length normals are rejected.
    pub fn new(
        center: Vec3,
        normal: Vec3,
        scale: f32,
        reflect: f32,
        texture: Arc<Texture>,
    ) -> Result<Self, GeometryError> {
        let normal = unit_or_err(normal, "plane normal")?;

        let seed = associated_axis(normal);
        let tx = seed.cross(normal).normalize();
        let ty = normal.cross(tx).normalize();

        Ok(Self {
            center,
            normal,
            tx,
            ty,
            scale,
            reflect: reflect.clamp(0.0, 1.0),
            texture,
        })
    }
}

impl Primitive for Plane {
    fn intersect(&self, ray: &Ray, range: Interval) -> Option<f32> {
        let denom = ray.direction.dot(self.normal);
        if denom.abs() < f32::EPSILON {
            // Ray parallel to the plane
            return None;
        }

        let t = -(ray.origin - self.center).dot(self.normal) / denom;
        range.surrounds(t).then_some(t)
    }

    fn normal_at(&self, _point: Vec3) -> Vec3 {
        self.normal
    }

    fn texture_coords(&self, point: Vec3, _normal: Vec3) -> (f32, f32) {
        let v = point - self.center;
        (v.dot(self.tx) * self.scale, v.dot(self.ty) * self.scale)
    }

    fn texture(&self) -> &Arc<Texture> {
        &self.texture
    }

    fn reflect(&self) -> f32 {
        self.reflect
    }

    fn casts_shadow(&self) -> bool {
        false
    }
}

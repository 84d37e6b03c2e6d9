//! Sphere primitive.

use std::f32::consts::PI;
use std::sync::Arc;

use lumen_math::{Interval, Ray, Vec3};

use crate::primitive::{
    associated_axis, quadratic_roots, unit_or_err, GeometryError, Primitive,
};
use crate::texture::Texture;

/// Construction parameters for a sphere.
///
/// `axis` orients the texture poles (default +Z), `radius` defaults to 1
/// and `reflect` to 0.
#[derive(Debug, Clone)]
pub struct SphereConfig {
    pub center: Vec3,
    pub radius: f32,
    pub axis: Vec3,
    pub reflect: f32,
    pub texture: String,
}

impl SphereConfig {
    pub fn new(center: Vec3, texture: impl Into<String>) -> Self {
        Self {
            center,
            radius: 1.0,
            axis: Vec3::Z,
            reflect: 0.0,
            texture: texture.into(),
        }
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_axis(mut self, axis: Vec3) -> Self {
        self.axis = axis;
        self
    }

    pub fn with_reflect(mut self, reflect: f32) -> Self {
        self.reflect = reflect;
        self
    }
}

/// A sphere with a local frame for longitude/latitude texture mapping.
pub struct Sphere {
    center: Vec3,
    radius: f32,
    tx: Vec3,
    ty: Vec3,
    tz: Vec3,
    reflect: f32,
    texture: Arc<Texture>,
}

impl Sphere {
    /// Create a new sphere. The axis is normalized on ingestion; a
    /// non-positive radius or zero-length axis is rejected.
    pub fn new(
        center: Vec3,
        radius: f32,
        axis: Vec3,
        reflect: f32,
        texture: Arc<Texture>,
    ) -> Result<Self, GeometryError> {
        if radius <= 0.0 {
            return Err(GeometryError::NonPositiveRadius(radius));
        }

        // Local frame: ty points at the texture's north pole, tx and tz
        // span the equator.
        let ty = unit_or_err(axis, "sphere axis")?;
        let seed = associated_axis(ty);
        let tx = seed.cross(ty).normalize();
        let tz = ty.cross(tx).normalize();

        Ok(Self {
            center,
            radius,
            tx,
            ty,
            tz,
            reflect: reflect.clamp(0.0, 1.0),
            texture,
        })
    }
}

impl Primitive for Sphere {
    fn intersect(&self, ray: &Ray, range: Interval) -> Option<f32> {
        let oc = ray.origin - self.center;
        let a = ray.direction.length_squared();
        let b = 2.0 * ray.direction.dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let (t0, t1) = quadratic_roots(a, b, c)?;
        if range.surrounds(t0) {
            Some(t0)
        } else if range.surrounds(t1) {
            Some(t1)
        } else {
            None
        }
    }

    fn normal_at(&self, point: Vec3) -> Vec3 {
        (point - self.center) / self.radius
    }

    fn texture_coords(&self, _point: Vec3, normal: Vec3) -> (f32, f32) {
        // Latitude from the pole axis
        let phi = (-normal.dot(self.ty)).clamp(-1.0, 1.0).acos();
        let v = phi / PI;

        // Longitude from the equatorial frame; undefined at the poles
        let sin_phi = phi.sin();
        if sin_phi.abs() < f32::EPSILON {
            return (0.0, v);
        }

        let theta = (normal.dot(self.tx) / sin_phi).clamp(-1.0, 1.0).acos() / (2.0 * PI);
        let u = if normal.dot(self.tz) > 0.0 {
            theta
        } else {
            1.0 - theta
        };

        (u, v)
    }

    fn texture(&self) -> &Arc<Texture> {
        &self.texture
    }

    fn reflect(&self) -> f32 {
        self.reflect
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::RAY_EPSILON;
    use crate::texture::Color;

    fn test_sphere(center: Vec3, radius: f32) -> Sphere {
        let texture = Arc::new(Texture::solid_color(Color::ONE));
        Sphere::new(center, radius, Vec3::Z, 0.0, texture).unwrap()
    }

    fn full_range() -> Interval {
        Interval::new(RAY_EPSILON, f32::INFINITY)
    }

    #[test]
    fn test_nearer_root_wins() {
        let sphere = test_sphere(Vec3::ZERO, 1.0);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);

        // The ray crosses the surface at t=4 and t=6
        let t = sphere.intersect(&ray, full_range()).unwrap();
        assert!((t - 4.0).abs() < 1e-5);

        let hit = ray.at(t);
        assert!(((hit - Vec3::ZERO).length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_self_intersection_falls_through_to_far_root() {
        let sphere = test_sphere(Vec3::ZERO, 1.0);

        // Ray starting on the surface: the near root is ~0 and must be
        // rejected, leaving the far wall at t=2
        let ray = Ray::new(Vec3::new(0.0, 0.0, 1.0), Vec3::NEG_Z);
        let t = sphere.intersect(&ray, full_range()).unwrap();
        assert!((t - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_miss() {
        let sphere = test_sphere(Vec3::new(0.0, 0.0, -1.0), 0.5);
        let ray = Ray::new(Vec3::ZERO, Vec3::Y);
        assert!(sphere.intersect(&ray, full_range()).is_none());
    }

    #[test]
    fn test_normal_is_unit_radial() {
        let sphere = test_sphere(Vec3::new(1.0, 0.0, 0.0), 2.0);
        let normal = sphere.normal_at(Vec3::new(3.0, 0.0, 0.0));
        assert!((normal - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_texture_coords_latitude() {
        let sphere = test_sphere(Vec3::ZERO, 1.0);

        // North pole (along +Z axis) maps to v=1, south pole to v=0
        let (_, v) = sphere.texture_coords(Vec3::Z, Vec3::Z);
        assert!((v - 1.0).abs() < 1e-4);

        let (_, v) = sphere.texture_coords(Vec3::NEG_Z, Vec3::NEG_Z);
        assert!(v.abs() < 1e-4);

        // A point on the equator sits halfway
        let (u, v) = sphere.texture_coords(Vec3::Y, Vec3::Y);
        assert!((v - 0.5).abs() < 1e-4);
        assert!((u - 0.25).abs() < 1e-4);
    }

    #[test]
    fn test_invalid_geometry_rejected() {
        let texture = Arc::new(Texture::solid_color(Color::ONE));

        let result = Sphere::new(Vec3::ZERO, 0.0, Vec3::Z, 0.0, texture.clone());
        assert_eq!(result.err(), Some(GeometryError::NonPositiveRadius(0.0)));

        let result = Sphere::new(Vec3::ZERO, 1.0, Vec3::ZERO, 0.0, texture);
        assert_eq!(result.err(), Some(GeometryError::ZeroVector("sphere axis")));
    }
}

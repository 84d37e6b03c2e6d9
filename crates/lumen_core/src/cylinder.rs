//! Cylinder primitive, optionally clipped to a finite span.

use std::f32::consts::PI;
use std::sync::Arc;

use lumen_math::{Interval, Ray, Vec3};

use crate::primitive::{
    associated_axis, quadratic_roots, unit_or_err, GeometryError, Primitive,
};
use crate::texture::Texture;

/// Construction parameters for a cylinder.
///
/// A negative `span` (the default) denotes an infinite cylinder; a
/// non-negative value is the half-length measured along `direction`
/// from `center`.
#[derive(Debug, Clone)]
pub struct CylinderConfig {
    pub center: Vec3,
    pub direction: Vec3,
    pub radius: f32,
    pub span: f32,
    pub reflect: f32,
    pub texture: String,
}

impl CylinderConfig {
    pub fn new(center: Vec3, direction: Vec3, texture: impl Into<String>) -> Self {
        Self {
            center,
            direction,
            radius: 1.0,
            span: -1.0,
            reflect: 0.0,
            texture: texture.into(),
        }
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_span(mut self, span: f32) -> Self {
        self.span = span;
        self
    }

    pub fn with_reflect(mut self, reflect: f32) -> Self {
        self.reflect = reflect;
        self
    }
}

/// An open-ended cylinder around an axis through `center`.
pub struct Cylinder {
    center: Vec3,
    axis: Vec3,
    radius: f32,
    span: f32,
    tx: Vec3,
    reflect: f32,
    texture: Arc<Texture>,
}

impl Cylinder {
    /// Create a new cylinder. The direction is normalized on ingestion;
    /// a non-positive radius or zero-length direction is rejected.
    pub fn new(
        center: Vec3,
        direction: Vec3,
        radius: f32,
        span: f32,
        reflect: f32,
        texture: Arc<Texture>,
    ) -> Result<Self, GeometryError> {
        if radius <= 0.0 {
            return Err(GeometryError::NonPositiveRadius(radius));
        }

        let axis = unit_or_err(direction, "cylinder direction")?;

        // Reference vector for the angular texture coordinate
        let seed = associated_axis(axis);
        let tx = seed.cross(axis).normalize();

        Ok(Self {
            center,
            axis,
            radius,
            span,
            tx,
            reflect: reflect.clamp(0.0, 1.0),
            texture,
        })
    }

    /// Signed axial offset of a point, measured along the axis from the
    /// cylinder's center.
    fn axial_offset(&self, point: Vec3) -> f32 {
        self.axis.dot(point - self.center)
    }

    fn within_span(&self, alpha: f32) -> bool {
        self.span < 0.0 || (-self.span..=self.span).contains(&alpha)
    }
}

impl Primitive for Cylinder {
    fn intersect(&self, ray: &Ray, range: Interval) -> Option<f32> {
        // Decompose against the axis: with T = o - center, B the axis
        // and D the (unit) ray direction, the surface condition reduces
        // to (1 - (D.B)^2) t^2 + 2(T.D - (D.B)(T.B)) t - (T.B)^2 - R^2 + T.T = 0
        // and the axial offset of a root is alpha = T.B + t * D.B.
        let oc = ray.origin - self.center;
        let a = ray.direction.dot(oc);
        let b = ray.direction.dot(self.axis);
        let d = oc.dot(self.axis);
        let f = self.radius * self.radius - oc.length_squared();

        let qa = 1.0 - b * b;
        let qb = 2.0 * (a - b * d);
        let qc = -(d * d) - f;

        let (t0, t1) = quadratic_roots(qa, qb, qc)?;
        for t in [t0, t1] {
            if !range.surrounds(t) {
                continue;
            }
            if self.within_span(d + t * b) {
                return Some(t);
            }
        }
        None
    }

    fn normal_at(&self, point: Vec3) -> Vec3 {
        let foot = self.center + self.axial_offset(point) * self.axis;
        (point - foot).normalize()
    }

    fn texture_coords(&self, point: Vec3, normal: Vec3) -> (f32, f32) {
        let u = normal.dot(self.tx).clamp(-1.0, 1.0).acos() / PI;
        let v = self.axial_offset(point) / (2.0 * PI * self.radius);
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

    fn test_cylinder(span: f32) -> Cylinder {
        let texture = Arc::new(Texture::solid_color(Color::ONE));
        Cylinder::new(Vec3::ZERO, Vec3::Z, 1.0, span, 0.0, texture).unwrap()
    }

    fn full_range() -> Interval {
        Interval::new(RAY_EPSILON, f32::INFINITY)
    }

    #[test]
    fn test_finite_span_clips_hit() {
        // This ray meets the infinite cylinder at axial offset 7,
        // outside a span of 5
        let ray = Ray::new(Vec3::new(5.0, 0.0, 7.0), Vec3::NEG_X);

        assert!(test_cylinder(5.0).intersect(&ray, full_range()).is_none());

        let t = test_cylinder(-1.0).intersect(&ray, full_range()).unwrap();
        assert!((t - 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_hit_within_span() {
        let ray = Ray::new(Vec3::new(5.0, 0.0, 3.0), Vec3::NEG_X);
        let t = test_cylinder(5.0).intersect(&ray, full_range()).unwrap();
        assert!((t - 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_ray_parallel_to_axis_misses() {
        // Inside the tube, traveling along it: no surface crossing
        let ray = Ray::new(Vec3::new(0.5, 0.0, 0.0), Vec3::Z);
        assert!(test_cylinder(-1.0).intersect(&ray, full_range()).is_none());
    }

    #[test]
    fn test_normal_perpendicular_to_axis() {
        let cylinder = test_cylinder(-1.0);
        let normal = cylinder.normal_at(Vec3::new(1.0, 0.0, 7.0));

        assert!((normal - Vec3::X).length() < 1e-5);
        assert!(normal.dot(Vec3::Z).abs() < 1e-5);
    }

    #[test]
    fn test_texture_coords_follow_axis() {
        let cylinder = test_cylinder(-1.0);

        let point = Vec3::new(1.0, 0.0, PI);
        let (_, v) = cylinder.texture_coords(point, Vec3::X);
        assert!((v - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_invalid_geometry_rejected() {
        let texture = Arc::new(Texture::solid_color(Color::ONE));

        let result = Cylinder::new(Vec3::ZERO, Vec3::Z, -2.0, -1.0, 0.0, texture.clone());
        assert_eq!(result.err(), Some(GeometryError::NonPositiveRadius(-2.0)));

        let result = Cylinder::new(Vec3::ZERO, Vec3::ZERO, 1.0, -1.0, 0.0, texture);
        assert_eq!(
            result.err(),
            Some(GeometryError::ZeroVector("cylinder direction"))
        );
    }
}

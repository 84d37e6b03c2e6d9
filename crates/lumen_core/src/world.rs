//! World: the aggregate the renderer traces against.

use lumen_math::{Interval, Ray};
use thiserror::Error;

use crate::camera::Camera;
use crate::cylinder::{Cylinder, CylinderConfig};
use crate::light::Light;
use crate::plane::{Plane, PlaneConfig};
use crate::primitive::{GeometryError, Hit, Primitive};
use crate::sphere::{Sphere, SphereConfig};
use crate::texture::{TextureCache, TextureError};

/// Errors raised while assembling a scene.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("invalid geometry: {0}")]
    Geometry(#[from] GeometryError),

    #[error("texture unavailable: {0}")]
    Texture(#[from] TextureError),
}

/// One camera, one light, and an insertion-ordered set of primitives.
///
/// Cameras and lights replace on re-add (last write wins, with a
/// warning). Textures referenced by primitive configs are decoded here,
/// before rendering starts, and shared through a per-world cache.
///
/// Completeness is checked by the renderer when a render begins, so a
/// world under construction may be temporarily missing its camera or
/// light.
#[derive(Default)]
pub struct World {
    camera: Option<Camera>,
    light: Option<Light>,
    primitives: Vec<Box<dyn Primitive>>,
    textures: TextureCache,
}

impl World {
    /// Create a new empty world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the camera. Replacing an existing camera is allowed.
    pub fn add_camera(&mut self, camera: Camera) {
        if self.camera.is_some() {
            log::warn!("replacing an existing camera");
        }
        self.camera = Some(camera);
    }

    /// Set the light. Replacing an existing light is allowed.
    pub fn add_light(&mut self, light: Light) {
        if self.light.is_some() {
            log::warn!("replacing an existing light");
        }
        self.light = Some(light);
    }

    /// Append a plane described by `config`, decoding its texture.
    pub fn add_plane(&mut self, config: PlaneConfig) -> Result<(), SceneError> {
        let texture = self.textures.load(&config.texture)?;
        let plane = Plane::new(
            config.center,
            config.normal,
            config.scale,
            config.reflect,
            texture,
        )?;
        self.add_primitive(Box::new(plane));
        Ok(())
    }

    /// Append a sphere described by `config`, decoding its texture.
    pub fn add_sphere(&mut self, config: SphereConfig) -> Result<(), SceneError> {
        let texture = self.textures.load(&config.texture)?;
        let sphere = Sphere::new(
            config.center,
            config.radius,
            config.axis,
            config.reflect,
            texture,
        )?;
        self.add_primitive(Box::new(sphere));
        Ok(())
    }

    /// Append a cylinder described by `config`, decoding its texture.
    pub fn add_cylinder(&mut self, config: CylinderConfig) -> Result<(), SceneError> {
        let texture = self.textures.load(&config.texture)?;
        let cylinder = Cylinder::new(
            config.center,
            config.direction,
            config.radius,
            config.span,
            config.reflect,
            texture,
        )?;
        self.add_primitive(Box::new(cylinder));
        Ok(())
    }

    /// Append an already-constructed primitive.
    ///
    /// Useful when the texture is procedural rather than a file on disk.
    pub fn add_primitive(&mut self, primitive: Box<dyn Primitive>) {
        self.primitives.push(primitive);
        log::debug!("world now holds {} primitives", self.primitives.len());
    }

    pub fn camera(&self) -> Option<&Camera> {
        self.camera.as_ref()
    }

    pub fn light(&self) -> Option<&Light> {
        self.light.as_ref()
    }

    /// Number of primitives in the world.
    pub fn primitive_count(&self) -> usize {
        self.primitives.len()
    }

    /// Check if the world holds no primitives.
    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Nearest intersection of `ray` with any primitive.
    ///
    /// Scans exhaustively in insertion order; on numerically identical
    /// distances the earliest-inserted primitive wins.
    pub fn nearest_hit(&self, ray: &Ray, range: Interval) -> Option<Hit<'_>> {
        let mut nearest: Option<(f32, &dyn Primitive)> = None;

        for primitive in &self.primitives {
            if let Some(t) = primitive.intersect(ray, range) {
                if nearest.map_or(true, |(best, _)| t < best) {
                    nearest = Some((t, primitive.as_ref()));
                }
            }
        }

        nearest.map(|(t, primitive)| {
            let point = ray.at(t);
            Hit {
                t,
                point,
                normal: primitive.normal_at(point),
                primitive,
            }
        })
    }

    /// Whether anything shadow-casting blocks `ray` within `max_dist`.
    pub fn occluded(&self, ray: &Ray, range: Interval) -> bool {
        self.primitives
            .iter()
            .any(|p| p.casts_shadow() && p.intersect(ray, range).is_some())
    }
}

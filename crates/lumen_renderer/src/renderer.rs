//! The render state machine and the recursive trace/shade pipeline.

use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use lumen_core::{Color, Light, World, RAY_EPSILON};
use lumen_math::{Interval, Ray, Vec3};

use crate::bucket::{generate_buckets, render_bucket, BucketResult, DEFAULT_BUCKET_SIZE};
use crate::framebuffer::Framebuffer;
use crate::view::ViewWindow;

/// Errors surfaced by the renderer.
#[derive(Error, Debug)]
pub enum RenderError {
    /// The world is missing a camera, a light, or any geometry.
    #[error("incomplete scene: {0}")]
    IncompleteScene(&'static str),

    #[error("output dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// `write_scene` was called before a successful `render`.
    #[error("no rendered image to write; call render first")]
    NotRendered,

    #[error("failed to write image: {0}")]
    Io(#[from] image::ImageError),
}

/// Tunables for one render, with documented defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Horizontal field of view in degrees
    pub fov: f32,
    /// Distance at which light falls off completely; also the maximum
    /// reach of any ray
    pub max_distance: f32,
    /// Base intensity received by shadowed surfaces
    pub ambient: f32,
    /// Offset applied along the normal when spawning secondary rays
    pub bias: f32,
    /// Maximum number of reflection bounces
    pub max_depth: u32,
    /// Rays per pixel; above 1, jittered sub-pixel sampling kicks in
    pub samples_per_pixel: u32,
    /// Seed for the per-pixel jitter streams
    pub seed: u64,
    /// Color returned by rays that hit nothing
    pub background: Color,
    /// Tile edge length for parallel rendering
    pub bucket_size: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            fov: 93.0,
            max_distance: 60.0,
            ambient: 0.25,
            bias: 1e-3,
            max_depth: 3,
            samples_per_pixel: 1,
            seed: 0,
            background: Color::ZERO,
            bucket_size: DEFAULT_BUCKET_SIZE,
        }
    }
}

/// Where a renderer sits in its `Idle -> Rendered -> Exported` cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    Idle,
    Rendered,
    Exported,
}

/// Read-only state shared by every worker during one render call.
pub(crate) struct TraceContext<'a> {
    world: &'a World,
    light: &'a Light,
    config: &'a RenderConfig,
}

impl TraceContext<'_> {
    /// Color seen through pixel (x, y).
    pub(crate) fn render_pixel(&self, view: &ViewWindow, x: u32, y: u32) -> Color {
        let spp = self.config.samples_per_pixel.max(1);
        if spp == 1 {
            let ray = view.ray_through(x as f32 + 0.5, y as f32 + 0.5);
            return self.trace(&ray, 0);
        }

        // Seeding per pixel keeps the jitter stream independent of how
        // buckets are scheduled across threads
        let mut rng = StdRng::seed_from_u64(
            self.config.seed
                ^ (((y as u64) << 32) | x as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15),
        );

        let mut acc = Color::ZERO;
        for _ in 0..spp {
            let ray = view.ray_through(x as f32 + rng.gen::<f32>(), y as f32 + rng.gen::<f32>());
            acc += self.trace(&ray, 0);
        }
        acc / spp as f32
    }

    /// Trace a ray and its reflected rays.
    fn trace(&self, ray: &Ray, depth: u32) -> Color {
        let range = Interval::new(RAY_EPSILON, self.config.max_distance);
        let hit = match self.world.nearest_hit(ray, range) {
            Some(hit) => hit,
            None => return self.config.background,
        };

        let to_light = self.light.ray_to(hit.point);
        let light_dist = to_light.length();
        let light_dir = if light_dist > f32::EPSILON {
            to_light / light_dist
        } else {
            hit.normal
        };

        // Secondary rays leave from just off the surface
        let lifted = hit.point + self.config.bias * hit.normal;

        let shadow_ray = Ray::new(lifted, light_dir);
        let shadowed = self
            .world
            .occluded(&shadow_ray, Interval::new(RAY_EPSILON, light_dist));

        let light_term = if shadowed {
            self.config.ambient
        } else {
            let diffuse = hit.normal.dot(light_dir).max(0.0);
            let falloff =
                (1.0 - (light_dist / self.config.max_distance).powi(2)).clamp(0.0, 1.0);
            (self.config.ambient + (1.0 - self.config.ambient) * diffuse * falloff).min(1.0)
        };

        let local = hit.primitive.color_at(hit.point, hit.normal) * light_term;

        let reflect = hit.primitive.reflect();
        if reflect > 0.0 && depth < self.config.max_depth {
            let direction = reflect_about(ray.direction, hit.normal);
            let reflected = self.trace(&Ray::new(lifted, direction), depth + 1);
            local * (1.0 - reflect) + reflected * reflect
        } else {
            local
        }
    }
}

/// Reflect a direction about a unit normal.
#[inline]
fn reflect_about(d: Vec3, n: Vec3) -> Vec3 {
    d - 2.0 * d.dot(n) * n
}

/// Offline renderer bound to a world snapshot and an output size.
///
/// `render` is idempotent: calling it again re-renders the same world
/// and overwrites the framebuffer. `write_scene` is only valid once a
/// render has completed; on I/O failure the framebuffer stays intact so
/// a retry against a different path can succeed.
pub struct Renderer<'a> {
    world: &'a World,
    width: u32,
    height: u32,
    config: RenderConfig,
    framebuffer: Option<Framebuffer>,
    state: RenderState,
}

impl<'a> Renderer<'a> {
    /// Create a renderer with default settings.
    pub fn new(world: &'a World, width: u32, height: u32) -> Result<Self, RenderError> {
        Self::with_config(world, width, height, RenderConfig::default())
    }

    /// Create a renderer with explicit settings.
    pub fn with_config(
        world: &'a World,
        width: u32,
        height: u32,
        config: RenderConfig,
    ) -> Result<Self, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidDimensions { width, height });
        }

        Ok(Self {
            world,
            width,
            height,
            config,
            framebuffer: None,
            state: RenderState::Idle,
        })
    }

    /// Render the world into the framebuffer.
    ///
    /// Fails with `IncompleteScene` before any pixel work if the world
    /// has no camera, no light, or no primitives; the framebuffer is
    /// left unallocated in that case.
    pub fn render(&mut self) -> Result<(), RenderError> {
        let camera = self
            .world
            .camera()
            .ok_or(RenderError::IncompleteScene("no camera"))?;
        let light = self
            .world
            .light()
            .ok_or(RenderError::IncompleteScene("no light"))?;
        if self.world.is_empty() {
            return Err(RenderError::IncompleteScene("no primitives"));
        }

        let view = ViewWindow::new(camera, self.width, self.height, self.config.fov);
        let ctx = TraceContext {
            world: self.world,
            light,
            config: &self.config,
        };

        let buckets = generate_buckets(self.width, self.height, self.config.bucket_size.max(1));
        log::info!(
            "rendering {}x{} ({} primitives, {} buckets)",
            self.width,
            self.height,
            self.world.primitive_count(),
            buckets.len()
        );

        let results: Vec<BucketResult> = buckets
            .par_iter()
            .map(|bucket| render_bucket(bucket, &view, &ctx))
            .collect();

        let mut framebuffer = Framebuffer::new(self.width, self.height);
        for result in results {
            let bucket = result.bucket;
            for (i, color) in result.pixels.into_iter().enumerate() {
                let x = bucket.x + i as u32 % bucket.width;
                let y = bucket.y + i as u32 / bucket.width;
                framebuffer.set(x, y, color);
            }
        }

        self.framebuffer = Some(framebuffer);
        self.state = RenderState::Rendered;
        Ok(())
    }

    /// Encode the framebuffer as a PNG at `path`.
    pub fn write_scene(&mut self, path: impl AsRef<Path>) -> Result<(), RenderError> {
        let framebuffer = self.framebuffer.as_ref().ok_or(RenderError::NotRendered)?;

        image::save_buffer(
            path.as_ref(),
            &framebuffer.to_rgb8(),
            framebuffer.width,
            framebuffer.height,
            image::ColorType::Rgb8,
        )?;

        self.state = RenderState::Exported;
        log::debug!(
            "wrote {}x{} image to {}",
            framebuffer.width,
            framebuffer.height,
            path.as_ref().display()
        );
        Ok(())
    }

    /// The rendered framebuffer, if a render has completed.
    pub fn framebuffer(&self) -> Option<&Framebuffer> {
        self.framebuffer.as_ref()
    }

    pub fn state(&self) -> RenderState {
        self.state
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::{Camera, Plane, Sphere, Texture};
    use std::sync::Arc;

    fn solid(color: Color) -> Arc<Texture> {
        Arc::new(Texture::solid_color(color))
    }

    fn white_plane(center: Vec3, normal: Vec3, reflect: f32) -> Box<Plane> {
        Box::new(Plane::new(center, normal, 0.15, reflect, solid(Color::ONE)).unwrap())
    }

    fn lit_world() -> World {
        let mut world = World::new();
        world.add_camera(Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 0.0).unwrap());
        world.add_light(Light::new(Vec3::new(5.0, 5.0, 5.0)));
        world.add_primitive(white_plane(Vec3::ZERO, Vec3::Z, 0.0));
        world
    }

    #[test]
    fn test_missing_light_is_incomplete() {
        let mut world = World::new();
        world.add_camera(Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 0.0).unwrap());
        world.add_primitive(white_plane(Vec3::ZERO, Vec3::Z, 0.0));

        let mut renderer = Renderer::new(&world, 4, 4).unwrap();
        assert!(matches!(
            renderer.render(),
            Err(RenderError::IncompleteScene("no light"))
        ));

        // Nothing was allocated or transitioned
        assert!(renderer.framebuffer().is_none());
        assert_eq!(renderer.state(), RenderState::Idle);
    }

    #[test]
    fn test_missing_camera_is_incomplete() {
        let mut world = World::new();
        world.add_light(Light::new(Vec3::ONE));
        world.add_primitive(white_plane(Vec3::ZERO, Vec3::Z, 0.0));

        let mut renderer = Renderer::new(&world, 4, 4).unwrap();
        assert!(matches!(
            renderer.render(),
            Err(RenderError::IncompleteScene("no camera"))
        ));
    }

    #[test]
    fn test_write_before_render_fails() {
        let world = lit_world();
        let mut renderer = Renderer::new(&world, 4, 4).unwrap();

        let result = renderer.write_scene("/tmp/lumen_never_written.png");
        assert!(matches!(result, Err(RenderError::NotRendered)));
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let world = lit_world();
        assert!(matches!(
            Renderer::new(&world, 0, 480),
            Err(RenderError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            Renderer::new(&world, 640, 0),
            Err(RenderError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_state_transitions() {
        let world = lit_world();
        let mut renderer = Renderer::new(&world, 4, 4).unwrap();
        assert_eq!(renderer.state(), RenderState::Idle);
        assert_eq!((renderer.width(), renderer.height()), (4, 4));

        renderer.render().unwrap();
        assert_eq!(renderer.state(), RenderState::Rendered);

        let path = std::env::temp_dir().join(format!("lumen_out_{}.png", std::process::id()));
        renderer.write_scene(&path).unwrap();
        assert_eq!(renderer.state(), RenderState::Exported);

        // Re-rendering from Exported is allowed
        renderer.render().unwrap();
        assert_eq!(renderer.state(), RenderState::Rendered);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_mirrored_planes_terminate() {
        let mut world = World::new();
        world.add_camera(Camera::new(Vec3::new(0.0, 0.5, 0.0), Vec3::new(0.0, 0.5, -1.0), 0.0).unwrap());
        world.add_light(Light::new(Vec3::new(0.0, 1.0, 0.0)));

        // Two fully mirrored planes facing each other
        world.add_primitive(white_plane(Vec3::new(0.0, 0.0, -2.0), Vec3::Z, 1.0));
        world.add_primitive(white_plane(Vec3::new(0.0, 0.0, 2.0), Vec3::NEG_Z, 1.0));

        let config = RenderConfig {
            max_depth: 8,
            ..RenderConfig::default()
        };
        let mut renderer = Renderer::with_config(&world, 2, 2, config).unwrap();
        renderer.render().unwrap();

        let fb = renderer.framebuffer().unwrap();
        for pixel in &fb.pixels {
            assert!(pixel.is_finite());
            for c in [pixel.x, pixel.y, pixel.z] {
                assert!((0.0..=1.0).contains(&c), "component out of range: {c}");
            }
        }
    }

    #[test]
    fn test_end_to_end_plane_in_range() {
        // One camera, one light, one plane, 4x4 output
        let world = lit_world();
        let mut renderer = Renderer::new(&world, 4, 4).unwrap();
        renderer.render().unwrap();

        let fb = renderer.framebuffer().unwrap();
        assert_eq!(fb.pixels.len(), 16);
        for pixel in &fb.pixels {
            for c in [pixel.x, pixel.y, pixel.z] {
                assert!((0.0..=1.0).contains(&c));
            }
            // The plane fills the frame, so every pixel gets at least
            // the ambient base
            assert!(pixel.x > 0.0);
        }
    }

    #[test]
    fn test_center_brighter_than_corners() {
        // With the light on the view axis, the diffuse term peaks where
        // the surface faces both camera and light head-on
        let mut world = World::new();
        world.add_camera(Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 0.0).unwrap());
        world.add_light(Light::new(Vec3::new(0.0, 0.0, 5.0)));
        world.add_primitive(white_plane(Vec3::ZERO, Vec3::Z, 0.0));

        let mut renderer = Renderer::new(&world, 4, 4).unwrap();
        renderer.render().unwrap();
        let fb = renderer.framebuffer().unwrap();

        let brightness = |x: u32, y: u32| {
            let p = fb.get(x, y);
            p.x + p.y + p.z
        };

        let center_min = [(1, 1), (1, 2), (2, 1), (2, 2)]
            .iter()
            .map(|&(x, y)| brightness(x, y))
            .fold(f32::INFINITY, f32::min);
        let corner_max = [(0, 0), (3, 0), (0, 3), (3, 3)]
            .iter()
            .map(|&(x, y)| brightness(x, y))
            .fold(f32::NEG_INFINITY, f32::max);

        assert!(
            center_min > corner_max,
            "center {center_min} should exceed corners {corner_max}"
        );
    }

    #[test]
    fn test_render_is_deterministic() {
        let mut world = lit_world();
        world.add_primitive(Box::new(
            Sphere::new(Vec3::new(0.5, 0.5, 1.0), 0.5, Vec3::Z, 0.3, solid(Color::X)).unwrap(),
        ));

        let config = RenderConfig {
            samples_per_pixel: 4,
            seed: 7,
            ..RenderConfig::default()
        };

        let mut renderer = Renderer::with_config(&world, 8, 8, config).unwrap();
        renderer.render().unwrap();
        let first = renderer.framebuffer().unwrap().clone();

        renderer.render().unwrap();
        let second = renderer.framebuffer().unwrap();

        assert!(first == *second, "repeated renders must be bit-identical");
    }

    #[test]
    fn test_shadowed_region_gets_ambient_only() {
        let mut world = World::new();
        world.add_camera(Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 0.0).unwrap());
        // Light hangs over (2, 0, 0) with a small sphere right below
        // it, so the plane around that point sits in shadow
        world.add_light(Light::new(Vec3::new(2.0, 0.0, 10.0)));
        world.add_primitive(white_plane(Vec3::ZERO, Vec3::Z, 0.0));
        world.add_primitive(Box::new(
            Sphere::new(Vec3::new(2.0, 0.0, 2.0), 0.5, Vec3::Z, 0.0, solid(Color::ONE)).unwrap(),
        ));

        let config = RenderConfig::default();
        let ambient = config.ambient;
        let mut renderer = Renderer::with_config(&world, 9, 9, config).unwrap();
        renderer.render().unwrap();
        let fb = renderer.framebuffer().unwrap();

        // Pixel (6, 4) lands on the plane near (2, 0, 0), inside the
        // sphere's shadow but clear of the sphere's silhouette
        let shadowed = fb.get(6, 4);
        assert!((shadowed.x - ambient).abs() < 0.05);

        // Off to the left the plane is fully lit
        let lit = fb.get(2, 4);
        assert!(lit.x > shadowed.x + 0.1);
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = RenderConfig {
            fov: 70.0,
            max_depth: 5,
            samples_per_pixel: 4,
            ..RenderConfig::default()
        };

        let json = serde_json::to_string(&config).unwrap();
        let back: RenderConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(back.fov, 70.0);
        assert_eq!(back.max_depth, 5);
        assert_eq!(back.samples_per_pixel, 4);
        assert_eq!(back.bucket_size, config.bucket_size);
    }
}

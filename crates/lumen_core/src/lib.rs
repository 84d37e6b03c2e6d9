//! Lumen Core - Scene representation for offline ray tracing.
//!
//! This crate provides:
//!
//! - **Scene entities**: `Camera`, `Light`, and the `Primitive` trait with
//!   its `Plane`, `Sphere`, and `Cylinder` variants
//! - **World**: an insertion-ordered aggregate of one camera, one light,
//!   and any number of primitives, queried by the renderer
//! - **Textures**: image loading, caching, and bilinear sampling
//!
//! # Example
//!
//! ```ignore
//! use lumen_core::{Camera, Light, PlaneConfig, World};
//! use lumen_math::Vec3;
//!
//! let mut world = World::new();
//! world.add_camera(Camera::new(Vec3::new(5.0, 0.0, 2.0), Vec3::ZERO, 0.0)?);
//! world.add_light(Light::new(Vec3::new(5.0, 5.0, 5.0)));
//! world.add_plane(PlaneConfig::new(Vec3::ZERO, Vec3::Z, "floor.png"))?;
//! ```

pub mod camera;
pub mod cylinder;
pub mod light;
pub mod plane;
pub mod primitive;
pub mod sphere;
pub mod texture;
pub mod world;

// Re-export commonly used types
pub use camera::Camera;
pub use cylinder::{Cylinder, CylinderConfig};
pub use light::Light;
pub use plane::{Plane, PlaneConfig};
pub use primitive::{GeometryError, Hit, Primitive, RAY_EPSILON};
pub use sphere::{Sphere, SphereConfig};
pub use texture::{Color, Texture, TextureCache, TextureError};
pub use world::{SceneError, World};

/// Re-export Vec3 and common math types from lumen_math
pub use lumen_math::{Interval, Ray, Vec3};

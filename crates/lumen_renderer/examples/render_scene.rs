//! Renders a small demonstration scene and saves it as a PNG.
//!
//! The scene uses procedural solid-color textures so the example has no
//! asset dependencies; file-backed textures go through
//! `World::add_sphere` and friends with a `SphereConfig` instead.

use std::sync::Arc;

use anyhow::Result;
use lumen_core::{Camera, Color, Cylinder, Light, Plane, Sphere, Texture, World};
use lumen_math::Vec3;
use lumen_renderer::{RenderConfig, Renderer};

fn main() -> Result<()> {
    env_logger::init();

    println!("Lumen Renderer - Example Scene");
    println!("==============================");

    let world = build_scene()?;

    let config = RenderConfig {
        fov: 93.0,
        max_depth: 3,
        samples_per_pixel: 4,
        ..RenderConfig::default()
    };

    let mut renderer = Renderer::with_config(&world, 640, 480, config)?;

    println!("Rendering 640x480...");
    let start = std::time::Instant::now();
    renderer.render()?;
    println!("Rendered in {:?}", start.elapsed());

    let filename = "scene.png";
    renderer.write_scene(filename)?;
    println!("Saved to {filename}");

    Ok(())
}

fn build_scene() -> Result<World> {
    let mut world = World::new();

    world.add_camera(Camera::new(
        Vec3::new(10.0, -8.0, 4.0),
        Vec3::new(0.0, 0.0, 1.0),
        0.0,
    )?);
    world.add_light(Light::new(Vec3::new(6.0, 6.0, 9.0)));

    let floor = Arc::new(Texture::solid_color(Color::new(0.8, 0.8, 0.75)));
    let red = Arc::new(Texture::solid_color(Color::new(0.85, 0.2, 0.15)));
    let blue = Arc::new(Texture::solid_color(Color::new(0.2, 0.35, 0.8)));
    let steel = Arc::new(Texture::solid_color(Color::new(0.7, 0.7, 0.75)));

    // Slightly mirrored ground plane
    world.add_primitive(Box::new(Plane::new(
        Vec3::ZERO,
        Vec3::Z,
        0.15,
        0.25,
        floor,
    )?));

    world.add_primitive(Box::new(Sphere::new(
        Vec3::new(0.0, 0.0, 1.5),
        1.5,
        Vec3::Z,
        0.1,
        red,
    )?));
    world.add_primitive(Box::new(Sphere::new(
        Vec3::new(3.0, 1.5, 1.0),
        1.0,
        Vec3::Z,
        0.0,
        blue,
    )?));

    // A finite pillar lying along the Y axis
    world.add_primitive(Box::new(Cylinder::new(
        Vec3::new(-3.0, 0.0, 1.0),
        Vec3::Y,
        1.0,
        4.0,
        0.4,
        steel,
    )?));

    Ok(world)
}

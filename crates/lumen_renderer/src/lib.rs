//! Lumen Renderer - offline CPU ray tracing.
//!
//! Casts one ray (or a deterministic jittered bundle) per pixel through
//! a `lumen_core::World`, resolves nearest-surface hits, shades with a
//! single point light plus bounded mirror reflections, and exports the
//! framebuffer as a PNG.
//!
//! Buckets partition the image so rayon can render tiles concurrently;
//! identical inputs always produce bit-identical framebuffers.

mod bucket;
mod framebuffer;
mod renderer;
mod view;

pub use bucket::{generate_buckets, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use framebuffer::{color_to_rgb, linear_to_gamma, Framebuffer};
pub use renderer::{RenderConfig, RenderError, RenderState, Renderer};
pub use view::ViewWindow;

/// Re-export the scene and math types callers need alongside the renderer
pub use lumen_core::{Color, World};
pub use lumen_math::{Interval, Ray, Vec3};

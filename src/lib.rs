//! # Particle Demo
//!
//! CPU-side particle emitter with camera-facing billboards, rendered through a
//! pluggable backend (wgpu or an in-memory recorder).
//!
//! ## Features
//!
//! - **Ring-buffer storage**: fixed-capacity particle slots, no per-particle allocation
//! - **Closed-form motion**: positions evaluated from age, stable under any frame time
//! - **Billboards**: quads expanded along the camera's right/up axes with per-particle rotation
//! - **Sprite sheets**: frame selected by normalized age
//! - **Wrapped draws**: at most two indexed draws cover the living slots
//!
//! ### Example
//!
//! ```ignore
//! use particle_demo::particles::{Emitter, EmitterConfig, EmitterResources};
//! use particle_demo::render::{Camera, RecordingBackend};
//!
//! let mut backend = RecordingBackend::new();
//! let mut emitter = Emitter::new(EmitterConfig::default(), EmitterResources::default(), &mut backend)?;
//! let camera = Camera::new(16.0 / 9.0);
//! emitter.update(1.0 / 60.0);
//! emitter.draw(&mut backend, &camera);
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Errors, logging and helper macros
//! - [`config`]: TOML/JSON configuration
//! - [`particles`]: Ring buffer, particle records and the emitter
//! - [`render`]: Camera and render backends
//! - [`scene`]: Targets, projectiles and collisions for the demo
//! - [`demo`]: Headless frame loop

/// Errors, logging and macros
#[macro_use]
pub mod core;
/// Configuration system
pub mod config;
/// Transform component
pub mod math;
/// Camera and render backends
pub mod render;
/// Particle system
pub mod particles;
/// Demo scene entities and collision
pub mod scene;
/// Headless demo loop
pub mod demo;

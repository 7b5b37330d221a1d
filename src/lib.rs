//! Progressive mesh ray tracer: scene packing, accumulation and the
//! per-frame ray-trace + copy passes.

pub mod accumulation;
pub mod camera;
pub mod config;
pub mod error;
pub mod geometry;
pub mod passes;
pub mod renderer;
pub mod scene;
pub mod shader;
pub mod state;
pub mod wgpu_ctx;
pub mod wgpu_utils;

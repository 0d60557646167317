//! WebGPU rendering module
//!
//! The whole scene (road, stripes, obstacle boxes, star field, vignette)
//! is drawn procedurally in the fragment shader from one fullscreen
//! triangle.

pub mod road_pipeline;

pub use road_pipeline::RoadRenderState;

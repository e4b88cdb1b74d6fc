//! Layered 2D compositor on wgpu: background fills, atlas tiles and sprites
//! with per-entity animation offsets, bitmap and MTSDF text, rounded-rect
//! panels, and a post-process stack (scanline, vignette, chromatic aberration,
//! bloom).

pub mod camera;
pub mod config;
pub mod error;
pub mod renderer;

pub use camera::{Camera, CameraUniform};
pub use config::CompositorConfig;
pub use error::{RenderError, Result};
pub use renderer::{AtlasId, Compositor, DrawCall, FontId, Frame, TargetDesc};

use thiserror::Error;

/// Failures raised while building or reconfiguring the compositor.
///
/// Per-fragment degenerate cases (out-of-range entity ids, transparent
/// texels, zero SDF coverage) are defined branches, not errors, and never
/// surface here.
#[derive(Debug, Error)]
pub enum RenderError {
    /// WGSL failed to parse or validate when the shader module was created.
    #[error("shader for pass `{pass}` failed to compile: {message}")]
    ShaderCompilation { pass: &'static str, message: String },

    /// Pipeline state (vertex layout, bind group layout, targets) was
    /// rejected by the device.
    #[error("pipeline for pass `{pass}` could not be created: {message}")]
    PipelineCreation { pass: &'static str, message: String },

    #[error("invalid compositor configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),

    #[error("failed to decode atlas image: {0}")]
    AtlasDecode(#[from] image::ImageError),

    #[error("invalid atlas: {reason}")]
    InvalidAtlas { reason: String },
}

pub type Result<T, E = RenderError> = std::result::Result<T, E>;

use thiserror::Error;

use super::ShaderStage;

/// Failures surfaced by the graphics layer.
///
/// Only construction-time problems are reported as errors. Mid-frame GPU
/// calls are fire-and-forget; their failures show up in [`GraphicsContext::error`].
///
/// [`GraphicsContext::error`]: super::GraphicsContext::error
#[derive(Debug, Error)]
pub enum GfxError {
    #[error("{stage} shader failed to compile: {log}")]
    ShaderCompile { stage: ShaderStage, log: String },

    #[error("shader program failed to link: {log}")]
    ProgramLink { log: String },

    #[error("failed to create {0}")]
    ResourceCreation(&'static str),

    #[error("graphics context unsupported: {0}")]
    Unsupported(String),

    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
}

use crate::coords::Color;
use crate::render::BufferConfig;

/// Startup options for [`Engine`](super::Engine).
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub buffer: BufferConfig,

    /// Color the framebuffer is cleared to by `begin_frame`. `None` skips the clear.
    pub clear_color: Option<Color>,

    /// Text decode: 0 = median of RGB (MSDF), 1 = alpha channel (true SDF of
    /// an MTSDF atlas).
    pub msdf_mode: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            buffer: BufferConfig::default(),
            clear_color: Some(Color::BLACK),
            msdf_mode: 0,
        }
    }
}

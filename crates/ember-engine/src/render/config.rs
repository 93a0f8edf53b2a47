use super::convert::VERTICES_PER_PRIMITIVE;

/// Capacity policy for the batched vertex buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct BufferConfig {
    /// Vertices allocated at construction (default: 1024 primitives).
    pub initial_vertices: usize,

    /// Shrink back after this many consecutive frames whose peak use stays at
    /// or below a quarter of capacity. `None` keeps the high-water capacity
    /// for the buffer's whole life.
    pub shrink_after_idle_frames: Option<u32>,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            initial_vertices: 1024 * VERTICES_PER_PRIMITIVE,
            shrink_after_idle_frames: None,
        }
    }
}

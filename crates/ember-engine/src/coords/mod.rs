//! Geometry and color types shared by the primitive codec, shapes and text.
//!
//! Canonical CPU space:
//! - Logical pixels (the surface size, not the framebuffer)
//! - Origin top-left
//! - +X right, +Y down
//!
//! Conversion to NDC happens on the CPU, once per vertex, via [`Viewport::to_ndc`].

mod clip;
mod color;
mod rect;
mod vec2;
mod viewport;

pub use clip::ClipRect;
pub use color::Color;
pub use rect::Rect;
pub use vec2::Vec2;
pub use viewport::Viewport;

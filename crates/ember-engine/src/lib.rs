//! Ember engine crate.
//!
//! Immediate-mode 2D renderer: every shape is a signed distance field
//! evaluated in one fragment shader, batched per frame, with MSDF text and
//! persistent shapes on top. Runs on desktop GL and WebGL2 through the same
//! [`gfx::GraphicsContext`] seam.

pub mod coords;
pub mod core;
pub mod gfx;
pub mod logging;
pub mod render;
pub mod scene;
pub mod surface;
pub mod text;
pub mod time;

//! Cross-backend graphics API.
//!
//! Upper layers talk to [`GraphicsContext`] only. Backends:
//! - [`NativeContext`]: desktop OpenGL via `glow` (non-wasm targets)
//! - [`WebContext`]: WebGL2 via `web-sys` (wasm32)
//! - [`HeadlessContext`]: no GPU, records calls
//!
//! All backends take the same numeric literals from [`consts`].

pub mod consts;

mod context;
mod error;
mod handles;
mod headless;
mod program;

#[cfg(not(target_arch = "wasm32"))]
mod native;
#[cfg(target_arch = "wasm32")]
mod web;

pub use context::{Capabilities, GraphicsContext};
pub use error::GfxError;
pub use handles::{Buffer, Program, Shader, Texture, UniformLocation, VertexArray};
pub use headless::{GlCall, HeadlessContext};
pub use program::{compile_shader, glsl_es_source, link_program, ShaderStage};

#[cfg(not(target_arch = "wasm32"))]
pub use native::NativeContext;
#[cfg(target_arch = "wasm32")]
pub use web::WebContext;

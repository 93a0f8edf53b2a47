//! Engine context object.
//!
//! [`Engine`] owns the graphics context, the batch renderer and the frame
//! queue. It is built once at startup and passed to whatever draws; nothing
//! in the crate keeps global state.

mod config;
mod engine;

pub use config::EngineConfig;
pub use engine::Engine;

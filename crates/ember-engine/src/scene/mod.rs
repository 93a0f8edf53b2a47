//! Frame-level draw ordering.
//!
//! Responsibilities:
//! - track the nested clip state for the frame
//! - keep batched primitives and persistent shapes in call order

mod clip_stack;
mod queue;

pub use clip_stack::ClipStack;
pub use queue::{QueueItem, RenderQueue};

//! Primitive batching and persistent shapes.
//!
//! Convention:
//! - Primitives are described in logical pixels (top-left origin, +Y down).
//! - Positions are converted to NDC on the CPU; the vertex shader passes them
//!   through untouched.
//! - The fragment shader picks its signed distance function from the vertex
//!   op code.

mod buffer;
mod config;
mod convert;
mod ctx;
mod pipeline;
mod primitive;
mod runs;
mod scissor;
mod shape;
mod vertex;

pub use buffer::PrimitiveBuffer;
pub use config::BufferConfig;
pub use convert::{
    append_clip_rects, append_vertices, convert_primitives_to_vertices, extract_clip_rects,
    VERTICES_PER_PRIMITIVE,
};
pub use ctx::RenderCtx;
pub use pipeline::PrimitivePipeline;
pub use primitive::{OpCode, Primitive, PrimitiveKind};
pub use runs::{build_clip_runs, ClipRectRun};
pub use shape::{Shape, ShapeDraw};
pub use vertex::PrimitiveVertex;

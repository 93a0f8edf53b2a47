use bytemuck::{Pod, Zeroable};

use crate::gfx::consts::FLOAT;
use crate::gfx::GraphicsContext;

use super::OpCode;

/// One GPU vertex, shared by the batched buffer and persistent shapes.
///
/// Layout (60 bytes, tightly packed `f32`s):
/// - 0:  position        vec3, NDC
/// - 12: local_position  vec2, unit-square corner or barycentric
/// - 20: op_code         float
/// - 24: radius          float
/// - 28: color           vec4, linear straight alpha
/// - 44: tex_coords      vec2, glyph UV / line direction / half size
/// - 52: half_size       vec2, logical px
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct PrimitiveVertex {
    pub position: [f32; 3],
    pub local_position: [f32; 2],
    pub(crate) op_code: f32,
    pub radius: f32,
    pub color: [f32; 4],
    pub tex_coords: [f32; 2],
    pub half_size: [f32; 2],
}

const _: () = assert!(std::mem::size_of::<PrimitiveVertex>() == PrimitiveVertex::STRIDE);

/// Shader attribute slot: location, component count, byte offset.
struct Attribute {
    location: u32,
    components: i32,
    offset: i32,
}

impl PrimitiveVertex {
    pub const STRIDE: usize = 60;

    const ATTRIBUTES: [Attribute; 7] = [
        Attribute { location: 0, components: 3, offset: 0 },
        Attribute { location: 1, components: 2, offset: 12 },
        Attribute { location: 2, components: 1, offset: 20 },
        Attribute { location: 3, components: 1, offset: 24 },
        Attribute { location: 4, components: 4, offset: 28 },
        Attribute { location: 5, components: 2, offset: 44 },
        Attribute { location: 6, components: 2, offset: 52 },
    ];

    /// Describes this layout to the vertex array and buffer currently bound.
    pub(crate) fn bind_layout(gl: &dyn GraphicsContext) {
        for a in &Self::ATTRIBUTES {
            gl.enable_vertex_attrib_array(a.location);
            gl.vertex_attrib_pointer(
                a.location,
                a.components,
                FLOAT,
                false,
                Self::STRIDE as i32,
                a.offset,
            );
        }
    }

    #[inline]
    pub fn op_code(&self) -> Option<OpCode> {
        OpCode::from_gpu(self.op_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::{GlCall, HeadlessContext};

    #[test]
    fn field_offsets_match_attribute_table() {
        let v = PrimitiveVertex::default();
        let base = &v as *const _ as usize;
        let offset = |p: *const f32| p as usize - base;

        assert_eq!(offset(v.position.as_ptr()), 0);
        assert_eq!(offset(v.local_position.as_ptr()), 12);
        assert_eq!(offset(&v.op_code), 20);
        assert_eq!(offset(&v.radius), 24);
        assert_eq!(offset(v.color.as_ptr()), 28);
        assert_eq!(offset(v.tex_coords.as_ptr()), 44);
        assert_eq!(offset(v.half_size.as_ptr()), 52);
    }

    #[test]
    fn bind_layout_declares_seven_attributes() {
        let gl = HeadlessContext::new();
        PrimitiveVertex::bind_layout(&gl);

        let pointers: Vec<_> = gl
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                GlCall::VertexAttribPointer { index, size, stride, offset } => {
                    Some((index, size, stride, offset))
                }
                _ => None,
            })
            .collect();

        assert_eq!(
            pointers,
            vec![
                (0, 3, 60, 0),
                (1, 2, 60, 12),
                (2, 1, 60, 20),
                (3, 1, 60, 24),
                (4, 4, 60, 28),
                (5, 2, 60, 44),
                (6, 2, 60, 52),
            ]
        );
    }
}

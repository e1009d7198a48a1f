//! Full-screen quad geometry and the built-in vertex stage that draws it.
use crate::driver::VertexLayout;

pub const POSITION_ATTRIBUTE: &str = "position";
pub const TEXCOORD_ATTRIBUTE: &str = "texcoord";

/// Pass-through vertex stage for the screen quad.
pub const QUAD_VERTEX_SHADER: &str = "#version 120\n\
attribute vec2 position;\n\
void main()\n\
{\n\
    gl_Position = vec4(position, 0.0, 1.0);\n\
}\n";

/// Two triangles covering clip space; each vertex is `x, y, u, v`.
pub const QUAD_VERTICES: [[f32; 4]; 6] = [
    [-1.0, 1.0, 0.0, 1.0],
    [1.0, 1.0, 1.0, 1.0],
    [1.0, -1.0, 1.0, 0.0],
    [1.0, -1.0, 1.0, 0.0],
    [-1.0, -1.0, 0.0, 0.0],
    [-1.0, 1.0, 0.0, 1.0],
];

const VERTEX_STRIDE: i32 = std::mem::size_of::<[f32; 4]>() as i32;

pub const POSITION_LAYOUT: VertexLayout = VertexLayout::floats(2, VERTEX_STRIDE, 0);
pub const TEXCOORD_LAYOUT: VertexLayout = VertexLayout::floats(2, VERTEX_STRIDE, 8);

pub fn vertex_bytes() -> &'static [u8] {
    bytemuck::cast_slice(&QUAD_VERTICES)
}

use glow::{NativeBuffer, NativeVertexArray};

/// GPU side of an indexed triangle mesh: one vertex buffer, one `u16` index
/// buffer and the vertex array tying them together.
///
/// Created and destroyed through [OpenGLRenderBackend](super::opengl_render_backend::OpenGLRenderBackend).
pub struct Mesh {
    pub(super) vertex_array: NativeVertexArray,
    pub(super) vertex_buffer: NativeBuffer,
    pub(super) index_buffer: NativeBuffer,
    pub(super) index_count: usize,
    /// Floats per vertex
    pub(super) components: i32,
    /// Vertex attribute currently fed from the vertex buffer
    pub(super) attribute: Option<u32>,
}

impl Mesh {
    #[inline(always)]
    pub fn index_count(&self) -> usize {
        self.index_count
    }

    #[inline(always)]
    pub fn attribute(&self) -> Option<u32> {
        self.attribute
    }
}

/// Full-screen quad in clip space, two floats per vertex
pub const QUAD_VERTICES: [f32; 8] = [
    -1.0, -1.0, //
    1.0, -1.0, //
    1.0, 1.0, //
    -1.0, 1.0, //
];

pub const QUAD_INDICES: [u16; 6] = [0, 1, 2, 2, 3, 0];

pub const QUAD_COMPONENTS: i32 = 2;

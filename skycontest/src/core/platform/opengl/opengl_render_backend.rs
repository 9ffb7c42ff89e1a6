use std::mem::size_of;

use glow::{Context, HasContext};

use crate::core::platform::opengl::opengl_buffer::Mesh;

/// Fixed-function side of the renderer: clearing, viewport and mesh draws.
///
/// Shader programs do not go through here, they use
/// [OpenGLShaderBackend](super::opengl_shader_backend::OpenGLShaderBackend).
/// The glow context is only valid on the thread that owns the GL context.
pub struct OpenGLRenderBackend {
    clear_color: [f32; 4],
    gl: Context,
}

impl OpenGLRenderBackend {
    pub fn new(gl: Context) -> Self {
        let mut result = OpenGLRenderBackend {
            clear_color: [0.0, 0.0, 0.0, 1.0],
            gl,
        };
        result.init();
        result
    }

    fn init(&mut self) {
        log::info!("Glow OpenGL successfully initialized!");
        log::info!("\tOpenGL Version: {}", self.get_string(glow::VERSION));
        log::info!("\tOpenGL Renderer: {}", self.get_string(glow::RENDERER));
        log::info!("\tOpenGL Vendor: {}", self.get_string(glow::VENDOR));

        unsafe {
            self.gl.disable(glow::DEPTH_TEST);
        }
        self.set_clear_color(self.clear_color);
    }

    pub fn set_clear_color(&mut self, color: [f32; 4]) {
        self.clear_color = color;
        let [r, g, b, a] = color;
        unsafe {
            self.gl.clear_color(r, g, b, a);
        }
    }

    #[inline(always)]
    pub fn clear_color(&self) -> [f32; 4] {
        self.clear_color
    }

    pub fn clear(&self) {
        unsafe {
            self.gl.clear(glow::COLOR_BUFFER_BIT);
        }
    }

    pub fn set_viewport(&self, x: u32, y: u32, width: u32, height: u32) {
        unsafe {
            self.gl
                .viewport(x as i32, y as i32, width as i32, height as i32);
        }
    }

    /// Upload `vertices` (tightly packed, `components` floats each) and
    /// `indices`. The vertex data is not fed to any attribute until
    /// [OpenGLRenderBackend::bind_mesh_attribute] is called.
    pub fn create_mesh(
        &mut self,
        vertices: &[f32],
        components: i32,
        indices: &[u16],
    ) -> Result<Mesh, String> {
        let gl = &self.gl;

        unsafe {
            let vertex_array = gl.create_vertex_array()?;
            let vertex_buffer = match gl.create_buffer() {
                Ok(buffer) => buffer,
                Err(e) => {
                    gl.delete_vertex_array(vertex_array);
                    return Err(e);
                }
            };
            let index_buffer = match gl.create_buffer() {
                Ok(buffer) => buffer,
                Err(e) => {
                    gl.delete_buffer(vertex_buffer);
                    gl.delete_vertex_array(vertex_array);
                    return Err(e);
                }
            };

            gl.bind_vertex_array(Some(vertex_array));

            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vertex_buffer));
            let bytes = std::slice::from_raw_parts(
                vertices.as_ptr().cast::<u8>(),
                vertices.len() * size_of::<f32>(),
            );
            gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, bytes, glow::STATIC_DRAW);

            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(index_buffer));
            let bytes = std::slice::from_raw_parts(
                indices.as_ptr().cast::<u8>(),
                indices.len() * size_of::<u16>(),
            );
            gl.buffer_data_u8_slice(glow::ELEMENT_ARRAY_BUFFER, bytes, glow::STATIC_DRAW);

            // The element buffer binding is recorded in the vertex array
            gl.bind_vertex_array(None);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);

            Ok(Mesh {
                vertex_array,
                vertex_buffer,
                index_buffer,
                index_count: indices.len(),
                components,
                attribute: None,
            })
        }
    }

    /// Feed the mesh vertices to attribute `location`, usually resolved by
    /// name with [ShaderProgram::attribute_slot](crate::core::rendering::shader_program::ShaderProgram::attribute_slot).
    pub fn bind_mesh_attribute(&self, mesh: &mut Mesh, location: u32) {
        if mesh.attribute == Some(location) {
            return;
        }

        let gl = &self.gl;
        unsafe {
            gl.bind_vertex_array(Some(mesh.vertex_array));
            if let Some(previous) = mesh.attribute {
                gl.disable_vertex_attrib_array(previous);
            }

            gl.bind_buffer(glow::ARRAY_BUFFER, Some(mesh.vertex_buffer));
            gl.enable_vertex_attrib_array(location);
            gl.vertex_attrib_pointer_f32(
                location,
                mesh.components,
                glow::FLOAT,
                false,
                mesh.components * size_of::<f32>() as i32,
                0,
            );

            gl.bind_vertex_array(None);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);
        }
        mesh.attribute = Some(location);
    }

    pub fn draw_indexed(&self, mesh: &Mesh) {
        unsafe {
            self.gl.bind_vertex_array(Some(mesh.vertex_array));
            self.gl.draw_elements(
                glow::TRIANGLES,
                mesh.index_count as i32,
                glow::UNSIGNED_SHORT,
                0,
            );
            self.gl.bind_vertex_array(None);
        }
    }

    pub fn destroy_mesh(&mut self, mesh: Mesh) {
        unsafe {
            self.gl.delete_vertex_array(mesh.vertex_array);
            self.gl.delete_buffer(mesh.vertex_buffer);
            self.gl.delete_buffer(mesh.index_buffer);
        }
    }

    #[inline(always)]
    fn get_string(&self, variant: u32) -> String {
        unsafe { self.gl.get_parameter_string(variant) }
    }
}

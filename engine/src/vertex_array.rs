//! Vertex array objects.

use crate::{buffer::VertexBuffer, layout::VertexBufferLayout, Error, Gl, Result};
use std::fmt;

/// Records which vertex buffers feed which shader attributes, along with the bound index buffer.
///
/// Use [`VertexArray::add_buffer`] to pair a vertex buffer with the layout describing its
/// vertices.
#[must_use]
pub struct VertexArray {
    gl: Gl,
    id: glow::VertexArray,
}

impl fmt::Debug for VertexArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VertexArray")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl VertexArray {
    pub fn new(gl: &Gl) -> Result<Self> {
        let id = gl_call!(gl, create_vertex_array())?.map_err(Error::Create)?;
        Ok(Self {
            gl: Gl::clone(gl),
            id,
        })
    }

    /// Point one attribute per layout entry at `buffer`, starting from location 0.
    pub fn add_buffer(&self, buffer: &VertexBuffer, layout: &VertexBufferLayout) -> Result<()> {
        self.bind()?;
        buffer.bind()?;

        let stride = layout.stride() as i32;
        for (index, attribute, offset) in layout.offsets() {
            let size = attribute.count as i32;
            let offset = offset as i32;
            let ty = attribute.ty.gl_type();
            gl_call!(self.gl, enable_vertex_attrib_array(index))?;
            if attribute.ty.is_integer() && !attribute.normalized {
                gl_call!(
                    self.gl,
                    vertex_attrib_pointer_i32(index, size, ty, stride, offset)
                )?;
            } else {
                gl_call!(
                    self.gl,
                    vertex_attrib_pointer_f32(index, size, ty, attribute.normalized, stride, offset)
                )?;
            }
        }
        tracing::trace!(
            "attached {} attribute(s) with stride {stride} to vertex array {:?}",
            layout.attributes().len(),
            self.id
        );
        Ok(())
    }

    #[inline]
    pub fn bind(&self) -> Result<()> {
        gl_call!(self.gl, bind_vertex_array(Some(self.id)))
    }

    #[inline]
    pub fn unbind(&self) -> Result<()> {
        gl_call!(self.gl, bind_vertex_array(None))
    }
}

impl Drop for VertexArray {
    fn drop(&mut self) {
        let _ = gl_call!(self.gl, delete_vertex_array(self.id));
    }
}

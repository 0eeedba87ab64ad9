//! GPU vertex and index buffers.

use crate::{Error, Gl, Result};
use bytemuck::Pod;
use std::{fmt, mem};

/// Interleaved vertex data uploaded once to GPU memory.
///
/// Describe the data with a [`VertexBufferLayout`](crate::layout::VertexBufferLayout) and attach
/// both to a [`VertexArray`](crate::vertex_array::VertexArray).
#[must_use]
pub struct VertexBuffer {
    gl: Gl,
    id: glow::Buffer,
    size: usize,
}

impl fmt::Debug for VertexBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VertexBuffer")
            .field("id", &self.id)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

impl VertexBuffer {
    /// Create a static vertex buffer from a slice of plain-old-data vertices.
    pub fn new<T: Pod>(gl: &Gl, data: &[T]) -> Result<Self> {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        let id = gl_call!(gl, create_buffer())?.map_err(Error::Create)?;
        let buffer = Self {
            gl: Gl::clone(gl),
            id,
            size: bytes.len(),
        };
        buffer.bind()?;
        gl_call!(
            gl,
            buffer_data_u8_slice(glow::ARRAY_BUFFER, bytes, glow::STATIC_DRAW)
        )?;
        tracing::debug!("created vertex buffer {:?} ({} bytes)", buffer.id, buffer.size);
        Ok(buffer)
    }

    /// Size of the uploaded data in bytes.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn bind(&self) -> Result<()> {
        gl_call!(self.gl, bind_buffer(glow::ARRAY_BUFFER, Some(self.id)))
    }

    #[inline]
    pub fn unbind(&self) -> Result<()> {
        gl_call!(self.gl, bind_buffer(glow::ARRAY_BUFFER, None))
    }
}

impl Drop for VertexBuffer {
    fn drop(&mut self) {
        let _ = gl_call!(self.gl, delete_buffer(self.id));
    }
}

/// Indices grouping the vertices of the bound vertex array into triangles.
///
/// An element buffer binding is recorded by the currently bound
/// [`VertexArray`](crate::vertex_array::VertexArray), so bind the array first.
#[must_use]
pub struct IndexBuffer {
    gl: Gl,
    id: glow::Buffer,
    count: usize,
}

impl fmt::Debug for IndexBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexBuffer")
            .field("id", &self.id)
            .field("count", &self.count)
            .finish_non_exhaustive()
    }
}

impl IndexBuffer {
    /// The OpenGL type of a single index.
    pub const INDEX_TYPE: u32 = glow::UNSIGNED_INT;

    pub fn new(gl: &Gl, indices: &[u32]) -> Result<Self> {
        let id = gl_call!(gl, create_buffer())?.map_err(Error::Create)?;
        let buffer = Self {
            gl: Gl::clone(gl),
            id,
            count: indices.len(),
        };
        buffer.bind()?;
        gl_call!(
            gl,
            buffer_data_u8_slice(
                glow::ELEMENT_ARRAY_BUFFER,
                bytemuck::cast_slice(indices),
                glow::STATIC_DRAW,
            )
        )?;
        tracing::debug!(
            "created index buffer {:?} ({} indices, {} bytes)",
            buffer.id,
            buffer.count,
            buffer.count * mem::size_of::<u32>()
        );
        Ok(buffer)
    }

    /// Number of indices.
    #[inline]
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn bind(&self) -> Result<()> {
        gl_call!(self.gl, bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(self.id)))
    }

    #[inline]
    pub fn unbind(&self) -> Result<()> {
        gl_call!(self.gl, bind_buffer(glow::ELEMENT_ARRAY_BUFFER, None))
    }
}

impl Drop for IndexBuffer {
    fn drop(&mut self) {
        let _ = gl_call!(self.gl, delete_buffer(self.id));
    }
}

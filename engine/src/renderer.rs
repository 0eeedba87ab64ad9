//! Bind-and-draw rendering.

use crate::{
    buffer::IndexBuffer, math::Vec4, shader::Shader, vertex_array::VertexArray, Gl, Result,
};
use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Buffers cleared by [`Renderer::clear`].
    #[derive(Default)]
    #[must_use]
    pub struct ClearFlags: u32 {
        const COLOR = glow::COLOR_BUFFER_BIT;
        const DEPTH = glow::DEPTH_BUFFER_BIT;
        const STENCIL = glow::STENCIL_BUFFER_BIT;
    }
}

#[must_use]
pub struct Renderer {
    gl: Gl,
    clear_color: Vec4,
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("clear_color", &self.clear_color)
            .finish_non_exhaustive()
    }
}

impl Renderer {
    pub fn new(gl: &Gl) -> Self {
        Self {
            gl: Gl::clone(gl),
            clear_color: Vec4::new(0.0, 0.0, 0.0, 1.0),
        }
    }

    /// The shared OpenGL context, for calls the renderer doesn't wrap.
    #[inline]
    pub fn gl(&self) -> &Gl {
        &self.gl
    }

    #[inline]
    pub fn clear_color(&self) -> Vec4 {
        self.clear_color
    }

    pub fn set_clear_color(&mut self, color: impl Into<Vec4>) -> Result<()> {
        let color = color.into();
        self.clear_color = color;
        gl_call!(self.gl, clear_color(color.x, color.y, color.z, color.w))
    }

    pub fn clear(&self, flags: ClearFlags) -> Result<()> {
        gl_call!(self.gl, clear(flags.bits()))
    }

    /// Enable standard alpha blending, `src * alpha + dst * (1 - alpha)`.
    pub fn enable_blending(&self) -> Result<()> {
        gl_call!(self.gl, enable(glow::BLEND))?;
        gl_call!(
            self.gl,
            blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA)
        )
    }

    pub fn disable_blending(&self) -> Result<()> {
        gl_call!(self.gl, disable(glow::BLEND))
    }

    /// Draw the triangles described by `ib` over the vertices in `va` with `shader`.
    pub fn draw(&self, va: &VertexArray, ib: &IndexBuffer, shader: &Shader) -> Result<()> {
        if ib.count() == 0 {
            return Ok(());
        }
        shader.bind()?;
        va.bind()?;
        ib.bind()?;
        gl_call!(
            self.gl,
            draw_elements(
                glow::TRIANGLES,
                ib.count() as i32,
                IndexBuffer::INDEX_TYPE,
                0,
            )
        )
    }

    /// Resize the viewport to the new framebuffer size.
    pub fn on_resized(&self, width: u32, height: u32) -> Result<()> {
        tracing::debug!("viewport resized: {width}x{height}");
        gl_call!(self.gl, viewport(0, 0, width as i32, height as i32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_flags_match_gl_bits() {
        assert_eq!(ClearFlags::COLOR.bits(), 0x4000);
        assert_eq!(ClearFlags::DEPTH.bits(), 0x0100);
        assert_eq!(
            (ClearFlags::COLOR | ClearFlags::DEPTH | ClearFlags::STENCIL).bits(),
            0x4000 | 0x0100 | 0x0400
        );
        assert!(ClearFlags::default().is_empty());
    }
}

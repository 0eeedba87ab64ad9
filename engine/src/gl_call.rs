//! OpenGL error checking.
//!
//! Wrap OpenGL calls in [`gl_call!`] to detect errors raised by that call. Checking is only
//! performed in debug builds since `glGetError` forces a pipeline sync.

use crate::{Error, Result};
use glow::HasContext;
use std::fmt;

/// Upper bound on queued errors drained at once. A lost context can report errors forever.
const MAX_QUEUED_ERRORS: usize = 32;

/// Evaluate a method on a `glow::Context`, returning `Result` with any OpenGL error raised.
///
/// ```ignore
/// let buffer = gl_call!(self.gl, create_buffer())?;
/// gl_call!(self.gl, bind_buffer(glow::ARRAY_BUFFER, Some(buffer)))?;
/// ```
#[macro_export]
macro_rules! gl_call {
    ($gl:expr, $($call:tt)+) => {{
        #[allow(unused_imports)]
        use $crate::glow::HasContext as _;
        let gl: &$crate::glow::Context = &$gl;
        $crate::gl_call::clear_errors(gl);
        // SAFETY: The caller owns a current context and only passes handles created by it.
        #[allow(unused_unsafe)]
        let value = unsafe { gl.$($call)+ };
        $crate::gl_call::check_errors(gl, stringify!($($call)+), file!(), line!()).map(|()| value)
    }};
}

/// A raw error code returned by `glGetError`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[must_use]
pub struct GlErrorCode(pub u32);

impl GlErrorCode {
    /// The symbolic name of the error code.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self.0 {
            glow::INVALID_ENUM => "INVALID_ENUM",
            glow::INVALID_VALUE => "INVALID_VALUE",
            glow::INVALID_OPERATION => "INVALID_OPERATION",
            glow::STACK_OVERFLOW => "STACK_OVERFLOW",
            glow::STACK_UNDERFLOW => "STACK_UNDERFLOW",
            glow::OUT_OF_MEMORY => "OUT_OF_MEMORY",
            glow::INVALID_FRAMEBUFFER_OPERATION => "INVALID_FRAMEBUFFER_OPERATION",
            _ => "UNKNOWN",
        }
    }
}

impl fmt::Display for GlErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[OpenGL Error] (0x{:04x}) {}", self.0, self.name())
    }
}

/// Drain every error currently queued on the context.
#[inline]
pub fn clear_errors(gl: &glow::Context) {
    if !cfg!(debug_assertions) {
        return;
    }
    for _ in 0..MAX_QUEUED_ERRORS {
        // SAFETY: `get_error` has no preconditions beyond a current context.
        if unsafe { gl.get_error() } == glow::NO_ERROR {
            break;
        }
    }
}

/// Log and return the first error queued on the context, if any.
pub fn check_errors(
    gl: &glow::Context,
    call: &'static str,
    file: &'static str,
    line: u32,
) -> Result<()> {
    if !cfg!(debug_assertions) {
        return Ok(());
    }
    // SAFETY: `get_error` has no preconditions beyond a current context.
    let code = unsafe { gl.get_error() };
    if code == glow::NO_ERROR {
        return Ok(());
    }
    let code = GlErrorCode(code);
    tracing::error!("{code}: {call} {file}: {line}");
    clear_errors(gl);
    Err(Error::OpenGl {
        code,
        call,
        file,
        line,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_names() {
        assert_eq!(GlErrorCode(0x0500).name(), "INVALID_ENUM");
        assert_eq!(GlErrorCode(0x0501).name(), "INVALID_VALUE");
        assert_eq!(GlErrorCode(0x0502).name(), "INVALID_OPERATION");
        assert_eq!(GlErrorCode(0x0505).name(), "OUT_OF_MEMORY");
        assert_eq!(GlErrorCode(0x0506).name(), "INVALID_FRAMEBUFFER_OPERATION");
        assert_eq!(GlErrorCode(0x1234).name(), "UNKNOWN");
    }

    #[test]
    fn error_code_display() {
        assert_eq!(
            GlErrorCode(glow::INVALID_OPERATION).to_string(),
            "[OpenGL Error] (0x0502) INVALID_OPERATION"
        );
    }

    #[test]
    fn opengl_error_display() {
        let err = Error::OpenGl {
            code: GlErrorCode(glow::INVALID_VALUE),
            call: "bind_buffer(glow::ARRAY_BUFFER, None)",
            file: "engine/src/buffer.rs",
            line: 42,
        };
        assert_eq!(
            err.to_string(),
            "[OpenGL Error] (0x0501) INVALID_VALUE: bind_buffer(glow::ARRAY_BUFFER, None) at engine/src/buffer.rs:42"
        );
    }
}

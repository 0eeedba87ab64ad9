//! Window and OpenGL context creation.

use crate::{config::Config, Error, Gl, Result};
use glow::HasContext;
use glutin::{
    config::ConfigTemplateBuilder,
    context::{ContextApi, ContextAttributesBuilder, GlProfile, PossiblyCurrentContext, Version},
    display::{Display as GlutinDisplay, DisplayApiPreference},
    prelude::*,
    surface::{Surface, SurfaceAttributesBuilder, SwapInterval, WindowSurface},
};
use raw_window_handle::{HasRawDisplayHandle, HasRawWindowHandle, RawWindowHandle};
use std::{fmt, num::NonZeroU32, rc::Rc};
use winit::{
    dpi::LogicalSize,
    event_loop::EventLoopWindowTarget,
    window::{Window, WindowBuilder},
};

/// Requested context version. The core profile allows multiple vertex array objects, where the
/// compatibility profile only has a single global default one.
const GL_VERSION: (u8, u8) = (3, 3);

/// A window with a current OpenGL 3.3 core context.
#[must_use]
pub struct Display {
    gl: Gl,
    surface: Surface<WindowSurface>,
    context: PossiblyCurrentContext,
    window: Rc<Window>,
    should_close: bool,
}

impl fmt::Debug for Display {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Display")
            .field("window", &self.window.id())
            .field("should_close", &self.should_close)
            .finish_non_exhaustive()
    }
}

impl Display {
    /// Create the window and make its OpenGL context current.
    pub fn new<T>(event_loop: &EventLoopWindowTarget<T>, config: &Config) -> Result<Self> {
        let window = WindowBuilder::new()
            .with_title(config.title.as_ref())
            .with_inner_size(LogicalSize::new(config.width, config.height))
            .build(event_loop)
            .map_err(|err| Error::Context(format!("failed to create window: {err}")))?;

        // SAFETY: The display handle belongs to the event loop, which outlives the display.
        let gl_display = unsafe {
            GlutinDisplay::new(
                window.raw_display_handle(),
                api_preference(window.raw_window_handle()),
            )
        }
        .map_err(|err| Error::Context(format!("failed to create OpenGL display: {err}")))?;

        let template = ConfigTemplateBuilder::new().with_alpha_size(8);
        #[cfg(windows)]
        let template = template.compatible_with_native_window(window.raw_window_handle());
        // SAFETY: The template only references `window`, which is still alive.
        let gl_config = unsafe { gl_display.find_configs(template.build()) }
            .map_err(|err| Error::Context(format!("failed to query OpenGL configs: {err}")))
            .and_then(|configs| {
                most_samples(configs, GlConfig::num_samples)
                    .ok_or_else(|| Error::Context("no matching OpenGL config".into()))
            })?;
        tracing::debug!(
            "picked GL config with {} samples from {:?}",
            gl_config.num_samples(),
            gl_display.version_string()
        );

        let raw_window_handle = window.raw_window_handle();
        let context_attributes = ContextAttributesBuilder::new()
            .with_profile(GlProfile::Core)
            .with_context_api(ContextApi::OpenGl(Some(Version::new(GL_VERSION.0, GL_VERSION.1))))
            .with_debug(config.gl_debug)
            .build(Some(raw_window_handle));

        // SAFETY: The raw window handle belongs to `window`, which outlives the context.
        let not_current = unsafe { gl_display.create_context(&gl_config, &context_attributes) }
            .map_err(|err| Error::Context(format!("failed to create OpenGL context: {err}")))?;

        let size = window.inner_size();
        let surface_attributes = SurfaceAttributesBuilder::<WindowSurface>::new().build(
            raw_window_handle,
            non_zero(size.width),
            non_zero(size.height),
        );
        // SAFETY: The raw window handle belongs to `window`, which outlives the surface.
        let surface = unsafe { gl_display.create_window_surface(&gl_config, &surface_attributes) }
            .map_err(|err| Error::Context(format!("failed to create window surface: {err}")))?;

        let context = not_current
            .make_current(&surface)
            .map_err(|err| Error::Context(format!("failed to make context current: {err}")))?;

        let interval = if config.vsync {
            SwapInterval::Wait(NonZeroU32::MIN)
        } else {
            SwapInterval::DontWait
        };
        if let Err(err) = surface.set_swap_interval(&context, interval) {
            tracing::warn!("failed to set swap interval: {err}");
        }

        // SAFETY: The context is current on this thread and its symbols stay loaded while the
        // display lives.
        let gl = unsafe {
            glow::Context::from_loader_function_cstr(|symbol| gl_display.get_proc_address(symbol))
        };
        log_driver_info(&gl);

        Ok(Self {
            gl: Rc::new(gl),
            surface,
            context,
            window: Rc::new(window),
            should_close: false,
        })
    }

    #[inline]
    pub fn gl(&self) -> &Gl {
        &self.gl
    }

    #[inline]
    #[must_use]
    pub fn window(&self) -> &Rc<Window> {
        &self.window
    }

    #[inline]
    #[must_use]
    pub fn should_close(&self) -> bool {
        self.should_close
    }

    #[inline]
    pub fn request_close(&mut self) {
        self.should_close = true;
    }

    /// Present the back buffer.
    pub fn end_frame(&self) -> Result<()> {
        self.surface
            .swap_buffers(&self.context)
            .map_err(|err| Error::Context(format!("failed to swap buffers: {err}")))
    }

    /// Resize the window surface. Zero-sized (minimized) windows are ignored.
    pub fn resize(&self, width: u32, height: u32) {
        if let (Some(width), Some(height)) = (NonZeroU32::new(width), NonZeroU32::new(height)) {
            self.surface.resize(&self.context, width, height);
        }
    }
}

/// Platform windowing API used to create contexts.
fn api_preference(_window: RawWindowHandle) -> DisplayApiPreference {
    #[cfg(target_os = "macos")]
    let preference = DisplayApiPreference::Cgl;
    #[cfg(windows)]
    let preference = DisplayApiPreference::Wgl(Some(_window));
    #[cfg(all(unix, not(target_os = "macos")))]
    let preference = DisplayApiPreference::Egl;
    preference
}

/// The config with the most samples, keeping the earliest on ties. `None` if there are none.
fn most_samples<C>(configs: impl Iterator<Item = C>, samples: impl Fn(&C) -> u8) -> Option<C> {
    configs.reduce(|best, config| {
        if samples(&config) > samples(&best) {
            config
        } else {
            best
        }
    })
}

#[inline]
fn non_zero(value: u32) -> NonZeroU32 {
    NonZeroU32::new(value).unwrap_or(NonZeroU32::MIN)
}

fn log_driver_info(gl: &glow::Context) {
    // SAFETY: Querying strings has no preconditions beyond a current context.
    let (version, vendor, renderer) = unsafe {
        (
            gl.get_parameter_string(glow::VERSION),
            gl.get_parameter_string(glow::VENDOR),
            gl.get_parameter_string(glow::RENDERER),
        )
    };
    tracing::info!("using OpenGL {version}");
    tracing::info!("vendor: {vendor}, renderer: {renderer}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_most_samples() {
        let configs = [(0, 0), (1, 4), (2, 8), (3, 2)];
        let best = most_samples(configs.into_iter(), |&(_, samples)| samples);
        assert_eq!(best, Some((2, 8)));
    }

    #[test]
    fn ties_keep_first_config() {
        let configs = [(0, 4), (1, 4)];
        assert_eq!(most_samples(configs.into_iter(), |&(_, s)| s), Some((0, 4)));
    }

    #[test]
    fn no_configs_is_none() {
        assert_eq!(most_samples(std::iter::empty::<u8>(), |&s| s), None);
    }
}

//! Dear ImGui integration: winit input handling and an OpenGL renderer.

use crate::{Error, Gl, Result};
use derive_more::{Deref, DerefMut};
use imgui_glow_renderer::{Renderer as GlowRenderer, SimpleTextureMap};
use imgui_winit_support::{HiDpiMode, WinitPlatform};
use std::{fmt, time::Duration};
use winit::{event::Event, window::Window};

pub use ::imgui::Ui;

#[derive(Deref, DerefMut)]
#[must_use]
pub struct ImGui {
    #[deref]
    #[deref_mut]
    pub(crate) cx: ::imgui::Context,
    platform: WinitPlatform,
    renderer: GlowRenderer,
    texture_map: SimpleTextureMap,
    gl: Gl,
}

impl fmt::Debug for ImGui {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImGui")
            .field("display_size", &self.cx.io().display_size)
            .finish_non_exhaustive()
    }
}

impl ImGui {
    /// Initialize the imgui `Context` and upload its font atlas.
    pub fn initialize(gl: &Gl, window: &Window) -> Result<Self> {
        let mut cx = ::imgui::Context::create();
        cx.set_ini_filename(None);

        let mut platform = WinitPlatform::init(&mut cx);
        platform.attach_window(cx.io_mut(), window, HiDpiMode::Rounded);
        cx.fonts()
            .add_font(&[::imgui::FontSource::DefaultFontData { config: None }]);
        cx.io_mut().font_global_scale = (1.0 / platform.hidpi_factor()) as f32;

        let mut texture_map = SimpleTextureMap::default();
        let renderer = GlowRenderer::initialize(gl, &mut cx, &mut texture_map, false)
            .map_err(|err| Error::Context(format!("failed to initialize imgui renderer: {err}")))?;
        tracing::debug!("initialized imgui");

        Ok(Self {
            cx,
            platform,
            renderer,
            texture_map,
            gl: Gl::clone(gl),
        })
    }

    /// Forward a window event to imgui.
    #[inline]
    pub fn handle_event<T>(&mut self, window: &Window, event: &Event<T>) {
        self.platform.handle_event(self.cx.io_mut(), window, event);
    }

    #[inline]
    pub fn update_delta_time(&mut self, delta_time: Duration) {
        self.cx.io_mut().update_delta_time(delta_time);
    }

    /// Build a frame with `build_ui` and draw it over the current framebuffer.
    pub fn render(
        &mut self,
        window: &Window,
        build_ui: impl FnOnce(&Ui) -> Result<()>,
    ) -> Result<()> {
        if let Err(err) = self.platform.prepare_frame(self.cx.io_mut(), window) {
            tracing::error!("failed to prepare imgui frame: {err}");
        }

        let ui = self.cx.new_frame();
        let result = build_ui(ui);
        self.platform.prepare_render(ui, window);
        let draw_data = self.cx.render();

        self.renderer
            .render(&self.gl, &self.texture_map, draw_data)
            .map_err(|err| Error::Context(format!("failed to render imgui: {err}")))?;
        result
    }
}

impl Drop for ImGui {
    fn drop(&mut self) {
        self.renderer.destroy(&self.gl);
    }
}

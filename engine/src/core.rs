//! Core engine features

use crate::{
    config::Config,
    context::{Context, FrameTimer},
    display::Display,
    imgui::{ImGui, Ui},
    renderer::ClearFlags,
    Error, Result,
};
use derive_builder::Builder;
use std::{
    borrow::Cow,
    fmt,
    rc::Rc,
    thread,
    time::{Duration, Instant},
};
use winit::{
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget},
};

pub trait Application {
    /// Called once the window and OpenGL context exist.
    fn on_start(&mut self, _cx: &mut Context) -> Result<()> {
        Ok(())
    }

    /// Called every frame, after the framebuffer is cleared.
    fn on_update(&mut self, delta_time: f32, cx: &mut Context) -> Result<()>;

    /// Called every frame after `on_update`.
    fn on_render(&mut self, _cx: &mut Context) -> Result<()> {
        Ok(())
    }

    /// Called every frame to build the debug UI, drawn over the rendered scene.
    fn on_imgui(&mut self, _ui: &Ui, _cx: &mut Context) -> Result<()> {
        Ok(())
    }

    /// Called on every window event.
    fn on_event(&mut self, _event: &WindowEvent, _cx: &mut Context) {}

    /// Called on engine shutdown, while the OpenGL context is still current.
    fn on_stop(&mut self, _cx: &mut Context) {}
}

/// Window and loop settings. Setters left unset fall back to `config`.
#[derive(Debug, Clone, Builder)]
#[builder(default, derive(Debug), build_fn(error = "Error", validate = "Self::validate"))]
#[builder_struct_attr(must_use)]
#[must_use]
pub struct Engine {
    #[builder(setter(into, strip_option))]
    title: Option<Cow<'static, str>>,
    #[builder(setter(strip_option))]
    width: Option<u32>,
    #[builder(setter(strip_option))]
    height: Option<u32>,
    #[builder(setter(strip_option))]
    vsync: Option<bool>,
    config: Config,
}

impl EngineBuilder {
    fn validate(&self) -> Result<()> {
        let width = self.width.flatten();
        let height = self.height.flatten();
        if width == Some(0) || height == Some(0) {
            return Err(Error::Context(format!(
                "invalid window size: {}x{}",
                width.unwrap_or_default(),
                height.unwrap_or_default()
            )));
        }
        Ok(())
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Engine {
    pub fn new(config: Config) -> Self {
        Self {
            title: None,
            width: None,
            height: None,
            vsync: None,
            config,
        }
    }

    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// The effective configuration, with explicit settings applied over `config`.
    pub fn config(&self) -> Config {
        let mut config = self.config.clone();
        if let Some(title) = &self.title {
            config.title = title.clone();
        }
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(vsync) = self.vsync {
            config.vsync = vsync;
        }
        config
    }

    /// Create the window and run `app` until the window closes.
    pub fn run(self, app: impl Application + 'static) -> Result<()> {
        let event_loop = EventLoop::new()
            .map_err(|err| Error::Context(format!("failed to create event loop: {err}")))?;

        let config = self.config();
        let display = Display::new(&*event_loop, &config)?;
        let imgui = ImGui::initialize(display.gl(), display.window())?;
        let mut cx = Context::new(config, display);
        let size = cx.window().inner_size();
        cx.on_resized(size.width, size.height)?;

        let mut runtime = Runtime { app, imgui, cx };
        runtime.app.on_start(&mut runtime.cx)?;
        tracing::info!("starting main loop");

        let mut runtime = Some(runtime);
        let mut exit_result = Ok(());
        event_loop
            .run(|event, window_target| {
                if let Some(rt) = &mut runtime {
                    if let Err(err) = rt.handle_event(&event, window_target) {
                        tracing::error!("{err}");
                        if exit_result.is_ok() {
                            exit_result = Err(err);
                        }
                        window_target.exit();
                    }
                }
                if matches!(event, Event::LoopExiting) {
                    if let Some(mut rt) = runtime.take() {
                        tracing::info!("shutting down...");
                        rt.app.on_stop(&mut rt.cx);
                    }
                }
            })
            .map_err(|err| Error::Context(format!("event loop failed: {err}")))?;
        exit_result
    }
}

/// Per-run state. Field order is drop order: application resources and imgui must be released
/// before the display destroys the OpenGL context.
struct Runtime<A> {
    app: A,
    imgui: ImGui,
    cx: Context,
}

impl<A> fmt::Debug for Runtime<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("imgui", &self.imgui)
            .field("cx", &self.cx)
            .finish_non_exhaustive()
    }
}

impl<A: Application> Runtime<A> {
    fn handle_event(
        &mut self,
        event: &Event<()>,
        window_target: &EventLoopWindowTarget<()>,
    ) -> Result<()> {
        // Stop spinning while minimized.
        window_target.set_control_flow(if self.cx.suspended {
            ControlFlow::Wait
        } else {
            ControlFlow::Poll
        });

        let window = Rc::clone(self.cx.display.window());
        self.imgui.handle_event(&window, event);

        match event {
            Event::AboutToWait => window.request_redraw(),
            Event::WindowEvent { event, window_id } if *window_id == window.id() => {
                match event {
                    WindowEvent::RedrawRequested if self.cx.is_running() => self.frame()?,
                    WindowEvent::Resized(size) => self.cx.on_resized(size.width, size.height)?,
                    #[cfg(debug_assertions)]
                    WindowEvent::KeyboardInput { event: input, .. } => {
                        use winit::{
                            event::ElementState,
                            keyboard::{Key, NamedKey},
                        };
                        if input.state == ElementState::Pressed
                            && input.logical_key == Key::Named(NamedKey::Escape)
                        {
                            self.cx.quit();
                        }
                    }
                    WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                        tracing::debug!("window closed or destroyed");
                        self.cx.quit();
                    }
                    _ => (),
                }
                if !matches!(event, WindowEvent::RedrawRequested) {
                    self.app.on_event(event, &mut self.cx);
                }
            }
            _ => (),
        }

        if self.cx.display.should_close() {
            window_target.exit();
        }
        Ok(())
    }

    /// Clear, update, render, draw the UI and present.
    fn frame(&mut self) -> Result<()> {
        let Self { app, imgui, cx } = self;

        let start = Instant::now();
        let delta = cx.begin_frame(start);
        imgui.update_delta_time(delta);

        cx.renderer.clear(ClearFlags::COLOR)?;
        app.on_update(delta.as_secs_f32(), cx)?;
        app.on_render(cx)?;

        let window = Rc::clone(cx.display.window());
        imgui.render(&window, |ui| app.on_imgui(ui, cx))?;
        cx.display.end_frame()?;

        if cx.config.limit_frame_rate {
            let remaining = FrameTimer::remaining(cx.config.target_fps, start.elapsed());
            if remaining > Duration::from_millis(1) {
                thread::sleep(remaining - Duration::from_millis(1));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_config() {
        let config = Config {
            vsync: true,
            width: 640,
            ..Config::default()
        };
        let engine = Engine::builder()
            .config(config)
            .title("Quads")
            .height(720)
            .vsync(false)
            .build()
            .expect("valid engine");
        let config = engine.config();
        assert_eq!(config.title, "Quads");
        assert_eq!((config.width, config.height), (640, 720));
        assert!(!config.vsync);
    }

    #[test]
    fn builder_defaults() {
        let engine = Engine::builder().build().expect("valid engine");
        assert_eq!(engine.config(), Config::default());
    }

    #[test]
    fn builder_rejects_empty_window() {
        let err = Engine::builder()
            .width(0)
            .height(540)
            .build()
            .expect_err("zero width");
        assert_eq!(err.to_string(), "display error: invalid window size: 0x540");
    }
}

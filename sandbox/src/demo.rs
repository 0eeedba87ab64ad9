//! Demos selectable from an ImGui menu.

use anyhow::{anyhow, Result};
use quad_engine::{imgui::Ui, prelude::Context};
use std::fmt;

mod clear_color;
mod texture_2d;
mod uniform_color;

pub(crate) use clear_color::TestClearColor;
pub(crate) use texture_2d::TestTexture2D;
pub(crate) use uniform_color::TestUniformColor;

/// A self-contained demo. Any GPU objects it creates are released when it's dropped.
pub(crate) trait Test {
    /// Called every frame before rendering.
    fn on_update(&mut self, _delta_time: f32) {}

    /// Called every frame to draw the demo.
    fn on_render(&mut self, _cx: &mut Context) -> Result<()> {
        Ok(())
    }

    /// Called every frame inside the menu window to draw demo controls.
    fn on_imgui_render(&mut self, _ui: &Ui) {}
}

type TestFactory = Box<dyn Fn(&mut Context) -> Result<Box<dyn Test>>>;

/// Registry of demos. Shows a button per demo until one is opened, then that demo's controls
/// and a back button.
#[derive(Default)]
#[must_use]
pub(crate) struct TestMenu {
    tests: Vec<(&'static str, TestFactory)>,
    current: Option<(&'static str, Box<dyn Test>)>,
}

impl fmt::Debug for TestMenu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestMenu")
            .field("tests", &self.names().collect::<Vec<_>>())
            .field("current", &self.current())
            .finish()
    }
}

impl TestMenu {
    pub(crate) const WINDOW_TITLE: &'static str = "Test";
    pub(crate) const BACK_LABEL: &'static str = "<-";

    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register a demo created by `factory` when its button is clicked.
    pub(crate) fn register<T, F>(&mut self, name: &'static str, factory: F) -> &mut Self
    where
        T: Test + 'static,
        F: Fn(&mut Context) -> Result<T> + 'static,
    {
        tracing::debug!("registering test: {name}");
        self.tests.push((
            name,
            Box::new(move |cx| {
                let test: Box<dyn Test> = Box::new(factory(cx)?);
                Ok(test)
            }),
        ));
        self
    }

    /// Registered demo names, in registration order.
    pub(crate) fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.tests.iter().map(|(name, _)| *name)
    }

    /// Name of the open demo, if any.
    #[must_use]
    pub(crate) fn current(&self) -> Option<&'static str> {
        self.current.as_ref().map(|(name, _)| *name)
    }

    /// Create and open the demo registered as `name`, replacing any open demo.
    pub(crate) fn open(&mut self, name: &str, cx: &mut Context) -> Result<()> {
        let index = self
            .tests
            .iter()
            .position(|(test_name, _)| *test_name == name)
            .ok_or_else(|| anyhow!("no test registered as `{name}`"))?;
        self.close(cx)?;

        let (name, factory) = &self.tests[index];
        let name = *name;
        tracing::info!("opening test: {name}");
        let test = factory(cx)?;
        self.current = Some((name, test));
        Ok(())
    }

    /// Drop the open demo and restore default render state. Returns whether a demo was open.
    pub(crate) fn close(&mut self, cx: &mut Context) -> Result<bool> {
        let Some((name, test)) = self.current.take() else {
            return Ok(false);
        };
        drop(test);
        tracing::info!("closed test: {name}");
        let renderer = cx.renderer_mut();
        renderer.set_clear_color([0.0, 0.0, 0.0, 1.0])?;
        renderer.disable_blending()?;
        Ok(true)
    }

    pub(crate) fn on_update(&mut self, delta_time: f32) {
        if let Some((_, test)) = &mut self.current {
            test.on_update(delta_time);
        }
    }

    pub(crate) fn on_render(&mut self, cx: &mut Context) -> Result<()> {
        match &mut self.current {
            Some((_, test)) => test.on_render(cx),
            None => Ok(()),
        }
    }

    pub(crate) fn on_imgui_render(&mut self, ui: &Ui, cx: &mut Context) -> Result<()> {
        let mut go_back = false;
        let mut selected = None;
        ui.window(Self::WINDOW_TITLE)
            .always_auto_resize(true)
            .build(|| {
                match &mut self.current {
                    Some((_, test)) => {
                        go_back = ui.button(Self::BACK_LABEL);
                        test.on_imgui_render(ui);
                    }
                    None => {
                        for (name, _) in &self.tests {
                            if ui.button(name) {
                                selected = Some(*name);
                            }
                        }
                    }
                }
                let framerate = ui.io().framerate;
                ui.text(format!(
                    "Application average {:.3} ms/frame ({framerate:.1} FPS)",
                    1000.0 / framerate.max(f32::EPSILON)
                ));
            });

        if go_back {
            self.close(cx)?;
        }
        if let Some(name) = selected {
            self.open(name, cx)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;

    impl Test for Noop {}

    #[test]
    fn names_in_registration_order() {
        let mut menu = TestMenu::new();
        menu.register("Clear Color", |_| Ok(Noop))
            .register("Texture 2D", |_| Ok(Noop))
            .register("Uniform Color", |_| Ok(Noop));
        assert_eq!(
            menu.names().collect::<Vec<_>>(),
            ["Clear Color", "Texture 2D", "Uniform Color"]
        );
    }

    #[test]
    fn starts_on_menu() {
        let mut menu = TestMenu::new();
        menu.register("Noop", |_| Ok(Noop));
        assert_eq!(menu.current(), None);
        menu.on_update(0.016);
    }

    #[test]
    fn debug_lists_tests() {
        let mut menu = TestMenu::new();
        menu.register("Noop", |_| Ok(Noop));
        let debug = format!("{menu:?}");
        assert!(debug.contains("Noop"), "{debug}");
    }
}

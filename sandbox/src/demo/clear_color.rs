use super::Test;
use anyhow::Result;
use quad_engine::{imgui::Ui, prelude::*};

/// Fills the window with a color picked in the UI.
#[derive(Debug, Copy, Clone)]
#[must_use]
pub(crate) struct TestClearColor {
    color: [f32; 4],
}

impl Default for TestClearColor {
    fn default() -> Self {
        Self {
            color: Self::DEFAULT_COLOR,
        }
    }
}

impl TestClearColor {
    pub(crate) const DEFAULT_COLOR: [f32; 4] = [0.2, 0.3, 0.8, 1.0];

    pub(crate) fn new() -> Self {
        Self::default()
    }
}

impl Test for TestClearColor {
    fn on_render(&mut self, cx: &mut Context) -> Result<()> {
        let renderer = cx.renderer_mut();
        renderer.set_clear_color(self.color)?;
        renderer.clear(ClearFlags::COLOR)?;
        Ok(())
    }

    fn on_imgui_render(&mut self, ui: &Ui) {
        ui.color_edit4("Clear Color", &mut self.color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_default_color() {
        assert_eq!(TestClearColor::new().color, [0.2, 0.3, 0.8, 1.0]);
    }
}

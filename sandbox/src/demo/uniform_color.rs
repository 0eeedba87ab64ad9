use super::Test;
use anyhow::{Context as _, Result};
use quad_engine::prelude::*;

/// A scalar that ping-pongs between roughly `0.0` and `1.0` in fixed steps.
#[derive(Debug, Copy, Clone, PartialEq)]
#[must_use]
pub(crate) struct ColorCycle {
    value: f32,
    increment: f32,
}

impl Default for ColorCycle {
    fn default() -> Self {
        Self {
            value: 0.0,
            increment: Self::STEP,
        }
    }
}

impl ColorCycle {
    const STEP: f32 = 0.05;

    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Advance one frame, returning the value to draw with this frame.
    pub(crate) fn step(&mut self) -> f32 {
        let current = self.value;
        if self.value > 1.0 {
            self.increment = -Self::STEP;
        } else if self.value < Self::STEP {
            self.increment = Self::STEP;
        }
        self.value += self.increment;
        current
    }
}

/// A single quad in clip space whose red channel animates every frame.
#[derive(Debug)]
pub(crate) struct TestUniformColor {
    red: ColorCycle,
    color: Vec4,
    shader: Shader,
    index_buffer: IndexBuffer,
    vertex_array: VertexArray,
    _vertex_buffer: VertexBuffer,
}

impl TestUniformColor {
    const POSITIONS: [f32; 8] = [
        -0.5, -0.5, // 0
        0.5, -0.5, // 1
        0.5, 0.5, // 2
        -0.5, 0.5, // 3
    ];
    const INDICES: [u32; 6] = [0, 1, 2, 2, 3, 0];

    pub(crate) fn new(gl: &Gl) -> Result<Self> {
        let vertex_buffer = VertexBuffer::new(gl, &Self::POSITIONS)?;
        let vertex_array = VertexArray::new(gl)?;
        vertex_array.add_buffer(&vertex_buffer, &VertexBufferLayout::new().with::<f32>(2))?;
        let index_buffer = IndexBuffer::new(gl, &Self::INDICES)?;

        let shader = Shader::from_paths(
            gl,
            concat!(env!("CARGO_MANIFEST_DIR"), "/res/shaders/color.vert"),
            concat!(env!("CARGO_MANIFEST_DIR"), "/res/shaders/color.frag"),
        )
        .context("failed to load color shader")?;

        Ok(Self {
            red: ColorCycle::new(),
            color: Vec4::new(0.0, 0.6, 0.9, 1.0),
            shader,
            index_buffer,
            vertex_array,
            _vertex_buffer: vertex_buffer,
        })
    }
}

impl Test for TestUniformColor {
    fn on_update(&mut self, _delta_time: f32) {
        self.color.x = self.red.step();
    }

    fn on_render(&mut self, cx: &mut Context) -> Result<()> {
        let Vec4 { x, y, z, w } = self.color;
        self.shader.bind()?;
        self.shader.set_uniform_4f("u_Color", x, y, z, w)?;
        cx.renderer()
            .draw(&self.vertex_array, &self.index_buffer, &self.shader)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_cycle_starts_rising() {
        let mut cycle = ColorCycle::new();
        assert_eq!(cycle.step(), 0.0);
        assert!((cycle.step() - 0.05).abs() < f32::EPSILON);
        assert!((cycle.step() - 0.1).abs() < f32::EPSILON);
    }

    #[test]
    fn color_cycle_ping_pongs() {
        let mut cycle = ColorCycle::new();
        let values: Vec<f32> = (0..100).map(|_| cycle.step()).collect();
        assert!(values.iter().all(|&value| (-0.05..=1.1).contains(&value)));

        let peak = values
            .windows(2)
            .position(|pair| pair[1] < pair[0])
            .expect("value falls after rising");
        assert!(values[peak] > 1.0, "turned at {}", values[peak]);

        let trough = values[peak..]
            .windows(2)
            .position(|pair| pair[1] > pair[0])
            .expect("value rises after falling");
        assert!(values[peak + trough] < 0.05, "turned at {}", values[peak + trough]);
    }
}

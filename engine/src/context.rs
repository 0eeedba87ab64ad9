//! Engine context

use crate::{config::Config, display::Display, renderer::Renderer, Gl, Result};
use std::{
    fmt::Write,
    time::{Duration, Instant},
};
use winit::window::Window;

/// State handed to the [`Application`](crate::core::Application) every frame.
#[derive(Debug)]
#[must_use]
pub struct Context {
    pub(crate) config: Config,
    pub(crate) timer: FrameTimer,
    pub(crate) window_title: String,
    pub(crate) suspended: bool,
    pub(crate) renderer: Renderer,
    pub(crate) display: Display,
}

impl Context {
    pub(crate) fn new(config: Config, display: Display) -> Self {
        let renderer = Renderer::new(display.gl());
        Self {
            timer: FrameTimer::new(Instant::now()),
            window_title: String::with_capacity(config.title.len() + 16),
            suspended: false,
            config,
            renderer,
            display,
        }
    }

    #[inline]
    pub fn gl(&self) -> &Gl {
        self.display.gl()
    }

    #[inline]
    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    #[inline]
    pub fn renderer_mut(&mut self) -> &mut Renderer {
        &mut self.renderer
    }

    #[inline]
    #[must_use]
    pub fn window(&self) -> &Window {
        self.display.window()
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Seconds elapsed since the previous frame.
    #[inline]
    #[must_use]
    pub fn delta_time(&self) -> f32 {
        self.timer.delta_time().as_secs_f32()
    }

    /// Frames counted over the last full second.
    #[inline]
    #[must_use]
    pub fn fps(&self) -> usize {
        self.timer.fps()
    }

    #[inline]
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.suspended && !self.display.should_close()
    }

    /// Close the window at the end of the current frame.
    pub fn quit(&mut self) {
        tracing::debug!("quit requested");
        self.display.request_close();
    }

    pub(crate) fn on_resized(&mut self, width: u32, height: u32) -> Result<()> {
        tracing::debug!("resized event: {width}x{height}");
        self.suspended = width == 0 || height == 0;
        if self.suspended {
            return Ok(());
        }
        self.display.resize(width, height);
        self.renderer.on_resized(width, height)
    }

    /// Advance frame timing, updating the window title once per second.
    pub(crate) fn begin_frame(&mut self, now: Instant) -> Duration {
        let delta = self.timer.tick(now);
        if let Some(fps) = self.timer.take_fps_update() {
            self.window_title.clear();
            let _ = write!(self.window_title, "{} - FPS: {fps}", self.config.title);
            self.display.window().set_title(&self.window_title);
        }
        delta
    }
}

/// Tracks frame deltas and counts frames per second.
#[derive(Debug, Copy, Clone)]
#[must_use]
pub struct FrameTimer {
    last_frame_time: Instant,
    delta_time: Duration,
    fps_timer: Duration,
    fps_counter: usize,
    fps: usize,
    fps_updated: bool,
}

impl FrameTimer {
    const ONE_SECOND: Duration = Duration::from_secs(1);

    pub fn new(now: Instant) -> Self {
        Self {
            last_frame_time: now,
            delta_time: Duration::ZERO,
            fps_timer: Duration::ZERO,
            fps_counter: 0,
            fps: 0,
            fps_updated: false,
        }
    }

    /// Record a new frame starting at `now`, returning the time since the last one.
    pub fn tick(&mut self, now: Instant) -> Duration {
        self.delta_time = now.saturating_duration_since(self.last_frame_time);
        self.last_frame_time = now;
        self.fps_timer += self.delta_time;
        self.fps_counter += 1;
        if self.fps_timer >= Self::ONE_SECOND {
            self.fps = self.fps_counter;
            self.fps_counter = 0;
            self.fps_timer -= Self::ONE_SECOND;
            self.fps_updated = true;
        }
        self.delta_time
    }

    #[inline]
    #[must_use]
    pub fn delta_time(&self) -> Duration {
        self.delta_time
    }

    #[inline]
    #[must_use]
    pub fn fps(&self) -> usize {
        self.fps
    }

    /// Returns the new FPS once after each full second.
    #[inline]
    pub fn take_fps_update(&mut self) -> Option<usize> {
        std::mem::take(&mut self.fps_updated).then_some(self.fps)
    }

    /// Time left in the frame budget for `target_fps` given the work already done since `now`.
    #[must_use]
    pub fn remaining(target_fps: u32, elapsed: Duration) -> Duration {
        (Self::ONE_SECOND / target_fps.max(1))
            .checked_sub(elapsed)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_measures_delta() {
        let start = Instant::now();
        let mut timer = FrameTimer::new(start);
        let delta = timer.tick(start + Duration::from_millis(16));
        assert_eq!(delta, Duration::from_millis(16));
        assert_eq!(timer.delta_time(), Duration::from_millis(16));
    }

    #[test]
    fn fps_updates_once_per_second() {
        let start = Instant::now();
        let mut timer = FrameTimer::new(start);
        let frame = Duration::from_millis(10);
        for i in 1..100 {
            timer.tick(start + frame * i);
            assert_eq!(timer.take_fps_update(), None);
        }
        timer.tick(start + frame * 100);
        assert_eq!(timer.take_fps_update(), Some(100));
        assert_eq!(timer.take_fps_update(), None);
        assert_eq!(timer.fps(), 100);
    }

    #[test]
    fn clock_going_backwards_is_zero_delta() {
        let start = Instant::now() + Duration::from_secs(1);
        let mut timer = FrameTimer::new(start);
        assert_eq!(timer.tick(start - Duration::from_millis(5)), Duration::ZERO);
    }

    #[test]
    fn remaining_frame_budget() {
        assert_eq!(
            FrameTimer::remaining(50, Duration::from_millis(5)),
            Duration::from_millis(15)
        );
        assert_eq!(
            FrameTimer::remaining(50, Duration::from_millis(25)),
            Duration::ZERO
        );
        assert_eq!(FrameTimer::remaining(0, Duration::ZERO), Duration::from_secs(1));
    }
}

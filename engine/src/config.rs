//! Engine configuration.
//!
//! Values come from defaults, then an optional TOML file, then environment variables.

use crate::Result;
use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use std::{borrow::Cow, env, fs, io, path::Path};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[must_use]
pub struct Config {
    pub title: Cow<'static, str>,
    pub width: u32,
    pub height: u32,
    /// Synchronize buffer swaps with the display refresh.
    pub vsync: bool,
    /// Request a debug context.
    pub gl_debug: bool,
    pub limit_frame_rate: bool,
    pub target_fps: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "Hello World".into(),
            width: 960,
            height: 540,
            vsync: true,
            gl_debug: cfg!(debug_assertions),
            limit_frame_rate: false,
            target_fps: 60,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file, falling back to defaults if it doesn't exist, and
    /// apply environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config = match fs::read_to_string(path) {
            Ok(contents) => Self::from_toml(&contents)?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("no config found at {path:?}, using defaults");
                Self::default()
            }
            Err(err) => {
                return Err(anyhow::Error::new(err)
                    .context(format!("failed to read config: {path:?}"))
                    .into())
            }
        };
        Ok(config.with_overrides(|key| env::var(key).ok()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Apply `VSYNC`, `GL_DEBUG`, `LIMIT_FPS` and `TARGET_FPS` overrides from `lookup`.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let flag = |key: &str| {
            lookup(key).map(|value| !matches!(value.trim(), "0" | "false" | "off" | "no"))
        };
        if let Some(vsync) = flag("VSYNC") {
            self.vsync = vsync;
        }
        if let Some(gl_debug) = flag("GL_DEBUG") {
            self.gl_debug = gl_debug;
        }
        if let Some(limit_frame_rate) = flag("LIMIT_FPS") {
            self.limit_frame_rate = limit_frame_rate;
        }
        if let Some(target_fps) = lookup("TARGET_FPS")
            .and_then(|target_fps| target_fps.trim().parse::<u32>().ok())
            .filter(|&target_fps| target_fps > 0)
        {
            self.target_fps = target_fps;
        }
        self
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self).context("failed to serialize config")?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = Config::from_toml("title = \"Quads\"\nvsync = false\n").expect("valid toml");
        assert_eq!(config.title, "Quads");
        assert!(!config.vsync);
        assert_eq!((config.width, config.height), (960, 540));
        assert_eq!(config.target_fps, 60);
    }

    #[test]
    fn invalid_toml() {
        assert!(Config::from_toml("width = \"wide\"").is_err());
    }

    #[test]
    fn toml_round_trip() {
        let config = Config {
            width: 1280,
            ..Config::default()
        };
        let parsed = Config::from_toml(&config.to_toml().expect("serializable")).expect("valid");
        assert_eq!(parsed, config);
    }

    #[test]
    fn environment_overrides() {
        let vars: HashMap<&str, &str> = [
            ("VSYNC", "0"),
            ("LIMIT_FPS", "1"),
            ("TARGET_FPS", "144"),
            ("GL_DEBUG", "false"),
        ]
        .into_iter()
        .collect();
        let config = Config::default().with_overrides(|key| vars.get(key).map(|v| v.to_string()));
        assert!(!config.vsync);
        assert!(!config.gl_debug);
        assert!(config.limit_frame_rate);
        assert_eq!(config.target_fps, 144);
    }

    #[test]
    fn invalid_target_fps_is_ignored() {
        let config = Config::default().with_overrides(|key| match key {
            "TARGET_FPS" => Some("0".into()),
            _ => None,
        });
        assert_eq!(config.target_fps, 60);
        let config = Config::default().with_overrides(|key| match key {
            "TARGET_FPS" => Some("fast".into()),
            _ => None,
        });
        assert_eq!(config.target_fps, 60);
    }

    #[test]
    fn missing_file_uses_defaults() {
        let config = Config::load("does/not/exist.toml").expect("defaults");
        assert_eq!(config.width, Config::default().width);
    }
}

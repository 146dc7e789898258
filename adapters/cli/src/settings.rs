//! Versioned TOML settings for the command-line driver.

use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context, Result};
use scale_sokoban_core::Direction;
use scale_sokoban_engine::EngineConfig;
use scale_sokoban_system_demo as demo;
use scale_sokoban_system_input as input;
use scale_sokoban_system_playback as playback;
use serde::Deserialize;

const SUPPORTED_SETTINGS_VERSION: u32 = 1;

/// Timing and gating options read from a settings file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Settings {
    version: u32,
    move_ms: u64,
    scale_ms: u64,
    demo_step_ms: u64,
    frame_ms: u64,
    intro_on_load: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: SUPPORTED_SETTINGS_VERSION,
            move_ms: 120,
            scale_ms: 200,
            demo_step_ms: 400,
            frame_ms: 16,
            intro_on_load: false,
        }
    }
}

impl Settings {
    /// Reads and validates the settings file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings at {}", path.display()))?;
        parse_settings(&contents)
            .with_context(|| format!("invalid settings file {}", path.display()))
    }

    /// Length of one simulated frame.
    pub(crate) fn frame(&self) -> Duration {
        Duration::from_millis(self.frame_ms)
    }

    /// Builds the engine configuration, scripting the demo driver with
    /// `script`.
    pub(crate) fn engine_config(&self, script: Vec<Direction>) -> EngineConfig {
        EngineConfig {
            playback: playback::Config::new(
                Duration::from_millis(self.move_ms),
                Duration::from_millis(self.scale_ms),
            ),
            input: input::Config::new(self.intro_on_load),
            demo: demo::Config::new(Duration::from_millis(self.demo_step_ms), script, false),
        }
    }
}

fn parse_settings(contents: &str) -> Result<Settings> {
    let settings: Settings =
        toml::from_str(contents).context("failed to parse settings toml contents")?;
    if settings.version != SUPPORTED_SETTINGS_VERSION {
        bail!(
            "unsupported settings version {}; expected {}",
            settings.version,
            SUPPORTED_SETTINGS_VERSION
        );
    }
    if settings.frame_ms == 0 || settings.demo_step_ms == 0 {
        bail!("frame_ms and demo_step_ms must be positive");
    }
    Ok(settings)
}

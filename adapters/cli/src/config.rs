//! Session settings merged from an optional TOML file and command-line flags.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use handbeats_core::{Difficulty, DifficultyProfile, LaneZone, ZoneLayout, DEFAULT_SPAWN_Y};
use serde::Deserialize;

/// Session length used when neither the file nor the flags provide one.
pub(crate) const DEFAULT_SESSION_MS: u64 = 60_000;
/// Length of the backing music loop.
pub(crate) const DEFAULT_LOOP_LENGTH_MS: u64 = 9_000;
/// Frame step of a 60 fps presentation loop, rounded down.
pub(crate) const DEFAULT_FRAME_MS: u64 = 16;

/// Contents of a session configuration file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct FileConfig {
    pub(crate) difficulty: Option<String>,
    pub(crate) session_ms: Option<u64>,
    pub(crate) loop_length_ms: Option<u64>,
    pub(crate) frame_ms: Option<u64>,
    pub(crate) spawn_y: Option<f32>,
    pub(crate) profile: Option<DifficultyProfile>,
    #[serde(default)]
    pub(crate) zones: Vec<LaneZone>,
}

impl FileConfig {
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read session config at {}", path.display()))?;
        parse_config(&contents)
            .with_context(|| format!("invalid session config at {}", path.display()))
    }
}

fn parse_config(contents: &str) -> Result<FileConfig> {
    toml::from_str(contents).context("failed to parse session config toml contents")
}

/// Values that override the file, typically taken from the command line.
#[derive(Debug, Default)]
pub(crate) struct Overrides {
    pub(crate) difficulty: Option<String>,
    pub(crate) session_ms: Option<u64>,
    pub(crate) loop_length_ms: Option<u64>,
    pub(crate) frame_ms: Option<u64>,
}

/// Fully resolved settings for one headless run.
#[derive(Debug)]
pub(crate) struct Settings {
    /// Built-in difficulty in play; `None` when the file supplies its own profile.
    pub(crate) difficulty: Option<Difficulty>,
    pub(crate) profile: DifficultyProfile,
    pub(crate) layout: ZoneLayout,
    pub(crate) session_ms: u64,
    pub(crate) loop_length_ms: u64,
    pub(crate) frame_ms: u64,
}

impl Settings {
    pub(crate) fn resolve(file: FileConfig, overrides: Overrides) -> Result<Self> {
        let name = overrides.difficulty.or(file.difficulty);
        let (difficulty, profile) = match (name, file.profile) {
            (Some(name), Some(_)) => {
                bail!("difficulty `{name}` conflicts with the [profile] table; set only one")
            }
            (None, Some(profile)) => (None, profile),
            (name, None) => {
                let name = name.unwrap_or_else(|| Difficulty::Medium.name().to_owned());
                let difficulty: Difficulty = name
                    .parse()
                    .with_context(|| format!("unsupported difficulty `{name}`"))?;
                (Some(difficulty), difficulty.profile())
            }
        };

        let frame_ms = overrides
            .frame_ms
            .or(file.frame_ms)
            .unwrap_or(DEFAULT_FRAME_MS);
        if frame_ms == 0 {
            bail!("frame_ms must be greater than zero");
        }

        let loop_length_ms = overrides
            .loop_length_ms
            .or(file.loop_length_ms)
            .unwrap_or(DEFAULT_LOOP_LENGTH_MS);
        if loop_length_ms == 0 {
            bail!("loop_length_ms must be greater than zero");
        }

        let layout = if file.zones.is_empty() {
            ZoneLayout {
                spawn_y: file.spawn_y.unwrap_or(DEFAULT_SPAWN_Y),
                ..ZoneLayout::default()
            }
        } else {
            ZoneLayout {
                zones: file.zones,
                spawn_y: file.spawn_y.unwrap_or(DEFAULT_SPAWN_Y),
            }
        };

        Ok(Self {
            difficulty,
            profile,
            layout,
            session_ms: overrides
                .session_ms
                .or(file.session_ms)
                .unwrap_or(DEFAULT_SESSION_MS),
            loop_length_ms,
            frame_ms,
        })
    }
}

//! Settings persistence
//!
//! Saves and loads [`Settings`] to/from a JSON file in the user's
//! configuration directory. Two groups: `engine` (executable path and
//! request timeouts) and `board` (terminal rendering preferences).
//!
//! # Error Handling
//!
//! Both load and save handle errors gracefully: a missing or corrupt
//! file falls back to defaults, and a failed save is logged without
//! interrupting the session.

use std::fs;
use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

/// Settings filename inside the config directory.
const SETTINGS_FILENAME: &str = "settings.json";

/// Everything the front-end reads at startup.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(default)]
pub struct Settings {
    pub engine: EngineSettings,
    pub board: BoardSettings,
}

/// External engine configuration.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct EngineSettings {
    /// Path to the UCI engine executable.
    pub executable: PathBuf,
    /// Thinking budget per move in milliseconds.
    pub movetime_ms: u64,
    /// Handshake sentinel deadline in milliseconds.
    pub handshake_timeout_ms: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            executable: PathBuf::from("stockfish"),
            movetime_ms: 2000,
            handshake_timeout_ms: 5000,
        }
    }
}

/// Terminal board rendering preferences.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct BoardSettings {
    /// Draw pieces as Unicode chess glyphs instead of FEN letters.
    pub unicode_pieces: bool,
    /// ANSI 256-color index for light squares.
    pub light_square: u8,
    /// ANSI 256-color index for dark squares.
    pub dark_square: u8,
}

impl Default for BoardSettings {
    fn default() -> Self {
        BoardSettings {
            unicode_pieces: true,
            light_square: 180,
            dark_square: 94,
        }
    }
}

impl Settings {
    /// Resolve the settings file path, falling back to the working
    /// directory when no system config directory can be found.
    pub fn path() -> PathBuf {
        if let Some(proj_dirs) = ProjectDirs::from("io", "termchess", "termchess") {
            proj_dirs.config_dir().join(SETTINGS_FILENAME)
        } else {
            PathBuf::from(SETTINGS_FILENAME)
        }
    }

    /// Load settings, using defaults when the file is missing or
    /// unparsable.
    pub fn load() -> Settings {
        let path = Settings::path();
        if !path.exists() {
            info!(path = %path.display(), "no settings file, using defaults");
            return Settings::default();
        }

        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<Settings>(&contents) {
                Ok(settings) => {
                    info!(path = %path.display(), "loaded settings");
                    settings
                }
                Err(err) => {
                    warn!(path = %path.display(), %err, "settings file unparsable, using defaults");
                    Settings::default()
                }
            },
            Err(err) => {
                warn!(path = %path.display(), %err, "settings file unreadable, using defaults");
                Settings::default()
            }
        }
    }

    /// Write the settings out as pretty JSON. Failures are logged and
    /// swallowed; the session carries on.
    pub fn save(&self) {
        let path = Settings::path();
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                if let Err(err) = fs::create_dir_all(parent) {
                    error!(path = %parent.display(), %err, "cannot create settings directory");
                    return;
                }
            }
        }

        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(err) = fs::write(&path, json) {
                    error!(path = %path.display(), %err, "failed to write settings");
                } else {
                    info!(path = %path.display(), "saved settings");
                }
            }
            Err(err) => error!(%err, "failed to serialize settings"),
        }
    }
}

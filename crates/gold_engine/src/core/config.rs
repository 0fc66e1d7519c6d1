//! # Game Configuration
//!
//! Settings for the orchestrator and the subsystems it wires together.
//! Every field has a default, and empty or zero values are treated as
//! "use the default" by [`GameConfig::normalized`], so a config file only
//! needs to mention what it changes.
//!
//! ```toml
//! name = "Pong"
//! debug = true
//!
//! [window]
//! width = 1024
//! height = 768
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::foundation::math::{Color, Vec2};

pub use crate::config::{Config, ConfigError};

/// Default game name
pub const DEFAULT_GAME_NAME: &str = "APP:NoName";
/// Default prefab directory
pub const DEFAULT_PREFABS_DIR: &str = "prefabs";
/// Default resource directory
pub const DEFAULT_RESOURCES_DIR: &str = "resources";
/// Default scene directory
pub const DEFAULT_SCENES_DIR: &str = "scenes";
/// Default window width in pixels
pub const DEFAULT_WINDOW_WIDTH: u32 = 800;
/// Default window height in pixels
pub const DEFAULT_WINDOW_HEIGHT: u32 = 600;
/// Default window title
pub const DEFAULT_WINDOW_TITLE: &str = "Gold Engine";
/// Default frame rate
pub const DEFAULT_TICK_RATE: u32 = 60;

/// # Game Configuration
///
/// Top-level configuration consumed by [`crate::Game`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Game name, used in log lines
    pub name: String,
    /// Directory holding one prefab document per file
    pub prefabs_dir: PathBuf,
    /// Directory holding opaque resources (textures, fonts, sounds)
    pub resources_dir: PathBuf,
    /// Directory holding one templated scene document per file
    pub scenes_dir: PathBuf,
    /// Enable debug logging and physics debug mode
    pub debug: bool,
    /// Number of message delivery workers; 0 delivers inline on the poster's thread
    pub delivery_workers: usize,
    /// Abort [`crate::Game::init`] on the first prefab or scene that fails to load
    pub halt_on_load_error: bool,
    /// Window settings
    pub window: WindowConfig,
    /// Physics settings
    pub physics: PhysicsConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_GAME_NAME.to_string(),
            prefabs_dir: PathBuf::from(DEFAULT_PREFABS_DIR),
            resources_dir: PathBuf::from(DEFAULT_RESOURCES_DIR),
            scenes_dir: PathBuf::from(DEFAULT_SCENES_DIR),
            debug: false,
            delivery_workers: 0,
            halt_on_load_error: true,
            window: WindowConfig::default(),
            physics: PhysicsConfig::default(),
        }
    }
}

impl GameConfig {
    /// Create a configuration with the given name and defaults elsewhere
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Builder pattern: root all three data directories under `base`
    pub fn with_root(mut self, base: impl Into<PathBuf>) -> Self {
        let base = base.into();
        self.prefabs_dir = base.join(DEFAULT_PREFABS_DIR);
        self.resources_dir = base.join(DEFAULT_RESOURCES_DIR);
        self.scenes_dir = base.join(DEFAULT_SCENES_DIR);
        self
    }

    /// Builder pattern: enable debug mode
    pub fn with_debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self.physics.debug = enabled;
        self
    }

    /// Builder pattern: deliver messages on `workers` background threads
    pub fn with_delivery_workers(mut self, workers: usize) -> Self {
        self.delivery_workers = workers;
        self
    }

    /// Replace empty and zero values by their defaults
    pub fn normalized(mut self) -> Self {
        if self.name.is_empty() {
            self.name = DEFAULT_GAME_NAME.to_string();
        }
        if self.prefabs_dir.as_os_str().is_empty() {
            self.prefabs_dir = PathBuf::from(DEFAULT_PREFABS_DIR);
        }
        if self.resources_dir.as_os_str().is_empty() {
            self.resources_dir = PathBuf::from(DEFAULT_RESOURCES_DIR);
        }
        if self.scenes_dir.as_os_str().is_empty() {
            self.scenes_dir = PathBuf::from(DEFAULT_SCENES_DIR);
        }
        self.window = self.window.normalized();
        self
    }
}

impl Config for GameConfig {}

/// # Window Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Title bar text
    pub title: String,
    /// Color the window is cleared to every frame
    pub clear_color: Color,
    /// Frame loop ticks per second
    pub tick_rate: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WINDOW_WIDTH,
            height: DEFAULT_WINDOW_HEIGHT,
            title: DEFAULT_WINDOW_TITLE.to_string(),
            clear_color: Color::BLACK,
            tick_rate: DEFAULT_TICK_RATE,
        }
    }
}

impl WindowConfig {
    /// Replace zero sizes, an empty title and a zero tick rate by the defaults
    pub fn normalized(mut self) -> Self {
        if self.width == 0 {
            self.width = DEFAULT_WINDOW_WIDTH;
        }
        if self.height == 0 {
            self.height = DEFAULT_WINDOW_HEIGHT;
        }
        if self.title.is_empty() {
            self.title = DEFAULT_WINDOW_TITLE.to_string();
        }
        if self.tick_rate == 0 {
            self.tick_rate = DEFAULT_TICK_RATE;
        }
        self
    }
}

/// # Physics Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Gravity in game units per second squared
    pub gravity: Vec2,
    /// Log every body added to or removed from the space
    pub debug: bool,
}

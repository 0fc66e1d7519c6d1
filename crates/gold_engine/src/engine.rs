//! Core game implementation
//!
//! [`Game`] wires the subsystems together over one [`PostOffice`]:
//!
//! - the [`Window`] participant (rendering backend, key events, drawing)
//! - the [`PhysicsEngine`] participant (physics backend, body tracking)
//! - one [`SceneMailbox`](crate::scene::SceneMailbox) per loaded scene
//! - the [`InputCollection`] fed by the window
//!
//! It owns the registries, loads prefab and scene directories, switches the
//! current scene and drives the frame loop.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::application::Application;
use crate::backend::{PhysicsBackend, RenderBackend};
use crate::config::DataFormat;
use crate::core::GameConfig;
use crate::events::{Address, DeliveryMode, Mailbox, Message, MessageKind, PostOffice};
use crate::foundation::logging::{self, LevelFilter};
use crate::foundation::sync;
use crate::foundation::time::{Ticker, Timer};
use crate::input::InputCollection;
use crate::physics::PhysicsEngine;
use crate::registry::{PrefabError, Registries};
use crate::render::Window;
use crate::scene::{AssemblyError, Scene, SceneAssembler, SharedScene, TemplateContext};

/// Game errors
#[derive(Error, Debug)]
pub enum GameError {
    /// No loaded scene has this name
    #[error("unknown scene '{0}'")]
    UnknownScene(String),

    /// A scene with this name is already loaded
    #[error("scene '{0}' is already loaded")]
    DuplicateScene(String),

    /// A data directory does not exist
    #[error("directory {0} does not exist")]
    MissingDirectory(PathBuf),

    /// A prefab failed to load
    #[error("prefab {path}: {source}")]
    Prefab {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: PrefabError,
    },

    /// A scene failed to load
    #[error("scene {name}: {source}")]
    Assembly {
        /// File path or caller-given name
        name: String,
        /// Underlying error
        #[source]
        source: AssemblyError,
    },

    /// A file or directory could not be read
    #[error("cannot read {path}: {source}")]
    Io {
        /// Path
        path: PathBuf,
        /// IO error
        #[source]
        source: std::io::Error,
    },

    /// The application hooks failed
    #[error("application error: {0}")]
    Application(String),
}

/// Main game struct
///
/// The game coordinates all participants and manages the frame loop.
pub struct Game {
    config: GameConfig,
    registries: Registries,
    post_office: PostOffice,
    window: Arc<Window>,
    physics: Arc<PhysicsEngine>,
    scenes: BTreeMap<String, SharedScene>,
    current: Option<String>,
    active: Option<String>,
    running: bool,
}

impl Game {
    /// Create a game instance
    ///
    /// Normalizes the configuration, initialises logging and puts the window
    /// and physics participants on a fresh bus.
    pub fn new(
        config: GameConfig,
        registries: Registries,
        renderer: Box<dyn RenderBackend>,
        physics: Box<dyn PhysicsBackend>,
    ) -> Self {
        let config = config.normalized();
        logging::init_with_level(if config.debug {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        });
        log::info!("Initializing game '{}'...", config.name);

        let post_office = PostOffice::with_delivery(DeliveryMode::from_workers(config.delivery_workers));
        let window = Arc::new(Window::new(renderer, &config.window));
        let physics = Arc::new(PhysicsEngine::new(physics, &config.physics));
        post_office.add(Arc::clone(&window) as Arc<dyn Mailbox>);
        post_office.add(Arc::clone(&physics) as Arc<dyn Mailbox>);

        Self {
            config,
            registries,
            post_office,
            window,
            physics,
            scenes: BTreeMap::new(),
            current: None,
            active: None,
            running: true,
        }
    }

    /// Load every prefab, then every scene, then initialise the window
    ///
    /// With `halt_on_load_error` the first failure is returned; otherwise
    /// failures are logged and loading continues with the next file.
    pub fn init(&mut self) -> Result<(), GameError> {
        let prefabs_dir = self.config.prefabs_dir.clone();
        for path in self.data_files(&prefabs_dir)? {
            let loaded = self
                .registries
                .prefabs
                .register_from_file(&path)
                .map_err(|source| GameError::Prefab {
                    path: path.clone(),
                    source,
                });
            match loaded {
                Ok(name) => log::info!("Loaded prefab '{name}' from {}", path.display()),
                Err(err) => self.load_failed(err)?,
            }
        }

        let scenes_dir = self.config.scenes_dir.clone();
        for path in self.data_files(&scenes_dir)? {
            if let Err(err) = self.load_scene_from_file(&path) {
                self.load_failed(err)?;
            }
        }

        self.window.init();
        for scene in self.scenes.values() {
            if let Some(address) = sync::lock(scene).mailbox().address() {
                self.route_removals_to_input(address);
            }
        }
        log::info!(
            "Game '{}' initialised with {} prefab(s) and {} scene(s)",
            self.config.name,
            self.registries.prefabs.len(),
            self.scenes.len()
        );
        Ok(())
    }

    fn load_failed(&self, err: GameError) -> Result<(), GameError> {
        if self.config.halt_on_load_error {
            return Err(err);
        }
        log::error!("{err}");
        Ok(())
    }

    /// Regular files of a data directory, sorted by path
    fn data_files(&self, dir: &Path) -> Result<Vec<PathBuf>, GameError> {
        if !dir.is_dir() {
            self.load_failed(GameError::MissingDirectory(dir.to_path_buf()))?;
            return Ok(Vec::new());
        }
        let io_error = |source| GameError::Io {
            path: dir.to_path_buf(),
            source,
        };
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(io_error)? {
            let path = entry.map_err(io_error)?.path();
            let hidden = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with('.'));
            if path.is_file() && !hidden {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Expand, assemble and register a scene file
    pub fn load_scene_from_file(&mut self, path: impl AsRef<Path>) -> Result<SharedScene, GameError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| GameError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let scene = self.load_scene_from_str(&path.display().to_string(), &text, DataFormat::from_path(path))?;
        log::info!("Loaded scene '{}' from {}", sync::lock(&scene).name(), path.display());
        Ok(scene)
    }

    /// Expand, assemble and register a scene template
    ///
    /// `name` only labels errors; the scene takes the name its definition gives.
    pub fn load_scene_from_str(&mut self, name: &str, source: &str, format: DataFormat) -> Result<SharedScene, GameError> {
        let context = TemplateContext::new(self.window.viewport());
        let scene = SceneAssembler::new(&self.registries)
            .load(name, source, format, &context)
            .map_err(|source| GameError::Assembly {
                name: name.to_string(),
                source,
            })?;
        self.add_scene(scene)
    }

    /// Register a scene and broadcast `SceneLoaded`
    pub fn add_scene(&mut self, scene: Scene) -> Result<SharedScene, GameError> {
        let name = scene.name().to_string();
        if self.scenes.contains_key(&name) {
            return Err(GameError::DuplicateScene(name));
        }
        let address = self.post_office.add(scene.mailbox() as Arc<dyn Mailbox>);
        self.route_removals_to_input(address);
        let shared = scene.share();
        self.scenes.insert(name, Arc::clone(&shared));
        self.post_office
            .broadcast(&Message::with_payload(MessageKind::SCENE_LOADED, Arc::clone(&shared)));
        Ok(shared)
    }

    /// Let the input collection drop keyboard sets of entities the scene removes
    fn route_removals_to_input(&self, scene: Address) {
        if let Some(input) = self.window.input().address() {
            self.post_office
                .subscribe(scene, input, MessageKind::SCENE_REMOVED_ENTITY);
        }
    }

    /// Make a loaded scene current and broadcast `SceneChanged`
    ///
    /// The previous scene is put to sleep and the new one started and woken at
    /// the beginning of the next [`Game::step`].
    pub fn change_scene(&mut self, name: &str) -> Result<(), GameError> {
        let scene = self
            .scenes
            .get(name)
            .cloned()
            .ok_or_else(|| GameError::UnknownScene(name.to_string()))?;
        log::info!("Changing scene to '{name}'");
        self.current = Some(name.to_string());
        self.post_office
            .broadcast(&Message::with_payload(MessageKind::SCENE_CHANGED, scene));
        Ok(())
    }

    /// Loaded scene by name
    pub fn scene(&self, name: &str) -> Option<SharedScene> {
        self.scenes.get(name).cloned()
    }

    /// Names of every loaded scene, sorted
    pub fn scene_names(&self) -> impl Iterator<Item = &str> {
        self.scenes.keys().map(String::as_str)
    }

    /// Current scene
    pub fn current_scene(&self) -> Option<SharedScene> {
        self.current.as_deref().and_then(|name| self.scene(name))
    }

    /// Name of the current scene
    pub fn current_scene_name(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Effective configuration
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Window participant
    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    /// Physics participant
    pub fn physics(&self) -> &Arc<PhysicsEngine> {
        &self.physics
    }

    /// Input participant fed by the window
    pub fn input(&self) -> Arc<InputCollection> {
        self.window.input()
    }

    /// Message bus
    pub fn post_office(&self) -> &PostOffice {
        &self.post_office
    }

    /// Registries
    pub fn registries(&self) -> &Registries {
        &self.registries
    }

    /// Registries, mutably
    pub fn registries_mut(&mut self) -> &mut Registries {
        &mut self.registries
    }

    /// Whether the frame loop should keep going
    pub fn is_running(&self) -> bool {
        self.running && self.window.is_open()
    }

    /// Ask the frame loop to end after the current frame
    pub fn quit(&mut self) {
        log::info!("Quit requested");
        self.running = false;
    }

    /// Run one frame of simulation
    ///
    /// Activates a newly current scene, steps physics, then updates the scene.
    pub fn step(&mut self, dt: Duration) {
        self.activate_current();
        self.physics.step(dt);
        if let Some(scene) = self.current_scene() {
            sync::lock(&scene).update(dt);
        }
    }

    fn activate_current(&mut self) {
        if self.active == self.current {
            return;
        }
        if let Some(previous) = self.active.as_deref().and_then(|name| self.scene(name)) {
            sync::lock(&previous).sleep();
        }
        if let Some(scene) = self.current_scene() {
            let mut scene = sync::lock(&scene);
            if !scene.is_started() {
                scene.start();
            }
            scene.awake();
        }
        self.active = self.current.clone();
    }

    /// Run the frame loop until the window closes or [`Game::quit`] is called
    pub fn run(&mut self, app: &mut dyn Application) -> Result<(), GameError> {
        app.initialize(self)
            .map_err(|e| GameError::Application(format!("App initialization: {e}")))?;
        self.activate_current();

        log::info!("Starting frame loop at {} ticks per second...", self.config.window.tick_rate);
        let mut ticker = Ticker::new(self.config.window.tick_rate);
        let mut timer = Timer::new();
        let mut result = Ok(());

        while self.is_running() {
            if !self.window.tick() {
                break;
            }
            let dt = timer.tick();
            self.step(dt);
            if let Err(e) = app.update(self, dt) {
                result = Err(GameError::Application(format!("App update: {e}")));
                break;
            }
            ticker.wait();
        }

        log::info!("Frame loop ended after {} frame(s)", timer.frame_count());
        if let Some(scene) = self.active.as_deref().and_then(|name| self.scene(name)) {
            sync::lock(&scene).stop();
        }
        app.cleanup(self);
        result
    }
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("name", &self.config.name)
            .field("scenes", &self.scenes.keys().collect::<Vec<_>>())
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

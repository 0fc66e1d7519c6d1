//! # Gold Engine
//!
//! A 2D scene and entity framework built around a message bus.
//!
//! ## Features
//!
//! - **Message Bus**: addressed participants, per-sender subscriptions, inline or worker delivery
//! - **Entities**: component lifecycle (`start`, `awake`, `update`, `sleep`, `stop`)
//! - **Scene Graph**: entity trees with pre-order traversal and z-index draw order
//! - **Scene Assembly**: templated JSON/RON scene files built from named prefabs
//! - **Pluggable Backends**: rendering and physics behind small traits, with headless versions
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gold_engine::prelude::*;
//!
//! struct MyGame;
//!
//! impl Application for MyGame {
//!     fn initialize(&mut self, game: &mut Game) -> Result<(), AppError> {
//!         game.change_scene("main")?;
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = GameConfig::load_from_file("game.toml")?;
//!     let mut game = Game::new(
//!         config,
//!         Registries::with_builtins(),
//!         Box::new(HeadlessRenderer::new(800, 600)),
//!         Box::new(HeadlessPhysics::new()),
//!     );
//!     game.init()?;
//!     game.run(&mut MyGame)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core engine modules
pub mod config;
pub mod core;
pub mod foundation;

// Scene model
pub mod ecs;
pub mod events;
pub mod registry;
pub mod scene;

// Participants and collaborators
pub mod backend;
pub mod input;
pub mod physics;
pub mod render;

mod application;
mod engine;

pub use application::{AppError, Application};
pub use engine::{Game, GameError};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        backend::{HeadlessPhysics, HeadlessRenderer, PhysicsBackend, RenderBackend, WindowEvent},
        config::{Config, DataFormat},
        core::GameConfig,
        ecs::{Body, ColliderShape, Component, ComponentBase, Entity, EntityCore, EntityId, Transform, Visual},
        events::{Address, Mailbox, MailboxSlot, Message, MessageKind, PostOffice},
        foundation::{
            math::{Color, Vec2, Viewport},
            value::{Args, ArgsExt, Value},
        },
        input::{InputCollection, KeyCode, KeyHandler, KeyboardSet},
        registry::{GeneratorError, Prefab, Registries, RegistryError},
        scene::{Scene, SceneAssembler, SceneDefinition, SharedScene, TemplateContext},
        AppError, Application, Game, GameError,
    };
}

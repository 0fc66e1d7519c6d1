//! # Backend Module
//!
//! Narrow interfaces to the collaborators the engine drives but does not
//! implement: the rendering/windowing backend and the physics simulation.
//!
//! ## Organization
//!
//! - **Render**: [`RenderBackend`] plus the window events it yields
//! - **Physics**: [`PhysicsBackend`]
//! - **Headless**: in-memory implementations of both, used by tests and tools
//!
//! ## Design Principles
//!
//! - **Abstraction**: the engine only talks to the traits
//! - **Isolation**: backend-specific state stays behind the trait object

pub mod headless;
pub mod physics;
pub mod render;

pub use headless::{DrawCall, HeadlessPhysics, HeadlessRenderer, PhysicsProbe, RenderProbe};
pub use physics::PhysicsBackend;
pub use render::{RenderBackend, RenderState, WindowEvent};

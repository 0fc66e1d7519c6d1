//! # Core Engine Module
//!
//! Shared configuration for the orchestrator and its subsystems.
//!
//! ## Organization
//!
//! - **Config**: Game, window and physics settings

pub mod config;

pub use config::{Config, ConfigError, GameConfig, PhysicsConfig, WindowConfig};

//! # Rendering
//!
//! The engine side of rendering is a single bus participant, [`Window`], that
//! drives a [`RenderBackend`](crate::backend::RenderBackend).

pub mod window;

pub use window::Window;

//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Math types and unit conversion
//! - Untyped argument values
//! - Time management
//! - Lock helpers
//! - Logging utilities

pub mod logging;
pub mod math;
pub mod sync;
pub mod time;
pub mod value;

//! # Render Backend Abstraction
//!
//! The minimal contract the engine needs from a windowing/rendering library:
//! poll discrete window events once per tick and draw transforms.

use crate::ecs::Transform;
use crate::foundation::math::{Color, Mat3, Viewport};
use crate::input::KeyCode;

/// Discrete event polled from the window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    /// Key went down
    KeyPressed(KeyCode),
    /// Key went up
    KeyReleased(KeyCode),
    /// Window was resized
    Resized {
        /// New width in pixels
        width: u32,
        /// New height in pixels
        height: u32,
    },
    /// User asked to close the window
    Closed,
}

/// Per-draw state handed to the backend
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderState {
    /// Current window size
    pub viewport: Viewport,
    /// Local-to-pixel matrix for the drawn transform
    pub matrix: Mat3,
}

impl RenderState {
    /// State for drawing `transform` into `viewport`
    pub fn for_transform(viewport: Viewport, transform: &Transform) -> Self {
        let scale = viewport.scale();
        let mut to_pixels = Mat3::identity();
        to_pixels[(0, 0)] = scale;
        to_pixels[(1, 1)] = scale;
        Self {
            viewport,
            matrix: to_pixels * transform.to_matrix(),
        }
    }
}

/// # Render Backend Trait
///
/// Implemented by window/graphics libraries. Called only from the frame loop.
///
/// ## Implementation Notes
///
/// Backends should:
/// - Return every event that arrived since the previous poll
/// - Treat `draw` for an empty visual as a no-op
pub trait RenderBackend: Send {
    /// Window size in pixels
    fn size(&self) -> (u32, u32);

    /// Whether the window is still open
    fn is_open(&self) -> bool;

    /// Drain pending window events
    fn poll_events(&mut self) -> Vec<WindowEvent>;

    /// Clear the frame
    fn clear(&mut self, color: Color);

    /// Draw one transform
    fn draw(&mut self, transform: &Transform, state: &RenderState);

    /// Present the frame
    fn display(&mut self);

    /// Close the window
    fn close(&mut self);
}

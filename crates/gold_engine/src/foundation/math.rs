//! Math utilities and types
//!
//! Provides the 2D math types used by transforms, colliders and scene placement.
//!
//! Positions are expressed in *game units*: one unit is 1/100 of the window width.
//! The [`Viewport`] converts game units to pixels for the rendering backend.

use serde::{Deserialize, Deserializer, Serialize};

pub use nalgebra::{Matrix3, Vector2};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3x3 matrix type (homogeneous 2D transforms)
pub type Mat3 = Matrix3<f32>;

/// Number of game units spanning the window width
pub const GAME_WIDTH_UNITS: f32 = 100.0;

/// Vector with both components set to zero
pub fn zero_vector() -> Vec2 {
    Vec2::zeros()
}

/// Build a homogeneous translation * rotation * scale matrix
///
/// # Arguments
/// * `position` - Translation
/// * `rotation` - Rotation in degrees (clockwise in screen space)
/// * `scale` - Non-uniform scale
pub fn trs_matrix(position: Vec2, rotation: f32, scale: Vec2) -> Mat3 {
    let radians = rotation.to_radians();
    let (sin, cos) = radians.sin_cos();
    Mat3::new(
        cos * scale.x, -sin * scale.y, position.x,
        sin * scale.x, cos * scale.y, position.y,
        0.0, 0.0, 1.0,
    )
}

/// RGBA color with 8-bit channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
    /// Alpha channel
    pub a: u8,
}

impl Color {
    /// Opaque white
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Opaque black
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque yellow
    pub const YELLOW: Self = Self::rgb(255, 255, 0);
    /// Fully transparent
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    /// Create an opaque color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Create a color with alpha
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// Conversion between game units and window pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Window width in pixels
    pub width: u32,
    /// Window height in pixels
    pub height: u32,
}

impl Viewport {
    /// Create a viewport for a window of the given pixel size
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Pixels per game unit
    pub fn scale(&self) -> f32 {
        self.width as f32 / GAME_WIDTH_UNITS
    }

    /// Window width in game units (always [`GAME_WIDTH_UNITS`])
    pub fn game_width(&self) -> f32 {
        GAME_WIDTH_UNITS
    }

    /// Window height in game units
    pub fn game_height(&self) -> f32 {
        let scale = self.scale();
        if scale > 0.0 {
            self.height as f32 / scale
        } else {
            0.0
        }
    }

    /// Convert a game-unit vector to pixels
    pub fn to_pixels(&self, v: Vec2) -> Vec2 {
        v * self.scale()
    }

    /// Convert a pixel vector to game units
    pub fn to_units(&self, v: Vec2) -> Vec2 {
        let scale = self.scale();
        if scale > 0.0 {
            v / scale
        } else {
            Vec2::zeros()
        }
    }
}

/// Accepts `{"X": .., "Y": ..}` (any case) or `[x, y]`
#[derive(Deserialize)]
#[serde(untagged)]
enum VectorRepr {
    Pair([f32; 2]),
    Fields {
        #[serde(alias = "X", default)]
        x: f32,
        #[serde(alias = "Y", default)]
        y: f32,
    },
}

/// Serde helper decoding a [`Vec2`] from either a map or a two-element list
pub fn deserialize_vector<'de, D>(deserializer: D) -> Result<Vec2, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match VectorRepr::deserialize(deserializer)? {
        VectorRepr::Pair([x, y]) => Vec2::new(x, y),
        VectorRepr::Fields { x, y } => Vec2::new(x, y),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_viewport_units() {
        let viewport = Viewport::new(800, 600);
        assert_relative_eq!(viewport.scale(), 8.0);
        assert_relative_eq!(viewport.game_height(), 75.0);
        assert_relative_eq!(viewport.to_pixels(Vec2::new(1.0, 2.0)), Vec2::new(8.0, 16.0));
        assert_relative_eq!(viewport.to_units(Vec2::new(8.0, 16.0)), Vec2::new(1.0, 2.0));
    }

    #[test]
    fn test_trs_matrix_translates_origin() {
        let m = trs_matrix(Vec2::new(3.0, 4.0), 90.0, Vec2::new(2.0, 2.0));
        let p = m * nalgebra::Vector3::new(1.0, 0.0, 1.0);
        assert_relative_eq!(p.x, 3.0, epsilon = 1e-5);
        assert_relative_eq!(p.y, 6.0, epsilon = 1e-5);
    }

    #[derive(Deserialize)]
    struct Holder {
        #[serde(deserialize_with = "deserialize_vector")]
        v: Vec2,
    }

    #[test]
    fn test_vector_decodes_from_map_and_list() {
        let a: Holder = serde_json::from_str(r#"{"v": {"X": 1.5, "Y": -2}}"#).unwrap();
        let b: Holder = serde_json::from_str(r#"{"v": [1.5, -2]}"#).unwrap();
        assert_eq!(a.v, Vec2::new(1.5, -2.0));
        assert_eq!(a.v, b.v);
    }
}

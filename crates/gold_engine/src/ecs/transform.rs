//! Transforms and visual representations
//!
//! A [`Transform`] is the positional and visual state an entity hands to the
//! rendering backend. The [`Visual`] says *what* to draw; drawing it is the
//! backend's job.

use crate::foundation::math::{trs_matrix, Color, Mat3, Vec2};

/// Fill and outline of a shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeStyle {
    /// Interior color
    pub fill: Color,
    /// Outline color
    pub outline: Color,
    /// Outline thickness in game units; 0 draws no outline
    pub outline_thickness: f32,
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            fill: Color::WHITE,
            outline: Color::WHITE,
            outline_thickness: 0.0,
        }
    }
}

/// What an entity looks like
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Visual {
    /// Nothing is drawn
    #[default]
    Empty,
    /// Textured quad; the texture is a resource name resolved by the backend
    Sprite {
        /// Texture resource name
        texture: Option<String>,
    },
    /// Circle
    Circle {
        /// Radius in game units
        radius: f32,
        /// Fill and outline
        style: ShapeStyle,
    },
    /// Axis-aligned rectangle
    Rectangle {
        /// Width and height in game units
        size: Vec2,
        /// Fill and outline
        style: ShapeStyle,
    },
    /// Convex polygon
    Convex {
        /// Vertices in local space
        points: Vec<Vec2>,
        /// Fill and outline
        style: ShapeStyle,
    },
    /// Text label
    Text {
        /// Displayed string
        string: String,
        /// Glyph size in pixels
        character_size: u32,
        /// Font resource name
        font: Option<String>,
        /// Text color
        fill: Color,
    },
}

impl Visual {
    /// Generator name this visual is built by
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Empty => "",
            Self::Sprite { .. } => "Sprite",
            Self::Circle { .. } => "CircleShape",
            Self::Rectangle { .. } => "RectangleShape",
            Self::Convex { .. } => "ConvexShape",
            Self::Text { .. } => "Text",
        }
    }

    /// Mutable shape style, for shape visuals
    pub fn style_mut(&mut self) -> Option<&mut ShapeStyle> {
        match self {
            Self::Circle { style, .. } | Self::Rectangle { style, .. } | Self::Convex { style, .. } => {
                Some(style)
            }
            _ => None,
        }
    }
}

/// Position, scale, rotation and origin of an entity plus its visual
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Position in game units
    pub position: Vec2,
    /// Non-uniform scale
    pub scale: Vec2,
    /// Rotation in degrees
    pub rotation: f32,
    /// Local point that position, scale and rotation are relative to
    pub origin: Vec2,
    /// What to draw
    pub visual: Visual,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(Visual::Empty)
    }
}

impl Transform {
    /// Transform at the origin with unit scale
    pub fn new(visual: Visual) -> Self {
        Self {
            position: Vec2::zeros(),
            scale: Vec2::new(1.0, 1.0),
            rotation: 0.0,
            origin: Vec2::zeros(),
            visual,
        }
    }

    /// Builder pattern: set the origin
    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    /// Whether nothing is drawn
    pub fn is_empty(&self) -> bool {
        matches!(self.visual, Visual::Empty)
    }

    /// Move to an absolute position
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Move by an offset
    pub fn move_by(&mut self, offset: Vec2) {
        self.position += offset;
    }

    /// Replace the scale
    pub fn set_scale(&mut self, scale: Vec2) {
        self.scale = scale;
    }

    /// Replace the rotation (degrees)
    pub fn set_rotation(&mut self, degrees: f32) {
        self.rotation = degrees.rem_euclid(360.0);
    }

    /// Rotate by `degrees`
    pub fn rotate(&mut self, degrees: f32) {
        self.set_rotation(self.rotation + degrees);
    }

    /// Local-to-world matrix: translate(position) * rotate * scale * translate(-origin)
    pub fn to_matrix(&self) -> Mat3 {
        let mut shift = Mat3::identity();
        shift[(0, 2)] = -self.origin.x;
        shift[(1, 2)] = -self.origin.y;
        trs_matrix(self.position, self.rotation, self.scale) * shift
    }
}

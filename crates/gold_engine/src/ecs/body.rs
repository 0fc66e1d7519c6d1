//! Physics bodies
//!
//! Plain descriptions of what the physics backend should simulate for an entity.

use crate::foundation::math::Vec2;

/// Collision shape of a body
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderShape {
    /// Circle centred on the body
    Circle {
        /// Radius in game units
        radius: f32,
    },
    /// Box centred on the body
    Box {
        /// Width in game units
        width: f32,
        /// Height in game units
        height: f32,
    },
}

impl ColliderShape {
    /// Generator name this shape is built by
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Circle { .. } => "CircleShape",
            Self::Box { .. } => "BoxShape",
        }
    }

    /// Moment of inertia for the given mass
    pub fn moment(&self, mass: f32) -> f32 {
        match *self {
            Self::Circle { radius } => 0.5 * mass * radius * radius,
            Self::Box { width, height } => mass * (width * width + height * height) / 12.0,
        }
    }
}

/// Rigid body handed to the physics backend
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    /// Collision shape
    pub shape: ColliderShape,
    /// Mass
    pub mass: f32,
    /// Moment of inertia
    pub moment: f32,
    /// Bounciness in `[0, 1]`
    pub elasticity: f32,
    /// Position in game units
    pub position: Vec2,
    /// Velocity in game units per second
    pub velocity: Vec2,
}

impl Body {
    /// Body of unit mass at the origin
    pub fn new(shape: ColliderShape) -> Self {
        Self {
            shape,
            mass: 1.0,
            moment: shape.moment(1.0),
            elasticity: 0.0,
            position: Vec2::zeros(),
            velocity: Vec2::zeros(),
        }
    }
}

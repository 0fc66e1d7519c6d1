//! Built-in transform generators
//!
//! | kind | keys |
//! |---|---|
//! | `Sprite` | `Texture` |
//! | `CircleShape` | `Radius` (1) + shape keys |
//! | `RectangleShape` | `Size` ((1, 1)) + shape keys |
//! | `ConvexShape` | `Points` ([]) + shape keys |
//! | `Text` | `String` (""), `CharacterSize` (30), `Font`, `FillColor` (white) |
//!
//! Shape keys: `FillColor` (white), `OutlineColor` (white), `OutlineThickness`
//! (0), `Origin` ((0, 0)). A missing or mistyped key keeps its default.

use super::{GeneratorError, TransformRegistry};
use crate::ecs::{ShapeStyle, Transform, Visual};
use crate::foundation::math::{Color, Vec2};
use crate::foundation::value::{Args, ArgsExt};

/// Sprite generator name
pub const SPRITE: &str = "Sprite";
/// Circle generator name
pub const CIRCLE_SHAPE: &str = "CircleShape";
/// Rectangle generator name
pub const RECTANGLE_SHAPE: &str = "RectangleShape";
/// Convex polygon generator name
pub const CONVEX_SHAPE: &str = "ConvexShape";
/// Text generator name
pub const TEXT: &str = "Text";

/// Default text glyph size
pub const DEFAULT_CHARACTER_SIZE: u32 = 30;

/// Register every built-in transform generator
pub(crate) fn register_builtins(registry: &mut TransformRegistry) {
    let builtins: [(&str, fn(&Args) -> Result<Transform, GeneratorError>); 5] = [
        (SPRITE, sprite),
        (CIRCLE_SHAPE, circle_shape),
        (RECTANGLE_SHAPE, rectangle_shape),
        (CONVEX_SHAPE, convex_shape),
        (TEXT, text),
    ];
    for (name, generator) in builtins {
        if let Err(err) = registry.register(name, generator) {
            log::warn!("Skipping built-in transform: {err}");
        }
    }
}

/// Textured sprite
pub fn sprite(args: &Args) -> Result<Transform, GeneratorError> {
    Ok(Transform::new(Visual::Sprite {
        texture: args.string("Texture").map(str::to_string),
    }))
}

/// Circle of `Radius`
pub fn circle_shape(args: &Args) -> Result<Transform, GeneratorError> {
    let radius = args.float("Radius").unwrap_or(1.0);
    Ok(shaped(Visual::Circle { radius, style: style(args) }, args))
}

/// Rectangle of `Size`
pub fn rectangle_shape(args: &Args) -> Result<Transform, GeneratorError> {
    let size = args.vector("Size").unwrap_or_else(|| Vec2::new(1.0, 1.0));
    Ok(shaped(Visual::Rectangle { size, style: style(args) }, args))
}

/// Convex polygon through `Points`
pub fn convex_shape(args: &Args) -> Result<Transform, GeneratorError> {
    let points = args.vectors("Points").unwrap_or_default();
    Ok(shaped(Visual::Convex { points, style: style(args) }, args))
}

/// Text label
pub fn text(args: &Args) -> Result<Transform, GeneratorError> {
    let character_size = args
        .float("CharacterSize")
        .filter(|size| *size > 0.0)
        .map_or(DEFAULT_CHARACTER_SIZE, |size| size.round() as u32);
    Ok(Transform::new(Visual::Text {
        string: args.string("String").unwrap_or_default().to_string(),
        character_size,
        font: args.string("Font").map(str::to_string),
        fill: args.color("FillColor").unwrap_or(Color::WHITE),
    }))
}

fn style(args: &Args) -> ShapeStyle {
    let defaults = ShapeStyle::default();
    ShapeStyle {
        fill: args.color("FillColor").unwrap_or(defaults.fill),
        outline: args.color("OutlineColor").unwrap_or(defaults.outline),
        outline_thickness: args.float("OutlineThickness").unwrap_or(defaults.outline_thickness),
    }
}

fn shaped(visual: Visual, args: &Args) -> Transform {
    let origin = args.vector("Origin").unwrap_or_else(Vec2::zeros);
    Transform::new(visual).with_origin(origin)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(json: &str) -> Args {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_circle_reads_shape_keys() {
        let transform = circle_shape(&args(
            r#"{"Radius": 2.5, "FillColor": {"R": 255, "G": 0, "B": 0}, "OutlineThickness": 1, "Origin": {"X": 2.5, "Y": 2.5}}"#,
        ))
        .unwrap();
        let Visual::Circle { radius, style } = transform.visual else {
            panic!("expected a circle");
        };
        assert_eq!(radius, 2.5);
        assert_eq!(style.fill, Color::rgb(255, 0, 0));
        assert_eq!(style.outline_thickness, 1.0);
        assert_eq!(transform.origin, Vec2::new(2.5, 2.5));
    }

    #[test]
    fn test_wrong_types_fall_back_to_defaults() {
        let transform = rectangle_shape(&args(r#"{"Size": "big", "FillColor": 3}"#)).unwrap();
        assert_eq!(
            transform.visual,
            Visual::Rectangle {
                size: Vec2::new(1.0, 1.0),
                style: ShapeStyle::default()
            }
        );
        let transform = circle_shape(&Args::new()).unwrap();
        assert!(matches!(transform.visual, Visual::Circle { radius, .. } if radius == 1.0));
    }

    #[test]
    fn test_text_and_convex() {
        let label = text(&args(r#"{"String": "0 - 0", "CharacterSize": 48}"#)).unwrap();
        assert_eq!(
            label.visual,
            Visual::Text {
                string: "0 - 0".into(),
                character_size: 48,
                font: None,
                fill: Color::WHITE
            }
        );
        let triangle = convex_shape(&args(r#"{"Points": [[0, 0], [1, 0], {"X": 0, "Y": 1}]}"#)).unwrap();
        assert!(matches!(&triangle.visual, Visual::Convex { points, .. } if points.len() == 3));
    }
}

//! Built-in collider generators
//!
//! `CircleShape` reads `Radius` (1); `BoxShape` reads `Width` and `Height`
//! (1 each). Both read `Mass` (1), `Moment` (the mass used for the moment of
//! inertia, defaulting to `Mass`), `Elasticity` (0) and `Position` ((0, 0)).

use super::{ColliderRegistry, GeneratorError};
use crate::ecs::{Body, ColliderShape};
use crate::foundation::value::{Args, ArgsExt};

/// Circle collider name
pub const CIRCLE_SHAPE: &str = "CircleShape";
/// Box collider name
pub const BOX_SHAPE: &str = "BoxShape";

/// Register every built-in collider generator
pub(crate) fn register_builtins(registry: &mut ColliderRegistry) {
    let builtins: [(&str, fn(&Args) -> Result<Body, GeneratorError>); 2] =
        [(CIRCLE_SHAPE, circle_shape), (BOX_SHAPE, box_shape)];
    for (name, generator) in builtins {
        if let Err(err) = registry.register(name, generator) {
            log::warn!("Skipping built-in collider: {err}");
        }
    }
}

/// Circular body
pub fn circle_shape(args: &Args) -> Result<Body, GeneratorError> {
    let radius = positive(args, "Radius");
    Ok(body(ColliderShape::Circle { radius }, args))
}

/// Box body
pub fn box_shape(args: &Args) -> Result<Body, GeneratorError> {
    let width = positive(args, "Width");
    let height = positive(args, "Height");
    Ok(body(ColliderShape::Box { width, height }, args))
}

fn positive(args: &Args, key: &str) -> f32 {
    args.float(key).filter(|v| *v > 0.0).unwrap_or(1.0)
}

fn body(shape: ColliderShape, args: &Args) -> Body {
    let mut body = Body::new(shape);
    body.mass = args.float("Mass").unwrap_or(1.0);
    body.moment = shape.moment(args.float("Moment").unwrap_or(body.mass));
    body.elasticity = args.float("Elasticity").unwrap_or(0.0);
    if let Some(position) = args.vector("Position") {
        body.position = position;
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec2;
    use approx::assert_relative_eq;

    #[test]
    fn test_circle_defaults() {
        let body = circle_shape(&Args::new()).unwrap();
        assert_eq!(body.shape, ColliderShape::Circle { radius: 1.0 });
        assert_relative_eq!(body.mass, 1.0);
        assert_relative_eq!(body.moment, 0.5);
    }

    #[test]
    fn test_box_reads_arguments() {
        let args: Args = serde_json::from_str(
            r#"{"Width": 2, "Height": "tall", "Mass": 4, "Elasticity": 0.9, "Position": {"X": 1, "Y": 2}}"#,
        )
        .unwrap();
        let body = box_shape(&args).unwrap();
        assert_eq!(body.shape, ColliderShape::Box { width: 2.0, height: 1.0 });
        assert_relative_eq!(body.mass, 4.0);
        assert_relative_eq!(body.moment, 4.0 * 5.0 / 12.0);
        assert_relative_eq!(body.elasticity, 0.9);
        assert_eq!(body.position, Vec2::new(1.0, 2.0));
    }
}

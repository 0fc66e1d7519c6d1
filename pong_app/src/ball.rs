//! Ball component: flies in a straight line and bounces off the field edges

use std::time::Duration;

use gold_engine::prelude::*;
use rand::Rng;

/// Registry name
pub const BALL: &str = "ball";

/// Default speed in game units per second
pub const DEFAULT_SPEED: f32 = 30.0;

/// Moves its entity and reflects the velocity at the field borders
pub struct BallComponent {
    base: ComponentBase,
    speed: f32,
    field: Vec2,
    velocity: Vec2,
}

impl BallComponent {
    /// Ball moving at `speed` inside a `field`-sized area anchored at the origin
    pub fn new(speed: f32, field: Vec2) -> Self {
        Self {
            base: ComponentBase::new(),
            speed,
            field,
            velocity: Vec2::zeros(),
        }
    }

    /// Generator registered under [`BALL`]; reads `Speed` and `Field`
    pub fn generate(args: &Args) -> Result<Box<dyn Component>, GeneratorError> {
        let speed = args.float("Speed").unwrap_or(DEFAULT_SPEED);
        if speed < 0.0 {
            return Err(GeneratorError::new(format!("ball speed must not be negative, got {speed}")));
        }
        let field = args.vector("Field").unwrap_or_else(|| Vec2::new(100.0, 75.0));
        Ok(Box::new(Self::new(speed, field)))
    }

    /// Current velocity
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Serve in a random direction, mostly horizontal
    fn serve(&mut self) {
        let mut rng = rand::thread_rng();
        let angle: f32 = rng.gen_range(-0.6..0.6);
        let side = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        self.velocity = Vec2::new(side * angle.cos(), angle.sin()) * self.speed;
    }
}

impl Component for BallComponent {
    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    fn start(&mut self, _entity: &mut EntityCore) {
        if self.velocity == Vec2::zeros() {
            self.serve();
        }
    }

    fn update(&mut self, entity: &mut EntityCore, dt: Duration) {
        let transform = &mut entity.transform;
        transform.move_by(self.velocity * dt.as_secs_f32());

        let position = transform.position;
        if position.y < 0.0 || position.y > self.field.y {
            self.velocity.y = -self.velocity.y;
        }
        if position.x < 0.0 || position.x > self.field.x {
            log::info!("Point scored, serving again");
            transform.set_position(self.field / 2.0);
            self.serve();
        }
        if let Some(body) = entity.body.as_mut() {
            body.position = entity.transform.position;
            body.velocity = self.velocity;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_serves_at_configured_speed() {
        let mut ball = BallComponent::new(30.0, Vec2::new(100.0, 75.0));
        let mut entity = Entity::new("ball");
        ball.start(entity.core_mut());
        assert_relative_eq!(ball.velocity().norm(), 30.0, epsilon = 1e-4);
    }

    #[test]
    fn test_bounces_off_the_top() {
        let mut ball = BallComponent::new(10.0, Vec2::new(100.0, 75.0));
        ball.velocity = Vec2::new(0.0, -10.0);
        let mut entity = Entity::new("ball");
        entity.transform_mut().set_position(Vec2::new(50.0, 1.0));

        ball.update(entity.core_mut(), Duration::from_millis(200));
        assert!(ball.velocity().y > 0.0);
    }

    #[test]
    fn test_rejects_negative_speed() {
        let mut args = Args::new();
        args.insert("Speed".into(), Value::Number(-1.0));
        assert!(BallComponent::generate(&args).is_err());
    }
}

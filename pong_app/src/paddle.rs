//! Paddle component: moves its entity up and down while a key is held

use std::sync::atomic::{AtomicI8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use gold_engine::prelude::*;

/// Registry name
pub const PADDLE: &str = "paddle";

/// Default speed in game units per second
pub const DEFAULT_SPEED: f32 = 40.0;

/// Moves the paddle while `Up` or `Down` is held
pub struct PaddleComponent {
    base: ComponentBase,
    speed: f32,
    direction: Arc<AtomicI8>,
    handler: Arc<KeyHandler>,
}

impl PaddleComponent {
    /// Paddle moving at `speed` units per second
    pub fn new(speed: f32) -> Self {
        let direction = Arc::new(AtomicI8::new(0));
        let handler = Arc::new(KeyHandler::new());
        for (key, step) in [(KeyCode::Up, -1), (KeyCode::Down, 1)] {
            let pressed = Arc::clone(&direction);
            handler.on_pressed(key, move || pressed.store(step, Ordering::Relaxed));
            let released = Arc::clone(&direction);
            handler.on_released(key, move || {
                log::debug!("Paddle stopped");
                released.store(0, Ordering::Relaxed);
            });
        }
        Self {
            base: ComponentBase::new(),
            speed,
            direction,
            handler,
        }
    }

    /// Generator registered under [`PADDLE`]; reads `Speed`
    pub fn generate(args: &Args) -> Result<Box<dyn Component>, GeneratorError> {
        Ok(Box::new(Self::new(args.float("Speed").unwrap_or(DEFAULT_SPEED))))
    }
}

impl Component for PaddleComponent {
    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    fn awake(&mut self, entity: &mut EntityCore) {
        log::debug!("Paddle '{}' awake", entity.name());
        entity.keyboard().add_handler(Arc::clone(&self.handler));
    }

    fn update(&mut self, entity: &mut EntityCore, dt: Duration) {
        let direction = f32::from(self.direction.load(Ordering::Relaxed));
        entity
            .transform
            .move_by(Vec2::new(0.0, direction * self.speed * dt.as_secs_f32()));
    }

    fn sleep(&mut self, entity: &mut EntityCore) {
        entity.keyboard().remove_handler(self.handler.id());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_moves_while_key_held() {
        let mut entity = Entity::new("paddle").with_component(PaddleComponent::new(10.0));
        entity.start();
        entity.awake();

        entity.core().keyboard().key_pressed(KeyCode::Down);
        entity.update(Duration::from_secs(1));
        assert_relative_eq!(entity.transform().position.y, 10.0);

        entity.core().keyboard().key_released(KeyCode::Down);
        entity.update(Duration::from_secs(1));
        assert_relative_eq!(entity.transform().position.y, 10.0);

        entity.sleep();
        assert!(entity.core().keyboard().is_empty());
    }

    #[test]
    fn test_speed_defaults_when_missing() {
        let mut args = Args::new();
        args.insert("Speed".into(), Value::String("fast".into()));
        let mut entity = Entity::new("paddle");
        entity.add_component(PaddleComponent::generate(&args).unwrap());
        entity.start();
        entity.awake();
        entity.core().keyboard().key_pressed(KeyCode::Up);
        entity.update(Duration::from_secs(1));
        assert_relative_eq!(entity.transform().position.y, -DEFAULT_SPEED);
    }
}

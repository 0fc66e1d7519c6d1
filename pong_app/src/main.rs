//! Headless Pong
//!
//! Loads `game.toml`, the prefabs and the templated main scene next to this
//! crate, then plays a few seconds against a scripted keyboard: the left
//! paddle moves up, pauses, then moves down.

mod ball;
mod paddle;

use std::path::{Path, PathBuf};
use std::time::Duration;

use gold_engine::foundation::sync;
use gold_engine::prelude::*;

use ball::BallComponent;
use paddle::PaddleComponent;

/// Frames to simulate before the scripted window closes
const FRAMES: u64 = 180;

struct Pong {
    frames: u64,
}

impl Application for Pong {
    fn initialize(&mut self, game: &mut Game) -> Result<(), AppError> {
        game.change_scene("main")?;
        let scene = game
            .current_scene()
            .ok_or_else(|| AppError::Custom("main scene missing".to_string()))?;

        let input = game.input();
        sync::lock(&scene).on_start(move |scene| {
            log::info!("Scene '{}' starting", scene.name());
            if let Some(paddle) = scene.entity_by_name("leftPaddle") {
                input.install(paddle.core().keyboard().clone());
            }
        });
        Ok(())
    }

    fn update(&mut self, game: &mut Game, _dt: Duration) -> Result<(), AppError> {
        self.frames += 1;
        if self.frames % 60 == 0 {
            if let Some(scene) = game.current_scene() {
                let scene = sync::lock(&scene);
                for name in ["leftPaddle", "ball"] {
                    if let Some(entity) = scene.entity_by_name(name) {
                        let position = entity.transform().position;
                        log::info!("{name} at ({:.1}, {:.1})", position.x, position.y);
                    }
                }
            }
        }
        Ok(())
    }

    fn cleanup(&mut self, _game: &mut Game) {
        log::info!("Played {} frames", self.frames);
    }
}

fn registries() -> Result<Registries, RegistryError> {
    let mut registries = Registries::with_builtins();
    registries.register_component(paddle::PADDLE, PaddleComponent::generate)?;
    registries.register_component(ball::BALL, BallComponent::generate)?;
    Ok(registries)
}

/// Keyboard script, one batch per frame
fn script() -> Vec<Vec<WindowEvent>> {
    let mut frames = vec![Vec::new(); 120];
    frames[10].push(WindowEvent::KeyPressed(KeyCode::Up));
    frames[40].push(WindowEvent::KeyReleased(KeyCode::Up));
    frames[70].push(WindowEvent::KeyPressed(KeyCode::Down));
    frames[110].push(WindowEvent::KeyReleased(KeyCode::Down));
    frames
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let root = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")), PathBuf::from);
    let config = load_config(&root)?;

    let renderer = HeadlessRenderer::new(config.window.width, config.window.height)
        .with_script(script())
        .with_frame_limit(FRAMES);
    let probe = renderer.probe();

    let mut game = Game::new(config, registries()?, Box::new(renderer), Box::new(HeadlessPhysics::new()));
    game.init()?;
    game.run(&mut Pong { frames: 0 })?;

    log::info!(
        "Presented {} frames, {} draw calls in the last one",
        probe.frame_count(),
        probe.last_frame().map_or(0, |frame| frame.len())
    );
    Ok(())
}

fn load_config(root: &Path) -> Result<GameConfig, Box<dyn std::error::Error>> {
    let path = root.join("game.toml");
    let config = if path.exists() {
        GameConfig::load_from_file(&path)?
    } else {
        GameConfig::new("Pong")
    };
    Ok(config.with_root(root))
}

//! Headless backends
//!
//! In-memory stand-ins for a window and a physics engine. They record what the
//! engine asked of them and expose it through cloneable probes, so a test can
//! hand the backend to a [`crate::Game`] and still inspect it afterwards.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::physics::PhysicsBackend;
use super::render::{RenderBackend, RenderState, WindowEvent};
use crate::ecs::{Body, EntityId, Transform, Visual};
use crate::foundation::math::{Color, Mat3, Vec2};
use crate::foundation::sync;

/// One recorded draw
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    /// What was drawn
    pub visual: Visual,
    /// Local-to-pixel matrix
    pub matrix: Mat3,
}

#[derive(Debug, Default)]
struct RenderLog {
    frames: Vec<Vec<DrawCall>>,
    current: Vec<DrawCall>,
    clear_color: Option<Color>,
    polls: u64,
    open: bool,
}

/// Inspection handle for a [`HeadlessRenderer`]
#[derive(Debug, Clone)]
pub struct RenderProbe {
    log: Arc<Mutex<RenderLog>>,
}

impl RenderProbe {
    /// Number of presented frames
    pub fn frame_count(&self) -> usize {
        sync::lock(&self.log).frames.len()
    }

    /// Draw calls of the last presented frame
    pub fn last_frame(&self) -> Option<Vec<DrawCall>> {
        sync::lock(&self.log).frames.last().cloned()
    }

    /// Color of the last clear
    pub fn clear_color(&self) -> Option<Color> {
        sync::lock(&self.log).clear_color
    }

    /// Number of event polls
    pub fn polls(&self) -> u64 {
        sync::lock(&self.log).polls
    }

    /// Whether the window is still open
    pub fn is_open(&self) -> bool {
        sync::lock(&self.log).open
    }
}

/// Window that never shows anything
///
/// Each poll pops one scripted batch of events. With a frame limit, the poll
/// after that many polls yields [`WindowEvent::Closed`].
#[derive(Debug)]
pub struct HeadlessRenderer {
    width: u32,
    height: u32,
    script: VecDeque<Vec<WindowEvent>>,
    frame_limit: Option<u64>,
    log: Arc<Mutex<RenderLog>>,
}

impl HeadlessRenderer {
    /// Open window of the given pixel size
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            script: VecDeque::new(),
            frame_limit: None,
            log: Arc::new(Mutex::new(RenderLog {
                open: true,
                ..RenderLog::default()
            })),
        }
    }

    /// Builder pattern: queue one batch of events per future poll
    pub fn with_script(mut self, batches: impl IntoIterator<Item = Vec<WindowEvent>>) -> Self {
        self.script.extend(batches);
        self
    }

    /// Builder pattern: report `Closed` once `polls` polls have happened
    pub fn with_frame_limit(mut self, polls: u64) -> Self {
        self.frame_limit = Some(polls);
        self
    }

    /// Inspection handle
    pub fn probe(&self) -> RenderProbe {
        RenderProbe {
            log: Arc::clone(&self.log),
        }
    }
}

impl RenderBackend for HeadlessRenderer {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn is_open(&self) -> bool {
        sync::lock(&self.log).open
    }

    fn poll_events(&mut self) -> Vec<WindowEvent> {
        let polls = {
            let mut log = sync::lock(&self.log);
            log.polls += 1;
            log.polls
        };
        let mut events = self.script.pop_front().unwrap_or_default();
        if self.frame_limit.is_some_and(|limit| polls > limit) {
            events.push(WindowEvent::Closed);
        }
        for event in &events {
            if let WindowEvent::Resized { width, height } = *event {
                self.width = width;
                self.height = height;
            }
        }
        events
    }

    fn clear(&mut self, color: Color) {
        let mut log = sync::lock(&self.log);
        log.clear_color = Some(color);
        log.current.clear();
    }

    fn draw(&mut self, transform: &Transform, state: &RenderState) {
        if transform.is_empty() {
            return;
        }
        sync::lock(&self.log).current.push(DrawCall {
            visual: transform.visual.clone(),
            matrix: state.matrix,
        });
    }

    fn display(&mut self) {
        let mut log = sync::lock(&self.log);
        let frame = std::mem::take(&mut log.current);
        log.frames.push(frame);
    }

    fn close(&mut self) {
        sync::lock(&self.log).open = false;
    }
}

#[derive(Debug, Default)]
struct PhysicsLog {
    gravity: Vec2,
    bodies: BTreeMap<EntityId, Body>,
    added: Vec<EntityId>,
    removed: Vec<EntityId>,
    simulated: Duration,
    steps: u64,
}

/// Inspection handle for a [`HeadlessPhysics`]
#[derive(Debug, Clone)]
pub struct PhysicsProbe {
    log: Arc<Mutex<PhysicsLog>>,
}

impl PhysicsProbe {
    /// Entities whose bodies are simulated
    pub fn bodies(&self) -> Vec<EntityId> {
        sync::lock(&self.log).bodies.keys().copied().collect()
    }

    /// Current body of an entity
    pub fn body(&self, entity: EntityId) -> Option<Body> {
        sync::lock(&self.log).bodies.get(&entity).cloned()
    }

    /// Every `add_body` call in order
    pub fn added(&self) -> Vec<EntityId> {
        sync::lock(&self.log).added.clone()
    }

    /// Every `remove_body` call for a known entity, in order
    pub fn removed(&self) -> Vec<EntityId> {
        sync::lock(&self.log).removed.clone()
    }

    /// Total simulated time
    pub fn simulated(&self) -> Duration {
        sync::lock(&self.log).simulated
    }

    /// Number of steps
    pub fn steps(&self) -> u64 {
        sync::lock(&self.log).steps
    }
}

/// Point-mass integrator with no collision response
#[derive(Debug, Default)]
pub struct HeadlessPhysics {
    log: Arc<Mutex<PhysicsLog>>,
}

impl HeadlessPhysics {
    /// Empty space with no gravity
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspection handle
    pub fn probe(&self) -> PhysicsProbe {
        PhysicsProbe {
            log: Arc::clone(&self.log),
        }
    }
}

impl PhysicsBackend for HeadlessPhysics {
    fn set_gravity(&mut self, gravity: Vec2) {
        sync::lock(&self.log).gravity = gravity;
    }

    fn add_body(&mut self, entity: EntityId, body: &Body) {
        let mut log = sync::lock(&self.log);
        log.bodies.insert(entity, body.clone());
        log.added.push(entity);
    }

    fn remove_body(&mut self, entity: EntityId) {
        let mut log = sync::lock(&self.log);
        if log.bodies.remove(&entity).is_some() {
            log.removed.push(entity);
        }
    }

    fn step(&mut self, dt: Duration) {
        let mut log = sync::lock(&self.log);
        let seconds = dt.as_secs_f32();
        let gravity = log.gravity;
        for body in log.bodies.values_mut() {
            body.velocity += gravity * seconds;
            body.position += body.velocity * seconds;
        }
        log.simulated += dt;
        log.steps += 1;
    }

    fn body_count(&self) -> usize {
        sync::lock(&self.log).bodies.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{ColliderShape, Entity};
    use crate::foundation::math::Viewport;
    use crate::input::KeyCode;
    use approx::assert_relative_eq;

    #[test]
    fn test_script_and_frame_limit() {
        let mut renderer = HeadlessRenderer::new(800, 600)
            .with_script([vec![WindowEvent::KeyPressed(KeyCode::Up)]])
            .with_frame_limit(2);
        assert_eq!(renderer.poll_events(), vec![WindowEvent::KeyPressed(KeyCode::Up)]);
        assert!(renderer.poll_events().is_empty());
        assert_eq!(renderer.poll_events(), vec![WindowEvent::Closed]);
        assert_eq!(renderer.probe().polls(), 3);
    }

    #[test]
    fn test_records_frames_and_skips_empty_visuals() {
        let mut renderer = HeadlessRenderer::new(800, 600);
        let probe = renderer.probe();
        let viewport = Viewport::new(800, 600);
        let circle = Transform::new(Visual::Circle {
            radius: 1.0,
            style: Default::default(),
        });
        renderer.clear(Color::BLACK);
        renderer.draw(&Transform::default(), &RenderState::for_transform(viewport, &Transform::default()));
        renderer.draw(&circle, &RenderState::for_transform(viewport, &circle));
        renderer.display();

        assert_eq!(probe.frame_count(), 1);
        assert_eq!(probe.last_frame().unwrap().len(), 1);
        renderer.close();
        assert!(!probe.is_open());
    }

    #[test]
    fn test_physics_integrates_gravity() {
        let mut physics = HeadlessPhysics::new();
        let probe = physics.probe();
        let entity = Entity::new("ball").id();
        physics.set_gravity(Vec2::new(0.0, 10.0));
        physics.add_body(entity, &Body::new(ColliderShape::Circle { radius: 1.0 }));
        physics.step(Duration::from_secs(1));

        let body = probe.body(entity).unwrap();
        assert_relative_eq!(body.position.y, 10.0);
        assert_eq!(probe.steps(), 1);

        physics.remove_body(entity);
        physics.remove_body(entity);
        assert_eq!(probe.removed(), vec![entity]);
        assert_eq!(physics.body_count(), 0);
    }
}

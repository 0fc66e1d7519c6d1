//! Window participant
//!
//! The [`Window`] sits on the bus between the rendering backend and the rest of
//! the engine. Each tick it drains backend events, turns key events into
//! `KeyPressed`/`KeyReleased` messages from its own address, and draws the
//! current scene in z-index order.
//!
//! Key messages are posted before the scene is locked, so key commands may
//! touch the scene without deadlocking the frame.

use std::sync::{Arc, Mutex, RwLock};

use crate::backend::{RenderBackend, RenderState, WindowEvent};
use crate::core::WindowConfig;
use crate::events::{Mailbox, MailboxSlot, Message, MessageKind};
use crate::foundation::math::{Color, Viewport};
use crate::foundation::sync;
use crate::input::InputCollection;
use crate::scene::SharedScene;

/// Bus participant owning the rendering backend
pub struct Window {
    slot: MailboxSlot,
    title: String,
    clear_color: Color,
    backend: Mutex<Box<dyn RenderBackend>>,
    viewport: RwLock<Viewport>,
    scene: RwLock<Option<SharedScene>>,
    input: Arc<InputCollection>,
}

impl Window {
    /// Wrap a backend; the viewport starts at the backend's reported size
    pub fn new(backend: Box<dyn RenderBackend>, config: &WindowConfig) -> Self {
        let (width, height) = backend.size();
        Self {
            slot: MailboxSlot::new(),
            title: config.title.clone(),
            clear_color: config.clear_color,
            backend: Mutex::new(backend),
            viewport: RwLock::new(Viewport::new(width, height)),
            scene: RwLock::new(None),
            input: Arc::new(InputCollection::new()),
        }
    }

    /// Register the input collection on the window's bus and subscribe it to
    /// the window's key messages
    ///
    /// Does nothing while the window itself is not on a bus.
    pub fn init(&self) {
        let Some((office, address)) = self.slot.binding() else {
            log::warn!("Window '{}' initialised before joining a post office", self.title);
            return;
        };
        let input = office.add(Arc::clone(&self.input) as Arc<dyn Mailbox>);
        office.subscribe(address, input, MessageKind::KEY_PRESSED);
        office.subscribe(address, input, MessageKind::KEY_RELEASED);
        log::info!("Window '{}' ready at {}x{}", self.title, self.viewport().width, self.viewport().height);
    }

    /// Window title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Input participant fed by this window
    pub fn input(&self) -> Arc<InputCollection> {
        Arc::clone(&self.input)
    }

    /// Current pixel size and unit scale
    pub fn viewport(&self) -> Viewport {
        *sync::read(&self.viewport)
    }

    /// Scene being drawn
    pub fn scene(&self) -> Option<SharedScene> {
        sync::read(&self.scene).clone()
    }

    /// Replace the scene being drawn
    pub fn set_scene(&self, scene: Option<SharedScene>) {
        *sync::write(&self.scene) = scene;
    }

    /// Whether the backend window is still open
    pub fn is_open(&self) -> bool {
        sync::lock(&self.backend).is_open()
    }

    /// Close the backend window
    pub fn close(&self) {
        sync::lock(&self.backend).close();
    }

    /// Handle pending events, then draw one frame
    ///
    /// Returns whether the window is still open afterwards.
    pub fn tick(&self) -> bool {
        let events = sync::lock(&self.backend).poll_events();
        for event in events {
            self.handle_event(event);
        }
        if !self.is_open() {
            return false;
        }
        self.draw();
        true
    }

    fn handle_event(&self, event: WindowEvent) {
        match event {
            WindowEvent::KeyPressed(key) => {
                self.post(Message::with_payload(MessageKind::KEY_PRESSED, key));
            }
            WindowEvent::KeyReleased(key) => {
                self.post(Message::with_payload(MessageKind::KEY_RELEASED, key));
            }
            WindowEvent::Resized { width, height } => {
                log::debug!("Window '{}' resized to {width}x{height}", self.title);
                *sync::write(&self.viewport) = Viewport::new(width, height);
            }
            WindowEvent::Closed => {
                log::info!("Window '{}' closed", self.title);
                self.close();
            }
        }
    }

    fn draw(&self) {
        let viewport = self.viewport();
        let scene = self.scene();
        let scene = scene.as_ref().map(|scene| sync::lock(scene));
        let mut backend = sync::lock(&self.backend);
        backend.clear(self.clear_color);
        if let Some(scene) = scene.as_deref() {
            for entity in scene.draw_order() {
                let transform = entity.transform();
                if transform.is_empty() {
                    continue;
                }
                backend.draw(transform, &RenderState::for_transform(viewport, transform));
            }
        }
        backend.display();
    }
}

impl Mailbox for Window {
    fn mailbox(&self) -> &MailboxSlot {
        &self.slot
    }

    fn receive(&self, message: &Message) {
        if !message.is(&MessageKind::SCENE_CHANGED) {
            return;
        }
        match message.payload::<SharedScene>() {
            Some(scene) => {
                log::debug!("Window '{}' now draws scene '{}'", self.title, sync::lock(scene).name());
                self.set_scene(Some(Arc::clone(scene)));
            }
            None => log::warn!("Ignoring {} without a scene payload", message.kind()),
        }
    }
}

impl std::fmt::Debug for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Window")
            .field("title", &self.title)
            .field("viewport", &self.viewport())
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

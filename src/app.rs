use std::sync::Arc;
use std::time::Instant;

use glam::Vec2;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    error::EventLoopError,
    event::{ElementState, KeyEvent, MouseButton, Touch, TouchPhase, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::ballpit::Ballpit;
use crate::config::BallpitConfig;
use crate::pointer::{PointerRegistry, Rect};
use crate::rendering::{LoopTransition, ResizeDebouncer};

/// Window shell hosting a single ball pit that fills the client area.
pub struct App {
    config: BallpitConfig,
    start_paused: bool,
    registry: PointerRegistry,
    window: Option<Arc<Window>>,
    ballpit: Option<Ballpit>,

    resize: ResizeDebouncer,
    size: PhysicalSize<u32>,
    occluded: bool,
    suspended: bool,

    last_cursor: Vec2,
    primary_touch: Option<u64>,
}

impl App {
    pub fn new(config: BallpitConfig, start_paused: bool) -> Self {
        Self {
            config,
            start_paused,
            registry: PointerRegistry::new(),
            window: None,
            ballpit: None,
            resize: ResizeDebouncer::default(),
            size: PhysicalSize::new(0, 0),
            occluded: false,
            suspended: false,
            last_cursor: Vec2::ZERO,
            primary_touch: None,
        }
    }

    fn page_visible(&self) -> bool {
        !self.occluded && !self.suspended && self.size.width > 0 && self.size.height > 0
    }

    fn window_area(&self) -> Rect {
        Rect::from_size(self.size.width as f32, self.size.height as f32)
    }

    // Re-evaluates both animation signals and kicks off frames when they start
    fn sync_lifecycle(&mut self) {
        let now = Instant::now();
        let visible = self.page_visible();
        let area = self.window_area();
        let Some(ballpit) = self.ballpit.as_mut() else {
            return;
        };

        let transitions = [
            ballpit.observe_window(area, now),
            ballpit.set_page_visible(visible, now),
        ];
        if transitions.contains(&LoopTransition::Started) {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
    }

    fn handle_touch(&mut self, touch: Touch) {
        let position = Vec2::new(touch.location.x as f32, touch.location.y as f32);
        // Only the first finger steers, like a single pointer
        match touch.phase {
            TouchPhase::Started if self.primary_touch.is_none() => {
                self.primary_touch = Some(touch.id);
                self.registry.touch_started(position);
            }
            TouchPhase::Moved if self.primary_touch == Some(touch.id) => {
                self.registry.touch_moved(position);
            }
            TouchPhase::Ended | TouchPhase::Cancelled if self.primary_touch == Some(touch.id) => {
                self.primary_touch = None;
                self.registry.touch_ended();
            }
            _ => (),
        }
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, key_code: KeyCode) {
        if key_code == KeyCode::Escape {
            self.shutdown(event_loop);
            return;
        }

        let Some(ballpit) = self.ballpit.as_mut() else {
            return;
        };
        let count = ballpit.field().len();
        match key_code {
            KeyCode::Space => {
                let paused = ballpit.toggle_pause();
                log::info!("Physics {}", if paused { "paused" } else { "resumed" });
            }
            KeyCode::Equal | KeyCode::NumpadAdd => ballpit.set_count((count * 2).max(1)),
            KeyCode::Minus | KeyCode::NumpadSubtract => ballpit.set_count((count / 2).max(1)),
            _ => (),
        }
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(ballpit) = self.ballpit.as_mut() {
            ballpit.dispose();
        }
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        self.suspended = false;

        if self.window.is_none() {
            let attributes = Window::default_attributes()
                .with_title("Happy Birthday!")
                .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
            let window = match event_loop.create_window(attributes) {
                Ok(window) => Arc::new(window),
                Err(err) => {
                    log::error!("Failed to create window: {err}");
                    event_loop.exit();
                    return;
                }
            };

            self.size = window.inner_size();
            let mut ballpit = Ballpit::attach(
                &self.registry,
                Some(window.clone()),
                self.window_area(),
                self.config.clone(),
            );
            if self.start_paused {
                ballpit.toggle_pause();
            }
            self.ballpit = Some(ballpit);
            self.window = Some(window);
        }

        self.sync_lifecycle();
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        self.suspended = true;
        self.sync_lifecycle();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested; stopping");
                self.shutdown(event_loop);
            }
            WindowEvent::RedrawRequested => {
                let Some(ballpit) = self.ballpit.as_mut() else {
                    return;
                };
                // A redraw arriving after the loop stopped does nothing and
                // does not schedule another
                if ballpit.frame(Instant::now()).is_some() {
                    if let Some(window) = &self.window {
                        window.request_redraw();
                    }
                }
            }
            WindowEvent::Resized(size) => {
                self.size = size;
                self.resize.schedule(Instant::now());
                if let Some(ballpit) = self.ballpit.as_mut() {
                    ballpit.defer_resize();
                }
                self.sync_lifecycle();
            }
            WindowEvent::Occluded(occluded) => {
                self.occluded = occluded;
                self.sync_lifecycle();
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.last_cursor = Vec2::new(position.x as f32, position.y as f32);
                if self.registry.is_listening() {
                    self.registry.pointer_moved(self.last_cursor);
                }
            }
            WindowEvent::CursorLeft { .. } => {
                if self.registry.is_listening() {
                    self.registry.pointer_left();
                }
            }
            WindowEvent::MouseInput {
                state: ElementState::Released,
                button: MouseButton::Left,
                ..
            } => {
                if self.registry.is_listening() {
                    self.registry.clicked(self.last_cursor);
                }
            }
            WindowEvent::Touch(touch) => {
                if self.registry.is_listening() {
                    self.handle_touch(touch);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key_code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => self.handle_key(event_loop, key_code),
            _ => (),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.resize.take_due(Instant::now()) {
            let area = self.window_area();
            if let Some(ballpit) = self.ballpit.as_mut() {
                ballpit.resize(area);
            }
            self.sync_lifecycle();
        }

        // Frames drive themselves through redraw requests; only wake for a
        // pending resize
        match self.resize.deadline() {
            Some(deadline) => event_loop.set_control_flow(ControlFlow::WaitUntil(deadline)),
            None => event_loop.set_control_flow(ControlFlow::Wait),
        }
    }
}

pub fn run(config: BallpitConfig, start_paused: bool) -> Result<(), EventLoopError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(config, start_paused);
    event_loop.run_app(&mut app)
}

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use glam::{Vec2, Vec3};
use winit::window::Window;

use crate::config::BallpitConfig;
use crate::error::AttachError;
use crate::pointer::{PointerHandle, PointerHandlers, PointerRegistry, Rect};
use crate::rendering::{
    Camera, FrameState, InstancedView, LoopTransition, RenderHost, RenderLoop, SceneUniforms,
    color_from_hex,
};
use crate::simulation::ParticleField;

const CAMERA_POSITION: Vec3 = Vec3::new(0.0, 0.0, 20.0);

// Written by pointer handlers, read at the start of every frame. `changed`
// marks a pointer event not yet applied to the field.
struct AttractorLink {
    camera: Camera,
    target: Vec3,
    controlled: bool,
    changed: bool,
}

/// A ball pit attached to one region of a window.
///
/// Wires pointer input to the attractor sphere and the render loop to the
/// simulation and instanced view. Without a render target the ball pit still
/// simulates but skips drawing.
pub struct Ballpit {
    config: BallpitConfig,
    field: ParticleField,
    view: InstancedView,
    link: Rc<RefCell<AttractorLink>>,
    render_loop: RenderLoop,
    host: Option<RenderHost>,
    pointer: PointerHandle,
    viewport: Rect,
    resize_pending: bool,
    paused: bool,
    disposed: bool,
}

impl Ballpit {
    pub fn attach(
        registry: &PointerRegistry,
        window: Option<Arc<Window>>,
        viewport: Rect,
        config: BallpitConfig,
    ) -> Self {
        let count = config.simulation.count;
        let host = match window {
            Some(window) => pollster::block_on(RenderHost::new(window, count)),
            None => Err(AttachError::MissingTarget),
        };
        let host = match host {
            Ok(host) => Some(host),
            Err(err) => {
                log::error!("Ballpit has no render target, running without drawing: {err}");
                None
            }
        };

        let link = Rc::new(RefCell::new(AttractorLink {
            camera: Camera::new(CAMERA_POSITION),
            target: Vec3::ZERO,
            controlled: config.simulation.control_sphere0,
            changed: false,
        }));

        let pointer = registry.register(viewport, attractor_handlers(&link));

        let mut ballpit = Self {
            field: ParticleField::new(config.simulation.clone()),
            view: InstancedView::new(count, &config.colors),
            config,
            link,
            render_loop: RenderLoop::new(),
            host,
            pointer,
            viewport,
            resize_pending: false,
            paused: false,
            disposed: false,
        };
        ballpit.resize(viewport);
        ballpit
    }

    pub fn is_degraded(&self) -> bool {
        self.host.is_none()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_running(&self) -> bool {
        self.render_loop.is_running()
    }

    pub fn config(&self) -> &BallpitConfig {
        &self.config
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn field_mut(&mut self) -> &mut ParticleField {
        &mut self.field
    }

    pub fn view(&self) -> &InstancedView {
        &self.view
    }

    pub fn render_loop(&self) -> &RenderLoop {
        &self.render_loop
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    pub fn pointer_state(&self) -> Option<crate::pointer::PointerState> {
        self.pointer.state()
    }

    pub fn is_resize_pending(&self) -> bool {
        self.resize_pending
    }

    /// Marks a resize as scheduled. Drawing is skipped until [`Ballpit::resize`]
    /// applies it, since the surface still has the old size.
    pub fn defer_resize(&mut self) {
        self.resize_pending = true;
    }

    pub fn world_size(&self) -> Vec2 {
        self.link.borrow().camera.world_size()
    }

    /// Refits camera, containment box and render target to a new viewport.
    pub fn resize(&mut self, viewport: Rect) {
        self.resize_pending = false;
        self.viewport = viewport;
        self.pointer.set_bounds(viewport);

        let world = {
            let mut link = self.link.borrow_mut();
            link.camera.set_viewport(viewport.width, viewport.height);
            link.camera.world_size()
        };
        self.field.set_world_bounds(world.x / 2.0, world.y / 2.0);

        if let Some(host) = &mut self.host {
            host.resize(viewport.width as u32, viewport.height as u32);
        }
        log::debug!(
            "Resized to {}x{}, world bounds {:.2} x {:.2}",
            viewport.width,
            viewport.height,
            world.x,
            world.y
        );
    }

    /// Rebuilds the simulation and view with `count` spheres. Nothing from the
    /// previous buffers is kept apart from the configuration.
    pub fn set_count(&mut self, count: usize) {
        let mut simulation = self.field.config().clone();
        simulation.count = count;
        self.config.simulation = simulation.clone();

        self.field = ParticleField::new(simulation);
        self.view = InstancedView::new(count, &self.config.colors);
        if let Some(host) = &mut self.host {
            host.set_instance_count(count);
        }
        log::info!("Ball pit rebuilt with {count} spheres");
    }

    /// Freezes or resumes physics. Frames keep drawing either way.
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    pub fn set_page_visible(&mut self, visible: bool, now: Instant) -> LoopTransition {
        if self.disposed {
            return LoopTransition::Unchanged;
        }
        self.render_loop.set_page_visible(visible, now)
    }

    pub fn set_intersecting(&mut self, intersecting: bool, now: Instant) -> LoopTransition {
        if self.disposed {
            return LoopTransition::Unchanged;
        }
        self.render_loop.set_intersecting(intersecting, now)
    }

    /// Updates intersection from the visible part of the window.
    pub fn observe_window(&mut self, window_area: Rect, now: Instant) -> LoopTransition {
        let intersecting = self.viewport.intersects(&window_area);
        self.set_intersecting(intersecting, now)
    }

    /// Runs one frame: physics, instance update, then draw. Returns the frame
    /// timing, or `None` when the loop is stopped and nothing ran.
    pub fn frame(&mut self, now: Instant) -> Option<FrameState> {
        let frame = self.render_loop.begin_frame(now)?;

        {
            let mut link = self.link.borrow_mut();
            if link.changed {
                link.changed = false;
                self.field.set_attractor_target(link.target);
                self.field.set_attractor_control(link.controlled);
            }
        }

        if !self.paused {
            self.field.update(frame.delta);
        }
        self.view.update(&self.field, self.field.config().follow_cursor);

        let drawable = !self.resize_pending;
        if let Some(host) = self.host.as_mut().filter(|_| drawable) {
            let link = self.link.borrow();
            let lights = &self.config.lights;
            let uniforms = SceneUniforms::new(
                link.camera.view_projection(),
                link.camera.position,
                self.view.light_position(),
                self.view.light_color(),
                color_from_hex(lights.ambient_color),
                lights,
                &self.config.material,
            );
            host.draw(&uniforms, self.view.instances());
        }

        Some(frame)
    }

    /// Stops the loop, detaches pointer input and frees GPU resources.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.render_loop.stop();
        self.pointer.dispose();
        if let Some(mut host) = self.host.take() {
            host.release();
        }
        self.disposed = true;
        log::debug!("Ball pit disposed");
    }
}

fn attractor_handlers(link: &Rc<RefCell<AttractorLink>>) -> PointerHandlers {
    let on_move = Rc::clone(link);
    let on_leave = Rc::clone(link);
    PointerHandlers::new()
        .on_move(move |state| {
            let mut link = on_move.borrow_mut();
            if let Some(point) = link.camera.unproject_onto_plane(state.normalized) {
                link.target = point;
            }
            link.controlled = true;
            link.changed = true;
        })
        .on_leave(move |_| {
            let mut link = on_leave.borrow_mut();
            link.controlled = false;
            link.changed = true;
        })
}

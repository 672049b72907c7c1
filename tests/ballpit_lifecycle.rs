//! End-to-end tests for a ball pit attached without a render target.
//!
//! Without a window the ball pit runs degraded: the loop, physics, pointer and
//! instance data all work, only drawing is skipped. That covers everything
//! except the GPU path.

use std::time::{Duration, Instant};

use ballpit::pointer::{PointerRegistry, Rect};
use ballpit::rendering::LoopTransition;
use ballpit::{Ballpit, BallpitConfig};
use glam::{Vec2, Vec3};

const FRAME: Duration = Duration::from_millis(16);

fn viewport() -> Rect {
    Rect::from_size(800.0, 600.0)
}

fn attach(registry: &PointerRegistry, config: BallpitConfig) -> Ballpit {
    Ballpit::attach(registry, None, viewport(), config)
}

/// Attaches and starts the loop at `t0`.
fn running(registry: &PointerRegistry, config: BallpitConfig, t0: Instant) -> Ballpit {
    let mut ballpit = attach(registry, config);
    assert_eq!(ballpit.observe_window(viewport(), t0), LoopTransition::Started);
    ballpit
}

#[test]
fn attach_without_window_degrades_but_registers_pointer() {
    let registry = PointerRegistry::new();
    let ballpit = attach(&registry, BallpitConfig::default());

    assert!(ballpit.is_degraded());
    assert!(!ballpit.is_running());
    assert_eq!(ballpit.field().len(), 200);
    assert_eq!(ballpit.view().len(), 200);
    assert!(registry.is_listening());
}

#[test]
fn bounds_follow_the_visible_world() {
    let registry = PointerRegistry::new();
    let mut ballpit = attach(&registry, BallpitConfig::default());

    let world = ballpit.world_size();
    let expected_height = 2.0 * 25.0f32.to_radians().tan() * 20.0;
    assert!((world.y - expected_height).abs() < 1e-3);
    assert!((world.x - expected_height * 800.0 / 600.0).abs() < 1e-3);
    assert!((ballpit.field().config().max_x - world.x / 2.0).abs() < 1e-5);
    assert!((ballpit.field().config().max_y - world.y / 2.0).abs() < 1e-5);

    ballpit.resize(Rect::from_size(600.0, 600.0));
    let square = ballpit.world_size();
    assert!((square.x - square.y).abs() < 1e-3);
    assert!((ballpit.field().config().max_x - square.x / 2.0).abs() < 1e-5);
    // Depth is not tied to the viewport
    assert_eq!(ballpit.field().config().max_z, 2.0);
}

#[test]
fn frames_run_only_while_visible_and_intersecting() {
    let registry = PointerRegistry::new();
    let t0 = Instant::now();
    let mut ballpit = attach(&registry, BallpitConfig::default());

    // Not yet known to intersect
    assert!(ballpit.frame(t0).is_none());

    assert_eq!(ballpit.observe_window(viewport(), t0), LoopTransition::Started);
    assert!(ballpit.frame(t0 + FRAME).is_some());
    assert_eq!(ballpit.render_loop().frame_count(), 1);

    assert_eq!(ballpit.set_page_visible(false, t0 + 2 * FRAME), LoopTransition::Stopped);
    let frozen = ballpit.field().positions().to_vec();
    assert!(ballpit.frame(t0 + 3 * FRAME).is_none());
    assert_eq!(ballpit.field().positions(), frozen.as_slice());
    assert_eq!(ballpit.render_loop().frame_count(), 1);

    // Visible again but scrolled out of view
    ballpit.resize(Rect::new(0.0, 1000.0, 800.0, 600.0));
    assert_eq!(ballpit.observe_window(viewport(), t0), LoopTransition::Unchanged);
    assert_eq!(ballpit.set_page_visible(true, t0), LoopTransition::Unchanged);
    assert!(!ballpit.is_running());

    ballpit.resize(viewport());
    assert_eq!(ballpit.observe_window(viewport(), t0), LoopTransition::Started);
    assert!(ballpit.is_running());
}

#[test]
fn resuming_does_not_replay_hidden_time() {
    let registry = PointerRegistry::new();
    let t0 = Instant::now();
    let mut ballpit = running(&registry, BallpitConfig::default(), t0);

    let first = ballpit.frame(t0 + FRAME).expect("running");
    assert!((first.delta - 0.016).abs() < 1e-4);

    ballpit.set_page_visible(false, t0 + FRAME);
    let resume_at = t0 + Duration::from_secs(5);
    assert_eq!(ballpit.set_page_visible(true, resume_at), LoopTransition::Started);

    let next = ballpit.frame(resume_at + FRAME).expect("running");
    assert!((next.delta - 0.016).abs() < 1e-4, "delta jumped to {}", next.delta);
    assert!((next.elapsed - 0.032).abs() < 1e-4);
}

#[test]
fn pointer_moves_steer_the_attractor() {
    let registry = PointerRegistry::new();
    let t0 = Instant::now();
    let mut config = BallpitConfig::default();
    config.simulation.gravity = 0.0;
    let mut ballpit = running(&registry, config, t0);
    let half_world = ballpit.world_size() / 2.0;

    // Top-right corner of the viewport maps to the top-right of the world
    registry.pointer_moved(Vec2::new(800.0, 0.0));
    assert!(ballpit.pointer_state().expect("registered").hover);
    ballpit.frame(t0 + FRAME).expect("running");

    assert!(ballpit.field().config().control_sphere0);
    let target = ballpit.field().attractor_target();
    assert!((target - Vec3::new(half_world.x, half_world.y, 0.0)).length() < 1e-2);
    let attractor = ballpit.field().positions()[0];
    assert!((attractor - target * 0.1).length() < 1e-4);

    registry.pointer_left();
    ballpit.frame(t0 + 2 * FRAME).expect("running");
    assert!(!ballpit.field().config().control_sphere0);
}

#[test]
fn pause_freezes_physics_but_keeps_frames() {
    let registry = PointerRegistry::new();
    let t0 = Instant::now();
    let mut ballpit = running(&registry, BallpitConfig::default(), t0);
    ballpit.frame(t0 + FRAME).expect("running");

    assert!(ballpit.toggle_pause());
    let frozen = ballpit.field().positions().to_vec();
    for i in 2..6 {
        assert!(ballpit.frame(t0 + i * FRAME).is_some());
    }
    assert_eq!(ballpit.field().positions(), frozen.as_slice());
    assert_eq!(ballpit.render_loop().frame_count(), 5);

    assert!(!ballpit.toggle_pause());
    ballpit.frame(t0 + 6 * FRAME).expect("running");
    assert_ne!(ballpit.field().positions(), frozen.as_slice());
}

#[test]
fn changing_count_rebuilds_everything() {
    let registry = PointerRegistry::new();
    let t0 = Instant::now();
    let mut ballpit = running(&registry, BallpitConfig::default(), t0);
    let bounds = ballpit.field().config().max_x;

    ballpit.set_count(50);

    assert_eq!(ballpit.field().len(), 50);
    assert_eq!(ballpit.view().len(), 50);
    assert_eq!(ballpit.config().simulation.count, 50);
    assert_eq!(ballpit.field().config().max_x, bounds);

    ballpit.frame(t0 + FRAME).expect("running");
    assert_eq!(ballpit.view().instances().len(), 50);
}

#[test]
fn instances_mirror_the_simulation() {
    let registry = PointerRegistry::new();
    let t0 = Instant::now();
    let mut config = BallpitConfig::default();
    config.colors = vec![0xff0000, 0x0000ff];
    let mut ballpit = running(&registry, config, t0);
    ballpit.frame(t0 + FRAME).expect("running");

    let field = ballpit.field();
    let view = ballpit.view();
    for (i, instance) in view.instances().iter().enumerate() {
        assert!((instance.translation() - field.positions()[i]).length() < 1e-5);
        assert!((instance.scale() - field.radii()[i]).abs() < 1e-5);
    }
    assert_eq!(view.light_position(), field.positions()[0]);
}

#[test]
fn hidden_cursor_sphere_is_not_drawn() {
    let registry = PointerRegistry::new();
    let t0 = Instant::now();
    let mut config = BallpitConfig::default();
    config.simulation.follow_cursor = false;
    let mut ballpit = running(&registry, config, t0);
    ballpit.frame(t0 + FRAME).expect("running");

    assert_eq!(ballpit.view().instances()[0].scale(), 0.0);
    assert!(ballpit.view().instances()[1].scale() > 0.0);
}

#[test]
fn dispose_stops_frames_and_releases_pointer() {
    let registry = PointerRegistry::new();
    let t0 = Instant::now();
    let mut ballpit = running(&registry, BallpitConfig::default(), t0);
    ballpit.frame(t0 + FRAME).expect("running");

    ballpit.dispose();

    assert!(ballpit.is_disposed());
    assert!(!ballpit.is_running());
    assert!(!registry.is_listening());
    assert!(ballpit.pointer_state().is_none());
    assert!(ballpit.frame(t0 + 2 * FRAME).is_none());
    assert_eq!(ballpit.observe_window(viewport(), t0), LoopTransition::Unchanged);

    // Second dispose is a no-op
    ballpit.dispose();
    assert!(ballpit.is_disposed());
}

#[test]
fn two_ball_pits_share_one_registry() {
    let registry = PointerRegistry::new();
    let mut left = Ballpit::attach(
        &registry,
        None,
        Rect::new(0.0, 0.0, 400.0, 600.0),
        BallpitConfig::default(),
    );
    let right = Ballpit::attach(
        &registry,
        None,
        Rect::new(400.0, 0.0, 400.0, 600.0),
        BallpitConfig::default(),
    );
    assert_eq!(registry.len(), 2);

    registry.pointer_moved(Vec2::new(100.0, 100.0));
    assert!(left.pointer_state().expect("registered").hover);
    assert!(!right.pointer_state().expect("registered").hover);

    left.dispose();
    assert!(registry.is_listening());
    drop(right);
    assert!(!registry.is_listening());
}

#[test]
fn configured_attractor_control_holds_until_pointer_input() {
    let registry = PointerRegistry::new();
    let t0 = Instant::now();
    let mut config = BallpitConfig::default();
    config.simulation.gravity = 0.0;
    config.simulation.control_sphere0 = true;
    let mut ballpit = running(&registry, config, t0);
    ballpit.field_mut().set_position(0, Vec3::new(3.0, 3.0, 0.0));

    ballpit.frame(t0 + FRAME).expect("running");

    // Eases toward the origin target instead of moving freely
    assert!(ballpit.field().config().control_sphere0);
    let attractor = ballpit.field().positions()[0];
    assert!((attractor - Vec3::new(2.7, 2.7, 0.0)).length() < 1e-5);

    ballpit.frame(t0 + 2 * FRAME).expect("running");
    assert!(ballpit.field().config().control_sphere0);

    registry.pointer_moved(Vec2::new(400.0, 300.0));
    registry.pointer_left();
    ballpit.frame(t0 + 3 * FRAME).expect("running");
    assert!(!ballpit.field().config().control_sphere0);

    // Stays released on later frames
    ballpit.frame(t0 + 4 * FRAME).expect("running");
    assert!(!ballpit.field().config().control_sphere0);
}

#[test]
fn pending_resize_keeps_simulating() {
    let registry = PointerRegistry::new();
    let t0 = Instant::now();
    let mut ballpit = running(&registry, BallpitConfig::default(), t0);

    ballpit.defer_resize();
    assert!(ballpit.is_resize_pending());
    let before = ballpit.field().positions().to_vec();
    assert!(ballpit.frame(t0 + FRAME).is_some());
    assert_ne!(ballpit.field().positions(), before.as_slice());

    ballpit.resize(Rect::from_size(1024.0, 768.0));
    assert!(!ballpit.is_resize_pending());
    assert_eq!(ballpit.viewport(), Rect::from_size(1024.0, 768.0));
}

use glam::Vec3;
use rand::Rng;

use crate::simulation::types::SimulationConfig;

// Fraction of the remaining distance the attractor covers each step
const ATTRACTOR_EASING: f32 = 0.1;

// Minimum speed used when scaling collision impulses. A resting sphere still
// gets pushed at full strength.
const PAIR_IMPULSE_FLOOR: f32 = 1.0;
const ATTRACTOR_IMPULSE_FLOOR: f32 = 2.0;

/// Sphere buffers for a ball pit, one entry per particle.
///
/// Index 0 is the attractor. When `control_sphere0` is set it eases toward
/// [`ParticleField::attractor_target`] instead of moving freely, and pushes the
/// other spheres away without being pushed back.
///
/// The buffer length is fixed at construction. A different count needs a new field.
pub struct ParticleField {
    config: SimulationConfig,
    positions: Vec<Vec3>,
    velocities: Vec<Vec3>,
    radii: Vec<f32>,
    attractor_target: Vec3,
}

impl ParticleField {
    pub fn new(config: SimulationConfig) -> Self {
        Self::with_rng(config, &mut rand::thread_rng())
    }

    /// Builds a field with scattered positions and random radii drawn from `rng`.
    pub fn with_rng<R: Rng + ?Sized>(config: SimulationConfig, rng: &mut R) -> Self {
        let count = config.count;
        let attractor_target = Vec3::ZERO;

        let mut positions = vec![Vec3::ZERO; count];
        let mut radii = vec![1.0; count];

        if count > 0 {
            positions[0] = attractor_target;
            radii[0] = config.size0;
        }

        for i in 1..count {
            positions[i] = Vec3::new(
                spread(rng, config.max_x),
                spread(rng, config.max_y),
                spread(rng, config.max_z),
            );
            radii[i] = if config.max_size > config.min_size {
                rng.gen_range(config.min_size..config.max_size)
            } else {
                config.min_size
            };
        }

        Self {
            config,
            positions,
            velocities: vec![Vec3::ZERO; count],
            radii,
            attractor_target,
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut SimulationConfig {
        &mut self.config
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn velocities(&self) -> &[Vec3] {
        &self.velocities
    }

    pub fn radii(&self) -> &[f32] {
        &self.radii
    }

    pub fn attractor_target(&self) -> Vec3 {
        self.attractor_target
    }

    pub fn set_attractor_target(&mut self, target: Vec3) {
        self.attractor_target = target;
    }

    pub fn set_attractor_control(&mut self, enabled: bool) {
        self.config.control_sphere0 = enabled;
    }

    /// Updates the horizontal and vertical containment half-extents.
    pub fn set_world_bounds(&mut self, max_x: f32, max_y: f32) {
        self.config.max_x = max_x;
        self.config.max_y = max_y;
    }

    pub fn set_position(&mut self, index: usize, position: Vec3) {
        self.positions[index] = position;
    }

    pub fn set_velocity(&mut self, index: usize, velocity: Vec3) {
        self.velocities[index] = velocity;
    }

    pub fn set_radius(&mut self, index: usize, radius: f32) {
        self.radii[index] = radius;
    }

    /// Advances every sphere by one step.
    ///
    /// Velocities are per-step displacements; `delta` only scales gravity.
    /// Collisions are resolved in a single ordered pass, so dense packings can
    /// keep a little overlap that later steps work out.
    pub fn update(&mut self, delta: f32) {
        let count = self.len();
        let c = &self.config;

        let mut start = 0;
        if c.control_sphere0 && count > 0 {
            start = 1;
            self.positions[0] = self.positions[0].lerp(self.attractor_target, ATTRACTOR_EASING);
            self.velocities[0] = Vec3::ZERO;
        }

        // Integrate free bodies
        for i in start..count {
            let mut vel = self.velocities[i];
            vel.y -= delta * c.gravity * self.radii[i];
            vel *= c.friction;
            vel = vel.clamp_length_max(c.max_velocity);
            self.positions[i] += vel;
            self.velocities[i] = vel;
        }

        for i in start..count {
            let mut pos = self.positions[i];
            let mut vel = self.velocities[i];
            let radius = self.radii[i];

            for j in (i + 1)..count {
                let other_pos = self.positions[j];
                let diff = other_pos - pos;
                let dist = diff.length();
                let sum = radius + self.radii[j];
                if dist < sum {
                    let overlap = sum - dist;
                    let corr = diff.normalize_or_zero() * (0.5 * overlap);

                    pos -= corr;
                    vel -= corr * vel.length().max(PAIR_IMPULSE_FLOOR);

                    let other_vel = self.velocities[j];
                    self.positions[j] = other_pos + corr;
                    self.velocities[j] =
                        other_vel + corr * other_vel.length().max(PAIR_IMPULSE_FLOOR);
                }
            }

            if c.control_sphere0 {
                let diff = self.positions[0] - pos;
                let dist = diff.length();
                let sum = radius + self.radii[0];
                if dist < sum {
                    let corr = diff.normalize_or_zero() * (sum - dist);
                    pos -= corr;
                    vel -= corr * vel.length().max(ATTRACTOR_IMPULSE_FLOOR);
                }
            }

            contain(c, &mut pos, &mut vel, radius);

            self.positions[i] = pos;
            self.velocities[i] = vel;
        }
    }
}

// Keeps one sphere inside the box, reflecting velocity off any wall it crossed
fn contain(c: &SimulationConfig, pos: &mut Vec3, vel: &mut Vec3, radius: f32) {
    if pos.x.abs() + radius > c.max_x {
        pos.x = sign(pos.x) * (c.max_x - radius);
        vel.x = -vel.x * c.wall_bounce;
    }

    if c.gravity == 0.0 {
        if pos.y.abs() + radius > c.max_y {
            pos.y = sign(pos.y) * (c.max_y - radius);
            vel.y = -vel.y * c.wall_bounce;
        }
    } else if pos.y - radius < -c.max_y {
        // Only the floor. Gravity brings anything above the ceiling back down.
        pos.y = -c.max_y + radius;
        vel.y = -vel.y * c.wall_bounce;
    }

    if pos.z.abs() + radius > c.z_bound() {
        pos.z = sign(pos.z) * (c.max_z - radius);
        vel.z = -vel.z * c.wall_bounce;
    }
}

// Zero stays zero, unlike f32::signum
fn sign(value: f32) -> f32 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

fn spread<R: Rng + ?Sized>(rng: &mut R, half_extent: f32) -> f32 {
    rng.gen_range(-1.0f32..1.0f32) * half_extent
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn still_config(count: usize) -> SimulationConfig {
        SimulationConfig {
            count,
            gravity: 0.0,
            max_x: 5.0,
            max_y: 5.0,
            max_z: 2.0,
            min_size: 1.0,
            max_size: 1.0,
            size0: 1.0,
            ..Default::default()
        }
    }

    #[test]
    fn sign_keeps_zero() {
        assert_eq!(sign(0.0), 0.0);
        assert_eq!(sign(-3.0), -1.0);
        assert_eq!(sign(0.5), 1.0);
    }

    #[test]
    fn construction_places_attractor_at_target() {
        let mut rng = StdRng::seed_from_u64(7);
        let field = ParticleField::with_rng(SimulationConfig::default(), &mut rng);
        assert_eq!(field.len(), 200);
        assert_eq!(field.positions()[0], Vec3::ZERO);
        assert_eq!(field.radii()[0], 1.0);
        for &r in &field.radii()[1..] {
            assert!((0.5..1.0).contains(&r));
        }
        for p in &field.positions()[1..] {
            assert!(p.x.abs() <= 5.0 && p.y.abs() <= 5.0 && p.z.abs() <= 2.0);
        }
    }

    #[test]
    fn equal_size_range_does_not_panic() {
        let mut rng = StdRng::seed_from_u64(1);
        let field = ParticleField::with_rng(still_config(10), &mut rng);
        assert!(field.radii().iter().all(|&r| r == 1.0));
    }

    #[test]
    fn attractor_eases_toward_target() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut field = ParticleField::with_rng(still_config(1), &mut rng);
        field.set_attractor_control(true);
        field.set_attractor_target(Vec3::new(1.0, 0.0, 0.0));
        field.set_velocity(0, Vec3::new(0.3, 0.3, 0.0));
        field.update(0.016);
        assert!((field.positions()[0].x - 0.1).abs() < 1e-6);
        assert_eq!(field.velocities()[0], Vec3::ZERO);
    }

    #[test]
    fn gravity_scales_with_radius() {
        let mut config = still_config(3);
        config.gravity = 1.0;
        config.friction = 1.0;
        config.max_velocity = 10.0;
        config.max_y = 100.0;
        config.max_x = 100.0;
        let mut rng = StdRng::seed_from_u64(5);
        let mut field = ParticleField::with_rng(config, &mut rng);
        field.set_position(1, Vec3::new(-10.0, 0.0, 0.0));
        field.set_position(2, Vec3::new(10.0, 0.0, 0.0));
        field.set_position(0, Vec3::new(0.0, 50.0, 0.0));
        field.set_radius(1, 0.5);
        field.set_radius(2, 1.0);
        field.update(0.1);
        assert!((field.velocities()[1].y + 0.05).abs() < 1e-6);
        assert!((field.velocities()[2].y + 0.1).abs() < 1e-6);
    }

    #[test]
    fn speed_is_clamped() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut field = ParticleField::with_rng(still_config(2), &mut rng);
        field.set_position(0, Vec3::new(-3.0, 0.0, 0.0));
        field.set_position(1, Vec3::new(3.0, 0.0, 0.0));
        field.set_velocity(1, Vec3::new(0.0, 1.0, 0.0));
        field.update(0.016);
        assert!(field.velocities()[1].length() <= 0.15 + 1e-6);
    }
}

// Parameters shared by every step of a ball-pit simulation
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub count: usize,

    // Containment half-extents. max_x/max_y follow the camera on resize.
    pub max_x: f32,
    pub max_y: f32,
    pub max_z: f32,

    pub gravity: f32,
    pub friction: f32,    // velocity multiplier per step, (0, 1]
    pub wall_bounce: f32, // restitution on wall contact, [0, 1]
    pub max_velocity: f32,

    pub min_size: f32,
    pub max_size: f32,
    pub size0: f32, // radius of the attractor sphere

    pub control_sphere0: bool,
    pub follow_cursor: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            count: 200,
            max_x: 5.0,
            max_y: 5.0,
            max_z: 2.0,
            gravity: 0.5,
            friction: 0.9975,
            wall_bounce: 0.95,
            max_velocity: 0.15,
            min_size: 0.5,
            max_size: 1.0,
            size0: 1.0,
            control_sphere0: false,
            follow_cursor: true,
        }
    }
}

impl SimulationConfig {
    /// Depth bound used for the Z wall test. Oversized spheres would otherwise
    /// never come to rest inside a shallow box.
    pub fn z_bound(&self) -> f32 {
        self.max_z.max(self.max_size)
    }
}

use clap::Parser;

use crate::rendering::{LightParameters, MaterialParameters};
use crate::simulation::SimulationConfig;

/// Everything a ball pit is built from.
#[derive(Debug, Clone, PartialEq)]
pub struct BallpitConfig {
    pub simulation: SimulationConfig,
    /// Gradient stops as 0xRRGGBB, spread across particle indices
    pub colors: Vec<u32>,
    pub lights: LightParameters,
    pub material: MaterialParameters,
}

impl Default for BallpitConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            colors: vec![0x000000, 0x000000, 0x000000],
            lights: LightParameters::default(),
            material: MaterialParameters::default(),
        }
    }
}

// Command-line overrides for the defaults above
#[derive(Parser, Debug)]
#[command(name = "ballpit", version, about = "Interactive ball pit greeting")]
pub struct Args {
    /// Number of spheres
    #[arg(long)]
    pub count: Option<usize>,

    /// Downward acceleration; 0 lets the spheres float
    #[arg(long)]
    pub gravity: Option<f32>,

    /// Velocity kept per step, in (0, 1]
    #[arg(long)]
    pub friction: Option<f32>,

    /// Restitution when a sphere hits a wall, in [0, 1]
    #[arg(long)]
    pub wall_bounce: Option<f32>,

    #[arg(long)]
    pub max_velocity: Option<f32>,

    #[arg(long)]
    pub min_size: Option<f32>,

    #[arg(long)]
    pub max_size: Option<f32>,

    /// Radius of the cursor-controlled sphere
    #[arg(long)]
    pub size0: Option<f32>,

    /// Gradient stops, e.g. "#ff6b9d,#c44dff,#5b8cff"
    #[arg(long, value_delimiter = ',', value_parser = parse_hex_color)]
    pub colors: Vec<u32>,

    /// Ease the first sphere toward the centre until the pointer takes over
    #[arg(long = "control-sphere0")]
    pub control_sphere0: bool,

    /// Keep the cursor sphere invisible (it still pushes other spheres)
    #[arg(long)]
    pub hide_cursor_sphere: bool,

    /// Start with physics frozen
    #[arg(long)]
    pub paused: bool,
}

impl Args {
    pub fn to_config(&self) -> BallpitConfig {
        let mut config = BallpitConfig::default();
        let sim = &mut config.simulation;

        if let Some(count) = self.count {
            sim.count = count;
        }
        if let Some(gravity) = self.gravity {
            sim.gravity = gravity;
        }
        if let Some(friction) = self.friction {
            sim.friction = friction;
        }
        if let Some(wall_bounce) = self.wall_bounce {
            sim.wall_bounce = wall_bounce;
        }
        if let Some(max_velocity) = self.max_velocity {
            sim.max_velocity = max_velocity;
        }
        if let Some(min_size) = self.min_size {
            sim.min_size = min_size;
        }
        if let Some(max_size) = self.max_size {
            sim.max_size = max_size;
        }
        if let Some(size0) = self.size0 {
            sim.size0 = size0;
        }
        sim.control_sphere0 = self.control_sphere0;
        sim.follow_cursor = !self.hide_cursor_sphere;

        if !self.colors.is_empty() {
            config.colors = self.colors.clone();
        }
        config
    }
}

/// Parses "#rrggbb", "0xrrggbb" or "rrggbb".
pub fn parse_hex_color(value: &str) -> Result<u32, String> {
    let trimmed = value.trim();
    let digits = trimmed
        .strip_prefix('#')
        .or_else(|| trimmed.strip_prefix("0x"))
        .unwrap_or(trimmed);
    if digits.len() != 6 {
        return Err(format!("expected six hex digits, got {value:?}"));
    }
    u32::from_str_radix(digits, 16).map_err(|err| format!("invalid color {value:?}: {err}"))
}

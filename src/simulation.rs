mod field;
mod types;

pub use field::ParticleField;
pub use types::SimulationConfig;

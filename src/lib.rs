pub mod app;
pub mod ballpit;
pub mod config;
pub mod error;
pub mod pointer;
pub mod rendering;
pub mod simulation;

pub use ballpit::Ballpit;
pub use config::BallpitConfig;
pub use error::AttachError;

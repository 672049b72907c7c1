mod camera;
mod instances;
mod material;
mod mesh;
mod render_loop;
mod renderer;

pub use camera::Camera;
pub use instances::{InstanceRaw, InstancedView, color_from_hex, gradient_at};
pub use material::{LightParameters, MaterialParameters, SceneUniforms};
pub use mesh::{MeshVertex, SphereMesh};
pub use render_loop::{Clock, FrameState, LoopTransition, RESIZE_DEBOUNCE, RenderLoop, ResizeDebouncer};
pub use renderer::RenderHost;

use thiserror::Error;

/// Reasons a ball pit could not get a rendering target.
///
/// These never reach the host application: the ball pit logs them and keeps
/// running without drawing.
#[derive(Error, Debug)]
pub enum AttachError {
    #[error("no window to render into")]
    MissingTarget,

    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no compatible GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to open GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface reports no supported texture formats")]
    UnsupportedSurface,
}

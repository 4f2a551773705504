use thiserror::Error;

use crate::device::TargetId;

/// Renderer and device failures
///
/// Lifecycle misuse (rendering after teardown, preparing twice) fails fast
/// with a typed variant instead of corrupting state.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("renderer has been torn down")]
    TornDown,

    #[error("a render strategy was already prepared for this renderer")]
    AlreadyPrepared,

    #[error("unknown output target {0:?}")]
    UnknownTarget(TargetId),

    #[error("gpu device error: {0}")]
    Device(String),

    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}

use crate::error::RenderError;
use crate::strategy::{RenderStrategy, StrategyResources};
use crate::viewport::Viewport;

/// Opaque id for a host-created output target
///
/// The host creates and destroys targets; a renderer only draws into one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetId(pub u32);

/// Opaque id for a renderer-owned GPU resource (buffer, texture, pipeline)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceId(pub u64);

/// Parameters for one frame of drawing
#[derive(Debug, Clone, Copy)]
pub struct FrameParams<'a> {
    /// Destination target, host-owned
    pub target: TargetId,
    /// Viewport in effect for this frame
    pub viewport: Viewport,
    /// Animation clock in seconds since rendering began
    pub time: f32,
    /// Strategy resources, or None for a degraded bare-clear frame
    pub resources: Option<&'a StrategyResources>,
}

/// GPU seam - all drawing and resource ownership flows through here
///
/// Implementations use interior mutability where they track state, so the
/// renderer can hold a shared handle the way layers share a GPU context.
pub trait RenderDevice {
    /// Acquire the resources backing a strategy for the given target
    ///
    /// Returned handles are owned by the caller and must come back through
    /// [`release`](Self::release).
    fn prepare(
        &self,
        target: TargetId,
        strategy: RenderStrategy,
    ) -> Result<StrategyResources, RenderError>;

    /// Draw one frame into the target described by `params`
    fn draw(&self, params: &FrameParams) -> Result<(), RenderError>;

    /// Release one previously acquired resource handle
    ///
    /// Releasing an unknown handle is a no-op.
    fn release(&self, id: ResourceId);
}

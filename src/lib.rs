pub mod cli;
pub mod clock;
pub mod device;
pub mod error;
pub mod renderer;
pub mod strategy;
pub mod viewport;
pub mod wgpu_device;

pub use clock::FrameClock;
pub use device::{FrameParams, RenderDevice, ResourceId, TargetId};
pub use error::RenderError;
pub use renderer::FrameRenderer;
pub use strategy::{RenderStrategy, StrategyResources};
pub use viewport::Viewport;
pub use wgpu_device::WgpuDevice;

use clap::ValueEnum;

use crate::device::ResourceId;

/// Resource acquisition strategy, chosen once before steady-state rendering
///
/// Exactly one strategy may be prepared per renderer instance; the renderer
/// rejects a second preparation rather than mixing resource sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RenderStrategy {
    /// Render into an intermediate compositing layer, then blit to the target
    CompositorBacked,
    /// Draw textured geometry straight into the target
    DirectTexture,
}

impl std::fmt::Display for RenderStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CompositorBacked => f.write_str("compositor-backed"),
            Self::DirectTexture => f.write_str("direct-texture"),
        }
    }
}

/// GPU handles acquired when a strategy is prepared
///
/// All handles are renderer-owned and must go back through
/// [`RenderDevice::release`](crate::device::RenderDevice::release) at teardown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyResources {
    CompositorBacked {
        layer_texture: ResourceId,
        blit_pipeline: ResourceId,
    },
    DirectTexture {
        quad_buffer: ResourceId,
        texture: ResourceId,
        pipeline: ResourceId,
    },
}

impl StrategyResources {
    /// The strategy these resources belong to
    pub fn strategy(&self) -> RenderStrategy {
        match self {
            Self::CompositorBacked { .. } => RenderStrategy::CompositorBacked,
            Self::DirectTexture { .. } => RenderStrategy::DirectTexture,
        }
    }

    /// Every handle held, in release order
    pub fn handles(&self) -> Vec<ResourceId> {
        match *self {
            Self::CompositorBacked {
                layer_texture,
                blit_pipeline,
            } => vec![blit_pipeline, layer_texture],
            Self::DirectTexture {
                quad_buffer,
                texture,
                pipeline,
            } => vec![pipeline, texture, quad_buffer],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resources_report_their_strategy() {
        let compositor = StrategyResources::CompositorBacked {
            layer_texture: ResourceId(1),
            blit_pipeline: ResourceId(2),
        };
        assert_eq!(compositor.strategy(), RenderStrategy::CompositorBacked);

        let direct = StrategyResources::DirectTexture {
            quad_buffer: ResourceId(3),
            texture: ResourceId(4),
            pipeline: ResourceId(5),
        };
        assert_eq!(direct.strategy(), RenderStrategy::DirectTexture);
    }

    #[test]
    fn handles_cover_every_acquired_resource() {
        let compositor = StrategyResources::CompositorBacked {
            layer_texture: ResourceId(1),
            blit_pipeline: ResourceId(2),
        };
        let handles = compositor.handles();
        assert_eq!(handles.len(), 2);
        assert!(handles.contains(&ResourceId(1)));
        assert!(handles.contains(&ResourceId(2)));

        let direct = StrategyResources::DirectTexture {
            quad_buffer: ResourceId(3),
            texture: ResourceId(4),
            pipeline: ResourceId(5),
        };
        assert_eq!(direct.handles().len(), 3);
    }
}

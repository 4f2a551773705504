use std::sync::Arc;
use std::time::Instant;

use crate::clock::FrameClock;
use crate::device::{FrameParams, RenderDevice, TargetId};
use crate::error::RenderError;
use crate::strategy::{RenderStrategy, StrategyResources};
use crate::viewport::Viewport;

/// Renders frames into a host-owned output target at the host's cadence
///
/// The renderer owns the animation clock and any strategy resources it
/// acquired; the target and the GPU device stay host-owned. All calls must
/// come from the thread that owns the GPU context - there is no internal
/// locking.
///
/// Lifecycle: construct, optionally prepare one strategy, then any number of
/// resize and render calls, then one teardown. Dropping the renderer releases
/// anything teardown did not.
pub struct FrameRenderer {
    device: Arc<dyn RenderDevice>,
    target: TargetId,
    viewport: Viewport,
    clock: FrameClock,
    current_time: f32,
    resources: Option<StrategyResources>,
    torn_down: bool,
}

impl FrameRenderer {
    /// Create a renderer that draws into `target` through `device`
    ///
    /// No GPU work happens here; the clock starts on the first render.
    pub fn new(device: Arc<dyn RenderDevice>, target: TargetId) -> Self {
        Self {
            device,
            target,
            viewport: Viewport::default(),
            clock: FrameClock::new(),
            current_time: 0.0,
            resources: None,
            torn_down: false,
        }
    }

    /// Acquire the resources for one render strategy
    ///
    /// At most one strategy per renderer; a second call fails with
    /// [`RenderError::AlreadyPrepared`]. Skipping preparation entirely is
    /// allowed and leaves every frame as a bare clear.
    pub fn prepare(&mut self, strategy: RenderStrategy) -> Result<(), RenderError> {
        if self.torn_down {
            return Err(RenderError::TornDown);
        }
        if self.resources.is_some() {
            return Err(RenderError::AlreadyPrepared);
        }

        let resources = self.device.prepare(self.target, strategy)?;
        log::debug!("prepared {:?} for target {:?}", strategy, self.target);
        self.resources = Some(resources);
        Ok(())
    }

    /// Update the cached viewport used by subsequent renders
    ///
    /// Safe at any point after construction, including before the first
    /// render and on every host resize event. Zero dimensions are accepted
    /// and make subsequent frames draw nothing.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = Viewport::new(width, height);
    }

    /// Draw one frame, advancing the animation clock
    ///
    /// The first call captures the clock origin; every call recomputes
    /// elapsed time from that origin, so timing stays correct however
    /// irregularly the refresh driver calls in. With a degenerate viewport
    /// the clock still advances but no draw is issued.
    pub fn render(&mut self) -> Result<(), RenderError> {
        if self.torn_down {
            return Err(RenderError::TornDown);
        }

        self.current_time = self.clock.tick();

        if self.viewport.is_empty() {
            return Ok(());
        }

        self.device.draw(&FrameParams {
            target: self.target,
            viewport: self.viewport,
            time: self.current_time,
            resources: self.resources.as_ref(),
        })
    }

    /// Release all renderer-owned resources and mark the instance dead
    ///
    /// Not idempotent: a second call fails with [`RenderError::TornDown`].
    /// The output target is host-owned and is not touched.
    pub fn teardown(&mut self) -> Result<(), RenderError> {
        if self.torn_down {
            return Err(RenderError::TornDown);
        }
        self.release_resources();
        self.torn_down = true;
        log::debug!("renderer for target {:?} torn down", self.target);
        Ok(())
    }

    /// Seconds since rendering began, as of the last render call
    pub fn current_time(&self) -> f32 {
        self.current_time
    }

    /// The clock origin, captured once at the first render
    pub fn start_time(&self) -> Option<Instant> {
        self.clock.start_instant()
    }

    /// The viewport currently in effect
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// The prepared strategy, if any
    pub fn strategy(&self) -> Option<RenderStrategy> {
        self.resources.as_ref().map(StrategyResources::strategy)
    }

    /// Whether teardown has completed
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    fn release_resources(&mut self) {
        if let Some(resources) = self.resources.take() {
            for handle in resources.handles() {
                self.device.release(handle);
            }
        }
    }
}

impl Drop for FrameRenderer {
    fn drop(&mut self) {
        if !self.torn_down {
            if self.resources.is_some() {
                log::warn!(
                    "renderer for target {:?} dropped without teardown",
                    self.target
                );
            }
            self.release_resources();
        }
    }
}

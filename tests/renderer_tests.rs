use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use frame_renderer::{
    FrameParams, FrameRenderer, RenderDevice, RenderError, RenderStrategy, ResourceId,
    StrategyResources, TargetId, Viewport,
};

/// Record of one draw call seen by the device
#[derive(Debug, Clone, Copy)]
struct DrawRecord {
    target: TargetId,
    viewport: Viewport,
    time: f32,
    prepared: bool,
}

#[derive(Default)]
struct TrackingState {
    next_id: u64,
    live: HashSet<u64>,
    draws: Vec<DrawRecord>,
}

/// Device stub that tracks acquired handles and draw calls so tests can
/// audit what the renderer did
struct TrackingDevice {
    state: Mutex<TrackingState>,
}

impl TrackingDevice {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(TrackingState {
                next_id: 1,
                ..Default::default()
            }),
        })
    }

    fn acquire(state: &mut TrackingState) -> ResourceId {
        let id = state.next_id;
        state.next_id += 1;
        state.live.insert(id);
        ResourceId(id)
    }

    fn live_handles(&self) -> usize {
        self.state.lock().unwrap().live.len()
    }

    fn draws(&self) -> Vec<DrawRecord> {
        self.state.lock().unwrap().draws.clone()
    }
}

impl RenderDevice for TrackingDevice {
    fn prepare(
        &self,
        _target: TargetId,
        strategy: RenderStrategy,
    ) -> Result<StrategyResources, RenderError> {
        let mut state = self.state.lock().unwrap();
        Ok(match strategy {
            RenderStrategy::CompositorBacked => StrategyResources::CompositorBacked {
                layer_texture: Self::acquire(&mut state),
                blit_pipeline: Self::acquire(&mut state),
            },
            RenderStrategy::DirectTexture => StrategyResources::DirectTexture {
                quad_buffer: Self::acquire(&mut state),
                texture: Self::acquire(&mut state),
                pipeline: Self::acquire(&mut state),
            },
        })
    }

    fn draw(&self, params: &FrameParams) -> Result<(), RenderError> {
        let mut state = self.state.lock().unwrap();
        state.draws.push(DrawRecord {
            target: params.target,
            viewport: params.viewport,
            time: params.time,
            prepared: params.resources.is_some(),
        });
        Ok(())
    }

    fn release(&self, id: ResourceId) {
        self.state.lock().unwrap().live.remove(&id.0);
    }
}

#[test]
fn latest_resize_dimensions_are_in_effect() {
    let device = TrackingDevice::new();
    let mut renderer = FrameRenderer::new(device.clone(), TargetId(1));

    renderer.resize(640, 480);
    renderer.resize(1280, 720);
    renderer.resize(800, 600);
    renderer.render().unwrap();

    let draws = device.draws();
    assert_eq!(draws.len(), 1);
    assert_eq!(draws[0].viewport, Viewport::new(800, 600));
}

#[test]
fn resize_storm_never_breaks_rendering() {
    let device = TrackingDevice::new();
    let mut renderer = FrameRenderer::new(device.clone(), TargetId(1));

    for i in 0..200u32 {
        renderer.resize(i * 7 % 2000, i * 13 % 1200);
        renderer.render().unwrap();
    }

    // Every non-degenerate frame went through with the dimensions set
    // immediately before it
    for draw in device.draws() {
        assert!(!draw.viewport.is_empty());
    }
}

#[test]
fn first_render_time_is_near_zero() {
    let device = TrackingDevice::new();
    let mut renderer = FrameRenderer::new(device, TargetId(1));
    renderer.resize(800, 600);

    renderer.render().unwrap();
    assert!(renderer.current_time() < 0.01);
}

#[test]
fn current_time_tracks_wall_clock() {
    let device = TrackingDevice::new();
    let mut renderer = FrameRenderer::new(device, TargetId(1));
    renderer.resize(800, 600);

    renderer.render().unwrap();
    thread::sleep(Duration::from_millis(50));
    renderer.render().unwrap();

    let time = renderer.current_time();
    assert!(time >= 0.049 && time <= 0.250, "current_time was {time}");
}

#[test]
fn current_time_is_jitter_tolerant() {
    let device = TrackingDevice::new();
    let mut renderer = FrameRenderer::new(device.clone(), TargetId(1));
    renderer.resize(800, 600);

    // A burst of rapid frames must not inflate the clock
    for _ in 0..50 {
        renderer.render().unwrap();
    }
    thread::sleep(Duration::from_millis(30));
    renderer.render().unwrap();

    let time = renderer.current_time();
    assert!(time >= 0.029 && time <= 0.200, "current_time was {time}");

    // And the device saw a non-decreasing clock throughout
    let times: Vec<f32> = device.draws().iter().map(|d| d.time).collect();
    assert!(times.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn start_time_is_captured_exactly_once() {
    let device = TrackingDevice::new();
    let mut renderer = FrameRenderer::new(device, TargetId(1));
    renderer.resize(800, 600);

    assert!(renderer.start_time().is_none());

    renderer.render().unwrap();
    let origin = renderer.start_time().expect("origin after first render");

    for _ in 0..10 {
        renderer.render().unwrap();
        assert_eq!(renderer.start_time(), Some(origin));
    }
}

#[test]
fn teardown_releases_every_acquired_handle() {
    for strategy in [RenderStrategy::CompositorBacked, RenderStrategy::DirectTexture] {
        let device = TrackingDevice::new();
        let mut renderer = FrameRenderer::new(device.clone(), TargetId(1));
        renderer.resize(800, 600);
        renderer.prepare(strategy).unwrap();
        assert!(device.live_handles() > 0);

        renderer.render().unwrap();
        renderer.teardown().unwrap();
        assert_eq!(device.live_handles(), 0);
    }
}

#[test]
fn drop_without_teardown_releases_handles() {
    let device = TrackingDevice::new();
    {
        let mut renderer = FrameRenderer::new(device.clone(), TargetId(1));
        renderer.prepare(RenderStrategy::DirectTexture).unwrap();
        assert_eq!(device.live_handles(), 3);
    }
    assert_eq!(device.live_handles(), 0);
}

#[test]
fn full_lifecycle_scenario() {
    let device = TrackingDevice::new();
    let mut renderer = FrameRenderer::new(device.clone(), TargetId(7));

    renderer.resize(800, 600);
    renderer.render().unwrap();
    assert!(renderer.current_time() < 0.01);

    thread::sleep(Duration::from_millis(50));
    renderer.render().unwrap();
    let time = renderer.current_time();
    assert!(time >= 0.049 && time <= 0.250, "current_time was {time}");

    renderer.teardown().unwrap();
    assert!(matches!(renderer.render(), Err(RenderError::TornDown)));

    // Nothing was silently drawn after teardown
    assert_eq!(device.draws().len(), 2);
    assert!(device.draws().iter().all(|d| d.target == TargetId(7)));
}

#[test]
fn degenerate_viewport_advances_clock_without_drawing() {
    let device = TrackingDevice::new();
    let mut renderer = FrameRenderer::new(device.clone(), TargetId(1));

    renderer.resize(0, 0);
    renderer.render().unwrap();

    assert!(device.draws().is_empty());
    assert!(renderer.start_time().is_some());
}

#[test]
fn unprepared_renderer_degrades_to_bare_frames() {
    let device = TrackingDevice::new();
    let mut renderer = FrameRenderer::new(device.clone(), TargetId(1));
    renderer.resize(320, 240);

    renderer.render().unwrap();

    let draws = device.draws();
    assert_eq!(draws.len(), 1);
    assert!(!draws[0].prepared);
    assert!(renderer.strategy().is_none());
}

#[test]
fn prepared_strategy_is_visible_to_the_device() {
    let device = TrackingDevice::new();
    let mut renderer = FrameRenderer::new(device.clone(), TargetId(1));
    renderer.resize(320, 240);
    renderer.prepare(RenderStrategy::CompositorBacked).unwrap();

    renderer.render().unwrap();

    assert_eq!(renderer.strategy(), Some(RenderStrategy::CompositorBacked));
    assert!(device.draws()[0].prepared);
}

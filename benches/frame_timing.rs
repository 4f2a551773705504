use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use frame_renderer::{
    FrameClock, FrameParams, FrameRenderer, RenderDevice, RenderError, RenderStrategy,
    ResourceId, StrategyResources, TargetId, Viewport,
};

/// Device that accepts every call and does nothing, isolating the
/// renderer's own per-frame overhead
struct NoopDevice;

impl RenderDevice for NoopDevice {
    fn prepare(
        &self,
        _target: TargetId,
        _strategy: RenderStrategy,
    ) -> Result<StrategyResources, RenderError> {
        Ok(StrategyResources::DirectTexture {
            quad_buffer: ResourceId(1),
            texture: ResourceId(2),
            pipeline: ResourceId(3),
        })
    }

    fn draw(&self, params: &FrameParams) -> Result<(), RenderError> {
        black_box(params.time);
        Ok(())
    }

    fn release(&self, _id: ResourceId) {}
}

fn bench_clock_tick(c: &mut Criterion) {
    let mut clock = FrameClock::new();
    clock.tick();

    c.bench_function("clock_tick", |b| b.iter(|| black_box(clock.tick())));
}

fn bench_viewport_projection(c: &mut Criterion) {
    let viewport = Viewport::new(1920, 1080);

    c.bench_function("viewport_projection", |b| {
        b.iter(|| black_box(viewport).projection())
    });
}

fn bench_render_dispatch(c: &mut Criterion) {
    let mut renderer = FrameRenderer::new(Arc::new(NoopDevice), TargetId(1));
    renderer.resize(1920, 1080);
    renderer.prepare(RenderStrategy::DirectTexture).unwrap();

    c.bench_function("render_dispatch", |b| {
        b.iter(|| renderer.render().unwrap())
    });
}

criterion_group!(
    benches,
    bench_clock_tick,
    bench_viewport_projection,
    bench_render_dispatch
);
criterion_main!(benches);

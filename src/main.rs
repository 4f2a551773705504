use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use frame_renderer::cli::Cli;
use frame_renderer::{FrameRenderer, WgpuDevice};

const FPS_UPDATE_INTERVAL: f32 = 1.0;

/// Demo host: owns the window, the GPU device, and the refresh cadence.
/// The redraw loop is the refresh driver invoking the renderer.
struct App {
    cli: Cli,
    window: Option<Arc<Window>>,
    renderer: Option<FrameRenderer>,
    last_frame_time: Instant,
    frame_count: u32,
    fps_update_timer: f32,
}

impl App {
    fn new(cli: Cli) -> Self {
        Self {
            cli,
            window: None,
            renderer: None,
            last_frame_time: Instant::now(),
            frame_count: 0,
            fps_update_timer: 0.0,
        }
    }

    fn update_fps(&mut self, delta: f32) {
        self.frame_count += 1;
        self.fps_update_timer += delta;

        if self.fps_update_timer >= FPS_UPDATE_INTERVAL {
            let fps = self.frame_count as f32 / self.fps_update_timer;
            let time = self.renderer.as_ref().map_or(0.0, |r| r.current_time());
            log::info!("fps: {fps:.1}, clock: {time:.2}s");
            self.frame_count = 0;
            self.fps_update_timer = 0.0;
        }
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(renderer) = &mut self.renderer {
            if let Err(e) = renderer.teardown() {
                log::warn!("teardown failed: {e}");
            }
        }
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            let window = match event_loop.create_window(
                Window::default_attributes()
                    .with_title("Frame Renderer")
                    .with_inner_size(winit::dpi::LogicalSize::new(
                        self.cli.width,
                        self.cli.height,
                    )),
            ) {
                Ok(w) => Arc::new(w),
                Err(e) => {
                    eprintln!("Failed to create window: {}", e);
                    event_loop.exit();
                    return;
                }
            };

            let (device, target) = match pollster::block_on(WgpuDevice::for_window(window.clone()))
            {
                Ok(pair) => pair,
                Err(e) => {
                    eprintln!("Failed to initialize GPU device: {}", e);
                    event_loop.exit();
                    return;
                }
            };

            let size = window.inner_size();
            let mut renderer = FrameRenderer::new(Arc::new(device), target);
            renderer.resize(size.width, size.height);
            if let Err(e) = renderer.prepare(self.cli.strategy) {
                eprintln!("Failed to prepare render strategy: {}", e);
                event_loop.exit();
                return;
            }

            self.window = Some(window);
            self.renderer = Some(renderer);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => self.shutdown(event_loop),
            WindowEvent::Resized(size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let delta = now.duration_since(self.last_frame_time).as_secs_f32();
                self.last_frame_time = now;

                if let Some(renderer) = &mut self.renderer {
                    if let Err(e) = renderer.render() {
                        log::error!("render error: {e}");
                    }
                }
                self.update_fps(delta);
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

/// Fixed-cadence offscreen run, for machines without a display
fn run_headless(cli: &Cli) -> Result<()> {
    let device = pollster::block_on(WgpuDevice::new())?;
    let target = device.register_offscreen_target(cli.width, cli.height);

    let mut renderer = FrameRenderer::new(Arc::new(device), target);
    renderer.resize(cli.width, cli.height);
    renderer.prepare(cli.strategy)?;

    let cadence = Duration::from_millis(16);
    for _ in 0..cli.frames {
        renderer.render()?;
        std::thread::sleep(cadence);
    }

    log::info!(
        "rendered {} frames, clock at {:.2}s",
        cli.frames,
        renderer.current_time()
    );
    renderer.teardown()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if cli.headless {
        return run_headless(&cli);
    }

    let event_loop = EventLoop::new()?;
    let mut app = App::new(cli);

    println!("Frame Renderer - Escape to quit");
    event_loop.run_app(&mut app)?;

    Ok(())
}

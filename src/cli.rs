// cli.rs - Command-line interface configuration
use clap::Parser;

use crate::strategy::RenderStrategy;

#[derive(Parser, Debug, Clone)]
#[command(name = "frame-renderer")]
#[command(about = "Frame renderer demo host", long_about = None)]
pub struct Cli {
    /// Resource initialization strategy to prepare
    #[arg(long, value_enum, default_value_t = RenderStrategy::CompositorBacked)]
    pub strategy: RenderStrategy,

    /// Initial window (or offscreen target) width in pixels
    #[arg(long, default_value_t = 800)]
    pub width: u32,

    /// Initial window (or offscreen target) height in pixels
    #[arg(long, default_value_t = 600)]
    pub height: u32,

    /// Render offscreen without opening a window
    #[arg(long, default_value_t = false)]
    pub headless: bool,

    /// Number of frames to render in headless mode
    #[arg(long, default_value_t = 120)]
    pub frames: u64,
}

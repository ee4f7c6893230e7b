/// wire3d terminal viewer
///
/// Shows a cube, or an STL model, as a wireframe you can fly around.
/// Controls:
///   - WASD: Move along the heading (Shift / uppercase for fast)
///   - Space / C: Move up / down
///   - Arrow Keys / left mouse drag: Look around
///   - U/O: Roll
///   - +/- or mouse wheel: Field of view
///   - [ / ]: Halve / double the focal length
///   - Q/ESC: Quit
use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use clap::Parser;
use nalgebra::Point3;
use tracing_subscriber::EnvFilter;
use wire3d_core::stl::{self, StlFormat};
use wire3d_core::{Color, ViewConfig, WireframeBuffers};
use wire3d_terminal::TerminalApp;

#[derive(Parser)]
#[command(name = "wire3d-terminal", about = "Wireframe viewer for the terminal")]
struct Cli {
    /// STL file to view; a cube is shown when omitted
    stl: Option<PathBuf>,

    /// Read the STL file as ASCII
    #[arg(long, conflicts_with = "binary")]
    ascii: bool,

    /// Read the STL file as binary
    #[arg(long)]
    binary: bool,

    /// JSON file with camera and control settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Horizontal field of view in degrees
    #[arg(long)]
    fov: Option<f32>,

    /// Distance from the eye to the image plane
    #[arg(long)]
    focal_length: Option<f32>,

    /// Draw a floor grid under the model
    #[arg(long)]
    grid: bool,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let default = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    match &cli.log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<ViewConfig> {
    let mut config = match &cli.config {
        Some(path) => ViewConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ViewConfig::default(),
    };
    if let Some(fov) = cli.fov {
        config.fov = fov;
    }
    if let Some(focal_length) = cli.focal_length {
        config.focal_length = focal_length;
    }
    config.validate().context("invalid camera settings")?;
    Ok(config)
}

fn load_geometry(cli: &Cli, config: &ViewConfig) -> anyhow::Result<WireframeBuffers> {
    let mut buffers = match &cli.stl {
        Some(path) => {
            let format = if cli.ascii {
                StlFormat::Ascii
            } else if cli.binary {
                StlFormat::Binary
            } else {
                StlFormat::Auto
            };
            let mut mesh = stl::load_stl(path, format)
                .with_context(|| format!("failed to load STL file {}", path.display()))?;
            println!("Loaded {} triangles", mesh.triangles.len());
            mesh.normalize_size();
            WireframeBuffers::from_meshes([&mesh], config.edge_color)
        }
        None => WireframeBuffers::cube(1.0, config.edge_color),
    };

    if cli.grid {
        buffers.append(&WireframeBuffers::grid(
            11,
            11,
            Point3::new(-5.0, -1.5, -5.0),
            Point3::new(5.0, -1.5, 5.0),
            Color::new(90, 90, 90),
        ));
    }

    buffers.validate()?;
    Ok(buffers)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let config = load_config(&cli)?;
    let buffers = load_geometry(&cli, &config)?;

    println!("Starting wire3d terminal viewer (press Q to quit)...");
    std::thread::sleep(std::time::Duration::from_millis(500));

    let mut app = TerminalApp::new(buffers, &config)?;
    app.run()?;

    let p = app.camera().position;
    println!("Final camera position: [{:.2}, {:.2}, {:.2}]", p.x, p.y, p.z);
    Ok(())
}

/// Example: Project an STL file once and print the wireframe as plain text
///
/// Usage: cargo run --example load_stl -- path/to/file.stl

use std::env;
use wire3d_core::stl::{self, StlFormat};
use wire3d_core::{ViewConfig, WireframeBuffers};
use wire3d_terminal::WireframeRenderer;

fn main() -> anyhow::Result<()> {
    let config = ViewConfig::default();

    let buffers = match env::args().nth(1) {
        Some(path) => {
            println!("Loading STL file: {}", path);
            let mut mesh = stl::load_stl(&path, StlFormat::Auto)?;
            println!("Loaded {} triangles", mesh.triangles.len());
            mesh.normalize_size();
            WireframeBuffers::from_meshes([&mesh], config.edge_color)
        }
        None => {
            eprintln!("No STL file provided, using default cube...");
            WireframeBuffers::cube(1.0, config.edge_color)
        }
    };

    let mut renderer = WireframeRenderer::new(80, 30);
    let camera = config.camera_with_resolution(renderer.resolution())?;

    let stats = renderer.render(&buffers, &camera);
    println!(
        "{} edges, {} in front of the camera, {} on screen",
        stats.edges, stats.projected, stats.drawn
    );
    println!("{}", renderer.canvas());
    Ok(())
}

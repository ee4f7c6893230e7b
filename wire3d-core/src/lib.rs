//! wire3d core library - camera, projection and geometry for wireframe rendering
//!
//! This library holds the renderer-independent part of the viewer: the
//! perspective camera with near-plane line clipping, the image-plane to
//! pixel mapping, STL parsing and the flat edge buffers fed to a renderer.

pub mod camera;
pub mod config;
pub mod controls;
pub mod geometry;
pub mod stl;
pub mod transform;
pub mod viewport;

// Re-export commonly used types
pub use camera::{Camera, CameraError, Fov};
pub use config::{ConfigError, ViewConfig};
pub use controls::CameraCommand;
pub use geometry::{Color, GeometryError, Mesh, Triangle, WireframeBuffers};
pub use stl::{StlError, StlFormat};
pub use transform::{Orientation, Transform};
pub use viewport::{Ndc, Pixel, Resolution};

//! Camera commands produced by an input driver.
//!
//! Drivers translate raw device events into [`CameraCommand`]s; the camera
//! never sees input events directly.

use nalgebra::Vector3;

use crate::camera::{Camera, CameraError, Fov};
use crate::transform::Orientation;
use crate::viewport::Resolution;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraCommand {
    /// Move relative to the heading: forward, right and up distances
    Walk { forward: f32, right: f32, up: f32 },
    /// Move by a world-space delta
    Translate(Vector3<f32>),
    /// Add to yaw, pitch and roll
    Rotate(Orientation),
    /// Add degrees to the horizontal fov, deriving the vertical one
    AdjustFov(f32),
    SetFov(Fov),
    /// Multiply the focal length
    ScaleFocalLength(f32),
    /// Replace the resolution without touching the fov
    Resize(Resolution),
    /// Re-derive the vertical fov from the current resolution
    RefreshFov,
}

impl Camera {
    /// Applies one command. On error the camera is left unchanged.
    pub fn apply(&mut self, command: CameraCommand) -> Result<(), CameraError> {
        match command {
            CameraCommand::Walk { forward, right, up } => {
                let delta = self.orientation.forward() * forward
                    + self.orientation.right() * right
                    + Vector3::y() * up;
                self.position += delta;
            }
            CameraCommand::Translate(delta) => self.position += delta,
            CameraCommand::Rotate(delta) => self.orientation = self.orientation + delta,
            CameraCommand::AdjustFov(delta) => self.adjust_fov(delta)?,
            CameraCommand::SetFov(fov) => self.set_fov(fov)?,
            CameraCommand::ScaleFocalLength(factor) => self.scale_focal_length(factor)?,
            CameraCommand::Resize(resolution) => self.set_resolution(resolution)?,
            CameraCommand::RefreshFov => self.refresh_fov()?,
        }
        Ok(())
    }
}

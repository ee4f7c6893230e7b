/// Perspective camera: world to camera space, projection and near-plane clipping
use nalgebra::{Point3, Vector2};
use serde::{Deserialize, Serialize};

use crate::transform::Orientation;
use crate::viewport::{Ndc, Pixel, Resolution};

/// Errors raised when a camera would be put into a degenerate state
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CameraError {
    #[error("focal length must be positive and finite, got {0}")]
    InvalidFocalLength(f32),
    #[error("resolution must be non-zero, got {width}x{height}")]
    InvalidResolution { width: u32, height: u32 },
    #[error("field of view must lie strictly between 0 and 180 degrees, got {horizontal}x{vertical}")]
    InvalidFov { horizontal: f32, vertical: f32 },
}

/// Largest vertical angle [`Fov::from_horizontal`] will derive, in degrees
pub const MAX_DERIVED_VERTICAL_FOV: f32 = 179.0;

/// Horizontal and vertical field of view, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fov {
    pub horizontal: f32,
    pub vertical: f32,
}

impl Fov {
    pub fn new(horizontal: f32, vertical: f32) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    /// Derives the vertical angle by scaling the horizontal one with the
    /// aspect ratio of `resolution`, capped at [`MAX_DERIVED_VERTICAL_FOV`]
    /// so tall targets still get a usable camera.
    pub fn from_horizontal(horizontal: f32, resolution: &Resolution) -> Self {
        let vertical = (horizontal * resolution.aspect()).min(MAX_DERIVED_VERTICAL_FOV);
        Self::new(horizontal, vertical)
    }

    fn validate(&self) -> Result<(), CameraError> {
        let in_range = |deg: f32| deg > 0.0 && deg < 180.0;
        if in_range(self.horizontal) && in_range(self.vertical) {
            Ok(())
        } else {
            Err(CameraError::InvalidFov {
                horizontal: self.horizontal,
                vertical: self.vertical,
            })
        }
    }
}

fn validate_focal_length(focal_length: f32) -> Result<(), CameraError> {
    if focal_length.is_finite() && focal_length > 0.0 {
        Ok(())
    } else {
        Err(CameraError::InvalidFocalLength(focal_length))
    }
}

/// A pinhole camera looking down its positive depth axis.
///
/// The near plane sits at the focal length: camera-space points with a
/// depth below it are not visible. The half extents of the image plane at
/// that distance are kept up to date by the fov and focal length setters.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f32>,
    pub orientation: Orientation,
    focal_length: f32,
    fov: Fov,
    resolution: Resolution,
    plane: Vector2<f32>,
}

impl Camera {
    /// Creates a camera at the origin with no rotation. The vertical fov is
    /// derived from `horizontal_fov` and the aspect ratio.
    pub fn new(
        resolution: Resolution,
        horizontal_fov: f32,
        focal_length: f32,
    ) -> Result<Self, CameraError> {
        Self::with_fov(
            resolution,
            Fov::from_horizontal(horizontal_fov, &resolution),
            focal_length,
        )
    }

    pub fn with_fov(
        resolution: Resolution,
        fov: Fov,
        focal_length: f32,
    ) -> Result<Self, CameraError> {
        resolution.validate()?;
        validate_focal_length(focal_length)?;
        fov.validate()?;

        Ok(Self {
            position: Point3::origin(),
            orientation: Orientation::zero(),
            focal_length,
            fov,
            resolution,
            plane: plane_extents(&fov, focal_length),
        })
    }

    pub fn focal_length(&self) -> f32 {
        self.focal_length
    }

    pub fn fov(&self) -> Fov {
        self.fov
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Half width and half height of the image plane at the focal distance
    pub fn plane_extents(&self) -> Vector2<f32> {
        self.plane
    }

    /// Sets both angles and recomputes the plane extents
    pub fn set_fov(&mut self, fov: Fov) -> Result<(), CameraError> {
        fov.validate()?;
        self.fov = fov;
        self.plane = plane_extents(&fov, self.focal_length);
        tracing::debug!(
            horizontal = fov.horizontal,
            vertical = fov.vertical,
            "camera fov changed"
        );
        Ok(())
    }

    /// Sets the horizontal angle, deriving the vertical one from the
    /// current resolution
    pub fn set_horizontal_fov(&mut self, horizontal: f32) -> Result<(), CameraError> {
        self.set_fov(Fov::from_horizontal(horizontal, &self.resolution))
    }

    pub fn adjust_fov(&mut self, delta: f32) -> Result<(), CameraError> {
        self.set_horizontal_fov(self.fov.horizontal + delta)
    }

    /// Re-derives the vertical fov after a resolution change
    pub fn refresh_fov(&mut self) -> Result<(), CameraError> {
        self.set_horizontal_fov(self.fov.horizontal)
    }

    /// Changes the focal length, scaling the plane extents by `new / old`
    /// rather than recomputing them from the fov.
    pub fn set_focal_length(&mut self, focal_length: f32) -> Result<(), CameraError> {
        validate_focal_length(focal_length)?;
        self.plane *= focal_length / self.focal_length;
        self.focal_length = focal_length;
        tracing::debug!(focal_length, "camera focal length changed");
        Ok(())
    }

    pub fn scale_focal_length(&mut self, factor: f32) -> Result<(), CameraError> {
        self.set_focal_length(self.focal_length * factor)
    }

    /// Replaces the resolution.
    ///
    /// The fov and plane extents are left as they are; call
    /// [`Camera::refresh_fov`] to keep the vertical angle aspect-correct.
    pub fn set_resolution(&mut self, resolution: Resolution) -> Result<(), CameraError> {
        resolution.validate()?;
        self.resolution = resolution;
        tracing::debug!(
            width = resolution.width,
            height = resolution.height,
            "camera resolution changed"
        );
        Ok(())
    }

    /// Transform a world-space point into camera space
    pub fn to_camera_space(&self, world: &Point3<f32>) -> Point3<f32> {
        Point3::from(self.orientation.to_camera_space(world - self.position))
    }

    fn is_onscreen(&self, point: &Point3<f32>) -> bool {
        point.z >= self.focal_length
    }

    /// Perspective-divide a camera-space point onto the image plane.
    ///
    /// Returns `None` for points in front of the near plane; a point exactly
    /// on it still projects.
    pub fn project_camera_space_point(&self, point: &Point3<f32>) -> Option<Ndc> {
        if !self.is_onscreen(point) {
            return None;
        }

        let scale = self.focal_length / point.z;
        Some(Ndc::new(
            point.x * scale / self.plane.x,
            point.y * scale / self.plane.y,
        ))
    }

    pub fn project_point(&self, world: &Point3<f32>) -> Option<Ndc> {
        self.project_camera_space_point(&self.to_camera_space(world))
    }

    /// Project a world-space segment, clipping it against the near plane.
    ///
    /// When exactly one endpoint is visible the other one is replaced by the
    /// segment's intersection with the near plane, and the visible endpoint's
    /// projection comes first in the returned pair.
    pub fn project_line(&self, start: &Point3<f32>, end: &Point3<f32>) -> Option<(Ndc, Ndc)> {
        let start = self.to_camera_space(start);
        let end = self.to_camera_space(end);

        match (self.is_onscreen(&start), self.is_onscreen(&end)) {
            (true, true) => Some((
                self.project_camera_space_point(&start)?,
                self.project_camera_space_point(&end)?,
            )),
            (true, false) => self.project_clipped(&start, &end),
            (false, true) => self.project_clipped(&end, &start),
            (false, false) => None,
        }
    }

    fn project_clipped(&self, onscreen: &Point3<f32>, offscreen: &Point3<f32>) -> Option<(Ndc, Ndc)> {
        let direction = offscreen - onscreen;
        if direction.z == 0.0 {
            // Parallel to the near plane, nothing sensible to intersect
            tracing::trace!(?onscreen, ?offscreen, "degenerate near-plane clip");
            return None;
        }

        let t = (self.focal_length - onscreen.z) / direction.z;
        let mut cut = onscreen + direction * t;
        // On the plane by construction; pin it so rounding can't push it off
        cut.z = self.focal_length;

        Some((
            self.project_camera_space_point(onscreen)?,
            self.project_camera_space_point(&cut)?,
        ))
    }

    pub fn normalized_to_pixel(&self, ndc: Ndc) -> Pixel {
        self.resolution.normalized_to_pixel(ndc)
    }

    pub fn project_point_to_pixel(&self, world: &Point3<f32>) -> Option<Pixel> {
        self.project_point(world).map(|ndc| self.normalized_to_pixel(ndc))
    }

    pub fn project_line_to_pixels(
        &self,
        start: &Point3<f32>,
        end: &Point3<f32>,
    ) -> Option<(Pixel, Pixel)> {
        self.project_line(start, end)
            .map(|(a, b)| (self.normalized_to_pixel(a), self.normalized_to_pixel(b)))
    }
}

fn plane_extents(fov: &Fov, focal_length: f32) -> Vector2<f32> {
    let half_angle = |deg: f32| (deg.to_radians() / 2.0).tan();
    Vector2::new(
        focal_length * half_angle(fov.horizontal),
        focal_length * half_angle(fov.vertical),
    )
}

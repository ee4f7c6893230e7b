/// Image-plane coordinate spaces and the mapping between them
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::camera::CameraError;

/// A projected point on the image plane, before it is mapped to pixels.
///
/// `u` grows to the right and `v` grows upward. Points on the edge of the
/// field of view land on -1 or 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ndc(pub Point2<f32>);

impl Ndc {
    pub fn new(u: f32, v: f32) -> Self {
        Self(Point2::new(u, v))
    }

    pub fn u(&self) -> f32 {
        self.0.x
    }

    pub fn v(&self) -> f32 {
        self.0.y
    }
}

/// A point in pixel space: origin at the top-left, y grows downward
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pixel(pub Point2<f32>);

impl Pixel {
    pub fn new(x: f32, y: f32) -> Self {
        Self(Point2::new(x, y))
    }

    pub fn x(&self) -> f32 {
        self.0.x
    }

    pub fn y(&self) -> f32 {
        self.0.y
    }
}

/// Size of the render target in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Result<Self, CameraError> {
        let resolution = Self { width, height };
        resolution.validate()?;
        Ok(resolution)
    }

    pub fn validate(&self) -> Result<(), CameraError> {
        if self.width == 0 || self.height == 0 {
            return Err(CameraError::InvalidResolution {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    /// Height over width
    pub fn aspect(&self) -> f32 {
        self.height as f32 / self.width as f32
    }

    fn half(&self) -> (f32, f32) {
        (self.width as f32 / 2.0, self.height as f32 / 2.0)
    }

    /// Maps a normalized coordinate to pixels.
    ///
    /// No clipping happens here; anything outside `[-1, 1]` lands outside
    /// the pixel rectangle and is left to the line drawing primitive.
    pub fn normalized_to_pixel(&self, ndc: Ndc) -> Pixel {
        let (half_w, half_h) = self.half();
        Pixel::new(ndc.u() * half_w + half_w, -ndc.v() * half_h + half_h)
    }

    /// Inverse of [`Resolution::normalized_to_pixel`]
    pub fn pixel_to_normalized(&self, pixel: Pixel) -> Ndc {
        let (half_w, half_h) = self.half();
        Ndc::new((pixel.x() - half_w) / half_w, -(pixel.y() - half_h) / half_h)
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            width: 960,
            height: 720,
        }
    }
}

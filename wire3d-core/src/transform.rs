/// Orientation state and the transforms built from it
use nalgebra::{Matrix4, Point3, Rotation3, Vector3};
use serde::{Deserialize, Serialize};

/// Yaw, pitch and roll of a camera or object (in radians)
///
/// Yaw turns about the vertical (y) axis, pitch about the lateral (x) axis
/// and roll about the depth (z) axis.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Orientation {
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
}

impl Orientation {
    pub fn new(yaw: f32, pitch: f32, roll: f32) -> Self {
        Self { yaw, pitch, roll }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// Rotate by delta amounts (in radians)
    pub fn rotate(&mut self, d_yaw: f32, d_pitch: f32, d_roll: f32) {
        self.yaw += d_yaw;
        self.pitch += d_pitch;
        self.roll += d_roll;
    }

    /// Rotates an offset from the eye into camera space.
    ///
    /// The three plane rotations run one after the other on the partially
    /// rotated vector: yaw on (x, z), then pitch on (y, z), then roll on
    /// (x, y). This is not the same as multiplying a combined Euler matrix.
    pub fn to_camera_space(&self, offset: Vector3<f32>) -> Vector3<f32> {
        let mut v = offset;

        let (x, z) = rotate_pair(v.x, v.z, self.yaw);
        v.x = x;
        v.z = z;

        let (y, z) = rotate_pair(v.y, v.z, self.pitch);
        v.y = y;
        v.z = z;

        let (x, y) = rotate_pair(v.x, v.y, self.roll);
        v.x = x;
        v.y = y;

        v
    }

    /// Unit vector along the heading in the horizontal plane
    pub fn forward(&self) -> Vector3<f32> {
        let (sin, cos) = self.yaw.sin_cos();
        Vector3::new(sin, 0.0, cos)
    }

    /// Unit vector to the right of the heading in the horizontal plane
    pub fn right(&self) -> Vector3<f32> {
        let (sin, cos) = self.yaw.sin_cos();
        Vector3::new(cos, 0.0, -sin)
    }
}

impl std::ops::Add for Orientation {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.yaw + rhs.yaw, self.pitch + rhs.pitch, self.roll + rhs.roll)
    }
}

/// Standard 2x2 rotation `[c -s; s c]` of a coordinate pair
#[inline]
fn rotate_pair(a: f32, b: f32, angle: f32) -> (f32, f32) {
    let (sin, cos) = angle.sin_cos();
    (cos * a - sin * b, sin * a + cos * b)
}

/// Transform builder for rigid and scaling edits of object geometry
pub struct Transform;

impl Transform {
    /// Combined rotation matrix, yaw applied first, then pitch, then roll
    pub fn rotation_matrix(orientation: &Orientation) -> Matrix4<f32> {
        let yaw = Rotation3::from_axis_angle(&Vector3::y_axis(), orientation.yaw);
        let pitch = Rotation3::from_axis_angle(&Vector3::x_axis(), orientation.pitch);
        let roll = Rotation3::from_axis_angle(&Vector3::z_axis(), orientation.roll);

        (roll * pitch * yaw).to_homogeneous()
    }

    /// Create a translation matrix
    pub fn translation_matrix(offset: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new_translation(offset)
    }

    /// Create a scale matrix
    pub fn scale_matrix(sx: f32, sy: f32, sz: f32) -> Matrix4<f32> {
        Matrix4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz))
    }

    /// Mirror matrix negating each selected axis
    pub fn flip_matrix(x: bool, y: bool, z: bool) -> Matrix4<f32> {
        let sign = |flip: bool| if flip { -1.0 } else { 1.0 };
        Self::scale_matrix(sign(x), sign(y), sign(z))
    }

    /// Conjugates `matrix` so that it acts about `center` instead of the origin
    pub fn about(center: &Point3<f32>, matrix: &Matrix4<f32>) -> Matrix4<f32> {
        let offset = center.coords;
        Self::translation_matrix(&offset) * matrix * Self::translation_matrix(&-offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    const EPS: f32 = 1e-5;

    fn assert_close(a: Vector3<f32>, b: Vector3<f32>) {
        assert!((a - b).norm() < EPS, "{a:?} != {b:?}");
    }

    #[test]
    fn test_orientation_rotate() {
        let mut state = Orientation::zero();
        assert_eq!(state.yaw, 0.0);
        assert_eq!(state.pitch, 0.0);
        assert_eq!(state.roll, 0.0);

        state.rotate(0.1, 0.2, 0.3);
        assert!((state.yaw - 0.1).abs() < 1e-6);
        assert!((state.pitch - 0.2).abs() < 1e-6);
        assert!((state.roll - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_zero_orientation_is_identity() {
        let v = Vector3::new(1.5, -2.0, 3.25);
        assert_eq!(Orientation::zero().to_camera_space(v), v);
    }

    #[test]
    fn test_yaw_brings_forward_onto_depth_axis() {
        for yaw in [0.3_f32, -1.2, 2.5] {
            let orientation = Orientation::new(yaw, 0.0, 0.0);
            assert_close(
                orientation.to_camera_space(orientation.forward()),
                Vector3::new(0.0, 0.0, 1.0),
            );
            assert_close(
                orientation.to_camera_space(orientation.right()),
                Vector3::new(1.0, 0.0, 0.0),
            );
        }
    }

    #[test]
    fn test_single_axis_rotations() {
        let ahead = Vector3::new(0.0, 0.0, 1.0);
        // Pitch moves a point ahead of the eye below the axis
        assert_close(
            Orientation::new(0.0, FRAC_PI_2, 0.0).to_camera_space(ahead),
            Vector3::new(0.0, -1.0, 0.0),
        );
        // Roll leaves the depth axis alone
        assert_close(
            Orientation::new(0.0, 0.0, FRAC_PI_2).to_camera_space(ahead),
            ahead,
        );
        assert_close(
            Orientation::new(0.0, 0.0, FRAC_PI_2).to_camera_space(Vector3::x()),
            Vector3::y(),
        );
    }

    #[test]
    fn test_rotations_apply_in_sequence() {
        // yaw quarter turn: x -> z, then pitch quarter turn: z -> y
        let v = Orientation::new(FRAC_PI_2, FRAC_PI_2, 0.0).to_camera_space(Vector3::x());
        assert_close(v, Vector3::new(0.0, -1.0, 0.0));

        // The reverse order would leave x untouched by pitch and end on z
        let pitched_first = {
            let p = Orientation::new(0.0, FRAC_PI_2, 0.0).to_camera_space(Vector3::x());
            Orientation::new(FRAC_PI_2, 0.0, 0.0).to_camera_space(p)
        };
        assert!((v - pitched_first).norm() > 0.5);
    }

    #[test]
    fn test_identity_rotation_matrix() {
        let matrix = Transform::rotation_matrix(&Orientation::zero());
        assert!((matrix - Matrix4::identity()).norm() < 1e-6);
    }

    #[test]
    fn test_about_center_keeps_center_fixed() {
        let center = Point3::new(1.0, 2.0, 3.0);
        let m = Transform::about(&center, &Transform::scale_matrix(2.0, 3.0, 4.0));
        assert!((m.transform_point(&center) - center).norm() < EPS);

        let moved = m.transform_point(&Point3::new(2.0, 2.0, 3.0));
        assert!((moved - Point3::new(3.0, 2.0, 3.0)).norm() < EPS);
    }

    #[test]
    fn test_flip_matrix() {
        let m = Transform::flip_matrix(true, false, true);
        let p = m.transform_point(&Point3::new(1.0, 2.0, 3.0));
        assert!((p - Point3::new(-1.0, 2.0, -3.0)).norm() < EPS);
    }
}

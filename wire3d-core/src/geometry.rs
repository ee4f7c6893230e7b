/// Geometry sources for wireframe rendering
use nalgebra::{Matrix4, Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::transform::{Orientation, Transform};

/// Raised when an edge refers past the end of its vertex buffer
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("edge {edge} references vertex {index}, but only {vertex_count} vertices exist")]
pub struct GeometryError {
    pub edge: usize,
    pub index: usize,
    pub vertex_count: usize,
}

/// An 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Relative luminance in `[0, 1]`
    pub fn luminance(&self) -> f32 {
        (0.2126 * self.r as f32 + 0.7152 * self.g as f32 + 0.0722 * self.b as f32) / 255.0
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// A triangle face with an optional per-face color
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    pub normal: Vector3<f32>,
    pub vertices: [Point3<f32>; 3],
    pub color: Option<Color>,
}

impl Triangle {
    pub fn new(normal: Vector3<f32>, vertices: [Point3<f32>; 3]) -> Self {
        Self {
            normal,
            vertices,
            color: None,
        }
    }

    pub fn with_color(mut self, color: Option<Color>) -> Self {
        self.color = color;
        self
    }

    /// The three edges of the face, in winding order
    pub fn edges(&self) -> [(Point3<f32>, Point3<f32>); 3] {
        let [a, b, c] = self.vertices;
        [(a, b), (b, c), (c, a)]
    }

    fn apply(&mut self, matrix: &Matrix4<f32>) {
        for vertex in &mut self.vertices {
            *vertex = matrix.transform_point(vertex);
        }
        // Normals go through the inverse transpose of the linear part
        let linear = matrix.fixed_view::<3, 3>(0, 0).into_owned();
        if let Some(inverse) = linear.try_inverse() {
            let normal = inverse.transpose() * self.normal;
            if let Some(unit) = normal.try_normalize(f32::EPSILON) {
                self.normal = unit;
            }
        }
    }
}

/// A 3D mesh composed of triangles
///
/// Edits mutate the vertices in place. The center is the mean of all
/// vertices and is recomputed on every call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
        }
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Mean of all vertices, or the origin for an empty mesh
    pub fn center(&self) -> Point3<f32> {
        let count = self.triangles.len() * 3;
        if count == 0 {
            return Point3::origin();
        }
        let sum = self
            .triangles
            .iter()
            .flat_map(|t| t.vertices.iter())
            .fold(Vector3::zeros(), |acc, v| acc + v.coords);
        Point3::from(sum / count as f32)
    }

    /// Largest distance from the center to any vertex
    pub fn radius(&self) -> f32 {
        let center = self.center();
        self.triangles
            .iter()
            .flat_map(|t| t.vertices.iter())
            .map(|v| (v - center).norm())
            .fold(0.0, f32::max)
    }

    pub fn transform(&mut self, matrix: &Matrix4<f32>) -> &mut Self {
        for triangle in &mut self.triangles {
            triangle.apply(matrix);
        }
        self
    }

    pub fn translate(&mut self, offset: &Vector3<f32>) -> &mut Self {
        self.transform(&Transform::translation_matrix(offset))
    }

    /// Move the mesh so that its center lands on `position`
    pub fn set_center(&mut self, position: &Point3<f32>) -> &mut Self {
        let offset = position - self.center();
        self.translate(&offset)
    }

    /// Rotate about `center`, or about the mesh's own center when `None`
    pub fn rotate(&mut self, orientation: &Orientation, center: Option<Point3<f32>>) -> &mut Self {
        let center = center.unwrap_or_else(|| self.center());
        self.transform(&Transform::about(&center, &Transform::rotation_matrix(orientation)))
    }

    /// Per-axis scale about `center`, or about the mesh's own center when `None`
    pub fn scale(&mut self, factors: &Vector3<f32>, center: Option<Point3<f32>>) -> &mut Self {
        let center = center.unwrap_or_else(|| self.center());
        let matrix = Transform::scale_matrix(factors.x, factors.y, factors.z);
        self.transform(&Transform::about(&center, &matrix))
    }

    pub fn scale_uniform(&mut self, factor: f32, center: Option<Point3<f32>>) -> &mut Self {
        self.scale(&Vector3::repeat(factor), center)
    }

    /// Mirror the selected axes about `center`, or about the mesh's own center
    pub fn flip(&mut self, x: bool, y: bool, z: bool, center: Option<Point3<f32>>) -> &mut Self {
        let center = center.unwrap_or_else(|| self.center());
        self.transform(&Transform::about(&center, &Transform::flip_matrix(x, y, z)))
    }

    /// Center the mesh on the origin and scale it to a radius of 1
    pub fn normalize_size(&mut self) -> &mut Self {
        self.set_center(&Point3::origin());
        let radius = self.radius();
        if radius > f32::EPSILON {
            self.scale_uniform(1.0 / radius, Some(Point3::origin()));
        }
        self
    }

    /// Create a simple cube mesh for testing
    pub fn cube(size: f32) -> Self {
        let h = size / 2.0;
        let p = Point3::new;
        let face = |n: [f32; 3], quad: [Point3<f32>; 4]| {
            let normal = Vector3::new(n[0], n[1], n[2]);
            [
                Triangle::new(normal, [quad[0], quad[1], quad[2]]),
                Triangle::new(normal, [quad[0], quad[2], quad[3]]),
            ]
        };

        let faces = [
            face([0.0, 0.0, 1.0], [p(-h, -h, h), p(h, -h, h), p(h, h, h), p(-h, h, h)]),
            face([0.0, 0.0, -1.0], [p(-h, -h, -h), p(-h, h, -h), p(h, h, -h), p(h, -h, -h)]),
            face([0.0, 1.0, 0.0], [p(-h, h, -h), p(-h, h, h), p(h, h, h), p(h, h, -h)]),
            face([0.0, -1.0, 0.0], [p(-h, -h, -h), p(h, -h, -h), p(h, -h, h), p(-h, -h, h)]),
            face([1.0, 0.0, 0.0], [p(h, -h, -h), p(h, h, -h), p(h, h, h), p(h, -h, h)]),
            face([-1.0, 0.0, 0.0], [p(-h, -h, -h), p(-h, -h, h), p(-h, h, h), p(-h, h, -h)]),
        ];

        Self {
            triangles: faces.into_iter().flatten().collect(),
        }
    }
}

/// Flat vertex, edge and per-edge color buffers handed to the renderer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WireframeBuffers {
    pub vertices: Vec<Point3<f32>>,
    pub edges: Vec<(usize, usize)>,
    pub colors: Vec<Color>,
}

impl WireframeBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flattens triangles into three edges each; uncolored faces take
    /// `default_color`
    pub fn from_meshes<'a>(meshes: impl IntoIterator<Item = &'a Mesh>, default_color: Color) -> Self {
        let mut buffers = Self::new();
        for mesh in meshes {
            buffers.push_mesh(mesh, default_color);
        }
        buffers
    }

    pub fn push_mesh(&mut self, mesh: &Mesh, default_color: Color) {
        self.vertices.reserve(mesh.triangles.len() * 3);
        self.edges.reserve(mesh.triangles.len() * 3);
        for triangle in &mesh.triangles {
            let base = self.vertices.len();
            self.vertices.extend_from_slice(&triangle.vertices);
            self.edges
                .extend([(base, base + 1), (base + 1, base + 2), (base + 2, base)]);
            let color = triangle.color.unwrap_or(default_color);
            self.colors.extend([color; 3]);
        }
    }

    /// Appends another buffer set, rebasing its indices
    pub fn append(&mut self, other: &WireframeBuffers) {
        let base = self.vertices.len();
        self.vertices.extend_from_slice(&other.vertices);
        self.edges
            .extend(other.edges.iter().map(|&(a, b)| (a + base, b + base)));
        self.colors.extend_from_slice(&other.colors);
    }

    /// The 12 edges of an axis-aligned cube with corners at +-`half`
    pub fn cube(half: f32, color: Color) -> Self {
        let vertices = (0..8)
            .map(|i| {
                let sign = |bit: usize| if i & bit == 0 { -half } else { half };
                Point3::new(sign(1), sign(2), sign(4))
            })
            .collect();
        let edges = vec![
            (0, 1),
            (0, 2),
            (0, 4),
            (1, 3),
            (1, 5),
            (2, 3),
            (2, 6),
            (3, 7),
            (4, 5),
            (4, 6),
            (5, 7),
            (6, 7),
        ];
        let colors = vec![color; edges.len()];
        Self {
            vertices,
            edges,
            colors,
        }
    }

    /// A flat `rows x columns` lattice spanning `start` to `end` in x and z,
    /// at the height of `start`, with edges between lattice neighbours
    pub fn grid(rows: usize, columns: usize, start: Point3<f32>, end: Point3<f32>, color: Color) -> Self {
        let lerp = |a: f32, b: f32, i: usize, n: usize| {
            if n < 2 {
                a
            } else {
                a + (b - a) * i as f32 / (n - 1) as f32
            }
        };

        let mut buffers = Self::new();
        for row in 0..rows {
            for column in 0..columns {
                buffers.vertices.push(Point3::new(
                    lerp(start.x, end.x, column, columns),
                    start.y,
                    lerp(start.z, end.z, row, rows),
                ));
                let index = row * columns + column;
                if column + 1 < columns {
                    buffers.edges.push((index, index + 1));
                }
                if row + 1 < rows {
                    buffers.edges.push((index, index + columns));
                }
            }
        }
        buffers.colors = vec![color; buffers.edges.len()];
        buffers
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Checks every edge index against the vertex count
    pub fn validate(&self) -> Result<(), GeometryError> {
        let vertex_count = self.vertices.len();
        for (edge, &(a, b)) in self.edges.iter().enumerate() {
            if let Some(index) = [a, b].into_iter().find(|&i| i >= vertex_count) {
                return Err(GeometryError {
                    edge,
                    index,
                    vertex_count,
                });
            }
        }
        Ok(())
    }

    /// Iterates over each edge's endpoints and color.
    ///
    /// Panics on an out-of-range index; see [`WireframeBuffers::validate`].
    pub fn segments(&self) -> impl Iterator<Item = (&Point3<f32>, &Point3<f32>, Color)> + '_ {
        self.edges.iter().enumerate().map(move |(i, &(a, b))| {
            let color = self.colors.get(i).copied().unwrap_or_default();
            (&self.vertices[a], &self.vertices[b], color)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn test_cube_mesh() {
        let cube = Mesh::cube(2.0);
        assert_eq!(cube.triangles.len(), 12);
        assert!((cube.center() - Point3::origin()).norm() < EPS);
        assert!((cube.radius() - 3.0_f32.sqrt()).abs() < EPS);
    }

    #[test]
    fn test_triangle_edges() {
        let t = Triangle::new(
            Vector3::z(),
            [Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)],
        );
        let edges = t.edges();
        assert_eq!(edges[0], (t.vertices[0], t.vertices[1]));
        assert_eq!(edges[2], (t.vertices[2], t.vertices[0]));
    }

    #[test]
    fn test_set_center_and_translate() {
        let mut cube = Mesh::cube(1.0);
        cube.set_center(&Point3::new(3.0, -1.0, 2.0));
        assert!((cube.center() - Point3::new(3.0, -1.0, 2.0)).norm() < EPS);

        cube.translate(&Vector3::new(-3.0, 1.0, -2.0));
        assert!((cube.center() - Point3::origin()).norm() < EPS);
    }

    #[test]
    fn test_scale_about_center() {
        let mut cube = Mesh::cube(2.0);
        cube.set_center(&Point3::new(5.0, 0.0, 0.0));
        cube.scale_uniform(2.0, None);
        assert!((cube.center() - Point3::new(5.0, 0.0, 0.0)).norm() < EPS);
        assert!((cube.radius() - 2.0 * 3.0_f32.sqrt()).abs() < 1e-4);
    }

    #[test]
    fn test_rotate_keeps_radius() {
        let mut cube = Mesh::cube(2.0);
        let radius = cube.radius();
        cube.rotate(&Orientation::new(0.4, 1.1, -0.3), None);
        assert!((cube.radius() - radius).abs() < 1e-4);
        assert!((cube.center() - Point3::origin()).norm() < 1e-4);
        for t in &cube.triangles {
            assert!((t.normal.norm() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_normalize_size() {
        let mut cube = Mesh::cube(10.0);
        cube.translate(&Vector3::new(4.0, 5.0, 6.0));
        cube.normalize_size();
        assert!((cube.center() - Point3::origin()).norm() < 1e-4);
        assert!((cube.radius() - 1.0).abs() < 1e-4);

        let mut empty = Mesh::new();
        assert!(empty.normalize_size().is_empty());
    }

    #[test]
    fn test_flip_about_explicit_center() {
        let mut mesh = Mesh::new();
        mesh.add_triangle(Triangle::new(
            Vector3::z(),
            [Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0), Point3::new(1.0, 1.0, 0.0)],
        ));
        mesh.flip(true, false, false, Some(Point3::origin()));
        assert_eq!(mesh.triangles[0].vertices[1], Point3::new(-2.0, 0.0, 0.0));
    }

    #[test]
    fn test_buffers_from_meshes() {
        let mut cube = Mesh::cube(2.0);
        let red = Color::new(255, 0, 0);
        cube.triangles[0].color = Some(red);

        let buffers = WireframeBuffers::from_meshes([&cube, &cube], Color::WHITE);
        assert_eq!(buffers.vertices.len(), 72);
        assert_eq!(buffers.edge_count(), 72);
        assert_eq!(buffers.colors.len(), 72);
        assert_eq!(&buffers.colors[..3], &[red; 3]);
        assert_eq!(buffers.colors[3], Color::WHITE);
        assert_eq!(buffers.edges[36], (36, 37));
        assert!(buffers.validate().is_ok());
    }

    #[test]
    fn test_cube_buffers() {
        let cube = WireframeBuffers::cube(1.0, Color::WHITE);
        assert_eq!(cube.vertices.len(), 8);
        assert_eq!(cube.edge_count(), 12);
        assert_eq!(cube.vertices[0], Point3::new(-1.0, -1.0, -1.0));
        assert_eq!(cube.vertices[7], Point3::new(1.0, 1.0, 1.0));
        // Every cube edge is axis-aligned with length 2
        for (a, b, _) in cube.segments() {
            assert!(((b - a).norm() - 2.0).abs() < EPS);
        }
    }

    #[test]
    fn test_grid_buffers() {
        let grid = WireframeBuffers::grid(
            3,
            4,
            Point3::new(-1.0, -2.0, 0.0),
            Point3::new(2.0, -2.0, 4.0),
            Color::WHITE,
        );
        assert_eq!(grid.vertices.len(), 12);
        // 3 rows of 3 horizontal edges, 2 gaps of 4 vertical edges
        assert_eq!(grid.edge_count(), 3 * 3 + 2 * 4);
        assert_eq!(grid.vertices[3], Point3::new(2.0, -2.0, 0.0));
        assert_eq!(grid.vertices[11], Point3::new(2.0, -2.0, 4.0));
        assert!(grid.validate().is_ok());
    }

    #[test]
    fn test_append_rebases_indices() {
        let mut buffers = WireframeBuffers::cube(1.0, Color::WHITE);
        buffers.append(&WireframeBuffers::cube(2.0, Color::new(0, 255, 0)));
        assert_eq!(buffers.vertices.len(), 16);
        assert_eq!(buffers.edges[12], (8, 9));
        assert!(buffers.validate().is_ok());
    }

    #[test]
    fn test_validate_reports_bad_index() {
        let mut buffers = WireframeBuffers::cube(1.0, Color::WHITE);
        buffers.edges.push((3, 8));
        assert_eq!(
            buffers.validate(),
            Err(GeometryError {
                edge: 12,
                index: 8,
                vertex_count: 8
            })
        );
    }
}

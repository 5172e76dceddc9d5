//! Built-in primitive shapes
//!
//! Every shape is centered on the origin and fits the unit box
//! `[-0.5, 0.5]^3`, with counter-clockwise winding seen from outside.

use serde::{Deserialize, Serialize};

use crate::foundation::math::{constants::PI, Vec2, Vec3};

/// Subdivisions used for the curved editor primitives
pub const DEFAULT_SUBDIVISIONS: u32 = 20;

/// Raw, already-parsed triangle geometry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshGeometry {
    /// Vertex positions in model space
    pub positions: Vec<Vec3>,
    /// Per-vertex normals (may be empty)
    pub normals: Vec<Vec3>,
    /// Per-vertex texture coordinates (may be empty)
    pub tex_coords: Vec<Vec2>,
    /// Triangle list indices
    pub indices: Vec<u32>,
}

impl MeshGeometry {
    fn push_vertex(&mut self, position: Vec3, normal: Vec3, tex_coord: Vec2) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push(position);
        self.normals.push(normal);
        self.tex_coords.push(tex_coord);
        index
    }

    fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }
}

/// Primitive shapes the editor can create
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveShape {
    /// Unit cube
    Cube,
    /// UV sphere of radius 0.5
    Sphere,
    /// Open cylinder along Y
    Cylinder,
    /// Flat XZ plane facing +Y
    Plane,
}

impl PrimitiveShape {
    /// All shapes, in menu order
    pub const ALL: [PrimitiveShape; 4] = [Self::Cube, Self::Sphere, Self::Cylinder, Self::Plane];

    /// Name given to nodes created from this shape
    pub fn name(self) -> &'static str {
        match self {
            Self::Cube => "Cube",
            Self::Sphere => "Sphere",
            Self::Cylinder => "Cylinder",
            Self::Plane => "Plane",
        }
    }

    /// Shape whose [`name`](Self::name) matches
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|shape| shape.name() == name)
    }

    /// Generate geometry with the default subdivisions
    pub fn generate(self) -> MeshGeometry {
        match self {
            Self::Cube => cube(),
            Self::Sphere => sphere(DEFAULT_SUBDIVISIONS, DEFAULT_SUBDIVISIONS),
            Self::Cylinder => cylinder(DEFAULT_SUBDIVISIONS, DEFAULT_SUBDIVISIONS),
            Self::Plane => plane(DEFAULT_SUBDIVISIONS, DEFAULT_SUBDIVISIONS),
        }
    }
}

/// Cube with 24 vertices so each face gets its own normal
pub fn cube() -> MeshGeometry {
    // (normal, u, v) with u x v = normal
    let faces = [
        (Vec3::x(), Vec3::y(), Vec3::z()),
        (-Vec3::x(), Vec3::z(), Vec3::y()),
        (Vec3::y(), Vec3::z(), Vec3::x()),
        (-Vec3::y(), Vec3::x(), Vec3::z()),
        (Vec3::z(), Vec3::x(), Vec3::y()),
        (-Vec3::z(), Vec3::y(), Vec3::x()),
    ];
    let quad = [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)];

    let mut geometry = MeshGeometry::default();
    for (normal, u, v) in faces {
        let base = geometry.positions.len() as u32;
        for (su, sv) in quad {
            let position = normal * 0.5 + u * su + v * sv;
            geometry.push_vertex(position, normal, Vec2::new(su + 0.5, sv + 0.5));
        }
        geometry.push_triangle(base, base + 1, base + 2);
        geometry.push_triangle(base, base + 2, base + 3);
    }
    geometry
}

/// UV sphere of radius 0.5; `slices` around Y, `stacks` pole to pole
pub fn sphere(slices: u32, stacks: u32) -> MeshGeometry {
    let slices = slices.max(3);
    let stacks = stacks.max(2);
    let mut geometry = MeshGeometry::default();

    for i in 0..=stacks {
        let phi = PI * i as f32 / stacks as f32;
        for j in 0..=slices {
            let theta = 2.0 * PI * j as f32 / slices as f32;
            let normal = Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());
            let uv = Vec2::new(j as f32 / slices as f32, i as f32 / stacks as f32);
            geometry.push_vertex(normal * 0.5, normal, uv);
        }
    }

    let row = slices + 1;
    for i in 0..stacks {
        for j in 0..slices {
            let a = i * row + j;
            let b = (i + 1) * row + j;
            let c = b + 1;
            let d = a + 1;
            // Quads touching a pole collapse to a single triangle
            if i + 1 < stacks {
                geometry.push_triangle(a, c, b);
            }
            if i > 0 {
                geometry.push_triangle(a, d, c);
            }
        }
    }
    geometry
}

/// Open cylinder of radius 0.5 spanning y in [-0.5, 0.5]
pub fn cylinder(slices: u32, stacks: u32) -> MeshGeometry {
    let slices = slices.max(3);
    let stacks = stacks.max(1);
    let mut geometry = MeshGeometry::default();

    for i in 0..=stacks {
        let y = -0.5 + i as f32 / stacks as f32;
        for j in 0..=slices {
            let theta = 2.0 * PI * j as f32 / slices as f32;
            let normal = Vec3::new(theta.cos(), 0.0, theta.sin());
            let position = Vec3::new(normal.x * 0.5, y, normal.z * 0.5);
            let uv = Vec2::new(j as f32 / slices as f32, i as f32 / stacks as f32);
            geometry.push_vertex(position, normal, uv);
        }
    }

    let row = slices + 1;
    for i in 0..stacks {
        for j in 0..slices {
            let a = i * row + j;
            let b = (i + 1) * row + j;
            geometry.push_triangle(a, b, b + 1);
            geometry.push_triangle(a, b + 1, a + 1);
        }
    }
    geometry
}

/// Unit plane in XZ facing +Y, subdivided `slices` along X and `stacks` along Z
pub fn plane(slices: u32, stacks: u32) -> MeshGeometry {
    let slices = slices.max(1);
    let stacks = stacks.max(1);
    let mut geometry = MeshGeometry::default();

    for i in 0..=stacks {
        let v = i as f32 / stacks as f32;
        for j in 0..=slices {
            let u = j as f32 / slices as f32;
            geometry.push_vertex(Vec3::new(u - 0.5, 0.0, v - 0.5), Vec3::y(), Vec2::new(u, v));
        }
    }

    let row = slices + 1;
    for i in 0..stacks {
        for j in 0..slices {
            let a = i * row + j;
            let b = a + 1;
            let d = a + row;
            let c = d + 1;
            geometry.push_triangle(a, d, c);
            geometry.push_triangle(a, c, b);
        }
    }
    geometry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::Triangle;
    use approx::assert_relative_eq;

    fn triangles(geometry: &MeshGeometry) -> Vec<Triangle> {
        geometry
            .indices
            .chunks_exact(3)
            .map(|t| {
                Triangle::new(
                    geometry.positions[t[0] as usize],
                    geometry.positions[t[1] as usize],
                    geometry.positions[t[2] as usize],
                )
            })
            .collect()
    }

    #[test]
    fn test_cube_layout() {
        let cube = cube();
        assert_eq!(cube.positions.len(), 24);
        assert_eq!(cube.indices.len(), 36);
        for p in &cube.positions {
            assert_relative_eq!(p.abs(), Vec3::repeat(0.5));
        }
    }

    #[test]
    fn test_winding_faces_outward() {
        for shape in [PrimitiveShape::Cube, PrimitiveShape::Sphere, PrimitiveShape::Cylinder] {
            let geometry = shape.generate();
            for triangle in triangles(&geometry) {
                let centroid = triangle.centroid();
                let outward = match shape {
                    PrimitiveShape::Cylinder => Vec3::new(centroid.x, 0.0, centroid.z),
                    _ => centroid,
                };
                assert!(
                    triangle.normal().dot(&outward) > 0.0,
                    "{:?} has an inward facing triangle",
                    shape
                );
            }
        }
    }

    #[test]
    fn test_plane_faces_up() {
        let geometry = plane(4, 2);
        assert_eq!(geometry.positions.len(), 15);
        assert_eq!(geometry.indices.len(), 4 * 2 * 6);
        for triangle in triangles(&geometry) {
            assert_relative_eq!(triangle.normal(), Vec3::y(), epsilon = 1e-6);
        }
    }

    #[test]
    fn test_sphere_has_no_degenerate_triangles() {
        let geometry = sphere(8, 6);
        for triangle in triangles(&geometry) {
            assert!(triangle.normal().magnitude() > 0.5);
        }
        for p in &geometry.positions {
            assert_relative_eq!(p.magnitude(), 0.5, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_names() {
        assert_eq!(PrimitiveShape::Cube.name(), "Cube");
        assert_eq!(PrimitiveShape::Plane.name(), "Plane");
    }
}

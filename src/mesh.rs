use crate::color::Color;
use crate::math::{add, multiply_matrix_vector, rotation_matrix, scale, Vec3};

/// Corners of the unit cube, scaled by half the edge length at draw time
pub const CUBE_VERTICES: [Vec3; 8] = [
    [-1.0, -1.0, -1.0], // 0
    [1.0, -1.0, -1.0],  // 1
    [1.0, 1.0, -1.0],   // 2
    [-1.0, 1.0, -1.0],  // 3
    [-1.0, -1.0, 1.0],  // 4
    [1.0, -1.0, 1.0],   // 5
    [1.0, 1.0, 1.0],    // 6
    [-1.0, 1.0, 1.0],   // 7
];

/// Faces wound counter-clockwise as seen from outside the cube
pub const CUBE_FACES: [(usize, usize, usize, usize); 6] = [
    (4, 5, 6, 7), // +z
    (1, 0, 3, 2), // -z
    (5, 1, 2, 6), // +x
    (0, 4, 7, 3), // -x
    (7, 6, 2, 3), // +y
    (0, 1, 5, 4), // -y
];

pub const CUBE_EDGES: [(usize, usize); 12] = [
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 0), // back face
    (4, 5),
    (5, 6),
    (6, 7),
    (7, 4), // front face
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7), // connecting edges
];

pub const CUBE_COLOR: u32 = 0xffdb70;
pub const GLOW_COLOR: u32 = 0xff9f43;

/// Surface parameters of one cube
#[derive(Clone, Debug, PartialEq)]
pub struct CubeMaterial {
    pub color: Color,
    pub metalness: f64,
    pub roughness: f64,
    pub emissive: Color,
    pub emissive_intensity: f64,
}

impl Default for CubeMaterial {
    fn default() -> Self {
        CubeMaterial {
            color: Color::from_hex(CUBE_COLOR),
            metalness: 0.85,
            roughness: 0.25,
            emissive: Color::BLACK,
            emissive_intensity: 0.0,
        }
    }
}

/// Outline parameters of one cube
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeMaterial {
    pub color: Color,
    pub opacity: f64,
}

impl EdgeMaterial {
    pub fn new(opacity: f64) -> Self {
        EdgeMaterial {
            color: Color::from_hex(GLOW_COLOR),
            opacity,
        }
    }
}

/// Renderable cube: transform plus its own materials
#[derive(Clone, Debug)]
pub struct CubeMesh {
    pub position: Vec3,
    /// Euler angles, applied X then Y then Z
    pub rotation: Vec3,
    pub scale: f64,
    /// Edge length before `scale`
    pub size: f64,
    pub material: CubeMaterial,
    pub edges: EdgeMaterial,
}

impl CubeMesh {
    pub fn new(position: Vec3, size: f64, edge_opacity: f64) -> Self {
        CubeMesh {
            position,
            rotation: [0.0; 3],
            scale: 1.0,
            size,
            material: CubeMaterial::default(),
            edges: EdgeMaterial::new(edge_opacity),
        }
    }

    /// World-space corners in `CUBE_VERTICES` order
    pub fn world_vertices(&self) -> [Vec3; 8] {
        let rotation = rotation_matrix(&self.rotation);
        let half = self.size * self.scale / 2.0;
        CUBE_VERTICES.map(|corner| {
            let rotated = multiply_matrix_vector(&rotation, &scale(&corner, half));
            add(&rotated, &self.position)
        })
    }
}

//! The interactive cube field and its per-frame update.

use crate::color::Color;
use crate::config::FieldConfig;
use crate::math::Vec3;
use crate::mesh::{CubeMesh, CUBE_COLOR, GLOW_COLOR};
use rand::Rng;

/// Pointer falloff: 1 at the pointer, `exp(-3)` at the edge of the radius.
pub fn influence(distance: f64, radius: f64) -> f64 {
    (-distance / radius * 3.0).exp()
}

/// One grid unit of the field
#[derive(Clone, Debug)]
pub struct Cell {
    pub row: usize,
    pub column: usize,
    /// Rest position, fixed for the life of the cell
    pub base: Vec3,
    /// Offset along z from `base`
    pub displacement: f64,
    pub velocity: f64,
    /// Constant spin added to the mesh rotation every frame
    pub rotation_speed: Vec3,
    pub mesh: CubeMesh,
}

impl Cell {
    fn new<R: Rng>(row: usize, column: usize, base: Vec3, config: &FieldConfig, rng: &mut R) -> Self {
        let spread = config.rotation_speed;
        let rotation_speed = [
            rng.gen_range(-spread..spread),
            rng.gen_range(-spread..spread),
            rng.gen_range(-spread..spread),
        ];
        Cell {
            row,
            column,
            base,
            displacement: 0.0,
            velocity: 0.0,
            rotation_speed,
            mesh: CubeMesh::new(base, config.cube_size, config.edge_base_opacity),
        }
    }

    /// Advances this cell by one frame against the world-space pointer.
    ///
    /// Returns the influence applied, or `None` when the pointer is out of range.
    pub fn update(&mut self, pointer: &Vec3, config: &FieldConfig) -> Option<f64> {
        let mesh = &mut self.mesh;
        for axis in 0..3 {
            mesh.rotation[axis] += self.rotation_speed[axis];
        }

        let dx = mesh.position[0] - pointer[0];
        let dy = mesh.position[1] - pointer[1];
        let distance = (dx * dx + dy * dy).sqrt();

        let mut applied = None;
        let target = if distance < config.pressure_radius {
            let influence = influence(distance, config.pressure_radius);
            mesh.material.emissive = Color::from_hex(GLOW_COLOR);
            mesh.material.emissive_intensity = influence * config.glow_gain;
            mesh.edges.opacity = config.edge_base_opacity + influence * config.edge_glow;
            mesh.edges.color = Color::from_hex(CUBE_COLOR);
            applied = Some(influence);
            influence * config.max_displacement
        } else {
            mesh.material.emissive_intensity *= config.glow_decay;
            mesh.edges.opacity *= config.edge_decay;
            if mesh.edges.opacity < config.edge_base_opacity {
                mesh.edges.opacity = config.edge_base_opacity;
                mesh.edges.color = Color::from_hex(GLOW_COLOR);
            }
            0.0
        };

        self.velocity += (target - self.displacement) * config.spring;
        self.velocity *= config.damping;
        self.displacement += self.velocity;

        mesh.position[2] = self.base[2] + self.displacement;
        mesh.scale = 1.0 + (self.displacement / config.max_displacement) * 0.2;
        applied
    }

    /// Puts the cell back at rest with its outline and glow cleared
    pub fn reset(&mut self, config: &FieldConfig) {
        self.displacement = 0.0;
        self.velocity = 0.0;
        self.mesh.position = self.base;
        self.mesh.scale = 1.0;
        self.mesh.material.emissive_intensity = 0.0;
        self.mesh.edges.opacity = config.edge_base_opacity;
        self.mesh.edges.color = Color::from_hex(GLOW_COLOR);
    }
}

/// Fixed grid of cells centered on the origin
#[derive(Clone, Debug)]
pub struct Field {
    config: FieldConfig,
    cells: Vec<Cell>,
    /// Cells the pointer touched on the last update
    touched: usize,
}

impl Field {
    pub fn new<R: Rng>(config: FieldConfig, rng: &mut R) -> Self {
        let size = config.grid_size;
        let half = size as f64 / 2.0;
        let mut cells = Vec::with_capacity(size * size);
        for x in 0..size {
            for y in 0..size {
                let base = [
                    (x as f64 - half) * config.spacing,
                    (y as f64 - half) * config.spacing,
                    0.0,
                ];
                cells.push(Cell::new(y, x, base, &config, rng));
            }
        }
        Field {
            config,
            cells,
            touched: 0,
        }
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn touched(&self) -> usize {
        self.touched
    }

    /// Runs one frame of the field against the world-space pointer
    pub fn update(&mut self, pointer: &Vec3) {
        let config = &self.config;
        self.touched = self
            .cells
            .iter_mut()
            .filter_map(|cell| cell.update(pointer, config))
            .count();
    }

    pub fn reset(&mut self) {
        let config = &self.config;
        for cell in &mut self.cells {
            cell.reset(config);
        }
        self.touched = 0;
    }
}

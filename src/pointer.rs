use crate::camera::{Camera, Plane};
use crate::math::{approach, Vec3};

/// Pointer position as seen by the field: raw, low-pass filtered, and projected
#[derive(Clone, Debug, Default)]
pub struct PointerState {
    /// Latest pointer position in normalized device coordinates
    pub raw: [f64; 2],
    /// Filtered copy of `raw`, advanced once per frame
    pub smooth: [f64; 2],
    /// `smooth` projected onto the reference plane
    pub world: Vec3,
}

impl PointerState {
    /// Records a pointer move over a `columns` x `rows` surface
    pub fn move_to_cell(&mut self, column: u16, row: u16, columns: u16, rows: u16) {
        self.raw = cell_to_ndc(column, row, columns, rows);
    }

    /// Advances `smooth` toward `raw` by `fraction` of the remaining gap
    pub fn smooth_step(&mut self, fraction: f64) {
        self.smooth[0] = approach(self.smooth[0], self.raw[0], fraction);
        self.smooth[1] = approach(self.smooth[1], self.raw[1], fraction);
    }

    /// Re-projects the smoothed pointer onto the reference plane.
    ///
    /// Keeps the previous world position when the ray misses the plane.
    pub fn project(&mut self, camera: &Camera) -> bool {
        match camera.ray_from_ndc(self.smooth).intersect_plane(&Plane::REFERENCE) {
            Some(hit) => {
                self.world = hit;
                true
            }
            None => false,
        }
    }
}

/// Maps the center of a terminal cell to normalized device coordinates (y up)
pub fn cell_to_ndc(column: u16, row: u16, columns: u16, rows: u16) -> [f64; 2] {
    let columns = f64::from(columns.max(1));
    let rows = f64::from(rows.max(1));
    [
        (f64::from(column) + 0.5) / columns * 2.0 - 1.0,
        -((f64::from(row) + 0.5) / rows * 2.0 - 1.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn cell_centers_map_into_ndc() {
        let [x, y] = cell_to_ndc(0, 0, 10, 10);
        assert!(approx_eq!(f64, x, -0.9, epsilon = 1e-12));
        assert!(approx_eq!(f64, y, 0.9, epsilon = 1e-12));
        let [x, y] = cell_to_ndc(9, 9, 10, 10);
        assert!(approx_eq!(f64, x, 0.9, epsilon = 1e-12));
        assert!(approx_eq!(f64, y, -0.9, epsilon = 1e-12));
    }

    #[test]
    fn smoothing_closes_ten_percent_per_frame() {
        let mut pointer = PointerState {
            raw: [1.0, -1.0],
            ..PointerState::default()
        };
        pointer.smooth_step(0.1);
        assert!(approx_eq!(f64, pointer.smooth[0], 0.1, epsilon = 1e-12));
        assert!(approx_eq!(f64, pointer.smooth[1], -0.1, epsilon = 1e-12));
        pointer.smooth_step(0.1);
        assert!(approx_eq!(f64, pointer.smooth[0], 0.19, epsilon = 1e-12));
    }

    #[test]
    fn centered_pointer_projects_to_origin() {
        let camera = Camera::new(60.0, 80, 48, 0.1, 200.0);
        let mut pointer = PointerState {
            world: [9.0, 9.0, 9.0],
            ..PointerState::default()
        };
        assert!(pointer.project(&camera));
        assert!(approx_eq!(f64, pointer.world[0], 0.0, epsilon = 1e-12));
        assert!(approx_eq!(f64, pointer.world[1], 0.0, epsilon = 1e-12));
    }

    #[test]
    fn missed_projection_keeps_last_world_position() {
        let mut camera = Camera::new(60.0, 80, 48, 0.1, 200.0);
        // Behind the reference plane, so a forward-looking ray never meets it.
        camera.position = [0.0, 0.0, -5.0];
        let mut pointer = PointerState {
            world: [1.5, -2.5, 0.0],
            ..PointerState::default()
        };
        assert!(!pointer.project(&camera));
        assert_eq!(pointer.world, [1.5, -2.5, 0.0]);
    }
}

use crate::math::{add, dot, normalize, scale, sub, Vec3};

/// A half-line in world space
#[derive(Clone, Copy, Debug)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

/// The plane of points `p` with `dot(normal, p) + constant == 0`
#[derive(Clone, Copy, Debug)]
pub struct Plane {
    pub normal: Vec3,
    pub constant: f64,
}

impl Plane {
    /// The plane through the origin facing the viewer
    pub const REFERENCE: Plane = Plane {
        normal: [0.0, 0.0, 1.0],
        constant: 0.0,
    };

    pub fn distance_to_point(&self, point: &Vec3) -> f64 {
        dot(&self.normal, point) + self.constant
    }
}

impl Ray {
    /// Intersects the ray with `plane`.
    ///
    /// Returns `None` when the ray runs parallel to the plane without lying in
    /// it, or when the plane is behind the ray origin.
    pub fn intersect_plane(&self, plane: &Plane) -> Option<Vec3> {
        let denominator = dot(&plane.normal, &self.direction);
        if denominator == 0.0 {
            if plane.distance_to_point(&self.origin) == 0.0 {
                return Some(self.origin);
            }
            return None;
        }

        let t = -plane.distance_to_point(&self.origin) / denominator;
        if t < 0.0 || !t.is_finite() {
            return None;
        }
        Some(add(&self.origin, &scale(&self.direction, t)))
    }
}

/// A point after projection, in pixels plus view depth
#[derive(Clone, Copy, Debug)]
pub struct Projected {
    pub screen: [f64; 2],
    pub ndc: [f64; 2],
    /// Distance in front of the camera along the viewing axis
    pub depth: f64,
}

/// Perspective camera looking down the negative z axis
#[derive(Clone, Debug)]
pub struct Camera {
    pub fov_degrees: f64,
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
    pub position: Vec3,
    width: usize,
    height: usize,
    focal: f64,
}

impl Camera {
    pub fn new(fov_degrees: f64, width: usize, height: usize, near: f64, far: f64) -> Self {
        let mut camera = Camera {
            fov_degrees,
            aspect: 1.0,
            near,
            far,
            position: [0.0, 0.0, 25.0],
            width: 0,
            height: 0,
            focal: 1.0,
        };
        camera.set_viewport(width, height);
        camera
    }

    /// Updates the pixel viewport, the aspect ratio and the projection
    pub fn set_viewport(&mut self, width: usize, height: usize) {
        self.width = width.max(1);
        self.height = height.max(1);
        self.aspect = self.width as f64 / self.height as f64;
        self.update_projection();
    }

    pub fn update_projection(&mut self) {
        self.focal = 1.0 / (self.fov_degrees.to_radians() / 2.0).tan();
    }

    pub fn viewport(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Projects a world point, or returns `None` if it lies outside the depth range
    pub fn project(&self, point: &Vec3) -> Option<Projected> {
        let view = sub(point, &self.position);
        let depth = -view[2];
        if depth < self.near || depth > self.far {
            return None;
        }

        let ndc = [
            self.focal / self.aspect * view[0] / depth,
            self.focal * view[1] / depth,
        ];
        let screen = [
            (ndc[0] + 1.0) / 2.0 * self.width as f64,
            (1.0 - ndc[1]) / 2.0 * self.height as f64,
        ];
        Some(Projected { screen, ndc, depth })
    }

    /// Casts a ray from the camera through a point in normalized device coordinates
    pub fn ray_from_ndc(&self, ndc: [f64; 2]) -> Ray {
        let direction = [ndc[0] * self.aspect / self.focal, ndc[1] / self.focal, -1.0];
        Ray {
            origin: self.position,
            direction: normalize(&direction),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn resize_updates_aspect() {
        let mut camera = Camera::new(60.0, 100, 100, 0.1, 200.0);
        camera.set_viewport(320, 96);
        assert!(approx_eq!(f64, camera.aspect, 320.0 / 96.0));
        assert_eq!(camera.viewport(), (320, 96));
    }

    #[test]
    fn origin_projects_to_screen_center() {
        let camera = Camera::new(60.0, 200, 100, 0.1, 200.0);
        let p = camera.project(&[0.0, 0.0, 0.0]).unwrap();
        assert!(approx_eq!(f64, p.screen[0], 100.0));
        assert!(approx_eq!(f64, p.screen[1], 50.0));
        assert!(approx_eq!(f64, p.depth, 25.0));
    }

    #[test]
    fn points_behind_camera_are_not_projected() {
        let camera = Camera::new(60.0, 200, 100, 0.1, 200.0);
        assert!(camera.project(&[0.0, 0.0, 30.0]).is_none());
    }

    #[test]
    fn unprojection_inverts_projection_on_reference_plane() {
        let camera = Camera::new(60.0, 160, 90, 0.1, 200.0);
        let world = [3.5, -2.0, 0.0];
        let p = camera.project(&world).unwrap();
        let hit = camera.ray_from_ndc(p.ndc).intersect_plane(&Plane::REFERENCE).unwrap();
        assert!(approx_eq!(f64, hit[0], world[0], epsilon = 1e-9));
        assert!(approx_eq!(f64, hit[1], world[1], epsilon = 1e-9));
        assert!(approx_eq!(f64, hit[2], 0.0, epsilon = 1e-9));
    }

    #[test]
    fn parallel_ray_has_no_intersection() {
        let ray = Ray {
            origin: [0.0, 0.0, 5.0],
            direction: [1.0, 0.0, 0.0],
        };
        assert!(ray.intersect_plane(&Plane::REFERENCE).is_none());
    }

    #[test]
    fn plane_behind_ray_has_no_intersection() {
        let ray = Ray {
            origin: [0.0, 0.0, 5.0],
            direction: [0.0, 0.0, 1.0],
        };
        assert!(ray.intersect_plane(&Plane::REFERENCE).is_none());
    }
}

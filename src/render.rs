use crate::camera::Camera;
use crate::field::Field;
use crate::graphics::{draw_line, draw_triangle, Framebuffer, Shader};
use crate::math::calculate_normal;
use crate::mesh::{CubeMesh, CUBE_EDGES, CUBE_FACES};
use crate::scene::Lighting;
use crate::vertex::Vertex;

/// Cubes whose centers land this far outside the view in NDC are skipped
const CULL_MARGIN: f64 = 1.15;

/// Draws the field into a framebuffer through the camera
#[derive(Clone, Debug)]
pub struct Renderer {
    pub show_edges: bool,
    /// Cubes drawn in the last frame
    drawn: usize,
}

impl Renderer {
    pub fn new(show_edges: bool) -> Self {
        Renderer {
            show_edges,
            drawn: 0,
        }
    }

    pub fn drawn(&self) -> usize {
        self.drawn
    }

    /// Clears `frame` to the background and draws every visible cube
    pub fn render(&mut self, field: &Field, camera: &Camera, lighting: &Lighting, frame: &mut Framebuffer) {
        frame.clear(lighting.background);
        self.drawn = 0;
        for cell in field.cells() {
            if self.draw_cube(&cell.mesh, camera, lighting, frame) {
                self.drawn += 1;
            }
        }
    }

    /// Returns false if the cube was culled
    fn draw_cube(&self, mesh: &CubeMesh, camera: &Camera, lighting: &Lighting, frame: &mut Framebuffer) -> bool {
        let Some(center) = camera.project(&mesh.position) else {
            return false;
        };
        let margin = CULL_MARGIN + mesh.size * mesh.scale / center.depth;
        if center.ndc[0].abs() > margin || center.ndc[1].abs() > margin {
            return false;
        }

        let corners = mesh.world_vertices();
        let mut projected = Vec::with_capacity(corners.len());
        for corner in &corners {
            match camera.project(corner) {
                Some(p) => projected.push(p),
                // A corner behind the near plane: drop the whole cube
                None => return false,
            }
        }

        let shader = Shader {
            lighting,
            material: &mesh.material,
            eye: camera.position,
        };

        for &(a, b, c, d) in &CUBE_FACES {
            let normal = calculate_normal(&corners[a], &corners[b], &corners[c]);
            let vertex = |i: usize| Vertex {
                position: corners[i],
                screen_position: projected[i].screen,
                depth: projected[i].depth,
                normal,
            };
            // Triangle 1: a, b, c
            draw_triangle(&vertex(a), &vertex(b), &vertex(c), frame, &shader);
            // Triangle 2: a, c, d
            draw_triangle(&vertex(a), &vertex(c), &vertex(d), frame, &shader);
        }

        if self.show_edges {
            for &(start, end) in &CUBE_EDGES {
                let vertex = |i: usize| Vertex {
                    position: corners[i],
                    screen_position: projected[i].screen,
                    depth: projected[i].depth,
                    normal: [0.0; 3],
                };
                draw_line(&vertex(start), &vertex(end), frame, &mesh.edges);
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::config::{FieldConfig, Physics};
    use rand::{rngs::StdRng, SeedableRng};

    fn scene(width: usize, height: usize) -> (Field, Camera, Lighting, Framebuffer) {
        let mut rng = StdRng::seed_from_u64(3);
        let field = Field::new(FieldConfig::new(&Physics::default(), false), &mut rng);
        let camera = Camera::new(60.0, width, height, 0.1, 200.0);
        (field, camera, Lighting::studio(), Framebuffer::new(width, height))
    }

    #[test]
    fn visible_cubes_cover_the_screen_center() {
        let (field, camera, lighting, mut frame) = scene(64, 48);
        let mut renderer = Renderer::new(true);
        renderer.render(&field, &camera, &lighting, &mut frame);

        assert!(renderer.drawn() > 0);
        assert!(renderer.drawn() < field.len());
        let covered = (0..frame.height())
            .flat_map(|y| (0..frame.width()).map(move |x| (x, y)))
            .filter(|&(x, y)| frame.depth(x, y).is_finite())
            .count();
        assert!(covered > frame.width() * frame.height() / 4);
    }

    #[test]
    fn raised_cubes_are_nearer_the_camera() {
        let (mut field, camera, lighting, mut frame) = scene(64, 48);
        let mut renderer = Renderer::new(false);
        renderer.render(&field, &camera, &lighting, &mut frame);
        let (x, y) = (32, 24);
        let resting = frame.depth(x, y);

        for _ in 0..20 {
            field.update(&[0.0, 0.0, 0.0]);
        }
        renderer.render(&field, &camera, &lighting, &mut frame);
        assert!(frame.depth(x, y) < resting);
    }

    #[test]
    fn empty_framebuffer_is_harmless() {
        let (field, camera, lighting, _) = scene(64, 48);
        let mut frame = Framebuffer::new(0, 0);
        Renderer::new(true).render(&field, &camera, &lighting, &mut frame);
        assert_eq!(frame.width(), 0);
    }

    #[test]
    fn background_shows_between_nothing() {
        let (field, mut camera, lighting, mut frame) = scene(16, 16);
        // Look away from the grid entirely.
        camera.position = [500.0, 500.0, 25.0];
        let mut renderer = Renderer::new(true);
        renderer.render(&field, &camera, &lighting, &mut frame);
        assert_eq!(renderer.drawn(), 0);
        assert_eq!(frame.pixel(8, 8), Color::from_hex(0x0d0d0f));
    }
}

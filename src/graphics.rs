use crate::color::Color;
use crate::math::{
    add, calculate_light_intensity, dot, edge_function, length, normalize, sub, Vec3,
};
use crate::mesh::{CubeMaterial, EdgeMaterial};
use crate::scene::Lighting;
use crate::vertex::Vertex;

/// Outlines are drawn this much closer than the faces they sit on
const EDGE_DEPTH_BIAS: f64 = 0.05;

/// RGB pixel buffer with a depth buffer of the same size
#[derive(Clone, Debug)]
pub struct Framebuffer {
    width: usize,
    height: usize,
    pixels: Vec<Color>,
    z_buffer: Vec<f64>,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Framebuffer {
            width,
            height,
            pixels: vec![Color::BLACK; width * height],
            z_buffer: vec![f64::INFINITY; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Framebuffer::new(width, height);
    }

    /// Fills every pixel with `color` and empties the depth buffer
    pub fn clear(&mut self, color: Color) {
        self.pixels.fill(color);
        self.z_buffer.fill(f64::INFINITY);
    }

    pub fn pixel(&self, x: usize, y: usize) -> Color {
        self.pixels[y * self.width + x]
    }

    pub fn depth(&self, x: usize, y: usize) -> f64 {
        self.z_buffer[y * self.width + x]
    }
}

/// Per-pixel lighting for one cube material
pub struct Shader<'a> {
    pub lighting: &'a Lighting,
    pub material: &'a CubeMaterial,
    pub eye: Vec3,
}

impl Shader<'_> {
    /// Computes the lit color of a surface point, fog included
    pub fn shade(&self, position: &Vec3, normal: &Vec3, depth: f64) -> Color {
        let material = self.material;
        let view_dir = normalize(&sub(&self.eye, position));
        let shininess = (1.0 - material.roughness) * 64.0;
        let diffuse_weight = 1.0 - 0.5 * material.metalness;

        let mut diffuse = self.lighting.ambient;
        let mut specular = Color::BLACK;
        let mut add_light = |color: Color, strength: f64, light_dir: Vec3| {
            let lambert = dot(normal, &light_dir).max(0.0);
            if lambert <= 0.0 {
                return;
            }
            diffuse = diffuse.add(color.scale(strength * lambert));
            let half = normalize(&add(&light_dir, &view_dir));
            let highlight = dot(normal, &half).max(0.0).powf(shininess);
            specular = specular.add(color.scale(strength * highlight));
        };

        for light in &self.lighting.directional {
            add_light(light.color, light.intensity, normalize(&light.position));
        }
        for light in &self.lighting.points {
            let to_light = sub(&light.position, position);
            let strength = light.intensity * light.attenuation(length(&to_light));
            let lambert = calculate_light_intensity(normal, position, &light.position);
            if lambert > 0.0 && strength > 0.0 {
                add_light(light.color, strength, normalize(&to_light));
            }
        }

        let surface = material
            .color
            .modulate(diffuse)
            .scale(diffuse_weight)
            .add(material.color.modulate(specular).scale(material.metalness))
            .add(material.emissive.scale(material.emissive_intensity));

        let fog = &self.lighting.fog;
        surface.mix(fog.color, fog.factor(depth))
    }
}

/// Draws a front-facing triangle with per-pixel lighting.
///
/// Triangles that appear counter-clockwise to the viewer face the camera; the
/// rest are culled. Screen y grows downward, so these have a positive area.
pub fn draw_triangle(v0: &Vertex, v1: &Vertex, v2: &Vertex, frame: &mut Framebuffer, shader: &Shader) {
    if frame.width == 0 || frame.height == 0 {
        return;
    }

    // Precompute area of the triangle; non-positive means back-facing or degenerate
    let area = edge_function(&v0.screen_position, &v1.screen_position, &v2.screen_position);
    if area <= 0.0 {
        return;
    }

    // Compute bounding box of the triangle
    let min_x = v0.screen_position[0]
        .min(v1.screen_position[0])
        .min(v2.screen_position[0])
        .floor()
        .max(0.0);
    let max_x = v0.screen_position[0]
        .max(v1.screen_position[0])
        .max(v2.screen_position[0])
        .ceil()
        .min(frame.width as f64 - 1.0);
    let min_y = v0.screen_position[1]
        .min(v1.screen_position[1])
        .min(v2.screen_position[1])
        .floor()
        .max(0.0);
    let max_y = v0.screen_position[1]
        .max(v1.screen_position[1])
        .max(v2.screen_position[1])
        .ceil()
        .min(frame.height as f64 - 1.0);
    if max_x < min_x || max_y < min_y {
        return;
    }

    // For each pixel in the bounding box
    for y in min_y as usize..=max_y as usize {
        for x in min_x as usize..=max_x as usize {
            let p = [x as f64 + 0.5, y as f64 + 0.5];

            let w0 = edge_function(&v1.screen_position, &v2.screen_position, &p);
            let w1 = edge_function(&v2.screen_position, &v0.screen_position, &p);
            let w2 = edge_function(&v0.screen_position, &v1.screen_position, &p);

            if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                // Normalize barycentric coordinates
                let w0 = w0 / area;
                let w1 = w1 / area;
                let w2 = w2 / area;

                // Depth test
                let depth = v0.depth * w0 + v1.depth * w1 + v2.depth * w2;
                let offset = y * frame.width + x;
                if depth < frame.z_buffer[offset] {
                    frame.z_buffer[offset] = depth;

                    let position = [
                        v0.position[0] * w0 + v1.position[0] * w1 + v2.position[0] * w2,
                        v0.position[1] * w0 + v1.position[1] * w1 + v2.position[1] * w2,
                        v0.position[2] * w0 + v1.position[2] * w1 + v2.position[2] * w2,
                    ];
                    let normal = normalize(&[
                        v0.normal[0] * w0 + v1.normal[0] * w1 + v2.normal[0] * w2,
                        v0.normal[1] * w0 + v1.normal[1] * w1 + v2.normal[1] * w2,
                        v0.normal[2] * w0 + v1.normal[2] * w1 + v2.normal[2] * w2,
                    ]);

                    frame.pixels[offset] = shader.shade(&position, &normal, depth);
                }
            }
        }
    }
}

/// Draws an outline segment with Bresenham's algorithm, blended by the edge opacity.
///
/// Segments are depth-tested against the faces already drawn.
pub fn draw_line(v0: &Vertex, v1: &Vertex, frame: &mut Framebuffer, edge: &EdgeMaterial) {
    let (mut x0, mut y0, x1, y1) = (
        v0.screen_position[0].round() as isize,
        v0.screen_position[1].round() as isize,
        v1.screen_position[0].round() as isize,
        v1.screen_position[1].round() as isize,
    );
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy; // error value e_xy

    let steps = dx.max(-dy).max(1) as f64;
    let mut step = 0.0;

    loop {
        if x0 >= 0 && x0 < frame.width as isize && y0 >= 0 && y0 < frame.height as isize {
            let offset = y0 as usize * frame.width + x0 as usize;
            let t = step / steps;
            let depth = v0.depth + (v1.depth - v0.depth) * t;
            if depth - EDGE_DEPTH_BIAS <= frame.z_buffer[offset] {
                frame.pixels[offset] = frame.pixels[offset].mix(edge.color, edge.opacity);
            }
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
        step += 1.0;
    }
}

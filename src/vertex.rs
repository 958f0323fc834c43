/// Vertex structure with world position, screen position, view depth and normal
#[derive(Clone, Copy, Debug)]
pub struct Vertex {
    pub position: [f64; 3],
    pub screen_position: [f64; 2],
    pub depth: f64,
    pub normal: [f64; 3],
}

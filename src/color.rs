/// Linear RGB color with channels in `0.0..=1.0`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Color { r, g, b }
    }

    /// Builds a color from a `0xRRGGBB` literal
    pub fn from_hex(hex: u32) -> Self {
        Color::rgb(
            f64::from((hex >> 16) & 0xff) / 255.0,
            f64::from((hex >> 8) & 0xff) / 255.0,
            f64::from(hex & 0xff) / 255.0,
        )
    }

    pub fn scale(self, factor: f64) -> Self {
        Color::rgb(self.r * factor, self.g * factor, self.b * factor)
    }

    pub fn add(self, other: Color) -> Self {
        Color::rgb(self.r + other.r, self.g + other.g, self.b + other.b)
    }

    /// Componentwise product, used to tint a surface color by light color
    pub fn modulate(self, other: Color) -> Self {
        Color::rgb(self.r * other.r, self.g * other.g, self.b * other.b)
    }

    /// Linear blend from `self` (t = 0) to `other` (t = 1)
    pub fn mix(self, other: Color, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        Color::rgb(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
        )
    }

    pub fn to_rgb8(self) -> (u8, u8, u8) {
        let channel = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        (channel(self.r), channel(self.g), channel(self.b))
    }
}

impl From<Color> for crossterm::style::Color {
    fn from(color: Color) -> Self {
        let (r, g, b) = color.to_rgb8();
        crossterm::style::Color::Rgb { r, g, b }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trips_through_rgb8() {
        assert_eq!(Color::from_hex(0xffdb70).to_rgb8(), (0xff, 0xdb, 0x70));
        assert_eq!(Color::from_hex(0x0d0d0f).to_rgb8(), (0x0d, 0x0d, 0x0f));
    }

    #[test]
    fn overbright_channels_saturate() {
        assert_eq!(Color::rgb(2.0, -1.0, 0.5).to_rgb8(), (255, 0, 128));
    }

    #[test]
    fn mix_clamps_its_weight() {
        assert_eq!(Color::BLACK.mix(Color::WHITE, 2.0), Color::WHITE);
        assert_eq!(Color::BLACK.mix(Color::WHITE, -1.0), Color::BLACK);
    }
}

use crate::color::Color;
use crate::math::Vec3;

pub const BACKGROUND: u32 = 0x0d0d0f;

/// Light arriving from a fixed direction, as if from very far away
#[derive(Clone, Debug)]
pub struct DirectionalLight {
    pub color: Color,
    pub intensity: f64,
    /// Position the light shines from, toward the origin
    pub position: Vec3,
}

/// Light radiating from a point, fading to nothing at `range`
#[derive(Clone, Debug)]
pub struct PointLight {
    pub color: Color,
    pub intensity: f64,
    pub range: f64,
    pub position: Vec3,
}

impl PointLight {
    /// Linear falloff from full strength at the light to zero at `range`
    pub fn attenuation(&self, distance: f64) -> f64 {
        if self.range <= 0.0 {
            1.0
        } else {
            (1.0 - distance / self.range).max(0.0)
        }
    }
}

/// Linear depth fog toward a flat color
#[derive(Clone, Debug)]
pub struct Fog {
    pub color: Color,
    pub near: f64,
    pub far: f64,
}

impl Fog {
    /// Fraction of fog color at `depth`, 0 before `near` and 1 past `far`
    pub fn factor(&self, depth: f64) -> f64 {
        ((depth - self.near) / (self.far - self.near)).clamp(0.0, 1.0)
    }
}

/// Everything in the scene that is not a cube
#[derive(Clone, Debug)]
pub struct Lighting {
    pub background: Color,
    pub fog: Fog,
    pub ambient: Color,
    pub directional: Vec<DirectionalLight>,
    pub points: Vec<PointLight>,
}

impl Lighting {
    /// Warm studio setup: key, fill and rim lights plus two pulsing point lights
    pub fn studio() -> Self {
        Lighting {
            background: Color::from_hex(BACKGROUND),
            fog: Fog {
                color: Color::from_hex(BACKGROUND),
                near: 40.0,
                far: 100.0,
            },
            ambient: Color::from_hex(0x404040).scale(0.4),
            directional: vec![
                DirectionalLight {
                    color: Color::from_hex(0xffdb70),
                    intensity: 1.5,
                    position: [15.0, 20.0, 10.0],
                },
                DirectionalLight {
                    color: Color::from_hex(0x808080),
                    intensity: 0.4,
                    position: [-15.0, 10.0, 5.0],
                },
                DirectionalLight {
                    color: Color::from_hex(0xff9f43),
                    intensity: 1.0,
                    position: [-10.0, 5.0, -15.0],
                },
            ],
            points: vec![
                PointLight {
                    color: Color::from_hex(0xffdb70),
                    intensity: 0.6,
                    range: 50.0,
                    position: [0.0, 0.0, 10.0],
                },
                PointLight {
                    color: Color::from_hex(0xff9f43),
                    intensity: 0.4,
                    range: 40.0,
                    position: [0.0, -10.0, -5.0],
                },
            ],
        }
    }

    /// Pulses the point lights with elapsed time in seconds
    pub fn animate(&mut self, time: f64) {
        if let Some(light) = self.points.get_mut(0) {
            light.intensity = 0.5 + (time * 0.8).sin() * 0.2;
        }
        if let Some(light) = self.points.get_mut(1) {
            light.intensity = 0.3 + (time * 1.2).cos() * 0.15;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn point_lights_pulse_with_time() {
        let mut lighting = Lighting::studio();
        lighting.animate(0.0);
        assert!(approx_eq!(f64, lighting.points[0].intensity, 0.5));
        assert!(approx_eq!(f64, lighting.points[1].intensity, 0.45));
        lighting.animate(std::f64::consts::PI / 1.6);
        assert!(approx_eq!(f64, lighting.points[0].intensity, 0.7, epsilon = 1e-12));
    }

    #[test]
    fn fog_ramps_between_near_and_far() {
        let fog = Lighting::studio().fog;
        assert_eq!(fog.factor(25.0), 0.0);
        assert!(approx_eq!(f64, fog.factor(70.0), 0.5));
        assert_eq!(fog.factor(150.0), 1.0);
    }

    #[test]
    fn point_light_fades_out_at_its_range() {
        let light = &Lighting::studio().points[0];
        assert_eq!(light.attenuation(0.0), 1.0);
        assert_eq!(light.attenuation(60.0), 0.0);
    }
}

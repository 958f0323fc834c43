use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Surfaces narrower than this many columns run the constrained field
pub const NARROW_COLUMNS: u16 = 80;

/// Tunable physics of the field; everything else about the grid is fixed
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Physics {
    /// Spring stiffness pulling displacement toward its target
    pub spring: f64,
    /// Velocity retained per frame; must stay below 1
    pub damping: f64,
    /// Fraction of the pointer gap closed per frame
    pub pointer_smoothing: f64,
    pub max_displacement: f64,
    pub pressure_radius: f64,
    pub constrained_pressure_radius: f64,
}

impl Default for Physics {
    fn default() -> Self {
        Self {
            spring: 0.03,
            damping: 0.85,
            pointer_smoothing: 0.1,
            max_displacement: 8.0,
            pressure_radius: 6.0,
            constrained_pressure_radius: 4.0,
        }
    }
}

impl Physics {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            (0.0..1.0).contains(&self.damping),
            "damping must be in [0, 1), got {}",
            self.damping
        );
        // Stiffer springs overshoot without bound once damping nears 1
        ensure!(
            self.spring > 0.0 && self.spring <= 1.0,
            "spring must be in (0, 1], got {}",
            self.spring
        );
        ensure!(
            self.pointer_smoothing > 0.0 && self.pointer_smoothing <= 1.0,
            "pointer_smoothing must be in (0, 1], got {}",
            self.pointer_smoothing
        );
        ensure!(
            self.max_displacement > 0.0,
            "max_displacement must be positive, got {}",
            self.max_displacement
        );
        ensure!(
            self.pressure_radius > 0.0 && self.constrained_pressure_radius > 0.0,
            "pressure radii must be positive"
        );
        Ok(())
    }
}

/// Settings file contents. Every field is optional.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub fps: Option<u32>,
    pub reduced_motion: Option<bool>,
    pub seed: Option<u64>,
    pub show_edges: Option<bool>,
    pub physics: Physics,
}

pub fn load_settings(path: &Path) -> Result<Settings> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("could not read settings from {}", path.display()))?;
    let settings: Settings = serde_json::from_str(&text)
        .with_context(|| format!("malformed settings in {}", path.display()))?;
    settings.physics.validate()?;
    Ok(settings)
}

/// Fully resolved configuration of one field
#[derive(Clone, Debug, PartialEq)]
pub struct FieldConfig {
    /// Cells per row and per column
    pub grid_size: usize,
    pub spacing: f64,
    pub cube_size: f64,
    /// Influence radius `R`
    pub pressure_radius: f64,
    /// Maximum displacement `M`
    pub max_displacement: f64,
    pub spring: f64,
    pub damping: f64,
    pub pointer_smoothing: f64,
    /// Per-frame multiplier on glow once the pointer has left
    pub glow_decay: f64,
    pub glow_gain: f64,
    /// Per-frame multiplier on outline opacity once the pointer has left
    pub edge_decay: f64,
    pub edge_base_opacity: f64,
    pub edge_glow: f64,
    /// Half-width of the per-axis rotation speed range
    pub rotation_speed: f64,
    pub constrained: bool,
}

impl FieldConfig {
    pub fn new(physics: &Physics, constrained: bool) -> Self {
        Self {
            grid_size: if constrained { 20 } else { 50 },
            spacing: 1.4,
            cube_size: 1.0,
            pressure_radius: if constrained {
                physics.constrained_pressure_radius
            } else {
                physics.pressure_radius
            },
            max_displacement: physics.max_displacement,
            spring: physics.spring,
            damping: physics.damping,
            pointer_smoothing: physics.pointer_smoothing,
            glow_decay: 0.92,
            glow_gain: 0.7,
            edge_decay: 0.95,
            edge_base_opacity: 0.3,
            edge_glow: 0.5,
            rotation_speed: 0.0025,
            constrained,
        }
    }
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self::new(&Physics::default(), false)
    }
}

/// Whether a surface of this size, or an explicit request, calls for the lighter field
pub fn is_constrained(reduced_motion: bool, columns: u16) -> bool {
    reduced_motion || columns < NARROW_COLUMNS
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(false, 120, false ; "wide")]
    #[test_case(false, 79, true ; "narrow")]
    #[test_case(true, 200, true ; "reduced motion")]
    fn constrained_flag(reduced: bool, columns: u16, expected: bool) {
        assert_eq!(is_constrained(reduced, columns), expected);
    }

    #[test]
    fn constrained_field_is_smaller() {
        let full = FieldConfig::new(&Physics::default(), false);
        let small = FieldConfig::new(&Physics::default(), true);
        assert_eq!(full.grid_size, 50);
        assert_eq!(small.grid_size, 20);
        assert!(small.pressure_radius < full.pressure_radius);
    }

    #[test]
    fn partial_settings_fill_in_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{ "fps": 60, "physics": { "damping": 0.5 } }"#).unwrap();
        assert_eq!(settings.fps, Some(60));
        assert_eq!(settings.reduced_motion, None);
        assert_eq!(settings.physics.damping, 0.5);
        assert_eq!(settings.physics.spring, 0.03);
    }

    #[test_case(1.0 ; "undamped")]
    #[test_case(1.5 ; "amplifying")]
    #[test_case(-0.1 ; "negative")]
    fn unstable_damping_is_rejected(damping: f64) {
        let physics = Physics {
            damping,
            ..Physics::default()
        };
        assert!(physics.validate().is_err());
    }

    #[test_case(0.0 ; "slack")]
    #[test_case(1.5 ; "stiff")]
    #[test_case(5.0 ; "divergent")]
    fn out_of_range_spring_is_rejected(spring: f64) {
        let physics = Physics {
            spring,
            ..Physics::default()
        };
        assert!(physics.validate().is_err());
    }

    #[test]
    fn stiff_spring_in_settings_fails_to_load() {
        let path = std::env::temp_dir().join(format!("cubefield-spring-{}.json", std::process::id()));
        fs::write(&path, r#"{ "physics": { "spring": 5.0 } }"#).unwrap();
        let result = load_settings(&path);
        fs::remove_file(&path).unwrap();
        assert!(result.is_err());
    }

    #[test]
    fn default_physics_is_valid() {
        assert!(Physics::default().validate().is_ok());
    }

    #[test]
    fn missing_settings_file_is_an_error() {
        assert!(load_settings(Path::new("/nonexistent/cubefield.json")).is_err());
    }
}

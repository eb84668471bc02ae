//! Manipulation configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ManipulatorError, Result};
use crate::input::MouseBindings;

/// Interaction tuning shared by every controller built from it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManipulationConfig {
    /// Trackball, screen-rotate and look-around gain
    pub rotation_sensitivity: f32,

    /// Pan gain (1.0: the point under the cursor follows it)
    pub translation_sensitivity: f32,

    /// Dolly gain for drag zoom
    pub zoom_sensitivity: f32,

    /// Dolly gain per wheel notch
    pub wheel_sensitivity: f32,

    /// Spin speed multiplier applied every tick, in [0, 1)
    pub damping: f32,

    /// Release speed (rad/s) above which a rotation keeps spinning
    pub spin_start_threshold: f32,

    /// Speed (rad/s) below which a spin stops
    pub spin_stop_threshold: f32,

    /// Maximum age (s) of the last rotation sample for a release to spin
    pub release_window: f32,

    /// Sample interval (s) assumed when two samples share a timestamp
    pub nominal_sample_interval: f32,

    /// Fly speed, in scene radii per second
    pub fly_speed: f32,

    /// Dolly the camera towards its pivot instead of along the view axis
    pub zoom_on_pivot: bool,

    /// Button to gesture mapping
    pub bindings: MouseBindings,
}

impl Default for ManipulationConfig {
    fn default() -> Self {
        Self {
            rotation_sensitivity: 1.0,
            translation_sensitivity: 1.0,
            zoom_sensitivity: 1.0,
            wheel_sensitivity: 1.0,
            damping: 0.95,
            spin_start_threshold: 0.3,
            spin_stop_threshold: 0.01,
            release_window: 0.1,
            nominal_sample_interval: 1.0 / 60.0,
            fly_speed: 1.0,
            zoom_on_pivot: false,
            bindings: MouseBindings::default(),
        }
    }
}

impl ManipulationConfig {
    /// Slow, precise motion with short-lived spin
    pub fn precise() -> Self {
        Self {
            rotation_sensitivity: 0.5,
            translation_sensitivity: 0.5,
            zoom_sensitivity: 0.5,
            wheel_sensitivity: 0.5,
            damping: 0.8,
            ..Default::default()
        }
    }

    /// Long, gliding spins
    pub fn inertial() -> Self {
        Self {
            damping: 0.985,
            spin_start_threshold: 0.15,
            release_window: 0.2,
            ..Default::default()
        }
    }

    /// First-person navigation bindings
    pub fn fly() -> Self {
        Self {
            bindings: MouseBindings::fly(),
            ..Default::default()
        }
    }

    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = damping;
        self
    }

    pub fn with_rotation_sensitivity(mut self, sensitivity: f32) -> Self {
        self.rotation_sensitivity = sensitivity;
        self
    }

    pub fn with_translation_sensitivity(mut self, sensitivity: f32) -> Self {
        self.translation_sensitivity = sensitivity;
        self
    }

    pub fn with_zoom_sensitivity(mut self, sensitivity: f32) -> Self {
        self.zoom_sensitivity = sensitivity;
        self
    }

    pub fn with_spin_thresholds(mut self, start: f32, stop: f32) -> Self {
        self.spin_start_threshold = start;
        self.spin_stop_threshold = stop;
        self
    }

    pub fn with_zoom_on_pivot(mut self, zoom_on_pivot: bool) -> Self {
        self.zoom_on_pivot = zoom_on_pivot;
        self
    }

    pub fn with_bindings(mut self, bindings: MouseBindings) -> Self {
        self.bindings = bindings;
        self
    }

    /// Check every value is usable
    pub fn validate(&self) -> Result<()> {
        validate_damping(self.damping)?;

        let non_negative = [
            ("rotation_sensitivity", self.rotation_sensitivity),
            ("translation_sensitivity", self.translation_sensitivity),
            ("zoom_sensitivity", self.zoom_sensitivity),
            ("wheel_sensitivity", self.wheel_sensitivity),
            ("spin_start_threshold", self.spin_start_threshold),
            ("spin_stop_threshold", self.spin_stop_threshold),
            ("release_window", self.release_window),
            ("fly_speed", self.fly_speed),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ManipulatorError::InvalidConfig(format!(
                    "{} must be finite and non-negative, got {}",
                    name, value
                )));
            }
        }

        if !self.nominal_sample_interval.is_finite() || self.nominal_sample_interval <= 0.0 {
            return Err(ManipulatorError::InvalidConfig(format!(
                "nominal_sample_interval must be positive, got {}",
                self.nominal_sample_interval
            )));
        }
        Ok(())
    }

    /// Parse and validate a TOML document. Missing keys take default values.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Write as a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }
}

pub(crate) fn validate_damping(damping: f32) -> Result<()> {
    if (0.0..1.0).contains(&damping) {
        Ok(())
    } else {
        Err(ManipulatorError::InvalidDamping(damping))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{MouseAction, MouseButton};

    #[test]
    fn test_presets_are_valid() {
        for config in [
            ManipulationConfig::default(),
            ManipulationConfig::precise(),
            ManipulationConfig::inertial(),
            ManipulationConfig::fly(),
        ] {
            config.validate().unwrap();
        }
    }

    #[test]
    fn test_damping_range() {
        assert!(ManipulationConfig::default().with_damping(0.0).validate().is_ok());
        assert!(matches!(
            ManipulationConfig::default().with_damping(1.0).validate(),
            Err(ManipulatorError::InvalidDamping(_))
        ));
        assert!(matches!(
            ManipulationConfig::default().with_damping(f32::NAN).validate(),
            Err(ManipulatorError::InvalidDamping(_))
        ));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = ManipulationConfig::from_toml_str(
            r#"
            damping = 0.9
            zoom_on_pivot = true

            [bindings]
            middle = "ScreenRotate"
            "#,
        )
        .unwrap();

        assert_eq!(config.damping, 0.9);
        assert!(config.zoom_on_pivot);
        assert_eq!(config.rotation_sensitivity, 1.0);
        assert_eq!(config.bindings.action_for(MouseButton::Left), Some(MouseAction::Rotate));
        assert_eq!(config.bindings.action_for(MouseButton::Middle), Some(MouseAction::ScreenRotate));
    }

    #[test]
    fn test_toml_rejects_invalid_values() {
        assert!(matches!(
            ManipulationConfig::from_toml_str("damping = 1.5"),
            Err(ManipulatorError::InvalidDamping(_))
        ));
        assert!(matches!(
            ManipulationConfig::from_toml_str("release_window = -1.0"),
            Err(ManipulatorError::InvalidConfig(_))
        ));
        assert!(matches!(
            ManipulationConfig::from_toml_str("damping = \"high\""),
            Err(ManipulatorError::Parse(_))
        ));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ManipulationConfig::inertial().with_bindings(MouseBindings::fly());
        let text = config.to_toml_string().unwrap();
        assert_eq!(ManipulationConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_unbound_button_survives_round_trip() {
        let config = ManipulationConfig::default()
            .with_bindings(MouseBindings::default().with_binding(MouseButton::Right, None));
        let text = config.to_toml_string().unwrap();
        assert!(text.contains("right = \"None\""));

        let loaded = ManipulationConfig::from_toml_str(&text).unwrap();
        assert_eq!(loaded.bindings.action_for(MouseButton::Right), None);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        assert!(matches!(
            ManipulationConfig::from_toml_str("[bindings]\nleft = \"Teleport\""),
            Err(ManipulatorError::Parse(_))
        ));
    }
}

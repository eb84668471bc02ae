//! Pointer input consumed by the interaction controller
//!
//! Positions are window pixels with the origin at the top-left corner and
//! y pointing down.

use serde::{Deserialize, Serialize};
use void_math::Vec2;

/// Pointer buttons
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Gesture started by a button press
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseAction {
    /// Virtual trackball rotation
    Rotate,
    /// Pan parallel to the screen
    Translate,
    /// Dolly along the viewing axis
    Zoom,
    /// Rotation about the viewing axis
    ScreenRotate,
    /// Pitch and yaw in place
    LookAround,
    /// Rotation about the frame's own Z axis
    Roll,
    /// Fly along -Z while ticking; pointer motion looks around
    MoveForward,
    /// Fly along +Z while ticking; pointer motion looks around
    MoveBackward,
}

/// Discrete pointer event
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Pressed { button: MouseButton, position: Vec2 },
    Moved { position: Vec2 },
    /// `velocity` is an optional externally measured angular speed (rad/s)
    /// that overrides the sampled one. `Some(0.0)` suppresses spin.
    Released { position: Vec2, velocity: Option<f32> },
    /// Wheel notches; positive brings the scene closer
    Wheel { delta: f32 },
}

/// Button to gesture mapping.
///
/// In TOML an unbound button is written as `"None"`; a missing key takes the
/// default binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MouseBindings {
    #[serde(with = "binding")]
    pub left: Option<MouseAction>,
    #[serde(with = "binding")]
    pub right: Option<MouseAction>,
    #[serde(with = "binding")]
    pub middle: Option<MouseAction>,
}

mod binding {
    use serde::de::value::StrDeserializer;
    use serde::de::IntoDeserializer;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::MouseAction;

    const UNBOUND: &str = "None";

    pub fn serialize<S: Serializer>(action: &Option<MouseAction>, serializer: S) -> Result<S::Ok, S::Error> {
        match action {
            Some(action) => action.serialize(serializer),
            None => serializer.serialize_str(UNBOUND),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<MouseAction>, D::Error> {
        let name = String::deserialize(deserializer)?;
        if name == UNBOUND {
            return Ok(None);
        }
        let name: StrDeserializer<'_, D::Error> = name.as_str().into_deserializer();
        MouseAction::deserialize(name).map(Some)
    }
}

impl Default for MouseBindings {
    fn default() -> Self {
        Self {
            left: Some(MouseAction::Rotate),
            right: Some(MouseAction::Translate),
            middle: Some(MouseAction::Zoom),
        }
    }
}

impl MouseBindings {
    /// Typical first-person bindings
    pub fn fly() -> Self {
        Self {
            left: Some(MouseAction::MoveForward),
            right: Some(MouseAction::MoveBackward),
            middle: Some(MouseAction::LookAround),
        }
    }

    pub fn action_for(&self, button: MouseButton) -> Option<MouseAction> {
        match button {
            MouseButton::Left => self.left,
            MouseButton::Right => self.right,
            MouseButton::Middle => self.middle,
        }
    }

    pub fn with_binding(mut self, button: MouseButton, action: Option<MouseAction>) -> Self {
        match button {
            MouseButton::Left => self.left = action,
            MouseButton::Right => self.right = action,
            MouseButton::Middle => self.middle = action,
        }
        self
    }
}

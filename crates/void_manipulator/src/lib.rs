//! # void_manipulator - Interactive Frame Manipulation
//!
//! Pointer-driven motion for frames of a [`void_frame::FrameGraph`]:
//! - Virtual trackball rotation, pan, dolly and screen-axis rotation
//! - Inertial spin with per-tick geometric damping
//! - A [`Camera`] that orbits its pivot and provides view and projection
//!   matrices
//! - TOML-backed [`ManipulationConfig`]
//!
//! ```ignore
//! let mut graph = FrameGraph::new();
//! let camera = Camera::new(&mut graph)?;
//! let mut controller = InteractionController::for_camera(&camera, ManipulationConfig::default())?;
//!
//! controller.handle_event(&mut graph, &camera, PointerEvent::Pressed {
//!     button: MouseButton::Left,
//!     position: Vec2::new(300.0, 200.0),
//! })?;
//! // ... once per rendered frame
//! controller.tick(&mut graph, &camera, dt)?;
//! ```

pub mod camera;
pub mod config;
pub mod controller;
pub mod error;
pub mod input;
pub mod trackball;

pub use camera::{Camera, ClipPlanes, Projection};
pub use config::ManipulationConfig;
pub use controller::{InteractionController, InteractionPolicy, InteractionState};
pub use error::{ManipulatorError, Result};
pub use input::{MouseAction, MouseBindings, MouseButton, PointerEvent};

pub mod prelude {
    pub use crate::camera::{Camera, ClipPlanes, Projection};
    pub use crate::config::ManipulationConfig;
    pub use crate::controller::{InteractionController, InteractionPolicy, InteractionState};
    pub use crate::error::ManipulatorError;
    pub use crate::input::{MouseAction, MouseBindings, MouseButton, PointerEvent};
}

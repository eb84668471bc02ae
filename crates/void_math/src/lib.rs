//! # void_math - Rigid Transform Math
//!
//! Vector, quaternion and matrix primitives used by the frame hierarchy and
//! the interaction layer. All matrices are column-major so that
//! [`Mat4::to_array`] can be uploaded to a graphics pipeline unchanged.

pub mod vector;
pub mod matrix;
pub mod quaternion;

pub use vector::*;
pub use matrix::*;
pub use quaternion::*;

/// Common math constants
pub mod consts {
    pub const PI: f32 = core::f32::consts::PI;
    pub const TAU: f32 = PI * 2.0;
    pub const FRAC_PI_2: f32 = PI / 2.0;
    pub const FRAC_PI_4: f32 = PI / 4.0;
    pub const DEG_TO_RAD: f32 = PI / 180.0;
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
    /// Squared length below which a direction is treated as degenerate
    pub const EPSILON: f32 = 1e-10;
}

/// Convert degrees to radians
#[inline]
pub fn radians(degrees: f32) -> f32 {
    degrees * consts::DEG_TO_RAD
}

/// Convert radians to degrees
#[inline]
pub fn degrees(radians: f32) -> f32 {
    radians * consts::RAD_TO_DEG
}

/// Linear interpolation
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

pub mod prelude {
    pub use crate::vector::{Vec2, Vec3, Vec4};
    pub use crate::matrix::{Mat3, Mat4};
    pub use crate::quaternion::Quat;
    pub use crate::{radians, degrees, lerp};
}

//! Unit quaternions for 3D rotations
//!
//! Composition is the Hamilton product: `(a * b).rotate(v) == a.rotate(b.rotate(v))`.
//! Every constructor that can receive a degenerate input (zero axis, zero
//! length) falls back to [`Quat::IDENTITY`] instead of producing NaNs.

use core::ops::{Mul, MulAssign};

use crate::consts::EPSILON;
use crate::matrix::{Mat3, Mat4};
use crate::vector::Vec3;

/// Quaternion representing a 3D rotation
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quat {
    /// Identity quaternion (no rotation)
    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    #[inline]
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Rotation of `angle` radians around `axis`. The axis need not be
    /// normalized; a zero axis gives the identity.
    pub fn from_axis_angle(axis: Vec3, angle: f32) -> Self {
        let axis = axis.normalize_or_zero();
        if axis == Vec3::ZERO {
            return Self::IDENTITY;
        }
        let (sin, cos) = (angle * 0.5).sin_cos();
        Self::new(axis.x * sin, axis.y * sin, axis.z * sin, cos)
    }

    #[inline]
    pub fn from_rotation_x(angle: f32) -> Self {
        let (sin, cos) = (angle * 0.5).sin_cos();
        Self::new(sin, 0.0, 0.0, cos)
    }

    #[inline]
    pub fn from_rotation_y(angle: f32) -> Self {
        let (sin, cos) = (angle * 0.5).sin_cos();
        Self::new(0.0, sin, 0.0, cos)
    }

    #[inline]
    pub fn from_rotation_z(angle: f32) -> Self {
        let (sin, cos) = (angle * 0.5).sin_cos();
        Self::new(0.0, 0.0, sin, cos)
    }

    /// Create from a pure rotation matrix
    pub fn from_mat3(m: &Mat3) -> Self {
        let [c0, c1, c2] = m.cols;
        let trace = c0.x + c1.y + c2.z;

        let q = if trace > 0.0 {
            let s = (trace + 1.0).sqrt() * 2.0;
            Self::new((c1.z - c2.y) / s, (c2.x - c0.z) / s, (c0.y - c1.x) / s, 0.25 * s)
        } else if c0.x > c1.y && c0.x > c2.z {
            let s = (1.0 + c0.x - c1.y - c2.z).sqrt() * 2.0;
            Self::new(0.25 * s, (c0.y + c1.x) / s, (c2.x + c0.z) / s, (c1.z - c2.y) / s)
        } else if c1.y > c2.z {
            let s = (1.0 + c1.y - c0.x - c2.z).sqrt() * 2.0;
            Self::new((c0.y + c1.x) / s, 0.25 * s, (c1.z + c2.y) / s, (c2.x - c0.z) / s)
        } else {
            let s = (1.0 + c2.z - c0.x - c1.y).sqrt() * 2.0;
            Self::new((c2.x + c0.z) / s, (c1.z + c2.y) / s, 0.25 * s, (c0.y - c1.x) / s)
        };
        q.normalize()
    }

    /// Extract the rotation of a homogeneous matrix. Columns are normalized
    /// first so a uniformly scaled matrix yields the same rotation.
    pub fn from_rotation_matrix(m: &Mat4) -> Self {
        Self::from_mat3(&Mat3::from_cols(
            m.cols[0].truncate().normalize_or_zero(),
            m.cols[1].truncate().normalize_or_zero(),
            m.cols[2].truncate().normalize_or_zero(),
        ))
    }

    /// Rotation that maps the canonical X, Y, Z axes onto the given
    /// (orthogonal) directions. Inputs are normalized.
    pub fn from_rotated_basis(x: Vec3, y: Vec3, z: Vec3) -> Self {
        Self::from_mat3(&Mat3::from_cols(
            x.normalize_or_zero(),
            y.normalize_or_zero(),
            z.normalize_or_zero(),
        ))
    }

    /// Shortest rotation that turns direction `from` into direction `to`
    pub fn from_rotation_arc(from: Vec3, to: Vec3) -> Self {
        let from = from.normalize_or_zero();
        let to = to.normalize_or_zero();
        if from == Vec3::ZERO || to == Vec3::ZERO {
            return Self::IDENTITY;
        }

        let dot = from.dot(to);
        if dot > 0.99999 {
            return Self::IDENTITY;
        }
        if dot < -0.99999 {
            return Self::from_axis_angle(from.any_orthogonal(), core::f32::consts::PI);
        }

        let axis = from.cross(to);
        let s = ((1.0 + dot) * 2.0).sqrt();
        let inv_s = 1.0 / s;
        Self::new(axis.x * inv_s, axis.y * inv_s, axis.z * inv_s, s * 0.5).normalize()
    }

    #[inline]
    pub fn length_squared(self) -> f32 {
        self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w
    }

    #[inline]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Unit quaternion, or identity when the input is (near) zero
    #[inline]
    pub fn normalize(self) -> Self {
        let len_sq = self.length_squared();
        if len_sq > EPSILON {
            let inv = 1.0 / len_sq.sqrt();
            Self::new(self.x * inv, self.y * inv, self.z * inv, self.w * inv)
        } else {
            Self::IDENTITY
        }
    }

    #[inline]
    pub fn conjugate(self) -> Self {
        Self::new(-self.x, -self.y, -self.z, self.w)
    }

    /// Inverse rotation
    #[inline]
    pub fn inverse(self) -> Self {
        let len_sq = self.length_squared();
        if len_sq > EPSILON {
            let inv = 1.0 / len_sq;
            Self::new(-self.x * inv, -self.y * inv, -self.z * inv, self.w * inv)
        } else {
            Self::IDENTITY
        }
    }

    #[inline]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    /// Spherical linear interpolation along the shortest arc
    pub fn slerp(self, other: Self, t: f32) -> Self {
        let mut dot = self.dot(other);
        let mut other = other;
        if dot < 0.0 {
            other = Self::new(-other.x, -other.y, -other.z, -other.w);
            dot = -dot;
        }
        let dot = dot.min(1.0);

        if dot > 0.9995 {
            return Self::new(
                self.x + (other.x - self.x) * t,
                self.y + (other.y - self.y) * t,
                self.z + (other.z - self.z) * t,
                self.w + (other.w - self.w) * t,
            )
            .normalize();
        }

        let theta = dot.acos();
        let sin_theta = theta.sin();
        let s1 = ((1.0 - t) * theta).sin() / sin_theta;
        let s2 = (t * theta).sin() / sin_theta;

        Self::new(
            self.x * s1 + other.x * s2,
            self.y * s1 + other.y * s2,
            self.z * s1 + other.z * s2,
            self.w * s1 + other.w * s2,
        )
        .normalize()
    }

    /// Rotate a vector
    #[inline]
    pub fn rotate(self, v: Vec3) -> Vec3 {
        let qv = Vec3::new(self.x, self.y, self.z);
        let uv = qv.cross(v);
        let uuv = qv.cross(uv);
        v + (uv * self.w + uuv) * 2.0
    }

    /// Rotate a vector by the inverse rotation
    #[inline]
    pub fn inverse_rotate(self, v: Vec3) -> Vec3 {
        self.inverse().rotate(v)
    }

    /// Rotation angle in `[0, PI]`
    pub fn angle(self) -> f32 {
        let q = self.normalize();
        2.0 * q.w.abs().min(1.0).acos()
    }

    /// Unit rotation axis, consistent with [`Quat::angle`] (i.e. the axis
    /// flips with the sign of `w`). Identity returns +Y.
    pub fn axis(self) -> Vec3 {
        let q = self.normalize();
        let v = Vec3::new(q.x, q.y, q.z);
        let v = if q.w < 0.0 { -v } else { v };
        let axis = v.normalize_or_zero();
        if axis == Vec3::ZERO { Vec3::Y } else { axis }
    }

    /// Axis-angle representation, angle in `[0, PI]`
    #[inline]
    pub fn to_axis_angle(self) -> (Vec3, f32) {
        (self.axis(), self.angle())
    }

    /// Twist part of the swing-twist decomposition about `axis`: the
    /// rotation about `axis` closest to `self`. A degenerate axis, or a pure
    /// half-turn swing with no twist component, yields the identity.
    pub fn twist(self, axis: Vec3) -> Self {
        let axis = axis.normalize_or_zero();
        if axis == Vec3::ZERO {
            return Self::IDENTITY;
        }
        let p = Vec3::new(self.x, self.y, self.z).project_on_axis(axis);
        Self::new(p.x, p.y, p.z, self.w).normalize()
    }

    /// Convert to 3x3 rotation matrix
    pub fn to_mat3(self) -> Mat3 {
        let x2 = self.x + self.x;
        let y2 = self.y + self.y;
        let z2 = self.z + self.z;
        let xx = self.x * x2;
        let xy = self.x * y2;
        let xz = self.x * z2;
        let yy = self.y * y2;
        let yz = self.y * z2;
        let zz = self.z * z2;
        let wx = self.w * x2;
        let wy = self.w * y2;
        let wz = self.w * z2;

        Mat3::from_cols(
            Vec3::new(1.0 - (yy + zz), xy + wz, xz - wy),
            Vec3::new(xy - wz, 1.0 - (xx + zz), yz + wx),
            Vec3::new(xz + wy, yz - wx, 1.0 - (xx + yy)),
        )
    }

    /// Convert to 4x4 rotation matrix
    #[inline]
    pub fn to_mat4(self) -> Mat4 {
        self.to_mat3().to_mat4()
    }

    /// Same rotation, possibly different sign
    pub fn same_rotation(self, other: Self, epsilon: f32) -> bool {
        self.normalize().dot(other.normalize()).abs() > 1.0 - epsilon
    }
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Quat {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
            self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
        )
    }
}

impl MulAssign for Quat {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl Mul<Vec3> for Quat {
    type Output = Vec3;

    #[inline]
    fn mul(self, rhs: Vec3) -> Vec3 {
        self.rotate(rhs)
    }
}

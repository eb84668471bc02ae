//! Matrix types for transformations

use core::ops::{Mul, MulAssign};

use crate::quaternion::Quat;
use crate::vector::{Vec3, Vec4};

/// 3x3 matrix (column-major)
#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(C)]
pub struct Mat3 {
    pub cols: [Vec3; 3],
}

impl Mat3 {
    pub const IDENTITY: Self = Self {
        cols: [Vec3::X, Vec3::Y, Vec3::Z],
    };

    #[inline]
    pub const fn from_cols(c0: Vec3, c1: Vec3, c2: Vec3) -> Self {
        Self { cols: [c0, c1, c2] }
    }

    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_cols(
            self.cols[0].extend(0.0),
            self.cols[1].extend(0.0),
            self.cols[2].extend(0.0),
            Vec4::W,
        )
    }
}

impl Default for Mat3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul<Vec3> for Mat3 {
    type Output = Vec3;

    #[inline]
    fn mul(self, rhs: Vec3) -> Vec3 {
        self.cols[0] * rhs.x + self.cols[1] * rhs.y + self.cols[2] * rhs.z
    }
}

/// 4x4 homogeneous matrix (column-major), the layout handed to renderers
#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(C)]
pub struct Mat4 {
    pub cols: [Vec4; 4],
}

impl Mat4 {
    pub const IDENTITY: Self = Self {
        cols: [Vec4::X, Vec4::Y, Vec4::Z, Vec4::W],
    };

    #[inline]
    pub const fn from_cols(c0: Vec4, c1: Vec4, c2: Vec4, c3: Vec4) -> Self {
        Self { cols: [c0, c1, c2, c3] }
    }

    /// Build from 16 column-major values
    pub fn from_cols_array(a: &[f32; 16]) -> Self {
        Self::from_cols(
            Vec4::new(a[0], a[1], a[2], a[3]),
            Vec4::new(a[4], a[5], a[6], a[7]),
            Vec4::new(a[8], a[9], a[10], a[11]),
            Vec4::new(a[12], a[13], a[14], a[15]),
        )
    }

    #[inline]
    pub fn from_translation(translation: Vec3) -> Self {
        Self::from_cols(Vec4::X, Vec4::Y, Vec4::Z, translation.extend(1.0))
    }

    #[inline]
    pub fn from_quat(q: Quat) -> Self {
        q.to_mat4()
    }

    /// Rigid transform: rotate, then translate
    pub fn from_rotation_translation(rotation: Quat, translation: Vec3) -> Self {
        let mut m = Self::from_quat(rotation);
        m.cols[3] = translation.extend(1.0);
        m
    }

    /// Perspective projection (OpenGL conventions, depth in [-1, 1])
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        let f = 1.0 / (fov_y / 2.0).tan();
        let nf = 1.0 / (near - far);

        Self::from_cols(
            Vec4::new(f / aspect, 0.0, 0.0, 0.0),
            Vec4::new(0.0, f, 0.0, 0.0),
            Vec4::new(0.0, 0.0, (far + near) * nf, -1.0),
            Vec4::new(0.0, 0.0, 2.0 * far * near * nf, 0.0),
        )
    }

    /// Orthographic projection (OpenGL conventions, depth in [-1, 1])
    pub fn orthographic(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Self {
        let rml = right - left;
        let tmb = top - bottom;
        let fmn = far - near;

        Self::from_cols(
            Vec4::new(2.0 / rml, 0.0, 0.0, 0.0),
            Vec4::new(0.0, 2.0 / tmb, 0.0, 0.0),
            Vec4::new(0.0, 0.0, -2.0 / fmn, 0.0),
            Vec4::new(-(right + left) / rml, -(top + bottom) / tmb, -(far + near) / fmn, 1.0),
        )
    }

    /// Translation column, with `w` divided out
    #[inline]
    pub fn get_translation(&self) -> Vec3 {
        self.cols[3].project()
    }

    /// Transform a point (w=1) with perspective division
    #[inline]
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        (*self * point.extend(1.0)).project()
    }

    /// Transform a vector (w=0)
    #[inline]
    pub fn transform_vector(&self, vector: Vec3) -> Vec3 {
        (*self * vector.extend(0.0)).truncate()
    }

    /// General inverse, `None` when the matrix is singular
    pub fn inverse(&self) -> Option<Self> {
        let a = self.cols[0];
        let b = self.cols[1];
        let c = self.cols[2];
        let d = self.cols[3];

        let s0 = a.x * b.y - b.x * a.y;
        let s1 = a.x * b.z - b.x * a.z;
        let s2 = a.x * b.w - b.x * a.w;
        let s3 = a.y * b.z - b.y * a.z;
        let s4 = a.y * b.w - b.y * a.w;
        let s5 = a.z * b.w - b.z * a.w;

        let c5 = c.z * d.w - d.z * c.w;
        let c4 = c.y * d.w - d.y * c.w;
        let c3 = c.y * d.z - d.y * c.z;
        let c2 = c.x * d.w - d.x * c.w;
        let c1 = c.x * d.z - d.x * c.z;
        let c0 = c.x * d.y - d.x * c.y;

        let det = s0 * c5 - s1 * c4 + s2 * c3 + s3 * c2 - s4 * c1 + s5 * c0;
        if det.abs() <= f32::EPSILON * f32::EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;

        Some(Self::from_cols(
            Vec4::new(
                (b.y * c5 - b.z * c4 + b.w * c3) * inv_det,
                (-a.y * c5 + a.z * c4 - a.w * c3) * inv_det,
                (d.y * s5 - d.z * s4 + d.w * s3) * inv_det,
                (-c.y * s5 + c.z * s4 - c.w * s3) * inv_det,
            ),
            Vec4::new(
                (-b.x * c5 + b.z * c2 - b.w * c1) * inv_det,
                (a.x * c5 - a.z * c2 + a.w * c1) * inv_det,
                (-d.x * s5 + d.z * s2 - d.w * s1) * inv_det,
                (c.x * s5 - c.z * s2 + c.w * s1) * inv_det,
            ),
            Vec4::new(
                (b.x * c4 - b.y * c2 + b.w * c0) * inv_det,
                (-a.x * c4 + a.y * c2 - a.w * c0) * inv_det,
                (d.x * s4 - d.y * s2 + d.w * s0) * inv_det,
                (-c.x * s4 + c.y * s2 - c.w * s0) * inv_det,
            ),
            Vec4::new(
                (-b.x * c3 + b.y * c1 - b.z * c0) * inv_det,
                (a.x * c3 - a.y * c1 + a.z * c0) * inv_det,
                (-d.x * s3 + d.y * s1 - d.z * s0) * inv_det,
                (c.x * s3 - c.y * s1 + c.z * s0) * inv_det,
            ),
        ))
    }

    /// Flat column-major array, ready for upload
    pub fn to_array(&self) -> [f32; 16] {
        [
            self.cols[0].x, self.cols[0].y, self.cols[0].z, self.cols[0].w,
            self.cols[1].x, self.cols[1].y, self.cols[1].z, self.cols[1].w,
            self.cols[2].x, self.cols[2].y, self.cols[2].z, self.cols[2].w,
            self.cols[3].x, self.cols[3].y, self.cols[3].z, self.cols[3].w,
        ]
    }

    /// Largest absolute element-wise difference, handy for comparisons
    pub fn max_abs_diff(&self, other: &Self) -> f32 {
        self.to_array()
            .iter()
            .zip(other.to_array().iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f32::max)
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Mat4 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::from_cols(
            self * rhs.cols[0],
            self * rhs.cols[1],
            self * rhs.cols[2],
            self * rhs.cols[3],
        )
    }
}

impl Mul<Vec4> for Mat4 {
    type Output = Vec4;

    #[inline]
    fn mul(self, rhs: Vec4) -> Vec4 {
        self.cols[0] * rhs.x + self.cols[1] * rhs.y + self.cols[2] * rhs.z + self.cols[3] * rhs.w
    }
}

impl MulAssign for Mat4 {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_rotation_translation_matches_quat() {
        let q = Quat::from_axis_angle(Vec3::new(1.0, 1.0, 0.0), 0.8);
        let t = Vec3::new(1.0, -2.0, 3.0);
        let m = Mat4::from_rotation_translation(q, t);
        let p = Vec3::new(0.5, 0.25, -4.0);
        assert_abs_diff_eq!((m.transform_point(p) - (q.rotate(p) + t)).length(), 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!((m.transform_vector(p) - q.rotate(p)).length(), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_inverse() {
        let m = Mat4::from_rotation_translation(Quat::from_rotation_z(0.3), Vec3::new(1.0, 2.0, 3.0));
        let inv = m.inverse().expect("rigid transforms are invertible");
        assert!((m * inv).max_abs_diff(&Mat4::IDENTITY) < 1e-5);
    }

    #[test]
    fn test_singular_has_no_inverse() {
        let m = Mat4::from_cols(Vec4::X, Vec4::X, Vec4::Z, Vec4::W);
        assert!(m.inverse().is_none());
    }

    #[test]
    fn test_column_major_layout() {
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let a = m.to_array();
        assert_eq!(&a[12..15], &[1.0, 2.0, 3.0]);
        assert_eq!(Mat4::from_cols_array(&a), m);
    }

    #[test]
    fn test_perspective_maps_near_and_far() {
        let p = Mat4::perspective(1.0, 1.5, 0.5, 10.0);
        assert_abs_diff_eq!(p.transform_point(Vec3::new(0.0, 0.0, -0.5)).z, -1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(p.transform_point(Vec3::new(0.0, 0.0, -10.0)).z, 1.0, epsilon = 1e-4);
    }
}

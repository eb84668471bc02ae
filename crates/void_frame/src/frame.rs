//! Local frame state
//!
//! A [`Frame`] is a rigid transform (translation plus unit rotation)
//! expressed in an optional reference frame. The world pose is obtained by
//! composing along the reference chain:
//!
//! ```text
//! position    = reference.position + reference.orientation.rotate(translation)
//! orientation = reference.orientation * rotation
//! ```
//!
//! World-space queries need the chain, so they live on
//! [`FrameRef`](crate::FrameRef); this type only knows its own local state.

use core::fmt;
use std::rc::Rc;

use void_math::{Mat4, Quat, Vec3};

use crate::constraint::Constraint;
use crate::FrameId;

/// Local rigid transform with an optional reference frame and constraint
#[derive(Clone, Default)]
pub struct Frame {
    pub(crate) translation: Vec3,
    pub(crate) rotation: Quat,
    pub(crate) reference: Option<FrameId>,
    pub(crate) constraint: Option<Rc<dyn Constraint>>,
}

impl Frame {
    /// Create a root frame. The rotation is normalized.
    pub fn new(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation: rotation.normalize(),
            reference: None,
            constraint: None,
        }
    }

    pub fn identity() -> Self {
        Self::default()
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self::new(translation, Quat::IDENTITY)
    }

    pub fn from_rotation(rotation: Quat) -> Self {
        Self::new(Vec3::ZERO, rotation)
    }

    /// Express this frame in `reference`. Validated when inserted into a graph.
    pub fn with_reference(mut self, reference: FrameId) -> Self {
        self.reference = Some(reference);
        self
    }

    pub fn with_constraint(mut self, constraint: Rc<dyn Constraint>) -> Self {
        self.constraint = Some(constraint);
        self
    }

    #[inline]
    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    #[inline]
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    #[inline]
    pub fn reference_frame(&self) -> Option<FrameId> {
        self.reference
    }

    pub fn constraint(&self) -> Option<&Rc<dyn Constraint>> {
        self.constraint.as_ref()
    }

    /// Local transform matrix (frame coordinates to reference coordinates)
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.translation)
    }

    /// The local inverse transform, as an unattached frame.
    ///
    /// The result has no reference frame and no constraint.
    pub fn inverse(&self) -> Frame {
        let inv = self.rotation.inverse();
        Frame::new(-inv.rotate(self.translation), inv)
    }

    /// Reference coordinates of `point` to local coordinates
    #[inline]
    pub fn local_coordinates_of(&self, point: Vec3) -> Vec3 {
        self.rotation.inverse_rotate(point - self.translation)
    }

    /// Local coordinates of `point` to reference coordinates
    #[inline]
    pub fn local_inverse_coordinates_of(&self, point: Vec3) -> Vec3 {
        self.rotation.rotate(point) + self.translation
    }

    /// Reference-frame vector to local coordinates (translation ignored)
    #[inline]
    pub fn local_transform_of(&self, vector: Vec3) -> Vec3 {
        self.rotation.inverse_rotate(vector)
    }

    /// Local vector to reference coordinates (translation ignored)
    #[inline]
    pub fn local_inverse_transform_of(&self, vector: Vec3) -> Vec3 {
        self.rotation.rotate(vector)
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("translation", &self.translation)
            .field("rotation", &self.rotation)
            .field("reference", &self.reference)
            .field("constraint", &self.constraint)
            .finish()
    }
}

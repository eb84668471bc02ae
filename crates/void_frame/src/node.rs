//! Capability interface for anything that can be moved like a rigid frame

use void_math::{Quat, Vec3};

use crate::mutate::FrameMut;

/// World-space queries plus the relative motions an interaction layer needs.
///
/// All motions go through the node's constraint, if any.
pub trait RigidTransformNode {
    fn position(&self) -> Vec3;
    fn orientation(&self) -> Quat;

    /// World vector to node coordinates
    fn transform_of(&self, vector: Vec3) -> Vec3;
    /// Node vector to world coordinates
    fn inverse_transform_of(&self, vector: Vec3) -> Vec3;
    /// World point to node coordinates
    fn coordinates_of(&self, point: Vec3) -> Vec3;

    /// Translate by a world-space vector. Returns the applied delta, in
    /// reference coordinates.
    fn translate_world(&mut self, delta: Vec3) -> Vec3;
    /// Rotate by a local-space rotation. Returns the applied rotation.
    fn rotate(&mut self, delta: Quat) -> Quat;
    /// Rotate by a local-space rotation about a world-space point
    fn rotate_around_point(&mut self, delta: Quat, point: Vec3);
}

impl RigidTransformNode for FrameMut<'_> {
    fn position(&self) -> Vec3 {
        self.view().position()
    }

    fn orientation(&self) -> Quat {
        self.view().orientation()
    }

    fn transform_of(&self, vector: Vec3) -> Vec3 {
        self.view().transform_of(vector)
    }

    fn inverse_transform_of(&self, vector: Vec3) -> Vec3 {
        self.view().inverse_transform_of(vector)
    }

    fn coordinates_of(&self, point: Vec3) -> Vec3 {
        self.view().coordinates_of(point)
    }

    fn translate_world(&mut self, delta: Vec3) -> Vec3 {
        FrameMut::translate_world(self, delta)
    }

    fn rotate(&mut self, delta: Quat) -> Quat {
        FrameMut::rotate(self, delta)
    }

    fn rotate_around_point(&mut self, delta: Quat, point: Vec3) {
        FrameMut::rotate_around_point(self, delta, point)
    }
}

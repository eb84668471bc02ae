//! Read-only access to a frame within its graph

use std::rc::Rc;

use void_math::{Mat4, Quat, Vec3};

use crate::constraint::Constraint;
use crate::error::Result;
use crate::frame::Frame;
use crate::graph::FrameGraph;
use crate::FrameId;

/// Borrowed view of a live frame, able to walk its reference chain
#[derive(Clone, Copy)]
pub struct FrameRef<'g> {
    pub(crate) graph: &'g FrameGraph,
    pub(crate) id: FrameId,
    pub(crate) frame: &'g Frame,
}

impl<'g> FrameRef<'g> {
    #[inline]
    pub fn id(&self) -> FrameId {
        self.id
    }

    #[inline]
    pub fn graph(&self) -> &'g FrameGraph {
        self.graph
    }

    /// The local state
    #[inline]
    pub fn frame(&self) -> &'g Frame {
        self.frame
    }

    #[inline]
    pub fn translation(&self) -> Vec3 {
        self.frame.translation
    }

    #[inline]
    pub fn rotation(&self) -> Quat {
        self.frame.rotation
    }

    pub fn constraint(&self) -> Option<&'g Rc<dyn Constraint>> {
        self.frame.constraint.as_ref()
    }

    pub fn reference_frame(&self) -> Option<FrameRef<'g>> {
        self.frame
            .reference
            .and_then(|reference| self.graph.get(reference).ok())
    }

    /// Reference chain from the direct reference up to the root
    pub fn ancestors(&self) -> impl Iterator<Item = FrameRef<'g>> {
        core::iter::successors(self.reference_frame(), |frame| frame.reference_frame())
    }

    /// Number of frames in the reference chain; zero for a root
    pub fn depth(&self) -> usize {
        self.ancestors().count()
    }

    pub fn has_ancestor(&self, id: FrameId) -> bool {
        self.ancestors().any(|ancestor| ancestor.id == id)
    }

    fn world_pose(&self) -> (Vec3, Quat) {
        let mut position = self.frame.translation;
        let mut orientation = self.frame.rotation;
        for ancestor in self.ancestors() {
            position = ancestor.frame.local_inverse_coordinates_of(position);
            orientation = ancestor.frame.rotation * orientation;
        }
        (position, orientation.normalize())
    }

    /// World position of the origin
    pub fn position(&self) -> Vec3 {
        self.world_pose().0
    }

    /// World orientation, renormalized after composition
    pub fn orientation(&self) -> Quat {
        self.world_pose().1
    }

    /// Local transform matrix
    pub fn matrix(&self) -> Mat4 {
        self.frame.matrix()
    }

    /// Frame-to-world transform matrix
    pub fn world_matrix(&self) -> Mat4 {
        let (position, orientation) = self.world_pose();
        Mat4::from_rotation_translation(orientation, position)
    }

    /// Local inverse, unattached
    pub fn inverse(&self) -> Frame {
        self.frame.inverse()
    }

    /// World-to-frame transform as an unattached frame
    pub fn world_inverse(&self) -> Frame {
        let (position, orientation) = self.world_pose();
        let inv = orientation.inverse();
        Frame::new(-inv.rotate(position), inv)
    }

    /// World coordinates of `point` to frame coordinates
    pub fn coordinates_of(&self, point: Vec3) -> Vec3 {
        let (position, orientation) = self.world_pose();
        orientation.inverse_rotate(point - position)
    }

    /// Frame coordinates of `point` to world coordinates
    pub fn inverse_coordinates_of(&self, point: Vec3) -> Vec3 {
        let (position, orientation) = self.world_pose();
        orientation.rotate(point) + position
    }

    /// World vector to frame coordinates
    pub fn transform_of(&self, vector: Vec3) -> Vec3 {
        self.orientation().inverse_rotate(vector)
    }

    /// Frame vector to world coordinates
    pub fn inverse_transform_of(&self, vector: Vec3) -> Vec3 {
        self.orientation().rotate(vector)
    }

    #[inline]
    pub fn local_coordinates_of(&self, point: Vec3) -> Vec3 {
        self.frame.local_coordinates_of(point)
    }

    #[inline]
    pub fn local_inverse_coordinates_of(&self, point: Vec3) -> Vec3 {
        self.frame.local_inverse_coordinates_of(point)
    }

    #[inline]
    pub fn local_transform_of(&self, vector: Vec3) -> Vec3 {
        self.frame.local_transform_of(vector)
    }

    #[inline]
    pub fn local_inverse_transform_of(&self, vector: Vec3) -> Vec3 {
        self.frame.local_inverse_transform_of(vector)
    }

    /// Frame coordinates of `point` expressed in `target` (`None` is world)
    pub fn coordinates_of_in(&self, point: Vec3, target: Option<FrameId>) -> Result<Vec3> {
        let world = self.inverse_coordinates_of(point);
        match target {
            Some(id) => Ok(self.graph.get(id)?.coordinates_of(world)),
            None => Ok(world),
        }
    }

    /// `point` expressed in `source` (`None` is world) to frame coordinates
    pub fn coordinates_of_from(&self, point: Vec3, source: Option<FrameId>) -> Result<Vec3> {
        let world = match source {
            Some(id) => self.graph.get(id)?.inverse_coordinates_of(point),
            None => point,
        };
        Ok(self.coordinates_of(world))
    }

    /// Frame vector expressed in `target` (`None` is world)
    pub fn transform_of_in(&self, vector: Vec3, target: Option<FrameId>) -> Result<Vec3> {
        let world = self.inverse_transform_of(vector);
        match target {
            Some(id) => Ok(self.graph.get(id)?.transform_of(world)),
            None => Ok(world),
        }
    }

    /// Vector expressed in `source` (`None` is world) to frame coordinates
    pub fn transform_of_from(&self, vector: Vec3, source: Option<FrameId>) -> Result<Vec3> {
        let world = match source {
            Some(id) => self.graph.get(id)?.inverse_transform_of(vector),
            None => vector,
        };
        Ok(self.transform_of(world))
    }

    /// World point to reference-frame coordinates (identity for a root)
    pub fn reference_coordinates_of(&self, point: Vec3) -> Vec3 {
        match self.reference_frame() {
            Some(reference) => reference.coordinates_of(point),
            None => point,
        }
    }

    /// World vector to reference-frame coordinates (identity for a root)
    pub fn reference_transform_of(&self, vector: Vec3) -> Vec3 {
        match self.reference_frame() {
            Some(reference) => reference.transform_of(vector),
            None => vector,
        }
    }

    /// World orientation of the reference frame (identity for a root)
    pub fn reference_orientation(&self) -> Quat {
        self.reference_frame()
            .map(|reference| reference.orientation())
            .unwrap_or(Quat::IDENTITY)
    }
}

impl core::fmt::Debug for FrameRef<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FrameRef")
            .field("id", &self.id)
            .field("frame", self.frame)
            .finish()
    }
}

//! Motion constraints
//!
//! A [`Constraint`] filters every incremental displacement applied through
//! the constrained setters and the relative motions (`translate`, `rotate`,
//! `rotate_around_point`). Plain setters such as `set_translation` bypass it.
//!
//! Translation deltas are expressed in the frame's reference coordinates;
//! rotation deltas in the frame's local coordinates.

use core::fmt;

use void_math::{Quat, Vec3};

use crate::view::FrameRef;
use crate::FrameId;

/// Filter applied to frame displacements before they take effect
pub trait Constraint: fmt::Debug {
    /// Filter a translation delta, expressed in the frame's reference coordinates
    fn constrain_translation(&self, translation: Vec3, _frame: &FrameRef<'_>) -> Vec3 {
        translation
    }

    /// Filter a rotation delta, expressed in the frame's local coordinates
    fn constrain_rotation(&self, rotation: Quat, _frame: &FrameRef<'_>) -> Quat {
        rotation
    }
}

/// Lets every displacement through
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Unconstrained;

impl Constraint for Unconstrained {}

/// Allowed translation
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum TranslationRule {
    #[default]
    Free,
    /// Only motion along the direction
    Axis(Vec3),
    /// Only motion within the plane with this normal
    Plane(Vec3),
    Forbidden,
}

/// Allowed rotation
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum RotationRule {
    #[default]
    Free,
    /// Only rotation about the direction
    Axis(Vec3),
    Forbidden,
}

/// Coordinate system the rule directions are expressed in
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConstraintSpace {
    /// The constrained frame's own coordinates
    #[default]
    Local,
    World,
    /// A camera frame's coordinates. A camera that no longer exists is
    /// treated as [`ConstraintSpace::World`].
    Camera(FrameId),
}

/// Axis/plane constraint with independent translation and rotation rules
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AxisPlaneConstraint {
    pub translation: TranslationRule,
    pub rotation: RotationRule,
    pub space: ConstraintSpace,
}

impl AxisPlaneConstraint {
    pub fn new(translation: TranslationRule, rotation: RotationRule, space: ConstraintSpace) -> Self {
        Self { translation, rotation, space }
    }

    /// No restriction at all
    pub fn free() -> Self {
        Self::default()
    }

    /// No motion at all
    pub fn locked() -> Self {
        Self::new(TranslationRule::Forbidden, RotationRule::Forbidden, ConstraintSpace::Local)
    }

    /// Translate along `axis` only; rotation unrestricted
    pub fn axis_translation(axis: Vec3, space: ConstraintSpace) -> Self {
        Self::new(TranslationRule::Axis(axis), RotationRule::Free, space)
    }

    /// Translate within the plane of `normal` only; rotation unrestricted
    pub fn plane_translation(normal: Vec3, space: ConstraintSpace) -> Self {
        Self::new(TranslationRule::Plane(normal), RotationRule::Free, space)
    }

    /// Rotate about `axis` only; translation unrestricted
    pub fn axis_rotation(axis: Vec3, space: ConstraintSpace) -> Self {
        Self::new(TranslationRule::Free, RotationRule::Axis(axis), space)
    }

    pub fn with_translation(mut self, rule: TranslationRule) -> Self {
        self.translation = rule;
        self
    }

    pub fn with_rotation(mut self, rule: RotationRule) -> Self {
        self.rotation = rule;
        self
    }

    pub fn with_space(mut self, space: ConstraintSpace) -> Self {
        self.space = space;
        self
    }

    /// Rule direction to world coordinates, `None` for local space
    fn world_direction(&self, direction: Vec3, frame: &FrameRef<'_>) -> Option<Vec3> {
        match self.space {
            ConstraintSpace::Local => None,
            ConstraintSpace::World => Some(direction),
            ConstraintSpace::Camera(camera) => match frame.graph().get(camera) {
                Ok(camera) => Some(camera.inverse_transform_of(direction)),
                Err(_) => {
                    log::warn!(
                        "Constraint camera {} no longer exists, using world axes",
                        camera
                    );
                    Some(direction)
                }
            },
        }
    }

    /// Rule direction in the frame's reference coordinates
    fn reference_direction(&self, direction: Vec3, frame: &FrameRef<'_>) -> Vec3 {
        match self.world_direction(direction, frame) {
            Some(world) => frame.reference_transform_of(world),
            None => frame.rotation().rotate(direction),
        }
    }

    /// Rule direction in the frame's local coordinates
    fn local_direction(&self, direction: Vec3, frame: &FrameRef<'_>) -> Vec3 {
        match self.world_direction(direction, frame) {
            Some(world) => frame.transform_of(world),
            None => direction,
        }
    }
}

impl Constraint for AxisPlaneConstraint {
    fn constrain_translation(&self, translation: Vec3, frame: &FrameRef<'_>) -> Vec3 {
        match self.translation {
            TranslationRule::Free => translation,
            TranslationRule::Forbidden => Vec3::ZERO,
            TranslationRule::Axis(axis) => {
                translation.project_on_axis(self.reference_direction(axis, frame))
            }
            TranslationRule::Plane(normal) => {
                translation.project_on_plane(self.reference_direction(normal, frame))
            }
        }
    }

    fn constrain_rotation(&self, rotation: Quat, frame: &FrameRef<'_>) -> Quat {
        match self.rotation {
            RotationRule::Free => rotation,
            RotationRule::Forbidden => Quat::IDENTITY,
            RotationRule::Axis(axis) => rotation.twist(self.local_direction(axis, frame)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Frame;
    use crate::graph::FrameGraph;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_unconstrained_passes_everything() {
        let mut graph = FrameGraph::new();
        let id = graph.insert(Frame::identity()).unwrap();
        let frame = graph.get(id).unwrap();

        let delta = Vec3::new(1.0, -2.0, 3.0);
        let rotation = Quat::from_rotation_y(0.7);
        assert_eq!(Unconstrained.constrain_translation(delta, &frame), delta);
        assert_eq!(Unconstrained.constrain_rotation(rotation, &frame), rotation);
    }

    #[test]
    fn test_axis_and_plane_filter_in_world_space() {
        let mut graph = FrameGraph::new();
        let id = graph.insert(Frame::identity()).unwrap();
        let frame = graph.get(id).unwrap();
        let delta = Vec3::new(1.0, 2.0, 3.0);

        let axis = AxisPlaneConstraint::axis_translation(Vec3::X, ConstraintSpace::World);
        assert_eq!(axis.constrain_translation(delta, &frame), Vec3::new(1.0, 0.0, 0.0));

        let plane = AxisPlaneConstraint::plane_translation(Vec3::Y, ConstraintSpace::World);
        assert_eq!(plane.constrain_translation(delta, &frame), Vec3::new(1.0, 0.0, 3.0));

        let locked = AxisPlaneConstraint::locked();
        assert_eq!(locked.constrain_translation(delta, &frame), Vec3::ZERO);
        assert_eq!(locked.constrain_rotation(Quat::from_rotation_x(0.4), &frame), Quat::IDENTITY);
    }

    #[test]
    fn test_local_axis_follows_frame_rotation() {
        let mut graph = FrameGraph::new();
        let id = graph
            .insert(Frame::from_rotation(Quat::from_rotation_z(core::f32::consts::FRAC_PI_2)))
            .unwrap();
        let frame = graph.get(id).unwrap();

        // Local X of a frame turned 90 degrees about Z is world Y
        let axis = AxisPlaneConstraint::axis_translation(Vec3::X, ConstraintSpace::Local);
        let filtered = axis.constrain_translation(Vec3::new(1.0, 2.0, 3.0), &frame);
        assert_abs_diff_eq!((filtered - Vec3::new(0.0, 2.0, 0.0)).length(), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_axis_rotation_keeps_twist_only() {
        let mut graph = FrameGraph::new();
        let id = graph.insert(Frame::identity()).unwrap();
        let frame = graph.get(id).unwrap();

        let constraint = AxisPlaneConstraint::axis_rotation(Vec3::Y, ConstraintSpace::Local);
        let twist = Quat::from_rotation_y(0.7);
        let swing = Quat::from_rotation_x(0.3);
        let filtered = constraint.constrain_rotation(twist * swing, &frame);

        let axis = filtered.axis();
        assert_abs_diff_eq!(axis.x, 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(axis.z, 0.0, epsilon = 1e-5);
        assert!(filtered.rotate(Vec3::Y).distance(Vec3::Y) < 1e-5);
    }

    #[test]
    fn test_stale_camera_falls_back_to_world() {
        let mut graph = FrameGraph::new();
        let camera = graph.insert(Frame::from_rotation(Quat::from_rotation_y(1.0))).unwrap();
        let id = graph.insert(Frame::identity()).unwrap();
        graph.remove(camera).unwrap();

        let frame = graph.get(id).unwrap();
        let constraint = AxisPlaneConstraint::axis_translation(Vec3::X, ConstraintSpace::Camera(camera));
        let filtered = constraint.constrain_translation(Vec3::new(1.0, 2.0, 3.0), &frame);
        assert_eq!(filtered, Vec3::new(1.0, 0.0, 0.0));
    }
}

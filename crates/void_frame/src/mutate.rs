//! Mutable access to a frame
//!
//! Every method that changes the local state notifies the frame's observers
//! exactly once, after the change, before returning.

use std::rc::Rc;

use void_math::{Mat4, Quat, Vec3};

use crate::constraint::Constraint;
use crate::error::{FrameError, Result};
use crate::frame::Frame;
use crate::graph::{FrameGraph, FrameId};
use crate::observer::{FrameObserver, ObserverId};
use crate::view::FrameRef;

/// Exclusive handle on one live frame of a [`FrameGraph`]
pub struct FrameMut<'g> {
    pub(crate) graph: &'g mut FrameGraph,
    pub(crate) id: FrameId,
}

impl<'g> FrameMut<'g> {
    #[inline]
    pub fn id(&self) -> FrameId {
        self.id
    }

    /// Read-only view, for world-space queries
    pub fn view(&self) -> FrameRef<'_> {
        FrameRef {
            graph: &*self.graph,
            id: self.id,
            frame: self.frame(),
        }
    }

    #[inline]
    pub fn frame(&self) -> &Frame {
        &self.graph.nodes[self.id].frame
    }

    #[inline]
    pub fn translation(&self) -> Vec3 {
        self.frame().translation
    }

    #[inline]
    pub fn rotation(&self) -> Quat {
        self.frame().rotation
    }

    fn store(&mut self, translation: Vec3, rotation: Quat) {
        let frame = &mut self.graph.nodes[self.id].frame;
        frame.translation = translation;
        frame.rotation = rotation.normalize();
        self.graph.notify(self.id);
    }

    fn constraint(&self) -> Option<Rc<dyn Constraint>> {
        self.frame().constraint.clone()
    }

    /// Run a translation delta (reference coordinates) through the constraint
    pub fn constrained_translation(&self, delta: Vec3) -> Vec3 {
        match self.constraint() {
            Some(constraint) => constraint.constrain_translation(delta, &self.view()),
            None => delta,
        }
    }

    /// Run a rotation delta (local coordinates) through the constraint
    pub fn constrained_rotation(&self, delta: Quat) -> Quat {
        match self.constraint() {
            Some(constraint) => constraint.constrain_rotation(delta, &self.view()),
            None => delta,
        }
    }

    pub fn set_translation(&mut self, translation: Vec3) {
        let rotation = self.rotation();
        self.store(translation, rotation);
    }

    pub fn set_rotation(&mut self, rotation: Quat) {
        let translation = self.translation();
        self.store(translation, rotation);
    }

    /// Set both local components with a single notification
    pub fn set_translation_and_rotation(&mut self, translation: Vec3, rotation: Quat) {
        self.store(translation, rotation);
    }

    /// Move towards `translation`, filtered by the constraint. Returns the
    /// translation actually reached.
    pub fn set_translation_with_constraint(&mut self, translation: Vec3) -> Vec3 {
        let current = self.translation();
        let reached = current + self.constrained_translation(translation - current);
        self.set_translation(reached);
        reached
    }

    /// Turn towards `rotation`, filtered by the constraint. Returns the
    /// rotation actually reached.
    pub fn set_rotation_with_constraint(&mut self, rotation: Quat) -> Quat {
        let current = self.rotation();
        let delta = self.constrained_rotation(current.inverse() * rotation);
        let reached = (current * delta).normalize();
        self.set_rotation(reached);
        reached
    }

    pub fn set_translation_and_rotation_with_constraint(
        &mut self,
        translation: Vec3,
        rotation: Quat,
    ) -> (Vec3, Quat) {
        let current_translation = self.translation();
        let current_rotation = self.rotation();
        let translation =
            current_translation + self.constrained_translation(translation - current_translation);
        let delta = self.constrained_rotation(current_rotation.inverse() * rotation);
        let rotation = (current_rotation * delta).normalize();
        self.store(translation, rotation);
        (translation, rotation)
    }

    /// Place the origin at a world position
    pub fn set_position(&mut self, position: Vec3) {
        let translation = self.view().reference_coordinates_of(position);
        self.set_translation(translation);
    }

    pub fn set_position_with_constraint(&mut self, position: Vec3) -> Vec3 {
        let translation = self.view().reference_coordinates_of(position);
        self.set_translation_with_constraint(translation);
        self.view().position()
    }

    /// Set the world orientation
    pub fn set_orientation(&mut self, orientation: Quat) {
        let rotation = self.view().reference_orientation().inverse() * orientation;
        self.set_rotation(rotation);
    }

    pub fn set_orientation_with_constraint(&mut self, orientation: Quat) -> Quat {
        let rotation = self.view().reference_orientation().inverse() * orientation;
        self.set_rotation_with_constraint(rotation);
        self.view().orientation()
    }

    /// Set the world pose with a single notification
    pub fn set_position_and_orientation(&mut self, position: Vec3, orientation: Quat) {
        let view = self.view();
        let translation = view.reference_coordinates_of(position);
        let rotation = view.reference_orientation().inverse() * orientation;
        self.store(translation, rotation);
    }

    pub fn set_position_and_orientation_with_constraint(&mut self, position: Vec3, orientation: Quat) {
        let view = self.view();
        let translation = view.reference_coordinates_of(position);
        let rotation = view.reference_orientation().inverse() * orientation;
        self.set_translation_and_rotation_with_constraint(translation, rotation);
    }

    /// Set local state from a rigid 4x4 matrix (reference coordinates).
    /// The matrix is divided by its bottom-right element.
    pub fn set_from_matrix(&mut self, matrix: &Mat4) {
        let w = matrix.cols[3].w;
        if w.abs() <= f32::EPSILON {
            log::warn!("Ignoring frame matrix with null homogeneous coordinate");
            return;
        }
        let translation = matrix.get_translation();
        let rotation = Quat::from_rotation_matrix(matrix);
        self.store(translation, rotation);
    }

    /// Whether `candidate` as reference frame would close a loop
    pub fn setting_as_reference_frame_will_create_a_loop(&self, candidate: FrameId) -> bool {
        self.graph.would_create_loop(self.id, candidate)
    }

    /// Change the reference frame. Local translation and rotation are kept,
    /// so the world pose follows the new reference.
    pub fn set_reference_frame(&mut self, reference: Option<FrameId>) -> Result<()> {
        if let Some(candidate) = reference {
            if !self.graph.contains(candidate) {
                return Err(FrameError::StaleFrame(candidate));
            }
            if self.setting_as_reference_frame_will_create_a_loop(candidate) {
                log::debug!(
                    "Rejected {} as reference of frame {}: would create a loop",
                    candidate,
                    self.id
                );
                return Err(FrameError::HierarchyCycle {
                    frame: self.id,
                    reference: candidate,
                });
            }
        }

        let frame = &mut self.graph.nodes[self.id].frame;
        if frame.reference == reference {
            return Ok(());
        }
        frame.reference = reference;
        log::debug!("Frame {} now references {:?}", self.id, reference);
        self.graph.notify(self.id);
        Ok(())
    }

    /// Replace the constraint. Does not notify.
    pub fn set_constraint(&mut self, constraint: Option<Rc<dyn Constraint>>) {
        self.graph.nodes[self.id].frame.constraint = constraint;
    }

    /// Translate by `delta` (reference coordinates), through the constraint.
    /// Returns the delta actually applied.
    pub fn translate(&mut self, delta: Vec3) -> Vec3 {
        let applied = self.constrained_translation(delta);
        let translation = self.translation() + applied;
        self.set_translation(translation);
        applied
    }

    /// Translate by a world-space vector
    pub fn translate_world(&mut self, delta: Vec3) -> Vec3 {
        let delta = self.view().reference_transform_of(delta);
        self.translate(delta)
    }

    /// Rotate by `delta` (local coordinates), through the constraint.
    /// Returns the rotation actually applied.
    pub fn rotate(&mut self, delta: Quat) -> Quat {
        let applied = self.constrained_rotation(delta);
        let rotation = (self.rotation() * applied).normalize();
        self.set_rotation(rotation);
        applied
    }

    /// Rotate by `delta` (local coordinates) about a world-space point.
    ///
    /// The origin orbits `point`; both the rotation and the induced
    /// translation go through the constraint.
    pub fn rotate_around_point(&mut self, delta: Quat, point: Vec3) {
        let delta = self.constrained_rotation(delta);
        let view = self.view();
        let orientation = view.orientation();
        let world_delta = orientation * delta * orientation.inverse();
        let position = point + world_delta.rotate(view.position() - point);
        let target = view.reference_coordinates_of(position);

        let current = self.translation();
        let translation = current + self.constrained_translation(target - current);
        let rotation = self.rotation() * delta;
        self.store(translation, rotation);
    }

    /// Rotate by a world-space rotation, through the constraint
    fn rotate_world(&mut self, world_delta: Quat) {
        let orientation = self.view().orientation();
        self.rotate(orientation.inverse() * world_delta * orientation);
    }

    /// Snap the axes onto the closest axes of `other` (`None` is world).
    ///
    /// The best matching axis pair is aligned first when the absolute cosine
    /// between them is at least `threshold`, then a second pair under the
    /// same test. With `move_origin`, the frame is also translated so that
    /// `other`'s origin keeps its coordinates in this frame.
    pub fn align_with_frame(
        &mut self,
        other: Option<FrameId>,
        move_origin: bool,
        threshold: f32,
    ) -> Result<()> {
        let (targets, center) = match other {
            Some(id) => {
                let other = self.graph.get(id)?;
                (Vec3::AXES.map(|axis| other.inverse_transform_of(axis)), other.position())
            }
            None => (Vec3::AXES, Vec3::ZERO),
        };
        let local_center = self.view().coordinates_of(center);

        let own = {
            let view = self.view();
            Vec3::AXES.map(|axis| view.inverse_transform_of(axis))
        };
        let mut best = (0, 0, 0.0_f32);
        for (i, target) in targets.iter().enumerate() {
            for (j, axis) in own.iter().enumerate() {
                let cos = target.dot(*axis);
                if cos.abs() >= best.2.abs() {
                    best = (i, j, cos);
                }
            }
        }

        let (target, axis, cos) = best;
        if cos.abs() >= threshold {
            let direction = if cos >= 0.0 { targets[target] } else { -targets[target] };
            self.rotate_world(Quat::from_rotation_arc(own[axis], direction));

            let second = self.view().inverse_transform_of(Vec3::AXES[(axis + 1) % 3]);
            let mut best = (0, 0.0_f32);
            for (i, target) in targets.iter().enumerate() {
                let cos = target.dot(second);
                if cos.abs() >= best.1.abs() {
                    best = (i, cos);
                }
            }
            let (target, cos) = best;
            if cos.abs() >= threshold {
                let direction = if cos >= 0.0 { targets[target] } else { -targets[target] };
                self.rotate_world(Quat::from_rotation_arc(second, direction));
            }
        }

        if move_origin {
            let view = self.view();
            let position = center - view.orientation().rotate(local_center);
            let delta = view.reference_coordinates_of(position) - view.translation();
            self.translate(delta);
        }
        Ok(())
    }

    /// Move the origin onto the line through `origin` along `direction`
    /// (world coordinates), by the shortest displacement.
    pub fn project_on_line(&mut self, origin: Vec3, direction: Vec3) {
        let shift = origin - self.view().position();
        let world_delta = shift.project_on_plane(direction);
        self.translate_world(world_delta);
    }

    /// Register an observer. Observers are called in registration order.
    pub fn add_observer(&mut self, observer: impl FrameObserver + 'static) -> ObserverId {
        let id = ObserverId(self.graph.next_observer_id);
        self.graph.next_observer_id += 1;
        self.graph.nodes[self.id].observers.push(id, Box::new(observer));
        id
    }

    /// Register a closure observer
    pub fn observe<F>(&mut self, callback: F) -> ObserverId
    where
        F: FnMut(FrameRef<'_>) + 'static,
    {
        self.add_observer(callback)
    }

    pub fn remove_observer(&mut self, observer: ObserverId) -> Result<()> {
        if self.graph.nodes[self.id].observers.remove(observer) {
            Ok(())
        } else {
            Err(FrameError::UnknownObserver(observer))
        }
    }
}

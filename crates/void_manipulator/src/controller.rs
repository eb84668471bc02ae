//! Pointer-driven interaction state machine
//!
//! An [`InteractionController`] drives one frame of a [`FrameGraph`] from
//! pointer gestures. Motions are computed in the camera's screen space and
//! applied through [`RigidTransformNode`], so the frame's constraint filters
//! every step. A rotation released with enough angular speed keeps spinning
//! and decays geometrically on each [`InteractionController::tick`].
//!
//! When the driven frame is the camera's own frame, gestures move the camera
//! so the scene appears to follow the pointer.

use void_frame::{FrameGraph, FrameId, RigidTransformNode};
use void_math::{Quat, Vec2, Vec3};

use crate::camera::{Camera, Projection};
use crate::config::{validate_damping, ManipulationConfig};
use crate::error::Result;
use crate::input::{MouseAction, PointerEvent};
use crate::trackball::deformed_ball_quaternion;

/// Wheel notch to drag-distance ratio
const WHEEL_STEP: f32 = 0.1;

/// Where rotation gestures are centered
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InteractionPolicy {
    /// Rotate about the frame's own origin
    #[default]
    OriginRelative,
    /// Orbit the camera's pivot point
    PivotRelative,
}

/// Interaction state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InteractionState {
    #[default]
    Idle,
    Rotating,
    Translating,
    /// Dolly along the viewing axis
    Zooming,
    /// Released rotation still moving
    Spinning,
}

impl InteractionState {
    fn for_action(action: MouseAction) -> Self {
        match action {
            MouseAction::Rotate
            | MouseAction::ScreenRotate
            | MouseAction::LookAround
            | MouseAction::Roll => InteractionState::Rotating,
            MouseAction::Translate | MouseAction::MoveForward | MouseAction::MoveBackward => {
                InteractionState::Translating
            }
            MouseAction::Zoom => InteractionState::Zooming,
        }
    }
}

/// Incremental rotation recorded during a drag, in frame coordinates
#[derive(Clone, Copy, Debug)]
struct RotationSample {
    axis: Vec3,
    angle: f32,
    /// Clock time elapsed since the previous sample
    interval: f32,
}

/// Drives a frame from pointer input
#[derive(Debug, Clone)]
pub struct InteractionController {
    frame: FrameId,
    policy: InteractionPolicy,
    config: ManipulationConfig,
    state: InteractionState,
    action: Option<MouseAction>,
    pointer: Vec2,
    clock: f32,
    sample_time: f32,
    last_sample: Option<RotationSample>,
    spin_axis: Vec3,
    spin_speed: f32,
}

impl InteractionController {
    pub fn new(frame: FrameId, policy: InteractionPolicy, config: ManipulationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            frame,
            policy,
            config,
            state: InteractionState::Idle,
            action: None,
            pointer: Vec2::ZERO,
            clock: 0.0,
            sample_time: 0.0,
            last_sample: None,
            spin_axis: Vec3::Y,
            spin_speed: 0.0,
        })
    }

    /// Controller that orbits `camera` around its pivot
    pub fn for_camera(camera: &Camera, config: ManipulationConfig) -> Result<Self> {
        Self::new(camera.frame(), InteractionPolicy::PivotRelative, config)
    }

    #[inline]
    pub fn frame(&self) -> FrameId {
        self.frame
    }

    #[inline]
    pub fn policy(&self) -> InteractionPolicy {
        self.policy
    }

    #[inline]
    pub fn state(&self) -> InteractionState {
        self.state
    }

    /// Gesture in progress, if any
    #[inline]
    pub fn action(&self) -> Option<MouseAction> {
        self.action
    }

    /// Current spin speed in rad/s (zero unless spinning)
    #[inline]
    pub fn spin_speed(&self) -> f32 {
        self.spin_speed
    }

    /// Spin axis in frame coordinates
    #[inline]
    pub fn spin_axis(&self) -> Vec3 {
        self.spin_axis
    }

    #[inline]
    pub fn config(&self) -> &ManipulationConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ManipulationConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Per-tick spin decay factor, in [0, 1)
    pub fn set_damping(&mut self, damping: f32) -> Result<()> {
        validate_damping(damping)?;
        self.config.damping = damping;
        Ok(())
    }

    fn set_state(&mut self, state: InteractionState) {
        if self.state != state {
            log::trace!("Interaction on {}: {:?} -> {:?}", self.frame, self.state, state);
            self.state = state;
        }
    }

    fn drives_camera(&self, camera: &Camera) -> bool {
        self.frame == camera.frame()
    }

    /// Point rotations and depth scaling are centered on
    fn anchor(&self, graph: &FrameGraph, camera: &Camera) -> Result<Vec3> {
        if self.policy == InteractionPolicy::PivotRelative || self.drives_camera(camera) {
            Ok(camera.pivot_point())
        } else {
            Ok(graph.get(self.frame)?.position())
        }
    }

    // ---- Gestures ----

    /// Begin a gesture at `position`. Any spin is discarded.
    pub fn start_action(&mut self, action: MouseAction, position: Vec2) {
        self.spin_speed = 0.0;
        self.action = Some(action);
        self.pointer = position;
        self.sample_time = self.clock;
        self.last_sample = None;
        self.set_state(InteractionState::for_action(action));
    }

    /// Apply the motion between the previous pointer position and `position`
    pub fn update_action(&mut self, graph: &mut FrameGraph, camera: &Camera, position: Vec2) -> Result<()> {
        let action = match self.action {
            Some(action) => action,
            None => return Ok(()),
        };
        let previous = self.pointer;
        self.pointer = position;

        match action {
            MouseAction::Rotate => {
                let center = self.screen_anchor(graph, camera)?;
                let rotation = deformed_ball_quaternion(
                    previous,
                    position,
                    center,
                    camera.screen_size(),
                    self.config.rotation_sensitivity,
                );
                self.apply_scene_rotation(graph, camera, rotation)
            }
            MouseAction::ScreenRotate => {
                let center = self.screen_anchor(graph, camera)?;
                let before = (center.y - previous.y).atan2(previous.x - center.x);
                let after = (center.y - position.y).atan2(position.x - center.x);
                let angle = wrap_angle(after - before) * self.config.rotation_sensitivity;
                self.apply_scene_rotation(graph, camera, Quat::from_axis_angle(Vec3::Z, angle))
            }
            MouseAction::Translate => self.pan(graph, camera, position - previous),
            MouseAction::Zoom => {
                let coefficient = self.zoom_coefficient(graph, camera)?;
                let amount = coefficient * (position.y - previous.y) / camera.screen_height() as f32
                    * self.config.zoom_sensitivity;
                self.dolly(graph, camera, amount)
            }
            MouseAction::LookAround | MouseAction::MoveForward | MouseAction::MoveBackward => {
                self.look_around(graph, camera, previous, position)
            }
            MouseAction::Roll => {
                let angle = core::f32::consts::PI * (position.x - previous.x)
                    / camera.screen_width() as f32
                    * self.config.rotation_sensitivity;
                graph
                    .frame_mut(self.frame)?
                    .rotate(Quat::from_axis_angle(Vec3::Z, angle));
                Ok(())
            }
        }
    }

    /// End the gesture, deciding on spin from the sampled velocity
    pub fn stop_action(&mut self) {
        self.stop_action_with_velocity(None);
    }

    /// End the gesture. A measured angular `velocity` (rad/s) overrides the
    /// sampled one; `Some(0.0)` ends without spin.
    pub fn stop_action_with_velocity(&mut self, velocity: Option<f32>) {
        let spins = matches!(self.action, Some(MouseAction::Rotate | MouseAction::ScreenRotate));
        self.action = None;
        let sample = self.last_sample.take();
        self.set_state(InteractionState::Idle);

        let sample = match sample {
            Some(sample) if spins => sample,
            _ => return,
        };

        let speed = match velocity {
            Some(velocity) => velocity,
            None => {
                if self.clock - self.sample_time > self.config.release_window {
                    return;
                }
                let interval = if sample.interval > 0.0 {
                    sample.interval
                } else {
                    self.config.nominal_sample_interval
                };
                sample.angle / interval
            }
        };

        let (axis, speed) = if speed < 0.0 { (-sample.axis, -speed) } else { (sample.axis, speed) };
        if speed > self.config.spin_start_threshold {
            self.spin_axis = axis;
            self.spin_speed = speed;
            log::trace!("Spin on {} at {:.3} rad/s", self.frame, speed);
            self.set_state(InteractionState::Spinning);
        }
    }

    /// Advance the internal clock by `dt` seconds, running spin and fly
    /// motion. Non-positive steps are ignored.
    pub fn tick(&mut self, graph: &mut FrameGraph, camera: &Camera, dt: f32) -> Result<()> {
        if !(dt > 0.0) {
            return Ok(());
        }
        self.clock += dt;

        match (self.state, self.action) {
            (InteractionState::Spinning, _) => self.spin(graph, camera, dt),
            (_, Some(MouseAction::MoveForward)) => self.fly(graph, camera, -dt),
            (_, Some(MouseAction::MoveBackward)) => self.fly(graph, camera, dt),
            _ => Ok(()),
        }
    }

    /// Dolly by wheel notches; positive brings the scene closer
    pub fn wheel(&mut self, graph: &mut FrameGraph, camera: &Camera, delta: f32) -> Result<()> {
        let coefficient = self.zoom_coefficient(graph, camera)?;
        let amount = coefficient * delta * self.config.wheel_sensitivity * WHEEL_STEP;
        self.dolly(graph, camera, amount)
    }

    /// Dispatch a pointer event through the configured bindings
    pub fn handle_event(&mut self, graph: &mut FrameGraph, camera: &Camera, event: PointerEvent) -> Result<()> {
        match event {
            PointerEvent::Pressed { button, position } => {
                if let Some(action) = self.config.bindings.action_for(button) {
                    self.start_action(action, position);
                }
                Ok(())
            }
            PointerEvent::Moved { position } => self.update_action(graph, camera, position),
            PointerEvent::Released { position, velocity } => {
                if self.action.is_some() && position != self.pointer {
                    self.update_action(graph, camera, position)?;
                }
                self.stop_action_with_velocity(velocity);
                Ok(())
            }
            PointerEvent::Wheel { delta } => self.wheel(graph, camera, delta),
        }
    }

    // ---- Motions ----

    fn screen_anchor(&self, graph: &FrameGraph, camera: &Camera) -> Result<Vec2> {
        let projected = camera.projected_coordinates_of(graph, self.anchor(graph, camera)?)?;
        Ok(Vec2::new(projected.x, projected.y))
    }

    fn zoom_coefficient(&self, graph: &FrameGraph, camera: &Camera) -> Result<f32> {
        let depth = camera.depth_of(graph, self.anchor(graph, camera)?)?;
        Ok(depth.max(0.2 * camera.scene_radius()))
    }

    /// Apply a rotation the scene should appear to make, given in camera
    /// coordinates, and record it for spin
    fn apply_scene_rotation(&mut self, graph: &mut FrameGraph, camera: &Camera, rotation: Quat) -> Result<()> {
        let (axis, mut angle) = rotation.to_axis_angle();
        if angle.abs() <= f32::EPSILON {
            return Ok(());
        }
        if self.drives_camera(camera) {
            angle = -angle;
        }
        let world_axis = camera.inverse_transform_of(graph, axis)?;
        let pivot = camera.pivot_point();

        let mut frame = graph.frame_mut(self.frame)?;
        let local_axis = frame.transform_of(world_axis).normalize_or_zero();
        apply_rotation(&mut frame, self.policy, Quat::from_axis_angle(local_axis, angle), pivot);

        let (axis, angle) = if angle < 0.0 { (-local_axis, -angle) } else { (local_axis, angle) };
        self.last_sample = Some(RotationSample {
            axis,
            angle,
            interval: self.clock - self.sample_time,
        });
        self.sample_time = self.clock;
        Ok(())
    }

    /// Translate in the camera plane so the scene point at the anchor's depth
    /// follows the pointer. The anchor keeps its depth along the view axis,
    /// not its straight-line distance to the camera.
    fn pan(&mut self, graph: &mut FrameGraph, camera: &Camera, delta: Vec2) -> Result<()> {
        let screen = camera.screen_size();
        let mut translation = Vec3::new(delta.x, -delta.y, 0.0);
        match camera.projection() {
            Projection::Perspective => {
                let depth = camera.depth_of(graph, self.anchor(graph, camera)?)?;
                translation *= 2.0 * (camera.field_of_view() / 2.0).tan() * depth / screen.y;
            }
            Projection::Orthographic => {
                let (w, h) = camera.ortho_width_height(graph)?;
                translation.x *= 2.0 * w / screen.x;
                translation.y *= 2.0 * h / screen.y;
            }
        }
        translation *= self.config.translation_sensitivity;
        if self.drives_camera(camera) {
            translation = -translation;
        }
        let world = camera.inverse_transform_of(graph, translation)?;
        graph.frame_mut(self.frame)?.translate_world(world);
        Ok(())
    }

    /// Bring the scene `amount` closer along the viewing axis
    fn dolly(&mut self, graph: &mut FrameGraph, camera: &Camera, amount: f32) -> Result<()> {
        if amount == 0.0 || !amount.is_finite() {
            return Ok(());
        }
        let driving_camera = self.drives_camera(camera);

        let world = if driving_camera && self.config.zoom_on_pivot {
            let to_pivot = camera.pivot_point() - camera.position(graph)?;
            let distance = to_pivot.length();
            if amount > 0.0 && distance - amount < 0.02 * camera.scene_radius() {
                return Ok(());
            }
            to_pivot.normalize_or_zero() * amount
        } else {
            let translation = Vec3::new(0.0, 0.0, amount);
            let translation = if driving_camera { -translation } else { translation };
            camera.inverse_transform_of(graph, translation)?
        };

        graph.frame_mut(self.frame)?.translate_world(world);
        Ok(())
    }

    /// Yaw about the scene up vector and pitch about the frame's X axis
    fn look_around(&mut self, graph: &mut FrameGraph, camera: &Camera, previous: Vec2, position: Vec2) -> Result<()> {
        let screen = camera.screen_size();
        let gain = core::f32::consts::PI * self.config.rotation_sensitivity;
        let yaw = gain * (previous.x - position.x) / screen.x;
        let pitch = gain * (previous.y - position.y) / screen.y;

        let mut frame = graph.frame_mut(self.frame)?;
        let up = frame.transform_of(camera.scene_up_vector());
        let rotation = Quat::from_axis_angle(up, yaw) * Quat::from_axis_angle(Vec3::X, pitch);
        frame.rotate(rotation);
        Ok(())
    }

    /// Move along the frame's Z axis; negative `direction` goes forward
    fn fly(&mut self, graph: &mut FrameGraph, camera: &Camera, direction: f32) -> Result<()> {
        let distance = self.config.fly_speed * camera.scene_radius() * direction;
        let mut frame = graph.frame_mut(self.frame)?;
        let world = frame.inverse_transform_of(Vec3::new(0.0, 0.0, distance));
        frame.translate_world(world);
        Ok(())
    }

    fn spin(&mut self, graph: &mut FrameGraph, camera: &Camera, dt: f32) -> Result<()> {
        let delta = Quat::from_axis_angle(self.spin_axis, self.spin_speed * dt);
        {
            let mut frame = graph.frame_mut(self.frame)?;
            apply_rotation(&mut frame, self.policy, delta, camera.pivot_point());
        }

        self.spin_speed *= self.config.damping;
        if self.spin_speed < self.config.spin_stop_threshold {
            self.spin_speed = 0.0;
            log::trace!("Spin on {} settled", self.frame);
            self.set_state(InteractionState::Idle);
        }
        Ok(())
    }
}

fn apply_rotation(node: &mut impl RigidTransformNode, policy: InteractionPolicy, delta: Quat, pivot: Vec3) {
    match policy {
        InteractionPolicy::OriginRelative => {
            node.rotate(delta);
        }
        InteractionPolicy::PivotRelative => node.rotate_around_point(delta, pivot),
    }
}

/// Wrap into (-π, π]
fn wrap_angle(angle: f32) -> f32 {
    use core::f32::consts::{PI, TAU};
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use void_frame::Frame;

    fn scene() -> (FrameGraph, Camera, FrameId) {
        let mut graph = FrameGraph::new();
        let camera = Camera::new(&mut graph).unwrap();
        camera.set_position(&mut graph, Vec3::new(0.0, 0.0, 5.0)).unwrap();
        let object = graph.insert(Frame::identity()).unwrap();
        (graph, camera, object)
    }

    #[test]
    fn test_wrap_angle() {
        use core::f32::consts::PI;
        assert_abs_diff_eq!(wrap_angle(0.5), 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(wrap_angle(2.0 * PI - 0.1), -0.1, epsilon = 1e-5);
        assert_abs_diff_eq!(wrap_angle(-2.0 * PI + 0.1), 0.1, epsilon = 1e-5);
    }

    #[test]
    fn test_states_follow_actions() {
        let (_, _, object) = scene();
        let mut controller =
            InteractionController::new(object, InteractionPolicy::OriginRelative, ManipulationConfig::default())
                .unwrap();
        assert_eq!(controller.state(), InteractionState::Idle);

        controller.start_action(MouseAction::Translate, Vec2::new(10.0, 10.0));
        assert_eq!(controller.state(), InteractionState::Translating);
        controller.start_action(MouseAction::Zoom, Vec2::new(10.0, 10.0));
        assert_eq!(controller.state(), InteractionState::Zooming);
        controller.stop_action();
        assert_eq!(controller.state(), InteractionState::Idle);
        assert_eq!(controller.action(), None);
    }

    #[test]
    fn test_object_follows_horizontal_drag() {
        let (mut graph, camera, object) = scene();
        let mut controller =
            InteractionController::new(object, InteractionPolicy::OriginRelative, ManipulationConfig::default())
                .unwrap();

        controller.start_action(MouseAction::Rotate, Vec2::new(300.0, 200.0));
        controller
            .update_action(&mut graph, &camera, Vec2::new(330.0, 200.0))
            .unwrap();

        // The object's front turns towards the pointer
        let front = graph.get(object).unwrap().inverse_transform_of(Vec3::Z);
        assert!(front.x > 0.0);
        assert_eq!(graph.get(object).unwrap().position(), Vec3::ZERO);
    }

    #[test]
    fn test_camera_pan_moves_against_pointer() {
        let (mut graph, camera, _) = scene();
        let mut controller = InteractionController::for_camera(&camera, ManipulationConfig::default()).unwrap();

        controller.start_action(MouseAction::Translate, Vec2::new(300.0, 200.0));
        controller
            .update_action(&mut graph, &camera, Vec2::new(360.0, 200.0))
            .unwrap();

        let position = camera.position(&graph).unwrap();
        assert!(position.x < 0.0);
        assert_abs_diff_eq!(position.z, 5.0, epsilon = 1e-5);

        // Pivot still projects under the point that was grabbed
        let pivot = camera.projected_coordinates_of(&graph, Vec3::ZERO).unwrap();
        assert_abs_diff_eq!(pivot.x, 360.0, epsilon = 0.1);
    }

    #[test]
    fn test_camera_pan_keeps_anchor_depth() {
        let (mut graph, camera, _) = scene();
        let mut controller = InteractionController::for_camera(&camera, ManipulationConfig::default()).unwrap();

        controller.start_action(MouseAction::Translate, Vec2::new(300.0, 200.0));
        for step in 1..=4 {
            let position = Vec2::new(300.0 + 40.0 * step as f32, 200.0 - 30.0 * step as f32);
            controller.update_action(&mut graph, &camera, position).unwrap();
            assert_abs_diff_eq!(camera.depth_of(&graph, Vec3::ZERO).unwrap(), 5.0, epsilon = 1e-4);
        }

        // Off-axis now, so the straight-line distance has grown
        let distance = camera.position(&graph).unwrap().length();
        assert!(distance > 5.0 + 1e-3);
    }

    #[test]
    fn test_wheel_brings_scene_closer() {
        let (mut graph, camera, _) = scene();
        let mut controller = InteractionController::for_camera(&camera, ManipulationConfig::default()).unwrap();

        controller.wheel(&mut graph, &camera, 1.0).unwrap();
        assert_abs_diff_eq!(camera.position(&graph).unwrap().z, 4.5, epsilon = 1e-4);
    }

    #[test]
    fn test_zoom_on_pivot_stops_short() {
        let (mut graph, mut camera, _) = scene();
        camera.set_pivot_point(Vec3::new(0.0, 0.0, 4.9));
        let config = ManipulationConfig::default().with_zoom_on_pivot(true);
        let mut controller = InteractionController::for_camera(&camera, config).unwrap();

        controller.wheel(&mut graph, &camera, 10.0).unwrap();
        assert_eq!(camera.position(&graph).unwrap(), Vec3::new(0.0, 0.0, 5.0));
    }

    #[test]
    fn test_fly_moves_while_held() {
        let (mut graph, camera, _) = scene();
        let mut controller = InteractionController::for_camera(&camera, ManipulationConfig::fly()).unwrap();

        controller.start_action(MouseAction::MoveForward, Vec2::new(300.0, 200.0));
        controller.tick(&mut graph, &camera, 0.5).unwrap();
        assert_abs_diff_eq!(camera.position(&graph).unwrap().z, 4.5, epsilon = 1e-5);

        controller.stop_action();
        controller.tick(&mut graph, &camera, 0.5).unwrap();
        assert_abs_diff_eq!(camera.position(&graph).unwrap().z, 4.5, epsilon = 1e-5);
    }

    #[test]
    fn test_stale_release_does_not_spin() {
        let (mut graph, camera, object) = scene();
        let mut controller =
            InteractionController::new(object, InteractionPolicy::OriginRelative, ManipulationConfig::default())
                .unwrap();

        controller.start_action(MouseAction::Rotate, Vec2::new(300.0, 200.0));
        controller
            .update_action(&mut graph, &camera, Vec2::new(340.0, 200.0))
            .unwrap();
        // Pointer held still past the release window
        controller.tick(&mut graph, &camera, 0.5).unwrap();
        controller.stop_action();
        assert_eq!(controller.state(), InteractionState::Idle);
    }
}

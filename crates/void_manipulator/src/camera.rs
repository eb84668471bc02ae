//! Camera: a frame in the graph plus projection intrinsics
//!
//! The camera looks down its frame's local -Z axis with +Y up. Matrices are
//! recomputed on demand from the frame and the intrinsics; nothing is cached.
//!
//! # Example
//!
//! ```ignore
//! let mut graph = FrameGraph::new();
//! let mut camera = Camera::new(&mut graph)?;
//! camera.set_scene_radius(10.0);
//! camera.show_entire_scene(&mut graph)?;
//! let view_projection = camera.view_projection_matrix(&graph)?;
//! ```

use serde::{Deserialize, Serialize};
use void_frame::{Frame, FrameGraph, FrameId, FrameRef};
use void_math::{Mat4, Quat, Vec2, Vec3};

use crate::error::{ManipulatorError, Result};

/// Camera projection mode
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Projection {
    #[default]
    Perspective,
    /// Orthographic, sized so the pivot plane matches the perspective view
    Orthographic,
}

/// Near and far clipping distances
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum ClipPlanes {
    /// Derived from the scene sphere every time they are queried
    #[default]
    SceneFitted,
    Fixed { near: f32, far: f32 },
}

/// Viewpoint driven through a frame of a [`FrameGraph`]
#[derive(Debug, Clone)]
pub struct Camera {
    frame: FrameId,
    projection: Projection,
    /// Vertical field of view in radians
    field_of_view: f32,
    screen_width: u32,
    screen_height: u32,
    clip_planes: ClipPlanes,
    scene_center: Vec3,
    scene_radius: f32,
    scene_up: Vec3,
    pivot: Vec3,
    z_clipping_coefficient: f32,
    z_near_coefficient: f32,
}

impl Camera {
    /// Create a camera on a new root frame, framing the default unit scene
    pub fn new(graph: &mut FrameGraph) -> Result<Self> {
        let frame = graph.insert(Frame::identity())?;
        let camera = Self::with_frame(graph, frame)?;
        camera.show_entire_scene(graph)?;
        Ok(camera)
    }

    /// Wrap an existing frame without moving it
    pub fn with_frame(graph: &FrameGraph, frame: FrameId) -> Result<Self> {
        graph.get(frame)?;
        Ok(Self {
            frame,
            projection: Projection::Perspective,
            field_of_view: core::f32::consts::FRAC_PI_4,
            screen_width: 600,
            screen_height: 400,
            clip_planes: ClipPlanes::SceneFitted,
            scene_center: Vec3::ZERO,
            scene_radius: 1.0,
            scene_up: Vec3::Y,
            pivot: Vec3::ZERO,
            z_clipping_coefficient: 3.0_f32.sqrt(),
            z_near_coefficient: 0.005,
        })
    }

    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    pub fn with_field_of_view(mut self, field_of_view: f32) -> Self {
        self.set_field_of_view(field_of_view);
        self
    }

    pub fn with_screen_size(mut self, width: u32, height: u32) -> Self {
        self.set_screen_width_and_height(width, height);
        self
    }

    pub fn with_clip_planes(mut self, clip_planes: ClipPlanes) -> Self {
        self.clip_planes = clip_planes;
        self
    }

    #[inline]
    pub fn frame(&self) -> FrameId {
        self.frame
    }

    fn view<'g>(&self, graph: &'g FrameGraph) -> Result<FrameRef<'g>> {
        Ok(graph.get(self.frame)?)
    }

    // ---- Intrinsics ----

    #[inline]
    pub fn projection(&self) -> Projection {
        self.projection
    }

    pub fn set_projection(&mut self, projection: Projection) {
        self.projection = projection;
    }

    #[inline]
    pub fn field_of_view(&self) -> f32 {
        self.field_of_view
    }

    /// Set the vertical field of view, clamped to (0, π)
    pub fn set_field_of_view(&mut self, field_of_view: f32) {
        self.field_of_view = field_of_view.clamp(1e-3, core::f32::consts::PI - 1e-3);
    }

    pub fn horizontal_field_of_view(&self) -> f32 {
        2.0 * ((self.field_of_view / 2.0).tan() * self.aspect_ratio()).atan()
    }

    /// Set the vertical field of view from a horizontal one
    pub fn set_horizontal_field_of_view(&mut self, horizontal: f32) {
        let vertical = 2.0 * ((horizontal / 2.0).tan() / self.aspect_ratio()).atan();
        self.set_field_of_view(vertical);
    }

    #[inline]
    pub fn screen_width(&self) -> u32 {
        self.screen_width
    }

    #[inline]
    pub fn screen_height(&self) -> u32 {
        self.screen_height
    }

    /// Screen size in pixels
    pub fn screen_size(&self) -> Vec2 {
        Vec2::new(self.screen_width as f32, self.screen_height as f32)
    }

    /// Null sizes are raised to one pixel
    pub fn set_screen_width_and_height(&mut self, width: u32, height: u32) {
        self.screen_width = width.max(1);
        self.screen_height = height.max(1);
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.screen_width as f32 / self.screen_height as f32
    }

    #[inline]
    pub fn clip_planes(&self) -> ClipPlanes {
        self.clip_planes
    }

    pub fn set_clip_planes(&mut self, clip_planes: ClipPlanes) {
        self.clip_planes = clip_planes;
    }

    pub fn set_z_clipping_coefficient(&mut self, coefficient: f32) {
        self.z_clipping_coefficient = coefficient;
    }

    pub fn set_z_near_coefficient(&mut self, coefficient: f32) {
        self.z_near_coefficient = coefficient;
    }

    // ---- Scene ----

    #[inline]
    pub fn scene_center(&self) -> Vec3 {
        self.scene_center
    }

    pub fn set_scene_center(&mut self, center: Vec3) {
        self.scene_center = center;
    }

    #[inline]
    pub fn scene_radius(&self) -> f32 {
        self.scene_radius
    }

    /// Non-positive radii are ignored
    pub fn set_scene_radius(&mut self, radius: f32) {
        if radius <= 0.0 || !radius.is_finite() {
            log::warn!("Ignoring invalid scene radius {}", radius);
            return;
        }
        self.scene_radius = radius;
    }

    /// Scene sphere enclosing an axis-aligned box
    pub fn set_scene_bounding_box(&mut self, min: Vec3, max: Vec3) {
        self.set_scene_center((min + max) * 0.5);
        self.set_scene_radius(0.5 * (max - min).length());
    }

    /// World up direction used by look-around gestures
    #[inline]
    pub fn scene_up_vector(&self) -> Vec3 {
        self.scene_up
    }

    #[inline]
    pub fn pivot_point(&self) -> Vec3 {
        self.pivot
    }

    /// Change the orbit center. Never moves the camera.
    pub fn set_pivot_point(&mut self, pivot: Vec3) {
        self.pivot = pivot;
    }

    // ---- Pose ----

    pub fn position(&self, graph: &FrameGraph) -> Result<Vec3> {
        Ok(self.view(graph)?.position())
    }

    pub fn orientation(&self, graph: &FrameGraph) -> Result<Quat> {
        Ok(self.view(graph)?.orientation())
    }

    /// World direction the camera looks at (local -Z)
    pub fn view_direction(&self, graph: &FrameGraph) -> Result<Vec3> {
        Ok(self.view(graph)?.inverse_transform_of(Vec3::NEG_Z))
    }

    pub fn up_vector(&self, graph: &FrameGraph) -> Result<Vec3> {
        Ok(self.view(graph)?.inverse_transform_of(Vec3::Y))
    }

    pub fn right_vector(&self, graph: &FrameGraph) -> Result<Vec3> {
        Ok(self.view(graph)?.inverse_transform_of(Vec3::X))
    }

    /// Camera vector to world coordinates
    pub fn inverse_transform_of(&self, graph: &FrameGraph, vector: Vec3) -> Result<Vec3> {
        Ok(self.view(graph)?.inverse_transform_of(vector))
    }

    /// World point to camera coordinates
    pub fn camera_coordinates_of(&self, graph: &FrameGraph, point: Vec3) -> Result<Vec3> {
        Ok(self.view(graph)?.coordinates_of(point))
    }

    /// Distance from the camera plane to `point`, along the view direction
    pub fn depth_of(&self, graph: &FrameGraph, point: Vec3) -> Result<f32> {
        Ok(self.camera_coordinates_of(graph, point)?.z.abs())
    }

    pub fn set_position(&self, graph: &mut FrameGraph, position: Vec3) -> Result<()> {
        graph.frame_mut(self.frame)?.set_position(position);
        Ok(())
    }

    pub fn set_orientation(&self, graph: &mut FrameGraph, orientation: Quat) -> Result<()> {
        graph.frame_mut(self.frame)?.set_orientation(orientation);
        Ok(())
    }

    /// Turn to look at `target`, keeping the up vector as close as possible
    pub fn look_at(&self, graph: &mut FrameGraph, target: Vec3) -> Result<()> {
        let position = self.position(graph)?;
        self.set_view_direction(graph, target - position)
    }

    /// Turn so the view direction is `direction`, keeping the current up
    /// vector as close as possible. A null direction is ignored.
    pub fn set_view_direction(&self, graph: &mut FrameGraph, direction: Vec3) -> Result<()> {
        if direction.is_degenerate() {
            return Ok(());
        }
        let view = self.view(graph)?;
        let mut x_axis = direction.cross(view.inverse_transform_of(Vec3::Y));
        if x_axis.is_degenerate() {
            // Looking along the up vector: keep the current X axis
            x_axis = view.inverse_transform_of(Vec3::X);
        }
        let orientation = Quat::from_rotated_basis(x_axis, x_axis.cross(direction), -direction);
        graph
            .frame_mut(self.frame)?
            .set_orientation_with_constraint(orientation);
        Ok(())
    }

    /// Rotate so the camera's Y axis becomes `up` (world). Unless `no_move`,
    /// the camera also revolves so the pivot keeps its projected position.
    pub fn set_up_vector(&mut self, graph: &mut FrameGraph, up: Vec3, no_move: bool) -> Result<()> {
        if up.is_degenerate() {
            return Ok(());
        }
        let view = self.view(graph)?;
        let rotation = Quat::from_rotation_arc(Vec3::Y, view.transform_of(up));
        let orientation = view.orientation();
        let local_pivot = view.coordinates_of(self.pivot);

        let mut frame = graph.frame_mut(self.frame)?;
        if !no_move {
            frame.set_position(self.pivot - (orientation * rotation).rotate(local_pivot));
        }
        frame.rotate(rotation);
        self.scene_up = up.normalize_or_zero();
        Ok(())
    }

    // ---- Fitting ----

    /// Move along the view direction so the sphere fills the view
    pub fn fit_sphere(&self, graph: &mut FrameGraph, center: Vec3, radius: f32) -> Result<()> {
        let view_direction = self.view_direction(graph)?;
        let distance = match self.projection {
            Projection::Perspective => {
                let y_view = radius / (self.field_of_view / 2.0).sin();
                let x_view = radius / (self.horizontal_field_of_view() / 2.0).sin();
                x_view.max(y_view)
            }
            Projection::Orthographic => {
                (center - self.pivot).dot(view_direction) + radius / self.ortho_coefficient()
            }
        };
        graph
            .frame_mut(self.frame)?
            .set_position_with_constraint(center - view_direction * distance);
        Ok(())
    }

    pub fn fit_bounding_box(&self, graph: &mut FrameGraph, min: Vec3, max: Vec3) -> Result<()> {
        let extent = max - min;
        let diameter = extent.x.abs().max(extent.y.abs()).max(extent.z.abs());
        self.fit_sphere(graph, (min + max) * 0.5, 0.5 * diameter)
    }

    /// Fit the scene sphere
    pub fn show_entire_scene(&self, graph: &mut FrameGraph) -> Result<()> {
        self.fit_sphere(graph, self.scene_center, self.scene_radius)
    }

    /// Translate so the scene center lies on the viewing axis
    pub fn center_scene(&self, graph: &mut FrameGraph) -> Result<()> {
        let view_direction = self.view_direction(graph)?;
        graph
            .frame_mut(self.frame)?
            .project_on_line(self.scene_center, view_direction);
        Ok(())
    }

    /// Widen or narrow the field of view so the scene sphere just fits
    pub fn set_fov_to_fit_scene(&mut self, graph: &FrameGraph) -> Result<()> {
        let distance = self.distance_to_scene_center(graph)?;
        if distance > 2.0_f32.sqrt() * self.scene_radius {
            self.set_field_of_view(2.0 * (self.scene_radius / distance).asin());
        } else {
            self.set_field_of_view(core::f32::consts::FRAC_PI_2);
        }
        Ok(())
    }

    // ---- Clipping and projection ----

    pub fn distance_to_scene_center(&self, graph: &FrameGraph) -> Result<f32> {
        self.depth_of(graph, self.scene_center)
    }

    pub fn z_near(&self, graph: &FrameGraph) -> Result<f32> {
        match self.clip_planes {
            ClipPlanes::Fixed { near, .. } => Ok(near),
            ClipPlanes::SceneFitted => {
                let z_clipping = self.z_clipping_coefficient * self.scene_radius;
                let z = self.distance_to_scene_center(graph)? - z_clipping;
                let z_min = self.z_near_coefficient * z_clipping;
                if z >= z_min {
                    Ok(z)
                } else {
                    match self.projection {
                        Projection::Perspective => Ok(z_min),
                        Projection::Orthographic => Ok(0.0),
                    }
                }
            }
        }
    }

    pub fn z_far(&self, graph: &FrameGraph) -> Result<f32> {
        match self.clip_planes {
            ClipPlanes::Fixed { far, .. } => Ok(far),
            ClipPlanes::SceneFitted => Ok(self.distance_to_scene_center(graph)?
                + self.z_clipping_coefficient * self.scene_radius),
        }
    }

    fn ortho_coefficient(&self) -> f32 {
        (self.field_of_view / 2.0).tan()
    }

    /// Half width and half height of the orthographic view volume
    pub fn ortho_width_height(&self, graph: &FrameGraph) -> Result<(f32, f32)> {
        let distance = self.ortho_coefficient() * self.depth_of(graph, self.pivot)?;
        let aspect = self.aspect_ratio();
        if aspect < 1.0 {
            Ok((distance, distance / aspect))
        } else {
            Ok((distance * aspect, distance))
        }
    }

    /// World to camera transform (inverse of the frame's world matrix)
    pub fn view_matrix(&self, graph: &FrameGraph) -> Result<Mat4> {
        Ok(self.view(graph)?.world_inverse().matrix())
    }

    pub fn projection_matrix(&self, graph: &FrameGraph) -> Result<Mat4> {
        let near = self.z_near(graph)?;
        let far = self.z_far(graph)?;
        Ok(match self.projection {
            Projection::Perspective => {
                Mat4::perspective(self.field_of_view, self.aspect_ratio(), near, far)
            }
            Projection::Orthographic => {
                let (w, h) = self.ortho_width_height(graph)?;
                Mat4::orthographic(-w, w, -h, h, near, far)
            }
        })
    }

    pub fn view_projection_matrix(&self, graph: &FrameGraph) -> Result<Mat4> {
        Ok(self.projection_matrix(graph)? * self.view_matrix(graph)?)
    }

    /// World point to screen: pixels (y down) and depth in [0, 1]
    pub fn projected_coordinates_of(&self, graph: &FrameGraph, point: Vec3) -> Result<Vec3> {
        let ndc = self.view_projection_matrix(graph)?.transform_point(point);
        Ok(Vec3::new(
            (ndc.x + 1.0) * 0.5 * self.screen_width as f32,
            (1.0 - ndc.y) * 0.5 * self.screen_height as f32,
            (ndc.z + 1.0) * 0.5,
        ))
    }

    /// Screen point (pixels, y down, depth in [0, 1]) back to world
    pub fn unprojected_coordinates_of(&self, graph: &FrameGraph, screen: Vec3) -> Result<Vec3> {
        let inverse = self
            .view_projection_matrix(graph)?
            .inverse()
            .ok_or(ManipulatorError::SingularProjection)?;
        let ndc = Vec3::new(
            2.0 * screen.x / self.screen_width as f32 - 1.0,
            1.0 - 2.0 * screen.y / self.screen_height as f32,
            2.0 * screen.z - 1.0,
        );
        Ok(inverse.transform_point(ndc))
    }

    /// World-space ray `(origin, unit direction)` through a pixel
    pub fn convert_click_to_line(&self, graph: &FrameGraph, pixel: Vec2) -> Result<(Vec3, Vec3)> {
        let view = self.view(graph)?;
        let x = 2.0 * pixel.x / self.screen_width as f32 - 1.0;
        let y = 1.0 - 2.0 * pixel.y / self.screen_height as f32;
        match self.projection {
            Projection::Perspective => {
                let tan = (self.field_of_view / 2.0).tan();
                let local = Vec3::new(x * tan * self.aspect_ratio(), y * tan, -1.0);
                let direction = view.inverse_transform_of(local).normalize_or_zero();
                Ok((view.position(), direction))
            }
            Projection::Orthographic => {
                let (w, h) = self.ortho_width_height(graph)?;
                let origin = view.inverse_coordinates_of(Vec3::new(x * w, y * h, 0.0));
                Ok((origin, view.inverse_transform_of(Vec3::NEG_Z)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn assert_vec_eq(a: Vec3, b: Vec3) {
        assert!((a - b).length() < 1e-3, "{:?} != {:?}", a, b);
    }

    #[test]
    fn test_new_frames_unit_scene() {
        let mut graph = FrameGraph::new();
        let camera = Camera::new(&mut graph).unwrap();

        let position = camera.position(&graph).unwrap();
        assert_abs_diff_eq!(position.x, 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(position.y, 0.0, epsilon = 1e-5);
        assert!(position.z > 1.0);
        assert_vec_eq(camera.view_direction(&graph).unwrap(), Vec3::NEG_Z);
    }

    #[test]
    fn test_look_at() {
        let mut graph = FrameGraph::new();
        let camera = Camera::new(&mut graph).unwrap();
        camera.set_position(&mut graph, Vec3::new(10.0, 0.0, 0.0)).unwrap();
        camera.look_at(&mut graph, Vec3::ZERO).unwrap();

        assert_vec_eq(camera.view_direction(&graph).unwrap(), Vec3::NEG_X);
        assert_vec_eq(camera.up_vector(&graph).unwrap(), Vec3::Y);
    }

    #[test]
    fn test_view_matrix_is_world_inverse() {
        let mut graph = FrameGraph::new();
        let camera = Camera::new(&mut graph).unwrap();
        camera.set_position(&mut graph, Vec3::new(1.0, 2.0, 3.0)).unwrap();
        camera
            .set_orientation(&mut graph, Quat::from_axis_angle(Vec3::new(1.0, 1.0, 0.0), 0.6))
            .unwrap();

        let world = graph.get(camera.frame()).unwrap().world_matrix();
        let product = camera.view_matrix(&graph).unwrap() * world;
        assert!(product.max_abs_diff(&Mat4::IDENTITY) < 1e-4);
    }

    #[test]
    fn test_scene_fitted_clip_planes() {
        let mut graph = FrameGraph::new();
        let mut camera = Camera::new(&mut graph).unwrap();
        camera.set_scene_radius(2.0);
        camera.set_position(&mut graph, Vec3::new(0.0, 0.0, 10.0)).unwrap();

        let clipping = 3.0_f32.sqrt() * 2.0;
        assert_abs_diff_eq!(camera.z_near(&graph).unwrap(), 10.0 - clipping, epsilon = 1e-4);
        assert_abs_diff_eq!(camera.z_far(&graph).unwrap(), 10.0 + clipping, epsilon = 1e-4);

        // Inside the scene the near plane is clamped
        camera.set_position(&mut graph, Vec3::ZERO).unwrap();
        assert_abs_diff_eq!(camera.z_near(&graph).unwrap(), 0.005 * clipping, epsilon = 1e-6);

        camera.set_clip_planes(ClipPlanes::Fixed { near: 0.1, far: 50.0 });
        assert_eq!(camera.z_near(&graph).unwrap(), 0.1);
        assert_eq!(camera.z_far(&graph).unwrap(), 50.0);
    }

    #[test]
    fn test_projection_round_trip() {
        let mut graph = FrameGraph::new();
        let camera = Camera::new(&mut graph).unwrap().with_screen_size(800, 600);
        let point = Vec3::new(0.2, -0.3, 0.1);

        let screen = camera.projected_coordinates_of(&graph, point).unwrap();
        assert!(screen.z > 0.0 && screen.z < 1.0);
        let back = camera.unprojected_coordinates_of(&graph, screen).unwrap();
        assert_vec_eq(back, point);

        // Scene center projects to the middle of the screen
        let center = camera.projected_coordinates_of(&graph, Vec3::ZERO).unwrap();
        assert_abs_diff_eq!(center.x, 400.0, epsilon = 1e-2);
        assert_abs_diff_eq!(center.y, 300.0, epsilon = 1e-2);
    }

    #[test]
    fn test_click_line_hits_projected_point() {
        let mut graph = FrameGraph::new();
        let camera = Camera::new(&mut graph).unwrap().with_screen_size(800, 600);
        let point = Vec3::new(0.4, 0.25, -0.2);
        let screen = camera.projected_coordinates_of(&graph, point).unwrap();

        let (origin, direction) = camera
            .convert_click_to_line(&graph, Vec2::new(screen.x, screen.y))
            .unwrap();
        let to_point = point - origin;
        let off_line = to_point - direction * to_point.dot(direction);
        assert!(off_line.length() < 1e-3);
    }

    #[test]
    fn test_orthographic_size_tracks_pivot_distance() {
        let mut graph = FrameGraph::new();
        let camera = Camera::new(&mut graph)
            .unwrap()
            .with_projection(Projection::Orthographic)
            .with_screen_size(400, 400);
        camera.set_position(&mut graph, Vec3::new(0.0, 0.0, 4.0)).unwrap();

        let (w, h) = camera.ortho_width_height(&graph).unwrap();
        let expected = (core::f32::consts::FRAC_PI_8).tan() * 4.0;
        assert_abs_diff_eq!(w, expected, epsilon = 1e-5);
        assert_abs_diff_eq!(h, expected, epsilon = 1e-5);
    }

    #[test]
    fn test_pivot_change_does_not_move_camera() {
        let mut graph = FrameGraph::new();
        let mut camera = Camera::new(&mut graph).unwrap();
        let before = camera.position(&graph).unwrap();
        camera.set_pivot_point(Vec3::new(3.0, 1.0, -2.0));
        assert_eq!(camera.position(&graph).unwrap(), before);
    }

    #[test]
    fn test_set_up_vector_keeps_pivot_in_view() {
        let mut graph = FrameGraph::new();
        let mut camera = Camera::new(&mut graph).unwrap();
        let up = Vec3::new(1.0, 1.0, 0.0).normalize_or_zero();
        camera.set_up_vector(&mut graph, up, false).unwrap();

        assert_vec_eq(camera.up_vector(&graph).unwrap(), up);
        let pivot = camera.camera_coordinates_of(&graph, Vec3::ZERO).unwrap();
        assert_abs_diff_eq!(pivot.x, 0.0, epsilon = 1e-4);
        assert_abs_diff_eq!(pivot.y, 0.0, epsilon = 1e-4);
    }
}

//! Virtual trackball mapping from pointer motion to rotation

use void_math::{Quat, Vec2, Vec3};

/// Rotation gain applied to the arc between two ball points
const TRACKBALL_GAIN: f32 = 5.0;

/// Height of the deformed ball above the screen point `(x, y)`.
///
/// A sphere near the center, blending into a hyperbolic sheet so that
/// points far from the center still produce a well-defined rotation.
pub fn project_on_ball(x: f32, y: f32) -> f32 {
    const SIZE: f32 = 1.0;
    const SIZE2: f32 = SIZE * SIZE;
    const SIZE_LIMIT: f32 = SIZE2 * 0.5;

    let d = x * x + y * y;
    if d < SIZE_LIMIT {
        (SIZE2 - d).sqrt()
    } else {
        SIZE_LIMIT / d.sqrt()
    }
}

/// Rotation, in camera coordinates, that turns the ball point under
/// `previous` into the ball point under `current`.
///
/// `center` is the screen projection of the rotation center and `screen`
/// the viewport size, all in pixels with y down.
pub fn deformed_ball_quaternion(
    previous: Vec2,
    current: Vec2,
    center: Vec2,
    screen: Vec2,
    sensitivity: f32,
) -> Quat {
    if screen.x <= 0.0 || screen.y <= 0.0 {
        return Quat::IDENTITY;
    }

    let px = sensitivity * (previous.x - center.x) / screen.x;
    let py = sensitivity * (center.y - previous.y) / screen.y;
    let dx = sensitivity * (current.x - center.x) / screen.x;
    let dy = sensitivity * (center.y - current.y) / screen.y;

    let p1 = Vec3::new(px, py, project_on_ball(px, py));
    let p2 = Vec3::new(dx, dy, project_on_ball(dx, dy));
    let axis = p1.cross(p2);
    let sin = (axis.length_squared() / p1.length_squared() / p2.length_squared()).sqrt();
    if !sin.is_finite() {
        return Quat::IDENTITY;
    }

    Quat::from_axis_angle(axis, TRACKBALL_GAIN * sin.min(1.0).asin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const SCREEN: Vec2 = Vec2::new(800.0, 600.0);
    const CENTER: Vec2 = Vec2::new(400.0, 300.0);

    #[test]
    fn test_ball_is_continuous() {
        let limit = 0.5_f32.sqrt();
        assert_abs_diff_eq!(project_on_ball(limit - 1e-4, 0.0), project_on_ball(limit + 1e-4, 0.0), epsilon = 1e-3);
        assert_eq!(project_on_ball(0.0, 0.0), 1.0);
    }

    #[test]
    fn test_no_motion_is_identity() {
        let q = deformed_ball_quaternion(CENTER, CENTER, CENTER, SCREEN, 1.0);
        assert!(q.same_rotation(Quat::IDENTITY, 1e-6));
    }

    #[test]
    fn test_horizontal_drag_turns_about_up() {
        let q = deformed_ball_quaternion(CENTER, CENTER + Vec2::new(40.0, 0.0), CENTER, SCREEN, 1.0);
        let axis = q.axis();
        assert_abs_diff_eq!(axis.y, 1.0, epsilon = 1e-4);
        assert!(q.angle() > 0.0);

        // The front of the ball follows the pointer to the right
        assert!(q.rotate(Vec3::Z).x > 0.0);
    }

    #[test]
    fn test_vertical_drag_turns_about_right() {
        // Dragging down (y grows) tips the front of the ball downwards
        let q = deformed_ball_quaternion(CENTER, CENTER + Vec2::new(0.0, 30.0), CENTER, SCREEN, 1.0);
        assert_abs_diff_eq!(q.axis().x, 1.0, epsilon = 1e-4);
        assert!(q.rotate(Vec3::Z).y < 0.0);
    }

    #[test]
    fn test_degenerate_screen() {
        let q = deformed_ball_quaternion(CENTER, CENTER + Vec2::new(5.0, 5.0), CENTER, Vec2::ZERO, 1.0);
        assert_eq!(q, Quat::IDENTITY);
    }
}

/// Model orientation driven by pointer drags
use crate::config::MOUSE_SENSITIVITY;
use crate::math::{
    quaternion_from_axis_angle, quaternion_identity, quaternion_multiply, quaternion_normalize,
    quaternion_to_matrix, Mat3, Quat, Vec3,
};

/// Owns the running orientation of the model as a unit quaternion.
///
/// Drags rotate the model about the *view* axes, not the model's own axes:
/// each delta is composed on the left of the current orientation.
#[derive(Debug, Clone)]
pub struct OrientationController {
    orientation: Quat,
    dragging: bool,
    sensitivity: f32,
}

impl OrientationController {
    pub fn new(sensitivity: f32) -> Self {
        Self {
            orientation: quaternion_identity(),
            dragging: false,
            sensitivity,
        }
    }

    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    pub fn sensitivity(&self) -> f32 {
        self.sensitivity
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn begin_drag(&mut self) {
        self.dragging = true;
    }

    pub fn end_drag(&mut self) {
        self.dragging = false;
    }

    /// Back to the identity orientation. The drag state is left alone.
    pub fn reset(&mut self) {
        self.orientation = quaternion_identity();
    }

    /// Rotate by a pointer motion of `(dx, dy)` screen pixels.
    ///
    /// Returns `false` without touching the orientation when no drag is
    /// active. Horizontal motion turns about the view's vertical axis and
    /// vertical motion about its horizontal axis, both by the negated delta
    /// times the sensitivity.
    pub fn apply_drag_delta(&mut self, dx: f32, dy: f32) -> bool {
        if !self.dragging {
            return false;
        }

        let vertical = quaternion_from_axis_angle(&Vec3::y(), -dx * self.sensitivity);
        let horizontal = quaternion_from_axis_angle(&Vec3::x(), -dy * self.sensitivity);
        let delta = quaternion_multiply(&vertical, &horizontal);

        self.orientation = quaternion_normalize(&quaternion_multiply(&delta, &self.orientation));
        true
    }

    pub fn current_rotation_matrix(&self) -> Mat3 {
        quaternion_to_matrix(&self.orientation)
    }
}

impl Default for OrientationController {
    fn default() -> Self {
        Self::new(MOUSE_SENSITIVITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{quaternion_magnitude, rotate};
    use approx::assert_relative_eq;

    #[test]
    fn test_starts_at_identity() {
        let controller = OrientationController::default();
        assert_eq!(controller.orientation(), quaternion_identity());
        assert!(!controller.is_dragging());
        assert_relative_eq!(controller.current_rotation_matrix(), Mat3::identity());
    }

    #[test]
    fn test_motion_without_drag_is_ignored() {
        let mut controller = OrientationController::default();
        assert!(!controller.apply_drag_delta(40.0, -12.0));
        assert_eq!(controller.orientation(), quaternion_identity());

        controller.begin_drag();
        controller.end_drag();
        assert!(!controller.apply_drag_delta(40.0, -12.0));
        assert_eq!(controller.orientation(), quaternion_identity());
    }

    #[test]
    fn test_horizontal_drag_turns_about_view_y() {
        let mut controller = OrientationController::new(0.01);
        controller.begin_drag();
        // -dx * s = -pi/2: a quarter turn clockwise seen from +y
        assert!(controller.apply_drag_delta(std::f32::consts::FRAC_PI_2 / 0.01, 0.0));

        let m = controller.current_rotation_matrix();
        let v = rotate(&m, &Vec3::new(0.0, 0.0, -1.0));
        assert_relative_eq!(v, Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_delta_applies_in_view_space() {
        // Pitch first, then yaw: the yaw must still be about the view's y axis
        let mut controller = OrientationController::new(1.0);
        controller.begin_drag();
        controller.apply_drag_delta(0.0, -std::f32::consts::FRAC_PI_2);
        controller.apply_drag_delta(-std::f32::consts::FRAC_PI_2, 0.0);

        let m = controller.current_rotation_matrix();
        let expected = quaternion_multiply(
            &quaternion_from_axis_angle(&Vec3::y(), std::f32::consts::FRAC_PI_2),
            &quaternion_from_axis_angle(&Vec3::x(), std::f32::consts::FRAC_PI_2),
        );
        assert_relative_eq!(m, quaternion_to_matrix(&expected), epsilon = 1e-5);
    }

    #[test]
    fn test_stays_normalized() {
        let mut controller = OrientationController::default();
        controller.begin_drag();
        for step in 0..2000 {
            let dx = ((step * 37) % 23) as f32 - 11.0;
            let dy = ((step * 53) % 17) as f32 - 8.0;
            controller.apply_drag_delta(dx, dy);
            assert_relative_eq!(
                quaternion_magnitude(&controller.orientation()),
                1.0,
                epsilon = 1e-5
            );
        }
    }

    #[test]
    fn test_reset() {
        let mut controller = OrientationController::default();
        controller.begin_drag();
        controller.apply_drag_delta(10.0, 10.0);
        controller.reset();
        assert_eq!(controller.orientation(), quaternion_identity());
        assert!(controller.is_dragging());
    }
}

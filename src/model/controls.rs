use std::f32::consts::PI;

use nalgebra::Vector3;

use super::camera::CameraPose;
use crate::config::ControlsConfig;

const SETTLED_EPSILON: f32 = 1e-6;

/// Mouse-driven orbiting around the camera target, with damping.
///
/// Input only queues up motion; `update` spends a `damping_factor` share of the
/// queue each frame, so the camera glides to a stop instead of halting. There
/// is no panning: the target only ever moves when a focus mode moves it.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    // -- queued motion --
    theta_delta: f32,
    phi_delta: f32,
    scale: f32,
    // -- knobs to fiddle with --
    damping_factor: f32,
    rotate_speed: f32,
    zoom_ratio: f32,
    distance_limits: (f32, f32),
    phi_limit: f32,
}

impl OrbitControls {
    pub fn from_config(config: &ControlsConfig) -> Self {
        OrbitControls {
            theta_delta: 0.0,
            phi_delta: 0.0,
            scale: 1.0,
            damping_factor: config.damping_factor,
            rotate_speed: config.rotate_speed,
            zoom_ratio: config.zoom_ratio,
            distance_limits: (config.min_distance, config.max_distance),
            phi_limit: 0.001,
        }
    }

    /// Queues a rotation for a mouse drag of `(dx, dy)` pixels. Dragging right
    /// swings the camera left around the target, and dragging down raises it.
    pub fn drag(&mut self, dx: f32, dy: f32) {
        self.theta_delta -= dx * self.rotate_speed;
        self.phi_delta -= dy * self.rotate_speed;
    }

    /// Positive `amount` (scrolling up) zooms in.
    pub fn scroll(&mut self, amount: f32) {
        if amount > 0.0 {
            self.scale /= self.zoom_ratio;
        } else if amount < 0.0 {
            self.scale *= self.zoom_ratio;
        }
    }

    pub fn is_settled(&self) -> bool {
        self.theta_delta.abs() < SETTLED_EPSILON
            && self.phi_delta.abs() < SETTLED_EPSILON
            && (self.scale - 1.0).abs() < SETTLED_EPSILON
    }

    /// Applies one frame of queued motion to `pose`. Leaves the pose untouched
    /// when there's nothing queued, so focus animations aren't disturbed.
    pub fn update(&mut self, pose: &mut CameraPose) {
        if self.is_settled() {
            self.theta_delta = 0.0;
            self.phi_delta = 0.0;
            self.scale = 1.0;
            return;
        }

        // Spherical coordinates around the target, with +y as the pole
        let offset = pose.eye - pose.target;
        let mut radius = offset.norm();
        let mut theta = offset.x.atan2(offset.z);
        let mut phi = if radius > 0.0 {
            (offset.y / radius).clamp(-1.0, 1.0).acos()
        } else {
            PI / 2.0
        };

        theta += self.theta_delta * self.damping_factor;
        phi = (phi + self.phi_delta * self.damping_factor).clamp(self.phi_limit, PI - self.phi_limit);
        radius = (radius * self.scale).clamp(self.distance_limits.0, self.distance_limits.1);

        let offset = Vector3::new(
            radius * phi.sin() * theta.sin(),
            radius * phi.cos(),
            radius * phi.sin() * theta.cos(),
        );
        pose.eye = pose.target + offset;

        self.theta_delta *= 1.0 - self.damping_factor;
        self.phi_delta *= 1.0 - self.damping_factor;
        self.scale = 1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use nalgebra::Point3;

    fn controls() -> OrbitControls {
        OrbitControls::from_config(&ControlsConfig::default())
    }

    fn home() -> CameraPose {
        CameraPose::new(Point3::new(0.0, 0.0, 10.0), Point3::origin())
    }

    #[test]
    fn test_idle_controls_leave_pose_alone() {
        let mut controls = controls();
        let mut pose = CameraPose::new(Point3::new(0.0, 0.5, 0.3), Point3::new(0.0, 3.0, 0.0));
        let before = pose;
        for _ in 0..10 {
            controls.update(&mut pose);
        }
        assert_eq!(pose, before);
    }

    #[test]
    fn test_drag_glides_to_full_rotation() {
        let mut controls = controls();
        let mut pose = home();

        // 0.005 rad/px * 100 px = 0.5 rad to the left
        controls.drag(100.0, 0.0);
        controls.update(&mut pose);
        let first_step = pose.eye;
        assert!(first_step.x < 0.0);

        for _ in 0..1000 {
            controls.update(&mut pose);
        }
        assert!(controls.is_settled());

        let expected = Point3::new(-10.0 * 0.5f32.sin(), 0.0, 10.0 * 0.5f32.cos());
        assert_abs_diff_eq!(pose.eye, expected, epsilon = 1e-3);
        assert_relative_eq!(pose.target, Point3::origin());
        assert_relative_eq!((pose.eye - pose.target).norm(), 10.0, epsilon = 1e-4);
    }

    #[test]
    fn test_vertical_drag_is_clamped_at_pole() {
        let mut controls = controls();
        let mut pose = home();
        controls.drag(0.0, 10_000.0);
        for _ in 0..1000 {
            controls.update(&mut pose);
        }
        // Never flips over the top
        assert!(pose.eye.y > 9.99);
        assert!(pose.eye.y <= 10.0);
    }

    #[test]
    fn test_scroll_zooms_within_limits() {
        let mut controls = controls();
        let mut pose = home();

        controls.scroll(1.0);
        controls.update(&mut pose);
        assert_relative_eq!(pose.eye.z, 10.0 / 1.05, epsilon = 1e-4);

        for _ in 0..200 {
            controls.scroll(1.0);
            controls.update(&mut pose);
        }
        assert_relative_eq!(pose.eye.z, 1.0, epsilon = 1e-4);

        for _ in 0..200 {
            controls.scroll(-1.0);
            controls.update(&mut pose);
        }
        assert_relative_eq!(pose.eye.z, 90.0, epsilon = 1e-3);
    }
}

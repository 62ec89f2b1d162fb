use log::debug;
use nalgebra::{Point3, Vector3};

use super::camera::{lerp_point, CameraPose};
use super::orrery::{BodyID, Orrery};
use crate::config::FocusConfig;

/// What the camera is doing on its own, if anything. Being a single value,
/// two automated motions can never be active at once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraFocus {
    /// The user is in charge.
    Free,
    /// Glide towards `eye` while staring at `look_at`. Approaches but never
    /// reaches `eye`.
    Central {
        eye: Point3<f32>,
        look_at: Point3<f32>,
    },
    /// Chase the moon at index `body`, staying `offset` away from it.
    Satellite { body: usize, offset: Vector3<f32> },
    /// Glide back to `home`, then hand control back to the user.
    ReturningHome { home: CameraPose },
}

/// Owns the focus state machine and moves the camera pose one frame at a time.
#[derive(Debug, Clone)]
pub struct CameraDirector {
    mode: CameraFocus,
    home: CameraPose,
    config: FocusConfig,
}

impl CameraDirector {
    pub fn new(home: CameraPose, config: FocusConfig) -> Self {
        CameraDirector {
            mode: CameraFocus::Free,
            home,
            config,
        }
    }

    pub fn mode(&self) -> CameraFocus {
        self.mode
    }

    pub fn satellite_index(&self) -> usize {
        self.config.satellite_index
    }

    pub fn focus_central(&mut self) {
        self.set_mode(CameraFocus::Central {
            eye: self.config.central_eye(),
            look_at: self.config.central_look_at(),
        });
    }

    pub fn focus_satellite(&mut self) {
        self.set_mode(CameraFocus::Satellite {
            body: self.config.satellite_index,
            offset: self.config.satellite_offset(),
        });
    }

    pub fn return_home(&mut self) {
        self.set_mode(CameraFocus::ReturningHome { home: self.home });
    }

    fn set_mode(&mut self, mode: CameraFocus) {
        debug!("Camera focus {:?} -> {:?}", self.mode, mode);
        self.mode = mode;
    }

    /// Moves `pose` one frame towards the current goal. Each step only looks at
    /// where the camera is now, so switching modes mid-flight is always safe.
    pub fn step(&mut self, pose: &mut CameraPose, orrery: &Orrery) {
        match self.mode {
            CameraFocus::Free => {}
            CameraFocus::Central { eye, look_at } => {
                pose.eye = lerp_point(&pose.eye, &eye, self.config.central_factor);
                pose.target = look_at;
            }
            CameraFocus::Satellite { body, offset } => {
                // The moon keeps moving, so this tracks rather than converges
                let body_pos = orrery.position(BodyID::Orbiting(body));
                let goal = CameraPose::new(body_pos + offset, body_pos);
                pose.lerp_towards(&goal, self.config.satellite_factor);
            }
            CameraFocus::ReturningHome { home } => {
                pose.lerp_towards(&home, self.config.home_factor);
                if nalgebra::distance(&pose.eye, &home.eye) < self.config.home_snap_distance {
                    *pose = home;
                    self.set_mode(CameraFocus::Free);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::{assert_abs_diff_eq, assert_relative_eq};

    use crate::model::orrery::{Appearance, BodyInfo, CentralBody, OrbitingBody};

    fn orrery() -> Orrery {
        let info = |radius| BodyInfo {
            radius,
            color: Point3::new(1.0, 1.0, 1.0),
            texture: None,
        };
        let central = CentralBody {
            info: info(2.0),
            spin: 0.0,
            spin_speed: 0.001,
            appearance: Appearance::plain(),
        };
        let orbiting = (0..5)
            .map(|i| OrbitingBody::new(info(0.5), 0.3 * i as f32, 5.0 + 1.5 * i as f32, 0.001))
            .collect();
        Orrery::new(central, orbiting)
    }

    fn home() -> CameraPose {
        CameraPose::new(Point3::new(0.0, 0.0, 10.0), Point3::origin())
    }

    fn director() -> CameraDirector {
        CameraDirector::new(home(), FocusConfig::default())
    }

    #[test]
    fn test_transitions_replace_each_other() {
        let mut director = director();
        assert_eq!(director.mode(), CameraFocus::Free);

        director.focus_central();
        assert!(matches!(director.mode(), CameraFocus::Central { .. }));

        director.focus_satellite();
        assert_eq!(
            director.mode(),
            CameraFocus::Satellite {
                body: 3,
                offset: Vector3::new(0.0, 0.5, 1.5)
            }
        );

        director.return_home();
        assert_eq!(director.mode(), CameraFocus::ReturningHome { home: home() });
    }

    #[test]
    fn test_free_does_nothing() {
        let mut director = director();
        let orrery = orrery();
        let mut pose = CameraPose::new(Point3::new(1.0, 2.0, 3.0), Point3::new(4.0, 5.0, 6.0));
        let before = pose;
        director.step(&mut pose, &orrery);
        assert_eq!(pose, before);
    }

    #[test]
    fn test_central_is_asymptotic() {
        let mut director = director();
        let orrery = orrery();
        let mut pose = home();
        director.focus_central();

        let goal = Point3::new(0.0, 0.5, 3.7);
        let mut previous = nalgebra::distance(&pose.eye, &goal);
        for _ in 0..100 {
            director.step(&mut pose, &orrery);
            let d = nalgebra::distance(&pose.eye, &goal);
            // 1% of the remaining distance per frame
            assert_relative_eq!(d, previous * 0.99, max_relative = 1e-3);
            assert!(d > 0.0);
            assert_eq!(pose.target, Point3::new(0.0, 3.0, 0.0));
            previous = d;
        }
        assert!(matches!(director.mode(), CameraFocus::Central { .. }));
    }

    #[test]
    fn test_satellite_tracks_moving_body() {
        let mut director = director();
        let mut orrery = orrery();
        let mut pose = home();
        director.focus_satellite();

        for _ in 0..2000 {
            orrery.advance();
            director.step(&mut pose, &orrery);
        }

        // The goal keeps moving, so we trail it a little but stay close
        let moon = orrery.position(BodyID::Orbiting(3));
        let desired = moon + Vector3::new(0.0, 0.5, 1.5);
        assert!(nalgebra::distance(&pose.eye, &desired) < 2.0);
        assert!(nalgebra::distance(&pose.target, &moon) < 2.0);
        assert!(nalgebra::distance(&pose.eye, &desired) > 1e-3);
        assert!(matches!(director.mode(), CameraFocus::Satellite { .. }));
    }

    #[test]
    fn test_return_home_converges_and_snaps() {
        let mut director = director();
        let orrery = orrery();
        let mut pose = CameraPose::new(Point3::new(40.0, -25.0, 3.0), Point3::new(2.0, 3.0, 1.0));
        director.return_home();

        let config = FocusConfig::default();
        let start = nalgebra::distance(&pose.eye, &home().eye);
        let bound = ((start / config.home_snap_distance).ln()
            / -(1.0 - config.home_factor).ln())
        .ceil() as usize
            + 2;

        let mut ticks = 0;
        while director.mode() != CameraFocus::Free {
            director.step(&mut pose, &orrery);
            ticks += 1;
            assert!(ticks <= bound, "still returning after {} ticks", ticks);
        }

        assert_eq!(pose, home());

        // Stays put until something else happens
        for _ in 0..10 {
            director.step(&mut pose, &orrery);
        }
        assert_eq!(pose, home());
        assert_eq!(director.mode(), CameraFocus::Free);
    }

    #[test]
    fn test_superseding_mid_flight() {
        let mut director = director();
        let orrery = orrery();
        let mut pose = home();

        director.focus_central();
        for _ in 0..30 {
            director.step(&mut pose, &orrery);
        }
        director.return_home();
        for _ in 0..1000 {
            director.step(&mut pose, &orrery);
        }
        assert_eq!(director.mode(), CameraFocus::Free);
        assert_abs_diff_eq!(pose.eye, home().eye);
        assert_abs_diff_eq!(pose.target, home().target);
    }
}

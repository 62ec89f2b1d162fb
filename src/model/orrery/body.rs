use std::path::PathBuf;

use nalgebra::Point3;

use crate::config::Color;
use crate::math::orbital_position;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum BodyID {
    Central,
    Orbiting(usize),
}

/// How a body is drawn right now, apart from its texture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Appearance {
    pub scale: f32,
    pub glow: Option<Color>,
}

impl Appearance {
    pub fn plain() -> Self {
        Appearance {
            scale: 1.0,
            glow: None,
        }
    }

    pub fn glowing(color: Color) -> Self {
        Appearance {
            scale: 1.0,
            glow: Some(color),
        }
    }
}

// All the immutable info about a body
#[derive(Debug, Clone)]
pub struct BodyInfo {
    pub radius: f32,
    pub color: Color,
    pub texture: Option<PathBuf>,
}

/// The star at the origin. It doesn't move, it only spins about +y.
#[derive(Debug, Clone)]
pub struct CentralBody {
    pub info: BodyInfo,
    pub spin: f32,
    pub spin_speed: f32,
    pub appearance: Appearance,
}

impl CentralBody {
    pub fn advance(&mut self) {
        self.spin += self.spin_speed;
    }
}

#[derive(Debug, Clone)]
pub struct OrbitingBody {
    pub info: BodyInfo,
    pub angle: f32,
    pub orbit_radius: f32,
    /// Radians per frame.
    pub speed: f32,
    pub appearance: Appearance,
    position: Point3<f32>,
}

impl OrbitingBody {
    pub fn new(info: BodyInfo, angle: f32, orbit_radius: f32, speed: f32) -> Self {
        OrbitingBody {
            info,
            angle,
            orbit_radius,
            speed,
            appearance: Appearance::plain(),
            position: orbital_position(angle, orbit_radius),
        }
    }

    pub fn advance(&mut self) {
        self.angle += self.speed;
        self.position = orbital_position(self.angle, self.orbit_radius);
    }

    pub fn position(&self) -> Point3<f32> {
        self.position
    }
}

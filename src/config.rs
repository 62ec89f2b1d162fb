//! Scene description, read from a TOML file.
//!
//! Every section and every field has a default matching the stock scene, so an
//! empty file (or no file at all) describes the usual sun with five moons.

use std::error::Error;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Deserializer};

pub type Color = Point3<f32>;

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: io::Error },
    Parse(toml::de::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "could not read {}: {}", path.display(), source)
            }
            ConfigError::Parse(e) => write!(f, "malformed scene config: {}", e),
            ConfigError::Invalid(msg) => write!(f, "invalid scene config: {}", msg),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SceneConfig {
    /// Seed for the moon sizes and starting angles. Unseeded scenes differ on
    /// every launch.
    pub seed: Option<u64>,
    pub camera: CameraConfig,
    pub controls: ControlsConfig,
    pub central: CentralConfig,
    pub orbits: OrbitsConfig,
    pub hover: HoverConfig,
    pub focus: FocusConfig,
    pub prop: PropConfig,
    pub label: LabelConfig,
    pub sky: SkyConfig,
    pub light: LightConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraConfig {
    pub fovy_degrees: f32,
    pub znear: f32,
    pub zfar: f32,
    pub home_eye: [f32; 3],
    pub home_target: [f32; 3],
    #[serde(deserialize_with = "deserialize_color")]
    pub background: Color,
}

impl Default for CameraConfig {
    fn default() -> Self {
        CameraConfig {
            fovy_degrees: 75.0,
            znear: 0.1,
            zfar: 1000.0,
            home_eye: [0.0, 0.0, 10.0],
            home_target: [0.0, 0.0, 0.0],
            background: Point3::new(0.0, 0.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControlsConfig {
    /// Fraction of the angular velocity shed every frame.
    pub damping_factor: f32,
    /// Radians of rotation per pixel of drag.
    pub rotate_speed: f32,
    /// Distance multiplier per scroll step (zoom in divides, zoom out multiplies).
    pub zoom_ratio: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        ControlsConfig {
            damping_factor: 0.05,
            rotate_speed: 0.005,
            zoom_ratio: 1.05,
            min_distance: 1.0,
            max_distance: 90.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CentralConfig {
    pub radius: f32,
    pub spin_speed: f32,
    pub texture: Option<PathBuf>,
    #[serde(deserialize_with = "deserialize_color")]
    pub color: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub glow: Color,
}

impl Default for CentralConfig {
    fn default() -> Self {
        CentralConfig {
            radius: 2.0,
            spin_speed: 0.001,
            texture: Some(PathBuf::from("assets/8k_sun.jpg")),
            color: Point3::new(1.0, 1.0, 1.0),
            glow: hex(0xffcc33),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OrbitsConfig {
    pub count: usize,
    pub base_radius: f32,
    pub radius_step: f32,
    pub base_speed: f32,
    pub speed_step: f32,
    pub min_size: f32,
    pub size_spread: f32,
    pub textures: Vec<PathBuf>,
    #[serde(deserialize_with = "deserialize_color")]
    pub color: Color,
}

impl Default for OrbitsConfig {
    fn default() -> Self {
        OrbitsConfig {
            count: 5,
            base_radius: 5.0,
            radius_step: 1.5,
            base_speed: 0.001,
            speed_step: 0.0005,
            min_size: 0.2,
            size_spread: 0.65,
            textures: [
                "2k_jupiter.jpg",
                "2k_mars.jpg",
                "2k_venus.jpg",
                "2k_earth_daymap.jpg",
                "2k_neptune.jpg",
            ]
            .iter()
            .map(|name| Path::new("assets").join(name))
            .collect(),
            color: Point3::new(1.0, 1.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HoverConfig {
    pub scale: f32,
    #[serde(deserialize_with = "deserialize_color")]
    pub color: Color,
}

impl Default for HoverConfig {
    fn default() -> Self {
        HoverConfig {
            scale: 1.05,
            color: hex(0xffff66),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FocusConfig {
    /// Index of the moon that the satellite view follows.
    pub satellite_index: usize,
    pub central_eye: [f32; 3],
    pub central_look_at: [f32; 3],
    pub central_factor: f32,
    pub satellite_offset: [f32; 3],
    pub satellite_factor: f32,
    pub home_factor: f32,
    pub home_snap_distance: f32,
}

impl Default for FocusConfig {
    fn default() -> Self {
        FocusConfig {
            satellite_index: 3,
            central_eye: [0.0, 0.5, 3.7],
            central_look_at: [0.0, 3.0, 0.0],
            central_factor: 0.01,
            satellite_offset: [0.0, 0.5, 1.5],
            satellite_factor: 0.05,
            home_factor: 0.05,
            home_snap_distance: 0.01,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PropConfig {
    pub path: PathBuf,
    /// Position in camera space (x right, y up, -z forward).
    pub offset: [f32; 3],
    pub scale: f32,
}

impl Default for PropConfig {
    fn default() -> Self {
        PropConfig {
            path: PathBuf::from("assets/satellite.glb"),
            offset: [-2.0, 0.0, -3.0],
            scale: 0.2,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LabelConfig {
    pub title: String,
    pub text: String,
    pub char_delay_ms: u64,
}

impl Default for LabelConfig {
    fn default() -> Self {
        LabelConfig {
            title: String::from("About"),
            text: String::from(
                "I'm a software developer interested in space research and data science.",
            ),
            char_delay_ms: 40,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SkyConfig {
    pub radius: f32,
    pub texture: Option<PathBuf>,
}

impl Default for SkyConfig {
    fn default() -> Self {
        SkyConfig {
            radius: 100.0,
            texture: Some(PathBuf::from("assets/stars.jpg")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LightConfig {
    pub position: [f32; 3],
}

impl Default for LightConfig {
    fn default() -> Self {
        LightConfig {
            position: [10.0, 10.0, 10.0],
        }
    }
}

impl FocusConfig {
    pub fn central_eye(&self) -> Point3<f32> {
        Point3::from(self.central_eye)
    }

    pub fn central_look_at(&self) -> Point3<f32> {
        Point3::from(self.central_look_at)
    }

    pub fn satellite_offset(&self) -> Vector3<f32> {
        Vector3::from(self.satellite_offset)
    }
}

impl SceneConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: SceneConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn check(ok: bool, msg: impl FnOnce() -> String) -> Result<(), ConfigError> {
            if ok {
                Ok(())
            } else {
                Err(ConfigError::Invalid(msg()))
            }
        }
        fn is_factor(x: f32) -> bool {
            x > 0.0 && x <= 1.0
        }

        let cam = &self.camera;
        check(cam.fovy_degrees > 0.0 && cam.fovy_degrees < 180.0, || {
            format!("camera.fovy_degrees must be in (0, 180), got {}", cam.fovy_degrees)
        })?;
        check(cam.znear > 0.0 && cam.zfar > cam.znear, || {
            format!(
                "camera clip planes must satisfy 0 < znear < zfar, got {} and {}",
                cam.znear, cam.zfar
            )
        })?;

        let ctl = &self.controls;
        check(is_factor(ctl.damping_factor), || {
            format!("controls.damping_factor must be in (0, 1], got {}", ctl.damping_factor)
        })?;
        check(ctl.zoom_ratio > 1.0, || {
            format!("controls.zoom_ratio must be above 1, got {}", ctl.zoom_ratio)
        })?;
        check(
            ctl.min_distance > 0.0 && ctl.max_distance > ctl.min_distance,
            || {
                format!(
                    "controls distances must satisfy 0 < min < max, got {} and {}",
                    ctl.min_distance, ctl.max_distance
                )
            },
        )?;

        check(self.central.radius > 0.0, || {
            format!("central.radius must be positive, got {}", self.central.radius)
        })?;
        check(self.orbits.count > 0, || String::from("orbits.count must be at least 1"))?;
        check(self.orbits.min_size > 0.0 && self.orbits.size_spread >= 0.0, || {
            String::from("orbits.min_size must be positive and orbits.size_spread non-negative")
        })?;
        check(self.hover.scale > 0.0, || {
            format!("hover.scale must be positive, got {}", self.hover.scale)
        })?;

        let focus = &self.focus;
        check(focus.satellite_index < self.orbits.count, || {
            format!(
                "focus.satellite_index {} is out of range for {} orbiting bodies",
                focus.satellite_index, self.orbits.count
            )
        })?;
        for (name, value) in [
            ("central_factor", focus.central_factor),
            ("satellite_factor", focus.satellite_factor),
            ("home_factor", focus.home_factor),
        ] {
            check(is_factor(value), || {
                format!("focus.{} must be in (0, 1], got {}", name, value)
            })?;
        }
        check(focus.home_snap_distance > 0.0, || {
            format!(
                "focus.home_snap_distance must be positive, got {}",
                focus.home_snap_distance
            )
        })?;

        check(self.prop.scale > 0.0, || {
            format!("prop.scale must be positive, got {}", self.prop.scale)
        })?;
        check(self.label.char_delay_ms > 0, || {
            String::from("label.char_delay_ms must be at least 1")
        })?;

        Ok(())
    }
}

pub fn read_file(path: &Path) -> Result<SceneConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_owned(),
        source,
    })?;
    SceneConfig::from_toml_str(&contents)
}

fn hex(rgb: u32) -> Color {
    let [_, r, g, b] = rgb.to_be_bytes();
    Point3::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
}

/// Parses a six-digit hex colour, with or without a leading `#`.
pub fn parse_color(s: &str) -> Result<Color, String> {
    let digits = s.strip_prefix('#').unwrap_or(s);
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("expected six hex digits, got {:?}", s));
    }
    u32::from_str_radix(digits, 16)
        .map(hex)
        .map_err(|_| format!("expected six hex digits, got {:?}", s))
}

fn deserialize_color<'de, D>(deserializer: D) -> Result<Color, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_color(&s).map_err(serde::de::Error::custom)
}

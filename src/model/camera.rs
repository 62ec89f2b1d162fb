use nalgebra::{Isometry3, Matrix4, Perspective3, Point2, Point3, Translation3, Vector3};

use crate::config::CameraConfig;
use crate::math::Ray;

/// Where the camera is and what it's looking at. The up direction is always +y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub eye: Point3<f32>,
    pub target: Point3<f32>,
}

impl CameraPose {
    pub fn new(eye: Point3<f32>, target: Point3<f32>) -> Self {
        CameraPose { eye, target }
    }

    /// Moves both points `factor` of the way towards `other`.
    pub fn lerp_towards(&mut self, other: &CameraPose, factor: f32) {
        self.eye = lerp_point(&self.eye, &other.eye, factor);
        self.target = lerp_point(&self.target, &other.target, factor);
    }
}

/// `a` moved `t` of the way towards `b`.
pub fn lerp_point(a: &Point3<f32>, b: &Point3<f32>, t: f32) -> Point3<f32> {
    a + (b - a) * t
}

/// A look-at perspective camera, without any of the window plumbing. The GUI
/// camera renders from whatever this says.
#[derive(Debug, Clone)]
pub struct CameraRig {
    pub pose: CameraPose,
    // -- perspective --
    width: u32,
    height: u32,
    fovy: f32,
    znear: f32,
    zfar: f32,
}

impl CameraRig {
    pub fn new(pose: CameraPose, fovy: f32, znear: f32, zfar: f32) -> Self {
        CameraRig {
            pose,
            width: 800,
            height: 600,
            fovy,
            znear,
            zfar,
        }
    }

    pub fn from_config(config: &CameraConfig) -> Self {
        let pose = CameraPose::new(
            Point3::from(config.home_eye),
            Point3::from(config.home_target),
        );
        CameraRig::new(
            pose,
            config.fovy_degrees.to_radians(),
            config.znear,
            config.zfar,
        )
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn clip_planes(&self) -> (f32, f32) {
        (self.znear, self.zfar)
    }

    /// Minimized windows report a zero-sized framebuffer; keep the last
    /// usable dimension instead of dividing by zero.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 {
            self.width = width;
        }
        if height > 0 {
            self.height = height;
        }
    }

    pub fn projection(&self) -> Perspective3<f32> {
        Perspective3::new(self.aspect(), self.fovy, self.znear, self.zfar)
    }

    pub fn view_transform(&self) -> Isometry3<f32> {
        Isometry3::look_at_rh(&self.pose.eye, &self.pose.target, &Vector3::y())
    }

    pub fn transformation(&self) -> Matrix4<f32> {
        self.projection().into_inner() * self.view_transform().to_homogeneous()
    }

    /// Converts a pixel position (origin top-left, y down) into normalized
    /// device coordinates (origin center, y up).
    pub fn ndc_from_pixels(&self, x: f64, y: f64) -> Point2<f32> {
        let x = (x / self.width as f64) * 2.0 - 1.0;
        let y = -((y / self.height as f64) * 2.0 - 1.0);
        Point2::new(x as f32, y as f32)
    }

    /// The ray from the eye through a point given in normalized device
    /// coordinates.
    pub fn ray_through(&self, ndc: &Point2<f32>) -> Ray {
        let camera_space = self
            .projection()
            .unproject_point(&Point3::new(ndc.x, ndc.y, 0.5));
        let world = self.view_transform().inverse_transform_point(&camera_space);
        Ray::through(self.pose.eye, world)
    }

    /// World transform of something rigidly attached to the camera at
    /// `offset` (camera space: x right, y up, -z forward).
    pub fn attached_transform(&self, offset: &Vector3<f32>) -> Isometry3<f32> {
        self.view_transform().inverse() * Translation3::from(*offset)
    }
}

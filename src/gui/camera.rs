use kiss3d::camera::Camera;
use kiss3d::event::WindowEvent;
use kiss3d::resource::ShaderUniform;
use kiss3d::window::Canvas;
use nalgebra::{Isometry3, Matrix4, Point3};

use crate::model::CameraRig;

// kiss3d wants to own a camera it can hand events to. Ours doesn't take any
// input directly: the controller routes mouse input into the scene state, and
// this just renders from a copy of the scene's rig, refreshed every frame.
pub struct RigCamera {
    rig: CameraRig,
}

impl RigCamera {
    pub fn new(rig: &CameraRig) -> Self {
        RigCamera { rig: rig.clone() }
    }

    pub fn sync(&mut self, rig: &CameraRig) {
        self.rig.clone_from(rig);
    }

    fn projection_matrix(&self) -> Matrix4<f32> {
        self.rig.projection().into_inner()
    }

    fn view_matrix(&self) -> Matrix4<f32> {
        self.rig.view_transform().to_homogeneous()
    }
}

impl Camera for RigCamera {
    fn handle_event(&mut self, _canvas: &Canvas, _event: &WindowEvent) {}

    fn eye(&self) -> Point3<f32> {
        self.rig.pose.eye
    }

    fn view_transform(&self) -> Isometry3<f32> {
        self.rig.view_transform()
    }

    fn transformation(&self) -> Matrix4<f32> {
        self.rig.transformation()
    }

    fn inverse_transformation(&self) -> Matrix4<f32> {
        self.transformation()
            .try_inverse()
            .unwrap_or_else(Matrix4::identity)
    }

    fn clip_planes(&self) -> (f32, f32) {
        self.rig.clip_planes()
    }

    fn update(&mut self, _canvas: &Canvas) {}

    fn upload(
        &self,
        _: usize,
        proj: &mut ShaderUniform<Matrix4<f32>>,
        view: &mut ShaderUniform<Matrix4<f32>>,
    ) {
        proj.upload(&self.projection_matrix());
        view.upload(&self.view_matrix());
    }
}

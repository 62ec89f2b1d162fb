use std::time::Instant;

use kiss3d::camera::Camera;
use kiss3d::event::EventManager;
use kiss3d::planar_camera::PlanarCamera;
use kiss3d::post_processing::PostProcessingEffect;
use kiss3d::renderer::Renderer;
use kiss3d::window::{State, Window};

use self::camera::RigCamera;
use self::controller::Controller;
use self::view::View;
use crate::config::{ConfigError, SceneConfig};
use crate::model::{GltfLoader, SceneState};

mod camera;
mod controller;
mod view;

pub struct Simulation {
    scene: SceneState,
    view: View,
    controller: Controller,
    camera: RigCamera,
    last_frame: Instant,
}

impl Simulation {
    pub fn new(config: &SceneConfig, window: &mut Window) -> Result<Self, ConfigError> {
        let loader = GltfLoader::new(config.prop.path.clone());
        let mut scene = SceneState::from_config(config, Box::new(loader))?;
        scene.resize(window.width(), window.height());

        Ok(Self {
            view: View::new(window, &scene, config),
            camera: RigCamera::new(scene.rig()),
            controller: Controller::new(),
            scene,
            last_frame: Instant::now(),
        })
    }

    fn process_user_input(&mut self, mut events: EventManager) {
        // Process events
        for event in events.iter() {
            self.controller.process_event(&event.value, &mut self.scene);
        }
    }
}

impl State for Simulation {
    fn cameras_and_effect_and_renderer(
        &mut self,
    ) -> (
        Option<&mut dyn Camera>,
        Option<&mut dyn PlanarCamera>,
        Option<&mut dyn Renderer>,
        Option<&mut dyn PostProcessingEffect>,
    ) {
        (Some(&mut self.camera), None, None, None)
    }

    fn step(&mut self, window: &mut Window) {
        self.process_user_input(window.events());

        let now = Instant::now();
        let dt = now - self.last_frame;
        self.last_frame = now;

        if let Some(geometry) = self.scene.tick(dt) {
            self.view.attach_prop(window, geometry);
        }
        self.view.update_scene_objects(&self.scene);
        self.camera.sync(self.scene.rig());
        self.view.draw_overlay(window, &self.scene);
    }
}

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use kiss3d::resource::Mesh;
use kiss3d::scene::SceneNode;
use kiss3d::text::Font;
use kiss3d::window::Window;
use log::warn;
use nalgebra::{Point2, Point3, Translation3, UnitQuaternion, Vector3};

use super::controller::HOME_BUTTON;
use crate::config::SceneConfig;
use crate::model::orrery::BodyInfo;
use crate::model::{BodyID, PropGeometry, SceneState};

const PROP_COLOR: (f32, f32, f32) = (0.85, 0.85, 0.9);
const TEXT_COLOR: (f32, f32, f32) = (1.0, 1.0, 1.0);

/// The kiss3d side of the scene: one node per body, plus the sky and (once
/// loaded) the prop. Holds no state of its own beyond the nodes; every frame it
/// copies transforms and looks over from the `SceneState`.
pub struct View {
    central: SceneNode,
    moons: Vec<SceneNode>,
    // Kept so the sky isn't dropped from the scene graph
    _sky: SceneNode,
    prop: Option<SceneNode>,
    prop_scale: f32,
    title: String,
    font: Rc<Font>,
}

impl View {
    pub fn new(window: &mut Window, scene: &SceneState, config: &SceneConfig) -> Self {
        let orrery = scene.orrery();
        let central = Self::create_body_object(window, &orrery.central().info);
        let moons = orrery
            .orbiting()
            .iter()
            .map(|body| Self::create_body_object(window, &body.info))
            .collect();

        let mut view = View {
            central,
            moons,
            _sky: Self::create_sky(window, config),
            prop: None,
            prop_scale: config.prop.scale,
            title: config.label.title.clone(),
            font: Font::default(),
        };
        view.update_scene_objects(scene);
        view
    }

    fn create_body_object(window: &mut Window, info: &BodyInfo) -> SceneNode {
        let mut sphere = window.add_sphere(info.radius);
        sphere.set_color(info.color.x, info.color.y, info.color.z);
        if let Some(path) = &info.texture {
            apply_texture(&mut sphere, path);
        }
        sphere
    }

    // We live inside the sky sphere, so it needs its back faces drawn.
    fn create_sky(window: &mut Window, config: &SceneConfig) -> SceneNode {
        let mut sky = window.add_sphere(config.sky.radius);
        sky.enable_backface_culling(false);
        match &config.sky.texture {
            Some(path) => apply_texture(&mut sky, path),
            None => sky.set_color(0.0, 0.0, 0.0),
        }
        sky
    }

    /// Builds the engine mesh for a freshly loaded prop. Called at most once.
    pub fn attach_prop(&mut self, window: &mut Window, geometry: PropGeometry) {
        let mesh = Mesh::new(
            geometry.coords,
            geometry.faces,
            geometry.normals,
            geometry.uvs,
            false,
        );
        let mut node = window.add_mesh(Rc::new(RefCell::new(mesh)), Vector3::repeat(self.prop_scale));
        node.set_color(PROP_COLOR.0, PROP_COLOR.1, PROP_COLOR.2);
        node.set_visible(false);
        self.prop = Some(node);
    }

    pub fn update_scene_objects(&mut self, scene: &SceneState) {
        let orrery = scene.orrery();

        for id in orrery.ids() {
            let node = match id {
                BodyID::Central => &mut self.central,
                BodyID::Orbiting(i) => &mut self.moons[i],
            };

            let position = orrery.position(id);
            node.set_local_translation(Translation3::from(position.coords));

            let appearance = orrery.appearance(id);
            let s = appearance.scale;
            node.set_local_scale(s, s, s);

            // No emissive materials in kiss3d; glow becomes a tint instead
            let color = appearance.glow.unwrap_or(orrery.info(id).color);
            node.set_color(color.x, color.y, color.z);
        }

        let spin = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), orrery.central().spin);
        self.central.set_local_rotation(spin);

        if let Some(prop) = &mut self.prop {
            prop.set_local_transformation(scene.prop_transform());
            prop.set_visible(scene.prop().is_visible());
        }
    }

    pub fn draw_overlay(&self, window: &mut Window, scene: &SceneState) {
        let color = Point3::new(TEXT_COLOR.0, TEXT_COLOR.1, TEXT_COLOR.2);
        let left = HOME_BUTTON.left as f32;
        let top = HOME_BUTTON.top as f32;

        window.draw_text("[ Home ]", &Point2::new(left, top), 48.0, &self.font, &color);

        if scene.overlay_visible() {
            window.draw_text(
                &self.title,
                &Point2::new(left, top + 100.0),
                64.0,
                &self.font,
                &color,
            );
            window.draw_text(
                scene.label().shown(),
                &Point2::new(left, top + 180.0),
                40.0,
                &self.font,
                &color,
            );
        }
    }
}

fn apply_texture(node: &mut SceneNode, path: &Path) {
    if path.is_file() {
        let name = path.to_string_lossy();
        node.set_texture_from_file(path, &name);
    } else {
        warn!("Texture {} not found, using plain color", path.display());
    }
}

use std::time::Duration;

use log::{debug, info};
use nalgebra::{Isometry3, Point2, Vector3};
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::camera::{CameraPose, CameraRig};
use super::controls::OrbitControls;
use super::focus::{CameraDirector, CameraFocus};
use super::hover::HoverState;
use super::orrery::{BodyID, Orrery};
use super::prop::{AttachedProp, PropGeometry, PropLoader};
use super::typewriter::Typewriter;
use crate::config::{ConfigError, SceneConfig};

/// Everything that changes while the scene runs. The GUI feeds input in through
/// the `pointer_*`/`click`/`resize`/`go_home` methods, calls `tick` once per
/// frame, then draws whatever the accessors say.
pub struct SceneState {
    orrery: Orrery,
    // Camera
    rig: CameraRig,
    controls: OrbitControls,
    director: CameraDirector,
    // Input
    pointer: Option<Point2<f32>>,
    hover: HoverState,
    // Overlay
    label: Typewriter,
    typed: bool,
    overlay_visible: bool,
    // Prop
    prop: AttachedProp,
    prop_offset: Vector3<f32>,
}

impl SceneState {
    /// Fails if the focus config names a satellite moon the orrery doesn't
    /// have.
    pub fn new(
        config: &SceneConfig,
        orrery: Orrery,
        loader: Box<dyn PropLoader>,
    ) -> Result<Self, ConfigError> {
        let satellite = config.focus.satellite_index;
        if orrery.get_orbiting(satellite).is_none() {
            return Err(ConfigError::Invalid(format!(
                "focus.satellite_index {} is out of range for {} orbiting bodies",
                satellite,
                orrery.orbiting().len()
            )));
        }

        let rig = CameraRig::from_config(&config.camera);
        let home = rig.pose;

        Ok(SceneState {
            orrery,
            rig,
            controls: OrbitControls::from_config(&config.controls),
            director: CameraDirector::new(home, config.focus.clone()),
            pointer: None,
            hover: HoverState::from_config(&config.hover),
            label: Typewriter::new(
                config.label.text.clone(),
                Duration::from_millis(config.label.char_delay_ms),
            ),
            typed: false,
            overlay_visible: false,
            prop: AttachedProp::new(loader),
            prop_offset: Vector3::from(config.prop.offset),
        })
    }

    /// Builds the bodies from the config, seeding the RNG from the config if
    /// it asks for a fixed seed.
    pub fn from_config(
        config: &SceneConfig,
        loader: Box<dyn PropLoader>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let orrery = Orrery::from_config(config, &mut rng);
        info!(
            "Scene has {} orbiting bodies (seed {:?})",
            orrery.orbiting().len(),
            config.seed
        );
        SceneState::new(config, orrery, loader)
    }

    // -- accessors --

    pub fn orrery(&self) -> &Orrery {
        &self.orrery
    }

    pub fn rig(&self) -> &CameraRig {
        &self.rig
    }

    pub fn pose(&self) -> CameraPose {
        self.rig.pose
    }

    pub fn focus(&self) -> CameraFocus {
        self.director.mode()
    }

    pub fn highlighted(&self) -> Option<BodyID> {
        self.hover.highlighted()
    }

    pub fn label(&self) -> &Typewriter {
        &self.label
    }

    pub fn has_typed(&self) -> bool {
        self.typed
    }

    pub fn overlay_visible(&self) -> bool {
        self.overlay_visible
    }

    pub fn prop(&self) -> &AttachedProp {
        &self.prop
    }

    /// Where the prop should be drawn, given where the camera is right now.
    pub fn prop_transform(&self) -> Isometry3<f32> {
        self.rig.attached_transform(&self.prop_offset)
    }

    pub fn viewport(&self) -> (u32, u32) {
        (self.rig.width(), self.rig.height())
    }

    // -- frame loop --

    /// Advances the scene by one frame. `dt` is only used for the typed
    /// label; everything else moves a fixed amount per frame.
    ///
    /// Returns the prop geometry on the frame its load completes.
    pub fn tick(&mut self, dt: Duration) -> Option<PropGeometry> {
        self.controls.update(&mut self.rig.pose);
        self.orrery.advance();

        let nearest = self.pick();
        self.hover.update(nearest, &mut self.orrery);

        self.director.step(&mut self.rig.pose, &self.orrery);
        self.label.advance(dt);
        self.prop.poll()
    }

    /// The body nearest the camera under the pointer, if any.
    pub fn pick(&self) -> Option<BodyID> {
        let ray = self.rig.ray_through(self.pointer.as_ref()?);
        self.orrery.intersect(&ray).first().map(|(id, _)| *id)
    }

    // -- input --

    pub fn pointer_moved(&mut self, ndc: Point2<f32>) {
        self.pointer = Some(ndc);
    }

    pub fn pointer_moved_pixels(&mut self, x: f64, y: f64) {
        self.pointer = Some(self.rig.ndc_from_pixels(x, y));
    }

    pub fn drag(&mut self, dx: f32, dy: f32) {
        self.controls.drag(dx, dy);
    }

    pub fn scroll(&mut self, amount: f32) {
        self.controls.scroll(amount);
    }

    /// Handles a click at the current pointer position. The satellite moon
    /// wins over the star; anything else is ignored. Returns the body that
    /// took the click.
    pub fn click(&mut self) -> Option<BodyID> {
        let ray = self.rig.ray_through(self.pointer.as_ref()?);

        let satellite = BodyID::Orbiting(self.director.satellite_index());
        if self.orrery.intersect_body(&ray, satellite).is_some() {
            self.enter_satellite();
            return Some(satellite);
        }

        if self.orrery.intersect_body(&ray, BodyID::Central).is_some() && !self.typed {
            self.enter_central();
            return Some(BodyID::Central);
        }

        None
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        debug!("Viewport resized to {}x{}", width, height);
        self.rig.set_viewport(width, height);
    }

    pub fn go_home(&mut self) {
        self.director.return_home();
        self.overlay_visible = false;
        self.typed = false;
        self.prop.hide();
    }

    fn enter_central(&mut self) {
        self.director.focus_central();
        self.overlay_visible = true;
        self.typed = true;
        self.prop.hide();
        self.label.restart();
    }

    fn enter_satellite(&mut self) {
        self.director.focus_satellite();
        self.overlay_visible = false;
        self.typed = false;
        self.prop.activate();
    }
}

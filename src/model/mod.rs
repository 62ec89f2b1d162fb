pub mod camera;
pub mod controls;
pub mod focus;
pub mod hover;
pub mod orrery;
pub mod prop;
pub mod scene;
pub mod typewriter;

pub use camera::{CameraPose, CameraRig};
pub use focus::{CameraDirector, CameraFocus};
pub use orrery::{BodyID, Orrery};
pub use prop::{AttachedProp, GltfLoader, PropGeometry, PropLoader};
pub use scene::SceneState;

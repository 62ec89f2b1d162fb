use kiss3d::event::{Action, Key, MouseButton, WindowEvent};
use nalgebra::Point2;

use crate::model::SceneState;

// Key config, all in one place
const KEY_GO_HOME: Key = Key::H;

/// A press and release further apart than this (in pixels) is a drag, not a
/// click.
const CLICK_SLOP: f64 = 4.0;

/// The on-screen "Home" button, in window pixels.
#[derive(Debug, Clone, Copy)]
pub struct HomeButton {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

pub const HOME_BUTTON: HomeButton = HomeButton {
    left: 10.0,
    top: 10.0,
    width: 140.0,
    height: 44.0,
};

impl HomeButton {
    pub fn contains(&self, pos: &Point2<f64>) -> bool {
        (self.left..=self.left + self.width).contains(&pos.x)
            && (self.top..=self.top + self.height).contains(&pos.y)
    }
}

/// Turns raw window events into scene input.
pub struct Controller {
    cursor: Point2<f64>,
    press: Option<Point2<f64>>,
}

impl Controller {
    pub fn new() -> Self {
        Controller {
            cursor: Point2::origin(),
            press: None,
        }
    }

    pub fn process_event(&mut self, event: &WindowEvent, scene: &mut SceneState) {
        match *event {
            WindowEvent::CursorPos(x, y, _) => {
                let pos = Point2::new(x, y);
                if self.press.is_some() {
                    let delta = pos - self.cursor;
                    scene.drag(delta.x as f32, delta.y as f32);
                }
                self.cursor = pos;
                scene.pointer_moved_pixels(x, y);
            }
            WindowEvent::MouseButton(MouseButton::Button1, Action::Press, _) => {
                self.press = Some(self.cursor);
            }
            WindowEvent::MouseButton(MouseButton::Button1, Action::Release, _) => {
                let start = match self.press.take() {
                    Some(start) => start,
                    None => return,
                };
                if nalgebra::distance(&start, &self.cursor) > CLICK_SLOP {
                    return;
                }

                if HOME_BUTTON.contains(&self.cursor) {
                    scene.go_home();
                } else {
                    scene.click();
                }
            }
            WindowEvent::Scroll(_, dy, _) => scene.scroll(dy as f32),
            WindowEvent::FramebufferSize(w, h) => scene.resize(w, h),
            WindowEvent::Key(KEY_GO_HOME, Action::Press, _) => scene.go_home(),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_button_bounds() {
        assert!(HOME_BUTTON.contains(&Point2::new(10.0, 10.0)));
        assert!(HOME_BUTTON.contains(&Point2::new(80.0, 30.0)));
        assert!(HOME_BUTTON.contains(&Point2::new(150.0, 54.0)));
        assert!(!HOME_BUTTON.contains(&Point2::new(151.0, 30.0)));
        assert!(!HOME_BUTTON.contains(&Point2::new(5.0, 30.0)));
        assert!(!HOME_BUTTON.contains(&Point2::new(80.0, 60.0)));
    }
}

use log::debug;

use super::orrery::{BodyID, Orrery};
use crate::config::{Color, HoverConfig};

/// Tracks the single body under the pointer and keeps its highlight in sync.
///
/// Invariant: only `highlighted` (if any) is drawn at the hover scale; every
/// other body is at scale 1.
#[derive(Debug, Clone)]
pub struct HoverState {
    highlighted: Option<BodyID>,
    scale: f32,
    color: Color,
}

impl HoverState {
    pub fn from_config(config: &HoverConfig) -> Self {
        HoverState {
            highlighted: None,
            scale: config.scale,
            color: config.color,
        }
    }

    pub fn highlighted(&self) -> Option<BodyID> {
        self.highlighted
    }

    /// Moves the highlight to `nearest`, the body currently first under the
    /// pointer. Returns whether anything changed.
    pub fn update(&mut self, nearest: Option<BodyID>, orrery: &mut Orrery) -> bool {
        if self.highlighted == nearest {
            return false;
        }

        if let Some(old) = self.highlighted.take() {
            Self::demote(old, orrery);
        }
        if let Some(new) = nearest {
            let appearance = orrery.appearance_mut(new);
            appearance.scale = self.scale;
            appearance.glow = Some(self.color);
            self.highlighted = Some(new);
        }

        debug!("Hover moved to {:?}", self.highlighted);
        true
    }

    // Only moons lose their glow; the star's is part of its material.
    fn demote(id: BodyID, orrery: &mut Orrery) {
        let appearance = orrery.appearance_mut(id);
        appearance.scale = 1.0;
        if id != BodyID::Central {
            appearance.glow = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use nalgebra::Point3;

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
            appearance: Appearance::glowing(Point3::new(1.0, 0.8, 0.2)),
        };
        let orbiting = (0..3)
            .map(|i| OrbitingBody::new(info(0.5), 0.0, 5.0 + i as f32, 0.001))
            .collect();
        Orrery::new(central, orbiting)
    }

    fn highlighted_count(orrery: &Orrery) -> usize {
        orrery
            .ids()
            .filter(|id| orrery.appearance(*id).scale != 1.0)
            .count()
    }

    #[test]
    fn test_exclusive_highlight() {
        let mut orrery = orrery();
        let mut hover = HoverState::from_config(&HoverConfig::default());
        let highlight = HoverConfig::default().color;

        let sequence = [
            Some(BodyID::Orbiting(0)),
            Some(BodyID::Orbiting(0)),
            Some(BodyID::Orbiting(2)),
            Some(BodyID::Central),
            Some(BodyID::Orbiting(1)),
            None,
            None,
            Some(BodyID::Orbiting(1)),
        ];
        for nearest in sequence {
            hover.update(nearest, &mut orrery);
            assert_eq!(hover.highlighted(), nearest);
            assert!(highlighted_count(&orrery) <= 1);
            if let Some(id) = nearest {
                assert_eq!(orrery.appearance(id).scale, 1.05);
                assert_eq!(orrery.appearance(id).glow, Some(highlight));
            }
        }
    }

    #[test]
    fn test_leaving_clears_highlight() {
        let mut orrery = orrery();
        let mut hover = HoverState::from_config(&HoverConfig::default());

        assert!(hover.update(Some(BodyID::Orbiting(1)), &mut orrery));
        assert!(!hover.update(Some(BodyID::Orbiting(1)), &mut orrery));
        assert!(hover.update(None, &mut orrery));

        assert_eq!(hover.highlighted(), None);
        assert_eq!(*orrery.appearance(BodyID::Orbiting(1)), Appearance::plain());
        assert_eq!(highlighted_count(&orrery), 0);
    }

    #[test]
    fn test_central_keeps_glow_after_hover() {
        let mut orrery = orrery();
        let mut hover = HoverState::from_config(&HoverConfig::default());
        let highlight = HoverConfig::default().color;

        hover.update(Some(BodyID::Central), &mut orrery);
        hover.update(Some(BodyID::Orbiting(0)), &mut orrery);

        let central = orrery.appearance(BodyID::Central);
        assert_eq!(central.scale, 1.0);
        assert_eq!(central.glow, Some(highlight));
    }
}

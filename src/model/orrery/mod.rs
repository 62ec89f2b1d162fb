use std::f32::consts::TAU;

use nalgebra::Point3;
use rand::Rng;

use crate::config::SceneConfig;
use crate::math::Ray;

mod body;

pub use body::{Appearance, BodyID, BodyInfo, CentralBody, OrbitingBody};

/// Every body in the scene: one star at the origin and a fixed list of moons
/// on circular orbits around it.
#[derive(Debug, Clone)]
pub struct Orrery {
    central: CentralBody,
    orbiting: Vec<OrbitingBody>,
}

impl Orrery {
    pub fn new(central: CentralBody, orbiting: Vec<OrbitingBody>) -> Self {
        Orrery { central, orbiting }
    }

    /// Builds the stock scene. Moon sizes and starting angles are drawn from
    /// `rng`; everything else comes straight from the config.
    pub fn from_config<R: Rng>(config: &SceneConfig, rng: &mut R) -> Self {
        let central = CentralBody {
            info: BodyInfo {
                radius: config.central.radius,
                color: config.central.color,
                texture: config.central.texture.clone(),
            },
            spin: 0.0,
            spin_speed: config.central.spin_speed,
            appearance: Appearance::glowing(config.central.glow),
        };

        let orbits = &config.orbits;
        let orbiting = (0..orbits.count)
            .map(|i| {
                let info = BodyInfo {
                    radius: orbits.min_size + rng.gen::<f32>() * orbits.size_spread,
                    color: orbits.color,
                    texture: match orbits.textures.len() {
                        0 => None,
                        n => Some(orbits.textures[i % n].clone()),
                    },
                };
                let angle = rng.gen::<f32>() * TAU;
                let orbit_radius = orbits.base_radius + i as f32 * orbits.radius_step;
                let speed = orbits.base_speed + i as f32 * orbits.speed_step;
                OrbitingBody::new(info, angle, orbit_radius, speed)
            })
            .collect();

        Orrery::new(central, orbiting)
    }

    pub fn central(&self) -> &CentralBody {
        &self.central
    }

    pub fn orbiting(&self) -> &[OrbitingBody] {
        &self.orbiting
    }

    pub fn get_orbiting(&self, index: usize) -> Option<&OrbitingBody> {
        self.orbiting.get(index)
    }

    /// All body IDs, central first, then the moons in order.
    pub fn ids(&self) -> impl Iterator<Item = BodyID> {
        std::iter::once(BodyID::Central).chain((0..self.orbiting.len()).map(BodyID::Orbiting))
    }

    pub fn info(&self, id: BodyID) -> &BodyInfo {
        match id {
            BodyID::Central => &self.central.info,
            BodyID::Orbiting(i) => &self.orbiting[i].info,
        }
    }

    pub fn position(&self, id: BodyID) -> Point3<f32> {
        match id {
            BodyID::Central => Point3::origin(),
            BodyID::Orbiting(i) => self.orbiting[i].position(),
        }
    }

    pub fn appearance(&self, id: BodyID) -> &Appearance {
        match id {
            BodyID::Central => &self.central.appearance,
            BodyID::Orbiting(i) => &self.orbiting[i].appearance,
        }
    }

    pub fn appearance_mut(&mut self, id: BodyID) -> &mut Appearance {
        match id {
            BodyID::Central => &mut self.central.appearance,
            BodyID::Orbiting(i) => &mut self.orbiting[i].appearance,
        }
    }

    /// Spins the star and moves every moon one frame along its orbit.
    pub fn advance(&mut self) {
        self.central.advance();
        for body in self.orbiting.iter_mut() {
            body.advance();
        }
    }

    /// Distance along `ray` to the given body, taking its current scale into
    /// account.
    pub fn intersect_body(&self, ray: &Ray, id: BodyID) -> Option<f32> {
        let radius = self.info(id).radius * self.appearance(id).scale;
        ray.intersect_sphere(&self.position(id), radius)
    }

    /// Every body hit by `ray`, nearest first. Equal distances keep the order
    /// of `ids`.
    pub fn intersect(&self, ray: &Ray) -> Vec<(BodyID, f32)> {
        let mut hits: Vec<_> = self
            .ids()
            .filter_map(|id| self.intersect_body(ray, id).map(|t| (id, t)))
            .collect();
        hits.sort_by(|a, b| a.1.total_cmp(&b.1));
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use nalgebra::Vector3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::math::orbital_position;

    fn info(radius: f32) -> BodyInfo {
        BodyInfo {
            radius,
            color: Point3::new(1.0, 1.0, 1.0),
            texture: None,
        }
    }

    fn simple_orrery() -> Orrery {
        let central = CentralBody {
            info: info(2.0),
            spin: 0.0,
            spin_speed: 0.001,
            appearance: Appearance::plain(),
        };
        let orbiting = vec![
            OrbitingBody::new(info(0.5), 0.0, 5.0, 0.001),
            OrbitingBody::new(info(0.5), 1.0, 6.5, 0.0015),
        ];
        Orrery::new(central, orbiting)
    }

    #[test]
    fn test_advance_accumulates_angle() {
        let mut orrery = simple_orrery();
        let n = 250;
        for _ in 0..n {
            orrery.advance();
        }

        assert_relative_eq!(orrery.central().spin, n as f32 * 0.001, max_relative = 1e-4);
        for (body, (a0, s)) in orrery.orbiting().iter().zip([(0.0, 0.001), (1.0, 0.0015)]) {
            let expected = a0 + n as f32 * s;
            assert_relative_eq!(body.angle, expected, max_relative = 1e-4);
            assert_relative_eq!(
                body.position(),
                orbital_position(body.angle, body.orbit_radius),
                epsilon = 1e-6
            );
            assert_eq!(body.position().y, 0.0);
            assert_relative_eq!(body.position().coords.norm(), body.orbit_radius, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_from_config() {
        let config = SceneConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let orrery = Orrery::from_config(&config, &mut rng);

        assert_eq!(orrery.orbiting().len(), 5);
        assert_eq!(orrery.ids().count(), 6);
        assert_eq!(orrery.central().appearance.glow, Some(config.central.glow));

        for (i, body) in orrery.orbiting().iter().enumerate() {
            assert!(body.info.radius >= 0.2 && body.info.radius <= 0.85);
            assert!(body.angle >= 0.0 && body.angle < TAU);
            assert_relative_eq!(body.orbit_radius, 5.0 + 1.5 * i as f32);
            assert_relative_eq!(body.speed, 0.001 + 0.0005 * i as f32);
            assert_eq!(body.info.texture.as_ref(), Some(&config.orbits.textures[i]));
            assert_eq!(body.appearance, Appearance::plain());
        }
    }

    #[test]
    fn test_same_seed_same_scene() {
        let config = SceneConfig::default();
        let a = Orrery::from_config(&config, &mut StdRng::seed_from_u64(42));
        let b = Orrery::from_config(&config, &mut StdRng::seed_from_u64(42));
        for (x, y) in a.orbiting().iter().zip(b.orbiting()) {
            assert_eq!(x.angle, y.angle);
            assert_eq!(x.info.radius, y.info.radius);
        }
    }

    #[test]
    fn test_intersect_orders_nearest_first() {
        let orrery = simple_orrery();
        // Moon 0 sits at (5, 0, 0). Look down -x from far away, so we see the
        // moon before the star.
        let ray = Ray::new(Point3::new(20.0, 0.0, 0.0), -Vector3::x());
        let hits = orrery.intersect(&ray);
        let ids: Vec<_> = hits.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![BodyID::Orbiting(0), BodyID::Central]);
        assert_relative_eq!(hits[0].1, 14.5);
        assert_relative_eq!(hits[1].1, 18.0);
    }

    #[test]
    fn test_intersect_respects_scale() {
        let mut orrery = simple_orrery();
        // Just outside the star's unscaled radius
        let ray = Ray::new(Point3::new(2.05, 0.0, 10.0), -Vector3::z());
        assert_eq!(orrery.intersect_body(&ray, BodyID::Central), None);

        orrery.appearance_mut(BodyID::Central).scale = 1.05;
        assert!(orrery.intersect_body(&ray, BodyID::Central).is_some());
    }
}

use nalgebra::{Point3, Unit, Vector3};

/// A half-line starting at `origin`. The direction is always unit length, so
/// the parameter returned by the intersection routines is a true distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Unit<Vector3<f32>>,
}

impl Ray {
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Self {
        Ray {
            origin,
            direction: Unit::new_normalize(direction),
        }
    }

    pub fn through(origin: Point3<f32>, point: Point3<f32>) -> Self {
        Ray::new(origin, point - origin)
    }

    pub fn at(&self, t: f32) -> Point3<f32> {
        self.origin + self.direction.into_inner() * t
    }

    /// Distance along the ray to where it enters the sphere, if it does.
    ///
    /// Only the outside of the sphere counts: a ray starting inside the sphere
    /// sees the back faces only, and those are not pickable.
    pub fn intersect_sphere(&self, center: &Point3<f32>, radius: f32) -> Option<f32> {
        // Solve |o + td - c|^2 = r^2 with |d| = 1:
        //   t^2 + 2t(d.m) + (m.m - r^2) = 0, where m = o - c
        let m = self.origin - center;
        let b = m.dot(&self.direction);
        let c = m.norm_squared() - radius * radius;

        // Starting inside (or on) the sphere
        if c <= 0.0 {
            return None;
        }
        // Outside and pointing away
        if b > 0.0 {
            return None;
        }

        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }

        Some(-b - discriminant.sqrt())
    }
}

/// Position on a circular orbit in the xz-plane, centered at the origin.
pub fn orbital_position(angle: f32, radius: f32) -> Point3<f32> {
    Point3::new(angle.cos() * radius, 0.0, angle.sin() * radius)
}

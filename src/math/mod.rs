pub mod geometry;

pub use geometry::{orbital_position, Ray};

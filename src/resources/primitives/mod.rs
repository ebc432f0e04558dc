pub mod sphere;

pub use sphere::{create_sphere, SphereOptions};

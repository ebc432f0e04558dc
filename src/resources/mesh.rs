use crate::assets::{GeometryHandle, MaterialHandle};

/// A drawable: one geometry rendered with one material.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: String,

    pub geometry: GeometryHandle,
    pub material: MaterialHandle,

    pub visible: bool,
}

impl Mesh {
    #[must_use]
    pub fn new(geometry: GeometryHandle, material: MaterialHandle) -> Self {
        Self {
            name: "Mesh".to_string(),
            geometry,
            material,
            visible: true,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }
}

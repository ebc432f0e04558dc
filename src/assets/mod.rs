//! Asset pools shared by the meshes of a scene.

pub mod storage;

use slotmap::new_key_type;

use crate::resources::{Geometry, Material, Texture};

pub use storage::AssetStorage;

new_key_type! {
    pub struct GeometryHandle;
    pub struct MaterialHandle;
    pub struct TextureHandle;
}

/// Geometry, material and texture pools.
///
/// Several meshes may reference the same geometry or material, and several
/// materials the same texture.
#[derive(Debug, Default)]
pub struct AssetStore {
    pub geometries: AssetStorage<GeometryHandle, Geometry>,
    pub materials: AssetStorage<MaterialHandle, Material>,
    pub textures: AssetStorage<TextureHandle, Texture>,
}

impl AssetStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

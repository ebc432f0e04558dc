//! Core resource definitions
//!
//! CPU-side data behind every GPU allocation the renderer makes:
//! - Mesh: a geometry drawn with a material
//! - Material: surface properties plus typed texture slots
//! - Texture: texel data and sampler
//! - Geometry: vertex attributes and indices
//!
//! Each GPU-backed resource carries a [`ChangeTracker`]; a stale tracker is
//! what "needs re-upload" means.

pub mod geometry;
pub mod material;
pub mod mesh;
pub mod primitives;
pub mod texture;
pub mod version_tracker;

pub use geometry::{Attribute, Geometry, GeometryInvalidation, IndexBuffer};
pub use material::{
    Material, MaterialData, MaterialFeatures, MeshBasicMaterial, MeshPhongMaterial, MeshStandardMaterial,
    TextureSlot, TextureSlots,
};
pub use mesh::Mesh;
pub use texture::{Texture, TextureSampler};
pub use version_tracker::{ChangeTracker, MutGuard};

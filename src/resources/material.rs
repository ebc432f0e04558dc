use bitflags::bitflags;
use glam::{Vec3, Vec4};
use uuid::Uuid;

use crate::assets::TextureHandle;
use crate::errors::{RelumeError, Result};
use crate::resources::version_tracker::{ChangeTracker, MutGuard};

// Shader feature flags, one per optional texture slot
bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct MaterialFeatures: u32 {
        const USE_MAP           = 1 << 0;
        const USE_NORMAL_MAP    = 1 << 1;
        const USE_ROUGHNESS_MAP = 1 << 2;
        const USE_METALNESS_MAP = 1 << 3;
        const USE_EMISSIVE_MAP  = 1 << 4;
    }
}

/// Optional texture slots a material may reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    /// Diffuse / albedo
    Map,
    NormalMap,
    RoughnessMap,
    MetalnessMap,
    EmissiveMap,
}

impl TextureSlot {
    pub const ALL: [TextureSlot; 5] = [
        TextureSlot::Map,
        TextureSlot::NormalMap,
        TextureSlot::RoughnessMap,
        TextureSlot::MetalnessMap,
        TextureSlot::EmissiveMap,
    ];

    #[inline]
    fn index(self) -> usize {
        match self {
            Self::Map => 0,
            Self::NormalMap => 1,
            Self::RoughnessMap => 2,
            Self::MetalnessMap => 3,
            Self::EmissiveMap => 4,
        }
    }

    #[must_use]
    pub fn feature(self) -> MaterialFeatures {
        match self {
            Self::Map => MaterialFeatures::USE_MAP,
            Self::NormalMap => MaterialFeatures::USE_NORMAL_MAP,
            Self::RoughnessMap => MaterialFeatures::USE_ROUGHNESS_MAP,
            Self::MetalnessMap => MaterialFeatures::USE_METALNESS_MAP,
            Self::EmissiveMap => MaterialFeatures::USE_EMISSIVE_MAP,
        }
    }
}

/// Texture slot descriptor.
///
/// Which slots are occupied is recorded in `features` at the moment a slot is
/// assigned, so consumers iterate occupied slots without probing the others.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextureSlots {
    handles: [Option<TextureHandle>; 5],
    features: MaterialFeatures,
}

impl TextureSlots {
    #[must_use]
    pub fn get(&self, slot: TextureSlot) -> Option<TextureHandle> {
        self.handles[slot.index()]
    }

    fn set(&mut self, slot: TextureSlot, handle: Option<TextureHandle>) {
        self.handles[slot.index()] = handle;
        self.features.set(slot.feature(), handle.is_some());
    }

    #[must_use]
    pub fn features(&self) -> MaterialFeatures {
        self.features
    }

    /// Occupied slots only, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (TextureSlot, TextureHandle)> + '_ {
        TextureSlot::ALL
            .into_iter()
            .filter(|slot| self.features.contains(slot.feature()))
            .filter_map(|slot| self.handles[slot.index()].map(|h| (slot, h)))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.features.bits().count_ones() as usize
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

// ============================================================================
// Specific Materials
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshBasicMaterial {
    pub color: Vec4,
}

impl Default for MeshBasicMaterial {
    fn default() -> Self {
        Self { color: Vec4::ONE }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshPhongMaterial {
    pub color: Vec4,
    pub emissive: Vec3,
    pub shininess: f32,
}

impl Default for MeshPhongMaterial {
    fn default() -> Self {
        Self {
            color: Vec4::ONE,
            emissive: Vec3::ZERO,
            shininess: 30.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshStandardMaterial {
    pub color: Vec4,
    pub emissive: Vec3,
    pub roughness: f32,
    pub metalness: f32,
}

impl Default for MeshStandardMaterial {
    fn default() -> Self {
        Self {
            color: Vec4::ONE,
            emissive: Vec3::ZERO,
            roughness: 1.0,
            metalness: 0.0,
        }
    }
}

// ============================================================================
// Material Data Enum
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaterialData {
    Basic(MeshBasicMaterial),
    Phong(MeshPhongMaterial),
    Standard(MeshStandardMaterial),
}

impl MaterialData {
    #[must_use]
    pub fn shader_name(&self) -> &'static str {
        match self {
            Self::Basic(_) => "mesh_basic",
            Self::Phong(_) => "mesh_phong",
            Self::Standard(_) => "mesh_standard",
        }
    }

    /// Slots this material kind can sample from.
    #[must_use]
    pub fn supported_slots(&self) -> MaterialFeatures {
        match self {
            Self::Basic(_) => MaterialFeatures::USE_MAP,
            Self::Phong(_) => {
                MaterialFeatures::USE_MAP | MaterialFeatures::USE_NORMAL_MAP | MaterialFeatures::USE_EMISSIVE_MAP
            }
            Self::Standard(_) => MaterialFeatures::all(),
        }
    }

    #[must_use]
    pub fn color(&self) -> Vec4 {
        match self {
            Self::Basic(m) => m.color,
            Self::Phong(m) => m.color,
            Self::Standard(m) => m.color,
        }
    }
}

// ============================================================================
// Material Wrapper
// ============================================================================

#[derive(Debug)]
pub struct Material {
    pub uuid: Uuid,
    pub name: Option<String>,

    data: MaterialData,
    textures: TextureSlots,

    tracker: ChangeTracker,
}

/// A clone is a distinct GPU resource: it gets its own UUID and starts out
/// never uploaded.
impl Clone for Material {
    fn clone(&self) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: self.name.clone(),
            data: self.data,
            textures: self.textures,
            tracker: ChangeTracker::new(),
        }
    }
}

impl Material {
    #[must_use]
    pub fn new(data: MaterialData) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: None,
            data,
            textures: TextureSlots::default(),
            tracker: ChangeTracker::new(),
        }
    }

    #[must_use]
    pub fn new_basic(color: Vec4) -> Self {
        Self::from(MeshBasicMaterial { color })
    }

    #[must_use]
    pub fn new_phong(color: Vec4) -> Self {
        Self::from(MeshPhongMaterial { color, ..Default::default() })
    }

    #[must_use]
    pub fn new_standard(color: Vec4) -> Self {
        Self::from(MeshStandardMaterial { color, ..Default::default() })
    }

    #[must_use]
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Builder form of [`set_texture`](Self::set_texture).
    pub fn with_texture(mut self, slot: TextureSlot, texture: TextureHandle) -> Result<Self> {
        self.set_texture(slot, Some(texture))?;
        Ok(self)
    }

    /// Assigns or clears a texture slot. Fails if this material kind has no
    /// such slot.
    pub fn set_texture(&mut self, slot: TextureSlot, texture: Option<TextureHandle>) -> Result<()> {
        if !self.data.supported_slots().contains(slot.feature()) {
            return Err(RelumeError::UnsupportedTextureSlot {
                kind: self.data.shader_name(),
                slot,
            });
        }
        self.textures.set(slot, texture);
        self.tracker.changed();
        Ok(())
    }

    #[must_use]
    pub fn texture(&self, slot: TextureSlot) -> Option<TextureHandle> {
        self.textures.get(slot)
    }

    #[must_use]
    pub fn textures(&self) -> &TextureSlots {
        &self.textures
    }

    #[must_use]
    pub fn features(&self) -> MaterialFeatures {
        self.textures.features()
    }

    #[must_use]
    pub fn data(&self) -> &MaterialData {
        &self.data
    }

    /// Mutable access to the surface properties; marks the material stale.
    pub fn data_mut(&mut self) -> MutGuard<'_, MaterialData> {
        MutGuard::new(&mut self.data, &mut self.tracker)
    }

    #[must_use]
    pub fn shader_name(&self) -> &'static str {
        self.data.shader_name()
    }

    pub fn as_standard(&self) -> Option<&MeshStandardMaterial> {
        match &self.data {
            MaterialData::Standard(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_phong(&self) -> Option<&MeshPhongMaterial> {
        match &self.data {
            MaterialData::Phong(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_basic(&self) -> Option<&MeshBasicMaterial> {
        match &self.data {
            MaterialData::Basic(m) => Some(m),
            _ => None,
        }
    }

    #[must_use]
    pub fn tracker(&self) -> &ChangeTracker {
        &self.tracker
    }

    #[must_use]
    pub fn needs_upload(&self) -> bool {
        self.tracker.needs_upload()
    }

    pub fn mark_needs_upload(&mut self) {
        self.tracker.changed();
    }

    pub fn mark_uploaded(&mut self) {
        self.tracker.mark_uploaded();
    }
}

// ============================================================================
// Conversions from specific materials
// ============================================================================

impl From<MeshBasicMaterial> for Material {
    fn from(data: MeshBasicMaterial) -> Self {
        Material::new(MaterialData::Basic(data))
    }
}

impl From<MeshPhongMaterial> for Material {
    fn from(data: MeshPhongMaterial) -> Self {
        Material::new(MaterialData::Phong(data))
    }
}

impl From<MeshStandardMaterial> for Material {
    fn from(data: MeshStandardMaterial) -> Self {
        Material::new(MaterialData::Standard(data))
    }
}

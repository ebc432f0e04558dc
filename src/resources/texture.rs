use uuid::Uuid;
use wgpu::TextureFormat;

use crate::resources::version_tracker::ChangeTracker;

/// Sampler configuration; kept with the texture so regeneration after a
/// context loss recreates an identical sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureSampler {
    pub address_mode_u: wgpu::AddressMode,
    pub address_mode_v: wgpu::AddressMode,
    pub mag_filter: wgpu::FilterMode,
    pub min_filter: wgpu::FilterMode,
}

impl Default for TextureSampler {
    fn default() -> Self {
        Self {
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
        }
    }
}

// ============================================================================
// Texture Asset
// ============================================================================

#[derive(Debug)]
pub struct Texture {
    pub uuid: Uuid,
    pub name: String,

    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    /// CPU copy of the texels. `None` means the pixels are streamed in by the
    /// host (e.g. an image still decoding) and only the allocation is known.
    pub data: Option<Vec<u8>>,

    pub sampler: TextureSampler,

    tracker: ChangeTracker,
}

/// Clones get a fresh UUID so they never alias the original's GPU copy.
impl Clone for Texture {
    fn clone(&self) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: self.name.clone(),
            width: self.width,
            height: self.height,
            format: self.format,
            data: self.data.clone(),
            sampler: self.sampler,
            tracker: ChangeTracker::new(),
        }
    }
}

impl Texture {
    /// Creates a 2D texture
    #[must_use]
    pub fn new_2d(name: &str, width: u32, height: u32, data: Option<Vec<u8>>, format: TextureFormat) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.to_string(),
            width,
            height,
            format,
            data,
            sampler: TextureSampler::default(),
            tracker: ChangeTracker::new(),
        }
    }

    /// 1x1 texture of a single RGBA8 color.
    #[must_use]
    pub fn solid(name: &str, rgba: [u8; 4]) -> Self {
        Self::new_2d(name, 1, 1, Some(rgba.to_vec()), TextureFormat::Rgba8UnormSrgb)
    }

    /// Replaces the texel data; the GPU copy becomes stale.
    pub fn set_data(&mut self, data: Vec<u8>) {
        self.data = Some(data);
        self.tracker.changed();
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

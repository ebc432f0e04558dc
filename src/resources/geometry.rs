use rustc_hash::FxHashMap;
use uuid::Uuid;
use wgpu::{IndexFormat, VertexFormat};

use crate::resources::version_tracker::{ChangeTracker, MutGuard};

/// Attribute holds CPU-side vertex data and its upload state.
#[derive(Debug, Clone)]
pub struct Attribute {
    data: Vec<u8>,
    pub format: VertexFormat,
    pub count: u32,
    pub stride: u64,
    tracker: ChangeTracker,
}

impl Attribute {
    /// Creates a planar (non-interleaved) attribute.
    pub fn new_planar<T: bytemuck::Pod>(data: &[T], format: VertexFormat) -> Self {
        Self {
            data: bytemuck::cast_slice(data).to_vec(),
            format,
            count: data.len() as u32,
            stride: std::mem::size_of::<T>() as u64,
            tracker: ChangeTracker::new(),
        }
    }

    /// Replaces the data in place; the GPU copy becomes stale.
    pub fn update_data<T: bytemuck::Pod>(&mut self, new_data: &[T]) {
        let bytes: &[u8] = bytemuck::cast_slice(new_data);
        self.data.clear();
        self.data.extend_from_slice(bytes);
        self.count = new_data.len() as u32;
        self.stride = std::mem::size_of::<T>() as u64;
        self.tracker.changed();
    }

    /// Raw byte access; the version is bumped when the guard drops.
    pub fn data_mut(&mut self) -> MutGuard<'_, Vec<u8>> {
        MutGuard::new(&mut self.data, &mut self.tracker)
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// An attribute with no elements has no GPU buffer to rebuild.
    #[must_use]
    pub fn is_populated(&self) -> bool {
        self.count > 0 && !self.data.is_empty()
    }

    pub fn read<T: bytemuck::Pod>(&self, i: u32) -> Option<T> {
        let size = std::mem::size_of::<T>();
        let offset = (i as usize) * (self.stride as usize);
        let bytes = self.data.get(offset..offset + size)?;
        Some(bytemuck::pod_read_unaligned(bytes))
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

/// Index data of a geometry.
#[derive(Debug, Clone)]
pub struct IndexBuffer {
    data: Vec<u8>,
    pub format: IndexFormat,
    pub count: u32,
    tracker: ChangeTracker,
}

impl IndexBuffer {
    #[must_use]
    pub fn new_u16(indices: &[u16]) -> Self {
        Self {
            data: bytemuck::cast_slice(indices).to_vec(),
            format: IndexFormat::Uint16,
            count: indices.len() as u32,
            tracker: ChangeTracker::new(),
        }
    }

    #[must_use]
    pub fn new_u32(indices: &[u32]) -> Self {
        Self {
            data: bytemuck::cast_slice(indices).to_vec(),
            format: IndexFormat::Uint32,
            count: indices.len() as u32,
            tracker: ChangeTracker::new(),
        }
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    #[must_use]
    pub fn is_populated(&self) -> bool {
        self.count > 0
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

/// Counts produced when a geometry's GPU copies are marked stale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeometryInvalidation {
    pub attributes: usize,
    pub index_buffers: usize,
}

#[derive(Debug)]
pub struct Geometry {
    pub uuid: Uuid,
    pub name: String,

    // vertex layout versioning
    layout_version: u64,

    attributes: FxHashMap<String, Attribute>,
    index: Option<IndexBuffer>,
}

/// Clones get a fresh UUID and unuploaded buffers; they never alias the
/// original's GPU copies.
impl Clone for Geometry {
    fn clone(&self) -> Self {
        let attributes = self
            .attributes
            .iter()
            .map(|(name, attr)| {
                let attr = Attribute {
                    tracker: ChangeTracker::new(),
                    ..attr.clone()
                };
                (name.clone(), attr)
            })
            .collect();
        let index = self.index.as_ref().map(|index| IndexBuffer {
            tracker: ChangeTracker::new(),
            ..index.clone()
        });
        Self {
            uuid: Uuid::new_v4(),
            name: self.name.clone(),
            layout_version: self.layout_version,
            attributes,
            index,
        }
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self::new()
    }
}

impl Geometry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: "Geometry".to_string(),
            layout_version: 0,
            attributes: FxHashMap::default(),
            index: None,
        }
    }

    #[must_use]
    pub fn layout_version(&self) -> u64 {
        self.layout_version
    }

    #[must_use]
    pub fn attributes(&self) -> &FxHashMap<String, Attribute> {
        &self.attributes
    }

    pub fn set_attribute(&mut self, name: &str, attr: Attribute) {
        let layout_changed = self
            .attributes
            .get(name)
            .is_none_or(|old| old.format != attr.format);

        self.attributes.insert(name.to_string(), attr);

        if layout_changed {
            self.layout_version = self.layout_version.wrapping_add(1);
        }
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<Attribute> {
        let removed = self.attributes.remove(name);
        if removed.is_some() {
            self.layout_version = self.layout_version.wrapping_add(1);
        }
        removed
    }

    #[must_use]
    pub fn get_attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    pub fn get_attribute_mut(&mut self, name: &str) -> Option<&mut Attribute> {
        self.attributes.get_mut(name)
    }

    pub fn set_indices(&mut self, indices: &[u16]) {
        self.index = Some(IndexBuffer::new_u16(indices));
    }

    pub fn set_indices_u32(&mut self, indices: &[u32]) {
        self.index = Some(IndexBuffer::new_u32(indices));
    }

    #[must_use]
    pub fn index(&self) -> Option<&IndexBuffer> {
        self.index.as_ref()
    }

    pub fn index_mut(&mut self) -> Option<&mut IndexBuffer> {
        self.index.as_mut()
    }

    #[must_use]
    pub fn vertex_count(&self) -> u32 {
        self.attributes.get("position").map_or(0, |a| a.count)
    }

    /// Marks every populated attribute buffer and the index buffer as
    /// needing re-upload. Empty attributes are left alone.
    pub fn mark_needs_upload(&mut self) -> GeometryInvalidation {
        let mut report = GeometryInvalidation::default();
        for attr in self.attributes.values_mut().filter(|a| a.is_populated()) {
            attr.mark_needs_upload();
            report.attributes += 1;
        }
        if let Some(index) = self.index.as_mut().filter(|i| i.is_populated()) {
            index.mark_needs_upload();
            report.index_buffers += 1;
        }
        report
    }

    /// Whether any GPU copy of this geometry is stale.
    #[must_use]
    pub fn needs_upload(&self) -> bool {
        self.attributes
            .values()
            .any(|a| a.is_populated() && a.needs_upload())
            || self.index.as_ref().is_some_and(|i| i.is_populated() && i.needs_upload())
    }

    pub(crate) fn attributes_mut(&mut self) -> impl Iterator<Item = (&String, &mut Attribute)> {
        self.attributes.iter_mut()
    }
}

use rustc_hash::FxHashMap;
use slotmap::{Key, SlotMap};
use uuid::Uuid;

/// Keyed pool of one asset kind with UUID deduplication.
///
/// Assets live on the render thread together with the scene graph, so the
/// pool hands out plain references instead of shared pointers.
#[derive(Debug)]
pub struct AssetStorage<H: Key, T> {
    map: SlotMap<H, T>,
    lookup: FxHashMap<Uuid, H>,
}

impl<H: Key, T> Default for AssetStorage<H, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Key, T> AssetStorage<H, T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            map: SlotMap::with_key(),
            lookup: FxHashMap::default(),
        }
    }

    /// Adds a resource and returns a Handle.
    pub fn add(&mut self, asset: impl Into<T>) -> H {
        self.map.insert(asset.into())
    }

    /// Adds a resource under a UUID; a second add with the same UUID returns
    /// the first handle.
    pub fn add_with_uuid(&mut self, uuid: Uuid, asset: impl Into<T>) -> H {
        if let Some(&handle) = self.lookup.get(&uuid) {
            return handle;
        }
        let handle = self.map.insert(asset.into());
        self.lookup.insert(uuid, handle);
        handle
    }

    pub fn get(&self, handle: H) -> Option<&T> {
        self.map.get(handle)
    }

    pub fn get_mut(&mut self, handle: H) -> Option<&mut T> {
        self.map.get_mut(handle)
    }

    pub fn get_handle_by_uuid(&self, uuid: &Uuid) -> Option<H> {
        self.lookup.get(uuid).copied()
    }

    pub fn remove(&mut self, handle: H) -> Option<T> {
        let removed = self.map.remove(handle)?;
        self.lookup.retain(|_, h| *h != handle);
        Some(removed)
    }

    pub fn contains(&self, handle: H) -> bool {
        self.map.contains_key(handle)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (H, &T)> {
        self.map.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (H, &mut T)> {
        self.map.iter_mut()
    }
}

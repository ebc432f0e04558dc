/// Version tracker - marks CPU-side changes and remembers what the GPU holds.
///
/// A resource needs (re-)upload whenever its current version differs from
/// the version last uploaded. Marking a resource stale after a context loss
/// is simply another [`changed`](Self::changed).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeTracker {
    version: u64,
    uploaded: Option<u64>,
}

impl ChangeTracker {
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: 0,
            uploaded: None,
        }
    }

    /// Marks as modified, increments version by 1
    pub fn changed(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    /// Gets the current version number
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Version of the last GPU upload, if any happened.
    #[must_use]
    pub fn uploaded_version(&self) -> Option<u64> {
        self.uploaded
    }

    #[must_use]
    pub fn needs_upload(&self) -> bool {
        self.uploaded != Some(self.version)
    }

    /// Records that the GPU copy now matches the current version.
    pub fn mark_uploaded(&mut self) {
        self.uploaded = Some(self.version);
    }
}

/// Mutable guard - automatically bumps the tracker when scope ends
pub struct MutGuard<'a, T> {
    data: &'a mut T,
    tracker: &'a mut ChangeTracker,
}

impl<'a, T> MutGuard<'a, T> {
    pub fn new(data: &'a mut T, tracker: &'a mut ChangeTracker) -> Self {
        Self { data, tracker }
    }
}

impl<T> std::ops::Deref for MutGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.data
    }
}

impl<T> std::ops::DerefMut for MutGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.data
    }
}

// Key: when Guard is dropped, the resource becomes stale on the GPU
impl<T> Drop for MutGuard<'_, T> {
    fn drop(&mut self) {
        self.tracker.changed();
    }
}

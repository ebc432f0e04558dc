//! One-shot development warnings.
//!
//! A [`Diagnostics`] value is owned by whoever sets up rendering (the
//! recovery handler owns one per attachment) and remembers, per warning
//! category, whether that category was already reported. Nothing here is
//! process-global: two handlers warn independently.

use std::fmt;

use bitflags::bitflags;

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct WarningKind: u32 {
        /// A lost signal arrived while the context was already lost
        const DUPLICATE_LOST        = 1 << 0;
        /// A restored signal arrived without a preceding loss
        const RESTORED_WITHOUT_LOSS = 1 << 1;
        /// A mesh references a geometry missing from the asset store
        const DANGLING_GEOMETRY     = 1 << 2;
        /// A mesh references a material missing from the asset store
        const DANGLING_MATERIAL     = 1 << 3;
        /// A material slot references a texture missing from the asset store
        const DANGLING_TEXTURE      = 1 << 4;
        /// The baseline drawable size has a zero dimension
        const ZERO_SIZED_SURFACE    = 1 << 5;
        /// A node references a mesh missing from the scene
        const DANGLING_MESH         = 1 << 6;
    }
}

#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    enabled: bool,
    warned: WarningKind,
}

impl Diagnostics {
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            warned: WarningKind::empty(),
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Reports `kind` the first time it is seen. Returns `true` on that first
    /// occurrence whether or not logging is enabled.
    pub fn warn_once(&mut self, kind: WarningKind, args: fmt::Arguments<'_>) -> bool {
        if self.warned.contains(kind) {
            return false;
        }
        self.warned.insert(kind);
        if self.enabled {
            log::warn!("{args}");
        }
        true
    }

    #[must_use]
    pub fn has_warned(&self, kind: WarningKind) -> bool {
        self.warned.contains(kind)
    }

    #[must_use]
    pub fn warned(&self) -> WarningKind {
        self.warned
    }

    /// Re-arms every category.
    pub fn reset(&mut self) {
        self.warned = WarningKind::empty();
    }
}

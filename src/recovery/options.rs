use std::fmt;

use crate::errors::Result;
use crate::recovery::settings::RecoverySettings;
use crate::scene::Scene;

/// Loss / restoration notification supplied by the caller.
pub type LifecycleCallback = Box<dyn FnMut()>;

/// Extra restoration work run after the baseline state is consistent again.
pub type CustomRestoration<S> = Box<dyn FnMut(&mut S, &mut Scene) -> Result<()>>;

/// Caller-supplied configuration for
/// [`ContextRecovery::attach`](crate::recovery::ContextRecovery::attach).
///
/// ```rust,ignore
/// let options = RecoveryOptions::new()
///     .on_context_lost(|| show_banner("Graphics paused"))
///     .on_context_restored(|| hide_banner())
///     .custom_restoration(|surface, scene| rebuild_globe_arcs(surface, scene))
///     .enable_logging(true);
/// ```
pub struct RecoveryOptions<S> {
    pub(crate) on_context_lost: Option<LifecycleCallback>,
    pub(crate) on_context_restored: Option<LifecycleCallback>,
    pub(crate) custom_restoration: Option<CustomRestoration<S>>,
    pub(crate) settings: RecoverySettings,
}

impl<S> Default for RecoveryOptions<S> {
    fn default() -> Self {
        Self {
            on_context_lost: None,
            on_context_restored: None,
            custom_restoration: None,
            settings: RecoverySettings::default(),
        }
    }
}

impl<S> fmt::Debug for RecoveryOptions<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecoveryOptions")
            .field("on_context_lost", &self.on_context_lost.is_some())
            .field("on_context_restored", &self.on_context_restored.is_some())
            .field("custom_restoration", &self.custom_restoration.is_some())
            .field("settings", &self.settings)
            .finish()
    }
}

impl<S> RecoveryOptions<S> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Called after the context is marked unusable. Must not panic; a panic
    /// is caught and logged.
    #[must_use]
    pub fn on_context_lost(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_context_lost = Some(Box::new(callback));
        self
    }

    /// Called only after a restoration completed without error. Its absence
    /// after a loss means the recovery failed.
    #[must_use]
    pub fn on_context_restored(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_context_restored = Some(Box::new(callback));
        self
    }

    #[must_use]
    pub fn custom_restoration(mut self, routine: impl FnMut(&mut S, &mut Scene) -> Result<()> + 'static) -> Self {
        self.custom_restoration = Some(Box::new(routine));
        self
    }

    #[must_use]
    pub fn enable_logging(mut self, enabled: bool) -> Self {
        self.settings.enable_logging = Some(enabled);
        self
    }

    /// Replaces the data settings wholesale.
    #[must_use]
    pub fn with_settings(mut self, settings: RecoverySettings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn settings(&self) -> &RecoverySettings {
        &self.settings
    }
}

use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};

use crate::diagnostics::{Diagnostics, WarningKind};
use crate::errors::{RelumeError, Result};
use crate::recovery::options::{CustomRestoration, LifecycleCallback, RecoveryOptions};
use crate::recovery::procedure::{self, RecoveryReport};
use crate::recovery::settings::{Environment, RecoverySettings};
use crate::scene::Scene;
use crate::surface::{ContextEvent, ContextEvents, ContextLostEvent, ContextSignal, ListenerId, RenderSurface};

/// Snapshot of a handler's recovery state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecoveryStatus {
    pub context_lost: bool,
    pub recoveries: u64,
    pub failures: u64,
    pub attached: bool,
}

#[derive(Debug, Default)]
struct RecoveryState {
    context_lost: Cell<bool>,
    recoveries: Cell<u64>,
    failures: Cell<u64>,
    last_report: Cell<Option<RecoveryReport>>,
}

struct Callbacks<S> {
    on_lost: Option<LifecycleCallback>,
    on_restored: Option<LifecycleCallback>,
    custom: Option<CustomRestoration<S>>,
}

struct HandlerInner<S> {
    surface: Weak<RefCell<S>>,
    scene: Weak<RefCell<Scene>>,
    events: Weak<ContextEvents>,
    subscriptions: Cell<Option<(ListenerId, ListenerId)>>,

    state: RecoveryState,
    callbacks: RefCell<Callbacks<S>>,
    settings: RecoverySettings,
    diagnostics: RefCell<Diagnostics>,
    logging: bool,
}

/// Keeps a scene renderable across rendering-context loss.
///
/// Attaching subscribes to the surface's *lost* and *restored* signals. On
/// loss the platform default is suppressed and the context is flagged
/// unusable. On restoration the baseline surface configuration is
/// re-applied, every GPU-backed resource reachable from the scene roots is
/// marked as needing re-upload, the custom routine runs, and a redraw is
/// requested. Only when all of that succeeds is the caller's restoration
/// callback invoked; there is no automatic retry.
///
/// The handler holds weak references to the surface and scene. Dropping the
/// handler detaches it.
///
/// ```rust,ignore
/// let surface = HeadlessSurface::shared(SurfaceConfig::default());
/// let scene = Rc::new(RefCell::new(Scene::new()));
///
/// let recovery = ContextRecovery::attach(&surface, &scene, RecoveryOptions::new())?;
/// HeadlessSurface::lose_context(&surface);
/// assert!(recovery.is_context_lost());
/// HeadlessSurface::restore_context(&surface)?;
/// assert_eq!(recovery.recovery_count(), 1);
/// ```
pub struct ContextRecovery<S: RenderSurface + 'static> {
    inner: Rc<HandlerInner<S>>,
}

impl<S: RenderSurface + 'static> ContextRecovery<S> {
    /// Subscribes to `surface`'s context signals.
    ///
    /// Fails with [`RelumeError::SurfaceBusy`] if the surface is mutably
    /// borrowed at the time of the call.
    pub fn attach(surface: &Rc<RefCell<S>>, scene: &Rc<RefCell<Scene>>, options: RecoveryOptions<S>) -> Result<Self> {
        Self::attach_in(surface, scene, options, Environment::detect())
    }

    /// Like [`attach`](Self::attach) with an explicit environment for the
    /// logging default.
    pub fn attach_in(
        surface: &Rc<RefCell<S>>,
        scene: &Rc<RefCell<Scene>>,
        options: RecoveryOptions<S>,
        environment: Environment,
    ) -> Result<Self> {
        let events = surface
            .try_borrow()
            .map_err(|_| RelumeError::SurfaceBusy)?
            .context_events();

        let RecoveryOptions {
            on_context_lost,
            on_context_restored,
            custom_restoration,
            settings,
        } = options;
        let logging = settings.logging_enabled(environment);

        let inner = Rc::new(HandlerInner {
            surface: Rc::downgrade(surface),
            scene: Rc::downgrade(scene),
            events: Rc::downgrade(&events),
            subscriptions: Cell::new(None),
            state: RecoveryState::default(),
            callbacks: RefCell::new(Callbacks {
                on_lost: on_context_lost,
                on_restored: on_context_restored,
                custom: custom_restoration,
            }),
            settings,
            diagnostics: RefCell::new(Diagnostics::new(logging)),
            logging,
        });

        let weak = Rc::downgrade(&inner);
        let lost = events.subscribe(ContextSignal::Lost, move |event| {
            if let (Some(inner), ContextEvent::Lost(lost)) = (weak.upgrade(), event) {
                inner.handle_lost(lost);
            }
        });

        let weak = Rc::downgrade(&inner);
        let restored = events.subscribe(ContextSignal::Restored, move |_| {
            if let Some(inner) = weak.upgrade() {
                inner.handle_restored();
            }
        });

        inner.subscriptions.set(Some((lost, restored)));
        if logging {
            log::debug!("context recovery attached");
        }

        Ok(Self { inner })
    }

    /// `true` between a loss and the next restoration.
    #[must_use]
    pub fn is_context_lost(&self) -> bool {
        self.inner.state.context_lost.get()
    }

    /// Restorations handled since attach, successful or not.
    #[must_use]
    pub fn recovery_count(&self) -> u64 {
        self.inner.state.recoveries.get()
    }

    /// Restorations whose procedure failed.
    #[must_use]
    pub fn failure_count(&self) -> u64 {
        self.inner.state.failures.get()
    }

    /// Report of the most recent successful restoration.
    #[must_use]
    pub fn last_report(&self) -> Option<RecoveryReport> {
        self.inner.state.last_report.get()
    }

    #[must_use]
    pub fn status(&self) -> RecoveryStatus {
        RecoveryStatus {
            context_lost: self.is_context_lost(),
            recoveries: self.recovery_count(),
            failures: self.failure_count(),
            attached: self.is_attached(),
        }
    }

    /// Warning categories reported so far.
    #[must_use]
    pub fn warnings(&self) -> WarningKind {
        self.inner.diagnostics.borrow().warned()
    }

    /// Runs the restoration procedure now, without a signal.
    ///
    /// Marks the context usable and counts a recovery like a *restored*
    /// signal would, but reports failure to the caller instead of withholding
    /// the restoration callback (which is not invoked here).
    pub fn restore_now(&self) -> Result<RecoveryReport> {
        self.inner.begin_restoration();
        self.inner.finish_restoration(self.inner.run_procedure())
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.inner.subscriptions.get().is_some()
    }

    /// Unsubscribes both signals. Returns `false` if already detached.
    ///
    /// State is left as it is, including a pending loss.
    pub fn detach(&self) -> bool {
        let Some((lost, restored)) = self.inner.subscriptions.take() else {
            return false;
        };
        if let Some(events) = self.inner.events.upgrade() {
            events.unsubscribe(lost);
            events.unsubscribe(restored);
        }
        if self.inner.logging {
            log::debug!("context recovery detached");
        }
        true
    }
}

impl<S: RenderSurface + 'static> Drop for ContextRecovery<S> {
    fn drop(&mut self) {
        self.detach();
    }
}

impl<S: RenderSurface + 'static> std::fmt::Debug for ContextRecovery<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextRecovery").field("status", &self.status()).finish()
    }
}

impl<S: RenderSurface> HandlerInner<S> {
    fn handle_lost(&self, event: &ContextLostEvent) {
        event.prevent_default();

        if self.state.context_lost.replace(true) {
            self.warn_once(
                WarningKind::DUPLICATE_LOST,
                format_args!("context lost signal received while already lost"),
            );
        }
        if self.logging {
            log::warn!("rendering context lost; waiting for restoration");
        }

        self.notify(|callbacks| callbacks.on_lost.as_mut(), "context lost callback");
    }

    fn handle_restored(&self) {
        if !self.state.context_lost.get() {
            self.warn_once(
                WarningKind::RESTORED_WITHOUT_LOSS,
                format_args!("context restored signal received without a preceding loss"),
            );
        }

        self.begin_restoration();
        if self.finish_restoration(self.run_procedure()).is_ok() {
            self.notify(|callbacks| callbacks.on_restored.as_mut(), "context restored callback");
        }
    }

    fn warn_once(&self, kind: WarningKind, args: std::fmt::Arguments<'_>) {
        if let Ok(mut diagnostics) = self.diagnostics.try_borrow_mut() {
            diagnostics.warn_once(kind, args);
        }
    }

    fn begin_restoration(&self) {
        self.state.context_lost.set(false);
        self.state.recoveries.set(self.state.recoveries.get() + 1);
    }

    fn finish_restoration(&self, outcome: Result<RecoveryReport>) -> Result<RecoveryReport> {
        match &outcome {
            Ok(report) => {
                self.state.last_report.set(Some(*report));
                if self.logging {
                    log::info!(
                        "rendering context restored (#{}): {} drawables, {} materials, {} buffers, {} textures marked for re-upload",
                        self.state.recoveries.get(),
                        report.invalidated.drawables,
                        report.invalidated.materials,
                        report.invalidated.attributes + report.invalidated.index_buffers,
                        report.invalidated.textures,
                    );
                }
            }
            Err(err) => {
                self.state.failures.set(self.state.failures.get() + 1);
                if self.logging {
                    log::error!("rendering context restoration failed: {err}");
                }
            }
        }
        outcome
    }

    fn run_procedure(&self) -> Result<RecoveryReport> {
        let surface = self.surface.upgrade().ok_or(RelumeError::SurfaceDropped)?;
        let scene = self.scene.upgrade().ok_or(RelumeError::SceneDropped)?;

        let mut surface = surface.try_borrow_mut().map_err(|_| RelumeError::SurfaceBusy)?;
        let mut scene = scene.try_borrow_mut().map_err(|_| RelumeError::SceneBusy)?;
        let mut callbacks = self.callbacks.try_borrow_mut().map_err(|_| RelumeError::Reentrant)?;
        let mut diagnostics = self.diagnostics.try_borrow_mut().map_err(|_| RelumeError::Reentrant)?;

        // Host surface methods run in here too; a panic must not reach the signal source
        panic::catch_unwind(AssertUnwindSafe(|| {
            procedure::reprime(
                &mut *surface,
                &mut *scene,
                &self.settings,
                callbacks.custom.as_mut(),
                &mut diagnostics,
            )
        }))
        .unwrap_or_else(|payload| Err(RelumeError::from_panic("restoration", payload.as_ref())))
    }

    fn notify(
        &self,
        select: impl FnOnce(&mut Callbacks<S>) -> Option<&mut LifecycleCallback>,
        context: &'static str,
    ) {
        let Ok(mut callbacks) = self.callbacks.try_borrow_mut() else {
            if self.logging {
                log::error!("{context} skipped: handler re-entered");
            }
            return;
        };
        if let Some(callback) = select(&mut *callbacks)
            && let Err(err) = procedure::invoke_guarded(context, callback)
            && self.logging
        {
            log::error!("{err}");
        }
    }
}

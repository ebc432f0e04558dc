//! The restoration procedure proper, independent of signal handling.

use std::panic::{self, AssertUnwindSafe};

use crate::diagnostics::{Diagnostics, WarningKind};
use crate::errors::{RelumeError, Result};
use crate::recovery::options::{CustomRestoration, LifecycleCallback};
use crate::recovery::settings::RecoverySettings;
use crate::scene::{InvalidationReport, Scene};
use crate::surface::{RenderSurface, SurfaceConfig};

/// Outcome of one successful restoration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecoveryReport {
    /// Baseline configuration re-applied to the surface
    pub config: SurfaceConfig,
    pub invalidated: InvalidationReport,
    pub custom_restoration: bool,
}

/// Re-primes render state after the context came back:
///
/// 1. re-apply the baseline surface configuration
/// 2. mark materials, populated attribute/index buffers and textures of
///    every drawable as needing re-upload
/// 3. run the custom routine, if any
/// 4. request a redraw
///
/// The first error (or panic in the custom routine) aborts the remaining
/// steps.
pub fn reprime<S: RenderSurface>(
    surface: &mut S,
    scene: &mut Scene,
    settings: &RecoverySettings,
    custom: Option<&mut CustomRestoration<S>>,
    diagnostics: &mut Diagnostics,
) -> Result<RecoveryReport> {
    let config = settings.baseline(surface.current_config());
    if config.is_zero_sized() {
        diagnostics.warn_once(
            WarningKind::ZERO_SIZED_SURFACE,
            format_args!("restoring a {}x{} drawable; nothing will be visible", config.width, config.height),
        );
    }
    surface.apply_config(&config)?;

    let invalidated = scene.invalidate_gpu_resources(diagnostics);

    let custom_restoration = match custom {
        Some(routine) => {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| routine(&mut *surface, &mut *scene)));
            match outcome {
                Ok(result) => result?,
                Err(payload) => return Err(RelumeError::from_panic("custom restoration", payload.as_ref())),
            }
            true
        }
        None => false,
    };

    surface.request_redraw()?;

    Ok(RecoveryReport {
        config,
        invalidated,
        custom_restoration,
    })
}

/// Runs a caller callback, converting a panic into an error so it never
/// reaches the signal source.
pub(crate) fn invoke_guarded(context: &'static str, callback: &mut LifecycleCallback) -> Result<()> {
    panic::catch_unwind(AssertUnwindSafe(|| callback())).map_err(|payload| RelumeError::from_panic(context, payload.as_ref()))
}

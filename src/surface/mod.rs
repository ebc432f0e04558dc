//! Rendering surfaces
//!
//! A [`RenderSurface`] is the GPU-backed drawable the scene is presented on.
//! Its context can be invalidated by the platform at any time (driver reset,
//! tab suspension, resource exhaustion) and later revalidated; both
//! transitions are announced through the surface's [`ContextEvents`].
//!
//! Implementations:
//! - [`HeadlessSurface`]: in-process surface with lazy resource upload
//! - `WebCanvasSurface` (`wasm32` + `web` feature): a browser canvas

pub mod events;
pub mod headless;
#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub mod web;

use std::rc::Rc;

use crate::errors::{RelumeError, Result};

pub use events::{ContextEvent, ContextEvents, ContextLostEvent, ContextSignal, ListenerId};
pub use headless::{FrameStats, HeadlessSurface};
#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub use web::WebCanvasSurface;

/// Baseline surface configuration.
///
/// | Field         | Description                          |
/// |---------------|--------------------------------------|
/// | `pixel_ratio` | Physical pixels per logical pixel    |
/// | `width`       | Drawable width in logical pixels     |
/// | `height`      | Drawable height in logical pixels    |
/// | `clear_color` | Framebuffer clear color              |
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceConfig {
    pub pixel_ratio: f32,
    pub width: u32,
    pub height: u32,
    pub clear_color: wgpu::Color,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            pixel_ratio: 1.0,
            width: 1,
            height: 1,
            clear_color: wgpu::Color::BLACK,
        }
    }
}

impl SurfaceConfig {
    /// Size of the backing store in physical pixels.
    #[must_use]
    pub fn physical_size(&self) -> (u32, u32) {
        (
            (self.width as f32 * self.pixel_ratio).round() as u32,
            (self.height as f32 * self.pixel_ratio).round() as u32,
        )
    }

    #[must_use]
    pub fn is_zero_sized(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Rejects configurations no surface can apply. A zero-sized drawable is
    /// valid (hidden canvases report it).
    pub fn validate(&self) -> Result<()> {
        if !self.pixel_ratio.is_finite() || self.pixel_ratio <= 0.0 {
            return Err(RelumeError::InvalidSurfaceConfig(format!(
                "pixel ratio must be finite and positive, got {}",
                self.pixel_ratio
            )));
        }
        let c = self.clear_color;
        if [c.r, c.g, c.b, c.a].iter().any(|v| !v.is_finite()) {
            return Err(RelumeError::InvalidSurfaceConfig("clear color has a non-finite channel".to_string()));
        }
        Ok(())
    }
}

/// A drawable whose GPU context may be lost and restored.
pub trait RenderSurface {
    /// Signal hub for this surface's context lifecycle.
    fn context_events(&self) -> Rc<ContextEvents>;

    /// The configuration the surface should have right now, as reported by
    /// the host environment (current pixel density, current layout size).
    fn current_config(&self) -> SurfaceConfig;

    /// Applies pixel density, drawable size and clear color.
    fn apply_config(&mut self, config: &SurfaceConfig) -> Result<()>;

    /// Asks for a frame to be drawn at the next opportunity.
    fn request_redraw(&mut self) -> Result<()>;
}

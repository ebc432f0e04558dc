//! Browser canvas surface (`wasm32` + `web` feature).
//!
//! Forwards the canvas's `webglcontextlost` / `webglcontextrestored` DOM
//! events to a [`ContextEvents`] hub. When a hub listener prevents the
//! default of the loss, the DOM event's default is prevented too, which is
//! what allows the browser to restore the context later.

use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;

use crate::errors::{RelumeError, Result};
use crate::surface::events::ContextEvents;
use crate::surface::{RenderSurface, SurfaceConfig};

const LOST_EVENT: &str = "webglcontextlost";
const RESTORED_EVENT: &str = "webglcontextrestored";

type DomListener = Closure<dyn FnMut(web_sys::Event)>;

pub struct WebCanvasSurface {
    canvas: web_sys::HtmlCanvasElement,
    events: Rc<ContextEvents>,
    clear_color: wgpu::Color,
    redraw_requested: bool,
    on_lost: DomListener,
    on_restored: DomListener,
}

impl WebCanvasSurface {
    /// Wraps `canvas` and starts listening for its context events.
    pub fn new(canvas: web_sys::HtmlCanvasElement) -> Result<Self> {
        let events = Rc::new(ContextEvents::new());

        let hub = Rc::clone(&events);
        let on_lost = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
            let lost = hub.dispatch_lost();
            if lost.default_prevented() {
                event.prevent_default();
            }
        });

        let hub = Rc::clone(&events);
        let on_restored = Closure::<dyn FnMut(web_sys::Event)>::new(move |_event: web_sys::Event| {
            hub.dispatch_restored();
        });

        canvas.add_event_listener_with_callback(LOST_EVENT, on_lost.as_ref().unchecked_ref())?;
        canvas.add_event_listener_with_callback(RESTORED_EVENT, on_restored.as_ref().unchecked_ref())?;

        Ok(Self {
            canvas,
            events,
            clear_color: wgpu::Color::BLACK,
            redraw_requested: false,
            on_lost,
            on_restored,
        })
    }

    /// Looks the canvas up by element id.
    pub fn from_element_id(id: &str) -> Result<Self> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| RelumeError::Web("no document".to_string()))?;
        let canvas = document
            .get_element_by_id(id)
            .ok_or_else(|| RelumeError::Web(format!("canvas element '{id}' not found")))?
            .dyn_into::<web_sys::HtmlCanvasElement>()
            .map_err(|_| RelumeError::Web(format!("element '{id}' is not a canvas")))?;
        Self::new(canvas)
    }

    #[must_use]
    pub fn canvas(&self) -> &web_sys::HtmlCanvasElement {
        &self.canvas
    }

    #[must_use]
    pub fn clear_color(&self) -> wgpu::Color {
        self.clear_color
    }

    /// Returns and clears the pending redraw request; polled by the host's
    /// animation-frame loop.
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }
}

impl RenderSurface for WebCanvasSurface {
    fn context_events(&self) -> Rc<ContextEvents> {
        Rc::clone(&self.events)
    }

    fn current_config(&self) -> SurfaceConfig {
        let pixel_ratio = web_sys::window().map_or(1.0, |w| w.device_pixel_ratio()) as f32;
        SurfaceConfig {
            pixel_ratio,
            width: self.canvas.client_width().max(0) as u32,
            height: self.canvas.client_height().max(0) as u32,
            clear_color: self.clear_color,
        }
    }

    fn apply_config(&mut self, config: &SurfaceConfig) -> Result<()> {
        config.validate()?;
        let (width, height) = config.physical_size();
        self.canvas.set_width(width.max(1));
        self.canvas.set_height(height.max(1));
        self.clear_color = config.clear_color;
        Ok(())
    }

    fn request_redraw(&mut self) -> Result<()> {
        self.redraw_requested = true;
        Ok(())
    }
}

impl Drop for WebCanvasSurface {
    fn drop(&mut self) {
        let _ = self
            .canvas
            .remove_event_listener_with_callback(LOST_EVENT, self.on_lost.as_ref().unchecked_ref());
        let _ = self
            .canvas
            .remove_event_listener_with_callback(RESTORED_EVENT, self.on_restored.as_ref().unchecked_ref());
    }
}

/// Routes `log` records to the browser console and panics to
/// `console.error`. Call once at startup.
pub fn init_logging(level: log::Level) {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(level).is_err() {
        log::debug!("console logger already installed");
    }
}

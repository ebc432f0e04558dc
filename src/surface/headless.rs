//! In-process rendering surface.
//!
//! `HeadlessSurface` stands in for a real GPU context where no windowing
//! layer exists. It keeps a residency set of the resources it has "uploaded"
//! and regenerates them lazily on [`render`](HeadlessSurface::render): a
//! resource is uploaded when it needs upload or when it is not resident. A
//! simulated context loss drops the whole residency set.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashSet;
use uuid::Uuid;

use crate::assets::TextureHandle;
use crate::errors::{RelumeError, Result};
use crate::scene::Scene;
use crate::surface::events::{ContextEvents, ContextLostEvent};
use crate::surface::{RenderSurface, SurfaceConfig};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ResidentKey {
    Attribute(Uuid, String),
    Index(Uuid),
    Material(Uuid),
    Texture(Uuid),
}

/// Counters for one [`HeadlessSurface::render`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub draw_calls: usize,
    pub buffer_uploads: usize,
    pub material_uploads: usize,
    pub texture_uploads: usize,
    pub bytes_uploaded: usize,
}

impl FrameStats {
    #[must_use]
    pub fn total_uploads(&self) -> usize {
        self.buffer_uploads + self.material_uploads + self.texture_uploads
    }
}

#[derive(Debug)]
pub struct HeadlessSurface {
    events: Rc<ContextEvents>,

    /// What the "host environment" currently reports
    host_metrics: SurfaceConfig,
    applied: Vec<SurfaceConfig>,

    context_lost: bool,
    restorable: bool,
    resident: FxHashSet<ResidentKey>,

    redraw_requested: bool,
    redraw_requests: u64,
    frames: u64,

    apply_failure: Option<String>,
}

impl HeadlessSurface {
    #[must_use]
    pub fn new(host_metrics: SurfaceConfig) -> Self {
        Self {
            events: Rc::new(ContextEvents::new()),
            host_metrics,
            applied: Vec::new(),
            context_lost: false,
            restorable: true,
            resident: FxHashSet::default(),
            redraw_requested: false,
            redraw_requests: 0,
            frames: 0,
            apply_failure: None,
        }
    }

    /// Convenience constructor returning the shared handle hosts keep.
    #[must_use]
    pub fn shared(host_metrics: SurfaceConfig) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new(host_metrics)))
    }

    /// Simulates a window resize or pixel-density change.
    pub fn set_host_metrics(&mut self, metrics: SurfaceConfig) {
        self.host_metrics = metrics;
    }

    /// Makes the next [`apply_config`](RenderSurface::apply_config) fail.
    pub fn inject_apply_failure(&mut self, message: &str) {
        self.apply_failure = Some(message.to_string());
    }

    // ========================================================================
    // Context lifecycle
    // ========================================================================

    /// Invalidates the context and delivers the *lost* signal.
    ///
    /// When no listener prevents the default, the context is given up for
    /// good and [`restore_context`](Self::restore_context) will fail.
    pub fn lose_context(surface: &Rc<RefCell<Self>>) -> ContextLostEvent {
        let events = {
            let mut s = surface.borrow_mut();
            s.context_lost = true;
            s.resident.clear();
            s.redraw_requested = false;
            Rc::clone(&s.events)
        };

        let event = events.dispatch_lost();

        if !event.default_prevented() {
            surface.borrow_mut().restorable = false;
        }
        event
    }

    /// Revalidates the context and delivers the *restored* signal.
    pub fn restore_context(surface: &Rc<RefCell<Self>>) -> Result<()> {
        let events = {
            let mut s = surface.borrow_mut();
            if !s.restorable {
                return Err(RelumeError::ContextUnrestorable);
            }
            s.context_lost = false;
            Rc::clone(&s.events)
        };

        events.dispatch_restored();
        Ok(())
    }

    #[must_use]
    pub fn is_context_lost(&self) -> bool {
        self.context_lost
    }

    #[must_use]
    pub fn is_restorable(&self) -> bool {
        self.restorable
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    #[must_use]
    pub fn applied_configs(&self) -> &[SurfaceConfig] {
        &self.applied
    }

    #[must_use]
    pub fn active_config(&self) -> Option<&SurfaceConfig> {
        self.applied.last()
    }

    #[must_use]
    pub fn redraw_requested(&self) -> bool {
        self.redraw_requested
    }

    #[must_use]
    pub fn redraw_requests(&self) -> u64 {
        self.redraw_requests
    }

    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    #[must_use]
    pub fn resident_count(&self) -> usize {
        self.resident.len()
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Draws every visible drawable, uploading stale or non-resident
    /// resources first.
    pub fn render(&mut self, scene: &mut Scene) -> Result<FrameStats> {
        if self.context_lost {
            return Err(RelumeError::ContextLost);
        }

        let mut stats = FrameStats::default();

        for (node, key) in scene.drawables() {
            let node_visible = scene.get_node(node).is_some_and(|n| n.visible);
            let Some(mesh) = scene.meshes.get(key) else {
                continue;
            };
            if !node_visible || !mesh.visible {
                continue;
            }
            let (geometry, material) = (mesh.geometry, mesh.material);

            if let Some(geo) = scene.assets.geometries.get_mut(geometry) {
                let uuid = geo.uuid;
                for (name, attr) in geo.attributes_mut() {
                    if !attr.is_populated() {
                        continue;
                    }
                    let k = ResidentKey::Attribute(uuid, name.clone());
                    if attr.needs_upload() || !self.resident.contains(&k) {
                        stats.buffer_uploads += 1;
                        stats.bytes_uploaded += attr.bytes().len();
                        attr.mark_uploaded();
                        self.resident.insert(k);
                    }
                }
                if let Some(index) = geo.index_mut().filter(|i| i.is_populated()) {
                    let k = ResidentKey::Index(uuid);
                    if index.needs_upload() || !self.resident.contains(&k) {
                        stats.buffer_uploads += 1;
                        stats.bytes_uploaded += index.bytes().len();
                        index.mark_uploaded();
                        self.resident.insert(k);
                    }
                }
            }

            let mut textures: Vec<TextureHandle> = Vec::new();
            if let Some(mat) = scene.assets.materials.get_mut(material) {
                let k = ResidentKey::Material(mat.uuid);
                if mat.needs_upload() || !self.resident.contains(&k) {
                    stats.material_uploads += 1;
                    mat.mark_uploaded();
                    self.resident.insert(k);
                }
                textures.extend(mat.textures().iter().map(|(_, h)| h));
            }

            for handle in textures {
                if let Some(tex) = scene.assets.textures.get_mut(handle) {
                    let k = ResidentKey::Texture(tex.uuid);
                    if tex.needs_upload() || !self.resident.contains(&k) {
                        stats.texture_uploads += 1;
                        stats.bytes_uploaded += tex.data.as_ref().map_or(0, Vec::len);
                        tex.mark_uploaded();
                        self.resident.insert(k);
                    }
                }
            }

            stats.draw_calls += 1;
        }

        self.redraw_requested = false;
        self.frames += 1;
        Ok(stats)
    }
}

impl RenderSurface for HeadlessSurface {
    fn context_events(&self) -> Rc<ContextEvents> {
        Rc::clone(&self.events)
    }

    fn current_config(&self) -> SurfaceConfig {
        self.host_metrics
    }

    fn apply_config(&mut self, config: &SurfaceConfig) -> Result<()> {
        if let Some(message) = self.apply_failure.take() {
            return Err(RelumeError::InvalidSurfaceConfig(message));
        }
        if self.context_lost {
            return Err(RelumeError::ContextLost);
        }
        config.validate()?;
        self.applied.push(*config);
        Ok(())
    }

    fn request_redraw(&mut self) -> Result<()> {
        if self.context_lost {
            return Err(RelumeError::ContextLost);
        }
        self.redraw_requested = true;
        self.redraw_requests += 1;
        Ok(())
    }
}

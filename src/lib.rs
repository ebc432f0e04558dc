#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod assets;
pub mod diagnostics;
pub mod errors;
pub mod recovery;
pub mod resources;
pub mod scene;
pub mod surface;

pub use assets::{AssetStore, GeometryHandle, MaterialHandle, TextureHandle};
pub use diagnostics::{Diagnostics, WarningKind};
pub use errors::{RelumeError, Result};
pub use recovery::{ContextRecovery, Environment, RecoveryOptions, RecoveryReport, RecoverySettings};
pub use resources::primitives::*;
pub use resources::{Attribute, Geometry, Material, MaterialFeatures, Mesh, Texture, TextureSlot};
pub use scene::{InvalidationReport, Node, NodeHandle, Scene};
pub use surface::{ContextEvents, ContextLostEvent, HeadlessSurface, RenderSurface, SurfaceConfig};
#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub use surface::WebCanvasSurface;

//! Rendering-context loss recovery
//!
//! - [`ContextRecovery`]: attaches to a surface and reacts to its signals
//! - [`RecoveryOptions`]: caller callbacks plus [`RecoverySettings`]
//! - [`procedure::reprime`]: the restoration steps, usable on their own

pub mod handler;
pub mod options;
pub mod procedure;
pub mod settings;

pub use handler::{ContextRecovery, RecoveryStatus};
pub use options::{CustomRestoration, LifecycleCallback, RecoveryOptions};
pub use procedure::RecoveryReport;
pub use settings::{Environment, RecoverySettings};

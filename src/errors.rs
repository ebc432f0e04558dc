//! Error Types
//!
//! This module defines the error type used throughout the crate.
//!
//! # Overview
//!
//! [`RelumeError`] covers every failure mode of the recovery layer:
//! - Rendering context state (lost, unrestorable)
//! - Access to the host-owned surface and scene graph
//! - Surface configuration and material setup
//! - Caller-supplied restoration logic
//! - Settings parsing
//!
//! # Usage
//!
//! All fallible APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, RelumeError>`.
//!
//! ```rust,ignore
//! use relume::errors::{RelumeError, Result};
//!
//! fn restore_shaders() -> Result<()> {
//!     Err(RelumeError::CustomRestoration("shader cache missing".into()))
//! }
//! ```

use thiserror::Error;

use crate::resources::material::TextureSlot;

/// The main error type for the recovery layer.
#[derive(Error, Debug)]
pub enum RelumeError {
    // ========================================================================
    // Context State Errors
    // ========================================================================
    /// The rendering context is currently lost; GPU work cannot be issued.
    #[error("Rendering context is lost")]
    ContextLost,

    /// The platform marked the context permanently dead because the loss
    /// event's default handling was not suppressed.
    #[error("Rendering context cannot be restored (loss default was not prevented)")]
    ContextUnrestorable,

    // ========================================================================
    // Host Ownership Errors
    // ========================================================================
    /// The rendering surface was dropped by its owner.
    #[error("Rendering surface is no longer alive")]
    SurfaceDropped,

    /// The scene graph was dropped by its owner.
    #[error("Scene graph is no longer alive")]
    SceneDropped,

    /// The host held a borrow of the surface while a signal was delivered.
    #[error("Rendering surface is borrowed elsewhere")]
    SurfaceBusy,

    /// The host held a borrow of the scene graph while a signal was delivered.
    #[error("Scene graph is borrowed elsewhere")]
    SceneBusy,

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// The surface configuration is not applicable.
    #[error("Invalid surface configuration: {0}")]
    InvalidSurfaceConfig(String),

    /// A texture slot was set on a material kind that has no such slot.
    #[error("Material kind '{kind}' has no {slot:?} slot")]
    UnsupportedTextureSlot {
        /// Shader name of the material kind
        kind: &'static str,
        /// The rejected slot
        slot: TextureSlot,
    },

    /// Settings could not be parsed.
    #[error("Settings parse error: {0}")]
    Config(#[from] serde_json::Error),

    // ========================================================================
    // Restoration Errors
    // ========================================================================
    /// The caller-supplied restoration routine reported a failure.
    #[error("Custom restoration failed: {0}")]
    CustomRestoration(String),

    /// The handler was re-entered from one of its own callbacks.
    #[error("Recovery handler re-entered from its own callback")]
    Reentrant,

    /// A caller-supplied routine panicked.
    #[error("{context} panicked: {message}")]
    Panicked {
        /// Which routine panicked
        context: &'static str,
        /// Panic payload, when it was a string
        message: String,
    },

    // ========================================================================
    // Platform-Specific Errors
    // ========================================================================
    /// Browser API failure.
    #[cfg(all(target_arch = "wasm32", feature = "web"))]
    #[error("Web error: {0}")]
    Web(String),
}

impl RelumeError {
    /// Builds a [`RelumeError::Panicked`] from a `catch_unwind` payload.
    #[must_use]
    pub fn from_panic(context: &'static str, payload: &(dyn std::any::Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        RelumeError::Panicked { context, message }
    }
}

#[cfg(all(target_arch = "wasm32", feature = "web"))]
impl From<wasm_bindgen::JsValue> for RelumeError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        RelumeError::Web(format!("{value:?}"))
    }
}

/// Alias for `Result<T, RelumeError>`.
pub type Result<T> = std::result::Result<T, RelumeError>;

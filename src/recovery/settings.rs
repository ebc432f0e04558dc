//! Recovery settings
//!
//! The data half of the handler configuration: everything that can be read
//! from a config file or the environment. Callbacks live in
//! [`RecoveryOptions`](crate::recovery::RecoveryOptions).
//!
//! # Example
//!
//! ```rust,ignore
//! use relume::recovery::RecoverySettings;
//!
//! // Force logging on and pin the clear color restored after a loss
//! let settings = RecoverySettings {
//!     enable_logging: Some(true),
//!     clear_color: Some([0.02, 0.02, 0.05, 1.0]),
//!     ..Default::default()
//! };
//!
//! // Or from JSON
//! let settings = RecoverySettings::from_json_str(r#"{ "enableLogging": false }"#)?;
//! ```

use serde::Deserialize;

use crate::errors::Result;
use crate::surface::SurfaceConfig;

/// Deployment environment, used to pick logging defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Test,
    Production,
}

impl Environment {
    /// Environment variable consulted by [`detect`](Self::detect).
    pub const ENV_VAR: &'static str = "RELUME_ENV";

    /// Reads [`ENV_VAR`](Self::ENV_VAR); when unset, debug builds count as
    /// development and release builds as production.
    #[must_use]
    pub fn detect() -> Self {
        Self::detect_from(std::env::var(Self::ENV_VAR).ok().as_deref())
    }

    /// [`detect`](Self::detect) over an already-read variable value.
    #[must_use]
    pub fn detect_from(value: Option<&str>) -> Self {
        match value {
            Some(value) => Self::parse(value),
            None if cfg!(debug_assertions) => Self::Development,
            None => Self::Production,
        }
    }

    /// Lenient parse; unknown values are treated as development.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "test" => Self::Test,
            _ => Self::Development,
        }
    }

    /// Logging is on everywhere except production.
    #[must_use]
    pub fn logging_default(self) -> bool {
        !matches!(self, Self::Production)
    }
}

/// | Field            | Description                                   | Default              |
/// |------------------|-----------------------------------------------|----------------------|
/// | `enable_logging` | Emit log records from the handler             | per [`Environment`]  |
/// | `pixel_ratio`    | Pixel density re-applied after restoration    | host-reported        |
/// | `clear_color`    | RGBA clear color re-applied after restoration | host-reported        |
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecoverySettings {
    #[serde(alias = "enableLogging")]
    pub enable_logging: Option<bool>,
    #[serde(alias = "pixelRatio")]
    pub pixel_ratio: Option<f32>,
    #[serde(alias = "clearColor")]
    pub clear_color: Option<[f64; 4]>,
}

impl RecoverySettings {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Explicit setting first, environment default otherwise.
    #[must_use]
    pub fn logging_enabled(&self, environment: Environment) -> bool {
        self.enable_logging.unwrap_or_else(|| environment.logging_default())
    }

    /// Baseline to re-apply: what the host reports, with overrides on top.
    #[must_use]
    pub fn baseline(&self, reported: SurfaceConfig) -> SurfaceConfig {
        let mut config = reported;
        if let Some(ratio) = self.pixel_ratio {
            config.pixel_ratio = ratio;
        }
        if let Some([r, g, b, a]) = self.clear_color {
            config.clear_color = wgpu::Color { r, g, b, a };
        }
        config
    }
}

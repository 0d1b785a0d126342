//! `appify-config`: Appify runtime configuration.
//!
//! Provides:
//! - Typed config schema with defaults for every field
//! - YAML loading (missing file = defaults)
//! - Environment variable overrides
//! - Validation into errors and warnings

pub mod defaults;
pub mod env;
pub mod io;
pub mod schema;
pub mod validation;

pub use env::{apply_env_overrides, apply_env_overrides_with, OVERRIDE_VARS};
pub use io::{config_file_path, load_config};
pub use schema::{AppifyConfig, GeneratorConfig};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{bail, Result};
use std::path::Path;

/// Load the file, apply env overrides, and validate.
///
/// Warnings are logged; any validation error fails the load.
pub async fn load_and_prepare(path: &Path) -> Result<AppifyConfig> {
    let config = load_config(path).await?;
    let config = apply_env_overrides(config)?;

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
    if let Some(first) = report.errors.first() {
        bail!("invalid configuration ({} error(s)); first: {first}", report.errors.len());
    }

    Ok(config)
}

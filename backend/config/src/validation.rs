//! Config validation with user-friendly error messages.

use crate::defaults::SUPPORTED_LANGS;
use crate::schema::AppifyConfig;
use thiserror::Error;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// Errors and warnings found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &AppifyConfig) -> ValidationReport {
    let mut report = ValidationReport::default();

    if !SUPPORTED_LANGS.contains(&config.lang.as_str()) {
        report.error(
            "lang",
            format!("Unknown language '{}'. Use one of: {}", config.lang, SUPPORTED_LANGS.join(", ")),
        );
    }
    if config.max_tries == 0 {
        report.error("max_tries", "max_tries must be >= 1");
    }
    if config.history_cap == 0 {
        report.error("history_cap", "history_cap must be >= 1");
    }
    if config.script_path.as_os_str().is_empty() {
        report.error("script_path", "script_path cannot be empty");
    }
    if config.generator.api_key.as_deref().map(str::is_empty).unwrap_or(true) {
        report.warn(
            "generator.api_key",
            "No shared API key configured; every user must supply their own",
        );
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_only_warn_about_key() {
        let report = validate(&AppifyConfig::default());
        assert!(report.is_valid(), "errors: {:?}", report.errors);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].path, "generator.api_key");
    }

    #[test]
    fn collects_every_error() {
        let mut cfg = AppifyConfig::default();
        cfg.lang = "de".to_string();
        cfg.max_tries = 0;
        cfg.history_cap = 0;
        cfg.script_path = Default::default();
        cfg.generator.api_key = Some("sk-x".to_string());

        let report = validate(&cfg);
        let paths: Vec<_> = report.errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["lang", "max_tries", "history_cap", "script_path"]);
        assert!(report.warnings.is_empty());
    }
}

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::fs;
use tracing::{debug, info};

use appify_core::{ChatStore, UserId};

use crate::template;

/// Owns the runnable app file and keeps the store's copy of the code in sync.
pub struct CodeMaterializer {
    script_path: PathBuf,
    store: Arc<dyn ChatStore>,
}

impl CodeMaterializer {
    pub fn new(script_path: impl Into<PathBuf>, store: Arc<dyn ChatStore>) -> Self {
        Self {
            script_path: script_path.into(),
            store,
        }
    }

    pub fn script_path(&self) -> &Path {
        &self.script_path
    }

    /// Make `code` the live code for `user`.
    ///
    /// The indented form is stored first, then the runnable file is rewritten
    /// in full. `None` leaves both untouched.
    pub async fn apply(&self, user: UserId, code: Option<&str>) -> Result<()> {
        let Some(code) = code else {
            debug!(user_id = user, "[Materializer] Nothing to apply");
            return Ok(());
        };

        let indented = template::indent(code);
        self.store
            .set_code(user, &indented)
            .await
            .context("Failed to persist applied code")?;

        if let Some(parent) = self.script_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.with_context(|| {
                    format!("Failed to create app directory: {}", parent.display())
                })?;
            }
        }

        fs::write(&self.script_path, template::render(&indented))
            .await
            .with_context(|| format!("Failed to write app file: {}", self.script_path.display()))?;

        info!(
            user_id = user,
            path = %self.script_path.display(),
            lines = code.lines().count(),
            "[Materializer] Applied code"
        );
        Ok(())
    }

    /// The de-indented user code currently in the runnable file.
    ///
    /// A missing file reads as "no code".
    pub async fn read_live_code(&self) -> Result<Option<String>> {
        if !fs::try_exists(&self.script_path).await.unwrap_or(false) {
            debug!(path = %self.script_path.display(), "[Materializer] App file does not exist yet");
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.script_path)
            .await
            .with_context(|| format!("Failed to read app file: {}", self.script_path.display()))?;
        Ok(template::extract(&contents))
    }
}

use thiserror::Error;

/// Top-level error type for the Appify runtime.
#[derive(Debug, Error)]
pub enum AppifyError {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("code generation failed ({provider}): {message}")]
    Generation { provider: String, message: String },

    #[error("could not materialize code: {0}")]
    Materialize(String),

    #[error("configuration error: {0}")]
    Config(String),

    /// The user spent every free attempt and has no API key override.
    #[error("attempt quota exhausted after {tries} tries")]
    QuotaExceeded { tries: u32 },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppifyError {
    /// Wrap a store failure, keeping its whole context chain in the message.
    pub fn storage(err: anyhow::Error) -> Self {
        Self::Storage(format!("{err:#}"))
    }

    pub fn materialize(err: anyhow::Error) -> Self {
        Self::Materialize(format!("{err:#}"))
    }
}

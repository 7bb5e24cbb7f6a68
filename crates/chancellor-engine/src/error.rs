//! Error types for the engine binary.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: chancellor_core::ConfigError,
    },

    /// The final autosave could not be read back.
    #[error("autosave in {key} could not be restored")]
    Resume {
        /// Store key of the save slot.
        key: String,
    },
}

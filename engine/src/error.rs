use thiserror::Error;

/// Structural failures surfaced to callers. Numeric edge cases on the
/// scoring path (zero-norm vectors, zero maxima, unknown terms) are
/// handled locally with documented defaults and are never errors.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Invalid parameter at construction; nothing is built.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A search arrived before any engine was constructed. Raised by the
    /// serving layer, never by a built engine.
    #[error("search engine is not ready")]
    NotReady,
}

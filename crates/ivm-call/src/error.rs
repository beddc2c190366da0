//! Error types for prompt rendering and menu construction.

/// Errors raised while rendering a prompt template.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PromptError {
    /// The template references a variable that is not configured.
    #[error("missing variable: ${0}")]
    MissingVariable(String),

    /// A `$` is not followed by an identifier, `{identifier}`, or `$`.
    #[error("invalid placeholder at byte {position}")]
    InvalidPlaceholder { position: usize },
}

/// Errors raised while building a [`Menu`](crate::Menu).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MenuError {
    /// The key is not a single keypad symbol (`0`-`9`, `*`, `#`).
    #[error("invalid menu key: {0:?}")]
    InvalidKey(String),

    /// Two entries share a key.
    #[error("duplicate menu key: {0:?}")]
    DuplicateKey(String),
}

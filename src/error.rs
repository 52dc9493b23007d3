//! Errors raised while wiring page enhancements.
//!
//! None of these ever reach the visitor: the content-ready boundary in
//! [`crate::app`] logs them and carries on with whatever already initialized.

/// Failure modes of enhancement setup and host access.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnhanceError {
    /// No global `window` object (not running in a browser).
    #[error("no window available")]
    NoWindow,

    /// The window exposes no `document`.
    #[error("no document available")]
    NoDocument,

    /// The document has no `<body>` to carry the theme marker.
    #[error("document has no body")]
    MissingBody,

    /// Local storage is disabled or inaccessible.
    #[error("local storage unavailable")]
    StorageUnavailable,

    /// A host call threw a JavaScript exception.
    #[error("host call failed: {0}")]
    Js(String),

    /// The inline configuration block could not be parsed.
    #[error("config parse failed: {0}")]
    ConfigParse(String),

    /// A configuration value is out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl From<serde_json::Error> for EnhanceError {
    fn from(err: serde_json::Error) -> Self {
        Self::ConfigParse(err.to_string())
    }
}

//! Error type shared by every PD crate.

/// Recoverable editor failures.
///
/// Programming errors (activating a detached mode) panic instead; silently
/// absorbed cases (too-short freehand outlines, empty hit tests) are plain
/// no-ops and never surface here.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    /// A coordinate-space name other than `absolute` / `relative`.
    #[error("invalid coordinate space `{0}`: expected `absolute` or `relative`")]
    InvalidCoordinateSpace(String),

    /// A polygon group was requested with no vertices.
    #[error("a polygon outline needs at least one vertex")]
    EmptyOutline,

    /// Configuration JSON with an unknown key or a value of the wrong type.
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),

    /// The backdrop image could not be loaded.
    #[error("backdrop failed to load: {0}")]
    Backdrop(String),
}

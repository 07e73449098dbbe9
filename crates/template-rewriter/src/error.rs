//! Rewrite error types.

use thiserror::Error;

/// An error from setting up a rewrite or updating a previously generated file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RewriteError {
    /// A generated-section marker is not in the file.
    #[error("generated section marker not found: {marker}")]
    MissingMarker {
        /// The marker text that was looked for.
        marker: String,
    },

    /// The end marker comes before the start marker.
    #[error("generated section end marker precedes its start marker")]
    MisorderedMarkers,

    /// Marker-comment mode needs a prefix to recognise values from earlier runs.
    #[error("identity prefix must not be empty")]
    EmptyPrefix,
}

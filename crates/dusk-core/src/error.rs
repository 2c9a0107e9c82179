/// Alias for `Result<T, MapError>`.
pub type MapResult<T> = Result<T, MapError>;

/// Errors raised while loading a map into a [`crate::MapIndex`].
///
/// Malformed references inside an otherwise usable map are not errors: they
/// are logged and resolved as "not found" at query time.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    /// The map has no sectors, so no point can ever be located.
    #[error("map \"{0}\" has no sectors")]
    NoSectors(String),

    /// A vertex coordinate is NaN or infinite.
    #[error("map \"{map}\" vertex {index} has a non-finite coordinate")]
    NonFiniteVertex {
        /// Map name.
        map: String,
        /// Offending vertex.
        index: usize,
    },

    /// The map spans more space than the blockmap grid can cover.
    #[error("map \"{map}\" is too large for a blockmap ({width} x {height} units)")]
    BlockmapTooLarge {
        /// Map name.
        map: String,
        /// Horizontal extent.
        width: f32,
        /// Vertical extent.
        height: f32,
    },

    /// The map interchange document could not be parsed.
    #[error("invalid map document: {0}")]
    Parse(#[from] serde_json::Error),
}

use dusk_core::MapError;

/// Alias for `Result<T, SimError>`.
pub type SimResult<T> = Result<T, SimError>;

/// Errors raised by the simulation.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// A gameplay operation ran before any level was loaded.
    #[error("no active level: load a map before ticking")]
    NoActiveLevel,

    /// The map could not be indexed.
    #[error(transparent)]
    Map(#[from] MapError),

    /// A configuration or save document could not be (de)serialized.
    #[error("invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),
}

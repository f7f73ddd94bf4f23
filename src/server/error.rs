use std::io;
use thiserror::Error;
use uuid::Uuid;

/// Recoverable failures produced while applying one request.
///
/// None of these stop the server: the dispatcher logs them as warnings and
/// keeps processing. Only startup failures (bind, config, audit file) are
/// fatal, and those never reach this type.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The targeted client never added a value, so it has no set.
    #[error("client '{0}' has no stored values")]
    ClientNotFound(Uuid),

    /// The client exists but does not hold the targeted value.
    #[error("client '{client_id}' does not hold value '{value}'")]
    ValueNotFound { client_id: Uuid, value: String },

    /// The operation requires an item value and the request carried none.
    #[error("request type '{0}' requires an item value")]
    MissingValue(&'static str),

    /// The audit line could not be written.
    #[error("writing audit record failed: {0}")]
    Record(#[from] io::Error),
}

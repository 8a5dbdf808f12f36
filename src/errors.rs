use thiserror::Error;

/// Unified error type for the lookup core.
#[derive(Debug, Error)]
pub enum Error {
    /// A store operation was requested without a resolvable server id.
    /// Never defaulted away: every record table belongs to exactly one server.
    #[error("Operation requires a server context, but none was provided")]
    MissingTenant,

    /// Configuration error (bad settings file, invalid extraction pattern).
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong while loading or applying configuration
        message: String,
    },

    /// Durable-state error on the write path. Read-path failures are
    /// recovered locally with an empty table instead (see `store`).
    #[error("Storage error: {message}")]
    Storage {
        /// What went wrong while persisting a record table
        message: String,
    },

    /// The surrounding chat layer failed while fetching message state.
    #[error("Message fetch error: {message}")]
    Fetch {
        /// What the collaborator reported
        message: String,
    },

    /// CSV parse or write failure in a durable table.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// Convenience `Result` type
/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

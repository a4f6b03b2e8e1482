use thiserror::Error;

/// Row-granular failures during commit.
///
/// These never cross the row boundary: the orchestrator captures the message
/// into the row's result and moves on to the next row. Fatal request-level
/// failures use `service_core::error::AppError` instead.
#[derive(Error, Debug)]
pub enum ProvisionError {
    /// Identity provider create/update failure.
    #[error("Identity provider error: {0}")]
    Provider(String),

    /// Membership/role/directory/audit write failure.
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl From<service_core::error::AppError> for ProvisionError {
    fn from(err: service_core::error::AppError) -> Self {
        ProvisionError::Persistence(err.to_string())
    }
}

use super::directory::DirectoryError;
use super::notifications::NotifyError;
use super::payments::PaymentGatewayError;
use super::repository::RepositoryError;

/// Error taxonomy shared by the marketplace services. Every operation either
/// succeeds fully or surfaces one of these; there are no partial successes.
#[derive(Debug, thiserror::Error)]
pub enum MarketplaceError {
    /// Malformed or missing input. Never retried.
    #[error("{0}")]
    Validation(String),
    /// A referenced entity does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),
    /// The operation collides with existing state (duplicate bid, item
    /// already spoken for).
    #[error("{0}")]
    Conflict(&'static str),
    /// The acting party lacks rights over the entity. Deliberately carries
    /// no detail beyond what the caller could already infer.
    #[error("not authorized to perform this action")]
    Authorization,
    /// The operation is invalid for the entity's current lifecycle state.
    #[error("{0}")]
    State(&'static str),
    /// The payment collaborator reported a definitive failure. Pending or
    /// ambiguous collaborator responses are not errors.
    #[error("payment was not completed: {0}")]
    Payment(String),
    #[error(transparent)]
    Repository(RepositoryError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error(transparent)]
    Gateway(#[from] PaymentGatewayError),
    #[error(transparent)]
    Notification(#[from] NotifyError),
}

impl From<RepositoryError> for MarketplaceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict => Self::Conflict("record already exists"),
            RepositoryError::NotFound => Self::NotFound("record"),
            other => Self::Repository(other),
        }
    }
}

use gadder_db::StoreError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("missing session id")]
    MissingCredential,

    #[error("couldn't find session with id: {0}")]
    SessionNotFound(String),

    /// The session exists but its user has since been deleted.
    #[error("couldn't find user matching session")]
    UserNotFound,

    #[error("session user does not match the requested user")]
    IdentityMismatch,

    /// Deliberately generic: never says whether the resource exists.
    #[error("user does not have permission to perform this action")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    #[error(transparent)]
    StoreUnavailable(#[from] StoreError),
}

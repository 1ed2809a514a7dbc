use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Phone number already registered")]
    Conflict,
    #[error("User not found. Please register first.")]
    NotFound,
    #[error("Invalid password")]
    InvalidCredential,
    #[error("User already logged in")]
    AlreadyLoggedIn,
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[source] sqlx::Error),
}

impl From<sqlx::Error> for RelayError {
    fn from(err: sqlx::Error) -> Self {
        Self::StoreUnavailable(err)
    }
}

pub type RelayResult<T> = Result<T, RelayError>;

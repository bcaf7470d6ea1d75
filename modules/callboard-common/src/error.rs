use thiserror::Error;

#[derive(Error, Debug)]
pub enum CallboardError {
    #[error("Not found")]
    NotFound,

    #[error("Already exists")]
    AlreadyExists,

    #[error("Invalid slug: {0}")]
    InvalidSlug(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Slug is reserved")]
    ReservedSlug,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Store error: {0}")]
    Store(String),
}

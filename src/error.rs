use thiserror::Error;

/// Error kinds surfaced by the store and controller. `NotFound` and
/// `Validation` map to 404 and 422 at the REST boundary; everything else is
/// a storage failure that fails the current request.
#[derive(Debug, Error)]
pub enum Error {
    #[error("task {0} not found")]
    NotFound(i64),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Storage(err.into())
    }
}

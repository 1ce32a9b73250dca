use crate::backend::BackendError;

#[derive(Debug)]
pub enum StoreError {
    /// The persistence boundary rejected or failed the call. The projection is
    /// left as it was (or resynced, on the reorder path).
    Backend(BackendError),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Backend(e) => write!(f, "persistence failure: {e}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<BackendError> for StoreError {
    fn from(e: BackendError) -> Self {
        StoreError::Backend(e)
    }
}

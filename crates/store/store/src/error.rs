/// Errors that can occur during item or user store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Could not reach the backend.
    #[error("connection error: {0}")]
    Connection(String),

    /// The backend rejected or failed a query.
    #[error("backend error: {0}")]
    Backend(String),

    /// A uniqueness constraint was violated, e.g. a duplicate email.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A stored row could not be decoded.
    #[error("serialization error: {0}")]
    Serialization(String),
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VotesError {
    /// The poll's message is gone, or it was never acked by the server.
    /// Callers treat this as "nothing left to load".
    #[error("message not found")]
    MessageNotFound,
    #[error("network: {0}")]
    Network(#[from] anyhow::Error),
}

use crate::error::VotesError;
use async_trait::async_trait;
use bytes::Bytes;
use pollview_models::{MessageRef, User, UserId};

/// One page of the server-side voter listing for a single answer option.
#[derive(Debug, Clone, Default)]
pub struct VotesPage {
    /// Continuation cursor for the next page; empty means end-of-data.
    pub next_offset: String,
    /// Total number of votes for the option, as reported by the server.
    pub count: i32,
    /// Voter ids in listing order.
    pub voters: Vec<UserId>,
    /// User objects the server sent along with this page.
    pub users: Vec<User>,
}

/// Voter-listing endpoint of the messaging backend.
///
/// Transport, retries, and backoff live behind this trait; the view core
/// issues at most one request per answer at a time and never retries on
/// its own.
#[async_trait]
pub trait PollVotesApi: Send + Sync {
    async fn poll_votes(
        &self,
        context: MessageRef,
        option: Bytes,
        offset: &str,
        limit: usize,
    ) -> Result<VotesPage, VotesError>;
}

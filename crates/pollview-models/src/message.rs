use serde::{Deserialize, Serialize};

/// Identifies the message that carries the poll being inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageRef {
    pub channel_id: i64,
    pub message_id: i64,
}

impl MessageRef {
    pub fn new(channel_id: i64, message_id: i64) -> Self {
        Self {
            channel_id,
            message_id,
        }
    }

    /// Locally-echoed messages carry provisional non-positive ids until the
    /// server acks them; voter listings only exist for acked messages.
    pub fn is_server_id(&self) -> bool {
        self.message_id > 0
    }
}

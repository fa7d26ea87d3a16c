pub mod message;
pub mod poll;
pub mod state;
pub mod user;

pub use message::MessageRef;
pub use poll::{Poll, PollAnswer};
pub use state::{ResultsMemento, SavedListState};
pub use user::{User, UserId};

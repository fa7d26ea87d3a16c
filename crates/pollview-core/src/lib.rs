pub mod api;
pub mod cache;
pub mod controller;
pub mod error;
pub mod list;
pub mod locale;
pub mod results;

pub use api::{PollVotesApi, VotesPage};
pub use cache::PeerCache;
pub use controller::{PagingConfig, VoterListController, FIRST_PAGE, LEAVE_PRELOADED, PER_PAGE};
pub use error::VotesError;
pub use list::{ListSurface, VoterList};
pub use locale::{DefaultLocalizer, Localizer};
pub use results::{AnswerSection, PollResultsView};

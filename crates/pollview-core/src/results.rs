use crate::api::PollVotesApi;
use crate::cache::PeerCache;
use crate::controller::{PagingConfig, VoterListController, PROFILE_EVENTS_CAPACITY};
use crate::list::{ListSurface, VoterList};
use crate::locale::Localizer;
use bytes::Bytes;
use pollview_models::{MessageRef, Poll, PollAnswer, ResultsMemento, User};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// One block of the results screen: header, voter list, and the "show more"
/// affordance for a single answer.
pub struct AnswerSection {
    answer: PollAnswer,
    percent: i32,
    quiz: bool,
    localizer: Arc<dyn Localizer>,
    list: Arc<VoterList>,
    controller: VoterListController,
    forward: JoinHandle<()>,
}

impl AnswerSection {
    /// Header label: answer text plus its integer percentage share.
    pub fn title(&self) -> String {
        format!("{} \u{2014} {}%", self.answer.text, self.percent)
    }

    pub fn percent(&self) -> i32 {
        self.percent
    }

    pub fn answer_text(&self) -> &str {
        &self.answer.text
    }

    pub fn option(&self) -> &Bytes {
        &self.answer.option
    }

    /// Right-aligned live vote-count label of the header.
    pub fn votes_label(&self) -> String {
        let count = *self.controller.full_count().borrow();
        if self.quiz {
            self.localizer.answers_count(count)
        } else {
            self.localizer.votes_count(count)
        }
    }

    /// The "show more" control is shown exactly while rows remain to load.
    pub fn show_more_visible(&self) -> bool {
        *self.controller.left_to_load().borrow() > 0
    }

    pub fn show_more_label(&self) -> String {
        self.localizer
            .show_more(*self.controller.left_to_load().borrow())
    }

    /// Click handler of the "show more" control.
    pub fn show_more(&self) {
        self.controller.allow_load_more();
    }

    pub fn list(&self) -> &Arc<VoterList> {
        &self.list
    }

    pub fn controller(&self) -> &VoterListController {
        &self.controller
    }
}

impl Drop for AnswerSection {
    fn drop(&mut self) {
        self.forward.abort();
    }
}

/// Owns one [`AnswerSection`] per answer with votes, funnels their
/// profile-request events into a single stream, and fans saved pagination
/// state out to the sections by answer option.
pub struct PollResultsView {
    poll: Poll,
    sections: Vec<AnswerSection>,
    profile_requests: broadcast::Sender<Arc<User>>,
}

impl PollResultsView {
    pub fn new(
        api: Arc<dyn PollVotesApi>,
        peers: Arc<PeerCache>,
        localizer: Arc<dyn Localizer>,
        poll: Poll,
        context: MessageRef,
        config: PagingConfig,
    ) -> Self {
        let (profile_requests, _) = broadcast::channel(PROFILE_EVENTS_CAPACITY);
        let mut sections = Vec::new();
        for answer in &poll.answers {
            if answer.votes == 0 {
                continue;
            }
            debug_assert!(
                poll.total_voters > 0,
                "poll has votes but no voters counted"
            );
            let percent = answer.votes * 100 / poll.total_voters;
            let list = Arc::new(VoterList::new());
            let controller = VoterListController::new(
                Arc::clone(&api),
                Arc::clone(&peers),
                Arc::clone(&list) as Arc<dyn ListSurface>,
                context,
                answer,
                config,
            );
            let forward =
                forward_profile_requests(controller.profile_requests(), profile_requests.clone());
            sections.push(AnswerSection {
                answer: answer.clone(),
                percent,
                quiz: poll.quiz,
                localizer: Arc::clone(&localizer),
                list,
                controller,
                forward,
            });
        }
        Self {
            poll,
            sections,
            profile_requests,
        }
    }

    /// Question text rendered above the sections.
    pub fn question(&self) -> &str {
        &self.poll.question
    }

    pub fn poll(&self) -> &Poll {
        &self.poll
    }

    pub fn sections(&self) -> &[AnswerSection] {
        &self.sections
    }

    /// Fetches the first voter page of every section, the way a list widget
    /// fills its initial viewport.
    pub fn load_initial(&self) {
        for section in &self.sections {
            section.controller.load_more();
        }
    }

    /// Completes once no section has a fetch in flight.
    pub async fn settled(&self) {
        for section in &self.sections {
            section.controller.settled().await;
        }
    }

    /// Aggregated stream of voters whose profile the user asked to open,
    /// from any section.
    pub fn profile_requests(&self) -> broadcast::Receiver<Arc<User>> {
        self.profile_requests.subscribe()
    }

    pub fn save_state(&self) -> ResultsMemento {
        let mut memento = ResultsMemento::new();
        for section in &self.sections {
            memento.insert(
                section.answer.option.clone(),
                section.controller.save_state(),
            );
        }
        memento
    }

    /// Hands each section its saved state; options with no entry keep their
    /// current state.
    pub fn restore_state(&self, mut memento: ResultsMemento) {
        for section in &self.sections {
            if let Some(state) = memento.take(&section.answer.option) {
                section.controller.restore_state(state);
            }
        }
    }
}

fn forward_profile_requests(
    mut from: broadcast::Receiver<Arc<User>>,
    to: broadcast::Sender<Arc<User>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match from.recv().await {
                Ok(user) => {
                    let _ = to.send(user);
                }
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{page, Script, ScriptedVotes};
    use crate::locale::DefaultLocalizer;

    const CONTEXT: MessageRef = MessageRef {
        channel_id: 7,
        message_id: 100,
    };

    fn poll(quiz: bool) -> Poll {
        Poll {
            id: 1,
            question: "Favourite colour?".into(),
            answers: vec![
                PollAnswer {
                    text: "Red".into(),
                    option: Bytes::from_static(b"0"),
                    votes: 1,
                },
                PollAnswer {
                    text: "Green".into(),
                    option: Bytes::from_static(b"1"),
                    votes: 0,
                },
                PollAnswer {
                    text: "Blue".into(),
                    option: Bytes::from_static(b"2"),
                    votes: 2,
                },
            ],
            quiz,
            allow_multiselect: false,
            closed: false,
            total_voters: 3,
        }
    }

    struct Fixture {
        api: Arc<ScriptedVotes>,
        peers: Arc<PeerCache>,
        view: PollResultsView,
    }

    fn fixture(quiz: bool) -> Fixture {
        let api = Arc::new(ScriptedVotes::new());
        let peers = Arc::new(PeerCache::new());
        let view = build(quiz, &api, &peers);
        Fixture { api, peers, view }
    }

    fn build(quiz: bool, api: &Arc<ScriptedVotes>, peers: &Arc<PeerCache>) -> PollResultsView {
        PollResultsView::new(
            Arc::clone(api) as Arc<dyn PollVotesApi>,
            Arc::clone(peers),
            Arc::new(DefaultLocalizer),
            poll(quiz),
            CONTEXT,
            PagingConfig::default(),
        )
    }

    #[tokio::test]
    async fn zero_vote_answers_produce_no_section() {
        let fx = fixture(false);

        let options: Vec<&[u8]> = fx.view.sections().iter().map(|s| &s.option()[..]).collect();
        assert_eq!(options, vec![b"0".as_slice(), b"2".as_slice()]);
    }

    #[tokio::test]
    async fn headers_truncate_percentages() {
        let fx = fixture(false);

        let sections = fx.view.sections();
        assert_eq!(sections[0].title(), "Red \u{2014} 33%");
        assert_eq!(sections[0].percent(), 33);
        assert_eq!(sections[1].title(), "Blue \u{2014} 66%");
        assert_eq!(sections[1].percent(), 66);
        assert_eq!(fx.view.question(), "Favourite colour?");
    }

    #[tokio::test]
    async fn vote_labels_follow_quiz_flag() {
        let regular = fixture(false);
        assert_eq!(regular.view.sections()[0].votes_label(), "1 vote");
        assert_eq!(regular.view.sections()[1].votes_label(), "2 votes");

        let quiz = fixture(true);
        assert_eq!(quiz.view.sections()[0].votes_label(), "1 answer");
        assert_eq!(quiz.view.sections()[1].votes_label(), "2 answers");
    }

    #[tokio::test]
    async fn show_more_hides_after_full_drain() {
        let fx = fixture(false);
        let section = &fx.view.sections()[1];
        assert!(section.show_more_visible());
        assert_eq!(section.show_more_label(), "SHOW MORE (2)");

        fx.api
            .put(Bytes::from_static(b"2"), "", Script::Page(page(1..=2, "", 2)));
        section.controller().load_more();
        fx.view.settled().await;

        assert!(!section.show_more_visible());
        assert_eq!(section.list().rows_count(), 2);
    }

    #[tokio::test]
    async fn load_initial_fetches_every_section_once() {
        let fx = fixture(false);
        fx.api
            .put(Bytes::from_static(b"0"), "", Script::Page(page([1], "", 1)));
        fx.api
            .put(Bytes::from_static(b"2"), "", Script::Page(page(2..=3, "", 2)));

        fx.view.load_initial();
        fx.view.settled().await;

        assert_eq!(fx.api.requests(), 2);
        assert_eq!(fx.view.sections()[0].list().rows_count(), 1);
        assert_eq!(fx.view.sections()[1].list().rows_count(), 2);
    }

    #[tokio::test]
    async fn profile_requests_aggregate_across_sections() {
        let fx = fixture(false);
        fx.api
            .put(Bytes::from_static(b"0"), "", Script::Page(page([1], "", 1)));
        fx.api
            .put(Bytes::from_static(b"2"), "", Script::Page(page(2..=3, "", 2)));
        fx.view.load_initial();
        fx.view.settled().await;

        let mut requests = fx.view.profile_requests();
        fx.view.sections()[0].controller().row_clicked(1);
        fx.view.sections()[1].controller().row_clicked(3);

        let mut ids = vec![
            requests.recv().await.expect("first").id,
            requests.recv().await.expect("second").id,
        ];
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn memento_restores_each_section_by_option() {
        let fx = fixture(false);
        fx.api
            .put(Bytes::from_static(b"0"), "", Script::Page(page([1], "", 1)));
        fx.api
            .put(Bytes::from_static(b"2"), "", Script::Page(page(2..=3, "", 2)));
        fx.view.load_initial();
        fx.view.settled().await;

        let memento = fx.view.save_state();
        assert_eq!(memento.len(), 2);

        let reopened = build(false, &fx.api, &fx.peers);
        let requests_before = fx.api.requests();
        reopened.restore_state(memento);
        reopened.settled().await;

        assert_eq!(fx.api.requests(), requests_before);
        assert_eq!(reopened.sections()[0].list().row_ids(), vec![1]);
        assert_eq!(reopened.sections()[1].list().row_ids(), vec![2, 3]);
        assert!(!reopened.sections()[0].show_more_visible());
    }

    #[tokio::test]
    async fn restoring_an_empty_memento_changes_nothing() {
        let fx = fixture(false);
        fx.view.restore_state(ResultsMemento::new());

        assert_eq!(fx.api.requests(), 0);
        assert!(fx.view.sections()[0].show_more_visible());
    }
}

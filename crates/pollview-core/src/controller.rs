use crate::api::{PollVotesApi, VotesPage};
use crate::cache::PeerCache;
use crate::error::VotesError;
use crate::list::ListSurface;
use bytes::Bytes;
use pollview_models::{MessageRef, PollAnswer, SavedListState, User, UserId};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

/// Page size of a section's first fetch; kept small so every section of the
/// results screen fills quickly.
pub const FIRST_PAGE: usize = 15;
/// Page size of subsequent fetches.
pub const PER_PAGE: usize = 50;
/// Rows withheld from each page and buffered until the next "show more".
pub const LEAVE_PRELOADED: usize = 5;

pub(crate) const PROFILE_EVENTS_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy)]
pub struct PagingConfig {
    pub first_page: usize,
    pub per_page: usize,
    pub leave_preloaded: usize,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            first_page: FIRST_PAGE,
            per_page: PER_PAGE,
            leave_preloaded: LEAVE_PRELOADED,
        }
    }
}

/// Paginates the voter list of a single poll answer.
///
/// Owns the continuation cursor, the preload buffer, and the single
/// in-flight fetch slot; publishes the remaining and total counts as watch
/// values and row activations as a broadcast stream. Clones share state.
#[derive(Clone)]
pub struct VoterListController {
    inner: Arc<Inner>,
}

struct Inner {
    api: Arc<dyn PollVotesApi>,
    peers: Arc<PeerCache>,
    list: Arc<dyn ListSurface>,
    context: MessageRef,
    option: Bytes,
    config: PagingConfig,
    paging: Mutex<Paging>,
    left_to_load: watch::Sender<i32>,
    full_count: watch::Sender<i32>,
    loading: watch::Sender<bool>,
    profile_requests: broadcast::Sender<Arc<User>>,
}

#[derive(Default)]
struct Paging {
    /// Continuation cursor for the next fetch; empty means start-of-data.
    offset: String,
    /// Cursor value the user has committed to via "show more". Loading past
    /// the first page is only allowed while this matches `offset`.
    load_for_offset: String,
    /// Rows fetched ahead of demand, shown on the next "show more".
    preloaded: Vec<Arc<User>>,
    /// In-flight fetch, doubling as the cancellation handle.
    request: Option<JoinHandle<()>>,
    /// Bumped on every state restoration; a fetch that was issued under an
    /// older epoch must not touch the restored state.
    epoch: u64,
}

impl VoterListController {
    pub fn new(
        api: Arc<dyn PollVotesApi>,
        peers: Arc<PeerCache>,
        list: Arc<dyn ListSurface>,
        context: MessageRef,
        answer: &PollAnswer,
        config: PagingConfig,
    ) -> Self {
        let (left_to_load, _) = watch::channel(answer.votes);
        let (full_count, _) = watch::channel(answer.votes);
        let (loading, _) = watch::channel(false);
        let (profile_requests, _) = broadcast::channel(PROFILE_EVENTS_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                api,
                peers,
                list,
                context,
                option: answer.option.clone(),
                config,
                paging: Mutex::new(Paging::default()),
                left_to_load,
                full_count,
                loading,
                profile_requests,
            }),
        }
    }

    /// Issues the next page fetch. No-op while a fetch is in flight, when
    /// nothing remains to load, or when the current cursor has not been
    /// committed through [`VoterListController::allow_load_more`].
    pub fn load_more(&self) {
        let inner = &self.inner;
        let mut paging = inner.lock_paging();
        if paging.request.is_some()
            || *inner.left_to_load.borrow() == 0
            || (!paging.offset.is_empty() && paging.load_for_offset != paging.offset)
        {
            return;
        }
        if !inner.context.is_server_id() {
            inner.left_to_load.send_replace(0);
            return;
        }

        let limit = if paging.offset.is_empty() {
            inner.config.first_page
        } else {
            inner.config.per_page
        };
        let offset = paging.offset.clone();
        let epoch = paging.epoch;
        tracing::debug!(
            channel = inner.context.channel_id,
            message = inner.context.message_id,
            offset = %offset,
            limit,
            "requesting poll voters"
        );
        let task = Arc::clone(inner);
        paging.request = Some(tokio::spawn(async move {
            let result = task
                .api
                .poll_votes(task.context, task.option.clone(), &offset, limit)
                .await;
            task.finish_load(limit, epoch, result);
        }));
        inner.loading.send_replace(true);
    }

    /// User-driven "show more": commits the current cursor for loading and
    /// shows whatever was already fetched ahead of demand.
    pub fn allow_load_more(&self) {
        {
            let mut paging = self.inner.lock_paging();
            paging.load_for_offset = paging.offset.clone();
            self.inner.flush_preloaded(&mut paging);
        }
        self.load_more();
    }

    /// Host callback for a row activation.
    pub fn row_clicked(&self, id: UserId) {
        if let Some(user) = self.inner.peers.user(id) {
            let _ = self.inner.profile_requests.send(user);
        }
    }

    /// Remaining-to-load counter as a live value.
    pub fn left_to_load(&self) -> watch::Receiver<i32> {
        self.inner.left_to_load.subscribe()
    }

    /// Total vote count as a live value.
    pub fn full_count(&self) -> watch::Receiver<i32> {
        self.inner.full_count.subscribe()
    }

    /// Stream of voters whose profile the user asked to open.
    pub fn profile_requests(&self) -> broadcast::Receiver<Arc<User>> {
        self.inner.profile_requests.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        *self.inner.loading.borrow()
    }

    /// Completes once no fetch is in flight.
    pub async fn settled(&self) {
        let mut loading = self.inner.loading.subscribe();
        let _ = loading.wait_for(|in_flight| !*in_flight).await;
    }

    pub fn option(&self) -> &Bytes {
        &self.inner.option
    }

    pub fn save_state(&self) -> SavedListState {
        let paging = self.inner.lock_paging();
        SavedListState {
            rows: self.inner.list.row_ids(),
            offset: paging.offset.clone(),
            load_for_offset: paging.load_for_offset.clone(),
            left_to_load: *self.inner.left_to_load.borrow(),
            full_count: *self.inner.full_count.borrow(),
            preloaded: paging.preloaded.iter().map(|user| user.id).collect(),
            was_loading: paging.request.is_some(),
        }
    }

    /// Adopts a previously saved state. A fetch tracked by the current state
    /// is cancelled first; if a fetch was in flight when the state was
    /// captured, a fresh one is issued for the restored cursor.
    pub fn restore_state(&self, state: SavedListState) {
        let inner = &self.inner;
        {
            let mut paging = inner.lock_paging();
            paging.epoch += 1;
            if let Some(request) = paging.request.take() {
                request.abort();
                inner.loading.send_replace(false);
            }
            paging.offset = state.offset;
            paging.load_for_offset = state.load_for_offset;
            paging.preloaded = state
                .preloaded
                .iter()
                .filter_map(|&id| inner.peers.user(id))
                .collect();
            let rows = state
                .rows
                .iter()
                .filter_map(|&id| inner.peers.user(id))
                .collect();
            inner.list.replace_rows(rows);
            inner.list.refresh();
        }
        inner.left_to_load.send_replace(state.left_to_load);
        inner.full_count.send_replace(state.full_count);
        if state.was_loading {
            self.load_more();
        }
    }
}

impl Inner {
    fn lock_paging(&self) -> MutexGuard<'_, Paging> {
        match self.paging.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn flush_preloaded(&self, paging: &mut Paging) {
        for user in paging.preloaded.drain(..) {
            self.list.append_row(user);
        }
        self.list.refresh();
    }

    fn finish_load(&self, limit: usize, epoch: u64, result: Result<VotesPage, VotesError>) {
        let mut paging = self.lock_paging();
        if paging.epoch != epoch {
            // The state this fetch was issued for has been replaced.
            return;
        }
        match result {
            Ok(page) => {
                paging.offset = page.next_offset;
                self.peers.process_users(page.users);
                let mut add = limit.saturating_sub(self.config.leave_preloaded);
                for id in page.voters {
                    let Some(user) = self.peers.user(id) else {
                        continue;
                    };
                    if add > 0 {
                        self.list.append_row(user);
                        add -= 1;
                    } else {
                        paging.preloaded.push(user);
                    }
                }
                if paging.offset.is_empty() {
                    self.flush_preloaded(&mut paging);
                    self.full_count.send_replace(self.list.rows_count() as i32);
                    self.left_to_load.send_replace(0);
                } else {
                    self.list.refresh();
                    self.full_count.send_replace(page.count);
                    self.left_to_load
                        .send_replace(page.count - self.list.rows_count() as i32);
                }
            }
            Err(VotesError::MessageNotFound) => {
                self.left_to_load.send_replace(0);
            }
            Err(err) => {
                tracing::warn!("poll voters fetch failed: {err:#}");
            }
        }
        paging.request = None;
        self.loading.send_replace(false);
    }
}

use pollview_models::{User, UserId};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::watch;

/// Row store of a host list widget.
///
/// The controller only ever talks to the widget through this seam;
/// [`VoterList`] is the in-crate implementation hosts can embed or replace
/// with an adapter over their own toolkit.
pub trait ListSurface: Send + Sync {
    /// Appends a row unless one with the same user id is already present.
    /// Returns whether the row was added.
    fn append_row(&self, user: Arc<User>) -> bool;
    fn has_row(&self, id: UserId) -> bool;
    fn rows_count(&self) -> usize;
    /// Ids of the current rows, in display order.
    fn row_ids(&self) -> Vec<UserId>;
    /// Replaces the whole row set, keeping order and dropping duplicates.
    fn replace_rows(&self, rows: Vec<Arc<User>>);
    /// Tells the widget the row set changed and needs repainting.
    fn refresh(&self);
}

/// Vec-backed [`ListSurface`] with a watch-based repaint signal.
pub struct VoterList {
    rows: RwLock<Vec<Arc<User>>>,
    repaint: watch::Sender<u64>,
}

impl VoterList {
    pub fn new() -> Self {
        let (repaint, _) = watch::channel(0);
        Self {
            rows: RwLock::new(Vec::new()),
            repaint,
        }
    }

    /// Snapshot of the current rows.
    pub fn rows(&self) -> Vec<Arc<User>> {
        self.read().clone()
    }

    /// Bumped on every [`ListSurface::refresh`]; hosts repaint on change.
    pub fn repaint_signal(&self) -> watch::Receiver<u64> {
        self.repaint.subscribe()
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Arc<User>>> {
        match self.rows.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Arc<User>>> {
        match self.rows.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for VoterList {
    fn default() -> Self {
        Self::new()
    }
}

impl ListSurface for VoterList {
    fn append_row(&self, user: Arc<User>) -> bool {
        let mut rows = self.write();
        if rows.iter().any(|row| row.id == user.id) {
            return false;
        }
        rows.push(user);
        true
    }

    fn has_row(&self, id: UserId) -> bool {
        self.read().iter().any(|row| row.id == id)
    }

    fn rows_count(&self) -> usize {
        self.read().len()
    }

    fn row_ids(&self) -> Vec<UserId> {
        self.read().iter().map(|row| row.id).collect()
    }

    fn replace_rows(&self, rows: Vec<Arc<User>>) {
        let mut deduped: Vec<Arc<User>> = Vec::with_capacity(rows.len());
        for user in rows {
            if !deduped.iter().any(|row| row.id == user.id) {
                deduped.push(user);
            }
        }
        *self.write() = deduped;
    }

    fn refresh(&self) {
        self.repaint.send_modify(|generation| *generation += 1);
    }
}

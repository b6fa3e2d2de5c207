use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use ember_glow::{GlowElement, Path};
use ember_model::DeviceStore;
use tokio::sync::mpsc;

/// One connected session's outbox and the set of paths it currently wants
/// pushed to it. Looked up by every session when a mutation needs to be
/// broadcast, so it lives in the shared registry rather than the session
/// itself.
struct SessionEntry {
    outbox: mpsc::Sender<GlowElement>,
    subscriptions: HashSet<Path>,
}

/// State shared by every session serving one loaded device tree: the store
/// itself and the subscription registry used to route broadcasts. Scoped to
/// one `Provider` instance, not a process-wide singleton.
pub(crate) struct Shared {
    store: Mutex<DeviceStore>,
    sessions: Mutex<HashMap<u64, SessionEntry>>,
    next_session_id: AtomicU64,
}

impl Shared {
    pub(crate) fn new(store: DeviceStore) -> Self {
        Shared { store: Mutex::new(store), sessions: Mutex::new(HashMap::new()), next_session_id: AtomicU64::new(1) }
    }

    pub(crate) fn with_store<R>(&self, f: impl FnOnce(&mut DeviceStore) -> R) -> R {
        let mut store = self.store.lock().unwrap();
        f(&mut store)
    }

    pub(crate) fn register(&self, outbox: mpsc::Sender<GlowElement>) -> u64 {
        let id = self.next_session_id.fetch_add(1, Ordering::Relaxed);
        self.sessions.lock().unwrap().insert(id, SessionEntry { outbox, subscriptions: HashSet::new() });
        id
    }

    pub(crate) fn unregister(&self, id: u64) {
        self.sessions.lock().unwrap().remove(&id);
    }

    pub(crate) fn subscribe(&self, id: u64, path: Path) {
        if let Some(entry) = self.sessions.lock().unwrap().get_mut(&id) {
            entry.subscriptions.insert(path);
        }
    }

    pub(crate) fn unsubscribe(&self, id: u64, path: &Path) {
        if let Some(entry) = self.sessions.lock().unwrap().get_mut(&id) {
            entry.subscriptions.remove(path);
        }
    }

    /// Push `element` (addressed at `path`) to every session other than
    /// `from` whose subscription set covers `path`, directly or through an
    /// ancestor (directory-level subscription).
    pub(crate) fn broadcast(&self, from: u64, path: &Path, element: &GlowElement) {
        let sessions = self.sessions.lock().unwrap();
        for (id, entry) in sessions.iter() {
            if *id == from {
                continue;
            }
            if entry.subscriptions.iter().any(|sub| path.is_at_or_under(sub)) {
                let _ = entry.outbox.try_send(element.clone());
            }
        }
    }
}

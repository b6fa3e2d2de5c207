use std::collections::{HashSet, VecDeque};

use ember_glow::Path;

pub const MAX_PARALLEL: usize = 5;

/// Orchestrates a complete-tree fetch for snapshot capture: bounded-parallel
/// `GetDirectory` requests, expanding as new children are discovered.
#[derive(Debug, Default)]
pub struct TreeFetcher {
    pending: VecDeque<Path>,
    active: HashSet<Path>,
    completed: HashSet<Path>,
    seen: HashSet<Path>,
}

impl TreeFetcher {
    pub fn new(initial: Vec<Path>) -> Self {
        let seen: HashSet<Path> = initial.iter().cloned().collect();
        TreeFetcher { pending: initial.into(), active: HashSet::new(), completed: HashSet::new(), seen }
    }

    /// Pull as many paths from `pending` into `active` as the parallelism
    /// budget allows, returning the ones to request now.
    pub fn next_batch(&mut self) -> Vec<Path> {
        let mut batch = Vec::new();
        while self.active.len() < MAX_PARALLEL {
            let Some(path) = self.pending.pop_front() else { break };
            self.active.insert(path.clone());
            batch.push(path);
        }
        batch
    }

    /// A Node arrived at `path` (possibly as a child of some other request),
    /// with `children`: enqueue unseen children, and if `path` itself was
    /// in-flight, its request has produced at least one response.
    pub fn on_node_received(&mut self, path: &Path, children: &[Path]) {
        for child in children {
            if self.seen.insert(child.clone()) {
                self.pending.push_back(child.clone());
            }
        }
        if self.active.contains(path) {
            self.mark_completed(path);
        }
    }

    pub fn mark_completed(&mut self, path: &Path) {
        if self.active.remove(path) {
            self.completed.insert(path.clone());
        }
    }

    pub fn is_done(&self) -> bool {
        self.pending.is_empty() && self.active.is_empty()
    }

    /// `(completed, total)` where `total` is completed + active + pending.
    pub fn progress(&self) -> (usize, usize) {
        let completed = self.completed.len();
        (completed, completed + self.active.len() + self.pending.len())
    }

    pub fn cancel(&mut self) {
        self.pending.clear();
        self.active.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batches_respect_the_parallelism_cap() {
        let initial: Vec<Path> = (1..=8).map(Path::root).collect();
        let mut fetcher = TreeFetcher::new(initial);
        let batch = fetcher.next_batch();
        assert_eq!(batch.len(), MAX_PARALLEL);
        assert_eq!(fetcher.progress(), (0, 8));
    }

    #[test]
    fn discovering_children_expands_the_walk_and_completes_the_parent() {
        let mut fetcher = TreeFetcher::new(vec![Path::root(1)]);
        let batch = fetcher.next_batch();
        assert_eq!(batch, vec![Path::root(1)]);

        fetcher.on_node_received(&Path::root(1), &[Path::parse("1.1").unwrap(), Path::parse("1.2").unwrap()]);
        assert_eq!(fetcher.progress(), (1, 3));
        assert!(!fetcher.is_done());

        let next = fetcher.next_batch();
        assert_eq!(next.len(), 2);
        fetcher.mark_completed(&Path::parse("1.1").unwrap());
        fetcher.mark_completed(&Path::parse("1.2").unwrap());
        assert!(fetcher.is_done());
        assert_eq!(fetcher.progress(), (3, 3));
    }

    #[test]
    fn cancel_clears_outstanding_work() {
        let mut fetcher = TreeFetcher::new(vec![Path::root(1), Path::root(2)]);
        fetcher.next_batch();
        fetcher.cancel();
        assert!(fetcher.is_done());
    }
}

use std::collections::HashMap;

use ember_glow::Path;

/// Tracks which paths are subscribed and whether the subscription was
/// auto-added by container expansion (vs. pinned by the host directly).
/// Collapse only tears down auto-subscriptions.
#[derive(Debug, Default)]
pub struct SubscriptionTracker {
    subscribed: HashMap<Path, bool>,
}

impl SubscriptionTracker {
    pub fn new() -> Self {
        SubscriptionTracker::default()
    }

    pub fn subscribe(&mut self, path: Path, auto: bool) {
        self.subscribed.entry(path).and_modify(|existing_auto| *existing_auto &= auto).or_insert(auto);
    }

    pub fn unsubscribe(&mut self, path: &Path) {
        self.subscribed.remove(path);
    }

    pub fn is_subscribed(&self, path: &Path) -> bool {
        self.subscribed.contains_key(path)
    }

    /// Host expanded `container`: subscribe to it and every immediate child,
    /// all marked auto-subscribed.
    pub fn auto_subscribe_container(&mut self, container: Path, children: &[Path]) {
        self.subscribe(container, true);
        for child in children {
            self.subscribe(child.clone(), true);
        }
    }

    /// Host collapsed `container`: unsubscribe it and its children, but only
    /// the ones that are still marked auto-subscribed (a host-pinned
    /// subscription on a child survives collapse).
    pub fn collapse(&mut self, container: &Path, children: &[Path]) -> Vec<Path> {
        let mut removed = Vec::new();
        for path in std::iter::once(container).chain(children.iter()) {
            if self.subscribed.get(path) == Some(&true) {
                self.subscribed.remove(path);
                removed.push(path.clone());
            }
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapse_only_removes_auto_subscriptions() {
        let mut tracker = SubscriptionTracker::new();
        let container = Path::root(1);
        let auto_child = Path::parse("1.1").unwrap();
        let pinned_child = Path::parse("1.2").unwrap();

        tracker.auto_subscribe_container(container.clone(), &[auto_child.clone(), pinned_child.clone()]);
        // Host separately pinned this one directly.
        tracker.subscribe(pinned_child.clone(), false);

        let removed = tracker.collapse(&container, &[auto_child.clone(), pinned_child.clone()]);

        assert!(removed.contains(&container));
        assert!(removed.contains(&auto_child));
        assert!(!removed.contains(&pinned_child));
        assert!(tracker.is_subscribed(&pinned_child));
        assert!(!tracker.is_subscribed(&auto_child));
    }

    #[test]
    fn subscribing_again_as_pinned_clears_the_auto_flag() {
        let mut tracker = SubscriptionTracker::new();
        let path = Path::root(1);
        tracker.subscribe(path.clone(), true);
        tracker.subscribe(path.clone(), false);
        let removed = tracker.collapse(&path, &[]);
        assert!(removed.is_empty());
        assert!(tracker.is_subscribed(&path));
    }
}

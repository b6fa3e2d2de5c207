//! The process-wide device-identity cache (§4.7): one entry per `host:port`,
//! guarded by a single lock with a trivially short critical section.

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};
use std::time::{Duration, SystemTime};

const VALIDITY_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub device_name: String,
    pub root_path: String,
    pub identity_path: Option<String>,
    pub last_seen: SystemTime,
}

impl CacheEntry {
    /// Entries older than the validity window are reported invalid but never
    /// evicted: a stale identity is still useful to restore the expansion
    /// starting point after reconnect.
    pub fn is_valid(&self, now: SystemTime) -> bool {
        now.duration_since(self.last_seen).map(|age| age < VALIDITY_WINDOW).unwrap_or(true)
    }
}

fn table() -> &'static Mutex<HashMap<String, CacheEntry>> {
    static TABLE: OnceLock<Mutex<HashMap<String, CacheEntry>>> = OnceLock::new();
    TABLE.get_or_init(|| Mutex::new(HashMap::new()))
}

fn key(host: &str, port: u16) -> String {
    format!("{host}:{port}")
}

pub fn record(host: &str, port: u16, device_name: &str, root_path: &str, identity_path: Option<&str>, seen_at: SystemTime) {
    let mut guard = table().lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    guard.insert(
        key(host, port),
        CacheEntry {
            device_name: device_name.to_string(),
            root_path: root_path.to_string(),
            identity_path: identity_path.map(str::to_string),
            last_seen: seen_at,
        },
    );
}

/// Returns the entry if one exists, along with whether it is still within
/// its validity window as of `now`.
pub fn lookup(host: &str, port: u16, now: SystemTime) -> Option<(CacheEntry, bool)> {
    let guard = table().lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    guard.get(&key(host, port)).map(|entry| {
        let valid = entry.is_valid(now);
        (entry.clone(), valid)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // The cache is process-wide, so tests use distinct host:port keys rather
    // than clearing it, matching the "never deleted" invariant and keeping
    // tests safe to run concurrently within this binary.

    #[test]
    fn record_then_lookup_round_trips_and_reports_valid() {
        let now = SystemTime::now();
        record("cache-test-valid", 9092, "Mixer", "1", Some("1.2"), now);
        let (entry, valid) = lookup("cache-test-valid", 9092, now).unwrap();
        assert_eq!(entry.device_name, "Mixer");
        assert_eq!(entry.root_path, "1");
        assert_eq!(entry.identity_path.as_deref(), Some("1.2"));
        assert!(valid);
    }

    #[test]
    fn entries_older_than_the_window_are_invalid_but_retained() {
        let old = SystemTime::now() - Duration::from_secs(25 * 60 * 60);
        record("cache-test-stale", 9092, "Mixer", "1", None, old);
        let (_, valid) = lookup("cache-test-stale", 9092, SystemTime::now()).unwrap();
        assert!(!valid);
    }

    #[test]
    fn unknown_host_port_returns_none() {
        assert!(lookup("cache-test-nowhere", 1, SystemTime::now()).is_none());
    }
}

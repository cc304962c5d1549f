//! In-memory user enablement state.
//!
//! This quickstart deliberately keeps enablement in a process-lifetime map; a
//! real ability would back this with durable storage. All mutations go through
//! one mutex so check-then-update sequences (`promote`) stay atomic across
//! concurrent handlers.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

/// How far a pending-validation timestamp may be from "now" before the
/// validate callback is rejected.
pub const VALIDATION_TOLERANCE_SECS: u64 = 6 * 60;

#[derive(Default)]
pub struct UserStateStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    enabled: HashSet<String>,
    /// State token → unix-seconds when the enable redirect was received.
    pending: HashMap<String, u64>,
}

impl UserStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record that an enable flow started for `token`. Calling again for the
    /// same token just refreshes the timestamp.
    pub fn mark_pending(&self, token: &str) {
        self.mark_pending_at(token, unix_now());
    }

    pub fn mark_pending_at(&self, token: &str, now: u64) {
        self.lock().pending.insert(token.to_string(), now);
    }

    pub fn is_pending_fresh(&self, token: &str, tolerance_secs: u64) -> bool {
        self.is_pending_fresh_at(token, tolerance_secs, unix_now())
    }

    pub fn is_pending_fresh_at(&self, token: &str, tolerance_secs: u64, now: u64) -> bool {
        let pending_ts = self.lock().pending.get(token).copied().unwrap_or(0);
        now.abs_diff(pending_ts) <= tolerance_secs
    }

    /// Atomically: check the token is fresh, enable the user, and consume the
    /// token. Returns `false` (with no state change) when the token is absent
    /// or stale.
    pub fn promote(&self, token: &str, user_id: &str) -> bool {
        self.promote_at(token, user_id, VALIDATION_TOLERANCE_SECS, unix_now())
    }

    pub fn promote_at(&self, token: &str, user_id: &str, tolerance_secs: u64, now: u64) -> bool {
        let mut inner = self.lock();
        // Absent tokens read as epoch, which is always stale in practice.
        // The absolute difference tolerates clock skew in either direction.
        let pending_ts = inner.pending.get(token).copied().unwrap_or(0);
        if now.abs_diff(pending_ts) > tolerance_secs {
            return false;
        }
        inner.enabled.insert(user_id.to_string());
        inner.pending.remove(token);
        true
    }

    /// Remove a user from the enabled set. Removing an absent user is a no-op.
    pub fn disable(&self, user_id: &str) {
        self.lock().enabled.remove(user_id);
    }

    pub fn is_enabled(&self, user_id: &str) -> bool {
        self.lock().enabled.contains(user_id)
    }

    /// Snapshot of currently enabled users. Enumeration order is unspecified.
    pub fn list_enabled(&self) -> Vec<String> {
        self.lock().enabled.iter().cloned().collect()
    }

    /// Drop pending tokens outside the tolerance window. Not wired to a
    /// background task; exposed for operators who want to reclaim abandoned
    /// enable flows.
    pub fn sweep_stale(&self, tolerance_secs: u64) -> usize {
        self.sweep_stale_at(tolerance_secs, unix_now())
    }

    pub fn sweep_stale_at(&self, tolerance_secs: u64, now: u64) -> usize {
        let mut inner = self.lock();
        let before = inner.pending.len();
        inner
            .pending
            .retain(|_, ts| now.abs_diff(*ts) <= tolerance_secs);
        before - inner.pending.len()
    }
}

pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

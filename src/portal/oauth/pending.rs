//! Usage: Short-lived in-memory store of in-flight logins (`state` -> PKCE verifier).
//!
//! Entries live for one consent round-trip only; nothing survives a restart.

use crate::shared::security::constant_time_eq;
use std::sync::{Mutex, MutexGuard};

pub(crate) const MAX_PENDING_LOGINS: usize = 1024;

#[derive(Debug, Clone)]
struct PendingLogin {
    state: String,
    code_verifier: String,
    created_at_unix: i64,
    expires_at_unix: i64,
}

#[derive(Debug)]
pub(crate) struct PendingLoginStore {
    ttl_secs: i64,
    capacity: usize,
    inner: Mutex<Vec<PendingLogin>>,
}

impl PendingLoginStore {
    pub(crate) fn new(ttl_secs: i64) -> Self {
        Self::with_capacity(ttl_secs, MAX_PENDING_LOGINS)
    }

    pub(crate) fn with_capacity(ttl_secs: i64, capacity: usize) -> Self {
        Self {
            ttl_secs: ttl_secs.max(1),
            capacity: capacity.max(1),
            inner: Mutex::new(Vec::new()),
        }
    }

    /// A panic while holding the lock leaves the list intact, so recover it and clear the poison flag.
    fn entries(&self) -> MutexGuard<'_, Vec<PendingLogin>> {
        self.inner.lock().unwrap_or_else(|poisoned| {
            tracing::error!(
                "pending login store lock poisoned; continuing with recovered entries"
            );
            self.inner.clear_poison();
            poisoned.into_inner()
        })
    }

    /// Remember a login. Expired entries are purged; the oldest entry is evicted when full.
    pub(crate) fn insert(&self, state: &str, code_verifier: &str, now_unix: i64) {
        let mut inner = self.entries();
        inner.retain(|entry| entry.expires_at_unix > now_unix);

        if inner.len() >= self.capacity {
            if let Some(oldest) = inner
                .iter()
                .enumerate()
                .min_by_key(|(_, entry)| entry.created_at_unix)
                .map(|(idx, _)| idx)
            {
                inner.swap_remove(oldest);
                tracing::warn!(
                    capacity = self.capacity,
                    "pending login store full; evicted oldest login"
                );
            }
        }

        inner.push(PendingLogin {
            state: state.to_string(),
            code_verifier: code_verifier.to_string(),
            created_at_unix: now_unix,
            expires_at_unix: now_unix.saturating_add(self.ttl_secs),
        });
    }

    /// Consume the login for `state`, returning its PKCE verifier if it is known and fresh.
    pub(crate) fn take(&self, state: &str, now_unix: i64) -> Option<String> {
        let mut inner = self.entries();
        let idx = inner
            .iter()
            .position(|entry| constant_time_eq(entry.state.as_bytes(), state.as_bytes()))?;
        let entry = inner.swap_remove(idx);
        if entry.expires_at_unix <= now_unix {
            return None;
        }
        Some(entry.code_verifier)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries().len()
    }
}

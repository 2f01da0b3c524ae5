//! Per-title cancellation of in-flight downloads

use crate::title::TitleId;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Cancellation tokens keyed by lowercase title id.
///
/// Cheap to clone; clones share the same registry.
#[derive(Debug, Clone, Default)]
pub struct CancelRegistry {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    tokens: DashMap<String, (u64, CancellationToken)>,
    next_id: AtomicU64,
}

impl CancelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fresh token for `title`.
    ///
    /// The registration lives until the returned guard is dropped.
    pub fn register(&self, title: &TitleId) -> CancelGuard {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        self.inner
            .tokens
            .insert(title.lower(), (id, token.clone()));
        CancelGuard {
            registry: self.clone(),
            key: title.lower(),
            id,
            token,
        }
    }

    /// Cancel the transfer registered for `title`.
    ///
    /// Returns false when nothing is in flight for that title.
    pub fn cancel(&self, title: &TitleId) -> bool {
        match self.inner.tokens.get(&title.lower()) {
            Some(entry) => {
                debug!("Cancelling transfer for {}", title);
                entry.value().1.cancel();
                true
            }
            None => false,
        }
    }

    /// Whether a transfer is currently registered for `title`
    pub fn is_registered(&self, title: &TitleId) -> bool {
        self.inner.tokens.contains_key(&title.lower())
    }
}

/// Keeps one title's registration alive
#[derive(Debug)]
pub struct CancelGuard {
    registry: CancelRegistry,
    key: String,
    id: u64,
    token: CancellationToken,
}

impl CancelGuard {
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        // A newer registration for the same title must survive this one.
        self.registry
            .inner
            .tokens
            .remove_if(&self.key, |_, (id, _)| *id == self.id);
    }
}

//! Per-video sessions and the process-wide session cache.
//!
//! Each key holds a single-flight slot: concurrent first-time requests for
//! the same video share one build, and readers only ever see finished
//! sessions. A failed build leaves the key absent so it can be retried.
//! Entries are never evicted.

use crate::error::{Result, TubeQaError};
use crate::rag::{ChatTurn, QaChain};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};
use tracing::debug;

/// Cached state for one processed video.
pub struct Session {
    chain: QaChain,
    history: Mutex<Vec<ChatTurn>>,
}

impl Session {
    /// Create a session with an empty chat history.
    pub fn new(chain: QaChain) -> Self {
        Self {
            chain,
            history: Mutex::new(Vec::new()),
        }
    }

    /// Ask a question with the current history and record the turn on success.
    ///
    /// Questions on one session are serialized, so history order is call order.
    pub async fn ask(&self, question: &str) -> Result<String> {
        let mut history = self.history.lock().await;
        let answer = self.chain.ask(question, &history).await?;
        history.push(ChatTurn::new(question, answer.clone()));
        Ok(answer)
    }

    /// Snapshot of the answered turns, oldest first.
    pub async fn history(&self) -> Vec<ChatTurn> {
        self.history.lock().await.clone()
    }
}

type Slot = Arc<OnceCell<Arc<Session>>>;

/// Process-wide mapping from video ID to session.
#[derive(Default)]
pub struct SessionCache {
    slots: Mutex<HashMap<String, Slot>>,
}

impl SessionCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a ready session.
    pub async fn get(&self, video_id: &str) -> Option<Arc<Session>> {
        let slots = self.slots.lock().await;
        slots.get(video_id).and_then(|slot| slot.get().cloned())
    }

    /// Check whether a session is ready. In-flight builds do not count.
    pub async fn contains(&self, video_id: &str) -> bool {
        self.get(video_id).await.is_some()
    }

    /// Insert a ready session, replacing any existing entry.
    pub async fn put(&self, video_id: &str, session: Session) {
        let slot = Arc::new(OnceCell::new_with(Some(Arc::new(session))));
        self.slots.lock().await.insert(video_id.to_string(), slot);
    }

    /// Number of ready sessions.
    pub async fn len(&self) -> usize {
        let slots = self.slots.lock().await;
        slots.values().filter(|slot| slot.initialized()).count()
    }

    /// Whether no session is ready.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Return the session for `video_id`, building it with `build` if absent.
    ///
    /// The flag is true when this call ran the build. Concurrent callers for
    /// the same ID wait on a single build; if it fails, the error goes to the
    /// caller that ran it and the waiters start over from the map, where one
    /// of them builds on a fresh slot.
    pub async fn get_or_build<F, Fut>(&self, video_id: &str, build: F) -> Result<(Arc<Session>, bool)>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Session>>,
    {
        let mut build = Some(build);

        loop {
            let slot = {
                let mut slots = self.slots.lock().await;
                slots.entry(video_id.to_string()).or_default().clone()
            };

            let pending = &mut build;
            let slot_ref = &slot;
            let result = slot
                .get_or_try_init(move || async move {
                    // Only the slot currently in the map may be built.
                    if !self.is_linked(video_id, slot_ref).await {
                        return Err(Attempt::Stale);
                    }
                    let Some(build) = pending.take() else {
                        return Err(Attempt::Stale);
                    };
                    match build().await {
                        Ok(session) => Ok(Arc::new(session)),
                        Err(e) => {
                            // Unlink while still holding the init permit so no
                            // waiter can start building on this slot.
                            self.unlink(video_id, slot_ref).await;
                            Err(Attempt::Failed(e))
                        }
                    }
                })
                .await
                .cloned();

            match result {
                Ok(session) => return Ok((session, build.is_none())),
                Err(Attempt::Stale) => {
                    debug!("Session slot for {} was dropped, retrying", video_id);
                }
                Err(Attempt::Failed(e)) => return Err(e),
            }
        }
    }

    async fn is_linked(&self, video_id: &str, slot: &Slot) -> bool {
        let slots = self.slots.lock().await;
        slots.get(video_id).is_some_and(|current| Arc::ptr_eq(current, slot))
    }

    async fn unlink(&self, video_id: &str, slot: &Slot) {
        let mut slots = self.slots.lock().await;
        if slots.get(video_id).is_some_and(|current| Arc::ptr_eq(current, slot)) {
            slots.remove(video_id);
            debug!("Dropped failed session slot for {}", video_id);
        }
    }
}

/// Outcome of one attempt to initialize a slot.
enum Attempt {
    /// The slot was unlinked after a failed build; look it up again.
    Stale,
    Failed(TubeQaError),
}

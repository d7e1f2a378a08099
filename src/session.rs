//! Edit session — incremental edits to one agent plus a single in-flight
//! personality suggestion.
//!
//! An [`EditSession`] is bound to one [`AgentId`] when the editor opens.
//! Field edits and archetypes are synchronous identity-addressed patches.
//! [`EditSession::request_suggestion`] decides admission immediately and
//! returns a `'static` future that performs the external call, so the caller
//! can spawn it and keep editing while it runs.
//!
//! At most one suggestion is pending per session.  The pending state is held
//! by a drop guard, so a failed, panicking or aborted call always returns the
//! session to a retryable state.  A result that arrives after the session was
//! closed, or after its agent stopped being current, is discarded.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::future::BoxFuture;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::agent::{Agent, AgentField, AgentId, AgentPatch};
use crate::archetypes::Archetype;
use crate::store::AgentStore;
use crate::suggest::PersonalitySuggester;

// ── State ────────────────────────────────────────────────────────────

/// How the last suggestion ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Settlement {
    Applied,
    Failed(String),
    /// The result arrived after the session closed or the agent changed.
    Discarded,
}

/// Session-local suggestion state.  `Settled` behaves like `Idle` for
/// admission but remembers the last outcome.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SuggestionState {
    #[default]
    Idle,
    Pending,
    Settled(Settlement),
}

/// Why a suggestion request was not started.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decline {
    EmptyName,
    AlreadyPending,
    Closed,
    MissingAgent,
}

/// What a suggestion request ended up doing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SuggestionOutcome {
    Declined(Decline),
    Applied { personality: String },
    Failed(String),
    Discarded,
}

/// Future returned by [`EditSession::request_suggestion`].
pub type SuggestionTask = BoxFuture<'static, SuggestionOutcome>;

// ── Session ──────────────────────────────────────────────────────────

struct SessionInner {
    agent_id: AgentId,
    store: Arc<dyn AgentStore>,
    suggester: Arc<dyn PersonalitySuggester>,
    state: Mutex<SuggestionState>,
    closed: AtomicBool,
}

/// Handle to an open editor on one agent.  Clones share the same session.
#[derive(Clone)]
pub struct EditSession {
    inner: Arc<SessionInner>,
}

impl EditSession {
    /// Open a session on the store's current agent.
    pub fn open(
        store: Arc<dyn AgentStore>,
        suggester: Arc<dyn PersonalitySuggester>,
    ) -> Option<Self> {
        let agent_id = store.current()?.id;
        debug!(%agent_id, "edit session opened");
        Some(EditSession {
            inner: Arc::new(SessionInner {
                agent_id,
                store,
                suggester,
                state: Mutex::new(SuggestionState::Idle),
                closed: AtomicBool::new(false),
            }),
        })
    }

    pub fn agent_id(&self) -> AgentId {
        self.inner.agent_id
    }

    /// The agent as currently stored, if it still exists.
    pub fn snapshot(&self) -> Option<Agent> {
        self.inner.store.get(self.inner.agent_id)
    }

    pub fn state(&self) -> SuggestionState {
        self.inner.state.lock().clone()
    }

    pub fn is_suggesting(&self) -> bool {
        *self.inner.state.lock() == SuggestionState::Pending
    }

    /// Message of the last failed suggestion, until dismissed or retried.
    pub fn last_error(&self) -> Option<String> {
        match &*self.inner.state.lock() {
            SuggestionState::Settled(Settlement::Failed(message)) => Some(message.clone()),
            _ => None,
        }
    }

    pub fn dismiss_error(&self) {
        let mut state = self.inner.state.lock();
        if matches!(*state, SuggestionState::Settled(Settlement::Failed(_))) {
            *state = SuggestionState::Idle;
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Dispose of the session.  Any in-flight suggestion will be discarded.
    ///
    /// Waits for a suggestion that is being written at this moment, so no
    /// write lands once this returns.
    pub fn close(&self) {
        let _state = self.inner.state.lock();
        if !self.inner.closed.swap(true, Ordering::SeqCst) {
            debug!(agent_id = %self.inner.agent_id, "edit session closed");
        }
    }

    // ── Synchronous edits ────────────────────────────────────────────

    /// Patch a single field of the session's agent.
    pub fn apply_field_edit(&self, field: AgentField) {
        if self.is_closed() {
            return;
        }
        self.inner.store.patch(self.inner.agent_id, field.into());
    }

    /// Replace the personality with a preset's text.
    pub fn apply_archetype(&self, archetype: &Archetype) {
        if self.is_closed() {
            return;
        }
        self.inner
            .store
            .patch(self.inner.agent_id, AgentPatch::personality(archetype.personality));
    }

    // ── Suggestion ───────────────────────────────────────────────────

    /// Ask the suggester for a personality based on the agent's name.
    ///
    /// Admission happens now: when declined, the returned future resolves
    /// immediately and nothing changes.  When admitted the session is
    /// `Pending` before this returns.
    pub fn request_suggestion(&self) -> SuggestionTask {
        let admission = self.admit();
        Box::pin(async move {
            let (mut guard, name) = match admission {
                Ok(admitted) => admitted,
                Err(reason) => {
                    debug!(?reason, "suggestion declined");
                    return SuggestionOutcome::Declined(reason);
                }
            };
            let inner = guard.inner.clone();

            let result = inner.suggester.suggest(&name).await;

            // Held across the stale check and the write so `close` cannot
            // slip in between them.  Field edits never take this lock.
            let state = inner.state.lock();
            let still_current = inner
                .store
                .current()
                .is_some_and(|agent| agent.id == inner.agent_id);
            if inner.closed.load(Ordering::SeqCst) || !still_current {
                drop(state);
                info!(agent_id = %inner.agent_id, "suggestion arrived after editor moved on");
                guard.settle(Settlement::Discarded);
                return SuggestionOutcome::Discarded;
            }

            match result {
                Ok(personality) => {
                    inner
                        .store
                        .patch(inner.agent_id, AgentPatch::personality(personality.clone()));
                    drop(state);
                    guard.settle(Settlement::Applied);
                    SuggestionOutcome::Applied { personality }
                }
                Err(err) => {
                    drop(state);
                    warn!(agent_id = %inner.agent_id, "personality suggestion failed: {err}");
                    let message = format!("Could not suggest a personality: {err}");
                    guard.settle(Settlement::Failed(message.clone()));
                    SuggestionOutcome::Failed(message)
                }
            }
        })
    }

    /// Check preconditions and move to `Pending` atomically.
    fn admit(&self) -> Result<(PendingGuard, String), Decline> {
        if self.is_closed() {
            return Err(Decline::Closed);
        }
        let agent = self.snapshot().ok_or(Decline::MissingAgent)?;
        let name = agent.name.trim();
        if name.is_empty() {
            return Err(Decline::EmptyName);
        }

        let mut state = self.inner.state.lock();
        if *state == SuggestionState::Pending {
            return Err(Decline::AlreadyPending);
        }
        *state = SuggestionState::Pending;
        drop(state);

        Ok((
            PendingGuard {
                inner: self.inner.clone(),
                settlement: None,
            },
            name.to_string(),
        ))
    }
}

/// Holds the session in `Pending`; releases it on every exit path.
struct PendingGuard {
    inner: Arc<SessionInner>,
    settlement: Option<Settlement>,
}

impl PendingGuard {
    fn settle(&mut self, settlement: Settlement) {
        self.settlement = Some(settlement);
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        let next = match self.settlement.take() {
            Some(settlement) => SuggestionState::Settled(settlement),
            None => SuggestionState::Idle,
        };
        *self.inner.state.lock() = next;
    }
}

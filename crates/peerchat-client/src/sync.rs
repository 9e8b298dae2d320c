//! The synchronization loop.
//!
//! While a session is active a task wakes on a fixed interval, pulls the
//! pending records for the local identity and merges them into the
//! conversation store. Each cycle:
//!
//! 1. fetches the batch (the only await; no store lock is held),
//! 2. drops the batch if the session ended or changed meanwhile,
//! 3. classifies every record, skipping malformed ones and direct records
//!    the local identity sent itself,
//! 4. appends records not already present under `(sender, body, timestamp)`,
//! 5. hands every new message from someone else to the dispatcher.
//!
//! A failed fetch abandons the cycle; the next tick is the retry.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use peerchat_net::PendingBatch;
use peerchat_shared::protocol::InboundRecord;
use peerchat_shared::types::{ConversationKey, ConversationKind};
use peerchat_store::{ConversationStore, Message};

use crate::context::ClientContext;
use crate::events::ClientEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SyncState {
    /// No session has started yet.
    Idle,
    /// Signed in, timer running.
    Active,
    /// Signed out, timer cancelled. A new sign-in reactivates.
    Stopped,
}

/// Lifecycle of the polling task.
pub struct SyncLoop {
    state: SyncState,
    cancel: Option<CancellationToken>,
    task: Option<JoinHandle<()>>,
}

impl SyncLoop {
    pub fn new() -> Self {
        Self {
            state: SyncState::Idle,
            cancel: None,
            task: None,
        }
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Spawn the polling task. Returns `false` if it is already running.
    pub fn start(&mut self, ctx: ClientContext) -> bool {
        if self.state == SyncState::Active {
            return false;
        }

        let token = CancellationToken::new();
        let task_token = token.clone();
        self.task = Some(tokio::spawn(async move {
            run(ctx, task_token).await;
        }));
        self.cancel = Some(token);
        self.state = SyncState::Active;
        true
    }

    /// Cancel the timer. A cycle already fetching finishes its request but
    /// its batch is discarded. Returns `false` if the loop was not active.
    pub fn stop(&mut self) -> bool {
        if self.state != SyncState::Active {
            return false;
        }
        if let Some(token) = self.cancel.take() {
            token.cancel();
        }
        // Not aborted: the task notices the token on its own.
        self.task = None;
        self.state = SyncState::Stopped;
        true
    }
}

impl Default for SyncLoop {
    fn default() -> Self {
        Self::new()
    }
}

async fn run(ctx: ClientContext, token: CancellationToken) {
    let period = ctx.config().poll_interval;
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(interval_ms = period.as_millis() as u64, "Sync loop started");

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = ticker.tick() => {}
        }
        run_cycle(&ctx, Some(&token)).await;
    }

    info!("Sync loop stopped");
}

/// What one cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Another cycle was still outstanding.
    Overlapping,
    /// Nobody is signed in.
    NoSession,
    /// The fetch failed or was rejected.
    Failed,
    /// The session ended while the fetch was in flight.
    Discarded,
    /// The batch was merged; `appended` new messages.
    Applied { appended: usize },
}

/// Clears the in-flight flag when the cycle ends, however it ends.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Run one fetch-merge-notify cycle.
pub async fn run_cycle(ctx: &ClientContext, token: Option<&CancellationToken>) -> CycleOutcome {
    let Some(_in_flight) = InFlight::acquire(ctx.in_flight()) else {
        debug!("Previous sync cycle still outstanding, skipping tick");
        return CycleOutcome::Overlapping;
    };

    let (username, generation) = match ctx.session() {
        Ok(Some(session)) => session,
        Ok(None) => return CycleOutcome::NoSession,
        Err(e) => {
            warn!(error = %e, "Sync cycle abandoned");
            return CycleOutcome::Failed;
        }
    };

    let batch = match ctx.messaging().fetch_pending(&username).await {
        Ok(batch) => batch,
        Err(e) => {
            warn!(error = %e, "Sync cycle abandoned");
            return CycleOutcome::Failed;
        }
    };

    if token.is_some_and(CancellationToken::is_cancelled) {
        debug!(records = batch.len(), "Sync cancelled during fetch, discarding batch");
        return CycleOutcome::Discarded;
    }

    let arrivals = {
        let mut state = match ctx.lock_state() {
            Ok(state) => state,
            Err(e) => {
                warn!(error = %e, "Sync cycle abandoned");
                return CycleOutcome::Failed;
            }
        };
        if !state.is_current(generation) {
            debug!(records = batch.len(), "Session changed during fetch, discarding batch");
            return CycleOutcome::Discarded;
        }
        let arrivals = apply_batch(&mut state.conversations, &username, batch);
        // The conversation on screen is read as it grows.
        if let Some(active) = state.active_conversation.clone() {
            if arrivals.iter().any(|a| a.key == active) {
                state.conversations.mark_read(active.as_str());
            }
        }
        arrivals
    };

    for arrival in &arrivals {
        ctx.events().emit(ClientEvent::MessageAppended {
            key: arrival.key.clone(),
            message: arrival.message.clone(),
        });
    }

    for arrival in arrivals.iter().filter(|a| a.message.sender != username) {
        ctx.dispatcher()
            .dispatch(
                arrival.key.as_str(),
                arrival.kind,
                &arrival.message.sender,
                &arrival.message.body,
            )
            .await;
    }

    if !arrivals.is_empty() {
        debug!(appended = arrivals.len(), "Sync cycle merged new messages");
    }
    CycleOutcome::Applied {
        appended: arrivals.len(),
    }
}

/// A message the merge appended.
#[derive(Debug, Clone)]
pub struct Arrival {
    pub key: ConversationKey,
    pub kind: ConversationKind,
    pub message: Message,
}

/// Merge a fetched batch into `store` as seen by `local`.
///
/// Applying the same batch twice appends nothing the second time.
pub fn apply_batch(store: &mut ConversationStore, local: &str, batch: PendingBatch) -> Vec<Arrival> {
    let mut arrivals = Vec::new();

    for record in batch {
        let inbound = match record.and_then(InboundRecord::classify) {
            Ok(inbound) => inbound,
            Err(e) => {
                warn!(error = %e, "Skipping malformed record");
                continue;
            }
        };

        let Some(key) = inbound.target_key(local) else {
            debug!("Skipping own direct message");
            continue;
        };

        let message = Message::from_inbound(&inbound, local);
        if store.append_if_new(key.as_str(), message.clone()) {
            debug!(key = %key, sender = %message.sender, "Message appended");
            arrivals.push(Arrival {
                key,
                kind: inbound.kind(),
                message,
            });
        }
    }

    arrivals
}

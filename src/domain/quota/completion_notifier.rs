use std::sync::{Arc, PoisonError, RwLock};

use crate::domain::assignment::assignment::Assignment;
use crate::domain::utils::id::{ProgramId, UserId};

/// Signal raised the first time a program's assignments reach the required count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaCompletionEvent {
    pub program_id: ProgramId,
    pub user_id: UserId,
    pub completed_assignments: Vec<Assignment>,
}

/// Receives completion signals. Delivery and retries are the listener's business.
pub trait CompletionNotifier: std::fmt::Debug + Send + Sync {
    fn on_quota_complete(&self, event: &QuotaCompletionEvent);
}

/// Writes completion signals to the log only.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingNotifier;

impl CompletionNotifier for LoggingNotifier {
    fn on_quota_complete(&self, event: &QuotaCompletionEvent) {
        log::info!(
            "Program {} of member {} is fully assigned ({} sessions), member can be notified.",
            event.program_id,
            event.user_id,
            event.completed_assignments.len()
        );
    }
}

/// Keeps every received event in memory, in arrival order.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    events: Arc<RwLock<Vec<QuotaCompletionEvent>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<QuotaCompletionEvent> {
        self.events.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl CompletionNotifier for RecordingNotifier {
    fn on_quota_complete(&self, event: &QuotaCompletionEvent) {
        self.events.write().unwrap_or_else(PoisonError::into_inner).push(event.clone());
    }
}

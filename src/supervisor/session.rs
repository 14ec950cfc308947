//! Per-run session state.
//!
//! A [`RunSession`] is owned exclusively by the supervisor worker for the
//! lifetime of one child process. It folds each output line into output
//! events, attempt counters and credential captures, delivering as lines
//! arrive and keeping the event order the child produced.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::classify::classify;
use crate::stats::StatsAggregator;

use super::AttackEvent;

/// Size of the line batch tracked per run. Delivery is immediate; a full
/// batch clears the buffer, emitting only entries that have not gone out
/// yet, so nothing is ever delivered twice.
pub const OUTPUT_BATCH: usize = 10;

/// Lifecycle of one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    #[default]
    Idle,
    Starting,
    Running,
    /// Operator requested a stop; the read loop is winding down.
    Stopping,
    /// Exit status observed, cleanup in progress.
    Finishing,
}

/// What a finished run leaves behind for the caller: the preview string the
/// run was launched with and every credential line in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunFindings {
    pub preview: String,
    pub credentials: Vec<String>,
}

/// A line in the batch buffer, with the classification results that must be
/// replayed right after its output event.
#[derive(Debug, Clone)]
struct PendingLine {
    text: String,
    credential: bool,
    /// Running attempt total as of this line, when it counted as an attempt.
    attempt_total: Option<u64>,
    /// Whether this line's events already went out to the subscriber.
    emitted: bool,
}

/// State for one run of the external tool.
#[derive(Debug)]
pub(crate) struct RunSession {
    state: SessionState,
    buffer: Vec<PendingLine>,
    stats: StatsAggregator,
    credentials: Vec<String>,
    preview: String,
}

impl RunSession {
    pub(crate) fn new(preview: String) -> Self {
        Self {
            state: SessionState::Idle,
            buffer: Vec::with_capacity(OUTPUT_BATCH),
            stats: StatsAggregator::new(),
            credentials: Vec::new(),
            preview,
        }
    }

    pub(crate) fn transition(&mut self, new_state: SessionState) {
        tracing::debug!(from = ?self.state, to = ?new_state, "session state");
        self.state = new_state;
    }

    pub(crate) fn state(&self) -> SessionState {
        self.state
    }

    /// Fold one output line into the session and return the events now due,
    /// in emission order.
    ///
    /// Every line's output event goes out right away, derived events behind
    /// it; delivery is never deferred while the child runs. Lines still
    /// count toward [`OUTPUT_BATCH`]: a full buffer is flushed, which drops
    /// the already-delivered entries and emits any that have not gone out
    /// yet. A stats snapshot is appended when one is due.
    pub(crate) fn absorb_line(&mut self, line: String, now: Instant) -> Vec<AttackEvent> {
        let tags = classify(&line);
        let attempt_total = tags.attempt.then(|| self.stats.record_attempt());
        if tags.credential {
            self.credentials.push(line.clone());
        }
        self.buffer.push(PendingLine {
            text: line,
            credential: tags.credential,
            attempt_total,
            emitted: false,
        });

        let mut events = if self.buffer.len() >= OUTPUT_BATCH {
            self.flush()
        } else {
            self.emit_latest()
        };

        if let Some(snapshot) = self.stats.maybe_snapshot(now) {
            events.push(AttackEvent::Stats(snapshot));
        }
        events
    }

    /// Deliver the newest buffered line now and mark it so a later flush
    /// skips it.
    fn emit_latest(&mut self) -> Vec<AttackEvent> {
        let mut events = Vec::with_capacity(3);
        if let Some(pending) = self.buffer.last_mut() {
            if !pending.emitted {
                pending.emitted = true;
                push_line_events(&mut events, pending);
            }
        }
        events
    }

    /// Drain the batch buffer, delivering only entries whose events have not
    /// gone out yet. Safe to call when empty.
    pub(crate) fn flush(&mut self) -> Vec<AttackEvent> {
        let mut events = Vec::new();
        for pending in self.buffer.drain(..) {
            if !pending.emitted {
                push_line_events(&mut events, &pending);
            }
        }
        events
    }

    pub(crate) fn findings(&self) -> RunFindings {
        RunFindings {
            preview: self.preview.clone(),
            credentials: self.credentials.clone(),
        }
    }
}

/// Append one line's output event and its derived events, in order.
fn push_line_events(events: &mut Vec<AttackEvent>, pending: &PendingLine) {
    events.push(AttackEvent::OutputLine(pending.text.clone()));
    if let Some(total) = pending.attempt_total {
        events.push(AttackEvent::AttemptCount(total));
    }
    if pending.credential {
        events.push(AttackEvent::CredentialFound(pending.text.clone()));
    }
}

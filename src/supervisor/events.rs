//! Events emitted by the attack supervisor.

use serde::{Deserialize, Serialize};

use crate::stats::StatsSnapshot;

/// Default buffer size for the event channel.
pub const DEFAULT_EVENT_BUFFER: usize = 256;

/// Events the supervisor worker delivers to its single subscriber.
///
/// Output lines arrive in the exact order the child produced them.
/// Classification-derived events (`AttemptCount`, `CredentialFound`) follow
/// the output event of the line they were derived from, never precede it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttackEvent {
    /// One line of combined stdout/stderr output.
    OutputLine(String),
    /// Updated total attempt count.
    AttemptCount(u64),
    /// A line classified as containing a discovered credential.
    CredentialFound(String),
    /// Throughput snapshot, at most one per wall-clock second.
    Stats(StatsSnapshot),
    /// Terminal event; fires exactly once per started session, whatever the
    /// cause of completion.
    Finished,
}

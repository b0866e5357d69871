//! StateMachine
//!
//! Contract between the consensus engine, the front door and the key/value
//! state:
//! - Applying committed commands in log order
//! - Producing a complete snapshot for log compaction
//! - Replacing the whole state from a snapshot on join/recovery
//! - Serving local reads

#[cfg(test)]
use mockall::automock;

use super::LogEntry;
use super::LogId;
use crate::Result;
use crate::StateMachineError;

/// Result of applying one command.
///
/// Malformed commands are reported, never raised: halting on one would
/// desynchronize replicas.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum ApplyOutcome {
    /// `key` was written
    Applied { key: String },
    /// Malformed command, state untouched
    Skipped(StateMachineError),
    /// Entry carries nothing for the key/value state, or was already applied
    Ignored,
}

impl ApplyOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ApplyOutcome::Applied { .. })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreSummary {
    pub restored: usize,
    pub skipped: usize,
}

#[cfg_attr(test, automock)]
pub trait StateMachine: Send + Sync + 'static {
    /// Applies one encoded command. Callers must not invoke this concurrently
    /// and must deliver commands in log order.
    fn apply(
        &self,
        command: &[u8],
    ) -> ApplyOutcome;

    /// Applies a committed log entry and advances `last_applied`.
    fn apply_entry(
        &self,
        entry: &LogEntry,
    ) -> ApplyOutcome;

    /// Serializes the full key/value state as `key=value\n` records.
    fn snapshot(&self) -> Vec<u8>;

    /// Atomically replaces the whole state with the snapshot's records.
    ///
    /// Malformed records are skipped. If nothing at all can be parsed, the
    /// state is left empty and an error is returned.
    ///
    /// The snapshot format carries no log position, so `last_applied` is
    /// reset to [`LogId::default`] and any redelivered entry would be applied
    /// again. Callers that know the last entry the snapshot covers must use
    /// [`restore_at`](Self::restore_at).
    fn restore(
        &self,
        snapshot: &[u8],
    ) -> Result<RestoreSummary>;

    /// [`restore`](Self::restore) that also sets `last_applied` to
    /// `last_included`, so entries up to it are skipped if delivered again.
    /// A failed restore still resets `last_applied`.
    fn restore_at(
        &self,
        snapshot: &[u8],
        last_included: LogId,
    ) -> Result<RestoreSummary>;

    /// Local read that bypasses the consensus log.
    fn get(
        &self,
        key: &str,
    ) -> Option<String>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Last entry applied through [`apply_entry`](Self::apply_entry)
    fn last_applied(&self) -> LogId;
}

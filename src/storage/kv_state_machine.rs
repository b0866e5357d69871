use std::collections::BTreeMap;

use parking_lot::RwLock;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::trace;
use tracing::warn;

use super::decode_snapshot;
use super::encode_snapshot;
use super::ApplyOutcome;
use super::EntryPayload;
use super::LogEntry;
use super::LogId;
use super::RestoreSummary;
use super::StateMachine;
use crate::Command;
use crate::Operation;
use crate::Result;
use crate::StateMachineError;

#[derive(Debug, Default)]
struct Inner {
    // BTreeMap keeps snapshots byte-identical across replicas
    data: BTreeMap<String, String>,
    last_applied: LogId,
}

/// In-memory key/value state machine.
///
/// Every operation holds the single lock for its whole duration: writers
/// (apply, restore) exclusively, readers (get, snapshot) shared. A snapshot
/// therefore never observes a half-applied command.
///
/// Reads do not go through the consensus log. A read reflects whatever this
/// replica has applied so far: read-your-writes on the primary once the write
/// is applied there, possibly stale on other replicas.
#[derive(Debug, Default)]
pub struct KvStateMachine {
    inner: RwLock<Inner>,
    node_id: String,
}

impl KvStateMachine {
    pub fn new(node_id: impl Into<String>) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            node_id: node_id.into(),
        }
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    fn apply_command(
        &self,
        data: &mut BTreeMap<String, String>,
        command: &[u8],
    ) -> ApplyOutcome {
        match Command::from_bytes(command) {
            Ok(Command {
                op: Operation::Set,
                key,
                value,
            }) => {
                let value = value.unwrap_or_default();
                debug!("[Node-{}] SET command applied: {} = {}", self.node_id, key, value);
                data.insert(key.clone(), value);
                ApplyOutcome::Applied { key }
            }
            Err(source) => {
                let err = StateMachineError::MalformedCommand {
                    command: String::from_utf8_lossy(command).into_owned(),
                    source,
                };
                warn!("[Node-{}] Invalid command skipped: {}", self.node_id, err);
                ApplyOutcome::Skipped(err)
            }
        }
    }

    fn restore_from(
        &self,
        snapshot: &[u8],
        last_included: LogId,
    ) -> Result<RestoreSummary> {
        let decoded = decode_snapshot(snapshot);

        let mut inner = self.inner.write();
        match decoded {
            Ok(decoded) => {
                let summary = RestoreSummary {
                    restored: decoded.data.len(),
                    skipped: decoded.skipped,
                };
                inner.data = decoded.data;
                inner.last_applied = last_included;
                info!(
                    "[Node-{}] State machine restored from snapshot with {} entries ({} skipped), last_included={}",
                    self.node_id, summary.restored, summary.skipped, last_included.index
                );
                Ok(summary)
            }
            Err(e) => {
                inner.data.clear();
                inner.last_applied = LogId::default();
                error!(
                    "[Node-{}] Snapshot unusable, state reset to empty: {}",
                    self.node_id, e
                );
                Err(e)
            }
        }
    }
}

impl StateMachine for KvStateMachine {
    fn apply(
        &self,
        command: &[u8],
    ) -> ApplyOutcome {
        let mut inner = self.inner.write();
        self.apply_command(&mut inner.data, command)
    }

    fn apply_entry(
        &self,
        entry: &LogEntry,
    ) -> ApplyOutcome {
        trace!(
            "[Node-{}] Applying log entry: index {}, term {}, type {}",
            self.node_id,
            entry.index,
            entry.term,
            entry.payload.kind()
        );

        let mut inner = self.inner.write();
        if entry.index <= inner.last_applied.index {
            debug!(
                "[Node-{}] Entry {} already applied (last_applied={}), skipping",
                self.node_id, entry.index, inner.last_applied.index
            );
            return ApplyOutcome::Ignored;
        }

        let outcome = match &entry.payload {
            EntryPayload::Command(data) => self.apply_command(&mut inner.data, data),
            EntryPayload::Noop => {
                debug!("[Node-{}] Handling NOOP entry at index {}", self.node_id, entry.index);
                ApplyOutcome::Ignored
            }
            EntryPayload::Config(_) => {
                debug!(
                    "[Node-{}] Ignoring config entry at index {}",
                    self.node_id, entry.index
                );
                ApplyOutcome::Ignored
            }
        };
        inner.last_applied = entry.log_id();
        outcome
    }

    fn snapshot(&self) -> Vec<u8> {
        let inner = self.inner.read();
        let bytes = encode_snapshot(&inner.data);
        info!(
            "[Node-{}] Snapshot taken with {} entries",
            self.node_id,
            inner.data.len()
        );
        bytes
    }

    fn restore(
        &self,
        snapshot: &[u8],
    ) -> Result<RestoreSummary> {
        self.restore_from(snapshot, LogId::default())
    }

    fn restore_at(
        &self,
        snapshot: &[u8],
        last_included: LogId,
    ) -> Result<RestoreSummary> {
        self.restore_from(snapshot, last_included)
    }

    fn get(
        &self,
        key: &str,
    ) -> Option<String> {
        self.inner.read().data.get(key).cloned()
    }

    fn len(&self) -> usize {
        self.inner.read().data.len()
    }

    fn last_applied(&self) -> LogId {
        self.inner.read().last_applied
    }
}

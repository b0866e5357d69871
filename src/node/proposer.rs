use std::sync::Arc;

#[cfg(test)]
use mockall::automock;
use parking_lot::Mutex;
use tracing::warn;

use crate::ApplyOutcome;
use crate::EntryPayload;
use crate::Error;
use crate::LogEntry;
use crate::Result;
use crate::StateMachine;

/// Proposal seam of the consensus engine.
///
/// `propose` returns once the engine has accepted the command for ordering.
/// Commit and delivery to the state machine happen later, in log order.
#[cfg_attr(test, automock)]
pub trait Proposer: Send + Sync + 'static {
    fn propose(
        &self,
        command: Vec<u8>,
    ) -> Result<()>;
}

/// Single-node proposer that commits every command immediately.
///
/// Assigns consecutive log indexes in a fixed term and applies each entry
/// before returning, so there is no replication at all.
#[derive(Debug)]
pub struct LoopbackProposer<S: StateMachine> {
    state_machine: Arc<S>,
    term: u64,
    // Held across apply to keep delivery serialized
    next_index: Mutex<u64>,
}

impl<S: StateMachine> LoopbackProposer<S> {
    pub fn new(state_machine: Arc<S>) -> Self {
        let next_index = state_machine.last_applied().index + 1;
        Self {
            state_machine,
            term: 1,
            next_index: Mutex::new(next_index),
        }
    }
}

impl<S: StateMachine> Proposer for LoopbackProposer<S> {
    fn propose(
        &self,
        command: Vec<u8>,
    ) -> Result<()> {
        let mut next_index = self.next_index.lock();
        let entry = LogEntry {
            index: *next_index,
            term: self.term,
            payload: EntryPayload::command(command),
        };
        *next_index += 1;

        match self.state_machine.apply_entry(&entry) {
            ApplyOutcome::Applied { .. } => Ok(()),
            ApplyOutcome::Skipped(e) => {
                warn!("Loopback entry {} not applied: {}", entry.index, e);
                Err(Error::Proposal(e.to_string()))
            }
            ApplyOutcome::Ignored => Err(Error::Proposal(format!(
                "entry {} was not applied",
                entry.index
            ))),
        }
    }
}

//! Replicated state machine.
//!
//! The consensus engine feeds agreed commands to [`StateMachine::apply`] one at
//! a time, in log order, and calls [`StateMachine::snapshot`] /
//! [`StateMachine::restore`] for compaction and recovery. The state lives only
//! in memory: after a restart, `restore` must run before reads are served.

mod entry;
mod kv_state_machine;
mod snapshot;
mod state_machine;

pub use entry::*;
pub use kv_state_machine::*;
pub use snapshot::*;
pub use state_machine::*;

#[cfg(test)]
mod kv_state_machine_test;
#[cfg(test)]
mod snapshot_test;

//! Key placement and replicated key/value state for a consensus-backed store.
//!
//! - [`HashRing`] maps keys onto nodes by CRC-32 position.
//! - [`ReplicationManager`] turns a key into its ordered replica set.
//! - [`KvStateMachine`] applies committed `SET` commands and produces and
//!   restores snapshots.
//! - [`NodeRegistry`] and [`KvNode`] glue membership and the front door onto
//!   the consensus engine, which is supplied through [`Proposer`].

mod command;
mod config;
mod constants;
mod errors;
mod membership;
mod node;
mod replication;
mod ring;
mod storage;

pub use command::*;
pub use config::*;
pub use errors::*;
pub use membership::*;
pub use node::*;
pub use replication::*;
pub use ring::*;
pub use storage::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub mod test_utils;

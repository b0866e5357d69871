//! Replica-set selection on top of the hash ring.
//!
//! A key's replica set is its primary (the ring owner) followed by the next
//! members clockwise. Sets are capped at the number of ring members, so a
//! replication factor larger than the cluster yields fewer, distinct replicas.

mod placement;
mod replication_manager;

pub use placement::*;
pub use replication_manager::*;

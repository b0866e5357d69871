//! Front-door facing node: placement answers, local reads and write
//! submission to the consensus engine.

mod kv_node;
mod proposer;

pub use kv_node::*;
pub use proposer::*;

#[cfg(test)]
mod proposer_test;

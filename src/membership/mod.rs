//! Cluster membership glue.
//!
//! The registry is the single place where nodes join or leave the hash ring.
//! It keeps node addresses next to ring membership and applies membership
//! changes supplied by the consensus engine's configuration.

mod node;
mod node_registry;
pub use node::*;
pub use node_registry::*;

#[cfg(test)]
mod node_test;

use tracing::debug;
use tracing::info;
use tracing::warn;

use super::ReplicaPlacement;
use crate::Error;
use crate::ReplicationError;
use crate::Result;
use crate::RingError;
use crate::RingReader;

/// Chooses the nodes responsible for a key.
///
/// Reads the shared ring and never mutates it. The replication factor is
/// fixed for the lifetime of the manager.
#[derive(Debug, Clone)]
pub struct ReplicationManager {
    ring: RingReader,
    replication_factor: usize,
}

impl ReplicationManager {
    pub fn new(
        ring: impl Into<RingReader>,
        replication_factor: usize,
    ) -> Result<Self> {
        let ring = ring.into();
        if replication_factor == 0 {
            return Err(ReplicationError::InvalidReplicationFactor(replication_factor).into());
        }

        let members = ring.len();
        if members < replication_factor {
            warn!(
                "replication factor {} exceeds {} ring members; replica sets are capped until more nodes join",
                replication_factor, members
            );
        }

        Ok(Self {
            ring,
            replication_factor,
        })
    }

    pub fn replication_factor(&self) -> usize {
        self.replication_factor
    }

    /// Replica-set size currently achievable: `min(factor, ring members)`.
    pub fn effective_replication_factor(&self) -> usize {
        self.replication_factor.min(self.ring.len())
    }

    /// Ordered replica set for `key`, primary first.
    ///
    /// The primary is the ring owner of `key`; the remaining entries are the
    /// next members clockwise, wrapping around the ring. The whole walk runs
    /// under one read lock so it never mixes two ring versions.
    pub fn get_nodes_for_key(
        &self,
        key: &str,
    ) -> Result<Vec<String>> {
        self.ring.blocking_read(|ring| -> Result<Vec<String>> {
            let primary = ring.get_node(key).map_err(|e| match e {
                Error::Ring(RingError::EmptyRing) => ReplicationError::NoNodesAvailable {
                    key: key.to_string(),
                }
                .into(),
                other => other,
            })?;
            let start = ring.index_of(primary).ok_or_else(|| RingError::NodeNotFound {
                node_id: primary.to_string(),
            })?;

            let ring_size = ring.len();
            let count = self.replication_factor.min(ring_size);
            if count < self.replication_factor {
                debug!(
                    "key {} gets {} of {} replicas ({} ring members)",
                    key, count, self.replication_factor, ring_size
                );
            }

            let mut nodes = Vec::with_capacity(count);
            nodes.push(primary.to_string());
            for i in 1..count {
                if let Some(node) = ring.node_at_index((start + i) % ring_size) {
                    nodes.push(node.to_string());
                }
            }
            Ok(nodes)
        })
    }

    /// Replica placement of `key` for operators and logs.
    pub fn describe(
        &self,
        key: &str,
    ) -> Result<ReplicaPlacement> {
        let placement = ReplicaPlacement {
            key: key.to_string(),
            nodes: self.get_nodes_for_key(key)?,
        };
        info!("{}", placement);
        Ok(placement)
    }

    /// Replica placements for a batch of keys, in input order.
    pub fn report<I, K>(
        &self,
        keys: I,
    ) -> Result<Vec<ReplicaPlacement>>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        keys.into_iter().map(|key| self.describe(key.as_ref())).collect()
    }
}

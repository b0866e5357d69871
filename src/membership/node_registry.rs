use std::collections::HashMap;
use std::collections::HashSet;

use parking_lot::RwLock;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::Node;
use super::NodeMeta;
use crate::ClusterConfig;
use crate::CollisionPolicy;
use crate::HashRing;
use crate::MembershipError;
use crate::ReplicationConfig;
use crate::Result;
use crate::RingGuard;
use crate::RingReader;

/// Nodes that joined and left during one [`NodeRegistry::sync`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipDelta {
    pub joined: Vec<String>,
    pub left: Vec<String>,
    /// Existing members whose address changed
    pub readdressed: Vec<String>,
}

impl MembershipDelta {
    pub fn is_empty(&self) -> bool {
        self.joined.is_empty() && self.left.is_empty() && self.readdressed.is_empty()
    }
}

/// Owns ring membership together with node addresses.
///
/// Lock order is always addresses first, ring second, so ring lookups never
/// see a member the registry does not know about.
#[derive(Debug)]
pub struct NodeRegistry {
    ring: RingGuard,
    addresses: RwLock<HashMap<String, String>>,
}

impl NodeRegistry {
    pub fn new(policy: CollisionPolicy) -> Self {
        Self::with_ring(HashRing::with_policy(policy))
    }

    /// Wraps an empty ring; useful for rings built with a custom hash function.
    pub fn with_ring(ring: HashRing) -> Self {
        debug_assert!(ring.is_empty(), "registry must own every ring member");
        Self {
            ring: RingGuard::new(ring),
            addresses: RwLock::new(HashMap::new()),
        }
    }

    /// Builds a registry holding every node of the initial cluster.
    pub fn from_cluster(
        cluster: &ClusterConfig,
        replication: &ReplicationConfig,
    ) -> Result<Self> {
        info!(
            "[Node-{}] Initializing membership: {:?}",
            cluster.node_id, cluster.initial_cluster
        );
        let registry = Self::new(replication.collision_policy);
        for meta in &cluster.initial_cluster {
            registry.register(meta.clone())?;
        }
        Ok(registry)
    }

    /// Read-only handle to the ring for placement lookups. Membership
    /// changes go through the registry only.
    pub fn ring(&self) -> RingReader {
        self.ring.reader()
    }

    /// Adds a node to the ring and records its address.
    ///
    /// Registering a known node with the same address is a no-op. A known
    /// node with a different address is rejected; use [`sync`](Self::sync)
    /// to readdress.
    pub fn register(
        &self,
        meta: NodeMeta,
    ) -> Result<Node> {
        meta.validate()?;

        let mut addresses = self.addresses.write();
        if let Some(existing) = addresses.get(&meta.id) {
            if *existing != meta.address {
                warn!(
                    "Rejected join of {} at {}: already registered at {}",
                    meta.id, meta.address, existing
                );
                return Err(MembershipError::DuplicateNode {
                    node_id: meta.id,
                    address: existing.clone(),
                }
                .into());
            }
            let position = self
                .ring
                .blocking_read(|ring| ring.position_of(&meta.id))
                .ok_or_else(|| MembershipError::UnknownNode {
                    node_id: meta.id.clone(),
                })?;
            debug!("Node {} already registered at position {}", meta.id, position);
            return Ok(Node {
                id: meta.id,
                address: meta.address,
                position,
            });
        }

        let position = self.ring.blocking_write(|ring| ring.add_node(&meta.id))?;
        info!(
            "Node {} ({}) joined the ring at position {}",
            meta.id, meta.address, position
        );
        addresses.insert(meta.id.clone(), meta.address.clone());
        Ok(Node {
            id: meta.id,
            address: meta.address,
            position,
        })
    }

    /// Removes a node from the ring and forgets its address.
    pub fn deregister(
        &self,
        node_id: &str,
    ) -> Result<NodeMeta> {
        let mut addresses = self.addresses.write();
        let address = addresses.remove(node_id).ok_or_else(|| MembershipError::UnknownNode {
            node_id: node_id.to_string(),
        })?;
        let position = self.ring.blocking_write(|ring| ring.remove_node(node_id))?;
        info!("Node {} ({}) left the ring from position {}", node_id, address, position);
        Ok(NodeMeta::new(node_id, address))
    }

    /// Converges the registry onto `desired`, the cluster membership agreed
    /// by the consensus engine.
    ///
    /// All or nothing: addresses are validated and the ring changes are
    /// staged on a copy first. Leavers are removed before joiners are added,
    /// so a joiner may take a position a leaver freed. On any error the
    /// registry keeps its previous membership.
    pub fn sync(
        &self,
        desired: &[NodeMeta],
    ) -> Result<MembershipDelta> {
        for meta in desired {
            meta.validate()?;
        }
        let wanted: HashSet<&str> = desired.iter().map(|m| m.id.as_str()).collect();

        let mut addresses = self.addresses.write();

        let mut left: Vec<String> = addresses
            .keys()
            .filter(|id| !wanted.contains(id.as_str()))
            .cloned()
            .collect();
        left.sort();
        let mut delta = MembershipDelta {
            left,
            ..Default::default()
        };
        for meta in desired {
            match addresses.get(&meta.id) {
                Some(address) if *address == meta.address => {}
                Some(_) => delta.readdressed.push(meta.id.clone()),
                None if delta.joined.contains(&meta.id) => {}
                None => delta.joined.push(meta.id.clone()),
            }
        }

        self.ring.blocking_write(|ring| -> Result<()> {
            let mut staged = ring.clone();
            for node_id in &delta.left {
                staged.remove_node(node_id)?;
            }
            for node_id in &delta.joined {
                staged.add_node(node_id)?;
            }
            *ring = staged;
            Ok(())
        })?;

        for node_id in &delta.left {
            addresses.remove(node_id);
            info!("Node {} left the cluster", node_id);
        }
        for meta in desired {
            if let Some(previous) = addresses.insert(meta.id.clone(), meta.address.clone()) {
                if previous != meta.address {
                    warn!("Node {} moved from {} to {}", meta.id, previous, meta.address);
                }
            } else {
                info!("Node {} ({}) joined the cluster", meta.id, meta.address);
            }
        }

        if !delta.is_empty() {
            info!(
                "Membership synced: {} joined, {} left, {} readdressed",
                delta.joined.len(),
                delta.left.len(),
                delta.readdressed.len()
            );
        }
        Ok(delta)
    }

    /// Current members in ring order
    pub fn members(&self) -> Vec<Node> {
        let addresses = self.addresses.read();
        self.ring.blocking_read(|ring| {
            ring.nodes()
                .map(|(position, id)| Node {
                    id: id.to_string(),
                    address: addresses.get(id).cloned().unwrap_or_default(),
                    position,
                })
                .collect()
        })
    }

    pub fn address_of(
        &self,
        node_id: &str,
    ) -> Option<String> {
        self.addresses.read().get(node_id).cloned()
    }

    pub fn contains(
        &self,
        node_id: &str,
    ) -> bool {
        self.addresses.read().contains_key(node_id)
    }

    pub fn len(&self) -> usize {
        self.addresses.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.read().is_empty()
    }
}

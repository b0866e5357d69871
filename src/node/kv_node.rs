use std::sync::Arc;

use tracing::debug;
use tracing::info;

use super::Proposer;
use crate::ApplyOutcome;
use crate::Command;
use crate::LogEntry;
use crate::MembershipDelta;
use crate::NodeConfig;
use crate::NodeMeta;
use crate::NodeRegistry;
use crate::ReplicaPlacement;
use crate::ReplicationManager;
use crate::Result;
use crate::StateMachine;

/// Where a write went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteRoute {
    /// This node owns the key and proposed the command itself
    Submitted,
    /// Another node owns the key; the request must be sent there
    Forward {
        node_id: String,
        address: Option<String>,
    },
}

/// Everything the front door needs from one node.
///
/// Writes owned by this node go to the consensus engine through `P`; writes
/// owned elsewhere are answered with the owner so the front door can
/// forward them. Reads are served from the local state machine.
pub struct KvNode<S, P>
where
    S: StateMachine,
    P: Proposer,
{
    node_id: String,
    registry: Arc<NodeRegistry>,
    replication: ReplicationManager,
    state_machine: Arc<S>,
    proposer: P,
}

impl<S, P> KvNode<S, P>
where
    S: StateMachine,
    P: Proposer,
{
    pub fn new(
        node_id: impl Into<String>,
        registry: Arc<NodeRegistry>,
        replication_factor: usize,
        state_machine: Arc<S>,
        proposer: P,
    ) -> Result<Self> {
        let replication = ReplicationManager::new(registry.ring(), replication_factor)?;
        Ok(Self {
            node_id: node_id.into(),
            registry,
            replication,
            state_machine,
            proposer,
        })
    }

    /// Builds the node from a validated configuration, seeding the ring
    /// with the initial cluster.
    pub fn from_config(
        config: &NodeConfig,
        state_machine: Arc<S>,
        proposer: P,
    ) -> Result<Self> {
        let registry = NodeRegistry::from_cluster(&config.cluster, &config.replication)?;
        info!(
            "[Node-{}] Ready with {} ring members, replication factor {}",
            config.cluster.node_id,
            registry.len(),
            config.replication.replication_factor
        );
        Self::new(
            config.cluster.node_id.clone(),
            Arc::new(registry),
            config.replication.replication_factor,
            state_machine,
            proposer,
        )
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    pub fn replication(&self) -> &ReplicationManager {
        &self.replication
    }

    pub fn state_machine(&self) -> &Arc<S> {
        &self.state_machine
    }

    /// Ordered replica set for `key`, primary first
    pub fn replicas_for(
        &self,
        key: &str,
    ) -> Result<Vec<String>> {
        self.replication.get_nodes_for_key(key)
    }

    pub fn primary_for(
        &self,
        key: &str,
    ) -> Result<String> {
        self.registry.ring().get_node(key)
    }

    pub fn is_primary(
        &self,
        key: &str,
    ) -> Result<bool> {
        Ok(self.primary_for(key)? == self.node_id)
    }

    /// True when this node holds a copy of `key`
    pub fn is_replica(
        &self,
        key: &str,
    ) -> Result<bool> {
        Ok(self.replicas_for(key)?.iter().any(|id| *id == self.node_id))
    }

    pub fn placement(
        &self,
        key: &str,
    ) -> Result<ReplicaPlacement> {
        self.replication.describe(key)
    }

    /// Local read. May lag the primary on non-primary replicas.
    pub fn read(
        &self,
        key: &str,
    ) -> Option<String> {
        self.state_machine.get(key)
    }

    /// Routes a `SET` to its primary.
    ///
    /// The command is validated first, so keys and values the text formats
    /// cannot carry are rejected before anything is proposed. Success means
    /// the command was accepted for ordering, not that it has been applied.
    pub fn submit_set(
        &self,
        key: &str,
        value: &str,
    ) -> Result<WriteRoute> {
        let command = Command::set(key, value)?;
        let primary = self.primary_for(key)?;

        if primary != self.node_id {
            debug!(
                "[Node-{}] Key {} owned by {}, forwarding",
                self.node_id, key, primary
            );
            let address = self.registry.address_of(&primary);
            return Ok(WriteRoute::Forward {
                node_id: primary,
                address,
            });
        }

        self.proposer.propose(command.to_bytes())?;
        debug!("[Node-{}] Proposed {}", self.node_id, command);
        Ok(WriteRoute::Submitted)
    }

    /// Delivery callback for committed entries, in log order.
    pub fn apply_committed(
        &self,
        entry: &LogEntry,
    ) -> ApplyOutcome {
        self.state_machine.apply_entry(entry)
    }

    /// Applies a membership change agreed by the consensus engine.
    pub fn sync_membership(
        &self,
        members: &[NodeMeta],
    ) -> Result<MembershipDelta> {
        self.registry.sync(members)
    }
}

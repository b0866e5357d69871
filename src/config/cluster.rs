use std::collections::HashSet;
use std::net::Ipv4Addr;
use std::net::SocketAddr;

use serde::Deserialize;
use serde::Serialize;

use super::invalid;
use crate::validate_address;
use crate::NodeMeta;
use crate::Result;

/// Local node identity and the cluster it starts in.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ClusterConfig {
    /// Id of this node; must appear in `initial_cluster`
    ///
    /// Default: `node1`
    #[serde(default = "default_node_id")]
    pub node_id: String,

    /// Client-facing listen address
    ///
    /// Default: `127.0.0.1:9081`
    #[serde(default = "default_listen_addr")]
    pub listen_address: SocketAddr,

    /// Members the ring is seeded with
    ///
    /// Default: a single `node1` at `127.0.0.1:9081`
    #[serde(default = "default_initial_cluster")]
    pub initial_cluster: Vec<NodeMeta>,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            node_id: default_node_id(),
            listen_address: default_listen_addr(),
            initial_cluster: default_initial_cluster(),
        }
    }
}

impl ClusterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.node_id.trim().is_empty() {
            return Err(invalid("node_id cannot be empty"));
        }

        if self.initial_cluster.is_empty() {
            return Err(invalid("initial_cluster must contain at least one node"));
        }

        if !self.initial_cluster.iter().any(|n| n.id == self.node_id) {
            return Err(invalid(format!(
                "Current node {} not found in initial_cluster",
                self.node_id
            )));
        }

        let mut ids = HashSet::new();
        for node in &self.initial_cluster {
            if !ids.insert(node.id.as_str()) {
                return Err(invalid(format!(
                    "Duplicate node_id {} in initial_cluster",
                    node.id
                )));
            }
            validate_address(&node.id, &node.address)
                .map_err(|e| invalid(format!("initial_cluster: {e}")))?;
        }

        if self.listen_address.port() == 0 {
            return Err(invalid("listen_address must specify a non-zero port"));
        }

        Ok(())
    }

    /// Configured metadata of the local node
    pub fn local_node(&self) -> Option<&NodeMeta> {
        self.initial_cluster.iter().find(|n| n.id == self.node_id)
    }
}

fn default_node_id() -> String {
    "node1".to_string()
}
fn default_listen_addr() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::LOCALHOST, 9081))
}
fn default_initial_cluster() -> Vec<NodeMeta> {
    vec![NodeMeta::new(default_node_id(), default_listen_addr().to_string())]
}

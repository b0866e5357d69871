use serde::Deserialize;
use serde::Serialize;

use super::invalid;
use crate::CollisionPolicy;
use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ReplicationConfig {
    /// Copies kept of every key, primary included
    ///
    /// Default: 3
    #[serde(default = "default_replication_factor")]
    pub replication_factor: usize,

    /// What a join does when its ring position is taken
    ///
    /// Default: `reject`
    #[serde(default)]
    pub collision_policy: CollisionPolicy,
}

impl Default for ReplicationConfig {
    fn default() -> Self {
        Self {
            replication_factor: default_replication_factor(),
            collision_policy: CollisionPolicy::default(),
        }
    }
}

impl ReplicationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.replication_factor == 0 {
            return Err(invalid("replication_factor must be at least 1"));
        }
        Ok(())
    }
}

fn default_replication_factor() -> usize {
    3
}

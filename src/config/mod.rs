//! Node configuration.
//!
//! Sources are merged in order, later ones winning:
//! - Type defaults
//! - The file named by `CONFIG_PATH`, if set
//! - `DRING__`-prefixed environment variables
mod cluster;
mod replication;
pub use cluster::*;
pub use replication::*;


use std::env;

use config::Config;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;
use tracing::warn;

use crate::constants::CONFIG_ENV_PREFIX;
use crate::constants::CONFIG_ENV_SEPARATOR;
use crate::constants::CONFIG_PATH_ENV;
use crate::Error;
use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct NodeConfig {
    /// Local identity and initial cluster membership
    pub cluster: ClusterConfig,
    /// Replica placement parameters
    pub replication: ReplicationConfig,
}

impl NodeConfig {
    /// Loads configuration from all sources without validating it.
    ///
    /// Call [`validate`](Self::validate) once every override is applied.
    ///
    /// ```ignore
    /// let cfg = NodeConfig::new()?.with_override_config("node2.toml")?.validate()?;
    /// ```
    pub fn new() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Ok(config_path) = env::var(CONFIG_PATH_ENV) {
            builder = builder.add_source(File::with_name(&config_path).required(true));
        }

        let config: Self = builder.add_source(env_source()).build()?.try_deserialize()?;
        Ok(config)
    }

    /// Layers `path` over the current values. Environment variables still
    /// take precedence.
    pub fn with_override_config(
        &self,
        path: &str,
    ) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(Config::try_from(self)?)
            .add_source(File::with_name(path))
            .add_source(env_source())
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Validates every section and returns the validated configuration.
    pub fn validate(self) -> Result<Self> {
        self.cluster.validate()?;
        self.replication.validate()?;

        let members = self.cluster.initial_cluster.len();
        if self.replication.replication_factor > members {
            warn!(
                "replication_factor {} exceeds the {} initial cluster members; replica sets will be clamped",
                self.replication.replication_factor, members
            );
        }
        Ok(self)
    }
}

fn env_source() -> Environment {
    Environment::with_prefix(CONFIG_ENV_PREFIX)
        .separator(CONFIG_ENV_SEPARATOR)
        .ignore_empty(true)
        .try_parsing(true)
}

pub(super) fn invalid(message: impl Into<String>) -> Error {
    Error::Config(ConfigError::Message(message.into()))
}

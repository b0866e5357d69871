use serde::Deserialize;
use serde::Serialize;

use crate::MembershipError;
use crate::Result;

/// Node identity as configured: opaque id plus `host:port` address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeMeta {
    pub id: String,
    pub address: String,
}

impl NodeMeta {
    pub fn new(
        id: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            address: address.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_address(&self.id, &self.address)
    }
}

/// A ring member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: String,
    pub address: String,
    /// Ring position, the hash of `id` unless the join was probed
    pub position: u32,
}

/// Checks that `address` is `host:port` with a non-empty host and a
/// non-zero port.
pub fn validate_address(
    node_id: &str,
    address: &str,
) -> Result<()> {
    let invalid = || MembershipError::InvalidAddress {
        node_id: node_id.to_string(),
        address: address.to_string(),
    };

    let (host, port) = address.rsplit_once(':').ok_or_else(invalid)?;
    if host.is_empty() || host.contains(char::is_whitespace) {
        return Err(invalid().into());
    }
    match port.parse::<u16>() {
        Ok(port) if port != 0 => Ok(()),
        _ => Err(invalid().into()),
    }
}

//! Error hierarchy for the placement, replication and state machine core.
//!
//! Errors are grouped by the layer that raises them. Lookup failures
//! (`EmptyRing`, `NoNodesAvailable`) propagate to the front door untouched;
//! command and snapshot malformation is reported but never halts the
//! replicated state machine.

use config::ConfigError;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Hash ring placement failures
    #[error(transparent)]
    Ring(#[from] RingError),

    /// Replica-set selection failures
    #[error(transparent)]
    Replication(#[from] ReplicationError),

    /// Node registry changes that could not be applied
    #[error(transparent)]
    Membership(#[from] MembershipError),

    /// Command text that could not be built or decoded
    #[error(transparent)]
    Command(#[from] CommandError),

    /// State machine apply/restore failures
    #[error(transparent)]
    StateMachine(#[from] StateMachineError),

    /// Configuration loading and validation failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The consensus engine refused to accept a proposal
    #[error("Proposal rejected by consensus engine: {0}")]
    Proposal(String),
}

impl Error {
    /// True when the request cannot be served because no node owns the key.
    ///
    /// The front door maps these to a "service unavailable for this key" reply.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Error::Ring(RingError::EmptyRing) | Error::Replication(ReplicationError::NoNodesAvailable { .. })
        )
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RingError {
    /// Lookup attempted while no node is registered
    #[error("Hash ring is empty")]
    EmptyRing,

    /// Two distinct nodes hash to the same ring position
    #[error("Node {incoming} collides with {existing} at ring position {position}")]
    HashCollision {
        position: u32,
        existing: String,
        incoming: String,
    },

    #[error("Node {node_id} is not on the ring")]
    NodeNotFound { node_id: String },
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ReplicationError {
    /// Replica selection attempted while no node is registered
    #[error("No nodes available for key {key}")]
    NoNodesAvailable { key: String },

    #[error("Replication factor must be at least 1, got {0}")]
    InvalidReplicationFactor(usize),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MembershipError {
    #[error("Node {node_id} is not a registered member")]
    UnknownNode { node_id: String },

    #[error("Node {node_id} is already registered with address {address}")]
    DuplicateNode { node_id: String, address: String },

    /// Addresses must be `host:port` with a non-zero port
    #[error("Node {node_id} has invalid address {address:?}")]
    InvalidAddress { node_id: String, address: String },
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Empty command")]
    EmptyCommand,

    #[error("Unsupported verb {0:?}")]
    UnsupportedVerb(String),

    #[error("{verb} expects {expected} tokens, got {actual}")]
    WrongArity {
        verb: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Token that the text formats cannot carry (no escaping exists)
    #[error("Invalid {field} {token:?}: {reason}")]
    InvalidToken {
        field: &'static str,
        token: String,
        reason: &'static str,
    },

    #[error("Command is not valid UTF-8")]
    NonUtf8,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum StateMachineError {
    /// Command skipped during apply
    #[error("Malformed command {command:?}: {source}")]
    MalformedCommand {
        command: String,
        #[source]
        source: CommandError,
    },

    /// Snapshot line without a `key=value` shape
    #[error("Malformed snapshot record at line {line}: {record:?}")]
    MalformedSnapshotRecord { line: usize, record: String },

    /// Non-empty snapshot where no record could be parsed
    #[error("Snapshot contains no parsable record ({skipped} lines skipped)")]
    MalformedSnapshot { skipped: usize },

    #[error("Snapshot is not valid UTF-8")]
    NonUtf8Snapshot,
}

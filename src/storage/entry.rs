/// Position of an entry in the consensus log
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LogId {
    pub index: u64,
    pub term: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryPayload {
    /// Encoded [`Command`](crate::Command) text
    Command(Vec<u8>),
    /// Leader no-op appended on election
    Noop,
    /// Membership change; owned by the consensus engine
    Config(Vec<u8>),
}

impl EntryPayload {
    pub fn command(data: Vec<u8>) -> Self {
        EntryPayload::Command(data)
    }

    pub fn noop() -> Self {
        EntryPayload::Noop
    }

    pub fn config(data: Vec<u8>) -> Self {
        EntryPayload::Config(data)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            EntryPayload::Command(_) => "command",
            EntryPayload::Noop => "noop",
            EntryPayload::Config(_) => "config",
        }
    }
}

/// Committed log entry delivered by the consensus engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub index: u64,
    pub term: u64,
    pub payload: EntryPayload,
}

impl LogEntry {
    pub fn log_id(&self) -> LogId {
        LogId {
            index: self.index,
            term: self.term,
        }
    }
}

use crate::Command;
use crate::EntryPayload;
use crate::LogEntry;

pub struct EntryBuilder {
    index: u64,
    term: u64,
}

impl EntryBuilder {
    pub fn new(
        start_index: u64,
        term: u64,
    ) -> Self {
        Self {
            index: start_index,
            term,
        }
    }

    pub fn command(
        mut self,
        data: &[u8],
    ) -> (Self, LogEntry) {
        let entry = LogEntry {
            index: self.index,
            term: self.term,
            payload: EntryPayload::command(data.to_vec()),
        };
        self.index += 1;
        (self, entry)
    }

    pub fn set(
        self,
        key: &str,
        value: &str,
    ) -> (Self, LogEntry) {
        let data = Command::set(key, value).unwrap().to_bytes();
        self.command(&data)
    }

    pub fn config(
        mut self,
        data: &[u8],
    ) -> (Self, LogEntry) {
        let entry = LogEntry {
            index: self.index,
            term: self.term,
            payload: EntryPayload::config(data.to_vec()),
        };
        self.index += 1;
        (self, entry)
    }

    pub fn noop(mut self) -> (Self, LogEntry) {
        let entry = LogEntry {
            index: self.index,
            term: self.term,
            payload: EntryPayload::noop(),
        };
        self.index += 1;
        (self, entry)
    }
}

//! Snapshot text format.
//!
//! One `key=value` record per line, each terminated by `\n`, keys in
//! ascending order. Nothing is escaped: a record is split at its first `=`,
//! so values may contain `=` but keys may not, and neither may contain a
//! line break.

use std::collections::BTreeMap;

use tracing::warn;

use crate::constants::SNAPSHOT_KV_DELIMITER;
use crate::constants::SNAPSHOT_RECORD_TERMINATOR;
use crate::Result;
use crate::StateMachineError;

pub fn encode_snapshot(data: &BTreeMap<String, String>) -> Vec<u8> {
    let capacity = data.iter().map(|(k, v)| k.len() + v.len() + 2).sum();
    let mut buf = String::with_capacity(capacity);
    for (key, value) in data {
        buf.push_str(key);
        buf.push(SNAPSHOT_KV_DELIMITER);
        buf.push_str(value);
        buf.push(SNAPSHOT_RECORD_TERMINATOR);
    }
    buf.into_bytes()
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct DecodedSnapshot {
    pub data: BTreeMap<String, String>,
    /// Lines dropped for lacking a delimiter
    pub skipped: usize,
}

/// Parses snapshot bytes into a fresh map.
///
/// Empty lines are ignored. A line without `=` is logged and skipped. When
/// the payload holds lines but none of them parse, the whole snapshot is
/// rejected.
pub fn decode_snapshot(bytes: &[u8]) -> Result<DecodedSnapshot> {
    let text = std::str::from_utf8(bytes).map_err(|_| StateMachineError::NonUtf8Snapshot)?;

    let mut decoded = DecodedSnapshot::default();
    for (i, line) in text.split(SNAPSHOT_RECORD_TERMINATOR).enumerate() {
        if line.is_empty() {
            continue;
        }
        match line.split_once(SNAPSHOT_KV_DELIMITER) {
            Some((key, value)) => {
                decoded.data.insert(key.to_string(), value.to_string());
            }
            None => {
                let err = StateMachineError::MalformedSnapshotRecord {
                    line: i + 1,
                    record: line.to_string(),
                };
                warn!("skipping snapshot record: {}", err);
                decoded.skipped += 1;
            }
        }
    }

    if decoded.data.is_empty() && decoded.skipped > 0 {
        return Err(StateMachineError::MalformedSnapshot {
            skipped: decoded.skipped,
        }
        .into());
    }
    Ok(decoded)
}

// -
// Command wire format

/// The only state-mutating verb
pub(crate) const VERB_SET: &str = "SET";
pub(crate) const TOKEN_SEPARATOR: char = ' ';
pub(crate) const SET_ARITY: usize = 3;

// -
// Snapshot format

pub(crate) const SNAPSHOT_KV_DELIMITER: char = '=';
pub(crate) const SNAPSHOT_RECORD_TERMINATOR: char = '\n';

// -
// Config

pub(crate) const CONFIG_ENV_PREFIX: &str = "DRING";
pub(crate) const CONFIG_ENV_SEPARATOR: &str = "__";
pub(crate) const CONFIG_PATH_ENV: &str = "CONFIG_PATH";

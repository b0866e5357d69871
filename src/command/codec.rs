use std::fmt;

use crate::constants::SET_ARITY;
use crate::constants::SNAPSHOT_KV_DELIMITER;
use crate::constants::TOKEN_SEPARATOR;
use crate::constants::VERB_SET;
use crate::CommandError;

/// Splits a command on single spaces.
///
/// Empty tokens are preserved, including a trailing one: `"SET k "` yields
/// `["SET", "k", ""]`.
pub fn parse(text: &str) -> Vec<&str> {
    text.split(TOKEN_SEPARATOR).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Set,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Set => VERB_SET,
        }
    }

    pub fn is_mutating(&self) -> bool {
        match self {
            Operation::Set => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub op: Operation,
    pub key: String,
    pub value: Option<String>,
}

impl Command {
    /// Builds a `SET` command for submission.
    ///
    /// Rejects tokens that the command and snapshot formats cannot carry:
    /// spaces or line breaks anywhere, an empty key, or `=` inside the key.
    pub fn set(
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self, CommandError> {
        let key = key.into();
        let value = value.into();

        validate_token("key", &key, true)?;
        validate_token("value", &value, false)?;

        Ok(Self {
            op: Operation::Set,
            key,
            value: Some(value),
        })
    }

    pub fn encode(&self) -> String {
        let mut out = String::from(self.op.as_str());
        out.push(TOKEN_SEPARATOR);
        out.push_str(&self.key);
        if let Some(value) = &self.value {
            out.push(TOKEN_SEPARATOR);
            out.push_str(value);
        }
        out
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.encode().into_bytes()
    }

    /// Decodes command text as delivered by the consensus log.
    ///
    /// Only the shape is checked here: the verb must be `SET` and exactly
    /// three tokens must be present.
    pub fn decode(text: &str) -> Result<Self, CommandError> {
        if text.is_empty() {
            return Err(CommandError::EmptyCommand);
        }

        let tokens = parse(text);
        match tokens[0] {
            VERB_SET if tokens.len() == SET_ARITY => Ok(Self {
                op: Operation::Set,
                key: tokens[1].to_string(),
                value: Some(tokens[2].to_string()),
            }),
            VERB_SET => Err(CommandError::WrongArity {
                verb: VERB_SET,
                expected: SET_ARITY,
                actual: tokens.len(),
            }),
            other => Err(CommandError::UnsupportedVerb(other.to_string())),
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CommandError> {
        let text = std::str::from_utf8(bytes).map_err(|_| CommandError::NonUtf8)?;
        Self::decode(text)
    }
}

impl fmt::Display for Command {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

fn validate_token(
    field: &'static str,
    token: &str,
    is_key: bool,
) -> Result<(), CommandError> {
    let invalid = |reason| CommandError::InvalidToken {
        field,
        token: token.to_string(),
        reason,
    };

    if is_key && token.is_empty() {
        return Err(invalid("must not be empty"));
    }
    if token.contains(TOKEN_SEPARATOR) {
        return Err(invalid("spaces are not supported"));
    }
    if token.contains(|c: char| c == '\n' || c == '\r') {
        return Err(invalid("line breaks are not supported"));
    }
    if is_key && token.contains(SNAPSHOT_KV_DELIMITER) {
        return Err(invalid("'=' is reserved as the snapshot delimiter"));
    }
    Ok(())
}

use std::io;

use thiserror::Error;

use crate::dns_header::ResponseCode;

/// Every failure the query pipeline can report
#[derive(Debug, Error)]
pub enum DnsError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Query needs {needed} bytes but the buffer holds only {capacity}")]
    BufferOverflow { needed: usize, capacity: usize },

    #[error("Buffer truncated: need {needed} bytes at offset {offset}, buffer has {len}")]
    TruncatedBuffer {
        offset: usize,
        needed: usize,
        len: usize,
    },

    #[error("Malformed name at offset {offset}: {reason}")]
    MalformedName { offset: usize, reason: &'static str },

    #[error("Malformed record at offset {offset}: {reason}")]
    MalformedRecord { offset: usize, reason: &'static str },

    #[error("{}", .0.description())]
    Server(ResponseCode),

    #[error("ERROR: Truncated message")]
    Truncation,

    #[error("Transport error: {0}")]
    Transport(#[from] io::Error),
}

impl DnsError {
    /// True for structural decode failures (short buffer, bad names or records)
    pub fn is_parse_failure(&self) -> bool {
        matches!(
            self,
            DnsError::TruncatedBuffer { .. }
                | DnsError::MalformedName { .. }
                | DnsError::MalformedRecord { .. }
        )
    }
}

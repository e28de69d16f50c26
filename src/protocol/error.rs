// Decode errors
//
// A failure aborts the dissection of one message only. Unknown and
// unimplemented procedures are not errors; they surface as a `Gap` on the
// dissection instead.

use thiserror::Error;

/// Why a field could not be decoded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Reason {
    #[error("needs {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    #[error("no NUL terminator before end of buffer")]
    Unterminated,

    #[error("count {count} cannot fit in {remaining} remaining bytes")]
    Count { count: u32, remaining: usize },

    #[error("items use {used} bytes but the dictionary declares {declared}")]
    DictOverrun { declared: usize, used: usize },

    #[error("start offset is past the end of a {len} byte buffer")]
    OffsetOutOfRange { len: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A declared length or count does not fit the buffer
    #[error("malformed message at offset {offset} ({field}): {reason}")]
    Malformed {
        offset: usize,
        field: &'static str,
        reason: Reason,
    },

    /// The ONC RPC header around the payload is not usable
    #[error("bad RPC header at offset {offset}: {reason}")]
    Rpc { offset: usize, reason: String },
}

impl DecodeError {
    pub fn malformed(offset: usize, field: &'static str, reason: Reason) -> Self {
        DecodeError::Malformed {
            offset,
            field,
            reason,
        }
    }

    pub fn offset(&self) -> usize {
        match self {
            DecodeError::Malformed { offset, .. } | DecodeError::Rpc { offset, .. } => *offset,
        }
    }

    pub fn field(&self) -> &'static str {
        match self {
            DecodeError::Malformed { field, .. } => field,
            DecodeError::Rpc { .. } => "rpc",
        }
    }
}

pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

// Error types for patch encoding and application.

use std::io;

use super::varint::VarIntError;

/// Failure while applying (or decoding) a patch.
///
/// Application stops at the first error. Bytes already written to the output
/// sink are left in place; callers discard the partial output.
#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    /// The stream ended before a varint or literal run was complete.
    #[error("patch truncated at offset {offset}: missing {context}")]
    Truncated { offset: usize, context: &'static str },

    /// The stream decodes but describes an impossible reconstruction.
    #[error("malformed patch at offset {offset}: {reason}")]
    MalformedPatch { offset: usize, reason: String },

    /// The output sink failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl PatchError {
    pub(crate) fn malformed(offset: usize, reason: impl Into<String>) -> Self {
        Self::MalformedPatch {
            offset,
            reason: reason.into(),
        }
    }

    pub(crate) fn from_varint(e: VarIntError, offset: usize, context: &'static str) -> Self {
        match e {
            VarIntError::Truncated => Self::Truncated { offset, context },
            VarIntError::Overflow => Self::malformed(offset, format!("{context}: {e}")),
        }
    }

    pub fn is_truncated(&self) -> bool {
        matches!(self, Self::Truncated { .. })
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedPatch { .. })
    }

    /// Byte offset in the patch where decoding stopped, if known.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::Truncated { offset, .. } | Self::MalformedPatch { offset, .. } => Some(*offset),
            Self::Io(_) => None,
        }
    }
}

/// Failure while encoding an edit script.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// An item's literal range does not lie inside the target buffer.
    #[error(
        "item {index}: inserted range {start_b}..{start_b}+{inserted_b} exceeds target length {target_len}"
    )]
    InsertOutOfRange {
        index: usize,
        start_b: u64,
        inserted_b: u64,
        target_len: usize,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn varint_errors_map_to_patch_errors() {
        let e = PatchError::from_varint(VarIntError::Truncated, 3, "item count");
        assert!(e.is_truncated());
        assert_eq!(e.offset(), Some(3));

        let e = PatchError::from_varint(VarIntError::Overflow, 7, "start_a");
        assert!(e.is_malformed());
        assert_eq!(e.to_string(), "malformed patch at offset 7: start_a: varint overflow");
    }
}

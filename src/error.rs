#[cfg(feature = "wav")]
use crate::wav::error::WavError;

use core::fmt::{Display, Formatter, Result as FmtResult};
use std::io;
use thiserror::Error;

use crate::riff::chunks::ChunkID;

/// Result type for riff_wave_io operations
#[allow(clippy::result_large_err)]
pub type RiffResult<T> = Result<T, RiffError>;

/// Errors raised while walking RIFF containers or streaming their payload.
///
/// Reaching the end of a container is not an error; `RiffReader::advance`
/// reports it as `Ok(None)`.
#[derive(Debug, Error)]
pub enum RiffError {
    /// Fault raised by the underlying byte source
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Container header is structurally unusable (odd offset, undersized declared size)
    #[error("Malformed container at {position}: {details}")]
    MalformedContainer {
        details: String,
        position: ErrorPosition,
    },

    #[error("Tag mismatch at {position}: expected '{expected}', found '{found}'")]
    TagMismatch {
        expected: ChunkID,
        found: ChunkID,
        position: ErrorPosition,
    },

    /// Container has no room for a single child chunk header
    #[error("Container '{tag}' at {position} holds no chunks")]
    EmptyContainer { tag: ChunkID, position: ErrorPosition },

    /// A chunk's footprint runs past the end of its enclosing container
    #[error(
        "Chunk '{id}' at {position} overflows its container: needs {footprint} bytes, {available} available"
    )]
    ChunkOverflow {
        id: ChunkID,
        footprint: u64,
        available: u64,
        position: ErrorPosition,
    },

    #[error("Chunk '{0}' is not a LIST")]
    NotAList(ChunkID),

    #[error("Offset {offset} is outside chunk '{id}' of {chunk_size} bytes")]
    OffsetOutOfRange {
        id: ChunkID,
        offset: u64,
        chunk_size: u32,
    },

    #[error("Cannot read {requested} bytes from chunk '{id}': only {remaining} remain")]
    ReadPastChunkEnd {
        id: ChunkID,
        requested: u64,
        remaining: u32,
    },

    /// The source ended before delivering the bytes a header or chunk promised
    #[error("Short read at {position}: requested {requested} bytes, received {received}")]
    ShortRead {
        requested: usize,
        received: usize,
        position: ErrorPosition,
    },

    #[error("LIST nesting exceeds the maximum depth of {0}")]
    NestingTooDeep(usize),

    #[error("RIFF form type is '{0}', expected 'WAVE'")]
    NotWave(ChunkID),

    #[error("Required chunk '{0}' not found")]
    MissingChunk(ChunkID),

    #[cfg(feature = "wav")]
    #[error("Wav error: {0}")]
    Wav(#[from] WavError),
}

/// Position information for errors that occur during parsing
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorPosition {
    /// Absolute byte offset in the source where the error occurred
    pub offset: u64,
    /// Human-readable description of the position
    pub description: String,
}

impl ErrorPosition {
    /// Create a new error position at the given byte offset
    pub fn new(offset: u64) -> Self {
        Self {
            offset,
            description: format!("byte offset {}", offset),
        }
    }

    /// Set a custom description for the error position
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl Display for ErrorPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.description)
    }
}

impl RiffError {
    pub fn malformed_container(details: impl Into<String>, position: ErrorPosition) -> Self {
        RiffError::MalformedContainer {
            details: details.into(),
            position,
        }
    }

    pub fn short_read(requested: usize, received: usize, offset: u64) -> Self {
        RiffError::ShortRead {
            requested,
            received,
            position: ErrorPosition::new(offset),
        }
    }

    /// True for failures caused by the data itself rather than by how the
    /// reader was driven or by the byte source.
    pub const fn is_corruption(&self) -> bool {
        matches!(
            self,
            RiffError::MalformedContainer { .. }
                | RiffError::TagMismatch { .. }
                | RiffError::EmptyContainer { .. }
                | RiffError::ChunkOverflow { .. }
                | RiffError::ShortRead { .. }
                | RiffError::NestingTooDeep(_)
        )
    }
}

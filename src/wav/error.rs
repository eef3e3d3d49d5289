use thiserror::Error;

/// Failures decoding or validating a WAVEFORMATEX descriptor.
///
/// Validation stops at the first violated check; these are never aggregated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WavError {
    #[error("Format descriptor too small: {0} bytes (minimum 16)")]
    BufferTooSmall(usize),
    #[error("Unsupported format tag 0x{0:04X}, only PCM (0x0001) is accepted")]
    UnsupportedFormat(u16),
    #[error("Unsupported channel count {0}, expected 1 or 2")]
    UnsupportedChannelCount(u16),
    #[error("Unsupported bit depth {0}, expected 8 or 16")]
    UnsupportedBitDepth(u16),
    #[error("Unexpected extension of {0} bytes on a PCM descriptor")]
    UnexpectedExtension(u16),
    #[error("Block align {found} does not match expected {expected}")]
    BadBlockAlignment { found: u16, expected: u16 },
    #[error("Sample rate {sample_rate} overflows the byte rate for block align {block_align}")]
    SampleRateOverflow { sample_rate: u32, block_align: u16 },
    #[error("Byte rate {found} does not match expected {expected}")]
    BadByteRate { found: u32, expected: u32 },
    #[error("Invalid canonical hex: {0}")]
    InvalidHex(String),
}

impl WavError {
    pub fn invalid_hex<S: Into<String>>(message: S) -> Self {
        WavError::InvalidHex(message.into())
    }
}

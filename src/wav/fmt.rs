use core::fmt::{Display, Formatter, Result as FmtResult};
use std::time::Duration;

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use log::debug;

use crate::{
    types::TICKS_PER_SECOND,
    wav::{WAVE_FORMAT_PCM, error::WavError, format_name},
};

/// Length of the fixed WAVEFORMATEX fields, extension size included
pub const WAVEFORMATEX_LEN: usize = 18;
/// Shortest accepted descriptor (extension size omitted)
pub const MIN_DESCRIPTOR_LEN: usize = WAVEFORMATEX_LEN - 2;
/// Length of the canonical hex rendering
pub const CANONICAL_HEX_LEN: usize = WAVEFORMATEX_LEN * 2;
/// Largest `fmt ` payload a WAVEFORMATEX can describe: the fixed fields plus a
/// `cbSize` extension of at most `u16::MAX` bytes
pub const MAX_DESCRIPTOR_LEN: usize = WAVEFORMATEX_LEN + u16::MAX as usize;

/// A decoded, not yet trusted, WAVEFORMATEX descriptor.
///
/// Fields are exactly what the bytes said. Call [`WaveFormatEx::validate`] to
/// obtain a [`PcmFormat`], the only type that offers timing arithmetic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaveFormatEx {
    pub format_tag: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub avg_bytes_per_sec: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    pub extension_size: u16,
    /// Bytes following offset 18, verbatim. `None` when the buffer ended at 18 bytes or earlier.
    pub extension: Option<Vec<u8>>,
}

impl WaveFormatEx {
    /// Decode a descriptor from the payload of a `fmt ` chunk
    ///
    /// # Arguments
    ///
    /// * `bytes` - At least 16 bytes. The extension size is read only when 18 or more are present.
    ///
    /// # Returns
    ///
    /// Ok(WaveFormatEx) with every field as stored, Err(WavError::BufferTooSmall) otherwise
    pub fn decode(bytes: &[u8]) -> Result<Self, WavError> {
        if bytes.len() < MIN_DESCRIPTOR_LEN {
            return Err(WavError::BufferTooSmall(bytes.len()));
        }
        let too_small = |_: std::io::Error| WavError::BufferTooSmall(bytes.len());

        let mut rdr = bytes;
        let format_tag = rdr.read_u16::<LittleEndian>().map_err(too_small)?;
        let channels = rdr.read_u16::<LittleEndian>().map_err(too_small)?;
        let sample_rate = rdr.read_u32::<LittleEndian>().map_err(too_small)?;
        let avg_bytes_per_sec = rdr.read_u32::<LittleEndian>().map_err(too_small)?;
        let block_align = rdr.read_u16::<LittleEndian>().map_err(too_small)?;
        let bits_per_sample = rdr.read_u16::<LittleEndian>().map_err(too_small)?;

        let extension_size = if bytes.len() >= WAVEFORMATEX_LEN {
            rdr.read_u16::<LittleEndian>().map_err(too_small)?
        } else {
            0
        };
        let extension = (bytes.len() > WAVEFORMATEX_LEN).then(|| bytes[WAVEFORMATEX_LEN..].to_vec());

        Ok(WaveFormatEx {
            format_tag,
            channels,
            sample_rate,
            avg_bytes_per_sec,
            block_align,
            bits_per_sample,
            extension_size,
            extension,
        })
    }

    /// Check the descriptor describes plain 8/16-bit mono or stereo PCM.
    ///
    /// Checks run in a fixed order and the first violation is returned.
    pub fn validate(&self) -> Result<PcmFormat, WavError> {
        if self.format_tag != WAVE_FORMAT_PCM {
            return Err(WavError::UnsupportedFormat(self.format_tag));
        }
        if !matches!(self.channels, 1 | 2) {
            return Err(WavError::UnsupportedChannelCount(self.channels));
        }
        if !matches!(self.bits_per_sample, 8 | 16) {
            return Err(WavError::UnsupportedBitDepth(self.bits_per_sample));
        }
        if self.extension_size != 0 {
            return Err(WavError::UnexpectedExtension(self.extension_size));
        }

        let expected_align = self.channels * (self.bits_per_sample / 8);
        if self.block_align != expected_align {
            return Err(WavError::BadBlockAlignment {
                found: self.block_align,
                expected: expected_align,
            });
        }
        if self.sample_rate > u32::MAX / self.block_align as u32 {
            return Err(WavError::SampleRateOverflow {
                sample_rate: self.sample_rate,
                block_align: self.block_align,
            });
        }
        let expected_rate = self.sample_rate * self.block_align as u32;
        if self.avg_bytes_per_sec != expected_rate {
            return Err(WavError::BadByteRate {
                found: self.avg_bytes_per_sec,
                expected: expected_rate,
            });
        }

        let format = PcmFormat {
            channels: self.channels,
            sample_rate: self.sample_rate,
            byte_rate: self.avg_bytes_per_sec,
            block_align: self.block_align,
            bits_per_sample: self.bits_per_sample,
        };
        debug!("validated wave format: {}", format);
        Ok(format)
    }

    /// The seven fixed fields, little-endian, extension size included
    pub fn to_bytes(&self) -> [u8; WAVEFORMATEX_LEN] {
        let mut out = [0u8; WAVEFORMATEX_LEN];
        LittleEndian::write_u16(&mut out[0..2], self.format_tag);
        LittleEndian::write_u16(&mut out[2..4], self.channels);
        LittleEndian::write_u32(&mut out[4..8], self.sample_rate);
        LittleEndian::write_u32(&mut out[8..12], self.avg_bytes_per_sec);
        LittleEndian::write_u16(&mut out[12..14], self.block_align);
        LittleEndian::write_u16(&mut out[14..16], self.bits_per_sample);
        LittleEndian::write_u16(&mut out[16..18], self.extension_size);
        out
    }

    /// Uppercase hex of [`WaveFormatEx::to_bytes`], 36 characters.
    ///
    /// Opaque codec-private data for downstream consumers; the extension bytes are not included.
    pub fn encode_canonical_hex(&self) -> String {
        self.to_bytes()
            .iter()
            .map(|byte| format!("{:02X}", byte))
            .collect()
    }

    /// Parse the output of [`WaveFormatEx::encode_canonical_hex`].
    ///
    /// Lower-case digits are accepted.
    pub fn decode_canonical_hex(hex: &str) -> Result<Self, WavError> {
        if hex.len() != CANONICAL_HEX_LEN {
            return Err(WavError::invalid_hex(format!(
                "expected {} characters, found {}",
                CANONICAL_HEX_LEN,
                hex.len()
            )));
        }
        if let Some(at) = hex.bytes().position(|b| !b.is_ascii_hexdigit()) {
            return Err(WavError::invalid_hex(format!("non-hex character at position {}", at)));
        }

        let mut bytes = [0u8; WAVEFORMATEX_LEN];
        for (i, byte) in bytes.iter_mut().enumerate() {
            let pair = &hex[i * 2..i * 2 + 2];
            *byte = u8::from_str_radix(pair, 16).map_err(|_| {
                WavError::invalid_hex(format!("bad digit pair {:?} at position {}", pair, i * 2))
            })?;
        }
        Self::decode(&bytes)
    }
}

impl Display for WaveFormatEx {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match format_name(self.format_tag) {
            Some(name) => write!(f, "{}", name)?,
            None => write!(f, "UNKNOWN(0x{:04X})", self.format_tag)?,
        }
        write!(
            f,
            " | {} Hz, {} ch, {}-bit, {} B/s, align {}",
            self.sample_rate,
            self.channels,
            self.bits_per_sample,
            self.avg_bytes_per_sec,
            self.block_align
        )?;
        if self.extension_size != 0 {
            write!(f, ", ext {}", self.extension_size)?;
        }
        Ok(())
    }
}

/// A validated PCM descriptor.
///
/// Only obtainable from [`WaveFormatEx::validate`], so `block_align` is never
/// zero and `byte_rate == sample_rate * block_align` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PcmFormat {
    channels: u16,
    sample_rate: u32,
    byte_rate: u32,
    block_align: u16,
    bits_per_sample: u16,
}

impl PcmFormat {
    pub const fn channels(&self) -> u16 {
        self.channels
    }

    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Average bytes per second
    pub const fn byte_rate(&self) -> u32 {
        self.byte_rate
    }

    /// Bytes per sample frame
    pub const fn block_align(&self) -> u16 {
        self.block_align
    }

    pub const fn bits_per_sample(&self) -> u16 {
        self.bits_per_sample
    }

    /// Back to the raw descriptor form, extension size zero
    pub const fn descriptor(&self) -> WaveFormatEx {
        WaveFormatEx {
            format_tag: WAVE_FORMAT_PCM,
            channels: self.channels,
            sample_rate: self.sample_rate,
            avg_bytes_per_sec: self.byte_rate,
            block_align: self.block_align,
            bits_per_sample: self.bits_per_sample,
            extension_size: 0,
            extension: None,
        }
    }

    pub fn encode_canonical_hex(&self) -> String {
        self.descriptor().encode_canonical_hex()
    }

    /// Playing time of `byte_count` bytes, in ticks.
    ///
    /// Truncates toward zero. A zero byte rate yields 0.
    pub fn duration_from_byte_count(&self, byte_count: u64) -> u64 {
        if self.byte_rate == 0 {
            return 0;
        }
        let ticks = byte_count as u128 * TICKS_PER_SECOND as u128 / self.byte_rate as u128;
        u64::try_from(ticks).unwrap_or(u64::MAX)
    }

    /// Bytes needed to cover `ticks`, rounded up to a whole sample frame.
    pub fn byte_count_from_duration(&self, ticks: u64) -> u64 {
        let align = self.block_align as u128;
        let raw = ticks as u128 * self.byte_rate as u128 / TICKS_PER_SECOND as u128;
        let rem = raw % align;
        let aligned = if rem == 0 { raw } else { raw + (align - rem) };
        u64::try_from(aligned).unwrap_or(u64::MAX)
    }

    /// Whole sample frames in `byte_count` bytes
    pub const fn frames_from_byte_count(&self, byte_count: u64) -> u64 {
        byte_count / self.block_align as u64
    }
}

impl Display for PcmFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "PCM | {} Hz, {} ch, {}-bit",
            self.sample_rate, self.channels, self.bits_per_sample
        )?;
        if f.alternate() {
            write!(f, ", {} B/s, align {}", self.byte_rate, self.block_align)?;
        }
        Ok(())
    }
}

/// Convert 100 ns ticks to a [`Duration`]
pub const fn ticks_to_duration(ticks: u64) -> Duration {
    let secs = ticks / TICKS_PER_SECOND;
    let nanos = (ticks % TICKS_PER_SECOND) * 100;
    Duration::new(secs, nanos as u32)
}

/// Convert a [`Duration`] to 100 ns ticks, truncating sub-tick precision and saturating
pub fn duration_to_ticks(duration: Duration) -> u64 {
    let ticks = duration.as_nanos() / 100;
    u64::try_from(ticks).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEREO_16: [u8; 18] = [
        0x01, 0x00, // PCM
        0x02, 0x00, // channels
        0x44, 0xAC, 0x00, 0x00, // 44100 Hz
        0x10, 0xB1, 0x02, 0x00, // 176400 B/s
        0x04, 0x00, // block align
        0x10, 0x00, // 16 bits
        0x00, 0x00, // no extension
    ];

    fn stereo_16() -> WaveFormatEx {
        WaveFormatEx::decode(&STEREO_16).unwrap()
    }

    #[test]
    fn test_decode_fields() {
        let desc = stereo_16();
        assert_eq!(desc.format_tag, 1);
        assert_eq!(desc.channels, 2);
        assert_eq!(desc.sample_rate, 44_100);
        assert_eq!(desc.avg_bytes_per_sec, 176_400);
        assert_eq!(desc.block_align, 4);
        assert_eq!(desc.bits_per_sample, 16);
        assert_eq!(desc.extension_size, 0);
        assert_eq!(desc.extension, None);
    }

    #[test]
    fn test_decode_without_extension_size() {
        let desc = WaveFormatEx::decode(&STEREO_16[..16]).unwrap();
        assert_eq!(desc.extension_size, 0);
        assert_eq!(desc.extension, None);
        assert!(desc.validate().is_ok());
    }

    #[test]
    fn test_decode_too_small() {
        let err = WaveFormatEx::decode(&STEREO_16[..15]).unwrap_err();
        assert_eq!(err, WavError::BufferTooSmall(15));
        assert!(err.to_string().contains("15 bytes"));
    }

    #[test]
    fn test_decode_keeps_extension_bytes() {
        let mut bytes = STEREO_16.to_vec();
        bytes[16] = 2;
        bytes.extend_from_slice(&[0xAA, 0xBB]);
        let desc = WaveFormatEx::decode(&bytes).unwrap();
        assert_eq!(desc.extension_size, 2);
        assert_eq!(desc.extension.as_deref(), Some(&[0xAA, 0xBB][..]));
        assert_eq!(desc.validate(), Err(WavError::UnexpectedExtension(2)));
    }

    #[test]
    fn test_block_align_three_rejected_four_accepted() {
        let mut desc = stereo_16();
        desc.block_align = 3;
        assert_eq!(
            desc.validate(),
            Err(WavError::BadBlockAlignment {
                found: 3,
                expected: 4
            })
        );

        desc.block_align = 4;
        let format = desc.validate().unwrap();
        assert_eq!(format.block_align(), 4);
        assert_eq!(format.byte_rate(), 176_400);
    }

    #[test]
    fn test_validate_reports_first_failure() {
        let mut desc = stereo_16();
        desc.format_tag = 3;
        desc.channels = 6;
        assert_eq!(desc.validate(), Err(WavError::UnsupportedFormat(3)));

        desc.format_tag = 1;
        assert_eq!(desc.validate(), Err(WavError::UnsupportedChannelCount(6)));

        desc.channels = 2;
        desc.bits_per_sample = 24;
        assert_eq!(desc.validate(), Err(WavError::UnsupportedBitDepth(24)));
    }

    #[test]
    fn test_validate_sample_rate_overflow_and_byte_rate() {
        let mut desc = stereo_16();
        desc.sample_rate = u32::MAX / 4 + 1;
        assert!(matches!(
            desc.validate(),
            Err(WavError::SampleRateOverflow { block_align: 4, .. })
        ));

        let mut desc = stereo_16();
        desc.avg_bytes_per_sec = 176_401;
        assert_eq!(
            desc.validate(),
            Err(WavError::BadByteRate {
                found: 176_401,
                expected: 176_400
            })
        );
    }

    #[test]
    fn test_canonical_hex_round_trip() {
        let desc = stereo_16();
        let hex = desc.encode_canonical_hex();
        assert_eq!(hex, "0100020044AC000010B10200040010000000");
        assert_eq!(hex.len(), CANONICAL_HEX_LEN);

        let back = WaveFormatEx::decode_canonical_hex(&hex).unwrap();
        assert_eq!(back, desc);
        assert_eq!(back.to_bytes(), STEREO_16);
    }

    #[test]
    fn test_decode_canonical_hex_rejects_garbage() {
        assert!(matches!(
            WaveFormatEx::decode_canonical_hex("0100"),
            Err(WavError::InvalidHex(_))
        ));
        let bad = "ZZ00020044AC000010B10200040010000000";
        let err = WaveFormatEx::decode_canonical_hex(bad).unwrap_err();
        assert!(err.to_string().contains("position 0"));
    }

    #[test]
    fn test_duration_from_byte_count() {
        let format = stereo_16().validate().unwrap();
        assert_eq!(format.duration_from_byte_count(8_820), 500_000);
        assert_eq!(format.duration_from_byte_count(176_400), TICKS_PER_SECOND);
        assert_eq!(format.frames_from_byte_count(8_820), 2_205);
    }

    #[test]
    fn test_zero_byte_rate_gives_zero_duration() {
        let mut desc = stereo_16();
        desc.sample_rate = 0;
        desc.avg_bytes_per_sec = 0;
        let format = desc.validate().unwrap();
        assert_eq!(format.duration_from_byte_count(1_000), 0);
        assert_eq!(format.byte_count_from_duration(1_000), 0);
    }

    #[test]
    fn test_byte_count_rounds_up_to_block() {
        let format = stereo_16().validate().unwrap();
        // 1 tick is 0.01764 bytes, which truncates to zero
        assert_eq!(format.byte_count_from_duration(1), 0);
        // 250000 ticks is 4410 bytes, half a frame short of 4412
        assert_eq!(format.byte_count_from_duration(250_000), 4_412);
        assert_eq!(format.byte_count_from_duration(500_000), 8_820);
        assert_eq!(format.byte_count_from_duration(0), 0);
    }

    #[test]
    fn test_duration_round_trip_is_monotonic() {
        let format = stereo_16().validate().unwrap();
        for n in (0..200_000u64).step_by(4).chain([u32::MAX as u64 - 3]) {
            let ticks = format.duration_from_byte_count(n);
            let back = format.byte_count_from_duration(ticks);
            assert!(back >= n, "{} -> {} ticks -> {}", n, ticks, back);
            assert!(back - n <= format.block_align() as u64);
        }
    }

    #[test]
    fn test_tick_duration_conversion() {
        assert_eq!(ticks_to_duration(500_000), Duration::from_millis(50));
        assert_eq!(ticks_to_duration(15_000_001), Duration::new(1, 500_000_100));
        assert_eq!(duration_to_ticks(Duration::from_millis(50)), 500_000);
        assert_eq!(duration_to_ticks(Duration::from_nanos(199)), 1);
    }

    #[test]
    fn test_descriptor_display_names_tag() {
        assert_eq!(
            stereo_16().to_string(),
            "PCM | 44100 Hz, 2 ch, 16-bit, 176400 B/s, align 4"
        );
        let mut desc = stereo_16();
        desc.format_tag = 0x1234;
        assert!(desc.to_string().starts_with("UNKNOWN(0x1234) |"));
    }

    #[test]
    fn test_pcm_format_display_and_descriptor() {
        let format = stereo_16().validate().unwrap();
        assert_eq!(format.to_string(), "PCM | 44100 Hz, 2 ch, 16-bit");
        assert_eq!(
            format!("{:#}", format),
            "PCM | 44100 Hz, 2 ch, 16-bit, 176400 B/s, align 4"
        );
        assert_eq!(format.descriptor(), stereo_16());
        assert_eq!(format.encode_canonical_hex(), stereo_16().encode_canonical_hex());
    }
}

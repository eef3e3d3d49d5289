pub mod error;
pub mod fmt;
pub mod streaming;

pub use fmt::{PcmFormat, WaveFormatEx};
pub use streaming::StreamedWave;

/// wFormatTag of uncompressed integer PCM, the only tag the validator accepts
pub const WAVE_FORMAT_PCM: u16 = 0x0001;

/// Symbolic name of a wFormatTag, for diagnostics. `None` for tags not listed here.
pub const fn format_name(tag: u16) -> Option<&'static str> {
    match tag {
        WAVE_FORMAT_PCM => Some("PCM"),
        0x0003 => Some("IEEE_FLOAT"),
        0x0006 => Some("A_LAW"),
        0x0007 => Some("MU_LAW"),
        0x0050 => Some("MPEG"),
        0x0055 => Some("MPEGLAYER3"),
        0xFFFE => Some("EXTENSIBLE"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_names() {
        assert_eq!(format_name(WAVE_FORMAT_PCM), Some("PCM"));
        assert_eq!(format_name(0x0055), Some("MPEGLAYER3"));
        assert_eq!(format_name(0xFFFE), Some("EXTENSIBLE"));
        assert_eq!(format_name(0x1234), None);
    }
}

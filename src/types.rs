use core::fmt::{Display, Formatter, Result as FmtResult};

use crate::riff::chunks::ChunkID;

/// Ticks per second of the duration arithmetic (one tick is 100 ns)
pub const TICKS_PER_SECOND: u64 = 10_000_000;

/// Knobs for opening and walking RIFF sources
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenOptions {
    /// Deepest LIST nesting the tree walker descends into
    pub max_depth: usize,
    /// Accept `DATA` as well as `data` for the sample data chunk
    pub accept_upper_case_data: bool,
}

impl Default for OpenOptions {
    fn default() -> Self {
        OpenOptions {
            max_depth: 32,
            accept_upper_case_data: true,
        }
    }
}

impl OpenOptions {
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub const fn with_upper_case_data(mut self, accept: bool) -> Self {
        self.accept_upper_case_data = accept;
        self
    }
}

/// Summary of an opened WAVE stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaveInfo {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of audio channels
    pub channels: u16,
    /// Bits per sample (8 or 16)
    pub bits_per_sample: u16,
    /// Byte rate (bytes per second)
    pub byte_rate: u32,
    /// Block align (bytes per sample frame)
    pub block_align: u16,
    /// Size of the data chunk payload in bytes
    pub data_len: u32,
    /// Playing time of the data chunk in ticks
    pub duration_ticks: u64,
    /// Chunks passed while locating `fmt ` and `data`, in file order
    pub chunks: Vec<ChunkID>,
}

impl WaveInfo {
    /// Whole sample frames in the data chunk
    pub const fn total_frames(&self) -> u64 {
        if self.block_align == 0 {
            return 0;
        }
        self.data_len as u64 / self.block_align as u64
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration_ticks as f64 / TICKS_PER_SECOND as f64
    }
}

impl Display for WaveInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if !f.alternate() {
            return write!(
                f,
                "PCM | {} Hz, {} ch, {}-bit, {:.3} s",
                self.sample_rate,
                self.channels,
                self.bits_per_sample,
                self.duration_secs()
            );
        }

        writeln!(f, "Wave Info:")?;
        writeln!(f, "├─ Sample Rate: {} Hz", self.sample_rate)?;
        writeln!(f, "├─ Channels: {}", self.channels)?;
        writeln!(f, "├─ Bits per Sample: {}-bit", self.bits_per_sample)?;
        writeln!(f, "├─ Byte Rate: {} B/s", self.byte_rate)?;
        writeln!(f, "├─ Block Align: {} bytes", self.block_align)?;
        writeln!(f, "├─ Data: {} bytes ({} frames)", self.data_len, self.total_frames())?;
        let chunks: Vec<String> = self.chunks.iter().map(ToString::to_string).collect();
        writeln!(f, "├─ Chunks: {}", chunks.join(", "))?;
        write!(f, "└─ Duration: {:.3} s", self.duration_secs())
    }
}

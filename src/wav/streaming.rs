//! Streaming access to the sample data of a RIFF/WAVE source.
//!
//! `StreamedWave` parses the container and the `fmt ` descriptor on
//! construction, then leaves a [`RiffReader`] parked on the `data` chunk and
//! reads payload bytes on demand. Nothing beyond the requested bytes is buffered.

use log::{debug, warn};

use crate::{
    ByteSource,
    error::{ErrorPosition, RiffError, RiffResult},
    riff::{
        RiffReader,
        chunks::{ChunkID, ChunkInfo, DATA_CHUNK, DATA_CHUNK_UPPER, FMT_CHUNK, RIFF_CHUNK, WAVE_FORM},
    },
    types::{OpenOptions, WaveInfo},
    wav::fmt::{MAX_DESCRIPTOR_LEN, PcmFormat, WaveFormatEx},
};

/// A WAVE stream positioned on its `data` chunk.
///
/// # Example
///
/// ```
/// use riff_wave_io::wav::StreamedWave;
/// use std::io::Cursor;
///
/// let mut bytes = Vec::new();
/// bytes.extend_from_slice(b"RIFF");
/// bytes.extend_from_slice(&42u32.to_le_bytes());
/// bytes.extend_from_slice(b"WAVEfmt ");
/// bytes.extend_from_slice(&18u32.to_le_bytes());
/// bytes.extend_from_slice(&[1, 0, 1, 0, 0x40, 0x1F, 0, 0, 0x40, 0x1F, 0, 0, 1, 0, 8, 0, 0, 0]);
/// bytes.extend_from_slice(b"data");
/// bytes.extend_from_slice(&4u32.to_le_bytes());
/// bytes.extend_from_slice(&[0x80, 0x81, 0x82, 0x83]);
///
/// let mut source = Cursor::new(bytes);
/// let mut wave = StreamedWave::new(&mut source)?;
/// assert_eq!(wave.format().sample_rate(), 8000);
/// assert_eq!(wave.read(16)?, vec![0x80, 0x81, 0x82, 0x83]);
/// assert!(wave.read(16)?.is_empty());
/// # Ok::<(), riff_wave_io::RiffError>(())
/// ```
#[derive(Debug)]
pub struct StreamedWave<'s, S: ByteSource + ?Sized> {
    reader: RiffReader<'s, S>,
    format: PcmFormat,
    descriptor: WaveFormatEx,
    /// Tags passed while locating `fmt ` and `data`, in file order
    chunks: Vec<ChunkID>,
}

impl<'s, S: ByteSource + ?Sized> StreamedWave<'s, S> {
    pub fn new(source: &'s mut S) -> RiffResult<Self> {
        Self::with_options(source, OpenOptions::default())
    }

    /// Open the RIFF/WAVE container at offset 0 and locate `fmt ` and `data`.
    ///
    /// # Errors
    ///
    /// - `NotWave` if the RIFF form type is not `WAVE`
    /// - `MissingChunk` if `fmt ` or the data chunk is absent
    /// - `Wav` if the format descriptor does not decode or validate
    /// - any structural error from the traversal
    pub fn with_options(source: &'s mut S, options: OpenOptions) -> RiffResult<Self> {
        let source_len = source.source_len()?;
        let mut reader = RiffReader::open(source, RIFF_CHUNK, 0)?;

        let container = reader.container();
        if container.form_type != WAVE_FORM {
            return Err(RiffError::NotWave(container.form_type));
        }
        if container.end() > source_len {
            warn!(
                "RIFF header claims {} bytes but the source holds {}",
                container.end(),
                source_len
            );
        }

        let mut chunks = vec![reader.current().id];
        let fmt = locate(&mut reader, &[FMT_CHUNK], &mut chunks)?
            .ok_or(RiffError::MissingChunk(FMT_CHUNK))?;
        if fmt.size as usize > MAX_DESCRIPTOR_LEN {
            return Err(RiffError::malformed_container(
                format!(
                    "'fmt ' chunk of {} bytes exceeds the {} bytes a WAVEFORMATEX can hold",
                    fmt.size, MAX_DESCRIPTOR_LEN
                ),
                ErrorPosition::new(fmt.offset),
            ));
        }
        let descriptor = WaveFormatEx::decode(&reader.read_rest()?)?;
        let format = descriptor.validate()?;

        let data_ids: &[ChunkID] = if options.accept_upper_case_data {
            &[DATA_CHUNK, DATA_CHUNK_UPPER]
        } else {
            &[DATA_CHUNK]
        };
        match reader.advance()? {
            Some(next) => chunks.push(next.id),
            None => return Err(RiffError::MissingChunk(DATA_CHUNK)),
        }
        let data = locate(&mut reader, data_ids, &mut chunks)?
            .ok_or(RiffError::MissingChunk(DATA_CHUNK))?;

        debug!(
            "wave stream ready: {}, {} data bytes at {}",
            format,
            data.size,
            data.payload_offset()
        );
        Ok(StreamedWave {
            reader,
            format,
            descriptor,
            chunks,
        })
    }

    pub const fn format(&self) -> &PcmFormat {
        &self.format
    }

    /// The descriptor exactly as decoded from the `fmt ` chunk
    pub const fn descriptor(&self) -> &WaveFormatEx {
        &self.descriptor
    }

    /// The data chunk's header, for consumers that read the payload themselves
    pub const fn data_chunk(&self) -> ChunkInfo {
        self.reader.current()
    }

    pub const fn data_len(&self) -> u32 {
        self.reader.current().size
    }

    pub const fn bytes_remaining(&self) -> u32 {
        self.reader.bytes_remaining()
    }

    pub fn chunks(&self) -> &[ChunkID] {
        &self.chunks
    }

    /// Playing time of the whole data chunk, in ticks
    pub fn duration(&self) -> u64 {
        self.format.duration_from_byte_count(self.data_len() as u64)
    }

    /// Playing time already consumed, in ticks
    pub fn position(&self) -> u64 {
        self.format
            .duration_from_byte_count(self.reader.payload_position() as u64)
    }

    /// Read up to `count` bytes of sample data.
    ///
    /// Returns fewer bytes near the end of the chunk and an empty vector once
    /// it is exhausted.
    pub fn read(&mut self, count: usize) -> RiffResult<Vec<u8>> {
        let count = count.min(self.bytes_remaining() as usize);
        self.reader.read_payload(count)
    }

    /// Read enough whole frames to cover `ticks`, clamped to the data left.
    pub fn read_for(&mut self, ticks: u64) -> RiffResult<Vec<u8>> {
        let wanted = self.format.byte_count_from_duration(ticks);
        let count = wanted.min(self.bytes_remaining() as u64);
        self.reader.read_payload(count as usize)
    }

    /// Move to the frame boundary at or just after `ticks` from the start of
    /// the data. Positions past the end land on the end.
    ///
    /// Returns the new byte offset within the data chunk.
    pub fn seek_to(&mut self, ticks: u64) -> RiffResult<u64> {
        let offset = self
            .format
            .byte_count_from_duration(ticks)
            .min(self.data_len() as u64);
        self.reader.seek_within_chunk(offset)?;
        Ok(offset)
    }

    /// Skip up to `count` bytes of sample data, returning how many were skipped.
    pub fn skip(&mut self, count: u64) -> RiffResult<u64> {
        let count = count.min(self.bytes_remaining() as u64);
        self.reader.skip_payload(count)?;
        Ok(count)
    }

    /// Rewind to the first sample frame
    pub fn reset(&mut self) -> RiffResult<()> {
        self.reader.seek_within_chunk(0)
    }

    pub fn info(&self) -> WaveInfo {
        WaveInfo {
            sample_rate: self.format.sample_rate(),
            channels: self.format.channels(),
            bits_per_sample: self.format.bits_per_sample(),
            byte_rate: self.format.byte_rate(),
            block_align: self.format.block_align(),
            data_len: self.data_len(),
            duration_ticks: self.duration(),
            chunks: self.chunks.clone(),
        }
    }
}

/// Advance to the first chunk tagged with one of `ids`, recording every tag
/// stepped onto.
fn locate<S: ByteSource + ?Sized>(
    reader: &mut RiffReader<'_, S>,
    ids: &[ChunkID],
    seen: &mut Vec<ChunkID>,
) -> RiffResult<Option<ChunkInfo>> {
    loop {
        let chunk = reader.current();
        if chunk.id.is_any_of(ids) {
            return Ok(Some(chunk));
        }
        match reader.advance()? {
            Some(next) => seen.push(next.id),
            None => return Ok(None),
        }
    }
}

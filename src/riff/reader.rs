//! Chunk-traversal engine for RIFF and LIST containers.
//!
//! A `RiffReader` is positioned on exactly one child chunk of one container at
//! all times. Every offset it computes is checked against the container bounds
//! captured when it was opened, so a corrupt size field deeper in the tree can
//! never send a read outside the bytes its parent vouched for.

use std::io::Read;

use byteorder::{ByteOrder, LittleEndian};
use log::{debug, trace};

use crate::{
    ByteSource,
    error::{ErrorPosition, RiffError, RiffResult},
    riff::chunks::{
        CHUNK_HEADER_LEN, CONTAINER_HEADER_LEN, ChunkID, ChunkInfo, ContainerInfo, LIST_CHUNK,
    },
};

/// Upper bound on the up-front buffer reservation of [`RiffReader::read_payload`]
const PREALLOC_LIMIT: usize = 64 * 1024;

/// Cursor over the children of one RIFF/LIST container.
///
/// The reader borrows its byte source mutably for its whole lifetime. A
/// sub-reader returned by [`RiffReader::open_list`] reborrows the same source,
/// so the parent cannot be driven again until the sub-reader is dropped.
///
/// # Example
///
/// ```
/// use riff_wave_io::riff::{RiffReader, chunks::{RIFF_CHUNK, FMT_CHUNK}};
/// use std::io::Cursor;
///
/// let mut bytes = Vec::new();
/// bytes.extend_from_slice(b"RIFF");
/// bytes.extend_from_slice(&14u32.to_le_bytes());
/// bytes.extend_from_slice(b"WAVEfmt ");
/// bytes.extend_from_slice(&2u32.to_le_bytes());
/// bytes.extend_from_slice(&[0xAB, 0xCD]);
///
/// let mut source = Cursor::new(bytes);
/// let mut reader = RiffReader::open(&mut source, RIFF_CHUNK, 0)?;
/// assert_eq!(reader.current().id, FMT_CHUNK);
/// assert_eq!(reader.read_rest()?, vec![0xAB, 0xCD]);
/// assert!(reader.advance()?.is_none());
/// # Ok::<(), riff_wave_io::RiffError>(())
/// ```
#[derive(Debug)]
pub struct RiffReader<'s, S: ByteSource + ?Sized> {
    source: &'s mut S,
    container: ContainerInfo,
    current: ChunkInfo,
    /// Payload bytes of `current` not yet read or skipped
    remaining: u32,
    /// Where the source is known to be positioned; `None` whenever something
    /// other than this reader may have moved it.
    source_pos: Option<u64>,
    /// Nesting level, 0 for a reader opened directly by the caller
    depth: usize,
}

impl<'s, S: ByteSource + ?Sized> RiffReader<'s, S> {
    /// Open the container whose header starts at `offset`.
    ///
    /// On success the reader is positioned on the container's first child.
    ///
    /// # Errors
    ///
    /// - `MalformedContainer` if `offset` is odd or the declared size cannot hold a form type
    /// - `TagMismatch` if the header tag is not `expected`
    /// - `EmptyContainer` if there is no room for a child chunk
    /// - `ChunkOverflow` if the first child does not fit in the container
    /// - `ShortRead` / `Io` if the source cannot deliver the headers
    pub fn open(source: &'s mut S, expected: ChunkID, offset: u64) -> RiffResult<Self> {
        Self::open_nested(source, expected, offset, 0)
    }

    fn open_nested(
        source: &'s mut S,
        expected: ChunkID,
        offset: u64,
        depth: usize,
    ) -> RiffResult<Self> {
        if !offset.is_multiple_of(2) {
            return Err(RiffError::malformed_container(
                format!("container offset {} is not 2-byte aligned", offset),
                ErrorPosition::new(offset).with_description("container header"),
            ));
        }

        let mut header = [0u8; CONTAINER_HEADER_LEN as usize];
        read_at(source, offset, &mut header)?;

        let (tag, declared_size) = parse_chunk_header(&header);
        if tag != expected {
            return Err(RiffError::TagMismatch {
                expected,
                found: tag,
                position: ErrorPosition::new(offset).with_description("container tag"),
            });
        }

        if declared_size < 4 {
            return Err(RiffError::malformed_container(
                format!(
                    "declared size {} of '{}' cannot hold a form type",
                    declared_size, tag
                ),
                ErrorPosition::new(offset + 4).with_description("container size field"),
            ));
        }

        let container = ContainerInfo {
            tag,
            form_type: ChunkID::from([header[8], header[9], header[10], header[11]]),
            offset,
            declared_size,
        };

        if (declared_size as u64) < CONTAINER_HEADER_LEN {
            return Err(RiffError::EmptyContainer {
                tag: container.form_type,
                position: ErrorPosition::new(offset),
            });
        }

        let first_offset = container.first_child_offset();
        let mut chunk_header = [0u8; CHUNK_HEADER_LEN as usize];
        read_at(source, first_offset, &mut chunk_header)?;
        let (id, size) = parse_chunk_header(&chunk_header);
        let first = ChunkInfo::new(id, first_offset, size);
        check_fits(&container, &first)?;

        debug!(
            "opened {} '{}' at {} ({} bytes, depth {}), first chunk '{}'",
            container.tag,
            container.form_type,
            offset,
            container.size(),
            depth,
            first.id
        );

        Ok(RiffReader {
            source,
            container,
            current: first,
            remaining: size,
            source_pos: Some(first.payload_offset()),
            depth,
        })
    }

    /// Header of the container this reader walks
    #[inline]
    pub const fn container(&self) -> ContainerInfo {
        self.container
    }

    /// Form type of the container, e.g. `WAVE` or `INFO`
    #[inline]
    pub const fn container_type(&self) -> ChunkID {
        self.container.form_type
    }

    /// Snapshot of the chunk the reader is positioned on
    #[inline]
    pub const fn current(&self) -> ChunkInfo {
        self.current
    }

    /// Payload bytes of the current chunk not yet read or skipped
    #[inline]
    pub const fn bytes_remaining(&self) -> u32 {
        self.remaining
    }

    /// Offset of the payload cursor relative to the start of the current payload
    #[inline]
    pub const fn payload_position(&self) -> u32 {
        self.current.size - self.remaining
    }

    /// LIST nesting level of this reader
    #[inline]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Move to the next sibling chunk.
    ///
    /// Returns `Ok(None)` once the container is exhausted; the reader then
    /// stays on its last chunk and keeps returning `Ok(None)`.
    ///
    /// # Errors
    ///
    /// `ChunkOverflow` if the next chunk does not fit in the container, which
    /// means the data is corrupt. On any error the reader is left on the chunk
    /// it was on.
    pub fn advance(&mut self) -> RiffResult<Option<ChunkInfo>> {
        let next = self.current.end();
        let end = self.container.end();
        if next >= end {
            trace!(
                "end of '{}' container after '{}'",
                self.container.form_type, self.current.id
            );
            return Ok(None);
        }

        if end - next < CHUNK_HEADER_LEN {
            // not even a header fits; the tag is never read
            return Err(RiffError::ChunkOverflow {
                id: ChunkID::new(&[0; 4]),
                footprint: CHUNK_HEADER_LEN,
                available: end - next,
                position: ErrorPosition::new(next).with_description(format!(
                    "{} trailing bytes in '{}' at {}",
                    end - next,
                    self.container.form_type,
                    next
                )),
            });
        }

        let mut header = [0u8; CHUNK_HEADER_LEN as usize];
        self.fill_at(next, &mut header)?;
        let (id, size) = parse_chunk_header(&header);
        let chunk = ChunkInfo::new(id, next, size);
        check_fits(&self.container, &chunk)?;

        trace!("advanced to '{}' at {} ({} bytes)", id, next, size);
        self.current = chunk;
        self.remaining = size;
        Ok(Some(chunk))
    }

    /// Advance until the current chunk's tag is one of `ids`.
    ///
    /// The current chunk is checked first, so calling this on a matching chunk
    /// does not move the reader. Returns `Ok(None)` if the container ends first.
    pub fn find_chunk(&mut self, ids: &[ChunkID]) -> RiffResult<Option<ChunkInfo>> {
        loop {
            if self.current.id.is_any_of(ids) {
                return Ok(Some(self.current));
            }
            if self.advance()?.is_none() {
                return Ok(None);
            }
        }
    }

    /// Descend into the current chunk, which must be a `LIST`.
    ///
    /// The returned reader is positioned on the list's first child. It borrows
    /// this reader's source, so this reader is unusable until it is dropped.
    pub fn open_list(&mut self) -> RiffResult<RiffReader<'_, S>> {
        if !self.current.is_list() {
            return Err(RiffError::NotAList(self.current.id));
        }
        // The sub-reader moves the shared source.
        self.source_pos = None;
        RiffReader::open_nested(
            &mut *self.source,
            LIST_CHUNK,
            self.current.offset,
            self.depth + 1,
        )
    }

    /// Form type of the current `LIST` chunk without descending into it.
    ///
    /// Returns `Ok(None)` for non-list chunks and for lists too small to carry
    /// a form type. The payload cursor is not affected.
    pub fn list_form_type(&mut self) -> RiffResult<Option<ChunkID>> {
        if !self.current.is_list() || self.current.size < 4 {
            return Ok(None);
        }
        let mut form = [0u8; 4];
        self.fill_at(self.current.payload_offset(), &mut form)?;
        Ok(Some(ChunkID::from(form)))
    }

    /// Move the payload cursor to `offset` bytes into the current chunk.
    ///
    /// `offset == size` is allowed and leaves nothing to read.
    pub fn seek_within_chunk(&mut self, offset: u64) -> RiffResult<()> {
        if offset > self.current.size as u64 {
            return Err(RiffError::OffsetOutOfRange {
                id: self.current.id,
                offset,
                chunk_size: self.current.size,
            });
        }

        let target = self.current.payload_offset() + offset;
        if self.source_pos != Some(target) {
            self.source_pos = None;
            self.source.seek_to(target)?;
            self.source_pos = Some(target);
        }
        // offset <= size, so this cannot truncate
        self.remaining = self.current.size - offset as u32;
        Ok(())
    }

    /// Read exactly `count` payload bytes at the payload cursor.
    ///
    /// The buffer grows as bytes arrive, so a size field larger than the
    /// source costs no more memory than the source holds.
    pub fn read_payload(&mut self, count: usize) -> RiffResult<Vec<u8>> {
        self.check_available(count as u64)?;
        if count == 0 {
            return Ok(Vec::new());
        }

        let at = self.current.payload_offset() + self.payload_position() as u64;
        self.position_at(at)?;
        let mut buf = Vec::with_capacity(count.min(PREALLOC_LIMIT));
        let received = match (&mut *self.source).take(count as u64).read_to_end(&mut buf) {
            Ok(n) => n,
            Err(e) => {
                self.source_pos = None;
                return Err(e.into());
            }
        };
        if received < count {
            self.source_pos = None;
            return Err(RiffError::short_read(count, received, at));
        }

        self.source_pos = Some(at + count as u64);
        // checked against `remaining` above
        self.remaining -= count as u32;
        Ok(buf)
    }

    /// Fill `buf` from the payload cursor.
    ///
    /// # Errors
    ///
    /// - `ReadPastChunkEnd` if `buf` is longer than the remaining payload; nothing is read
    /// - `ShortRead` if the source ends early. The payload cursor does not move,
    ///   so the reader may still `advance()` or retry.
    pub fn read_payload_into(&mut self, buf: &mut [u8]) -> RiffResult<()> {
        let requested = buf.len();
        self.check_available(requested as u64)?;
        if requested == 0 {
            return Ok(());
        }

        let at = self.current.payload_offset() + self.payload_position() as u64;
        self.fill_at(at, buf)?;
        // checked against `remaining` above
        self.remaining -= requested as u32;
        Ok(())
    }

    /// Read every payload byte not yet consumed.
    pub fn read_rest(&mut self) -> RiffResult<Vec<u8>> {
        self.read_payload(self.remaining as usize)
    }

    /// Mark `count` payload bytes as consumed without reading them.
    ///
    /// Used when the bytes are handed to a consumer that reads the source
    /// itself, given the payload offset and length.
    pub fn skip_payload(&mut self, count: u64) -> RiffResult<()> {
        self.check_available(count)?;
        self.remaining -= count as u32;
        Ok(())
    }

    fn check_available(&self, count: u64) -> RiffResult<()> {
        if count > self.remaining as u64 {
            return Err(RiffError::ReadPastChunkEnd {
                id: self.current.id,
                requested: count,
                remaining: self.remaining,
            });
        }
        Ok(())
    }

    fn position_at(&mut self, offset: u64) -> RiffResult<()> {
        if self.source_pos != Some(offset) {
            self.source_pos = None;
            self.source.seek_to(offset)?;
        }
        Ok(())
    }

    /// Read `buf.len()` bytes at absolute `offset`, seeking only when the
    /// source is not already there.
    fn fill_at(&mut self, offset: u64, buf: &mut [u8]) -> RiffResult<()> {
        self.position_at(offset)?;

        let received = match self.source.read_fully(buf) {
            Ok(n) => n,
            Err(e) => {
                self.source_pos = None;
                return Err(e.into());
            }
        };
        if received < buf.len() {
            self.source_pos = None;
            return Err(RiffError::short_read(buf.len(), received, offset));
        }

        self.source_pos = Some(offset + received as u64);
        Ok(())
    }
}

fn read_at<S: ByteSource + ?Sized>(source: &mut S, offset: u64, buf: &mut [u8]) -> RiffResult<()> {
    source.seek_to(offset)?;
    let received = source.read_fully(buf)?;
    if received < buf.len() {
        return Err(RiffError::short_read(buf.len(), received, offset));
    }
    Ok(())
}

/// Split the first 8 bytes of `bytes` into tag and little-endian size
fn parse_chunk_header(bytes: &[u8]) -> (ChunkID, u32) {
    let id = ChunkID::from([bytes[0], bytes[1], bytes[2], bytes[3]]);
    let size = LittleEndian::read_u32(&bytes[4..8]);
    (id, size)
}

fn check_fits(container: &ContainerInfo, chunk: &ChunkInfo) -> RiffResult<()> {
    let available = container.end().saturating_sub(chunk.offset);
    if chunk.footprint() > available {
        return Err(RiffError::ChunkOverflow {
            id: chunk.id,
            footprint: chunk.footprint(),
            available,
            position: ErrorPosition::new(chunk.offset)
                .with_description(format!("chunk '{}' header at {}", chunk.id, chunk.offset)),
        });
    }
    Ok(())
}

use core::fmt::{Display, Formatter, Result as FmtResult};
use std::ops::Range;

/// Size of a chunk header: 4-byte tag followed by a little-endian u32 size
pub const CHUNK_HEADER_LEN: u64 = 8;
/// Size of a RIFF/LIST header: chunk header followed by the 4-byte form type
pub const CONTAINER_HEADER_LEN: u64 = 12;

/// FourCC chunk identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ChunkID {
    pub id: [u8; 4],
}

impl AsRef<[u8]> for ChunkID {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        &self.id
    }
}

impl Display for ChunkID {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        // Tags are meant to be printable ASCII; anything else comes from a corrupt header.
        if self.id.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
            for b in self.id {
                write!(f, "{}", b as char)?;
            }
            Ok(())
        } else {
            write!(
                f,
                "0x{:02X}{:02X}{:02X}{:02X}",
                self.id[0], self.id[1], self.id[2], self.id[3]
            )
        }
    }
}

impl From<&[u8; 4]> for ChunkID {
    fn from(value: &[u8; 4]) -> Self {
        ChunkID { id: *value }
    }
}

impl From<[u8; 4]> for ChunkID {
    fn from(value: [u8; 4]) -> Self {
        ChunkID { id: value }
    }
}

impl ChunkID {
    #[inline]
    pub const fn new(id: &[u8; 4]) -> Self {
        ChunkID { id: *id }
    }

    #[inline]
    pub const fn as_bytes(&self) -> &[u8; 4] {
        &self.id
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        core::str::from_utf8(&self.id).ok()
    }

    #[inline]
    pub fn is_any_of(&self, ids: &[ChunkID]) -> bool {
        ids.contains(self)
    }
}

/// Number of bytes a payload of `size` occupies on disk, pad byte included.
#[inline]
pub const fn padded_len(size: u32) -> u64 {
    size as u64 + (size as u64 & 1)
}

/// Snapshot of the chunk a reader is positioned on.
///
/// Values are copied out of the reader, so holding one never observes a
/// later `advance()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkInfo {
    pub id: ChunkID,
    /// Absolute offset of the chunk header
    pub offset: u64,
    /// Declared payload size (excluding header and padding)
    pub size: u32,
}

impl ChunkInfo {
    #[inline]
    pub const fn new(id: ChunkID, offset: u64, size: u32) -> Self {
        ChunkInfo { id, offset, size }
    }

    /// Absolute offset of the first payload byte
    #[inline]
    pub const fn payload_offset(&self) -> u64 {
        self.offset + CHUNK_HEADER_LEN
    }

    /// Returns the range of bytes containing the logical payload (no header, no padding)
    #[inline]
    pub const fn payload_range(&self) -> Range<u64> {
        let start = self.payload_offset();
        start..(start + self.size as u64)
    }

    /// Header plus padded payload
    #[inline]
    pub const fn footprint(&self) -> u64 {
        CHUNK_HEADER_LEN + padded_len(self.size)
    }

    /// Offset where the next sibling's header would start
    #[inline]
    pub const fn end(&self) -> u64 {
        self.offset + self.footprint()
    }

    #[inline]
    pub fn is_list(&self) -> bool {
        self.id == LIST_CHUNK
    }
}

impl Display for ChunkInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "Chunk ID: {}, Offset: {}, Size: {}, Footprint: {}",
            self.id,
            self.offset,
            self.size,
            self.footprint()
        )
    }
}

/// Header of an opened RIFF or LIST container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContainerInfo {
    /// `RIFF` or `LIST`
    pub tag: ChunkID,
    /// Form type stored after the size field, e.g. `WAVE` or `INFO`
    pub form_type: ChunkID,
    /// Absolute offset of the container header
    pub offset: u64,
    /// Size field as stored in the header (excludes tag and size fields)
    pub declared_size: u32,
}

impl ContainerInfo {
    /// Total container size including the 8-byte tag and size fields
    #[inline]
    pub const fn size(&self) -> u64 {
        self.declared_size as u64 + CHUNK_HEADER_LEN
    }

    /// First offset past the container
    #[inline]
    pub const fn end(&self) -> u64 {
        self.offset + self.size()
    }

    #[inline]
    pub const fn first_child_offset(&self) -> u64 {
        self.offset + CONTAINER_HEADER_LEN
    }
}

pub const RIFF_CHUNK: ChunkID = ChunkID::new(b"RIFF");
pub const LIST_CHUNK: ChunkID = ChunkID::new(b"LIST");
pub const WAVE_FORM: ChunkID = ChunkID::new(b"WAVE");
pub const FMT_CHUNK: ChunkID = ChunkID::new(b"fmt ");
pub const DATA_CHUNK: ChunkID = ChunkID::new(b"data");
/// Upper-case spelling some writers emit for the data chunk
pub const DATA_CHUNK_UPPER: ChunkID = ChunkID::new(b"DATA");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_len_rounds_odd_sizes_up() {
        assert_eq!(padded_len(0), 0);
        assert_eq!(padded_len(7), 8);
        assert_eq!(padded_len(8), 8);
        assert_eq!(padded_len(u32::MAX), u32::MAX as u64 + 1);
    }

    #[test]
    fn test_chunk_footprint_includes_pad_byte() {
        let chunk = ChunkInfo::new(ChunkID::new(b"abcd"), 12, 5);
        assert_eq!(chunk.payload_offset(), 20);
        assert_eq!(chunk.payload_range(), 20..25);
        assert_eq!(chunk.footprint(), 14);
        assert_eq!(chunk.end(), 26);
        assert!(!chunk.is_list());
    }

    #[test]
    fn test_container_bounds() {
        let container = ContainerInfo {
            tag: RIFF_CHUNK,
            form_type: WAVE_FORM,
            offset: 0,
            declared_size: 36,
        };
        assert_eq!(container.size(), 44);
        assert_eq!(container.end(), 44);
        assert_eq!(container.first_child_offset(), 12);
    }

    #[test]
    fn test_chunk_id_display_falls_back_to_hex() {
        assert_eq!(FMT_CHUNK.to_string(), "fmt ");
        assert_eq!(ChunkID::new(&[0, 1, 0xFF, b'a']).to_string(), "0x0001FF61");
    }
}

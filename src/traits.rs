use std::io::{self, ErrorKind, Read, Seek, SeekFrom};

/// Random-access byte source consumed by the chunk readers.
///
/// Blanket-implemented for every `Read + Seek` type, so files, `BufReader`s,
/// `Cursor<Vec<u8>>` and cursors over memory maps all work unchanged.
///
/// ## Why not just take `Read + Seek` everywhere?
///
/// The readers only need three primitives: jump to an absolute offset, fill a
/// buffer completely (or learn how much arrived before the source ran dry) and,
/// for collaborators, the total length. Naming them keeps the reader code free
/// of `SeekFrom` plumbing and lets short reads report how many bytes arrived.
pub trait ByteSource: Read + Seek {
    /// Position the source at an absolute byte offset
    fn seek_to(&mut self, offset: u64) -> io::Result<()> {
        self.seek(SeekFrom::Start(offset)).map(|_| ())
    }

    /// Fill `buf` from the current position.
    ///
    /// Returns the number of bytes read, which is less than `buf.len()` only
    /// when the source reached its end.
    fn read_fully(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }

    /// Total length of the source in bytes; the current position is preserved
    fn source_len(&mut self) -> io::Result<u64> {
        let current = self.stream_position()?;
        let len = self.seek(SeekFrom::End(0))?;
        if current != len {
            self.seek(SeekFrom::Start(current))?;
        }
        Ok(len)
    }
}

impl<RS: Read + Seek + ?Sized> ByteSource for RS {}

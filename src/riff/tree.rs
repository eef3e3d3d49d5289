//! Depth-first chunk tree printer.
//!
//! Output is one line per chunk, indented with one tab per nesting level:
//! `<tag> (<size> bytes) <form type>`, where the form type is only present for
//! RIFF and LIST containers.

use std::io::Write;

use crate::{
    ByteSource,
    error::{RiffError, RiffResult},
    riff::{
        RiffReader,
        chunks::{CONTAINER_HEADER_LEN, ChunkID, RIFF_CHUNK},
    },
    types::OpenOptions,
};

impl<S: ByteSource + ?Sized> RiffReader<'_, S> {
    /// Print the current chunk and every later sibling, descending into lists.
    ///
    /// The reader is left on the container's last chunk.
    pub fn describe_tree<W: Write>(&mut self, out: &mut W) -> RiffResult<()> {
        self.describe_tree_with(out, &OpenOptions::default())
    }

    pub fn describe_tree_with<W: Write>(
        &mut self,
        out: &mut W,
        options: &OpenOptions,
    ) -> RiffResult<()> {
        self.write_tree(out, 0, options.max_depth)
    }

    fn write_tree<W: Write>(&mut self, out: &mut W, level: usize, max_depth: usize) -> RiffResult<()> {
        loop {
            self.write_current(out, level, max_depth)?;
            // end of container ends this level of the walk
            if self.advance()?.is_none() {
                return Ok(());
            }
        }
    }

    fn write_current<W: Write>(
        &mut self,
        out: &mut W,
        level: usize,
        max_depth: usize,
    ) -> RiffResult<()> {
        let chunk = self.current();
        let form_type = self.list_form_type()?;
        writeln!(out, "{}", tree_line(level, chunk.id, chunk.size, form_type))?;

        if chunk.is_list() && chunk.size as u64 >= CONTAINER_HEADER_LEN {
            if self.depth() + 1 > max_depth {
                return Err(RiffError::NestingTooDeep(max_depth));
            }
            let mut sub = self.open_list()?;
            sub.write_tree(out, level + 1, max_depth)?;
        }
        Ok(())
    }
}

/// Print the chunk tree of a whole RIFF source, starting with the RIFF header line.
pub fn describe_source<S, W>(source: &mut S, out: &mut W, options: &OpenOptions) -> RiffResult<()>
where
    S: ByteSource + ?Sized,
    W: Write,
{
    let mut reader = RiffReader::open(source, RIFF_CHUNK, 0)?;
    let container = reader.container();
    writeln!(
        out,
        "{}",
        tree_line(
            0,
            container.tag,
            container.declared_size,
            Some(container.form_type)
        )
    )?;
    reader.write_tree(out, 1, options.max_depth)
}

fn tree_line(level: usize, id: ChunkID, size: u32, form_type: Option<ChunkID>) -> String {
    let form = form_type.map(|f| f.to_string()).unwrap_or_default();
    let line = format!("{}{} ({} bytes) {}", "\t".repeat(level), id, size, form);
    line.trim_end().to_string()
}

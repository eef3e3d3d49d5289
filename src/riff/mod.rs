//! Generic RIFF container traversal.
//!
//! [`RiffReader`] walks the children of one RIFF or LIST container over any
//! [`ByteSource`](crate::ByteSource); nested lists are opened as sub-readers
//! that borrow the same source.

pub mod chunks;
pub mod reader;
pub mod tree;

#[cfg(test)]
pub(crate) mod test_support;

pub use chunks::{ChunkID, ChunkInfo, ContainerInfo};
pub use reader::RiffReader;
pub use tree::describe_source;

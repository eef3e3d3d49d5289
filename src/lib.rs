// Correctness and logic
#![warn(clippy::unit_cmp)] // Detects comparing unit types
#![warn(clippy::match_same_arms)] // Duplicate match arms
#![allow(clippy::result_large_err)] // Allow large error types for comprehensive error handling
#![allow(clippy::missing_const_for_fn)] // Functions may need mutations in the future
#![allow(clippy::collapsible_if)] // Sometimes clearer to have separate conditions
#![allow(clippy::missing_panics_doc)] // Panics are converted to proper errors where needed
#![allow(clippy::needless_borrows_for_generic_args)] // Sometimes clearer with explicit borrows
#![allow(clippy::if_same_then_else)] // Similar blocks may diverge in the future
#![allow(clippy::unnecessary_cast)] // Explicit casts for clarity
#![allow(clippy::identity_op)] // Explicit operations for clarity

// Performance-focused
#![warn(clippy::inefficient_to_string)] // `format!("{}", x)` vs `x.to_string()`
#![warn(clippy::map_clone)] // Cloning inside `map()` unnecessarily
#![warn(clippy::unnecessary_to_owned)] // Detects redundant `.to_owned()` or `.clone()`
#![warn(clippy::large_stack_arrays)] // Helps avoid stack overflows
#![warn(clippy::box_collection)] // Warns on boxed `Vec`, `String`, etc.
#![warn(clippy::vec_box)] // Avoids using `Vec<Box<T>>` when unnecessary
#![warn(clippy::needless_collect)] // Avoids `.collect().iter()` chains

// Style and idiomatic Rust
#![warn(clippy::redundant_clone)] // Detects unnecessary `.clone()`
#![warn(clippy::identity_op)] // e.g., `x + 0`, `x * 1`
#![warn(clippy::needless_return)] // Avoids `return` at the end of functions
#![warn(clippy::let_unit_value)] // Avoids binding `()` to variables
#![warn(clippy::manual_map)] // Use `.map()` instead of manual `match`
#![warn(clippy::unwrap_used)] // Avoids using `unwrap()`
#![warn(clippy::panic)] // Avoids using `panic!` in production code

// Maintainability
#![warn(clippy::missing_panics_doc)] // Docs for functions that might panic
#![warn(clippy::missing_safety_doc)] // Docs for `unsafe` functions
#![warn(clippy::missing_const_for_fn)] // Suggests making eligible functions `const`
#![allow(clippy::too_many_arguments)] // Allow functions with many parameters (very few and far between)

//! Bounds-checked traversal of RIFF containers and decoding of the
//! WAVEFORMATEX descriptor carried by RIFF/WAVE files.
//!
//! [`RiffReader`] walks the chunks of a RIFF or LIST container without ever
//! reading outside the container's declared bounds. [`wav::WaveFormatEx`]
//! decodes and validates the `fmt ` chunk, and [`wav::StreamedWave`] combines
//! the two to stream the `data` chunk of a PCM wave file.

pub mod error;
pub mod riff;
pub mod traits;
pub mod types;

#[cfg(feature = "wav")]
pub mod wav;

#[cfg(feature = "wav")]
pub use crate::wav::{PcmFormat, StreamedWave, WaveFormatEx, error::WavError};

pub use crate::{
    error::{ErrorPosition, RiffError, RiffResult},
    riff::{ChunkID, ChunkInfo, ContainerInfo, RiffReader, describe_source},
    traits::ByteSource,
    types::{OpenOptions, TICKS_PER_SECOND, WaveInfo},
};

/// Open a RIFF/WAVE source and summarise its format and data chunk.
///
/// Reads only the container headers and the `fmt ` payload.
#[cfg(feature = "wav")]
pub fn wave_info<S: ByteSource + ?Sized>(source: &mut S) -> RiffResult<WaveInfo> {
    Ok(StreamedWave::new(source)?.info())
}

use std::{
    fs::File,
    io::{Cursor, Write},
};

use log::{debug, trace};
use memmap2::MmapOptions;

use riff_wave_io::{OpenOptions, StreamedWave, describe_source};

mod args;
use args::CliOptions;

fn main() -> anyhow::Result<()> {
    let opts = CliOptions::new()?;
    trace!("args: {:?}", opts);

    // map the whole file; the reader only touches the headers it walks
    let file = File::open(&opts.input_file)?;
    let mmap = unsafe { MmapOptions::new().map(&file)? };
    debug!("mapped {} bytes from {}", mmap.len(), opts.input_file.display());
    let mut source = Cursor::new(mmap);

    let mut options = OpenOptions::default();
    if let Some(depth) = opts.max_depth {
        options = options.with_max_depth(depth);
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    describe_source(&mut source, &mut out, &options)?;

    if opts.show_format {
        let wave = StreamedWave::with_options(&mut source, options)?;
        writeln!(out)?;
        writeln!(out, "{:#}", wave.info())?;
        writeln!(out, "Canonical hex: {}", wave.format().encode_canonical_hex())?;
    }

    out.flush()?;
    Ok(())
}

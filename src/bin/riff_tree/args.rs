//! Command line arguments and logger setup.
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use clap::builder::styling;
use clap::{Arg, ArgAction, Command};
use simplelog::*;

/// Parsed command line.
#[derive(Debug, Default)]
pub struct CliOptions {
    // RIFF file to describe
    pub input_file: PathBuf,

    // deepest LIST nesting to descend into
    pub max_depth: Option<usize>,

    // also print the validated wave format
    pub show_format: bool,
}

impl CliOptions {
    pub fn new() -> anyhow::Result<CliOptions> {
        const STYLES: styling::Styles = styling::Styles::styled()
            .header(styling::AnsiColor::Green.on_default().bold())
            .usage(styling::AnsiColor::Green.on_default().bold())
            .literal(styling::AnsiColor::Blue.on_default().bold())
            .placeholder(styling::AnsiColor::Cyan.on_default());

        let matches = Command::new("riff-tree")
            .version(env!("CARGO_PKG_VERSION"))
            .styles(STYLES)
            .about("Print the chunk tree of a RIFF file, and optionally its WAVE format.")
            .arg(
                Arg::new("input")
                    .short('i')
                    .long("input")
                    .long_help("Name and path of the RIFF file to describe")
                    .value_name("FILE")
                    .value_parser(clap::value_parser!(PathBuf))
                    .required(true),
            )
            .arg(
                Arg::new("maxdepth")
                    .short('d')
                    .long("max-depth")
                    .long_help("Fail instead of descending into LIST chunks nested deeper than DEPTH")
                    .value_name("DEPTH")
                    .value_parser(clap::value_parser!(usize))
                    .required(false),
            )
            .arg(
                Arg::new("format")
                    .short('f')
                    .long("format")
                    .action(ArgAction::SetTrue)
                    .long_help("Decode and validate the 'fmt ' chunk, print it and its canonical hex"),
            )
            .arg(
                Arg::new("log")
                    .long("log")
                    .long_help("Save debugging info into the file LOG.")
                    .action(ArgAction::Set)
                    .value_name("LOG")
                    .value_parser(clap::value_parser!(PathBuf)),
            )
            .arg(
                Arg::new("verbose")
                    .short('v')
                    .long("verbose")
                    .long_help("Verbose mode, from warn (-v) to trace (-vvvv).")
                    .action(ArgAction::Count),
            )
            .get_matches();

        let input_file = matches
            .get_one::<PathBuf>("input")
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("missing input file"))?;

        let level = match matches.get_count("verbose") {
            0 => log::LevelFilter::Off,
            1 => log::LevelFilter::Warn,
            2 => log::LevelFilter::Info,
            3 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };
        if let Some(path) = matches.get_one::<PathBuf>("log") {
            init_write_logger(path, level)?;
        } else {
            init_term_logger(level)?;
        }

        Ok(CliOptions {
            input_file,
            max_depth: matches.get_one::<usize>("maxdepth").copied(),
            show_format: matches.get_flag("format"),
        })
    }
}

// Initialize write logger: either create it or use it
fn init_write_logger(logfile: &Path, level: log::LevelFilter) -> anyhow::Result<()> {
    if level == log::LevelFilter::Off {
        return Ok(());
    }

    let writable = OpenOptions::new().create(true).append(true).open(logfile)?;

    WriteLogger::init(
        level,
        simplelog::ConfigBuilder::new()
            .set_time_format_rfc3339()
            .build(),
        writable,
    )?;

    Ok(())
}

// Initialize terminal logger
fn init_term_logger(level: log::LevelFilter) -> anyhow::Result<()> {
    if level == log::LevelFilter::Off {
        return Ok(());
    }
    TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )?;

    Ok(())
}

use std::path::PathBuf;

use clap::parser::ValueSource;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser, ValueEnum};

use rectcast_source::SegmenterKind;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum SegmenterArg {
    /// Luma threshold: bright foreground on dark background
    Luma,
    /// Green-screen chroma key
    ChromaKey,
}

impl From<SegmenterArg> for SegmenterKind {
    fn from(arg: SegmenterArg) -> Self {
        match arg {
            SegmenterArg::Luma => SegmenterKind::Luma,
            SegmenterArg::ChromaKey => SegmenterKind::ChromaKey,
        }
    }
}

/// Which CLI values were given explicitly, as opposed to falling back to a
/// clap default. Explicit values always win over the config file.
#[derive(Debug, Default)]
pub struct CliSources {
    pub segmenter_from_cli: bool,
    pub threshold_from_cli: bool,
    pub fps_from_cli: bool,
    pub dump_interval_from_cli: bool,
}

impl CliSources {
    fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            segmenter_from_cli: value_from_cli(matches, "segmenter"),
            threshold_from_cli: value_from_cli(matches, "threshold"),
            fps_from_cli: value_from_cli(matches, "fps"),
            dump_interval_from_cli: value_from_cli(matches, "dump_interval"),
        }
    }
}

fn value_from_cli(matches: &ArgMatches, id: &str) -> bool {
    matches
        .value_source(id)
        .is_some_and(|source| matches!(source, ValueSource::CommandLine))
}

pub fn parse_cli() -> (CliArgs, CliSources) {
    let command = CliArgs::command();
    let matches = command.get_matches();
    let args = match CliArgs::from_arg_matches(&matches) {
        Ok(args) => args,
        Err(err) => err.exit(),
    };
    let sources = CliSources::from_matches(&matches);
    (args, sources)
}

#[derive(Debug, Parser)]
#[command(
    name = "rectcast",
    about = "Convert video frame masks into a rectangle-stream container",
    disable_help_subcommand = true
)]
pub struct CliArgs {
    /// Lock frame input to a specific backend implementation
    #[arg(short = 'b', long = "backend")]
    pub backend: Option<String>,

    /// Override the configuration file path
    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    /// Output path for the encoded rectangle container
    #[arg(long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Foreground/background segmentation strategy
    #[arg(long = "segmenter", value_enum, default_value_t = SegmenterArg::Luma)]
    pub segmenter: SegmenterArg,

    /// Luma threshold for the luma segmenter (0-255)
    #[arg(long = "threshold", id = "threshold", default_value_t = 127)]
    pub threshold: u8,

    /// Playback frame rate written to the container header; defaults to the
    /// source's detected rate
    #[arg(long = "fps", id = "fps", value_parser = clap::value_parser!(u16).range(1..))]
    pub fps: Option<u16>,

    /// Resize frames to this width before segmentation
    #[arg(long = "width", requires = "height")]
    pub width: Option<u32>,

    /// Resize frames to this height before segmentation
    #[arg(long = "height", requires = "width")]
    pub height: Option<u32>,

    /// Directory for debug mask dumps (disabled unless set)
    #[arg(long = "dump-dir")]
    pub dump_dir: Option<PathBuf>,

    /// Dump every Nth welded mask when --dump-dir is set
    #[arg(
        long = "dump-interval",
        id = "dump_interval",
        default_value_t = 60,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub dump_interval: u64,

    /// Write the encode report as JSON to this path
    #[arg(long = "report-json", value_name = "FILE")]
    pub report_json: Option<PathBuf>,

    /// Frame queue capacity before applying backpressure
    #[arg(long = "channel-capacity", value_parser = clap::value_parser!(usize))]
    pub channel_capacity: Option<usize>,

    /// Print the list of available frame backends
    #[arg(long = "list-backends")]
    pub list_backends: bool,

    /// Replay an encoded container and print per-frame rectangle counts
    #[arg(long = "inspect", value_name = "FILE")]
    pub inspect: Option<PathBuf>,

    /// Input frame directory (or backend-specific input)
    pub input: Option<PathBuf>,
}

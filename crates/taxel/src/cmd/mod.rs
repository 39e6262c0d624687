use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod decode;
pub mod gen;
pub mod info;
pub mod stream;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode a captured byte stream and print completed frames.
    Decode(DecodeArgs),
    /// Follow a live byte stream and print frames as they complete.
    Stream(StreamArgs),
    /// Synthesize a valid capture for testing.
    Gen(GenArgs),
    /// Inspect a sensor layout descriptor.
    Info(InfoArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Decode(args) => decode::run(args, format),
        Command::Stream(args) => stream::run(args, format),
        Command::Gen(args) => gen::run(args),
        Command::Info(args) => info::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Capture file to decode, or `-` for stdin.
    pub capture: PathBuf,
    /// Sensor layout descriptor (JSON).
    #[arg(long, value_name = "FILE")]
    pub layout: PathBuf,
    /// Stop after printing N frames.
    #[arg(long)]
    pub count: Option<u64>,
    /// Print only the newest frame once the stream ends.
    #[arg(long, conflicts_with = "count")]
    pub latest: bool,
}

#[derive(Args, Debug)]
pub struct StreamArgs {
    /// Stream to follow (file, FIFO, character device), or `-` for stdin.
    pub path: PathBuf,
    /// Sensor layout descriptor (JSON).
    #[arg(long, value_name = "FILE")]
    pub layout: PathBuf,
    /// Poll only the newest frame, discarding stale ones.
    #[arg(long)]
    pub latest: bool,
    /// Consumer poll period in milliseconds.
    #[arg(long, default_value = "50")]
    pub interval_ms: u64,
    /// Exit after printing N frames.
    #[arg(long)]
    pub count: Option<u64>,
}

#[derive(Args, Debug)]
pub struct GenArgs {
    /// Sensor layout descriptor (JSON).
    #[arg(long, value_name = "FILE")]
    pub layout: PathBuf,
    /// Number of complete frames to generate.
    #[arg(long, default_value = "10")]
    pub frames: u32,
    /// Write the capture here instead of stdout.
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,
    /// Insert N garbage bytes before each frame.
    #[arg(long, default_value = "0")]
    pub noise: usize,
    /// Corrupt the CRC of every Nth packet.
    #[arg(long, value_name = "N")]
    pub corrupt_every: Option<u32>,
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Sensor layout descriptor (JSON).
    #[arg(long, value_name = "FILE")]
    pub layout: PathBuf,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

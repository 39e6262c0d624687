use std::path::Path;
use std::time::Duration;

use taxel_layout::SensorLayout;
use taxel_source::{ChunkSource, FileSource, StdinSource};
use taxel_wire::FrameDecoder;

use crate::cmd::DecodeArgs;
use crate::exit::{layout_error, source_error, CliResult, SUCCESS};
use crate::output::{print_frame, print_stats, OutputFormat};

const READ_CHUNK_SIZE: usize = 8 * 1024;

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let layout = SensorLayout::from_path(&args.layout)
        .map_err(|err| layout_error("invalid layout", err))?;
    let mut source = open_source(&args.capture)?;

    // Offline replay: every completed frame matters, so the live-pacing
    // throttle is disabled.
    let mut decoder = FrameDecoder::with_min_interval(layout, Duration::ZERO);
    let frames = decoder.frames();

    let mut printed = 0u64;
    let mut chunk = [0u8; READ_CHUNK_SIZE];
    loop {
        let read = source
            .read_chunk(&mut chunk)
            .map_err(|err| source_error("read failed", err))?;
        if read == 0 {
            break;
        }
        decoder.ingest(&chunk[..read]);

        if args.latest {
            continue;
        }
        while let Some(frame) = frames.pop() {
            print_frame(&frame, printed, format);
            printed = printed.saturating_add(1);
            if let Some(count) = args.count {
                if printed >= count {
                    return Ok(SUCCESS);
                }
            }
        }
    }

    if args.latest {
        if let Some(frame) = frames.pop_latest() {
            print_frame(&frame, 0, format);
        }
    } else {
        while let Some(frame) = frames.pop() {
            print_frame(&frame, printed, format);
            printed = printed.saturating_add(1);
            if let Some(count) = args.count {
                if printed >= count {
                    return Ok(SUCCESS);
                }
            }
        }
    }

    let stats = decoder.stats();
    tracing::info!(
        packets = stats.packets_accepted,
        frames = stats.frames_completed,
        crc_errors = stats.crc_errors,
        sequence_errors = stats.sequence_errors,
        "capture decoded"
    );
    if stats.crc_errors > 0 || stats.sequence_errors > 0 {
        print_stats(&stats, format);
    }
    Ok(SUCCESS)
}

fn open_source(path: &Path) -> CliResult<Box<dyn ChunkSource>> {
    if path.as_os_str() == "-" {
        Ok(Box::new(StdinSource::new()))
    } else {
        let source =
            FileSource::open(path).map_err(|err| source_error("cannot open capture", err))?;
        Ok(Box::new(source))
    }
}

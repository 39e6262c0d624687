use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use taxel_layout::SensorLayout;
use taxel_source::{FileSource, SourcePump, StdinSource};
use taxel_wire::FrameDecoder;

use crate::cmd::StreamArgs;
use crate::exit::{layout_error, source_error, CliError, CliResult, SUCCESS};
use crate::output::{print_frame, print_stats, OutputFormat};

pub fn run(args: StreamArgs, format: OutputFormat) -> CliResult<i32> {
    let layout = SensorLayout::from_path(&args.layout)
        .map_err(|err| layout_error("invalid layout", err))?;

    // Live pacing: the default minimum interval stays in effect so a fast
    // sensor cannot outrun the printing consumer.
    let decoder = FrameDecoder::new(layout);
    let pump = spawn_pump(&args.path, decoder)?;
    let frames = pump.frames();

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let poll = Duration::from_millis(args.interval_ms.max(1));
    let mut printed = 0u64;

    while running.load(Ordering::SeqCst) {
        let next = if args.latest {
            frames.pop_latest()
        } else {
            frames.pop()
        };

        match next {
            Some(frame) => {
                print_frame(&frame, printed, format);
                printed = printed.saturating_add(1);
                if let Some(count) = args.count {
                    if printed >= count {
                        break;
                    }
                }
            }
            None => {
                if pump.is_finished() {
                    break;
                }
                std::thread::sleep(poll);
            }
        }
    }

    pump.stop();
    if pump.is_finished() {
        let decoder = pump.join().map_err(|err| source_error("stream failed", err))?;
        // Drain whatever completed between the last poll and the pump exit.
        if !args.latest {
            while let Some(frame) = frames.pop() {
                if args.count.is_some_and(|count| printed >= count) {
                    break;
                }
                print_frame(&frame, printed, format);
                printed = printed.saturating_add(1);
            }
        }
        print_stats(&decoder.stats(), format);
    } else {
        // The pump is parked in a blocking read; joining would hang until
        // the transport delivers or closes.
        tracing::info!("source still blocked, exiting without final stats");
    }

    Ok(SUCCESS)
}

fn spawn_pump(path: &Path, decoder: FrameDecoder) -> CliResult<SourcePump> {
    let pump = if path.as_os_str() == "-" {
        SourcePump::spawn(StdinSource::new(), decoder)
    } else {
        let source =
            FileSource::open(path).map_err(|err| source_error("cannot open stream", err))?;
        SourcePump::spawn(source, decoder)
    };
    pump.map_err(|err| source_error("pump start failed", err))
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}

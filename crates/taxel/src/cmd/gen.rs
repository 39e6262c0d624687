use std::fs::File;
use std::io::{self, BufWriter, Write};

use bytes::BytesMut;
use taxel_layout::SensorLayout;
use taxel_wire::{encode_packet, pack_samples};

use crate::cmd::GenArgs;
use crate::exit::{io_error, layout_error, wire_error, CliResult, SUCCESS};

pub fn run(args: GenArgs) -> CliResult<i32> {
    let layout = SensorLayout::from_path(&args.layout)
        .map_err(|err| layout_error("invalid layout", err))?;

    let mut writer: BufWriter<Box<dyn Write>> = match &args.out {
        Some(path) => {
            let file = File::create(path).map_err(|err| {
                io_error(&format!("cannot create {}", path.display()), err)
            })?;
            BufWriter::new(Box::new(file))
        }
        None => BufWriter::new(Box::new(io::stdout().lock())),
    };

    generate(&layout, &args, &mut writer)?;
    writer.flush().map_err(|err| io_error("write failed", err))?;

    tracing::info!(
        frames = args.frames,
        noise = args.noise,
        corrupt_every = ?args.corrupt_every,
        "capture generated"
    );
    Ok(SUCCESS)
}

fn generate(layout: &SensorLayout, args: &GenArgs, writer: &mut impl Write) -> CliResult<()> {
    let mut noise = Xorshift32::new(0x7A3E_11C5);
    let mut wire = BytesMut::new();
    let mut packet_count = 0u32;

    for frame in 0..args.frames {
        if args.noise > 0 {
            let garbage: Vec<u8> = (0..args.noise).map(|_| noise.next_byte()).collect();
            writer
                .write_all(&garbage)
                .map_err(|err| io_error("write failed", err))?;
        }

        for row in 0..layout.rows() {
            let samples: Vec<i16> = (0..layout.cols())
                .map(|col| sample(frame, row, col, layout.cols()))
                .collect();
            let payload =
                pack_samples(layout, &samples).map_err(|err| wire_error("pack failed", err))?;

            wire.clear();
            encode_packet(layout, (frame % 256) as u8, row as u8, &payload, &mut wire)
                .map_err(|err| wire_error("encode failed", err))?;

            packet_count += 1;
            if let Some(every) = args.corrupt_every {
                if every > 0 && packet_count % every == 0 {
                    let last = wire.len() - 1;
                    wire[last] ^= 0x01;
                }
            }
            writer
                .write_all(&wire)
                .map_err(|err| io_error("write failed", err))?;
        }
    }

    // A frame only finalizes when the next frame's first row arrives, so the
    // capture closes with one more frame start.
    let payload = pack_samples(layout, &vec![0i16; layout.cols()])
        .map_err(|err| wire_error("pack failed", err))?;
    wire.clear();
    encode_packet(layout, (args.frames % 256) as u8, 0, &payload, &mut wire)
        .map_err(|err| wire_error("encode failed", err))?;
    writer
        .write_all(&wire)
        .map_err(|err| io_error("write failed", err))?;

    Ok(())
}

/// Synthetic reading: a pressure ridge sweeping across the array, one column
/// per frame. Values stay within an i8 so one-byte layouts can carry them.
fn sample(frame: u32, row: usize, col: usize, cols: usize) -> i16 {
    let peak = (frame as usize + row) % cols;
    let dist = col.abs_diff(peak) as i16;
    (100 - dist * 30).max(0)
}

struct Xorshift32 {
    state: u32,
}

impl Xorshift32 {
    fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    fn next_byte(&mut self) -> u8 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 17;
        self.state ^= self.state << 5;
        (self.state >> 24) as u8
    }
}

use std::io::{IsTerminal, Write};
use std::time::UNIX_EPOCH;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use taxel_wire::{DecoderStats, Frame};

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct FrameOutput {
    index: u64,
    rows: usize,
    cols: usize,
    timestamp_ms: u128,
    data: Vec<Vec<i16>>,
}

pub fn print_frame(frame: &Frame, index: u64, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = FrameOutput {
                index,
                rows: frame.rows(),
                cols: frame.cols(),
                timestamp_ms: unix_millis(frame),
                data: frame.iter_rows().map(<[i16]>::to_vec).collect(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let (min, max) = min_max(frame);
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FRAME", "ROWS", "COLS", "MIN", "MAX", "TIMESTAMP_MS"])
                .add_row(vec![
                    index.to_string(),
                    frame.rows().to_string(),
                    frame.cols().to_string(),
                    min.to_string(),
                    max.to_string(),
                    unix_millis(frame).to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "frame {} ({}x{}) t={}ms",
                index,
                frame.rows(),
                frame.cols(),
                unix_millis(frame)
            );
            for row in frame.iter_rows() {
                let cells: Vec<String> = row.iter().map(|v| format!("{v:6}")).collect();
                println!("  {}", cells.join(" "));
            }
        }
        OutputFormat::Raw => {
            let mut out = std::io::stdout();
            for &sample in frame.as_slice() {
                let _ = out.write_all(&sample.to_le_bytes());
            }
            let _ = out.flush();
        }
    }
}

#[derive(Serialize)]
struct StatsOutput {
    packets_accepted: u64,
    crc_errors: u64,
    sequence_errors: u64,
    frames_completed: u64,
    frames_throttled: u64,
    frames_evicted: u64,
}

pub fn print_stats(stats: &DecoderStats, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = StatsOutput {
                packets_accepted: stats.packets_accepted,
                crc_errors: stats.crc_errors,
                sequence_errors: stats.sequence_errors,
                frames_completed: stats.frames_completed,
                frames_throttled: stats.frames_throttled,
                frames_evicted: stats.frames_evicted,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["COUNTER", "VALUE"])
                .add_row(vec![
                    "packets_accepted".to_string(),
                    stats.packets_accepted.to_string(),
                ])
                .add_row(vec!["crc_errors".to_string(), stats.crc_errors.to_string()])
                .add_row(vec![
                    "sequence_errors".to_string(),
                    stats.sequence_errors.to_string(),
                ])
                .add_row(vec![
                    "frames_completed".to_string(),
                    stats.frames_completed.to_string(),
                ])
                .add_row(vec![
                    "frames_throttled".to_string(),
                    stats.frames_throttled.to_string(),
                ])
                .add_row(vec![
                    "frames_evicted".to_string(),
                    stats.frames_evicted.to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            println!(
                "packets={} crc_errors={} sequence_errors={} completed={} throttled={} evicted={}",
                stats.packets_accepted,
                stats.crc_errors,
                stats.sequence_errors,
                stats.frames_completed,
                stats.frames_throttled,
                stats.frames_evicted
            );
        }
    }
}

fn unix_millis(frame: &Frame) -> u128 {
    frame
        .timestamp()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

fn min_max(frame: &Frame) -> (i16, i16) {
    frame.as_slice().iter().fold((i16::MAX, i16::MIN), |(min, max), &v| {
        (min.min(v), max.max(v))
    })
}

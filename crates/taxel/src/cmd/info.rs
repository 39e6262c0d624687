use serde::Serialize;
use taxel_layout::SensorLayout;

use crate::cmd::InfoArgs;
use crate::exit::{layout_error, CliResult, SUCCESS};
use crate::output::OutputFormat;

#[derive(Serialize)]
struct InfoOutput {
    rows: usize,
    cols: usize,
    sample_width_bytes: usize,
    payload_len: usize,
    packet_len: usize,
    ring_capacity: usize,
    max_residual: usize,
    row_order: Vec<usize>,
    column_order: Vec<usize>,
}

pub fn run(args: InfoArgs, format: OutputFormat) -> CliResult<i32> {
    let layout = SensorLayout::from_path(&args.layout)
        .map_err(|err| layout_error("invalid layout", err))?;

    let out = InfoOutput {
        rows: layout.rows(),
        cols: layout.cols(),
        sample_width_bytes: layout.sample_width().bytes(),
        payload_len: layout.payload_len(),
        packet_len: layout.packet_len(),
        ring_capacity: layout.ring_capacity(),
        max_residual: layout.max_residual(),
        row_order: layout.row_order().to_vec(),
        column_order: layout.column_order().to_vec(),
    };

    print_info(&out, format);
    Ok(SUCCESS)
}

fn print_info(out: &InfoOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("Sensor Layout:");
            println!("  Frame:         {} x {}", out.rows, out.cols);
            println!("  Sample width:  {} byte(s)", out.sample_width_bytes);
            println!("  Row payload:   {} bytes", out.payload_len);
            println!("  Packet size:   {} bytes", out.packet_len);
            println!("  Ring capacity: {} frames", out.ring_capacity);
            println!("  Residual cap:  {} bytes", out.max_residual);
            println!("  Row order:     {:?}", out.row_order);
            println!("  Column order:  {:?}", out.column_order);
        }
        OutputFormat::Raw => {
            println!("{}x{}", out.rows, out.cols);
        }
    }
}

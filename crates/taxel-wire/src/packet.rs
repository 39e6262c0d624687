use bytes::{BufMut, BytesMut};
use crc::{Crc, CRC_16_IBM_3740};
use taxel_layout::{SampleWidth, SensorLayout};

use crate::error::{Result, WireError};

/// Magic bytes opening every row packet.
pub const MAGIC: [u8; 3] = [0xAA, 0x10, 0x33];

/// Header: magic (3) + reserved (1) + frame_index (1) + row_index (1).
pub const HEADER_LEN: usize = taxel_layout::HEADER_LEN;

/// Trailing CRC-16, big-endian.
pub const CRC_LEN: usize = taxel_layout::CRC_LEN;

/// Byte offset of the frame counter within the header.
pub(crate) const FRAME_INDEX_OFFSET: usize = 4;

/// Byte offset of the row index within the header.
pub(crate) const ROW_INDEX_OFFSET: usize = 5;

// CRC-16/CCITT-FALSE: poly 0x1021, init 0xFFFF, no reflection.
const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_IBM_3740);

/// CRC-16/CCITT-FALSE over `data`, as the hardware computes it.
pub fn crc16(data: &[u8]) -> u16 {
    CRC16.checksum(data)
}

/// Encode one row packet into the wire format.
///
/// Wire format:
/// ```text
/// ┌────────────────┬──────────┬───────────┬─────────┬──────────────────┬────────────┐
/// │ Magic (3B)     │ Reserved │ Frame idx │ Row idx │ Payload           │ CRC-16     │
/// │ 0xAA 0x10 0x33 │ (1B)     │ (1B)      │ (1B)    │ (cols × width B)  │ (2B BE)    │
/// └────────────────┴──────────┴───────────┴─────────┴──────────────────┴────────────┘
/// ```
///
/// `payload` is the raw interleaved byte-plane data in wire order, exactly
/// `layout.payload_len()` bytes.
pub fn encode_packet(
    layout: &SensorLayout,
    frame_index: u8,
    row_index: u8,
    payload: &[u8],
    dst: &mut BytesMut,
) -> Result<()> {
    if payload.len() != layout.payload_len() {
        return Err(WireError::PayloadSizeMismatch {
            expected: layout.payload_len(),
            got: payload.len(),
        });
    }
    if (row_index as usize) >= layout.rows() {
        return Err(WireError::RowIndexOutOfRange {
            row: row_index,
            rows: layout.rows(),
        });
    }

    let start = dst.len();
    dst.reserve(layout.packet_len());
    dst.put_slice(&MAGIC);
    dst.put_u8(0); // reserved
    dst.put_u8(frame_index);
    dst.put_u8(row_index);
    dst.put_slice(payload);
    let crc = crc16(&dst[start..]);
    dst.put_u16(crc);
    Ok(())
}

/// Pack one row of sample values into wire payload bytes.
///
/// Samples are given in wire column order; each is split into the layout's
/// byte-planes, signed most-significant byte first. The inverse of the
/// decoder's byte-plane reconstruction, used by stream generators and tests.
pub fn pack_samples(layout: &SensorLayout, samples: &[i16]) -> Result<Vec<u8>> {
    if samples.len() != layout.cols() {
        return Err(WireError::PayloadSizeMismatch {
            expected: layout.cols(),
            got: samples.len(),
        });
    }

    let mut payload = Vec::with_capacity(layout.payload_len());
    match layout.sample_width() {
        SampleWidth::One => {
            for &sample in samples {
                let narrow =
                    i8::try_from(sample).map_err(|_| WireError::SampleOutOfRange(sample))?;
                payload.push(narrow as u8);
            }
        }
        SampleWidth::Two => {
            for &sample in samples {
                payload.extend_from_slice(&sample.to_be_bytes());
            }
        }
    }
    Ok(payload)
}

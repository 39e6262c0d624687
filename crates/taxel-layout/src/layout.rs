use std::path::Path;

use crate::descriptor::LayoutDescriptor;
use crate::error::{LayoutError, Result};

/// Wire packet header length: magic (3) + reserved (1) + frame (1) + row (1).
pub const HEADER_LEN: usize = 6;

/// Trailing CRC-16 length.
pub const CRC_LEN: usize = 2;

/// Sample width on the wire.
///
/// Each sample is transmitted as one or two bytes, split across interleaved
/// byte-planes. Any other width is a descriptor bug and is rejected at
/// construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleWidth {
    /// One signed byte per sample.
    One,
    /// Two bytes per sample, signed most-significant byte first.
    Two,
}

impl SampleWidth {
    /// Number of byte-planes per sample.
    pub fn bytes(self) -> usize {
        match self {
            SampleWidth::One => 1,
            SampleWidth::Two => 2,
        }
    }
}

impl TryFrom<u64> for SampleWidth {
    type Error = LayoutError;

    fn try_from(value: u64) -> Result<Self> {
        match value {
            1 => Ok(SampleWidth::One),
            2 => Ok(SampleWidth::Two),
            other => Err(LayoutError::UnsupportedSampleWidth(other)),
        }
    }
}

/// Validated, immutable sensor geometry.
///
/// Derived from a [`LayoutDescriptor`]; all indices are checked so that the
/// decoder can index by them without further bounds handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorLayout {
    row_order: Vec<usize>,
    column_order: Vec<usize>,
    sample_width: SampleWidth,
    ring_capacity: usize,
}

impl SensorLayout {
    /// Shorthand for loading and validating a descriptor file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        LayoutDescriptor::from_path(path)?.try_into()
    }

    /// Rows in the output frame.
    pub fn rows(&self) -> usize {
        self.row_order.len()
    }

    /// Columns in the output frame.
    pub fn cols(&self) -> usize {
        self.column_order.len()
    }

    /// Wire row index -> output row position.
    pub fn row_order(&self) -> &[usize] {
        &self.row_order
    }

    /// Output column -> wire column to sample from.
    pub fn column_order(&self) -> &[usize] {
        &self.column_order
    }

    /// Sample width on the wire.
    pub fn sample_width(&self) -> SampleWidth {
        self.sample_width
    }

    /// Completed frames buffered before the oldest is dropped.
    pub fn ring_capacity(&self) -> usize {
        self.ring_capacity
    }

    /// Sample payload bytes per row packet.
    pub fn payload_len(&self) -> usize {
        self.cols() * self.sample_width.bytes()
    }

    /// Total wire size of one row packet.
    pub fn packet_len(&self) -> usize {
        HEADER_LEN + self.payload_len() + CRC_LEN
    }

    /// Residual-buffer cap: trailing bytes retained between ingest calls.
    pub fn max_residual(&self) -> usize {
        self.ring_capacity * self.packet_len()
    }
}

impl TryFrom<LayoutDescriptor> for SensorLayout {
    type Error = LayoutError;

    fn try_from(descriptor: LayoutDescriptor) -> Result<Self> {
        let rows = descriptor.row_array.len();
        let cols = descriptor.column_array.len();

        if rows == 0 {
            return Err(LayoutError::EmptyAxis { axis: "row" });
        }
        if cols == 0 {
            return Err(LayoutError::EmptyAxis { axis: "column" });
        }
        if rows > 256 {
            return Err(LayoutError::TooManyRows(rows));
        }
        for (position, &value) in descriptor.row_array.iter().enumerate() {
            if value >= rows {
                return Err(LayoutError::RowIndexOutOfRange {
                    position,
                    value,
                    rows,
                });
            }
        }
        for (position, &value) in descriptor.column_array.iter().enumerate() {
            if value >= cols {
                return Err(LayoutError::ColumnIndexOutOfRange {
                    position,
                    value,
                    cols,
                });
            }
        }
        if descriptor.buffer_length == 0 {
            return Err(LayoutError::ZeroRingCapacity);
        }

        Ok(Self {
            row_order: descriptor.row_array,
            column_order: descriptor.column_array,
            sample_width: SampleWidth::try_from(descriptor.bytes_per_point)?,
            ring_capacity: descriptor.buffer_length,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(json: &str) -> LayoutDescriptor {
        LayoutDescriptor::from_json_str(json).unwrap()
    }

    #[test]
    fn derives_packet_geometry() {
        let layout: SensorLayout = descriptor(
            r#"{
                "row_array": [0, 1, 2, 3],
                "column_array": [0, 1, 2, 3, 4, 5],
                "bytes_per_point": 2,
                "buffer_length": 16
            }"#,
        )
        .try_into()
        .unwrap();

        assert_eq!(layout.rows(), 4);
        assert_eq!(layout.cols(), 6);
        assert_eq!(layout.payload_len(), 12);
        assert_eq!(layout.packet_len(), HEADER_LEN + 12 + CRC_LEN);
        assert_eq!(layout.max_residual(), 16 * layout.packet_len());
    }

    #[test]
    fn rejects_bad_sample_width() {
        let result: Result<SensorLayout> = descriptor(
            r#"{"row_array": [0], "column_array": [0], "bytes_per_point": 4}"#,
        )
        .try_into();
        assert!(matches!(
            result,
            Err(LayoutError::UnsupportedSampleWidth(4))
        ));
    }

    #[test]
    fn rejects_empty_axes() {
        let result: Result<SensorLayout> =
            descriptor(r#"{"row_array": [], "column_array": [0]}"#).try_into();
        assert!(matches!(result, Err(LayoutError::EmptyAxis { axis: "row" })));

        let result: Result<SensorLayout> =
            descriptor(r#"{"row_array": [0], "column_array": []}"#).try_into();
        assert!(matches!(
            result,
            Err(LayoutError::EmptyAxis { axis: "column" })
        ));
    }

    #[test]
    fn rejects_out_of_range_wiring() {
        let result: Result<SensorLayout> =
            descriptor(r#"{"row_array": [0, 2], "column_array": [0]}"#).try_into();
        assert!(matches!(
            result,
            Err(LayoutError::RowIndexOutOfRange {
                position: 1,
                value: 2,
                rows: 2
            })
        ));

        let result: Result<SensorLayout> =
            descriptor(r#"{"row_array": [0], "column_array": [1]}"#).try_into();
        assert!(matches!(
            result,
            Err(LayoutError::ColumnIndexOutOfRange { .. })
        ));
    }

    #[test]
    fn rejects_zero_ring_capacity() {
        let result: Result<SensorLayout> = descriptor(
            r#"{"row_array": [0], "column_array": [0], "buffer_length": 0}"#,
        )
        .try_into();
        assert!(matches!(result, Err(LayoutError::ZeroRingCapacity)));
    }

    #[test]
    fn rejects_more_rows_than_addressable() {
        let descriptor = LayoutDescriptor {
            row_array: (0..257).collect(),
            column_array: vec![0],
            bytes_per_point: 1,
            buffer_length: 4,
        };
        let result: Result<SensorLayout> = descriptor.try_into();
        assert!(matches!(result, Err(LayoutError::TooManyRows(257))));
    }
}

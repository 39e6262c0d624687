use std::time::SystemTime;

use taxel_layout::{SampleWidth, SensorLayout};

/// One completed 2D grid of sensor readings.
///
/// Immutable snapshot produced by the decoder: byte-planes already combined
/// into signed 16-bit values, rows and columns already rectified to the
/// layout's canonical orientation, stamped with the wall-clock capture time.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    rows: usize,
    cols: usize,
    data: Vec<i16>,
    timestamp: SystemTime,
}

impl Frame {
    /// Combine staged byte-planes into a numeric frame.
    ///
    /// Plane 0 is the signed most-significant byte of each sample; plane 1
    /// (two-byte layouts) is unsigned and less significant.
    pub(crate) fn reconstruct(
        layout: &SensorLayout,
        planes: &[Vec<u8>],
        timestamp: SystemTime,
    ) -> Self {
        let rows = layout.rows();
        let cols = layout.cols();
        let mut data = vec![0i16; rows * cols];
        match layout.sample_width() {
            SampleWidth::One => {
                for (cell, &high) in data.iter_mut().zip(&planes[0]) {
                    *cell = high as i8 as i16;
                }
            }
            SampleWidth::Two => {
                for (i, cell) in data.iter_mut().enumerate() {
                    *cell = i16::from_be_bytes([planes[0][i], planes[1][i]]);
                }
            }
        }
        Self {
            rows,
            cols,
            data,
            timestamp,
        }
    }

    /// Rows in the grid.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Columns in the grid.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Capture wall-clock timestamp.
    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    /// Sample at `(row, col)`.
    ///
    /// # Panics
    /// Panics if `row` or `col` is out of range.
    pub fn get(&self, row: usize, col: usize) -> i16 {
        assert!(row < self.rows && col < self.cols, "cell out of range");
        self.data[row * self.cols + col]
    }

    /// One row of samples.
    pub fn row(&self, row: usize) -> &[i16] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// All samples, row-major.
    pub fn as_slice(&self) -> &[i16] {
        &self.data
    }

    /// Iterate rows in order.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[i16]> {
        self.data.chunks_exact(self.cols)
    }
}

#[cfg(test)]
mod tests {
    use taxel_layout::LayoutDescriptor;

    use super::*;

    fn layout(json: &str) -> SensorLayout {
        LayoutDescriptor::from_json_str(json).unwrap().try_into().unwrap()
    }

    #[test]
    fn single_plane_is_signed() {
        let layout = layout(r#"{"row_array": [0], "column_array": [0, 1], "bytes_per_point": 1}"#);
        let planes = vec![vec![0xFFu8, 0x7F]];
        let frame = Frame::reconstruct(&layout, &planes, SystemTime::now());

        assert_eq!(frame.as_slice(), &[-1, 127]);
    }

    #[test]
    fn two_planes_combine_big_endian() {
        let layout = layout(r#"{"row_array": [0], "column_array": [0, 1], "bytes_per_point": 2}"#);
        // MSB plane signed, LSB plane unsigned
        let planes = vec![vec![0xFFu8, 0x01], vec![0xFEu8, 0x02]];
        let frame = Frame::reconstruct(&layout, &planes, SystemTime::now());

        assert_eq!(frame.as_slice(), &[-2, 0x0102]);
    }

    #[test]
    fn row_accessors() {
        let layout = layout(r#"{"row_array": [0, 1], "column_array": [0, 1], "bytes_per_point": 1}"#);
        let planes = vec![vec![1u8, 2, 3, 4]];
        let frame = Frame::reconstruct(&layout, &planes, SystemTime::now());

        assert_eq!(frame.get(0, 1), 2);
        assert_eq!(frame.row(1), &[3, 4]);
        let rows: Vec<&[i16]> = frame.iter_rows().collect();
        assert_eq!(rows, vec![&[1i16, 2][..], &[3i16, 4][..]]);
    }
}

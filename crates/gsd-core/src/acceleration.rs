//! Accelerometer sample tables

use crate::error::{GsdError, GsdResult};
use crate::input_error;
use serde::{Deserialize, Serialize};

/// Number of axes expected from a tri-axial accelerometer
pub const TRIAXIAL_COLUMNS: usize = 3;

/// Accelerometer axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Column index of the axis in a tri-axial table
    pub fn column(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Row-major sample table, one row per time sample
///
/// The table itself accepts any column count; [`AccelerometerData::validate_triaxial`]
/// is the shape check applied before detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccelerometerData {
    /// Sample data (interleaved columns)
    data: Vec<f64>,
    /// Number of columns per row
    column_count: usize,
}

impl AccelerometerData {
    /// Create table from interleaved data
    pub fn from_interleaved(data: Vec<f64>, column_count: usize) -> GsdResult<Self> {
        if column_count == 0 {
            return Err(input_error!("sample table must have at least one column"));
        }
        if data.len() % column_count != 0 {
            return Err(input_error!(
                "data length {} is not a multiple of {} columns",
                data.len(),
                column_count
            ));
        }

        Ok(AccelerometerData { data, column_count })
    }

    /// Create table from rows, all rows must have the same width
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> GsdResult<Self> {
        let column_count = rows.first().map(|row| row.as_ref().len()).unwrap_or(TRIAXIAL_COLUMNS);
        let mut data = Vec::with_capacity(rows.len() * column_count);

        for (row_idx, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != column_count {
                return Err(input_error!(
                    "row {} has {} columns, expected {}",
                    row_idx,
                    row.len(),
                    column_count
                ));
            }
            data.extend_from_slice(row);
        }

        Self::from_interleaved(data, column_count)
    }

    /// Create tri-axial table from per-axis columns
    pub fn from_axes(x: &[f64], y: &[f64], z: &[f64]) -> GsdResult<Self> {
        if x.len() != y.len() || x.len() != z.len() {
            return Err(input_error!(
                "axis lengths differ: x={}, y={}, z={}",
                x.len(),
                y.len(),
                z.len()
            ));
        }

        let data = x
            .iter()
            .zip(y)
            .zip(z)
            .flat_map(|((&x, &y), &z)| [x, y, z])
            .collect();

        Self::from_interleaved(data, TRIAXIAL_COLUMNS)
    }

    /// Number of rows (time samples)
    pub fn row_count(&self) -> usize {
        self.data.len() / self.column_count
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.column_count
    }

    /// Check if table has no rows
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterate over rows
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.data.chunks_exact(self.column_count)
    }

    /// Get data for a specific column
    pub fn column(&self, column_index: usize) -> GsdResult<Vec<f64>> {
        if column_index >= self.column_count {
            return Err(input_error!(
                "column index {} out of bounds (0-{})",
                column_index,
                self.column_count - 1
            ));
        }

        Ok(self.rows().map(|row| row[column_index]).collect())
    }

    /// Get data for one accelerometer axis
    pub fn axis(&self, axis: Axis) -> GsdResult<Vec<f64>> {
        self.column(axis.column())
    }

    /// Shape check applied before detection: exactly three finite columns, at least one row
    pub fn validate_triaxial(&self) -> GsdResult<()> {
        if self.column_count != TRIAXIAL_COLUMNS {
            return Err(GsdError::InvalidInput {
                reason: format!(
                    "accelerometer data must have {} columns for x, y and z axes, got {}",
                    TRIAXIAL_COLUMNS, self.column_count
                ),
            });
        }

        if self.is_empty() {
            return Err(input_error!("accelerometer data contains no samples"));
        }

        if let Some(position) = self.data.iter().position(|v| !v.is_finite()) {
            return Err(input_error!(
                "non-finite value at row {}, column {}",
                position / self.column_count,
                position % self.column_count
            ));
        }

        Ok(())
    }

    /// Euclidean norm of every row
    pub fn norm(&self) -> Vec<f64> {
        self.rows()
            .map(|row| row.iter().map(|v| v * v).sum::<f64>().sqrt())
            .collect()
    }
}

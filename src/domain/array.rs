//! Dense numeric arrays for harvested ensemble data
//!
//! Row-major f64 arrays with explicit shape metadata. The last axis is always
//! the ensemble-member axis, so concatenating two campaigns appends along it.
//! These types are serde-serializable and back the persisted results files.

use serde::{Deserialize, Serialize};

/// Dense 2-D array, row-major
///
/// Used for non-time-series data with shape (node, member) and for weight
/// matrices with shape (basis, member).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Array2 {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Array2 {
    /// Creates a zero-filled array
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Builds an array from row-major data
    ///
    /// # Errors
    ///
    /// Returns an error if the data length does not match the shape.
    pub fn from_rows(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self, String> {
        if data.len() != rows * cols {
            return Err(format!(
                "Shape ({rows}, {cols}) requires {} values, got {}",
                rows * cols,
                data.len()
            ));
        }
        Ok(Self { rows, cols, data })
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Value at (row, col)
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        debug_assert!(row < self.rows && col < self.cols);
        self.data[row * self.cols + col]
    }

    /// Sets the value at (row, col)
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        debug_assert!(row < self.rows && col < self.cols);
        self.data[row * self.cols + col] = value;
    }

    /// Copies a full column out of the array
    pub fn column(&self, col: usize) -> Vec<f64> {
        (0..self.rows).map(|r| self.get(r, col)).collect()
    }

    /// Overwrites a full column
    ///
    /// # Errors
    ///
    /// Returns an error if the value count does not match the row count.
    pub fn set_column(&mut self, col: usize, values: &[f64]) -> Result<(), String> {
        if values.len() != self.rows {
            return Err(format!(
                "Column needs {} values, got {}",
                self.rows,
                values.len()
            ));
        }
        for (r, v) in values.iter().enumerate() {
            self.set(r, col, *v);
        }
        Ok(())
    }

    /// Copies a full row out of the array
    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Appends another array's columns after this one's
    ///
    /// # Errors
    ///
    /// Returns an error if the row counts differ.
    pub fn concat_columns(&mut self, other: &Array2) -> Result<(), String> {
        if self.rows != other.rows {
            return Err(format!(
                "Cannot concatenate: {} rows vs {} rows",
                self.rows, other.rows
            ));
        }
        let cols = self.cols + other.cols;
        let mut data = Vec::with_capacity(self.rows * cols);
        for r in 0..self.rows {
            data.extend_from_slice(self.row(r));
            data.extend_from_slice(other.row(r));
        }
        self.cols = cols;
        self.data = data;
        Ok(())
    }

    /// Replaces sentinel values and offsets the rest, row by row
    ///
    /// For each element: sentinel values become 0, all other values get the
    /// row's offset added. This is the dry-value fix for nodal fields, where
    /// the offset is the node's bathymetric depth.
    pub fn fix_sentinel(&mut self, sentinel: f64, row_offsets: &[f64]) {
        debug_assert_eq!(row_offsets.len(), self.rows);
        for r in 0..self.rows {
            let offset = row_offsets[r];
            for c in 0..self.cols {
                let v = self.get(r, c);
                if v == sentinel {
                    self.set(r, c, 0.0);
                } else {
                    self.set(r, c, v + offset);
                }
            }
        }
    }

    /// Scales every element in place
    pub fn scale(&mut self, factor: f64) {
        for v in &mut self.data {
            *v *= factor;
        }
    }

    /// True when the stored data length matches the shape
    pub fn is_consistent(&self) -> bool {
        self.data.len() == self.rows * self.cols
    }
}

/// Dense 3-D array, row-major
///
/// Used for time-series data with shape (station, record, member).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Array3 {
    d0: usize,
    d1: usize,
    d2: usize,
    data: Vec<f64>,
}

impl Array3 {
    /// Creates a zero-filled array
    pub fn zeros(d0: usize, d1: usize, d2: usize) -> Self {
        Self {
            d0,
            d1,
            d2,
            data: vec![0.0; d0 * d1 * d2],
        }
    }

    /// Shape as (d0, d1, d2)
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.d0, self.d1, self.d2)
    }

    /// Value at (i, j, k)
    #[inline]
    pub fn get(&self, i: usize, j: usize, k: usize) -> f64 {
        debug_assert!(i < self.d0 && j < self.d1 && k < self.d2);
        self.data[(i * self.d1 + j) * self.d2 + k]
    }

    /// Sets the value at (i, j, k)
    #[inline]
    pub fn set(&mut self, i: usize, j: usize, k: usize, value: f64) {
        debug_assert!(i < self.d0 && j < self.d1 && k < self.d2);
        self.data[(i * self.d1 + j) * self.d2 + k] = value;
    }

    /// Appends another array along the last (member) axis
    ///
    /// # Errors
    ///
    /// Returns an error if the leading dimensions differ.
    pub fn concat_members(&mut self, other: &Array3) -> Result<(), String> {
        if self.d0 != other.d0 || self.d1 != other.d1 {
            return Err(format!(
                "Cannot concatenate: shape ({}, {}, _) vs ({}, {}, _)",
                self.d0, self.d1, other.d0, other.d1
            ));
        }
        let d2 = self.d2 + other.d2;
        let mut data = Vec::with_capacity(self.d0 * self.d1 * d2);
        for i in 0..self.d0 {
            for j in 0..self.d1 {
                let a = (i * self.d1 + j) * self.d2;
                let b = (i * other.d1 + j) * other.d2;
                data.extend_from_slice(&self.data[a..a + self.d2]);
                data.extend_from_slice(&other.data[b..b + other.d2]);
            }
        }
        self.d2 = d2;
        self.data = data;
        Ok(())
    }

    /// Replaces sentinel values and offsets the rest along the first axis
    ///
    /// Same dry-value fix as [`Array2::fix_sentinel`], applied across the
    /// record and member axes.
    pub fn fix_sentinel(&mut self, sentinel: f64, offsets: &[f64]) {
        debug_assert_eq!(offsets.len(), self.d0);
        for i in 0..self.d0 {
            let offset = offsets[i];
            for j in 0..self.d1 {
                for k in 0..self.d2 {
                    let v = self.get(i, j, k);
                    if v == sentinel {
                        self.set(i, j, k, 0.0);
                    } else {
                        self.set(i, j, k, v + offset);
                    }
                }
            }
        }
    }

    /// True when the stored data length matches the shape
    pub fn is_consistent(&self) -> bool {
        self.data.len() == self.d0 * self.d1 * self.d2
    }
}

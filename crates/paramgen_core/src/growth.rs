//! Multiplicative growth factors for monthly time axes.
//!
//! A trajectory anchored at a reference date follows `y' = y0 * (1 + r)^(Δm / 12)`
//! where `Δm` counts months from the reference date. Months before the anchor
//! use `(1 - r)` so that the backward leg mirrors the forward one.

use jiff::civil::Date;

use crate::date_math::{months_between, truncate_to_month_start};

/// Dense row-major matrix of `f64`, rows are time steps and columns samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    #[must_use]
    pub fn filled(rows: usize, cols: usize, value: f64) -> Self {
        Self {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    #[must_use]
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::filled(rows, cols, 0.0)
    }

    /// Build a matrix from row-major data. Panics if the length does not match.
    #[must_use]
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Self {
        assert_eq!(data.len(), rows * cols, "matrix data does not match shape");
        Self { rows, cols, data }
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline]
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    #[must_use]
    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Row-major flattened view (time-major for growth matrices)
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    /// First column as a vector, the per-time-step factor of a growth matrix
    #[must_use]
    pub fn column(&self, col: usize) -> Vec<f64> {
        (0..self.rows).map(|r| self.get(r, col)).collect()
    }
}

/// Build the growth-factor matrix for the window `[start_date, end_date]`.
///
/// The result has `months_between(start, end) + 1` rows and `samples`
/// identical columns. `ref_date` may lie outside the window: the matrix is
/// then built over the extended window and the rows outside
/// `[start_date, end_date]` are trimmed. The reference row itself is 1.
/// Only the month of `ref_date` counts; the day is ignored.
#[must_use]
pub fn growth_coefficients(
    start_date: Date,
    end_date: Date,
    ref_date: Date,
    rate: f64,
    samples: usize,
) -> Matrix {
    let ref_date = truncate_to_month_start(ref_date);
    let mut start = start_date;
    let mut end = end_date;

    let mut start_offset = 0usize;
    if ref_date < start {
        start_offset = months_between(ref_date, start) as usize;
        start = ref_date;
    }

    let mut end_offset = 0usize;
    if ref_date > end {
        end_offset = months_between(end, ref_date) as usize;
        end = ref_date;
    }

    // Rows up to and including the reference point, then rows after it
    let before = months_between(start, ref_date) as usize;
    let after = months_between(ref_date, end) as usize;

    let mut factors = Vec::with_capacity(before + 1 + after);
    for i in (0..=before).rev() {
        factors.push((1.0 - rate).powf(i as f64 / 12.0));
    }
    for i in 0..after {
        factors.push((1.0 + rate).powf((i + 1) as f64 / 12.0));
    }

    let kept = &factors[start_offset..factors.len() - end_offset];

    let mut data = Vec::with_capacity(kept.len() * samples);
    for factor in kept {
        data.extend(std::iter::repeat_n(*factor, samples));
    }
    Matrix::from_vec(kept.len(), samples, data)
}

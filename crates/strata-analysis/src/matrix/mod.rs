//! Dense transition matrices.
//!
//! # Overview
//!
//! [`Matrix`] wraps a square `nalgebra` [`DMatrix`]. It is built from a
//! [`Graph`] without any normalization (row `i` holds the weights leaving
//! vertex `i + 1`), and projected onto a class's members to study that class
//! in isolation.
//!
//! Submatrices are independent copies: row and column `k` of the result
//! correspond to the `k`-th entry of the member list passed in.
//!
//! The iterative computations built on top of it live in [`convergence`]
//! (matrix powers, limiting distributions) and [`period`].

pub mod convergence;
pub mod period;

use nalgebra::DMatrix;
use serde::{Serialize, Serializer, ser::SerializeSeq};
use strata_core::{Graph, VertexId, error::ErrorCode};

pub use convergence::{Convergence, converge_powers, stationary_distribution, uniform};
pub use period::{Period, period};

/// Errors raised by matrix operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatrixError {
    #[error("vector of length {len} does not match a {size}x{size} matrix")]
    VectorLength { len: usize, size: usize },

    #[error("rows must form a square matrix: row {row} has {len} entries, expected {expected}")]
    NotSquare {
        row: usize,
        len: usize,
        expected: usize,
    },

    #[error("member {vertex} is outside 1..={size}")]
    MemberOutOfRange { vertex: VertexId, size: usize },
}

impl MatrixError {
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::MemberOutOfRange { .. } => ErrorCode::VertexOutOfRange,
            _ => ErrorCode::DimensionMismatch,
        }
    }
}

/// Square matrix of transition weights.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    data: DMatrix<f64>,
}

impl Matrix {
    /// The `size × size` zero matrix.
    #[must_use]
    pub fn zeros(size: usize) -> Self {
        Self {
            data: DMatrix::zeros(size, size),
        }
    }

    #[must_use]
    pub fn identity(size: usize) -> Self {
        Self {
            data: DMatrix::identity(size, size),
        }
    }

    /// Build a matrix from row vectors.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::NotSquare`] if any row length differs from the
    /// number of rows.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, MatrixError> {
        let size = rows.len();
        if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != size) {
            return Err(MatrixError::NotSquare {
                row,
                len: r.len(),
                expected: size,
            });
        }
        Ok(Self {
            data: DMatrix::from_fn(size, size, |i, j| rows[i][j]),
        })
    }

    /// Transition matrix of `graph`: cell `(i, j)` is the weight of the edge
    /// `i+1 → j+1`, or 0.
    ///
    /// No normalization is applied. If a vertex lists the same target twice,
    /// the later edge's weight is kept.
    #[must_use]
    pub fn from_graph(graph: &Graph) -> Self {
        let mut data = DMatrix::<f64>::zeros(graph.vertex_count(), graph.vertex_count());
        for (from, edge) in graph.transitions() {
            data[(from - 1, edge.target - 1)] = edge.weight;
        }
        Self { data }
    }

    /// Number of rows (and columns).
    #[must_use]
    pub fn size(&self) -> usize {
        self.data.nrows()
    }

    /// Entry at 0-based `(row, col)`, or `None` outside the matrix.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.data.get((row, col)).copied()
    }

    /// Copy of row `i` (0-based).
    #[must_use]
    pub fn row(&self, i: usize) -> Vec<f64> {
        self.data.row(i).iter().copied().collect()
    }

    /// All rows, top to bottom.
    #[must_use]
    pub fn rows(&self) -> Vec<Vec<f64>> {
        (0..self.size()).map(|i| self.row(i)).collect()
    }

    /// Matrix product `self · rhs` for operands of equal size.
    fn product(&self, rhs: &Self) -> Self {
        Self {
            data: &self.data * &rhs.data,
        }
    }

    /// Sum of absolute entrywise differences between operands of equal size.
    fn distance(&self, other: &Self) -> f64 {
        l1(self.data.iter(), other.data.iter())
    }

    /// Project onto `members` (1-based vertex ids), rows and columns alike,
    /// in the given order.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::MemberOutOfRange`] if a member is not a row of
    /// this matrix.
    pub fn sub_matrix(&self, members: &[VertexId]) -> Result<Self, MatrixError> {
        let size = self.size();
        if let Some(&vertex) = members.iter().find(|&&v| v == 0 || v > size) {
            return Err(MatrixError::MemberOutOfRange { vertex, size });
        }
        let k = members.len();
        Ok(Self {
            data: DMatrix::from_fn(k, k, |i, j| self.data[(members[i] - 1, members[j] - 1)]),
        })
    }

    /// `self` raised to the power `exponent` (`exponent = 0` gives the identity).
    #[must_use]
    pub fn power(&self, exponent: usize) -> Self {
        let mut result = Self::identity(self.size());
        for _ in 0..exponent {
            result = result.product(self);
        }
        result
    }

    /// Return `true` if some diagonal entry is strictly positive.
    #[must_use]
    pub fn has_positive_diagonal(&self) -> bool {
        self.data.diagonal().iter().any(|&x| x > 0.0)
    }
}

/// Serialized as a list of rows.
impl Serialize for Matrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.size()))?;
        for row in self.rows() {
            seq.serialize_element(&row)?;
        }
        seq.end()
    }
}

pub(crate) fn l1<'a>(a: impl Iterator<Item = &'a f64>, b: impl Iterator<Item = &'a f64>) -> f64 {
    a.zip(b).map(|(x, y)| (x - y).abs()).sum()
}

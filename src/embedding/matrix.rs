// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dense in-memory embedding matrix.
//!
//! Rows are stored contiguously (row-major) and are unit-normalized on
//! construction, so scoring a query is a plain dot product per row.

use anyhow::{bail, Result};
use rayon::prelude::*;
use std::cmp::Ordering;

use super::provider::l2_normalize;

/// N x D matrix of unit-length `f32` rows.
#[derive(Debug, Clone)]
pub struct EmbeddingMatrix {
    data: Vec<f32>,
    rows: usize,
    dimension: usize,
}

impl EmbeddingMatrix {
    /// Builds a matrix from provider output.
    ///
    /// Fails on an empty batch, zero-width or ragged rows, and non-finite
    /// values. Every row is L2-normalized; all-zero rows stay zero.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self> {
        let Some(first) = rows.first() else {
            bail!("Embedding batch is empty");
        };
        let dimension = first.len();
        if dimension == 0 {
            bail!("Embedding rows have zero dimensions");
        }

        let row_count = rows.len();
        let mut data = Vec::with_capacity(row_count * dimension);
        for (index, mut row) in rows.into_iter().enumerate() {
            if row.len() != dimension {
                bail!(
                    "Embedding row {} has {} dimensions, expected {}",
                    index,
                    row.len(),
                    dimension
                );
            }
            if row.iter().any(|value| !value.is_finite()) {
                bail!("Embedding row {} contains non-finite values", index);
            }
            l2_normalize(&mut row);
            data.extend_from_slice(&row);
        }

        Ok(Self {
            data,
            rows: row_count,
            dimension,
        })
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Dot product of `query` against every row, in row order.
    ///
    /// `query` must be unit-length and `dimension()` wide; scores are then
    /// cosine similarities, clamped to [-1, 1] against rounding drift.
    pub fn scores(&self, query: &[f32]) -> Vec<f32> {
        debug_assert_eq!(query.len(), self.dimension);
        self.data
            .par_chunks_exact(self.dimension)
            .map(|row| {
                let dot: f32 = row.iter().zip(query).map(|(a, b)| a * b).sum();
                dot.clamp(-1.0, 1.0)
            })
            .collect()
    }

    /// Returns `(row, score)` for the `k` best rows, best first.
    ///
    /// The sort is stable, so rows with equal scores keep their row order.
    pub fn top_k(&self, query: &[f32], k: usize) -> Vec<(usize, f32)> {
        let mut ranked: Vec<(usize, f32)> = self.scores(query).into_iter().enumerate().collect();

        // Sort by score (descending)
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        ranked.truncate(k);

        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_normalizes() {
        let matrix = EmbeddingMatrix::from_rows(vec![vec![3.0, 4.0], vec![0.0, 2.0]]).unwrap();
        assert_eq!(matrix.rows(), 2);
        assert_eq!(matrix.dimension(), 2);
        // Unit axes read back each normalized row's components.
        let x = matrix.scores(&[1.0, 0.0]);
        let y = matrix.scores(&[0.0, 1.0]);
        assert!((x[0] - 0.6).abs() < 1e-6 && (y[0] - 0.8).abs() < 1e-6);
        assert!(x[1].abs() < 1e-6 && (y[1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_from_rows_rejects_bad_shapes() {
        assert!(EmbeddingMatrix::from_rows(Vec::new()).is_err());
        assert!(EmbeddingMatrix::from_rows(vec![Vec::new()]).is_err());
        assert!(EmbeddingMatrix::from_rows(vec![vec![1.0, 0.0], vec![1.0]]).is_err());
        assert!(EmbeddingMatrix::from_rows(vec![vec![f32::NAN, 1.0]]).is_err());
    }

    #[test]
    fn test_top_k_orders_by_similarity() {
        let matrix = EmbeddingMatrix::from_rows(vec![
            vec![0.0, 1.0, 0.0],
            vec![1.0, 0.0, 0.0],
            vec![0.9, 0.1, 0.0],
        ])
        .unwrap();

        let ranked = matrix.top_k(&[1.0, 0.0, 0.0], 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].0, 1);
        assert!((ranked[0].1 - 1.0).abs() < 1e-6);
        assert_eq!(ranked[1].0, 2);
    }

    #[test]
    fn test_top_k_ties_keep_row_order() {
        let matrix = EmbeddingMatrix::from_rows(vec![
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![1.0, 0.0],
        ])
        .unwrap();

        let ranked = matrix.top_k(&[1.0, 0.0], 4);
        let order: Vec<usize> = ranked.iter().map(|(row, _)| *row).collect();
        assert_eq!(order, vec![1, 3, 0, 2]);
    }

    #[test]
    fn test_top_k_larger_than_rows() {
        let matrix = EmbeddingMatrix::from_rows(vec![vec![1.0], vec![-1.0]]).unwrap();
        let ranked = matrix.top_k(&[1.0], 10);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[1].1, -1.0);
    }
}

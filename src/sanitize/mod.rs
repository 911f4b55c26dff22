//! Data Sanitization
//!
//! Numeric guards and cell-set helpers.
//!
//! Functions:
//! - NaN/Inf detection and finite clamping
//! - Factor and probability clamps
//! - Cell dedupe and order-free set comparison

use std::collections::HashSet;

use crate::types::{Cell, Pattern, MAX_FACTOR, MIN_FACTOR};

/// Check whether a slice holds NaN or infinite values
pub fn has_invalid_values(arr: &[f64]) -> bool {
    arr.iter().any(|&x| x.is_nan() || x.is_infinite())
}

/// Clamp a value into `[min, max]`, mapping NaN/Inf to `fallback`
pub fn clamp_finite(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback.clamp(min, max)
    }
}

/// Clamp a probability-like value into `[0, 1]`
pub fn clamp_unit(value: f64) -> f64 {
    clamp_finite(value, 0.0, 1.0, 0.0)
}

/// Clamp an adaptive factor into its range
pub fn clamp_factor(value: f64) -> f64 {
    clamp_finite(value, MIN_FACTOR, MAX_FACTOR, 1.0)
}

/// Drop duplicates and out-of-grid cells, keeping first-seen order
pub fn unique_cells(cells: &[Cell], total_cells: u32) -> Pattern {
    let mut seen = HashSet::with_capacity(cells.len());
    cells
        .iter()
        .copied()
        .filter(|&c| c < total_cells && seen.insert(c))
        .collect()
}

/// True when the slice repeats a cell
pub fn has_duplicates(cells: &[Cell]) -> bool {
    let mut seen = HashSet::with_capacity(cells.len());
    !cells.iter().all(|c| seen.insert(*c))
}

/// Set equality: same cells, order and multiplicity ignored
pub fn same_cells(a: &[Cell], b: &[Cell]) -> bool {
    let left: HashSet<Cell> = a.iter().copied().collect();
    let right: HashSet<Cell> = b.iter().copied().collect();
    left == right
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_invalid_values() {
        assert!(!has_invalid_values(&[0.1, 0.5]));
        assert!(has_invalid_values(&[0.1, f64::NAN]));
        assert!(has_invalid_values(&[f64::NEG_INFINITY]));
    }

    #[test]
    fn test_clamp_finite_handles_nan() {
        assert_eq!(clamp_finite(f64::NAN, 0.3, 0.95, 0.6), 0.6);
        assert_eq!(clamp_finite(1.7, 0.3, 0.95, 0.6), 0.95);
        assert_eq!(clamp_unit(-0.2), 0.0);
        assert_eq!(clamp_factor(f64::INFINITY), 1.0);
    }

    #[test]
    fn test_unique_cells() {
        assert_eq!(unique_cells(&[4, 2, 4, 9, 1], 9), vec![4, 2, 1]);
        assert!(unique_cells(&[0, 1], 0).is_empty());
    }

    #[test]
    fn test_same_cells_ignores_order() {
        assert!(same_cells(&[0, 3, 6], &[6, 0, 3]));
        assert!(!same_cells(&[0, 3, 6], &[0, 3, 8]));
        assert!(has_duplicates(&[1, 2, 1]));
        assert!(!has_duplicates(&[1, 2, 3]));
    }
}

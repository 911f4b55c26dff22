//! Pattern Generator
//!
//! Produces sequences of unique cell indices on an N×N grid.
//!
//! Strategies:
//! - `Random` - a full-domain shuffle truncated to the requested length
//! - `Sequential` - a random walk over unvisited orthogonal neighbours, padded randomly when stuck
//! - `Shape` - a line, diagonal, 2×2 square or plus-shaped cross, truncated or padded
//!
//! Every function here is a pure function of its arguments and the supplied RNG.
//! Grid sizes are capped at `MAX_GRID_SIZE` and requested lengths are clamped
//! to the number of cells on the grid.

pub mod classify;

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::trace;

use crate::types::{clamp_grid_size, grid_cells, Cell, GenerationStrategy, Pattern, Shape};

pub use classify::{is_clustered, is_sequential, mean_pairwise_distance};

/// Generate a pattern of `min(length, grid_size²)` distinct cells
pub fn generate<R: Rng + ?Sized>(
    grid_size: u32,
    length: usize,
    strategy: GenerationStrategy,
    rng: &mut R,
) -> Pattern {
    let grid_size = clamp_grid_size(grid_size);
    let total = grid_cells(grid_size);
    let length = length.min(total as usize);
    if length == 0 {
        return Vec::new();
    }

    let pattern = match strategy {
        GenerationStrategy::Random => random_pattern(total, length, rng),
        GenerationStrategy::Sequential => {
            let mut pattern = Vec::with_capacity(length);
            extend_sequential(&mut pattern, grid_size, length, rng);
            pad_random(&mut pattern, total, length, rng);
            pattern
        }
        GenerationStrategy::Shape => {
            let shape = *Shape::ALL.choose(rng).unwrap_or(&Shape::Line);
            match shape_cells(shape, grid_size, rng) {
                Some(mut pattern) => {
                    pattern.truncate(length);
                    pad_random(&mut pattern, total, length, rng);
                    pattern
                }
                None => random_pattern(total, length, rng),
            }
        }
    };

    trace!(grid_size, length, strategy = strategy.as_str(), ?pattern, "pattern generated");
    pattern
}

/// Fisher-Yates over every cell, truncated
fn random_pattern<R: Rng + ?Sized>(total: u32, length: usize, rng: &mut R) -> Pattern {
    let mut cells: Pattern = (0..total).collect();
    cells.shuffle(rng);
    cells.truncate(length);
    cells
}

/// Append uniformly random unused cells until `pattern` reaches `length`
pub fn pad_random<R: Rng + ?Sized>(pattern: &mut Pattern, total: u32, length: usize, rng: &mut R) {
    if pattern.len() >= length {
        return;
    }
    let used: HashSet<Cell> = pattern.iter().copied().collect();
    let mut free: Pattern = (0..total).filter(|c| !used.contains(c)).collect();
    free.shuffle(rng);
    let missing = length - pattern.len();
    pattern.extend(free.into_iter().take(missing));
}

/// Orthogonal neighbours of `cell` (up, right, down, left) that stay on the grid
pub fn neighbors(cell: Cell, grid_size: u32) -> Vec<Cell> {
    let grid_size = clamp_grid_size(grid_size);
    let mut out = Vec::with_capacity(4);
    if grid_size == 0 {
        return out;
    }
    let row = cell / grid_size;
    let col = cell % grid_size;
    if row > 0 {
        out.push(cell - grid_size);
    }
    if col + 1 < grid_size {
        out.push(cell + 1);
    }
    if row + 1 < grid_size {
        out.push(cell + grid_size);
    }
    if col > 0 {
        out.push(cell - 1);
    }
    out
}

/// Random walk from a random unused cell, stepping to unused orthogonal neighbours.
///
/// Stops at `length` or when the walk is boxed in.
pub fn extend_sequential<R: Rng + ?Sized>(
    pattern: &mut Pattern,
    grid_size: u32,
    length: usize,
    rng: &mut R,
) {
    let grid_size = clamp_grid_size(grid_size);
    let total = grid_cells(grid_size);
    let mut used: HashSet<Cell> = pattern.iter().copied().collect();
    let starts: Pattern = (0..total).filter(|c| !used.contains(c)).collect();
    let Some(&start) = starts.choose(rng) else {
        return;
    };

    let mut current = start;
    if pattern.len() < length {
        pattern.push(current);
        used.insert(current);
    }
    while pattern.len() < length {
        let open: Pattern = neighbors(current, grid_size)
            .into_iter()
            .filter(|c| !used.contains(c))
            .collect();
        let Some(&next) = open.choose(rng) else {
            break;
        };
        pattern.push(next);
        used.insert(next);
        current = next;
    }
}

/// Grow a blob around a random centre: unused cells ordered by Chebyshev distance,
/// ties broken randomly
pub fn extend_clustered<R: Rng + ?Sized>(
    pattern: &mut Pattern,
    grid_size: u32,
    length: usize,
    rng: &mut R,
) {
    let grid_size = clamp_grid_size(grid_size);
    let total = grid_cells(grid_size);
    if total == 0 || pattern.len() >= length {
        return;
    }
    let center = rng.gen_range(0..total);
    let (center_row, center_col) = (center / grid_size, center % grid_size);

    let used: HashSet<Cell> = pattern.iter().copied().collect();
    let mut free: Pattern = (0..total).filter(|c| !used.contains(c)).collect();
    free.shuffle(rng);
    free.sort_by_key(|&c| {
        let (row, col) = (c / grid_size, c % grid_size);
        row.abs_diff(center_row).max(col.abs_diff(center_col))
    });

    let missing = length - pattern.len();
    pattern.extend(free.into_iter().take(missing));
}

/// Natural cells of a shape, `None` when the grid cannot hold it
pub fn shape_cells<R: Rng + ?Sized>(shape: Shape, grid_size: u32, rng: &mut R) -> Option<Pattern> {
    let g = clamp_grid_size(grid_size);
    if g == 0 {
        return None;
    }
    match shape {
        Shape::Line => {
            let index = rng.gen_range(0..g);
            if rng.gen_bool(0.5) {
                Some((0..g).map(|col| index * g + col).collect())
            } else {
                Some((0..g).map(|row| row * g + index).collect())
            }
        }
        Shape::Diagonal => {
            if rng.gen_bool(0.5) {
                Some((0..g).map(|i| i * g + i).collect())
            } else {
                Some((0..g).map(|i| i * g + (g - 1 - i)).collect())
            }
        }
        Shape::Square => {
            if g < 2 {
                return None;
            }
            let top = rng.gen_range(0..g - 1);
            let left = rng.gen_range(0..g - 1);
            let origin = top * g + left;
            Some(vec![origin, origin + 1, origin + g, origin + g + 1])
        }
        Shape::Cross => {
            if g < 3 || g % 2 == 0 {
                return None;
            }
            let mid = g / 2;
            let mut cells: Pattern = (0..g).map(|col| mid * g + col).collect();
            cells.extend((0..g).filter(|&row| row != mid).map(|row| row * g + mid));
            Some(cells)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sanitize::has_duplicates;
    use crate::types::MAX_GRID_SIZE;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const STRATEGIES: [GenerationStrategy; 3] = [
        GenerationStrategy::Random,
        GenerationStrategy::Sequential,
        GenerationStrategy::Shape,
    ];

    #[test]
    fn test_length_contract_all_strategies() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for grid in 1..=7u32 {
            for length in [0usize, 1, 3, 5, 9, 30, 60] {
                for strategy in STRATEGIES {
                    for _ in 0..5 {
                        let p = generate(grid, length, strategy, &mut rng);
                        assert_eq!(p.len(), length.min((grid * grid) as usize));
                        assert!(!has_duplicates(&p));
                        assert!(p.iter().all(|&c| c < grid * grid));
                    }
                }
            }
        }
    }

    #[test]
    fn test_huge_grid_is_capped() {
        let mut rng = ChaCha8Rng::seed_from_u64(13);
        let total = MAX_GRID_SIZE * MAX_GRID_SIZE;
        for strategy in STRATEGIES {
            let p = generate(u32::MAX, 6, strategy, &mut rng);
            assert_eq!(p.len(), 6);
            assert!(!has_duplicates(&p));
            assert!(p.iter().all(|&c| c < total));
        }
        assert!(neighbors(0, 70_000).iter().all(|&c| c < total));
    }

    #[test]
    fn test_zero_grid_yields_empty() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(generate(0, 4, GenerationStrategy::Shape, &mut rng).is_empty());
    }

    #[test]
    fn test_random_clamps_to_full_permutation() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut p = generate(3, 20, GenerationStrategy::Random, &mut rng);
        p.sort_unstable();
        assert_eq!(p, (0..9).collect::<Vec<_>>());
    }

    #[test]
    fn test_sequential_steps_are_orthogonal_until_padding() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for _ in 0..50 {
            let mut p = Vec::new();
            extend_sequential(&mut p, 5, 8, &mut rng);
            for pair in p.windows(2) {
                assert!(neighbors(pair[0], 5).contains(&pair[1]), "{pair:?} not adjacent");
            }
        }
    }

    #[test]
    fn test_neighbors_do_not_wrap() {
        // right edge of row 0 on a 3-grid
        assert_eq!(neighbors(2, 3), vec![5, 1]);
        assert_eq!(neighbors(3, 3), vec![0, 4, 6]);
        assert_eq!(neighbors(4, 3).len(), 4);
        assert!(neighbors(0, 1).is_empty());
    }

    #[test]
    fn test_cross_requires_odd_grid() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        assert!(shape_cells(Shape::Cross, 4, &mut rng).is_none());
        assert!(shape_cells(Shape::Cross, 1, &mut rng).is_none());
        let mut cross = shape_cells(Shape::Cross, 3, &mut rng).unwrap();
        cross.sort_unstable();
        assert_eq!(cross, vec![1, 3, 4, 5, 7]);
    }

    #[test]
    fn test_square_is_compact() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..20 {
            let sq = shape_cells(Shape::Square, 4, &mut rng).unwrap();
            assert_eq!(sq[1], sq[0] + 1);
            assert_eq!(sq[2], sq[0] + 4);
            assert_eq!(sq[0] % 4, sq[2] % 4);
            assert!(sq[0] % 4 < 3);
        }
        assert!(shape_cells(Shape::Square, 1, &mut rng).is_none());
    }

    #[test]
    fn test_diagonals() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        for _ in 0..10 {
            let d = shape_cells(Shape::Diagonal, 3, &mut rng).unwrap();
            assert!(d == vec![0, 4, 8] || d == vec![2, 4, 6]);
        }
    }

    #[test]
    fn test_clustered_fill_stays_near_centre() {
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let mut p = Vec::new();
        extend_clustered(&mut p, 6, 9, &mut rng);
        assert_eq!(p.len(), 9);
        assert!(mean_pairwise_distance(&p) < 12.0);
    }

    #[test]
    fn test_same_seed_same_pattern() {
        let mut a = ChaCha8Rng::seed_from_u64(77);
        let mut b = ChaCha8Rng::seed_from_u64(77);
        for strategy in STRATEGIES {
            assert_eq!(generate(5, 6, strategy, &mut a), generate(5, 6, strategy, &mut b));
        }
    }
}

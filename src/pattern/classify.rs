//! Structural classification of patterns.
//!
//! Both tests work on raw index arithmetic. `is_sequential` counts a step of
//! exactly 1 as adjacent even when it wraps from the end of one row to the
//! start of the next; the difficulty adjuster's specialisation logic is tuned
//! against this exact behaviour.

use crate::types::Cell;

/// At least half of the consecutive pairs differ by exactly 1 or by `grid_size`
pub fn is_sequential(pattern: &[Cell], grid_size: u32) -> bool {
    if pattern.len() < 2 {
        return false;
    }
    let pairs = pattern.len() - 1;
    let steps = pattern
        .windows(2)
        .filter(|w| {
            let diff = w[0].abs_diff(w[1]);
            diff == 1 || (grid_size > 1 && diff == grid_size)
        })
        .count();
    steps * 2 >= pairs
}

/// Mean absolute index difference over all unordered pairs
pub fn mean_pairwise_distance(pattern: &[Cell]) -> f64 {
    let n = pattern.len();
    if n < 2 {
        return 0.0;
    }
    let mut sum = 0u64;
    for (i, &a) in pattern.iter().enumerate() {
        for &b in &pattern[i + 1..] {
            sum += u64::from(a.abs_diff(b));
        }
    }
    sum as f64 / (n * (n - 1) / 2) as f64
}

pub fn is_clustered(pattern: &[Cell], threshold: f64) -> bool {
    pattern.len() >= 2 && mean_pairwise_distance(pattern) < threshold
}

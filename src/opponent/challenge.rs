//! Challenge Composer
//!
//! Builds patterns aimed at the player's demonstrated weaknesses. The targeted
//! strategy seeds with the most-mistaken cells, then fills with whichever of a
//! sequential walk or a spatial cluster matches the player's weaker memory
//! skill, then pads randomly. An optional difficulty above the pivot scrambles
//! the order with random pairwise swaps.

use rand::Rng;
use tracing::debug;

use crate::config::ChallengeParams;
use crate::opponent::state::OpponentState;
use crate::pattern::{self, extend_clustered, extend_sequential, pad_random};
use crate::types::{
    clamp_grid_size, grid_cells, AdaptiveFactor, ChallengeOptions, ChallengeStrategy,
    GenerationStrategy, Pattern,
};

#[derive(Debug, Clone, Default)]
pub struct ChallengeComposer {
    params: ChallengeParams,
}

impl ChallengeComposer {
    pub fn new(params: ChallengeParams) -> Self {
        Self { params }
    }

    pub fn compose<R: Rng + ?Sized>(
        &self,
        state: &OpponentState,
        length: usize,
        grid_size: u32,
        options: &ChallengeOptions,
        rng: &mut R,
    ) -> Pattern {
        let grid_size = clamp_grid_size(grid_size);
        let total = grid_cells(grid_size);
        let length = length.min(total as usize);

        let mut challenge = match options.strategy {
            ChallengeStrategy::Targeted => self.targeted(state, length, grid_size, rng),
            ChallengeStrategy::Sequential => {
                pattern::generate(grid_size, length, GenerationStrategy::Sequential, rng)
            }
            ChallengeStrategy::Clustered => {
                let mut cells = Vec::with_capacity(length);
                extend_clustered(&mut cells, grid_size, length, rng);
                pad_random(&mut cells, total, length, rng);
                cells
            }
            ChallengeStrategy::Random => {
                pattern::generate(grid_size, length, GenerationStrategy::Random, rng)
            }
        };

        let swaps = options
            .difficulty
            .map(|d| self.swap_count(d, challenge.len()))
            .unwrap_or(0);
        for _ in 0..swaps {
            let i = rng.gen_range(0..challenge.len());
            let j = rng.gen_range(0..challenge.len());
            challenge.swap(i, j);
        }

        debug!(
            strategy = ?options.strategy,
            length = challenge.len(),
            grid_size,
            swaps,
            "challenge composed"
        );
        challenge
    }

    /// `floor((difficulty - pivot) * swaps_per_unit)` when above the pivot on long enough patterns
    pub fn swap_count(&self, difficulty: f64, length: usize) -> usize {
        let p = &self.params;
        let difficulty = crate::sanitize::clamp_unit(difficulty);
        if difficulty <= p.scramble_pivot || length <= p.min_scramble_length {
            return 0;
        }
        ((difficulty - p.scramble_pivot) * p.swaps_per_unit).floor() as usize
    }

    fn targeted<R: Rng + ?Sized>(
        &self,
        state: &OpponentState,
        length: usize,
        grid_size: u32,
        rng: &mut R,
    ) -> Pattern {
        let total = grid_cells(grid_size);
        let mut cells: Pattern = state
            .most_mistaken(usize::MAX)
            .into_iter()
            .map(|(cell, _)| cell)
            .filter(|&cell| cell < total)
            .take(length)
            .collect();

        if cells.len() < length {
            let sequence = state.factor(AdaptiveFactor::SequenceMemory);
            let spatial = state.factor(AdaptiveFactor::SpatialMemory);
            if sequence <= spatial {
                extend_sequential(&mut cells, grid_size, length, rng);
            } else {
                extend_clustered(&mut cells, grid_size, length, rng);
            }
        }
        pad_random(&mut cells, total, length, rng);
        cells
    }
}

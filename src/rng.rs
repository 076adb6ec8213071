// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Stock Market Engine - Uniform Random Source

use rand::{Rng, RngCore};

/// Source of independent uniform draws in `[0, 1)`.
///
/// Implemented for every `rand` generator; markets use a seeded `ChaCha8Rng`
/// so runs are reproducible.
pub trait UniformSource {
    fn next_f64(&mut self) -> f64;
}

impl<R: RngCore> UniformSource for R {
    fn next_f64(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

/// Replays a fixed list of draws, wrapping around when exhausted.
///
/// Used to drive the tick engine down a known path.
#[derive(Debug, Clone)]
pub struct SequenceSource {
    draws: Vec<f64>,
    cursor: usize,
    consumed: usize,
}

impl SequenceSource {
    /// Draws are clamped into `[0, 1)`. An empty list replays `0.0`.
    pub fn new(draws: Vec<f64>) -> Self {
        let draws = draws
            .into_iter()
            .map(|d| if d.is_nan() { 0.0 } else { d.clamp(0.0, MAX_DRAW) })
            .collect();
        Self { draws, cursor: 0, consumed: 0 }
    }

    /// A source that returns the same draw forever.
    pub fn constant(draw: f64) -> Self {
        Self::new(vec![draw])
    }

    /// Total draws handed out so far.
    pub fn consumed(&self) -> usize {
        self.consumed
    }
}

const MAX_DRAW: f64 = 1.0 - f64::EPSILON;

impl UniformSource for SequenceSource {
    fn next_f64(&mut self) -> f64 {
        self.consumed += 1;
        if self.draws.is_empty() {
            return 0.0;
        }
        let draw = self.draws[self.cursor];
        self.cursor = (self.cursor + 1) % self.draws.len();
        draw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_chacha_draws_in_unit_interval() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..10_000 {
            let d = rng.next_f64();
            assert!((0.0..1.0).contains(&d));
        }
    }

    #[test]
    fn test_sequence_replays_and_wraps() {
        let mut src = SequenceSource::new(vec![0.1, 0.2, 0.3]);
        let drawn: Vec<f64> = (0..5).map(|_| src.next_f64()).collect();
        assert_eq!(drawn, vec![0.1, 0.2, 0.3, 0.1, 0.2]);
        assert_eq!(src.consumed(), 5);
    }

    #[test]
    fn test_sequence_clamps_out_of_range() {
        let mut src = SequenceSource::new(vec![-1.0, 1.0, f64::NAN]);
        assert_eq!(src.next_f64(), 0.0);
        assert!(src.next_f64() < 1.0);
        assert_eq!(src.next_f64(), 0.0);
    }

    #[test]
    fn test_empty_sequence_yields_zero() {
        let mut src = SequenceSource::new(Vec::new());
        assert_eq!(src.next_f64(), 0.0);
        assert_eq!(src.consumed(), 1);
    }
}

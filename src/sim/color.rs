//! Where piece colors come from
//!
//! Boards never reach for ambient randomness; they pull colors from a
//! `ColorSource` so tests and replays can pin the sequence.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use std::fmt;

use super::piece::PieceColor;
use crate::consts::PALETTE_SIZE;

/// Produces the next piece color
pub trait ColorSource: fmt::Debug {
    fn next_color(&mut self) -> PieceColor;
}

/// Uniform random colors from the first `palette_size` palette entries
#[derive(Debug, Clone)]
pub struct RandomColors {
    rng: Pcg32,
    palette_size: usize,
}

impl RandomColors {
    pub fn new(seed: u64, palette_size: usize) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            palette_size: palette_size.clamp(1, PALETTE_SIZE),
        }
    }
}

impl ColorSource for RandomColors {
    fn next_color(&mut self) -> PieceColor {
        PieceColor::from_index(self.rng.random_range(0..self.palette_size))
    }
}

/// A fixed sequence of colors, repeated forever
#[derive(Debug, Clone)]
pub struct ColorSequence {
    colors: Vec<PieceColor>,
    cursor: usize,
}

impl ColorSequence {
    /// Panics if `colors` is empty
    pub fn new(colors: impl IntoIterator<Item = PieceColor>) -> Self {
        let colors: Vec<_> = colors.into_iter().collect();
        assert!(!colors.is_empty(), "color sequence needs at least one color");
        Self { colors, cursor: 0 }
    }

    /// The same color every time
    pub fn constant(color: PieceColor) -> Self {
        Self::new([color])
    }
}

impl ColorSource for ColorSequence {
    fn next_color(&mut self) -> PieceColor {
        let color = self.colors[self.cursor];
        self.cursor = (self.cursor + 1) % self.colors.len();
        color
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_cycles() {
        let mut seq = ColorSequence::new([PieceColor::Red, PieceColor::Blue]);
        assert_eq!(seq.next_color(), PieceColor::Red);
        assert_eq!(seq.next_color(), PieceColor::Blue);
        assert_eq!(seq.next_color(), PieceColor::Red);
    }

    #[test]
    fn test_random_colors_deterministic() {
        let mut a = RandomColors::new(42, PALETTE_SIZE);
        let mut b = RandomColors::new(42, PALETTE_SIZE);
        for _ in 0..32 {
            assert_eq!(a.next_color(), b.next_color());
        }
    }

    #[test]
    fn test_random_colors_respect_palette() {
        let mut colors = RandomColors::new(7, 3);
        for _ in 0..200 {
            assert!(colors.next_color().index() < 3);
        }
    }
}

//! Game pieces: fired, settled and falling bubbles

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, PI};

use super::grid::Cell;
use crate::consts::PALETTE_SIZE;
use crate::direction_from_angle;

/// Piece colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceColor {
    Red,
    Green,
    Blue,
    Yellow,
    Orange,
    Cyan,
    Pink,
    Violet,
}

impl PieceColor {
    pub const ALL: [PieceColor; PALETTE_SIZE] = [
        PieceColor::Red,
        PieceColor::Green,
        PieceColor::Blue,
        PieceColor::Yellow,
        PieceColor::Orange,
        PieceColor::Cyan,
        PieceColor::Pink,
        PieceColor::Violet,
    ];

    /// Color at `index` in the palette (wraps around)
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % PALETTE_SIZE]
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Where a piece is in its life
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PieceState {
    /// Moving after being fired, not yet stuck
    Flying,
    /// At rest in a grid cell
    Settled { cell: Cell },
    /// Detached and dropping off the board
    Falling,
}

/// A bubble
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Piece {
    pub id: u32,
    pub pos: Vec2,
    /// Travel angle (radians, π/2 = straight up)
    pub angle: f32,
    /// Pixels per second, 0 while settled
    pub speed: f32,
    pub radius: f32,
    pub color: PieceColor,
    pub state: PieceState,
}

impl Piece {
    /// A piece leaving the launcher
    pub fn launched(
        id: u32,
        pos: Vec2,
        angle: f32,
        speed: f32,
        radius: f32,
        color: PieceColor,
    ) -> Self {
        Self {
            id,
            pos,
            angle,
            speed,
            radius,
            color,
            state: PieceState::Flying,
        }
    }

    /// A piece placed straight into a cell
    pub fn settled(id: u32, cell: Cell, pos: Vec2, radius: f32, color: PieceColor) -> Self {
        Self {
            id,
            pos,
            angle: FRAC_PI_2,
            speed: 0.0,
            radius,
            color,
            state: PieceState::Settled { cell },
        }
    }

    /// Grid cell, while settled
    pub fn cell(&self) -> Option<Cell> {
        match self.state {
            PieceState::Settled { cell } => Some(cell),
            _ => None,
        }
    }

    pub fn is_flying(&self) -> bool {
        matches!(self.state, PieceState::Flying)
    }

    pub fn is_settled(&self) -> bool {
        matches!(self.state, PieceState::Settled { .. })
    }

    pub fn is_falling(&self) -> bool {
        matches!(self.state, PieceState::Falling)
    }

    pub fn velocity(&self) -> Vec2 {
        direction_from_angle(self.angle) * self.speed
    }

    /// Integrate position over `dt` seconds
    pub fn advance(&mut self, dt: f32) {
        self.pos += self.velocity() * dt;
    }

    /// Mirror the angle off a side wall.
    ///
    /// Only bounces when the piece is moving into the wall it overlaps, so a
    /// piece that is still inside the wall after reflecting cannot flip back.
    /// Returns true if the piece bounced.
    pub fn bounce_walls(&mut self, width: f32) -> bool {
        let heading_x = direction_from_angle(self.angle).x;
        let into_left = self.pos.x <= self.radius && heading_x < 0.0;
        let into_right = self.pos.x + self.radius >= width && heading_x > 0.0;
        if !(into_left || into_right) {
            return false;
        }
        self.angle = PI - self.angle;
        self.pos.x = self.pos.x.clamp(self.radius, width - self.radius);
        true
    }

    /// Top edge at or above the ceiling line
    pub fn reached_ceiling(&self, ceiling: f32) -> bool {
        self.pos.y - self.radius <= ceiling
    }

    /// Bounding circles overlap or touch
    pub fn touches(&self, other: &Piece) -> bool {
        self.pos.distance(other.pos) <= self.radius + other.radius
    }

    /// First resting piece this one touches.
    ///
    /// Skips itself and anything still moving: flying pieces never collide
    /// with each other.
    pub fn first_hit<'a>(&self, others: impl IntoIterator<Item = &'a Piece>) -> Option<&'a Piece> {
        others
            .into_iter()
            .find(|other| other.id != self.id && other.speed == 0.0 && self.touches(other))
    }

    /// Snap into `cell` at `pos` and stop
    pub fn settle(&mut self, cell: Cell, pos: Vec2) {
        self.pos = pos;
        self.speed = 0.0;
        self.state = PieceState::Settled { cell };
    }

    /// Detach and head straight down at `drop_speed`
    pub fn start_falling(&mut self, drop_speed: f32) {
        self.angle = -FRAC_PI_2;
        self.speed = drop_speed;
        self.state = PieceState::Falling;
    }

    /// Top edge has passed below `height`
    pub fn below(&self, height: f32) -> bool {
        self.pos.y - self.radius > height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flying(pos: Vec2, angle: f32) -> Piece {
        Piece::launched(1, pos, angle, 100.0, 20.0, PieceColor::Red)
    }

    #[test]
    fn test_advance_straight_up() {
        let mut p = flying(Vec2::new(150.0, 600.0), FRAC_PI_2);
        p.advance(0.5);
        assert!((p.pos.x - 150.0).abs() < 1e-4);
        assert!((p.pos.y - 550.0).abs() < 1e-4);
    }

    #[test]
    fn test_advance_zero_dt() {
        let mut p = flying(Vec2::new(150.0, 600.0), 1.0);
        p.advance(0.0);
        assert_eq!(p.pos, Vec2::new(150.0, 600.0));
    }

    #[test]
    fn test_wall_bounce_reflects_angle() {
        // Heading up-left into the left wall
        let angle = PI / 3.0;
        let mut p = flying(Vec2::new(15.0, 300.0), angle);
        let vy = p.velocity().y;

        assert!(p.bounce_walls(300.0));
        assert!((p.angle - (PI - angle)).abs() < 1e-6);
        assert!(p.velocity().x > 0.0);
        assert!((p.velocity().y - vy).abs() < 1e-4);
        assert_eq!(p.pos.x, 20.0);
        assert_eq!(p.pos.y, 300.0);

        // Already heading away: no second flip
        assert!(!p.bounce_walls(300.0));
    }

    #[test]
    fn test_wall_bounce_right() {
        let mut p = flying(Vec2::new(285.0, 300.0), 2.0 * PI / 3.0);
        assert!(p.bounce_walls(300.0));
        assert!(p.velocity().x < 0.0);
        assert_eq!(p.pos.x, 280.0);
    }

    #[test]
    fn test_ceiling() {
        let p = flying(Vec2::new(100.0, 30.0), FRAC_PI_2);
        assert!(p.reached_ceiling(10.0));
        assert!(!p.reached_ceiling(5.0));
    }

    #[test]
    fn test_first_hit_ignores_self_and_moving() {
        let p = flying(Vec2::new(100.0, 100.0), FRAC_PI_2);
        let other_flying =
            Piece::launched(2, Vec2::new(100.0, 70.0), FRAC_PI_2, 50.0, 20.0, PieceColor::Blue);
        let far = Piece::settled(3, Cell::new(0, 0), Vec2::new(20.0, 20.0), 20.0, PieceColor::Blue);
        let near =
            Piece::settled(4, Cell::new(1, 1), Vec2::new(100.0, 61.0), 20.0, PieceColor::Blue);

        let pieces = [p.clone(), other_flying, far, near];
        let hit = p.first_hit(pieces.iter()).map(|h| h.id);
        assert_eq!(hit, Some(4));
    }

    #[test]
    fn test_falling() {
        let mut p =
            Piece::settled(1, Cell::new(0, 0), Vec2::new(20.0, 580.0), 20.0, PieceColor::Red);
        p.start_falling(400.0);
        assert!(p.is_falling());
        assert_eq!(p.cell(), None);
        p.advance(0.1);
        assert!((p.pos.y - 620.0).abs() < 1e-3);
        assert!((p.pos.x - 20.0).abs() < 1e-3);
        assert!(!p.below(600.0));
        p.advance(0.01);
        assert!(p.below(600.0));
    }
}

//! Read-only board view for renderers
//!
//! Positions are board-local; add `bounds_left` for viewport coordinates.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::board::BoardId;
use super::grid::Cell;
use super::launcher::AimGuide;
use super::piece::{Piece, PieceColor};

/// A piece as the renderer sees it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PieceView {
    pub pos: Vec2,
    pub color: PieceColor,
    /// Set for settled pieces only
    pub cell: Option<Cell>,
}

impl From<&Piece> for PieceView {
    fn from(piece: &Piece) -> Self {
        Self {
            pos: piece.pos,
            color: piece.color,
            cell: piece.cell(),
        }
    }
}

/// Everything needed to draw one board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub id: BoardId,
    pub bounds_left: f32,
    pub width: f32,
    pub height: f32,
    pub radius: f32,
    pub ceiling_offset: f32,
    /// Cell centres, row by row
    pub grid: Vec<Vec<Vec2>>,
    pub settled: Vec<PieceView>,
    pub falling: Vec<PieceView>,
    pub flying: Option<PieceView>,
    pub launcher_origin: Vec2,
    pub launcher_angle: f32,
    pub current_color: PieceColor,
    pub next_color: PieceColor,
    /// Present while aim assist is held
    pub aim_guide: Option<AimGuide>,
    /// Penalty not yet collected by the session
    pub pending_penalty: usize,
}

impl BoardSnapshot {
    /// Tip of the launcher barrel, `length` pixels from the origin
    pub fn barrel_tip(&self, length: f32) -> Vec2 {
        self.launcher_origin + crate::direction_from_angle(self.launcher_angle) * length
    }
}

#[cfg(test)]
mod tests {
    use crate::sim::board::{Board, BoardConfig, BoardId};
    use crate::sim::color::ColorSequence;
    use crate::sim::grid::Cell;
    use crate::sim::piece::PieceColor;

    #[test]
    fn test_snapshot_contents() {
        let mut board = Board::new(
            BoardId(0),
            BoardConfig::default(),
            Box::new(ColorSequence::new([PieceColor::Red, PieceColor::Blue])),
            3,
        );
        board.insert_settled(Cell::new(0, 2), PieceColor::Green);
        board.fire();

        let snap = board.snapshot();
        assert_eq!(snap.grid.len(), board.grid().row_count());
        assert_eq!(snap.settled.len(), 1);
        assert_eq!(snap.settled[0].cell, Some(Cell::new(0, 2)));
        assert_eq!(snap.flying.map(|p| p.color), Some(PieceColor::Red));
        assert_eq!(snap.current_color, PieceColor::Blue);
        assert!(snap.aim_guide.is_none());
        assert_eq!(snap.pending_penalty, 0);

        let tip = snap.barrel_tip(50.0);
        assert!((tip.y - 550.0).abs() < 1e-3);
    }

    #[test]
    fn test_snapshot_serializes() {
        let board = Board::new(
            BoardId(1),
            BoardConfig::default(),
            Box::new(ColorSequence::constant(PieceColor::Cyan)),
            3,
        );
        let json = serde_json::to_string(&board.snapshot()).unwrap();
        assert!(json.contains("\"current_color\":\"Cyan\""));
    }
}

//! A match: the boards, their opponent wiring and the per-frame pump
//!
//! Boards refer to each other by `BoardId`; the session owns them all and
//! carries penalty counts across once each board's tick has finished.

use serde::{Deserialize, Serialize};

use super::board::{Board, BoardId};
use super::color::RandomColors;
use super::input::InputEvent;
use super::snapshot::BoardSnapshot;
use crate::settings::Settings;

/// Penalty carried from one board to another in a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenaltyTransfer {
    pub from: BoardId,
    pub to: BoardId,
    /// Pieces the sender dropped
    pub requested: usize,
    /// Pieces that fit on the receiver's floor
    pub delivered: usize,
}

/// What happened during one frame
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub transfers: Vec<PenaltyTransfer>,
}

/// Owns every board of a match
#[derive(Debug)]
pub struct Session {
    boards: Vec<Board>,
    /// Total simulated seconds
    elapsed: f64,
}

impl Session {
    /// Wrap pre-built boards. Opponents are whatever the boards already say.
    ///
    /// Panics unless each board's id matches its position in `boards`.
    pub fn new(boards: Vec<Board>) -> Self {
        for (index, board) in boards.iter().enumerate() {
            assert_eq!(
                board.id(),
                BoardId(index),
                "board ids must match their position in the session"
            );
        }
        Self {
            boards,
            elapsed: 0.0,
        }
    }

    /// Single board with a descending ceiling and nobody to send penalties to
    pub fn solo(settings: &Settings) -> Self {
        let board = Self::build_board(settings, 0, true);
        log::info!("Solo session started (seed {})", settings.seed);
        Self::new(vec![board])
    }

    /// Two boards side by side, each the other's opponent
    pub fn versus(settings: &Settings) -> Self {
        let descent = settings.versus_ceiling_descent;
        let mut session = Self::new(vec![
            Self::build_board(settings, 0, descent),
            Self::build_board(settings, 1, descent),
        ]);
        session.link(BoardId(0), BoardId(1));
        log::info!("Versus session started (seed {})", settings.seed);
        session
    }

    fn build_board(settings: &Settings, index: usize, ceiling_descent: bool) -> Board {
        let seed = settings.seed.wrapping_add(index as u64);
        let colors = RandomColors::new(seed, settings.palette_size);
        Board::new(
            BoardId(index),
            settings.board_config(index, ceiling_descent),
            Box::new(colors),
            seed,
        )
    }

    /// Make two boards each other's opponent
    pub fn link(&mut self, a: BoardId, b: BoardId) {
        if let Some(board) = self.boards.get_mut(a.0) {
            board.set_opponent(Some(b));
        }
        if let Some(board) = self.boards.get_mut(b.0) {
            board.set_opponent(Some(a));
        }
    }

    pub fn boards(&self) -> &[Board] {
        &self.boards
    }

    pub fn board(&self, id: BoardId) -> Option<&Board> {
        self.boards.get(id.0)
    }

    pub fn board_mut(&mut self, id: BoardId) -> Option<&mut Board> {
        self.boards.get_mut(id.0)
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Offer an event to every board; each keeps only what concerns it
    pub fn handle_input(&mut self, event: &InputEvent) {
        for board in &mut self.boards {
            board.handle_input(event);
        }
    }

    /// Advance every board by the same `dt`, then deliver penalties
    pub fn tick(&mut self, dt: f32) -> FrameReport {
        let mut report = FrameReport::default();
        if !dt.is_finite() || dt <= 0.0 {
            return report;
        }
        self.elapsed += f64::from(dt);

        for index in 0..self.boards.len() {
            self.boards[index].tick(dt);

            let requested = self.boards[index].take_outgoing_penalty();
            if requested == 0 {
                continue;
            }
            let from = self.boards[index].id();
            let Some(to) = self.boards[index].opponent() else {
                log::debug!("Board {}: {} dropped, no opponent", from.0, requested);
                continue;
            };
            let Some(target) = self.boards.get_mut(to.0) else {
                log::warn!("Board {}: opponent {} does not exist", from.0, to.0);
                continue;
            };
            let delivered = target.add_penalty_pieces(requested);
            log::debug!(
                "Penalty {} -> {}: {} requested, {} delivered",
                from.0,
                to.0,
                requested,
                delivered
            );
            report.transfers.push(PenaltyTransfer {
                from,
                to,
                requested,
                delivered,
            });
        }
        report
    }

    /// Renderer views, one per board
    pub fn snapshots(&self) -> Vec<BoardSnapshot> {
        self.boards.iter().map(Board::snapshot).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::board::BoardConfig;
    use crate::sim::color::ColorSequence;
    use crate::sim::grid::Cell;
    use crate::sim::input::{Controls, Key};
    use crate::sim::piece::PieceColor;
    use glam::Vec2;

    fn red_versus() -> Session {
        let left = BoardConfig {
            ceiling_descent: false,
            ..Default::default()
        };
        let right = BoardConfig {
            bounds_left: 340.0,
            ceiling_descent: false,
            controls: Controls::player_two(),
            ..Default::default()
        };
        let mut session = Session::new(vec![
            Board::new(BoardId(0), left, Box::new(ColorSequence::constant(PieceColor::Red)), 1),
            Board::new(BoardId(1), right, Box::new(ColorSequence::constant(PieceColor::Blue)), 2),
        ]);
        session.link(BoardId(0), BoardId(1));
        session
    }

    #[test]
    fn test_versus_links_opponents() {
        let session = Session::versus(&Settings::default());
        assert_eq!(session.boards().len(), 2);
        assert_eq!(session.board(BoardId(0)).unwrap().opponent(), Some(BoardId(1)));
        assert_eq!(session.board(BoardId(1)).unwrap().opponent(), Some(BoardId(0)));
        assert!(!session.board(BoardId(0)).unwrap().config().ceiling_descent);
    }

    #[test]
    fn test_solo_has_no_opponent() {
        let session = Session::solo(&Settings::default());
        assert_eq!(session.boards().len(), 1);
        assert_eq!(session.boards()[0].opponent(), None);
        assert!(session.boards()[0].config().ceiling_descent);
    }

    #[test]
    fn test_penalty_dispatch() {
        let mut session = red_versus();
        {
            let left = session.board_mut(BoardId(0)).unwrap();
            for col in 0..4 {
                left.insert_settled(Cell::new(0, col), PieceColor::Red);
            }
        }
        session.handle_input(&InputEvent::KeyDown(Key::W));
        assert!(session.board(BoardId(0)).unwrap().flying().is_some());
        assert!(session.board(BoardId(1)).unwrap().flying().is_none());

        let mut transfers = Vec::new();
        for _ in 0..120 {
            transfers.extend(session.tick(1.0 / 60.0).transfers);
        }

        assert_eq!(
            transfers,
            vec![PenaltyTransfer {
                from: BoardId(0),
                to: BoardId(1),
                requested: 5,
                delivered: 5,
            }]
        );
        let right = session.board(BoardId(1)).unwrap();
        let floor = right.grid().floor_row().unwrap();
        assert_eq!(right.settled_count(), 5);
        assert!(right.settled().all(|p| p.cell().is_some_and(|c| c.row == floor)));
    }

    #[test]
    fn test_penalty_clamped_to_floor() {
        let mut session = red_versus();
        session.board_mut(BoardId(1)).unwrap().add_penalty_pieces(5);
        {
            let left = session.board_mut(BoardId(0)).unwrap();
            for col in 0..4 {
                left.insert_settled(Cell::new(0, col), PieceColor::Red);
            }
            left.fire();
        }

        let mut delivered = 0;
        for _ in 0..120 {
            for t in session.tick(1.0 / 60.0).transfers {
                assert_eq!(t.requested, 5);
                delivered += t.delivered;
            }
        }
        assert_eq!(delivered, 2);
        assert_eq!(session.board(BoardId(1)).unwrap().floor_capacity(), 0);
    }

    #[test]
    fn test_pointer_reaches_only_board_under_it() {
        let mut session = red_versus();
        session.handle_input(&InputEvent::PointerPressed(Vec2::new(500.0, 100.0)));
        assert!(session.board(BoardId(0)).unwrap().flying().is_none());
        assert!(session.board(BoardId(1)).unwrap().flying().is_some());
    }

    #[test]
    #[should_panic(expected = "match their position")]
    fn test_new_rejects_misplaced_ids() {
        let board = Board::new(
            BoardId(1),
            BoardConfig::default(),
            Box::new(ColorSequence::constant(PieceColor::Red)),
            1,
        );
        Session::new(vec![board]);
    }

    #[test]
    fn test_infinite_tick_is_noop() {
        let mut session = red_versus();
        let report = session.tick(f32::INFINITY);
        assert!(report.transfers.is_empty());
        assert_eq!(session.elapsed(), 0.0);
    }

    #[test]
    fn test_zero_tick() {
        let mut session = red_versus();
        let report = session.tick(0.0);
        assert!(report.transfers.is_empty());
        assert_eq!(session.elapsed(), 0.0);
    }
}

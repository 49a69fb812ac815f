//! Board simulation module
//!
//! All gameplay logic lives here. No rendering, windowing or platform code:
//! - Continuous time, advanced by the caller's frame delta
//! - Randomness only through seeded sources
//! - Stable iteration order (settled pieces keyed by cell)

pub mod board;
pub mod color;
pub mod grid;
pub mod input;
pub mod launcher;
pub mod piece;
pub mod session;
pub mod snapshot;

pub use board::{Board, BoardConfig, BoardId};
pub use color::{ColorSequence, ColorSource, RandomColors};
pub use grid::{Cell, HexGrid};
pub use input::{Controls, InputEvent, Key};
pub use launcher::{AimGuide, GuideSurface, Launcher, TurnDirection};
pub use piece::{Piece, PieceColor, PieceState};
pub use session::{FrameReport, PenaltyTransfer, Session};
pub use snapshot::{BoardSnapshot, PieceView};

//! One player's board
//!
//! Owns the settled pieces, the falling pieces, the piece in flight, the
//! launcher and the color queue. A settle runs two flood fills over the
//! touching relation: one for the same-color cluster of the new piece and,
//! if that cluster was removed, one from row 0 to find what still hangs from
//! the ceiling. Everything detached is owed to the opponent as penalty.

use glam::Vec2;
use rand::SeedableRng;
use rand::seq::index;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::f32::consts::PI;

use super::color::ColorSource;
use super::grid::{Cell, HexGrid};
use super::input::{Controls, InputEvent};
use super::launcher::{AimGuide, Launcher, TurnDirection};
use super::piece::{Piece, PieceColor};
use super::snapshot::{BoardSnapshot, PieceView};
use crate::consts::*;

/// Handle to a board owned by a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BoardId(pub usize);

/// Geometry and tuning for one board
#[derive(Debug, Clone)]
pub struct BoardConfig {
    /// Left edge of this board in the shared viewport
    pub bounds_left: f32,
    pub width: f32,
    pub height: f32,
    pub radius: f32,
    pub shot_speed: f32,
    pub drop_speed: f32,
    pub coarse_turn_rate: f32,
    pub fine_turn_rate: f32,
    /// Whether the ceiling descends on its own
    pub ceiling_descent: bool,
    pub ceiling_period: f32,
    pub ceiling_step: f32,
    /// Rows filled with random pieces at creation
    pub initial_rows: u32,
    pub controls: Controls,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            bounds_left: 0.0,
            width: BOARD_WIDTH,
            height: BOARD_HEIGHT,
            radius: PIECE_RADIUS,
            shot_speed: SHOT_SPEED,
            drop_speed: DROP_SPEED,
            coarse_turn_rate: COARSE_TURN_RATE,
            fine_turn_rate: FINE_TURN_RATE,
            ceiling_descent: true,
            ceiling_period: CEILING_PERIOD,
            ceiling_step: CEILING_STEP,
            initial_rows: 0,
            controls: Controls::player_one(),
        }
    }
}

/// A player's board
#[derive(Debug)]
pub struct Board {
    id: BoardId,
    config: BoardConfig,
    grid: HexGrid,
    /// Vertical offset of row 0
    ceiling_offset: f32,
    /// Seconds since the last ceiling step
    ceiling_timer: f32,
    /// Resting pieces, at most one per cell
    settled: BTreeMap<Cell, Piece>,
    falling: Vec<Piece>,
    flying: Option<Piece>,
    launcher: Launcher,
    current_color: PieceColor,
    next_color: PieceColor,
    colors: Box<dyn ColorSource>,
    /// Penalty column picks
    rng: Pcg32,
    opponent: Option<BoardId>,
    /// Pieces dropped since the session last collected them
    outgoing_penalty: usize,
    assist_enabled: bool,
    next_id: u32,
}

impl Board {
    pub fn new(
        id: BoardId,
        config: BoardConfig,
        mut colors: Box<dyn ColorSource>,
        seed: u64,
    ) -> Self {
        let grid = HexGrid::new(config.width, config.height, config.radius, 0.0);
        let launcher = Launcher::new(
            Vec2::new(config.width / 2.0, config.height),
            config.coarse_turn_rate,
            config.fine_turn_rate,
        );
        let current_color = colors.next_color();
        let next_color = colors.next_color();

        let mut board = Self {
            id,
            config,
            grid,
            ceiling_offset: 0.0,
            ceiling_timer: 0.0,
            settled: BTreeMap::new(),
            falling: Vec::new(),
            flying: None,
            launcher,
            current_color,
            next_color,
            colors,
            rng: Pcg32::seed_from_u64(seed),
            opponent: None,
            outgoing_penalty: 0,
            assist_enabled: false,
            next_id: 1,
        };
        board.fill_initial_rows();

        log::info!(
            "Board {} created: {} rows x {} cells, {} pre-filled",
            board.id.0,
            board.grid.row_count(),
            board.grid.len(),
            board.settled.len()
        );
        board
    }

    fn fill_initial_rows(&mut self) {
        let rows = (self.config.initial_rows as usize).min(self.grid.row_count());
        for row in 0..rows as i32 {
            for col in 0..self.grid.row_len(row) as i32 {
                let color = self.colors.next_color();
                self.insert_settled(Cell::new(row, col), color);
            }
        }
    }

    fn next_piece_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    // === Accessors ===

    pub fn id(&self) -> BoardId {
        self.id
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn grid(&self) -> &HexGrid {
        &self.grid
    }

    pub fn ceiling_offset(&self) -> f32 {
        self.ceiling_offset
    }

    pub fn settled(&self) -> impl Iterator<Item = &Piece> {
        self.settled.values()
    }

    pub fn settled_count(&self) -> usize {
        self.settled.len()
    }

    pub fn piece_at(&self, cell: Cell) -> Option<&Piece> {
        self.settled.get(&cell)
    }

    pub fn falling(&self) -> &[Piece] {
        &self.falling
    }

    pub fn flying(&self) -> Option<&Piece> {
        self.flying.as_ref()
    }

    pub fn launcher(&self) -> &Launcher {
        &self.launcher
    }

    pub fn current_color(&self) -> PieceColor {
        self.current_color
    }

    pub fn next_color(&self) -> PieceColor {
        self.next_color
    }

    pub fn opponent(&self) -> Option<BoardId> {
        self.opponent
    }

    pub fn set_opponent(&mut self, opponent: Option<BoardId>) {
        self.opponent = opponent;
    }

    pub fn assist_enabled(&self) -> bool {
        self.assist_enabled
    }

    /// Penalty owed to the opponent but not yet collected
    pub fn outgoing_penalty(&self) -> usize {
        self.outgoing_penalty
    }

    /// Hand over the owed penalty and reset it
    pub fn take_outgoing_penalty(&mut self) -> usize {
        std::mem::take(&mut self.outgoing_penalty)
    }

    // === Input ===

    /// Whether a viewport position lies on this board
    pub fn contains(&self, point: Vec2) -> bool {
        let left = self.config.bounds_left;
        (left..=left + self.config.width).contains(&point.x)
            && (0.0..=self.config.height).contains(&point.y)
    }

    fn to_local(&self, point: Vec2) -> Vec2 {
        point - Vec2::new(self.config.bounds_left, 0.0)
    }

    /// Aim at a viewport position; ignored outside this board.
    /// Returns true if the launcher moved.
    pub fn set_aim_point(&mut self, point: Vec2) -> bool {
        if !self.contains(point) {
            return false;
        }
        let local = self.to_local(point);
        self.launcher.aim_at(local);
        true
    }

    pub fn set_turning_intent(&mut self, direction: TurnDirection, active: bool) {
        self.launcher.set_intent(direction, active);
    }

    pub fn set_assist_enabled(&mut self, enabled: bool) {
        self.assist_enabled = enabled;
    }

    /// React to an input event if it concerns this board
    pub fn handle_input(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::PointerMoved(point) => {
                self.set_aim_point(point);
            }
            InputEvent::PointerPressed(point) => {
                if self.set_aim_point(point) {
                    self.fire();
                }
            }
            InputEvent::KeyDown(key) => {
                if let Some(direction) = self.config.controls.turn_for(key) {
                    self.set_turning_intent(direction, true);
                } else if key == self.config.controls.fire {
                    self.fire();
                } else if key == self.config.controls.assist {
                    self.set_assist_enabled(true);
                }
            }
            InputEvent::KeyUp(key) => {
                if let Some(direction) = self.config.controls.turn_for(key) {
                    self.set_turning_intent(direction, false);
                } else if key == self.config.controls.assist {
                    self.set_assist_enabled(false);
                }
            }
            InputEvent::Quit => {}
        }
    }

    /// Launch the current color along the launcher angle.
    ///
    /// Ignored while a piece is already in flight. Returns true if fired.
    pub fn fire(&mut self) -> bool {
        if self.flying.is_some() {
            log::debug!("Board {}: fire ignored, piece still in flight", self.id.0);
            return false;
        }
        let id = self.next_piece_id();
        // The launcher may rest flat against either side; a level shot would
        // bounce between the walls without ever landing
        let angle = self
            .launcher
            .angle
            .clamp(MIN_LAUNCH_ANGLE, PI - MIN_LAUNCH_ANGLE);
        let piece = Piece::launched(
            id,
            self.launcher.origin,
            angle,
            self.config.shot_speed,
            self.config.radius,
            self.current_color,
        );
        self.flying = Some(piece);
        self.current_color = self.next_color;
        self.next_color = self.colors.next_color();
        true
    }

    /// Aim guide for the renderer, while assist is held
    pub fn aim_guide(&self) -> Option<AimGuide> {
        self.assist_enabled.then(|| {
            self.launcher
                .guide(self.config.width, self.ceiling_offset, self.config.radius)
        })
    }

    // === Simulation ===

    /// Advance the board by `dt` seconds of wall-clock time.
    ///
    /// A non-positive or non-finite `dt` leaves the board untouched.
    pub fn tick(&mut self, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        self.launcher.turn(dt);
        if self.config.ceiling_descent {
            self.advance_ceiling(dt);
        }
        self.advance_falling(dt);
        self.advance_flying(dt);
    }

    fn advance_falling(&mut self, dt: f32) {
        let height = self.config.height;
        for piece in &mut self.falling {
            piece.advance(dt);
        }
        self.falling.retain(|piece| !piece.below(height));
    }

    /// Move the flying piece in sub-steps short enough that it cannot pass
    /// through a resting piece, settling it on the first contact.
    fn advance_flying(&mut self, dt: f32) {
        let Some(mut piece) = self.flying.take() else {
            return;
        };

        let max_step = piece.radius * MAX_STEP_FRACTION;
        let steps = ((piece.speed * dt / max_step).ceil() as usize).max(1);
        let step_dt = dt / steps as f32;

        for _ in 0..steps {
            piece.advance(step_dt);
            piece.bounce_walls(self.config.width);

            let hit_ceiling = piece.reached_ceiling(self.ceiling_offset);
            if hit_ceiling || piece.first_hit(self.settled.values()).is_some() {
                self.settle(piece);
                return;
            }
        }
        self.flying = Some(piece);
    }

    /// Snap a piece to the nearest free cell and resolve what it causes
    fn settle(&mut self, mut piece: Piece) {
        let occupied = &self.settled;
        let Some((cell, pos)) = self
            .grid
            .nearest_cell_where(piece.pos, |cell| !occupied.contains_key(&cell))
        else {
            log::warn!("Board {}: no free cell left, dropping piece", self.id.0);
            piece.start_falling(self.config.drop_speed);
            self.falling.push(piece);
            return;
        };

        piece.settle(cell, pos);
        self.settled.insert(cell, piece);

        let detached = self.resolve_settle(cell);
        if detached > 0 {
            self.outgoing_penalty += detached;
        }
    }

    /// Remove the cluster at `cell` if large enough, then drop everything no
    /// longer hanging from row 0. Returns the number of pieces detached.
    fn resolve_settle(&mut self, cell: Cell) -> usize {
        let cluster = self.same_color_cluster(cell);
        if cluster.len() < MIN_MATCH {
            log::debug!(
                "Board {}: settled at ({}, {}), cluster of {}",
                self.id.0,
                cell.row,
                cell.col,
                cluster.len()
            );
            return 0;
        }
        for &c in &cluster {
            self.detach(c);
        }

        let supported = self.supported_cells();
        let orphans: Vec<Cell> = self
            .settled
            .keys()
            .filter(|c| !supported.contains(c))
            .copied()
            .collect();
        for &c in &orphans {
            self.detach(c);
        }

        log::debug!(
            "Board {}: matched {} at ({}, {}), {} orphaned",
            self.id.0,
            cluster.len(),
            cell.row,
            cell.col,
            orphans.len()
        );
        cluster.len() + orphans.len()
    }

    /// Settled neighbours of `cell`
    fn touching_settled(&self, cell: Cell) -> impl Iterator<Item = Cell> + '_ {
        cell.touching()
            .into_iter()
            .filter(|c| self.settled.contains_key(c))
    }

    /// Every settled piece reachable from `start` through touching pieces
    /// of the same color, `start` included
    pub fn same_color_cluster(&self, start: Cell) -> HashSet<Cell> {
        let mut visited = HashSet::new();
        let Some(color) = self.settled.get(&start).map(|p| p.color) else {
            return visited;
        };

        let mut stack = vec![start];
        visited.insert(start);
        while let Some(cell) = stack.pop() {
            for next in self.touching_settled(cell) {
                if self.settled[&next].color == color && visited.insert(next) {
                    stack.push(next);
                }
            }
        }
        visited
    }

    /// Every settled piece connected to row 0 through touching pieces
    pub fn supported_cells(&self) -> HashSet<Cell> {
        let mut stack: Vec<Cell> = self.settled.keys().filter(|c| c.row == 0).copied().collect();
        let mut visited: HashSet<Cell> = stack.iter().copied().collect();
        while let Some(cell) = stack.pop() {
            for next in self.touching_settled(cell) {
                if visited.insert(next) {
                    stack.push(next);
                }
            }
        }
        visited
    }

    fn detach(&mut self, cell: Cell) {
        if let Some(mut piece) = self.settled.remove(&cell) {
            piece.start_falling(self.config.drop_speed);
            self.falling.push(piece);
        }
    }

    /// Place a resting piece directly into `cell`.
    ///
    /// Returns false if the cell is off the grid or already taken.
    pub fn insert_settled(&mut self, cell: Cell, color: PieceColor) -> bool {
        if self.settled.contains_key(&cell) {
            return false;
        }
        let Some(pos) = self.grid.position(cell) else {
            return false;
        };
        let id = self.next_piece_id();
        let piece = Piece::settled(id, cell, pos, self.config.radius, color);
        self.settled.insert(cell, piece);
        true
    }

    /// Free cells in the floor row
    pub fn floor_capacity(&self) -> usize {
        self.free_floor_cells().len()
    }

    fn free_floor_cells(&self) -> Vec<Cell> {
        let Some(floor) = self.grid.floor_row() else {
            return Vec::new();
        };
        (0..self.grid.row_len(floor) as i32)
            .map(|col| Cell::new(floor, col))
            .filter(|cell| !self.settled.contains_key(cell))
            .collect()
    }

    /// Materialise up to `count` random pieces on distinct free floor cells.
    /// Returns how many were placed.
    pub fn add_penalty_pieces(&mut self, count: usize) -> usize {
        let free = self.free_floor_cells();
        let amount = count.min(free.len());
        if amount == 0 {
            return 0;
        }

        let picks = index::sample(&mut self.rng, free.len(), amount);
        let mut placed = 0;
        for i in picks {
            let color = self.colors.next_color();
            if self.insert_settled(free[i], color) {
                placed += 1;
            }
        }

        log::debug!(
            "Board {}: received {} penalty pieces ({} requested)",
            self.id.0,
            placed,
            count
        );
        placed
    }

    /// Run the ceiling timer, stepping the ceiling down each full period
    pub fn advance_ceiling(&mut self, dt: f32) {
        if self.config.ceiling_period.is_nan() || self.config.ceiling_period <= 0.0 {
            return;
        }
        self.ceiling_timer += dt;
        while self.ceiling_timer >= self.config.ceiling_period {
            self.ceiling_timer -= self.config.ceiling_period;
            self.lower_ceiling(self.config.ceiling_step);
        }
    }

    /// Shift the ceiling and every resting piece down by `delta`
    pub fn lower_ceiling(&mut self, delta: f32) {
        self.ceiling_offset += delta;
        for piece in self.settled.values_mut() {
            piece.pos.y += delta;
        }
        self.grid.set_ceiling(self.ceiling_offset);
        log::info!(
            "Board {}: ceiling lowered to {:.1} ({} rows)",
            self.id.0,
            self.ceiling_offset,
            self.grid.row_count()
        );
    }

    /// Read-only view for the renderer
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            id: self.id,
            bounds_left: self.config.bounds_left,
            width: self.config.width,
            height: self.config.height,
            radius: self.config.radius,
            ceiling_offset: self.ceiling_offset,
            grid: self.grid.rows().to_vec(),
            settled: self.settled.values().map(PieceView::from).collect(),
            falling: self.falling.iter().map(PieceView::from).collect(),
            flying: self.flying.as_ref().map(PieceView::from),
            launcher_origin: self.launcher.origin,
            launcher_angle: self.launcher.angle,
            current_color: self.current_color,
            next_color: self.next_color,
            aim_guide: self.aim_guide(),
            pending_penalty: self.outgoing_penalty,
        }
    }
}

//! Game settings
//!
//! Loaded from a JSON file; any field left out takes its default.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::consts::*;
use crate::error::SettingsError;
use crate::sim::board::BoardConfig;
use crate::sim::input::Controls;

/// Tuning shared by every board of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Geometry ===
    pub board_width: f32,
    pub board_height: f32,
    /// Horizontal space between boards in the viewport
    pub board_gap: f32,
    pub piece_radius: f32,

    // === Motion (pixels/s, radians/s) ===
    pub shot_speed: f32,
    pub drop_speed: f32,
    pub coarse_turn_rate: f32,
    pub fine_turn_rate: f32,

    // === Ceiling ===
    /// Seconds between ceiling steps
    pub ceiling_period: f32,
    /// Pixels per ceiling step
    pub ceiling_step: f32,
    /// Solo boards always descend; this enables it for versus
    pub versus_ceiling_descent: bool,

    // === Setup ===
    /// Rows pre-filled at the start
    pub initial_rows: u32,
    /// How many palette colors are in play (1-8)
    pub palette_size: usize,
    pub seed: u64,

    // === Controls ===
    pub player_one: Controls,
    pub player_two: Controls,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            board_width: BOARD_WIDTH,
            board_height: BOARD_HEIGHT,
            board_gap: BOARD_GAP,
            piece_radius: PIECE_RADIUS,

            shot_speed: SHOT_SPEED,
            drop_speed: DROP_SPEED,
            coarse_turn_rate: COARSE_TURN_RATE,
            fine_turn_rate: FINE_TURN_RATE,

            ceiling_period: CEILING_PERIOD,
            ceiling_step: CEILING_STEP,
            versus_ceiling_descent: false,

            initial_rows: 4,
            palette_size: 5,
            seed: 0x00C0_FFEE,

            player_one: Controls::player_one(),
            player_two: Controls::player_two(),
        }
    }
}

impl Settings {
    /// Read and validate settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Parse and validate settings from a JSON string
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        let invalid = |reason: String| Err(SettingsError::Invalid(reason));
        let r = self.piece_radius;

        if r.is_nan() || r <= 0.0 {
            return invalid(format!("piece_radius must be positive, got {r}"));
        }
        // Odd rows start two radii in and need a cell before the right wall
        if self.board_width <= 3.0 * r {
            return invalid(format!(
                "board_width {} must exceed three piece radii ({})",
                self.board_width,
                3.0 * r
            ));
        }
        if self.board_height < 2.0 * r {
            return invalid(format!(
                "board_height {} must fit one row ({})",
                self.board_height,
                2.0 * r
            ));
        }
        if self.board_gap < 0.0 {
            return invalid(format!("board_gap must not be negative, got {}", self.board_gap));
        }
        for (name, value) in [
            ("shot_speed", self.shot_speed),
            ("drop_speed", self.drop_speed),
            ("coarse_turn_rate", self.coarse_turn_rate),
            ("fine_turn_rate", self.fine_turn_rate),
            ("ceiling_period", self.ceiling_period),
        ] {
            if value.is_nan() || value <= 0.0 {
                return invalid(format!("{name} must be positive, got {value}"));
            }
        }
        if self.ceiling_step < 0.0 {
            return invalid(format!(
                "ceiling_step must not be negative, got {}",
                self.ceiling_step
            ));
        }
        if self.fine_turn_rate >= self.coarse_turn_rate {
            return invalid(format!(
                "fine_turn_rate {} must be slower than coarse_turn_rate {}",
                self.fine_turn_rate, self.coarse_turn_rate
            ));
        }
        if !(1..=PALETTE_SIZE).contains(&self.palette_size) {
            return invalid(format!(
                "palette_size must be 1..={PALETTE_SIZE}, got {}",
                self.palette_size
            ));
        }
        Ok(())
    }

    /// Width of the viewport holding `boards` boards side by side
    pub fn viewport_width(&self, boards: usize) -> f32 {
        let gaps = boards.saturating_sub(1) as f32;
        self.board_width * boards as f32 + self.board_gap * gaps
    }

    /// Configuration for the board at `index` (0 = left)
    pub fn board_config(&self, index: usize, ceiling_descent: bool) -> BoardConfig {
        let controls = if index == 0 {
            self.player_one.clone()
        } else {
            self.player_two.clone()
        };
        BoardConfig {
            bounds_left: index as f32 * (self.board_width + self.board_gap),
            width: self.board_width,
            height: self.board_height,
            radius: self.piece_radius,
            shot_speed: self.shot_speed,
            drop_speed: self.drop_speed,
            coarse_turn_rate: self.coarse_turn_rate,
            fine_turn_rate: self.fine_turn_rate,
            ceiling_descent,
            ceiling_period: self.ceiling_period,
            ceiling_step: self.ceiling_step,
            initial_rows: self.initial_rows,
            controls,
        }
    }
}

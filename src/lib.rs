//! Bubble Duel - a two-player hex-grid bubble shooter
//!
//! Core modules:
//! - `sim`: Board simulation (hex grid, piece motion, clusters, penalties)
//! - `settings`: Data-driven tuning loaded from JSON
//! - `error`: Configuration errors

pub mod error;
pub mod settings;
pub mod sim;

pub use error::SettingsError;
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Board dimensions (one player's strip of the viewport)
    pub const BOARD_WIDTH: f32 = 300.0;
    pub const BOARD_HEIGHT: f32 = 600.0;
    /// Horizontal gap between the two boards in the shared viewport
    pub const BOARD_GAP: f32 = 40.0;

    /// Piece radius; cells are spaced one diameter apart
    pub const PIECE_RADIUS: f32 = 20.0;

    /// Launch speed of a fired piece (pixels/s)
    pub const SHOT_SPEED: f32 = 600.0;
    /// Speed of detached pieces falling off the board (pixels/s)
    pub const DROP_SPEED: f32 = 450.0;

    /// Launcher turn rates (radians/s); coarse is 5x fine
    pub const COARSE_TURN_RATE: f32 = 1.5;
    pub const FINE_TURN_RATE: f32 = 0.3;

    /// Ceiling drops every period by half a radius
    pub const CEILING_PERIOD: f32 = 3.0;
    pub const CEILING_STEP: f32 = PIECE_RADIUS / 2.0;

    /// Smallest same-color cluster that is removed
    pub const MIN_MATCH: usize = 3;

    /// Longest flight sub-step, as a fraction of the piece radius
    pub const MAX_STEP_FRACTION: f32 = 0.5;

    /// Shots leave at least this far off horizontal (radians) so every
    /// flight climbs toward the ceiling
    pub const MIN_LAUNCH_ANGLE: f32 = 0.1;

    /// Number of distinct piece colors
    pub const PALETTE_SIZE: usize = 8;

    /// Frame time used by the headless loop (60 Hz)
    pub const FRAME_DT: f32 = 1.0 / 60.0;
}

/// Unit travel direction for a launcher angle, in screen space (y down).
///
/// Angle 0 points left, π/2 straight up, π right, -π/2 straight down.
#[inline]
pub fn direction_from_angle(angle: f32) -> Vec2 {
    Vec2::new(-angle.cos(), -angle.sin())
}

/// Launcher angle pointing from `origin` toward `target`, in [0, π].
///
/// A target directly above or below the origin yields π/2.
pub fn aim_angle_towards(origin: Vec2, target: Vec2) -> f32 {
    let dx = origin.x - target.x;
    let dy = origin.y - target.y;
    if dx == 0.0 {
        return std::f32::consts::FRAC_PI_2;
    }
    dy.max(0.0).atan2(dx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_direction_from_angle() {
        let up = direction_from_angle(FRAC_PI_2);
        assert!(up.x.abs() < 1e-6);
        assert!((up.y + 1.0).abs() < 1e-6);

        let left = direction_from_angle(0.0);
        assert!((left.x + 1.0).abs() < 1e-6);

        let down = direction_from_angle(-FRAC_PI_2);
        assert!((down.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_aim_angle_towards() {
        let origin = Vec2::new(150.0, 600.0);

        // Straight above: vertical singularity
        assert_eq!(aim_angle_towards(origin, Vec2::new(150.0, 100.0)), FRAC_PI_2);

        // Up and to the left: below π/2
        let left = aim_angle_towards(origin, Vec2::new(50.0, 500.0));
        assert!((left - PI / 4.0).abs() < 1e-5);

        // Up and to the right: above π/2
        let right = aim_angle_towards(origin, Vec2::new(250.0, 500.0));
        assert!((right - 3.0 * PI / 4.0).abs() < 1e-5);

        // Level with the launcher
        assert_eq!(aim_angle_towards(origin, Vec2::new(0.0, 600.0)), 0.0);
        assert!((aim_angle_towards(origin, Vec2::new(300.0, 600.0)) - PI).abs() < 1e-6);
    }
}

//! The launcher at the bottom of each board

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, PI};

use crate::{aim_angle_towards, direction_from_angle};

/// Turning intents, listed in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnDirection {
    CoarseLeft,
    CoarseRight,
    FineLeft,
    FineRight,
}

impl TurnDirection {
    /// When several intents are held, the first one here wins
    pub const PRIORITY: [TurnDirection; 4] = [
        TurnDirection::CoarseLeft,
        TurnDirection::CoarseRight,
        TurnDirection::FineLeft,
        TurnDirection::FineRight,
    ];

    fn slot(self) -> usize {
        self as usize
    }
}

/// Which boundary the aim guide ends on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuideSurface {
    LeftWall,
    RightWall,
    Ceiling,
}

/// Straight-line aim assist from the launch point to the first boundary
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AimGuide {
    pub start: Vec2,
    pub end: Vec2,
    pub surface: GuideSurface,
}

/// Aim state for one board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Launcher {
    /// Radians in [0, π]; 0 = left, π/2 = up, π = right
    pub angle: f32,
    /// Launch point (board-local)
    pub origin: Vec2,
    coarse_rate: f32,
    fine_rate: f32,
    intents: [bool; 4],
}

impl Launcher {
    pub fn new(origin: Vec2, coarse_rate: f32, fine_rate: f32) -> Self {
        Self {
            angle: FRAC_PI_2,
            origin,
            coarse_rate,
            fine_rate,
            intents: [false; 4],
        }
    }

    pub fn set_intent(&mut self, direction: TurnDirection, active: bool) {
        self.intents[direction.slot()] = active;
    }

    pub fn is_turning(&self, direction: TurnDirection) -> bool {
        self.intents[direction.slot()]
    }

    /// The intent honoured this tick, if any
    pub fn active_turn(&self) -> Option<TurnDirection> {
        TurnDirection::PRIORITY
            .into_iter()
            .find(|&d| self.is_turning(d))
    }

    /// Apply the active turning intent for `dt` seconds
    pub fn turn(&mut self, dt: f32) {
        let Some(direction) = self.active_turn() else {
            return;
        };
        let delta = match direction {
            TurnDirection::CoarseLeft => -self.coarse_rate,
            TurnDirection::CoarseRight => self.coarse_rate,
            TurnDirection::FineLeft => -self.fine_rate,
            TurnDirection::FineRight => self.fine_rate,
        } * dt;
        self.set_angle(self.angle + delta);
    }

    /// Set the angle, clamped to the upper half-plane
    pub fn set_angle(&mut self, angle: f32) {
        self.angle = angle.clamp(0.0, PI);
    }

    /// Point the launcher at a board-local position
    pub fn aim_at(&mut self, target: Vec2) {
        self.set_angle(aim_angle_towards(self.origin, target));
    }

    pub fn direction(&self) -> Vec2 {
        direction_from_angle(self.angle)
    }

    /// Where the current aim line first meets a side wall or the ceiling.
    ///
    /// Boundaries are measured for the piece centre: walls sit one radius in
    /// from the board edges and the ceiling one radius below `ceiling`.
    pub fn guide(&self, width: f32, ceiling: f32, radius: f32) -> AimGuide {
        let dir = self.direction();
        let mut best: Option<(f32, GuideSurface)> = None;
        let mut consider = |t: f32, surface: GuideSurface| {
            if t >= 0.0 && best.is_none_or(|(b, _)| t < b) {
                best = Some((t, surface));
            }
        };

        if dir.x < 0.0 {
            consider((radius - self.origin.x) / dir.x, GuideSurface::LeftWall);
        } else if dir.x > 0.0 {
            consider((width - radius - self.origin.x) / dir.x, GuideSurface::RightWall);
        }
        if dir.y < 0.0 {
            consider((ceiling + radius - self.origin.y) / dir.y, GuideSurface::Ceiling);
        }

        match best {
            Some((t, surface)) => AimGuide {
                start: self.origin,
                end: self.origin + dir * t,
                surface,
            },
            None => AimGuide {
                start: self.origin,
                end: self.origin,
                surface: GuideSurface::Ceiling,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn launcher() -> Launcher {
        Launcher::new(Vec2::new(150.0, 600.0), 1.5, 0.3)
    }

    #[test]
    fn test_turn_directions() {
        let mut l = launcher();
        l.set_intent(TurnDirection::CoarseLeft, true);
        l.turn(0.1);
        assert!((l.angle - (FRAC_PI_2 - 0.15)).abs() < 1e-6);

        l.set_intent(TurnDirection::CoarseLeft, false);
        l.set_intent(TurnDirection::FineRight, true);
        l.turn(0.1);
        assert!((l.angle - (FRAC_PI_2 - 0.12)).abs() < 1e-6);
    }

    #[test]
    fn test_turn_priority() {
        let mut l = launcher();
        l.set_intent(TurnDirection::FineLeft, true);
        l.set_intent(TurnDirection::CoarseRight, true);
        assert_eq!(l.active_turn(), Some(TurnDirection::CoarseRight));
        l.set_intent(TurnDirection::CoarseLeft, true);
        assert_eq!(l.active_turn(), Some(TurnDirection::CoarseLeft));
    }

    #[test]
    fn test_turn_clamped() {
        let mut l = launcher();
        l.set_intent(TurnDirection::CoarseLeft, true);
        for _ in 0..100 {
            l.turn(0.1);
        }
        assert_eq!(l.angle, 0.0);

        l.set_intent(TurnDirection::CoarseLeft, false);
        l.set_intent(TurnDirection::CoarseRight, true);
        for _ in 0..100 {
            l.turn(0.1);
        }
        assert_eq!(l.angle, PI);
    }

    #[test]
    fn test_turn_zero_dt() {
        let mut l = launcher();
        l.set_intent(TurnDirection::CoarseRight, true);
        l.turn(0.0);
        assert_eq!(l.angle, FRAC_PI_2);
    }

    #[test]
    fn test_guide_straight_up_hits_ceiling() {
        let l = launcher();
        let guide = l.guide(300.0, 0.0, 20.0);
        assert_eq!(guide.surface, GuideSurface::Ceiling);
        assert!((guide.end.y - 20.0).abs() < 1e-3);
        assert!((guide.end.x - 150.0).abs() < 1e-3);
    }

    #[test]
    fn test_guide_shallow_hits_wall() {
        let mut l = launcher();
        l.set_angle(0.3);
        let guide = l.guide(300.0, 0.0, 20.0);
        assert_eq!(guide.surface, GuideSurface::LeftWall);
        assert!((guide.end.x - 20.0).abs() < 1e-3);

        l.set_angle(PI - 0.3);
        let guide = l.guide(300.0, 0.0, 20.0);
        assert_eq!(guide.surface, GuideSurface::RightWall);
        assert!((guide.end.x - 280.0).abs() < 1e-3);
    }

    #[test]
    fn test_aim_at() {
        let mut l = launcher();
        l.aim_at(Vec2::new(150.0, 10.0));
        assert_eq!(l.angle, FRAC_PI_2);
        l.aim_at(Vec2::new(50.0, 500.0));
        assert!((l.angle - PI / 4.0).abs() < 1e-5);
    }
}

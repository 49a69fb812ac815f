//! Bubble Duel headless runner
//!
//! Stands in for the window layer: builds a versus session, feeds it a
//! seeded stream of pointer and key events, pumps frames and logs what the
//! boards send each other.
//!
//! Usage: `bubble-duel [settings.json] [frames]`

use anyhow::{Context, Result};
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use bubble_duel::Settings;
use bubble_duel::consts::FRAME_DT;
use bubble_duel::sim::{InputEvent, Session};

/// Two minutes at 60 Hz
const DEFAULT_FRAMES: u32 = 60 * 120;

/// Roughly how often each player shoots
const SHOTS_PER_SECOND: f64 = 0.8;

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => {
            Settings::load(&path).with_context(|| format!("loading settings from {path}"))?
        }
        None => Settings::default(),
    };
    let frames = match args.next() {
        Some(raw) => raw
            .parse::<u32>()
            .with_context(|| format!("frame count '{raw}' is not a number"))?,
        None => DEFAULT_FRAMES,
    };

    log::info!("Bubble Duel (headless) starting, {frames} frames");
    let mut session = Session::versus(&settings);
    let mut script = Pcg32::seed_from_u64(settings.seed ^ 0x5eed);

    let mut sent = [0usize; 2];
    for frame in 0..frames {
        let events = scripted_input(&mut script, &settings);
        if events.contains(&InputEvent::Quit) {
            log::info!("Quit at frame {frame}");
            break;
        }
        for event in &events {
            session.handle_input(event);
        }

        let report = session.tick(FRAME_DT);
        for transfer in report.transfers {
            log::info!(
                "t={:.2}s board {} -> board {}: {} pieces ({} landed)",
                session.elapsed(),
                transfer.from.0,
                transfer.to.0,
                transfer.requested,
                transfer.delivered
            );
            if let Some(total) = sent.get_mut(transfer.from.0) {
                *total += transfer.requested;
            }
        }
    }

    for snapshot in session.snapshots() {
        let summary = serde_json::json!({
            "board": snapshot.id.0,
            "settled": snapshot.settled.len(),
            "falling": snapshot.falling.len(),
            "ceiling_offset": snapshot.ceiling_offset,
            "penalty_sent": sent.get(snapshot.id.0).copied().unwrap_or_default(),
        });
        println!("{summary}");
    }
    Ok(())
}

/// One frame of made-up input: occasional aimed shots on either board and
/// short taps of the fine-turn keys.
fn scripted_input(rng: &mut Pcg32, settings: &Settings) -> Vec<InputEvent> {
    let mut events = Vec::new();
    let shot_chance = SHOTS_PER_SECOND * f64::from(FRAME_DT);

    for (index, controls) in [&settings.player_one, &settings.player_two]
        .into_iter()
        .enumerate()
    {
        let config = settings.board_config(index, false);
        if rng.random_bool(shot_chance) {
            let target = Vec2::new(
                config.bounds_left + rng.random_range(0.0..config.width),
                rng.random_range(0.0..config.height * 0.8),
            );
            events.push(InputEvent::PointerPressed(target));
        }

        let key = if rng.random_bool(0.5) {
            controls.fine_left
        } else {
            controls.fine_right
        };
        match rng.random_range(0..100) {
            0 => events.push(InputEvent::KeyDown(key)),
            1 => events.push(InputEvent::KeyUp(key)),
            _ => {}
        }
    }
    events
}

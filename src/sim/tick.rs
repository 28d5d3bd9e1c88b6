//! Per-tick simulation driver
//!
//! Advances the player, then each pursuer, then the power-mode countdown, then
//! resolves contacts. Performs no I/O and knows nothing about rendering or
//! input devices.

use super::ai::{self, TargetContext};
use super::collision;
use super::maze::Cell;
use super::motion;
use super::state::{GameEvent, GameState, GameStatus, PursuerMode};
use crate::consts::*;

/// Convert elapsed wall time into a multiple of the nominal frame
pub fn frame_scale(elapsed_ms: f32) -> f32 {
    if !elapsed_ms.is_finite() {
        return 0.0;
    }
    (elapsed_ms / FRAME_MS).clamp(0.0, MAX_FRAME_SCALE)
}

/// Advance the game state by `elapsed_ms`. No-op once the game is over.
pub fn tick(state: &mut GameState, elapsed_ms: f32) -> GameStatus {
    if state.status.is_terminal() {
        return state.status;
    }

    state.events.clear();
    let scale = frame_scale(elapsed_ms);
    state.time_ticks += 1;
    state.time_ms += f64::from(scale * FRAME_MS);

    advance_player(state, scale);
    if state.status.is_terminal() {
        return state.status;
    }

    advance_pursuers(state, scale);

    if state.power.tick_down() {
        state.end_power_mode();
    }

    collision::resolve(state);
    state.status
}

fn advance_player(state: &mut GameState, scale: f32) {
    let travel = motion::travel(state.tuning.player_speed, scale);
    let player = &mut state.player;

    motion::rescue_from_wall(&mut player.body, &state.maze);
    let outcome = motion::step(&mut player.body, &state.maze, travel, AGENT_RADIUS);
    if outcome.moved {
        player.mouth_phase = (player.mouth_phase + MOUTH_SPEED * scale).fract();
    }

    if outcome.at_center {
        collect(state, outcome.cell);
    }
}

/// Eat whatever sits on the player's intersection
fn collect(state: &mut GameState, cell: glam::IVec2) {
    let kind = state.maze.cell_at(cell.x, cell.y);
    let points = state.maze.consume_collectible(cell.x, cell.y);
    if points == 0 {
        return;
    }
    state.score += u64::from(points);

    if kind == Cell::PowerPellet {
        state.events.push(GameEvent::PowerPelletEaten { cell });
        state.activate_power_mode();
    } else {
        state.events.push(GameEvent::DotEaten { cell });
    }

    if state.maze.remaining_collectibles() == 0 {
        state.status = GameStatus::Won;
        state.events.push(GameEvent::Won);
        log::info!("Maze cleared with score {}", state.score);
    }
}

fn advance_pursuers(state: &mut GameState, scale: f32) {
    let ctx = TargetContext::new(&state.player, &state.pursuers);
    let now_ms = state.time_ms;

    for pursuer in state.pursuers.iter_mut() {
        if pursuer.mode == PursuerMode::Eaten {
            // Parked at spawn until power mode ends
            pursuer.history.clear();
            pursuer.stuck_ticks = 0;
            continue;
        }

        let travel = motion::travel(pursuer.speed(&state.tuning), scale);
        motion::rescue_from_wall(&mut pursuer.body, &state.maze);

        let heading = pursuer.body.dir;
        ai::steer(
            pursuer,
            &state.maze,
            &ctx,
            now_ms,
            &state.tuning,
            &mut state.rng,
            travel,
        );
        motion::step(&mut pursuer.body, &state.maze, travel, AGENT_RADIUS);
        if pursuer.body.dir != heading {
            pursuer.last_turn_ms = now_ms;
        }

        if !pursuer.escaped && !state.maze.in_pen(pursuer.body.cell()) {
            pursuer.escaped = true;
            log::debug!("Pursuer {} left the pen", pursuer.index);
        }

        if travel > 0.0 {
            ai::track_progress(pursuer, &state.maze, &mut state.rng);
        }
    }
}

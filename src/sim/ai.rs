//! Pursuer decision making
//!
//! Decisions are only taken at intersections. A pursuer first leaves the pen,
//! then at each center picks a target cell according to its personality (or
//! flees the player while scared), ranks the open directions by Manhattan
//! distance to that target and usually takes the best one.

use glam::IVec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::direction::Direction;
use super::maze::Maze;
use super::motion::{self, Body};
use super::state::{Personality, Player, Pursuer, PursuerMode};
use crate::consts::*;
use crate::{Tuning, cell_center, manhattan};

/// Player-derived inputs shared by every pursuer this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetContext {
    pub player_cell: IVec2,
    pub player_dir: Direction,
    /// Cell of the DirectChase pursuer, pivot for Ambush
    pub anchor_cell: IVec2,
}

impl TargetContext {
    pub fn new(player: &Player, pursuers: &[Pursuer]) -> Self {
        let player_cell = player.body.cell();
        let anchor_cell = pursuers
            .iter()
            .find(|p| p.personality == Personality::DirectChase)
            .map(|p| p.body.cell())
            .unwrap_or(player_cell);
        Self {
            player_cell,
            player_dir: player.body.dir,
            anchor_cell,
        }
    }

    fn ahead_of_player(&self, cells: i32) -> IVec2 {
        self.player_cell + self.player_dir.offset() * cells
    }
}

/// What a pursuer is steering relative to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Goal {
    /// Minimize distance to the cell
    Chase(IVec2),
    /// Maximize distance from the cell
    Flee(IVec2),
}

fn direct_chase(ctx: &TargetContext) -> IVec2 {
    ctx.player_cell
}

fn intercept(ctx: &TargetContext) -> IVec2 {
    ctx.ahead_of_player(INTERCEPT_LEAD)
}

fn ambush(ctx: &TargetContext) -> IVec2 {
    let lead = ctx.ahead_of_player(AMBUSH_LEAD);
    lead + (lead - ctx.anchor_cell)
}

fn patrol_scatter(own_cell: IVec2, ctx: &TargetContext) -> IVec2 {
    let distance = (own_cell - ctx.player_cell).as_vec2().length();
    if distance > SCATTER_RADIUS {
        ctx.player_cell
    } else {
        SCATTER_CORNER
    }
}

/// Target cell for a personality (may lie outside the grid)
pub fn target_cell(personality: Personality, own_cell: IVec2, ctx: &TargetContext) -> IVec2 {
    match personality {
        Personality::DirectChase => direct_chase(ctx),
        Personality::Intercept => intercept(ctx),
        Personality::Ambush => ambush(ctx),
        Personality::PatrolScatter => patrol_scatter(own_cell, ctx),
    }
}

/// Directions a body standing on a cell center may take
///
/// The reversal of the current heading is only offered when nothing else is
/// open. If the edge-aware probe finds nothing, a plain neighbor-cell scan is
/// used instead.
pub fn open_directions(maze: &Maze, body: &Body) -> Vec<Direction> {
    let cell = body.cell();
    let center = cell_center(cell);

    let mut open: Vec<Direction> = Direction::ALL
        .into_iter()
        .filter(|&d| motion::can_move(maze, center, d, AGENT_RADIUS))
        .collect();
    if open.is_empty() {
        open = Direction::ALL
            .into_iter()
            .filter(|&d| maze.is_open(maze.neighbor(cell, d)))
            .collect();
    }

    let reverse = body.dir.opposite();
    if open.iter().any(|&d| d != reverse) {
        open.retain(|&d| d != reverse);
    }
    open
}

/// Order candidate directions, best first. Ties keep scan order.
pub fn rank_directions(maze: &Maze, cell: IVec2, options: &[Direction], goal: Goal) -> Vec<Direction> {
    let mut ranked = options.to_vec();
    match goal {
        Goal::Chase(target) => {
            ranked.sort_by_key(|&d| manhattan(maze.neighbor(cell, d), target));
        }
        Goal::Flee(threat) => {
            ranked.sort_by_key(|&d| std::cmp::Reverse(manhattan(maze.neighbor(cell, d), threat)));
        }
    }
    ranked
}

/// Take the best direction most of the time, otherwise one of the others
pub fn pick_direction(ranked: &[Direction], best_probability: f32, rng: &mut Pcg32) -> Option<Direction> {
    let best = *ranked.first()?;
    if ranked.len() == 1 || rng.random_bool(f64::from(best_probability.clamp(0.0, 1.0))) {
        return Some(best);
    }
    Some(ranked[rng.random_range(1..ranked.len())])
}

/// Heading that takes a pursuer out of the pen: along the roof to the exit column, then up
fn pen_exit_direction(cell: IVec2) -> Direction {
    if cell.x < PEN_EXIT.x {
        Direction::Right
    } else if cell.x > PEN_EXIT.x {
        Direction::Left
    } else {
        Direction::Up
    }
}

/// Decide the pursuer's next heading for this tick
///
/// Only queues the heading in `next_dir`; the motion step commits it.
pub fn steer(
    pursuer: &mut Pursuer,
    maze: &Maze,
    ctx: &TargetContext,
    now_ms: f64,
    tuning: &Tuning,
    rng: &mut Pcg32,
    travel: f32,
) {
    // First tick after a respawn: shove out of the spawn cell
    if let Some(push) = pursuer.spawn_push.take() {
        pursuer.body.dir = push;
        pursuer.body.next_dir = None;
        return;
    }

    if !motion::is_at_center(pursuer.body.pos, pursuer.body.dir, travel) {
        return;
    }

    let cell = pursuer.body.cell();
    let center = cell_center(cell);
    let blocked = !motion::can_move(maze, center, pursuer.body.dir, AGENT_RADIUS);

    // Only fresh spawns are herded; a patrolling pursuer may cross the pen on the tunnel row
    if !pursuer.escaped && maze.in_pen(cell) {
        // Keep going if the heading is already carrying it out, never deeper in
        if blocked || pursuer.body.dir == Direction::Down {
            pursuer.body.next_dir = Some(pen_exit_direction(cell));
        }
        return;
    }

    let since_turn = now_ms - pursuer.last_turn_ms;
    if !blocked && since_turn < f64::from(tuning.direction_change_interval_ms) {
        return;
    }

    let goal = match pursuer.mode {
        PursuerMode::Scared => Goal::Flee(ctx.player_cell),
        PursuerMode::Normal | PursuerMode::Eaten => {
            Goal::Chase(target_cell(pursuer.personality, cell, ctx))
        }
    };

    let options = open_directions(maze, &pursuer.body);
    let ranked = rank_directions(maze, cell, &options, goal);
    match pick_direction(&ranked, tuning.best_choice_probability, rng) {
        // Never flip around in an open corridor
        Some(dir) if blocked || dir != pursuer.body.dir.opposite() => {
            pursuer.body.next_dir = Some(dir);
        }
        // Nothing usable: hold the current heading
        _ => pursuer.body.next_dir = None,
    }
}

/// Record the latest position and break the pursuer loose if it stopped making progress
///
/// Returns true when a recovery was performed.
pub fn track_progress(pursuer: &mut Pursuer, maze: &Maze, rng: &mut Pcg32) -> bool {
    pursuer.history.push_back(pursuer.body.pos);
    while pursuer.history.len() > STUCK_HISTORY {
        pursuer.history.pop_front();
    }
    if pursuer.history.len() < STUCK_HISTORY {
        return false;
    }

    let displacement = match (pursuer.history.front(), pursuer.history.back()) {
        (Some(oldest), Some(newest)) => oldest.distance(*newest),
        _ => return false,
    };
    if displacement < STUCK_DISPLACEMENT {
        pursuer.stuck_ticks += 1;
    } else {
        pursuer.stuck_ticks = 0;
    }
    if pursuer.stuck_ticks <= STUCK_TICKS {
        return false;
    }

    let cell = pursuer.body.cell();
    let center = cell_center(cell);
    pursuer.body.pos = center;
    pursuer.body.next_dir = None;

    let options: Vec<Direction> = Direction::ALL
        .into_iter()
        .filter(|&d| motion::can_move(maze, center, d, AGENT_RADIUS))
        .collect();
    if !options.is_empty() {
        let dir = options[rng.random_range(0..options.len())];
        pursuer.body.dir = dir;
        let pushed = center + dir.vec() * STUCK_PUSH;
        if motion::can_occupy(maze, pushed, dir, AGENT_RADIUS) {
            pursuer.body.pos = pushed;
        }
    }

    log::debug!(
        "Pursuer {} stuck at {:?}, realigned heading {}",
        pursuer.index,
        cell,
        pursuer.body.dir.as_str()
    );
    pursuer.history.clear();
    pursuer.stuck_ticks = 0;
    true
}

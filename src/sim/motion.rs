//! Sub-cell movement shared by the player and the pursuers
//!
//! Agents travel in straight lines between cell centers. A turn, a collectible
//! pickup or a tunnel jump only happens while the agent is "at center": the
//! center of its cell lies ahead of it (or underfoot) closer than the distance
//! it will travel this tick. Because a move never covers more than that
//! distance, an agent heading for a center is always caught by the test before
//! it can overshoot, and a center already behind it is never revisited.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use super::direction::Direction;
use super::maze::Maze;
use crate::consts::*;
use crate::{cell_center, cell_of};

/// Position and heading of one agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    pub dir: Direction,
    /// Requested heading, committed at the next center where it is open
    pub next_dir: Option<Direction>,
}

impl Body {
    /// Body resting on a cell center
    pub fn at_cell(cell: IVec2, dir: Direction) -> Self {
        Self {
            pos: cell_center(cell),
            dir,
            next_dir: None,
        }
    }

    pub fn cell(&self) -> IVec2 {
        cell_of(self.pos)
    }
}

/// What happened during one motion step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    /// The agent passed through a cell center this tick
    pub at_center: bool,
    /// Cell the step started in
    pub cell: IVec2,
    /// The agent advanced (false when halted by a wall or zero travel)
    pub moved: bool,
    /// The agent wrapped through the tunnel
    pub teleported: bool,
}

/// Distance covered this tick
#[inline]
pub fn travel(speed: f32, frame_scale: f32) -> f32 {
    speed * frame_scale
}

/// Slack for float error when a move lands exactly on a center
const CENTER_EPSILON: f32 = 1e-3;

/// Whether a body at `pos` heading `dir` reaches its cell center this tick
pub fn is_at_center(pos: Vec2, dir: Direction, travel: f32) -> bool {
    let to_center = cell_center(cell_of(pos)) - pos;
    let along = to_center.dot(dir.vec());
    let across = to_center.dot(dir.perpendicular()).abs();
    along > -CENTER_EPSILON && along < travel && across < travel
}

/// Whether an agent centered at `pos` and facing `dir` fits without touching a wall
///
/// Probes the center plus the leading edge and both leading corners, so a body
/// can't slip through a gap between diagonal walls.
pub fn can_occupy(maze: &Maze, pos: Vec2, dir: Direction, radius: f32) -> bool {
    let lead = pos + dir.vec() * radius;
    let side = dir.perpendicular() * radius;
    maze.is_walkable(pos)
        && maze.is_walkable(lead)
        && maze.is_walkable(lead + side)
        && maze.is_walkable(lead - side)
}

/// Whether an agent at `pos` could start moving in `dir`
pub fn can_move(maze: &Maze, pos: Vec2, dir: Direction, radius: f32) -> bool {
    can_occupy(maze, pos + dir.vec() * (CELL_SIZE / 2.0), dir, radius)
}

/// Advance a body by `travel` along its heading
pub fn step(body: &mut Body, maze: &Maze, travel: f32, radius: f32) -> StepOutcome {
    let start_cell = body.cell();
    let mut outcome = StepOutcome {
        at_center: false,
        cell: start_cell,
        moved: false,
        teleported: false,
    };
    if travel <= 0.0 {
        return outcome;
    }

    if is_at_center(body.pos, body.dir, travel) {
        outcome.at_center = true;
        body.pos = cell_center(start_cell);

        if let Some(next) = body.next_dir {
            if next == body.dir {
                body.next_dir = None;
            } else if can_move(maze, body.pos, next, radius) {
                body.dir = next;
                body.next_dir = None;
            }
        }
    }

    outcome.teleported = wrap_tunnel(body, maze);
    // Facing a wall from the center: stay put rather than nudge in and bounce back
    if outcome.at_center && !can_move(maze, body.pos, body.dir, radius) {
        return outcome;
    }
    let lane = cell_center(body.cell());

    let candidate = body.pos + body.dir.vec() * travel;
    if can_occupy(maze, candidate, body.dir, radius) {
        body.pos = candidate;
        // Ease back toward the lane center instead of snapping
        if body.dir.is_horizontal() {
            body.pos.y += (lane.y - body.pos.y) * LANE_CORRECTION;
        } else {
            body.pos.x += (lane.x - body.pos.x) * LANE_CORRECTION;
        }
        outcome.moved = true;
    } else {
        body.pos = lane;
    }

    outcome
}

/// Jump to the opposite tunnel mouth when leaving the grid through it
///
/// The offset from the cell center is carried across, so repeated traversals
/// land on the same spot.
pub fn wrap_tunnel(body: &mut Body, maze: &Maze) -> bool {
    let cell = body.cell();
    if !maze.is_tunnel_row(cell.y) {
        return false;
    }
    let center = cell_center(cell);
    let last = maze.width() - 1;
    let target = match body.dir {
        Direction::Left if cell.x == 0 && body.pos.x <= center.x => last,
        Direction::Right if cell.x == last && body.pos.x >= center.x => 0,
        _ => return false,
    };
    let offset = body.pos.x - center.x;
    body.pos.x = cell_center(IVec2::new(target, cell.y)).x + offset;
    true
}

/// Pull a body out of a wall cell onto the nearest open cell center
///
/// Returns true if the body had to be moved.
pub fn rescue_from_wall(body: &mut Body, maze: &Maze) -> bool {
    let cell = body.cell();
    if maze.is_open(cell) {
        return false;
    }

    for ring in 1..=WALL_RESCUE_RADIUS {
        let mut best: Option<(f32, IVec2)> = None;
        for dy in -ring..=ring {
            for dx in -ring..=ring {
                if dx.abs().max(dy.abs()) != ring {
                    continue;
                }
                let candidate = cell + IVec2::new(dx, dy);
                if !maze.is_open(candidate) {
                    continue;
                }
                let dist = cell_center(candidate).distance_squared(body.pos);
                if best.is_none_or(|(best_dist, _)| dist < best_dist) {
                    best = Some((dist, candidate));
                }
            }
        }
        if let Some((_, target)) = best {
            log::debug!("Rescued agent from wall {:?} to {:?}", cell, target);
            body.pos = cell_center(target);
            body.next_dir = None;
            return true;
        }
    }

    log::warn!("No open cell within {} of {:?}", WALL_RESCUE_RADIUS, cell);
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    const RADIUS: f32 = AGENT_RADIUS;

    fn corridor() -> Maze {
        Maze::from_rows(&[
            "#######",
            "#     #",
            "### ###",
            "#######",
        ])
    }

    #[test]
    fn test_at_center_detection() {
        let center = cell_center(IVec2::new(2, 1));
        assert!(is_at_center(center, Direction::Right, 2.0));
        // Approaching from the right while heading left
        assert!(is_at_center(center + Vec2::new(1.5, 0.0), Direction::Left, 2.0));
        assert!(!is_at_center(center + Vec2::new(2.5, 0.0), Direction::Left, 2.0));
        // Already past it
        assert!(!is_at_center(center + Vec2::new(1.5, 0.0), Direction::Right, 2.0));
        assert!(!is_at_center(center + Vec2::new(0.0, 1.5), Direction::Down, 2.0));
        // Off the lane
        assert!(!is_at_center(center + Vec2::new(0.0, 3.0), Direction::Left, 2.0));
        // Zero travel never counts as center
        assert!(!is_at_center(center, Direction::Up, 0.0));
    }

    #[test]
    fn test_leaving_a_center_keeps_going() {
        let maze = Maze::classic();
        // (speed, elapsed ms) pairs whose travel doesn't divide a cell evenly
        let pace = [(2.0, 16.0), (2.0, 17.0), (PURSUER_SPEED, FRAME_MS), (1.0, 16.0)];

        for (speed, elapsed_ms) in pace {
            let per_tick = travel(speed, elapsed_ms / FRAME_MS);
            for (cell, kind) in maze.cells() {
                if kind.is_wall() {
                    continue;
                }
                for dir in Direction::ALL {
                    let start = cell_center(cell);
                    if !can_move(&maze, start, dir, RADIUS) {
                        continue;
                    }
                    let mut body = Body::at_cell(cell, dir);
                    step(&mut body, &maze, per_tick, RADIUS);
                    let first = body.pos;
                    let second = step(&mut body, &maze, per_tick, RADIUS);
                    assert!(second.moved, "{cell:?} {dir:?} halted at {per_tick}");
                    assert!(
                        body.pos.distance(first) > per_tick * 0.5,
                        "{cell:?} {dir:?} pulled back to center at {per_tick}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_blocked_at_center_stays_put() {
        let maze = corridor();
        let mut body = Body::at_cell(IVec2::new(5, 1), Direction::Right);
        // Short hops would fit inside the cell; still no creeping toward the wall
        for _ in 0..5 {
            let outcome = step(&mut body, &maze, 1.0, RADIUS);
            assert!(outcome.at_center);
            assert!(!outcome.moved);
            assert_eq!(body.pos, cell_center(IVec2::new(5, 1)));
        }
    }

    #[test]
    fn test_can_move_into_tunnel_mouth() {
        let maze = Maze::classic();
        let left_mouth = cell_center(IVec2::new(0, TUNNEL_ROW));
        let right_mouth = cell_center(IVec2::new(MAZE_WIDTH - 1, TUNNEL_ROW));
        assert!(can_move(&maze, left_mouth, Direction::Left, RADIUS));
        assert!(can_move(&maze, right_mouth, Direction::Right, RADIUS));
        // Off the tunnel row the border is solid
        assert!(!can_move(&maze, cell_center(IVec2::new(1, 1)), Direction::Left, RADIUS));
    }

    #[test]
    fn test_moves_along_corridor() {
        let maze = corridor();
        let mut body = Body::at_cell(IVec2::new(1, 1), Direction::Right);
        let outcome = step(&mut body, &maze, 2.0, RADIUS);
        assert!(outcome.at_center);
        assert!(outcome.moved);
        assert_eq!(body.pos, cell_center(IVec2::new(1, 1)) + Vec2::new(2.0, 0.0));
    }

    #[test]
    fn test_halts_at_wall_on_center() {
        let maze = corridor();
        let mut body = Body::at_cell(IVec2::new(5, 1), Direction::Right);
        let outcome = step(&mut body, &maze, 2.0, RADIUS);
        assert!(!outcome.moved);
        assert_eq!(body.pos, cell_center(IVec2::new(5, 1)));
    }

    #[test]
    fn test_queued_turn_waits_for_opening() {
        let maze = corridor();
        let mut body = Body::at_cell(IVec2::new(1, 1), Direction::Right);
        body.next_dir = Some(Direction::Down);

        // Down is blocked at (1, 1): keep going right, keep the request
        step(&mut body, &maze, 2.0, RADIUS);
        assert_eq!(body.dir, Direction::Right);
        assert_eq!(body.next_dir, Some(Direction::Down));

        // Walk to the junction at (3, 1) and take the turn there
        for _ in 0..40 {
            step(&mut body, &maze, 2.0, RADIUS);
            if body.dir == Direction::Down {
                break;
            }
        }
        assert_eq!(body.dir, Direction::Down);
        assert_eq!(body.next_dir, None);
        assert_eq!(body.cell().x, 3);
        assert!((body.pos.x - cell_center(IVec2::new(3, 1)).x).abs() < 0.001);
    }

    #[test]
    fn test_never_rests_in_wall() {
        let maze = corridor();
        let mut body = Body::at_cell(IVec2::new(1, 1), Direction::Right);
        let requests = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];
        for i in 0..500 {
            if i % 37 == 0 {
                body.next_dir = Some(requests[(i / 37) % requests.len()]);
            }
            step(&mut body, &maze, 1.7, RADIUS);
            assert!(maze.is_open(body.cell()), "in wall at {:?}", body.pos);
        }
    }

    #[test]
    fn test_lane_correction_is_soft() {
        let maze = corridor();
        let mut body = Body::at_cell(IVec2::new(2, 1), Direction::Right);
        body.pos += Vec2::new(5.0, 1.0);
        step(&mut body, &maze, 1.0, RADIUS);
        let lane_y = cell_center(IVec2::new(2, 1)).y;
        let offset = body.pos.y - lane_y;
        assert!(offset > 0.0 && offset < 1.0);
    }

    #[test]
    fn test_tunnel_round_trip() {
        let maze = Maze::classic();
        let row = TUNNEL_ROW;
        let mut body = Body::at_cell(IVec2::new(2, row), Direction::Left);

        let mut wrapped = 0;
        for _ in 0..400 {
            let outcome = step(&mut body, &maze, PLAYER_SPEED, RADIUS);
            if outcome.teleported {
                wrapped += 1;
                // Re-enters at the opposite mouth, on the lane
                assert_eq!(body.cell(), IVec2::new(MAZE_WIDTH - 1, row));
                assert!((body.pos.y - cell_center(IVec2::new(0, row)).y).abs() < 0.001);
            }
            assert!(maze.is_open(body.cell()));
        }
        assert!(wrapped >= 1);
        assert_eq!(body.dir, Direction::Left);
    }

    #[test]
    fn test_wrap_preserves_offset() {
        let maze = Maze::classic();
        let mouth = cell_center(IVec2::new(0, TUNNEL_ROW));
        let mut body = Body::at_cell(IVec2::new(0, TUNNEL_ROW), Direction::Left);
        body.pos.x = mouth.x - 1.5;

        assert!(wrap_tunnel(&mut body, &maze));
        let far = cell_center(IVec2::new(MAZE_WIDTH - 1, TUNNEL_ROW));
        assert!((body.pos.x - (far.x - 1.5)).abs() < 0.001);

        // Heading left on the right mouth does not bounce back
        assert!(!wrap_tunnel(&mut body, &maze));
    }

    #[test]
    fn test_rescue_from_wall() {
        let maze = corridor();
        let mut body = Body::at_cell(IVec2::new(2, 2), Direction::Up);
        assert!(rescue_from_wall(&mut body, &maze));
        assert!(maze.is_open(body.cell()));
        assert_eq!(body.pos, cell_center(body.cell()));

        // Already open: untouched
        let before = body.clone();
        assert!(!rescue_from_wall(&mut body, &maze));
        assert_eq!(body, before);
    }
}

//! Game state and core simulation types
//!
//! Everything the engine mutates during a tick lives here, together with the
//! command/query surface used by the rendering and input collaborators.

use std::collections::VecDeque;

use glam::{IVec2, Vec2};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::direction::Direction;
use super::maze::Maze;
use super::motion::Body;
use crate::Tuning;
use crate::consts::*;

/// Session outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Playing,
    Won,
    Lost,
}

impl GameStatus {
    pub fn is_terminal(self) -> bool {
        self != GameStatus::Playing
    }
}

/// Fixed targeting strategy of a pursuer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Personality {
    /// Heads straight for the player's cell
    DirectChase,
    /// Aims a few cells ahead of the player
    Intercept,
    /// Flanks by mirroring a lead point through the DirectChase pursuer
    Ambush,
    /// Chases from afar, retreats to its corner up close
    PatrolScatter,
}

impl Personality {
    pub fn for_index(index: usize) -> Self {
        match index % PURSUER_COUNT {
            0 => Personality::DirectChase,
            1 => Personality::Intercept,
            2 => Personality::Ambush,
            _ => Personality::PatrolScatter,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Personality::DirectChase => "DirectChase",
            Personality::Intercept => "Intercept",
            Personality::Ambush => "Ambush",
            Personality::PatrolScatter => "PatrolScatter",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PursuerMode {
    #[default]
    Normal,
    /// Fleeing during power mode, can be eaten
    Scared,
    /// Sent back to spawn, waits there until power mode ends
    Eaten,
}

/// The player-controlled agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub body: Body,
    /// Mouth animation phase in [0, 1), advances while moving
    pub mouth_phase: f32,
}

impl Player {
    pub fn spawn() -> Self {
        Self {
            body: Body::at_cell(PLAYER_SPAWN, PLAYER_SPAWN_DIR),
            mouth_phase: 0.0,
        }
    }
}

/// One autonomous pursuer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pursuer {
    pub index: usize,
    /// Body color (0xRRGGBB)
    pub color: u32,
    pub personality: Personality,
    pub mode: PursuerMode,
    pub body: Body,
    /// Recent positions, oldest first
    pub history: VecDeque<Vec2>,
    pub stuck_ticks: u32,
    /// Simulation time of the last heading change
    pub last_turn_ms: f64,
    /// Has left the pen since the last respawn
    pub escaped: bool,
    /// Heading forced on the first tick after spawning
    pub spawn_push: Option<Direction>,
}

impl Pursuer {
    pub fn spawn(index: usize) -> Self {
        let slot = index % PURSUER_COUNT;
        Self {
            index,
            color: PURSUER_COLORS[slot],
            personality: Personality::for_index(index),
            mode: PursuerMode::Normal,
            body: Body::at_cell(PURSUER_SPAWNS[slot], PURSUER_SPAWN_PUSH[slot]),
            history: VecDeque::with_capacity(STUCK_HISTORY + 1),
            stuck_ticks: 0,
            last_turn_ms: 0.0,
            escaped: false,
            spawn_push: Some(PURSUER_SPAWN_PUSH[slot]),
        }
    }

    /// Spawn cell center for this pursuer
    pub fn spawn_position(&self) -> Vec2 {
        crate::cell_center(PURSUER_SPAWNS[self.index % PURSUER_COUNT])
    }

    /// Return to spawn, keeping identity and mode
    pub fn respawn(&mut self) {
        let mode = self.mode;
        *self = Self::spawn(self.index);
        self.mode = mode;
    }

    pub fn speed(&self, tuning: &Tuning) -> f32 {
        match self.mode {
            PursuerMode::Scared => tuning.pursuer_scared_speed,
            PursuerMode::Normal | PursuerMode::Eaten => tuning.pursuer_speed,
        }
    }
}

/// Power mode countdown
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerMode {
    pub active: bool,
    pub remaining_ticks: u32,
    pub duration_ticks: u32,
}

impl PowerMode {
    pub fn start(&mut self, duration_ticks: u32) {
        self.active = true;
        self.duration_ticks = duration_ticks.max(1);
        self.remaining_ticks = self.duration_ticks;
    }

    pub fn stop(&mut self) {
        self.active = false;
        self.remaining_ticks = 0;
    }

    /// Count down one tick. Returns true when the mode just expired.
    pub fn tick_down(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.remaining_ticks = self.remaining_ticks.saturating_sub(1);
        if self.remaining_ticks == 0 {
            self.active = false;
            return true;
        }
        false
    }

    /// Remaining share of the full duration, 0 when inactive
    pub fn remaining_fraction(&self) -> f32 {
        if !self.active || self.duration_ticks == 0 {
            return 0.0;
        }
        self.remaining_ticks as f32 / self.duration_ticks as f32
    }

    /// In the final third of the countdown (pursuers flash)
    pub fn ending_soon(&self) -> bool {
        self.active && self.remaining_ticks * 3 <= self.duration_ticks
    }
}

/// Notable things that happened during the last tick (for audio/effects)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    DotEaten { cell: IVec2 },
    PowerPelletEaten { cell: IVec2 },
    PursuerEaten { index: usize },
    PowerModeEnded,
    LifeLost { lives_left: u8 },
    Won,
    Lost,
}

/// Render-facing view of one agent
#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    pub pos: Vec2,
    pub dir: Direction,
    pub mouth_phase: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct PursuerView {
    pub index: usize,
    pub color: u32,
    pub personality: Personality,
    pub pos: Vec2,
    pub dir: Direction,
    pub mode: PursuerMode,
}

/// Render-facing view of the whole session (the grid is read from [`GameState::maze`])
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub score: u64,
    pub lives: u8,
    pub status: GameStatus,
    pub power_active: bool,
    pub power_remaining_fraction: f32,
    pub power_ending_soon: bool,
    pub remaining_collectibles: u32,
    pub player: PlayerView,
    pub pursuers: Vec<PursuerView>,
}

/// Complete session state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Seed the RNG was created from
    pub seed: u64,
    pub tuning: Tuning,
    /// Pursuer decision RNG
    pub(crate) rng: Pcg32,
    /// Pristine grid restored on reset
    layout: Maze,
    pub maze: Maze,
    pub player: Player,
    /// Pursuers, sorted by index
    pub pursuers: Vec<Pursuer>,
    pub score: u64,
    pub lives: u8,
    pub status: GameStatus,
    pub power: PowerMode,
    /// Simulation clock
    pub time_ms: f64,
    pub time_ticks: u64,
    /// Events raised by the last tick
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new game with default tuning
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        Self::with_maze(seed, tuning, Maze::classic())
    }

    /// Create a game on a prepared grid. `reset` restores this grid.
    pub fn with_maze(seed: u64, tuning: Tuning, maze: Maze) -> Self {
        let mut state = Self {
            seed,
            tuning: tuning.sanitized(),
            rng: Pcg32::seed_from_u64(seed),
            layout: maze.clone(),
            maze,
            player: Player::spawn(),
            pursuers: Vec::new(),
            score: 0,
            lives: STARTING_LIVES,
            status: GameStatus::Playing,
            power: PowerMode::default(),
            time_ms: 0.0,
            time_ticks: 0,
            events: Vec::new(),
        };
        state.reset();
        state
    }

    // === Commands ===

    /// Queue a heading for the player; applied at the next open intersection
    pub fn request_direction(&mut self, dir: Direction) {
        self.player.body.next_dir = Some(dir);
    }

    /// Restore grid, agents, score, lives and status to start-of-game values
    pub fn reset(&mut self) {
        self.maze = self.layout.clone();
        self.player = Player::spawn();
        self.pursuers = (0..PURSUER_COUNT).map(Pursuer::spawn).collect();
        self.score = 0;
        self.lives = STARTING_LIVES;
        self.power = PowerMode::default();
        self.time_ms = 0.0;
        self.time_ticks = 0;
        self.events.clear();
        self.status = if self.maze.remaining_collectibles() == 0 {
            GameStatus::Won
        } else {
            GameStatus::Playing
        };
        log::info!(
            "Game reset (seed {}, {} collectibles)",
            self.seed,
            self.maze.remaining_collectibles()
        );
    }

    /// Advance the simulation by `elapsed_ms` of wall time
    pub fn tick(&mut self, elapsed_ms: f32) -> GameStatus {
        super::tick::tick(self, elapsed_ms)
    }

    // === Queries ===

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn pursuers(&self) -> &[Pursuer] {
        &self.pursuers
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn lives(&self) -> u8 {
        self.lives
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn power_active(&self) -> bool {
        self.power.active
    }

    pub fn power_remaining_fraction(&self) -> f32 {
        self.power.remaining_fraction()
    }

    pub fn power_ending_soon(&self) -> bool {
        self.power.ending_soon()
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            score: self.score,
            lives: self.lives,
            status: self.status,
            power_active: self.power.active,
            power_remaining_fraction: self.power.remaining_fraction(),
            power_ending_soon: self.power.ending_soon(),
            remaining_collectibles: self.maze.remaining_collectibles(),
            player: PlayerView {
                pos: self.player.body.pos,
                dir: self.player.body.dir,
                mouth_phase: self.player.mouth_phase,
            },
            pursuers: self
                .pursuers
                .iter()
                .map(|p| PursuerView {
                    index: p.index,
                    color: p.color,
                    personality: p.personality,
                    pos: p.body.pos,
                    dir: p.body.dir,
                    mode: p.mode,
                })
                .collect(),
        }
    }

    // === Transitions used by the tick ===

    /// Start (or restart) power mode; every pursuer not already eaten turns scared
    pub(crate) fn activate_power_mode(&mut self) {
        self.power.start(self.tuning.power_duration_ticks);
        for pursuer in &mut self.pursuers {
            if pursuer.mode != PursuerMode::Eaten {
                pursuer.mode = PursuerMode::Scared;
            }
        }
        log::debug!("Power mode on for {} ticks", self.power.duration_ticks);
    }

    /// End power mode; scared and eaten pursuers go back to normal together
    pub(crate) fn end_power_mode(&mut self) {
        self.power.stop();
        for pursuer in &mut self.pursuers {
            pursuer.mode = PursuerMode::Normal;
        }
        self.events.push(GameEvent::PowerModeEnded);
        log::debug!("Power mode over");
    }

    /// Put the player and every pursuer back on their spawn cells
    pub(crate) fn respawn_agents(&mut self) {
        self.player = Player::spawn();
        for pursuer in &mut self.pursuers {
            pursuer.mode = PursuerMode::Normal;
            pursuer.respawn();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell_center;

    #[test]
    fn test_new_game() {
        let state = GameState::new(42);
        assert_eq!(state.status(), GameStatus::Playing);
        assert_eq!(state.lives(), STARTING_LIVES);
        assert_eq!(state.score(), 0);
        assert_eq!(state.pursuers().len(), PURSUER_COUNT);
        assert_eq!(state.player().body.pos, cell_center(PLAYER_SPAWN));
        assert!(!state.power_active());

        let personalities: Vec<_> = state.pursuers().iter().map(|p| p.personality).collect();
        assert_eq!(
            personalities,
            vec![
                Personality::DirectChase,
                Personality::Intercept,
                Personality::Ambush,
                Personality::PatrolScatter,
            ]
        );
        for pursuer in state.pursuers() {
            assert_eq!(pursuer.body.pos, pursuer.spawn_position());
            assert!(pursuer.spawn_push.is_some());
            assert!(!pursuer.escaped);
        }
    }

    #[test]
    fn test_power_mode_countdown() {
        let mut power = PowerMode::default();
        assert_eq!(power.remaining_fraction(), 0.0);
        assert!(!power.tick_down());

        power.start(9);
        assert!(power.active);
        assert_eq!(power.remaining_fraction(), 1.0);
        assert!(!power.ending_soon());

        for _ in 0..5 {
            assert!(!power.tick_down());
        }
        // 3 of 9 left: final third
        assert!(!power.tick_down());
        assert!(power.ending_soon());

        assert!(!power.tick_down());
        assert!(!power.tick_down());
        assert!(power.tick_down());
        assert!(!power.active);
        assert!(!power.ending_soon());
    }

    #[test]
    fn test_power_transitions_are_atomic() {
        let mut state = GameState::new(1);
        state.pursuers[2].mode = PursuerMode::Eaten;

        state.activate_power_mode();
        assert!(state.power_active());
        for pursuer in state.pursuers() {
            if pursuer.index == 2 {
                assert_eq!(pursuer.mode, PursuerMode::Eaten);
            } else {
                assert_eq!(pursuer.mode, PursuerMode::Scared);
            }
        }

        state.end_power_mode();
        assert!(!state.power_active());
        assert!(state.pursuers().iter().all(|p| p.mode == PursuerMode::Normal));
        assert_eq!(state.events(), &[GameEvent::PowerModeEnded]);
    }

    #[test]
    fn test_respawn_keeps_mode() {
        let mut pursuer = Pursuer::spawn(3);
        pursuer.body.pos += Vec2::new(40.0, 0.0);
        pursuer.escaped = true;
        pursuer.spawn_push = None;
        pursuer.mode = PursuerMode::Eaten;

        pursuer.respawn();
        assert_eq!(pursuer.mode, PursuerMode::Eaten);
        assert_eq!(pursuer.body.pos, pursuer.spawn_position());
        assert!(!pursuer.escaped);
        assert_eq!(pursuer.spawn_push, Some(PURSUER_SPAWN_PUSH[3]));
    }

    #[test]
    fn test_reset_restores_prepared_maze() {
        let mut state = GameState::new(5);
        let full = state.maze().remaining_collectibles();
        state.maze.consume_collectible(1, 1);
        state.score = 10;
        state.lives = 1;

        state.reset();
        assert_eq!(state.maze().remaining_collectibles(), full);
        assert_eq!(state.score(), 0);
        assert_eq!(state.lives(), STARTING_LIVES);
    }

    #[test]
    fn test_snapshot_serializes() {
        let state = GameState::new(7);
        let snapshot = state.snapshot();
        assert_eq!(snapshot.pursuers.len(), PURSUER_COUNT);
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"status\":\"Playing\""));
    }

    #[test]
    fn test_state_round_trips_through_json() {
        let state = GameState::new(11);
        let json = serde_json::to_string(&state).unwrap();
        let restored: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.seed, 11);
        assert_eq!(restored.maze, state.maze);
        assert_eq!(restored.pursuers.len(), PURSUER_COUNT);
    }
}

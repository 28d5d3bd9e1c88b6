//! Maze Chase - simulation engine for a grid-based arcade chase game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (maze, motion, pursuer AI, collisions, game state)
//! - `tuning`: Data-driven game balance
//!
//! Rendering, input translation and the UI shell live outside this crate. They
//! talk to the engine through the command/query surface on [`sim::GameState`].

pub mod sim;
pub mod tuning;

pub use tuning::Tuning;

use glam::{IVec2, Vec2};

/// Game configuration constants
pub mod consts {
    use glam::IVec2;

    use crate::sim::Direction;

    /// Duration of one nominal frame. Speeds are expressed per frame.
    pub const FRAME_MS: f32 = 1000.0 / 60.0;
    /// Largest frame scale a single tick may apply (long stalls are clamped)
    pub const MAX_FRAME_SCALE: f32 = 3.0;

    /// Side length of one maze cell in position units
    pub const CELL_SIZE: f32 = 20.0;
    /// Maze dimensions, in cells
    pub const MAZE_WIDTH: i32 = 19;
    pub const MAZE_HEIGHT: i32 = 21;

    /// Maze layout. `#` wall, `.` dot, `o` power pellet, anything else empty.
    pub const MAZE_TEMPLATE: [&str; MAZE_HEIGHT as usize] = [
        "###################",
        "#........#........#",
        "#o##.###.#.###.##o#",
        "#.................#",
        "#.##.#.#####.#.##.#",
        "#....#...#...#....#",
        "####.### # ###.####",
        "####.#       #.####",
        "####.# ## ## #.####",
        "    .         .    ",
        "####.# ##### #.####",
        "####.#       #.####",
        "####.# ##### #.####",
        "#........#........#",
        "#.##.###.#.###.##.#",
        "#o.#..... .....#.o#",
        "##.#.#.#####.#.#.##",
        "#....#...#...#....#",
        "#.######.#.######.#",
        "#.................#",
        "###################",
    ];

    /// Row whose outer columns wrap around to each other
    pub const TUNNEL_ROW: i32 = 9;
    /// Pursuer pen, inclusive cell bounds
    pub const PEN_MIN: IVec2 = IVec2::new(8, 8);
    pub const PEN_MAX: IVec2 = IVec2::new(10, 9);
    /// The single opening in the pen roof
    pub const PEN_EXIT: IVec2 = IVec2::new(9, 8);

    /// Player spawn cell and heading
    pub const PLAYER_SPAWN: IVec2 = IVec2::new(9, 15);
    pub const PLAYER_SPAWN_DIR: Direction = Direction::Left;

    /// Number of pursuers
    pub const PURSUER_COUNT: usize = 4;
    /// Pursuer spawn cells, by index
    pub const PURSUER_SPAWNS: [IVec2; PURSUER_COUNT] = [
        IVec2::new(9, 7),
        IVec2::new(9, 9),
        IVec2::new(8, 9),
        IVec2::new(10, 9),
    ];
    /// Direction each pursuer is pushed in on its first tick out of spawn
    pub const PURSUER_SPAWN_PUSH: [Direction; PURSUER_COUNT] = [
        Direction::Left,
        Direction::Up,
        Direction::Left,
        Direction::Right,
    ];
    /// Pursuer body colors (0xRRGGBB)
    pub const PURSUER_COLORS: [u32; PURSUER_COUNT] = [0xFF0000, 0xFFB8FF, 0x00FFFF, 0xFFB852];

    /// Agent speeds, in position units per frame
    pub const PLAYER_SPEED: f32 = 2.0;
    pub const PURSUER_SPEED: f32 = 1.8;
    pub const PURSUER_SCARED_SPEED: f32 = 1.0;

    /// Radius used for wall probing at the leading edge
    pub const AGENT_RADIUS: f32 = 8.0;
    /// Fraction of the perpendicular offset removed per move
    pub const LANE_CORRECTION: f32 = 0.5;
    /// Euclidean distance below which player and pursuer touch
    pub const CONTACT_DISTANCE: f32 = 15.0;

    /// Mouth animation cycles per frame while moving
    pub const MOUTH_SPEED: f32 = 0.08;

    /// Score values
    pub const DOT_SCORE: u32 = 10;
    pub const POWER_PELLET_SCORE: u32 = 50;
    pub const PURSUER_SCORE: u32 = 200;

    pub const STARTING_LIVES: u8 = 3;

    /// Power mode duration in ticks (6 seconds at 60 Hz)
    pub const POWER_DURATION_TICKS: u32 = 6 * 60;

    /// Minimum time between two pursuer direction changes
    pub const DIRECTION_CHANGE_INTERVAL_MS: f32 = 200.0;
    /// Chance a pursuer takes its best-ranked direction
    pub const BEST_CHOICE_PROBABILITY: f32 = 0.97;
    /// Cells ahead of the player the Intercept pursuer aims for
    pub const INTERCEPT_LEAD: i32 = 4;
    /// Cells ahead of the player used as the Ambush pivot
    pub const AMBUSH_LEAD: i32 = 2;
    /// PatrolScatter stops chasing inside this many cells of the player
    pub const SCATTER_RADIUS: f32 = 8.0;
    /// Corner PatrolScatter retreats to
    pub const SCATTER_CORNER: IVec2 = IVec2::new(0, MAZE_HEIGHT - 1);

    /// Stuck detection: positions kept, displacement floor, tick threshold, push
    pub const STUCK_HISTORY: usize = 10;
    pub const STUCK_DISPLACEMENT: f32 = 2.0;
    pub const STUCK_TICKS: u32 = 20;
    pub const STUCK_PUSH: f32 = 2.0;

    /// Ring radius searched when pulling an agent out of a wall
    pub const WALL_RESCUE_RADIUS: i32 = 3;
}

use consts::CELL_SIZE;

/// Center point of a cell, in position units
#[inline]
pub fn cell_center(cell: IVec2) -> Vec2 {
    (cell.as_vec2() + Vec2::splat(0.5)) * CELL_SIZE
}

/// Cell containing a position (floor division, so negative coordinates map outside the grid)
#[inline]
pub fn cell_of(pos: Vec2) -> IVec2 {
    (pos / CELL_SIZE).floor().as_ivec2()
}

/// Manhattan distance between two cells
#[inline]
pub fn manhattan(a: IVec2, b: IVec2) -> i32 {
    (a - b).abs().element_sum()
}

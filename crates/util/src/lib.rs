//! Core type aliases, identity types, and tuning constants for quadfall.
//!
//! This crate provides the foundational types and configuration parameters
//! used throughout the quadfall workspace.

// ============================================================================
// TYPE ALIASES
// ============================================================================
/// A single playfield cell: 0 = empty, 1..=7 = the piece kind that filled it.
pub type Cell = u8;
/// One playfield row, left to right.
pub type Row = [Cell; BOARD_COLS];
/// The full playfield matrix, top row first.
pub type Grid = [Row; BOARD_ROWS];
/// In-room player identity, assigned monotonically and never reused.
pub type PlayerId = usize;
/// Score bookkeeping unit.
pub type Points = u32;
/// Level and line counters.
pub type Level = u32;

/// An all-empty playfield.
pub const EMPTY_GRID: Grid = [[0; BOARD_COLS]; BOARD_ROWS];

// ============================================================================
// TRAITS
// ============================================================================
/// Unique identifier trait for domain entities.
pub trait Unique<T = Self> {
    fn id(&self) -> ID<T>;
}

// ============================================================================
// IDENTITY TYPES
// ============================================================================
use std::cmp::Ordering;
use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::hash::Hash;
use std::hash::Hasher;
use std::marker::PhantomData;

/// Generic ID wrapper providing compile-time type safety over uuid::Uuid.
/// Rooms and transport connections get distinct ID spaces for free.
pub struct ID<T> {
    inner: uuid::Uuid,
    marker: PhantomData<T>,
}

impl<T> ID<T> {
    pub fn inner(&self) -> uuid::Uuid {
        self.inner
    }
    /// Cast ID<T> to ID<U> while preserving the underlying UUID.
    pub fn cast<U>(self) -> ID<U> {
        ID {
            inner: self.inner,
            marker: PhantomData,
        }
    }
}

impl<T> From<ID<T>> for uuid::Uuid {
    fn from(id: ID<T>) -> Self {
        id.inner()
    }
}
impl<T> From<uuid::Uuid> for ID<T> {
    fn from(inner: uuid::Uuid) -> Self {
        Self {
            inner,
            marker: PhantomData,
        }
    }
}

impl<T> Default for ID<T> {
    fn default() -> Self {
        Self {
            inner: uuid::Uuid::now_v7(),
            marker: PhantomData,
        }
    }
}

impl<T> Copy for ID<T> {}
impl<T> Clone for ID<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Eq for ID<T> {}
impl<T> PartialEq for ID<T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T> Ord for ID<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp(&other.inner)
    }
}
impl<T> PartialOrd for ID<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Hash for ID<T> {
    fn hash<H>(&self, state: &mut H)
    where
        H: Hasher,
    {
        self.inner.hash(state);
    }
}

impl<T> Debug for ID<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ID").field(&self.inner).finish()
    }
}
impl<T> Display for ID<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.inner, f)
    }
}

// ============================================================================
// PLAYFIELD GEOMETRY
// ============================================================================
/// Playfield width in cells.
pub const BOARD_COLS: usize = 10;
/// Playfield height in cells.
pub const BOARD_ROWS: usize = 20;
/// Number of distinct piece kinds.
pub const PIECE_KINDS: usize = 7;

// ============================================================================
// PIECE SEQUENCING
// Every room member consumes the same shuffled sets, in the same order.
// ============================================================================
/// Copies of each kind per set: one set is a shuffle of 7 × 7 = 49 pieces.
pub const BAG_COPIES: usize = 7;
/// Pieces per set.
pub const BAG_SET_LEN: usize = PIECE_KINDS * BAG_COPIES;
/// Low-water mark: with this few pieces left in the final queued set,
/// the owner should request another set before the cursor runs dry.
pub const BAG_LOW_WATER: usize = 15;

// ============================================================================
// MOVEMENT & SCORING
// Fixture-pinned: an I-piece hard drop on an empty board scores 36, a
// single line adds 100, a tetris adds 800, all scaled by level.
// ============================================================================
/// Points per row for a manual soft drop.
pub const SCORE_SOFT_DROP: Points = 1;
/// Points per row for a gravity tick.
pub const SCORE_GRAVITY: Points = 0;
/// Points per row for a hard drop.
pub const SCORE_HARD_DROP: Points = 2;
/// Points awarded for clearing 1, 2, 3, or 4 lines, before level scaling.
pub const LINE_SCORES: [Points; 4] = [100, 300, 500, 800];
/// Lines to clear before the level increments.
pub const LINES_PER_LEVEL: Level = 10;
/// Upward kick attempts allowed per spawned piece.
pub const FLOOR_KICKS_PER_PIECE: u8 = 2;

// ============================================================================
// POWER-UPS
// ============================================================================
/// Chance of a power-up offer on a nonzero line clear (multiplayer only).
pub const POWER_UP_CHANCE: f64 = 0.25;
/// Inventory cap; offers beyond it are dropped.
pub const POWER_UP_CAP: usize = 3;
/// Minimum rows kept clear above the stack when a board swap moves the
/// falling piece, so the swap alone cannot end the game.
pub const SWAP_SAFETY_GAP: usize = 4;

// ============================================================================
// ROOM LIFECYCLE
// ============================================================================
/// Seats in a multiplayer room.
pub const MULTI_CAPACITY: usize = 4;
/// Seats in a solo room.
pub const SINGLE_CAPACITY: usize = 1;
/// Members required before a multiplayer ready-check can pass.
pub const MULTI_MIN_PLAYERS: usize = 2;
/// Countdown ticks broadcast before a game starts.
pub const COUNTDOWN_TICKS: u32 = 3;
/// Delay before the first countdown tick; shorter than the interval to
/// normalize perceived start latency across clients.
pub const COUNTDOWN_FIRST_DELAY: std::time::Duration = std::time::Duration::from_millis(700);
/// Interval between countdown ticks.
pub const COUNTDOWN_INTERVAL: std::time::Duration = std::time::Duration::from_secs(1);

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Initialize dual logging (terminal + file) with timestamped log files.
/// Creates `logs/` directory and writes DEBUG level to file, INFO to terminal.
#[cfg(feature = "logging")]
pub fn log() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}

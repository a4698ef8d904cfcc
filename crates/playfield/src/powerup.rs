//! Board-transformation power-ups.
//!
//! Every transform is a pure function of its grid inputs (plus an
//! explicit Rng where the effect is random), so the room can apply one
//! to any pair of members and re-broadcast the results without hidden
//! coupling to board internals.

use qf_core::*;
use serde::Deserialize;
use serde::Serialize;

/// Power-up type tag carried in inventories and on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum PowerUpKind {
    SwapLines = 1,
    SwapBoards = 2,
    ScrambleBoard = 3,
    ClearBoard = 4,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 4] = [
        PowerUpKind::SwapLines,
        PowerUpKind::SwapBoards,
        PowerUpKind::ScrambleBoard,
        PowerUpKind::ClearBoard,
    ];

    /// Uniformly random kind, for acquisition offers.
    pub fn random(rng: &mut impl rand::Rng) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

impl From<PowerUpKind> for u8 {
    fn from(kind: PowerUpKind) -> Self {
        kind as u8
    }
}
impl TryFrom<u8> for PowerUpKind {
    type Error = String;
    fn try_from(id: u8) -> Result<Self, Self::Error> {
        PowerUpKind::ALL
            .into_iter()
            .find(|k| *k as u8 == id)
            .ok_or_else(|| format!("invalid power-up id: {}", id))
    }
}
impl std::fmt::Display for PowerUpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            PowerUpKind::SwapLines => write!(f, "swap lines"),
            PowerUpKind::SwapBoards => write!(f, "swap boards"),
            PowerUpKind::ScrambleBoard => write!(f, "scramble board"),
            PowerUpKind::ClearBoard => write!(f, "clear board"),
        }
    }
}

/// Applies a power-up to the (source, target) grid pair, returning the
/// transformed pair. Single-board effects leave the source untouched.
pub fn apply(
    kind: PowerUpKind,
    source: Grid,
    target: Grid,
    rng: &mut impl rand::Rng,
) -> (Grid, Grid) {
    match kind {
        PowerUpKind::SwapLines => swap_lines(source, target),
        PowerUpKind::SwapBoards => swap_boards(source, target),
        PowerUpKind::ScrambleBoard => (source, scramble_board(target, rng)),
        PowerUpKind::ClearBoard => (source, clear_board(target)),
    }
}

/// Rows at or below a grid's highest occupied cell — its stack.
fn stack(grid: &Grid) -> Vec<Row> {
    grid.iter()
        .skip_while(|row| row.iter().all(|&cell| cell == 0))
        .copied()
        .collect()
}

/// Rebuilds a grid from stack rows, bottom-aligned under blank rows.
fn from_stack(rows: &[Row]) -> Grid {
    let mut grid = EMPTY_GRID;
    grid[BOARD_ROWS - rows.len()..].copy_from_slice(rows);
    grid
}

/// Exchanges the two boards' stacks. Each side receives the other's rows
/// in full, so unequal fill heights swap asymmetrically.
pub fn swap_lines(a: Grid, b: Grid) -> (Grid, Grid) {
    (from_stack(&stack(&b)), from_stack(&stack(&a)))
}

/// Full grid exchange.
pub fn swap_boards(a: Grid, b: Grid) -> (Grid, Grid) {
    (b, a)
}

/// Randomly permutes cell positions, preserving the multiset of values.
pub fn scramble_board(grid: Grid, rng: &mut impl rand::Rng) -> Grid {
    use rand::seq::SliceRandom;
    let mut cells: Vec<Cell> = grid.iter().flatten().copied().collect();
    cells.shuffle(rng);
    let mut out = EMPTY_GRID;
    for (i, cell) in cells.into_iter().enumerate() {
        out[i / BOARD_COLS][i % BOARD_COLS] = cell;
    }
    out
}

/// Resets a grid to empty.
pub fn clear_board(_: Grid) -> Grid {
    EMPTY_GRID
}

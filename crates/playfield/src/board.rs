use super::PieceBag;
use super::Piece;
use super::Spin;
use super::kick_offsets;
use qf_core::*;

/// What a board mutation did, accumulated across any cascaded lock,
/// clear, and respawn. The room layer turns these into wire traffic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Points earned by the movement itself (not line clears).
    pub points: Points,
    /// Full rows removed by a cascaded lock.
    pub cleared: u32,
    /// The falling piece was committed to the grid.
    pub locked: bool,
    /// The respawn after a lock was blocked: terminal for this player.
    pub topped_out: bool,
}

/// One player's authoritative playfield.
///
/// The grid is only ever written by a lock or a full replacement; pieces
/// move by validation against it. All randomness lives in the bag, which
/// the room feeds, so identical command replays against identically
/// seeded boards converge cell for cell.
#[derive(Debug, Clone)]
pub struct Board {
    grid: Grid,
    piece: Piece,
    next: Piece,
    bag: PieceBag,
    floor_kicks: u8,
}

impl Board {
    /// Builds a board over a seeded bag and spawns the first two pieces.
    pub fn new(mut bag: PieceBag) -> Self {
        let piece = Piece::spawn(bag.next_piece());
        let next = Piece::spawn(bag.next_piece());
        Self {
            grid: EMPTY_GRID,
            piece,
            next,
            bag,
            floor_kicks: FLOOR_KICKS_PER_PIECE,
        }
    }
    pub fn grid(&self) -> &Grid {
        &self.grid
    }
    pub fn piece(&self) -> &Piece {
        &self.piece
    }
    pub fn next_piece(&self) -> &Piece {
        &self.next
    }
    /// Appends a shared set to this board's piece source.
    pub fn push_set(&mut self, set: Vec<super::PieceKind>) {
        self.bag.push_set(set);
    }
    /// True when the room should be asked for another set.
    pub fn bag_almost_empty(&self) -> bool {
        self.bag.almost_empty()
    }

    /// Whether the falling piece, displaced by (dx, dy), sits fully
    /// in-bounds over empty cells.
    fn fits(&self, piece: &Piece, dx: i32, dy: i32) -> bool {
        piece.occupied().all(|(row, col)| {
            let (r, c) = (row + dy, col + dx);
            (0..BOARD_ROWS as i32).contains(&r)
                && (0..BOARD_COLS as i32).contains(&c)
                && self.grid[r as usize][c as usize] == 0
        })
    }

    /// Translates the falling piece, scoring downward motion at the given
    /// multiplier. A blocked downward move locks instead of rejecting
    /// unless it came from a manual soft drop, whose multiplier is the
    /// base one — a blocked gravity tick or drop must commit, a blocked
    /// key press must not.
    pub fn shift(&mut self, dx: i32, dy: i32, multiplier: Points) -> StepReport {
        if self.fits(&self.piece, dx, dy) {
            self.piece.translate(dx, dy);
            StepReport {
                points: if dy > 0 { dy as Points * multiplier } else { 0 },
                ..StepReport::default()
            }
        } else if dy > 0 && multiplier != SCORE_SOFT_DROP {
            self.lock()
        } else {
            StepReport::default()
        }
    }

    /// Drops the piece as far as it legally goes, scores the distance at
    /// the hard-drop multiplier, and locks.
    pub fn hard_drop(&mut self) -> StepReport {
        let mut fall = 0;
        while self.fits(&self.piece, 0, fall + 1) {
            fall += 1;
        }
        self.piece.translate(0, fall);
        let mut report = self.lock();
        report.points += fall as Points * SCORE_HARD_DROP;
        report
    }

    /// Rotates with wall-kick retries.
    ///
    /// The offset row for (long?, spin, current state) is tried strictly
    /// in table order and the first fitting candidate wins. Upward
    /// offsets are skipped once the spawn's floor-kick budget is spent.
    /// When nothing fits, piece and grid are exactly as before the call.
    pub fn rotate(&mut self, spin: Spin) -> bool {
        let before = self.piece.clone();
        self.piece.rotate(spin);
        for &(dx, dy) in kick_offsets(before.kind().is_long(), spin, before.rotation()) {
            if dy < 0 && self.floor_kicks == 0 {
                continue;
            }
            if self.fits(&self.piece, dx, dy) {
                self.piece.translate(dx, dy);
                if dy < 0 {
                    self.floor_kicks -= 1;
                }
                return true;
            }
        }
        self.piece = before;
        false
    }

    /// Bakes the falling piece into the grid, clears lines, respawns.
    fn lock(&mut self) -> StepReport {
        for (row, col) in self.piece.occupied() {
            debug_assert!((0..BOARD_ROWS as i32).contains(&row));
            self.grid[row as usize][col as usize] = self.piece.kind().cell();
        }
        let cleared = self.clear_lines();
        let topped_out = !self.spawn();
        StepReport {
            points: 0,
            cleared,
            locked: true,
            topped_out,
        }
    }

    /// Removes every full row, unshifting blank rows at the top so the
    /// row count never changes. Returns how many were removed.
    fn clear_lines(&mut self) -> u32 {
        let kept: Vec<Row> = self
            .grid
            .iter()
            .copied()
            .filter(|row| row.iter().any(|&cell| cell == 0))
            .collect();
        let cleared = BOARD_ROWS - kept.len();
        if cleared > 0 {
            let mut grid = EMPTY_GRID;
            grid[cleared..].copy_from_slice(&kept);
            self.grid = grid;
        }
        cleared as u32
    }

    /// Promotes the queued piece and draws a replacement. Returns false
    /// when the fresh piece is already blocked, which is this player's
    /// terminal signal rather than an error.
    fn spawn(&mut self) -> bool {
        self.piece = std::mem::replace(&mut self.next, Piece::spawn(self.bag.next_piece()));
        self.floor_kicks = FLOOR_KICKS_PER_PIECE;
        self.fits(&self.piece, 0, 0)
    }

    /// Swaps in a new grid, first nudging the falling piece upward so at
    /// least the safety gap separates it from the incoming stack. Without
    /// the nudge a board-swap power-up could end the game on the spot.
    pub fn replace_grid(&mut self, grid: Grid) {
        let bottom = self.piece.occupied().map(|(row, _)| row).max();
        let top = self.piece.occupied().map(|(row, _)| row).min();
        if let (Some(bottom), Some(top)) = (bottom, top) {
            let span: Vec<i32> = self.piece.occupied().map(|(_, col)| col).collect();
            let stack_top = (0..BOARD_ROWS as i32)
                .find(|&row| {
                    span.iter()
                        .any(|&col| grid[row as usize][col as usize] != 0)
                })
                .unwrap_or(BOARD_ROWS as i32);
            let gap = stack_top - bottom - 1;
            if gap < SWAP_SAFETY_GAP as i32 {
                let lift = SWAP_SAFETY_GAP as i32 - gap;
                // Clamp so the piece's top cell stays on the board.
                let dy = -lift.min(top);
                self.piece.translate(0, dy);
            }
        }
        self.grid = grid;
    }

    /// Overwrites the grid with no piece adjustment, for staging board
    /// positions directly. Gameplay swaps go through [`Self::replace_grid`].
    pub fn set_grid(&mut self, grid: Grid) {
        self.grid = grid;
    }
}

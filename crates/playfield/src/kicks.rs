use super::Spin;

/// Candidate (dx, dy) displacements tried, in order, when a rotation's
/// naive placement is blocked. Grid coordinates grow downward, so a
/// negative dy is a floor kick and counts against the per-spawn budget.
pub type KickRow = [(i32, i32); 5];

/// Offset tests for the three-wide pieces, indexed by [spin][rotation
/// state before the turn].
const KICKS: [[KickRow; 4]; 2] = [
    // Spin::Right
    [
        [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],
        [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],
        [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],
        [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)],
    ],
    // Spin::Left
    [
        [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],
        [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],
        [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],
        [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)],
    ],
];

/// Offset tests for the long piece, whose wider matrix kicks further.
const KICKS_LONG: [[KickRow; 4]; 2] = [
    // Spin::Right
    [
        [(0, 0), (-2, 0), (1, 0), (-2, 1), (1, -2)],
        [(0, 0), (-1, 0), (2, 0), (-1, -2), (2, 1)],
        [(0, 0), (2, 0), (-1, 0), (2, -1), (-1, 2)],
        [(0, 0), (1, 0), (-2, 0), (1, 2), (-2, -1)],
    ],
    // Spin::Left
    [
        [(0, 0), (-1, 0), (2, 0), (-1, -2), (2, 1)],
        [(0, 0), (2, 0), (-1, 0), (2, -1), (-1, 2)],
        [(0, 0), (1, 0), (-2, 0), (1, 2), (-2, -1)],
        [(0, 0), (-2, 0), (1, 0), (-2, 1), (1, -2)],
    ],
];

/// Looks up the kick row for (long piece?, direction, rotation state).
pub fn kick_offsets(long: bool, spin: Spin, state: u8) -> &'static KickRow {
    let table = if long { &KICKS_LONG } else { &KICKS };
    let dir = match spin {
        Spin::Right => 0,
        Spin::Left => 1,
    };
    &table[dir][state as usize % 4]
}

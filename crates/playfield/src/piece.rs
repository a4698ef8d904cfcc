use qf_core::*;
use serde::Deserialize;
use serde::Serialize;

/// One of the seven tetromino kinds.
///
/// The discriminant doubles as the cell color id baked into the grid, so
/// `0` stays reserved for empty cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum PieceKind {
    I = 1,
    O = 2,
    T = 3,
    S = 4,
    Z = 5,
    J = 6,
    L = 7,
}

impl PieceKind {
    pub const ALL: [PieceKind; PIECE_KINDS] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Cell id this kind writes into the grid.
    pub fn cell(self) -> Cell {
        self as u8
    }
    /// Side length of this kind's cell matrix.
    pub fn size(self) -> usize {
        match self {
            PieceKind::I | PieceKind::O => 4,
            _ => 3,
        }
    }
    /// True for the long piece, which rotates against its own kick table.
    pub fn is_long(self) -> bool {
        matches!(self, PieceKind::I)
    }
    /// Cell matrix at rotation state 0.
    pub fn shape(self) -> Vec<Vec<Cell>> {
        let x = self.cell();
        match self {
            PieceKind::I => vec![
                vec![0, 0, 0, 0],
                vec![x, x, x, x],
                vec![0, 0, 0, 0],
                vec![0, 0, 0, 0],
            ],
            PieceKind::O => vec![
                vec![0, 0, 0, 0],
                vec![0, x, x, 0],
                vec![0, x, x, 0],
                vec![0, 0, 0, 0],
            ],
            PieceKind::T => vec![
                vec![0, x, 0], //
                vec![x, x, x],
                vec![0, 0, 0],
            ],
            PieceKind::S => vec![
                vec![0, x, x], //
                vec![x, x, 0],
                vec![0, 0, 0],
            ],
            PieceKind::Z => vec![
                vec![x, x, 0], //
                vec![0, x, x],
                vec![0, 0, 0],
            ],
            PieceKind::J => vec![
                vec![x, 0, 0], //
                vec![x, x, x],
                vec![0, 0, 0],
            ],
            PieceKind::L => vec![
                vec![0, 0, x], //
                vec![x, x, x],
                vec![0, 0, 0],
            ],
        }
    }
}

impl From<PieceKind> for u8 {
    fn from(kind: PieceKind) -> Self {
        kind.cell()
    }
}
impl TryFrom<u8> for PieceKind {
    type Error = String;
    fn try_from(id: u8) -> Result<Self, Self::Error> {
        PieceKind::ALL
            .into_iter()
            .find(|k| k.cell() == id)
            .ok_or_else(|| format!("invalid piece id: {}", id))
    }
}
impl std::fmt::Display for PieceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let c = match self {
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::T => 'T',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
        };
        write!(f, "{}", c)
    }
}

/// Rotation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spin {
    Left,
    Right,
}

/// The falling piece: kind, rotation state, cell matrix, and grid origin.
///
/// Created on spawn, mutated in place by move and rotate, discarded once
/// its cells are baked into the grid on lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    kind: PieceKind,
    rotation: u8,
    cells: Vec<Vec<Cell>>,
    x: i32,
    y: i32,
}

impl Piece {
    /// Places a fresh piece of the given kind at its spawn origin,
    /// horizontally centered on the top row.
    pub fn spawn(kind: PieceKind) -> Self {
        Self {
            kind,
            rotation: 0,
            cells: kind.shape(),
            x: ((BOARD_COLS - kind.size()) / 2) as i32,
            y: 0,
        }
    }
    pub fn kind(&self) -> PieceKind {
        self.kind
    }
    /// Rotation state, 0..=3.
    pub fn rotation(&self) -> u8 {
        self.rotation
    }
    pub fn cells(&self) -> &[Vec<Cell>] {
        &self.cells
    }
    pub fn x(&self) -> i32 {
        self.x
    }
    pub fn y(&self) -> i32 {
        self.y
    }
    /// Moves the origin by (dx, dy). Validity is the board's concern.
    pub fn translate(&mut self, dx: i32, dy: i32) {
        self.x += dx;
        self.y += dy;
    }
    /// Rotates the cell matrix a quarter turn in place.
    pub fn rotate(&mut self, spin: Spin) {
        let n = self.cells.len();
        let old = self.cells.clone();
        for (i, row) in self.cells.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = match spin {
                    Spin::Right => old[n - 1 - j][i],
                    Spin::Left => old[j][n - 1 - i],
                };
            }
        }
        self.rotation = match spin {
            Spin::Right => (self.rotation + 1) % 4,
            Spin::Left => (self.rotation + 3) % 4,
        };
    }
    /// Filled cells as absolute (row, col) grid coordinates.
    pub fn occupied(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.cells.iter().enumerate().flat_map(move |(i, row)| {
            row.iter()
                .enumerate()
                .filter(|&(_, &cell)| cell != 0)
                .map(move |(j, _)| (self.y + i as i32, self.x + j as i32))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip() {
        for kind in PieceKind::ALL {
            assert_eq!(PieceKind::try_from(u8::from(kind)).unwrap(), kind);
        }
        assert!(PieceKind::try_from(0).is_err());
        assert!(PieceKind::try_from(8).is_err());
    }

    #[test]
    fn four_rotations_restore_every_kind() {
        for kind in PieceKind::ALL {
            for spin in [Spin::Left, Spin::Right] {
                let mut piece = Piece::spawn(kind);
                let original = piece.clone();
                for _ in 0..4 {
                    piece.rotate(spin);
                }
                assert_eq!(piece, original, "{} via {:?}", kind, spin);
            }
        }
    }

    #[test]
    fn spawn_is_centered() {
        let long = Piece::spawn(PieceKind::I);
        assert_eq!(long.x(), 3);
        assert_eq!(long.y(), 0);
        let tee = Piece::spawn(PieceKind::T);
        assert_eq!(tee.x(), 3);
    }

    #[test]
    fn long_piece_spawns_across_columns_3_to_6() {
        let cols: Vec<i32> = Piece::spawn(PieceKind::I).occupied().map(|(_, c)| c).collect();
        assert_eq!(cols, vec![3, 4, 5, 6]);
    }
}

use arrayvec::ArrayVec;
use rand::{
    Rng,
    distr::{Distribution, StandardUniform},
    seq::SliceRandom,
};
use serde::{Deserialize, Serialize};

use super::board::{Board, BoardDimensions, Cell};
use crate::InvalidOrientationError;

/// Enum representing the type of piece.
///
/// Kinds are listed in the order the bag is filled: the line piece first, then O, J, L, S, T
/// and Z.
///
/// Parses from its variant name (`"T".parse()`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, derive_more::FromStr,
)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece (the "line" piece).
    I = 0,
    /// O-piece.
    O = 1,
    /// J-piece.
    J = 2,
    /// L-piece.
    L = 3,
    /// S-piece.
    S = 4,
    /// T-piece.
    T = 5,
    /// Z-piece.
    Z = 6,
}

impl Distribution<PieceKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceKind {
        PieceKind::ALL[rng.random_range(0..PieceKind::LEN)]
    }
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    pub const ALL: [Self; Self::LEN] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::J,
        PieceKind::L,
        PieceKind::S,
        PieceKind::T,
        PieceKind::Z,
    ];

    /// Returns all seven kinds in a uniformly random order.
    #[must_use]
    pub fn shuffled_bag<R>(rng: &mut R) -> [Self; Self::LEN]
    where
        R: Rng + ?Sized,
    {
        let mut bag = Self::ALL;
        bag.shuffle(rng);
        bag
    }

    /// Returns the rotation table of this kind.
    #[must_use]
    pub fn shapes(self) -> &'static PieceShapes {
        &PIECE_SHAPES[self as usize]
    }

    /// Number of distinct orientations (1 for O, 2 for I/S/Z, 4 for J/L/T).
    #[must_use]
    pub fn orientations(self) -> usize {
        self.shapes().orientations()
    }

    /// Side length of the square bounding box (4 for I and O, 3 otherwise).
    #[must_use]
    pub fn shape_size(self) -> usize {
        self.shapes().size()
    }

    /// Returns the `(dx, dy)` offsets of the filled cells in the given orientation,
    /// relative to the top-left corner of the bounding box.
    ///
    /// # Panics
    ///
    /// Panics if `orient_index` is not below [`Self::orientations`].
    #[must_use]
    pub fn occupied_offsets(self, orient_index: usize) -> ArrayVec<(i32, i32), 4> {
        let grid = &self.shapes().grids[orient_index];
        let mut offsets = ArrayVec::new();
        for (dy, row) in (0..).zip(grid) {
            for (dx, &filled) in (0..).zip(row) {
                if filled {
                    offsets.push((dx, dy));
                }
            }
        }
        offsets
    }

    /// Returns the single character representation of this piece kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use autostack_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
            PieceKind::S => 'S',
            PieceKind::T => 'T',
            PieceKind::Z => 'Z',
        }
    }

    /// Parses a piece kind from a single character.
    ///
    /// # Examples
    ///
    /// ```
    /// use autostack_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_char('I'), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_char('X'), None);
    /// ```
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(PieceKind::I),
            'O' => Some(PieceKind::O),
            'J' => Some(PieceKind::J),
            'L' => Some(PieceKind::L),
            'S' => Some(PieceKind::S),
            'T' => Some(PieceKind::T),
            'Z' => Some(PieceKind::Z),
            _ => None,
        }
    }
}

/// Filled cells of one orientation, `grid[row][col]`, padded to 4×4.
type ShapeGrid = [[bool; 4]; 4];

/// The read-only rotation table of one piece kind.
///
/// One table per kind lives in a static; pieces only hold the kind and an index into it.
#[derive(Debug)]
pub struct PieceShapes {
    size: usize,
    grids: &'static [ShapeGrid],
}

impl PieceShapes {
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub fn orientations(&self) -> usize {
        self.grids.len()
    }

    /// Returns whether `(row, col)` of the bounding box is filled in the given orientation.
    #[must_use]
    pub fn is_filled(&self, orient_index: usize, row: usize, col: usize) -> bool {
        self.grids[orient_index][row][col]
    }
}

/// Builds a grid from rows of `#` (filled) and `.` (empty).
const fn grid(rows: [&str; 4]) -> ShapeGrid {
    let mut grid = [[false; 4]; 4];
    let mut r = 0;
    while r < 4 {
        let bytes = rows[r].as_bytes();
        let mut c = 0;
        while c < bytes.len() {
            grid[r][c] = bytes[c] == b'#';
            c += 1;
        }
        r += 1;
    }
    grid
}

const I_GRIDS: [ShapeGrid; 2] = [
    grid(["....", "....", "####", "...."]),
    grid(["..#.", "..#.", "..#.", "..#."]),
];

const O_GRIDS: [ShapeGrid; 1] = [grid(["....", ".##.", ".##.", "...."])];

const J_GRIDS: [ShapeGrid; 4] = [
    grid(["...", "###", "..#", ""]),
    grid([".#.", ".#.", "##.", ""]),
    grid(["#..", "###", "...", ""]),
    grid([".##", ".#.", ".#.", ""]),
];

const L_GRIDS: [ShapeGrid; 4] = [
    grid(["...", "###", "#..", ""]),
    grid(["##.", ".#.", ".#.", ""]),
    grid(["..#", "###", "...", ""]),
    grid([".#.", ".#.", ".##", ""]),
];

const S_GRIDS: [ShapeGrid; 2] = [
    grid(["...", ".##", "##.", ""]),
    grid([".#.", ".##", "..#", ""]),
];

const T_GRIDS: [ShapeGrid; 4] = [
    grid(["...", "###", ".#.", ""]),
    grid([".#.", "##.", ".#.", ""]),
    grid([".#.", "###", "...", ""]),
    grid([".#.", ".##", ".#.", ""]),
];

const Z_GRIDS: [ShapeGrid; 2] = [
    grid(["...", "##.", ".##", ""]),
    grid(["..#", ".##", ".#.", ""]),
];

static PIECE_SHAPES: [PieceShapes; PieceKind::LEN] = [
    PieceShapes {
        size: 4,
        grids: &I_GRIDS,
    },
    PieceShapes {
        size: 4,
        grids: &O_GRIDS,
    },
    PieceShapes {
        size: 3,
        grids: &J_GRIDS,
    },
    PieceShapes {
        size: 3,
        grids: &L_GRIDS,
    },
    PieceShapes {
        size: 3,
        grids: &S_GRIDS,
    },
    PieceShapes {
        size: 3,
        grids: &T_GRIDS,
    },
    PieceShapes {
        size: 3,
        grids: &Z_GRIDS,
    },
];

/// A falling piece: a kind, an orientation, and the board position of its bounding box.
///
/// `(x, y)` is the top-left corner of the bounding box in board coordinates (column, row).
/// It may be negative when the empty part of the box hangs over an edge.
///
/// The motion methods move the piece in place and undo the move if the result would collide,
/// returning whether the move happened.
///
/// # Example
///
/// ```
/// use autostack_engine::{Board, Piece, PieceKind};
///
/// let board = Board::standard().unwrap();
/// let mut piece = Piece::spawn(PieceKind::T, &board);
/// assert_eq!((piece.x(), piece.y()), (4, 1));
///
/// while piece.move_left(&board) {}
/// assert_eq!(piece.x(), 0);
///
/// assert!(piece.rotate_cw(&board));
/// assert_eq!(piece.orient_index(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PieceRepr", into = "PieceRepr")]
pub struct Piece {
    kind: PieceKind,
    orient_index: usize,
    x: i32,
    y: i32,
}

#[derive(Serialize, Deserialize)]
struct PieceRepr {
    kind: PieceKind,
    orient_index: usize,
    x: i32,
    y: i32,
}

impl From<Piece> for PieceRepr {
    fn from(piece: Piece) -> Self {
        let Piece {
            kind,
            orient_index,
            x,
            y,
        } = piece;
        Self {
            kind,
            orient_index,
            x,
            y,
        }
    }
}

impl TryFrom<PieceRepr> for Piece {
    type Error = InvalidOrientationError;

    fn try_from(repr: PieceRepr) -> Result<Self, Self::Error> {
        if repr.orient_index >= repr.kind.orientations() {
            return Err(InvalidOrientationError {
                kind: repr.kind,
                orient_index: repr.orient_index,
            });
        }
        Ok(Self {
            kind: repr.kind,
            orient_index: repr.orient_index,
            x: repr.x,
            y: repr.y,
        })
    }
}

fn coord(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

impl Piece {
    /// Creates a piece at an explicit position.
    ///
    /// # Panics
    ///
    /// Panics if `orient_index` is not below the kind's orientation count.
    #[must_use]
    pub fn new(kind: PieceKind, orient_index: usize, x: i32, y: i32) -> Self {
        assert!(
            orient_index < kind.orientations(),
            "{kind:?} has no orientation {orient_index}"
        );
        Self {
            kind,
            orient_index,
            x,
            y,
        }
    }

    /// Creates a piece of the given kind in its spawn orientation and position.
    #[must_use]
    pub fn spawn(kind: PieceKind, board: &Board) -> Self {
        Self::spawn_in(kind, board.dimensions())
    }

    /// Spawn position: horizontally centered, bounding box top on the last hidden row.
    #[must_use]
    pub fn spawn_in(kind: PieceKind, dimensions: BoardDimensions) -> Self {
        let (x, y) = Self::spawn_position(kind, dimensions);
        Self::new(kind, 0, x, y)
    }

    /// Returns the `(x, y)` a piece of `kind` spawns at.
    #[must_use]
    pub fn spawn_position(kind: PieceKind, dimensions: BoardDimensions) -> (i32, i32) {
        let x = coord(dimensions.cols / 2) - coord(kind.shape_size() / 2);
        let y = coord(dimensions.hidden_rows) - 1;
        (x, y)
    }

    /// Spawns a piece of a uniformly random kind.
    pub fn spawn_random<R>(board: &Board, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        Self::spawn(rng.random(), board)
    }

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub fn orient_index(&self) -> usize {
        self.orient_index
    }

    #[must_use]
    pub fn orientations(&self) -> usize {
        self.kind.orientations()
    }

    #[must_use]
    pub fn x(&self) -> i32 {
        self.x
    }

    #[must_use]
    pub fn y(&self) -> i32 {
        self.y
    }

    /// Moves the piece without a collision check.
    pub fn set_position(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
    }

    /// Changes the orientation without a collision check.
    ///
    /// # Panics
    ///
    /// Panics if `orient_index` is not below the kind's orientation count.
    pub fn set_orient_index(&mut self, orient_index: usize) {
        assert!(
            orient_index < self.orientations(),
            "{:?} has no orientation {orient_index}",
            self.kind
        );
        self.orient_index = orient_index;
    }

    /// Returns the `(row, col)` board positions of the filled cells.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + use<> {
        let (x, y) = (self.x, self.y);
        self.kind
            .occupied_offsets(self.orient_index)
            .into_iter()
            .map(move |(dx, dy)| (y + dy, x + dx))
    }

    /// Returns whether any filled cell is out of bounds or overlaps a filled board cell.
    #[must_use]
    pub fn collides(&self, board: &Board) -> bool {
        self.cells()
            .any(|(row, col)| board.cell_at(row, col).is_none_or(Cell::is_filled))
    }

    fn try_shift(&mut self, board: &Board, dx: i32, dy: i32) -> bool {
        self.x += dx;
        self.y += dy;
        if self.collides(board) {
            self.x -= dx;
            self.y -= dy;
            return false;
        }
        true
    }

    fn try_rotate(&mut self, board: &Board, orient_index: usize) -> bool {
        let prev = self.orient_index;
        self.orient_index = orient_index;
        if self.collides(board) {
            self.orient_index = prev;
            return false;
        }
        true
    }

    /// Moves the piece down by one row. Returns whether the piece was able to move.
    pub fn move_down(&mut self, board: &Board) -> bool {
        self.try_shift(board, 0, 1)
    }

    /// Moves the piece left by one column. Returns whether the piece was able to move.
    pub fn move_left(&mut self, board: &Board) -> bool {
        self.try_shift(board, -1, 0)
    }

    /// Moves the piece right by one column. Returns whether the piece was able to move.
    pub fn move_right(&mut self, board: &Board) -> bool {
        self.try_shift(board, 1, 0)
    }

    /// Advances to the next orientation in the table. Returns whether the piece was able to
    /// rotate.
    pub fn rotate_cw(&mut self, board: &Board) -> bool {
        let n = self.orientations();
        self.try_rotate(board, (self.orient_index + 1) % n)
    }

    /// Steps back to the previous orientation in the table. Returns whether the piece was able
    /// to rotate.
    pub fn rotate_ccw(&mut self, board: &Board) -> bool {
        let n = self.orientations();
        self.try_rotate(board, (self.orient_index + n - 1) % n)
    }

    /// Moves the piece down until it rests on the stack or the floor, returning the number of
    /// rows it fell.
    pub fn drop_to_floor(&mut self, board: &Board) -> usize {
        let mut rows = 0;
        while self.move_down(board) {
            rows += 1;
        }
        rows
    }

    /// Locks the piece into the board. Cells outside the board are skipped.
    pub fn place(&self, board: &mut Board) {
        for (row, col) in self.cells() {
            board.set_cell_at(row, col, Cell::Filled(self.kind));
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    #[test]
    fn test_orientation_counts() {
        let counts = PieceKind::ALL.map(PieceKind::orientations);
        assert_eq!(counts, [2, 1, 4, 4, 2, 4, 2]);
    }

    #[test]
    fn test_every_orientation_has_four_cells() {
        for kind in PieceKind::ALL {
            for orient in 0..kind.orientations() {
                let offsets = kind.occupied_offsets(orient);
                assert_eq!(offsets.len(), 4, "{kind:?} orientation {orient}");
                let size = coord(kind.shape_size());
                assert!(
                    offsets
                        .iter()
                        .all(|&(dx, dy)| (0..size).contains(&dx) && (0..size).contains(&dy)),
                    "{kind:?} orientation {orient} leaves its bounding box"
                );
            }
        }
    }

    #[test]
    fn test_vertical_line_offsets() {
        let offsets = PieceKind::I.occupied_offsets(1);
        assert_eq!(offsets.as_slice(), &[(2, 0), (2, 1), (2, 2), (2, 3)]);
        assert!(PieceKind::I.shapes().is_filled(0, 2, 3));
        assert!(!PieceKind::I.shapes().is_filled(0, 1, 3));
    }

    #[test]
    fn test_spawn_position() {
        let board = Board::standard().unwrap();
        let i = Piece::spawn(PieceKind::I, &board);
        assert_eq!((i.x(), i.y(), i.orient_index()), (3, 1, 0));
        let t = Piece::spawn(PieceKind::T, &board);
        assert_eq!((t.x(), t.y()), (4, 1));
        assert!(!i.collides(&board));
        assert!(!t.collides(&board));
    }

    #[test]
    fn test_spawn_position_narrow_board() {
        let dims = BoardDimensions::new(6, 1, 0);
        assert_eq!(Piece::spawn_position(PieceKind::I, dims), (-2, -1));
    }

    #[test]
    fn test_collides_with_walls_and_stack() {
        let board = Board::from_text_rows(0, ["....", "....", "....", "Z..."]).unwrap();
        let mut piece = Piece::new(PieceKind::O, 0, -1, 0);
        assert!(!piece.collides(&board));
        piece.set_position(-2, 0);
        assert!(piece.collides(&board));
        piece.set_position(-1, 1);
        assert!(piece.collides(&board));
        piece.set_position(1, 1);
        assert!(!piece.collides(&board));
        piece.set_position(1, 2);
        assert!(piece.collides(&board));
    }

    #[test]
    fn test_failed_move_is_undone() {
        let board = Board::new(4, 4, 0).unwrap();
        let mut piece = Piece::new(PieceKind::O, 0, -1, -1);
        assert!(!piece.move_left(&board));
        assert_eq!((piece.x(), piece.y()), (-1, -1));
        assert!(piece.move_right(&board));
        assert!(piece.move_right(&board));
        assert!(!piece.move_right(&board));
        assert_eq!(piece.x(), 1);
    }

    #[test]
    fn test_slide_range_of_vertical_line() {
        let board = Board::standard().unwrap();
        let mut piece = Piece::spawn(PieceKind::I, &board);
        piece.set_orient_index(1);
        while piece.move_left(&board) {}
        assert_eq!(piece.x(), -2);
        while piece.move_right(&board) {}
        assert_eq!(piece.x(), 7);
    }

    #[test]
    fn test_rotation_wraps() {
        let board = Board::standard().unwrap();
        let mut piece = Piece::spawn(PieceKind::T, &board);
        assert!(piece.rotate_ccw(&board));
        assert_eq!(piece.orient_index(), 3);
        assert!(piece.rotate_cw(&board));
        assert_eq!(piece.orient_index(), 0);

        let mut o = Piece::spawn(PieceKind::O, &board);
        assert!(o.rotate_cw(&board));
        assert_eq!(o.orient_index(), 0);
    }

    #[test]
    fn test_failed_rotation_is_undone() {
        // vertical line against the left wall cannot turn horizontal
        let board = Board::new(6, 4, 0).unwrap();
        let mut piece = Piece::new(PieceKind::I, 1, -2, 0);
        assert!(!piece.collides(&board));
        assert!(!piece.rotate_cw(&board));
        assert_eq!(piece.orient_index(), 1);
        assert!(!piece.rotate_ccw(&board));
        assert_eq!(piece.orient_index(), 1);
    }

    #[test]
    fn test_drop_and_place() {
        let mut board = Board::from_text_rows(1, ["....", "....", "....", "....", "LL.."]).unwrap();
        let mut piece = Piece::new(PieceKind::O, 0, -1, -1);
        assert_eq!(piece.drop_to_floor(&board), 2);
        piece.place(&mut board);
        assert_eq!(
            board.to_text_rows(),
            ["....", "....", "OO..", "OO..", "LL.."]
        );
    }

    #[test]
    fn test_place_skips_cells_above_the_board() {
        let mut board = Board::new(2, 4, 0).unwrap();
        let piece = Piece::new(PieceKind::I, 1, 0, -2);
        piece.place(&mut board);
        assert_eq!(board.to_text_rows(), ["..I.", "..I."]);
    }

    #[test]
    fn test_shuffled_bag_is_a_permutation() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..20 {
            let mut bag = PieceKind::shuffled_bag(&mut rng);
            bag.sort_by_key(|kind| *kind as u8);
            assert_eq!(bag, PieceKind::ALL);
        }
    }

    #[test]
    fn test_spawn_random() {
        let board = Board::standard().unwrap();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut seen = [false; PieceKind::LEN];
        for _ in 0..200 {
            let piece = Piece::spawn_random(&board, &mut rng);
            assert_eq!(piece.orient_index(), 0);
            seen[piece.kind() as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_piece_kind_char_conversion() {
        for kind in PieceKind::ALL {
            assert_eq!(PieceKind::from_char(kind.as_char()), Some(kind));
        }
        assert_eq!(PieceKind::from_char('x'), None);
        assert_eq!(PieceKind::from_char('.'), None);
    }

    #[test]
    fn test_piece_kind_from_str() {
        assert_eq!("T".parse::<PieceKind>().unwrap(), PieceKind::T);
        assert_eq!("I".parse::<PieceKind>().unwrap(), PieceKind::I);
        assert!("Q".parse::<PieceKind>().is_err());
    }

    #[test]
    fn test_piece_deserialization_checks_orientation() {
        let piece = Piece::new(PieceKind::S, 1, 3, -1);
        let json = serde_json::to_string(&piece).unwrap();
        assert_eq!(serde_json::from_str::<Piece>(&json).unwrap(), piece);

        let json = r#"{"kind":"O","orient_index":1,"x":3,"y":1}"#;
        let err = serde_json::from_str::<Piece>(json).unwrap_err();
        assert!(err.to_string().contains("no orientation 1"), "{err}");
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{AllocationError, DimensionMismatchError, ParseBoardError};

use super::piece::PieceKind;

/// A single cell of the board grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Cell {
    /// Nothing locked here.
    #[default]
    Empty,
    /// Locked cell left behind by a piece of the given kind.
    Filled(PieceKind),
}

impl Cell {
    #[must_use]
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }

    #[must_use]
    pub fn is_filled(self) -> bool {
        !self.is_empty()
    }

    /// Returns the character used by the textual board format.
    ///
    /// Empty cells are `.`, filled cells use the letter of the piece kind.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Filled(kind) => kind.as_char(),
        }
    }

    /// Parses a cell from the textual board format.
    #[must_use]
    pub fn from_char(c: char) -> Option<Self> {
        if c == '.' {
            return Some(Cell::Empty);
        }
        PieceKind::from_char(c).map(Cell::Filled)
    }
}

/// Fixed dimensions of a [`Board`].
///
/// `rows` includes the `hidden_rows` above the visible area. Hidden rows take part in
/// collision and spawning but are not part of the visible play field.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[display("{cols}x{rows} ({hidden_rows} hidden)")]
pub struct BoardDimensions {
    pub rows: usize,
    pub cols: usize,
    pub hidden_rows: usize,
}

impl BoardDimensions {
    /// 10 columns, 22 rows, the top 2 of which are hidden.
    pub const STANDARD: Self = Self::new(22, 10, 2);

    #[must_use]
    pub const fn new(rows: usize, cols: usize, hidden_rows: usize) -> Self {
        Self {
            rows,
            cols,
            hidden_rows,
        }
    }

    #[must_use]
    pub const fn visible_rows(self) -> usize {
        self.rows.saturating_sub(self.hidden_rows)
    }
}

impl Default for BoardDimensions {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// The grid of locked cells.
///
/// Cells are stored row-major with row 0 at the top. Dimensions never change after
/// construction; copying between boards requires identical dimensions.
///
/// # Example
///
/// ```
/// use autostack_engine::{Board, Cell, PieceKind};
///
/// let mut board = Board::from_text_rows(0, ["....", "IIII", "OO.."]).unwrap();
/// assert!(board.row_is_full(1));
///
/// assert_eq!(board.clean(), 1);
/// assert_eq!(board.cell(2, 0), Cell::Filled(PieceKind::O));
/// assert!(board.cell(1, 0).is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BoardRepr", into = "BoardRepr")]
pub struct Board {
    dimensions: BoardDimensions,
    cells: Vec<Cell>,
}

impl Board {
    /// Creates an empty board.
    pub fn new(rows: usize, cols: usize, hidden_rows: usize) -> Result<Self, AllocationError> {
        Self::with_dimensions(BoardDimensions::new(rows, cols, hidden_rows))
    }

    /// Creates an empty board with the standard 10×22 layout.
    pub fn standard() -> Result<Self, AllocationError> {
        Self::with_dimensions(BoardDimensions::STANDARD)
    }

    pub fn with_dimensions(dimensions: BoardDimensions) -> Result<Self, AllocationError> {
        let BoardDimensions {
            rows,
            cols,
            hidden_rows,
        } = dimensions;
        if hidden_rows > rows {
            return Err(AllocationError::HiddenRowsExceedRows { rows, hidden_rows });
        }
        let len = rows
            .checked_mul(cols)
            .ok_or(AllocationError::TooLarge { dimensions })?;
        let mut cells = Vec::new();
        cells
            .try_reserve_exact(len)
            .map_err(AllocationError::OutOfMemory)?;
        cells.resize(len, Cell::Empty);
        Ok(Self { dimensions, cells })
    }

    /// Parses a board from text rows, top row first.
    ///
    /// Every row must have the same width. `.` is an empty cell and a piece letter
    /// (`I`, `O`, `J`, `L`, `S`, `T`, `Z`) is a filled cell.
    pub fn from_text_rows<I>(hidden_rows: usize, lines: I) -> Result<Self, ParseBoardError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let lines = lines.into_iter().collect::<Vec<_>>();
        let cols = lines.first().map_or(0, |line| line.as_ref().chars().count());
        let dimensions = BoardDimensions::new(lines.len(), cols, hidden_rows);
        Self::parse_rows(dimensions, &lines)
    }

    fn parse_rows<S>(dimensions: BoardDimensions, lines: &[S]) -> Result<Self, ParseBoardError>
    where
        S: AsRef<str>,
    {
        if lines.len() != dimensions.rows {
            return Err(ParseBoardError::RowCount {
                expected: dimensions.rows,
                found: lines.len(),
            });
        }
        let mut board = Self::with_dimensions(dimensions).map_err(ParseBoardError::Allocation)?;
        for (row, line) in lines.iter().enumerate() {
            let line = line.as_ref();
            let found = line.chars().count();
            if found != dimensions.cols {
                return Err(ParseBoardError::RowWidth {
                    row,
                    expected: dimensions.cols,
                    found,
                });
            }
            for (col, ch) in line.chars().enumerate() {
                let cell =
                    Cell::from_char(ch).ok_or(ParseBoardError::InvalidCell { row, col, ch })?;
                board.set_cell(row, col, cell);
            }
        }
        Ok(board)
    }

    /// Renders every row in the textual board format, top row first.
    #[must_use]
    pub fn to_text_rows(&self) -> Vec<String> {
        self.rows_iter()
            .map(|row| row.iter().map(|cell| cell.as_char()).collect())
            .collect()
    }

    #[must_use]
    pub fn dimensions(&self) -> BoardDimensions {
        self.dimensions
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.dimensions.rows
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.dimensions.cols
    }

    #[must_use]
    pub fn hidden_rows(&self) -> usize {
        self.dimensions.hidden_rows
    }

    #[must_use]
    pub fn visible_rows(&self) -> usize {
        self.dimensions.visible_rows()
    }

    fn index(&self, row: usize, col: usize) -> usize {
        assert!(
            row < self.dimensions.rows && col < self.dimensions.cols,
            "cell ({row}, {col}) is outside the {} board",
            self.dimensions
        );
        row * self.dimensions.cols + col
    }

    /// Returns the cell at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if the position is outside the board.
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> Cell {
        self.cells[self.index(row, col)]
    }

    #[must_use]
    pub fn is_occupied(&self, row: usize, col: usize) -> bool {
        self.cell(row, col).is_filled()
    }

    /// # Panics
    ///
    /// Panics if the position is outside the board.
    pub fn set_cell(&mut self, row: usize, col: usize, cell: Cell) {
        let index = self.index(row, col);
        self.cells[index] = cell;
    }

    /// Returns the cell at a signed position, or `None` if it lies outside the board.
    ///
    /// Piece coordinates may be negative, so collision checks go through this.
    #[must_use]
    pub fn cell_at(&self, row: i32, col: i32) -> Option<Cell> {
        let row = usize::try_from(row).ok()?;
        let col = usize::try_from(col).ok()?;
        (row < self.dimensions.rows && col < self.dimensions.cols).then(|| self.cell(row, col))
    }

    /// Sets the cell at a signed position. Returns `false` if it lies outside the board.
    pub fn set_cell_at(&mut self, row: i32, col: i32, cell: Cell) -> bool {
        if self.out_of_bounds(row, col) {
            return false;
        }
        // in bounds implies non-negative
        #[expect(clippy::cast_sign_loss)]
        let (row, col) = (row as usize, col as usize);
        self.set_cell(row, col, cell);
        true
    }

    #[must_use]
    pub fn out_of_bounds(&self, row: i32, col: i32) -> bool {
        self.cell_at(row, col).is_none()
    }

    /// Returns the cells of one row, left to right.
    #[must_use]
    pub fn row(&self, row: usize) -> &[Cell] {
        let cols = self.dimensions.cols;
        &self.cells[row * cols..][..cols]
    }

    /// Iterates over all rows, top row first.
    pub fn rows_iter(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        (0..self.dimensions.rows).map(|row| self.row(row))
    }

    /// Iterates over the cells of one column, top row first.
    pub fn column(&self, col: usize) -> impl Iterator<Item = Cell> + '_ {
        assert!(col < self.dimensions.cols, "column {col} is outside the board");
        self.cells
            .iter()
            .skip(col)
            .step_by(self.dimensions.cols)
            .copied()
    }

    #[must_use]
    pub fn row_is_full(&self, row: usize) -> bool {
        self.row(row).iter().all(|cell| cell.is_filled())
    }

    /// Returns the number of rows that are currently full.
    #[must_use]
    pub fn full_row_count(&self) -> usize {
        (0..self.dimensions.rows)
            .filter(|&row| self.row_is_full(row))
            .count()
    }

    /// Overwrites every cell with the cells of `other`.
    ///
    /// Fails without touching `self` if the dimensions differ.
    pub fn copy_from(&mut self, other: &Board) -> Result<(), DimensionMismatchError> {
        if self.dimensions != other.dimensions {
            return Err(DimensionMismatchError {
                expected: self.dimensions,
                found: other.dimensions,
            });
        }
        self.cells.copy_from_slice(&other.cells);
        Ok(())
    }

    /// Empties every cell. Dimensions stay unchanged.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::Empty);
    }

    /// Moves every row above `from_row` down by one, overwriting `from_row`, and empties row 0.
    ///
    /// # Panics
    ///
    /// Panics if `from_row` is outside the board.
    pub fn shift_stack(&mut self, from_row: usize) {
        assert!(
            from_row < self.dimensions.rows,
            "row {from_row} is outside the board"
        );
        let cols = self.dimensions.cols;
        self.cells.copy_within(..from_row * cols, cols);
        self.cells[..cols].fill(Cell::Empty);
    }

    /// Clears every full row and lets the stack above it fall, returning the number of
    /// cleared rows.
    ///
    /// Rows are scanned top to bottom. Shifting only moves rows above the cleared row, so rows
    /// below it are still unvisited and one pass leaves no full rows behind.
    pub fn clean(&mut self) -> usize {
        let cols = self.dimensions.cols;
        let mut cleared = 0;
        for row in 0..self.dimensions.rows {
            if self.row_is_full(row) {
                self.cells[row * cols..][..cols].fill(Cell::Empty);
                self.shift_stack(row);
                cleared += 1;
            }
        }
        cleared
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows_iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for cell in row {
                write!(f, "{}", cell.as_char())?;
            }
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct BoardRepr {
    #[serde(flatten)]
    dimensions: BoardDimensions,
    cells: Vec<String>,
}

impl From<Board> for BoardRepr {
    fn from(board: Board) -> Self {
        Self {
            dimensions: board.dimensions,
            cells: board.to_text_rows(),
        }
    }
}

impl TryFrom<BoardRepr> for Board {
    type Error = ParseBoardError;

    fn try_from(repr: BoardRepr) -> Result<Self, Self::Error> {
        Board::parse_rows(repr.dimensions, &repr.cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(kind: PieceKind) -> Cell {
        Cell::Filled(kind)
    }

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::standard().unwrap();
        assert_eq!(board.rows(), 22);
        assert_eq!(board.cols(), 10);
        assert_eq!(board.hidden_rows(), 2);
        assert_eq!(board.visible_rows(), 20);
        assert!(board.rows_iter().flatten().all(|cell| cell.is_empty()));
    }

    #[test]
    fn test_new_rejects_more_hidden_rows_than_rows() {
        let err = Board::new(2, 10, 3).unwrap_err();
        assert!(matches!(
            err,
            AllocationError::HiddenRowsExceedRows {
                rows: 2,
                hidden_rows: 3
            }
        ));
    }

    #[test]
    fn test_new_rejects_overflowing_dimensions() {
        let err = Board::new(usize::MAX, 2, 0).unwrap_err();
        assert!(matches!(err, AllocationError::TooLarge { .. }));
    }

    #[test]
    fn test_out_of_bounds() {
        let board = Board::new(4, 3, 1).unwrap();
        assert!(!board.out_of_bounds(0, 0));
        assert!(!board.out_of_bounds(3, 2));
        assert!(board.out_of_bounds(-1, 0));
        assert!(board.out_of_bounds(0, -1));
        assert!(board.out_of_bounds(4, 0));
        assert!(board.out_of_bounds(0, 3));
    }

    #[test]
    fn test_row_is_full() {
        let board = Board::from_text_rows(0, ["T.T", "TTT"]).unwrap();
        assert!(!board.row_is_full(0));
        assert!(board.row_is_full(1));
        assert_eq!(board.full_row_count(), 1);
    }

    #[test]
    fn test_column_iterates_top_to_bottom() {
        let board = Board::from_text_rows(0, ["I..", ".O.", "..S"]).unwrap();
        let column = board.column(1).collect::<Vec<_>>();
        assert_eq!(column, [Cell::Empty, filled(PieceKind::O), Cell::Empty]);
    }

    #[test]
    fn test_copy_from_copies_cells() {
        let src = Board::from_text_rows(1, ["...", "Z.Z", "ZZZ"]).unwrap();
        let mut dest = Board::new(3, 3, 1).unwrap();
        dest.copy_from(&src).unwrap();
        assert_eq!(dest, src);
    }

    #[test]
    fn test_copy_from_dimension_mismatch_leaves_destination_unchanged() {
        let src = Board::new(22, 10, 2).unwrap();
        let mut dest = Board::new(22, 12, 2).unwrap();
        dest.set_cell(21, 0, filled(PieceKind::L));
        let before = dest.clone();

        let err = dest.copy_from(&src).unwrap_err();
        assert_eq!(err.expected, BoardDimensions::new(22, 12, 2));
        assert_eq!(err.found, BoardDimensions::new(22, 10, 2));
        assert_eq!(dest, before);
    }

    #[test]
    fn test_copy_from_hidden_rows_mismatch() {
        let src = Board::new(22, 10, 2).unwrap();
        let mut dest = Board::new(22, 10, 3).unwrap();
        assert!(dest.copy_from(&src).is_err());
    }

    #[test]
    fn test_clear_keeps_dimensions() {
        let mut board = Board::from_text_rows(1, ["..", "JJ", "J."]).unwrap();
        board.clear();
        assert_eq!(board.dimensions(), BoardDimensions::new(3, 2, 1));
        assert!(board.rows_iter().flatten().all(|cell| cell.is_empty()));
    }

    #[test]
    fn test_shift_stack() {
        let mut board = Board::from_text_rows(0, ["I..", ".O.", "..S", "TTT"]).unwrap();
        board.shift_stack(2);
        assert_eq!(board.to_text_rows(), ["...", "I..", ".O.", "TTT"]);
    }

    #[test]
    fn test_clean_single_row() {
        let mut board = Board::from_text_rows(0, ["...", "L..", "LLL"]).unwrap();
        assert_eq!(board.clean(), 1);
        assert_eq!(board.to_text_rows(), ["...", "...", "L.."]);
    }

    #[test]
    fn test_clean_non_adjacent_rows() {
        let mut board =
            Board::from_text_rows(0, ["S..", "SSS", ".Z.", "ZZZ", "..O"]).unwrap();
        assert_eq!(board.clean(), 2);
        assert_eq!(board.to_text_rows(), ["...", "...", "S..", ".Z.", "..O"]);
    }

    #[test]
    fn test_clean_is_idempotent() {
        let mut board =
            Board::from_text_rows(0, ["I...", "IIII", "IIII", "I.II", "IIII"]).unwrap();
        board.clean();
        let once = board.clone();
        assert_eq!(board.clean(), 0);
        assert_eq!(board, once);
        assert_eq!(board.full_row_count(), 0);
    }

    #[test]
    fn test_text_rows_roundtrip() {
        let rows = ["..........", "....T.....", "...TTT..OO", "IIII.SS.OO"];
        let board = Board::from_text_rows(1, rows).unwrap();
        assert_eq!(board.to_text_rows(), rows);
        assert_eq!(board.to_string(), rows.join("\n"));
    }

    #[test]
    fn test_from_text_rows_errors() {
        assert!(matches!(
            Board::from_text_rows(0, ["...", ".."]),
            Err(ParseBoardError::RowWidth {
                row: 1,
                expected: 3,
                found: 2
            })
        ));
        assert!(matches!(
            Board::from_text_rows(0, ["..", ".x"]),
            Err(ParseBoardError::InvalidCell {
                row: 1,
                col: 1,
                ch: 'x'
            })
        ));
        assert!(matches!(
            Board::from_text_rows(3, [".."]),
            Err(ParseBoardError::Allocation(_))
        ));
    }

    #[test]
    fn test_board_serialization() {
        let board = Board::from_text_rows(1, ["...", "..T", ".TT"]).unwrap();
        let json = serde_json::to_string(&board).unwrap();
        assert_eq!(
            json,
            r#"{"rows":3,"cols":3,"hidden_rows":1,"cells":["...","..T",".TT"]}"#
        );
        let deserialized: Board = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, board);
    }

    #[test]
    fn test_board_deserialization_rejects_mismatched_rows() {
        let json = r#"{"rows":3,"cols":3,"hidden_rows":1,"cells":["...","..."]}"#;
        assert!(serde_json::from_str::<Board>(json).is_err());
    }
}

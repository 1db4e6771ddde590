//! Scalar metrics over a board snapshot.
//!
//! Every function here is a read-only scan of a [`Board`]. Placement search calls them on the
//! scratch board after each simulated drop, and the piece selector calls them on the live board
//! to get the baseline a new piece must not worsen.
//!
//! Column heights are measured from the floor: a column whose topmost filled cell is on row `r`
//! has height `rows - r`, and an empty column has height 0.

use autostack_engine::Board;

/// Counts empty cells that have at least one filled cell above them in the same column.
#[must_use]
pub fn hole_count(board: &Board) -> usize {
    (0..board.cols())
        .map(|col| {
            board
                .column(col)
                .skip_while(|cell| cell.is_empty())
                .filter(|cell| cell.is_empty())
                .count()
        })
        .sum()
}

/// Counts empty cells that only a vertical line piece can fill.
///
/// For each column, the scan starts two rows below the first row where its neighbours are
/// filled (both neighbours for inner columns, the single neighbour for the edge columns) and
/// counts empty cells downward until the first filled one. Any well that is one cell wide and
/// at least three cells deep contributes at least one cell.
///
/// The rightmost column is skipped when `ignore_rightmost` is set. Boards narrower than two
/// columns have no dependencies.
#[must_use]
pub fn line_dependency_cells(board: &Board, ignore_rightmost: bool) -> usize {
    let cols = board.cols();
    if cols < 2 {
        return 0;
    }

    let mut cells = 0;

    let top = first_row_where(board, |row| board.is_occupied(row, 1));
    cells += empty_run_below(board, 0, top);

    for col in 1..cols - 1 {
        let top = first_row_where(board, |row| {
            board.is_occupied(row, col - 1) && board.is_occupied(row, col + 1)
        });
        cells += empty_run_below(board, col, top);
    }

    if !ignore_rightmost {
        let top = first_row_where(board, |row| board.is_occupied(row, cols - 2));
        cells += empty_run_below(board, cols - 1, top);
    }

    cells
}

/// First row satisfying `pred`, or `board.rows()` when none does.
fn first_row_where<F>(board: &Board, pred: F) -> usize
where
    F: Fn(usize) -> bool,
{
    (0..board.rows())
        .find(|&row| pred(row))
        .unwrap_or(board.rows())
}

fn empty_run_below(board: &Board, col: usize, top: usize) -> usize {
    board
        .column(col)
        .skip(top.saturating_add(2))
        .take_while(|cell| cell.is_empty())
        .count()
}

/// Returns the height of every column, leftmost first.
#[must_use]
pub fn column_heights(board: &Board) -> Vec<usize> {
    (0..board.cols())
        .map(|col| {
            board
                .column(col)
                .position(|cell| cell.is_filled())
                .map_or(0, |top| board.rows() - top)
        })
        .collect()
}

/// Sample standard deviation of the column heights.
///
/// The sum of squared differences is divided by `cols - 1`, so the result is undefined for
/// boards narrower than two columns and `None` is returned.
#[must_use]
#[expect(clippy::cast_precision_loss)]
pub fn stack_deviation(board: &Board) -> Option<f64> {
    let cols = board.cols();
    if cols < 2 {
        return None;
    }
    let heights = column_heights(board);
    let mean = heights.iter().sum::<usize>() as f64 / cols as f64;
    let sum_squares = heights
        .iter()
        .map(|&h| (h as f64 - mean).powi(2))
        .sum::<f64>();
    Some((sum_squares / (cols - 1) as f64).sqrt())
}

/// Height of the topmost filled cell anywhere on the board, 0 when the board is empty.
#[must_use]
pub fn stack_height(board: &Board) -> usize {
    board
        .rows_iter()
        .position(|row| row.iter().any(|cell| cell.is_filled()))
        .map_or(0, |top| board.rows() - top)
}

/// Counts the filled cells in one column.
///
/// # Panics
///
/// Panics if `col` is outside the board.
#[must_use]
pub fn column_fill_count(board: &Board, col: usize) -> usize {
    board.column(col).filter(|cell| cell.is_filled()).count()
}

#[cfg(test)]
mod tests {
    use autostack_engine::Board;

    use super::*;

    fn board(rows: &[&str]) -> Board {
        Board::from_text_rows(0, rows).unwrap()
    }

    /// Counts one-wide wells directly: for each column, the empty cells below the point where
    /// the walls on both sides have been standing for two rows.
    fn direct_gap_count(board: &Board, ignore_rightmost: bool) -> usize {
        let cols = board.cols();
        let last = if ignore_rightmost { cols - 1 } else { cols };
        let mut count = 0;
        for col in 0..last {
            let walled = |row: usize| {
                (col == 0 || board.is_occupied(row, col - 1))
                    && (col + 1 == cols || board.is_occupied(row, col + 1))
            };
            let Some(top) = (0..board.rows()).find(|&row| walled(row)) else {
                continue;
            };
            for row in top + 2..board.rows() {
                if board.is_occupied(row, col) {
                    break;
                }
                count += 1;
            }
        }
        count
    }

    #[test]
    fn test_empty_board() {
        let board = Board::standard().unwrap();
        assert_eq!(hole_count(&board), 0);
        assert_eq!(line_dependency_cells(&board, false), 0);
        assert_eq!(line_dependency_cells(&board, true), 0);
        assert_eq!(stack_height(&board), 0);
        assert_eq!(stack_deviation(&board), Some(0.0));
        assert_eq!(column_heights(&board), vec![0; 10]);
        assert_eq!(column_fill_count(&board, 9), 0);
    }

    #[test]
    fn test_hole_count() {
        let board = board(&[
            ".....", //
            ".T...", //
            ".....", //
            "OT.I.", //
            ".TTI.", //
        ]);
        // column 0: one hole below the O, column 1: one below the top T,
        // column 2: none, column 3: none
        assert_eq!(hole_count(&board), 2);
    }

    #[test]
    fn test_line_dependency_cells_in_middle_well() {
        let board = board(&[
            ".....", //
            "II.II", //
            "II.II", //
            "II.II", //
            "II.II", //
        ]);
        // walls start on row 1, scan starts on row 3
        assert_eq!(line_dependency_cells(&board, true), 2);
        assert_eq!(line_dependency_cells(&board, false), 2);
    }

    #[test]
    fn test_line_dependency_cells_at_edges() {
        let board = board(&[
            ".....", //
            ".III.", //
            ".III.", //
            ".III.", //
            ".III.", //
        ]);
        assert_eq!(line_dependency_cells(&board, false), 4);
        assert_eq!(line_dependency_cells(&board, true), 2);
    }

    #[test]
    fn test_line_dependency_cells_shallow_well_is_free() {
        let board = board(&[
            ".....", //
            ".....", //
            ".....", //
            "II.II", //
            "II.II", //
        ]);
        assert_eq!(line_dependency_cells(&board, true), 0);
    }

    #[test]
    fn test_line_dependency_cells_matches_direct_gap_check() {
        let boards = [
            board(&[
                "......", //
                ".I..I.", //
                ".I.OI.", //
                ".I.OI.", //
                "SI.OI.", //
                "SS.OIZ", //
            ]),
            board(&[
                "......", //
                "......", //
                "T.T.T.", //
                "T.T.T.", //
                "T.T.T.", //
                "TTTTT.", //
            ]),
            board(&[
                "L.....", //
                "L.....", //
                "LL....", //
                "J.J..O", //
                "J.J..O", //
                "J.JJ.O", //
            ]),
        ];
        for board in &boards {
            for ignore_rightmost in [false, true] {
                assert_eq!(
                    line_dependency_cells(board, ignore_rightmost),
                    direct_gap_count(board, ignore_rightmost),
                    "ignore_rightmost={ignore_rightmost}\n{board}"
                );
            }
        }
    }

    #[test]
    fn test_line_dependency_cells_narrow_board() {
        let board = board(&[".", ".", "I"]);
        assert_eq!(line_dependency_cells(&board, false), 0);
    }

    #[test]
    fn test_stack_deviation() {
        let flat = board(&[
            "....", //
            "....", //
            "OOOO", //
            "OOOO", //
        ]);
        assert_eq!(stack_deviation(&flat), Some(0.0));

        // heights 4, 0: mean 2, squares 4 + 4, divided by 1
        let tower = board(&[
            "I.", //
            "I.", //
            "I.", //
            "I.", //
        ]);
        let dev = stack_deviation(&tower).unwrap();
        assert!((dev - 8.0_f64.sqrt()).abs() < 1e-12);

        let single = board(&[".", "I"]);
        assert_eq!(stack_deviation(&single), None);
    }

    #[test]
    fn test_stack_height_and_column_metrics() {
        let board = board(&[
            "......", //
            "..T...", //
            ".TTT..", //
            ".....J", //
            "IIII.J", //
        ]);
        assert_eq!(stack_height(&board), 4);
        assert_eq!(column_heights(&board), vec![1, 3, 4, 3, 0, 2]);
        assert_eq!(column_fill_count(&board, 1), 2);
        assert_eq!(column_fill_count(&board, 4), 0);
        assert_eq!(column_fill_count(&board, 5), 2);
    }
}

//! Tic-tac-toe rules: win and draw detection.

use gridduel_protocol::{Grid, Marker};

/// The 8 winning lines, in the order they are checked: rows, columns,
/// then the two diagonals.
pub const WINNING_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Returns the marker filling a complete line, if any.
///
/// The first line in [`WINNING_LINES`] order decides, so the result is
/// deterministic even for boards no real game can reach.
pub fn detect_winner(grid: &Grid) -> Option<Marker> {
    WINNING_LINES.iter().find_map(|&[a, b, c]| {
        let marker = grid.get(a)?;
        (grid.get(b) == Some(marker) && grid.get(c) == Some(marker))
            .then_some(marker)
    })
}

/// Returns `true` if no cell is empty.
pub fn is_full(grid: &Grid) -> bool {
    grid.cells().iter().all(Option::is_some)
}

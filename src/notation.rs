//! Plain-text board notation.
//!
//! Eight lines, one per row from top (`y = 0`) to bottom, each holding eight
//! comma-separated squares from left (`x = 0`) to right:
//!
//! ```text
//! -,-,-,-,-,-,-,-
//! -,-,-,-,-,-,-,-
//! -,-,-,-,-,-,-,-
//! -,-,-,x,o,-,-,-
//! -,-,-,o,x,-,-,-
//! -,-,-,-,-,-,-,-
//! -,-,-,-,-,-,-,-
//! -,-,-,-,-,-,-,-
//! ```
//!
//! `x` is player A, `o` is player B, `-` is blank. The parser also takes
//! `a`/`b` for the players and `!`, a blank square flagged for a test.

use std::fmt;
use std::str::FromStr;

use crate::board::Board;
use crate::types::{BOARD_SIZE, CellState, Position};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotationError {
    #[error("expected 8 rows, found {0}")]
    RowCount(usize),
    #[error("row {row}: expected 8 columns, found {found}")]
    ColumnCount { row: usize, found: usize },
    #[error("invalid square {token:?} at ({x}, {y})")]
    InvalidToken { x: usize, y: usize, token: String },
}

fn symbol(state: CellState) -> char {
    match state {
        CellState::Blank => '-',
        CellState::OwnedByA => 'x',
        CellState::OwnedByB => 'o',
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, cell) in self.cells().enumerate() {
            write!(f, "{}", symbol(cell.state()))?;
            if i % BOARD_SIZE == BOARD_SIZE - 1 {
                writeln!(f)?;
            } else {
                f.write_str(",")?;
            }
        }
        Ok(())
    }
}

impl FromStr for Board {
    type Err = NotationError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        parse_marked(text).map(|(board, _)| board)
    }
}

/// Parses a board and also returns the squares written as `!`, row-major.
pub fn parse_marked(text: &str) -> Result<(Board, Vec<Position>), NotationError> {
    let rows: Vec<&str> = text.trim_end().lines().map(str::trim).collect();
    if rows.len() != BOARD_SIZE {
        return Err(NotationError::RowCount(rows.len()));
    }

    let mut board = Board::empty();
    let mut marked = Vec::new();

    for (y, row) in rows.iter().enumerate() {
        let tokens: Vec<&str> = row.split(',').map(str::trim).collect();
        if tokens.len() != BOARD_SIZE {
            return Err(NotationError::ColumnCount {
                row: y,
                found: tokens.len(),
            });
        }

        for (x, token) in tokens.iter().enumerate() {
            let state = match *token {
                "-" => CellState::Blank,
                "!" => {
                    marked.push(Position::at(y * BOARD_SIZE + x));
                    CellState::Blank
                }
                "x" | "a" => CellState::OwnedByA,
                "o" | "b" => CellState::OwnedByB,
                other => {
                    return Err(NotationError::InvalidToken {
                        x,
                        y,
                        token: other.to_string(),
                    });
                }
            };
            board.set(Position::at(y * BOARD_SIZE + x), state);
        }
    }

    Ok((board, marked))
}

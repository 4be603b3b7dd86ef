use std::fmt;

use serde::{Deserialize, Serialize};

pub const BOARD_SIZE: usize = 8;
pub const NUM_SQUARES: usize = BOARD_SIZE * BOARD_SIZE;

/// A board coordinate. `x` is the column, `y` is the row, both in `0..8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Position {
    x: u8,
    y: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PositionError {
    #[error("position ({x}, {y}) is outside the 8x8 grid")]
    OutOfRange { x: i32, y: i32 },
}

impl Position {
    pub fn new(x: i32, y: i32) -> Result<Self, PositionError> {
        if in_bounds(x, y) {
            Ok(Self {
                x: x as u8,
                y: y as u8,
            })
        } else {
            Err(PositionError::OutOfRange { x, y })
        }
    }

    pub fn x(self) -> u8 {
        self.x
    }

    pub fn y(self) -> u8 {
        self.y
    }

    /// Row-major index (`y * 8 + x`).
    pub fn index(self) -> usize {
        self.y as usize * BOARD_SIZE + self.x as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        (index < NUM_SQUARES).then(|| Self::at(index))
    }

    /// Caller guarantees `index < 64`.
    pub(crate) fn at(index: usize) -> Self {
        debug_assert!(index < NUM_SQUARES);
        Self {
            x: (index % BOARD_SIZE) as u8,
            y: (index / BOARD_SIZE) as u8,
        }
    }

    /// Steps by `(dx, dy)`. Returns `None` when the step leaves the grid.
    pub fn offset(self, dx: i32, dy: i32) -> Option<Self> {
        Self::new(self.x as i32 + dx, self.y as i32 + dy).ok()
    }

    /// All 64 positions in row-major order.
    pub fn all() -> impl Iterator<Item = Position> {
        (0..NUM_SQUARES).filter_map(Self::from_index)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

fn in_bounds(x: i32, y: i32) -> bool {
    (0..BOARD_SIZE as i32).contains(&x) && (0..BOARD_SIZE as i32).contains(&y)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    A,
    B,
}

impl Player {
    pub fn other(self) -> Self {
        match self {
            Player::A => Player::B,
            Player::B => Player::A,
        }
    }

    /// The cell state this player's pieces occupy.
    pub fn stone(self) -> CellState {
        match self {
            Player::A => CellState::OwnedByA,
            Player::B => CellState::OwnedByB,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::A => f.write_str("A"),
            Player::B => f.write_str("B"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CellState {
    #[default]
    Blank,
    OwnedByA,
    OwnedByB,
}

impl CellState {
    pub fn owner(self) -> Option<Player> {
        match self {
            CellState::Blank => None,
            CellState::OwnedByA => Some(Player::A),
            CellState::OwnedByB => Some(Player::B),
        }
    }

    pub fn is_blank(self) -> bool {
        self == CellState::Blank
    }

    /// Wire code used by snapshots: 0=blank, 1=A, 2=B.
    pub fn code(self) -> u8 {
        match self {
            CellState::Blank => 0,
            CellState::OwnedByA => 1,
            CellState::OwnedByB => 2,
        }
    }
}

/// One grid square. The position is fixed at construction; only `state` changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    position: Position,
    pub(crate) state: CellState,
}

impl Cell {
    pub(crate) fn new(position: Position, state: CellState) -> Self {
        Self { position, state }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn state(&self) -> CellState {
        self.state
    }

    pub fn is_blank(&self) -> bool {
        self.state.is_blank()
    }
}

/// What happens after a committed move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GameOutcome {
    Continue { next: Player },
    Skip { skipped: Player, next: Player },
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "player", rename_all = "camelCase")]
pub enum TurnState {
    AwaitingMove(Player),
    Skipped(Player),
    Finished,
}

impl TurnState {
    /// State after `outcome`. `Skipped` lasts until the next move; the
    /// player who keeps the move is the one on turn meanwhile.
    pub fn after(outcome: GameOutcome) -> Self {
        match outcome {
            GameOutcome::Continue { next } => TurnState::AwaitingMove(next),
            GameOutcome::Skip { skipped, .. } => TurnState::Skipped(skipped),
            GameOutcome::Finished => TurnState::Finished,
        }
    }

    pub fn to_move(self) -> Option<Player> {
        match self {
            TurnState::AwaitingMove(player) => Some(player),
            TurnState::Skipped(skipped) => Some(skipped.other()),
            TurnState::Finished => None,
        }
    }
}

/// Public board state returned from WASM APIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSnapshot {
    /// Row-major, 0=blank, 1=A, 2=B.
    pub cells: Vec<u8>,
    pub count_a: u8,
    pub count_b: u8,
}

/// Result of one committed move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveReport {
    pub player: Player,
    pub placed: Position,
    /// Contract: every position here switched to `player`; nothing else changed.
    pub flipped: Vec<Position>,
    pub outcome: GameOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub board: BoardSnapshot,
    pub turn: TurnState,
}

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::{debug, instrument};

use crate::types::{BoardSnapshot, Cell, CellState, NUM_SQUARES, Player, Position};

const DIRECTIONS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// On-grid neighbors of every square, indexed by `Position::index`.
static NEIGHBORS: Lazy<Vec<Vec<Position>>> = Lazy::new(|| {
    Position::all()
        .map(|pos| {
            DIRECTIONS
                .iter()
                .filter_map(|&(dx, dy)| pos.offset(dx, dy))
                .collect()
        })
        .collect()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CheckError {
    #[error("square {0} is already occupied")]
    AlreadyOccupied(Position),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PlaceError {
    #[error("square {0} is already occupied")]
    AlreadyOccupied(Position),
    #[error("move at {0} captures nothing")]
    NoCaptures(Position),
}

impl From<CheckError> for PlaceError {
    fn from(err: CheckError) -> Self {
        match err {
            CheckError::AlreadyOccupied(pos) => PlaceError::AlreadyOccupied(pos),
        }
    }
}

/// How a single direction of the capture scan ended.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Ray {
    /// Walked off the grid before reaching an own piece.
    OffGrid,
    /// Hit a blank square.
    Gap,
    /// Own piece directly next to the target; nothing in between.
    Unclosed,
    /// Opponent run closed by an own piece. Nearest first.
    Closed(Vec<Position>),
}

impl Ray {
    fn into_captures(self) -> Vec<Position> {
        match self {
            Ray::Closed(run) => run,
            Ray::OffGrid | Ray::Gap | Ray::Unclosed => Vec::new(),
        }
    }
}

/// 8x8 Reversi grid.
///
/// `cells[i].position().index() == i` holds for the lifetime of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board {
    cells: [Cell; NUM_SQUARES],
}

impl Board {
    /// Creates the opening position:
    /// (3,3)=A, (4,4)=A, (4,3)=B, (3,4)=B.
    pub fn new() -> Self {
        let mut board = Self::empty();
        for (x, y, player) in [
            (3, 3, Player::A),
            (4, 4, Player::A),
            (4, 3, Player::B),
            (3, 4, Player::B),
        ] {
            if let Ok(pos) = Position::new(x, y) {
                board.set(pos, player.stone());
            }
        }
        board
    }

    /// All squares blank.
    pub fn empty() -> Self {
        Self {
            cells: std::array::from_fn(|i| Cell::new(Position::at(i), CellState::Blank)),
        }
    }

    pub fn cell(&self, pos: Position) -> Cell {
        self.cells[pos.index()]
    }

    pub fn state(&self, pos: Position) -> CellState {
        self.cells[pos.index()].state()
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Adjacent on-grid squares (3 in a corner, 5 on an edge, 8 elsewhere).
    pub fn neighbors(pos: Position) -> &'static [Position] {
        &NEIGHBORS[pos.index()]
    }

    /// Returns the squares `player` would flip by playing `target`.
    /// An empty list means the move is not legal. Never mutates.
    pub fn check(&self, target: Position, player: Player) -> Result<Vec<Position>, CheckError> {
        if !self.state(target).is_blank() {
            return Err(CheckError::AlreadyOccupied(target));
        }
        if self.is_isolated(target) {
            return Ok(Vec::new());
        }

        Ok(DIRECTIONS
            .iter()
            .flat_map(|&(dx, dy)| self.scan(target, dx, dy, player).into_captures())
            .collect())
    }

    /// Places one stone and flips captured stones.
    /// Returns the flipped positions. On error the board is untouched.
    pub fn place(&mut self, target: Position, player: Player) -> Result<Vec<Position>, PlaceError> {
        let flips = self.check(target, player)?;
        if flips.is_empty() {
            return Err(PlaceError::NoCaptures(target));
        }

        let stone = player.stone();
        self.set(target, stone);
        for &pos in &flips {
            self.set(pos, stone);
        }

        Ok(flips)
    }

    pub fn count(&self, player: Player) -> u8 {
        let stone = player.stone();
        self.cells.iter().filter(|cell| cell.state() == stone).count() as u8
    }

    pub fn blank_count(&self) -> u8 {
        self.cells.iter().filter(|cell| cell.is_blank()).count() as u8
    }

    pub fn is_full(&self) -> bool {
        self.blank_count() == 0
    }

    pub fn to_snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            cells: self.cells.iter().map(|cell| cell.state().code()).collect(),
            count_a: self.count(Player::A),
            count_b: self.count(Player::B),
        }
    }

    pub(crate) fn set(&mut self, pos: Position, state: CellState) {
        self.cells[pos.index()].state = state;
    }

    fn is_isolated(&self, target: Position) -> bool {
        Self::neighbors(target)
            .iter()
            .all(|&pos| self.state(pos).is_blank())
    }

    fn scan(&self, from: Position, dx: i32, dy: i32, player: Player) -> Ray {
        let mut run = Vec::new();
        let mut cursor = from;

        loop {
            let Some(next) = cursor.offset(dx, dy) else {
                return Ray::OffGrid;
            };
            match self.state(next).owner() {
                None => return Ray::Gap,
                Some(owner) if owner == player => {
                    return if run.is_empty() {
                        Ray::Unclosed
                    } else {
                        Ray::Closed(run)
                    };
                }
                Some(_) => run.push(next),
            }
            cursor = next;
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// A board shared between callers on different threads.
///
/// `check` only takes a shared read guard, so any number of checks run side
/// by side. `place` holds the exclusive guard across its own re-check and the
/// mutation, so two moves never interleave.
#[derive(Debug, Default)]
pub struct SharedBoard {
    grid: RwLock<Board>,
}

impl SharedBoard {
    pub fn new(board: Board) -> Self {
        Self {
            grid: RwLock::new(board),
        }
    }

    pub fn check(&self, target: Position, player: Player) -> Result<Vec<Position>, CheckError> {
        self.grid.read().check(target, player)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn place(&self, target: Position, player: Player) -> Result<Vec<Position>, PlaceError> {
        let mut grid = self.grid.write();
        let result = grid.place(target, player);
        match &result {
            Ok(flips) => debug!(flipped = flips.len(), "move applied"),
            Err(err) => debug!(%err, "move rejected"),
        }
        result
    }

    /// Copy of the current grid, for rendering or turn evaluation.
    pub fn snapshot(&self) -> Board {
        *self.grid.read()
    }

    /// Swaps in a new grid and returns the old one.
    pub fn replace(&self, board: Board) -> Board {
        std::mem::replace(&mut *self.grid.write(), board)
    }
}

use parking_lot::Mutex;
use tracing::{debug, info, instrument};

use crate::board::{Board, CheckError, PlaceError, SharedBoard};
use crate::config::SessionConfig;
use crate::types::{GameOutcome, MoveReport, Player, Position, SessionSnapshot, TurnState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("game is already over")]
    Finished,
    #[error(transparent)]
    Place(#[from] PlaceError),
}

/// Returns `true` if `player` can capture from at least one blank square.
pub fn has_legal_move(board: &Board, player: Player) -> bool {
    Position::all().any(|pos| captures_any(board, pos, player))
}

/// Legal squares for `player`, row-major.
pub fn legal_moves(board: &Board, player: Player) -> Vec<Position> {
    Position::all()
        .filter(|&pos| captures_any(board, pos, player))
        .collect()
}

fn captures_any(board: &Board, pos: Position, player: Player) -> bool {
    board.state(pos).is_blank() && matches!(board.check(pos, player), Ok(flips) if !flips.is_empty())
}

/// Turn state for a position handed in from outside, with `to_move`
/// nominally on turn. Falls through to the other player, then to
/// `Finished`, when the named player cannot move.
pub fn settle_turn(board: &Board, to_move: Player) -> TurnState {
    if has_legal_move(board, to_move) {
        TurnState::AwaitingMove(to_move)
    } else if has_legal_move(board, to_move.other()) {
        info!(skipped = %to_move, "no legal move at start, turn passes");
        TurnState::AwaitingMove(to_move.other())
    } else {
        info!("no legal move for either player at start");
        TurnState::Finished
    }
}

/// Decides who moves after `current` has just moved on `board`.
///
/// The other player moves if they can; otherwise `current` moves again if
/// they can; otherwise the game is over, however many blanks remain.
#[instrument(level = "debug", skip(board))]
pub fn advance(board: &Board, current: Player) -> GameOutcome {
    let next = current.other();

    let outcome = if has_legal_move(board, next) {
        GameOutcome::Continue { next }
    } else if has_legal_move(board, current) {
        info!(skipped = %next, "no legal move, turn skipped");
        GameOutcome::Skip {
            skipped: next,
            next: current,
        }
    } else {
        info!(
            a = board.count(Player::A),
            b = board.count(Player::B),
            "no legal move for either player, game over"
        );
        GameOutcome::Finished
    };

    debug!(?outcome, "turn advanced");
    outcome
}

/// One game: the shared board plus whose turn it is.
///
/// `play` holds the turn lock for the whole place-then-advance sequence, so
/// concurrent callers can never move out of turn. `check` only reads.
#[derive(Debug)]
pub struct GameSession {
    board: SharedBoard,
    turn: Mutex<TurnState>,
    config: SessionConfig,
}

impl GameSession {
    pub fn new(config: SessionConfig) -> Self {
        Self::with_board(Board::new(), config.first_player, config)
    }

    /// Starts from an arbitrary position. `to_move` only gets the turn if
    /// they have a legal move there; see [`settle_turn`].
    pub fn with_board(board: Board, to_move: Player, config: SessionConfig) -> Self {
        Self {
            turn: Mutex::new(settle_turn(&board, to_move)),
            board: SharedBoard::new(board),
            config,
        }
    }

    pub fn turn(&self) -> TurnState {
        *self.turn.lock()
    }

    /// `None` once the game is over.
    pub fn current_player(&self) -> Option<Player> {
        self.turn().to_move()
    }

    pub fn board(&self) -> Board {
        self.board.snapshot()
    }

    /// Squares the player on turn would flip at `target`. Empty when the
    /// game is over or the move is not legal.
    pub fn check(&self, target: Position) -> Result<Vec<Position>, CheckError> {
        match self.current_player() {
            Some(player) => self.board.check(target, player),
            None => Ok(Vec::new()),
        }
    }

    #[instrument(skip(self))]
    pub fn play(&self, target: Position) -> Result<MoveReport, GameError> {
        let mut turn = self.turn.lock();
        let player = turn.to_move().ok_or(GameError::Finished)?;

        let flipped = self.board.place(target, player)?;
        let outcome = advance(&self.board.snapshot(), player);
        *turn = TurnState::after(outcome);

        Ok(MoveReport {
            player,
            placed: target,
            flipped,
            outcome,
        })
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let turn = self.turn.lock();
        SessionSnapshot {
            board: self.board.snapshot().to_snapshot(),
            turn: *turn,
        }
    }

    /// Back to the opening position.
    pub fn reset(&self) {
        let mut turn = self.turn.lock();
        self.board.replace(Board::new());
        *turn = TurnState::AwaitingMove(self.config.first_player);
        debug!(first = %self.config.first_player, "session reset");
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notation::parse_marked;
    use crate::types::CellState;

    fn pos(x: i32, y: i32) -> Position {
        Position::new(x, y).unwrap()
    }

    fn board(text: &str) -> Board {
        text.parse().unwrap()
    }

    const ONE_SIDED_CORNER: &str = "!,o,x,x,x,x,x,x
x,x,x,x,x,x,x,x
x,x,x,x,x,x,x,x
x,x,x,x,x,x,x,x
x,x,x,x,x,x,x,x
x,x,x,x,x,x,x,x
x,x,x,x,x,x,x,x
x,x,x,x,x,x,o,!";

    #[test]
    fn opening_move_hands_turn_to_other_player() {
        let mut board = Board::new();
        board.place(pos(4, 2), Player::A).unwrap();

        assert_eq!(advance(&board, Player::A), GameOutcome::Continue { next: Player::B });
    }

    #[test]
    fn opening_has_four_moves_for_each_player() {
        let board = Board::new();
        assert_eq!(legal_moves(&board, Player::A).len(), 4);
        assert_eq!(legal_moves(&board, Player::B).len(), 4);
    }

    #[test]
    fn opponent_without_moves_is_skipped() {
        let board = board(
            "!,o,x,x,x,x,x,x
x,x,x,x,x,x,x,x
x,x,x,x,x,x,x,x
x,x,x,x,x,x,x,x
x,x,x,x,x,x,x,x
x,x,x,x,x,x,x,x
x,x,x,x,x,x,x,x
x,x,x,x,x,x,x,x",
        );

        assert!(!has_legal_move(&board, Player::B));
        assert!(has_legal_move(&board, Player::A));
        assert_eq!(
            advance(&board, Player::A),
            GameOutcome::Skip {
                skipped: Player::B,
                next: Player::A
            }
        );
    }

    #[test]
    fn full_board_finishes_for_either_player() {
        let board = board(
            "x,x,x,x,o,o,o,o
x,x,x,x,o,o,o,o
x,x,x,x,o,o,o,o
x,x,x,x,o,o,o,o
o,o,o,o,x,x,x,x
o,o,o,o,x,x,x,x
o,o,o,o,x,x,x,x
o,o,o,o,x,x,x,x",
        );

        assert!(board.is_full());
        assert_eq!(advance(&board, Player::A), GameOutcome::Finished);
        assert_eq!(advance(&board, Player::B), GameOutcome::Finished);
    }

    #[test]
    fn game_ends_with_blanks_left_when_nobody_can_move() {
        let board = board(
            "-,-,-,-,-,-,-,-
-,-,-,-,-,-,-,-
-,-,-,x,x,x,-,-
-,-,-,x,x,x,-,-
-,-,-,x,x,x,-,-
-,-,-,-,-,-,-,-
-,-,-,-,-,-,-,-
-,-,-,-,-,-,-,-",
        );

        assert_eq!(board.blank_count(), 55);
        assert_eq!(advance(&board, Player::A), GameOutcome::Finished);
        assert_eq!(advance(&board, Player::B), GameOutcome::Finished);
    }

    #[test]
    fn session_starts_with_configured_player() {
        let session = GameSession::new(SessionConfig {
            first_player: Player::B,
        });
        assert_eq!(session.current_player(), Some(Player::B));
        assert_eq!(GameSession::default().current_player(), Some(Player::A));
    }

    #[test]
    fn session_play_reports_flips_and_switches_turn() {
        let session = GameSession::default();

        let report = session.play(pos(4, 2)).unwrap();

        assert_eq!(report.player, Player::A);
        assert_eq!(report.placed, pos(4, 2));
        assert_eq!(report.flipped, vec![pos(4, 3)]);
        assert_eq!(report.outcome, GameOutcome::Continue { next: Player::B });
        assert_eq!(session.turn(), TurnState::AwaitingMove(Player::B));
        assert_eq!(session.board().state(pos(4, 3)), CellState::OwnedByA);
    }

    #[test]
    fn session_rejects_illegal_moves_without_changing_turn() {
        let session = GameSession::default();
        let before = session.board();

        assert_eq!(
            session.play(pos(0, 0)),
            Err(GameError::Place(PlaceError::NoCaptures(pos(0, 0))))
        );
        assert_eq!(
            session.play(pos(3, 3)),
            Err(GameError::Place(PlaceError::AlreadyOccupied(pos(3, 3))))
        );
        assert_eq!(session.board(), before);
        assert_eq!(session.current_player(), Some(Player::A));
    }

    #[test]
    fn session_keeps_turn_after_skip_then_finishes() {
        let (board, marked) = parse_marked(ONE_SIDED_CORNER).unwrap();
        let session = GameSession::with_board(board, Player::A, SessionConfig::default());

        let first = session.play(marked[0]).unwrap();
        assert_eq!(
            first.outcome,
            GameOutcome::Skip {
                skipped: Player::B,
                next: Player::A
            }
        );
        assert_eq!(session.turn(), TurnState::Skipped(Player::B));
        assert_eq!(session.current_player(), Some(Player::A));
        assert_eq!(session.check(marked[1]), Ok(vec![pos(6, 7)]));

        let second = session.play(marked[1]).unwrap();
        assert_eq!(second.outcome, GameOutcome::Finished);
        assert_eq!(session.turn(), TurnState::Finished);
        assert!(session.board().is_full());
        assert_eq!(session.board().count(Player::A), 64);
    }

    #[test]
    fn finished_session_rejects_play_and_checks_empty() {
        let (board, marked) = parse_marked(ONE_SIDED_CORNER).unwrap();
        let session = GameSession::with_board(board, Player::A, SessionConfig::default());
        session.play(marked[0]).unwrap();
        session.play(marked[1]).unwrap();

        assert_eq!(session.play(pos(0, 0)), Err(GameError::Finished));
        assert_eq!(session.check(pos(0, 0)), Ok(Vec::new()));
        assert_eq!(session.current_player(), None);
    }

    #[test]
    fn session_from_board_keeps_the_named_player_when_they_can_move() {
        let session =
            GameSession::with_board(board(ONE_SIDED_CORNER), Player::A, SessionConfig::default());
        assert_eq!(session.turn(), TurnState::AwaitingMove(Player::A));
    }

    #[test]
    fn session_from_board_passes_to_the_player_who_can_move() {
        let session =
            GameSession::with_board(board(ONE_SIDED_CORNER), Player::B, SessionConfig::default());

        assert_eq!(session.turn(), TurnState::AwaitingMove(Player::A));
        let report = session.play(pos(0, 0)).unwrap();
        assert_eq!(report.player, Player::A);
        assert_eq!(report.flipped, vec![pos(1, 0)]);
    }

    #[test]
    fn session_from_board_with_no_moves_is_finished() {
        let stuck = board(
            "-,-,-,-,-,-,-,-
-,-,-,-,-,-,-,-
-,-,-,o,o,-,-,-
-,-,-,o,o,-,-,-
-,-,-,-,-,-,-,-
-,-,-,-,-,-,-,-
-,-,-,-,-,-,-,-
-,-,-,-,-,-,-,-",
        );

        let session = GameSession::with_board(stuck, Player::A, SessionConfig::default());

        assert_eq!(session.turn(), TurnState::Finished);
        assert_eq!(session.play(pos(2, 2)), Err(GameError::Finished));
    }

    #[test]
    fn reset_restores_opening() {
        let session = GameSession::default();
        session.play(pos(4, 2)).unwrap();

        session.reset();

        assert_eq!(session.board(), Board::new());
        assert_eq!(session.turn(), TurnState::AwaitingMove(Player::A));
    }

    #[test]
    fn snapshot_reports_counts_and_turn() {
        let session = GameSession::default();
        session.play(pos(4, 2)).unwrap();

        let snapshot = session.snapshot();

        assert_eq!(snapshot.board.count_a, 4);
        assert_eq!(snapshot.board.count_b, 1);
        assert_eq!(snapshot.board.cells.len(), 64);
        assert_eq!(snapshot.board.cells[pos(4, 2).index()], 1);
        assert_eq!(snapshot.turn, TurnState::AwaitingMove(Player::B));
    }
}

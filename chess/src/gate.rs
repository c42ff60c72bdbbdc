//! Move-legality gate.
//!
//! A move is tried on a cloned position first; callers only commit it to the
//! authoritative [`Game`] once every other check (such as training rules) has
//! passed.

use cozy_chess::{Move, Piece, Rank};

use crate::converters::parse_square;
use crate::game::{Game, HistoryEntry};
use crate::uci::{convert_uci_castling_to_cozy, with_default_promotion};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveRejected {
    #[error("Invalid square: {0}")]
    InvalidSquare(String),
    #[error("Invalid position: {0}")]
    InvalidPosition(String),
    #[error("Invalid move: {from}{to}")]
    Illegal { from: String, to: String },
    #[error("Unrecognised move: {0}")]
    Unparseable(String),
}

/// Validate `from`-`to` against the position in `current_fen`.
///
/// Returns the move as it would be recorded. Nothing outside the probe
/// position is mutated.
pub fn attempt_move(
    current_fen: &str,
    from: &str,
    to: &str,
    promotion: Option<Piece>,
) -> Result<HistoryEntry, MoveRejected> {
    let game = Game::from_fen(current_fen)
        .map_err(|e| MoveRejected::InvalidPosition(e.to_string()))?;
    game.try_move(from, to, promotion)
}

impl Game {
    /// Build the move for `from`-`to` and validate it on a clone of the
    /// current position. UCI castling (`e1g1`) is accepted and pawns reaching
    /// the last rank promote to a queen unless told otherwise.
    pub fn try_move(
        &self,
        from: &str,
        to: &str,
        promotion: Option<Piece>,
    ) -> Result<HistoryEntry, MoveRejected> {
        let from_sq =
            parse_square(from).ok_or_else(|| MoveRejected::InvalidSquare(from.to_string()))?;
        let to_sq = parse_square(to).ok_or_else(|| MoveRejected::InvalidSquare(to.to_string()))?;

        let board = self.position();
        let is_promotion = board.piece_on(from_sq) == Some(Piece::Pawn)
            && matches!(to_sq.rank(), Rank::First | Rank::Eighth);
        let mv = Move {
            from: from_sq,
            to: to_sq,
            promotion: if is_promotion { promotion } else { None },
        };
        let mv = convert_uci_castling_to_cozy(board, with_default_promotion(board, mv));

        let mut probe = self.clone();
        probe.make_move(mv).map_err(|_| MoveRejected::Illegal {
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}

use cozy_chess::{Board, GameStatus, Move};

use crate::fen::FenError;
use crate::san::format_san;
use crate::types::PieceColor;
use crate::uci::to_standard_uci;

/// Authoritative position plus the moves played from the start position.
#[derive(Debug, Clone)]
pub struct Game {
    position: Board,
    history: Vec<HistoryEntry>,
    start_fen: String,
}

/// One played move, with the notation needed by the trainer and the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub mv: Move,
    pub san: String,
    /// Standard UCI (castling as `e1g1`).
    pub uci: String,
    pub fen_before: String,
    pub fen_after: String,
}

impl Game {
    /// Create a new game from the standard starting position
    pub fn new() -> Self {
        Self {
            position: Board::default(),
            history: Vec::new(),
            start_fen: crate::fen::STARTING_FEN.to_string(),
        }
    }

    /// Create a game from a FEN string
    pub fn from_fen(fen: &str) -> Result<Self, GameError> {
        let position = crate::fen::parse_fen(fen)?;
        Ok(Self {
            start_fen: crate::fen::format_fen(&position),
            position,
            history: Vec::new(),
        })
    }

    pub fn position(&self) -> &Board {
        &self.position
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn start_fen(&self) -> &str {
        &self.start_fen
    }

    /// Number of half-moves played since the start position.
    pub fn ply(&self) -> usize {
        self.history.len()
    }

    /// Play a legal move on the board.
    pub fn make_move(&mut self, mv: Move) -> Result<HistoryEntry, GameError> {
        if !self.position.is_legal(mv) {
            return Err(GameError::IllegalMove);
        }

        let fen_before = self.to_fen();
        let san = format_san(&self.position, mv);
        let uci = to_standard_uci(&self.position, mv);
        self.position.play_unchecked(mv);

        let entry = HistoryEntry {
            mv,
            san,
            uci,
            fen_before,
            fen_after: self.to_fen(),
        };
        self.history.push(entry.clone());
        Ok(entry)
    }

    /// Back to the start position, dropping all history.
    pub fn reset(&mut self) -> Result<(), GameError> {
        self.position = crate::fen::parse_fen(&self.start_fen)?;
        self.history.clear();
        Ok(())
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::new();
        self.position.generate_moves(|mvs| {
            moves.extend(mvs);
            false
        });
        moves
    }

    pub fn status(&self) -> GameStatus {
        self.position.status()
    }

    pub fn side_to_move(&self) -> PieceColor {
        self.position.side_to_move().into()
    }

    pub fn to_fen(&self) -> String {
        crate::fen::format_fen(&self.position)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("Illegal move")]
    IllegalMove,
    #[error("FEN parse error: {0}")]
    FenError(#[from] FenError),
}

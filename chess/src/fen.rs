use cozy_chess::Board;

/// FEN of the standard initial position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Parse a FEN string into a Board
pub fn parse_fen(fen: &str) -> Result<Board, FenError> {
    let fen = fen.trim();
    if fen.split_whitespace().count() < 4 {
        return Err(FenError::InvalidFormat(fen.to_string()));
    }
    fen.parse()
        .map_err(|_| FenError::InvalidFormat(fen.to_string()))
}

/// Format a Board as a FEN string
pub fn format_fen(board: &Board) -> String {
    board.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FenError {
    #[error("Invalid FEN: {0}")]
    InvalidFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starting_fen_round_trip() {
        let board = parse_fen(STARTING_FEN).unwrap();
        assert_eq!(board, Board::default());
        assert_eq!(format_fen(&board), STARTING_FEN);
    }

    #[test]
    fn test_rejects_truncated_fen() {
        assert!(parse_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR").is_err());
        assert!(parse_fen("").is_err());
    }
}

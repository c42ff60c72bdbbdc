//! Standard Algebraic Notation

use cozy_chess::{Board, GameStatus, Move, Piece};

use crate::converters::{file_char, format_square, rank_char};
use crate::types::PieceKind;
use crate::uci::{convert_uci_castling_to_cozy, is_castling, parse_uci_move, with_default_promotion};

/// Format a legal move as SAN, including disambiguation and check suffixes.
///
/// `mv` must be legal on `board` (cozy_chess encoding).
pub fn format_san(board: &Board, mv: Move) -> String {
    let mut san = san_body(board, mv);

    let mut after = board.clone();
    after.play_unchecked(mv);
    if matches!(after.status(), GameStatus::Won) {
        san.push('#');
    } else if !after.checkers().is_empty() {
        san.push('+');
    }
    san
}

fn san_body(board: &Board, mv: Move) -> String {
    san_body_with(board, mv, None)
}

/// SAN body with an explicit disambiguation for piece moves, or the minimal
/// one when `from_hint` is `None`.
fn san_body_with(board: &Board, mv: Move, from_hint: Option<String>) -> String {
    let Some(piece) = board.piece_on(mv.from) else {
        return crate::uci::format_uci_move(mv);
    };

    if is_castling(board, mv) {
        return if mv.to.file() as u8 > mv.from.file() as u8 {
            "O-O".to_string()
        } else {
            "O-O-O".to_string()
        };
    }

    let mut san = String::new();
    let is_capture = board.color_on(mv.to).is_some()
        || (piece == Piece::Pawn && mv.from.file() != mv.to.file());

    match PieceKind::from(piece).san_letter() {
        None => {
            if is_capture {
                san.push(file_char(mv.from.file()));
            }
        }
        Some(letter) => {
            san.push(letter);
            let from = from_hint.unwrap_or_else(|| disambiguation(board, mv, piece));
            san.push_str(&from);
        }
    }

    if is_capture {
        san.push('x');
    }
    san.push_str(&format_square(mv.to));

    if let Some(promo) = mv.promotion {
        san.push('=');
        if let Some(letter) = PieceKind::from(promo).san_letter() {
            san.push(letter);
        }
    }
    san
}

/// File, rank, or both, whichever singles out `mv` among same-piece moves
/// landing on the same square.
fn disambiguation(board: &Board, mv: Move, piece: Piece) -> String {
    if piece == Piece::King {
        return String::new();
    }

    let mut rivals = Vec::new();
    board.generate_moves(|moves| {
        if moves.piece == piece && moves.from != mv.from {
            rivals.extend(moves.into_iter().filter(|m| m.to == mv.to));
        }
        false
    });

    if rivals.is_empty() {
        return String::new();
    }
    let shares_file = rivals.iter().any(|m| m.from.file() == mv.from.file());
    let shares_rank = rivals.iter().any(|m| m.from.rank() == mv.from.rank());

    match (shares_file, shares_rank) {
        (false, _) => file_char(mv.from.file()).to_string(),
        (true, false) => rank_char(mv.from.rank()).to_string(),
        (true, true) => format_square(mv.from),
    }
}

/// Every SAN body that names `mv`: the minimal one, plus the file, rank and
/// square qualified forms for piece moves (`Nbd7` where `Nd7` would do).
fn accepted_bodies(board: &Board, mv: Move) -> Vec<String> {
    let mut bodies = vec![san_body(board, mv)];
    let qualifiable = matches!(
        board.piece_on(mv.from),
        Some(Piece::Knight | Piece::Bishop | Piece::Rook | Piece::Queen)
    );
    if qualifiable {
        for hint in [
            file_char(mv.from.file()).to_string(),
            rank_char(mv.from.rank()).to_string(),
            format_square(mv.from),
        ] {
            let body = san_body_with(board, mv, Some(hint));
            if !bodies.contains(&body) {
                bodies.push(body);
            }
        }
    }
    bodies
}

/// Strip check, mate and annotation glyphs; normalise zero-castling.
pub fn normalize_san(san: &str) -> String {
    san.trim()
        .trim_end_matches(&['+', '#', '!', '?'][..])
        .replace('0', "O")
}

/// Parse a SAN move against the legal moves of `board`. Over-qualified
/// piece moves (`Nbd7`, `R1a3`, `Qd1d2`) are accepted when they still name
/// exactly one move.
pub fn parse_san(board: &Board, san: &str) -> Result<Move, MoveParseError> {
    let wanted = normalize_san(san);
    if wanted.is_empty() {
        return Err(MoveParseError::Empty);
    }

    let mut found = None;
    let mut legal = Vec::new();
    board.generate_moves(|moves| {
        legal.extend(moves);
        false
    });
    for mv in legal {
        if accepted_bodies(board, mv).contains(&wanted) {
            if found.is_some() {
                return Err(MoveParseError::Ambiguous(san.to_string()));
            }
            found = Some(mv);
        }
    }
    found.ok_or_else(|| MoveParseError::NoLegalMove(san.to_string()))
}

/// Parse user input as UCI (`g1f3`, `e1g1`) or SAN (`Nf3`, `O-O`).
/// The returned move is legal on `board`.
pub fn parse_move(board: &Board, input: &str) -> Result<Move, MoveParseError> {
    if let Some(mv) = parse_uci_move(input) {
        let mv = convert_uci_castling_to_cozy(board, with_default_promotion(board, mv));
        if board.is_legal(mv) {
            return Ok(mv);
        }
        return Err(MoveParseError::NoLegalMove(input.trim().to_string()));
    }
    parse_san(board, input)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveParseError {
    #[error("Empty move")]
    Empty,
    #[error("No legal move found for: {0}")]
    NoLegalMove(String),
    #[error("Ambiguous move: {0}")]
    Ambiguous(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uci::format_uci_move;

    fn board(fen: &str) -> Board {
        fen.parse().unwrap()
    }

    fn san_of(fen: &str, uci: &str) -> String {
        let b = board(fen);
        let mv = parse_move(&b, uci).unwrap();
        format_san(&b, mv)
    }

    #[test]
    fn test_pawn_and_piece_moves() {
        let start = crate::fen::STARTING_FEN;
        assert_eq!(san_of(start, "e2e4"), "e4");
        assert_eq!(san_of(start, "g1f3"), "Nf3");
    }

    #[test]
    fn test_captures() {
        let fen = "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2";
        assert_eq!(san_of(fen, "e4d5"), "exd5");
    }

    #[test]
    fn test_en_passant_is_a_capture() {
        let fen = "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3";
        assert_eq!(san_of(fen, "e5f6"), "exf6");
    }

    #[test]
    fn test_castling() {
        let fen = "r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1";
        assert_eq!(san_of(fen, "e1g1"), "O-O");
        assert_eq!(san_of(fen, "e1c1"), "O-O-O");
    }

    #[test]
    fn test_file_disambiguation() {
        // Knights on b1 and f1 can both reach d2
        let fen = "4k3/8/8/8/8/8/8/1N2KN2 w - - 0 1";
        assert_eq!(san_of(fen, "b1d2"), "Nbd2");
        assert_eq!(san_of(fen, "f1d2"), "Nfd2");
    }

    #[test]
    fn test_rank_disambiguation() {
        // Rooks on a1 and a5 can both reach a3
        let fen = "4k3/8/8/R7/8/8/8/R3K3 w - - 0 1";
        assert_eq!(san_of(fen, "a1a3"), "R1a3");
        assert_eq!(san_of(fen, "a5a3"), "R5a3");
    }

    #[test]
    fn test_check_and_mate_suffixes() {
        // Fool's mate
        let fen = "rnbqkbnr/pppp1ppp/8/4p3/6P1/5P2/PPPPP2P/RNBQKBNR b KQkq - 0 2";
        assert_eq!(san_of(fen, "d8h4"), "Qh4#");

        let fen = "4k3/8/8/8/8/8/8/R3K3 w - - 0 1";
        assert_eq!(san_of(fen, "a1a8"), "Ra8+");
    }

    #[test]
    fn test_promotion() {
        let fen = "8/4P3/8/8/8/8/k7/4K3 w - - 0 1";
        assert_eq!(san_of(fen, "e7e8q"), "e8=Q");
        assert_eq!(san_of(fen, "e7e8n"), "e8=N");
    }

    #[test]
    fn test_parse_san_round_trip() {
        let b = Board::default();
        let mv = parse_san(&b, "Nf3").unwrap();
        assert_eq!(format_uci_move(mv), "g1f3");
        assert!(parse_san(&b, "Nf3+").is_ok());
        assert!(matches!(
            parse_san(&b, "Ke2"),
            Err(MoveParseError::NoLegalMove(_))
        ));
        assert_eq!(parse_san(&b, "  "), Err(MoveParseError::Empty));
    }

    #[test]
    fn test_parse_zero_castling() {
        let b = board("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1");
        let mv = parse_san(&b, "0-0").unwrap();
        assert_eq!(format_uci_move(mv), "e1h1");
    }

    #[test]
    fn test_parse_move_rejects_illegal_uci() {
        let b = Board::default();
        assert!(parse_move(&b, "e2e5").is_err());
        assert!(parse_move(&b, "e2e4").is_ok());
    }

    #[test]
    fn test_parse_san_accepts_extra_disambiguation() {
        let b = Board::default();
        assert_eq!(format_uci_move(parse_san(&b, "Ngf3").unwrap()), "g1f3");
        assert_eq!(format_uci_move(parse_san(&b, "N1f3").unwrap()), "g1f3");
        assert_eq!(format_uci_move(parse_san(&b, "Ng1f3").unwrap()), "g1f3");
        // Wrong origin file names no legal move.
        assert!(matches!(parse_san(&b, "Nbf3"), Err(MoveParseError::NoLegalMove(_))));

        // Both knights stand on the first rank, so a rank qualifier is not enough.
        let two_knights = board("4k3/8/8/8/8/8/8/1N2KN2 w - - 0 1");
        assert!(matches!(parse_san(&two_knights, "N1d2"), Err(MoveParseError::Ambiguous(_))));
        assert_eq!(format_uci_move(parse_san(&two_knights, "Nb1d2").unwrap()), "b1d2");
    }

    #[test]
    fn test_parse_move_uci_promotes_to_queen_by_default() {
        let b = board("8/4P3/8/8/8/8/k7/4K3 w - - 0 1");
        let mv = parse_move(&b, "e7e8").unwrap();
        assert_eq!(mv.promotion, Some(Piece::Queen));
        assert_eq!(format_san(&b, mv), "e8=Q");
        assert_eq!(parse_move(&b, "e7e8r").unwrap().promotion, Some(Piece::Rook));
    }
}

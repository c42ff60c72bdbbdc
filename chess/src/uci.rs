//! UCI (long algebraic) move notation

use cozy_chess::{Board, File, Move, Piece, Rank, Square};

use crate::converters::{format_piece, format_square, parse_promotion, parse_square};

/// Convert UCI castling notation to cozy_chess notation
///
/// UCI moves the king two squares (e1g1, e1c1, e8g8, e8c8) while cozy_chess
/// encodes castling as king-takes-own-rook (e1h1, e1a1, e8h8, e8a8). The move
/// is only rewritten when the rewritten form is legal on `board`.
pub fn convert_uci_castling_to_cozy(board: &Board, mv: Move) -> Move {
    if board.piece_on(mv.from) != Some(Piece::King) || mv.promotion.is_some() {
        return mv;
    }
    if mv.from.file() != File::E || mv.from.rank() != mv.to.rank() {
        return mv;
    }

    let rook_file = match mv.to.file() {
        File::G => File::H,
        File::C => File::A,
        _ => return mv,
    };
    let converted = Move {
        from: mv.from,
        to: Square::new(rook_file, mv.from.rank()),
        promotion: None,
    };

    if board.is_legal(converted) {
        converted
    } else {
        mv
    }
}

/// A pawn reaching the last rank without a promotion piece promotes to a queen.
/// Any other move is returned unchanged.
pub fn with_default_promotion(board: &Board, mv: Move) -> Move {
    let reaches_last_rank = matches!(mv.to.rank(), Rank::First | Rank::Eighth);
    if mv.promotion.is_none() && reaches_last_rank && board.piece_on(mv.from) == Some(Piece::Pawn) {
        return Move {
            promotion: Some(Piece::Queen),
            ..mv
        };
    }
    mv
}

/// True when `mv` is a castling move in cozy_chess encoding.
pub fn is_castling(board: &Board, mv: Move) -> bool {
    board.piece_on(mv.from) == Some(Piece::King)
        && board.color_on(mv.to) == Some(board.side_to_move())
}

/// Format a move in UCI notation (e.g., "e2e4", "e7e8q")
///
/// This is the raw cozy_chess encoding; castling comes out as `e1h1`.
/// Use [`to_standard_uci`] for notation other programs understand.
pub fn format_uci_move(mv: Move) -> String {
    let mut s = format!("{}{}", format_square(mv.from), format_square(mv.to));
    if let Some(promo) = mv.promotion {
        s.push(format_piece(promo));
    }
    s
}

/// Format a move in standard UCI, rewriting castling to the king's
/// destination square (`e1h1` becomes `e1g1`).
pub fn to_standard_uci(board: &Board, mv: Move) -> String {
    if !is_castling(board, mv) {
        return format_uci_move(mv);
    }
    let king_file = if mv.to.file() as u8 > mv.from.file() as u8 {
        File::G
    } else {
        File::C
    };
    format_uci_move(Move {
        from: mv.from,
        to: Square::new(king_file, mv.from.rank()),
        promotion: None,
    })
}

/// Parse a UCI string (`e2e4`, `e7e8q`) into a move without checking legality.
pub fn parse_uci_move(s: &str) -> Option<Move> {
    let s = s.trim();
    if !s.is_ascii() || !(4..=5).contains(&s.len()) {
        return None;
    }
    let from = parse_square(&s[0..2])?;
    let to = parse_square(&s[2..4])?;
    let promotion = match s[4..].chars().next() {
        Some(c) => Some(parse_promotion(c)?),
        None => None,
    };
    Some(Move {
        from,
        to,
        promotion,
    })
}

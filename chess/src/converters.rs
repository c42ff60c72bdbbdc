//! Square and piece text conversions shared by the SAN and UCI modules.

use cozy_chess::{File, Piece, Rank, Square};

pub fn file_char(file: File) -> char {
    (b'a' + file as u8) as char
}

pub fn rank_char(rank: Rank) -> char {
    (b'1' + rank as u8) as char
}

/// Format a square as `e4`.
pub fn format_square(sq: Square) -> String {
    format!("{}{}", file_char(sq.file()), rank_char(sq.rank()))
}

/// Parse a square from `e4`. Case-insensitive on the file.
pub fn parse_square(s: &str) -> Option<Square> {
    let mut chars = s.chars();
    let file = chars.next()?.to_ascii_lowercase();
    let rank = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    let file_idx = (file as u32).checked_sub('a' as u32)? as usize;
    let rank_idx = (rank as u32).checked_sub('1' as u32)? as usize;
    if file_idx > 7 || rank_idx > 7 {
        return None;
    }
    Some(Square::new(File::index(file_idx), Rank::index(rank_idx)))
}

/// Lowercase promotion letter as used in UCI (`q`, `r`, `b`, `n`).
pub fn format_piece(piece: Piece) -> char {
    match piece {
        Piece::Pawn => 'p',
        Piece::Knight => 'n',
        Piece::Bishop => 'b',
        Piece::Rook => 'r',
        Piece::Queen => 'q',
        Piece::King => 'k',
    }
}

/// Parse a promotion piece letter in either case. Pawns and kings are rejected.
pub fn parse_promotion(c: char) -> Option<Piece> {
    match c.to_ascii_lowercase() {
        'n' => Some(Piece::Knight),
        'b' => Some(Piece::Bishop),
        'r' => Some(Piece::Rook),
        'q' => Some(Piece::Queen),
        _ => None,
    }
}

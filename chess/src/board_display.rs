//! Plain-text board rendering from FEN, seen from either side.

use crate::types::{PieceColor, PieceKind};

/// An 8x8 board for display purposes only.
#[derive(Debug, Clone, Default)]
pub struct DisplayBoard {
    squares: [[Option<(PieceKind, PieceColor)>; 8]; 8],
}

impl DisplayBoard {
    /// Parse the board placement from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, DisplayBoardError> {
        let placement = fen
            .split_whitespace()
            .next()
            .ok_or(DisplayBoardError::InvalidFen)?;

        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(DisplayBoardError::InvalidFen);
        }

        let mut squares = [[None; 8]; 8];
        for (rank_idx, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - rank_idx;
            let mut file = 0usize;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file += skip as usize;
                    continue;
                }
                if file > 7 {
                    return Err(DisplayBoardError::InvalidFen);
                }
                let color = if c.is_ascii_uppercase() {
                    PieceColor::White
                } else {
                    PieceColor::Black
                };
                let kind = PieceKind::from_char(c).ok_or(DisplayBoardError::InvalidPiece(c))?;
                squares[rank][file] = Some((kind, color));
                file += 1;
            }
            if file != 8 {
                return Err(DisplayBoardError::InvalidFen);
            }
        }

        Ok(DisplayBoard { squares })
    }

    pub fn piece_at(&self, file: u8, rank: u8) -> Option<(PieceKind, PieceColor)> {
        if file > 7 || rank > 7 {
            return None;
        }
        self.squares[rank as usize][file as usize]
    }

    /// Render with `orientation`'s pieces at the bottom. Empty squares are `.`.
    pub fn render(&self, orientation: PieceColor) -> String {
        let (ranks, files): (Vec<u8>, Vec<u8>) = match orientation {
            PieceColor::White => ((0..8).rev().collect(), (0..8).collect()),
            PieceColor::Black => ((0..8).collect(), (0..8).rev().collect()),
        };

        let mut out = String::new();
        for &rank in &ranks {
            out.push((b'1' + rank) as char);
            for &file in &files {
                out.push(' ');
                out.push(match self.piece_at(file, rank) {
                    Some((kind, color)) => kind.to_char(color),
                    None => '.',
                });
            }
            out.push('\n');
        }
        out.push(' ');
        for &file in &files {
            out.push(' ');
            out.push((b'a' + file) as char);
        }
        out.push('\n');
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DisplayBoardError {
    #[error("Invalid FEN string")]
    InvalidFen,
    #[error("Invalid piece character: {0}")]
    InvalidPiece(char),
}

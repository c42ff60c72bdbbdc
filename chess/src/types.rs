//! Project-owned piece and colour types.
//! cozy-chess types stay an implementation detail of this crate.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

/// Side of the board. Doubles as the trainee's orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceColor {
    #[default]
    White,
    Black,
}

impl PieceKind {
    /// SAN letter; pawns have none.
    pub fn san_letter(self) -> Option<char> {
        match self {
            Self::Pawn => None,
            Self::Knight => Some('N'),
            Self::Bishop => Some('B'),
            Self::Rook => Some('R'),
            Self::Queen => Some('Q'),
            Self::King => Some('K'),
        }
    }

    pub fn to_char(self, color: PieceColor) -> char {
        let upper = self.san_letter().unwrap_or('P');
        match color {
            PieceColor::White => upper,
            PieceColor::Black => upper.to_ascii_lowercase(),
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'p' => Some(Self::Pawn),
            'n' => Some(Self::Knight),
            'b' => Some(Self::Bishop),
            'r' => Some(Self::Rook),
            'q' => Some(Self::Queen),
            'k' => Some(Self::King),
            _ => None,
        }
    }
}

impl PieceColor {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Black => "black",
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }
}

impl std::str::FromStr for PieceColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "white" | "w" => Ok(Self::White),
            "black" | "b" => Ok(Self::Black),
            other => Err(format!("unknown colour: {other}")),
        }
    }
}

impl From<cozy_chess::Piece> for PieceKind {
    fn from(p: cozy_chess::Piece) -> Self {
        match p {
            cozy_chess::Piece::Pawn => Self::Pawn,
            cozy_chess::Piece::Knight => Self::Knight,
            cozy_chess::Piece::Bishop => Self::Bishop,
            cozy_chess::Piece::Rook => Self::Rook,
            cozy_chess::Piece::Queen => Self::Queen,
            cozy_chess::Piece::King => Self::King,
        }
    }
}

impl From<PieceKind> for cozy_chess::Piece {
    fn from(p: PieceKind) -> Self {
        match p {
            PieceKind::Pawn => Self::Pawn,
            PieceKind::Knight => Self::Knight,
            PieceKind::Bishop => Self::Bishop,
            PieceKind::Rook => Self::Rook,
            PieceKind::Queen => Self::Queen,
            PieceKind::King => Self::King,
        }
    }
}

impl From<cozy_chess::Color> for PieceColor {
    fn from(c: cozy_chess::Color) -> Self {
        match c {
            cozy_chess::Color::White => Self::White,
            cozy_chess::Color::Black => Self::Black,
        }
    }
}

impl std::fmt::Display for PieceColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colour_round_trip_through_str() {
        assert_eq!("white".parse::<PieceColor>(), Ok(PieceColor::White));
        assert_eq!("B".parse::<PieceColor>(), Ok(PieceColor::Black));
        assert!("green".parse::<PieceColor>().is_err());
    }

    #[test]
    fn test_opposite() {
        assert_eq!(PieceColor::White.opposite(), PieceColor::Black);
        assert_eq!(PieceColor::Black.opposite(), PieceColor::White);
    }

    #[test]
    fn test_piece_chars() {
        assert_eq!(PieceKind::Knight.to_char(PieceColor::White), 'N');
        assert_eq!(PieceKind::Pawn.to_char(PieceColor::Black), 'p');
        assert_eq!(PieceKind::Pawn.san_letter(), None);
    }
}

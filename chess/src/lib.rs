pub mod board_display;
pub mod converters;
pub mod fen;
pub mod game;
pub mod gate;
pub mod san;
pub mod types;
pub mod uci;

pub use board_display::{DisplayBoard, DisplayBoardError};
pub use converters::*;
pub use fen::{FenError, STARTING_FEN};
pub use game::{Game, GameError, HistoryEntry};
pub use gate::{attempt_move, MoveRejected};
pub use san::{format_san, parse_move, parse_san, MoveParseError};
pub use types::{PieceColor, PieceKind};
pub use uci::{convert_uci_castling_to_cozy, format_uci_move, is_castling, to_standard_uci};

//! Training board: the authoritative position plus the session rules.
//!
//! A user move goes through two gates. The rules engine must accept it on a
//! cloned position, then the session must allow it. Disallowed moves are
//! staged until the user decides whether they count as an error.

use chess::{Game, HistoryEntry, MoveRejected, PieceColor};
use chrono::{DateTime, Utc};
use cozy_chess::Piece;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::session::{SessionError, SessionSnapshot, TrainingSession};

/// A legal move that the repertoire does not expect here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedWrongMove {
    pub fen: String,
    /// UCI of the attempted move.
    pub wrong_move: String,
    pub wrong_move_san: String,
    /// SAN of the moves the repertoire expects.
    pub expected_moves: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrongMoveDecision {
    CountAsError,
    Ignore,
}

/// Body of `POST /position-errors`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionErrorReport {
    pub fen: String,
    pub repertoire_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<PieceColor>,
    pub wrong_move: String,
    pub expected_moves: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Played on the board and fed to the session.
    Applied {
        played: HistoryEntry,
        snapshot: SessionSnapshot,
    },
    /// The rules engine refused the move. Nothing changed.
    Rejected(MoveRejected),
    /// Legal but not in the repertoire. Resolve with
    /// [`TrainingBoard::resolve_wrong_move`].
    NeedsConfirmation(StagedWrongMove),
}

#[derive(Debug, Clone)]
pub struct TrainingBoard {
    game: Game,
    session: TrainingSession,
    staged: Option<StagedWrongMove>,
}

impl TrainingBoard {
    pub fn new(session: TrainingSession) -> Result<Self, SessionError> {
        let game = Game::from_fen(session.start_fen())
            .map_err(|e| SessionError::InvalidPosition(e.to_string()))?;
        Ok(Self {
            game,
            session,
            staged: None,
        })
    }

    pub fn fen(&self) -> String {
        self.game.to_fen()
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn session(&self) -> &TrainingSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut TrainingSession {
        &mut self.session
    }

    pub fn staged_wrong_move(&self) -> Option<&StagedWrongMove> {
        self.staged.as_ref()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    /// Try a user move given as squares (`e2`, `e4`).
    pub fn attempt_move(
        &mut self,
        from: &str,
        to: &str,
        promotion: Option<Piece>,
        now: DateTime<Utc>,
    ) -> Result<MoveOutcome, SessionError> {
        self.ensure_user_can_move()?;

        let played = match self.game.try_move(from, to, promotion) {
            Ok(played) => played,
            Err(rejected) => {
                tracing::debug!(%rejected, "Move rejected by rules engine");
                return Ok(MoveOutcome::Rejected(rejected));
            }
        };
        self.route(played, now)
    }

    /// Try a user move written as UCI (`g1f3`) or SAN (`Nf3`).
    pub fn attempt_notation(&mut self, input: &str, now: DateTime<Utc>) -> Result<MoveOutcome, SessionError> {
        self.ensure_user_can_move()?;

        let mv = match chess::parse_move(self.game.position(), input) {
            Ok(mv) => mv,
            Err(e) => {
                tracing::debug!(input, error = %e, "Unparseable move");
                return Ok(MoveOutcome::Rejected(MoveRejected::Unparseable(input.trim().to_string())));
            }
        };
        let mut probe = self.game.clone();
        let played = probe
            .make_move(mv)
            .map_err(|e| SessionError::InvalidMove(e.to_string()))?;
        self.route(played, now)
    }

    /// Settle the staged wrong move. A counted error yields the report for the
    /// position-error collaborator; an ignored one yields nothing.
    pub fn resolve_wrong_move(
        &mut self,
        decision: WrongMoveDecision,
    ) -> Result<Option<PositionErrorReport>, SessionError> {
        let staged = self.staged.take().ok_or(SessionError::NoWrongMovePending)?;

        match decision {
            WrongMoveDecision::CountAsError => {
                let report = PositionErrorReport {
                    fen: staged.fen,
                    repertoire_id: self.session.repertoire_id().to_string(),
                    variant_name: self.session.current_variant_name().map(str::to_string),
                    orientation: Some(self.session.orientation()),
                    wrong_move: staged.wrong_move,
                    expected_moves: staged.expected_moves,
                };
                self.session.record_wrong_move(true);
                tracing::info!(
                    session_id = %self.session.session_id(),
                    wrong_move = %report.wrong_move,
                    "Wrong move counted"
                );
                Ok(Some(report))
            }
            WrongMoveDecision::Ignore => {
                self.session.record_wrong_move(false);
                tracing::debug!(wrong_move = %staged.wrong_move, "Wrong move ignored");
                Ok(None)
            }
        }
    }

    /// Play the simulated opponent's reply. The caller owns the delay.
    pub fn play_opponent_move<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Result<(HistoryEntry, SessionSnapshot), SessionError> {
        let node = self.session.choose_opponent_move(rng)?;
        let mv = chess::parse_san(self.game.position(), &node.san)
            .map_err(|e| SessionError::InvalidMove(e.to_string()))?;
        let played = self
            .game
            .make_move(mv)
            .map_err(|e| SessionError::InvalidMove(e.to_string()))?;
        let snapshot = self.commit(&played, now)?;
        Ok((played, snapshot))
    }

    /// SAN of the expected moves. Counts as a hint.
    pub fn hint(&mut self) -> Vec<String> {
        self.session
            .use_hint()
            .into_iter()
            .map(|node| node.san)
            .collect()
    }

    fn ensure_user_can_move(&self) -> Result<(), SessionError> {
        if self.staged.is_some() {
            return Err(SessionError::WrongMovePending);
        }
        if self.session.is_finished() {
            return Err(SessionError::SessionFinished);
        }
        if self.session.is_opponent_turn() {
            return Err(SessionError::NotUserTurn);
        }
        Ok(())
    }

    fn route(&mut self, played: HistoryEntry, now: DateTime<Utc>) -> Result<MoveOutcome, SessionError> {
        if self.session.is_allowed(&played.san) {
            self.game
                .make_move(played.mv)
                .map_err(|e| SessionError::InvalidMove(e.to_string()))?;
            let snapshot = self.commit(&played, now)?;
            return Ok(MoveOutcome::Applied { played, snapshot });
        }

        let staged = StagedWrongMove {
            fen: played.fen_before.clone(),
            wrong_move: played.uci.clone(),
            wrong_move_san: played.san.clone(),
            expected_moves: self
                .session
                .allowed_moves()
                .into_iter()
                .map(|node| node.san)
                .collect(),
        };
        tracing::debug!(
            wrong_move = %staged.wrong_move_san,
            expected = ?staged.expected_moves,
            "Move not in repertoire, awaiting decision"
        );
        self.staged = Some(staged.clone());
        Ok(MoveOutcome::NeedsConfirmation(staged))
    }

    fn commit(&mut self, played: &HistoryEntry, now: DateTime<Utc>) -> Result<SessionSnapshot, SessionError> {
        let snapshot = self.session.apply_move(&played.san, now)?;
        if snapshot.rewound {
            self.game
                .reset()
                .map_err(|e| SessionError::InvalidPosition(e.to_string()))?;
        }
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::{MoveNode, TrainVariant, Variant};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn t0() -> DateTime<Utc> {
        "2026-10-19T09:00:00Z".parse().unwrap()
    }

    fn board(orientation: PieceColor, lines: &[(&str, &[&str])]) -> TrainingBoard {
        let variants = lines
            .iter()
            .map(|(name, sans)| {
                let moves = sans
                    .iter()
                    .enumerate()
                    .map(|(i, san)| MoveNode::new(i.to_string(), *san))
                    .collect();
                TrainVariant::new(Variant::new(*name, moves), t0())
            })
            .collect();
        let session = TrainingSession::new("rep-1", orientation, chess::STARTING_FEN, variants).unwrap();
        TrainingBoard::new(session).unwrap()
    }

    #[test]
    fn test_illegal_move_is_rejected_without_state_change() {
        let mut b = board(PieceColor::White, &[("Ruy Lopez", &["e4", "e5", "Nf3"])]);
        let before = b.fen();
        let outcome = b.attempt_move("e2", "e5", None, t0()).unwrap();
        assert!(matches!(outcome, MoveOutcome::Rejected(_)));
        assert_eq!(b.fen(), before);
        assert!(b.staged_wrong_move().is_none());
    }

    #[test]
    fn test_allowed_move_is_applied() {
        let mut b = board(PieceColor::White, &[("Ruy Lopez", &["e4", "e5", "Nf3"])]);
        let outcome = b.attempt_move("e2", "e4", None, t0()).unwrap();
        let MoveOutcome::Applied { played, snapshot } = outcome else {
            panic!("expected applied move");
        };
        assert_eq!(played.san, "e4");
        assert_eq!(snapshot.ply, 1);
        assert!(snapshot.opponent_to_move);
        assert_eq!(b.game().ply(), 1);
    }

    #[test]
    fn test_disallowed_move_is_staged_then_counted() {
        let mut b = board(PieceColor::White, &[("Ruy Lopez", &["e4", "e5", "Nf3"])]);
        let before = b.fen();
        let outcome = b.attempt_move("d2", "d4", None, t0()).unwrap();
        let MoveOutcome::NeedsConfirmation(staged) = outcome else {
            panic!("expected confirmation");
        };
        assert_eq!(staged.wrong_move, "d2d4");
        assert_eq!(staged.expected_moves, vec!["e4"]);
        assert_eq!(staged.fen, before);
        assert_eq!(b.fen(), before);

        // No new move until the staged one is settled.
        assert_eq!(
            b.attempt_move("e2", "e4", None, t0()),
            Err(SessionError::WrongMovePending)
        );

        let report = b.resolve_wrong_move(WrongMoveDecision::CountAsError).unwrap().unwrap();
        assert_eq!(report.repertoire_id, "rep-1");
        assert_eq!(report.variant_name.as_deref(), Some("Ruy Lopez"));
        assert_eq!(report.orientation, Some(PieceColor::White));
        assert_eq!(report.wrong_move, "d2d4");
        assert_eq!(b.session().variants()[0].wrong_moves, 1);
        assert_eq!(
            b.resolve_wrong_move(WrongMoveDecision::Ignore),
            Err(SessionError::NoWrongMovePending)
        );
    }

    #[test]
    fn test_ignored_wrong_move_is_not_reported() {
        let mut b = board(PieceColor::White, &[("Ruy Lopez", &["e4", "e5", "Nf3"])]);
        b.attempt_notation("d4", t0()).unwrap();
        assert_eq!(b.resolve_wrong_move(WrongMoveDecision::Ignore).unwrap(), None);
        let variant = &b.session().variants()[0];
        assert_eq!(variant.wrong_moves, 0);
        assert_eq!(variant.ignored_wrong_moves, 1);
    }

    #[test]
    fn test_user_cannot_move_for_the_opponent() {
        let mut b = board(PieceColor::Black, &[("Sicilian Defense", &["e4", "c5"])]);
        assert_eq!(
            b.attempt_move("e2", "e4", None, t0()),
            Err(SessionError::NotUserTurn)
        );
    }

    #[test]
    fn test_full_line_with_opponent_and_rewind() {
        let mut b = board(
            PieceColor::Black,
            &[
                ("Sicilian Defense: Open", &["e4", "c5", "Nf3"]),
                ("French Defense", &["e4", "e6"]),
            ],
        );
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let (reply, _) = b.play_opponent_move(&mut rng, t0()).unwrap();
        assert_eq!(reply.san, "e4");

        let MoveOutcome::Applied { snapshot, .. } = b.attempt_notation("e6", t0()).unwrap() else {
            panic!("expected applied move");
        };
        // French finished, Sicilian discarded, so the board rewinds.
        assert_eq!(snapshot.newly_finished, vec!["French Defense"]);
        assert!(snapshot.rewound);
        assert_eq!(b.fen(), chess::STARTING_FEN);
        assert!(snapshot.opponent_to_move);

        b.play_opponent_move(&mut rng, t0()).unwrap();
        b.attempt_notation("c5", t0()).unwrap();
        let (_, snapshot) = b.play_opponent_move(&mut rng, t0()).unwrap();
        assert!(snapshot.is_finished);
        assert_eq!(b.session().pending_reviews().count(), 2);
        assert_eq!(
            b.attempt_notation("Nc6", t0()),
            Err(SessionError::SessionFinished)
        );
    }

    #[test]
    fn test_hint_lists_expected_moves() {
        let mut b = board(
            PieceColor::White,
            &[("Ruy Lopez", &["e4", "e5", "Nf3"]), ("London System", &["d4", "d5", "Bf4"])],
        );
        assert_eq!(b.hint(), vec!["e4", "d4"]);
        assert!(b.session().variants().iter().all(|v| v.hints_used == 1));
    }

    #[test]
    fn test_typed_promotion_defaults_to_queen() {
        let fen = "8/4P3/8/8/8/8/k7/4K3 w - - 0 1";
        let line = vec![MoveNode::new("0", "e8=Q")];
        let promote = || {
            let variants = vec![TrainVariant::new(Variant::new("Promotion", line.clone()), t0())];
            TrainingBoard::new(TrainingSession::new("rep-1", PieceColor::White, fen, variants).unwrap()).unwrap()
        };

        let mut by_squares = promote();
        assert!(matches!(
            by_squares.attempt_move("e7", "e8", None, t0()).unwrap(),
            MoveOutcome::Applied { .. }
        ));

        let mut by_notation = promote();
        let MoveOutcome::Applied { played, snapshot } = by_notation.attempt_notation("e7e8", t0()).unwrap() else {
            panic!("expected applied promotion");
        };
        assert_eq!(played.san, "e8=Q");
        assert!(snapshot.is_finished);
    }

    #[test]
    fn test_unrecognised_notation_is_rejected() {
        let mut b = board(PieceColor::White, &[("Ruy Lopez", &["e4", "e5", "Nf3"])]);
        assert_eq!(
            b.attempt_notation(" castle ", t0()).unwrap(),
            MoveOutcome::Rejected(MoveRejected::Unparseable("castle".into()))
        );
        assert_eq!(b.game().ply(), 0);
    }

    #[test]
    fn test_over_qualified_repertoire_moves_still_match() {
        let mut b = board(PieceColor::Black, &[("Four Knights", &["e4", "e5", "Ngf3", "Nbc6"])]);
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        b.play_opponent_move(&mut rng, t0()).unwrap();
        b.attempt_notation("e5", t0()).unwrap();
        let (reply, _) = b.play_opponent_move(&mut rng, t0()).unwrap();
        assert_eq!(reply.san, "Nf3");

        assert_eq!(b.hint(), vec!["Nc6"]);
        let MoveOutcome::Applied { snapshot, .. } = b.attempt_notation("Nc6", t0()).unwrap() else {
            panic!("expected applied move");
        };
        assert_eq!(snapshot.newly_finished, vec!["Four Knights"]);
    }
}

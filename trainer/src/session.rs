//! Training-session state machine.
//!
//! One [`TrainingSession`] drills a fixed set of variants from a single start
//! position. Every confirmed move goes through [`TrainingSession::apply_move`],
//! which updates the variant states and returns an immutable
//! [`SessionSnapshot`]. The session never sees illegal or disallowed moves;
//! the board layer filters those out first.

use chess::PieceColor;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use uuid::Uuid;

use crate::rating::suggest_review_rating;
use crate::review::{PendingVariantReview, ReviewQueue};
use crate::variant::{opening_name, MoveNode, TrainVariant, TrainVariantState};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("No variants to train")]
    NoVariants,
    #[error("Variant has no moves: {0}")]
    EmptyVariant(String),
    #[error("Invalid start position: {0}")]
    InvalidPosition(String),
    #[error("Training session already finished")]
    SessionFinished,
    #[error("It is not the opponent's turn")]
    NotOpponentTurn,
    #[error("It is not your turn")]
    NotUserTurn,
    #[error("A wrong move is waiting for a decision")]
    WrongMovePending,
    #[error("No wrong move is waiting for a decision")]
    NoWrongMovePending,
    #[error("Move not playable: {0}")]
    InvalidMove(String),
}

/// State of one variant as seen in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantStatus {
    pub full_name: String,
    pub state: TrainVariantState,
}

/// Immutable view of the session after a transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    /// Moves played since the start position (or the last rewind).
    pub ply: usize,
    pub turn: PieceColor,
    pub allowed_moves: Vec<MoveNode>,
    pub variants: Vec<VariantStatus>,
    pub finished_count: usize,
    pub total_count: usize,
    pub is_finished: bool,
    /// The opponent should move next, after the usual delay.
    pub opponent_to_move: bool,
    /// This transition rewound the session to the start position.
    pub rewound: bool,
    /// Variants that reached `Finished` in this transition.
    pub newly_finished: Vec<String>,
    pub pending_reviews: usize,
}

#[derive(Debug, Clone)]
pub struct TrainingSession {
    session_id: Uuid,
    repertoire_id: String,
    orientation: PieceColor,
    start_fen: String,
    start_side: PieceColor,
    variants: Vec<TrainVariant>,
    played: Vec<String>,
    pending: ReviewQueue,
    rewinds: u32,
}

impl TrainingSession {
    /// `orientation` is the colour the user plays; the session plays the other.
    pub fn new(
        repertoire_id: impl Into<String>,
        orientation: PieceColor,
        start_fen: &str,
        mut variants: Vec<TrainVariant>,
    ) -> Result<Self, SessionError> {
        if variants.is_empty() {
            return Err(SessionError::NoVariants);
        }
        if let Some(empty) = variants.iter().find(|v| v.variant.is_empty()) {
            return Err(SessionError::EmptyVariant(empty.variant.full_name.clone()));
        }
        let start = chess::Game::from_fen(start_fen)
            .map_err(|e| SessionError::InvalidPosition(e.to_string()))?;
        for variant in &mut variants {
            canonicalize_line(&start, variant);
        }

        let session = Self {
            session_id: Uuid::new_v4(),
            repertoire_id: repertoire_id.into(),
            orientation,
            start_fen: start.to_fen(),
            start_side: start.side_to_move(),
            variants,
            played: Vec::new(),
            pending: ReviewQueue::new(),
            rewinds: 0,
        };
        tracing::info!(
            session_id = %session.session_id,
            repertoire_id = %session.repertoire_id,
            variants = session.variants.len(),
            orientation = %orientation,
            "Training session created"
        );
        Ok(session)
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn repertoire_id(&self) -> &str {
        &self.repertoire_id
    }

    pub fn orientation(&self) -> PieceColor {
        self.orientation
    }

    pub fn start_fen(&self) -> &str {
        &self.start_fen
    }

    pub fn variants(&self) -> &[TrainVariant] {
        &self.variants
    }

    pub fn ply(&self) -> usize {
        self.played.len()
    }

    pub fn rewinds(&self) -> u32 {
        self.rewinds
    }

    pub fn turn(&self) -> PieceColor {
        if self.played.len() % 2 == 0 {
            self.start_side
        } else {
            self.start_side.opposite()
        }
    }

    pub fn is_finished(&self) -> bool {
        self.variants.iter().all(TrainVariant::is_finished)
    }

    pub fn is_opponent_turn(&self) -> bool {
        !self.is_finished() && self.turn() != self.orientation
    }

    /// `(finished, total)` variant counts.
    pub fn progress(&self) -> (usize, usize) {
        let finished = self.variants.iter().filter(|v| v.is_finished()).count();
        (finished, self.variants.len())
    }

    /// Distinct moves expected at the current ply across in-progress
    /// variants, in first-seen order.
    pub fn allowed_moves(&self) -> Vec<MoveNode> {
        let ply = self.played.len();
        let mut allowed: Vec<MoveNode> = Vec::new();
        for variant in self.variants.iter().filter(|v| v.is_in_progress()) {
            if let Some(node) = variant.variant.move_at(ply) {
                if !allowed.iter().any(|a| a.matches(&node.san)) {
                    allowed.push(node.clone());
                }
            }
        }
        allowed
    }

    pub fn is_allowed(&self, san: &str) -> bool {
        self.allowed_moves().iter().any(|m| m.matches(san))
    }

    /// Apply a confirmed move and advance every variant's state.
    pub fn apply_move(&mut self, san: &str, now: DateTime<Utc>) -> Result<SessionSnapshot, SessionError> {
        if self.is_finished() {
            return Err(SessionError::SessionFinished);
        }

        self.played.push(san.to_string());
        let ply = self.played.len();
        let mut newly_finished = Vec::new();

        for variant in self.variants.iter_mut().filter(|v| v.is_in_progress()) {
            let matches = variant
                .variant
                .move_at(ply - 1)
                .is_some_and(|node| node.matches(san));

            if !matches {
                variant.state = TrainVariantState::Discarded;
            } else if variant.variant.len() == ply {
                variant.state = TrainVariantState::Finished;
                newly_finished.push(variant.variant.full_name.clone());
                self.pending.push(pending_review_for(variant, &self.start_fen, now));
            }
        }

        tracing::debug!(
            session_id = %self.session_id,
            ply,
            san,
            finished = newly_finished.len(),
            "Move applied"
        );
        for name in &newly_finished {
            tracing::info!(session_id = %self.session_id, variant = %name, "Variant finished");
        }

        let rewound = !self.is_finished() && self.allowed_moves().is_empty();
        if rewound {
            self.rewind(now);
        }

        Ok(self.build_snapshot(rewound, newly_finished))
    }

    /// Pick the opponent's reply uniformly among the allowed moves.
    pub fn choose_opponent_move<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<MoveNode, SessionError> {
        if self.is_finished() {
            return Err(SessionError::SessionFinished);
        }
        if !self.is_opponent_turn() {
            return Err(SessionError::NotOpponentTurn);
        }
        let allowed = self.allowed_moves();
        if allowed.is_empty() {
            return Err(SessionError::InvalidMove("no move available".to_string()));
        }
        let idx = rng.gen_range(0..allowed.len());
        Ok(allowed[idx].clone())
    }

    /// Reveal the expected moves. Counts as a hint on every in-progress variant.
    pub fn use_hint(&mut self) -> Vec<MoveNode> {
        for variant in self.variants.iter_mut().filter(|v| v.is_in_progress()) {
            variant.hints_used += 1;
        }
        self.allowed_moves()
    }

    /// Book a disallowed move against every in-progress variant.
    pub fn record_wrong_move(&mut self, counted: bool) {
        for variant in self.variants.iter_mut().filter(|v| v.is_in_progress()) {
            if counted {
                variant.wrong_moves += 1;
            } else {
                variant.ignored_wrong_moves += 1;
            }
        }
    }

    /// Full name of the first in-progress variant, used as error context.
    pub fn current_variant_name(&self) -> Option<&str> {
        self.variants
            .iter()
            .find(|v| v.is_in_progress())
            .map(|v| v.variant.full_name.as_str())
    }

    pub fn pending_reviews(&self) -> impl Iterator<Item = &PendingVariantReview> {
        self.pending.iter()
    }

    /// The review that should be rated now.
    pub fn next_pending_review(&self) -> Option<&PendingVariantReview> {
        self.pending.current()
    }

    pub fn take_pending_review(&mut self) -> Option<PendingVariantReview> {
        self.pending.pop()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.build_snapshot(false, Vec::new())
    }

    /// Bring discarded variants back and restart from the start position.
    fn rewind(&mut self, now: DateTime<Utc>) {
        let mut resumed = 0;
        for variant in self
            .variants
            .iter_mut()
            .filter(|v| v.state == TrainVariantState::Discarded)
        {
            variant.resume(now);
            resumed += 1;
        }
        self.played.clear();
        self.rewinds += 1;
        tracing::debug!(session_id = %self.session_id, resumed, "Session rewound");
    }

    fn build_snapshot(&self, rewound: bool, newly_finished: Vec<String>) -> SessionSnapshot {
        let finished_count = self.variants.iter().filter(|v| v.is_finished()).count();
        let is_finished = finished_count == self.variants.len();
        SessionSnapshot {
            session_id: self.session_id,
            ply: self.played.len(),
            turn: self.turn(),
            allowed_moves: if is_finished { Vec::new() } else { self.allowed_moves() },
            variants: self
                .variants
                .iter()
                .map(|v| VariantStatus {
                    full_name: v.variant.full_name.clone(),
                    state: v.state,
                })
                .collect(),
            finished_count,
            total_count: self.variants.len(),
            is_finished,
            opponent_to_move: self.is_opponent_turn(),
            rewound,
            newly_finished,
            pending_reviews: self.pending.len(),
        }
    }
}

fn pending_review_for(variant: &TrainVariant, start_fen: &str, now: DateTime<Utc>) -> PendingVariantReview {
    let time_spent_sec = (now - variant.started_at).num_seconds().max(1) as u64;
    PendingVariantReview {
        variant_name: variant.variant.full_name.clone(),
        opening_name: opening_name(&variant.variant.full_name),
        start_fen: start_fen.to_string(),
        wrong_moves: variant.wrong_moves,
        ignored_wrong_moves: variant.ignored_wrong_moves,
        hints_used: variant.hints_used,
        time_spent_sec,
        suggested_rating: suggest_review_rating(
            i64::from(variant.wrong_moves),
            i64::from(variant.hints_used),
            time_spent_sec as i64,
        ),
    }
}

/// Replay a line from the start position and rewrite each move in the SAN
/// the board produces, so `Nbd7` in the repertoire matches a played `Nd7`.
/// A move that does not resolve leaves the rest of the line untouched.
fn canonicalize_line(start: &chess::Game, variant: &mut TrainVariant) {
    let mut game = start.clone();
    for node in &mut variant.variant.moves {
        let played = chess::parse_san(game.position(), &node.san)
            .map_err(|e| e.to_string())
            .and_then(|mv| game.make_move(mv).map_err(|e| e.to_string()));
        match played {
            Ok(entry) => {
                if !node.matches(&entry.san) {
                    node.san = entry.san;
                }
            }
            Err(error) => {
                tracing::warn!(
                    variant = %variant.variant.full_name,
                    san = %node.san,
                    %error,
                    "Repertoire move does not resolve on the board"
                );
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::ReviewRating;
    use crate::variant::Variant;
    use chrono::Duration;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn t0() -> DateTime<Utc> {
        "2026-10-19T09:00:00Z".parse().unwrap()
    }

    fn line(full_name: &str, sans: &[&str]) -> Variant {
        let moves = sans
            .iter()
            .enumerate()
            .map(|(i, san)| MoveNode::new(format!("{full_name}-{i}"), *san))
            .collect();
        Variant::new(full_name, moves)
    }

    fn session(orientation: PieceColor, lines: Vec<Variant>) -> TrainingSession {
        let variants = lines.into_iter().map(|v| TrainVariant::new(v, t0())).collect();
        TrainingSession::new("rep-1", orientation, chess::STARTING_FEN, variants).unwrap()
    }

    fn italian_and_scotch() -> TrainingSession {
        session(
            PieceColor::White,
            vec![
                line("Italian Game: Giuoco Piano", &["e4", "e5", "Nf3", "Nc6", "Bc4"]),
                line("Scotch Game", &["e4", "e5", "Nf3", "Nc6", "d4"]),
            ],
        )
    }

    #[test]
    fn test_rejects_empty_input() {
        assert_eq!(
            TrainingSession::new("r", PieceColor::White, chess::STARTING_FEN, vec![]).unwrap_err(),
            SessionError::NoVariants
        );
        let empty = TrainVariant::new(line("Nothing", &[]), t0());
        assert_eq!(
            TrainingSession::new("r", PieceColor::White, chess::STARTING_FEN, vec![empty]).unwrap_err(),
            SessionError::EmptyVariant("Nothing".into())
        );
        let one = TrainVariant::new(line("One", &["e4"]), t0());
        assert!(matches!(
            TrainingSession::new("r", PieceColor::White, "garbage", vec![one]),
            Err(SessionError::InvalidPosition(_))
        ));
    }

    #[test]
    fn test_allowed_moves_are_deduplicated() {
        let mut s = italian_and_scotch();
        assert_eq!(s.allowed_moves().len(), 1);
        for san in ["e4", "e5", "Nf3", "Nc6"] {
            s.apply_move(san, t0()).unwrap();
        }
        let allowed: Vec<String> = s.allowed_moves().into_iter().map(|m| m.san).collect();
        assert_eq!(allowed, vec!["Bc4", "d4"]);
    }

    #[test]
    fn test_mismatched_variant_is_discarded() {
        let mut s = italian_and_scotch();
        for san in ["e4", "e5", "Nf3", "Nc6"] {
            s.apply_move(san, t0()).unwrap();
        }
        let snap = s.apply_move("Bc4", t0() + Duration::seconds(30)).unwrap();
        assert_eq!(snap.newly_finished, vec!["Italian Game: Giuoco Piano"]);
        assert_eq!(s.variants()[0].state, TrainVariantState::Finished);
        // The Scotch was discarded and brought back by the rewind.
        assert!(snap.rewound);
        assert_eq!(snap.ply, 0);
        assert_eq!(s.variants()[1].state, TrainVariantState::InProgress);
        assert_eq!(snap.allowed_moves[0].san, "e4");
        assert!(!snap.is_finished);
    }

    #[test]
    fn test_discarded_variant_stays_discarded_while_others_continue() {
        let mut s = session(
            PieceColor::White,
            vec![
                line("Ruy Lopez", &["e4", "e5", "Nf3", "Nc6", "Bb5"]),
                line("Vienna Game", &["e4", "e5", "Nc3"]),
            ],
        );
        s.apply_move("e4", t0()).unwrap();
        s.apply_move("e5", t0()).unwrap();
        let snap = s.apply_move("Nf3", t0()).unwrap();
        assert!(!snap.rewound);
        assert_eq!(s.variants()[1].state, TrainVariantState::Discarded);
        assert_eq!(snap.variants[1].state, TrainVariantState::Discarded);
        // Replaying the same prefix does not revive it without a rewind.
        s.apply_move("Nc6", t0()).unwrap();
        assert_eq!(s.variants()[1].state, TrainVariantState::Discarded);
    }

    #[test]
    fn test_finishing_emits_one_review_with_elapsed_time() {
        let mut s = session(PieceColor::White, vec![line("Sicilian Defense: Alapin", &["e4", "c5", "c3"])]);
        s.apply_move("e4", t0()).unwrap();
        s.apply_move("c5", t0()).unwrap();
        let snap = s.apply_move("c3", t0() + Duration::seconds(20)).unwrap();

        assert!(snap.is_finished);
        assert!(!snap.rewound);
        assert!(!snap.opponent_to_move);
        assert!(snap.allowed_moves.is_empty());
        assert_eq!(snap.pending_reviews, 1);

        let review = s.take_pending_review().unwrap();
        assert_eq!(review.variant_name, "Sicilian Defense: Alapin");
        assert_eq!(review.opening_name, "Sicilian Defense");
        assert_eq!(review.time_spent_sec, 20);
        assert_eq!(review.suggested_rating, ReviewRating::Easy);
        assert_eq!(review.start_fen, chess::STARTING_FEN);
        assert!(s.take_pending_review().is_none());

        assert_eq!(s.apply_move("d4", t0()), Err(SessionError::SessionFinished));
    }

    #[test]
    fn test_elapsed_time_is_at_least_one_second() {
        let mut s = session(PieceColor::White, vec![line("Quick", &["d4"])]);
        s.apply_move("d4", t0()).unwrap();
        assert_eq!(s.take_pending_review().unwrap().time_spent_sec, 1);
    }

    #[test]
    fn test_wrong_moves_and_hints_are_counted_per_attempt() {
        let mut s = session(PieceColor::White, vec![line("French Defense", &["e4", "e6", "d4"])]);
        s.record_wrong_move(true);
        s.record_wrong_move(true);
        s.record_wrong_move(false);
        s.apply_move("e4", t0()).unwrap();
        s.apply_move("e6", t0()).unwrap();
        let hint = s.use_hint();
        assert_eq!(hint[0].san, "d4");
        s.apply_move("d4", t0() + Duration::seconds(90)).unwrap();

        let review = s.take_pending_review().unwrap();
        assert_eq!(review.wrong_moves, 2);
        assert_eq!(review.ignored_wrong_moves, 1);
        assert_eq!(review.hints_used, 1);
        assert_eq!(review.suggested_rating, ReviewRating::Hard);
    }

    #[test]
    fn test_rewind_resets_counters_of_resumed_variants() {
        let mut s = italian_and_scotch();
        s.record_wrong_move(true);
        for san in ["e4", "e5", "Nf3", "Nc6", "Bc4"] {
            s.apply_move(san, t0()).unwrap();
        }
        assert_eq!(s.rewinds(), 1);
        let scotch = &s.variants()[1];
        assert_eq!(scotch.wrong_moves, 0);
        assert_eq!(scotch.state, TrainVariantState::InProgress);
    }

    #[test]
    fn test_black_orientation_starts_with_opponent() {
        let s = session(PieceColor::Black, vec![line("Caro-Kann Defense", &["e4", "c6", "d4", "d5"])]);
        let snap = s.snapshot();
        assert!(snap.opponent_to_move);
        assert_eq!(snap.turn, PieceColor::White);

        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let reply = s.choose_opponent_move(&mut rng).unwrap();
        assert_eq!(reply.san, "e4");
    }

    #[test]
    fn test_opponent_move_only_on_opponent_turn() {
        let s = italian_and_scotch();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(s.choose_opponent_move(&mut rng), Err(SessionError::NotOpponentTurn));
    }

    #[test]
    fn test_opponent_samples_among_allowed() {
        let mut s = session(
            PieceColor::Black,
            vec![
                line("Sicilian Defense", &["e4", "c5"]),
                line("Queen's Pawn Game", &["d4", "d5"]),
            ],
        );
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..64 {
            seen.insert(s.choose_opponent_move(&mut rng).unwrap().san);
        }
        assert_eq!(seen.len(), 2);

        s.apply_move("d4", t0()).unwrap();
        assert_eq!(s.variants()[0].state, TrainVariantState::Discarded);
        assert!(s.is_allowed("d5"));
        assert!(!s.is_allowed("c5"));
    }

    #[test]
    fn test_current_variant_name() {
        let mut s = italian_and_scotch();
        assert_eq!(s.current_variant_name(), Some("Italian Game: Giuoco Piano"));
        for san in ["e4", "e5", "Nf3", "Nc6"] {
            s.apply_move(san, t0()).unwrap();
        }
        s.apply_move("d4", t0()).unwrap();
        // Italian discarded then resumed by the rewind; Scotch finished.
        assert_eq!(s.current_variant_name(), Some("Italian Game: Giuoco Piano"));
    }
}

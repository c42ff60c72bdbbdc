//! Interactive drill loop.
//!
//! Reads moves and commands line by line, plays the opponent after a delay and
//! settles each finished line's review before going on.

use std::io::Write;
use std::time::Duration;

use chess::{DisplayBoard, PieceColor};
use chrono::Utc;
use rand::Rng;
use tokio::io::{AsyncBufRead, Lines};
use trainer::{
    MoveOutcome, PendingVariantReview, ReviewBackend, ReviewRating, StagedWrongMove, TrainingBoard,
    TrainingService, WrongMoveDecision,
};

use crate::CliError;

/// How a drill ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DrillSummary {
    pub(crate) finished: usize,
    pub(crate) total: usize,
    pub(crate) reviews_submitted: usize,
    pub(crate) quit: bool,
}

pub(crate) struct Drill<'a, B: ReviewBackend, R, W> {
    service: &'a TrainingService<B>,
    input: Lines<R>,
    out: W,
    opponent_delay: Duration,
    reviews_submitted: usize,
}

impl<'a, B, R, W> Drill<'a, B, R, W>
where
    B: ReviewBackend,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub(crate) fn new(service: &'a TrainingService<B>, input: Lines<R>, out: W, opponent_delay: Duration) -> Self {
        Self {
            service,
            input,
            out,
            opponent_delay,
            reviews_submitted: 0,
        }
    }

    pub(crate) fn into_output(self) -> W {
        self.out
    }

    pub(crate) async fn run<G: Rng + ?Sized>(
        &mut self,
        board: &mut TrainingBoard,
        rng: &mut G,
    ) -> Result<DrillSummary, CliError> {
        let orientation = board.session().orientation();
        let (_, total) = board.session().progress();
        writeln!(
            self.out,
            "Training {total} line(s) as {orientation}. Enter moves as e2e4 or Nf3, `hint` or `quit`."
        )?;

        let mut quit = false;
        loop {
            self.settle_reviews(board).await?;
            if board.session().is_finished() {
                break;
            }

            if board.session().is_opponent_turn() {
                tokio::time::sleep(self.opponent_delay).await;
                let (played, snapshot) = board.play_opponent_move(rng, Utc::now())?;
                writeln!(self.out, "Opponent plays {}", played.san)?;
                self.report_finished(&snapshot.newly_finished, snapshot.rewound)?;
                continue;
            }

            self.show_board(board, orientation)?;
            write!(self.out, "Your move: ")?;
            self.out.flush()?;

            let Some(line) = self.input.next_line().await? else {
                quit = true;
                break;
            };
            let input = line.trim();
            match input {
                "" => continue,
                "quit" | "q" => {
                    quit = true;
                    break;
                }
                "hint" | "h" => {
                    let hints = board.hint();
                    writeln!(self.out, "Expected: {}", hints.join(", "))?;
                    continue;
                }
                _ => {}
            }

            match board.attempt_notation(input, Utc::now())? {
                MoveOutcome::Applied { played, snapshot } => {
                    writeln!(self.out, "Correct: {}", played.san)?;
                    self.report_finished(&snapshot.newly_finished, snapshot.rewound)?;
                }
                MoveOutcome::Rejected(_) => {
                    writeln!(self.out, "Invalid move: {input}")?;
                }
                MoveOutcome::NeedsConfirmation(staged) => {
                    self.confirm_wrong_move(board, &staged).await?;
                }
            }
        }

        // Lines finished before quitting still get rated.
        self.settle_reviews(board).await?;

        let (finished, total) = board.session().progress();
        writeln!(self.out, "Finished {finished}/{total} line(s).")?;
        tracing::info!(
            session_id = %board.session().session_id(),
            finished,
            total,
            quit,
            "Drill ended"
        );
        Ok(DrillSummary {
            finished,
            total,
            reviews_submitted: self.reviews_submitted,
            quit,
        })
    }

    fn show_board(&mut self, board: &TrainingBoard, orientation: PieceColor) -> Result<(), CliError> {
        match DisplayBoard::from_fen(&board.fen()) {
            Ok(display) => write!(self.out, "\n{}", display.render(orientation))?,
            Err(e) => tracing::warn!(error = %e, "Cannot render board"),
        }
        Ok(())
    }

    fn report_finished(&mut self, finished: &[String], rewound: bool) -> Result<(), CliError> {
        for name in finished {
            writeln!(self.out, "Line complete: {name}")?;
        }
        if rewound {
            writeln!(self.out, "Back to the start position.")?;
        }
        Ok(())
    }

    async fn confirm_wrong_move(&mut self, board: &mut TrainingBoard, staged: &StagedWrongMove) -> Result<(), CliError> {
        writeln!(
            self.out,
            "{} is not in your repertoire here. Expected: {}",
            staged.wrong_move_san,
            staged.expected_moves.join(", ")
        )?;
        write!(self.out, "Count as error? [Y/n] ")?;
        self.out.flush()?;

        let answer = self.input.next_line().await?.unwrap_or_default();
        let decision = match answer.trim().to_ascii_lowercase().as_str() {
            "n" | "no" => WrongMoveDecision::Ignore,
            _ => WrongMoveDecision::CountAsError,
        };

        if let Some(report) = board.resolve_wrong_move(decision)? {
            if let Err(e) = self.service.report_wrong_move(&report).await {
                writeln!(self.out, "Could not record the mistake: {e}")?;
            }
        }
        Ok(())
    }

    async fn settle_reviews(&mut self, board: &mut TrainingBoard) -> Result<(), CliError> {
        while let Some(review) = board.session_mut().take_pending_review() {
            let rating = self.ask_rating(&review).await?;
            let repertoire_id = board.session().repertoire_id().to_string();
            let name = review.variant_name.clone();
            match self
                .service
                .submit_review(&repertoire_id, review, rating, Utc::now())
                .await
            {
                Ok(submission) => {
                    self.reviews_submitted += 1;
                    writeln!(self.out, "Saved {name} as {rating}, mastery {}%", submission.mastery)?;
                }
                Err(e) => writeln!(self.out, "Could not save review for {name}: {e}")?,
            }
        }
        Ok(())
    }

    async fn ask_rating(&mut self, review: &PendingVariantReview) -> Result<ReviewRating, CliError> {
        writeln!(
            self.out,
            "{}: {} wrong, {} ignored, {} hint(s), {}s",
            review.variant_name, review.wrong_moves, review.ignored_wrong_moves, review.hints_used, review.time_spent_sec
        )?;
        loop {
            write!(
                self.out,
                "Rate again/hard/good/easy [{}]: ",
                review.suggested_rating
            )?;
            self.out.flush()?;

            let Some(line) = self.input.next_line().await? else {
                return Ok(review.suggested_rating);
            };
            if line.trim().is_empty() {
                return Ok(review.suggested_rating);
            }
            match line.parse::<ReviewRating>() {
                Ok(rating) => return Ok(rating),
                Err(e) => writeln!(self.out, "{e}")?,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use repertoire_client::MockRepertoireBackend;
    use tokio::io::{AsyncBufReadExt, BufReader};
    use trainer::{MoveTreeNode, Repertoire};

    fn white_repertoire() -> Repertoire {
        let root = MoveTreeNode::root("root").child(
            MoveTreeNode::with_move("e4", "e4").child(
                MoveTreeNode::with_move("e5", "e5")
                    .child(MoveTreeNode::with_move("nf3", "Nf3").named("King's Knight Opening"))
                    .child(MoveTreeNode::with_move("f4", "f4").named("King's Gambit")),
            ),
        );
        Repertoire {
            id: "white-e4".into(),
            name: "1.e4 for White".into(),
            orientation: PieceColor::White,
            start_fen: None,
            move_nodes: root,
        }
    }

    async fn run_script(
        script: &str,
    ) -> (DrillSummary, String, Arc<MockRepertoireBackend>) {
        let mock = Arc::new(
            MockRepertoireBackend::new()
                .with_repertoire(white_repertoire())
                .with_variants_info(vec![]),
        );
        let service = TrainingService::new(mock.clone());
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut board = service
            .start_session("white-e4", 10, Utc::now(), &mut rng)
            .await
            .unwrap();

        let input = BufReader::new(script.as_bytes()).lines();
        let mut drill = Drill::new(&service, input, Vec::new(), Duration::ZERO);
        let summary = drill.run(&mut board, &mut rng).await.unwrap();
        let output = String::from_utf8(drill.into_output()).unwrap();
        (summary, output, mock)
    }

    #[tokio::test]
    async fn test_full_drill_from_script() {
        let script = "d4\ny\ne4\nhint\nNf3\n\ne2e4\nf4\neasy\n";
        let (summary, output, mock) = run_script(script).await;

        assert_eq!(
            summary,
            DrillSummary {
                finished: 2,
                total: 2,
                reviews_submitted: 2,
                quit: false
            }
        );
        assert!(output.contains("d4 is not in your repertoire here. Expected: e4"));
        assert!(output.contains("Opponent plays e5"));
        assert!(output.contains("Expected: Nf3, f4"));
        assert!(output.contains("Line complete: King's Knight Opening"));
        assert!(output.contains("Back to the start position."));

        let errors = mock.recorded_errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].wrong_move, "d2d4");

        let reviews = mock.submitted_reviews();
        assert_eq!(reviews.len(), 2);
        assert_eq!(reviews[0].variant_name, "King's Knight Opening");
        assert_eq!(reviews[0].wrong_moves, 1);
        assert_eq!(reviews[0].hints_used, 1);
        // One wrong move and one hint: suggestion stays at good.
        assert_eq!(reviews[0].rating, ReviewRating::Good);
        assert_eq!(reviews[1].variant_name, "King's Gambit");
        assert_eq!(reviews[1].rating, ReviewRating::Easy);
    }

    #[tokio::test]
    async fn test_quit_and_invalid_input() {
        let (summary, output, mock) = run_script("e9e4\nKe2\nquit\n").await;
        assert!(summary.quit);
        assert_eq!(summary.finished, 0);
        assert!(output.contains("Invalid move: e9e4"));
        assert!(output.contains("Invalid move: Ke2"));
        assert!(mock.submitted_reviews().is_empty());
    }

    #[tokio::test]
    async fn test_ignored_wrong_move_is_not_recorded() {
        let (summary, _, mock) = run_script("c4\nn\nquit\n").await;
        assert!(summary.quit);
        assert!(mock.recorded_errors().is_empty());
    }
}

use serde::{Deserialize, Serialize};

/// A line solved cleanly within this many seconds is rated easy.
pub const EASY_TIME_LIMIT_SECS: i64 = 45;

/// Self-assessed recall quality for a finished line, worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewRating {
    Again,
    Hard,
    Good,
    Easy,
}

impl ReviewRating {
    pub const ALL: [ReviewRating; 4] = [Self::Again, Self::Hard, Self::Good, Self::Easy];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Again => "again",
            Self::Hard => "hard",
            Self::Good => "good",
            Self::Easy => "easy",
        }
    }

    /// 0 for `Again` up to 3 for `Easy`.
    pub fn ordinal(self) -> u8 {
        match self {
            Self::Again => 0,
            Self::Hard => 1,
            Self::Good => 2,
            Self::Easy => 3,
        }
    }
}

impl std::fmt::Display for ReviewRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReviewRating {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "again" | "a" | "1" => Ok(Self::Again),
            "hard" | "h" | "2" => Ok(Self::Hard),
            "good" | "g" | "3" => Ok(Self::Good),
            "easy" | "e" | "4" => Ok(Self::Easy),
            other => Err(format!("unknown rating: {other}")),
        }
    }
}

/// Suggest a rating from how the attempt went. Negative inputs count as zero.
pub fn suggest_review_rating(wrong_moves: i64, hints_used: i64, time_spent_sec: i64) -> ReviewRating {
    let wrong_moves = wrong_moves.max(0);
    let hints_used = hints_used.max(0);
    let time_spent_sec = time_spent_sec.max(0);

    if wrong_moves >= 3 {
        return ReviewRating::Again;
    }
    if wrong_moves >= 2 || hints_used >= 2 {
        return ReviewRating::Hard;
    }
    if wrong_moves == 0 && hints_used == 0 && (1..=EASY_TIME_LIMIT_SECS).contains(&time_spent_sec) {
        return ReviewRating::Easy;
    }
    ReviewRating::Good
}

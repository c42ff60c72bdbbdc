use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One move of a repertoire line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveNode {
    pub id: String,
    pub san: String,
}

impl MoveNode {
    pub fn new(id: impl Into<String>, san: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            san: san.into(),
        }
    }

    /// Same move, ignoring check marks and annotation glyphs.
    pub fn matches(&self, san: &str) -> bool {
        chess::san::normalize_san(&self.san) == chess::san::normalize_san(san)
    }
}

/// An opening line: the moves from the repertoire root to one leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    /// Opening family, e.g. `Sicilian Defense`.
    pub name: String,
    /// Line label, e.g. `Sicilian Defense: Najdorf Variation`. Unique within a repertoire.
    pub full_name: String,
    pub moves: Vec<MoveNode>,
}

impl Variant {
    pub fn new(full_name: impl Into<String>, moves: Vec<MoveNode>) -> Self {
        let full_name = full_name.into();
        Self {
            name: opening_name(&full_name),
            full_name,
            moves,
        }
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn move_at(&self, ply: usize) -> Option<&MoveNode> {
        self.moves.get(ply)
    }
}

/// Text before the first `:` of a full variant name, trimmed.
pub fn opening_name(full_name: &str) -> String {
    full_name
        .split(':')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrainVariantState {
    InProgress,
    Discarded,
    Finished,
}

/// A variant being drilled in the current session, with its mistake counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainVariant {
    pub variant: Variant,
    pub state: TrainVariantState,
    pub wrong_moves: u32,
    pub ignored_wrong_moves: u32,
    pub hints_used: u32,
    pub started_at: DateTime<Utc>,
}

impl TrainVariant {
    pub fn new(variant: Variant, started_at: DateTime<Utc>) -> Self {
        Self {
            variant,
            state: TrainVariantState::InProgress,
            wrong_moves: 0,
            ignored_wrong_moves: 0,
            hints_used: 0,
            started_at,
        }
    }

    pub fn is_in_progress(&self) -> bool {
        self.state == TrainVariantState::InProgress
    }

    pub fn is_finished(&self) -> bool {
        self.state == TrainVariantState::Finished
    }

    /// Back in play after a rewind: the attempt starts over.
    pub(crate) fn resume(&mut self, now: DateTime<Utc>) {
        self.state = TrainVariantState::InProgress;
        self.wrong_moves = 0;
        self.ignored_wrong_moves = 0;
        self.hints_used = 0;
        self.started_at = now;
    }
}

/// Review history kept by the backend for one variant of one repertoire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainVariantInfo {
    pub repertoire_id: String,
    pub variant_name: String,
    #[serde(default)]
    pub errors: u32,
    pub last_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mastery: Option<u8>,
}

//! Today's plan progress, reconciled from the backend's plan summary.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const LOADING_MESSAGE: &str = "Loading today plan...";
pub const NOTHING_SCHEDULED_MESSAGE: &str = "No scheduled items for today.";
pub const EXCEEDED_MESSAGE: &str = "Great—save the rest for tomorrow.";
pub const TARGET_HIT_MESSAGE: &str = "Great—you hit today's target.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub due_count: u32,
}

/// `GET /paths/plan` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PathPlanSummary {
    pub review_due_count: u32,
    pub suggested_new_today: u32,
    pub estimated_today_total: Option<u32>,
    pub completed_due_today: u32,
    pub completed_new_today: u32,
    pub completed_today_count: u32,
    pub forecast: Vec<ForecastDay>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayPlanProgress {
    pub review_target: u32,
    pub new_target: u32,
    pub planned_target: u32,
    pub completed_reviews: u32,
    pub completed_new: u32,
    pub completed_today: u32,
    pub remaining_reviews: u32,
    pub remaining_new: u32,
    pub remaining_today: u32,
    pub exceeded_target: bool,
    pub progress_percent: u8,
    pub message: String,
}

impl TodayPlanProgress {
    fn loading() -> Self {
        Self {
            review_target: 0,
            new_target: 0,
            planned_target: 0,
            completed_reviews: 0,
            completed_new: 0,
            completed_today: 0,
            remaining_reviews: 0,
            remaining_new: 0,
            remaining_today: 0,
            exceeded_target: false,
            progress_percent: 0,
            message: LOADING_MESSAGE.to_string(),
        }
    }
}

pub fn today_plan_progress(plan: Option<&PathPlanSummary>) -> TodayPlanProgress {
    let Some(plan) = plan else {
        return TodayPlanProgress::loading();
    };

    let review_target = plan.review_due_count;
    let new_target = plan.suggested_new_today;
    let planned_target = plan
        .estimated_today_total
        .unwrap_or(review_target.saturating_add(new_target));

    let mut completed_reviews = plan.completed_due_today;
    let mut completed_new = plan.completed_new_today;
    let completed_today = plan.completed_today_count;

    // Reviews of due lines are sometimes all booked as new. Reattribute them.
    if review_target > 0 && completed_today > 0 && completed_reviews == 0 && completed_new >= completed_today {
        completed_reviews = completed_today.min(review_target);
        completed_new = completed_today - completed_reviews;
    }

    let remaining_today = planned_target.saturating_sub(completed_today);
    let exceeded_target = completed_today > planned_target;

    let message = if planned_target == 0 && completed_today == 0 {
        NOTHING_SCHEDULED_MESSAGE.to_string()
    } else if planned_target == 0 || exceeded_target {
        EXCEEDED_MESSAGE.to_string()
    } else if completed_today == planned_target {
        TARGET_HIT_MESSAGE.to_string()
    } else {
        format!("{remaining_today} remaining to hit today's target.")
    };

    let progress_percent = match (planned_target, completed_today) {
        (0, 0) => 0,
        (0, _) => 100,
        (target, done) => (u64::from(done) * 100 / u64::from(target)).min(100) as u8,
    };

    TodayPlanProgress {
        review_target,
        new_target,
        planned_target,
        completed_reviews,
        completed_new,
        completed_today,
        remaining_reviews: review_target.saturating_sub(completed_reviews),
        remaining_new: new_target.saturating_sub(completed_new),
        remaining_today,
        exceeded_target,
        progress_percent,
        message,
    }
}

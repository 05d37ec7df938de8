use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A recurring goal with a target number of completions per week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    /// Display title of the goal
    pub title: String,
    /// How many completions per week the user is aiming for (1-7 inclusive)
    pub desired_weekly_frequency: i32,
    /// When the goal was created (immutable after creation)
    pub created_at: DateTime<Utc>,
}

/// One "I did this" event recorded against a goal.
///
/// Multiple completions for the same goal on the same day are legal and each
/// counts independently in the weekly summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalCompletion {
    pub id: String,
    /// ID of the goal this completion belongs to
    pub goal_id: String,
    /// When the completion happened (immutable)
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateGoalRequest {
    pub title: String,
    pub desired_weekly_frequency: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateCompletionRequest {
    pub goal_id: String,
}

/// A goal visible this week together with its progress so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingGoal {
    pub id: String,
    pub title: String,
    pub desired_weekly_frequency: i32,
    /// Completions recorded for this goal inside the current week window
    pub completion_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingGoalsResponse {
    pub pending_goals: Vec<PendingGoal>,
}

/// One completion entry inside a day bucket of the week summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionSummary {
    /// ID of the completion record
    pub id: String,
    /// Title of the goal that was completed
    pub title: String,
    /// Full timestamp of the completion
    pub completed_at: DateTime<Utc>,
}

/// All completions recorded on one calendar day of the week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub completions: Vec<CompletionSummary>,
}

/// The weekly report: how much was desired, how much got done, and a
/// per-day breakdown ordered most recent day first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekSummary {
    /// Sum of desired weekly frequencies over goals created this week
    pub total: i64,
    /// Number of completions recorded this week, across all goals
    pub completed: i64,
    /// Day buckets in descending date order; empty when nothing was completed
    pub goals_per_day: Vec<DaySummary>,
}

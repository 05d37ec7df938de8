//! The weekly summary pipeline.
//!
//! Three in-memory stages over a consistent storage snapshot:
//!
//! 1. filter goals created inside the week window (their desired weekly
//!    frequencies sum to `total`),
//! 2. filter completions to the window, join each to its goal for the title,
//!    and bucket them by calendar day, most recent day first,
//! 3. roll both up into a [`WeekSummary`].
//!
//! The stages are plain functions so the week-boundary and empty-input
//! behavior can be tested without a database.

use std::collections::{BTreeMap, HashMap};

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use shared::{CompletionSummary, DaySummary, Goal, GoalCompletion, WeekSummary};
use tracing::info;

use crate::db::DbConnection;
use crate::domain::week::WeekWindow;

/// Goals whose creation timestamp falls inside the window.
///
/// Goals created before the current week are excluded here even though their
/// completions still count toward `completed`, so `completed` can exceed
/// `total` once established goals are being worked on. The report reads as
/// "of the goals introduced this week, how much was desired" - kept exactly
/// as the original service behaves rather than widened to all goals.
pub fn eligible_goals<'a>(goals: &'a [Goal], window: &WeekWindow) -> Vec<&'a Goal> {
    goals
        .iter()
        .filter(|goal| window.contains(goal.created_at))
        .collect()
}

/// Filter completions to the window, attach goal titles, and group by the
/// UTC calendar day of the completion timestamp.
///
/// Buckets come back in descending date order. Within a bucket, entries are
/// ordered by completion timestamp then id so the output is deterministic
/// for a given input set. A completion whose goal is missing from `goals`
/// is dropped; it contributes to neither the buckets nor the counts.
pub fn group_completions_by_day(
    completions: &[GoalCompletion],
    goals: &[Goal],
    window: &WeekWindow,
) -> Vec<DaySummary> {
    let titles: HashMap<&str, &str> = goals
        .iter()
        .map(|goal| (goal.id.as_str(), goal.title.as_str()))
        .collect();

    let mut in_window: Vec<&GoalCompletion> = completions
        .iter()
        .filter(|completion| window.contains(completion.created_at))
        .collect();
    in_window.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });

    let mut buckets: BTreeMap<NaiveDate, Vec<CompletionSummary>> = BTreeMap::new();
    for completion in in_window {
        let Some(title) = titles.get(completion.goal_id.as_str()) else {
            // unmatched completion: silently excluded
            continue;
        };
        buckets
            .entry(completion.created_at.date_naive())
            .or_default()
            .push(CompletionSummary {
                id: completion.id.clone(),
                title: (*title).to_string(),
                completed_at: completion.created_at,
            });
    }

    buckets
        .into_iter()
        .rev()
        .map(|(date, completions)| DaySummary { date, completions })
        .collect()
}

/// Combine the eligibility filter output and the day buckets into the final
/// summary. Pure; empty inputs yield a zeroed summary, never an error.
pub fn build_summary(eligible: &[&Goal], goals_per_day: Vec<DaySummary>) -> WeekSummary {
    let total = eligible
        .iter()
        .map(|goal| goal.desired_weekly_frequency as i64)
        .sum();
    let completed = goals_per_day
        .iter()
        .map(|day| day.completions.len() as i64)
        .sum();

    WeekSummary {
        total,
        completed,
        goals_per_day,
    }
}

/// Service computing the weekly summary over stored goals and completions.
#[derive(Clone)]
pub struct SummaryService {
    db: DbConnection,
}

impl SummaryService {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Summary for the week containing the current instant.
    pub async fn get_week_summary(&self) -> Result<WeekSummary> {
        self.week_summary_at(Utc::now()).await
    }

    /// Summary for the week containing `reference`.
    ///
    /// The same window instance feeds both the eligibility filter and the
    /// completion grouping, and both record sets come from one storage
    /// transaction, so the result is a consistent view even at a week
    /// boundary or under concurrent deletes.
    pub async fn week_summary_at(&self, reference: DateTime<Utc>) -> Result<WeekSummary> {
        let window = WeekWindow::containing(reference);
        let (goals, completions) = self.db.fetch_week_snapshot().await?;

        let eligible = eligible_goals(&goals, &window);
        let goals_per_day = group_completions_by_day(&completions, &goals, &window);
        let summary = build_summary(&eligible, goals_per_day);

        info!(
            "Week summary {} to {}: desired {}, completed {}",
            window.start, window.end, summary.total, summary.completed
        );
        Ok(summary)
    }
}

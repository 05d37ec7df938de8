use anyhow::Result;
use chrono::{DateTime, Utc};
use shared::{CreateGoalRequest, Goal, PendingGoal};
use thiserror::Error;
use tracing::info;

use crate::db::DbConnection;
use crate::domain::week::WeekWindow;

/// Validation failures for goal operations, distinguished from storage
/// errors so the REST layer can answer 400 instead of 500.
#[derive(Debug, Error, PartialEq)]
pub enum GoalError {
    #[error("goal title cannot be empty")]
    EmptyTitle,
    #[error("desired weekly frequency must be between 1 and 7, got {0}")]
    FrequencyOutOfRange(i32),
}

/// Service for creating, deleting, and listing goals
#[derive(Clone)]
pub struct GoalService {
    db: DbConnection,
}

impl GoalService {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Create a new goal. The 1-7 frequency invariant is enforced here, at
    /// the boundary; everything downstream assumes it already holds.
    pub async fn create_goal(&self, request: CreateGoalRequest) -> Result<Goal> {
        let title = request.title.trim();
        if title.is_empty() {
            return Err(GoalError::EmptyTitle.into());
        }
        if !(1..=7).contains(&request.desired_weekly_frequency) {
            return Err(GoalError::FrequencyOutOfRange(request.desired_weekly_frequency).into());
        }

        let goal = Goal {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.to_string(),
            desired_weekly_frequency: request.desired_weekly_frequency,
            created_at: Utc::now(),
        };

        self.db.insert_goal(&goal).await?;
        info!("Created goal {} ({})", goal.id, goal.title);

        Ok(goal)
    }

    /// Delete a goal and, through the storage cascade, every completion
    /// referencing it. Returns false when the id matched nothing.
    pub async fn delete_goal(&self, goal_id: &str) -> Result<bool> {
        let deleted = self.db.delete_goal(goal_id).await?;
        if deleted {
            info!("Deleted goal {}", goal_id);
        }
        Ok(deleted)
    }

    /// Goals visible this week with their completion progress so far.
    pub async fn get_pending_goals(&self) -> Result<Vec<PendingGoal>> {
        self.pending_goals_at(Utc::now()).await
    }

    /// Pending goals for the week containing `reference`: every goal created
    /// up to the window end, each carrying the number of its completions
    /// that fall inside the window.
    pub async fn pending_goals_at(&self, reference: DateTime<Utc>) -> Result<Vec<PendingGoal>> {
        let window = WeekWindow::containing(reference);
        let (goals, completions) = self.db.fetch_week_snapshot().await?;

        let pending = goals
            .iter()
            .filter(|goal| goal.created_at <= window.end)
            .map(|goal| {
                let completion_count = completions
                    .iter()
                    .filter(|c| c.goal_id == goal.id && window.contains(c.created_at))
                    .count() as i64;
                PendingGoal {
                    id: goal.id.clone(),
                    title: goal.title.clone(),
                    desired_weekly_frequency: goal.desired_weekly_frequency,
                    completion_count,
                }
            })
            .collect();

        Ok(pending)
    }
}

use anyhow::Result;
use chrono::{DateTime, Utc};
use shared::{CreateCompletionRequest, GoalCompletion};
use thiserror::Error;
use tracing::info;

use crate::db::DbConnection;
use crate::domain::week::WeekWindow;

#[derive(Debug, Error, PartialEq)]
pub enum CompletionError {
    #[error("goal not found: {0}")]
    GoalNotFound(String),
    #[error("goal already completed {frequency} times this week")]
    AlreadyCompletedThisWeek { frequency: i32 },
}

/// Service for recording and removing completion events
#[derive(Clone)]
pub struct CompletionService {
    db: DbConnection,
}

impl CompletionService {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Record a completion for a goal at the current instant.
    pub async fn create_completion(
        &self,
        request: CreateCompletionRequest,
    ) -> Result<GoalCompletion> {
        self.create_completion_at(request, Utc::now()).await
    }

    /// Record a completion timestamped `now`.
    ///
    /// Rejected when the goal does not exist or already has its desired
    /// number of completions inside the week containing `now`. Multiple
    /// completions on the same day stay legal up to that weekly cap.
    pub async fn create_completion_at(
        &self,
        request: CreateCompletionRequest,
        now: DateTime<Utc>,
    ) -> Result<GoalCompletion> {
        let goal = self
            .db
            .get_goal(&request.goal_id)
            .await?
            .ok_or_else(|| CompletionError::GoalNotFound(request.goal_id.clone()))?;

        let window = WeekWindow::containing(now);
        let this_week = self
            .db
            .list_completions_for_goal(&goal.id)
            .await?
            .into_iter()
            .filter(|c| window.contains(c.created_at))
            .count() as i32;

        if this_week >= goal.desired_weekly_frequency {
            return Err(CompletionError::AlreadyCompletedThisWeek {
                frequency: goal.desired_weekly_frequency,
            }
            .into());
        }

        let completion = GoalCompletion {
            id: uuid::Uuid::new_v4().to_string(),
            goal_id: goal.id.clone(),
            created_at: now,
        };
        self.db.insert_completion(&completion).await?;

        info!(
            "Recorded completion {} for goal {} ({}/{} this week)",
            completion.id,
            goal.id,
            this_week + 1,
            goal.desired_weekly_frequency
        );
        Ok(completion)
    }

    /// Delete a completion by id. Returns false when nothing matched.
    pub async fn delete_completion(&self, completion_id: &str) -> Result<bool> {
        let deleted = self.db.delete_completion(completion_id).await?;
        if deleted {
            info!("Deleted completion {}", completion_id);
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use shared::Goal;

    async fn create_test_service() -> CompletionService {
        let db = DbConnection::init_test()
            .await
            .expect("Failed to create test database");
        CompletionService::new(db)
    }

    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 11, 12, 0, 0).unwrap()
    }

    async fn insert_goal(service: &CompletionService, id: &str, frequency: i32) {
        let goal = Goal {
            id: id.to_string(),
            title: "Exercise".to_string(),
            desired_weekly_frequency: frequency,
            created_at: reference() - Duration::days(1),
        };
        service.db.insert_goal(&goal).await.unwrap();
    }

    #[tokio::test]
    async fn test_completion_creation() {
        let service = create_test_service().await;
        insert_goal(&service, "g1", 3).await;

        let completion = service
            .create_completion_at(
                CreateCompletionRequest {
                    goal_id: "g1".to_string(),
                },
                reference(),
            )
            .await
            .expect("Failed to create completion");

        assert_eq!(completion.goal_id, "g1");
        assert_eq!(completion.created_at, reference());
    }

    #[tokio::test]
    async fn test_unknown_goal_rejected() {
        let service = create_test_service().await;

        let result = service
            .create_completion_at(
                CreateCompletionRequest {
                    goal_id: "missing".to_string(),
                },
                reference(),
            )
            .await;

        let err = result.unwrap_err();
        assert_eq!(
            err.downcast_ref::<CompletionError>(),
            Some(&CompletionError::GoalNotFound("missing".to_string()))
        );
    }

    #[tokio::test]
    async fn test_weekly_cap_enforced() {
        let service = create_test_service().await;
        insert_goal(&service, "g1", 2).await;

        let request = CreateCompletionRequest {
            goal_id: "g1".to_string(),
        };
        service
            .create_completion_at(request.clone(), reference())
            .await
            .unwrap();
        service
            .create_completion_at(request.clone(), reference() + Duration::hours(1))
            .await
            .unwrap();

        let result = service
            .create_completion_at(request, reference() + Duration::hours(2))
            .await;
        let err = result.unwrap_err();
        assert_eq!(
            err.downcast_ref::<CompletionError>(),
            Some(&CompletionError::AlreadyCompletedThisWeek { frequency: 2 })
        );
    }

    #[tokio::test]
    async fn test_last_weeks_completions_do_not_count_toward_cap() {
        let service = create_test_service().await;
        insert_goal(&service, "g1", 1).await;

        let last_week = reference() - Duration::days(7);
        service
            .db
            .insert_completion(&GoalCompletion {
                id: "old".to_string(),
                goal_id: "g1".to_string(),
                created_at: last_week,
            })
            .await
            .unwrap();

        // the cap resets with the new week
        service
            .create_completion_at(
                CreateCompletionRequest {
                    goal_id: "g1".to_string(),
                },
                reference(),
            )
            .await
            .expect("Completion from last week must not block this week");
    }

    #[tokio::test]
    async fn test_delete_completion() {
        let service = create_test_service().await;
        insert_goal(&service, "g1", 3).await;

        let completion = service
            .create_completion_at(
                CreateCompletionRequest {
                    goal_id: "g1".to_string(),
                },
                reference(),
            )
            .await
            .unwrap();

        assert!(service.delete_completion(&completion.id).await.unwrap());
        assert!(!service.delete_completion(&completion.id).await.unwrap());
    }
}

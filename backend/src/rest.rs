use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use shared::{CreateCompletionRequest, CreateGoalRequest, PendingGoalsResponse};
use tracing::info;

use crate::domain::completions::CompletionError;
use crate::domain::goals::GoalError;
use crate::domain::{CompletionService, GoalService, SummaryService};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub goal_service: GoalService,
    pub completion_service: CompletionService,
    pub summary_service: SummaryService,
}

impl AppState {
    pub fn new(
        goal_service: GoalService,
        completion_service: CompletionService,
        summary_service: SummaryService,
    ) -> Self {
        Self {
            goal_service,
            completion_service,
            summary_service,
        }
    }
}

/// Axum handler for POST /goals
pub async fn create_goal(
    State(state): State<AppState>,
    Json(request): Json<CreateGoalRequest>,
) -> impl IntoResponse {
    info!("POST /goals - request: {:?}", request);

    match state.goal_service.create_goal(request).await {
        Ok(goal) => (StatusCode::CREATED, Json(goal)).into_response(),
        Err(e) if e.downcast_ref::<GoalError>().is_some() => {
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
        Err(e) => {
            tracing::error!("Error creating goal: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error creating goal").into_response()
        }
    }
}

/// Axum handler for DELETE /goals/:goal_id
pub async fn delete_goal(
    State(state): State<AppState>,
    Path(goal_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /goals/{}", goal_id);

    match state.goal_service.delete_goal(&goal_id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => (StatusCode::NOT_FOUND, "Goal not found").into_response(),
        Err(e) => {
            tracing::error!("Error deleting goal: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error deleting goal").into_response()
        }
    }
}

/// Axum handler for POST /completions
pub async fn create_completion(
    State(state): State<AppState>,
    Json(request): Json<CreateCompletionRequest>,
) -> impl IntoResponse {
    info!("POST /completions - request: {:?}", request);

    match state.completion_service.create_completion(request).await {
        Ok(completion) => (StatusCode::CREATED, Json(completion)).into_response(),
        Err(e) => match e.downcast_ref::<CompletionError>() {
            Some(CompletionError::GoalNotFound(_)) => {
                (StatusCode::NOT_FOUND, e.to_string()).into_response()
            }
            Some(CompletionError::AlreadyCompletedThisWeek { .. }) => {
                (StatusCode::BAD_REQUEST, e.to_string()).into_response()
            }
            None => {
                tracing::error!("Error creating completion: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Error creating completion").into_response()
            }
        },
    }
}

/// Axum handler for DELETE /completions/:completion_id
pub async fn delete_completion(
    State(state): State<AppState>,
    Path(completion_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /completions/{}", completion_id);

    match state
        .completion_service
        .delete_completion(&completion_id)
        .await
    {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => (StatusCode::NOT_FOUND, "Completion not found").into_response(),
        Err(e) => {
            tracing::error!("Error deleting completion: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error deleting completion").into_response()
        }
    }
}

/// Axum handler for GET /pending-goals
pub async fn get_pending_goals(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /pending-goals");

    match state.goal_service.get_pending_goals().await {
        Ok(pending_goals) => {
            (StatusCode::OK, Json(PendingGoalsResponse { pending_goals })).into_response()
        }
        Err(e) => {
            tracing::error!("Error listing pending goals: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error listing pending goals").into_response()
        }
    }
}

/// Axum handler for GET /summary
pub async fn get_week_summary(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /summary");

    match state.summary_service.get_week_summary().await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => {
            tracing::error!("Error computing week summary: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error computing week summary").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbConnection;
    use axum::response::Response;

    /// Helper to create test handlers
    async fn setup_test_state() -> AppState {
        let db = DbConnection::init_test()
            .await
            .expect("Failed to create test database");
        AppState::new(
            GoalService::new(db.clone()),
            CompletionService::new(db.clone()),
            SummaryService::new(db),
        )
    }

    fn status_of(response: Response) -> StatusCode {
        response.status()
    }

    #[tokio::test]
    async fn test_create_goal_handler() {
        let state = setup_test_state().await;

        let request = CreateGoalRequest {
            title: "Exercise".to_string(),
            desired_weekly_frequency: 3,
        };

        let response = create_goal(State(state), Json(request)).await.into_response();
        assert_eq!(status_of(response), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_create_goal_validation_error() {
        let state = setup_test_state().await;

        let request = CreateGoalRequest {
            title: "Exercise".to_string(),
            desired_weekly_frequency: 9,
        };

        let response = create_goal(State(state), Json(request)).await.into_response();
        assert_eq!(status_of(response), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_goal_not_found() {
        let state = setup_test_state().await;

        let response = delete_goal(State(state), Path("missing".to_string()))
            .await
            .into_response();
        assert_eq!(status_of(response), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_completion_for_unknown_goal() {
        let state = setup_test_state().await;

        let request = CreateCompletionRequest {
            goal_id: "missing".to_string(),
        };

        let response = create_completion(State(state), Json(request))
            .await
            .into_response();
        assert_eq!(status_of(response), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_completion_round_trip_through_handlers() {
        let state = setup_test_state().await;

        let goal = state
            .goal_service
            .create_goal(CreateGoalRequest {
                title: "Exercise".to_string(),
                desired_weekly_frequency: 3,
            })
            .await
            .expect("Failed to create goal");

        let response = create_completion(
            State(state.clone()),
            Json(CreateCompletionRequest { goal_id: goal.id }),
        )
        .await
        .into_response();
        assert_eq!(status_of(response), StatusCode::CREATED);

        let summary_response = get_week_summary(State(state)).await.into_response();
        assert_eq!(status_of(summary_response), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_get_week_summary_empty_store() {
        let state = setup_test_state().await;

        let response = get_week_summary(State(state)).await.into_response();
        assert_eq!(status_of(response), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_get_pending_goals_handler() {
        let state = setup_test_state().await;

        let response = get_pending_goals(State(state)).await.into_response();
        assert_eq!(status_of(response), StatusCode::OK);
    }
}

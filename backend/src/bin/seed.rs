//! Resets the database and inserts a small demo data set: four goals and
//! two completions placed at the start of the current week.

use chrono::{Duration, Utc};
use shared::{Goal, GoalCompletion};
use tracing::{info, Level};
use uuid::Uuid;

use weekgoals_backend::db::DbConnection;
use weekgoals_backend::domain::WeekWindow;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let db = DbConnection::init().await?;
    db.clear_all().await?;

    let now = Utc::now();
    let goals = [
        ("Wake up early", 5),
        ("Exercise", 3),
        ("Study Rust", 3),
        ("Read a book", 2),
    ]
    .map(|(title, desired_weekly_frequency)| Goal {
        id: Uuid::new_v4().to_string(),
        title: title.to_string(),
        desired_weekly_frequency,
        created_at: now,
    });

    for goal in &goals {
        db.insert_goal(goal).await?;
    }

    let window = WeekWindow::containing(now);
    let completions = [
        GoalCompletion {
            id: Uuid::new_v4().to_string(),
            goal_id: goals[0].id.clone(),
            created_at: window.start,
        },
        GoalCompletion {
            id: Uuid::new_v4().to_string(),
            goal_id: goals[1].id.clone(),
            created_at: window.start + Duration::days(1),
        },
    ];

    for completion in &completions {
        db.insert_completion(completion).await?;
    }

    info!(
        "Seeded {} goals and {} completions",
        goals.len(),
        completions.len()
    );
    Ok(())
}

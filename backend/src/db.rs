use anyhow::Result;
use chrono::{DateTime, Utc};
use shared::{Goal, GoalCompletion};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqliteRow};
use sqlx::Row;
use std::str::FromStr;
use std::sync::Arc;

// The database URL for the production database, overridable via DATABASE_URL
const DATABASE_URL: &str = "sqlite:weekgoals.db";

/// DbConnection manages goal and completion storage
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Create a new database connection
    pub async fn new(url: &str) -> Result<Self> {
        // Foreign keys must be on so deleting a goal removes its completions
        let options = SqliteConnectOptions::from_str(url)?
            .foreign_keys(true)
            .create_if_missing(true);

        let pool = SqlitePool::connect_with(options).await?;

        Self::setup_schema(&pool).await?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Initialize the standard database
    pub async fn init() -> Result<Self> {
        let url = std::env::var("DATABASE_URL").unwrap_or_else(|_| DATABASE_URL.to_string());
        Self::new(&url).await
    }

    /// Initialize a test database with a unique name
    pub async fn init_test() -> Result<Self> {
        // Generate a unique database name for tests
        let test_id = uuid::Uuid::new_v4().to_string();
        let db_url = format!("file:memdb_{}?mode=memory&cache=shared", test_id);

        Self::new(&db_url).await
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS goals (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                desired_weekly_frequency INTEGER NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS goal_completions (
                id TEXT PRIMARY KEY,
                goal_id TEXT NOT NULL REFERENCES goals(id) ON DELETE CASCADE,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Get the underlying SQLite pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Store a new goal
    pub async fn insert_goal(&self, goal: &Goal) -> Result<()> {
        sqlx::query(
            "INSERT INTO goals (id, title, desired_weekly_frequency, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&goal.id)
        .bind(&goal.title)
        .bind(goal.desired_weekly_frequency)
        .bind(goal.created_at)
        .execute(&*self.pool)
        .await?;
        Ok(())
    }

    /// Retrieve a goal by its id
    pub async fn get_goal(&self, goal_id: &str) -> Result<Option<Goal>> {
        let row = sqlx::query(
            "SELECT id, title, desired_weekly_frequency, created_at FROM goals WHERE id = ?",
        )
        .bind(goal_id)
        .fetch_optional(&*self.pool)
        .await?;

        Ok(row.map(|r| goal_from_row(&r)))
    }

    /// Delete a goal; its completions go with it via the cascade.
    /// Returns false when no goal had the given id.
    pub async fn delete_goal(&self, goal_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM goals WHERE id = ?")
            .bind(goal_id)
            .execute(&*self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List all goals, oldest first
    pub async fn list_goals(&self) -> Result<Vec<Goal>> {
        let rows = sqlx::query(
            "SELECT id, title, desired_weekly_frequency, created_at FROM goals ORDER BY created_at, id",
        )
        .fetch_all(&*self.pool)
        .await?;
        Ok(rows.iter().map(goal_from_row).collect())
    }

    /// Store a new completion event
    pub async fn insert_completion(&self, completion: &GoalCompletion) -> Result<()> {
        sqlx::query("INSERT INTO goal_completions (id, goal_id, created_at) VALUES (?, ?, ?)")
            .bind(&completion.id)
            .bind(&completion.goal_id)
            .bind(completion.created_at)
            .execute(&*self.pool)
            .await?;
        Ok(())
    }

    /// Delete a completion by its id. Returns false when none matched.
    pub async fn delete_completion(&self, completion_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM goal_completions WHERE id = ?")
            .bind(completion_id)
            .execute(&*self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List every completion recorded for one goal
    pub async fn list_completions_for_goal(&self, goal_id: &str) -> Result<Vec<GoalCompletion>> {
        let rows = sqlx::query(
            "SELECT id, goal_id, created_at FROM goal_completions WHERE goal_id = ? ORDER BY created_at, id",
        )
        .bind(goal_id)
        .fetch_all(&*self.pool)
        .await?;
        Ok(rows.iter().map(completion_from_row).collect())
    }

    /// Read goals and completions in one transaction so the summary pipeline
    /// sees a consistent snapshot: a goal deleted concurrently can never
    /// leave orphaned completions in the result.
    pub async fn fetch_week_snapshot(&self) -> Result<(Vec<Goal>, Vec<GoalCompletion>)> {
        let mut tx = self.pool.begin().await?;

        let goal_rows = sqlx::query(
            "SELECT id, title, desired_weekly_frequency, created_at FROM goals ORDER BY created_at, id",
        )
        .fetch_all(&mut *tx)
        .await?;

        let completion_rows = sqlx::query(
            "SELECT id, goal_id, created_at FROM goal_completions ORDER BY created_at, id",
        )
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        let goals = goal_rows.iter().map(goal_from_row).collect();
        let completions = completion_rows.iter().map(completion_from_row).collect();
        Ok((goals, completions))
    }

    /// Remove every goal and completion. Used by the seed binary.
    pub async fn clear_all(&self) -> Result<()> {
        sqlx::query("DELETE FROM goal_completions")
            .execute(&*self.pool)
            .await?;
        sqlx::query("DELETE FROM goals").execute(&*self.pool).await?;
        Ok(())
    }
}

fn goal_from_row(row: &SqliteRow) -> Goal {
    Goal {
        id: row.get("id"),
        title: row.get("title"),
        desired_weekly_frequency: row.get("desired_weekly_frequency"),
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
    }
}

fn completion_from_row(row: &SqliteRow) -> GoalCompletion {
    GoalCompletion {
        id: row.get("id"),
        goal_id: row.get("goal_id"),
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
    }
}

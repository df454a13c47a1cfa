use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::model::Task;

/// Row-level access to the `tasks` table. Every method touches at most one row,
/// except `list_between` which only reads.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn insert(&self, user_id: Uuid, text: &str, published_at: DateTime<Utc>) -> anyhow::Result<Task>;
    async fn get(&self, id: i64) -> anyhow::Result<Option<Task>>;
    /// Tasks of `user_id` published in `[from, to)`, oldest first, ties by id.
    async fn list_between(&self, user_id: Uuid, from: DateTime<Utc>, to: DateTime<Utc>) -> anyhow::Result<Vec<Task>>;
    /// Writes only touch a row owned by `user_id`; `None` otherwise.
    async fn update_text(&self, user_id: Uuid, id: i64, text: &str) -> anyhow::Result<Option<Task>>;
    async fn set_done(&self, user_id: Uuid, id: i64, done: bool) -> anyhow::Result<Option<Task>>;
    /// Returns false when no row of `user_id` had that id.
    async fn delete(&self, user_id: Uuid, id: i64) -> anyhow::Result<bool>;
}

#[derive(Clone)]
pub struct PgTaskStore {
    pool: PgPool,
}

impl PgTaskStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn insert(&self, user_id: Uuid, text: &str, published_at: DateTime<Utc>) -> anyhow::Result<Task> {
        let rec = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (user_id, task_text, published_at)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, task_text, done, published_at
            "#,
        )
        .bind(user_id)
        .bind(text)
        .bind(published_at)
        .fetch_one(&self.pool)
        .await
        .context("insert task")?;

        Ok(rec)
    }

    async fn get(&self, id: i64) -> anyhow::Result<Option<Task>> {
        let rec = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, task_text, done, published_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("get task")?;

        Ok(rec)
    }

    async fn list_between(&self, user_id: Uuid, from: DateTime<Utc>, to: DateTime<Utc>) -> anyhow::Result<Vec<Task>> {
        let rec = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, task_text, done, published_at
            FROM tasks
            WHERE user_id = $1 AND published_at >= $2 AND published_at < $3
            ORDER BY published_at ASC, id ASC
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .context("list tasks")?;

        Ok(rec)
    }

    async fn update_text(&self, user_id: Uuid, id: i64, text: &str) -> anyhow::Result<Option<Task>> {
        let rec = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET task_text = $3
            WHERE id = $2 AND user_id = $1
            RETURNING id, user_id, task_text, done, published_at
            "#,
        )
        .bind(user_id)
        .bind(id)
        .bind(text)
        .fetch_optional(&self.pool)
        .await
        .context("update task text")?;

        Ok(rec)
    }

    async fn set_done(&self, user_id: Uuid, id: i64, done: bool) -> anyhow::Result<Option<Task>> {
        let rec = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET done = $3
            WHERE id = $2 AND user_id = $1
            RETURNING id, user_id, task_text, done, published_at
            "#,
        )
        .bind(user_id)
        .bind(id)
        .bind(done)
        .fetch_optional(&self.pool)
        .await
        .context("update task done flag")?;

        Ok(rec)
    }

    async fn delete(&self, user_id: Uuid, id: i64) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            DELETE FROM tasks
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .context("delete task")?;

        Ok(res.rows_affected() == 1)
    }
}

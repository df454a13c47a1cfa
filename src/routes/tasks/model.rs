use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Task {
    pub id: i64,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    #[sqlx(rename = "task_text")]
    pub text: String,
    pub done: bool,
    pub published_at: DateTime<Utc>,
}

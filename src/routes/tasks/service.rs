use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use super::dto::TaskCommand;
use super::model::Task;
use super::queries::TaskStore;
use super::validate_task_text;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InvalidText {
    #[error("text is empty")]
    Empty,
    #[error("text has no letter or digit")]
    NoLetterOrDigit,
}

#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("authentication required")]
    Unauthenticated,
    #[error("task not found")]
    NotFound,
    #[error("task belongs to another user")]
    Forbidden,
    #[error("invalid task text: {0}")]
    InvalidText(InvalidText),
    #[error("task text is too long")]
    TooLong,
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// What an update request ended up doing.
#[derive(Debug)]
pub enum Applied {
    Deleted,
    Toggled(Task),
    Renamed(Task),
}

/// Ownership-scoped reads and writes over a `TaskStore`.
///
/// Every entry point takes the caller explicitly; `None` means an anonymous
/// request and is rejected before any validation or storage access.
#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn TaskStore>,
    utc_offset: FixedOffset,
}

impl TaskService {
    pub fn new(store: Arc<dyn TaskStore>, utc_offset: FixedOffset) -> Self {
        Self { store, utc_offset }
    }

    /// Calendar date of `now` in the configured timezone.
    pub fn today_at(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.utc_offset).date_naive()
    }

    pub fn today(&self) -> NaiveDate {
        self.today_at(Utc::now())
    }

    /// UTC bounds `[start, end)` of `day` in the configured timezone.
    fn day_bounds(&self, day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        let local_midnight = day.and_time(NaiveTime::MIN);
        let offset = Duration::seconds(i64::from(self.utc_offset.local_minus_utc()));
        let start = Utc.from_utc_datetime(&(local_midnight - offset));
        (start, start + Duration::days(1))
    }

    pub async fn list_today(&self, caller: Option<Uuid>, today: NaiveDate) -> Result<Vec<Task>, TaskError> {
        let user_id = authenticated(caller)?;
        let (from, to) = self.day_bounds(today);
        Ok(self.store.list_between(user_id, from, to).await?)
    }

    pub async fn create(&self, caller: Option<Uuid>, text: &str) -> Result<Task, TaskError> {
        let user_id = authenticated(caller)?;
        let text = validate_task_text(text)?;

        let task = self.store.insert(user_id, text, Utc::now()).await?;
        info!(%user_id, task_id = task.id, "task created");
        Ok(task)
    }

    pub async fn rename(&self, caller: Option<Uuid>, task_id: i64, text: &str) -> Result<Task, TaskError> {
        let user_id = authenticated(caller)?;
        self.owned(user_id, task_id).await?;
        let text = validate_task_text(text)?;

        // The row may vanish between the ownership check and the write; that reads as NotFound.
        let task = self.store.update_text(user_id, task_id, text).await?.ok_or(TaskError::NotFound)?;
        info!(%user_id, task_id, "task renamed");
        Ok(task)
    }

    pub async fn toggle_done(&self, caller: Option<Uuid>, task_id: i64, done: bool) -> Result<Task, TaskError> {
        let user_id = authenticated(caller)?;
        self.owned(user_id, task_id).await?;

        let task = self.store.set_done(user_id, task_id, done).await?.ok_or(TaskError::NotFound)?;
        info!(%user_id, task_id, done, "task toggled");
        Ok(task)
    }

    pub async fn delete(&self, caller: Option<Uuid>, task_id: i64) -> Result<(), TaskError> {
        let user_id = authenticated(caller)?;
        self.owned(user_id, task_id).await?;

        if !self.store.delete(user_id, task_id).await? {
            return Err(TaskError::NotFound);
        }
        info!(%user_id, task_id, "task deleted");
        Ok(())
    }

    /// Runs one update request. A missing task id is an unknown task, but
    /// only once the caller is known to be authenticated.
    pub async fn apply(&self, caller: Option<Uuid>, task_id: Option<i64>, command: TaskCommand) -> Result<Applied, TaskError> {
        let Some(task_id) = task_id else {
            authenticated(caller)?;
            return Err(TaskError::NotFound);
        };

        match command {
            TaskCommand::Delete => self.delete(caller, task_id).await.map(|()| Applied::Deleted),
            TaskCommand::SetDone(done) => self.toggle_done(caller, task_id, done).await.map(Applied::Toggled),
            TaskCommand::Rename(text) => self.rename(caller, task_id, &text).await.map(Applied::Renamed),
        }
    }

    /// Existence, then ownership.
    async fn owned(&self, user_id: Uuid, task_id: i64) -> Result<(), TaskError> {
        let task = self.store.get(task_id).await?.ok_or(TaskError::NotFound)?;
        if task.user_id != user_id {
            warn!(%user_id, task_id, "task owned by another user");
            return Err(TaskError::Forbidden);
        }
        Ok(())
    }
}

fn authenticated(caller: Option<Uuid>) -> Result<Uuid, TaskError> {
    caller.ok_or(TaskError::Unauthenticated)
}

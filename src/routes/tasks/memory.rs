use std::sync::Mutex;

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::model::Task;
use super::queries::TaskStore;

/// `TaskStore` kept in a Vec, for tests.
#[derive(Default)]
pub struct MemoryTaskStore {
    rows: Mutex<Vec<Task>>,
}

impl MemoryTaskStore {
    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn snapshot(&self, id: i64) -> Option<Task> {
        self.rows.lock().unwrap().iter().find(|t| t.id == id).cloned()
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn insert(&self, user_id: Uuid, text: &str, published_at: DateTime<Utc>) -> anyhow::Result<Task> {
        let mut rows = self.rows.lock().unwrap();
        let id = rows.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        let task = Task {
            id,
            user_id,
            text: text.to_string(),
            done: false,
            published_at,
        };
        rows.push(task.clone());
        Ok(task)
    }

    async fn get(&self, id: i64) -> anyhow::Result<Option<Task>> {
        Ok(self.snapshot(id))
    }

    async fn list_between(&self, user_id: Uuid, from: DateTime<Utc>, to: DateTime<Utc>) -> anyhow::Result<Vec<Task>> {
        let mut tasks: Vec<Task> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.user_id == user_id && t.published_at >= from && t.published_at < to)
            .cloned()
            .collect();
        tasks.sort_by_key(|t| (t.published_at, t.id));
        Ok(tasks)
    }

    async fn update_text(&self, user_id: Uuid, id: i64, text: &str) -> anyhow::Result<Option<Task>> {
        let mut rows = self.rows.lock().unwrap();
        Ok(rows.iter_mut().find(|t| t.id == id && t.user_id == user_id).map(|t| {
            t.text = text.to_string();
            t.clone()
        }))
    }

    async fn set_done(&self, user_id: Uuid, id: i64, done: bool) -> anyhow::Result<Option<Task>> {
        let mut rows = self.rows.lock().unwrap();
        Ok(rows.iter_mut().find(|t| t.id == id && t.user_id == user_id).map(|t| {
            t.done = done;
            t.clone()
        }))
    }

    async fn delete(&self, user_id: Uuid, id: i64) -> anyhow::Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|t| !(t.id == id && t.user_id == user_id));
        Ok(rows.len() != before)
    }
}

/// `TaskStore` whose every call fails, standing in for a database outage.
pub struct FailingTaskStore;

#[async_trait]
impl TaskStore for FailingTaskStore {
    async fn insert(&self, _user_id: Uuid, _text: &str, _published_at: DateTime<Utc>) -> anyhow::Result<Task> {
        Err(anyhow!("database unavailable"))
    }

    async fn get(&self, _id: i64) -> anyhow::Result<Option<Task>> {
        Err(anyhow!("database unavailable"))
    }

    async fn list_between(&self, _user_id: Uuid, _from: DateTime<Utc>, _to: DateTime<Utc>) -> anyhow::Result<Vec<Task>> {
        Err(anyhow!("database unavailable"))
    }

    async fn update_text(&self, _user_id: Uuid, _id: i64, _text: &str) -> anyhow::Result<Option<Task>> {
        Err(anyhow!("database unavailable"))
    }

    async fn set_done(&self, _user_id: Uuid, _id: i64, _done: bool) -> anyhow::Result<Option<Task>> {
        Err(anyhow!("database unavailable"))
    }

    async fn delete(&self, _user_id: Uuid, _id: i64) -> anyhow::Result<bool> {
        Err(anyhow!("database unavailable"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_are_scoped_to_the_owner() {
        let store = MemoryTaskStore::default();
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();
        let task = store.insert(owner, "Test task", Utc::now()).await.unwrap();

        assert_eq!(store.update_text(other, task.id, "Hijacked").await.unwrap(), None);
        assert_eq!(store.set_done(other, task.id, true).await.unwrap(), None);
        assert!(!store.delete(other, task.id).await.unwrap());
        assert_eq!(store.snapshot(task.id), Some(task.clone()));

        assert!(store.set_done(owner, task.id, true).await.unwrap().unwrap().done);
        assert!(store.delete(owner, task.id).await.unwrap());
        assert_eq!(store.len(), 0);
    }
}

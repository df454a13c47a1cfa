use serde::{Deserialize, Serialize};

/// Body of `POST /api/tasks`. A missing `task_text` is validated like an empty one.
#[derive(Debug, Default, Deserialize)]
pub struct CreateTask {
    pub task_text: Option<String>,
}

/// Body of the AJAX `POST /api/tasks/update` endpoint.
///
/// Fields arrive as raw form strings; `into_command` decides which single
/// operation the request stands for.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTask {
    pub task_id: Option<String>,
    pub done: Option<String>,
    pub task_text: Option<String>,
    pub delete: Option<String>,
}

/// The one operation an update request resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskCommand {
    Delete,
    SetDone(bool),
    Rename(String),
}

impl UpdateTask {
    /// `None` for a missing or non-numeric id, which the service treats as an unknown task.
    pub fn task_id(&self) -> Option<i64> {
        self.task_id.as_deref().and_then(|raw| raw.trim().parse().ok())
    }

    /// Precedence is delete, then done, then text.
    pub fn into_command(self) -> TaskCommand {
        if self.delete.as_deref() == Some("true") {
            return TaskCommand::Delete;
        }
        if let Some(done) = self.done {
            return TaskCommand::SetDone(done == "true");
        }
        TaskCommand::Rename(self.task_text.unwrap_or_default())
    }
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub done: Option<bool>,
}

impl StatusResponse {
    pub fn success() -> Self {
        Self { status: "success", message: None, task_id: None, done: None }
    }

    pub fn error(message: &'static str) -> Self {
        Self { status: "error", message: Some(message), task_id: None, done: None }
    }
}

#[derive(Debug, Serialize)]
pub struct ForbiddenResponse {
    pub error: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(task_id: Option<&str>, done: Option<&str>, text: Option<&str>, delete: Option<&str>) -> UpdateTask {
        UpdateTask {
            task_id: task_id.map(String::from),
            done: done.map(String::from),
            task_text: text.map(String::from),
            delete: delete.map(String::from),
        }
    }

    #[test]
    fn delete_wins_over_everything() {
        let cmd = form(Some("1"), Some("true"), Some("x"), Some("true")).into_command();
        assert_eq!(cmd, TaskCommand::Delete);
    }

    #[test]
    fn done_wins_over_text() {
        let cmd = form(Some("1"), Some("false"), Some("renamed"), None).into_command();
        assert_eq!(cmd, TaskCommand::SetDone(false));
        let cmd = form(Some("1"), Some("true"), Some("renamed"), Some("false")).into_command();
        assert_eq!(cmd, TaskCommand::SetDone(true));
    }

    #[test]
    fn only_literal_true_sets_done() {
        assert_eq!(form(None, Some("on"), None, None).into_command(), TaskCommand::SetDone(false));
        assert_eq!(form(None, Some("True"), None, None).into_command(), TaskCommand::SetDone(false));
    }

    #[test]
    fn missing_text_renames_to_empty() {
        assert_eq!(form(Some("3"), None, None, None).into_command(), TaskCommand::Rename(String::new()));
    }

    #[test]
    fn task_id_parsing() {
        assert_eq!(form(Some(" 42 "), None, None, None).task_id(), Some(42));
        assert_eq!(form(Some("abc"), None, None, None).task_id(), None);
        assert_eq!(form(None, None, None, None).task_id(), None);
    }

    #[test]
    fn status_payload_shapes() {
        let ok = serde_json::to_value(StatusResponse::success()).unwrap();
        assert_eq!(ok, serde_json::json!({"status": "success"}));

        let err = serde_json::to_value(StatusResponse::error("Select a valid task.")).unwrap();
        assert_eq!(err, serde_json::json!({"status": "error", "message": "Select a valid task."}));
    }
}

use axum::{
    extract::{
        rejection::{FormRejection, PathRejection},
        Path, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use tracing::error;
use uuid::Uuid;

use crate::routes::middleware_auth::MaybeUser;
use crate::state::AppState;
use super::dto::{CreateTask, ForbiddenResponse, StatusResponse, UpdateTask};
use super::service::{Applied, InvalidText, TaskError};

/// User-facing wording for text validation failures, which differs between
/// the create form and the update endpoint.
struct TextMessages {
    empty: &'static str,
    too_long: &'static str,
    no_letter_or_digit: &'static str,
}

const NO_LETTER_OR_DIGIT: &str = "Task must contain at least one letter or number.";

const CREATE_MESSAGES: TextMessages = TextMessages {
    empty: NO_LETTER_OR_DIGIT,
    too_long: "Task is too long!",
    no_letter_or_digit: NO_LETTER_OR_DIGIT,
};

const UPDATE_MESSAGES: TextMessages = TextMessages {
    empty: "Task cannot be empty!",
    too_long: "Task too long!",
    no_letter_or_digit: NO_LETTER_OR_DIGIT,
};

const DELETED: &str = "Task deleted successfully.";

fn failure(err: TaskError, messages: &TextMessages) -> Response {
    match err {
        TaskError::Unauthenticated => (
            StatusCode::UNAUTHORIZED,
            [(header::WWW_AUTHENTICATE, "Bearer")],
            Json(StatusResponse::error("Authentication required.")),
        )
            .into_response(),
        TaskError::NotFound => (StatusCode::NOT_FOUND, Json(StatusResponse::error("Select a valid task."))).into_response(),
        TaskError::Forbidden => (StatusCode::FORBIDDEN, Json(ForbiddenResponse { error: "Unauthorized" })).into_response(),
        TaskError::InvalidText(InvalidText::Empty) => bad_request(messages.empty),
        TaskError::InvalidText(InvalidText::NoLetterOrDigit) => bad_request(messages.no_letter_or_digit),
        TaskError::TooLong => bad_request(messages.too_long),
        TaskError::Store(e) => {
            error!(error = %e, "task storage failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(StatusResponse::error("Internal server error"))).into_response()
        }
    }
}

fn bad_request(message: &'static str) -> Response {
    (StatusCode::BAD_REQUEST, Json(StatusResponse::error(message))).into_response()
}

fn deleted() -> Response {
    let body = StatusResponse { message: Some(DELETED), ..StatusResponse::success() };
    (StatusCode::OK, Json(body)).into_response()
}

pub async fn list(
    State(state): State<AppState>,
    MaybeUser(caller): MaybeUser,
) -> impl IntoResponse {
    match state.tasks.list_today(caller, state.tasks.today()).await {
        Ok(tasks) => (StatusCode::OK, Json(tasks)).into_response(),
        Err(e) => failure(e, &CREATE_MESSAGES),
    }
}

/// Anonymous callers get the login challenge before the body is looked at;
/// only then does a malformed body surface as the extractor's rejection.
fn authenticated_body<T, R: IntoResponse>(caller: Option<Uuid>, body: Result<T, R>) -> Result<T, Response> {
    if caller.is_none() {
        return Err(failure(TaskError::Unauthenticated, &UPDATE_MESSAGES));
    }
    body.map_err(IntoResponse::into_response)
}

pub async fn create(
    State(state): State<AppState>,
    MaybeUser(caller): MaybeUser,
    body: Result<Form<CreateTask>, FormRejection>,
) -> impl IntoResponse {
    let Form(body) = match authenticated_body(caller, body) {
        Ok(body) => body,
        Err(res) => return res,
    };

    let text = body.task_text.unwrap_or_default();
    match state.tasks.create(caller, &text).await {
        Ok(_) => Redirect::to("/api/tasks").into_response(),
        Err(e) => failure(e, &CREATE_MESSAGES),
    }
}

/// The AJAX endpoint: one form, resolved to delete, toggle or rename.
pub async fn update(
    State(state): State<AppState>,
    MaybeUser(caller): MaybeUser,
    body: Result<Form<UpdateTask>, FormRejection>,
) -> impl IntoResponse {
    let Form(body) = match authenticated_body(caller, body) {
        Ok(body) => body,
        Err(res) => return res,
    };

    let task_id = body.task_id();
    let command = body.into_command();

    match state.tasks.apply(caller, task_id, command).await {
        Ok(Applied::Deleted) => deleted(),
        Ok(Applied::Toggled(task)) => {
            let body = StatusResponse { task_id: Some(task.id), done: Some(task.done), ..StatusResponse::success() };
            (StatusCode::OK, Json(body)).into_response()
        }
        Ok(Applied::Renamed(_)) => (StatusCode::OK, Json(StatusResponse::success())).into_response(),
        Err(e) => failure(e, &UPDATE_MESSAGES),
    }
}

pub async fn delete(
    State(state): State<AppState>,
    MaybeUser(caller): MaybeUser,
    id: Result<Path<i64>, PathRejection>,
) -> impl IntoResponse {
    // A non-numeric id names no task.
    let id = match authenticated_body(caller, id) {
        Ok(Path(id)) => id,
        Err(res) if caller.is_none() => return res,
        Err(_) => return failure(TaskError::NotFound, &UPDATE_MESSAGES),
    };

    match state.tasks.delete(caller, id).await {
        Ok(()) => deleted(),
        Err(e) => failure(e, &UPDATE_MESSAGES),
    }
}

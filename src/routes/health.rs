use axum::{ Json, extract::State, http::StatusCode };
use serde::Serialize;
use tracing::warn;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthData {
    status: u16,
    database: &'static str,
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthData>) {
    let database = match sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(&state.db).await {
        Ok(_) => "ok",
        Err(e) => {
            warn!(error = %e, "database ping failed");
            "unavailable"
        }
    };

    let status = if database == "ok" { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status, Json(HealthData { status: status.as_u16(), database }))
}

mod config;
mod routes;
mod state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::Config::from_env()?;

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "todolist=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let addr = config.addr();
    let state = state::AppState::init(config).await?;

    sqlx::migrate!("./migrations").run(&state.db).await?;

    let app = routes::app(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("server is chilling at http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

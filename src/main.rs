use cline_mcp::{
    build_app, config::Config, domain::tools::ToolHandlers, logging, storage::Store, AppState,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging();

    let config = Config::from_env()?;
    let store = Store::new(&config.db_path);
    store.init()?;

    let bind_socket = config.bind_socket()?;
    let state = AppState::new(store, ToolHandlers::new(), config.ping_interval());
    let app = build_app(state);
    let listener = tokio::net::TcpListener::bind(bind_socket).await?;

    info!(
        bind_addr = %config.bind_addr,
        bind_port = config.bind_port,
        db_path = %config.db_path.display(),
        ping_interval_secs = config.ping_interval_secs,
        "server starting"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

use log::{error, info};
use mergington_core::init_logging;
use mergington_server::{build_router, build_state, ServerConfig, StartupError};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=app_exit module=server status=error error={err}");
            eprintln!("mergington_server: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), StartupError> {
    let config = ServerConfig::from_env()?;
    init_logging(&config.log_level, &config.log_dir).map_err(StartupError::Logging)?;

    // Blocking: opens SQLite and seeds before any request is accepted.
    let state = build_state(&config)?;
    let app = build_router(state, &config.static_dir);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    let bound_addr = listener.local_addr()?;
    info!("event=server_listen module=server status=ok addr=http://{bound_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("event=server_stop module=server status=ok");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("event=shutdown_signal module=server status=error error={err}");
        std::future::pending::<()>().await;
    }
}

use armui::{
    cli::ArmUiArgs,
    config::Settings,
    server::{ArmUiServer, ServerState},
    ArmUiResult,
};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

const DEFAULT_LOG_FILTER: &str = "armui=info";

const VERBOSE_LOG_FILTER: &str = "armui=debug";

//--------------------------------------------------------------------------------------------------
// Functions: main
//--------------------------------------------------------------------------------------------------

#[tokio::main]
async fn main() -> ArmUiResult<()> {
    // Read .env before clap so its values feed the env-backed arguments
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("warning: failed to load .env: {e}");
        }
    }

    let args = ArmUiArgs::parse();

    let default_filter = if args.verbose {
        VERBOSE_LOG_FILTER
    } else {
        DEFAULT_LOG_FILTER
    };
    fmt()
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_level(true)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let settings = Settings::from_args(&args);
    let addr = settings.addr()?;
    tracing::info!(
        "arm at {}, transcoder at {}, database at {}",
        settings.get_arm_url(),
        settings.get_transcoder_url(),
        settings.get_arm_db_path().display()
    );

    let state = ServerState::new(settings)?;
    state
        .get_hardware()
        .refresh(state.get_arm(), state.get_transcoder())
        .await;

    let state = ArmUiServer::new(state, addr)
        .serve(shutdown_signal())
        .await?;
    state.shutdown();

    Ok(())
}

//--------------------------------------------------------------------------------------------------
// Functions: *
//--------------------------------------------------------------------------------------------------

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received ctrl-c, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}

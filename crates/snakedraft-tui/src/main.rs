// Snake draft client entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config
// 3. Build the league data and draft room collaborators
// 4. Fetch league, pool and history; build the session
// 5. Create channels and spawn the session task
// 6. Run the TUI until the user quits
// 7. Cleanup on exit

use std::sync::Arc;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{error, info};

use snakedraft_app::collaborator::HttpLeagueData;
use snakedraft_app::session::Session;
use snakedraft_core::config;
use snakedraft_core::transport::WsConnector;
use snakedraft_tui::tui;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing (log to file, not terminal)
    init_tracing()?;
    info!("Snake draft client starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: server={}, league={}, user={}",
        config.server.host, config.session.league_id, config.session.user_id
    );

    // 3. Collaborators
    let data = Arc::new(HttpLeagueData::new(config.server.http_base()));
    let connector = Arc::new(WsConnector::new(config.server.ws_base()));

    // 4. Bootstrap the session from the league server
    let (ui_tx, ui_rx) = mpsc::channel(256);
    let session = Session::load(&config, data, connector, ui_tx)
        .await
        .context("failed to load the draft")?;
    let snapshots = session.subscribe();

    // 5. Spawn the session task
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let session_handle = tokio::spawn(async move {
        if let Err(e) = session.run(cmd_rx).await {
            error!("Session loop error: {e:#}");
        }
    });

    // 6. Run the TUI event loop (blocking until user quits)
    info!("Application ready");
    if let Err(e) = tui::run(snapshots, ui_rx, cmd_tx).await {
        error!("TUI error: {e:#}");
    }

    // 7. Cleanup: the session exits once the command channel closes
    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), session_handle).await;

    info!("Snake draft client shut down cleanly");
    Ok(())
}

/// Initialize tracing to log to a file (the terminal belongs to the TUI).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("snakedraft.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("snakedraft=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! wtd: the Watchtower scheduler daemon.

use std::process::ExitCode;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use wt_daemon::{env, lifecycle, logging, Config, InitGate};

#[tokio::main]
async fn main() -> ExitCode {
    let log_dir = env::log_dir();
    let _log_guard = match logging::init(log_dir.as_deref(), &env::log_filter()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("wtd: {e}");
            return ExitCode::FAILURE;
        }
    };

    let config_path = env::config_path();
    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "failed to load config");
            return ExitCode::FAILURE;
        }
    };
    info!(
        config = %config_path.display(),
        search = %config.search.url,
        version = env!("CARGO_PKG_VERSION"),
        "starting wtd"
    );

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_signal(cancel.clone()));

    let gate = InitGate::new();
    let daemon = match lifecycle::startup(&gate, &config, &cancel).await {
        Ok(Some(daemon)) => daemon,
        Ok(None) => return ExitCode::SUCCESS,
        Err(lifecycle::LifecycleError::Cancelled) => {
            info!("shutdown requested during startup");
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            error!(error = %e, "startup failed");
            return ExitCode::FAILURE;
        }
    };

    daemon.run(cancel).await;
    ExitCode::SUCCESS
}

async fn cancel_on_signal(cancel: CancellationToken) {
    if let Err(e) = wait_for_shutdown_signal().await {
        warn!(error = %e, "signal handler failed; shutting down");
    } else {
        info!("shutdown signal received");
    }
    cancel.cancel();
}

async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut term = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result,
            _ = term.recv() => Ok(()),
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await
    }
}

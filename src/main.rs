// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;

use axum_server::tls_rustls::RustlsConfig;
use taskboard_server::{
    api::router, config::AppConfig, logging, state::AppState, storage::JsonStorage,
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    logging::init(config.log_format);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "server failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = config.bind_addr()?;

    let storage = JsonStorage::open(&config.data_dir)?;
    tracing::info!(data_dir = %config.data_dir.display(), "storage initialized");

    let state = AppState::new(storage, &config.auth);
    tracing::info!(
        public_paths = ?config.auth.public_paths,
        session_ttl = ?config.auth.session_ttl,
        "authorization gate configured"
    );

    let app = router(state);

    match &config.tls {
        Some(tls) => {
            // Must happen before any rustls config is built.
            rustls::crypto::ring::default_provider()
                .install_default()
                .map_err(|_| "failed to install rustls crypto provider")?;

            let tls_config = RustlsConfig::from_pem_file(&tls.cert, &tls.key).await?;
            tracing::info!(%addr, "listening on https (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            tracing::info!(%addr, "listening on http (docs at /docs)");
            axum_server::bind(addr)
                .serve(app.into_make_service())
                .await?;
        }
    }

    Ok(())
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{net::SocketAddr, sync::Arc};

use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use relational_relayer::{
    api::router,
    blockchain::EvmLedger,
    config::{LogFormat, RelayerConfig, DEFAULT_LOG_FILTER},
    recovery::{CodeIssuer, ConfirmationSweeper, HttpMailer, LogMailer, Mailer, RecoveryWorkflow},
    state::AppState,
    storage::RelayerDatabase,
    validation::ValidatorChain,
};

fn init_tracing(format: &LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = RelayerConfig::from_env()?;
    init_tracing(&config.log_format);

    std::fs::create_dir_all(&config.data_dir)?;
    let db = Arc::new(RelayerDatabase::open(&config.database_path())?);
    tracing::info!(path = %config.database_path().display(), "Database opened");

    let mailer: Arc<dyn Mailer> = match &config.mail_api_url {
        Some(url) => Arc::new(HttpMailer::new(url.clone(), config.mail_api_key.clone())),
        None => {
            tracing::warn!("MAIL_API_URL not set, confirmation mails will not be delivered");
            Arc::new(LogMailer)
        }
    };

    let recovery = RecoveryWorkflow::new(
        db.clone(),
        db.clone(),
        mailer,
        CodeIssuer::new(config.code_hmac_secret.clone()),
        config.code_ttl,
    );

    let ledger = Arc::new(EvmLedger::new(&config.rpc_url)?);
    let validators = ValidatorChain::standard(ledger, config.contract_whitelist.clone());

    let shutdown = CancellationToken::new();
    let sweeper = ConfirmationSweeper::new(db, config.code_ttl);
    let sweeper_task = tokio::spawn(sweeper.run(shutdown.clone()));

    let state = AppState::new(recovery, validators).with_data_dir(config.data_dir.clone());
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Relational Relayer listening (docs at /docs)");

    let signal = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
            tracing::info!("Shutting down");
            signal.cancel();
        })
        .await?;

    shutdown.cancel();
    sweeper_task.await?;
    Ok(())
}

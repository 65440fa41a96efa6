use std::sync::Arc;

use portfolio_backend::{
    config::Config,
    routes,
    server::{MAX_PORT_RETRIES, bind_with_fallback, shutdown_signal},
    services::{
        assistant::OpenAiAssistant,
        mailer::{Mailer, SmtpMailer},
        store::MemStore,
    },
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // lettre and reqwest both use rustls; pin the provider before any TLS setup
    if rustls::crypto::ring::default_provider().install_default().is_err() {
        tracing::warn!("rustls crypto provider already installed");
    }

    let config = Config::from_env();
    tracing::info!(
        "running in {} mode{}",
        if config.mode.is_production() { "production" } else { "development" },
        if config.on_render { " on Render" } else { "" }
    );

    let mailer = Arc::new(SmtpMailer::new(config.email.clone()));
    // result is logged inside, startup continues either way
    mailer.verify_connection().await;

    let state = Arc::new(AppState::new(
        Arc::new(MemStore::new()),
        mailer,
        Arc::new(OpenAiAssistant::new(config.openai.clone())),
    ));

    let static_dir = if config.mode.is_production() {
        config.resolve_static_dir()
    } else {
        None
    };

    let app = routes::with_frontend(routes::create_router(), config.mode, static_dir.as_deref())
        .with_state(state);

    let host = config.mode.bind_host();
    let listener = bind_with_fallback(host, config.port, MAX_PORT_RETRIES).await?;
    tracing::info!("server running on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

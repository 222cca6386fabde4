use messages_api::api::{AppState, message_routes};
use messages_api::config::{self, ApiConfig};
use messages_api::error::Error;
use messages_api::store;

#[tokio::main]
async fn main() -> Result<(), lambda_http::Error> {
    let on_lambda = config::running_on_lambda();

    // CloudWatch does not render ANSI colors
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_ansi(!on_lambda)
        .init();

    // Missing or malformed connection string is fatal before any request is served.
    let config = ApiConfig::from_env().map_err(Error::from)?;

    tracing::info!(
        backend = config.store_kind.name(),
        database = %config.database_name,
        lambda = on_lambda,
        "Messages API v{}",
        env!("CARGO_PKG_VERSION")
    );

    // ── Database ─────────────────────────────────────────────────────────
    let store = store::connect(&config).await.map_err(Error::from)?;

    let app = message_routes(
        AppState::new(store).with_exposed_errors(config.expose_internal_errors),
    );

    if on_lambda {
        lambda_http::run(app).await?;
    } else {
        let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
            .await
            .map_err(Error::from)?;
        tracing::info!(port = config.port, "Listening on http://0.0.0.0:{}", config.port);
        axum::serve(listener, app).await.map_err(Error::from)?;
    }

    Ok(())
}

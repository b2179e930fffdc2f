use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, router};
use era_core::config::{
    MailConfig, ProviderConfig, port_from_env_value, provider_kind_from_env_value,
    timeout_from_env_value,
};
use era_core::generation::client_from_config;
use era_core::mail::mailer_from_config;
use era_core::{EraConfig, UploadDir, WebpageService};

/// Main entry point for the ERA webpage generator
///
/// Serves the REST API, Swagger UI and the static form page on one address
/// (default: 0.0.0.0:3000).
///
/// # Environment Variables
/// - `PORT`: Listen port (default: 3000)
/// - `ERA_ADDR_HOST`: Listen host (default: "0.0.0.0")
/// - `ERA_PROVIDER`: `chat` or `v0` (default: `chat`)
/// - `OPENAI_API_KEY` / `V0_API_KEY`: Credential for the selected provider
/// - `ERA_PROVIDER_BASE_URL`, `ERA_CHAT_MODEL`, `ERA_PROVIDER_TIMEOUT_SECS`: Provider overrides
/// - `EMAIL_USER`, `EMAIL_PASS`, `EMAIL_SMTP_HOST`: SMTP account used to send results
/// - `NOTIFICATION_EMAIL`: Observer address copied on every email
/// - `ERA_UPLOAD_DIR`: Directory for transient uploads (default: "uploads")
/// - `ERA_PUBLIC_DIR`: Directory served for non-API paths (default: "public")
///
/// A missing provider credential or SMTP account is logged but does not stop startup; the
/// affected requests fail (generation) or skip sending (email) instead.
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - an environment variable holds an unparseable value,
/// - the upload directory cannot be created,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("era_run=info".parse()?)
                .add_directive("era_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let port = port_from_env_value(std::env::var("PORT").ok())?;
    let kind = provider_kind_from_env_value(std::env::var("ERA_PROVIDER").ok())?;
    let timeout: Duration = timeout_from_env_value(std::env::var("ERA_PROVIDER_TIMEOUT_SECS").ok())?;

    let provider = ProviderConfig::new(
        kind,
        std::env::var(kind.credential_env_var()).ok(),
        std::env::var("ERA_PROVIDER_BASE_URL").ok(),
        std::env::var("ERA_CHAT_MODEL").ok(),
        timeout,
    );
    let mail = MailConfig::new(
        std::env::var("EMAIL_USER").ok(),
        std::env::var("EMAIL_PASS").ok(),
        std::env::var("EMAIL_SMTP_HOST").ok(),
        std::env::var("NOTIFICATION_EMAIL").ok(),
    );

    let cfg = Arc::new(EraConfig::new(
        std::env::var("ERA_ADDR_HOST").ok(),
        port,
        std::env::var("ERA_UPLOAD_DIR").ok().map(Into::into),
        std::env::var("ERA_PUBLIC_DIR").ok().map(Into::into),
        provider,
        mail,
    )?);

    if cfg.provider().api_key().is_none() {
        tracing::warn!(
            "{} is not set; generation requests will fail",
            kind.credential_env_var()
        );
    }

    let generator = client_from_config(cfg.provider())?;
    let mailer = mailer_from_config(cfg.mail())?;

    let uploads = UploadDir::new(cfg.upload_dir());
    uploads.ensure_exists().await?;

    let state = AppState::new(
        WebpageService::new(cfg.clone(), generator, mailer),
        uploads,
    );
    let app = router(state, cfg.public_dir());

    let addr = cfg.bind_addr();
    tracing::info!("++ Starting ERA webpage generator on {}", addr);
    tracing::info!("++ Swagger UI at http://{}/swagger-ui", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

use std::path::Path;
use std::sync::Arc;

use tower_http::cors::CorsLayer;

use paydesk_onboarding::api::{HttpPaymentsApi, PaymentsApi};
use paydesk_onboarding::config::ServiceConfig;
use paydesk_onboarding::onboarding::{
    OnboardingProgressController, OnboardingRouteState, onboarding_routes, wait_for_credentials,
};
use paydesk_onboarding::store::{KvStore, LibSqlStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ServiceConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!("  export PAYDESK_API_URL=https://api.paydesk.example");
        std::process::exit(1);
    });

    eprintln!("PayDesk onboarding v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   API: {}", config.api_base_url);
    eprintln!("   Status: http://0.0.0.0:{}/api/onboarding/status", config.port);

    let store: Arc<dyn KvStore> =
        Arc::new(LibSqlStore::new_local(Path::new(&config.db_path)).await?);

    // Prefer an explicitly configured token; otherwise the login flow has
    // just run and the credentials show up in the store shortly.
    let token = match config.api_token.clone() {
        Some(token) => token,
        None => {
            tracing::info!("No API token configured; waiting for session credentials");
            let creds = wait_for_credentials(
                store.as_ref(),
                config.credential_poll_attempts,
                config.credential_poll_interval,
            )
            .await?;
            tracing::info!(account_id = %creds.account_id, "Session credentials found");
            creds.token
        }
    };

    let api: Arc<dyn PaymentsApi> = Arc::new(HttpPaymentsApi::new(
        config.api_base_url.clone(),
        token,
        config.api_timeout,
    )?);

    let controller = Arc::new(OnboardingProgressController::new(api, store));
    let status = controller.initialize().await?;
    tracing::info!(
        current_step = status.current_step,
        is_complete = status.is_complete,
        "Onboarding progress resolved"
    );

    let app = onboarding_routes(OnboardingRouteState { controller }).layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!(port = config.port, "Listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    Ok(())
}

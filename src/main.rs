//! Portail Habitat API server.

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use portail_habitat::adapters::auth::{FirebaseConfig, FirebaseSessionValidator};
use portail_habitat::adapters::http::{build_router, ApiState, BillingAppState, MarketplaceAppState};
use portail_habitat::adapters::postgres::{
    PostgresArtisanRepository, PostgresLeadRepository, PostgresSubscriptionMirror,
};
use portail_habitat::adapters::stripe::{StripeConfig, StripePaymentAdapter};
use portail_habitat::application::handlers::billing::{
    CancelSubscriptionHandler, GetSubscriptionHandler, HandleBillingWebhookHandler,
    SubscriptionStatePersister,
};
use portail_habitat::application::handlers::marketplace::{ListLeadsHandler, PurchaseLeadHandler};
use portail_habitat::config::{AppConfig, ServerConfig};
use portail_habitat::domain::billing::StripeWebhookVerifier;
use portail_habitat::ports::{
    ArtisanRepository, LeadRepository, PaymentProvider, SessionValidator,
    SubscriptionMirrorRepository,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    tracing::info!(
        environment = ?config.server.environment,
        stripe_test_mode = config.payment.is_test_mode(),
        listing_strategy = ?config.marketplace.listing_strategy,
        "Configuration loaded"
    );

    let pool = config.database.pool_options().connect(&config.database.url).await?;
    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    // Ports
    let artisans: Arc<dyn ArtisanRepository> =
        Arc::new(PostgresArtisanRepository::new(pool.clone()));
    let mirror: Arc<dyn SubscriptionMirrorRepository> =
        Arc::new(PostgresSubscriptionMirror::new(pool.clone()));
    let leads: Arc<dyn LeadRepository> = Arc::new(PostgresLeadRepository::new(pool));

    let mut stripe_config = StripeConfig::new(config.payment.stripe_api_key.clone())
        .with_timeout(std::time::Duration::from_secs(config.payment.stripe_timeout_secs));
    if let Some(url) = &config.payment.stripe_api_base_url {
        stripe_config = stripe_config.with_base_url(url.clone());
    }
    let payment_provider: Arc<dyn PaymentProvider> =
        Arc::new(StripePaymentAdapter::new(stripe_config)?);

    let mut firebase_config = FirebaseConfig::new(config.auth.firebase_project_id.clone())
        .with_cache_duration(config.auth.jwks_cache_ttl());
    if let Some(url) = &config.auth.jwks_url {
        firebase_config = firebase_config.with_jwks_url(url.clone());
    }
    let session_validator: Arc<dyn SessionValidator> =
        Arc::new(FirebaseSessionValidator::new(firebase_config)?);

    // Handlers
    let verifier = Arc::new(StripeWebhookVerifier::new(
        config.payment.stripe_webhook_secret.clone(),
    ));
    let persister = Arc::new(SubscriptionStatePersister::new(artisans.clone(), mirror));

    let state = ApiState {
        billing: BillingAppState {
            webhook_handler: Arc::new(HandleBillingWebhookHandler::new(
                verifier,
                artisans.clone(),
                payment_provider.clone(),
                persister.clone(),
            )),
            cancel_handler: Arc::new(CancelSubscriptionHandler::new(
                artisans.clone(),
                payment_provider,
                persister,
            )),
            subscription_handler: Arc::new(GetSubscriptionHandler::new(artisans.clone())),
        },
        marketplace: MarketplaceAppState {
            list_handler: Arc::new(ListLeadsHandler::new(
                leads.clone(),
                config.marketplace.listing_strategy,
                config.marketplace.default_listing_limit,
            )),
            purchase_handler: Arc::new(PurchaseLeadHandler::new(artisans, leads)),
        },
        session_validator,
    };

    let app = with_http_layers(build_router(state), &config.server);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Portail Habitat API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// JSON logs in production, human-readable output elsewhere.
fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(server.log_level.clone()));

    let registry = tracing_subscriber::registry().with(filter);
    if server.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer().pretty()).init();
    }
}

fn with_http_layers(app: Router, server: &ServerConfig) -> Router {
    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);
    let cors = if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(origins)
    };

    // Outermost first
    app.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(cors)
            .layer(TimeoutLayer::new(server.request_timeout())),
    )
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }
}

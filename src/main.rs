//! Storefront Orders - checkout and order reconciliation service

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront_orders::api::{router, AppState};
use storefront_orders::auth::AdminAllowList;
use storefront_orders::config::AppConfig;
use storefront_orders::infrastructure::{EventPublisher, PgStore, StripeGateway};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    tracing::debug!(?config, "configuration loaded");

    let db = PgPoolOptions::new().max_connections(10).connect(&config.database_url).await.context("connecting to Postgres")?;
    sqlx::migrate!("./migrations").run(&db).await?;

    let nats = match &config.nats_url {
        Some(url) => match async_nats::connect(url.as_str()).await {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::warn!(error = %e, "NATS unavailable, order events disabled");
                None
            }
        },
        None => None,
    };

    let admins = AdminAllowList::new(&config.admin_emails);
    if admins.is_empty() {
        tracing::warn!("ADMIN_EMAILS is empty, order listing is closed to everyone");
    }

    let state = AppState::new(
        Arc::new(PgStore::new(db)),
        Arc::new(StripeGateway::new(config.stripe_secret_key.clone(), config.stripe_api_base.clone())),
        EventPublisher::new(nats),
        Arc::new(admins),
        config.checkout_settings(),
        config.reconcile_settings(),
    );

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Storefront orders listening on {}", addr);
    axum::serve(tokio::net::TcpListener::bind(&addr).await?, router(state)).await?;
    Ok(())
}

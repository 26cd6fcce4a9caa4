use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use movie_recommender::{
    api::{create_router, AppState},
    cache::{create_redis_client, MemoryPosterCache, PosterCache, RedisPosterCache},
    config::Config,
    services::{
        catalog_loader,
        posters::{build_http_client, OmdbSource, PosterResolver, PosterSource, TmdbSource},
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "movie_recommender=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let catalog = Arc::new(catalog_loader::load(
        &config.catalog_path,
        &config.similarity_path,
    )?);

    let cache = create_poster_cache(&config)?;
    let posters = Arc::new(PosterResolver::new(
        create_poster_sources(&config)?,
        cache,
        config.placeholder_url.clone(),
        config.poster_cache_ttl(),
    ));

    let app = create_router(AppState::new(catalog, posters));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// OMDb first, TMDB second; a source without an API key is left out
fn create_poster_sources(config: &Config) -> anyhow::Result<Vec<Arc<dyn PosterSource>>> {
    let http_client = build_http_client(config.poster_timeout())?;
    let mut sources: Vec<Arc<dyn PosterSource>> = Vec::new();

    match &config.omdb_api_key {
        Some(key) => sources.push(Arc::new(OmdbSource::new(
            http_client.clone(),
            key.clone(),
            config.omdb_api_url.clone(),
        ))),
        None => tracing::warn!("OMDB_API_KEY not set, skipping OMDb poster lookups"),
    }

    match &config.tmdb_api_key {
        Some(key) => sources.push(Arc::new(TmdbSource::new(
            http_client,
            key.clone(),
            config.tmdb_api_url.clone(),
            config.tmdb_image_base_url.clone(),
        ))),
        None => tracing::warn!("TMDB_API_KEY not set, skipping TMDB poster lookups"),
    }

    Ok(sources)
}

fn create_poster_cache(config: &Config) -> anyhow::Result<Arc<dyn PosterCache>> {
    match &config.redis_url {
        Some(url) => Ok(Arc::new(RedisPosterCache::new(create_redis_client(url)?))),
        None => Ok(Arc::new(MemoryPosterCache::new())),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

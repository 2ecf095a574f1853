use std::{future::IntoFuture, net::SocketAddr, process, sync::Arc, time::Duration};

use pinkdreams::{
    application::{
        admin_token::AdminToken,
        blog::BlogService,
        cart::CartService,
        categories::CategoryService,
        contact::ContactService,
        error::AppError,
        health::HealthService,
        newsletter::NewsletterService,
        repos::{
            BlogPostsRepo, BlogPostsWriteRepo, CartsRepo, CategoriesRepo, CategoriesWriteRepo,
            ContactsRepo, HealthRepo, NewsletterRepo, WishlistsRepo,
        },
        wishlist::WishlistService,
    },
    cache::{
        CacheConfig, CacheStore, MemoryCacheStore, ReconnectingRedisStore, RedisCacheStore,
        build_cache,
    },
    config,
    domain::types::CategoryKind,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, ApiState, FormRateLimiter},
        telemetry,
    },
};
use tokio::sync::watch;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Migrate(_) => run_migrate(settings).await,
    }
}

async fn run_migrate(settings: config::Settings) -> Result<(), AppError> {
    init_repositories(&settings).await?;
    info!(target = "pinkdreams::migrate", "Migrations applied");
    Ok(())
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let cache_store = init_cache_store(&settings.cache).await;
    let api_state = build_api_state(repositories, cache_store, &settings);

    let prune_handle = spawn_rate_limit_pruner(
        api_state.rate_limiter.clone(),
        Duration::from_secs(u64::from(settings.rate_limit.window_seconds.get())),
    );

    let result = serve_http(&settings, api_state).await;

    prune_handle.abort();
    let _ = prune_handle.await;

    result
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<PostgresRepositories>, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    let pool = PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    Ok(Arc::new(PostgresRepositories::new(pool)))
}

const REDIS_RETRY_INTERVAL: Duration = Duration::from_secs(5);

/// Connect the cache store. An unreachable Redis keeps caching enabled behind
/// a store that reconnects in the background; requests fall through to the
/// database until it does.
async fn init_cache_store(settings: &config::CacheSettings) -> Option<Arc<dyn CacheStore>> {
    if !settings.enabled {
        info!(target = "pinkdreams::cache", "Blog cache disabled by configuration");
        return None;
    }

    let timeout = CacheConfig::from(settings).response_timeout();
    match RedisCacheStore::connect(&settings.redis_url, timeout).await {
        Ok(store) => Some(Arc::new(store)),
        Err(err) => {
            warn!(
                target = "pinkdreams::cache",
                error = %err,
                retry_secs = REDIS_RETRY_INTERVAL.as_secs(),
                "Redis unreachable at startup; retrying in the background"
            );
            Some(Arc::new(ReconnectingRedisStore::spawn(
                settings.redis_url.clone(),
                timeout,
                REDIS_RETRY_INTERVAL,
            )))
        }
    }
}

fn build_api_state(
    repositories: Arc<PostgresRepositories>,
    cache_store: Option<Arc<dyn CacheStore>>,
    settings: &config::Settings,
) -> ApiState {
    let blog_repo: Arc<dyn BlogPostsRepo> = repositories.clone();
    let blog_write_repo: Arc<dyn BlogPostsWriteRepo> = repositories.clone();
    let categories_repo: Arc<dyn CategoriesRepo> = repositories.clone();
    let categories_write_repo: Arc<dyn CategoriesWriteRepo> = repositories.clone();
    let newsletter_repo: Arc<dyn NewsletterRepo> = repositories.clone();
    let contacts_repo: Arc<dyn ContactsRepo> = repositories.clone();
    let carts_repo: Arc<dyn CartsRepo> = repositories.clone();
    let wishlists_repo: Arc<dyn WishlistsRepo> = repositories.clone();
    let health_repo: Arc<dyn HealthRepo> = repositories;

    let (cache_config, store): (CacheConfig, Arc<dyn CacheStore>) = match cache_store.clone() {
        Some(store) => (CacheConfig::from(&settings.cache), store),
        None => (CacheConfig::disabled(), Arc::new(MemoryCacheStore::new())),
    };
    let (cache, trigger) = build_cache(cache_config, store);

    let cart = CartService::new(carts_repo);
    let rate_limiter = Arc::new(FormRateLimiter::new(
        Duration::from_secs(u64::from(settings.rate_limit.window_seconds.get())),
        settings.rate_limit.max_requests.get(),
    ));

    let admin_token = settings.auth.admin_token.as_deref().map(AdminToken::new);
    if admin_token.is_none() {
        warn!(
            target = "pinkdreams::auth",
            "No admin token configured; admin routes will answer 503"
        );
    }

    ApiState {
        blogs: Arc::new(BlogService::new(blog_repo, blog_write_repo, cache, trigger)),
        product_categories: Arc::new(CategoryService::new(
            CategoryKind::Product,
            categories_repo.clone(),
            categories_write_repo.clone(),
        )),
        blog_categories: Arc::new(CategoryService::new(
            CategoryKind::Blog,
            categories_repo,
            categories_write_repo,
        )),
        newsletter: Arc::new(NewsletterService::new(newsletter_repo)),
        contact: Arc::new(ContactService::new(contacts_repo)),
        wishlist: Arc::new(WishlistService::new(wishlists_repo, cart.clone())),
        cart: Arc::new(cart),
        health: Arc::new(HealthService::new(health_repo, cache_store)),
        admin_token,
        rate_limiter,
    }
}

fn spawn_rate_limit_pruner(
    limiter: Arc<FormRateLimiter>,
    period: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.tick().await; // Skip the first immediate tick
        loop {
            interval.tick().await;
            limiter.prune();
        }
    })
}

async fn serve_http(settings: &config::Settings, api_state: ApiState) -> Result<(), AppError> {
    let router = http::build_router(api_state, &settings.cors);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(
        target = "pinkdreams::http",
        addr = %settings.server.addr,
        "Listening"
    );

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let server = axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    let grace = settings.server.graceful_shutdown;
    tokio::select! {
        result = server.into_future() => {
            result.map_err(|err| AppError::unexpected(format!("server error: {err}")))?;
        }
        _ = async {
            if shutdown_rx.wait_for(|stopping| *stopping).await.is_ok() {
                tokio::time::sleep(grace).await;
            } else {
                std::future::pending::<()>().await;
            }
        } => {
            warn!(
                target = "pinkdreams::http",
                grace_seconds = grace.as_secs(),
                "Graceful shutdown timed out; dropping open connections"
            );
        }
    }

    info!(target = "pinkdreams::http", "Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!(target = "pinkdreams::http", "Shutdown signal received");
}

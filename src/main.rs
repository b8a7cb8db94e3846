//! Wiring & DI. Entry point: bootstrap adapters, inject into services, serve HTTP.
//! No business logic here.

use dotenv::dotenv;
use quizhub::adapters::http::{self, AppState};
use quizhub::adapters::identity::{StaticIdentity, UserInfoIdentity};
use quizhub::adapters::persistence::{SqliteRepo, apply_seed, load_seed};
use quizhub::adapters::rate_limit::FixedWindowLimiter;
use quizhub::ports::{ContactRepo, IdentityPort, QuizRepo, RateLimitPort, SubscriberRepo};
use quizhub::shared::config::AppConfig;
use quizhub::usecases::{AccountService, ContactService, NewsletterService, QuizService};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    let cfg = AppConfig::load().map_err(|e| anyhow::anyhow!("invalid configuration: {}", e))?;

    let data_path = PathBuf::from(cfg.data_dir_or_default());
    info!(path = %data_path.display(), "data directory");

    // --- Persistence ---
    let sqlite_repo = Arc::new(
        SqliteRepo::connect(&data_path)
            .await
            .map_err(|e| anyhow::anyhow!("SQLite connect failed: {}", e))?,
    );
    let quiz_repo: Arc<dyn QuizRepo> = Arc::clone(&sqlite_repo) as Arc<dyn QuizRepo>;
    let subscriber_repo: Arc<dyn SubscriberRepo> =
        Arc::clone(&sqlite_repo) as Arc<dyn SubscriberRepo>;
    let contact_repo: Arc<dyn ContactRepo> = Arc::clone(&sqlite_repo) as Arc<dyn ContactRepo>;

    if let Some(seed_path) = cfg.seed_path.as_deref() {
        let seed = load_seed(seed_path)
            .await
            .map_err(|e| anyhow::anyhow!("{}", e))?;
        apply_seed(quiz_repo.as_ref(), &seed)
            .await
            .map_err(|e| anyhow::anyhow!("{}", e))?;
    }

    // --- Identity provider ---
    let identity: Arc<dyn IdentityPort> = match cfg.identity_userinfo_url() {
        Some(url) => {
            info!(url, "identity provider: OIDC userinfo");
            Arc::new(UserInfoIdentity::new(url.to_string()))
        }
        None => match cfg.dev_token.as_deref() {
            Some(token) => {
                warn!("QUIZHUB_IDENTITY_USERINFO_URL not set, accepting QUIZHUB_DEV_TOKEN only");
                Arc::new(StaticIdentity::dev(token))
            }
            None => {
                warn!("no identity provider configured, /api/me will reject every request");
                Arc::new(StaticIdentity::new())
            }
        },
    };

    // --- Rate limit ---
    let rate_limit_max = cfg.rate_limit_max_or_default();
    let rate_limit_window = cfg.rate_limit_window();
    info!(
        rate_limit_max,
        window_secs = rate_limit_window.as_secs(),
        "rate limit per client address"
    );
    let rate_limiter: Arc<dyn RateLimitPort> =
        Arc::new(FixedWindowLimiter::new(rate_limit_max, rate_limit_window));
    let trust_forwarded_for = cfg.trust_forwarded_for_or_default();
    if trust_forwarded_for {
        warn!("rate limiting keyed on X-Forwarded-For; run behind a proxy that sets it");
    }

    // --- Services ---
    let state = Arc::new(AppState {
        quiz: QuizService::new(quiz_repo),
        newsletter: NewsletterService::new(subscriber_repo),
        contact: ContactService::new(contact_repo),
        account: AccountService::new(identity),
        rate_limiter,
        trust_forwarded_for,
    });

    // --- Serve ---
    let address = cfg.bind_address();
    info!("Binding to {address}");
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|e| anyhow::anyhow!("bind {}: {}", address, e))?;
    http::serve(listener, state, http::shutdown_signal()).await?;

    info!("Server shut down");
    Ok(())
}

//! grimoire-api - HTTP API server for categories and wizards.

use std::ffi::OsStr;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use grimoire_api::config::{ApiConfig, StoreBackend};
use grimoire_api::{build_router, parse_allowed_origins, AppState};
use grimoire_core::defaults::LOG_FILTER;
use grimoire_db::{Database, MemoryStore, PoolConfig};

/// Log output settings.
///
/// | Variable | Meaning |
/// |----------|---------|
/// | `LOG_FORMAT` | `json` or `text` (default) |
/// | `LOG_FILE` | write to this file with daily rotation instead of stdout |
/// | `LOG_ANSI` | force colors on (`true`/`1`) or off |
///
/// Verbosity comes from `RUST_LOG`, falling back to [`LOG_FILTER`].
struct LogSettings {
    json: bool,
    file: Option<PathBuf>,
    ansi: Option<bool>,
}

impl LogSettings {
    fn from_env() -> Self {
        Self {
            json: std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json")),
            file: std::env::var_os("LOG_FILE").map(PathBuf::from),
            ansi: std::env::var("LOG_ANSI")
                .ok()
                .map(|v| v == "true" || v == "1"),
        }
    }
}

/// Directory and file-name prefix for the daily rolling appender.
fn split_log_path(path: &Path) -> (&Path, &OsStr) {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let name = path
        .file_name()
        .unwrap_or(OsStr::new("grimoire-api.log"));
    (dir, name)
}

/// Install the global subscriber. The returned guard flushes the file
/// writer and must live until shutdown.
fn init_tracing(settings: &LogSettings) -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| LOG_FILTER.into());

    let (writer, guard) = match &settings.file {
        Some(path) => {
            let (dir, name) = split_log_path(path);
            let (non_blocking, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, name));
            (BoxMakeWriter::new(non_blocking), Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stdout), None),
    };

    // Files get plain text unless colors are asked for
    let ansi = settings.ansi.unwrap_or(settings.file.is_none());
    let fmt = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi);

    let registry = tracing_subscriber::registry().with(env_filter);
    if settings.json {
        registry.with(fmt.json()).init();
    } else {
        registry.with(fmt).init();
    }

    info!(
        log_format = if settings.json { "json" } else { "text" },
        log_file = %settings
            .file
            .as_deref()
            .map_or_else(|| "(stdout)".into(), Path::to_string_lossy),
        "Logging initialized"
    );
    guard
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let _log_guard = init_tracing(&LogSettings::from_env());

    let config = ApiConfig::from_env()?;

    let store = match config.store_backend {
        StoreBackend::Postgres => {
            info!("Connecting to database...");
            let pool_config = PoolConfig::new().max_connections(config.db_max_connections);
            let db = Database::connect_with_config(&config.database_url, pool_config).await?;
            info!("Running migrations...");
            db.migrate().await?;
            db.store()
        }
        StoreBackend::Memory => {
            info!("Using in-memory store; data is lost on exit");
            MemoryStore::new().store()
        }
    };

    info!(
        delete_policy = ?config.delete_policy,
        content_min_len = config.content_min_len,
        public_url = %config.public_url,
        "Configuration loaded"
    );

    let state = AppState::new(store, &config);
    let app = build_router(state, parse_allowed_origins(&config.allowed_origins));

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

//! Gateway configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). The resulting [`ReplyConfig`] is built
//! once at startup and handed to each component's constructor.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

/// Default model identifier passed to the Gemini API.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash-latest";

/// Default Gemini API root.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Startup configuration problems.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `LISTEN_ADDR` is set but not a socket address.
    #[error("invalid LISTEN_ADDR '{0}'")]
    InvalidListenAddr(String),

    /// `GENERATOR_BACKEND` names an unknown backend.
    #[error("unknown GENERATOR_BACKEND '{0}': expected 'gemini' or 'stub'")]
    UnknownGenerator(String),

    /// `LOG_FORMAT` names an unknown format.
    #[error("unknown LOG_FORMAT '{0}': expected 'text' or 'json'")]
    UnknownLogFormat(String),

    /// The remote store was selected without a connection string.
    #[error("USE_REMOTE_STORE is enabled but DATABASE_URL is not set")]
    MissingDatabaseUrl,
}

/// Tracing output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Which [`crate::generator::ReplyGenerator`] to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorBackend {
    /// Google Gemini `generateContent`.
    Gemini,
    /// Canned in-process replies, for offline runs.
    Stub,
}

/// Settings for the outbound generation call.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Selected backend.
    pub backend: GeneratorBackend,
    /// API key; the Gemini generator refuses to build without one.
    pub api_key: Option<SecretString>,
    /// Model identifier.
    pub model: String,
    /// API root, overridable for tests and proxies.
    pub base_url: String,
    /// Whole-request timeout for one generation call.
    pub timeout: Duration,
}

/// Which relational store backs the [`crate::persistence::ReplyStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// Local file-backed SQLite database.
    Sqlite {
        /// Database file path; created if absent.
        path: PathBuf,
    },
    /// Remote PostgreSQL reachable by connection string.
    Postgres {
        /// Connection string.
        url: String,
    },
}

impl StoreBackend {
    /// Short backend name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Sqlite { .. } => "sqlite",
            Self::Postgres { .. } => "postgres",
        }
    }
}

/// Settings for the persistence gateway.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Selected backend.
    pub backend: StoreBackend,
    /// Maximum number of pooled connections.
    pub max_connections: u32,
    /// Minimum idle connections.
    pub min_connections: u32,
    /// Timeout for acquiring a connection.
    pub connect_timeout: Duration,
}

/// Top-level configuration.
///
/// Loaded once at startup via [`ReplyConfig::from_env`].
#[derive(Debug, Clone)]
pub struct ReplyConfig {
    /// Socket address to bind the HTTP server to.
    pub listen_addr: SocketAddr,
    /// Tracing output format.
    pub log_format: LogFormat,
    /// Generation settings.
    pub generator: GeneratorConfig,
    /// Storage settings.
    pub store: StoreConfig,
}

impl ReplyConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a setting is present but invalid, or a
    /// selected backend lacks its credentials.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`ReplyConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let raw_addr = env
            .get("LISTEN_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8000".to_string());
        let listen_addr: SocketAddr = raw_addr
            .parse()
            .map_err(|_| ConfigError::InvalidListenAddr(raw_addr.clone()))?;

        let log_format = match env.get("LOG_FORMAT").as_deref() {
            None => LogFormat::Text,
            Some(v) if v.eq_ignore_ascii_case("text") => LogFormat::Text,
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            Some(other) => return Err(ConfigError::UnknownLogFormat(other.to_string())),
        };

        Ok(Self {
            listen_addr,
            log_format,
            generator: generator_config(&env)?,
            store: store_config(&env)?,
        })
    }
}

fn generator_config<F>(env: &Env<F>) -> Result<GeneratorConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let backend = match env.get("GENERATOR_BACKEND").as_deref() {
        None => GeneratorBackend::Gemini,
        Some(v) if v.eq_ignore_ascii_case("gemini") => GeneratorBackend::Gemini,
        Some(v) if v.eq_ignore_ascii_case("stub") => GeneratorBackend::Stub,
        Some(other) => return Err(ConfigError::UnknownGenerator(other.to_string())),
    };

    let api_key = env
        .get("GEMINI_API_KEY")
        .or_else(|| env.get("GEMINI"))
        .map(|key| SecretString::new(key.into()));

    Ok(GeneratorConfig {
        backend,
        api_key,
        model: env
            .get("GEMINI_MODEL")
            .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
        base_url: env
            .get("GEMINI_BASE_URL")
            .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
        timeout: Duration::from_secs(env.parse("GENERATION_TIMEOUT_SECS", 30)),
    })
}

fn store_config<F>(env: &Env<F>) -> Result<StoreConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let remote = env
        .parse_bool("USE_REMOTE_STORE")
        .or_else(|| env.parse_bool("USE_NEON"))
        .unwrap_or(false);

    let backend = if remote {
        let url = env
            .get("DATABASE_URL")
            .or_else(|| env.get("NEON_DB_URL"))
            .ok_or(ConfigError::MissingDatabaseUrl)?;
        StoreBackend::Postgres { url }
    } else {
        StoreBackend::Sqlite {
            path: env
                .get("SQLITE_PATH")
                .map_or_else(|| PathBuf::from("replies.db"), PathBuf::from),
        }
    };

    Ok(StoreConfig {
        backend,
        max_connections: env.parse("DATABASE_MAX_CONNECTIONS", 5),
        min_connections: env.parse("DATABASE_MIN_CONNECTIONS", 0),
        connect_timeout: Duration::from_secs(env.parse("DATABASE_CONNECT_TIMEOUT_SECS", 5)),
    })
}

/// Lookup wrapper that treats blank values as unset.
struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Parses a variable as `T`, returning `default` on missing or invalid
    /// values.
    fn parse<T: std::str::FromStr>(&self, key: &str, default: T) -> T {
        self.get(key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Accepts `true`/`1`/`yes` and `false`/`0`/`no`, case-insensitively.
    fn parse_bool(&self, key: &str) -> Option<bool> {
        let value = self.get(key)?.to_ascii_lowercase();
        match value.as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        }
    }
}

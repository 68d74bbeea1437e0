use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// URL prefixes the generic proxy may forward to when no override is set.
pub const DEFAULT_ALLOWED_PREFIXES: [&str; 3] = [
    "https://lobehub.search1api.com/api/search",
    "https://pollinations.ai-chat.top/api/drawing",
    "https://web-crawler.chat-plugin.lobehub.com/api/v1",
];

#[derive(Clone)]
pub struct Config {
    // Server
    pub bind_addr: SocketAddr,
    pub static_dir: PathBuf,

    // Access gate
    pub access_codes: Vec<String>,
    pub secret_key: Option<String>,

    // Upstreams
    pub searxng_url: Option<String>,
    pub doc_parse_url: Option<String>,
    pub doc_parse_api_key: Option<String>,
    pub allowed_proxy_prefixes: Vec<String>,

    // Limits
    pub max_upload_bytes: usize,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bind_addr", &self.bind_addr)
            .field("static_dir", &self.static_dir)
            .field(
                "access_codes",
                &format!("[{} configured]", self.access_codes.len()),
            )
            .field("secret_key", &self.secret_key.as_ref().map(|_| "[REDACTED]"))
            .field("searxng_url", &self.searxng_url)
            .field(
                "doc_parse_api_key",
                &self.doc_parse_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("doc_parse_url", &self.doc_parse_url)
            .field("allowed_proxy_prefixes", &self.allowed_proxy_prefixes)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),

    #[error("Failed to parse {0}: {1}")]
    ParseError(String, String),
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Attempt to load .env file, but don't fail if it doesn't exist
        // (env vars may be set directly in production)
        let _ = dotenvy::dotenv();

        // Server
        let bind_addr_str = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_addr = bind_addr_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::ParseError("BIND_ADDR".to_string(), e.to_string()))?;

        let static_dir =
            PathBuf::from(env::var("STATIC_DIR").unwrap_or_else(|_| "static".to_string()));

        // Access codes: comma-separated, trimmed, empties dropped.
        // An empty list disables authentication entirely.
        let access_codes = parse_csv(&env::var("ACCESS_CODE").unwrap_or_default());

        // Session signing secret. Optional: an ephemeral key is generated at
        // startup when absent, invalidating sessions across restarts.
        let secret_key = non_empty(env::var("SECRET_KEY").ok());
        if let Some(ref key) = secret_key {
            // Cookie key derivation requires at least 32 bytes of input
            if key.len() < 32 {
                return Err(ConfigError::InvalidValue(
                    "SECRET_KEY".to_string(),
                    format!("must be at least 32 bytes, got {}", key.len()),
                ));
            }
        }

        // Upstreams
        let searxng_url = non_empty(env::var("SEARXNG_URL").ok());
        let doc_parse_url = non_empty(env::var("DOC_PARSE_URL").ok());
        let doc_parse_api_key = non_empty(env::var("DOC_PARSE_API_KEY").ok());

        let allowed_proxy_prefixes = match env::var("PROXY_ALLOWED_PREFIXES") {
            Ok(raw) => {
                let prefixes = parse_csv(&raw);
                if prefixes.is_empty() {
                    return Err(ConfigError::InvalidValue(
                        "PROXY_ALLOWED_PREFIXES".to_string(),
                        "must contain at least one prefix when set".to_string(),
                    ));
                }
                prefixes
            }
            Err(_) => DEFAULT_ALLOWED_PREFIXES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        };

        // Limits
        let max_upload_bytes = parse_env_or_default("MAX_UPLOAD_BYTES", 52_428_800)?;

        Ok(Config {
            bind_addr,
            static_dir,
            access_codes,
            secret_key,
            searxng_url,
            doc_parse_url,
            doc_parse_api_key,
            allowed_proxy_prefixes,
            max_upload_bytes,
        })
    }
}

fn parse_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Helper function to parse environment variable with a default value
fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(val) => val
            .parse::<T>()
            .map_err(|e| ConfigError::ParseError(key.to_string(), format!("{}: {}", e, val))),
        Err(_) => Ok(default),
    }
}

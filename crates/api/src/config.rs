use std::net::IpAddr;
use std::str::FromStr;

use axum::http::HeaderValue;

use crate::auth::jwt::JwtConfig;

pub use staybook_db::DEFAULT_DATABASE_URL;

/// A configuration value that is missing or cannot be parsed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0} databases are not supported; the storage layer is built for SQLite")]
    UnsupportedEngine(DbEngine),
}

/// Database engines `DB_ENGINE` may name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbEngine {
    Sqlite,
    Mysql,
}

impl std::fmt::Display for DbEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            DbEngine::Sqlite => "sqlite",
            DbEngine::Mysql => "mysql",
        })
    }
}

impl FromStr for DbEngine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" | "sqlite3" => Ok(DbEngine::Sqlite),
            "mysql" => Ok(DbEngine::Mysql),
            _ => Err("expected sqlite or mysql".into()),
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// Everything except `SECRET_KEY` has a default suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: IpAddr,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Verbose logging by default when no `RUST_LOG` is set.
    pub debug: bool,
    /// SQLite connection URL.
    pub database_url: String,
    /// Accepted `Host` header values. `*` accepts any host; a leading `.`
    /// matches the domain and all of its subdomains.
    pub allowed_hosts: Vec<String>,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<HeaderValue>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                    | Default                          |
    /// |----------------------------|----------------------------------|
    /// | `SECRET_KEY`               | required                         |
    /// | `DEBUG`                    | `false`                          |
    /// | `ALLOWED_HOSTS`            | `localhost,127.0.0.1`            |
    /// | `DATABASE_URL`             | built from `DB_*`                |
    /// | `DB_ENGINE`                | `sqlite`                         |
    /// | `DB_NAME`                  | `staybook.db`                    |
    /// | `HOST`                     | `0.0.0.0`                        |
    /// | `PORT`                     | `8000`                           |
    /// | `CORS_ORIGINS`             | `http://localhost:3000`          |
    /// | `REQUEST_TIMEOUT_SECS`     | `30`                             |
    /// | `ACCESS_TOKEN_EXPIRY_MINS` | `60`                             |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let host = parse_var("HOST", var("HOST", "0.0.0.0"))?;
        let port = parse_var("PORT", var("PORT", "8000"))?;
        let debug = parse_bool("DEBUG", &var("DEBUG", "false"))?;
        let database_url = resolve_database_url(&lookup)?;
        let allowed_hosts = split_list(&var("ALLOWED_HOSTS", "localhost,127.0.0.1"));

        let cors_origins = split_list(&var("CORS_ORIGINS", "http://localhost:3000"))
            .into_iter()
            .map(|origin| {
                HeaderValue::from_str(&origin).map_err(|e| ConfigError::Invalid {
                    var: "CORS_ORIGINS",
                    value: origin.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let request_timeout_secs =
            parse_var("REQUEST_TIMEOUT_SECS", var("REQUEST_TIMEOUT_SECS", "30"))?;

        let jwt = JwtConfig::from_lookup(&lookup)?;

        Ok(Self {
            host,
            port,
            debug,
            database_url,
            allowed_hosts,
            cors_origins,
            request_timeout_secs,
            jwt,
        })
    }

    /// Whether a request's `Host` header (port already stripped) is accepted.
    pub fn is_host_allowed(&self, host: Option<&str>) -> bool {
        if self.allowed_hosts.iter().any(|h| h == "*") {
            return true;
        }
        let Some(host) = host else {
            return false;
        };
        let host = host.to_ascii_lowercase();

        self.allowed_hosts.iter().any(|pattern| {
            let pattern = pattern.to_ascii_lowercase();
            match pattern.strip_prefix('.') {
                Some(domain) => host == domain || host.ends_with(&pattern),
                None => host == pattern,
            }
        })
    }
}

/// Pick the database URL.
///
/// An explicit `DATABASE_URL` wins. Otherwise `DB_ENGINE` selects the engine:
/// `sqlite` (the default) opens `DB_NAME`, and `mysql` needs explicit
/// `DB_NAME`, `DB_USER`, `DB_PASSWORD` and `DB_HOST` (`DB_PORT` defaults to
/// 3306). MySQL credentials are checked so a half-configured deployment names
/// the missing variable, then rejected with [`ConfigError::UnsupportedEngine`].
fn resolve_database_url<F>(lookup: &F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(url) = non_empty("DATABASE_URL") {
        if url.starts_with("mysql:") {
            return Err(ConfigError::UnsupportedEngine(DbEngine::Mysql));
        }
        return Ok(url);
    }

    let engine = match non_empty("DB_ENGINE") {
        Some(raw) => parse_var("DB_ENGINE", raw)?,
        None => DbEngine::Sqlite,
    };

    match engine {
        DbEngine::Sqlite => Ok(match non_empty("DB_NAME") {
            Some(name) => format!("sqlite://{name}?mode=rwc"),
            None => DEFAULT_DATABASE_URL.to_string(),
        }),
        DbEngine::Mysql => {
            for key in ["DB_NAME", "DB_USER", "DB_PASSWORD", "DB_HOST"] {
                if non_empty(key).is_none() {
                    return Err(ConfigError::Missing(key));
                }
            }
            if let Some(raw) = non_empty("DB_PORT") {
                let _: u16 = parse_var("DB_PORT", raw)?;
            }
            Err(ConfigError::UnsupportedEngine(DbEngine::Mysql))
        }
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

pub(crate) fn parse_var<T>(var: &'static str, value: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let parsed: Result<T, T::Err> = value.parse();
    parsed.map_err(|e| ConfigError::Invalid {
        var,
        reason: e.to_string(),
        value,
    })
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::Invalid {
            var,
            value: value.to_string(),
            reason: "expected true or false".into(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let config = load(&[("SECRET_KEY", "s3cret")]).unwrap();
        assert_eq!(config.port, 8000);
        assert!(!config.debug);
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.allowed_hosts, vec!["localhost", "127.0.0.1"]);
        assert_eq!(config.cors_origins.len(), 1);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.jwt.access_token_expiry_mins, 60);
    }

    #[test]
    fn missing_secret_is_an_error() {
        assert_matches!(load(&[]), Err(ConfigError::Missing("SECRET_KEY")));
    }

    #[test]
    fn invalid_port_is_an_error() {
        let result = load(&[("SECRET_KEY", "s"), ("PORT", "eighty")]);
        assert_matches!(result, Err(ConfigError::Invalid { var: "PORT", .. }));
    }

    #[test]
    fn debug_accepts_common_spellings() {
        let config = load(&[("SECRET_KEY", "s"), ("DEBUG", "True")]).unwrap();
        assert!(config.debug);
        let result = load(&[("SECRET_KEY", "s"), ("DEBUG", "maybe")]);
        assert_matches!(result, Err(ConfigError::Invalid { var: "DEBUG", .. }));
    }

    #[test]
    fn allowed_hosts_matching() {
        let config = load(&[
            ("SECRET_KEY", "s"),
            ("ALLOWED_HOSTS", "api.example.com, .staybook.test"),
        ])
        .unwrap();

        assert!(config.is_host_allowed(Some("api.example.com")));
        assert!(config.is_host_allowed(Some("API.EXAMPLE.COM")));
        assert!(config.is_host_allowed(Some("staybook.test")));
        assert!(config.is_host_allowed(Some("eu.staybook.test")));
        assert!(!config.is_host_allowed(Some("example.com")));
        assert!(!config.is_host_allowed(Some("evilstaybook.test")));
        assert!(!config.is_host_allowed(None));
    }

    #[test]
    fn db_name_selects_the_sqlite_file() {
        let config = load(&[("SECRET_KEY", "s"), ("DB_NAME", "travel.db")]).unwrap();
        assert_eq!(config.database_url, "sqlite://travel.db?mode=rwc");

        let config = load(&[("SECRET_KEY", "s"), ("DB_ENGINE", "SQLite")]).unwrap();
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
    }

    #[test]
    fn database_url_overrides_engine_settings() {
        let config = load(&[
            ("SECRET_KEY", "s"),
            ("DATABASE_URL", "sqlite::memory:"),
            ("DB_ENGINE", "mysql"),
        ])
        .unwrap();
        assert_eq!(config.database_url, "sqlite::memory:");
    }

    #[test]
    fn unknown_engine_is_an_error() {
        let result = load(&[("SECRET_KEY", "s"), ("DB_ENGINE", "oracle")]);
        assert_matches!(result, Err(ConfigError::Invalid { var: "DB_ENGINE", .. }));
    }

    #[test]
    fn mysql_requires_explicit_credentials() {
        let result = load(&[
            ("SECRET_KEY", "s"),
            ("DB_ENGINE", "mysql"),
            ("DB_NAME", "staybook"),
            ("DB_PASSWORD", "pw"),
            ("DB_HOST", "db.internal"),
        ]);
        assert_matches!(result, Err(ConfigError::Missing("DB_USER")));

        let result = load(&[
            ("SECRET_KEY", "s"),
            ("DB_ENGINE", "mysql"),
            ("DB_NAME", "staybook"),
            ("DB_USER", "app"),
            ("DB_PASSWORD", "pw"),
            ("DB_HOST", "db.internal"),
            ("DB_PORT", "not-a-port"),
        ]);
        assert_matches!(result, Err(ConfigError::Invalid { var: "DB_PORT", .. }));
    }

    #[test]
    fn complete_mysql_settings_are_rejected_as_unsupported() {
        let result = load(&[
            ("SECRET_KEY", "s"),
            ("DB_ENGINE", "mysql"),
            ("DB_NAME", "staybook"),
            ("DB_USER", "app"),
            ("DB_PASSWORD", "pw"),
            ("DB_HOST", "db.internal"),
        ]);
        assert_matches!(result, Err(ConfigError::UnsupportedEngine(DbEngine::Mysql)));

        let result = load(&[
            ("SECRET_KEY", "s"),
            ("DATABASE_URL", "mysql://app:pw@db/staybook"),
        ]);
        assert_matches!(result, Err(ConfigError::UnsupportedEngine(DbEngine::Mysql)));
    }

    #[test]
    fn wildcard_allows_any_host() {
        let config = load(&[("SECRET_KEY", "s"), ("ALLOWED_HOSTS", "*")]).unwrap();
        assert!(config.is_host_allowed(Some("anything.example")));
        assert!(config.is_host_allowed(None));
    }
}

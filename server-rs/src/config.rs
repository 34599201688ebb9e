use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub log_format: LogFormat,
    pub db: DbConfig,
}

#[derive(Clone, Debug)]
pub struct DbConfig {
    /// Connection string selecting the store. `memory://` keeps everything in
    /// process; anything else is handed to Postgres.
    pub url: String,
    pub pool_min: u32,
    pub pool_max: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

pub const MEMORY_URL: &str = "memory://";

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_or_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: env_or_parse("PORT", 3000),
            cors_origins: parse_origins(&env_or("CORS_ORIGINS", "*")),
            log_format: match env_or("LOG_FORMAT", "json").to_lowercase().as_str() {
                "pretty" | "text" => LogFormat::Pretty,
                _ => LogFormat::Json,
            },
            db: DbConfig {
                url: database_url(),
                pool_min: env_or_parse("DB_POOL_MIN", 1),
                pool_max: env_or_parse("DB_POOL_MAX", 10),
                acquire_timeout_secs: env_or_parse("DB_ACQUIRE_TIMEOUT", 10),
            },
        }
    }

    /// Configuration for tests and local runs without a database.
    pub fn in_memory() -> Self {
        Self {
            port: 0,
            cors_origins: vec!["*".to_string()],
            log_format: LogFormat::Pretty,
            db: DbConfig {
                url: MEMORY_URL.to_string(),
                pool_min: 0,
                pool_max: 1,
                acquire_timeout_secs: 1,
            },
        }
    }

    pub fn uses_memory_store(&self) -> bool {
        self.db.url.starts_with(MEMORY_URL)
    }
}

fn database_url() -> String {
    if let Ok(url) = env::var("DATABASE_URL") {
        return url;
    }
    if let Ok(url) = env::var("POSTGRES_URL") {
        return url;
    }
    "postgres://postgres@localhost:5432/teams".to_string()
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_trimmed_and_blank_entries_dropped() {
        assert_eq!(
            parse_origins("http://a.test, http://b.test,,"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
    }

    #[test]
    fn memory_url_selects_in_process_store() {
        assert!(Config::in_memory().uses_memory_store());
    }
}

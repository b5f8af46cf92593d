use std::{env, fmt::Display, path::PathBuf, str::FromStr, time::Duration};

use tracing::{info, warn};

use crate::error::AppError;

pub struct Config {
    pub port: u16,
    pub db_address: String,
    pub db_name: String,
    pub static_dir: PathBuf,
    pub db_connect_timeout: Duration,
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, `None` meaning unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            port: try_load(&lookup, "BLOG_PORT", "8000")?,
            db_address: try_load(&lookup, "BLOG_DB_ADDRESS", "redis://127.0.0.1:6379")?,
            db_name: try_load(&lookup, "BLOG_DB_NAME", "my-blog")?,
            static_dir: try_load(&lookup, "BLOG_STATIC_DIR", "build")?,
            db_connect_timeout: Duration::from_millis(try_load(
                &lookup,
                "BLOG_DB_CONNECT_TIMEOUT_MS",
                "2000",
            )?),
        })
    }

    pub fn index_file(&self) -> PathBuf {
        self.static_dir.join("index.html")
    }
}

fn try_load<F, T>(lookup: &F, key: &str, default: &str) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    lookup(key)
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
            AppError::Config(format!("invalid {key}: {e}"))
        })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.port, 8000);
        assert_eq!(config.db_address, "redis://127.0.0.1:6379");
        assert_eq!(config.db_name, "my-blog");
        assert_eq!(config.index_file(), PathBuf::from("build/index.html"));
        assert_eq!(config.db_connect_timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("BLOG_PORT", "3000"),
            ("BLOG_DB_ADDRESS", "redis://db:6379/2"),
            ("BLOG_STATIC_DIR", "/srv/blog"),
            ("BLOG_DB_CONNECT_TIMEOUT_MS", "250"),
        ]))
        .unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.db_address, "redis://db:6379/2");
        assert_eq!(config.static_dir, PathBuf::from("/srv/blog"));
        assert_eq!(config.db_connect_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_invalid_port() {
        let result = Config::from_lookup(lookup(&[("BLOG_PORT", "eighty")]));
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}

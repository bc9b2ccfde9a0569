use std::path::PathBuf;

use anyhow::Context;

/// Server configuration loaded from environment variables.
///
/// Pipeline settings live in the docpolish [`Config`](docpolish::Config);
/// this only covers the listening socket and browser access.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// Pipeline config file (`DOCPOLISH_CONFIG`), if any.
    pub config_path: Option<PathBuf>,
    /// Emit JSON log lines (`LOG_FORMAT=json`).
    pub json_logs: bool,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var            | Default                                         |
    /// |--------------------|-------------------------------------------------|
    /// | `HOST`             | `0.0.0.0`                                       |
    /// | `PORT`             | `5000`                                          |
    /// | `CORS_ORIGINS`     | `http://localhost:3000,http://frontend:3000`    |
    /// | `DOCPOLISH_CONFIG` | unset                                           |
    /// | `LOG_FORMAT`       | `text`                                          |
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".into());

        let port: u16 = lookup("PORT")
            .unwrap_or_else(|| "5000".into())
            .trim()
            .parse()
            .context("PORT must be a valid u16")?;

        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3000,http://frontend:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let config_path = lookup(docpolish::config::CONFIG_PATH_ENV)
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        let json_logs = lookup("LOG_FORMAT")
            .map(|f| f.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        Ok(Self {
            host,
            port,
            cors_origins,
            config_path,
            json_logs,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
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
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:5000");
        assert_eq!(
            config.cors_origins,
            vec!["http://localhost:3000", "http://frontend:3000"]
        );
        assert!(config.config_path.is_none());
        assert!(!config.json_logs);
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("CORS_ORIGINS", "https://docs.example.com, ,http://localhost:5173"),
            ("DOCPOLISH_CONFIG", "/etc/docpolish.json"),
            ("LOG_FORMAT", "JSON"),
        ]))
        .unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(
            config.cors_origins,
            vec!["https://docs.example.com", "http://localhost:5173"]
        );
        assert_eq!(config.config_path, Some(PathBuf::from("/etc/docpolish.json")));
        assert!(config.json_logs);
    }

    #[test]
    fn test_invalid_port() {
        let err = ServerConfig::from_lookup(lookup(&[("PORT", "http")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }
}
